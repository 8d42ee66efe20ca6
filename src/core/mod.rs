pub mod exporter;
pub mod guide;
pub mod restarter;

pub use crate::domain::model::{CpuSample, MetricsSnapshot, QaEntry, Snippet};
pub use crate::domain::ports::{
    CpuSampler, ExporterConfig, MetricSource, ProcessController, WatchdogConfig,
};
pub use crate::utils::error::Result;
