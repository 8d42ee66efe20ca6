pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::agent::{AgentConfig, ExporterSettings, WatchdogSettings};
pub use config::{Cli, Command, GuideAction};
pub use core::exporter::{HttpMetricSource, MetricsExporter};
pub use core::guide::Guide;
pub use core::restarter::{SysinfoCpuSampler, SystemdController, WatchOutcome, Watchdog};
pub use utils::error::{PrimerError, Result};
