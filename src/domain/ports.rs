use crate::domain::model::CpuSample;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// One outbound request to a metrics endpoint.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(&self) -> Result<serde_json::Value>;
}

/// One system CPU reading.
#[async_trait]
pub trait CpuSampler: Send + Sync {
    async fn sample(&mut self) -> Result<CpuSample>;
}

/// One process-control invocation against a managed service.
#[async_trait]
pub trait ProcessController: Send + Sync {
    async fn restart(&self, unit: &str) -> Result<()>;
}

pub trait ExporterConfig: Send + Sync {
    fn endpoint(&self) -> &str;
    fn poll_interval(&self) -> Duration;
    fn metric_prefix(&self) -> &str;
    fn max_cycles(&self) -> Option<u64>;
}

pub trait WatchdogConfig: Send + Sync {
    fn unit(&self) -> &str;
    fn threshold_percent(&self) -> f32;
    fn sample_interval(&self) -> Duration;
    fn max_cycles(&self) -> Option<u64>;
}
