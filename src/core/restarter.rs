use crate::domain::model::CpuSample;
use crate::domain::ports::{CpuSampler, ProcessController, WatchdogConfig};
use crate::utils::error::{PrimerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sysinfo::System;

/// Production sampler: system-wide CPU average via sysinfo. Two refreshes
/// separated by the crate's minimum update interval are required for a
/// meaningful reading.
pub struct SysinfoCpuSampler {
    system: System,
}

impl SysinfoCpuSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoCpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CpuSampler for SysinfoCpuSampler {
    async fn sample(&mut self) -> Result<CpuSample> {
        self.system.refresh_cpu_usage();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        self.system.refresh_cpu_usage();

        Ok(CpuSample {
            cpu_percent: self.system.global_cpu_usage(),
            taken_at: Utc::now(),
        })
    }
}

/// Production controller: shells out to `systemctl restart <unit>`.
pub struct SystemdController;

#[async_trait]
impl ProcessController for SystemdController {
    async fn restart(&self, unit: &str) -> Result<()> {
        let status = tokio::process::Command::new("systemctl")
            .args(["restart", unit])
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(PrimerError::ControlError {
                message: format!("systemctl restart {} exited with {}", unit, status),
            })
        }
    }
}

/// What one watchdog tick decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchOutcome {
    /// CPU at or below the threshold, nothing done.
    Below(f32),
    /// Threshold exceeded, restart issued successfully.
    Triggered(f32),
    /// Could not read the CPU metric.
    SampleFailed,
    /// Threshold exceeded but the restart command failed.
    RestartFailed(f32),
}

/// The threshold-triggered restarter: sample, compare, act, sleep. No
/// debouncing and no backoff; every failure is logged and the loop moves on
/// to the next interval.
pub struct Watchdog<S: CpuSampler, P: ProcessController, C: WatchdogConfig> {
    sampler: S,
    controller: P,
    config: C,
    ticks: u64,
    restarts_triggered: u64,
}

impl<S: CpuSampler, P: ProcessController, C: WatchdogConfig> Watchdog<S, P, C> {
    pub fn new(sampler: S, controller: P, config: C) -> Self {
        Self {
            sampler,
            controller,
            config,
            ticks: 0,
            restarts_triggered: 0,
        }
    }

    pub fn restarts_triggered(&self) -> u64 {
        self.restarts_triggered
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One sample-compare-act cycle. Never returns an error.
    pub async fn check_once(&mut self) -> WatchOutcome {
        self.ticks += 1;

        let sample = match self.sampler.sample().await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!("⚠️ CPU sample failed: {}", e);
                return WatchOutcome::SampleFailed;
            }
        };

        let threshold = self.config.threshold_percent();
        if sample.cpu_percent <= threshold {
            tracing::info!(
                "📊 CPU {:.1}% <= {:.1}%, {} left alone",
                sample.cpu_percent,
                threshold,
                self.config.unit()
            );
            return WatchOutcome::Below(sample.cpu_percent);
        }

        tracing::warn!(
            "🔥 CPU {:.1}% > {:.1}%, restarting {}",
            sample.cpu_percent,
            threshold,
            self.config.unit()
        );

        match self.controller.restart(self.config.unit()).await {
            Ok(()) => {
                self.restarts_triggered += 1;
                tracing::info!("✅ Restarted {}", self.config.unit());
                WatchOutcome::Triggered(sample.cpu_percent)
            }
            Err(e) => {
                tracing::warn!("⚠️ Restart of {} failed: {}", self.config.unit(), e);
                WatchOutcome::RestartFailed(sample.cpu_percent)
            }
        }
    }

    /// Drive `check_once` on a fixed interval until the optional cycle limit
    /// is reached.
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.config.sample_interval());
        let max_cycles = self.config.max_cycles();

        tracing::info!(
            "🚀 Watchdog on {} (threshold {:.1}%, every {:?})",
            self.config.unit(),
            self.config.threshold_percent(),
            self.config.sample_interval()
        );

        loop {
            ticker.tick().await;
            self.check_once().await;

            if let Some(limit) = max_cycles {
                if self.ticks >= limit {
                    tracing::info!(
                        "✅ Cycle limit {} reached, stopping watchdog ({} restart(s) issued)",
                        limit,
                        self.restarts_triggered
                    );
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct ScriptedSampler {
        readings: Vec<Result<f32>>,
        next: usize,
    }

    impl ScriptedSampler {
        fn new(readings: Vec<Result<f32>>) -> Self {
            Self { readings, next: 0 }
        }
    }

    #[async_trait]
    impl CpuSampler for ScriptedSampler {
        async fn sample(&mut self) -> Result<CpuSample> {
            let index = self.next;
            self.next += 1;
            match &self.readings[index] {
                Ok(percent) => Ok(CpuSample {
                    cpu_percent: *percent,
                    taken_at: Utc::now(),
                }),
                Err(_) => Err(PrimerError::ControlError {
                    message: "sampler offline".to_string(),
                }),
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingController {
        restarted: Arc<Mutex<Vec<String>>>,
        failures_left: Arc<AtomicU64>,
    }

    #[async_trait]
    impl ProcessController for RecordingController {
        async fn restart(&self, unit: &str) -> Result<()> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(PrimerError::ControlError {
                    message: format!("cannot restart {}", unit),
                });
            }
            self.restarted.lock().unwrap().push(unit.to_string());
            Ok(())
        }
    }

    struct TestConfig {
        threshold: f32,
        max_cycles: Option<u64>,
    }

    impl WatchdogConfig for TestConfig {
        fn unit(&self) -> &str {
            "nginx.service"
        }

        fn threshold_percent(&self) -> f32 {
            self.threshold
        }

        fn sample_interval(&self) -> Duration {
            Duration::from_millis(1)
        }

        fn max_cycles(&self) -> Option<u64> {
            self.max_cycles
        }
    }

    #[tokio::test]
    async fn test_below_threshold_does_nothing() {
        let sampler = ScriptedSampler::new(vec![Ok(35.0)]);
        let controller = RecordingController::default();
        let config = TestConfig {
            threshold: 80.0,
            max_cycles: None,
        };
        let mut watchdog = Watchdog::new(sampler, controller.clone(), config);

        let outcome = watchdog.check_once().await;

        assert_eq!(outcome, WatchOutcome::Below(35.0));
        assert!(controller.restarted.lock().unwrap().is_empty());
        assert_eq!(watchdog.restarts_triggered(), 0);
    }

    #[tokio::test]
    async fn test_exactly_at_threshold_does_not_trigger() {
        let sampler = ScriptedSampler::new(vec![Ok(80.0)]);
        let controller = RecordingController::default();
        let config = TestConfig {
            threshold: 80.0,
            max_cycles: None,
        };
        let mut watchdog = Watchdog::new(sampler, controller.clone(), config);

        assert_eq!(watchdog.check_once().await, WatchOutcome::Below(80.0));
        assert!(controller.restarted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_above_threshold_restarts_unit() {
        let sampler = ScriptedSampler::new(vec![Ok(95.5)]);
        let controller = RecordingController::default();
        let config = TestConfig {
            threshold: 80.0,
            max_cycles: None,
        };
        let mut watchdog = Watchdog::new(sampler, controller.clone(), config);

        let outcome = watchdog.check_once().await;

        assert_eq!(outcome, WatchOutcome::Triggered(95.5));
        assert_eq!(
            *controller.restarted.lock().unwrap(),
            vec!["nginx.service".to_string()]
        );
        assert_eq!(watchdog.restarts_triggered(), 1);
    }

    #[tokio::test]
    async fn test_sample_failure_is_swallowed() {
        let sampler = ScriptedSampler::new(vec![
            Err(PrimerError::ControlError {
                message: "x".to_string(),
            }),
            Ok(90.0),
        ]);
        let controller = RecordingController::default();
        let config = TestConfig {
            threshold: 80.0,
            max_cycles: None,
        };
        let mut watchdog = Watchdog::new(sampler, controller.clone(), config);

        assert_eq!(watchdog.check_once().await, WatchOutcome::SampleFailed);
        // The loop keeps going: the next tick still triggers.
        assert_eq!(watchdog.check_once().await, WatchOutcome::Triggered(90.0));
    }

    #[tokio::test]
    async fn test_restart_failure_is_swallowed_and_not_counted() {
        let sampler = ScriptedSampler::new(vec![Ok(90.0), Ok(91.0)]);
        let controller = RecordingController::default();
        controller.failures_left.store(1, Ordering::SeqCst);
        let config = TestConfig {
            threshold: 80.0,
            max_cycles: None,
        };
        let mut watchdog = Watchdog::new(sampler, controller.clone(), config);

        assert_eq!(
            watchdog.check_once().await,
            WatchOutcome::RestartFailed(90.0)
        );
        assert_eq!(watchdog.restarts_triggered(), 0);

        assert_eq!(watchdog.check_once().await, WatchOutcome::Triggered(91.0));
        assert_eq!(watchdog.restarts_triggered(), 1);
    }

    #[tokio::test]
    async fn test_run_honors_cycle_limit() {
        let sampler = ScriptedSampler::new(vec![Ok(10.0), Ok(95.0), Ok(20.0)]);
        let controller = RecordingController::default();
        let config = TestConfig {
            threshold: 80.0,
            max_cycles: Some(3),
        };
        let mut watchdog = Watchdog::new(sampler, controller.clone(), config);

        watchdog.run().await.unwrap();

        assert_eq!(watchdog.ticks(), 3);
        assert_eq!(watchdog.restarts_triggered(), 1);
        assert_eq!(controller.restarted.lock().unwrap().len(), 1);
    }
}
