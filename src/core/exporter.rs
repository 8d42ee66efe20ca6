use crate::domain::model::MetricsSnapshot;
use crate::domain::ports::{ExporterConfig, MetricSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

/// Production metric source: one GET against a JSON metrics endpoint.
pub struct HttpMetricSource {
    client: Client,
    endpoint: String,
}

impl HttpMetricSource {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl MetricSource for HttpMetricSource {
    async fn fetch(&self) -> Result<serde_json::Value> {
        tracing::debug!("Polling metrics endpoint: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        tracing::debug!("Metrics response status: {}", response.status());
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// The metrics-polling exporter: one request per tick, counters updated in
/// memory, any failure logged and retried on the next interval.
pub struct MetricsExporter<S: MetricSource, C: ExporterConfig> {
    source: S,
    config: C,
    snapshot: MetricsSnapshot,
}

impl<S: MetricSource, C: ExporterConfig> MetricsExporter<S, C> {
    pub fn new(source: S, config: C) -> Self {
        Self {
            source,
            config,
            snapshot: MetricsSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    /// One poll cycle. Never returns an error: failures bump the error
    /// counter and leave existing gauges untouched.
    pub async fn poll_once(&mut self) {
        self.snapshot.polls_total += 1;

        match self.source.fetch().await {
            Ok(body) => {
                let updated = self.apply(&body);
                self.snapshot.last_success = Some(Utc::now());
                tracing::info!(
                    "📊 Poll #{} ok, {} gauge(s) updated",
                    self.snapshot.polls_total,
                    updated
                );
            }
            Err(e) => {
                self.snapshot.poll_errors_total += 1;
                tracing::warn!(
                    "⚠️ Poll #{} failed, keeping previous gauges: {}",
                    self.snapshot.polls_total,
                    e
                );
            }
        }
    }

    /// Copy every top-level numeric field into the gauge set. Non-numeric
    /// fields and non-object bodies contribute nothing.
    fn apply(&mut self, body: &serde_json::Value) -> usize {
        let Some(map) = body.as_object() else {
            tracing::warn!("Metrics body is not a JSON object, no gauges updated");
            return 0;
        };

        let mut updated = 0;
        for (key, value) in map {
            if let Some(number) = value.as_f64() {
                self.snapshot.gauges.insert(key.clone(), number);
                updated += 1;
            } else {
                tracing::debug!("Skipping non-numeric field: {}", key);
            }
        }
        updated
    }

    /// Render the snapshot as Prometheus-style exposition lines, sorted by
    /// metric name.
    pub fn render_exposition(&self) -> String {
        let prefix = sanitize_metric_name(self.config.metric_prefix());
        let mut lines = vec![
            format!("{}_polls_total {}", prefix, self.snapshot.polls_total),
            format!(
                "{}_poll_errors_total {}",
                prefix, self.snapshot.poll_errors_total
            ),
        ];

        let mut keys: Vec<&String> = self.snapshot.gauges.keys().collect();
        keys.sort();
        for key in keys {
            lines.push(format!(
                "{}_{} {}",
                prefix,
                sanitize_metric_name(key),
                self.snapshot.gauges[key]
            ));
        }
        lines.join("\n")
    }

    /// Drive `poll_once` on a fixed interval until the optional cycle limit
    /// is reached.
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        let max_cycles = self.config.max_cycles();

        tracing::info!(
            "🚀 Exporter polling {} every {:?}",
            self.config.endpoint(),
            self.config.poll_interval()
        );

        loop {
            ticker.tick().await;
            self.poll_once().await;

            for line in self.render_exposition().lines() {
                tracing::info!("{}", line);
            }

            if let Some(limit) = max_cycles {
                if self.snapshot.polls_total >= limit {
                    tracing::info!("✅ Cycle limit {} reached, stopping exporter", limit);
                    return Ok(());
                }
            }
        }
    }
}

fn sanitize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
