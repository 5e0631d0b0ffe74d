use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};

use biometrics::{Collector, Counter, Emitter, Gauge, Histogram, Moments, Sensor};

pub(crate) static GATEWAY_REQUESTS: Counter = Counter::new("llmchat.gateway.requests");
pub(crate) static GATEWAY_ERRORS: Counter = Counter::new("llmchat.gateway.errors");
pub(crate) static GATEWAY_REQUEST_DURATION: Moments =
    Moments::new("llmchat.gateway.request_duration_seconds");

pub(crate) static SESSION_EXCHANGES: Counter = Counter::new("llmchat.session.exchanges");
pub(crate) static SESSION_CLEARS: Counter = Counter::new("llmchat.session.clears");
pub(crate) static SESSION_GATE_BLOCKED: Counter = Counter::new("llmchat.session.gate_blocked");

/// Prefix shared by every sensor this crate registers.
const LABEL_PREFIX: &str = "llmchat.";

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: &Collector) {
    collector.register_counter(&GATEWAY_REQUESTS);
    collector.register_counter(&GATEWAY_ERRORS);
    collector.register_moments(&GATEWAY_REQUEST_DURATION);

    collector.register_counter(&SESSION_EXCHANGES);
    collector.register_counter(&SESSION_CLEARS);
    collector.register_counter(&SESSION_GATE_BLOCKED);
}

/// Emitter that keeps one `label value` line per llmchat reading.
///
/// Sensors registered by the collector itself are skipped.
#[derive(Debug, Default)]
pub struct MetricsSnapshot {
    lines: Vec<String>,
}

impl MetricsSnapshot {
    /// Reads every sensor registered with `collector`.
    pub fn take(collector: &Collector) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let mut snapshot = Self::default();
        let Ok(()) = collector.emit(&mut snapshot, now);
        snapshot
    }

    /// The formatted readings, in registration order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, label: &str, value: String) {
        if label.starts_with(LABEL_PREFIX) {
            self.lines.push(format!("{label} {value}"));
        }
    }
}

impl Emitter for MetricsSnapshot {
    type Error = Infallible;

    fn emit_counter(&mut self, counter: &Counter, _: u64) -> Result<(), Infallible> {
        self.push(counter.label(), counter.read().to_string());
        Ok(())
    }

    fn emit_gauge(&mut self, gauge: &Gauge, _: u64) -> Result<(), Infallible> {
        self.push(gauge.label(), gauge.read().to_string());
        Ok(())
    }

    fn emit_moments(&mut self, moments: &Moments, _: u64) -> Result<(), Infallible> {
        let reading = moments.read();
        let value = if reading.n() == 0 {
            "n=0".to_string()
        } else {
            format!("n={} mean={:.3}", reading.n(), reading.mean())
        };
        self.push(moments.label(), value);
        Ok(())
    }

    // No histograms are registered.
    fn emit_histogram(&mut self, _: &Histogram, _: u64) -> Result<(), Infallible> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_registered_sensors() {
        let collector = Collector::new();
        register_biometrics(&collector);
        SESSION_CLEARS.click();

        let snapshot = MetricsSnapshot::take(&collector);
        let lines = snapshot.lines();
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.starts_with(LABEL_PREFIX)));
        let clears = lines
            .iter()
            .find(|line| line.starts_with("llmchat.session.clears "))
            .unwrap();
        let count: u64 = clears.rsplit(' ').next().unwrap().parse().unwrap();
        assert!(count >= 1);
        assert!(
            lines
                .iter()
                .any(|line| line.starts_with("llmchat.gateway.request_duration_seconds n="))
        );
    }
}
