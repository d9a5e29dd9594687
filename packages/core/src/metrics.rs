//! Prometheus metrics registry for the availability monitor.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it to
//! the monitor and the status server.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{
    Counter, CounterVec, GaugeVec, Histogram, HistogramOpts, Opts, Registry,
};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Completed poll cycles.
    pub cycles_total: Counter,
    /// Failed provider requests, labelled by provider.
    pub provider_errors_total: CounterVec,
    /// Locations reported as newly available, labelled by provider.
    pub newly_available_total: CounterVec,
    /// Slack messages delivered.
    pub notifications_sent_total: Counter,
    /// Slack messages that failed to deliver.
    pub notification_errors_total: Counter,
    /// Locations currently held in the tracker, labelled by provider.
    pub tracked_locations: GaugeVec,
    /// Wall-clock duration of a poll cycle in seconds.
    pub cycle_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_total = Counter::with_opts(Opts::new(
            "vaccine_monitor_cycles_total",
            "Completed poll cycles",
        ))?;

        let provider_errors_total = CounterVec::new(
            Opts::new(
                "vaccine_monitor_provider_errors_total",
                "Failed provider requests by provider",
            ),
            &["provider"],
        )?;

        let newly_available_total = CounterVec::new(
            Opts::new(
                "vaccine_monitor_newly_available_total",
                "Locations reported as newly available by provider",
            ),
            &["provider"],
        )?;

        let notifications_sent_total = Counter::with_opts(Opts::new(
            "vaccine_monitor_notifications_sent_total",
            "Slack notifications delivered",
        ))?;

        let notification_errors_total = Counter::with_opts(Opts::new(
            "vaccine_monitor_notification_errors_total",
            "Slack notifications that failed to deliver",
        ))?;

        let tracked_locations = GaugeVec::new(
            Opts::new(
                "vaccine_monitor_tracked_locations",
                "Locations held in the availability tracker by provider",
            ),
            &["provider"],
        )?;

        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "vaccine_monitor_cycle_duration_seconds",
                "Poll cycle duration in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(provider_errors_total.clone()))?;
        registry.register(Box::new(newly_available_total.clone()))?;
        registry.register(Box::new(notifications_sent_total.clone()))?;
        registry.register(Box::new(notification_errors_total.clone()))?;
        registry.register(Box::new(tracked_locations.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;

        Ok(Self {
            cycles_total,
            provider_errors_total,
            newly_available_total,
            notifications_sent_total,
            notification_errors_total,
            tracked_locations,
            cycle_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
