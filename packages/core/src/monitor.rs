//! The availability monitor.
//!
//! [`AvailabilityMonitor`] owns all state that lives across polls (the
//! availability tracker) or within one poll (the VaccineSpotter state
//! cache), together with handles to the providers and the notifier. The
//! scheduler holds it by value and drives one [`run_cycle`] at a time, so
//! no locking is needed.
//!
//! [`run_cycle`]: AvailabilityMonitor::run_cycle

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::availability::{detect, AvailabilityTracker, Detection};
use crate::cache::StateCache;
use crate::metrics::AppMetrics;
use crate::notify::{compose, LocalClock, Notifier};
use crate::providers::hyvee::{self, HyVeeApi};
use crate::providers::spotter::{self, SpotterApi};
use crate::providers::{Location, ProviderFamily, ProviderFetch};
use crate::search_area::SearchArea;

/// Summary of one poll cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub areas_checked: usize,
    pub areas_disabled: usize,
    pub provider_failures: usize,
    pub newly_available: usize,
    pub notifications_sent: usize,
    pub notification_failures: usize,
}

/// What happened for a single search area.
#[derive(Debug, Default)]
pub struct AreaOutcome {
    pub hyvee: Detection,
    pub spotter: Detection,
    pub provider_failures: usize,
    pub delivered: Option<bool>,
}

pub struct AvailabilityMonitor {
    hyvee: Arc<dyn HyVeeApi>,
    spotter: Arc<dyn SpotterApi>,
    notifier: Arc<dyn Notifier>,
    clock: LocalClock,
    metrics: Arc<AppMetrics>,
    tracker: AvailabilityTracker,
    cache: StateCache,
}

impl AvailabilityMonitor {
    pub fn new(
        hyvee: Arc<dyn HyVeeApi>,
        spotter: Arc<dyn SpotterApi>,
        notifier: Arc<dyn Notifier>,
        clock: LocalClock,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            hyvee,
            spotter,
            notifier,
            clock,
            metrics,
            tracker: AvailabilityTracker::new(),
            cache: StateCache::new(),
        }
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.tracker
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Run one full poll over `areas`: clear the state cache, then check
    /// every enabled area in order.
    pub async fn run_cycle(&mut self, areas: &[SearchArea]) -> CycleReport {
        let started = Instant::now();
        self.cache.clear();

        let mut report = CycleReport::default();
        for area in areas {
            if !area.enabled {
                report.areas_disabled += 1;
                continue;
            }

            let outcome = self.check_area(area).await;
            report.areas_checked += 1;
            report.provider_failures += outcome.provider_failures;
            report.newly_available +=
                outcome.hyvee.newly_available.len() + outcome.spotter.newly_available.len();
            match outcome.delivered {
                Some(true) => report.notifications_sent += 1,
                Some(false) => report.notification_failures += 1,
                None => {}
            }
        }

        for family in ProviderFamily::ALL {
            self.metrics
                .tracked_locations
                .with_label_values(&[family.as_str()])
                .set(self.tracker.section(family).len() as f64);
        }
        self.metrics.cycles_total.inc();
        self.metrics
            .cycle_duration
            .observe(started.elapsed().as_secs_f64());

        tracing::info!(
            areas = report.areas_checked,
            newly_available = report.newly_available,
            notifications = report.notifications_sent,
            failures = report.provider_failures + report.notification_failures,
            "Poll cycle complete"
        );

        report
    }

    /// Fetch, detect and notify for one search area.
    pub async fn check_area(&mut self, area: &SearchArea) -> AreaOutcome {
        let hyvee_fetch = hyvee::fetch_locations(self.hyvee.as_ref(), area).await;
        self.record_failures(ProviderFamily::HyVee, &hyvee_fetch);
        let hyvee = detect(
            &hyvee_fetch.locations,
            self.tracker.section_mut(ProviderFamily::HyVee),
            area.test,
        );

        let spotter_fetch =
            spotter::fetch_locations(self.spotter.as_ref(), &mut self.cache, area).await;
        self.record_failures(ProviderFamily::Spotter, &spotter_fetch);
        let spotter = detect(
            &spotter_fetch.locations,
            self.tracker.section_mut(ProviderFamily::Spotter),
            area.test,
        );

        let mut outcome = AreaOutcome {
            provider_failures: hyvee_fetch.failed_requests + spotter_fetch.failed_requests,
            ..AreaOutcome::default()
        };

        let hyvee_notify = hyvee.notifiable();
        let spotter_notify = spotter.notifiable();
        outcome.hyvee = hyvee;
        outcome.spotter = spotter;

        if hyvee_notify.is_empty() && spotter_notify.is_empty() {
            return outcome;
        }

        self.metrics
            .newly_available_total
            .with_label_values(&[ProviderFamily::HyVee.as_str()])
            .inc_by(outcome.hyvee.newly_available.len() as f64);
        self.metrics
            .newly_available_total
            .with_label_values(&[ProviderFamily::Spotter.as_str()])
            .inc_by(outcome.spotter.newly_available.len() as f64);

        tracing::info!(
            area = %area.name,
            test = area.test,
            "{} newly available hy-vee location(s) found",
            hyvee_notify.len()
        );
        tracing::info!(
            area = %area.name,
            test = area.test,
            "{} newly available spotter location(s) found",
            spotter_notify.len()
        );

        outcome.delivered = Some(self.notify(area, &hyvee_notify, &spotter_notify).await);
        outcome
    }

    async fn notify(&self, area: &SearchArea, hyvee: &[Location], spotter: &[Location]) -> bool {
        let posted_at = self.clock.posted_at(area.center, Utc::now());
        let message = compose(hyvee, spotter, &posted_at);

        match self.notifier.send(&area.channel, &message).await {
            Ok(()) => {
                self.metrics.notifications_sent_total.inc();
                tracing::info!(area = %area.name, channel = %area.channel, "Slack message sent");
                true
            }
            Err(err) => {
                self.metrics.notification_errors_total.inc();
                tracing::error!(
                    area = %area.name,
                    channel = %area.channel,
                    "Error sending Slack message: {}",
                    err
                );
                false
            }
        }
    }

    fn record_failures(&self, family: ProviderFamily, fetch: &ProviderFetch) {
        if fetch.failed_requests > 0 {
            self.metrics
                .provider_errors_total
                .with_label_values(&[family.as_str()])
                .inc_by(fetch.failed_requests as f64);
        }
    }
}
