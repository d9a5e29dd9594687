//! End-to-end poll cycles against wiremocked providers and Slack.
//!
//! `build_monitor()` wires the real HTTP clients to one `MockServer` that
//! plays Hy-Vee, VaccineSpotter and Slack at once, so each test exercises
//! the same path as production: fetch, detect, compose, deliver.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use vaccine_availability_monitor::{
    geo::Coordinates,
    metrics::AppMetrics,
    monitor::AvailabilityMonitor,
    notify::{LocalClock, SlackNotifier},
    providers::{hyvee::HyVeeClient, spotter::SpotterClient, ProviderFamily},
    search_area::SearchArea,
};

// ---- Helpers ----------------------------------------------------------------

fn hyvee_body(available: bool) -> String {
    serde_json::json!({
        "data": {
            "searchPharmaciesNearPoint": [{
                "distance": 2.1,
                "location": {
                    "locationId": "L1",
                    "name": "Hy-Vee Pharmacy",
                    "nickname": "Dodge Street",
                    "isCovidVaccineAvailable": available,
                    "address": {"line1": "7910 Cass St", "city": "Omaha", "state": "NE", "zip": "68114"}
                }
            }]
        }
    })
    .to_string()
}

fn spotter_body(available: bool) -> String {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "geometry": {"coordinates": [-95.99, 41.26]},
                "properties": {
                    "id": "L1", "provider": "walgreens", "provider_brand_name": "Walgreens",
                    "name": "Walgreens 4521", "address": "7202 Dodge St", "city": "Omaha",
                    "state": "NE", "postal_code": "68114",
                    "url": "https://www.walgreens.com/vaccine",
                    "appointments_available": available
                }
            },
            {
                "geometry": {"coordinates": [-95.95, 41.22]},
                "properties": {
                    "id": "hv-dup", "provider": "hyvee", "city": "Omaha", "state": "NE",
                    "appointments_available": true
                }
            }
        ]
    })
    .to_string()
}

async fn mount_providers(server: &MockServer, hyvee_available: bool, spotter_available: bool) {
    Mock::given(method("POST"))
        .and(path("/my-pharmacy/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string(hyvee_body(hyvee_available)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/states/NE.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(spotter_body(spotter_available)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .mount(server)
        .await;
}

fn build_monitor(server: &MockServer) -> (AvailabilityMonitor, Arc<AppMetrics>) {
    let timeout = Duration::from_secs(2);
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let monitor = AvailabilityMonitor::new(
        Arc::new(HyVeeClient::new(server.uri(), timeout).unwrap()),
        Arc::new(SpotterClient::new(server.uri(), timeout).unwrap()),
        Arc::new(SlackNotifier::new(server.uri(), "xoxb-test", timeout).unwrap()),
        LocalClock::new(),
        metrics.clone(),
    );
    (monitor, metrics)
}

fn omaha(test: bool) -> SearchArea {
    SearchArea {
        name: "omaha".to_string(),
        center: Coordinates::new(41.2565, -95.9345),
        radius_miles: 25.0,
        states: vec!["NE".to_string()],
        channel: "#vaccines-omaha".to_string(),
        enabled: true,
        test,
    }
}

async fn slack_posts(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|req| req.url.path() == "/api/chat.postMessage")
        .map(|req| serde_json::from_slice(&req.body).unwrap())
        .collect()
}

// ---- Tests ------------------------------------------------------------------

#[tokio::test]
async fn three_cycle_scenario_notifies_only_on_transition() {
    let server = MockServer::start().await;
    let (mut monitor, metrics) = build_monitor(&server);
    let areas = vec![omaha(false)];

    // Cycle 1: everything unavailable.
    mount_providers(&server, false, false).await;
    let report = monitor.run_cycle(&areas).await;
    assert_eq!(report.notifications_sent, 0);
    assert!(!monitor.tracker().previous(ProviderFamily::HyVee, "L1"));
    assert!(slack_posts(&server).await.is_empty());

    // Cycle 2: both providers report L1 available.
    server.reset().await;
    mount_providers(&server, true, true).await;
    let report = monitor.run_cycle(&areas).await;
    assert_eq!(report.newly_available, 2);
    assert_eq!(report.notifications_sent, 1);

    let posts = slack_posts(&server).await;
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post["channel"], "#vaccines-omaha");
    // header + 2 * (section, actions, divider) + footer
    assert_eq!(post["blocks"].as_array().unwrap().len(), 8);
    let text = post["text"].as_str().unwrap();
    assert!(text.contains("*Dodge Street*"));
    assert!(text.contains("*Walgreens 4521 Walgreens*"));
    assert!(text.contains("https://www.walgreens.com/vaccine"));
    assert!(text.contains("_Posted "));

    // Cycle 3: still available, no repeat alert.
    server.reset().await;
    mount_providers(&server, true, true).await;
    let report = monitor.run_cycle(&areas).await;
    assert_eq!(report.newly_available, 0);
    assert!(slack_posts(&server).await.is_empty());

    assert!((metrics.notifications_sent_total.get() - 1.0).abs() < f64::EPSILON);
    assert!((metrics.cycles_total.get() - 3.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn same_id_in_both_families_is_tracked_separately() {
    let server = MockServer::start().await;
    let (mut monitor, _) = build_monitor(&server);

    mount_providers(&server, true, false).await;
    monitor.run_cycle(&[omaha(false)]).await;

    assert!(monitor.tracker().previous(ProviderFamily::HyVee, "L1"));
    assert!(!monitor.tracker().previous(ProviderFamily::Spotter, "L1"));
    // The Hy-Vee duplicate in the aggregator feed is never tracked.
    assert!(!monitor
        .tracker()
        .section(ProviderFamily::Spotter)
        .contains("hv-dup"));
}

#[tokio::test]
async fn provider_outage_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/my-pharmacy/api/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/states/NE.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (mut monitor, metrics) = build_monitor(&server);
    // Two areas share NE: the failed feed is cached as empty, not retried.
    let report = monitor.run_cycle(&[omaha(false), omaha(true)]).await;

    assert_eq!(report.areas_checked, 2);
    assert_eq!(report.provider_failures, 3);
    assert_eq!(report.notifications_sent, 0);
    assert!(monitor.tracker().section(ProviderFamily::HyVee).is_empty());
    assert!(monitor.tracker().section(ProviderFamily::Spotter).is_empty());

    let hyvee_errors = metrics
        .provider_errors_total
        .with_label_values(&["hyvee"])
        .get();
    assert!((hyvee_errors - 2.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_mode_posts_stand_in_without_marking_it_available() {
    let server = MockServer::start().await;
    mount_providers(&server, false, false).await;
    let (mut monitor, _) = build_monitor(&server);

    let report = monitor.run_cycle(&[omaha(true)]).await;

    assert_eq!(report.newly_available, 0);
    assert_eq!(report.notifications_sent, 1);
    assert_eq!(slack_posts(&server).await.len(), 1);
    assert!(!monitor.tracker().previous(ProviderFamily::HyVee, "L1"));
    assert!(!monitor.tracker().previous(ProviderFamily::Spotter, "L1"));
}

#[tokio::test]
async fn slack_rejection_is_logged_and_cycle_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/my-pharmacy/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string(hyvee_body(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ok": false, "error": "channel_not_found"}"#),
        )
        .mount(&server)
        .await;

    let (mut monitor, metrics) = build_monitor(&server);
    let report = monitor.run_cycle(&[omaha(false)]).await;

    assert_eq!(report.notification_failures, 1);
    assert!(monitor.tracker().previous(ProviderFamily::HyVee, "L1"));
    assert!((metrics.notification_errors_total.get() - 1.0).abs() < f64::EPSILON);
}
