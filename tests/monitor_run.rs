//! End-to-end tests for the monitor pipeline.
//!
//! Discovery is stubbed; the management and alerting endpoints are
//! wiremock servers. The liveness probe is stubbed except where the test
//! is about liveness itself.

use std::sync::Arc;

use tokio::sync::broadcast;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use maya_monitor::config::ConfigError;
use maya_monitor::monitor::{Disposition, Monitor};

mod common;
use common::{test_config, FixedProbe, StaticLookup};

const FAULTED_REPORT: &str = r#"[{"name":"g1","dbs":[{"is_master":1,"host":"10.0.0.5","port":3306,"working_status":{"error_code":1001,"error_desc":"replication lag"},"db_status":{}}]}]"#;
const HEALTHY_REPORT: &str = r#"[{"name":"g1","dbs":[{"is_master":1,"host":"10.0.0.5","port":3306,"working_status":{"error_code":0,"error_desc":"ok"},"db_status":{}}]}]"#;
const TWO_FAULT_REPORT: &str = r#"[{"name":"g1","dbs":[
    {"is_master":1,"host":"10.0.0.5","port":3306,"working_status":{"error_code":401,"error_desc":"DB_CONNECTION_ERROR"},"db_status":{}},
    {"is_master":0,"host":"10.0.0.6","port":3306,"working_status":{"error_code":302,"error_desc":"SLAVE_IO_ERROR"},"db_status":{}}]}]"#;

fn static_lookup() -> Arc<StaticLookup> {
    Arc::new(StaticLookup {
        hosts: vec!["127.0.0.1".to_string()],
    })
}

async fn mount_management(server: &MockServer, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_backend_fault_dispatches_one_alert() {
    let server = MockServer::start().await;
    mount_management(&server, FAULTED_REPORT, 1).await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .and(body_string_contains("10.0.0.5"))
        .and(body_string_contains("3306"))
        .and(body_string_contains("replication+lag"))
        .and(body_string_contains("Master"))
        .and(body_string_contains("grade=-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0 send OK"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    let monitor = Monitor::new(&config, static_lookup())
        .unwrap()
        .with_prober(Arc::new(FixedProbe { alive: true }));

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.alive, 1);
    assert_eq!(summary.alerts_dispatched, 1);
    assert_eq!(summary.dispatch_failures, 0);
    assert_eq!(
        summary.outcomes[0].disposition,
        Disposition::Evaluated {
            faults: 1,
            healthy: 0,
            empty_report: false,
        }
    );
}

#[tokio::test]
async fn test_management_down_skips_evaluation() {
    let server = MockServer::start().await;
    mount_management(&server, "curl: (7) couldn't connect to host", 1).await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .and(body_string_contains("management+failed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0 send OK"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    let monitor = Monitor::new(&config, static_lookup())
        .unwrap()
        .with_prober(Arc::new(FixedProbe { alive: true }));

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    assert_eq!(summary.alerts_dispatched, 1);
    assert!(matches!(
        summary.outcomes[0].disposition,
        Disposition::ManagementDown(_)
    ));
}

#[tokio::test]
async fn test_healthy_fleet_sends_no_alerts() {
    let server = MockServer::start().await;
    mount_management(&server, HEALTHY_REPORT, 1).await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    let monitor = Monitor::new(&config, static_lookup())
        .unwrap()
        .with_prober(Arc::new(FixedProbe { alive: true }));

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    assert_eq!(summary.alerts_dispatched, 0);
    assert_eq!(
        summary.outcomes[0].disposition,
        Disposition::Evaluated {
            faults: 0,
            healthy: 1,
            empty_report: false,
        }
    );
}

#[tokio::test]
async fn test_excluded_host_never_alerted() {
    let server = MockServer::start().await;
    mount_management(&server, FAULTED_REPORT, 1).await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    config.excluded_hosts = vec!["10.0.0.5".to_string()];
    let monitor = Monitor::new(&config, static_lookup())
        .unwrap()
        .with_prober(Arc::new(FixedProbe { alive: true }));

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    assert_eq!(summary.alerts_dispatched, 0);
    assert_eq!(
        summary.outcomes[0].disposition,
        Disposition::Evaluated {
            faults: 0,
            healthy: 0,
            empty_report: false,
        }
    );
}

#[tokio::test]
async fn test_dispatch_failure_does_not_abort_run() {
    let server = MockServer::start().await;
    mount_management(&server, TWO_FAULT_REPORT, 1).await;
    // the alerting endpoint is down for the whole run
    Mock::given(method("POST"))
        .and(path("/alert"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    let monitor = Monitor::new(&config, static_lookup())
        .unwrap()
        .with_prober(Arc::new(FixedProbe { alive: true }));

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    // both alerts attempted, both failed, run still completed
    assert_eq!(summary.alerts_dispatched, 0);
    assert_eq!(summary.dispatch_failures, 2);
    assert_eq!(
        summary.outcomes[0].disposition,
        Disposition::Evaluated {
            faults: 2,
            healthy: 0,
            empty_report: false,
        }
    );
}

#[tokio::test]
async fn test_dead_proxy_raises_liveness_alert_and_skips_fetch() {
    let server = MockServer::start().await;
    // management must never be queried for a dead proxy
    mount_management(&server, HEALTHY_REPORT, 0).await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .and(body_string_contains("conn"))
        .and(body_string_contains("failed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0 send OK"))
        .expect(1)
        .mount(&server)
        .await;

    // real prober against a liveness port nothing listens on
    let config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    let monitor = Monitor::new(&config, static_lookup()).unwrap();

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    assert_eq!(summary.alive, 0);
    assert_eq!(summary.alerts_dispatched, 1);
    assert_eq!(summary.outcomes[0].disposition, Disposition::NotAlive);
}

#[tokio::test]
async fn test_unparseable_report_warns_without_alerting() {
    let server = MockServer::start().await;
    mount_management(&server, "<html>boom</html>", 1).await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(server.address().port(), &format!("{}/alert", server.uri()));
    let monitor = Monitor::new(&config, static_lookup())
        .unwrap()
        .with_prober(Arc::new(FixedProbe { alive: true }));

    let (_tx, rx) = broadcast::channel(1);
    let summary = monitor.run(rx).await;

    assert_eq!(summary.alerts_dispatched, 0);
    assert!(matches!(
        summary.outcomes[0].disposition,
        Disposition::ReportUnparseable(_)
    ));
}

#[tokio::test]
async fn test_malformed_config_is_fatal_before_probing() {
    let mut config = test_config(23307, "http://127.0.0.1:1/alert");
    config.proxies = vec!["not-a-port:23307:user:pass".to_string()];

    let err = Monitor::new(&config, static_lookup()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[tokio::test]
async fn test_empty_proxy_list_is_fatal() {
    let mut config = test_config(23307, "http://127.0.0.1:1/alert");
    config.proxies.clear();

    let err = Monitor::new(&config, static_lookup()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}
