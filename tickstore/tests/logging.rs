use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rust_decimal::Decimal;
use tickstore::{LoggerConfig, Scalar, Ticker, TimeSeriesService, telemetry};
use tickstore_mock::{InMemoryBackend, MockBehavior, QueryShape, ScriptedBackend};
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capturing_dispatch(level: LevelFilter) -> (Dispatch, Captured) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (Dispatch::new(subscriber), captured)
}

#[tokio::test]
async fn push_logs_through_injected_dispatcher() {
    let (dispatch, logs) = capturing_dispatch(LevelFilter::DEBUG);
    let svc = TimeSeriesService::builder()
        .backend(Arc::new(InMemoryBackend::new()))
        .database("prices")
        .dispatch(dispatch)
        .build()
        .unwrap();
    svc.push_ticker("BTCUSD", &Ticker::new(Decimal::from_str("1.5").unwrap(), Utc::now()))
        .await
        .unwrap();

    let text = logs.text();
    assert!(text.contains(r#"add new "ticker" measurement"#), "{text}");
    assert!(text.contains("measurement added"), "{text}");
    assert!(text.contains("timeseries"), "{text}");
    assert!(text.contains("BTCUSD"), "{text}");
}

#[tokio::test]
async fn query_failures_are_logged_with_query_text() {
    let (dispatch, logs) = capturing_dispatch(LevelFilter::ERROR);
    let (backend, ctl) = ScriptedBackend::new_with_controller("scripted");
    ctl.set_query_behavior(
        QueryShape::Latest,
        MockBehavior::Return(vec![vec![Scalar::text("yesterday"), Scalar::number("x")]]),
    )
    .await;
    let svc = TimeSeriesService::builder()
        .backend(backend)
        .database("prices")
        .dispatch(dispatch)
        .build()
        .unwrap();

    assert!(svc.get_ticker("BTCUSD").await.is_err());
    let text = logs.text();
    assert!(text.contains("query failed"), "{text}");
    assert!(text.contains("SELECT LAST"), "{text}");
    assert!(text.contains("malformed row 0"), "{text}");
    // Debug events are filtered out at error level.
    assert!(!text.contains("executing query"), "{text}");
}

#[tokio::test]
async fn close_failure_is_logged() {
    let (dispatch, logs) = capturing_dispatch(LevelFilter::DEBUG);
    let (backend, ctl) = ScriptedBackend::new_with_controller("scripted");
    ctl.set_close_behavior(MockBehavior::Fail(tickstore::TickstoreError::backend(
        "scripted",
        "connection reset",
    )))
    .await;
    let svc = TimeSeriesService::builder()
        .backend(backend)
        .database("prices")
        .dispatch(dispatch)
        .build()
        .unwrap();
    svc.close().await;
    let text = logs.text();
    assert!(text.contains("cannot close connection"), "{text}");
    assert!(text.contains("connection reset"), "{text}");
}

#[tokio::test]
async fn separate_services_log_separately() {
    let (d1, logs1) = capturing_dispatch(LevelFilter::DEBUG);
    let (d2, logs2) = capturing_dispatch(LevelFilter::DEBUG);
    let build = |d: Dispatch| {
        TimeSeriesService::builder()
            .backend(Arc::new(InMemoryBackend::new()))
            .database("prices")
            .dispatch(d)
            .build()
            .unwrap()
    };
    let a = build(d1);
    let b = build(d2);
    a.push_ticker("AAA", &Ticker::new(Decimal::ONE, Utc::now()))
        .await
        .unwrap();
    b.push_ticker("BBB", &Ticker::new(Decimal::ONE, Utc::now()))
        .await
        .unwrap();
    assert!(logs1.text().contains("AAA") && !logs1.text().contains("BBB"));
    assert!(logs2.text().contains("BBB") && !logs2.text().contains("AAA"));
}

#[test]
fn level_names_map_to_filters() {
    assert_eq!(telemetry::level_filter("error"), LevelFilter::ERROR);
    assert_eq!(telemetry::level_filter("INFO"), LevelFilter::INFO);
    assert_eq!(telemetry::level_filter("debug"), LevelFilter::DEBUG);
    assert_eq!(telemetry::level_filter("verbose"), LevelFilter::DEBUG);
    assert_eq!(telemetry::level_filter(""), LevelFilter::DEBUG);
}

#[test]
fn dispatch_from_config_builds_a_scoped_subscriber() {
    let cfg = LoggerConfig {
        level: "info".into(),
        is_dev_mode: true,
    };
    let dispatch = telemetry::dispatch_from_config(&cfg);
    let enabled = tracing::dispatcher::with_default(&dispatch, || {
        tracing::info!("routed to the configured subscriber");
        tracing::enabled!(tracing::Level::INFO)
    });
    assert!(enabled);
}
