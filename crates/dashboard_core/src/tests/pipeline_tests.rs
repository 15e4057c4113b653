use super::*;
use anyhow::Result;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use shared::{
    domain::PageContext,
    protocol::{DashboardDataResponse, ScoreHistogramResponse},
};
use std::sync::Mutex as StdMutex;
use tokio::net::TcpListener;

use crate::{
    charts::HeadlessCharts,
    model::{DashboardMetrics, ScoreHistogram},
};

async fn spawn_server(app: Router) -> Result<DashboardHttp> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(DashboardHttp::new(&format!("http://{addr}"))?)
}

fn open_view() -> SharedView {
    PageView::with_targets(
        PageContext::Overview,
        HeadlessCharts::new(),
        ["students", "histogram"],
    )
    .into_shared()
}

fn metrics_task() -> FetchTask<DashboardDataResponse> {
    FetchTask::new("metrics", "/metrics").render_with(
        "students",
        |metrics: &DashboardMetrics, view: &mut PageView| {
            view.set_text("students", format!("{}", metrics.total_students));
        },
    )
}

fn histogram_task() -> FetchTask<ScoreHistogramResponse> {
    FetchTask::new("histogram", "/histogram").render_with(
        "histogram",
        |histogram: &ScoreHistogram, view: &mut PageView| {
            if let Some((labels, _)) = &histogram.bins {
                view.set_text("histogram", labels.join(","));
            }
        },
    )
}

#[tokio::test]
async fn failing_endpoint_does_not_block_its_sibling() {
    let app = Router::new()
        .route(
            "/metrics",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/histogram",
            get(|| async { Json(json!({ "labels": ["0-2", "2-4"], "counts": [1, 3] })) }),
        );
    let http = spawn_server(app).await.expect("spawn server");
    let view = open_view();

    let report = Pipeline::new("test")
        .task(metrics_task())
        .task(histogram_task())
        .run(&http, &view)
        .await;

    match report.outcome("metrics") {
        Some(TaskOutcome::Skipped { error, .. }) => {
            assert!(matches!(
                error,
                FetchError::Status { status, .. } if *status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
            ));
            assert_eq!(error.endpoint(), "/metrics");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(report.outcome("histogram").expect("histogram").is_rendered());
    assert!(!report.all_rendered());

    let view = view.lock().await;
    assert_eq!(view.text("students"), None);
    assert_eq!(view.text("histogram"), Some("0-2,2-4"));
}

#[tokio::test]
async fn malformed_body_skips_the_task() {
    let app = Router::new().route("/metrics", get(|| async { "{ not json" }));
    let http = spawn_server(app).await.expect("spawn server");
    let view = open_view();

    let report = Pipeline::new("test")
        .task(metrics_task())
        .run(&http, &view)
        .await;

    assert!(matches!(
        report.outcome("metrics"),
        Some(TaskOutcome::Skipped {
            error: FetchError::Malformed { .. },
            ..
        })
    ));
    assert_eq!(view.lock().await.text("students"), None);
}

#[tokio::test]
async fn unreachable_backend_skips_every_task() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let http = DashboardHttp::new(&format!("http://{addr}")).expect("url");
    let view = open_view();

    let report = Pipeline::new("test")
        .task(metrics_task())
        .task(histogram_task())
        .run(&http, &view)
        .await;

    assert_eq!(report.rendered().count(), 0);
    assert!(report
        .outcomes
        .iter()
        .all(|outcome| matches!(outcome, TaskOutcome::Skipped { error: FetchError::Transport { .. }, .. })));
}

#[tokio::test]
async fn missing_fields_render_as_defaults() {
    let app = Router::new().route("/metrics", get(|| async { Json(json!({})) }));
    let http = spawn_server(app).await.expect("spawn server");
    let view = open_view();

    let report = Pipeline::new("test")
        .task(metrics_task())
        .run(&http, &view)
        .await;

    assert!(report.all_rendered());
    assert_eq!(view.lock().await.text("students"), Some("0"));
}

#[tokio::test]
async fn renderers_run_in_registration_order() {
    let app = Router::new().route(
        "/metrics",
        get(|| async { Json(json!({ "total_students": 4 })) }),
    );
    let http = spawn_server(app).await.expect("spawn server");
    let view = open_view();
    let calls = Arc::new(StdMutex::new(Vec::new()));

    let task = ["first", "second", "third"].into_iter().fold(
        FetchTask::<DashboardDataResponse>::new("metrics", "/metrics"),
        |task, name| {
            let calls = Arc::clone(&calls);
            task.render_with(name, move |_, _| {
                calls.lock().expect("calls").push(name);
            })
        },
    );
    assert_eq!(task.renderer_names(), vec!["first", "second", "third"]);

    let report = Pipeline::new("test").task(task).run(&http, &view).await;

    match report.outcome("metrics") {
        Some(TaskOutcome::Rendered { renderers, .. }) => {
            assert_eq!(renderers, &vec!["first", "second", "third"]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(*calls.lock().expect("calls"), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn panicking_renderer_is_contained() {
    let app = Router::new()
        .route(
            "/metrics",
            get(|| async { Json(json!({ "total_students": 4 })) }),
        )
        .route(
            "/histogram",
            get(|| async { Json(json!({ "labels": ["a"], "counts": [1] })) }),
        );
    let http = spawn_server(app).await.expect("spawn server");
    let view = open_view();

    let exploding = FetchTask::<DashboardDataResponse>::new("metrics", "/metrics")
        .render_with("explode", |_, _| panic!("renderer blew up"));
    let pipeline = Pipeline::new("test").task(exploding).task(histogram_task());
    assert_eq!(pipeline.task_names(), vec!["metrics", "histogram"]);

    let report = pipeline.run(&http, &view).await;

    assert!(matches!(
        report.outcome("metrics"),
        Some(TaskOutcome::Panicked { task: "metrics" })
    ));
    assert_eq!(report.rendered().collect::<Vec<_>>(), vec!["histogram"]);
    assert_eq!(view.lock().await.text("histogram"), Some("a"));
}

#[tokio::test]
async fn report_keeps_declaration_order() {
    let app = Router::new()
        .route(
            "/metrics",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                Json(json!({}))
            }),
        )
        .route("/histogram", get(|| async { Json(json!({})) }));
    let http = spawn_server(app).await.expect("spawn server");
    let view = open_view();

    let report = Pipeline::new("test")
        .task(metrics_task())
        .task(histogram_task())
        .run(&http, &view)
        .await;

    let order: Vec<_> = report.outcomes.iter().map(TaskOutcome::task).collect();
    assert_eq!(order, vec!["metrics", "histogram"]);
}
