//! 面板状态机集成测试
//!
//! 覆盖前置检查、完整成功路径、错误路径与过滤/导出行为

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commentguard::detection::error::DetectionError;
use commentguard::panel::{
    CategoryFilter, PanelConfig, PanelController, PanelState, PanelVisibility,
};

mod common {
    include!("common/mod.rs");
}

use common::{analysis_json, classifier_for, StaticHost};

fn controller_with(host: StaticHost, server_uri: &str) -> PanelController<StaticHost> {
    PanelController::new(host, classifier_for(server_uri), PanelConfig::default())
}

#[tokio::test]
async fn test_wrong_page_fails_before_any_network_call() {
    let server = MockServer::start().await;

    // 前置检查不通过时绝不触碰网络
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let host = StaticHost::at_url("https://www.youtube.com/feed/subscriptions", &["hi"]);
    let mut controller = controller_with(host, &server.uri());

    controller.start_analysis().await;

    assert_eq!(
        controller.state(),
        &PanelState::Error {
            message: "Open a video watch page.".to_string()
        }
    );
}

#[tokio::test]
async fn test_no_active_tab_is_also_wrong_page() {
    let server = MockServer::start().await;
    let mut controller = controller_with(StaticHost::without_tab(), &server.uri());

    controller.start_analysis().await;

    assert_eq!(
        controller.error_message(),
        Some("Open a video watch page.")
    );
}

#[tokio::test]
async fn test_empty_extraction_reports_no_comments() {
    let server = MockServer::start().await;
    let mut controller = controller_with(StaticHost::on_watch_page(&[]), &server.uri());

    controller.start_analysis().await;

    assert_eq!(controller.error_message(), Some("No comments found."));
}

#[tokio::test]
async fn test_injection_failure_is_surfaced() {
    let server = MockServer::start().await;
    let mut host = StaticHost::on_watch_page(&["hi"]);
    host.extract_error = Some(DetectionError::Injection(
        "Cannot access this tab".to_string(),
    ));
    let mut controller = controller_with(host, &server.uri());

    controller.start_analysis().await;

    assert_eq!(controller.error_message(), Some("Cannot access this tab"));
}

#[tokio::test]
async fn test_successful_run_reaches_results_with_counts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_json(
            &["nice", "idiot", "thanks"],
            &[false, true, false],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let host = StaticHost::on_watch_page(&["nice", "idiot", "thanks"]);
    let mut controller = controller_with(host, &server.uri());

    controller.start_analysis().await;

    assert_eq!(controller.state(), &PanelState::Results);
    assert_eq!(
        controller.visibility(),
        PanelVisibility {
            initial: false,
            loading: false,
            error: false,
            results: true,
        }
    );

    let counts = controller.counts();
    assert_eq!(counts.all, 3);
    assert_eq!(counts.harassment, 1);
    assert_eq!(counts.safe, 2);
}

#[tokio::test]
async fn test_filter_changes_view_but_not_counts_or_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_json(
            &["a", "b", "c", "d"],
            &[true, false, true, false],
        )))
        .mount(&server)
        .await;

    let host = StaticHost::on_watch_page(&["a", "b", "c", "d"]);
    let mut controller = controller_with(host, &server.uri());
    controller.start_analysis().await;

    controller.set_filter(CategoryFilter::Harassment);
    let visible = controller.visible_predictions();
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|p| p.is_harassment));

    // 计数与存储结果不随过滤改变
    assert_eq!(controller.counts().all, 4);
    assert_eq!(controller.analysis().unwrap().predictions.len(), 4);

    controller.set_filter(CategoryFilter::Safe);
    assert_eq!(controller.visible_predictions().len(), 2);
    assert_eq!(controller.counts().all, 4);
}

#[tokio::test]
async fn test_retry_after_transient_failure_recovers() {
    let server = MockServer::start().await;

    // 第一次失败，第二次成功
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "Model not loaded" })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_json(&["hi"], &[false])))
        .mount(&server)
        .await;

    let host = StaticHost::on_watch_page(&["hi"]);
    let mut controller = controller_with(host, &server.uri());

    controller.start_analysis().await;
    assert_eq!(controller.error_message(), Some("Model not loaded"));

    controller.retry().await;
    assert_eq!(controller.state(), &PanelState::Results);
    assert_eq!(controller.counts().all, 1);
}

#[tokio::test]
async fn test_rerun_replaces_previous_results_wholesale() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(analysis_json(&["one", "two"], &[true, true])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_json(&["one"], &[false])))
        .mount(&server)
        .await;

    let mut host = StaticHost::on_watch_page(&["one", "two"]);
    host.comments = vec!["one".to_string(), "two".to_string()];
    let mut controller = controller_with(host, &server.uri());

    controller.start_analysis().await;
    assert_eq!(controller.counts().all, 2);

    controller.host_mut().comments = vec!["one".to_string()];
    controller.start_analysis().await;

    // 旧结果整体被替换，不残留
    assert_eq!(controller.counts().all, 1);
    assert!(!controller.analysis().unwrap().predictions[0].is_harassment);
}

#[tokio::test]
async fn test_reset_destroys_results_but_keeps_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_json(&["x"], &[true])))
        .mount(&server)
        .await;

    let mut controller =
        controller_with(StaticHost::on_watch_page(&["x"]), &server.uri());
    controller.start_analysis().await;
    controller.set_filter(CategoryFilter::Harassment);

    controller.reset();

    assert_eq!(controller.state(), &PanelState::Initial);
    assert!(controller.analysis().is_none());
    assert_eq!(controller.filter(), CategoryFilter::Harassment);
}

#[tokio::test]
async fn test_export_without_data_yields_toast() {
    let server = MockServer::start().await;
    let controller = controller_with(StaticHost::on_watch_page(&[]), &server.uri());

    let toast = controller.export_report().unwrap_err();
    assert_eq!(toast.message, "No data to copy");
    assert!(toast.is_error);
}

#[tokio::test]
async fn test_export_covers_full_set_regardless_of_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(analysis_json(&["good", "bad"], &[false, true])),
        )
        .mount(&server)
        .await;

    let mut controller =
        controller_with(StaticHost::on_watch_page(&["good", "bad"]), &server.uri());
    controller.start_analysis().await;
    controller.set_filter(CategoryFilter::Safe);

    let report = controller.export_report().unwrap();
    assert!(report.contains("Total: 2"));
    assert!(report.contains("\"good\""));
    assert!(report.contains("\"bad\""));
}

#[tokio::test]
async fn test_api_health_probe_is_cosmetic_and_boolean() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let controller = controller_with(StaticHost::on_watch_page(&[]), &server.uri());
    assert!(controller.check_api_health().await);
    // 探测结果不触发任何状态转移
    assert_eq!(controller.state(), &PanelState::Initial);
}

#[tokio::test]
async fn test_highlight_on_page_forwards_stored_predictions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_json(&["x"], &[true])))
        .mount(&server)
        .await;

    let mut controller =
        controller_with(StaticHost::on_watch_page(&["x"]), &server.uri());
    controller.start_analysis().await;

    controller.highlight_on_page().await.unwrap();
    controller.clear_page_highlights().await.unwrap();

    let host = controller.into_host();
    assert_eq!(host.highlighted.len(), 1);
    assert!(host.highlighted[0][0].is_harassment);
    assert_eq!(host.clear_calls, 1);
}
