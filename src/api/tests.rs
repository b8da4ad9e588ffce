use super::*;
use crate::state::{ChatMessage, ChatRole};
use crate::test_http::serve_once;
use tokio::net::TcpListener;

fn client(base: &str) -> QuantClient {
    QuantClient::new(base, Duration::from_secs(5)).expect("client should build")
}

#[tokio::test]
async fn chat_posts_message_model_and_history() {
    let (base, server) = serve_once(200, r#"{"success": true, "response": "hello"}"#).await;

    let request = ChatRequest {
        message: "what is momentum?".to_string(),
        model: "qwen".to_string(),
        history: vec![ChatMessage::new(ChatRole::User, "what is momentum?")],
    };
    let reply = client(&base).chat(&request).await.expect("chat should succeed");
    assert_eq!(reply.success, Some(true));
    assert_eq!(reply.response.as_deref(), Some("hello"));

    let captured = server.await.unwrap().unwrap();
    assert_eq!(captured.request_line, "POST /llm/chat/simple HTTP/1.1");
    assert_eq!(
        captured.body,
        serde_json::json!({
            "message": "what is momentum?",
            "model": "qwen",
            "history": [{"role": "user", "content": "what is momentum?"}]
        })
    );
}

#[tokio::test]
async fn chat_failure_flag_is_returned_not_raised() {
    let (base, server) = serve_once(200, r#"{"success": false, "error": "bad key"}"#).await;
    let request = ChatRequest {
        message: "hi".to_string(),
        model: "deepseek".to_string(),
        history: Vec::new(),
    };
    let reply = client(&base).chat(&request).await.expect("body should parse");
    assert_eq!(reply.success, Some(false));
    assert_eq!(reply.error.as_deref(), Some("bad key"));
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base, server) = serve_once(500, r#"{"detail": "boom"}"#).await;
    let request = StockAnalysisRequest {
        code: "600519".to_string(),
        period: 30,
        analysis_type: "technical".to_string(),
    };
    let err = client(&base).analyze_stock(&request).await.unwrap_err();
    assert!(err.to_string().contains("500"), "unexpected error: {err}");
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn analysis_tolerates_missing_indicators() {
    let (base, server) = serve_once(
        200,
        r#"{"code": "600519", "latest_price": 12.5, "change_pct": -1.25,
            "indicators": {"MA5": 12.1, "MA20": null},
            "signals": {"trend": "up"}}"#,
    )
    .await;
    let request = StockAnalysisRequest {
        code: "600519".to_string(),
        period: 30,
        analysis_type: "technical".to_string(),
    };
    let analysis = client(&base).analyze_stock(&request).await.unwrap();
    assert_eq!(analysis.code, "600519");
    assert_eq!(analysis.indicators.ma5, Some(12.1));
    assert_eq!(analysis.indicators.ma20, None);
    assert_eq!(analysis.indicators.rsi, None);
    assert_eq!(analysis.signals.trend.as_deref(), Some("up"));
    assert_eq!(analysis.signals.macd_signal, None);

    let captured = server.await.unwrap().unwrap();
    assert_eq!(captured.request_line, "POST /analysis/stock HTTP/1.1");
    assert_eq!(
        captured.body,
        serde_json::json!({"code": "600519", "period": 30, "analysis_type": "technical"})
    );
}

#[tokio::test]
async fn chart_sends_series_and_metadata() {
    let (base, server) = serve_once(200, r#"{"success": true, "image": "data:image/png;base64,AAAA"}"#).await;
    let request = ChartRequest {
        data: vec![ChartPoint { x: 0, y: 50.5 }, ChartPoint { x: 1, y: 51.0 }],
        chart_type: "line".to_string(),
        title: "Data Analysis Chart".to_string(),
        x_label: "Time".to_string(),
        y_label: "Value".to_string(),
    };
    let image = client(&base).render_chart(&request).await.unwrap();
    assert_eq!(image.image, "data:image/png;base64,AAAA");

    let captured = server.await.unwrap().unwrap();
    assert_eq!(captured.request_line, "POST /analysis/chart HTTP/1.1");
    assert_eq!(captured.body["chart_type"], "line");
    assert_eq!(captured.body["data"][1]["x"], 1);
    assert_eq!(captured.body["data"][1]["y"], 51.0);
}

#[tokio::test]
async fn market_overview_requires_all_three_lists() {
    let (base, server) = serve_once(200, r#"{"indices": [], "sectors": []}"#).await;
    assert!(client(&base).market_overview().await.is_err());
    let captured = server.await.unwrap().unwrap();
    assert_eq!(captured.request_line, "GET /analysis/market_overview HTTP/1.1");
}

#[tokio::test]
async fn market_overview_parses_snapshot() {
    let (base, server) = serve_once(
        200,
        r#"{"success": true, "market_sentiment": "neutral",
            "indices": [{"name": "SSE Composite", "code": "000001.SH", "price": 3089.26, "change": -0.52, "volume": "289B"}],
            "sectors": [{"name": "Banks", "change": 1.23, "leader": "CMB"}],
            "hot_stocks": [{"name": "BYD", "code": "002594.SZ", "price": 258.32, "change": 3.45}]}"#,
    )
    .await;
    let snapshot = client(&base).market_overview().await.unwrap();
    assert_eq!(snapshot.indices.len(), 1);
    assert_eq!(snapshot.sectors[0].leader, "CMB");
    assert_eq!(snapshot.hot_stocks[0].change, 3.45);
    assert_eq!(snapshot.market_sentiment.as_deref(), Some("neutral"));
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn switch_model_posts_model_type() {
    let (base, server) = serve_once(200, r#"{"success": true}"#).await;
    client(&base).switch_model(ModelId::QwenCoder).await.unwrap();
    let captured = server.await.unwrap().unwrap();
    assert_eq!(captured.request_line, "POST /llm/switch_model HTTP/1.1");
    assert_eq!(captured.body, serde_json::json!({"model_type": "qwen_coder"}));
}

#[tokio::test]
async fn status_is_connected_on_any_2xx() {
    let (base, server) = serve_once(202, "{}").await;
    client(&base).status().await.unwrap();
    let captured = server.await.unwrap().unwrap();
    assert_eq!(captured.request_line, "GET /api/status HTTP/1.1");

    let (base, server) = serve_once(503, "").await;
    assert!(client(&base).status().await.is_err());
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn unreachable_server_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    assert!(client(&format!("http://{}", addr)).status().await.is_err());
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let client = client("http://127.0.0.1:8111/");
    assert_eq!(client.base_url(), "http://127.0.0.1:8111");
    assert_eq!(client.url("/api/status"), "http://127.0.0.1:8111/api/status");
}
