//! Intent classification and request building for submitted messages.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use crate::api::{ChartPoint, ChartRequest, ChatRequest, ChatResponse, StockAnalysisRequest};
use crate::models::ModelId;
use crate::state::ChatMessage;

pub const ANALYZE_COMMAND: &str = "/analyze";
pub const ANALYZE_MARKER: &str = "分析";
pub const CHART_COMMAND: &str = "/chart";
pub const CHART_MARKER: &str = "图表";

pub const DEFAULT_STOCK_CODE: &str = "000001";
pub const ANALYSIS_PERIOD: u32 = 30;
pub const ANALYSIS_TYPE: &str = "technical";

pub const CHART_TYPE: &str = "line";
pub const CHART_TITLE: &str = "Data Analysis Chart";
pub const CHART_X_LABEL: &str = "Time";
pub const CHART_Y_LABEL: &str = "Value";
pub const DEMO_SERIES_LEN: u32 = 30;

/// How many trailing messages travel with a chat request.
pub const HISTORY_LIMIT: usize = 10;

pub const NO_REPLY: &str = "Sorry, I did not receive a reply.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Chat,
    Analysis,
    Chart,
}

/// Analysis wins over chart when a message carries both markers.
pub fn classify(message: &str) -> Intent {
    if message.starts_with(ANALYZE_COMMAND) || message.contains(ANALYZE_MARKER) {
        Intent::Analysis
    } else if message.starts_with(CHART_COMMAND) || message.contains(CHART_MARKER) {
        Intent::Chart
    } else {
        Intent::Chat
    }
}

fn stock_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{6}").expect("stock code pattern is valid"))
}

/// First run of six ASCII digits, or [`DEFAULT_STOCK_CODE`].
pub fn extract_stock_code(message: &str) -> String {
    stock_code_pattern()
        .find(message)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_STOCK_CODE.to_string())
}

/// Last [`HISTORY_LIMIT`] messages, oldest first.
pub fn recent_history(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let start = messages.len().saturating_sub(HISTORY_LIMIT);
    messages[start..].to_vec()
}

pub fn chat_request(message: &str, model: ModelId, messages: &[ChatMessage]) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        model: model.as_str().to_string(),
        history: recent_history(messages),
    }
}

pub fn analysis_request(message: &str) -> StockAnalysisRequest {
    StockAnalysisRequest {
        code: extract_stock_code(message),
        period: ANALYSIS_PERIOD,
        analysis_type: ANALYSIS_TYPE.to_string(),
    }
}

/// Noisy sine wave used as placeholder chart data.
pub fn demo_series<R: Rng>(rng: &mut R) -> Vec<ChartPoint> {
    (0..DEMO_SERIES_LEN)
        .map(|i| {
            let noise: f64 = rng.gen_range(0.0..5.0);
            ChartPoint {
                x: i,
                y: (f64::from(i) / 5.0).sin() * 10.0 + noise + 50.0,
            }
        })
        .collect()
}

pub fn chart_request(data: Vec<ChartPoint>) -> ChartRequest {
    ChartRequest {
        data,
        chart_type: CHART_TYPE.to_string(),
        title: CHART_TITLE.to_string(),
        x_label: CHART_X_LABEL.to_string(),
        y_label: CHART_Y_LABEL.to_string(),
    }
}

/// Turn a chat reply into the assistant's message text.
pub fn reply_text(response: &ChatResponse) -> String {
    if response.success == Some(false) {
        let detail = non_empty(response.error.as_deref())
            .or_else(|| non_empty(response.message.as_deref()))
            .unwrap_or("call failed");
        return error_reply(detail);
    }

    if let Some(text) = non_empty(response.response.as_deref()) {
        return text.to_string();
    }

    match &response.data {
        Some(serde_json::Value::String(text)) if !text.is_empty() => text.clone(),
        Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
            NO_REPLY.to_string()
        }
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| NO_REPLY.to_string()),
    }
}

pub fn error_reply(detail: &str) -> String {
    format!(
        "❌ Error: {}\n\nPlease check:\n1. The LLM API key is configured correctly\n2. The network connection is working\n3. The API service is available",
        detail
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_classify_commands_and_markers() {
        assert_eq!(classify("/analyze 600519"), Intent::Analysis);
        assert_eq!(classify("请帮我分析一下贵州茅台"), Intent::Analysis);
        assert_eq!(classify("/chart 30-day trend"), Intent::Chart);
        assert_eq!(classify("生成一个图表"), Intent::Chart);
        assert_eq!(classify("what is a momentum factor?"), Intent::Chat);
    }

    #[test]
    fn test_command_must_be_a_prefix() {
        assert_eq!(classify("please /analyze this"), Intent::Chat);
        assert_eq!(classify("draw a /chart"), Intent::Chat);
    }

    #[test]
    fn test_analysis_takes_precedence_over_chart() {
        assert_eq!(classify("/chart 分析"), Intent::Analysis);
        assert_eq!(classify("图表分析"), Intent::Analysis);
    }

    #[test]
    fn test_extract_stock_code() {
        assert_eq!(extract_stock_code("/analyze 600519 technicals"), "600519");
        assert_eq!(extract_stock_code("compare 000858 and 600519"), "000858");
        assert_eq!(extract_stock_code("/analyze 12345"), DEFAULT_STOCK_CODE);
        assert_eq!(extract_stock_code("分析一下"), DEFAULT_STOCK_CODE);
        // A longer run still yields its first six digits.
        assert_eq!(extract_stock_code("1234567"), "123456");
    }

    #[test]
    fn test_extract_ignores_non_ascii_digits() {
        assert_eq!(extract_stock_code("٦٠٠٥١٩"), DEFAULT_STOCK_CODE);
    }

    #[test]
    fn test_analysis_request_uses_fixed_window() {
        let request = analysis_request("/analyze 300750");
        assert_eq!(request.code, "300750");
        assert_eq!(request.period, 30);
        assert_eq!(request.analysis_type, "technical");
    }

    #[test]
    fn test_recent_history_keeps_last_ten() {
        let messages: Vec<ChatMessage> = (0..13)
            .map(|i| ChatMessage::new(ChatRole::User, i.to_string()))
            .collect();
        let history = recent_history(&messages);
        assert_eq!(history.len(), 10);
        assert_eq!(history.first().unwrap().content, "3");
        assert_eq!(history.last().unwrap().content, "12");

        assert_eq!(recent_history(&messages[..2]).len(), 2);
        assert!(recent_history(&[]).is_empty());
    }

    #[test]
    fn test_demo_series_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = demo_series(&mut rng);
        assert_eq!(series.len(), 30);
        for (i, point) in series.iter().enumerate() {
            assert_eq!(point.x as usize, i);
            let base = (i as f64 / 5.0).sin() * 10.0 + 50.0;
            assert!(point.y >= base - 1e-9 && point.y <= base + 5.0, "point {i} out of band: {}", point.y);
        }
    }

    #[test]
    fn test_chart_request_metadata() {
        let request = chart_request(Vec::new());
        assert_eq!(request.chart_type, "line");
        assert_eq!(request.title, CHART_TITLE);
        assert_eq!(request.x_label, "Time");
        assert_eq!(request.y_label, "Value");
    }

    #[test]
    fn test_reply_failure_flag_shows_error_and_hints() {
        let response = ChatResponse {
            success: Some(false),
            error: Some("bad key".to_string()),
            ..Default::default()
        };
        let text = reply_text(&response);
        assert!(text.contains("bad key"));
        assert!(text.contains("API key"));
        assert!(text.contains("network"));
        assert!(text.contains("API service"));
    }

    #[test]
    fn test_reply_failure_falls_back_to_message_then_default() {
        let response = ChatResponse {
            success: Some(false),
            error: Some(String::new()),
            message: Some("quota exceeded".to_string()),
            ..Default::default()
        };
        assert!(reply_text(&response).contains("quota exceeded"));

        let response = ChatResponse {
            success: Some(false),
            ..Default::default()
        };
        assert!(reply_text(&response).contains("call failed"));
    }

    #[test]
    fn test_reply_uses_response_verbatim() {
        let response = ChatResponse {
            response: Some("hello".to_string()),
            ..Default::default()
        };
        assert_eq!(reply_text(&response), "hello");
    }

    #[test]
    fn test_reply_falls_back_to_data_then_default() {
        let response = ChatResponse {
            success: Some(true),
            response: Some(String::new()),
            data: Some(serde_json::json!("from data")),
            ..Default::default()
        };
        assert_eq!(reply_text(&response), "from data");

        let response = ChatResponse {
            data: Some(serde_json::json!({"answer": 42})),
            ..Default::default()
        };
        assert!(reply_text(&response).contains("\"answer\": 42"));

        assert_eq!(reply_text(&ChatResponse::default()), NO_REPLY);
    }
}
