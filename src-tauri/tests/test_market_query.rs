//! 查询流程集成测试：用固定回复替代 Gemini，不访问网络
//!
//!   cargo test --test test_market_query

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tokio::sync::Notify;

use app_lib::error::MarketError;
use app_lib::models::ai::{ModelReply, PromptPayload};
use app_lib::models::filter::{
    Category, Country, FilterState, Language, QueryRequest, SearchMode, TimeRange,
};
use app_lib::models::news::Sentiment;
use app_lib::services::ai_service::ContentGenerator;
use app_lib::services::locale::Locale;
use app_lib::services::market_service::{run_query, run_tracked_query, QueryState, QueryTracker};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn reply(text: &str) -> ModelReply {
    ModelReply {
        text: Some(text.to_string()),
        grounding_urls: vec![],
    }
}

fn request(filters: FilterState, language: Language) -> QueryRequest {
    QueryRequest { filters, language }
}

/// 返回固定回复，并记录收到的提示词
struct CannedGenerator {
    reply: ModelReply,
    prompts: Mutex<Vec<PromptPayload>>,
}

impl CannedGenerator {
    fn new(reply: ModelReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> PromptPayload {
        self.prompts.lock().unwrap().last().cloned().expect("generator was called")
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ContentGenerator for CannedGenerator {
    async fn generate(&self, payload: &PromptPayload) -> Result<ModelReply> {
        self.prompts.lock().unwrap().push(payload.clone());
        Ok(self.reply.clone())
    }
}

struct FailingGenerator;

impl ContentGenerator for FailingGenerator {
    async fn generate(&self, _payload: &PromptPayload) -> Result<ModelReply> {
        Err(anyhow!("Gemini API error (503 Service Unavailable): overloaded"))
    }
}

/// `gate` 被通知前不返回
struct GatedGenerator {
    gate: Notify,
    reply: ModelReply,
}

impl ContentGenerator for GatedGenerator {
    async fn generate(&self, _payload: &PromptPayload) -> Result<ModelReply> {
        self.gate.notified().await;
        Ok(self.reply.clone())
    }
}

// ==================== 端到端示例 ====================

#[tokio::test]
async fn test_mexico_finance_week_example() {
    let generator = CannedGenerator::new(reply(
        r#"{"analysis":"ok","items":[{"title":"A","sentiment":"positive"}]}"#,
    ));
    let req = request(
        FilterState {
            country: Country::Mx,
            category: Category::Finance,
            time_range: TimeRange::Last7d,
            mode: SearchMode::Standard,
            custom_query: String::new(),
        },
        Language::Es,
    );

    let resp = run_query(&generator, &req, today()).await.unwrap();

    let prompt = generator.last_prompt().prompt;
    assert!(prompt.contains("México"));
    assert!(prompt.contains("últimos 7 días"));
    assert!(prompt.contains("\"analysis\""));
    assert!(prompt.contains("\"items\""));

    let placeholders = &Locale::for_language(Language::Es).placeholders;
    assert_eq!(resp.analysis, "ok");
    assert_eq!(resp.items.len(), 1);
    let item = &resp.items[0];
    assert_eq!(item.title, "A");
    assert_eq!(item.risk_score, 5);
    assert_eq!(item.sentiment, Sentiment::Positive);
    assert_eq!(item.id, "news-0");
    assert_eq!(item.source, placeholders.source);
    assert_eq!(item.summary, placeholders.summary);
}

#[tokio::test]
async fn test_grounding_urls_fill_missing_links() {
    let generator = CannedGenerator::new(ModelReply {
        text: Some(
            "```json\n[{\"title\":\"A\"},{\"title\":\"B\",\"url\":\"https://b.example\"}]\n```"
                .to_string(),
        ),
        grounding_urls: vec![
            Some("https://vertexaisearch.example/a".to_string()),
            Some("https://vertexaisearch.example/b".to_string()),
        ],
    });
    let req = request(FilterState::default(), Language::En);

    let resp = run_query(&generator, &req, today()).await.unwrap();
    assert_eq!(resp.analysis, "");
    assert_eq!(resp.items[0].url.as_deref(), Some("https://vertexaisearch.example/a"));
    assert_eq!(resp.items[1].url.as_deref(), Some("https://b.example"));
}

#[tokio::test]
async fn test_custom_mode_prompt_carries_goal() {
    let generator = CannedGenerator::new(reply(r#"{"analysis":"","items":[]}"#));
    let req = request(
        FilterState {
            country: Country::Us,
            mode: SearchMode::Custom,
            custom_query: "supply chain risks for EV batteries".to_string(),
            ..Default::default()
        },
        Language::En,
    );

    run_query(&generator, &req, today()).await.unwrap();
    let prompt = generator.last_prompt().prompt;
    assert!(prompt.contains("User goal: \"supply chain risks for EV batteries\""));
    assert!(prompt.contains("infer from this goal"));
}

// ==================== 错误路径 ====================

#[tokio::test]
async fn test_empty_reply_is_empty_response() {
    for text in [None, Some("   ".to_string())] {
        let generator = CannedGenerator::new(ModelReply {
            text,
            grounding_urls: vec![],
        });
        let err = run_query(&generator, &request(FilterState::default(), Language::Es), today())
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<MarketError>(), Some(&MarketError::EmptyResponse));
    }
}

#[tokio::test]
async fn test_truncated_reply_is_malformed_not_partial() {
    let generator = CannedGenerator::new(reply(r#"{"analysis":"ok","items":[{"title":"A"},{"ti"#));
    let err = run_query(&generator, &request(FilterState::default(), Language::Es), today())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MarketError>(),
        Some(MarketError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn test_transport_error_propagates_unchanged() {
    let err = run_query(&FailingGenerator, &request(FilterState::default(), Language::Es), today())
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<MarketError>().is_none());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_invalid_custom_query_never_calls_model() {
    let generator = CannedGenerator::new(reply("[]"));
    let req = request(
        FilterState {
            mode: SearchMode::Custom,
            ..Default::default()
        },
        Language::Es,
    );
    let err = run_query(&generator, &req, today()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MarketError>(),
        Some(MarketError::InvalidQuery(_))
    ));
    assert_eq!(generator.calls(), 0);
}

// ==================== 状态跟踪 ====================

#[tokio::test]
async fn test_tracked_failure_uses_localized_messages() {
    let tracker = QueryTracker::new();
    let es = Locale::for_language(Language::Es);
    let en = Locale::for_language(Language::En);

    let err = run_tracked_query(
        &FailingGenerator,
        &tracker,
        &request(FilterState::default(), Language::Es),
        today(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, es.messages.fetch_failed);
    assert_eq!(
        tracker.snapshot(),
        QueryState::Failed { generation: 1, message: es.messages.fetch_failed.to_string() }
    );

    let malformed = CannedGenerator::new(reply("not json"));
    let err = run_tracked_query(
        &malformed,
        &tracker,
        &request(FilterState::default(), Language::En),
        today(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, en.messages.parse_failed);
}

#[tokio::test]
async fn test_tracked_success_updates_state() {
    let tracker = QueryTracker::new();
    let generator = CannedGenerator::new(reply(r#"{"analysis":"bien","items":[]}"#));

    let resp = run_tracked_query(
        &generator,
        &tracker,
        &request(FilterState::default(), Language::Es),
        today(),
    )
    .await
    .unwrap()
    .expect("latest query returns its result");
    assert_eq!(resp.analysis, "bien");
    assert!(!tracker.is_busy());
    assert!(matches!(tracker.snapshot(), QueryState::Success { generation: 1, .. }));
}

#[tokio::test]
async fn test_stale_reply_does_not_overwrite_newer_query() {
    let tracker = QueryTracker::new();
    let slow = GatedGenerator {
        gate: Notify::new(),
        reply: reply(r#"{"analysis":"viejo","items":[]}"#),
    };
    let fast = CannedGenerator::new(reply(r#"{"analysis":"nuevo","items":[]}"#));
    let req = request(FilterState::default(), Language::Es);

    let (first, second, _) = tokio::join!(
        run_tracked_query(&slow, &tracker, &req, today()),
        run_tracked_query(&fast, &tracker, &req, today()),
        async {
            tokio::task::yield_now().await;
            slow.gate.notify_one();
        }
    );

    assert_eq!(first, Ok(None));
    assert_eq!(second.unwrap().map(|r| r.analysis), Some("nuevo".to_string()));
    match tracker.snapshot() {
        QueryState::Success { generation, response } => {
            assert_eq!(generation, 2);
            assert_eq!(response.analysis, "nuevo");
        }
        other => panic!("unexpected state: {:?}", other),
    }
}
