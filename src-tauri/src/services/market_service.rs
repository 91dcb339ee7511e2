use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{user_message, MarketError};
use crate::models::filter::{QueryRequest, SearchMode};
use crate::models::news::MarketResponse;
use crate::services::ai_service::ContentGenerator;
use crate::services::prompt_builder::build_prompt;
use crate::services::response_normalizer::normalize_reply;

/// 构建提示词、调用模型、归一化回复
pub async fn run_query<G: ContentGenerator>(
    generator: &G,
    request: &QueryRequest,
    today: NaiveDate,
) -> Result<MarketResponse> {
    validate(request)?;

    let payload = build_prompt(&request.filters, request.language, today);
    log::debug!("Prompt:\n{}", payload.prompt);

    let reply = generator.generate(&payload).await?;
    let text = reply
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or(MarketError::EmptyResponse)?;

    normalize_reply(&text, &reply.grounding_urls, request.language)
}

fn validate(request: &QueryRequest) -> Result<(), MarketError> {
    let filters = &request.filters;
    if filters.mode == SearchMode::Custom && filters.custom_query.trim().is_empty() {
        return Err(MarketError::InvalidQuery(
            "custom mode requires a non-empty goal".to_string(),
        ));
    }
    Ok(())
}

// ========== 查询状态机 ==========

/// 查询状态：`Idle → Requesting → Success | Failed`，新查询回到 `Requesting`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryState {
    Idle,
    Requesting { generation: u64 },
    Success { generation: u64, response: MarketResponse },
    Failed { generation: u64, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// 跟踪最新一次查询，旧 generation 的结果直接丢弃，
/// 避免连续两次查询的结果乱序覆盖
pub struct QueryTracker {
    generation: AtomicU64,
    state: Mutex<QueryState>,
}

impl Default for QueryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryTracker {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: Mutex::new(QueryState::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 开始新查询，立即清除上一次的结果
    pub fn begin(&self) -> QueryTicket {
        let mut state = self.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *state = QueryState::Requesting { generation };
        QueryTicket { generation }
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// 记录查询结果；已有更新的查询时返回 `false`，状态不变
    pub fn finish(&self, ticket: QueryTicket, outcome: Result<MarketResponse, String>) -> bool {
        let mut state = self.lock();
        if !self.is_current(ticket) {
            log::info!(
                "Discarding stale result of query #{} (latest is #{})",
                ticket.generation,
                self.generation.load(Ordering::SeqCst)
            );
            return false;
        }
        let generation = ticket.generation;
        *state = match outcome {
            Ok(response) => QueryState::Success { generation, response },
            Err(message) => QueryState::Failed { generation, message },
        };
        true
    }

    pub fn snapshot(&self) -> QueryState {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        matches!(*self.lock(), QueryState::Requesting { .. })
    }
}

/// 在状态跟踪下执行一次查询
///
/// `Ok(Some(_))` 最新结果；`Ok(None)` 已被更新的查询取代；`Err` 为本地化错误提示
pub async fn run_tracked_query<G: ContentGenerator>(
    generator: &G,
    tracker: &QueryTracker,
    request: &QueryRequest,
    today: NaiveDate,
) -> Result<Option<MarketResponse>, String> {
    let ticket = tracker.begin();
    log::info!(
        "Query #{} started: {:?} lang={:?}",
        ticket.generation(),
        request.filters,
        request.language
    );

    let outcome = run_query(generator, request, today).await.map_err(|e| {
        log::error!("Query #{} failed: {:#}", ticket.generation(), e);
        user_message(&e, request.language)
    });

    if !tracker.finish(ticket, outcome.clone()) {
        return Ok(None);
    }
    outcome.map(Some)
}
