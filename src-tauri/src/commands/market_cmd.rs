use tauri::State;

use crate::models::filter::{
    Category, Country, FilterState, Language, QueryRequest, SearchMode, TimeRange,
};
use crate::models::news::MarketResponse;
use crate::services::locale::{self, FilterOptions};
use crate::services::market_service::{self, QueryState};
use crate::AppState;

/// 运行一次市场新闻分析
///
/// Resolves `null` when a newer query was started before this one finished.
#[tauri::command]
pub async fn run_query(
    state: State<'_, AppState>,
    country: Country,
    category: Category,
    time_range: TimeRange,
    language: Language,
    mode: SearchMode,
    custom_query: Option<String>,
) -> Result<Option<MarketResponse>, String> {
    let request = QueryRequest {
        filters: FilterState {
            country,
            category,
            time_range,
            mode,
            custom_query: custom_query.unwrap_or_default(),
        },
        language,
    };
    let today = chrono::Local::now().date_naive();
    market_service::run_tracked_query(&state.gemini, &state.tracker, &request, today).await
}

#[tauri::command]
pub fn get_query_state(state: State<'_, AppState>) -> QueryState {
    state.tracker.snapshot()
}

/// 下拉框的本地化标签
#[tauri::command]
pub fn get_filter_options(language: Language) -> FilterOptions {
    locale::filter_options(language)
}
