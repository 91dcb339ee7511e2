use chrono::NaiveDate;

use crate::models::ai::PromptPayload;
use crate::models::filter::{FilterState, Language, SearchMode};
use crate::services::locale::Locale;

/// 每次请求的新闻条数
pub const NEWS_COUNT: usize = 8;
/// 自定义目标的最大字符数
pub const MAX_GOAL_CHARS: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 构建一次查询的完整提示词（纯函数，`today` 由调用方传入）
pub fn build_prompt(filters: &FilterState, language: Language, today: NaiveDate) -> PromptPayload {
    let locale = Locale::for_language(language);
    let strings = &locale.prompt;

    let country = locale.country_name(filters.country);
    let (start, end) = filters.time_range.date_window(today);
    let start = start.format(DATE_FORMAT).to_string();
    let end = end.format(DATE_FORMAT).to_string();

    let window = fill(
        strings.window,
        &[
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("phrase", locale.time_range_phrase(filters.time_range)),
        ],
    );
    let count = NEWS_COUNT.to_string();

    let mut sections = Vec::with_capacity(4);
    match filters.mode {
        SearchMode::Standard => {
            sections.push(fill(
                strings.task_standard,
                &[
                    ("count", count.as_str()),
                    ("category", locale.category_name(filters.category)),
                    ("country", country),
                    ("window", window.as_str()),
                ],
            ));
        }
        SearchMode::Custom => {
            sections.push(fill(
                strings.task_custom,
                &[("count", count.as_str()), ("country", country), ("window", window.as_str())],
            ));
            let goal = sanitize_goal(&filters.custom_query);
            sections.push(fill(
                strings.custom_goal,
                &[("country", country), ("goal", goal.as_str())],
            ));
        }
    }
    sections.push(fill(strings.strict_window, &[("start", start.as_str())]));
    sections.push(output_format(locale));

    PromptPayload {
        system_instruction: locale.system_instruction.to_string(),
        prompt: sections.join("\n\n"),
    }
}

/// 输出格式要求：单个 JSON 对象，键为 `analysis` 和 `items`
fn output_format(locale: &Locale) -> String {
    let s = &locale.prompt;
    let item_fields = [
        ("id", s.item_id),
        ("title", s.item_title),
        ("source", s.item_source),
        ("summary", s.item_summary),
        ("sentiment", s.item_sentiment),
        ("risk_score", s.item_risk_score),
        ("url", s.item_url),
        ("published_at", s.item_published_at),
    ];

    let mut lines = vec![
        s.format_header.to_string(),
        format!("- \"analysis\": {}", s.analysis_field),
        format!("- \"items\": {}", s.items_field),
    ];
    for (key, description) in item_fields {
        lines.push(format!("  - \"{}\": {}", key, description));
    }
    lines.push(r#"{"analysis": "...", "items": [{"id": "...", "title": "...", "source": "...", "summary": "...", "sentiment": "neutral", "risk_score": 5, "url": "...", "published_at": "..."}]}"#.to_string());
    lines.push(s.format_footer.to_string());
    lines.join("\n")
}

/// 清理用户目标：合并空白、替换双引号、限制长度
fn sanitize_goal(goal: &str) -> String {
    goal.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('"', "'")
        .chars()
        .take(MAX_GOAL_CHARS)
        .collect()
}

fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}
