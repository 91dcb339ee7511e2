use std::collections::HashSet;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::MarketError;
use crate::models::filter::Language;
use crate::models::news::{
    MarketResponse, NewsItem, Sentiment, DEFAULT_RISK_SCORE, MAX_RISK_SCORE, MIN_RISK_SCORE,
};
use crate::services::locale::Locale;

/// 模型回复的顶层结构
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReply {
    /// 旧格式：直接返回新闻数组
    Legacy(Vec<Value>),
    Digest(RawDigest),
}

#[derive(Debug, Default, Deserialize)]
struct RawDigest {
    #[serde(default, deserialize_with = "analysis_text")]
    analysis: Option<String>,
    #[serde(default)]
    items: Option<Value>,
}

/// 单条新闻的宽松读取：逐字段解析，坏字段只影响自己
#[derive(Debug, Default)]
struct RawNewsItem {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    source: Option<String>,
    sentiment: Option<String>,
    risk_score: Option<u8>,
    url: Option<String>,
    published_at: Option<String>,
}

impl RawNewsItem {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(&map),
            other => {
                log::debug!("News item is not an object, using defaults: {}", other);
                RawNewsItem::default()
            }
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        // 同一字段可能以 snake_case 和 camelCase 同时出现，取第一个可用值
        let text = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(text_value));
        RawNewsItem {
            id: text(&["id"]),
            title: text(&["title"]),
            summary: text(&["summary"]),
            source: text(&["source"]),
            sentiment: text(&["sentiment"]),
            risk_score: ["risk_score", "riskScore"]
                .iter()
                .find_map(|k| map.get(*k).and_then(score_value)),
            url: text(&["url"]),
            published_at: text(&["published_at", "publishedAt"]),
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// 字符串（去空白后非空）或数字；其他类型视为缺失
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 仅接受 JSON 数字，四舍五入并限制在 1..=10
fn score_value(value: &Value) -> Option<u8> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(MIN_RISK_SCORE as f64, MAX_RISK_SCORE as f64) as u8)
}

/// `analysis` 只接受字符串，数字等其他类型按空处理
fn analysis_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => non_blank(&s),
        _ => None,
    })
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("fence pattern is valid"))
}

/// 去掉 Markdown 代码块标记
pub fn strip_code_fences(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// 外层 `{...}` 与 `[...]` 片段，按起始位置先后排列
fn json_spans(text: &str) -> Vec<&str> {
    let mut spans: Vec<(usize, &str)> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| {
            let start = text.find(open)?;
            let end = text.rfind(close)?;
            (end > start).then(|| (start, &text[start..=end]))
        })
        .collect();
    spans.sort_by_key(|(start, _)| *start);
    spans.into_iter().map(|(_, span)| span).collect()
}

fn parse_reply(text: &str) -> Result<RawReply, MarketError> {
    let cleaned = strip_code_fences(text);
    if let Ok(reply) = serde_json::from_str::<RawReply>(&cleaned) {
        return Ok(reply);
    }
    // 模型偶尔会在 JSON 前后加说明文字，说明文字里也可能带括号
    for span in json_spans(&cleaned) {
        if let Ok(reply) = serde_json::from_str::<RawReply>(span) {
            return Ok(reply);
        }
    }
    Err(MarketError::MalformedResponse {
        raw: text.to_string(),
    })
}

fn http_url(candidate: &str) -> Option<String> {
    Url::parse(candidate)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|_| candidate.to_string())
}

fn unique_id(candidate: Option<String>, index: usize, seen: &mut HashSet<String>) -> String {
    let positional = format!("news-{}", index);
    let mut id = match candidate {
        Some(id) if !seen.contains(&id) => id,
        _ => positional.clone(),
    };
    let mut suffix = 1;
    while seen.contains(&id) {
        id = format!("{}-{}", positional, suffix);
        suffix += 1;
    }
    seen.insert(id.clone());
    id
}

/// 将模型原始回复归一化为 `MarketResponse`
///
/// `grounding_urls` 为搜索引用，按下标与条目对齐。
/// 只有顶层解析失败才返回错误，单条新闻的问题一律用默认值修复
pub fn normalize_reply(
    text: &str,
    grounding_urls: &[Option<String>],
    language: Language,
) -> Result<MarketResponse> {
    let reply = parse_reply(text).map_err(|e| {
        log::error!("Failed to parse JSON from model: {}", text);
        e
    })?;

    let (analysis, raw_items) = match reply {
        RawReply::Legacy(items) => (String::new(), items),
        RawReply::Digest(digest) => {
            let items = match digest.items {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    log::warn!("\"items\" is not an array, ignoring: {}", other);
                    Vec::new()
                }
                None => Vec::new(),
            };
            (digest.analysis.unwrap_or_default(), items)
        }
    };

    let placeholders = &Locale::for_language(language).placeholders;
    let mut seen = HashSet::with_capacity(raw_items.len());
    let mut recovered_urls = 0;

    let items = raw_items
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw = RawNewsItem::from_value(value);
            let url = match raw.url.as_deref().and_then(http_url) {
                Some(url) => Some(url),
                None => {
                    let grounded = grounding_urls
                        .get(index)
                        .and_then(|u| u.as_deref())
                        .and_then(http_url);
                    if grounded.is_some() {
                        recovered_urls += 1;
                    }
                    grounded
                }
            };

            NewsItem {
                id: unique_id(raw.id, index, &mut seen),
                title: raw.title.unwrap_or_else(|| placeholders.title.to_string()),
                summary: raw.summary.unwrap_or_else(|| placeholders.summary.to_string()),
                sentiment: raw
                    .sentiment
                    .as_deref()
                    .map(Sentiment::from_label)
                    .unwrap_or_default(),
                risk_score: raw.risk_score.unwrap_or(DEFAULT_RISK_SCORE),
                source: raw.source.unwrap_or_else(|| placeholders.source.to_string()),
                url,
                published_at: raw.published_at,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Normalized {} items ({} urls recovered from grounding)",
        items.len(),
        recovered_urls
    );

    Ok(MarketResponse { analysis, items })
}
