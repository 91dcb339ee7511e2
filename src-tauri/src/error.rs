use std::fmt;

use crate::models::filter::Language;
use crate::services::locale::Locale;

/// 查询层自身产生的错误；网络错误保持为普通 `anyhow` 错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// 缺少 API 凭证
    MissingCredential(&'static str),
    /// 请求参数不合法（例如 custom 模式下目标为空）
    InvalidQuery(String),
    /// 模型没有返回任何文本
    EmptyResponse,
    /// 回复无法解析为 JSON；保留原文便于排查
    MalformedResponse { raw: String },
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::MissingCredential(var) => {
                write!(f, "missing API credential: set {} in the environment", var)
            }
            MarketError::InvalidQuery(reason) => write!(f, "invalid query: {}", reason),
            MarketError::EmptyResponse => write!(f, "no response text from AI"),
            MarketError::MalformedResponse { raw } => {
                let excerpt: String = raw.chars().take(200).collect();
                write!(f, "AI response is not valid JSON: {}", excerpt)
            }
        }
    }
}

impl std::error::Error for MarketError {}

/// 将查询错误映射为界面上的两条本地化提示之一
pub fn user_message(err: &anyhow::Error, language: Language) -> String {
    let locale = Locale::for_language(language);
    match err.downcast_ref::<MarketError>() {
        Some(MarketError::MalformedResponse { .. }) => locale.messages.parse_failed.to_string(),
        _ => locale.messages.fetch_failed.to_string(),
    }
}
