use serde::{Deserialize, Serialize};

/// 新闻对市场的影响方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// 机会 / 增长
    Positive,
    /// 风险 / 下跌
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// 解析模型返回的情绪标签，无法识别时为 `Neutral`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" | "positivo" | "positiva" => Sentiment::Positive,
            "negative" | "negativo" | "negativa" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

pub const MIN_RISK_SCORE: u8 = 1;
pub const MAX_RISK_SCORE: u8 = 10;
pub const DEFAULT_RISK_SCORE: u8 = 5;

/// 统一的新闻条目（由模型回复归一化得到）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 批次内唯一
    pub id: String,
    pub title: String,
    pub summary: String,
    pub sentiment: Sentiment,
    /// 1 (very low risk) ..= 10 (crisis)
    pub risk_score: u8,
    /// 来源媒体
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// 单次查询的聚合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarketResponse {
    /// 战略分析摘要，可能为空
    pub analysis: String,
    pub items: Vec<NewsItem>,
}

impl MarketResponse {
    /// 机会 / 中性栏
    pub fn opportunities(&self) -> impl Iterator<Item = &NewsItem> {
        self.items
            .iter()
            .filter(|item| item.sentiment != Sentiment::Negative)
    }

    /// 风险栏
    pub fn risks(&self) -> impl Iterator<Item = &NewsItem> {
        self.items
            .iter()
            .filter(|item| item.sentiment == Sentiment::Negative)
    }
}
