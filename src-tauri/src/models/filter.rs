use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// 区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    /// 国际视角
    #[default]
    #[serde(alias = "INT")]
    Int,
    #[serde(alias = "MX")]
    Mx,
    #[serde(alias = "US")]
    Us,
    #[serde(alias = "ES")]
    Es,
    #[serde(alias = "AR")]
    Ar,
    #[serde(alias = "CO")]
    Co,
    #[serde(alias = "CL")]
    Cl,
    #[serde(alias = "BR")]
    Br,
}

impl Country {
    pub const ALL: [Country; 8] = [
        Country::Int,
        Country::Mx,
        Country::Us,
        Country::Es,
        Country::Ar,
        Country::Co,
        Country::Cl,
        Country::Br,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Country::Int => "int",
            Country::Mx => "mx",
            Country::Us => "us",
            Country::Es => "es",
            Country::Ar => "ar",
            Country::Co => "co",
            Country::Cl => "cl",
            Country::Br => "br",
        }
    }
}

/// 主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "GENERAL")]
    General,
    #[default]
    #[serde(alias = "BUSINESS")]
    Business,
    #[serde(alias = "FINANCE")]
    Finance,
    #[serde(alias = "TECHNOLOGY")]
    Technology,
    #[serde(alias = "ENERGY")]
    Energy,
    #[serde(alias = "REAL_ESTATE")]
    RealEstate,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Business,
        Category::Finance,
        Category::Technology,
        Category::Energy,
        Category::RealEstate,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Finance => "finance",
            Category::Technology => "technology",
            Category::Energy => "energy",
            Category::RealEstate => "real_estate",
        }
    }
}

/// 时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    #[serde(rename = "last_24h", alias = "LAST_24H")]
    Last24h,
    #[serde(rename = "last_3d", alias = "LAST_3D")]
    Last3d,
    #[serde(rename = "last_7d", alias = "LAST_7D")]
    Last7d,
    #[serde(rename = "last_30d", alias = "LAST_30D")]
    Last30d,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Last24h,
        TimeRange::Last3d,
        TimeRange::Last7d,
        TimeRange::Last30d,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            TimeRange::Last24h => "last_24h",
            TimeRange::Last3d => "last_3d",
            TimeRange::Last7d => "last_7d",
            TimeRange::Last30d => "last_30d",
        }
    }

    /// 24h 窗口按"昨天..今天"处理
    pub fn days_back(&self) -> i64 {
        match self {
            TimeRange::Last24h => 1,
            TimeRange::Last3d => 3,
            TimeRange::Last7d => 7,
            TimeRange::Last30d => 30,
        }
    }

    /// 以 `today` 结尾的闭区间 `(start, end)`
    pub fn date_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(self.days_back()), today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    #[serde(alias = "STANDARD")]
    Standard,
    /// 由用户的自由文本目标推导搜索词
    #[serde(alias = "CUSTOM")]
    Custom,
}

/// 界面语言，同时决定提示词和占位文本的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "ES")]
    Es,
    #[serde(alias = "EN")]
    En,
}

/// 用户在界面上选择的查询参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterState {
    #[serde(default)]
    pub country: Country,
    #[serde(default)]
    pub category: Category,
    #[serde(default, alias = "timeRange")]
    pub time_range: TimeRange,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default, alias = "customQuery")]
    pub custom_query: String,
}

/// 界面发起的一次查询：筛选条件 + 回复语言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub filters: FilterState,
    pub language: Language,
}
