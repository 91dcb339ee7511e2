//! Language tables.
//!
//! Every language-dependent string lives here, one `Locale` per language. The prompt
//! builder and the normalizer only ever read from a `Locale`, so the Spanish and English
//! variants share the same template structure.

use serde::Serialize;

use crate::models::filter::{Category, Country, Language, TimeRange};

/// 界面可见的两条错误提示
pub struct Messages {
    pub fetch_failed: &'static str,
    pub parse_failed: &'static str,
}

/// 模型缺字段时的占位文本
pub struct Placeholders {
    pub title: &'static str,
    pub summary: &'static str,
    pub source: &'static str,
}

/// 提示词片段，`{name}` 占位符由 prompt_builder 填充
pub struct PromptStrings {
    /// {count} {category} {country} {window}
    pub task_standard: &'static str,
    /// {count} {country} {window}
    pub task_custom: &'static str,
    /// {goal} {country}
    pub custom_goal: &'static str,
    /// {start} {end} {phrase}
    pub window: &'static str,
    /// {start}
    pub strict_window: &'static str,
    pub format_header: &'static str,
    pub analysis_field: &'static str,
    pub items_field: &'static str,
    pub item_id: &'static str,
    pub item_title: &'static str,
    pub item_source: &'static str,
    pub item_summary: &'static str,
    pub item_sentiment: &'static str,
    pub item_risk_score: &'static str,
    pub item_url: &'static str,
    pub item_published_at: &'static str,
    pub format_footer: &'static str,
}

pub struct Locale {
    pub language: Language,
    pub system_instruction: &'static str,
    pub messages: Messages,
    pub placeholders: Placeholders,
    pub prompt: PromptStrings,
    /// 按 `Country::ALL` 顺序
    country_names: [&'static str; 8],
    country_labels: [&'static str; 8],
    /// 按 `Category::ALL` 顺序
    category_names: [&'static str; 6],
    /// 按 `TimeRange::ALL` 顺序
    time_range_phrases: [&'static str; 4],
}

static ES: Locale = Locale {
    language: Language::Es,
    system_instruction: "Eres un analista financiero senior de \"MarketPulse\". Tu trabajo es identificar riesgos y oportunidades en el mercado basándote en noticias recientes verificadas con búsqueda web.\nAnaliza con objetividad y brevedad. Responde siempre en español.",
    messages: Messages {
        fetch_failed: "No se pudieron obtener los datos del mercado. Por favor intenta de nuevo.",
        parse_failed: "Error al procesar los datos del mercado. Por favor intenta de nuevo.",
    },
    placeholders: Placeholders {
        title: "Noticia sin título",
        summary: "Sin resumen disponible.",
        source: "Fuente desconocida",
    },
    prompt: PromptStrings {
        task_standard: "Busca las {count} noticias más importantes y recientes sobre \"{category}\" en {country}, publicadas {window}.",
        task_custom: "Busca las {count} noticias más relevantes para el objetivo del usuario en {country}, publicadas {window}.",
        custom_goal: "Objetivo del usuario: \"{goal}\".\nAntes de buscar, deduce a partir de este objetivo los términos de búsqueda más relevantes (empresas, sectores, indicadores, regulaciones) y úsalos para buscar noticias en {country}. Prioriza las noticias con impacto directo en ese objetivo.",
        window: "entre el {start} y el {end} ({phrase})",
        strict_window: "Criterio estricto de fechas: descarta cualquier noticia publicada antes del {start}. Si no encuentras suficientes noticias dentro de este rango, devuelve menos elementos en lugar de incluir noticias antiguas.",
        format_header: "FORMATO DE SALIDA (obligatorio): responde con un único objeto JSON crudo con exactamente dos claves:",
        analysis_field: "análisis estratégico breve en español (2 a 3 frases) que resuma las oportunidades y los riesgos principales.",
        items_field: "array JSON de noticias. Cada objeto debe tener:",
        item_id: "un string único.",
        item_title: "título de la noticia.",
        item_source: "nombre de la fuente (ej. Bloomberg, El Financiero).",
        item_summary: "resumen conciso en español (máx. 20 palabras).",
        item_sentiment: "\"positive\" (oportunidad/crecimiento), \"negative\" (riesgo/caída) o \"neutral\".",
        item_risk_score: "número entero del 1 (muy bajo riesgo) al 10 (crisis/alto riesgo).",
        item_url: "enlace a la fuente si está disponible en el contexto.",
        item_published_at: "fecha de publicación en formato AAAA-MM-DD si se conoce.",
        format_footer: "No uses Markdown ni bloques de código (```), y no agregues texto antes ni después. Retorna SOLAMENTE el objeto JSON crudo.",
    },
    country_names: [
        "el mundo (enfoque internacional)",
        "México",
        "Estados Unidos",
        "España",
        "Argentina",
        "Colombia",
        "Chile",
        "Brasil",
    ],
    country_labels: [
        "Global (Int)",
        "México (MX)",
        "Estados Unidos (US)",
        "España (ES)",
        "Argentina (AR)",
        "Colombia (CO)",
        "Chile (CL)",
        "Brasil (BR)",
    ],
    category_names: [
        "General",
        "Negocios",
        "Finanzas",
        "Tecnología",
        "Energía",
        "Bienes raíces",
    ],
    time_range_phrases: [
        "últimas 24 horas",
        "últimos 3 días",
        "últimos 7 días",
        "últimos 30 días",
    ],
};

static EN: Locale = Locale {
    language: Language::En,
    system_instruction: "You are a senior financial analyst at \"MarketPulse\". Your job is to identify market risks and opportunities based on recent news verified through web search.\nBe objective and concise. Always answer in English.",
    messages: Messages {
        fetch_failed: "Could not fetch market data. Please try again.",
        parse_failed: "Error processing market data. Please try again.",
    },
    placeholders: Placeholders {
        title: "Untitled news",
        summary: "No summary available.",
        source: "Unknown source",
    },
    prompt: PromptStrings {
        task_standard: "Find the {count} most important recent news stories about \"{category}\" in {country}, published {window}.",
        task_custom: "Find the {count} news stories most relevant to the user's goal in {country}, published {window}.",
        custom_goal: "User goal: \"{goal}\".\nBefore searching, infer from this goal the most relevant search terms (companies, sectors, indicators, regulations) and use them to search for news in {country}. Prioritize stories with a direct impact on that goal.",
        window: "between {start} and {end} ({phrase})",
        strict_window: "Strict date rule: discard any story published before {start}. If there are not enough stories inside this range, return fewer items instead of including older news.",
        format_header: "OUTPUT FORMAT (mandatory): reply with a single raw JSON object with exactly two keys:",
        analysis_field: "a short strategic analysis in English (2 to 3 sentences) summarizing the main opportunities and risks.",
        items_field: "a JSON array of news items. Each object must have:",
        item_id: "a unique string.",
        item_title: "the headline.",
        item_source: "name of the outlet (e.g. Bloomberg, Reuters).",
        item_summary: "a concise summary in English (max 20 words).",
        item_sentiment: "\"positive\" (opportunity/growth), \"negative\" (risk/decline) or \"neutral\".",
        item_risk_score: "an integer from 1 (very low risk) to 10 (crisis/high risk).",
        item_url: "link to the source if available in the context.",
        item_published_at: "publication date as YYYY-MM-DD if known.",
        format_footer: "Do not use Markdown or code fences (```), and do not add any text before or after. Return ONLY the raw JSON object.",
    },
    country_names: [
        "the world (international focus)",
        "Mexico",
        "the United States",
        "Spain",
        "Argentina",
        "Colombia",
        "Chile",
        "Brazil",
    ],
    country_labels: [
        "Global (Int)",
        "Mexico (MX)",
        "United States (US)",
        "Spain (ES)",
        "Argentina (AR)",
        "Colombia (CO)",
        "Chile (CL)",
        "Brazil (BR)",
    ],
    category_names: [
        "General",
        "Business",
        "Finance",
        "Technology",
        "Energy",
        "Real estate",
    ],
    time_range_phrases: [
        "last 24 hours",
        "last 3 days",
        "last 7 days",
        "last 30 days",
    ],
};

impl Locale {
    pub fn for_language(language: Language) -> &'static Locale {
        match language {
            Language::Es => &ES,
            Language::En => &EN,
        }
    }

    pub fn country_name(&self, country: Country) -> &'static str {
        self.country_names[country as usize]
    }

    pub fn country_label(&self, country: Country) -> &'static str {
        self.country_labels[country as usize]
    }

    pub fn category_name(&self, category: Category) -> &'static str {
        self.category_names[category as usize]
    }

    pub fn time_range_phrase(&self, range: TimeRange) -> &'static str {
        self.time_range_phrases[range as usize]
    }
}

// ========== 下拉框选项 ==========

#[derive(Debug, Clone, Serialize)]
pub struct OptionLabel {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<OptionLabel>,
    pub categories: Vec<OptionLabel>,
    pub time_ranges: Vec<OptionLabel>,
}

pub fn filter_options(language: Language) -> FilterOptions {
    let locale = Locale::for_language(language);
    FilterOptions {
        countries: Country::ALL
            .iter()
            .map(|c| OptionLabel { value: c.code(), label: locale.country_label(*c) })
            .collect(),
        categories: Category::ALL
            .iter()
            .map(|c| OptionLabel { value: c.code(), label: locale.category_name(*c) })
            .collect(),
        time_ranges: TimeRange::ALL
            .iter()
            .map(|t| OptionLabel { value: t.code(), label: locale.time_range_phrase(*t) })
            .collect(),
    }
}
