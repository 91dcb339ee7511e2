pub mod ai_service;
pub mod locale;
pub mod market_service;
pub mod prompt_builder;
pub mod response_normalizer;
