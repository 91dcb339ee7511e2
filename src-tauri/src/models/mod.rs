pub mod ai;
pub mod filter;
pub mod news;
pub mod settings;
