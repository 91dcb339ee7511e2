pub mod models;
pub mod services;
pub mod commands;
pub mod error;
pub mod utils;

use models::settings::AppSettings;
use services::ai_service::GeminiClient;
use services::market_service::QueryTracker;
use tauri::Manager;

pub struct AppState {
    pub gemini: GeminiClient,
    pub tracker: QueryTracker,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let log_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log_level)
                .build(),
        )
        .plugin(tauri_plugin_shell::init())
        .setup(|app| {
            let settings = AppSettings::from_env()?;
            log::info!(
                "MarketPulse starting: model={} base_url={}",
                settings.ai.model_name,
                settings.ai.base_url
            );

            let gemini = GeminiClient::new(settings.ai)?;
            app.manage(AppState {
                gemini,
                tracker: QueryTracker::new(),
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::market_cmd::run_query,
            commands::market_cmd::get_query_state,
            commands::market_cmd::get_filter_options,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
