use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::sync::Arc;

use describe_api::ai::{AiBackend, OpenAiClient};
use describe_api::config::{HandlerConfig, OpenAiConfig, TranscodeConfig};
use describe_api::config_loader;
use describe_api::handlers::{analyze_audio, authenticate, describe, AllowList};
use describe_api::transcode::AudioNormalizer;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Seed unset env vars from the optional config file
    config_loader::load_config();

    // Load configurations
    let handler_config = HandlerConfig::default();
    let openai_config = OpenAiConfig::default();
    let transcode_config = TranscodeConfig::default();
    let allow_list = AllowList::from_env();

    if openai_config.api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; calls to the AI provider will fail");
    }

    // Create upload directory if it doesn't exist
    if let Err(e) = handler_config.ensure_upload_dir() {
        warn!(
            "Failed to create upload directory {}: {}",
            handler_config.upload_dir, e
        );
    }

    let normalizer = AudioNormalizer::new(&transcode_config);
    let ai: Arc<dyn AiBackend> = Arc::new(OpenAiClient::new(openai_config));
    let ai_data = web::Data::from(ai);

    // Server settings
    let host = std::env::var("DESCRIBE_API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());

    info!("Starting description API server on http://{}:{}", host, port);
    info!("Using upload directory: {}", handler_config.upload_dir);
    info!("Transcoder command: {}", transcode_config.command_path);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(handler_config.clone()))
            .app_data(web::Data::new(allow_list.clone()))
            .app_data(web::Data::new(normalizer.clone()))
            .app_data(ai_data.clone())
            .service(describe)
            .service(analyze_audio)
            .service(authenticate)
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
