use std::io;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handlers;
use crate::state::AppState;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::InvalidBody(err.to_string()).into())
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .route("/chat", web::post().to(handlers::chat::handler))
            .route("/health", web::get().to(handlers::health::handler))
            .route("/slots", web::post().to(handlers::slots::handler)),
    );
}

/// Frontend bundle at `/`. Must be registered after the API scope.
pub fn static_config(static_dir: PathBuf) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(Files::new("/", static_dir).index_file("index.html"));
    }
}

pub async fn run_server(config: &ServerConfig, state: AppState) -> io::Result<()> {
    let address = config.bind_address();
    let static_dir = config.static_dir.clone();
    let configured = state.backend.is_configured();
    let state = web::Data::new(state);

    log::info!("{}", "=".repeat(50));
    log::info!("CalyAI Server Starting...");
    log::info!("Server: http://{}", address);
    log::info!("Static files: {}", static_dir.display());
    log::info!(
        "API Status: {}",
        if configured { "Ready" } else { "Not configured" }
    );
    log::info!("{}", "=".repeat(50));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(app_config)
            .configure(static_config(static_dir.clone()))
    })
    .bind(&address)?
    .run()
    .await
}
