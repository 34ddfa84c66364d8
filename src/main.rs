use actix_web::{web::Data, App, HttpServer};
use epsilon_greedy::{api::routes::configure, config::AppConfig, repository::Repository};
use tokio::sync::RwLock;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!(
        host = %config.server.host,
        port = config.server.port,
        default_epsilon = config.bandit.default_epsilon,
        "Starting server"
    );

    let repository = Data::new(RwLock::new(Repository::new(config.bandit)));

    HttpServer::new(move || {
        App::new()
            .app_data(repository.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .bind((config.server.host, config.server.port))?
    .run()
    .await
}
