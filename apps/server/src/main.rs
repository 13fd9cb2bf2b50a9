use actix_web::{middleware, web, App, HttpServer};

use snapmail::config;
use snapmail::routes;
use snapmail::services::AlertPipeline;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Initializing alert handler...");

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    log::info!(
        "configuration: GRAFANA_URL={}, SNAPSHOT_STRATEGY={}, DASHBOARD_UID={}, SMTP_SERVER={}, SMTP_PORT={}, SENDER_EMAIL={}, RECIPIENT_EMAIL={}",
        config.grafana.url,
        config.grafana.strategy,
        config.grafana.dashboard_uid,
        config.smtp.host,
        config.smtp.port,
        config.smtp.sender,
        config.smtp.recipient
    );

    // Build the snapshot client and mailer once, shared by all workers
    let pipeline = AlertPipeline::from_config(&config).map_err(|e| {
        log::error!("Startup error: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    let pipeline = web::Data::new(pipeline);
    let config = web::Data::new(config);

    let host = config.host.clone();
    let port = config.port;

    log::info!("Starting server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(pipeline.clone())
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(routes::health::liveness))
            .configure(routes::alerts::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
