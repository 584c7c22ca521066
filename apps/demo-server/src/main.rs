//! # Lumen Demo Server
//!
//! Small inventory API wired with the Lumen request middlewares.

use actix_web::{App, HttpServer, dev::Service};
use lumen_web::{PanicRecoverer, RequestLogger};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod identity;
mod telemetry;

use config::AppConfig;
use telemetry::RequestRootSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    telemetry::init_telemetry(&config.telemetry);
    lumen_web::install_panic_hook();

    tracing::info!(
        "Starting Lumen demo server on {}:{}",
        config.host,
        config.port
    );

    // Registration order is innermost first: the recoverer encloses the logger.
    let result = HttpServer::new(|| {
        App::new()
            .wrap_fn(|req, srv| {
                identity::attach(&req);
                srv.call(req)
            })
            .wrap(RequestLogger::default())
            .wrap(PanicRecoverer::default())
            .wrap(TracingLogger::<RequestRootSpan>::new())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    telemetry::shutdown_telemetry();
    result
}
