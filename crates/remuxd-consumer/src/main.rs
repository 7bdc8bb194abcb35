//! Remux task consumer binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use remuxd_consumer::{Consumer, Settings};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("remuxd_consumer=info".parse().unwrap())
        .add_directive("remuxd_media=info".parse().unwrap())
        .add_directive("remuxd_broker=info".parse().unwrap())
        .add_directive("lapin=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting remuxd consumer");

    // Load configuration
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if settings.paths.is_empty() {
        error!("No categories configured; nothing could ever be processed");
        std::process::exit(1);
    }
    info!(
        categories = settings.paths.len(),
        queue = %settings.queues.tasks,
        "Configuration loaded"
    );

    // Connect and establish topology
    let consumer = match Consumer::connect(settings).await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to start consumer: {}", e);
            std::process::exit(1);
        }
    };

    // Run until shutdown signal or connection loss. Reconnection is
    // the supervisor's job: exit nonzero and let it restart us.
    if let Err(e) = consumer.run().await {
        error!("Consumer terminated: {}", e);
        std::process::exit(1);
    }
}
