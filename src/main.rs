use backend_blog::{app, config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,backend_blog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("🔥 {}", err);
            std::process::exit(1);
        }
    };

    let address = config.server_address();
    let upload_dir = config.upload_dir.clone();

    let app_state = match AppState::init(config).await {
        Ok(app_state) => {
            tracing::info!("✅ Connection to the database is successful!");
            app_state
        }
        Err(err) => {
            tracing::error!("🔥 Failed to initialize the application: {}", err);
            std::process::exit(1);
        }
    };

    tracing::info!(upload_dir = %upload_dir.display(), "Serving media");

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("🔥 Failed to bind to {}: {}", address, err);
            std::process::exit(1);
        }
    };
    tracing::info!("🌐 Listening on http://{}", address);

    if let Err(err) = axum::serve(listener, app(app_state)).await {
        tracing::error!("🔥 Server error: {}", err);
        std::process::exit(1);
    }
}
