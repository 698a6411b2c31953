use tokio::net::TcpListener;
use tracing::{info, warn};
use product_analyzer::{
    config::Config,
    api::routes::create_router,
    AppState,
};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "product_analyzer=info,tower_http=info".into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(model = %config.model, endpoint = %config.openrouter_base_url, "Configuration loaded");
    if !config.has_credential() {
        warn!("OPENROUTER_API_KEY is not set; analyze requests will fail with a configuration error");
    }

    // Create application state
    let app_state = AppState::from_config(config);

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr).await?;

    // Start the server
    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
