use anyhow::Result;
use corpusqa_core::config::Settings;
use corpusqa_server::routes::router;
use corpusqa_server::startup;
use corpusqa_server::state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug,info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    let state = AppState::new(&settings.chat_model);

    // Index in the background so the HTTP surface is live immediately.
    tokio::spawn(startup::initialize(settings.clone(), state.clone()));

    let app = router(state);
    let listener = TcpListener::bind(&settings.address).await?;
    tracing::info!("listening on {}", settings.address);
    axum::serve(listener, app).await?;

    Ok(())
}
