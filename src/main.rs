use staffing_core::{open_store, CoreConfig, StoreBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the staffing sheet service
///
/// Resolves configuration once, opens the configured record store and serves the REST API.
///
/// # Environment Variables
/// - `STAFFING_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `STAFFING_DATA_DIR`: Directory for the file store (default: "staffing_data")
/// - `STAFFING_STORE`: `file` or `memory` (default: "file")
/// - `STAFFING_MAX_BATCH_OPS`: Operations per store batch, 1 to 500 (default: 500)
/// - `STAFFING_AUTOSAVE_MS`: Auto-save quiet period in milliseconds (default: 1000)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("staffing=info".parse()?)
                .add_directive("staffing_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(
        std::env::var("STAFFING_DATA_DIR").ok(),
        std::env::var("STAFFING_STORE").ok(),
        std::env::var("STAFFING_MAX_BATCH_OPS").ok(),
        std::env::var("STAFFING_AUTOSAVE_MS").ok(),
    )?;
    let rest_addr =
        std::env::var("STAFFING_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    match cfg.store_backend() {
        StoreBackend::File => {
            tracing::info!("++ Using file store at {}", cfg.data_dir().display())
        }
        StoreBackend::Memory => tracing::warn!("++ Using in-memory store; nothing will persist"),
    }
    tracing::info!("++ Starting staffing REST on {}", rest_addr);

    let app = api_rest::router(open_store(&cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
