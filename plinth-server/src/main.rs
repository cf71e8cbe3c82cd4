use std::sync::Arc;

use plinth_server::http::auth::BearerAuthenticator;
use plinth_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    plinth_server::trace::init_tracing(std::env::var("PLINTH_DEBUG").is_ok())?;

    let config = ServerConfig::from_env();

    let token = std::env::var("PLINTH_API_TOKEN").unwrap_or_else(|_| {
        tracing::warn!("PLINTH_API_TOKEN not set; using insecure dev default");
        "dev-token".to_string()
    });

    run_server(config, Arc::new(BearerAuthenticator::new(token))).await?;
    Ok(())
}
