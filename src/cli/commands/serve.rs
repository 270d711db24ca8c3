use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, debug, trace, error};

use crate::config::{initialize_app_state_with_url, resolve_database_url};
use crate::router::create_router;
use crate::schemas::AppState;

pub async fn serve(database_url: Option<String>, bind_address: Option<String>) -> Result<()> {
    trace!("Entering serve function");
    info!("Roster application starting up");

    let database_url = resolve_database_url(database_url)?;

    trace!("Initializing application state");
    let state = match initialize_app_state_with_url(&database_url).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    run_server(state, bind_address).await
}

/// Binds the listener and serves the router until shutdown.
pub async fn run_server(state: AppState, bind_address: Option<String>) -> Result<()> {
    let bind_address = bind_address.unwrap_or_else(|| state.settings.bind_address.clone());

    trace!("Creating application router");
    let app = create_router(state);

    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Roster API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
