use anyhow::Result;
use tracing::{debug, error, info, trace};

use super::initdb::apply_migrations;
use super::serve::run_server;
use crate::config::{initialize_app_state_with_url, resolve_database_url};

pub async fn migrate_and_serve(
    database_url: Option<String>,
    bind_address: Option<String>,
) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

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

    apply_migrations(&state.db).await?;

    run_server(state, bind_address).await
}
