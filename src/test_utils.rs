#[cfg(test)]
pub mod test_utils {
    use crate::config::{DEFAULT_BIND_ADDRESS, Settings};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Settings that accept any host
    pub fn test_settings() -> Settings {
        Settings {
            debug: false,
            allowed_hosts: vec!["*".to_string()],
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        setup_test_app_state_with(test_settings()).await
    }

    pub async fn setup_test_app_state_with(settings: Settings) -> AppState {
        let db = setup_test_db().await;
        AppState { db, settings }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is read from RUST_LOG and defaults to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        setup_test_app_with(test_settings()).await
    }

    /// Create axum app with custom settings, e.g. a restricted host list
    pub async fn setup_test_app_with(settings: Settings) -> Router {
        let _guard = init_test_tracing();

        let state = setup_test_app_state_with(settings).await;
        create_router(state)
    }
}
