use anyhow::Result;
use model::entities::user;
use model::UserFields;
use sea_orm::{ConnectionTrait, Database};
use tracing::{error, info, trace};

use crate::config::resolve_database_url;

pub async fn create_superuser(
    email: &str,
    username: &str,
    password: &str,
    name: Option<String>,
    database_url: Option<String>,
) -> Result<()> {
    trace!("Entering create_superuser function");

    let database_url = resolve_database_url(database_url)?;
    let db = Database::connect(&database_url).await?;

    let admin = create_superuser_with(&db, email, username, password, name).await?;
    println!("Superuser '{}' created.", admin);
    Ok(())
}

pub async fn create_superuser_with<C: ConnectionTrait>(
    db: &C,
    email: &str,
    username: &str,
    password: &str,
    name: Option<String>,
) -> Result<user::Model> {
    let fields = UserFields {
        name,
        ..Default::default()
    };

    match user::Entity::objects()
        .create_superuser(db, email, username, password, fields)
        .await
    {
        Ok(admin) => {
            info!("Superuser created with ID: {}, email: {}", admin.id, admin.email);
            Ok(admin)
        }
        Err(e) => {
            error!("Failed to create superuser: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_superuser_command() {
        let db = setup_test_db().await;

        let admin = create_superuser_with(&db, "Root@Example.COM", "root", "toor", Some("Admin".to_string()))
            .await
            .unwrap();

        assert_eq!(admin.email, "Root@example.com");
        assert_eq!(admin.name.as_deref(), Some("Admin"));
        assert!(admin.is_superuser);
        assert!(admin.is_staff);
        assert!(admin.is_active);
        assert!(admin.check_password("toor").unwrap());
    }

    #[tokio::test]
    async fn test_create_superuser_command_missing_email() {
        let db = setup_test_db().await;

        let err = create_superuser_with(&db, "", "root", "toor", None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "You must provide an email address");
    }
}
