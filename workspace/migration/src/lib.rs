pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240601_000001_create_users::Migration)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};

    #[tokio::test]
    async fn test_up_and_down() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        Migrator::up(&db, None).await.expect("Migrations failed.");

        let row = db
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'",
            ))
            .await
            .unwrap();
        assert!(row.is_some());

        Migrator::down(&db, None).await.expect("Rollback failed.");

        let row = db
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'",
            ))
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_role_defaults_to_attendee() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.expect("Migrations failed.");

        db.execute_unprepared(
            "INSERT INTO users (email, username, password, date_joined) \
             VALUES ('a@example.com', 'a', '!x', '2024-06-01T00:00:00+00:00')",
        )
        .await
        .unwrap();

        let row = db
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT role, is_active, is_staff, is_superuser FROM users WHERE username = 'a'",
            ))
            .await
            .unwrap()
            .unwrap();

        let role: String = row.try_get("", "role").unwrap();
        let is_active: bool = row.try_get("", "is_active").unwrap();
        let is_staff: bool = row.try_get("", "is_staff").unwrap();
        let is_superuser: bool = row.try_get("", "is_superuser").unwrap();
        assert_eq!(role, "attendee");
        assert!(!is_active);
        assert!(!is_staff);
        assert!(!is_superuser);
    }

    #[tokio::test]
    async fn test_email_and_username_are_unique() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.expect("Migrations failed.");

        let insert = |email: &'static str, username: &'static str| {
            format!(
                "INSERT INTO users (email, username, password, date_joined) \
                 VALUES ('{email}', '{username}', '!x', '2024-06-01T00:00:00+00:00')"
            )
        };

        db.execute_unprepared(&insert("a@example.com", "a")).await.unwrap();
        assert!(db.execute_unprepared(&insert("a@example.com", "b")).await.is_err());
        assert!(db.execute_unprepared(&insert("b@example.com", "a")).await.is_err());
    }
}
