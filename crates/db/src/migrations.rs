use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    #[tokio::test]
    async fn migrations_create_customer_table() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let customer_count = sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = 'customer'",
        )
        .fetch_one(&pool)
        .await
        .expect("check customer table")
        .get::<i64, _>("count");

        assert_eq!(customer_count, 1);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .expect("count applied migrations");

        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn customer_email_is_unique_at_table_level() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        sqlx::query("INSERT INTO customer (name, email, age) VALUES ('Alex', 'alex@gmail.com', 21)")
            .execute(&pool)
            .await
            .expect("first insert");
        let duplicate = sqlx::query(
            "INSERT INTO customer (name, email, age) VALUES ('Other', 'alex@gmail.com', 30)",
        )
        .execute(&pool)
        .await;

        assert!(duplicate.is_err(), "second insert with the same email should fail");
    }
}
