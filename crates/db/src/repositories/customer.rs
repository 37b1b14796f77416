use async_trait::async_trait;
use sqlx::Row;

use clientele_core::customer::CustomerDao;
use clientele_core::domain::customer::{Customer, CustomerId, NewCustomer};
use clientele_core::errors::{ApplicationError, DomainError};

use super::RepositoryError;
use crate::DbPool;

pub struct SqlCustomerDao {
    pool: DbPool,
}

impl SqlCustomerDao {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String =
        row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let age: i32 = row.try_get("age").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Customer { id: CustomerId(id), name, email, age })
}

#[async_trait]
impl CustomerDao for SqlCustomerDao {
    async fn select_all_customers(&self) -> Result<Vec<Customer>, ApplicationError> {
        let rows = sqlx::query("SELECT id, name, email, age FROM customer ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()?)
    }

    async fn select_customer_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<Customer>, ApplicationError> {
        let row = sqlx::query("SELECT id, name, email, age FROM customer WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn exists_customer_with_email(&self, email: &str) -> Result<bool, ApplicationError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(count > 0)
    }

    async fn exists_customer_by_id(&self, id: CustomerId) -> Result<bool, ApplicationError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer WHERE id = ?")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(count > 0)
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, ApplicationError> {
        let result = sqlx::query("INSERT INTO customer (name, email, age) VALUES (?, ?, ?)")
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(customer.age)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(customer.with_id(CustomerId(result.last_insert_rowid())))
    }

    async fn update_customer(&self, customer: Customer) -> Result<(), ApplicationError> {
        let result = sqlx::query("UPDATE customer SET name = ?, email = ?, age = ? WHERE id = ?")
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(customer.age)
            .bind(customer.id.0)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::customer_not_found(customer.id).into());
        }
        Ok(())
    }

    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), ApplicationError> {
        sqlx::query("DELETE FROM customer WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clientele_core::customer::{CustomerDao, CustomerService};
    use clientele_core::domain::customer::{
        Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, NewCustomer,
    };
    use clientele_core::errors::{ApplicationError, DomainError};
    use clientele_core::seed;

    use super::SqlCustomerDao;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> (DbPool, SqlCustomerDao) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        (pool.clone(), SqlCustomerDao::new(pool))
    }

    fn new_customer(name: &str, email: &str, age: i32) -> NewCustomer {
        NewCustomer { name: name.to_string(), email: email.to_string(), age }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_select_returns_rows_in_id_order() {
        let (pool, dao) = setup().await;

        let alex = dao.insert_customer(new_customer("Alex", "alex@gmail.com", 21)).await.expect("a");
        let jamila =
            dao.insert_customer(new_customer("Jamila", "jamila@gmail.com", 19)).await.expect("j");

        assert!(jamila.id > alex.id);
        let all = dao.select_all_customers().await.expect("select all");
        assert_eq!(all, vec![alex.clone(), jamila]);

        let found = dao.select_customer_by_id(alex.id).await.expect("select by id");
        assert_eq!(found, Some(alex));
        pool.close().await;
    }

    #[tokio::test]
    async fn existence_checks_reflect_stored_rows() {
        let (pool, dao) = setup().await;
        let alex = dao.insert_customer(new_customer("Alex", "alex@gmail.com", 21)).await.expect("a");

        assert!(dao.exists_customer_with_email("alex@gmail.com").await.expect("email check"));
        assert!(!dao.exists_customer_with_email("nobody@gmail.com").await.expect("email check"));
        assert!(dao.exists_customer_by_id(alex.id).await.expect("id check"));
        assert!(!dao.exists_customer_by_id(CustomerId(999)).await.expect("id check"));
        pool.close().await;
    }

    #[tokio::test]
    async fn update_and_delete_modify_the_stored_row() {
        let (pool, dao) = setup().await;
        let alex = dao.insert_customer(new_customer("Alex", "alex@gmail.com", 21)).await.expect("a");

        let renamed = Customer { name: "Alexandro".to_string(), age: 22, ..alex.clone() };
        dao.update_customer(renamed.clone()).await.expect("update");
        assert_eq!(dao.select_customer_by_id(alex.id).await.expect("select"), Some(renamed));

        dao.delete_customer_by_id(alex.id).await.expect("delete");
        assert_eq!(dao.select_customer_by_id(alex.id).await.expect("select"), None);
        pool.close().await;
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_not_found() {
        let (pool, dao) = setup().await;
        let ghost = Customer {
            id: CustomerId(42),
            name: "Ghost".to_string(),
            email: "ghost@gmail.com".to_string(),
            age: 40,
        };

        let error = dao.update_customer(ghost).await.expect_err("should fail");

        assert_eq!(error.to_string(), "customer with id [42] not found");
        pool.close().await;
    }

    #[tokio::test]
    async fn duplicate_email_insert_maps_to_duplicate_resource() {
        let (pool, dao) = setup().await;
        dao.insert_customer(new_customer("Alex", "alex@gmail.com", 21)).await.expect("a");

        let error = dao
            .insert_customer(new_customer("Alex Two", "alex@gmail.com", 30))
            .await
            .expect_err("should fail");

        assert_eq!(error, ApplicationError::Domain(DomainError::email_taken()));
        pool.close().await;
    }

    #[tokio::test]
    async fn service_round_trip_over_sqlite() {
        let (pool, dao) = setup().await;
        let service = CustomerService::new(Arc::new(dao));

        let created = service
            .add_customer(CustomerRegistrationRequest {
                name: "Alex".to_string(),
                email: "alex@gmail.com".to_string(),
                age: 21,
            })
            .await
            .expect("add");
        let updated = service
            .update_customer(
                created.id,
                CustomerUpdateRequest { age: Some(22), ..CustomerUpdateRequest::default() },
            )
            .await
            .expect("update");
        assert_eq!(updated.age, 22);
        assert_eq!(service.get_customer(created.id).await.expect("get"), updated);

        service.delete_customer_by_id(created.id).await.expect("delete");
        let error = service.get_customer(created.id).await.expect_err("gone");
        assert_eq!(error.to_string(), format!("customer with id [{}] not found", created.id));
        pool.close().await;
    }

    #[tokio::test]
    async fn reseeding_fixed_customers_skips_existing_emails() {
        let (pool, dao) = setup().await;
        let service = CustomerService::new(Arc::new(dao));

        let first =
            seed::seed_customers(&service, seed::fixed_customers()).await.expect("first seed");
        let second =
            seed::seed_customers(&service, seed::fixed_customers()).await.expect("second seed");

        assert_eq!((first.inserted, first.skipped), (2, 0));
        assert_eq!((second.inserted, second.skipped), (0, 2));
        assert_eq!(service.get_all_customers().await.expect("list").len(), 2);
        pool.close().await;
    }
}
