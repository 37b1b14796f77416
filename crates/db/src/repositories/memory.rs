use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clientele_core::customer::CustomerDao;
use clientele_core::domain::customer::{Customer, CustomerId, NewCustomer};
use clientele_core::errors::{ApplicationError, DomainError};

#[derive(Default)]
struct CustomerTable {
    last_id: i64,
    rows: BTreeMap<CustomerId, Customer>,
}

impl CustomerTable {
    fn email_owner(&self, email: &str) -> Option<CustomerId> {
        self.rows.values().find(|customer| customer.email == email).map(|customer| customer.id)
    }
}

/// Process-local customer store with the same uniqueness rules as the SQL table.
#[derive(Default)]
pub struct InMemoryCustomerDao {
    table: RwLock<CustomerTable>,
}

#[async_trait]
impl CustomerDao for InMemoryCustomerDao {
    async fn select_all_customers(&self) -> Result<Vec<Customer>, ApplicationError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn select_customer_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<Customer>, ApplicationError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn exists_customer_with_email(&self, email: &str) -> Result<bool, ApplicationError> {
        let table = self.table.read().await;
        Ok(table.email_owner(email).is_some())
    }

    async fn exists_customer_by_id(&self, id: CustomerId) -> Result<bool, ApplicationError> {
        let table = self.table.read().await;
        Ok(table.rows.contains_key(&id))
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, ApplicationError> {
        let mut table = self.table.write().await;
        if table.email_owner(&customer.email).is_some() {
            return Err(DomainError::email_taken().into());
        }

        table.last_id += 1;
        let stored = customer.with_id(CustomerId(table.last_id));
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_customer(&self, customer: Customer) -> Result<(), ApplicationError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&customer.id) {
            return Err(DomainError::customer_not_found(customer.id).into());
        }
        if table.email_owner(&customer.email).is_some_and(|owner| owner != customer.id) {
            return Err(DomainError::email_taken().into());
        }

        table.rows.insert(customer.id, customer);
        Ok(())
    }

    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), ApplicationError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id);
        Ok(())
    }
}
