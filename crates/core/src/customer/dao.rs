use async_trait::async_trait;

use crate::domain::customer::{Customer, CustomerId, NewCustomer};
use crate::errors::ApplicationError;

/// Persistence port for customer records.
#[async_trait]
pub trait CustomerDao: Send + Sync {
    async fn select_all_customers(&self) -> Result<Vec<Customer>, ApplicationError>;

    async fn select_customer_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<Customer>, ApplicationError>;

    async fn exists_customer_with_email(&self, email: &str) -> Result<bool, ApplicationError>;

    async fn exists_customer_by_id(&self, id: CustomerId) -> Result<bool, ApplicationError>;

    /// Stores a new record and returns it with its assigned id.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, ApplicationError>;

    async fn update_customer(&self, customer: Customer) -> Result<(), ApplicationError>;

    async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), ApplicationError>;
}
