use std::sync::Arc;

use tracing::info;

use super::dao::CustomerDao;
use crate::domain::customer::{
    Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, NewCustomer,
};
use crate::errors::{ApplicationError, DomainError};

#[derive(Clone)]
pub struct CustomerService {
    dao: Arc<dyn CustomerDao>,
}

impl CustomerService {
    pub fn new(dao: Arc<dyn CustomerDao>) -> Self {
        Self { dao }
    }

    pub async fn get_all_customers(&self) -> Result<Vec<Customer>, ApplicationError> {
        self.dao.select_all_customers().await
    }

    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, ApplicationError> {
        self.dao
            .select_customer_by_id(id)
            .await?
            .ok_or_else(|| DomainError::customer_not_found(id).into())
    }

    pub async fn add_customer(
        &self,
        request: CustomerRegistrationRequest,
    ) -> Result<Customer, ApplicationError> {
        if self.dao.exists_customer_with_email(&request.email).await? {
            return Err(DomainError::email_taken().into());
        }

        let customer = self.dao.insert_customer(NewCustomer::from(request)).await?;
        info!(
            event_name = "customer.registered",
            customer_id = %customer.id,
            "customer registered"
        );
        Ok(customer)
    }

    pub async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), ApplicationError> {
        if !self.dao.exists_customer_by_id(id).await? {
            return Err(DomainError::customer_not_found(id).into());
        }

        self.dao.delete_customer_by_id(id).await?;
        info!(event_name = "customer.deleted", customer_id = %id, "customer deleted");
        Ok(())
    }

    /// Applies the fields of `request` that differ from the stored record.
    /// Fails when nothing would change.
    pub async fn update_customer(
        &self,
        id: CustomerId,
        request: CustomerUpdateRequest,
    ) -> Result<Customer, ApplicationError> {
        let mut customer = self.get_customer(id).await?;
        let mut changed_fields = Vec::new();

        if let Some(name) = request.name.filter(|name| *name != customer.name) {
            customer.name = name;
            changed_fields.push("name");
        }

        if let Some(email) = request.email.filter(|email| *email != customer.email) {
            if self.dao.exists_customer_with_email(&email).await? {
                return Err(DomainError::email_taken().into());
            }
            customer.email = email;
            changed_fields.push("email");
        }

        if let Some(age) = request.age.filter(|age| *age != customer.age) {
            customer.age = age;
            changed_fields.push("age");
        }

        if changed_fields.is_empty() {
            return Err(DomainError::no_changes().into());
        }

        self.dao.update_customer(customer.clone()).await?;
        info!(
            event_name = "customer.updated",
            customer_id = %id,
            changed_fields = %changed_fields.join(","),
            "customer updated"
        );
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::CustomerService;
    use crate::customer::dao::CustomerDao;
    use crate::domain::customer::{
        Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, NewCustomer,
    };
    use crate::errors::{ApplicationError, DomainError};

    /// Answers reads from fixed data and records every write.
    #[derive(Default)]
    struct RecordingDao {
        customers: Vec<Customer>,
        taken_emails: HashSet<String>,
        select_all_calls: AtomicUsize,
        inserted: Mutex<Vec<NewCustomer>>,
        updated: Mutex<Vec<Customer>>,
        deleted: Mutex<Vec<CustomerId>>,
    }

    impl RecordingDao {
        fn with_customer(customer: Customer) -> Self {
            Self { customers: vec![customer], ..Self::default() }
        }

        fn taking(mut self, email: &str) -> Self {
            self.taken_emails.insert(email.to_string());
            self
        }

        fn inserted(&self) -> Vec<NewCustomer> {
            self.inserted.lock().expect("inserted lock").clone()
        }

        fn updated(&self) -> Vec<Customer> {
            self.updated.lock().expect("updated lock").clone()
        }

        fn deleted(&self) -> Vec<CustomerId> {
            self.deleted.lock().expect("deleted lock").clone()
        }
    }

    #[async_trait]
    impl CustomerDao for RecordingDao {
        async fn select_all_customers(&self) -> Result<Vec<Customer>, ApplicationError> {
            self.select_all_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.customers.clone())
        }

        async fn select_customer_by_id(
            &self,
            id: CustomerId,
        ) -> Result<Option<Customer>, ApplicationError> {
            Ok(self.customers.iter().find(|customer| customer.id == id).cloned())
        }

        async fn exists_customer_with_email(
            &self,
            email: &str,
        ) -> Result<bool, ApplicationError> {
            Ok(self.taken_emails.contains(email))
        }

        async fn exists_customer_by_id(&self, id: CustomerId) -> Result<bool, ApplicationError> {
            Ok(self.customers.iter().any(|customer| customer.id == id))
        }

        async fn insert_customer(
            &self,
            customer: NewCustomer,
        ) -> Result<Customer, ApplicationError> {
            self.inserted.lock().expect("inserted lock").push(customer.clone());
            Ok(customer.with_id(CustomerId(1)))
        }

        async fn update_customer(&self, customer: Customer) -> Result<(), ApplicationError> {
            self.updated.lock().expect("updated lock").push(customer);
            Ok(())
        }

        async fn delete_customer_by_id(&self, id: CustomerId) -> Result<(), ApplicationError> {
            self.deleted.lock().expect("deleted lock").push(id);
            Ok(())
        }
    }

    fn alex(id: i64) -> Customer {
        Customer {
            id: CustomerId(id),
            name: "Alex".to_string(),
            email: "alex@gmail.com".to_string(),
            age: 19,
        }
    }

    fn service(dao: &Arc<RecordingDao>) -> CustomerService {
        CustomerService::new(dao.clone())
    }

    #[tokio::test]
    async fn get_all_customers_reads_every_record() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));

        let customers = service(&dao).get_all_customers().await.expect("list customers");

        assert_eq!(customers, vec![alex(10)]);
        assert_eq!(dao.select_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_customer_returns_stored_record() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));

        let actual = service(&dao).get_customer(CustomerId(10)).await.expect("get customer");

        assert_eq!(actual, alex(10));
    }

    #[tokio::test]
    async fn get_customer_fails_when_id_is_unknown() {
        let dao = Arc::new(RecordingDao::default());

        let error = service(&dao).get_customer(CustomerId(10)).await.expect_err("should fail");

        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::ResourceNotFound(
                "customer with id [10] not found".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn add_customer_inserts_record_without_id() {
        let dao = Arc::new(RecordingDao::default());
        let request = CustomerRegistrationRequest {
            name: "Alex".to_string(),
            email: "alex@gmail.com".to_string(),
            age: 19,
        };

        let created = service(&dao).add_customer(request.clone()).await.expect("add customer");

        let inserted = dao.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].name, request.name);
        assert_eq!(inserted[0].email, request.email);
        assert_eq!(inserted[0].age, request.age);
        assert_eq!(created.id, CustomerId(1));
    }

    #[tokio::test]
    async fn add_customer_rejects_taken_email_without_inserting() {
        let dao = Arc::new(RecordingDao::default().taking("alex@gmail.com"));
        let request = CustomerRegistrationRequest {
            name: "Alex".to_string(),
            email: "alex@gmail.com".to_string(),
            age: 19,
        };

        let error = service(&dao).add_customer(request).await.expect_err("should fail");

        assert_eq!(error, ApplicationError::Domain(DomainError::email_taken()));
        assert_eq!(error.to_string(), "email already taken");
        assert!(dao.inserted().is_empty());
    }

    #[tokio::test]
    async fn delete_customer_removes_existing_record() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));

        service(&dao).delete_customer_by_id(CustomerId(10)).await.expect("delete customer");

        assert_eq!(dao.deleted(), vec![CustomerId(10)]);
    }

    #[tokio::test]
    async fn delete_customer_fails_for_unknown_id_without_deleting() {
        let dao = Arc::new(RecordingDao::default());

        let error =
            service(&dao).delete_customer_by_id(CustomerId(10)).await.expect_err("should fail");

        assert_eq!(error.to_string(), "customer with id [10] not found");
        assert!(dao.deleted().is_empty());
    }

    #[tokio::test]
    async fn update_customer_applies_all_properties() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));
        let request = CustomerUpdateRequest {
            name: Some("Alexandro".to_string()),
            email: Some("alexandro@amigoscode.com".to_string()),
            age: Some(23),
        };

        service(&dao).update_customer(CustomerId(10), request).await.expect("update customer");

        assert_eq!(
            dao.updated(),
            vec![Customer {
                id: CustomerId(10),
                name: "Alexandro".to_string(),
                email: "alexandro@amigoscode.com".to_string(),
                age: 23,
            }]
        );
    }

    #[tokio::test]
    async fn update_customer_changes_only_name() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));
        let request =
            CustomerUpdateRequest { name: Some("Alexandro".to_string()), ..Default::default() };

        service(&dao).update_customer(CustomerId(10), request).await.expect("update customer");

        let updated = dao.updated();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id, CustomerId(10));
        assert_eq!(updated[0].name, "Alexandro");
        assert_eq!(updated[0].email, "alex@gmail.com");
        assert_eq!(updated[0].age, 19);
    }

    #[tokio::test]
    async fn update_customer_changes_only_email() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));
        let request = CustomerUpdateRequest {
            email: Some("alexandro@amigoscode.com".to_string()),
            ..Default::default()
        };

        service(&dao).update_customer(CustomerId(10), request).await.expect("update customer");

        let updated = dao.updated();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name, "Alex");
        assert_eq!(updated[0].email, "alexandro@amigoscode.com");
        assert_eq!(updated[0].age, 19);
    }

    #[tokio::test]
    async fn update_customer_changes_only_age() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));
        let request = CustomerUpdateRequest { age: Some(32), ..Default::default() };

        let customer =
            service(&dao).update_customer(CustomerId(10), request).await.expect("update customer");

        assert_eq!(customer.age, 32);
        assert_eq!(dao.updated(), vec![Customer { age: 32, ..alex(10) }]);
    }

    #[tokio::test]
    async fn update_customer_rejects_taken_email_without_writing() {
        let dao = Arc::new(
            RecordingDao::with_customer(alex(10)).taking("alexandro@amigoscode.com"),
        );
        let request = CustomerUpdateRequest {
            email: Some("alexandro@amigoscode.com".to_string()),
            ..Default::default()
        };

        let error = service(&dao)
            .update_customer(CustomerId(10), request)
            .await
            .expect_err("should fail");

        assert_eq!(error, ApplicationError::Domain(DomainError::email_taken()));
        assert!(dao.updated().is_empty());
    }

    #[tokio::test]
    async fn update_customer_keeping_own_email_skips_uniqueness_check() {
        // The stored email is reported as taken, which is true for the record itself.
        let dao = Arc::new(RecordingDao::with_customer(alex(10)).taking("alex@gmail.com"));
        let request = CustomerUpdateRequest {
            email: Some("alex@gmail.com".to_string()),
            age: Some(20),
            ..Default::default()
        };

        service(&dao).update_customer(CustomerId(10), request).await.expect("update customer");

        assert_eq!(dao.updated(), vec![Customer { age: 20, ..alex(10) }]);
    }

    #[tokio::test]
    async fn update_customer_without_changes_fails_validation() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));
        let stored = alex(10);
        let request = CustomerUpdateRequest {
            name: Some(stored.name),
            email: Some(stored.email),
            age: Some(stored.age),
        };

        let error = service(&dao)
            .update_customer(CustomerId(10), request)
            .await
            .expect_err("should fail");

        assert_eq!(error, ApplicationError::Domain(DomainError::no_changes()));
        assert_eq!(error.to_string(), "no data changes found");
        assert!(dao.updated().is_empty());
    }

    #[tokio::test]
    async fn update_customer_with_empty_request_fails_validation() {
        let dao = Arc::new(RecordingDao::with_customer(alex(10)));

        let error = service(&dao)
            .update_customer(CustomerId(10), CustomerUpdateRequest::default())
            .await
            .expect_err("should fail");

        assert_eq!(error.to_string(), "no data changes found");
    }

    #[tokio::test]
    async fn update_customer_fails_for_unknown_id() {
        let dao = Arc::new(RecordingDao::default());
        let request = CustomerUpdateRequest { age: Some(30), ..Default::default() };

        let error = service(&dao)
            .update_customer(CustomerId(7), request)
            .await
            .expect_err("should fail");

        assert_eq!(error.to_string(), "customer with id [7] not found");
        assert!(dao.updated().is_empty());
    }
}
