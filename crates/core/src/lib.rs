pub mod config;
pub mod customer;
pub mod domain;
pub mod errors;
pub mod seed;

pub use customer::{CustomerDao, CustomerService};
pub use domain::customer::{
    Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, NewCustomer,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use seed::SeedReport;
