pub mod dao;
pub mod service;

pub use dao::CustomerDao;
pub use service::CustomerService;
