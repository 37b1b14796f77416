//! Demo customers inserted at startup or by `clientele seed`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{SeedConfig, SeedMode};
use crate::customer::CustomerService;
use crate::domain::customer::CustomerRegistrationRequest;
use crate::errors::{ApplicationError, DomainError};

const FIXED_CUSTOMERS: [(&str, &str, i32); 2] =
    [("Alex", "alex@gmail.com", 21), ("Jamila", "jamila@gmail.com", 19)];

const FIRST_NAMES: &[&str] = &[
    "Amara", "Bruno", "Chiara", "Dmitri", "Elif", "Farah", "Gustavo", "Hana", "Ismael", "Jonas",
    "Keiko", "Liam", "Mateo", "Nadia", "Oskar", "Priya", "Quentin", "Rosa", "Samir", "Tessa",
];

const LAST_NAMES: &[&str] = &[
    "Abara", "Bianchi", "Castillo", "Duarte", "Eriksen", "Fischer", "Gallagher", "Hoffmann",
    "Ivanova", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Novak", "Okafor", "Petrov",
    "Quinn", "Romano", "Sato", "Tanaka",
];

const MIN_AGE: i32 = 16;
const MAX_AGE_EXCLUSIVE: i32 = 99;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

pub fn fixed_customers() -> Vec<CustomerRegistrationRequest> {
    FIXED_CUSTOMERS
        .iter()
        .map(|(name, email, age)| CustomerRegistrationRequest {
            name: (*name).to_string(),
            email: (*email).to_string(),
            age: *age,
        })
        .collect()
}

pub fn random_customer<R: Rng + ?Sized>(
    rng: &mut R,
    email_domain: &str,
) -> CustomerRegistrationRequest {
    let first_name = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last_name = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");

    CustomerRegistrationRequest {
        name: format!("{first_name} {last_name}"),
        email: format!(
            "{}.{}@{email_domain}",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        age: rng.gen_range(MIN_AGE..MAX_AGE_EXCLUSIVE),
    }
}

/// Registration requests for the configured seed mode.
pub fn plan<R: Rng + ?Sized>(config: &SeedConfig, rng: &mut R) -> Vec<CustomerRegistrationRequest> {
    match config.mode {
        SeedMode::None => Vec::new(),
        SeedMode::Fixed => fixed_customers(),
        SeedMode::Random => {
            (0..config.count).map(|_| random_customer(rng, &config.email_domain)).collect()
        }
    }
}

/// Registers each request; emails that already exist are skipped.
pub async fn seed_customers(
    service: &CustomerService,
    requests: Vec<CustomerRegistrationRequest>,
) -> Result<SeedReport, ApplicationError> {
    let mut report = SeedReport::default();

    for request in requests {
        let email = request.email.clone();
        match service.add_customer(request).await {
            Ok(_) => report.inserted += 1,
            Err(ApplicationError::Domain(DomainError::DuplicateResource(_))) => {
                debug!(event_name = "seed.customer_skipped", email = %email, "seed email exists");
                report.skipped += 1;
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        event_name = "seed.completed",
        inserted = report.inserted,
        skipped = report.skipped,
        "customer seeding finished"
    );
    Ok(report)
}
