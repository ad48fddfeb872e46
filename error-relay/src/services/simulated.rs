use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

/// Failures produced by the simulated services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("connection to database timed out after 30s")]
    DatabaseTimeout,

    #[error("validation failed: {0}")]
    Validation(#[source] FieldError),

    #[error("connection refused")]
    ConnectionRefused,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("insufficient funds")]
    InsufficientFunds,
}

/// A single invalid input field.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("email format is invalid")]
    InvalidEmail,
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

#[derive(Debug, Default, Clone, Copy)]
pub struct DatabaseService;

impl DatabaseService {
    pub fn new() -> Self {
        Self
    }

    /// Always times out.
    pub fn connect(&self) -> DomainResult<()> {
        Err(DomainError::DatabaseTimeout)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_email(&self, email: &str) -> std::result::Result<(), FieldError> {
        if email.is_empty() || email == "not-an-email" {
            return Err(FieldError::InvalidEmail);
        }
        Ok(())
    }

    pub fn register_user(&self, email: &str, username: &str) -> DomainResult<()> {
        self.validate_email(email).map_err(DomainError::Validation)?;
        debug!(username, "User registered");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentService;

impl PaymentService {
    /// Charges above this amount are declined.
    pub const BALANCE_LIMIT: f64 = 100.0;

    pub fn new() -> Self {
        Self
    }

    pub fn process_payment(&self, user_id: u64, amount: f64, card_last4: &str) -> DomainResult<()> {
        if amount > Self::BALANCE_LIMIT {
            return Err(DomainError::InsufficientFunds);
        }
        debug!(user_id, amount, card_last4, "Payment processed");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalApiService;

impl ExternalApiService {
    const NETWORK_DELAY: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self
    }

    /// Waits out a short network delay, then fails.
    pub async fn call_stripe_api(&self, endpoint: &str) -> DomainResult<()> {
        tokio::time::sleep(Self::NETWORK_DELAY).await;
        debug!(endpoint, "Payment gateway refused the connection");
        Err(DomainError::ConnectionRefused)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }

    pub fn authenticate_user(&self, username: &str, password: &str) -> DomainResult<()> {
        if username == "john.doe" && password == "wrong" {
            return Err(DomainError::InvalidCredentials);
        }
        Ok(())
    }
}

/// Operations that fault instead of returning an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DangerousService;

impl DangerousService {
    pub fn new() -> Self {
        Self
    }

    /// Returns the first element. Panics on an empty slice.
    pub fn process_array(&self, data: &[String]) -> String {
        data[0].clone()
    }

    /// Terminates the process without unwinding, so no recovery layer can
    /// intercept it regardless of the panic strategy.
    pub fn uncaught_panic_operation(&self) -> ! {
        error!("Unrecoverable fault in DangerousService, aborting process");
        std::process::abort()
    }
}
