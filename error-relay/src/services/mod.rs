//! Simulated back-end services.
//!
//! Each service fails in a fixed, realistic way so the HTTP layer always
//! has a failure to track.

pub mod container;
pub mod simulated;

pub use container::ServiceContainer;
pub use simulated::{
    AuthService, DangerousService, DatabaseService, DomainError, ExternalApiService,
    FieldError, PaymentService, UserService,
};
