//! Service container shared by the request handlers.

use std::sync::Arc;

use super::simulated::{
    AuthService, DangerousService, DatabaseService, ExternalApiService, PaymentService,
    UserService,
};

/// All simulated services, built once and shared read-only.
#[derive(Debug, Default, Clone)]
pub struct ServiceContainer {
    pub database: DatabaseService,
    pub users: UserService,
    pub payments: PaymentService,
    pub external_api: ExternalApiService,
    pub auth: AuthService,
    pub dangerous: DangerousService,
}

impl ServiceContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            database: DatabaseService::new(),
            users: UserService::new(),
            payments: PaymentService::new(),
            external_api: ExternalApiService::new(),
            auth: AuthService::new(),
            dangerous: DangerousService::new(),
        })
    }
}
