//! Caller-side access to the habit service
//!
//! [`HabitApi`] is the seam between the optimistic [`ClientSyncController`]
//! and whatever carries requests to the service: a direct in-process call
//! ([`ServiceApi`]) or the HTTP surface ([`HttpApi`]).

pub mod http;
pub mod sync;

pub use http::HttpApi;
pub use sync::ClientSyncController;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Caller, DomainError, HabitRecord};
use crate::service::{
    CreateHabitParams, DeleteHabitParams, HabitService, ServiceError, ToggleParams,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with `success: false`
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("No local habit named '{0}'")]
    UnknownHabit(String),

    #[error("A habit named '{0}' already exists")]
    DuplicateHabit(String),
}

/// Operations a client can issue against the service
#[async_trait]
pub trait HabitApi: Send + Sync {
    async fn list(&self) -> Result<Vec<HabitRecord>, ClientError>;

    async fn create(&self, params: CreateHabitParams) -> Result<HabitRecord, ClientError>;

    /// Returns the membership of the day after the toggle
    async fn toggle(&self, params: ToggleParams) -> Result<bool, ClientError>;

    async fn delete(&self, params: DeleteHabitParams) -> Result<(), ClientError>;
}

/// In-process API bound to one caller identity
#[derive(Clone)]
pub struct ServiceApi {
    service: Arc<HabitService>,
    caller: Caller,
}

impl ServiceApi {
    pub fn new(service: Arc<HabitService>, caller: Caller) -> Self {
        Self { service, caller }
    }
}

#[async_trait]
impl HabitApi for ServiceApi {
    async fn list(&self) -> Result<Vec<HabitRecord>, ClientError> {
        Ok(self.service.list(&self.caller).await?.habits)
    }

    async fn create(&self, params: CreateHabitParams) -> Result<HabitRecord, ClientError> {
        Ok(self.service.create(&self.caller, params).await?.data)
    }

    async fn toggle(&self, params: ToggleParams) -> Result<bool, ClientError> {
        Ok(self.service.toggle(&self.caller, params).await?.completed)
    }

    async fn delete(&self, params: DeleteHabitParams) -> Result<(), ClientError> {
        self.service.delete(&self.caller, params).await?;
        Ok(())
    }
}
