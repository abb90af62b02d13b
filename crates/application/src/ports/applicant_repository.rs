//! Applicant repository port
//!
//! Defines the interface for storing and retrieving committed registrations.

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{Identity, Registration, SlotKey};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for registration persistence
///
/// Implementations must enforce one registration per identity with a
/// uniqueness constraint at insert time. A read followed by a write is not
/// sufficient: concurrent commits for the same identity rely on the insert
/// itself to reject all but one of them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApplicantRepository: Send + Sync {
    /// Get the registration for an identity, if one was committed
    async fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<Registration>, ApplicationError>;

    /// Insert a new registration
    ///
    /// # Errors
    /// * `ApplicationError::DuplicateIdentity` if the identity already has a
    ///   registration
    /// * `ApplicationError::Storage` on any other persistence failure
    async fn insert(&self, registration: &Registration) -> Result<Registration, ApplicationError>;

    /// Number of registrations that booked the given slot
    async fn count_for_slot(&self, slot: &SlotKey) -> Result<u32, ApplicationError>;

    /// Number of registrations per booked slot
    ///
    /// Slots without registrations are absent from the map.
    async fn occupancy(&self) -> Result<HashMap<SlotKey, u32>, ApplicationError>;

    /// All registrations, oldest first
    async fn list_all(&self) -> Result<Vec<Registration>, ApplicationError>;
}
