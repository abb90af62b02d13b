//! Slot catalog port
//!
//! Read access to the externally seeded list of bookable slots.

use async_trait::async_trait;
use domain::{Slot, SlotKey};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for reading configured slots
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SlotCatalog: Send + Sync {
    /// Every configured slot, in no particular order
    async fn list_slots(&self) -> Result<Vec<Slot>, ApplicationError>;

    /// Look up a single slot by date and time
    async fn find_slot(&self, key: &SlotKey) -> Result<Option<Slot>, ApplicationError>;
}
