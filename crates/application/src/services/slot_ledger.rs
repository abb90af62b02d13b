//! Slot ledger - Capacity and occupancy of bookable slots
//!
//! Occupancy is never stored: it is the number of committed registrations
//! that booked a slot, recomputed on every call. The headroom check is a
//! read followed later by an insert, so two commits against the same slot
//! can both pass it and overshoot the limit by a small margin. That is an
//! accepted soft limit; no lock is taken.

use std::sync::Arc;

use domain::SlotKey;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{ApplicantRepository, SlotCatalog},
};

/// A slot that can still take registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenSlot {
    /// Date and start time
    pub key: SlotKey,
    /// Configured limit
    pub capacity: u32,
    /// Registrations at the time of listing
    pub occupancy: u32,
}

impl OpenSlot {
    /// Display label, `YYYY-MM-DD HH:MM`
    pub fn label(&self) -> String {
        self.key.label()
    }

    /// Opaque selection key for buttons, `YYYY-MM-DD_HHMM`
    pub fn token(&self) -> String {
        self.key.token()
    }

    /// Registrations still available
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

/// Answers "which slots are open" and "is this slot open"
#[derive(Clone)]
pub struct SlotLedger {
    catalog: Arc<dyn SlotCatalog>,
    applicants: Arc<dyn ApplicantRepository>,
}

impl std::fmt::Debug for SlotLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotLedger").finish_non_exhaustive()
    }
}

impl SlotLedger {
    /// Create a ledger over the slot catalog and the registrations
    pub fn new(catalog: Arc<dyn SlotCatalog>, applicants: Arc<dyn ApplicantRepository>) -> Self {
        Self {
            catalog,
            applicants,
        }
    }

    /// Slots whose occupancy is below capacity, in chronological order
    #[instrument(skip(self))]
    pub async fn list_open_slots(&self) -> Result<Vec<OpenSlot>, ApplicationError> {
        let slots = self.catalog.list_slots().await?;
        let occupancy = self.applicants.occupancy().await?;

        let mut open: Vec<OpenSlot> = slots
            .into_iter()
            .filter_map(|slot| {
                let taken = occupancy.get(&slot.key).copied().unwrap_or(0);
                slot.has_room_for(taken).then_some(OpenSlot {
                    key: slot.key,
                    capacity: slot.limit,
                    occupancy: taken,
                })
            })
            .collect();
        open.sort_by_key(|slot| slot.key);
        open.dedup_by_key(|slot| slot.key);

        debug!(open = open.len(), "Listed open slots");
        Ok(open)
    }

    /// Whether the slot exists and is below capacity right now
    ///
    /// Advisory only: the answer may be stale by the time a registration is
    /// inserted.
    #[instrument(skip(self), fields(slot = %slot))]
    pub async fn has_headroom(&self, slot: &SlotKey) -> Result<bool, ApplicationError> {
        let Some(configured) = self.catalog.find_slot(slot).await? else {
            debug!("Slot is not configured");
            return Ok(false);
        };

        let taken = self.applicants.count_for_slot(slot).await?;
        let open = configured.has_room_for(taken);
        debug!(taken, limit = configured.limit, open, "Checked slot headroom");
        Ok(open)
    }
}
