//! Bookable slot entity

use serde::{Deserialize, Serialize};

use crate::value_objects::SlotKey;

/// A bookable date and time with a capacity limit
///
/// Slots are seeded by an external process and are read-only to the
/// registration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Date and start time
    pub key: SlotKey,
    /// Maximum number of registrations
    pub limit: u32,
}

impl Slot {
    /// Create a new slot
    pub const fn new(key: SlotKey, limit: u32) -> Self {
        Self { key, limit }
    }

    /// Whether a slot with `occupancy` registrations can take another one
    pub const fn has_room_for(&self, occupancy: u32) -> bool {
        occupancy < self.limit
    }

    /// Registrations still available at the given occupancy
    pub const fn remaining(&self, occupancy: u32) -> u32 {
        self.limit.saturating_sub(occupancy)
    }
}
