//! Allocation: scan the slot store under the header lock, then list,
//! count, or admit and claim.
//!
//! The header lock serialises "observe occupancy, pick a free slot, claim
//! it, grow the header" across every cooperating process. It is held from
//! [`Allocator::open`] until the allocator is consumed.

mod scan;

pub use scan::{HeldSlot, Occupancy, SlotProbe, scan, scan_bounds};

use crate::config::LockFileConfig;
use crate::error::SlotResult;
use crate::slot_store::{SlotOffset, SlotStore};

/// Result of the admission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Take `slot`; grow the header to `new_max` first if set
    Admit {
        slot: SlotOffset,
        new_max: Option<SlotOffset>,
    },
    /// Quota met or no free slot
    Refuse { running: u64 },
}

/// Decide whether one more instance may start.
///
/// The new high-water mark is the higher of the claimed slot and the last
/// slot seen held. The header only ever grows, so it is rewritten only when
/// that mark lies past `max_idx`.
pub fn decide(occupancy: &Occupancy, max_idx: SlotOffset, max_allowed: u64) -> Admission {
    let running = occupancy.locks_held();
    match occupancy.first_free {
        Some(slot) if running < max_allowed => {
            let top = occupancy.last_used.map_or(slot, |used| used.max(slot));
            Admission::Admit {
                slot,
                new_max: (top > max_idx).then_some(top),
            }
        }
        _ => Admission::Refuse { running },
    }
}

/// Outcome of an acquire attempt
#[derive(Debug)]
pub enum Acquired {
    /// A slot is held by this process
    Claimed(Claim),
    /// Admission refused with `running` instances already holding slots
    Refused { running: u64 },
}

/// A claimed slot. The lock lasts as long as this value, or, after
/// [`Claim::hand_off`], as long as the process image that inherits it.
#[derive(Debug)]
pub struct Claim {
    store: SlotStore,
    slot: SlotOffset,
}

impl Claim {
    pub fn slot(&self) -> SlotOffset {
        self.slot
    }

    /// Keep the slot lock alive across process image replacement
    pub fn hand_off(&self) -> SlotResult<()> {
        self.store.prepare_hand_off()
    }
}

/// One invocation's view of the slot store, holding the header lock
#[derive(Debug)]
pub struct Allocator {
    store: SlotStore,
    max_idx: SlotOffset,
}

impl Allocator {
    /// Open or create the store, wait for the header lock and read the header
    pub fn open(config: &LockFileConfig) -> SlotResult<Self> {
        let mut store = SlotStore::open_or_create(config)?;
        store.lock_header_blocking()?;
        let max_idx = store.read_header()?;
        Ok(Self { store, max_idx })
    }

    /// Scan without deciding anything
    pub fn scan(&self) -> SlotResult<Occupancy> {
        scan(&self.store, self.max_idx)
    }

    /// Every held slot with its holder, ascending. Dropping the store
    /// releases the header lock.
    pub fn list(self) -> SlotResult<Vec<HeldSlot>> {
        Ok(self.scan()?.held)
    }

    /// Number of held slots
    pub fn check(self) -> SlotResult<u64> {
        Ok(self.scan()?.locks_held())
    }

    /// Admit and claim a slot if fewer than `max_allowed` are held.
    ///
    /// On admission the slot is locked and the header grown before the
    /// header lock is released.
    pub fn acquire(mut self, max_allowed: u64) -> SlotResult<Acquired> {
        let occupancy = self.scan()?;

        match decide(&occupancy, self.max_idx, max_allowed) {
            Admission::Refuse { running } => {
                tracing::info!(running, max_allowed, "admission refused");
                Ok(Acquired::Refused { running })
            }
            Admission::Admit { slot, new_max } => {
                self.store.claim_slot(slot)?;
                if let Some(new_max) = new_max {
                    self.store.write_header(new_max)?;
                }
                self.store.unlock_header()?;
                tracing::info!(slot = slot.index(), max_allowed, "slot acquired");
                Ok(Acquired::Claimed(Claim {
                    store: self.store,
                    slot,
                }))
            }
        }
    }
}
