//! Occupancy scan over the known slots plus the next unused one

use crate::error::SlotResult;
use crate::slot_store::{LockState, SlotOffset, SlotStore};
use std::ops::RangeInclusive;

/// Anything that can report whether a slot is held
pub trait SlotProbe {
    fn probe_slot(&self, offset: SlotOffset) -> SlotResult<LockState>;
}

impl SlotProbe for SlotStore {
    fn probe_slot(&self, offset: SlotOffset) -> SlotResult<LockState> {
        SlotStore::probe_slot(self, offset)
    }
}

/// A slot held by a live process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldSlot {
    pub slot: SlotOffset,
    pub pid: i32,
}

/// What one scan observed, in ascending offset order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Held slots, lowest offset first
    pub held: Vec<HeldSlot>,
    /// Lowest free slot, if any
    pub first_free: Option<SlotOffset>,
    /// Highest held slot, if any
    pub last_used: Option<SlotOffset>,
}

impl Occupancy {
    /// Number of held slots
    pub fn locks_held(&self) -> u64 {
        self.held.len() as u64
    }
}

/// Offsets a scan visits for header value `max_idx`.
///
/// Covers every known slot and the one just past the high-water mark, so a
/// fresh slot is always a candidate. `usize::MAX` itself is never visited.
pub fn scan_bounds(max_idx: SlotOffset) -> RangeInclusive<usize> {
    let end = max_idx.get().saturating_add(1).min(usize::MAX - 1);
    SlotOffset::FIRST.get()..=end
}

/// Probe every slot in [`scan_bounds`]
pub fn scan<P: SlotProbe + ?Sized>(probe: &P, max_idx: SlotOffset) -> SlotResult<Occupancy> {
    let mut occupancy = Occupancy::default();

    for raw in scan_bounds(max_idx) {
        let Some(offset) = SlotOffset::new(raw) else {
            continue;
        };
        match probe.probe_slot(offset)? {
            LockState::Free => {
                if occupancy.first_free.is_none() {
                    occupancy.first_free = Some(offset);
                }
            }
            LockState::Held { pid } => {
                occupancy.held.push(HeldSlot { slot: offset, pid });
                occupancy.last_used = Some(offset);
            }
        }
    }

    tracing::debug!(
        held = occupancy.held.len(),
        first_free = ?occupancy.first_free.map(SlotOffset::index),
        "scanned slots"
    );
    Ok(occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot_store::HEADER_WIDTH;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// Probe backed by a fixed map of slot index to holder PID
    #[derive(Default)]
    struct FakeProbe {
        held: BTreeMap<usize, i32>,
        visited: RefCell<Vec<usize>>,
    }

    impl FakeProbe {
        fn holding(slots: &[(usize, i32)]) -> Self {
            Self {
                held: slots.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl SlotProbe for FakeProbe {
        fn probe_slot(&self, offset: SlotOffset) -> SlotResult<LockState> {
            self.visited.borrow_mut().push(offset.index());
            Ok(match self.held.get(&offset.index()) {
                Some(&pid) => LockState::Held { pid },
                None => LockState::Free,
            })
        }
    }

    fn slot(index: usize) -> SlotOffset {
        SlotOffset::from_index(index).unwrap()
    }

    #[test]
    fn test_empty_store_offers_first_slot() {
        let probe = FakeProbe::default();
        let occupancy = scan(&probe, SlotOffset::FIRST).unwrap();

        assert_eq!(occupancy.locks_held(), 0);
        assert_eq!(occupancy.first_free, Some(slot(1)));
        assert_eq!(occupancy.last_used, None);
        assert_eq!(*probe.visited.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_scan_visits_one_past_high_water_mark() {
        let probe = FakeProbe::holding(&[(1, 100), (2, 200), (3, 300)]);
        let occupancy = scan(&probe, slot(3)).unwrap();

        assert_eq!(*probe.visited.borrow(), vec![1, 2, 3, 4]);
        assert_eq!(occupancy.first_free, Some(slot(4)));
        assert_eq!(occupancy.last_used, Some(slot(3)));
    }

    #[test]
    fn test_held_slots_are_ascending_with_pids() {
        let probe = FakeProbe::holding(&[(3, 33), (1, 11)]);
        let occupancy = scan(&probe, slot(3)).unwrap();

        assert_eq!(
            occupancy.held,
            vec![
                HeldSlot { slot: slot(1), pid: 11 },
                HeldSlot { slot: slot(3), pid: 33 },
            ]
        );
        assert_eq!(occupancy.first_free, Some(slot(2)));
        assert_eq!(occupancy.locks_held(), 2);
    }

    #[test]
    fn test_scan_bounds_never_reach_usize_max() {
        let top = SlotOffset::new(usize::MAX - 1).unwrap();
        assert_eq!(*scan_bounds(top).end(), usize::MAX - 1);
        assert_eq!(*scan_bounds(SlotOffset::FIRST).start(), HEADER_WIDTH);
        assert_eq!(*scan_bounds(SlotOffset::FIRST).end(), HEADER_WIDTH + 1);
    }
}
