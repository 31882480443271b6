//! Authoritative ship state management utilities.

use std::collections::BTreeMap;

use grid_battle_core::{CellCoord, PlayerId, ShipId, ShipSnapshot};

/// Ship stored inside a team registry.
#[derive(Clone, Debug)]
pub(crate) struct ShipState {
    /// Identifier allocated by the registry.
    pub(crate) id: ShipId,
    /// Player that placed the ship.
    pub(crate) owner: PlayerId,
    /// Cells covered by the ship, in order from the origin.
    pub(crate) cells: Vec<CellCoord>,
    /// Number of cells struck so far.
    pub(crate) hits: u8,
}

impl ShipState {
    pub(crate) fn destroyed(&self) -> bool {
        usize::from(self.hits) >= self.cells.len()
    }

    pub(crate) fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            id: self.id,
            owner: self.owner.clone(),
            cells: self.cells.clone(),
            hits: self.hits,
            destroyed: self.destroyed(),
        }
    }
}

/// Outcome of recording a hit against a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HitRecord {
    pub(crate) hits: u8,
    pub(crate) destroyed: bool,
    /// Set only when this hit was the one that sank the ship.
    pub(crate) sunk: bool,
}

/// Registry that stores a team's ships and manages identifier allocation.
///
/// Ships are never removed; destroyed ships stay for statistics.
#[derive(Debug)]
pub(crate) struct ShipRegistry {
    entries: BTreeMap<ShipId, ShipState>,
    next_ship_id: ShipId,
}

impl ShipRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_ship_id: ShipId::new(0),
        }
    }

    /// Registers a new ship with zero hits and returns its identifier.
    pub(crate) fn create(&mut self, owner: PlayerId, cells: Vec<CellCoord>) -> ShipId {
        let id = self.next_ship_id;
        self.next_ship_id = ShipId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            ShipState {
                id,
                owner,
                cells,
                hits: 0,
            },
        );
        id
    }

    /// Counts a hit against the ship. Hits on a sunk ship change nothing.
    pub(crate) fn record_hit(&mut self, id: ShipId) -> Option<HitRecord> {
        let ship = self.entries.get_mut(&id)?;
        if ship.destroyed() {
            return Some(HitRecord {
                hits: ship.hits,
                destroyed: true,
                sunk: false,
            });
        }

        ship.hits = ship.hits.saturating_add(1);
        let destroyed = ship.destroyed();
        Some(HitRecord {
            hits: ship.hits,
            destroyed,
            sunk: destroyed,
        })
    }

    pub(crate) fn get(&self, id: ShipId) -> Option<&ShipState> {
        self.entries.get(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ShipState> {
        self.entries.values()
    }

    pub(crate) fn destroyed_count(&self) -> usize {
        self.entries.values().filter(|ship| ship.destroyed()).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cell_ship(registry: &mut ShipRegistry) -> ShipId {
        registry.create(
            PlayerId::new("tester"),
            vec![CellCoord::new(0, 0), CellCoord::new(1, 0)],
        )
    }

    #[test]
    fn identifiers_are_unique_and_sequential() {
        let mut registry = ShipRegistry::new();
        let first = two_cell_ship(&mut registry);
        let second = two_cell_ship(&mut registry);
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(first).map(|ship| ship.hits), Some(0));
    }

    #[test]
    fn final_hit_sinks_ship_exactly_once() {
        let mut registry = ShipRegistry::new();
        let ship = two_cell_ship(&mut registry);

        let first = registry.record_hit(ship).expect("ship exists");
        assert_eq!(
            first,
            HitRecord {
                hits: 1,
                destroyed: false,
                sunk: false
            }
        );

        let second = registry.record_hit(ship).expect("ship exists");
        assert_eq!(
            second,
            HitRecord {
                hits: 2,
                destroyed: true,
                sunk: true
            }
        );

        let repeated = registry.record_hit(ship).expect("ship exists");
        assert_eq!(
            repeated,
            HitRecord {
                hits: 2,
                destroyed: true,
                sunk: false
            }
        );
        assert_eq!(registry.destroyed_count(), 1);
    }

    #[test]
    fn unknown_ship_records_nothing() {
        let mut registry = ShipRegistry::new();
        assert!(registry.record_hit(ShipId::new(9)).is_none());
    }
}
