//! Ordered hazard collection.

use std::sync::Arc;

use super::{Hazard, HazardDraft, HazardError, HazardId};

/// Immutable view of the hazard list at one point in time.
///
/// Cheap to clone; evaluations hold one of these so the store can keep
/// changing underneath without affecting an evaluation in progress.
pub type HazardSnapshot = Arc<[Hazard]>;

/// Ordered collection of hazards, owned by the application shell.
#[derive(Debug, Clone)]
pub struct HazardStore {
    hazards: Vec<Hazard>,
    /// `None` once `u64::MAX` has been handed out or loaded.
    next_id: Option<u64>,
}

impl Default for HazardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HazardStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            hazards: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Create a store from previously persisted hazards, preserving order.
    ///
    /// The id counter starts above the largest loaded id.
    pub fn from_hazards(hazards: Vec<Hazard>) -> Self {
        let next_id = hazards
            .iter()
            .map(|h| h.id.as_u64())
            .max()
            .map_or(Some(1), |max| max.checked_add(1));
        Self { hazards, next_id }
    }

    /// Validate a draft and append it with a fresh id.
    pub fn add(&mut self, draft: &HazardDraft) -> Result<HazardId, HazardError> {
        let (name, position) = draft.validate()?;
        let raw = self.next_id.ok_or(HazardError::IdSpaceExhausted)?;
        let id = HazardId::from_raw(raw);
        self.next_id = raw.checked_add(1);

        tracing::info!(
            hazard_id = %id,
            name = %name,
            position = %position,
            "Hazard added"
        );

        self.hazards.push(Hazard::new(id, name, position));
        Ok(id)
    }

    /// Remove a hazard by id, returning it if it existed.
    pub fn remove(&mut self, id: HazardId) -> Option<Hazard> {
        let index = self.hazards.iter().position(|h| h.id == id)?;
        let removed = self.hazards.remove(index);
        tracing::info!(hazard_id = %id, name = %removed.name, "Hazard removed");
        Some(removed)
    }

    /// Look up a hazard by id.
    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    /// Take an immutable snapshot for evaluation.
    pub fn snapshot(&self) -> HazardSnapshot {
        Arc::from(self.hazards.as_slice())
    }

    /// Iterate over hazards in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    /// All hazards in insertion order.
    pub fn as_slice(&self) -> &[Hazard] {
        &self.hazards
    }

    /// Number of hazards.
    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    fn draft(name: &str) -> HazardDraft {
        HazardDraft::new(name, "13.75", "100.50")
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = HazardStore::new();
        let a = store.add(&draft("A")).unwrap();
        let b = store.add(&draft("B")).unwrap();
        let c = store.add(&draft("A")).unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_invalid_draft_not_stored() {
        let mut store = HazardStore::new();
        assert!(store.add(&HazardDraft::new("", "1", "2")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut store = HazardStore::new();
        let a = store.add(&draft("A")).unwrap();
        store.remove(a);
        let b = store.add(&draft("B")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut store = HazardStore::new();
        let a = store.add(&draft("A")).unwrap();
        let b = store.add(&draft("B")).unwrap();
        let c = store.add(&draft("C")).unwrap();

        let removed = store.remove(b).unwrap();
        assert_eq!(removed.name, "B");

        let ids: Vec<_> = store.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut store = HazardStore::new();
        assert!(store.remove(HazardId::from_raw(99)).is_none());
    }

    #[test]
    fn test_from_hazards_seeds_counter() {
        let loaded = vec![
            Hazard::new(HazardId::from_raw(7), "Old", Coordinate::new(0.0, 0.0)),
            Hazard::new(HazardId::from_raw(3), "Older", Coordinate::new(0.0, 0.0)),
        ];
        let mut store = HazardStore::from_hazards(loaded);
        let id = store.add(&draft("New")).unwrap();
        assert_eq!(id, HazardId::from_raw(8));
    }

    #[test]
    fn test_max_loaded_id_exhausts_counter() {
        let loaded = vec![Hazard::new(
            HazardId::from_raw(u64::MAX),
            "Edited by hand",
            Coordinate::new(0.0, 0.0),
        )];
        let mut store = HazardStore::from_hazards(loaded);

        assert!(matches!(
            store.add(&draft("New")),
            Err(HazardError::IdSpaceExhausted)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_last_id_is_assigned_once() {
        let loaded = vec![Hazard::new(
            HazardId::from_raw(u64::MAX - 1),
            "Near the end",
            Coordinate::new(0.0, 0.0),
        )];
        let mut store = HazardStore::from_hazards(loaded);

        assert_eq!(store.add(&draft("Last")).unwrap(), HazardId::from_raw(u64::MAX));
        assert!(matches!(
            store.add(&draft("Overflow")),
            Err(HazardError::IdSpaceExhausted)
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut store = HazardStore::new();
        store.add(&draft("A")).unwrap();
        let snapshot = store.snapshot();

        store.add(&draft("B")).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }
}
