//! Optimistic view of a record collection.
//!
//! Changes are applied to the visible collection immediately and reconciled
//! when the backing action completes. Each entry keeps its last confirmed
//! state plus the ordered list of patches still in flight, so rejecting one
//! mutation only withdraws that mutation's patch.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// A record type the collection can track.
pub trait Record: Clone {
    type Id: Clone + Eq + Hash + fmt::Debug;
    type Patch: Clone + fmt::Debug;

    /// Server-assigned id. Drafts may return a placeholder value; it is never
    /// used to address a pending entry.
    fn id(&self) -> Self::Id;

    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Locally unique placeholder for a record whose create is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingId(u64);

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending-{}", self.0)
    }
}

/// Identifies an in-flight mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(u64);

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mutation-{}", self.0)
    }
}

/// Address of an entry: a placeholder or a server id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey<Id> {
    Pending(PendingId),
    Confirmed(Id),
}

/// Lifecycle state of a visible entry. Removed entries are simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("record is still pending confirmation")]
    StillPending,
    #[error("record not found")]
    NotFound,
}

/// Receipt for an optimistic mutation.
#[derive(Debug, Clone)]
pub struct MutationTicket<T: Record> {
    pub id: T::Id,
    pub mutation: MutationId,
    /// Visible record before this mutation was applied.
    pub previous: T,
    pub patch: T::Patch,
}

/// Receipt for an optimistic delete.
#[derive(Debug, Clone)]
pub struct Removed<T: Record> {
    pub id: T::Id,
    /// Visible record at the moment it was removed.
    pub record: T,
    pub index: usize,
}

/// One visible row.
#[derive(Debug, Clone)]
pub struct Entry<T: Record> {
    key: RecordKey<T::Id>,
    base: T,
    in_flight: Vec<(MutationId, T::Patch)>,
    view: T,
}

impl<T: Record> Entry<T> {
    fn pending(id: PendingId, draft: T) -> Self {
        Self {
            key: RecordKey::Pending(id),
            base: draft.clone(),
            in_flight: Vec::new(),
            view: draft,
        }
    }

    fn confirmed(record: T) -> Self {
        Self {
            key: RecordKey::Confirmed(record.id()),
            base: record.clone(),
            in_flight: Vec::new(),
            view: record,
        }
    }

    fn recompute(&mut self) {
        let mut view = self.base.clone();
        for (_, patch) in &self.in_flight {
            view.apply_patch(patch);
        }
        self.view = view;
    }

    fn take_patch(&mut self, mutation: MutationId) -> Option<T::Patch> {
        let index = self.in_flight.iter().position(|(id, _)| *id == mutation)?;
        Some(self.in_flight.remove(index).1)
    }

    fn has_id(&self, id: &T::Id) -> bool {
        matches!(&self.key, RecordKey::Confirmed(existing) if existing == id)
    }

    pub fn key(&self) -> &RecordKey<T::Id> {
        &self.key
    }

    pub fn state(&self) -> ItemState {
        match self.key {
            RecordKey::Pending(_) => ItemState::Pending,
            RecordKey::Confirmed(_) => ItemState::Confirmed,
        }
    }

    /// The record as it should be displayed.
    pub fn record(&self) -> &T {
        &self.view
    }

    /// Number of mutations applied to this entry but not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Client-side collection with optimistic create, mutate and delete.
#[derive(Debug)]
pub struct OptimisticCollection<T: Record> {
    entries: Vec<Entry<T>>,
    deleting: HashMap<T::Id, (Entry<T>, usize)>,
    next_pending: u64,
    next_mutation: u64,
}

impl<T: Record> Default for OptimisticCollection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            deleting: HashMap::new(),
            next_pending: 0,
            next_mutation: 0,
        }
    }
}

impl<T: Record> OptimisticCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection seeded with confirmed records, in order.
    pub fn from_confirmed(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            entries: records.into_iter().map(Entry::confirmed).collect(),
            ..Self::default()
        }
    }

    fn position_pending(&self, pending: PendingId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.key == RecordKey::Pending(pending))
    }

    fn position_id(&self, id: &T::Id) -> Option<usize> {
        self.entries.iter().position(|e| e.has_id(id))
    }

    fn entry_for_id_mut(&mut self, id: &T::Id) -> Option<&mut Entry<T>> {
        match self.position_id(id) {
            Some(index) => self.entries.get_mut(index),
            None => self.deleting.get_mut(id).map(|(entry, _)| entry),
        }
    }

    fn resolve_key(&self, key: &RecordKey<T::Id>) -> Result<usize, SyncError> {
        match key {
            RecordKey::Pending(pending) => match self.position_pending(*pending) {
                Some(_) => Err(SyncError::StillPending),
                None => Err(SyncError::NotFound),
            },
            RecordKey::Confirmed(id) => self.position_id(id).ok_or(SyncError::NotFound),
        }
    }

    /// Show `draft` at the front as a pending entry.
    pub fn apply_create(&mut self, draft: T) -> PendingId {
        let pending = self.reserve_pending();
        self.entries.insert(0, Entry::pending(pending, draft));
        pending
    }

    /// Allocate a pending id without showing a placeholder.
    ///
    /// For creates whose row lives outside this collection's current view.
    pub fn reserve_pending(&mut self) -> PendingId {
        self.next_pending += 1;
        PendingId(self.next_pending)
    }

    /// Replace the placeholder with the server's record.
    ///
    /// When the placeholder is gone the record is inserted at the front. A
    /// confirmed row with the same id (a refetch that raced ahead) is replaced
    /// rather than duplicated.
    pub fn confirm_create(&mut self, pending: PendingId, record: T) {
        let id = record.id();
        let placeholder = self.position_pending(pending);
        let duplicate = self.position_id(&id);

        match (placeholder, duplicate) {
            (Some(slot), Some(dup)) => {
                self.entries.remove(dup);
                let slot = if dup < slot { slot - 1 } else { slot };
                self.entries[slot] = Entry::confirmed(record);
            }
            (Some(slot), None) => self.entries[slot] = Entry::confirmed(record),
            (None, Some(dup)) => {
                let entry = &mut self.entries[dup];
                entry.base = record;
                entry.recompute();
            }
            (None, None) => self.entries.insert(0, Entry::confirmed(record)),
        }
    }

    /// Drop the placeholder after a failed create.
    ///
    /// # Returns
    /// The draft that was shown, if the placeholder was still present.
    pub fn reject_create(&mut self, pending: PendingId, reason: &str) -> Option<T> {
        let index = self.position_pending(pending)?;
        tracing::debug!("create {} rejected: {}", pending, reason);
        Some(self.entries.remove(index).view)
    }

    /// Apply `patch` to a confirmed record in place.
    ///
    /// # Errors
    /// [`SyncError::StillPending`] for entries whose create is unconfirmed and
    /// [`SyncError::NotFound`] for unknown keys.
    pub fn apply_mutate(
        &mut self,
        key: &RecordKey<T::Id>,
        patch: T::Patch,
    ) -> Result<MutationTicket<T>, SyncError> {
        let index = self.resolve_key(key)?;
        self.next_mutation += 1;
        let mutation = MutationId(self.next_mutation);

        let entry = &mut self.entries[index];
        let previous = entry.view.clone();
        entry.in_flight.push((mutation, patch.clone()));
        entry.view.apply_patch(&patch);

        Ok(MutationTicket {
            id: previous.id(),
            mutation,
            previous,
            patch,
        })
    }

    /// Completion hook for a successful mutation.
    ///
    /// Folds the patch into the confirmed base; the visible record is left
    /// as is.
    pub fn confirm_mutate(&mut self, ticket: &MutationTicket<T>) {
        if let Some(entry) = self.entry_for_id_mut(&ticket.id) {
            if let Some(patch) = entry.take_patch(ticket.mutation) {
                entry.base.apply_patch(&patch);
            }
        }
    }

    /// Completion hook for a successful mutation that returned the
    /// authoritative record. Remaining in-flight patches are re-applied on
    /// top of it.
    pub fn confirm_mutate_with(&mut self, ticket: &MutationTicket<T>, record: T) {
        if let Some(entry) = self.entry_for_id_mut(&ticket.id) {
            entry.take_patch(ticket.mutation);
            entry.base = record;
            entry.recompute();
        }
    }

    /// Withdraw a failed mutation's patch.
    ///
    /// With no other mutation in flight this restores `ticket.previous`
    /// exactly; newer in-flight or confirmed changes are kept.
    ///
    /// # Returns
    /// `true` when the patch was still tracked.
    pub fn reject_mutate(&mut self, ticket: &MutationTicket<T>) -> bool {
        let Some(entry) = self.entry_for_id_mut(&ticket.id) else {
            return false;
        };
        if entry.take_patch(ticket.mutation).is_none() {
            return false;
        }
        entry.recompute();
        true
    }

    /// Remove a confirmed record immediately.
    ///
    /// The entry is held aside until [`Self::confirm_delete`] or
    /// [`Self::reject_delete`]; refetches do not bring it back meanwhile.
    ///
    /// # Errors
    /// [`SyncError::StillPending`] for unconfirmed entries and
    /// [`SyncError::NotFound`] for unknown keys.
    pub fn apply_delete(&mut self, key: &RecordKey<T::Id>) -> Result<Removed<T>, SyncError> {
        let index = self.resolve_key(key)?;
        let entry = self.entries.remove(index);
        let id = entry.view.id();
        let removed = Removed {
            id: id.clone(),
            record: entry.view.clone(),
            index,
        };
        self.deleting.insert(id, (entry, index));
        Ok(removed)
    }

    /// Put a record back after a failed delete, at its original index
    /// (clamped to the current length). Repeated calls are no-ops.
    ///
    /// # Returns
    /// `true` when the record was restored by this call.
    pub fn reject_delete(&mut self, removed: &Removed<T>) -> bool {
        let Some((entry, index)) = self.deleting.remove(&removed.id) else {
            return false;
        };
        if self.position_id(&removed.id).is_some() {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        true
    }

    /// Completion hook for a successful delete.
    pub fn confirm_delete(&mut self, id: &T::Id) {
        self.deleting.remove(id);
    }

    /// Replace confirmed rows with an authoritative listing.
    ///
    /// Pending placeholders stay at the front, in-flight patches are
    /// re-applied on top of the fresh rows, and records being deleted stay
    /// hidden.
    pub fn replace_confirmed(&mut self, records: impl IntoIterator<Item = T>) {
        let mut previous: HashMap<T::Id, Entry<T>> = HashMap::new();
        let mut next = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match &entry.key {
                RecordKey::Pending(_) => next.push(entry),
                RecordKey::Confirmed(id) => {
                    previous.insert(id.clone(), entry);
                }
            }
        }

        for record in records {
            let id = record.id();
            if let Some((held, _)) = self.deleting.get_mut(&id) {
                held.base = record;
                held.recompute();
                continue;
            }
            let entry = match previous.remove(&id) {
                Some(mut entry) if !entry.in_flight.is_empty() => {
                    entry.base = record;
                    entry.recompute();
                    entry
                }
                _ => Entry::confirmed(record),
            };
            next.push(entry);
        }
        self.entries = next;
    }

    /// Forget every entry and unresolved delete.
    ///
    /// Placeholder and mutation counters keep running, so completions for
    /// dropped entries cannot be mistaken for new ones.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deleting.clear();
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|e| &e.view)
    }

    pub fn get(&self, key: &RecordKey<T::Id>) -> Option<&T> {
        match key {
            RecordKey::Pending(pending) => self
                .position_pending(*pending)
                .map(|index| &self.entries[index].view),
            RecordKey::Confirmed(id) => self.position_id(id).map(|index| &self.entries[index].view),
        }
    }

    pub fn state_of(&self, key: &RecordKey<T::Id>) -> Option<ItemState> {
        match key {
            RecordKey::Pending(pending) => {
                self.position_pending(*pending).map(|_| ItemState::Pending)
            }
            RecordKey::Confirmed(id) => self.position_id(id).map(|_| ItemState::Confirmed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state() == ItemState::Pending)
            .count()
    }

    /// Ids held aside by unresolved deletes.
    pub fn deleting(&self) -> impl Iterator<Item = &T::Id> + '_ {
        self.deleting.keys()
    }
}

#[cfg(test)]
mod tests;
