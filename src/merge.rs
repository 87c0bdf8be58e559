// 🔀 Merge Engine - Fold every source into one duplicate-free mapping
// Collisions are resolved by source rank; the winner replaces the whole record

use crate::identity::{match_key, MatchKey};
use crate::record::FilmRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// MERGE OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// No existing record shared the key
    Inserted,

    /// Incoming record outranked the existing one and took its place
    Replaced,

    /// Existing record kept, incoming dropped
    Discarded,
}

// ============================================================================
// COLLISION
// ============================================================================

/// One resolved collision, kept for logging and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collision {
    pub key: MatchKey,

    /// Identity of the record that stays in the mapping
    pub kept: String,

    /// Identity of the record that was dropped
    pub discarded: String,

    pub outcome: MergeOutcome,

    /// Human-readable reason
    pub reason: String,
}

// ============================================================================
// MERGE ENGINE
// ============================================================================

/// Merged mapping plus indexes by match key and by identity.
///
/// Records live in `slots` in first-seen order; a replacement reuses the slot
/// of the record it displaces.
#[derive(Debug, Default)]
pub struct MergeEngine {
    slots: Vec<FilmRecord>,
    by_key: HashMap<MatchKey, usize>,
    by_identity: HashMap<String, usize>,
    collisions: Vec<Collision>,
    fed: usize,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record
    pub fn insert(&mut self, incoming: FilmRecord) -> MergeOutcome {
        self.fed += 1;
        let key = match_key(&incoming);

        let key_slot = self.by_key.get(&key).copied();
        let identity_slot = self.by_identity.get(&incoming.identity).copied();

        // Same identity filed under another title/year: first-seen wins
        if let Some(slot) = identity_slot {
            if key_slot != Some(slot) {
                let kept = self.slots[slot].identity.clone();
                let reason = format!(
                    "identity {} already merged as \"{}\"",
                    incoming.identity, self.slots[slot].title
                );
                self.record_collision(key, kept, incoming.identity, MergeOutcome::Discarded, reason);
                return MergeOutcome::Discarded;
            }
        }

        let slot = match key_slot {
            Some(slot) => slot,
            None => {
                self.by_key.insert(key, self.slots.len());
                self.by_identity
                    .insert(incoming.identity.clone(), self.slots.len());
                self.slots.push(incoming);
                return MergeOutcome::Inserted;
            }
        };

        let existing_rank = self.slots[slot].source.rank();
        let incoming_rank = incoming.source.rank();

        if incoming_rank < existing_rank {
            let previous = std::mem::replace(&mut self.slots[slot], incoming);
            self.by_identity.remove(&previous.identity);
            self.by_identity
                .insert(self.slots[slot].identity.clone(), slot);

            let reason = format!(
                "{} (rank {}) outranks {} (rank {})",
                self.slots[slot].source, incoming_rank, previous.source, existing_rank
            );
            let kept = self.slots[slot].identity.clone();
            self.record_collision(key, kept, previous.identity, MergeOutcome::Replaced, reason);
            MergeOutcome::Replaced
        } else {
            let reason = if incoming_rank == existing_rank {
                format!("tie at rank {}, first seen kept", existing_rank)
            } else {
                format!(
                    "{} (rank {}) outranks {} (rank {})",
                    self.slots[slot].source, existing_rank, incoming.source, incoming_rank
                )
            };
            let kept = self.slots[slot].identity.clone();
            self.record_collision(key, kept, incoming.identity, MergeOutcome::Discarded, reason);
            MergeOutcome::Discarded
        }
    }

    /// Merge a batch in order
    pub fn merge_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = FilmRecord>,
    {
        for record in records {
            self.insert(record);
        }
    }

    fn record_collision(
        &mut self,
        key: MatchKey,
        kept: String,
        discarded: String,
        outcome: MergeOutcome,
        reason: String,
    ) {
        tracing::debug!(key = %key, kept = %kept, discarded = %discarded, "{}", reason);
        self.collisions.push(Collision {
            key,
            kept,
            discarded,
            outcome,
            reason,
        });
    }

    /// Number of records dropped because another record shared their key
    pub fn duplicate_count(&self) -> usize {
        self.collisions.len()
    }

    /// Records fed so far
    pub fn fed_count(&self) -> usize {
        self.fed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.by_identity.contains_key(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&FilmRecord> {
        self.by_identity.get(identity).map(|&slot| &self.slots[slot])
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Merged records in first-seen order
    pub fn records(&self) -> &[FilmRecord] {
        &self.slots
    }

    pub fn into_records(self) -> Vec<FilmRecord> {
        self.slots
    }
}

// ============================================================================
// TESTS
// ============================================================================
