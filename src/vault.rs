// 🔐 Vault Store - the authoritative, ordered card list
//
// Owns every Card. Other components get read-only views; the only mutation
// paths are `add` and `remove`, and each one persists immediately.

use crate::card::Card;
use crate::error::Result;
use crate::merge::MergeEngine;
use crate::storage::CardStorage;

pub struct VaultStore<S: CardStorage> {
    storage: S,
    cards: Vec<Card>,
    /// Card ids marked for the next merge, in the order they were picked
    selection: Vec<String>,
}

impl<S: CardStorage> VaultStore<S> {
    /// Load the vault from storage. Never fails; bad data is an empty vault.
    pub fn open(storage: S) -> Self {
        let cards = storage.load();
        tracing::info!(cards = cards.len(), "vault loaded");

        VaultStore {
            storage,
            cards,
            selection: Vec::new(),
        }
    }

    // ========================================================================
    // READ
    // ========================================================================

    /// Cards in insertion (display) order
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // MUTATE
    // ========================================================================

    /// Append a card and persist. Always succeeds.
    pub fn add(&mut self, card: Card) -> &Card {
        tracing::info!(
            id = %card.id(),
            serial = %card.serial_number(),
            card_type = card.card_type().as_str(),
            "card added"
        );

        self.cards.push(card);
        self.persist();

        let last = self.cards.len() - 1;
        &self.cards[last]
    }

    /// Remove a card by id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Card> {
        let position = self.cards.iter().position(|c| c.id() == id)?;
        let removed = self.cards.remove(position);
        self.selection.retain(|selected| selected != id);
        self.persist();

        tracing::info!(id, "card removed");
        Some(removed)
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.cards) {
            tracing::error!(error = %e, cards = self.cards.len(), "failed to persist vault");
        }
    }

    // ========================================================================
    // MERGE SELECTION
    // ========================================================================

    /// Flip a card in or out of the merge selection.
    ///
    /// Returns whether the card is selected afterwards; unknown ids are ignored.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if let Some(position) = self.selection.iter().position(|s| s == id) {
            self.selection.remove(position);
            return false;
        }

        if self.get(id).is_none() {
            return false;
        }

        self.selection.push(id.to_string());
        true
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selection
    }

    /// Selected cards, in vault order
    pub fn selected_cards(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|c| self.is_selected(c.id()))
            .collect()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Merge the selected cards, add the result and clear the selection
    pub fn merge_selected(&mut self, engine: &MergeEngine, name: Option<&str>) -> Result<Card> {
        let merged = engine.merge(&self.selected_cards(), name)?;
        self.add(merged.clone());
        self.clear_selection();
        Ok(merged)
    }
}

// ============================================================================
// TESTS
// ============================================================================
