// 🔀 Merge Engine - one synthetic card from many
//
// The merged card opens exactly the floors that at least one source card
// opens: a sorted set union, nothing more.

use crate::card::{Card, CardType};
use crate::config::{DEFAULT_MERGED_NAME, MERGED_SERIAL_PREFIX};
use crate::error::{LiftKeyError, Result};
use std::collections::BTreeSet;

/// Sorted, duplicate-free union of the cards' floors
pub fn union_floors<'a, I>(cards: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a Card>,
{
    cards
        .into_iter()
        .flat_map(|card| card.floors().iter().copied())
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .collect()
}

/// Build a serial that cannot be mistaken for a scanned one:
/// `MK-<first 8 floor digits>-<4 random hex>`
pub fn synthesize_serial(floors: &[i32]) -> String {
    let digits: String = floors
        .iter()
        .map(|f| f.to_string())
        .collect::<String>()
        .chars()
        .take(8)
        .collect();

    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();

    format!("{}{}-{}", MERGED_SERIAL_PREFIX, digits, suffix)
}

pub struct MergeEngine {
    /// Name used when the caller does not provide one
    pub default_name: String,
}

impl MergeEngine {
    pub fn new() -> Self {
        MergeEngine {
            default_name: DEFAULT_MERGED_NAME.to_string(),
        }
    }

    pub fn with_default_name(name: &str) -> Self {
        MergeEngine {
            default_name: name.to_string(),
        }
    }

    /// Merge the given cards into a new `merged` card.
    ///
    /// Any non-empty input is accepted, including a single card. The sources
    /// are not modified.
    pub fn merge(&self, cards: &[&Card], name: Option<&str>) -> Result<Card> {
        if cards.is_empty() {
            return Err(LiftKeyError::EmptySelection);
        }

        let floors = union_floors(cards.iter().copied());
        let serial = synthesize_serial(&floors);
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.default_name);

        let card = Card::new(name, &serial, floors, CardType::Merged)?;

        tracing::info!(
            sources = cards.len(),
            floors = %card.floor_label(),
            serial = %card.serial_number(),
            "merged cards"
        );

        Ok(card)
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}
