// 🪪 Card Entity - the only persisted record
//
// "id is IDENTITY (never changes), serial number is what the reader sees"
//
// - id: UUID assigned at creation, never reused
// - serial_number: scanned, typed, or synthesized for merged cards
// - floors: elevator floors this card opens (a set, stored in order)

use crate::config::{DEFAULT_CARD_NAME, DEFAULT_FLOOR, MERGED_SERIAL_PREFIX};
use crate::error::{LiftKeyError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CARD TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Pre-existing / legacy card
    Old,

    /// Freshly scanned or entered physical card
    New,

    /// Synthetic card produced by the merge engine
    Merged,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Old => "old",
            CardType::New => "new",
            CardType::Merged => "merged",
        }
    }
}

// ============================================================================
// CARD ENTITY
// ============================================================================

/// A stored card. Fields are read-only after construction.
///
/// Serialized with camelCase names (`serialNumber`, `createdAt`, `type`) so
/// the persisted blob keeps the layout the web app used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: String,
    name: String,
    serial_number: String,
    floors: Vec<i32>,
    /// Epoch milliseconds
    created_at: i64,
    #[serde(rename = "type")]
    card_type: CardType,
}

impl Card {
    /// Create a card from already-validated floors.
    ///
    /// The serial is trimmed and must not be empty. A blank name becomes
    /// the default label.
    pub fn new(name: &str, serial_number: &str, floors: Vec<i32>, card_type: CardType) -> Result<Self> {
        let serial_number = serial_number.trim();
        if serial_number.is_empty() {
            return Err(LiftKeyError::EmptyIdentifier);
        }

        let name = name.trim();
        let name = if name.is_empty() { DEFAULT_CARD_NAME } else { name };

        Ok(Card {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            serial_number: serial_number.to_string(),
            floors,
            created_at: Utc::now().timestamp_millis(),
            card_type,
        })
    }

    /// Create a card from raw form input. Floors are parsed leniently and
    /// never cause an error.
    pub fn from_form(name: &str, serial_number: &str, floors_input: &str, card_type: CardType) -> Result<Self> {
        Card::new(name, serial_number, parse_floors(floors_input), card_type)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn floors(&self) -> &[i32] {
        &self.floors
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }

    pub fn has_floor(&self, floor: i32) -> bool {
        self.floors.contains(&floor)
    }

    /// Floors joined for display, e.g. "1, 3, 5"
    pub fn floor_label(&self) -> String {
        self.floors
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True when the serial was synthesized rather than read from a tag
    pub fn is_synthetic(&self) -> bool {
        self.card_type == CardType::Merged && self.serial_number.starts_with(MERGED_SERIAL_PREFIX)
    }
}

// ============================================================================
// FLOOR PARSING
// ============================================================================

/// Parse a comma-separated floor list.
///
/// Each token contributes its leading integer ("4th" → 4, "2.5" → 2, "-1" → -1);
/// tokens without one are dropped, as are repeats. An empty result becomes
/// `[DEFAULT_FLOOR]`.
pub fn parse_floors(input: &str) -> Vec<i32> {
    let mut floors = Vec::new();

    for floor in input.split(',').filter_map(|token| leading_integer(token.trim())) {
        if !floors.contains(&floor) {
            floors.push(floor);
        }
    }

    if floors.is_empty() {
        floors.push(DEFAULT_FLOOR);
    }

    floors
}

fn leading_integer(token: &str) -> Option<i32> {
    let digits_start = usize::from(token.starts_with('-') || token.starts_with('+'));
    let digits_len = token[digits_start..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if digits_len == 0 {
        return None;
    }

    token[..digits_start + digits_len].parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================
