// 📶 Emulation Session - present one card at a reader, or export it
//
// idle → presenting → (written | shared | closed)
//
// Holds a copy of the card; nothing here writes back to the vault.
// Errors are shown for a fixed interval, then the session returns to
// presenting on the next `tick`.

use crate::capability::{Capability, CapabilityError, Clipboard, ShareSheet, TagPayload, TagWriter};
use crate::card::Card;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareChannel {
    ShareSheet,
    /// Share sheet unavailable, text copied instead
    Clipboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmulationState {
    Idle,
    Presenting,
    Written,
    Shared { channel: ShareChannel },
    Error { message: String, until: DateTime<Utc> },
}

/// How the card can leave this device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPath {
    WriteTag,
    /// No tag writer on this platform; share the data instead
    ShareOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Permanent for this session, not retried
    Unavailable,
    Failed(String),
    /// No card is being presented
    NotPresenting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared(ShareChannel),
    Failed(String),
    /// No card is being presented
    NotPresenting,
}

impl TagPayload {
    pub fn from_card(card: &Card) -> Self {
        TagPayload {
            serial_number: card.serial_number().to_string(),
            floors: card.floors().to_vec(),
        }
    }
}

/// Plain-text export of a card
pub fn share_text(card: &Card) -> String {
    format!(
        "{}\nUID: {}\nFloors: {}",
        card.name(),
        card.serial_number(),
        card.floor_label()
    )
}

pub struct EmulationSession {
    state: EmulationState,
    card: Option<Card>,
    writer: Capability<Box<dyn TagWriter>>,
    share_sheet: Capability<Box<dyn ShareSheet>>,
    clipboard: Box<dyn Clipboard>,
    error_display: Duration,
}

impl EmulationSession {
    pub fn new(
        writer: Capability<Box<dyn TagWriter>>,
        share_sheet: Capability<Box<dyn ShareSheet>>,
        clipboard: Box<dyn Clipboard>,
        error_display: Duration,
    ) -> Self {
        EmulationSession {
            state: EmulationState::Idle,
            card: None,
            writer,
            share_sheet,
            clipboard,
            error_display,
        }
    }

    pub fn state(&self) -> &EmulationState {
        &self.state
    }

    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    /// Present a card, replacing whatever session was active
    pub fn open(&mut self, card: &Card) {
        tracing::info!(id = %card.id(), serial = %card.serial_number(), "presenting card");
        self.card = Some(card.clone());
        self.state = EmulationState::Presenting;
    }

    pub fn transfer_path(&self) -> TransferPath {
        if self.writer.is_available() {
            TransferPath::WriteTag
        } else {
            TransferPath::ShareOnly
        }
    }

    fn fail(&mut self, message: String, now: DateTime<Utc>) {
        tracing::warn!(reason = %message, "emulation error");
        self.state = EmulationState::Error {
            message,
            until: now
                .checked_add_signed(self.error_display)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
    }

    /// Write the presented card to a new tag
    pub fn write_tag(&mut self, now: DateTime<Utc>) -> WriteOutcome {
        if self.state != EmulationState::Presenting {
            return WriteOutcome::NotPresenting;
        }
        let payload = match self.card.as_ref() {
            Some(card) => TagPayload::from_card(card),
            None => return WriteOutcome::NotPresenting,
        };

        let result = match self.writer.as_mut() {
            Some(writer) => writer.write(&payload),
            None => return WriteOutcome::Unavailable,
        };

        match result {
            Ok(()) => {
                tracing::info!(serial = %payload.serial_number, "card written to tag");
                self.state = EmulationState::Written;
                WriteOutcome::Written
            }
            Err(CapabilityError::Unavailable) => {
                // Writer vanished mid-session: treat as permanently gone
                self.writer = Capability::Unavailable;
                self.fail(CapabilityError::Unavailable.to_string(), now);
                WriteOutcome::Unavailable
            }
            Err(e) => {
                let message = e.to_string();
                self.fail(message.clone(), now);
                WriteOutcome::Failed(message)
            }
        }
    }

    /// Share the presented card as text, via the share sheet or the clipboard
    pub fn share(&mut self, now: DateTime<Utc>) -> ShareOutcome {
        if self.state != EmulationState::Presenting {
            return ShareOutcome::NotPresenting;
        }
        let text = match self.card.as_ref() {
            Some(card) => share_text(card),
            None => return ShareOutcome::NotPresenting,
        };

        let (channel, result) = match self.share_sheet.as_mut() {
            Some(sheet) => (ShareChannel::ShareSheet, sheet.share(&text)),
            None => (ShareChannel::Clipboard, self.clipboard.copy(&text)),
        };

        match result {
            Ok(()) => {
                self.state = EmulationState::Shared { channel };
                ShareOutcome::Shared(channel)
            }
            Err(e) => {
                let message = e.to_string();
                self.fail(message.clone(), now);
                ShareOutcome::Failed(message)
            }
        }
    }

    /// Let an expired error revert to presenting
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let EmulationState::Error { until, .. } = &self.state {
            if now >= *until {
                self.state = EmulationState::Presenting;
            }
        }
    }

    /// End the session from any state
    pub fn close(&mut self) {
        self.card = None;
        self.state = EmulationState::Idle;
    }
}

// ============================================================================
// TESTS
// ============================================================================
