// 📲 Acquisition - scan, bridge, or manual entry → new Card
//
// idle → (scanning | ios-help | manual) → detected → idle
//
// The state machine is a plain enum with one transition function; the
// session wraps it with the form fields and the platform capabilities.

use crate::bridge::BridgeInbox;
use crate::capability::{Capability, Platform, TagScanner};
use crate::card::{Card, CardType};
use crate::storage::CardStorage;
use crate::vault::VaultStore;

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,

    /// Native reader is armed, waiting for a tag
    Scanning,

    /// No native scanning; user is shown the bridge procedure
    IosHelp,

    /// User types the identifier
    Manual,

    /// Identifier known (tag read or bridged), form pre-filled
    Detected { serial: String },

    /// Reader failed after it started
    Error { message: String },
}

/// Outcome of trying to begin a native scan when a flow opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStart {
    /// Platform offers no native scanning at all
    BridgeOnly,
    Started,
    /// Capability absent or the start was rejected
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionEvent {
    Open { bridged: Option<String>, scan: ScanStart },
    TagRead(String),
    ScanFailed(String),
    EnterManually,
    Saved,
    Cancel,
}

impl AcquisitionState {
    pub fn transition(self, event: AcquisitionEvent) -> AcquisitionState {
        use AcquisitionEvent as E;
        use AcquisitionState as S;

        match (self, event) {
            // Opening always starts over, whatever was active
            (_, E::Open { bridged, scan }) => match bridged.filter(|b| !b.trim().is_empty()) {
                Some(serial) => S::Detected { serial: serial.trim().to_string() },
                None => match scan {
                    ScanStart::BridgeOnly => S::IosHelp,
                    ScanStart::Started => S::Scanning,
                    ScanStart::Unavailable => S::Manual,
                },
            },

            (_, E::Cancel) => S::Idle,

            (S::Scanning, E::TagRead(serial)) if !serial.trim().is_empty() => S::Detected {
                serial: serial.trim().to_string(),
            },
            (S::Scanning, E::ScanFailed(message)) => S::Error { message },

            (S::IosHelp, E::EnterManually) | (S::Error { .. }, E::EnterManually) => S::Manual,

            (S::Manual, E::Saved) | (S::Detected { .. }, E::Saved) => S::Idle,

            (state, _) => state,
        }
    }

    /// Manual and Detected both show the editable card form
    pub fn is_form(&self) -> bool {
        matches!(self, AcquisitionState::Manual | AcquisitionState::Detected { .. })
    }

    pub fn detected_serial(&self) -> Option<&str> {
        match self {
            AcquisitionState::Detected { serial } => Some(serial),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Scanning => "scanning",
            AcquisitionState::IosHelp => "ios-help",
            AcquisitionState::Manual => "manual",
            AcquisitionState::Detected { .. } => "detected",
            AcquisitionState::Error { .. } => "error",
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Transient form fields, discarded on save or cancel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionForm {
    pub manual_serial: String,
    pub name: String,
    pub floors: String,
}

pub struct AcquisitionSession {
    state: AcquisitionState,
    form: AcquisitionForm,
    platform: Platform,
    scanner: Capability<Box<dyn TagScanner>>,
}

impl AcquisitionSession {
    pub fn new(platform: Platform, scanner: Capability<Box<dyn TagScanner>>) -> Self {
        AcquisitionSession {
            state: AcquisitionState::Idle,
            form: AcquisitionForm::default(),
            platform,
            scanner,
        }
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn form(&self) -> &AcquisitionForm {
        &self.form
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn apply(&mut self, event: AcquisitionEvent) {
        let from = self.state.name();
        let state = std::mem::replace(&mut self.state, AcquisitionState::Idle);
        self.state = state.transition(event);
        tracing::debug!(from, to = self.state.name(), "acquisition transition");
    }

    /// Start a flow, resetting any flow already in progress.
    ///
    /// A pending bridged identifier is consumed and wins over scanning.
    pub fn open(&mut self, bridge: &mut dyn BridgeInbox) {
        self.stop_scanner();
        self.form = AcquisitionForm::default();

        let bridged = bridge.take();
        let scan = if bridged.is_some() {
            ScanStart::Unavailable
        } else if self.platform.lacks_native_scan() {
            ScanStart::BridgeOnly
        } else {
            self.start_scanner()
        };

        if let Some(ref uid) = bridged {
            tracing::info!(serial = %uid, "bridged identifier received");
        }

        self.apply(AcquisitionEvent::Open { bridged, scan });
    }

    fn start_scanner(&mut self) -> ScanStart {
        match self.scanner.as_mut() {
            Some(scanner) => match scanner.start() {
                Ok(()) => ScanStart::Started,
                Err(e) => {
                    tracing::warn!(error = %e, "scan could not start, falling back to manual entry");
                    ScanStart::Unavailable
                }
            },
            None => ScanStart::Unavailable,
        }
    }

    fn stop_scanner(&mut self) {
        if self.state == AcquisitionState::Scanning {
            if let Some(scanner) = self.scanner.as_mut() {
                scanner.stop();
            }
        }
    }

    /// A tag was read by the native scanner
    pub fn on_tag_read(&mut self, serial: &str) {
        let was_scanning = self.state == AcquisitionState::Scanning;
        self.apply(AcquisitionEvent::TagRead(serial.to_string()));
        if was_scanning && self.state.detected_serial().is_some() {
            if let Some(scanner) = self.scanner.as_mut() {
                scanner.stop();
            }
        }
    }

    /// The scanner failed mid-operation
    pub fn on_scan_error(&mut self, message: &str) {
        tracing::warn!(reason = message, "scan failed");
        self.stop_scanner();
        self.apply(AcquisitionEvent::ScanFailed(message.to_string()));
    }

    pub fn enter_manually(&mut self) {
        self.apply(AcquisitionEvent::EnterManually);
    }

    pub fn set_manual_serial(&mut self, serial: &str) {
        self.form.manual_serial = serial.to_string();
    }

    pub fn set_name(&mut self, name: &str) {
        self.form.name = name.to_string();
    }

    pub fn set_floors(&mut self, floors: &str) {
        self.form.floors = floors.to_string();
    }

    /// Detected serial if there is one, otherwise what the user typed
    pub fn final_serial(&self) -> Option<String> {
        self.state
            .detected_serial()
            .map(str::to_string)
            .or_else(|| Some(self.form.manual_serial.trim().to_string()))
            .filter(|s| !s.is_empty())
    }

    /// Commit the form as a new card.
    ///
    /// A no-op (returns `None`) outside the form states or without an
    /// identifier.
    pub fn save<S: CardStorage>(&mut self, vault: &mut VaultStore<S>) -> Option<Card> {
        if !self.state.is_form() {
            return None;
        }
        let serial = self.final_serial()?;

        let card = match Card::from_form(&self.form.name, &serial, &self.form.floors, CardType::New) {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!(error = %e, "card not saved");
                return None;
            }
        };

        vault.add(card.clone());
        self.form = AcquisitionForm::default();
        self.apply(AcquisitionEvent::Saved);
        Some(card)
    }

    /// Discard everything and return to idle. The vault is not touched.
    pub fn cancel(&mut self) {
        self.stop_scanner();
        self.form = AcquisitionForm::default();
        self.apply(AcquisitionEvent::Cancel);
    }
}

// ============================================================================
// TESTS
// ============================================================================
