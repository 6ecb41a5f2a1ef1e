// LiftKey - Core Library
// Card vault, merge, acquisition and emulation; used by the CLI/TUI, the API server, and tests

pub mod error;
pub mod config;
pub mod logging;
pub mod card;        // Card entity + floor parsing
pub mod storage;     // Keyed-blob persistence (SQLite / memory)
pub mod vault;       // Vault Store
pub mod merge;       // Merge Engine
pub mod capability;  // Injected platform capabilities
pub mod bridge;      // Out-of-band identifier delivery
pub mod acquisition; // Acquisition state machine + session
pub mod emulation;   // Emulation / presentation session

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{LiftKeyError, Result};
pub use config::Config;
pub use card::{Card, CardType, parse_floors};
pub use storage::{CardStorage, SqliteStorage, MemoryStorage};
pub use vault::VaultStore;
pub use merge::{MergeEngine, union_floors, synthesize_serial};
pub use capability::{
    Capability, CapabilityError, Platform,
    TagScanner, TagWriter, ShareSheet, Clipboard, TagPayload, MemoryClipboard,
};
pub use bridge::{BridgeInbox, PendingBridge, uid_from_url, shortcut_url};
pub use acquisition::{
    AcquisitionState, AcquisitionEvent, AcquisitionSession, AcquisitionForm, ScanStart,
};
pub use emulation::{
    EmulationSession, EmulationState, ShareChannel, ShareOutcome, TransferPath, WriteOutcome,
    share_text,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
