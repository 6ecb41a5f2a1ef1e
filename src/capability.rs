// 📡 Platform capabilities - scan, write-to-tag, share, clipboard
//
// Capabilities are resolved once when a session starts and handed in as
// `Capability::Available(handle)` or `Capability::Unavailable`. Nothing in
// the core probes the platform at call time.

use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The platform does not offer this capability at all
    #[error("capability unavailable on this platform")]
    Unavailable,

    /// The platform refused (permission denied, user dismissed)
    #[error("capability rejected: {0}")]
    Rejected(String),

    /// The operation started and then failed
    #[error("capability failed: {0}")]
    Failed(String),
}

// ============================================================================
// CAPABILITY HANDLE
// ============================================================================

#[derive(Debug)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn from_option(handle: Option<T>) -> Self {
        match handle {
            Some(handle) => Capability::Available(handle),
            None => Capability::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Capability::Available(handle) => Some(handle),
            Capability::Unavailable => None,
        }
    }
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Native tag reader. Detected serials arrive later as session events.
pub trait TagScanner {
    fn start(&mut self) -> Result<(), CapabilityError>;

    fn stop(&mut self) {}
}

/// Writes a card's payload onto a fresh physical tag
pub trait TagWriter {
    fn write(&mut self, payload: &TagPayload) -> Result<(), CapabilityError>;
}

/// Platform share sheet
pub trait ShareSheet {
    fn share(&mut self, text: &str) -> Result<(), CapabilityError>;
}

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), CapabilityError>;
}

/// What gets written to a tag when a card is exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPayload {
    pub serial_number: String,
    pub floors: Vec<i32>,
}

// ============================================================================
// PLATFORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// No native scanning from the app; identifiers arrive via the bridge
    Ios,
    Android,
    Desktop,
}

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if ["iPad", "iPhone", "iPod"].iter().any(|d| user_agent.contains(d)) {
            Platform::Ios
        } else if user_agent.contains("Android") {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }

    /// Parse a configured platform name, unknown names map to Desktop
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "ios" | "iphone" | "ipad" => Platform::Ios,
            "android" => Platform::Android,
            _ => Platform::Desktop,
        }
    }

    pub fn lacks_native_scan(&self) -> bool {
        matches!(self, Platform::Ios)
    }
}

// ============================================================================
// IN-PROCESS CLIPBOARD
// ============================================================================

/// Clipboard that keeps the last copied text in memory.
///
/// Clones share one buffer, so a handle kept outside a session sees what
/// the session copied.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<(), CapabilityError> {
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_user_agent() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        let pixel = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120.0";
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0";

        assert_eq!(Platform::from_user_agent(iphone), Platform::Ios);
        assert_eq!(Platform::from_user_agent(pixel), Platform::Android);
        assert_eq!(Platform::from_user_agent(desktop), Platform::Desktop);
        assert!(Platform::Ios.lacks_native_scan());
        assert!(!Platform::Android.lacks_native_scan());
    }

    #[test]
    fn test_platform_from_name() {
        assert_eq!(Platform::from_name("iOS"), Platform::Ios);
        assert_eq!(Platform::from_name("android"), Platform::Android);
        assert_eq!(Platform::from_name("beos"), Platform::Desktop);
    }

    #[test]
    fn test_capability_handle() {
        let mut cap = Capability::from_option(Some(MemoryClipboard::new()));
        assert!(cap.is_available());
        cap.as_mut().unwrap().copy("04:A1").unwrap();
        assert_eq!(cap.as_mut().unwrap().contents().as_deref(), Some("04:A1"));

        let mut none: Capability<MemoryClipboard> = Capability::from_option(None);
        assert!(!none.is_available());
        assert!(none.as_mut().is_none());
    }

    #[test]
    fn test_memory_clipboard_clones_share_contents() {
        let reader = MemoryClipboard::new();
        let mut writer = reader.clone();
        assert!(reader.contents().is_none());

        writer.copy("Office\nUID: 04:A1").unwrap();
        assert_eq!(reader.contents().as_deref(), Some("Office\nUID: 04:A1"));
    }
}
