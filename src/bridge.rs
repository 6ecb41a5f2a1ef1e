// 🌉 Bridge delivery channel
//
// On platforms where the app cannot scan (iOS), a platform automation reads
// the tag and opens `<base>?uid=<serial>`. The identifier lands in an inbox
// and is consumed exactly once by the next acquisition session.

use crate::config::BRIDGE_STORAGE_KEY;
use crate::storage::SqliteStorage;

pub trait BridgeInbox {
    /// Hold an identifier for the next acquisition session (replaces any
    /// identifier still pending)
    fn deliver(&mut self, uid: &str);

    /// Remove and return the pending identifier
    fn take(&mut self) -> Option<String>;
}

/// In-memory inbox
#[derive(Debug, Default)]
pub struct PendingBridge {
    uid: Option<String>,
}

impl PendingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inbox pre-loaded from a launch URL (or bare query string)
    pub fn from_url(url: &str) -> Self {
        PendingBridge {
            uid: uid_from_url(url),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.uid.is_some()
    }
}

impl BridgeInbox for PendingBridge {
    fn deliver(&mut self, uid: &str) {
        let uid = uid.trim();
        if !uid.is_empty() {
            self.uid = Some(uid.to_string());
        }
    }

    fn take(&mut self) -> Option<String> {
        self.uid.take()
    }
}

/// Persisted inbox, shared between the HTTP bridge endpoint and later sessions
impl BridgeInbox for SqliteStorage {
    fn deliver(&mut self, uid: &str) {
        let uid = uid.trim();
        if uid.is_empty() {
            return;
        }
        if let Err(e) = self.put_raw(BRIDGE_STORAGE_KEY, uid) {
            tracing::error!(error = %e, "failed to store bridged identifier");
        }
    }

    fn take(&mut self) -> Option<String> {
        let uid = match self.get_raw(BRIDGE_STORAGE_KEY) {
            Ok(uid) => uid,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read bridged identifier");
                None
            }
        };

        if uid.is_some() {
            if let Err(e) = self.delete_raw(BRIDGE_STORAGE_KEY) {
                tracing::error!(error = %e, "failed to clear bridged identifier");
            }
        }

        uid.filter(|u| !u.trim().is_empty())
    }
}

/// Extract the percent-decoded `uid` query parameter.
///
/// Accepts a full URL, a `?query`, or a bare `key=value&...` string.
pub fn uid_from_url(url: &str) -> Option<String> {
    let query = match url.split_once('?') {
        Some((_, query)) => query,
        None if url.contains('=') => url,
        None => return None,
    };
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "uid")
        .and_then(|(_, value)| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|v| v.trim().to_string())
        })
        .filter(|uid| !uid.is_empty())
}

/// URL a platform automation should open, with the serial appended after `uid=`
pub fn shortcut_url(base_url: &str) -> String {
    let base = base_url.trim();
    if base.contains('?') {
        format!("{}&uid=", base)
    } else if base.ends_with('/') {
        format!("{}?uid=", base)
    } else {
        format!("{}/?uid=", base)
    }
}
