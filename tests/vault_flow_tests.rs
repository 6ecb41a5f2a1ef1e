//! End-to-end vault flows.
//!
//! Acquire cards through the session, merge them, reopen the vault from
//! disk and present a card, all against a real SQLite file.

use liftkey::{
    AcquisitionSession, AcquisitionState, BridgeInbox, Capability, CapabilityError, CardStorage,
    CardType, Clipboard, EmulationSession, EmulationState, MergeEngine, Platform, ShareChannel,
    ShareOutcome, SqliteStorage, TagWriter, TagPayload, VaultStore, WriteOutcome,
};
use chrono::{Duration, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

fn open_vault(dir: &TempDir) -> VaultStore<SqliteStorage> {
    let path = dir.path().join("vault.db");
    VaultStore::open(SqliteStorage::open(&path, "liftkey_cards").unwrap())
}

fn acquire(vault: &mut VaultStore<SqliteStorage>, inbox: &mut dyn BridgeInbox, uid: &str, name: &str, floors: &str) -> String {
    inbox.deliver(uid);
    let mut session = AcquisitionSession::new(Platform::Ios, Capability::Unavailable);
    session.open(inbox);
    assert_eq!(session.state().detected_serial(), Some(uid));

    session.set_name(name);
    session.set_floors(floors);
    session.save(vault).unwrap().id().to_string()
}

struct SharedClipboard(Rc<RefCell<Vec<String>>>);

impl Clipboard for SharedClipboard {
    fn copy(&mut self, text: &str) -> Result<(), CapabilityError> {
        self.0.borrow_mut().push(text.to_string());
        Ok(())
    }
}

struct JammedWriter;

impl TagWriter for JammedWriter {
    fn write(&mut self, _payload: &TagPayload) -> Result<(), CapabilityError> {
        Err(CapabilityError::Failed("tag lost".to_string()))
    }
}

// =============================================================================
// Acquire → merge → reopen
// =============================================================================

#[test]
fn test_bridge_acquire_merge_and_reload() {
    let dir = TempDir::new().unwrap();
    let mut inbox = SqliteStorage::open(&dir.path().join("vault.db"), "liftkey_cards").unwrap();

    let (lobby, garage, merged_id) = {
        let mut vault = open_vault(&dir);
        let lobby = acquire(&mut vault, &mut inbox, "04:A1:B2", "Lobby", "1, 3");
        let garage = acquire(&mut vault, &mut inbox, "04:C3:D4", "", "3, -1");

        vault.toggle_selection(&lobby);
        vault.toggle_selection(&garage);
        let merged = vault.merge_selected(&MergeEngine::new(), None).unwrap();
        assert!(vault.selected_ids().is_empty());
        (lobby, garage, merged.id().to_string())
    };

    // Bridged identifiers are consumed exactly once
    assert_eq!(inbox.take(), None);

    let vault = open_vault(&dir);
    assert_eq!(vault.len(), 3);

    let lobby = vault.get(&lobby).unwrap();
    assert_eq!(lobby.floors(), &[1, 3]);
    assert_eq!(lobby.card_type(), CardType::New);

    let garage = vault.get(&garage).unwrap();
    assert_eq!(garage.name(), "New Card");
    assert_eq!(garage.floors(), &[3, -1]);

    let merged = vault.get(&merged_id).unwrap();
    assert_eq!(merged.card_type(), CardType::Merged);
    assert_eq!(merged.name(), "Hybrid Access Card");
    assert_eq!(merged.floors(), &[-1, 1, 3]);
    assert!(merged.serial_number().starts_with("MK-"));

    // Sources are untouched by the merge
    assert_eq!(vault.cards()[0].floors(), &[1, 3]);
}

#[test]
fn test_removing_merged_sources_keeps_merged_card() {
    let dir = TempDir::new().unwrap();
    let mut inbox = liftkey::PendingBridge::new();
    let mut vault = open_vault(&dir);

    let a = acquire_pending(&mut vault, &mut inbox, "AA", "2");
    let b = acquire_pending(&mut vault, &mut inbox, "BB", "7");
    vault.toggle_selection(&a);
    vault.toggle_selection(&b);
    let merged = vault.merge_selected(&MergeEngine::new(), Some("Both")).unwrap();

    vault.remove(&a);
    vault.remove(&b);

    let reopened = open_vault(&dir);
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.cards()[0].id(), merged.id());
    assert_eq!(reopened.cards()[0].floors(), &[2, 7]);
}

fn acquire_pending(vault: &mut VaultStore<SqliteStorage>, inbox: &mut liftkey::PendingBridge, uid: &str, floors: &str) -> String {
    acquire(vault, inbox, uid, uid, floors)
}

// =============================================================================
// Manual entry
// =============================================================================

#[test]
fn test_manual_entry_without_scanner() {
    let dir = TempDir::new().unwrap();
    let mut vault = open_vault(&dir);
    let mut inbox = liftkey::PendingBridge::new();

    let mut session = AcquisitionSession::new(Platform::Desktop, Capability::Unavailable);
    session.open(&mut inbox);
    assert_eq!(*session.state(), AcquisitionState::Manual);

    // Nothing to save yet
    assert!(session.save(&mut vault).is_none());
    assert!(vault.is_empty());

    session.set_manual_serial("  12345678  ");
    session.set_floors("ground, 4th");
    let card = session.save(&mut vault).unwrap();

    assert_eq!(card.serial_number(), "12345678");
    assert_eq!(card.floors(), &[4]);
    assert_eq!(*session.state(), AcquisitionState::Idle);
    assert_eq!(vault.storage().load().len(), 1);
}

#[test]
fn test_cancel_leaves_vault_untouched() {
    let dir = TempDir::new().unwrap();
    let mut vault = open_vault(&dir);
    let mut inbox = liftkey::PendingBridge::new();
    inbox.deliver("04:FF");

    let mut session = AcquisitionSession::new(Platform::Android, Capability::Unavailable);
    session.open(&mut inbox);
    session.set_name("Gym");
    session.cancel();

    assert_eq!(*session.state(), AcquisitionState::Idle);
    assert!(vault.is_empty());
    assert!(session.save(&mut vault).is_none());
}

// =============================================================================
// Presenting a stored card
// =============================================================================

#[test]
fn test_present_stored_card_shares_through_clipboard() {
    let dir = TempDir::new().unwrap();
    let mut vault = open_vault(&dir);
    let mut inbox = liftkey::PendingBridge::new();
    let id = acquire(&mut vault, &mut inbox, "04:11:22", "Office", "5, 6");

    let copied = Rc::new(RefCell::new(Vec::new()));
    let mut session = EmulationSession::new(
        Capability::Unavailable,
        Capability::Unavailable,
        Box::new(SharedClipboard(Rc::clone(&copied))),
        Duration::milliseconds(3000),
    );

    session.open(vault.get(&id).unwrap());
    assert_eq!(session.write_tag(Utc::now()), WriteOutcome::Unavailable);
    assert_eq!(*session.state(), EmulationState::Presenting);

    assert_eq!(session.share(Utc::now()), ShareOutcome::Shared(ShareChannel::Clipboard));
    assert_eq!(copied.borrow().as_slice(), ["Office\nUID: 04:11:22\nFloors: 5, 6"]);
}

#[test]
fn test_write_failure_clears_after_display_interval() {
    let dir = TempDir::new().unwrap();
    let mut vault = open_vault(&dir);
    let mut inbox = liftkey::PendingBridge::new();
    let id = acquire(&mut vault, &mut inbox, "04:33", "Roof", "9");

    let writer: Box<dyn TagWriter> = Box::new(JammedWriter);
    let mut session = EmulationSession::new(
        Capability::Available(writer),
        Capability::Unavailable,
        Box::new(liftkey::MemoryClipboard::new()),
        Duration::milliseconds(3000),
    );
    session.open(vault.get(&id).unwrap());

    let now = Utc::now();
    assert!(matches!(session.write_tag(now), WriteOutcome::Failed(_)));

    session.tick(now + Duration::milliseconds(2999));
    assert!(matches!(session.state(), EmulationState::Error { .. }));

    session.tick(now + Duration::milliseconds(3000));
    assert_eq!(*session.state(), EmulationState::Presenting);

    // The stored card is never modified by presentation
    assert_eq!(open_vault(&dir).get(&id).unwrap().floors(), &[9]);
}
