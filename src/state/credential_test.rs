use super::*;

fn slot_with(store: MemoryCredentialStore) -> (Arc<MemoryCredentialStore>, CredentialSlot) {
    let store = Arc::new(store);
    let slot = CredentialSlot::new(store.clone());
    (store, slot)
}

// =============================================================================
// Credential
// =============================================================================

#[test]
fn blank_token_is_absent() {
    assert!(Credential::new("").is_none());
    assert!(Credential::new("  \n").is_none());
}

#[test]
fn token_is_trimmed_and_formatted_as_bearer() {
    let credential = Credential::new("abc123\n").unwrap();
    assert_eq!(credential.as_str(), "abc123");
    assert_eq!(credential.bearer(), "Bearer abc123");
}

#[test]
fn debug_output_redacts_token() {
    let credential = Credential::new("secret-token").unwrap();
    assert!(!format!("{credential:?}").contains("secret-token"));
}

// =============================================================================
// FileCredentialStore
// =============================================================================

#[test]
fn file_store_roundtrips_and_clears() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("nested"));
    assert!(store.load().unwrap().is_none());

    store.save(&Credential::new("tok").unwrap()).unwrap();
    assert_eq!(store.path().file_name().unwrap(), TOKEN_KEY);
    assert_eq!(store.load().unwrap().unwrap().as_str(), "tok");

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
}

#[cfg(unix)]
#[test]
fn file_store_token_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path());
    store.save(&Credential::new("tok").unwrap()).unwrap();
    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn file_store_tightens_existing_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path());
    std::fs::write(store.path(), "old-token-that-is-longer").unwrap();
    std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

    store.save(&Credential::new("new").unwrap()).unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(store.load().unwrap().unwrap().as_str(), "new");
}

#[test]
fn file_store_clear_when_absent_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path());
    assert!(store.clear().is_ok());
}

// =============================================================================
// CredentialSlot
// =============================================================================

#[test]
fn replace_bumps_generation() {
    let (store, slot) = slot_with(MemoryCredentialStore::new());
    let before = slot.generation();
    let after = slot.replace(&Credential::new("t1").unwrap()).unwrap();
    assert!(after > before);
    assert_eq!(store.load().unwrap().unwrap().as_str(), "t1");
    assert_eq!(slot.current(), (Credential::new("t1"), after));
}

#[test]
fn clear_if_current_clears_matching_generation() {
    let (store, slot) = slot_with(MemoryCredentialStore::with_token("t1"));
    let (_, seen) = slot.current();
    assert!(slot.clear_if_current(seen));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn clear_if_current_keeps_newer_credential() {
    let (store, slot) = slot_with(MemoryCredentialStore::with_token("old"));
    let (_, stale) = slot.current();
    slot.replace(&Credential::new("new").unwrap()).unwrap();

    assert!(!slot.clear_if_current(stale));
    assert_eq!(store.load().unwrap().unwrap().as_str(), "new");
}

#[test]
fn run_if_current_skips_after_clear() {
    let (_, slot) = slot_with(MemoryCredentialStore::with_token("t1"));
    let (_, seen) = slot.current();
    slot.clear();

    let mut ran = false;
    assert!(!slot.run_if_current(seen, || ran = true));
    assert!(!ran);
}
