use crate::storage::{KeyValueStore, SESSION_KEY};

/// Return this profile's session id, creating and storing one on first use.
///
/// If storage is unavailable a fresh id is returned without being saved.
pub fn session_id(storage: &dyn KeyValueStore) -> String {
    match storage.get(SESSION_KEY) {
        Ok(Some(existing)) if !existing.trim().is_empty() => return existing,
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "failed to read session id"),
    }

    let id = uuid::Uuid::new_v4().to_string();
    if let Err(e) = storage.set(SESSION_KEY, &id) {
        tracing::warn!(error = %e, "failed to persist session id");
    }
    id
}
