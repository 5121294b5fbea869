//! Conversation id resolution.
//!
//! Hosts pass the id they got from the previous turn's result. A missing or
//! blank id starts a fresh conversation.

/// Return the caller-supplied id, or mint a new one.
pub fn resolve_conversation_id(supplied: Option<&str>) -> String {
    match supplied.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => new_conversation_id(),
    }
}

/// A fresh, opaque conversation id (32 lowercase hex chars).
pub fn new_conversation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
