use chrono::Utc;

pub const FALLBACK_KEY_PREFIX: &str = "sb_";
pub const PLACEHOLDER_TIMESTAMP: &str = "0";
const SYNTHETIC_KEY_PREFIX: &str = "msg_";

/// External id for an incoming carrier message.
///
/// A platform-assigned handle is used verbatim. Without one the key is built
/// from the send timestamp, so handle-less events sent within the same
/// timestamp resolution share a key; this never fails.
pub fn derive_external_id(message_handle: Option<&str>, date_sent: Option<&str>) -> String {
    if let Some(handle) = message_handle
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return handle.to_string();
    }
    let timestamp = date_sent
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(PLACEHOLDER_TIMESTAMP);
    format!("{}{}", FALLBACK_KEY_PREFIX, timestamp)
}

/// Last-resort key for a message that reaches the global post shape without
/// an id.
pub fn synthesize_key() -> String {
    format!("{}{}", SYNTHETIC_KEY_PREFIX, Utc::now().timestamp())
}
