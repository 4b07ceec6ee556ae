//! The fixed greeting sent right after connection open.

/// Literal greeting carried inside the handshake frame.
///
/// The historical controller expects the greeting double-encoded: the frame
/// on the wire is a JSON *string* whose content is this literal, not a JSON
/// object. Peers depend on that shape, so it is preserved verbatim.
pub const HELLO_PAYLOAD: &str = "{msg:'HELLO'}";

/// The on-wire handshake frame.
///
/// Advisory only: the controller is not required to acknowledge it, and no
/// behavior depends on a reply.
#[must_use]
pub fn handshake_frame() -> String {
    serde_json::to_string(HELLO_PAYLOAD).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_double_encoded_string() {
        assert_eq!(handshake_frame(), "\"{msg:'HELLO'}\"");
    }

    #[test]
    fn frame_decodes_back_to_payload() {
        let back: String = serde_json::from_str(&handshake_frame()).unwrap();
        assert_eq!(back, HELLO_PAYLOAD);
    }

    #[test]
    fn frame_is_not_a_json_object() {
        let value: serde_json::Value = serde_json::from_str(&handshake_frame()).unwrap();
        assert!(value.is_string());
    }
}
