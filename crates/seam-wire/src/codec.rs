//! Serialization entry points for wire values.
//!
//! Decoding is total over the closed unions and strict about discriminators:
//! an object missing its `type`/`role` tag, or carrying an unknown tag, is a
//! [`WireError::Decode`]. No other component depends on serialization layout.

use crate::error::WireError;
use crate::events::Event;
use crate::message::Message;

/// Encode a wire event as JSON bytes.
pub fn encode_event(event: &Event) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(event).map_err(WireError::Encode)
}

/// Decode a wire event from JSON bytes.
pub fn decode_event(bytes: &[u8]) -> Result<Event, WireError> {
    serde_json::from_slice(bytes).map_err(WireError::Decode)
}

/// Encode a conversation message as JSON bytes.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(message).map_err(WireError::Encode)
}

/// Decode a conversation message from JSON bytes.
pub fn decode_message(bytes: &[u8]) -> Result<Message, WireError> {
    serde_json::from_slice(bytes).map_err(WireError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupt::Interrupt;
    use crate::message::{BinarySource, ContentPart};

    #[test]
    fn event_round_trips_through_bytes() {
        let event = Event::tool_call_start("c1", "lookup", None).with_timestamp(7);
        let bytes = encode_event(&event).unwrap();
        assert_eq!(decode_event(&bytes).unwrap(), event);
    }

    #[test]
    fn decode_rejects_missing_discriminator() {
        let err = decode_event(br#"{"threadId": "t1", "runId": "r1"}"#).unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
    }

    #[test]
    fn decode_rejects_unknown_discriminator() {
        let err = decode_event(br#"{"type": "RUN_TELEPORTED", "threadId": "t1"}"#).unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(decode_event(b"{not json").is_err());
        assert!(decode_message(b"").is_err());
    }

    #[test]
    fn interrupt_finish_round_trips_through_bytes() {
        let event = Event::run_interrupted(
            "t1",
            "r1",
            Interrupt::new("i1").with_payload(serde_json::json!({"functionName": "rm"})),
        );
        let bytes = encode_event(&event).unwrap();
        assert_eq!(decode_event(&bytes).unwrap(), event);
    }

    #[test]
    fn message_string_and_array_forms_normalize() {
        let plain = decode_message(br#"{"role": "user", "content": "hi"}"#).unwrap();
        let arrayed =
            decode_message(br#"{"role": "user", "content": [{"type": "text", "text": "hi"}]}"#)
                .unwrap();
        assert_eq!(plain, arrayed);

        // Re-encoding the normalized form collapses back to the string shape.
        let bytes = encode_message(&plain).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""content":"hi""#), "got {text}");
    }

    #[test]
    fn multimodal_message_round_trips_through_bytes() {
        let message = Message::user_with_parts(vec![
            ContentPart::text("invoice attached"),
            ContentPart::binary("application/pdf", BinarySource::Id("blob-1".into())),
        ]);
        let bytes = encode_message(&message).unwrap();
        assert_eq!(decode_message(&bytes).unwrap(), message);
    }
}
