// Verify the envelope wire format browser clients parse.
// These tests ensure the JSON shape is never broken.

use relay_protocol::envelope::{Envelope, Role, CONNECTED_NOTICE};

#[test]
fn user_envelope_shape() {
    let env = Envelope::user("client-1", "hello");
    let json = env.to_json().unwrap();

    assert_eq!(
        json,
        r#"{"sender":"client-1","content":{"text":"hello","role":"USER"}}"#
    );
}

#[test]
fn system_envelope_has_empty_sender() {
    let json = Envelope::connected().to_json().unwrap();

    assert!(json.contains(r#""sender":"""#));
    assert!(json.contains(r#""role":"SYSTEM""#));
    assert!(json.contains(CONNECTED_NOTICE));
}

#[test]
fn parses_envelope_without_sender() {
    let json = r#"{"content":{"text":"A client has disconnected.","role":"SYSTEM"}}"#;
    let env: Envelope = serde_json::from_str(json).unwrap();

    assert!(env.is_system());
    assert!(env.sender.is_empty());
    assert!(!env.content.text.is_empty());
}

#[test]
fn rejects_unknown_role() {
    let json = r#"{"sender":"x","content":{"text":"t","role":"ADMIN"}}"#;
    assert!(serde_json::from_str::<Envelope>(json).is_err());
}

#[test]
fn payload_text_is_not_reinterpreted() {
    // Inbound frames are raw text; JSON-looking payloads must stay a string.
    let env = Envelope::user("a", r#"{"hello":"world"}"#);
    let json = env.to_json().unwrap();
    let back: Envelope = serde_json::from_str(&json).unwrap();

    assert_eq!(back.content.text, r#"{"hello":"world"}"#);
    assert_eq!(back.content.role, Role::User);
}
