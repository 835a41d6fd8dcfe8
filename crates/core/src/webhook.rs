//! Inbound webhook verification and PII redaction.
//!
//! The messaging platform delivers events with an
//! `X-Hub-Signature-256: sha256=<hex>` header computed over the raw,
//! unparsed request body. [`verify_signature`] must pass before the body
//! is parsed or touched in any other way; a rejection carries the exact
//! internal reason but the HTTP layer never echoes it to the caller.
//!
//! Redaction is structural: [`redact`] rebuilds a new object from an
//! explicit allow-list of fields instead of scrubbing a denylist, so an
//! unknown field can never leak into logs.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix the platform puts in front of the hex signature.
const SIGNATURE_PREFIX: &str = "sha256=";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Signature verification failures. All of them map to HTTP 403; the
/// variant is for internal logs only and must never reach the response
/// body.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// No app secret is configured; nothing can be verified.
    #[error("Webhook app secret is not configured")]
    MissingSecret,

    /// The request carried no signature header.
    #[error("Missing X-Hub-Signature-256 header")]
    MissingHeader,

    /// The header value is not `sha256=` followed by valid hex.
    #[error("Malformed signature header")]
    MalformedHeader,

    /// The signature did not match the raw body.
    #[error("Signature mismatch")]
    Mismatch,
}

// ---------------------------------------------------------------------------
// Signature verification
// ---------------------------------------------------------------------------

/// Verify the HMAC-SHA256 signature of a raw webhook body.
///
/// Comparison is constant-time via [`Mac::verify_slice`]. Returns
/// before reading anything out of the payload; callers must not parse
/// the body unless this returns `Ok`.
pub fn verify_signature(
    app_secret: &str,
    raw_body: &[u8],
    signature_header: Option<&str>,
) -> Result<(), SignatureError> {
    if app_secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }

    let header = signature_header.ok_or(SignatureError::MissingHeader)?;
    let hex_sig = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::MalformedHeader)?;
    let expected = hex::decode(hex_sig).map_err(|_| SignatureError::MalformedHeader)?;

    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|_| SignatureError::MissingSecret)?;
    mac.update(raw_body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the signature header value for a body. Test and tooling
/// helper; the inbound path only ever verifies.
pub fn sign_payload(app_secret: &str, raw_body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Check the GET subscription handshake.
///
/// The challenge is echoed back only when the mode is `subscribe` and
/// the pre-shared verify token matches exactly.
pub fn check_verify_token(expected_token: &str, mode: &str, token: &str) -> bool {
    !expected_token.is_empty() && mode == "subscribe" && token == expected_token
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The raw callback envelope: `{object, entry:[...]}`.
///
/// Ephemeral; never persisted as-is. Change values are kept as raw JSON
/// because their shape varies per event field and only the dispatcher's
/// downstream handlers interpret them.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

/// One entry inside a callback, owned by a single external account.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    /// External account id (the messaging-account / WABA id).
    pub id: String,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub changes: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Redaction
// ---------------------------------------------------------------------------

/// Redacted view of an envelope, safe to log.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedEnvelope {
    pub object: String,
    pub entries: Vec<RedactedEntry>,
}

/// Redacted view of one entry.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedEntry {
    pub id: String,
    pub time: Option<i64>,
    pub changes: Vec<RedactedChange>,
}

/// Redacted view of one change event.
///
/// Only identifiers and timestamps survive. Sender numbers, message
/// text and media, recipient identifiers, and template names are all
/// absent by construction.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedChange {
    pub field: String,
    /// The platform's phone-number *id*, not the number itself.
    pub phone_number_id: Option<String>,
    pub messages: Vec<RedactedMessage>,
    pub statuses: Vec<RedactedStatus>,
}

/// Message id, timestamp and kind; no content.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedMessage {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub kind: Option<String>,
}

/// Delivery-status id, state and timestamp; no recipient.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedStatus {
    pub id: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
}

/// Build a loggable view of an envelope from an explicit allow-list.
pub fn redact(envelope: &WebhookEnvelope) -> RedactedEnvelope {
    RedactedEnvelope {
        object: envelope.object.clone(),
        entries: envelope
            .entry
            .iter()
            .map(|entry| RedactedEntry {
                id: entry.id.clone(),
                time: entry.time,
                changes: entry.changes.iter().map(redact_change).collect(),
            })
            .collect(),
    }
}

fn redact_change(change: &serde_json::Value) -> RedactedChange {
    let value = &change["value"];

    let messages = value["messages"]
        .as_array()
        .map(|msgs| {
            msgs.iter()
                .map(|m| RedactedMessage {
                    id: str_field(m, "id"),
                    timestamp: str_field(m, "timestamp"),
                    kind: str_field(m, "type"),
                })
                .collect()
        })
        .unwrap_or_default();

    let statuses = value["statuses"]
        .as_array()
        .map(|sts| {
            sts.iter()
                .map(|s| RedactedStatus {
                    id: str_field(s, "id"),
                    status: str_field(s, "status"),
                    timestamp: str_field(s, "timestamp"),
                })
                .collect()
        })
        .unwrap_or_default();

    RedactedChange {
        field: change["field"].as_str().unwrap_or_default().to_string(),
        phone_number_id: str_field(&value["metadata"], "phone_number_id"),
        messages,
        statuses,
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value[key].as_str().map(str::to_string)
}

/// Pull the phone-number id out of a raw change, if present.
///
/// Used for tenant attribution alongside the entry's account id.
pub fn change_phone_number_id(change: &serde_json::Value) -> Option<&str> {
    change["value"]["metadata"]["phone_number_id"].as_str()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "app-secret-123";

    // -- Signature verification --------------------------------------------

    #[test]
    fn valid_signature_passes() {
        let body = br#"{"object":"whatsapp_business_account","entry":[]}"#;
        let header = sign_payload(SECRET, body);
        assert!(verify_signature(SECRET, body, Some(&header)).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = sign_payload(SECRET, body);
        let tampered = br#"{"object":"something_else"}"#;
        assert_matches!(
            verify_signature(SECRET, tampered, Some(&header)).unwrap_err(),
            SignatureError::Mismatch
        );
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_matches!(
            verify_signature(SECRET, b"{}", None).unwrap_err(),
            SignatureError::MissingHeader
        );
    }

    #[test]
    fn missing_secret_is_rejected() {
        let header = sign_payload(SECRET, b"{}");
        assert_matches!(
            verify_signature("", b"{}", Some(&header)).unwrap_err(),
            SignatureError::MissingSecret
        );
    }

    #[test]
    fn header_without_prefix_is_rejected() {
        let header = sign_payload(SECRET, b"{}");
        let bare = header.strip_prefix("sha256=").unwrap();
        assert_matches!(
            verify_signature(SECRET, b"{}", Some(bare)).unwrap_err(),
            SignatureError::MalformedHeader
        );
    }

    #[test]
    fn header_with_bad_hex_is_rejected() {
        assert_matches!(
            verify_signature(SECRET, b"{}", Some("sha256=zznothex")).unwrap_err(),
            SignatureError::MalformedHeader
        );
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let header = sign_payload(SECRET, b"{}");
        let truncated = &header[..header.len() - 8];
        assert_matches!(
            verify_signature(SECRET, b"{}", Some(truncated)).unwrap_err(),
            SignatureError::Mismatch
        );
    }

    // -- Verify-token handshake --------------------------------------------

    #[test]
    fn matching_token_passes_handshake() {
        assert!(check_verify_token("tok-1", "subscribe", "tok-1"));
    }

    #[test]
    fn wrong_token_fails_handshake() {
        assert!(!check_verify_token("tok-1", "subscribe", "tok-2"));
    }

    #[test]
    fn wrong_mode_fails_handshake() {
        assert!(!check_verify_token("tok-1", "unsubscribe", "tok-1"));
    }

    #[test]
    fn empty_configured_token_never_passes() {
        assert!(!check_verify_token("", "subscribe", ""));
    }

    // -- Redaction ---------------------------------------------------------

    fn sample_envelope() -> WebhookEnvelope {
        serde_json::from_value(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "waba-100",
                "time": 1_724_000_000,
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "+5215512345678",
                            "phone_number_id": "phone-55"
                        },
                        "contacts": [{"profile": {"name": "Ana López"}, "wa_id": "5215512345678"}],
                        "messages": [{
                            "from": "5215512345678",
                            "id": "wamid.ABC",
                            "timestamp": "1724000001",
                            "type": "text",
                            "text": {"body": "two orders of tacos please"}
                        }],
                        "statuses": [{
                            "id": "wamid.DEF",
                            "status": "delivered",
                            "timestamp": "1724000002",
                            "recipient_id": "5215598765432"
                        }]
                    }
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn redaction_keeps_ids_and_timestamps() {
        let redacted = redact(&sample_envelope());
        let entry = &redacted.entries[0];
        assert_eq!(entry.id, "waba-100");
        assert_eq!(entry.time, Some(1_724_000_000));

        let change = &entry.changes[0];
        assert_eq!(change.field, "messages");
        assert_eq!(change.phone_number_id.as_deref(), Some("phone-55"));
        assert_eq!(change.messages[0].id.as_deref(), Some("wamid.ABC"));
        assert_eq!(change.messages[0].timestamp.as_deref(), Some("1724000001"));
        assert_eq!(change.statuses[0].status.as_deref(), Some("delivered"));
    }

    #[test]
    fn redaction_drops_message_text_and_contact_fields() {
        let redacted = redact(&sample_envelope());
        let json = serde_json::to_string(&redacted).unwrap();

        assert!(!json.contains("two orders of tacos please"));
        assert!(!json.contains("Ana López"));
        assert!(!json.contains("5215512345678"));
        assert!(!json.contains("5215598765432"));
        assert!(!json.contains("display_phone_number"));
    }

    #[test]
    fn redaction_handles_empty_envelope() {
        let envelope = WebhookEnvelope {
            object: "whatsapp_business_account".into(),
            entry: vec![],
        };
        let redacted = redact(&envelope);
        assert!(redacted.entries.is_empty());
    }

    // -- Attribution helper ------------------------------------------------

    #[test]
    fn change_phone_number_id_extracts_metadata() {
        let envelope = sample_envelope();
        let change = &envelope.entry[0].changes[0];
        assert_eq!(change_phone_number_id(change), Some("phone-55"));
    }

    #[test]
    fn change_phone_number_id_absent_is_none() {
        let change = serde_json::json!({"field": "messages", "value": {}});
        assert_eq!(change_phone_number_id(&change), None);
    }
}
