//! Debezium CDC message structures and decoding.

use serde::{Deserialize, Deserializer};

use crate::error::{AppError, Result};

/// CDC operation derived from the Debezium op tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdcOperation {
    /// `c` — row inserted
    Create,
    /// `u` — row updated
    Update,
    /// `d` — row deleted
    Delete,
    /// any other tag (snapshot reads, truncates, future ops)
    Unknown,
}

impl From<&str> for CdcOperation {
    fn from(op: &str) -> Self {
        match op {
            "c" => CdcOperation::Create,
            "u" => CdcOperation::Update,
            "d" => CdcOperation::Delete,
            _ => CdcOperation::Unknown,
        }
    }
}

/// Row image as carried on the wire.
///
/// `price` stays text: the source encodes NUMERIC columns and the encoding
/// is not decoded here.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub name: String,
    pub price: String,
    #[serde(deserialize_with = "de_i64_lenient")]
    pub stock: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// Some connector configurations quote integer columns; accept both a JSON
/// number and a numeric string.
fn de_i64_lenient<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Text(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Text(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct CdcEnvelope {
    payload: CdcPayload,
}

#[derive(Debug, Deserialize)]
struct CdcPayload {
    before: Option<ProductImage>,
    after: Option<ProductImage>,
    op: String,
}

/// A decoded change event. Immutable once built: fields are private and
/// only readable through accessors.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    operation: CdcOperation,
    before: Option<ProductImage>,
    after: Option<ProductImage>,
}

impl ChangeEvent {
    /// Decode a raw message payload.
    ///
    /// Pure transformation; malformed structure yields `AppError::Decode`
    /// so the consumer can skip the message and keep the stream alive.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let envelope: CdcEnvelope = serde_json::from_slice(payload)?;

        let event = Self {
            operation: CdcOperation::from(envelope.payload.op.as_str()),
            before: envelope.payload.before,
            after: envelope.payload.after,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn operation(&self) -> CdcOperation {
        self.operation
    }

    pub fn before(&self) -> Option<&ProductImage> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&ProductImage> {
        self.after.as_ref()
    }

    /// Enforce the row-image presence invariant per operation.
    fn validate(&self) -> Result<()> {
        match self.operation {
            CdcOperation::Create => {
                if self.after.is_none() {
                    return Err(AppError::Validation(
                        "create event requires 'after' image".to_string(),
                    ));
                }
            }
            CdcOperation::Update => {
                if self.after.is_none() {
                    return Err(AppError::Validation(
                        "update event requires 'after' image".to_string(),
                    ));
                }
            }
            CdcOperation::Delete => {
                if self.before.is_none() {
                    return Err(AppError::Validation(
                        "delete event requires 'before' image".to_string(),
                    ));
                }
            }
            // Unknown ops carry whatever they carry; the handler skips them.
            CdcOperation::Unknown => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_create_event() {
        let raw = br#"{"payload":{"before":null,"after":{"id":1,"name":"Apple","price":"100","stock":"10"},"op":"c"}}"#;

        let event = ChangeEvent::decode(raw).expect("valid create event");
        assert_eq!(event.operation(), CdcOperation::Create);
        assert!(event.before().is_none());

        let after = event.after().expect("after image present");
        assert_eq!(after.id, 1);
        assert_eq!(after.name, "Apple");
        assert_eq!(after.price, "100");
        assert_eq!(after.stock, 10);
    }

    #[test]
    fn test_decode_update_event() {
        let raw = br#"{"payload":{
            "before":{"id":3,"name":"Pear","price":"5","stock":2},
            "after":{"id":3,"name":"Pear","price":"5","stock":50},
            "op":"u"}}"#;

        let event = ChangeEvent::decode(raw).unwrap();
        assert_eq!(event.operation(), CdcOperation::Update);
        assert_eq!(event.after().unwrap().stock, 50);
        assert_eq!(event.before().unwrap().stock, 2);
    }

    #[test]
    fn test_decode_delete_event_has_before() {
        let raw = br#"{"payload":{"before":{"id":7,"name":"Fig","price":"3","stock":0},"after":null,"op":"d"}}"#;

        let event = ChangeEvent::decode(raw).unwrap();
        assert_eq!(event.operation(), CdcOperation::Delete);
        assert!(event.before().is_some());
        assert!(event.after().is_none());
    }

    #[test]
    fn test_decode_unknown_op_tag() {
        let raw = br#"{"payload":{"before":null,"after":null,"op":"r"}}"#;

        let event = ChangeEvent::decode(raw).unwrap();
        assert_eq!(event.operation(), CdcOperation::Unknown);
    }

    #[test]
    fn test_decode_malformed_payloads_return_errors() {
        for raw in [
            &b"not json at all"[..],
            br#"{"no_payload": true}"#,
            br#"{"payload":{"before":null,"after":{"id":"oops"},"op":"c"}}"#,
            b"",
        ] {
            assert!(ChangeEvent::decode(raw).is_err(), "payload: {raw:?}");
        }
    }

    #[test]
    fn test_decode_rejects_missing_image_for_op() {
        // create without after
        let raw = br#"{"payload":{"before":null,"after":null,"op":"c"}}"#;
        assert!(matches!(
            ChangeEvent::decode(raw),
            Err(AppError::Validation(_))
        ));

        // delete without before
        let raw = br#"{"payload":{"before":null,"after":null,"op":"d"}}"#;
        assert!(matches!(
            ChangeEvent::decode(raw),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_stock_accepts_integer_and_string() {
        let raw = br#"{"payload":{"before":null,"after":{"id":1,"name":"A","price":"1","stock":10},"op":"c"}}"#;
        assert_eq!(ChangeEvent::decode(raw).unwrap().after().unwrap().stock, 10);

        let raw = br#"{"payload":{"before":null,"after":{"id":1,"name":"A","price":"1","stock":"10"},"op":"c"}}"#;
        assert_eq!(ChangeEvent::decode(raw).unwrap().after().unwrap().stock, 10);
    }
}
