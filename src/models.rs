//! Wire-level data model: usage events and billing stats responses.

use serde::{Deserialize, Serialize};

/// A single metered usage event, as submitted by clients.
///
/// Immutable once validated. Events are serialized as one JSON object per
/// line before being appended to the delivery stream, because Athena only
/// recognizes JSON objects delimited by newline characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// The subject (customer/account) the usage is billed against.
    pub subject_id: String,
    /// Metered quantity. Must be non-zero; negative values are corrections.
    pub quantity: i64,
    /// Event time as a Unix epoch, supplied by the producer. May be in the past.
    pub event_time_epoch: i64,
}

/// Validation failures for a [`UsageEvent`].
#[derive(Debug, thiserror::Error)]
pub enum InvalidEvent {
    #[error("subject_id must not be empty")]
    EmptySubject,

    #[error("quantity must be non-zero")]
    ZeroQuantity,

    #[error("event_time_epoch must be non-zero")]
    ZeroEventTime,
}

impl UsageEvent {
    /// Validate that all required fields are present and non-zero.
    pub fn validate(&self) -> Result<(), InvalidEvent> {
        if self.subject_id.is_empty() {
            return Err(InvalidEvent::EmptySubject);
        }
        if self.quantity == 0 {
            return Err(InvalidEvent::ZeroQuantity);
        }
        if self.event_time_epoch == 0 {
            return Err(InvalidEvent::ZeroEventTime);
        }
        Ok(())
    }

    /// Serialize the event as a newline-terminated JSON record.
    pub fn encode_record(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut record = serde_json::to_vec(self)?;
        record.push(b'\n');
        Ok(record)
    }
}

/// Response body for the billing stats endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct BillingStats {
    /// Total metered quantity over the selected subject/time window.
    pub total_quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> UsageEvent {
        UsageEvent {
            subject_id: "acme".to_string(),
            quantity: 512,
            event_time_epoch: 1_700_000_000,
        }
    }

    #[test]
    fn test_encode_record_ends_with_single_newline() {
        let record = event().encode_record().unwrap();
        assert_eq!(record.last(), Some(&b'\n'));
        assert_ne!(record.get(record.len() - 2), Some(&b'\n'));
    }

    #[test]
    fn test_encode_record_round_trips() {
        let original = event();
        let record = original.encode_record().unwrap();
        let decoded: UsageEvent = serde_json::from_slice(&record).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_validate_rejects_empty_subject() {
        let mut e = event();
        e.subject_id = String::new();
        assert!(matches!(e.validate(), Err(InvalidEvent::EmptySubject)));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let mut e = event();
        e.quantity = 0;
        assert!(matches!(e.validate(), Err(InvalidEvent::ZeroQuantity)));
    }

    #[test]
    fn test_validate_rejects_zero_event_time() {
        let mut e = event();
        e.event_time_epoch = 0;
        assert!(matches!(e.validate(), Err(InvalidEvent::ZeroEventTime)));
    }

    #[test]
    fn test_validate_accepts_negative_quantity() {
        let mut e = event();
        e.quantity = -42;
        assert!(e.validate().is_ok());
    }
}
