//! Row-to-payload transform seam.

use serde::Serialize;

/// Maps one raw input row into a submission payload.
///
/// The transform is an external collaborator of the upload core: the driver
/// only needs a stable item key per row and a serializable payload. A
/// transform failure is a per-record event; the driver logs it and moves
/// on without any network call.
pub trait RecordTransform {
    /// Raw input row type.
    type Row;
    /// Submission payload type.
    type Payload: Serialize;

    /// Natural identifier of the row, used to match log entries and decide
    /// resume eligibility.
    fn item_key(&self, row: &Self::Row) -> String;

    /// Build the submission payload for one row.
    fn transform(&self, row: &Self::Row) -> Result<Self::Payload, TransformError>;
}

/// A row could not be turned into a payload.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransformError(String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn missing_field(name: &str) -> Self {
        Self(format!("missing required field '{name}'"))
    }

    pub fn invalid_field(name: &str, value: &str) -> Self {
        Self(format!("invalid value '{value}' for field '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TransformError::missing_field("geo_code").to_string(),
            "missing required field 'geo_code'"
        );
        assert_eq!(
            TransformError::invalid_field("lat", "north").to_string(),
            "invalid value 'north' for field 'lat'"
        );
    }
}
