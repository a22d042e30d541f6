//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`Icv6Error`]
//! at port boundaries via `From`.

use std::error::Error as StdError;

/// Boxed error from an adapter, kept opaque to the domain.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Top-level error shared by every port and service.
#[derive(Debug, thiserror::Error)]
pub enum Icv6Error {
    /// A value violated a domain invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A requested record does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Talking to the lighting controller failed.
    #[error("device communication error")]
    Device(#[source] BoxError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

impl Icv6Error {
    /// Stable tag naming the failure class, recorded with `error` outcomes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Device(_) => "device",
            Self::Storage(_) => "storage",
        }
    }

    /// Render this error and every source beneath it as one line.
    #[must_use]
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("channel {channel} level {value} exceeds 100")]
    ChannelOutOfRange { channel: &'static str, value: u8 },

    #[error("program point index must be at least 1")]
    ZeroIndex,

    #[error("program point {index}: hour {hour} is not in 0..=23")]
    HourOutOfRange { index: u8, hour: u8 },

    #[error("program point {index}: minute {minute} is not in 0..=59")]
    MinuteOutOfRange { index: u8, minute: u8 },

    #[error("program point index {0} appears more than once")]
    DuplicateIndex(u8),

    #[error("polling interval {0} minutes is not in 1..=1440")]
    IntervalOutOfRange(u32),

    #[error("unknown device mode {0:?}")]
    UnknownMode(String),

    #[error("name must not be empty")]
    EmptyName,

    #[error("name is {0} characters long, at most 100 allowed")]
    NameTooLong(usize),

    #[error("preset name already exists")]
    DuplicateName(String),

    #[error("{mode} preset requires {field}")]
    MissingPayload {
        mode: &'static str,
        field: &'static str,
    },
}

/// A lookup found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("connection closed before expected response")]
    struct Inner;

    #[test]
    fn should_report_full_source_chain() {
        let err = Icv6Error::Device(Box::new(Outer(Inner)));
        assert_eq!(
            err.report(),
            "device communication error: outer: connection closed before expected response"
        );
    }

    #[test]
    fn should_tag_each_variant_with_a_kind() {
        assert_eq!(Icv6Error::from(ValidationError::ZeroIndex).kind(), "validation");
        assert_eq!(
            Icv6Error::from(NotFoundError {
                entity: "Active target"
            })
            .kind(),
            "not_found"
        );
        assert_eq!(Icv6Error::Device(Box::new(Inner)).kind(), "device");
        assert_eq!(Icv6Error::Storage(Box::new(Inner)).kind(), "storage");
    }

    #[test]
    fn should_report_validation_error_once() {
        let err = Icv6Error::from(ValidationError::DuplicateIndex(2));
        assert_eq!(err.report(), "program point index 2 appears more than once");
    }

    #[test]
    fn should_display_validation_details() {
        let err = ValidationError::HourOutOfRange { index: 3, hour: 24 };
        assert_eq!(err.to_string(), "program point 3: hour 24 is not in 0..=23");
    }
}
