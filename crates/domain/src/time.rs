//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `checked_at` on reconciliation runs and
/// `updated_at` on the active target.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        assert!(ts >= before);
        assert!(ts <= Utc::now());
    }
}
