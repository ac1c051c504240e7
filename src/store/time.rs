use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};

/// Epoch milliseconds as stored in every date column.
#[must_use]
pub fn to_epoch_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Inverse of [`to_epoch_millis`]. Sub-millisecond precision is not kept.
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(Error::InvalidTimestamp { millis })
}

pub(super) fn opt_to_epoch_millis(at: Option<DateTime<Utc>>) -> Option<i64> {
    at.map(to_epoch_millis)
}

pub(super) fn opt_from_epoch_millis(millis: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    millis.map(from_epoch_millis).transpose()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_millis_round_trip_truncates_sub_millisecond() {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 5, 9, 30, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::microseconds(1_500))
            .unwrap();

        let millis = to_epoch_millis(at);
        let back = from_epoch_millis(millis).unwrap();

        assert_eq!(millis % 1000, 1);
        let expected =
            Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap() + chrono::Duration::milliseconds(1);
        assert_eq!(back, expected);
    }

    #[test]
    fn test_out_of_range_millis_is_rejected() {
        let result = from_epoch_millis(i64::MAX);
        assert!(matches!(result, Err(Error::InvalidTimestamp { millis }) if millis == i64::MAX));
    }
}
