//! Small time helpers shared by server and clients

use chrono::Utc;

/// Current time as epoch milliseconds
///
/// All persisted timestamps (`created_at`, `updated_at`,
/// `completed_at`) and the sync cursor use this representation.
#[inline]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current date formatted as `yyyymmdd`, used by the order number
/// generator.
#[inline]
pub fn today_compact() -> String {
    Utc::now().format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_recent() {
        let now = now_millis();
        // 2024-01-01 in epoch millis; anything earlier means a broken clock source
        assert!(now > 1_704_067_200_000);
    }

    #[test]
    fn test_today_compact_shape() {
        let today = today_compact();
        assert_eq!(today.len(), 8);
        assert!(today.chars().all(|c| c.is_ascii_digit()));
    }
}
