//! Key Space
//!
//! TigerStyle: two feeds, one flat namespace.
//!
//! ```text
//! post!<ts>          global feed, newest = largest key
//! user!<uid>!<ts>    per-user feed
//! ```
//!
//! `<ts>` is the creation second, zero-padded to a fixed width so that
//! byte order and numeric order agree for every `u64`.

use jot_store::ScanRange;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Prefix of global feed keys
pub const GLOBAL_PREFIX: &str = "post";

/// Prefix of per-user feed keys
pub const USER_PREFIX: &str = "user";

/// Segment delimiter; forbidden inside a uid
pub const KEY_DELIMITER: char = '!';

/// Byte appended to a prefix to form its exclusive upper bound
pub const KEY_UPPER_BOUND_BYTE: u8 = 0xFF;

/// Width of the encoded timestamp (`u64::MAX` has 20 digits)
pub const TIMESTAMP_DIGITS: usize = 20;

/// Maximum uid length in bytes
pub const UID_BYTES_MAX: usize = 128;

// =============================================================================
// Encoding
// =============================================================================

/// Fixed-width decimal rendering of a Unix second.
#[must_use]
pub fn encode_timestamp(created_at: u64) -> String {
    let encoded = format!("{:0width$}", created_at, width = TIMESTAMP_DIGITS);

    // Postcondition
    assert_eq!(encoded.len(), TIMESTAMP_DIGITS, "timestamp must be fixed width");

    encoded
}

/// `post!<ts>`
#[must_use]
pub fn global_key(created_at: u64) -> String {
    format!(
        "{GLOBAL_PREFIX}{KEY_DELIMITER}{}",
        encode_timestamp(created_at)
    )
}

/// `user!<uid>!<ts>`
///
/// # Errors
/// Returns [`KeyError`] if `uid` is not a valid key segment.
pub fn user_key(uid: &str, created_at: u64) -> Result<String, KeyError> {
    validate_uid(uid)?;
    Ok(format!(
        "{USER_PREFIX}{KEY_DELIMITER}{uid}{KEY_DELIMITER}{}",
        encode_timestamp(created_at)
    ))
}

/// Scan over `[prefix, prefix ++ 0xFF)`, newest first.
fn recent_range(prefix: String, limit: usize) -> ScanRange {
    let lower = prefix.into_bytes();
    let mut upper = lower.clone();
    upper.push(KEY_UPPER_BOUND_BYTE);
    ScanRange::all().gte(lower).lt(upper).limit(limit).reverse()
}

/// The global feed, newest first.
#[must_use]
pub fn global_range(limit: usize) -> ScanRange {
    recent_range(format!("{GLOBAL_PREFIX}{KEY_DELIMITER}"), limit)
}

/// One user's feed, newest first.
///
/// The prefix includes the trailing delimiter, so uid `u1` never sees the
/// posts of `u10` or `u1 x`.
///
/// # Errors
/// Returns [`KeyError`] if `uid` is not a valid key segment.
pub fn user_range(uid: &str, limit: usize) -> Result<ScanRange, KeyError> {
    validate_uid(uid)?;
    Ok(recent_range(
        format!("{USER_PREFIX}{KEY_DELIMITER}{uid}{KEY_DELIMITER}"),
        limit,
    ))
}

// =============================================================================
// Decoding
// =============================================================================

/// Creation second from the last `!`-delimited segment of `key`.
///
/// Accepts padded and unpadded timestamps alike.
///
/// # Errors
/// Returns [`KeyError::Malformed`] if that segment is not a decimal `u64`.
pub fn timestamp_of(key: &str) -> Result<u64, KeyError> {
    let segment = key.rsplit(KEY_DELIMITER).next().unwrap_or_default();
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KeyError::Malformed(key.to_string()));
    }
    segment
        .parse::<u64>()
        .map_err(|_| KeyError::Malformed(key.to_string()))
}

/// A uid must be non-empty, bounded, and free of the delimiter.
///
/// # Errors
/// Returns the matching [`KeyError`] variant.
pub fn validate_uid(uid: &str) -> Result<(), KeyError> {
    if uid.is_empty() {
        return Err(KeyError::EmptyUid);
    }
    if uid.len() > UID_BYTES_MAX {
        return Err(KeyError::UidTooLong {
            len: uid.len(),
            max: UID_BYTES_MAX,
        });
    }
    if uid.contains(KEY_DELIMITER) {
        return Err(KeyError::UidContainsDelimiter(uid.to_string()));
    }
    Ok(())
}

// =============================================================================
// Errors
// =============================================================================

/// Key encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("uid cannot be empty")]
    EmptyUid,

    #[error("uid too long: {len} > {max}")]
    UidTooLong { len: usize, max: usize },

    #[error("uid {0:?} contains the key delimiter '!'")]
    UidContainsDelimiter(String),

    #[error("malformed post key: {0:?}")]
    Malformed(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(global_key(1000), "post!00000000000000001000");
        assert_eq!(
            user_key("u1", 1000).unwrap(),
            "user!u1!00000000000000001000"
        );
        assert_eq!(encode_timestamp(u64::MAX), u64::MAX.to_string());
    }

    #[test]
    fn test_byte_order_matches_numeric_order_across_digit_counts() {
        let before = global_key(999_999_999);
        let after = global_key(1_000_000_000);
        assert!(before.as_bytes() < after.as_bytes());
    }

    #[test]
    fn test_timestamp_of() {
        assert_eq!(timestamp_of("post!00000000000000001000"), Ok(1000));
        assert_eq!(timestamp_of("user!u1!00000000000000001000"), Ok(1000));
        assert_eq!(timestamp_of("post!1000"), Ok(1000));
        assert_eq!(timestamp_of("1000"), Ok(1000));
    }

    #[test]
    fn test_timestamp_of_rejects_garbage() {
        for key in ["post!", "post!abc", "post!-1", "post!+1", "", "post!99999999999999999999"] {
            assert_eq!(timestamp_of(key), Err(KeyError::Malformed(key.to_string())), "{key}");
        }
    }

    #[test]
    fn test_validate_uid() {
        assert_eq!(validate_uid("u1"), Ok(()));
        assert_eq!(validate_uid(""), Err(KeyError::EmptyUid));
        assert_eq!(
            validate_uid("a!b"),
            Err(KeyError::UidContainsDelimiter("a!b".to_string()))
        );
        assert!(matches!(
            validate_uid(&"x".repeat(UID_BYTES_MAX + 1)),
            Err(KeyError::UidTooLong { .. })
        ));
    }

    #[test]
    fn test_global_range_bounds() {
        let range = global_range(10);
        assert!(range.reverse);
        assert_eq!(range.limit, Some(10));
        assert!(range.contains(global_key(0).as_bytes()));
        assert!(range.contains(global_key(u64::MAX).as_bytes()));
        assert!(!range.contains(user_key("u1", 1).unwrap().as_bytes()));
    }

    #[test]
    fn test_user_range_excludes_prefix_siblings() {
        let range = user_range("u1", 10).unwrap();
        assert!(range.contains(user_key("u1", 5).unwrap().as_bytes()));
        assert!(!range.contains(user_key("u10", 5).unwrap().as_bytes()));
        assert!(!range.contains(user_key("u1 x", 5).unwrap().as_bytes()));
        assert!(!range.contains(global_key(5).as_bytes()));
    }

    #[test]
    fn test_user_range_validates_uid() {
        assert_eq!(user_range("", 10).unwrap_err(), KeyError::EmptyUid);
    }
}
