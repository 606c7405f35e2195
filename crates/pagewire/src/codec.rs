//! Hex-encoded credentials.
//!
//! Test data keeps passwords as hex strings so they are not readable at a
//! glance. This is obfuscation, not encryption.

use crate::result::{PagewireError, PagewireResult};

/// Decode a hex string into text, one character per byte.
///
/// Each pair of hex digits becomes the character with that code point
/// (`U+0000..=U+00FF`), so non-ASCII bytes decode as Latin-1.
///
/// # Errors
///
/// [`PagewireError::Decode`] on odd length or a non-hex digit.
///
/// # Example
///
/// ```
/// use pagewire::decrypt_string;
///
/// assert_eq!(decrypt_string("48656c6c6f").unwrap(), "Hello");
/// ```
pub fn decrypt_string(encoded: &str) -> PagewireResult<String> {
    let bytes = hex::decode(encoded.trim()).map_err(|e| PagewireError::Decode {
        message: format!("{encoded:?}: {e}"),
    })?;
    Ok(bytes.into_iter().map(char::from).collect())
}

/// Encode text as hex, the inverse of [`decrypt_string`] for Latin-1 input.
///
/// # Errors
///
/// [`PagewireError::Decode`] if a character is outside `U+0000..=U+00FF`.
pub fn encrypt_string(plain: &str) -> PagewireResult<String> {
    let bytes = plain
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| PagewireError::Decode {
                message: format!("character {c:?} does not fit in one byte"),
            })
        })
        .collect::<PagewireResult<Vec<u8>>>()?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hello() {
        assert_eq!(decrypt_string("48656c6c6f").unwrap(), "Hello");
    }

    #[test]
    fn test_uppercase_digits() {
        assert_eq!(decrypt_string("50415353").unwrap(), "PASS");
        assert_eq!(decrypt_string("4A4b").unwrap(), "JK");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decrypt_string("").unwrap(), "");
    }

    #[test]
    fn test_odd_length_fails() {
        assert!(matches!(
            decrypt_string("486"),
            Err(PagewireError::Decode { .. })
        ));
    }

    #[test]
    fn test_non_hex_fails() {
        assert!(matches!(
            decrypt_string("zz"),
            Err(PagewireError::Decode { .. })
        ));
    }

    #[test]
    fn test_high_bytes_are_latin1() {
        assert_eq!(decrypt_string("e9").unwrap(), "\u{e9}");
    }

    #[test]
    fn test_encrypt_matches_decrypt() {
        let encoded = encrypt_string("Pa55w0rd!").unwrap();
        assert_eq!(encoded, "506135357730726421");
        assert_eq!(decrypt_string(&encoded).unwrap(), "Pa55w0rd!");
    }

    #[test]
    fn test_encrypt_rejects_wide_chars() {
        assert!(encrypt_string("\u{263A}").is_err());
    }
}
