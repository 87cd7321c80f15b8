//! Base62 identifier encoding.

use record_types::{EncoderError, IdentifierEncoder, RecordId};

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encodes non-negative ids with the alphabet `0-9A-Za-z`, most significant digit first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base62Encoder;

impl Base62Encoder {
    pub fn new() -> Self {
        Self
    }

    /// Inverse of `encode`.
    pub fn decode(&self, text: &str) -> Result<RecordId, EncoderError> {
        if text.is_empty() {
            return Err(EncoderError::Other("empty identifier".to_string()));
        }
        let mut value: RecordId = 0;
        for c in text.bytes() {
            let digit = ALPHABET
                .iter()
                .position(|&a| a == c)
                .ok_or_else(|| {
                    EncoderError::Other(format!("invalid base62 digit: {}", c as char))
                })?;
            value = value
                .checked_mul(62)
                .and_then(|v| v.checked_add(digit as RecordId))
                .ok_or_else(|| EncoderError::Other(format!("identifier out of range: {}", text)))?;
        }
        Ok(value)
    }
}

impl IdentifierEncoder for Base62Encoder {
    fn encode(&self, id: RecordId) -> Result<String, EncoderError> {
        if id < 0 {
            return Err(EncoderError::Negative(id));
        }
        if id == 0 {
            return Ok("0".to_string());
        }
        let mut n = id;
        let mut digits = Vec::new();
        while n > 0 {
            digits.push(ALPHABET[(n % 62) as usize]);
            n /= 62;
        }
        digits.reverse();
        Ok(digits.into_iter().map(char::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let enc = Base62Encoder::new();
        assert_eq!(enc.encode(0).unwrap(), "0");
        assert_eq!(enc.encode(1).unwrap(), "1");
        assert_eq!(enc.encode(61).unwrap(), "z");
        assert_eq!(enc.encode(62).unwrap(), "10");
        assert_eq!(enc.encode(3844).unwrap(), "100");
    }

    #[test]
    fn decode_inverts_encode() {
        let enc = Base62Encoder::new();
        for id in [1, 42, 9_999, 1_234_567_890, i64::MAX] {
            assert_eq!(enc.decode(&enc.encode(id).unwrap()).unwrap(), id);
        }
    }

    #[test]
    fn rejects_bad_input() {
        let enc = Base62Encoder::new();
        assert!(matches!(enc.encode(-1), Err(EncoderError::Negative(-1))));
        assert!(enc.decode("").is_err());
        assert!(enc.decode("ab-c").is_err());
        assert!(enc.decode("zzzzzzzzzzzzzzz").is_err());
    }
}
