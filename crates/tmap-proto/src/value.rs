//! String values as stored by existing tmap writers.
//!
//! Those writers put a length-prefixed string *inside* the value blob, so on
//! the wire a string value carries two length prefixes: the blob's and the
//! string's.

use tmap_codec::{Decoder, Encoder, PREFIX_LEN};

use crate::error::ProtoResult;

/// Wrap `value` as a string-encoded blob body.
pub fn encode_str_value(value: &str) -> Vec<u8> {
    let mut enc = Encoder::with_capacity(PREFIX_LEN + value.len());
    enc.put_str(value);
    enc.into_vec()
}

/// Unwrap a string-encoded blob body. The blob must hold exactly one string.
pub fn decode_str_value(blob: &[u8]) -> ProtoResult<String> {
    let mut dec = Decoder::new(blob);
    let value = dec.get_str()?.to_owned();
    dec.finish()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtoError;

    #[test]
    fn string_value_roundtrip() {
        let blob = encode_str_value("val1");
        assert_eq!(blob, [4, 0, 0, 0, b'v', b'a', b'l', b'1']);
        assert_eq!(decode_str_value(&blob).unwrap(), "val1");
    }

    #[test]
    fn raw_bytes_are_not_a_string_value() {
        assert!(matches!(
            decode_str_value(b"val1"),
            Err(ProtoError::Corrupt(_))
        ));
    }

    #[test]
    fn extra_bytes_after_string_rejected() {
        let mut blob = encode_str_value("a");
        blob.push(0);
        assert!(decode_str_value(&blob).is_err());
    }
}
