//! Multicodec-prefixed ("multikey") keys in base58-btc multibase.

use multibase::Base;

use crate::error::CryptoError;

/// Number of bytes a key multicodec prefix must occupy.
pub const MULTICODEC_PREFIX_LEN: usize = 2;

/// Decode a multibase string, accepting only base58-btc (`z...`).
pub fn decode_base58btc(value: &str) -> Result<Vec<u8>, CryptoError> {
    let (base, bytes) =
        multibase::decode(value).map_err(|e| CryptoError::InvalidMultibase(e.to_string()))?;
    if base != Base::Base58Btc {
        return Err(CryptoError::InvalidMultibase(format!(
            "expected base58-btc, found {:?}",
            base
        )));
    }
    Ok(bytes)
}

/// Encode raw bytes as a base58-btc multibase string.
pub fn encode_base58btc(bytes: &[u8]) -> String {
    multibase::encode(Base::Base58Btc, bytes)
}

/// Decode a multibase multikey into its multicodec and key bytes.
///
/// The multicodec must be encoded in exactly [`MULTICODEC_PREFIX_LEN`] bytes.
pub fn decode_multikey(value: &str) -> Result<(u64, Vec<u8>), CryptoError> {
    let decoded = decode_base58btc(value)?;
    let (codec, key) = unsigned_varint::decode::u64(&decoded)
        .map_err(|e| CryptoError::InvalidMultibase(format!("invalid multicodec varint: {}", e)))?;
    let prefix_len = decoded.len() - key.len();
    if prefix_len != MULTICODEC_PREFIX_LEN {
        return Err(CryptoError::InvalidMultibase(format!(
            "expected a {}-byte multicodec prefix, found {} bytes",
            MULTICODEC_PREFIX_LEN, prefix_len
        )));
    }
    Ok((codec, key.to_vec()))
}

/// Encode key bytes with their multicodec as a base58-btc multikey.
pub fn encode_multikey(codec: u64, key: &[u8]) -> String {
    let mut buf = unsigned_varint::encode::u64_buffer();
    let prefix = unsigned_varint::encode::u64(codec, &mut buf);
    let mut bytes = Vec::with_capacity(prefix.len() + key.len());
    bytes.extend_from_slice(prefix);
    bytes.extend_from_slice(key);
    encode_base58btc(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ed25519_multikey() {
        let (codec, key) =
            decode_multikey("z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK").unwrap();
        assert_eq!(codec, 0xed);
        assert_eq!(key.len(), 32);
    }

    #[test]
    fn test_multikey_encode_decode() {
        let key = [9u8; 32];
        let encoded = encode_multikey(0xec, &key);
        assert!(encoded.starts_with('z'));
        let (codec, decoded) = decode_multikey(&encoded).unwrap();
        assert_eq!(codec, 0xec);
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_codec_prefix_bytes() {
        let encoded = encode_multikey(0xed, &[1, 2]);
        assert_eq!(decode_base58btc(&encoded).unwrap(), vec![0xed, 0x01, 1, 2]);
        let encoded = encode_multikey(0x1200, &[3]);
        assert_eq!(decode_base58btc(&encoded).unwrap(), vec![0x80, 0x24, 3]);
    }

    #[test]
    fn test_wrong_multibase_prefix() {
        // valid base16 multibase, but not base58-btc
        let result = decode_base58btc("f00ff");
        assert!(matches!(result, Err(CryptoError::InvalidMultibase(_))));
        assert!(decode_base58btc("").is_err());
    }

    #[test]
    fn test_invalid_base58_characters() {
        // '0', 'O', 'I' and 'l' are not part of the base58 alphabet
        assert!(matches!(
            decode_base58btc("z0OIl"),
            Err(CryptoError::InvalidMultibase(_))
        ));
    }

    #[test]
    fn test_single_byte_codec_rejected() {
        // codec 0x12 fits in one varint byte
        let encoded = encode_base58btc(&[0x12, 1, 2, 3]);
        assert!(matches!(
            decode_multikey(&encoded),
            Err(CryptoError::InvalidMultibase(_))
        ));
    }

    #[test]
    fn test_truncated_varint_rejected() {
        let encoded = encode_base58btc(&[0x80]);
        assert!(matches!(
            decode_multikey(&encoded),
            Err(CryptoError::InvalidMultibase(_))
        ));
    }
}
