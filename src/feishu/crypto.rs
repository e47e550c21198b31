//! Feishu event payload encryption and request signatures.
//!
//! Encrypted bodies are `base64(iv || AES-256-CBC(plaintext))` with PKCS#7
//! padding, keyed by SHA-256 of the configured encrypt key.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use base64::Engine;
use ring::digest::{digest, SHA256};

use crate::errors::{AppError, AppResult};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

pub struct EventCipher {
    key: [u8; 32],
}

impl EventCipher {
    pub fn new(encrypt_key: &str) -> Self {
        let mut key = [0u8; 32];
        key.copy_from_slice(digest(&SHA256, encrypt_key.as_bytes()).as_ref());
        Self { key }
    }

    pub fn decrypt(&self, encrypted: &str) -> AppResult<String> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encrypted.trim())
            .map_err(|_| AppError::Decrypt("invalid base64".into()))?;

        if data.len() <= IV_LEN {
            return Err(AppError::Decrypt("payload too short".into()));
        }
        let (iv, ciphertext) = data.split_at(IV_LEN);

        let plaintext = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|_| AppError::Decrypt("invalid key or IV length".into()))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| AppError::Decrypt("bad padding".into()))?;

        String::from_utf8(plaintext).map_err(|_| AppError::Decrypt("payload is not UTF-8".into()))
    }

    #[cfg(test)]
    pub fn encrypt(&self, plaintext: &str, iv: [u8; IV_LEN]) -> String {
        use aes::cipher::BlockEncryptMut;
        type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

        let ciphertext = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .expect("key and IV have fixed lengths")
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        let mut data = iv.to_vec();
        data.extend_from_slice(&ciphertext);
        base64::engine::general_purpose::STANDARD.encode(data)
    }
}

/// `hex(sha256(timestamp + nonce + encrypt_key + body))`, as sent in `X-Lark-Signature`.
pub fn request_signature(timestamp: &str, nonce: &str, encrypt_key: &str, body: &[u8]) -> String {
    let mut input = Vec::with_capacity(timestamp.len() + nonce.len() + encrypt_key.len() + body.len());
    input.extend_from_slice(timestamp.as_bytes());
    input.extend_from_slice(nonce.as_bytes());
    input.extend_from_slice(encrypt_key.as_bytes());
    input.extend_from_slice(body);
    hex::encode(digest(&SHA256, &input).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypts_what_was_encrypted() {
        let cipher = EventCipher::new("test key");
        let encrypted = cipher.encrypt(r#"{"challenge":"abc"}"#, [7u8; 16]);
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), r#"{"challenge":"abc"}"#);
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = EventCipher::new("right").encrypt("hello world, this is long", [1u8; 16]);
        // A wrong key almost always yields invalid padding or non-UTF-8 output
        match EventCipher::new("wrong").decrypt(&encrypted) {
            Ok(plaintext) => assert_ne!(plaintext, "hello world, this is long"),
            Err(e) => assert!(matches!(e, AppError::Decrypt(_))),
        }
    }

    #[test]
    fn test_rejects_short_payload() {
        let cipher = EventCipher::new("k");
        let short = base64::engine::general_purpose::STANDARD.encode([0u8; 8]);
        assert!(matches!(cipher.decrypt(&short), Err(AppError::Decrypt(_))));
        assert!(matches!(cipher.decrypt("%%%"), Err(AppError::Decrypt(_))));
    }

    #[test]
    fn test_signature_is_hex_sha256() {
        let sig = request_signature("1600000000", "nonce", "key", b"{}");
        assert_eq!(sig.len(), 64);
        assert_eq!(sig, request_signature("1600000000", "nonce", "key", b"{}"));
        assert_ne!(sig, request_signature("1600000001", "nonce", "key", b"{}"));
    }
}
