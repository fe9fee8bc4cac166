//! AES decryption for PDF.
//!
//! PDF 1.6+ encrypts streams with AES in CBC mode: the first 16 bytes of the
//! stream are the IV, the rest is PKCS#7-padded ciphertext.
//!
//! - AES-128: crypt filter method `AESV2` (V=4)
//! - AES-256: crypt filter method `AESV3` (V=5, PDF 2.0)
//!
//! Padding can only be checked at the end of the data, so the stage runs on
//! the whole stream at first read.
//!
//! PDF Spec: Section 7.6.2 - General Encryption Algorithm

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use aes::{Aes128, Aes256};

type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const BLOCK: usize = 16;

/// Decrypt CBC ciphertext and strip PKCS#7 padding; the key length picks
/// AES-128 or AES-256.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    if !data.len().is_multiple_of(BLOCK) {
        return Err(Error::Encryption(format!(
            "AES ciphertext length {} is not a multiple of 16",
            data.len()
        )));
    }

    let mut buffer = data.to_vec();
    let len = match key.len() {
        16 => Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|_| Error::Encryption("IV must be 16 bytes".to_string()))?
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|_| Error::Encryption("invalid PKCS#7 padding".to_string()))?
            .len(),
        32 => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|_| Error::Encryption("IV must be 16 bytes".to_string()))?
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|_| Error::Encryption("invalid PKCS#7 padding".to_string()))?
            .len(),
        n => {
            return Err(Error::Encryption(format!("AES key must be 16 or 32 bytes, got {}", n)));
        },
    };

    buffer.truncate(len);
    Ok(buffer)
}

/// Whole-stream AES decryptor: IV prefix, then ciphertext.
pub struct AesDecoder {
    key: Vec<u8>,
}

impl AesDecoder {
    /// `key` is the per-object key (16 or 32 bytes).
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }
}

impl StreamDecoder for AesDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        if input.len() < BLOCK {
            return Err(Error::Encryption("partial IV in AES stream".to_string()));
        }
        let (iv, ciphertext) = input.split_at(BLOCK);
        aes_cbc_decrypt(&self.key, iv, ciphertext)
    }

    fn name(&self) -> &str {
        "AES"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aes::cipher::BlockEncryptMut;

    /// IV-prefixed AES-CBC encryption, for building test inputs.
    pub(crate) fn aes_encrypt_with_iv(key: &[u8], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
        let padded_len = (data.len() / BLOCK + 1) * BLOCK;
        let mut buffer = vec![0u8; padded_len];
        buffer[..data.len()].copy_from_slice(data);
        let ciphertext = match key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
                .unwrap()
                .encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len())
                .unwrap()
                .to_vec(),
            _ => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
                .unwrap()
                .encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len())
                .unwrap()
                .to_vec(),
        };
        let mut out = iv.to_vec();
        out.extend_from_slice(&ciphertext);
        out
    }

    #[test]
    fn test_aes128_stream_decrypt() {
        let key = b"0123456789abcdef";
        let encrypted = aes_encrypt_with_iv(key, b"fedcba9876543210", b"Hello, AES encryption!");
        let decrypted = AesDecoder::new(key.to_vec()).decode(&encrypted).unwrap();
        assert_eq!(decrypted, b"Hello, AES encryption!");
    }

    #[test]
    fn test_aes256_block_aligned() {
        let key = [7u8; 32];
        let encrypted = aes_encrypt_with_iv(&key, &[1; 16], b"Exactly16bytes!!");
        assert_eq!(encrypted.len(), 16 + 32);
        let decrypted = AesDecoder::new(key.to_vec()).decode(&encrypted).unwrap();
        assert_eq!(decrypted, b"Exactly16bytes!!");
    }

    #[test]
    fn test_aes_empty_stream() {
        assert!(AesDecoder::new(vec![0; 16]).decode(b"").unwrap().is_empty());
    }

    #[test]
    fn test_aes_partial_iv() {
        let result = AesDecoder::new(vec![0; 16]).decode(b"short");
        assert!(matches!(result, Err(Error::Encryption(_))));
    }

    #[test]
    fn test_aes_wrong_key_fails_padding() {
        let encrypted = aes_encrypt_with_iv(b"0123456789abcdef", &[0; 16], b"payload");
        let result = AesDecoder::new(b"fedcba9876543210".to_vec()).decode(&encrypted);
        // A wrong key almost always yields invalid padding
        if let Ok(data) = result {
            assert_ne!(data, b"payload");
        }
    }

    #[test]
    fn test_aes_invalid_key_length() {
        assert!(aes_cbc_decrypt(b"short", &[0; 16], &[0; 16]).is_err());
    }
}
