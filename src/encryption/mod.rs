//! PDF stream decryption.
//!
//! Stream opening consumes encryption through the [`CryptHandler`] trait:
//! "wrap this stream with the default decryption for object (num, gen)" and
//! "wrap it with the named crypt filter". [`StandardCryptHandler`]
//! implements that for the Standard security handler once the file key is
//! known; deriving the key from passwords happens elsewhere.
//!
//! # Methods
//!
//! - RC4 (crypt filter method `V2`): 40 to 128-bit keys, PDF 1.4-1.5
//! - AES-128 (`AESV2`): PDF 1.6+
//! - AES-256 (`AESV3`): PDF 2.0
//!
//! # References
//!
//! - PDF Spec Section 7.6.2: General Encryption Algorithm (Algorithm 1)
//! - PDF Spec Section 7.6.5: Crypt Filters

use crate::decoders::Stream;
use crate::error::{Error, Result};

mod aes;
mod handler;
mod rc4;

pub use aes::{aes_cbc_decrypt, AesDecoder};
pub use handler::StandardCryptHandler;
pub use rc4::{rc4_crypt, Rc4Stage};

/// Cipher used by a crypt filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMethod {
    /// No decryption (`None` / `Identity`)
    Identity,
    /// RC4 (`V2`)
    Rc4,
    /// AES-128 in CBC mode (`AESV2`)
    Aes128,
    /// AES-256 in CBC mode (`AESV3`)
    Aes256,
}

impl CryptMethod {
    /// Map a crypt filter `CFM` name to its method.
    pub fn from_cfm(name: &str) -> Option<Self> {
        match name {
            "None" | "Identity" => Some(CryptMethod::Identity),
            "V2" => Some(CryptMethod::Rc4),
            "AESV2" => Some(CryptMethod::Aes128),
            "AESV3" => Some(CryptMethod::Aes256),
            _ => None,
        }
    }

    /// Check if this is an AES method.
    pub fn is_aes(&self) -> bool {
        matches!(self, CryptMethod::Aes128 | CryptMethod::Aes256)
    }

    /// Validate the file key length for this method.
    pub fn check_key(&self, key: &[u8]) -> Result<()> {
        let ok = match self {
            CryptMethod::Identity => true,
            CryptMethod::Rc4 => (5..=16).contains(&key.len()),
            CryptMethod::Aes128 => key.len() == 16,
            CryptMethod::Aes256 => key.len() == 32,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::Encryption(format!(
                "{:?} cannot use a {}-byte key",
                self,
                key.len()
            )))
        }
    }
}

/// Document encryption state as seen by stream opening.
///
/// Both methods take ownership of `stream`; the returned stage owns it.
/// `num`/`gen` are the stream's original identity, which seeds the
/// per-object key.
pub trait CryptHandler {
    /// Wrap `stream` with the document's default stream decryption (`StmF`).
    fn open_default(&self, stream: Stream, num: u32, gen: u16) -> Result<Stream>;

    /// Wrap `stream` with the crypt filter called `name`.
    fn open_with_filter(&self, stream: Stream, name: &str, num: u32, gen: u16) -> Result<Stream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cfm_names() {
        assert_eq!(CryptMethod::from_cfm("V2"), Some(CryptMethod::Rc4));
        assert_eq!(CryptMethod::from_cfm("AESV2"), Some(CryptMethod::Aes128));
        assert_eq!(CryptMethod::from_cfm("AESV3"), Some(CryptMethod::Aes256));
        assert_eq!(CryptMethod::from_cfm("None"), Some(CryptMethod::Identity));
        assert_eq!(CryptMethod::from_cfm("Identity"), Some(CryptMethod::Identity));
        assert_eq!(CryptMethod::from_cfm("V3"), None);
    }

    #[test]
    fn test_key_length_checks() {
        assert!(CryptMethod::Rc4.check_key(&[0; 5]).is_ok());
        assert!(CryptMethod::Rc4.check_key(&[0; 4]).is_err());
        assert!(CryptMethod::Aes128.check_key(&[0; 16]).is_ok());
        assert!(CryptMethod::Aes128.check_key(&[0; 5]).is_err());
        assert!(CryptMethod::Aes256.check_key(&[0; 32]).is_ok());
        assert!(CryptMethod::Identity.check_key(&[]).is_ok());
    }
}
