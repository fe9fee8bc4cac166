//! Standard security handler decryption.

use super::aes::AesDecoder;
use super::rc4::Rc4Stage;
use super::{CryptHandler, CryptMethod};
use crate::decoders::{BufferedStage, Stream};
use crate::error::{Error, Result};
use md5::{Digest, Md5};
use std::collections::HashMap;

/// Decrypts streams with an already-derived file key.
#[derive(Debug, Clone)]
pub struct StandardCryptHandler {
    /// File encryption key
    key: Vec<u8>,
    /// Method of the default stream filter (`StmF`)
    stream_method: CryptMethod,
    /// Crypt filters from the `CF` dictionary, by name
    filters: HashMap<String, CryptMethod>,
}

impl StandardCryptHandler {
    /// Create a handler whose default stream filter uses `method`.
    pub fn new(key: Vec<u8>, method: CryptMethod) -> Result<Self> {
        method.check_key(&key)?;
        log::info!("stream decryption with {:?} ({}-bit key)", method, key.len() * 8);
        Ok(Self {
            key,
            stream_method: method,
            filters: HashMap::new(),
        })
    }

    /// Register a named crypt filter.
    pub fn with_crypt_filter(mut self, name: impl Into<String>, method: CryptMethod) -> Result<Self> {
        method.check_key(&self.key)?;
        self.filters.insert(name.into(), method);
        Ok(self)
    }

    /// Method of the default stream filter.
    pub fn stream_method(&self) -> CryptMethod {
        self.stream_method
    }

    /// Compute the object-specific key.
    ///
    /// PDF Spec: Algorithm 1. AES-256 uses the file key as is.
    pub fn object_key(&self, method: CryptMethod, num: u32, gen: u16) -> Vec<u8> {
        if method == CryptMethod::Aes256 {
            return self.key.clone();
        }

        let mut hasher = Md5::new();
        hasher.update(&self.key);
        hasher.update(&num.to_le_bytes()[..3]);
        hasher.update(gen.to_le_bytes());
        if method.is_aes() {
            hasher.update(b"sAlT");
        }
        let hash = hasher.finalize();

        let key_len = (self.key.len() + 5).min(16);
        hash[..key_len].to_vec()
    }

    fn open_method(&self, stream: Stream, method: CryptMethod, num: u32, gen: u16) -> Stream {
        match method {
            CryptMethod::Identity => stream,
            CryptMethod::Rc4 => Box::new(Rc4Stage::new(stream, &self.object_key(method, num, gen))),
            CryptMethod::Aes128 | CryptMethod::Aes256 => {
                let decoder = AesDecoder::new(self.object_key(method, num, gen));
                Box::new(BufferedStage::new(stream, decoder))
            },
        }
    }
}

impl CryptHandler for StandardCryptHandler {
    fn open_default(&self, stream: Stream, num: u32, gen: u16) -> Result<Stream> {
        Ok(self.open_method(stream, self.stream_method, num, gen))
    }

    fn open_with_filter(&self, stream: Stream, name: &str, num: u32, gen: u16) -> Result<Stream> {
        if name == "Identity" {
            return Ok(stream);
        }
        let method = self
            .filters
            .get(name)
            .copied()
            .ok_or_else(|| Error::Encryption(format!("unknown crypt filter: {}", name)))?;
        Ok(self.open_method(stream, method, num, gen))
    }
}
