//! RC4 decryption for PDF.
//!
//! RC4 is a stream cipher used by PDF 1.4 and 1.5 (V=1/2, crypt filter
//! method `V2`). It needs no lookahead, so the stage decrypts each chunk as
//! it is pulled.
//!
//! PDF Spec: Section 7.6.2 - General Encryption Algorithm

use crate::decoders::Stream;
use std::io::{self, Read};

/// RC4 keystream generator.
#[derive(Clone)]
pub(crate) struct Rc4Cipher {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4Cipher {
    /// Key schedule. PDF keys are 5-16 bytes; `key` must not be empty.
    pub(crate) fn new(key: &[u8]) -> Self {
        let mut s = [0u8; 256];
        for (i, val) in s.iter_mut().enumerate() {
            *val = i as u8;
        }

        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
            s.swap(i, j as usize);
        }

        Self { s, i: 0, j: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[self.i as usize]);
        self.s.swap(self.i as usize, self.j as usize);
        let k = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
        self.s[k as usize]
    }

    /// XOR the keystream into `data`.
    pub(crate) fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte ^= self.next_byte();
        }
    }
}

/// Streaming RC4 decryption stage.
pub struct Rc4Stage {
    upstream: Stream,
    cipher: Rc4Cipher,
}

impl Rc4Stage {
    /// Decrypt `upstream` with the per-object `key`.
    pub fn new(upstream: Stream, key: &[u8]) -> Self {
        Self {
            upstream,
            cipher: Rc4Cipher::new(key),
        }
    }
}

impl Read for Rc4Stage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.upstream.read(buf)?;
        self.cipher.apply_keystream(&mut buf[..n]);
        Ok(n)
    }
}

/// Encrypt or decrypt a whole buffer (RC4 is symmetric).
pub fn rc4_crypt(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut cipher = Rc4Cipher::new(key);
    let mut result = data.to_vec();
    cipher.apply_keystream(&mut result);
    result
}
