use crate::error::{Result, TzarError};
use crate::pipeline::digest::{sha256, DIGEST_LEN};
use std::fmt;

/// Password-derived key. Lives for one protect/unprotect run, never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Key([u8; DIGEST_LEN]);

impl Key {
    /// Single unsalted SHA-256 pass over the password's UTF-8 bytes
    pub fn derive(password: &str) -> Result<Self> {
        if password.is_empty() {
            return Err(TzarError::PasswordRequired);
        }
        Ok(Self(sha256(password.as_bytes())))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Scramble or unscramble `data` in place
    pub fn apply(&self, data: &mut [u8]) {
        xor_keystream(data, &self.0);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(..)")
    }
}

/// `data[i] ^= key[i % key.len()]`, restarting at offset zero for every call.
/// Self-inverse. An empty key leaves the data untouched.
pub fn xor_keystream(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    for (byte, k) in data.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}
