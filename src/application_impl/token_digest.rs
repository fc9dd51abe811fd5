use anyhow::Result;
use hmac::{Hmac, KeyInit, Mac};
use nanoid::nanoid;
use sha2::Sha256;

const TOKEN_LEN: usize = 32;

/// Issues one-time tokens and the keyed digest stored in their place.
pub struct TokenDigest {
    key: Vec<u8>,
}

impl TokenDigest {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        TokenDigest { key: key.into() }
    }

    pub fn generate(&self) -> String {
        nanoid!(TOKEN_LEN)
    }

    pub fn hmac_hex(&self, token: &str) -> Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
