//! Helpers shared by the crypt family schemes: salt generation and the crypt
//! flavour of base64 ("h64"), which is not interchangeable with RFC 4648 base64.

use crate::CryptoError;
use rand::Rng;
use std::fmt;
use tracing::error;

/// Characters a generated salt is drawn from. Note this is 62 symbols, not 64.
pub const SALT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

pub const CRYPT_HASH64: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generate `length` salt characters, each chosen uniformly from [`SALT_ALPHABET`].
pub fn salt<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| SALT_ALPHABET[rng.gen_range(0..SALT_ALPHABET.len())] as char)
        .collect()
}

/// Encode the low `6 * size` bits of `value` as `size` h64 characters, least
/// significant group first.
pub fn itoa64(mut value: u32, size: usize) -> String {
    let mut out = String::with_capacity(size);
    for _ in 0..size {
        out.push(CRYPT_HASH64[(value & 0x3f) as usize] as char);
        value >>= 6;
    }
    out
}

/// Caller supplied salts may only use the h64 alphabet. Anything else, `$`
/// in particular, would make the stored value unparsable.
pub fn check_salt(salt: &str) -> Result<(), CryptoError> {
    if salt.bytes().all(|c| CRYPT_HASH64.contains(&c)) {
        Ok(())
    } else {
        error!("salt contains characters outside of the h64 alphabet");
        Err(CryptoError::InvalidSalt)
    }
}

/// A source of salts for schemes that need one. Implementations must be usable
/// from many threads at once.
pub trait SaltSource: fmt::Debug + Send + Sync {
    fn salt(&self, length: usize) -> String;
}

/// Salts from the calling thread's generator. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSalt;

impl SaltSource for ThreadRngSalt {
    fn salt(&self, length: usize) -> String {
        salt(&mut rand::thread_rng(), length)
    }
}

/// Always hands out the same salt, cut to the requested length.
#[derive(Debug, Clone)]
pub struct FixedSalt(String);

impl FixedSalt {
    pub fn new(salt: &str) -> Result<Self, CryptoError> {
        check_salt(salt)?;
        Ok(FixedSalt(salt.to_string()))
    }
}

impl SaltSource for FixedSalt {
    fn salt(&self, length: usize) -> String {
        self.0.chars().take(length).collect()
    }
}
