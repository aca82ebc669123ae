#![deny(warnings)]
#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::unreachable)]

//! Dovecot compatible password schemes.
//!
//! Stored credentials carry the scheme that made them, `{MD5-CRYPT}$1$salt$checksum`
//! or `{PLAIN}secret`. A [`DelegatingEncoder`] encodes new credentials with one
//! scheme and verifies stored ones with whatever scheme their tag names.

pub mod config;
pub mod crypt_md5;
pub mod crypt_util;
pub mod encoder;
pub mod md5_digest;
pub mod registry;
pub mod scheme;

pub use crate::config::EncoderConfig;
pub use crate::crypt_util::{FixedSalt, SaltSource, ThreadRngSalt};
pub use crate::encoder::{DelegatingEncoder, FallbackMatcher};
pub use crate::registry::{SchemeRegistry, SchemeRegistryBuilder};
pub use crate::scheme::Scheme;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// The stored value does not have the shape its scheme requires.
    #[error("invalid credential format")]
    InvalidFormat,
    /// Neither the encoder nor its fallback can place the tag.
    #[error("no scheme registered for tag {0:?}")]
    UnmappedScheme(Option<String>),
    #[error("salt may only contain characters of the h64 alphabet")]
    InvalidSalt,
    #[error("scheme {0} is not registered")]
    UnknownScheme(String),
    #[error("invalid scheme tag {0:?}")]
    InvalidSchemeTag(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn test_credential_simple() {
        let enc = DelegatingEncoder::default();
        let c = enc.encode("password");
        assert!(enc.matches("password", &c).unwrap());
        assert!(!enc.matches("password1", &c).unwrap());
        assert!(!enc.matches("Password1", &c).unwrap());
        assert!(!enc.matches("It Works!", &c).unwrap());
        assert!(!enc.matches("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", &c).unwrap());
    }

    #[test]
    fn test_password_from_openssl_md5_crypt() {
        // openssl passwd -1 -salt 12345678 'a much longer password that exceeds sixteen bytes'
        let im_pw = "$1$12345678$xp5UWmFrVKuEfrqQeMZhk1";
        let password = "a much longer password that exceeds sixteen bytes";
        let enc = DelegatingEncoder::default();
        assert!(enc.matches(password, im_pw).unwrap());
        assert!(enc.upgrade_encoding(im_pw));
        let tagged = format!("{{MD5-CRYPT}}{}", im_pw);
        assert!(enc.matches(password, &tagged).unwrap());
        assert!(!enc.upgrade_encoding(&tagged));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(CryptoError::InvalidFormat.to_string(), "invalid credential format");
        assert_eq!(
            CryptoError::UnknownScheme("SHA512-CRYPT".to_string()).to_string(),
            "scheme SHA512-CRYPT is not registered"
        );
        assert_eq!(
            CryptoError::UnmappedScheme(None).to_string(),
            "no scheme registered for tag None"
        );
        assert_eq!(
            CryptoError::UnmappedScheme(Some("SSHA".to_string())).to_string(),
            "no scheme registered for tag Some(\"SSHA\")"
        );
    }
}
