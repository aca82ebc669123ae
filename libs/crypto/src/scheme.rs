use crate::crypt_md5::{md5_crypt, md5_crypt_verify, MD5_SALT_LEN};
use crate::crypt_util::{check_salt, SaltSource};
use crate::md5_digest::{md5_digest, md5_digest_verify, MD5_DIGEST_SALT_LEN};
use crate::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A password scheme. Schemes hold no state, the salt (if any) comes from the
/// caller's [`SaltSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// The credential is stored as is.
    Cleartext,
    /// `$1$salt$checksum`
    Md5Crypt,
    /// `{salt}hexdigest`
    Md5Digest,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scheme::Cleartext => write!(f, "cleartext"),
            Scheme::Md5Crypt => write!(f, "md5-crypt"),
            Scheme::Md5Digest => write!(f, "md5-digest"),
        }
    }
}

impl Scheme {
    pub fn encode(self, cleartext: &str, salts: &dyn SaltSource) -> String {
        match self {
            Scheme::Cleartext => cleartext.to_string(),
            Scheme::Md5Crypt => md5_crypt(cleartext, &salts.salt(MD5_SALT_LEN)),
            Scheme::Md5Digest => md5_digest(cleartext, &salts.salt(MD5_DIGEST_SALT_LEN)),
        }
    }

    /// Encode with a caller chosen salt. Schemes without a salt ignore it,
    /// salted ones refuse a salt that would not survive being parsed back.
    pub fn encode_with_salt(self, cleartext: &str, salt: &str) -> Result<String, CryptoError> {
        match self {
            Scheme::Cleartext => Ok(cleartext.to_string()),
            Scheme::Md5Crypt => {
                check_salt(salt)?;
                Ok(md5_crypt(cleartext, salt))
            }
            Scheme::Md5Digest => {
                check_salt(salt)?;
                Ok(md5_digest(cleartext, salt))
            }
        }
    }

    /// Only fails when `encoded` can not be a value of this scheme.
    pub fn matches(self, cleartext: &str, encoded: &str) -> Result<bool, CryptoError> {
        match self {
            Scheme::Cleartext => Ok(cleartext == encoded),
            Scheme::Md5Crypt => md5_crypt_verify(cleartext, encoded),
            Scheme::Md5Digest => Ok(md5_digest_verify(cleartext, encoded)),
        }
    }

    /// None of the schemes has tunable parameters, so a value can never be
    /// stale within its own scheme.
    pub fn requires_upgrade(self, _encoded: &str) -> bool {
        match self {
            Scheme::Cleartext | Scheme::Md5Crypt | Scheme::Md5Digest => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Scheme;
    use crate::crypt_util::{FixedSalt, ThreadRngSalt};
    use crate::CryptoError;

    #[test]
    fn test_cleartext_scheme() {
        let s = Scheme::Cleartext;
        assert_eq!(s.encode("password", &ThreadRngSalt), "password");
        assert!(s.matches("password", "password").unwrap());
        assert!(!s.matches("password", "Password").unwrap());
        assert!(!s.matches("password", "password ").unwrap());
        assert!(s.matches("", "").unwrap());
        // Cleartext never rejects the shape of what it is given.
        assert!(!s.matches("password", "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0").unwrap());
        // Nor the salt, which it ignores.
        assert_eq!(s.encode_with_salt("password", "ab$cd"), Ok("password".to_string()));
    }

    #[test]
    fn test_md5crypt_scheme_fresh_salts() {
        let s = Scheme::Md5Crypt;
        let a = s.encode("password", &ThreadRngSalt);
        let b = s.encode("password", &ThreadRngSalt);
        assert_ne!(a, b);
        assert!(s.matches("password", &a).unwrap());
        assert!(s.matches("password", &b).unwrap());
        assert!(!s.matches("password1", &a).unwrap());
        // $1$ + 8 + $ + 22
        assert_eq!(a.len(), 34);
    }

    #[test]
    fn test_md5crypt_scheme_fixed_salt() {
        let s = Scheme::Md5Crypt;
        let salts = FixedSalt::new("salt1234").unwrap();
        assert_eq!(s.encode("password", &salts), "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0");
        assert_eq!(
            s.encode_with_salt("password", "salt1234").unwrap(),
            "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0"
        );
    }

    #[test]
    fn test_md5crypt_scheme_rejects_unparsable_salt() {
        for salt in ["ab$cd", "$", "salt 123", "sält"] {
            assert_eq!(
                Scheme::Md5Crypt.encode_with_salt("password", salt),
                Err(CryptoError::InvalidSalt)
            );
        }
        // Every accepted salt verifies again.
        for salt in ["", ".", "./", "Az09./Az", "saltstring"] {
            let enc = Scheme::Md5Crypt.encode_with_salt("password", salt).unwrap();
            assert!(Scheme::Md5Crypt.matches("password", &enc).unwrap());
        }
    }

    #[test]
    fn test_md5crypt_scheme_format_error() {
        assert_eq!(Scheme::Md5Crypt.matches("password", "password"), Err(CryptoError::InvalidFormat));
    }

    #[test]
    fn test_md5digest_scheme() {
        let s = Scheme::Md5Digest;
        let enc = s.encode("password", &ThreadRngSalt);
        assert!(enc.starts_with('{'));
        assert_eq!(enc.len(), 2 + 8 + 32);
        assert!(s.matches("password", &enc).unwrap());
        assert!(!s.matches("wrong", &enc).unwrap());
        assert_eq!(
            s.encode_with_salt("password", "salt1234").unwrap(),
            "{salt1234}ccbfdba2a63d102667daa35992d12cdd"
        );
        assert_eq!(s.encode_with_salt("password", "a}b"), Err(CryptoError::InvalidSalt));
        // Any string is a candidate digest.
        assert_eq!(s.matches("password", "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0"), Ok(false));
    }

    #[test]
    fn test_scheme_never_requires_upgrade() {
        assert!(!Scheme::Cleartext.requires_upgrade("password"));
        assert!(!Scheme::Md5Crypt.requires_upgrade("$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0"));
        assert!(!Scheme::Md5Digest.requires_upgrade("5f4dcc3b5aa765d61d8327deb882cf99"));
    }
}
