//! MD5-crypt (`$1$`), as produced by `crypt(3)`, `openssl passwd -1` and
//! Dovecot's `MD5-CRYPT` scheme.

use crate::crypt_util::itoa64;
use crate::CryptoError;
use md5::{Digest, Md5};
use std::cmp::min;

pub const MD5_MAGIC: &str = "$1$";
/// Maximum salt length, longer salts are truncated.
pub const MD5_SALT_LEN: usize = 8;
const MD5_ROUNDS: usize = 1000;

/// Byte indices of the final digest, grouped in the order they are emitted.
const MD5_GROUPS: [(usize, usize, usize); 5] = [
    (0, 6, 12),
    (1, 7, 13),
    (2, 8, 14),
    (3, 9, 15),
    (4, 10, 5),
];

fn combine(b0: u8, b1: u8, b2: u8, size: usize) -> String {
    itoa64((u32::from(b0) << 16) | (u32::from(b1) << 8) | u32::from(b2), size)
}

/// The 22 character checksum for `pass` and an already truncated `salt`.
///
/// 1. `alt = MD5(pass salt pass)`
/// 2. the main context takes `pass`, the magic and `salt`
/// 3. then `alt`, repeated, until `pass.len()` bytes of it went in
/// 4. then one byte per bit of `pass.len()`, low bit first: a zero byte for a
///    set bit, the first password byte for a clear one
/// 5. 1000 rounds stir the digest with `pass` and `salt`
/// 6. the digest bytes are emitted in [`MD5_GROUPS`] order, `[11]` last
pub fn do_md5_crypt(pass: &[u8], salt: &[u8]) -> String {
    let mut alt_ctx = Md5::new();
    alt_ctx.update(pass);
    alt_ctx.update(salt);
    alt_ctx.update(pass);
    let alt = alt_ctx.finalize();

    let mut ctx = Md5::new();
    ctx.update(pass);
    ctx.update(MD5_MAGIC.as_bytes());
    ctx.update(salt);

    let mut left = pass.len();
    while left > 0 {
        let n = min(left, alt.len());
        ctx.update(&alt[..n]);
        left -= n;
    }

    let mut bits = pass.len();
    while bits != 0 {
        if bits & 1 == 1 {
            ctx.update([0u8]);
        } else {
            ctx.update(&pass[..1]);
        }
        bits >>= 1;
    }

    let mut fin = ctx.finalize();

    for round in 0..MD5_ROUNDS {
        let odd = round & 1 == 1;
        let mut ctx = Md5::new();
        if odd {
            ctx.update(pass);
        } else {
            ctx.update(fin);
        }
        if round % 3 != 0 {
            ctx.update(salt);
        }
        if round % 7 != 0 {
            ctx.update(pass);
        }
        if odd {
            ctx.update(fin);
        } else {
            ctx.update(pass);
        }
        fin = ctx.finalize();
    }

    let mut out = String::with_capacity(22);
    for (i, j, k) in MD5_GROUPS {
        out.push_str(&combine(fin[i], fin[j], fin[k], 4));
    }
    out.push_str(&combine(0, 0, fin[11], 2));
    out
}

fn truncate_salt(salt: &str) -> &str {
    match salt.char_indices().nth(MD5_SALT_LEN) {
        Some((idx, _)) => &salt[..idx],
        None => salt,
    }
}

/// Produce `$1$<salt>$<checksum>`. Salts longer than eight characters are cut.
/// The salt is not checked here, see [`crate::crypt_util::check_salt`].
pub fn md5_crypt(pass: &str, salt: &str) -> String {
    let salt = truncate_salt(salt);
    let mut out = String::with_capacity(MD5_MAGIC.len() + salt.len() + 23);
    out.push_str(MD5_MAGIC);
    out.push_str(salt);
    out.push('$');
    out.push_str(&do_md5_crypt(pass.as_bytes(), salt.as_bytes()));
    out
}

/// Extract the salt of a `$1$` string, that is everything after the magic up to
/// the next `$`.
pub fn md5_crypt_salt(encoded: &str) -> Result<&str, CryptoError> {
    let rest = encoded
        .strip_prefix(MD5_MAGIC)
        .ok_or(CryptoError::InvalidFormat)?;
    Ok(rest.split('$').next().unwrap_or(rest))
}

/// Check `pass` against a `$1$` string. A string without the magic is an error,
/// not a mismatch.
pub fn md5_crypt_verify(pass: &str, encoded: &str) -> Result<bool, CryptoError> {
    let salt = md5_crypt_salt(encoded)?;
    Ok(md5_crypt(pass, salt) == encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Generated with `openssl passwd -1 -salt <salt> <password>`.
    const KNOWN: &[(&str, &str, &str)] = &[
        ("password", "salt1234", "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0"),
        ("Hello", "saltstring", "$1$saltstri$OINShNxjt0ZCuX7ywvcGD0"),
        ("", "ab", "$1$ab$rn6aQS/o7141mj179E/zA."),
        (
            "a much longer password that exceeds sixteen bytes",
            "12345678",
            "$1$12345678$xp5UWmFrVKuEfrqQeMZhk1",
        ),
        ("pässwörd", "xyz", "$1$xyz$FAUeulah1tpnFLXpExRxB1"),
    ];

    #[test]
    fn test_md5_crypt_known_answers() {
        for (pass, salt, expect) in KNOWN {
            assert_eq!(&md5_crypt(pass, salt), expect);
            assert!(md5_crypt_verify(pass, expect).unwrap());
        }
    }

    #[test]
    fn test_md5_crypt_checksum_shape() {
        let c = do_md5_crypt(b"password", b"salt1234");
        assert_eq!(c, "HJCsv4hSeVLHo3hVyl4nh0");
        assert_eq!(c.len(), 22);
        assert!(c.bytes().all(|b| crate::crypt_util::CRYPT_HASH64.contains(&b)));
    }

    #[test]
    fn test_md5_crypt_round_trip_salt_lengths() {
        for salt in ["a", "ab", "abc", "abcd", "abcde", "abcdef", "abcdefg", "abcdefgh"] {
            let enc = md5_crypt("correct horse", salt);
            assert!(enc.starts_with(&format!("$1${}$", salt)));
            assert!(md5_crypt_verify("correct horse", &enc).unwrap());
            assert!(!md5_crypt_verify("correct horse!", &enc).unwrap());
        }
    }

    #[test]
    fn test_md5_crypt_distinct_passwords() {
        let a = md5_crypt("password1", "salt1234");
        let b = md5_crypt("password2", "salt1234");
        assert_ne!(a, b);
    }

    #[test]
    fn test_md5_crypt_salt_truncation() {
        assert_eq!(truncate_salt("0123456789"), "01234567");
        assert_eq!(truncate_salt("ünïcödéxyz"), "ünïcödéx");
        assert_eq!(truncate_salt("short"), "short");
    }

    #[test]
    fn test_md5_crypt_salt_extraction() {
        assert_eq!(md5_crypt_salt("$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0").unwrap(), "salt1234");
        assert_eq!(md5_crypt_salt("$1$nodigest").unwrap(), "nodigest");
        assert_eq!(md5_crypt_salt("$1$$abc").unwrap(), "");
    }

    #[test]
    fn test_md5_crypt_invalid_format() {
        assert_eq!(md5_crypt_verify("password", "password"), Err(CryptoError::InvalidFormat));
        assert_eq!(
            md5_crypt_verify("password", "$5$salt1234$HJCsv4hSeVLHo3hVyl4nh0"),
            Err(CryptoError::InvalidFormat)
        );
        assert_eq!(md5_crypt_verify("password", ""), Err(CryptoError::InvalidFormat));
    }

    #[test]
    fn test_md5_crypt_tampered() {
        assert!(!md5_crypt_verify("password", "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh1").unwrap());
        assert!(!md5_crypt_verify("password", "$1$salt1234$HJCsv4hSeVLHo3hVyl4nh0x").unwrap());
        assert!(!md5_crypt_verify("password", "$1$salt1235$HJCsv4hSeVLHo3hVyl4nh0").unwrap());
    }
}
