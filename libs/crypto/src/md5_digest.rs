//! Salted hex MD5 digests, `{salt}5f4dcc3b...`, the generic `MD5` id of
//! delegating password stores. The digest covers the password followed by the
//! salt with its braces. Values without a `{salt}` prefix are unsalted.

use md5::{Digest, Md5};

pub const MD5_DIGEST_SALT_LEN: usize = 8;

/// The `{salt}` prefix of `encoded`, braces included, or `""` when there is none.
fn salt_prefix(encoded: &str) -> &str {
    if !encoded.starts_with('{') {
        return "";
    }
    match encoded.find('}') {
        Some(end) => &encoded[..=end],
        None => "",
    }
}

fn digest(pass: &str, prefix: &str) -> String {
    let mut dgst = Md5::new();
    dgst.update(pass.as_bytes());
    dgst.update(prefix.as_bytes());
    let mut out = String::with_capacity(prefix.len() + 32);
    out.push_str(prefix);
    out.push_str(&hex::encode(dgst.finalize()));
    out
}

/// An empty salt gives the bare digest.
pub fn md5_digest(pass: &str, salt: &str) -> String {
    if salt.is_empty() {
        digest(pass, "")
    } else {
        digest(pass, &format!("{{{}}}", salt))
    }
}

/// Any string is a candidate, so this never fails.
pub fn md5_digest_verify(pass: &str, encoded: &str) -> bool {
    digest(pass, salt_prefix(encoded)) == encoded
}
