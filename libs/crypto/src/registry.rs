use crate::scheme::Scheme;
use crate::CryptoError;
use std::collections::BTreeMap;
use tracing::{error, trace};

pub const MD5_CRYPT: &str = "MD5-CRYPT";

/// Tags Dovecot uses for credentials stored in the clear.
pub const CLEARTEXT_TAGS: [&str; 4] = ["CLEAR", "CLEARTEXT", "PLAIN", "PLAINTEXT"];

/// Generic ids understood by delegating password stores outside of Dovecot.
pub const NOOP: &str = "noop";
pub const MD5: &str = "MD5";

fn normalise(tag: &str) -> String {
    tag.to_ascii_uppercase()
}

/// Maps scheme tags to the [`Scheme`] that handles them. Tags compare without
/// regard to ASCII case. Once built the mapping can not change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemeRegistry {
    schemes: BTreeMap<String, Scheme>,
}

#[derive(Debug, Default)]
pub struct SchemeRegistryBuilder {
    schemes: Vec<(String, Scheme)>,
}

impl SchemeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, tag: &str, scheme: Scheme) -> Self {
        self.schemes.push((tag.to_string(), scheme));
        self
    }

    pub fn build(self) -> Result<SchemeRegistry, CryptoError> {
        let mut schemes = BTreeMap::new();
        for (tag, scheme) in self.schemes {
            if tag.is_empty() || tag.contains('{') || tag.contains('}') {
                error!(?tag, "scheme tag must be non-empty and may not contain braces");
                return Err(CryptoError::InvalidSchemeTag(tag));
            }
            trace!(%tag, %scheme, "registering scheme");
            // Later entries win.
            schemes.insert(normalise(&tag), scheme);
        }
        Ok(SchemeRegistry { schemes })
    }
}

impl SchemeRegistry {
    pub fn builder() -> SchemeRegistryBuilder {
        SchemeRegistryBuilder::new()
    }

    /// `MD5-CRYPT` plus the cleartext aliases.
    pub fn dovecot() -> Self {
        let mut schemes = BTreeMap::new();
        schemes.insert(MD5_CRYPT.to_string(), Scheme::Md5Crypt);
        for tag in CLEARTEXT_TAGS {
            schemes.insert(tag.to_string(), Scheme::Cleartext);
        }
        SchemeRegistry { schemes }
    }

    /// `noop` and `MD5`, the generic ids a second tier fallback resolves.
    pub fn generic() -> Self {
        let mut schemes = BTreeMap::new();
        schemes.insert(normalise(NOOP), Scheme::Cleartext);
        schemes.insert(normalise(MD5), Scheme::Md5Digest);
        SchemeRegistry { schemes }
    }

    pub fn empty() -> Self {
        SchemeRegistry {
            schemes: BTreeMap::new(),
        }
    }

    pub fn get(&self, tag: &str) -> Option<Scheme> {
        self.schemes.get(&normalise(tag)).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Registered tags (upper case) with their schemes, sorted by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Scheme)> {
        self.schemes.iter().map(|(t, s)| (t.as_str(), *s))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        SchemeRegistry::dovecot()
    }
}
