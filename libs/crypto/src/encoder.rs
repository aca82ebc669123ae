//! Credentials tagged with the scheme that produced them, `{MD5-CRYPT}$1$...`,
//! in the style of Dovecot's passdb.
//!
//! Encoding always uses one configured scheme. Verification picks the scheme
//! named by the tag of the stored value. Values without a tag, or with a tag
//! nothing is registered for, go to the [`FallbackMatcher`] whole, tag included.

use crate::crypt_util::{SaltSource, ThreadRngSalt};
use crate::registry::{SchemeRegistry, MD5_CRYPT};
use crate::scheme::Scheme;
use crate::CryptoError;
use sketching::{security_access, security_error, security_info};
use std::sync::Arc;
use tracing::{debug, error, trace};

const TAG_OPEN: char = '{';
const TAG_CLOSE: char = '}';

/// Split a stored value into its tag and payload. A value that does not open
/// with `{` or never closes the tag has no tag, and the payload is the whole
/// value.
pub fn split_scheme_tag(stored: &str) -> (Option<&str>, &str) {
    stored
        .strip_prefix(TAG_OPEN)
        .and_then(|rest| rest.split_once(TAG_CLOSE))
        .map(|(tag, payload)| (Some(tag), payload))
        .unwrap_or((None, stored))
}

/// Second tier for values the encoder's own registry can not place. Tags its
/// registry knows are stripped and checked with their scheme, anything else
/// goes whole to the catch-all scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackMatcher {
    registry: SchemeRegistry,
    catch_all: Option<Scheme>,
}

impl FallbackMatcher {
    pub fn new(registry: SchemeRegistry, catch_all: Option<Scheme>) -> Self {
        FallbackMatcher {
            registry,
            catch_all,
        }
    }

    /// The generic ids (`{noop}`, `{MD5}`), then MD5-crypt for everything
    /// else so bare `crypt(3)` values verify.
    pub fn generic() -> Self {
        FallbackMatcher::new(SchemeRegistry::generic(), Some(Scheme::Md5Crypt))
    }

    /// Check every value with `scheme`.
    pub fn scheme(scheme: Scheme) -> Self {
        FallbackMatcher::new(SchemeRegistry::empty(), Some(scheme))
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    pub fn catch_all(&self) -> Option<Scheme> {
        self.catch_all
    }

    /// The scheme for `stored` and the part of it that scheme is given.
    pub fn resolve<'a>(&self, stored: &'a str) -> Option<(Scheme, &'a str)> {
        if let (Some(tag), payload) = split_scheme_tag(stored) {
            if let Some(scheme) = self.registry.get(tag) {
                return Some((scheme, payload));
            }
        }
        self.catch_all.map(|scheme| (scheme, stored))
    }
}

#[derive(Clone, Debug)]
pub struct DelegatingEncoder {
    registry: SchemeRegistry,
    encode_tag: String,
    encode_scheme: Scheme,
    fallback: Option<FallbackMatcher>,
    salts: Arc<dyn SaltSource>,
}

impl DelegatingEncoder {
    /// `encode_tag` must be registered, there is no silent substitute.
    pub fn new(
        registry: SchemeRegistry,
        encode_tag: &str,
        fallback: Option<FallbackMatcher>,
        salts: Arc<dyn SaltSource>,
    ) -> Result<Self, CryptoError> {
        let encode_scheme = registry.get(encode_tag).ok_or_else(|| {
            error!(tag = %encode_tag, "scheme for encoding is not registered");
            CryptoError::UnknownScheme(encode_tag.to_string())
        })?;

        debug!(tag = %encode_tag, scheme = %encode_scheme, ?fallback, "delegating encoder ready");

        Ok(DelegatingEncoder {
            registry,
            encode_tag: encode_tag.to_ascii_uppercase(),
            encode_scheme,
            fallback,
            salts,
        })
    }

    /// Encode with `MD5-CRYPT`, fall back to the generic ids and then to
    /// MD5-crypt.
    pub fn dovecot() -> Self {
        DelegatingEncoder {
            registry: SchemeRegistry::dovecot(),
            encode_tag: MD5_CRYPT.to_string(),
            encode_scheme: Scheme::Md5Crypt,
            fallback: Some(FallbackMatcher::generic()),
            salts: Arc::new(ThreadRngSalt),
        }
    }

    pub fn with_salt_source(mut self, salts: Arc<dyn SaltSource>) -> Self {
        self.salts = salts;
        self
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    pub fn encode_tag(&self) -> &str {
        &self.encode_tag
    }

    pub fn fallback(&self) -> Option<&FallbackMatcher> {
        self.fallback.as_ref()
    }

    fn frame(&self, encoded: &str) -> String {
        let mut out = String::with_capacity(self.encode_tag.len() + 2 + encoded.len());
        out.push(TAG_OPEN);
        out.push_str(&self.encode_tag);
        out.push(TAG_CLOSE);
        out.push_str(encoded);
        out
    }

    pub fn encode(&self, cleartext: &str) -> String {
        trace!(tag = %self.encode_tag, "encoding credential");
        self.frame(&self.encode_scheme.encode(cleartext, self.salts.as_ref()))
    }

    /// Fails for salts that could not be read back out of the result.
    pub fn encode_with_salt(&self, cleartext: &str, salt: &str) -> Result<String, CryptoError> {
        let encoded = self.encode_scheme.encode_with_salt(cleartext, salt)?;
        Ok(self.frame(&encoded))
    }

    fn resolve<'a>(&self, stored: &'a str) -> Option<(Scheme, &'a str)> {
        let (tag, payload) = split_scheme_tag(stored);
        match tag.and_then(|t| self.registry.get(t)) {
            Some(scheme) => Some((scheme, payload)),
            None => {
                let resolved = self.fallback.as_ref().and_then(|f| f.resolve(stored));
                if let Some((scheme, _)) = resolved {
                    debug!(?tag, %scheme, "no scheme registered for tag, using fallback");
                }
                resolved
            }
        }
    }

    /// The scheme that would verify `stored`, or `None` when it would be
    /// refused as unmapped.
    pub fn scheme_for(&self, stored: &str) -> Option<Scheme> {
        self.resolve(stored).map(|(scheme, _)| scheme)
    }

    pub fn matches(&self, cleartext: &str, stored: &str) -> Result<bool, CryptoError> {
        let Some((scheme, value)) = self.resolve(stored) else {
            let (tag, _) = split_scheme_tag(stored);
            security_error!(?tag, "no scheme registered for tag");
            return Err(CryptoError::UnmappedScheme(tag.map(str::to_string)));
        };

        match scheme.matches(cleartext, value) {
            Ok(true) => {
                security_access!(%scheme, "credential verified");
                Ok(true)
            }
            Ok(false) => {
                security_info!(%scheme, "credential mismatch");
                Ok(false)
            }
            Err(e) => {
                security_error!(?e, %scheme, "stored credential is not valid for its scheme");
                Err(e)
            }
        }
    }

    /// True when `stored` should be re-encoded with the current scheme.
    pub fn upgrade_encoding(&self, stored: &str) -> bool {
        match split_scheme_tag(stored) {
            (Some(tag), payload) if tag.eq_ignore_ascii_case(&self.encode_tag) => {
                self.encode_scheme.requires_upgrade(payload)
            }
            _ => true,
        }
    }
}

impl Default for DelegatingEncoder {
    fn default() -> Self {
        DelegatingEncoder::dovecot()
    }
}
