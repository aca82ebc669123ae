use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use sketching::{admin_debug, admin_error, admin_warn};

use crate::crypt_util::ThreadRngSalt;
use crate::encoder::{DelegatingEncoder, FallbackMatcher};
use crate::registry::{SchemeRegistry, MD5_CRYPT};
use crate::CryptoError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/mailpw/mailpw.toml";
/// Written as the fallback to disable it.
pub const FALLBACK_NONE: &str = "none";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigInt {
    default_scheme: Option<String>,
    fallback_scheme: Option<String>,
    generic_fallback: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Tag new credentials are encoded with.
    pub default_scheme: String,
    /// Tag of the scheme used for values whose own tag is missing or unknown.
    pub fallback_scheme: Option<String>,
    /// Resolve the generic `{noop}` and `{MD5}` ids before the fallback scheme.
    pub generic_fallback: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig::new()
    }
}

impl Display for EncoderConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "default_scheme: {}", self.default_scheme)?;
        writeln!(
            f,
            "fallback_scheme: {}",
            self.fallback_scheme.as_deref().unwrap_or(FALLBACK_NONE)
        )?;
        writeln!(f, "generic_fallback: {}", self.generic_fallback)
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        EncoderConfig {
            default_scheme: MD5_CRYPT.to_string(),
            fallback_scheme: Some(MD5_CRYPT.to_string()),
            generic_fallback: true,
        }
    }

    /// Apply the settings of a TOML document over this config.
    pub fn merge_toml(self, contents: &str) -> Result<Self, CryptoError> {
        let config: ConfigInt = toml::from_str(contents).map_err(|e| {
            admin_error!(?e, "invalid encoder configuration");
            CryptoError::Config(e.to_string())
        })?;

        let fallback_scheme = match config.fallback_scheme {
            Some(f) if f.eq_ignore_ascii_case(FALLBACK_NONE) => None,
            Some(f) => Some(f),
            None => self.fallback_scheme,
        };

        Ok(EncoderConfig {
            default_scheme: config.default_scheme.unwrap_or(self.default_scheme),
            fallback_scheme,
            generic_fallback: config.generic_fallback.unwrap_or(self.generic_fallback),
        })
    }

    pub fn read_options_from_optional_config<P: AsRef<Path> + std::fmt::Debug>(
        self,
        config_path: P,
    ) -> Result<Self, CryptoError> {
        admin_debug!("Attempting to load configuration from {:#?}", &config_path);
        let mut f = match File::open(&config_path) {
            Ok(f) => {
                admin_debug!("Successfully opened configuration file {:#?}", &config_path);
                f
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::NotFound => {
                        admin_debug!(
                            "Configuration file {:#?} not found, skipping.",
                            &config_path
                        );
                    }
                    ErrorKind::PermissionDenied => {
                        admin_warn!(
                            "Permission denied loading configuration file {:#?}, skipping.",
                            &config_path
                        );
                    }
                    _ => {
                        admin_debug!(
                            "Unable to open config file {:#?} [{:?}], skipping ...",
                            &config_path,
                            e
                        );
                    }
                };
                return Ok(self);
            }
        };

        let mut contents = String::new();
        f.read_to_string(&mut contents).map_err(|e| {
            admin_error!(?e, "failed to read configuration file");
            CryptoError::Config(e.to_string())
        })?;

        self.merge_toml(contents.as_str())
    }

    /// Build an encoder over the Dovecot registry. Fails if either tag is unknown.
    pub fn build_encoder(&self) -> Result<DelegatingEncoder, CryptoError> {
        let registry = SchemeRegistry::dovecot();

        let catch_all = match self.fallback_scheme.as_deref() {
            Some(tag) => Some(registry.get(tag).ok_or_else(|| {
                admin_error!(%tag, "fallback scheme is not registered");
                CryptoError::UnknownScheme(tag.to_string())
            })?),
            None => None,
        };

        let fallback = match (self.generic_fallback, catch_all) {
            (true, catch_all) => Some(FallbackMatcher::new(SchemeRegistry::generic(), catch_all)),
            (false, Some(scheme)) => Some(FallbackMatcher::scheme(scheme)),
            (false, None) => None,
        };

        DelegatingEncoder::new(
            registry,
            &self.default_scheme,
            fallback,
            Arc::new(ThreadRngSalt),
        )
    }
}
