#![deny(warnings)]
#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

#[macro_use]
extern crate tracing;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use mailpw_lib_crypto::config::DEFAULT_CONFIG_PATH;
use mailpw_lib_crypto::{CryptoError, DelegatingEncoder, EncoderConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

include!("./opt/mailpw.rs");

const EXIT_MISMATCH: u8 = 1;
const EXIT_UNVERIFIABLE: u8 = 2;
/// Setup and other operational failures, kept apart from a wrong password.
const EXIT_ERROR: u8 = 3;

fn read_password(password: Option<String>) -> Option<String> {
    if password.is_some() {
        return password;
    }
    match rpassword::prompt_password("Enter password: ") {
        Ok(p) => Some(p),
        Err(e) => {
            error!("Problem getting input password: {}", e);
            None
        }
    }
}

fn load_config(copt: &CommonOpt) -> Option<EncoderConfig> {
    match EncoderConfig::new().read_options_from_optional_config(&copt.config_path) {
        Ok(cfg) => {
            debug!("Using configuration\n{}", cfg);
            Some(cfg)
        }
        Err(e) => {
            error!(?e, "Failed to parse {}", copt.config_path.display());
            None
        }
    }
}

fn build_encoder(cfg: &EncoderConfig) -> Option<DelegatingEncoder> {
    match cfg.build_encoder() {
        Ok(enc) => Some(enc),
        Err(e) => {
            error!("Unable to set up encoder: {}", e);
            None
        }
    }
}

fn verify_exit_code(outcome: &Result<bool, CryptoError>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => EXIT_MISMATCH,
        Err(CryptoError::InvalidFormat) | Err(CryptoError::UnmappedScheme(_)) => EXIT_UNVERIFIABLE,
        Err(_) => EXIT_ERROR,
    }
}

fn run(opt: MailpwOpt) -> u8 {
    let Some(mut cfg) = load_config(opt.copt()) else {
        return EXIT_ERROR;
    };

    match opt {
        MailpwOpt::Hash {
            copt: _,
            scheme,
            salt,
            password,
        } => {
            if let Some(scheme) = scheme {
                cfg.default_scheme = scheme;
            }
            let Some(encoder) = build_encoder(&cfg) else {
                return EXIT_ERROR;
            };
            let Some(password) = read_password(password) else {
                return EXIT_ERROR;
            };

            let stored = match salt {
                Some(salt) => match encoder.encode_with_salt(&password, &salt) {
                    Ok(stored) => stored,
                    Err(e) => {
                        error!("Unable to encode with salt {:?}: {}", salt, e);
                        return EXIT_ERROR;
                    }
                },
                None => encoder.encode(&password),
            };
            println!("{}", stored);
            0
        }
        MailpwOpt::Verify {
            copt: _,
            stored,
            password,
        } => {
            let Some(encoder) = build_encoder(&cfg) else {
                return EXIT_ERROR;
            };
            let Some(password) = read_password(password) else {
                return EXIT_ERROR;
            };

            let outcome = encoder.matches(&password, &stored);
            match &outcome {
                Ok(true) => {
                    println!("verified");
                    if encoder.upgrade_encoding(&stored) {
                        info!(
                            "credential should be re-encoded with {}",
                            encoder.encode_tag()
                        );
                    }
                }
                Ok(false) => println!("mismatch"),
                Err(e) => error!("Unable to verify credential: {}", e),
            }
            verify_exit_code(&outcome)
        }
        MailpwOpt::Schemes { copt: _ } => {
            let Some(encoder) = build_encoder(&cfg) else {
                return EXIT_ERROR;
            };
            for (tag, scheme) in encoder.registry().iter() {
                let mark = if tag == encoder.encode_tag() { " (default)" } else { "" };
                println!("{:<12} {}{}", tag, scheme, mark);
            }
            if let Some(fallback) = encoder.fallback() {
                for (tag, scheme) in fallback.registry().iter() {
                    println!("{:<12} {} (fallback)", tag, scheme);
                }
                if let Some(catch_all) = fallback.catch_all() {
                    println!("untagged and unknown values are checked as {}", catch_all);
                }
            }
            0
        }
    }
}

fn main() -> ExitCode {
    let opt = MailpwParser::parse();

    let fmt_layer = fmt::layer().with_writer(std::io::stderr);

    let filter_layer = if opt.commands.copt().debug {
        match EnvFilter::try_new("mailpw=debug,mailpw_lib_crypto=debug") {
            Ok(f) => f,
            Err(e) => {
                eprintln!("ERROR! Unable to start tracing {:?}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(f) => f,
            Err(_) => EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .parse_lossy("mailpw=info"),
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    ExitCode::from(run(opt.commands))
}
