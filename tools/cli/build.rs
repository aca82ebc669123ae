#![allow(dead_code)]

use std::env;
use std::io::Error;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Subcommand};
use clap_complete::{generate_to, Shell};
use mailpw_lib_crypto::config::DEFAULT_CONFIG_PATH;

include!("src/opt/mailpw.rs");

fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");
    println!("cargo:rerun-if-changed=src/opt/mailpw.rs");
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let comp_dir = PathBuf::from(outdir)
        .ancestors()
        .nth(2)
        .map(|p| p.join("completions"))
        .expect("Unable to process completions path");

    if !comp_dir.exists() {
        std::fs::create_dir(&comp_dir).expect("Unable to create completions dir");
    }

    for shell in [Shell::Bash, Shell::Fish, Shell::Zsh] {
        generate_to(shell, &mut MailpwParser::command(), "mailpw", comp_dir.clone())?;
    }

    Ok(())
}
