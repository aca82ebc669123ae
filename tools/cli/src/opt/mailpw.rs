#[derive(Debug, Args)]
pub struct CommonOpt {
    /// Enable debugging of the mailpw tool.
    #[clap(short, long, env = "MAILPW_DEBUG")]
    pub debug: bool,
    /// Path to the encoder configuration file.
    #[clap(short = 'c', long = "config", env = "MAILPW_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,
}

#[derive(Debug, Subcommand)]
#[clap(about = "Mailpw Password Scheme Utility")]
pub enum MailpwOpt {
    /// Encode a password and print the tagged credential, ready to be stored
    /// in a passdb.
    Hash {
        #[clap(flatten)]
        copt: CommonOpt,
        /// Scheme tag to encode with, instead of the configured default.
        #[clap(short = 's', long = "scheme")]
        scheme: Option<String>,
        /// Use this salt instead of a random one, drawn from `./0-9A-Za-z`.
        /// Ignored by unsalted schemes.
        #[clap(long)]
        salt: Option<String>,
        /// The password to encode. You will be prompted for it when absent.
        #[clap(short = 'p', long = "password", env = "MAILPW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Check a password against a stored credential. Exits 0 when it matches, 1
    /// when it does not, 2 when the credential can not be checked at all and 3
    /// when the tool itself could not be set up.
    Verify {
        #[clap(flatten)]
        copt: CommonOpt,
        /// The stored credential, for example `{MD5-CRYPT}$1$salt$checksum`.
        stored: String,
        /// The password to check. You will be prompted for it when absent.
        #[clap(short = 'p', long = "password", env = "MAILPW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// List the scheme tags that can be encoded and verified.
    Schemes {
        #[clap(flatten)]
        copt: CommonOpt,
    },
}

impl MailpwOpt {
    pub fn copt(&self) -> &CommonOpt {
        match self {
            MailpwOpt::Hash { copt, .. }
            | MailpwOpt::Verify { copt, .. }
            | MailpwOpt::Schemes { copt } => copt,
        }
    }
}

#[derive(Debug, clap::Parser)]
#[clap(about = "Mailpw Password Scheme Utility", version)]
pub struct MailpwParser {
    #[clap(subcommand)]
    pub commands: MailpwOpt,
}
