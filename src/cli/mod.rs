use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_APP_USER_NAME: &str = "test user";

/// Obtains an enterprise token, provisions an app user, obtains a token for it and cleans up.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// Path to the YAML auth configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Name of the app user created during the run
    #[arg(long, default_value_t = String::from(DEFAULT_APP_USER_NAME))]
    app_user_name: String,

    /// Keep the app user instead of deleting it before exiting
    #[arg(long)]
    keep_app_user: bool,
}

impl Cli {
    /// Parses command line arguments
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone()
    }

    pub fn app_user_name(&self) -> &str {
        &self.app_user_name
    }

    pub fn keep_app_user(&self) -> bool {
        self.keep_app_user
    }
}
