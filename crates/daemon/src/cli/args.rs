pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "ideal")]
#[command(about = "Ideal Classes content portal: server and command line client")]
#[command(version)]
pub struct Args {
    /// Portal URL (defaults to api_url from config, then http://localhost:3000)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the ideal config directory (defaults to ~/.ideal)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
