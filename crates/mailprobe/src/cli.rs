//! Command-line arguments.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Send one test email through an SMTP relay and report what happened
#[derive(Parser, Debug)]
#[command(name = "mailprobe")]
#[command(about = "Send one test email through an SMTP relay", long_about = None)]
#[command(version)]
pub struct Args {
    /// Test request JSON file, or `-` to read it from stdin
    pub request: PathBuf,

    /// Message catalog JSON overriding the built-in English texts
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl Args {
    /// Whether the request is read from stdin.
    #[must_use]
    pub fn request_from_stdin(&self) -> bool {
        self.request == Path::new("-")
    }
}
