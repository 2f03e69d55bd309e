//! Command-line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trs-tools", version, about = "Create and extract TRS image containers")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a TRS file from PNG images
    #[command(visible_alias = "c")]
    Create {
        /// Container to write
        trs: PathBuf,

        /// Input PNG images, stored in the given order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Extract every image of a TRS file as NNNN.png
    #[command(visible_alias = "x")]
    Extract {
        /// Container to read
        trs: PathBuf,

        /// Directory for the extracted images
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

impl Args {
    pub fn log_level(&self) -> log::Level {
        if self.quiet {
            return log::Level::Error;
        }
        match self.verbose {
            0 => log::Level::Info,
            1 => log::Level::Debug,
            _ => log::Level::Trace,
        }
    }
}
