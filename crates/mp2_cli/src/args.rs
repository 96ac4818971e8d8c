//! Command-line args

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Transcode between JSON and mp2, or inspect an mp2 tag stream.
#[derive(Parser)]
#[clap(name = "mp2", version, about)]
pub(crate) struct Mp2Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Read input from this file instead of stdin.
    #[clap(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Write output to this file instead of stdout.
    #[clap(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Maximum container nesting accepted while decoding.
    #[clap(long, global = true)]
    #[clap(default_value_t = mp2_core::defaults::MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Encode a JSON document as mp2.
    Encode,

    /// Decode an mp2 value into JSON.
    Decode {
        /// Indent the JSON output.
        #[clap(long)]
        pretty: bool,
    },

    /// Print every encoded value with its offset, tag and header.
    Dump,
}
