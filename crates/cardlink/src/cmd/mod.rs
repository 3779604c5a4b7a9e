use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod simulate;
pub mod version;
pub mod wrap;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a framed status capture and print its messages.
    Decode(DecodeArgs),
    /// Frame one payload from its fields and write the wire bytes.
    Wrap(WrapArgs),
    /// Run the mock card reader and decode the status stream it produces.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Wrap(args) => wrap::run(args),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode ("-" for stdin).
    pub input: PathBuf,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Maximum accepted payload size in bytes.
    #[arg(long, default_value_t = cardlink_frame::DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct WrapArgs {
    /// Payload fields, joined with the field separator (0x1C).
    #[arg(required = true)]
    pub fields: Vec<String>,
    /// Replace this character inside fields with the group separator (0x1D).
    #[arg(long, value_name = "CHAR")]
    pub gs: Option<char>,
    /// Write the framed bytes here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of card transactions to play through.
    #[arg(long, default_value_t = 1)]
    pub transactions: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
