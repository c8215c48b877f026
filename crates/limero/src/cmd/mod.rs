use clap::{Args, Subcommand};
use std::path::PathBuf;

use limero_frame::DEFAULT_MAX_FRAME_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod cbor2json;
pub mod inspect;
pub mod json2cbor;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a JSON document to CBOR.
    Json2cbor(Json2cborArgs),
    /// Convert CBOR to JSON text.
    Cbor2json(Cbor2jsonArgs),
    /// List the items of a frame buffer.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Json2cbor(args) => json2cbor::run(args),
        Command::Cbor2json(args) => cbor2json::run(args),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct Json2cborArgs {
    /// Read JSON from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Wrap the CBOR in a COBS+CRC wire frame.
    #[arg(long)]
    pub frame: bool,
    /// Write hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Largest stuffed frame accepted with --frame.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FRAME_SIZE, requires = "frame")]
    pub max_frame_size: usize,
}

#[derive(Args, Debug)]
pub struct Cbor2jsonArgs {
    /// Read CBOR from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Input is a stream of COBS+CRC wire frames; each one is converted.
    #[arg(long)]
    pub frame: bool,
    /// Indent nested containers.
    #[arg(long)]
    pub pretty: bool,
    /// Input is hex text.
    #[arg(long)]
    pub hex: bool,
    /// Skip the CRC-16 check on framed input.
    #[arg(long, requires = "frame")]
    pub no_crc: bool,
    /// Largest stuffed frame accepted with --frame.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FRAME_SIZE, requires = "frame")]
    pub max_frame_size: usize,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Read the buffer from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Input is hex text.
    #[arg(long)]
    pub hex: bool,
    /// Input is a COBS-stuffed frame with a CRC-16 trailer.
    #[arg(long)]
    pub frame: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
