#![deny(missing_docs)]

//! # rpcgen CLI
//!
//! Command Line Interface for the RPC stub generator.
//!
//! Supported Commands:
//! - `generate`: Pipeline service document -> dispatch ids -> stub artifact.

use clap::{Parser, Subcommand};
use rpcgen_core::{Crc32Hasher, RustAsyncStrategy};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "RPC service stub generator")]
struct Cli {
    /// Log verbosity (error, warn, info, debug, trace).
    #[clap(long, default_value = "info", global = true)]
    log: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates dispatch, client and failure-probe stubs for one service.
    Generate(generate::GenerateArgs),
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Generate(args) => {
            // Injecting the wire hash and the Rust target
            generate::execute(args, &Crc32Hasher, &RustAsyncStrategy)?;
        }
    }

    Ok(())
}
