#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads a service document, assigns dispatch ids, renders the artifact and
//! writes it out. The artifact is rendered fully in memory before the single
//! write, so a failed run never leaves partial output behind.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use rpcgen_core::ident::IdHasher;
use rpcgen_core::strategies::TargetStrategy;
use rpcgen_core::{assign_ids, generate_service_artifact, load_service_file};

use crate::error::{CliError, CliResult};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the service document (.json, .yaml or .yml).
    #[clap(long)]
    pub service_file: PathBuf,

    /// Output path for the generated artifact; stderr when omitted.
    #[clap(long)]
    pub output_file: Option<PathBuf>,
}

/// Executes the generation pipeline: load -> assign -> render -> write.
///
/// # Arguments
///
/// * `args` - Command arguments.
/// * `hasher` - The id hash function (CRC-32 in production).
/// * `strategy` - The target strategy used to render the artifact.
pub fn execute(
    args: &GenerateArgs,
    hasher: &impl IdHasher,
    strategy: &impl TargetStrategy,
) -> CliResult<()> {
    if !args.service_file.exists() {
        return Err(CliError::General(format!(
            "Service file not found: {:?}",
            args.service_file
        )));
    }

    // 1. Load Schema
    let mut schema = load_service_file(&args.service_file)?;
    tracing::info!(
        service = %schema.service_name,
        methods = schema.methods.len(),
        "loaded service document"
    );

    // 2. Assign Ids
    assign_ids(&mut schema, hasher)?;

    // 3. Render
    let artifact = generate_service_artifact(&schema, strategy);

    // 4. Write
    match &args.output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, &artifact)?;
            tracing::info!("wrote artifact to {:?}", path);
        }
        None => {
            std::io::stderr().write_all(artifact.as_bytes())?;
        }
    }

    Ok(())
}
