//! Compiled file inspection command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use synthdef_core::decode;

#[derive(Args)]
pub struct InspectArgs {
    /// Compiled .scsyndef file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Also print the constant pool
    #[arg(long)]
    constants: bool,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
    let defs = decode(&bytes).with_context(|| format!("Failed to decode {}", args.file.display()))?;
    tracing::debug!(path = %args.file.display(), definitions = defs.len(), "decoded");

    for (i, def) in defs.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{def}");
        if args.constants {
            println!("  constants:");
            for (index, value) in def.constants.iter().enumerate() {
                println!("    {index:4}  {value}");
            }
        }
    }
    Ok(())
}
