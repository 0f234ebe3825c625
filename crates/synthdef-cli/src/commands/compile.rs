//! Definition compilation command.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::Args;
use synthdef_config::{DefinitionFile, compile_definition, factory_definitions, get_factory_definition};

#[derive(Args)]
pub struct CompileArgs {
    /// Factory definition to compile (see 'synthdef list')
    #[arg(value_name = "NAME", conflicts_with_all = ["file", "all"])]
    name: Option<String>,

    /// Definition file to compile
    #[arg(short, long, value_name = "FILE", conflicts_with = "all")]
    file: Option<PathBuf>,

    /// Output path (defaults to <name>.scsyndef)
    #[arg(short, long, value_name = "OUT", conflicts_with = "all")]
    output: Option<PathBuf>,

    /// Compile every factory definition
    #[arg(long, requires = "out_dir")]
    all: bool,

    /// Output directory for --all
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    if args.all {
        let dir = args.out_dir.context("--all needs --out-dir")?;
        for def in factory_definitions() {
            let path = dir.join(format!("{}.scsyndef", def.name));
            write_compiled(&def, &path)?;
        }
        return Ok(());
    }

    let def = match (&args.file, &args.name) {
        (Some(path), _) => {
            DefinitionFile::load(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        (None, Some(name)) => get_factory_definition(name)
            .ok_or_else(|| anyhow!("Unknown definition: {name} (see 'synthdef list')"))?,
        (None, None) => bail!("Give a definition name, --file, or --all"),
    };

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.scsyndef", def.name)));
    write_compiled(&def, &path)
}

fn write_compiled(def: &DefinitionFile, path: &Path) -> anyhow::Result<()> {
    let compiled = compile_definition(def).with_context(|| format!("Failed to compile '{}'", def.name))?;
    let bytes = compiled.encode()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(name = %def.name, ugens = compiled.ugens.len(), bytes = bytes.len(), "compiled");
    println!("{} -> {} ({} bytes)", def.name, path.display(), bytes.len());
    Ok(())
}
