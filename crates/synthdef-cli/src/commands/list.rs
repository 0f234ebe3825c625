//! Factory definition listing command.

use anyhow::anyhow;
use clap::Args;
use synthdef_config::{factory_definitions, get_factory_definition};

#[derive(Args)]
pub struct ListArgs {
    /// Print the TOML source of one definition
    #[arg(value_name = "NAME")]
    name: Option<String>,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    if let Some(name) = &args.name {
        let def = get_factory_definition(name).ok_or_else(|| anyhow!("Unknown definition: {name}"))?;
        print!("{}", def.to_toml()?);
        return Ok(());
    }

    println!("Factory Definitions");
    println!("===================");
    println!();
    for def in factory_definitions() {
        println!("  {:15} - {}", def.name, def.description.as_deref().unwrap_or(""));
    }
    println!();
    println!("Use 'synthdef list <name>' to print a definition.");
    Ok(())
}
