//! Unit generator listing and information command.

#![allow(clippy::print_literal)]

use clap::Args;
use synthdef_ugens::{UGenCategory, UGenRegistry};

#[derive(Args)]
pub struct UgensArgs {
    /// Show details for a specific unit generator
    #[arg(value_name = "UGEN")]
    name: Option<String>,
}

pub fn run(args: UgensArgs) -> anyhow::Result<()> {
    let registry = UGenRegistry::new();

    if let Some(name) = &args.name {
        let ugen = registry
            .all_ugens()
            .into_iter()
            .find(|u| u.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("Unknown unit generator: {name}"))?;

        println!("{}", ugen.name);
        println!("{}", "=".repeat(ugen.name.len()));
        println!();
        println!("{}", ugen.description);
        println!();

        let rates: Vec<String> = ugen.rates.iter().map(ToString::to_string).collect();
        println!("Rates:    {} (default {})", rates.join(", "), ugen.default_rate());
        println!("Outputs:  {}", ugen.outputs);
        println!("Category: {}", ugen.category.name());
        println!();

        if ugen.args.is_empty() {
            println!("No arguments.");
            return Ok(());
        }
        println!("Arguments:");
        println!();
        println!("  {:14}  {:10}  {:10}  {}", "Name", "Kind", "Default", "Expands");
        println!("  {:14}  {:10}  {:10}  {}", "----", "----", "-------", "-------");
        for arg in ugen.args {
            let default = arg.default.map_or_else(|| "required".to_string(), |v| v.to_string());
            let expands = if arg.kind.expands() { "yes" } else { "no" };
            println!(
                "  {:14}  {:10}  {:10}  {}",
                arg.name,
                format!("{:?}", arg.kind),
                default,
                expands
            );
        }
        return Ok(());
    }

    println!("Available Unit Generators");
    println!("=========================");
    for &category in UGenCategory::ALL {
        let ugens = registry.ugens_in_category(category);
        if ugens.is_empty() {
            continue;
        }
        println!();
        println!("{} - {}", category.name(), category.description());
        for ugen in ugens {
            println!("  {:15} - {}", ugen.name, ugen.description);
        }
    }
    println!();
    println!("Use 'synthdef ugens <name>' for argument details.");
    Ok(())
}
