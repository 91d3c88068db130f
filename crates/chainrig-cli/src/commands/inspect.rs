//! Inspect command implementation
//!
//! Prints the chains and sub-chains discovery finds for each rig, along with
//! the rig's stage table.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chainrig_generate::{Binding, RigRegistry};
use colored::Colorize;

use super::json_output::DiscoveredRig;
use super::validate::discover_rigs;
use crate::input::load_metarig;

/// Run the inspect command
pub fn run(metarig_path: &str) -> Result<ExitCode> {
    let loaded = load_metarig(Path::new(metarig_path))
        .with_context(|| format!("Failed to load metarig: {}", metarig_path))?;

    println!(
        "{} {} ({} bones)",
        "Metarig:".cyan().bold(),
        loaded.metarig.name,
        loaded.armature.len()
    );

    let rigs = match discover_rigs(&loaded.armature, &RigRegistry::default()) {
        Ok(rigs) => rigs,
        Err(e) => {
            println!("  {} {}", "x".red(), e);
            return Ok(ExitCode::from(1));
        }
    };

    if rigs.is_empty() {
        println!("  {}", "no rig-typed bones".dimmed());
    }
    for rig in &rigs {
        print_rig(rig);
    }
    Ok(ExitCode::SUCCESS)
}

fn binding_label(binding: Binding) -> colored::ColoredString {
    match binding {
        Binding::Engine => "engine".normal(),
        Binding::Extended => "extended".yellow(),
        Binding::Replaced => "replaced".magenta(),
    }
}

fn print_rig(rig: &DiscoveredRig) {
    println!("\n{} {}", rig.base.bold(), format!("[{}]", rig.rig_type).dimmed());

    let stages: Vec<String> = rig
        .stages
        .iter()
        .map(|s| format!("{}={}", s.stage, binding_label(s.binding)))
        .collect();
    println!("  {} {}", "stages:".dimmed(), stages.join(" "));

    for chain in &rig.chains.chains {
        println!("  {} {}", "chain".green(), chain.root);
        for sub in &chain.subchains {
            println!("    {} {}", "sub-chain".dimmed(), sub);
        }
    }
}
