//! Validate command implementation
//!
//! Loads a metarig and runs discovery for every rig. Nothing is generated.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use chainrig_armature::Armature;
use chainrig_generate::{discover_all, GenerateResult, RigRegistry};
use colored::Colorize;

use super::json_output::{coded_error_to_json, print_json, DiscoveredRig, ValidateOutput};
use crate::input::load_metarig;

/// Discovery results for every rig-typed bone.
pub(crate) fn discover_rigs(
    armature: &Armature,
    registry: &RigRegistry,
) -> GenerateResult<Vec<DiscoveredRig>> {
    let planned = discover_all(armature, registry)?;
    Ok(planned
        .into_iter()
        .map(|(base, rig_type, builder)| DiscoveredRig {
            stages: registry
                .get(&rig_type)
                .map(|g| g.stages().to_vec())
                .unwrap_or_default(),
            base,
            rig_type,
            chains: builder.chain_set().clone(),
        })
        .collect())
}

/// Run the validate command
///
/// # Returns
/// Exit code: 0 if every rig discovers cleanly, 1 otherwise
pub fn run(metarig_path: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(metarig_path)
    } else {
        run_human(metarig_path)
    }
}

fn run_human(metarig_path: &str) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), metarig_path);

    let loaded = match load_metarig(Path::new(metarig_path)) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("  {} {}", "x".red(), e);
            println!("\n{} Metarig could not be loaded", "FAILED".red().bold());
            return Ok(ExitCode::from(1));
        }
    };
    println!(
        "{} {} ({} bones)",
        "Metarig:".dimmed(),
        loaded.metarig.name,
        loaded.armature.len()
    );

    match discover_rigs(&loaded.armature, &RigRegistry::default()) {
        Ok(rigs) => {
            for rig in &rigs {
                println!(
                    "  {} {} ({}): {} chain(s)",
                    "ok".green(),
                    rig.base,
                    rig.rig_type,
                    rig.chains.chains.len()
                );
            }
            println!("\n{} {} rig(s) valid", "SUCCESS".green().bold(), rigs.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("  {} {}", "x".red(), e);
            println!("\n{} Metarig is invalid", "FAILED".red().bold());
            Ok(ExitCode::from(1))
        }
    }
}

fn run_json(metarig_path: &str) -> Result<ExitCode> {
    let loaded = match load_metarig(Path::new(metarig_path)) {
        Ok(loaded) => loaded,
        Err(e) => {
            let error = coded_error_to_json(&e).with_file(metarig_path);
            print_json(&ValidateOutput::failure(vec![error]))?;
            return Ok(ExitCode::from(1));
        }
    };

    match discover_rigs(&loaded.armature, &RigRegistry::default()) {
        Ok(rigs) => {
            print_json(&ValidateOutput::success(rigs))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let error = coded_error_to_json(&e).with_file(metarig_path);
            print_json(&ValidateOutput::failure(vec![error]))?;
            Ok(ExitCode::from(1))
        }
    }
}
