//! Generate command implementation
//!
//! Generates every rig of a metarig and optionally writes the resulting
//! armature and a generation report.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chainrig_armature::{Armature, CodedError};
use chainrig_generate::{generate, GenerationReport, RigRegistry};
use colored::Colorize;
use tracing::info;

use super::json_output::{
    coded_error_to_json, error_codes, print_json, GenerateOutput, JsonError,
};
use crate::input::load_metarig;

/// Run the generate command
///
/// # Arguments
/// * `metarig_path` - Path to the metarig JSON file
/// * `out` - Where to write the generated armature as JSON
/// * `report` - Where to write the generation report as JSON
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 on success, 1 on failure
pub fn run(
    metarig_path: &str,
    out: Option<&str>,
    report: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    if json_output {
        run_json(metarig_path, out, report)
    } else {
        run_human(metarig_path, out, report)
    }
}

fn write_outputs(
    armature: &Armature,
    report: &GenerationReport,
    out: Option<&str>,
    report_path: Option<&str>,
) -> Result<()> {
    if let Some(path) = out {
        let json = serde_json::to_string_pretty(armature)?;
        fs::write(path, json).with_context(|| format!("Failed to write armature: {}", path))?;
        info!(path, "wrote armature");
    }
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).with_context(|| format!("Failed to write report: {}", path))?;
        info!(path, "wrote report");
    }
    Ok(())
}

fn run_human(metarig_path: &str, out: Option<&str>, report_path: Option<&str>) -> Result<ExitCode> {
    println!("{} {}", "Generating:".cyan().bold(), metarig_path);

    let mut loaded = load_metarig(Path::new(metarig_path))
        .with_context(|| format!("Failed to load metarig: {}", metarig_path))?;

    let report = match generate(&mut loaded.armature, &RigRegistry::default()) {
        Ok(report) => report,
        Err(e) => {
            println!("  {} [{}] {}", "x".red(), e.code(), e);
            println!("\n{} Generation failed, metarig unchanged", "FAILED".red().bold());
            return Ok(ExitCode::from(1));
        }
    };

    for rig in &report.rigs {
        println!(
            "  {} {} ({}): {} bones, {} controls",
            "+".green(),
            rig.base,
            rig.rig_type,
            rig.bones_created,
            rig.controls.len()
        );
        if let Some(panel) = &rig.ui_panel {
            println!(
                "    {} {} [{}]",
                "panel:".dimmed(),
                panel.owner,
                panel.properties.join(", ")
            );
        }
    }

    write_outputs(&loaded.armature, &report, out, report_path)?;
    if let Some(path) = out {
        println!("{} {}", "Armature:".dimmed(), path);
    }
    if let Some(path) = report_path {
        println!("{} {}", "Report:".dimmed(), path);
    }

    println!(
        "\n{} {} rig(s), {} bones total",
        "SUCCESS".green().bold(),
        report.rigs.len(),
        report.total_bones
    );
    Ok(ExitCode::SUCCESS)
}

fn run_json(metarig_path: &str, out: Option<&str>, report_path: Option<&str>) -> Result<ExitCode> {
    let mut loaded = match load_metarig(Path::new(metarig_path)) {
        Ok(loaded) => loaded,
        Err(e) => {
            let error = coded_error_to_json(&e).with_file(metarig_path);
            print_json(&GenerateOutput::failure(vec![error]))?;
            return Ok(ExitCode::from(1));
        }
    };

    let report = match generate(&mut loaded.armature, &RigRegistry::default()) {
        Ok(report) => report,
        Err(e) => {
            let error = coded_error_to_json(&e).with_file(metarig_path);
            print_json(&GenerateOutput::failure(vec![error]))?;
            return Ok(ExitCode::from(1));
        }
    };

    if let Err(e) = write_outputs(&loaded.armature, &report, out, report_path) {
        let error = JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e));
        print_json(&GenerateOutput::failure(vec![error]))?;
        return Ok(ExitCode::from(1));
    }

    print_json(&GenerateOutput::success(report, out.map(str::to_string)))?;
    Ok(ExitCode::SUCCESS)
}
