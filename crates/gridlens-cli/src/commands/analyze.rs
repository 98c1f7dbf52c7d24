//! Analyze command - detect the type and role of every field.

use std::path::PathBuf;

use colored::Colorize;
use gridlens::FieldRole;

use crate::cli::RoleOverride;

pub fn run(
    file: PathBuf,
    overrides: Vec<RoleOverride>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lens = super::load(&file)?;
    for o in overrides {
        if !lens.field_names().contains(&o.field) {
            return Err(format!("Unknown field: {}", o.field).into());
        }
        lens.set_role_override(&o.field, Some(o.role));
    }

    let analysis = lens.analyze_for_chart();
    let axes = lens.suggest_axes();

    if json_output {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "rows": lens.len(),
            "storage_key": lens.storage_key(),
            "fields": analysis,
            "suggested_axes": axes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows)",
        "Fields of".cyan().bold(),
        file.display().to_string().white(),
        lens.len()
    );
    println!();

    for field in &analysis {
        let role = match field.role {
            FieldRole::Dimension => format!("{:<10}", field.role).blue(),
            FieldRole::Measure => format!("{:<10}", field.role).green(),
            FieldRole::Temporal => format!("{:<10}", field.role).magenta(),
        };
        let pinned = if lens.role_overrides().contains_key(&field.field) {
            " (pinned)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<24} {:<8} {}{}",
            field.field,
            field.stats.field_type,
            role,
            pinned
        );

        if verbose {
            let stats = &field.stats;
            println!(
                "      {} unique, {} blank ({:.1}%)",
                stats.unique_count,
                stats.null_count,
                stats.null_percentage()
            );
            if let (Some(min), Some(max)) = (stats.numeric_min, stats.numeric_max) {
                println!("      range {} .. {}", min, max);
            }
            if let (Some(min), Some(max)) = (stats.date_min, stats.date_max) {
                println!("      range {} .. {}", min.date(), max.date());
            }
        }
    }
    println!();

    match axes {
        Some(axes) => println!(
            "{} x = {}, y = {}",
            "Suggested chart:".yellow().bold(),
            axes.x.white().bold(),
            axes.y.join(", ").white().bold()
        ),
        None => println!("{}", "No chartable measure found.".yellow()),
    }

    Ok(())
}
