//! Stats command - statistics and distinct values of one field.

use std::path::PathBuf;

use colored::Colorize;

pub fn run(
    file: PathBuf,
    field: String,
    max: usize,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lens = super::load(&file)?;
    if !lens.field_names().contains(&field) {
        return Err(format!(
            "Unknown field: {}\nAvailable: {}",
            field,
            lens.field_names().join(", ")
        )
        .into());
    }

    let role = lens.field_role(&field);
    let stats = lens.field_stats(&field).clone();
    let values = gridlens::get_column_unique_values(lens.rows(), &field, Some(max));

    if json_output {
        let output = serde_json::json!({
            "field": field,
            "role": role,
            "stats": stats,
            "values": values,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "Field".cyan().bold(), field.white().bold());
    println!("  Type:      {}", stats.field_type);
    println!("  Role:      {}", role);
    println!("  Rows:      {}", stats.row_count);
    println!("  Unique:    {}", stats.unique_count);
    println!("  Blank:     {} ({:.1}%)", stats.null_count, stats.null_percentage());
    if let (Some(min), Some(max)) = (stats.numeric_min, stats.numeric_max) {
        println!("  Range:     {} .. {}", min, max);
    }
    if let (Some(min), Some(max)) = (stats.date_min, stats.date_max) {
        println!("  Range:     {} .. {}", min.date(), max.date());
    }
    println!();

    println!("{}", "Values:".yellow().bold());
    for value in &values.values {
        println!("  {}", value);
    }
    if values.truncated {
        println!(
            "  {}",
            format!("... {} more", values.unique_count - values.values.len()).dimmed()
        );
    }

    Ok(())
}
