//! Example: Profile a delimited file and print a pivot table.
//!
//! Usage:
//!   cargo run --example pivot -- <file_path> <row_field> <column_field> <value_field>
//!
//! Example:
//!   cargo run --example pivot -- sales.csv region quarter revenue

use std::env;
use std::fs;

use gridlens::{Aggregation, GridLens, ParserConfig, PivotConfig};

fn main() -> gridlens::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 5 {
        eprintln!("Usage: cargo run --example pivot -- <file_path> <row_field> <column_field> <value_field>");
        std::process::exit(1);
    }

    let text = fs::read_to_string(&args[1])?;
    let (lens, source) = GridLens::from_delimited(&text, ParserConfig::default())?;

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("GridLens: {} ({} rows, {} columns, {})", args[1], source.row_count, source.column_count, source.format);
    println!("{}", separator);
    println!();

    println!("## Fields");
    for field in lens.analyze_for_chart() {
        println!(
            "  {:<24} {:<10} {:<10} {} unique, {} blank",
            field.field, field.stats.field_type, field.role, field.stats.unique_count, field.stats.null_count
        );
    }
    if let Some(axes) = lens.suggest_axes() {
        println!("  Suggested chart: x = {}, y = {}", axes.x, axes.y.join(", "));
    }
    println!();

    let config = PivotConfig::new()
        .row(args[2].as_str())
        .column(args[3].as_str())
        .value(args[4].as_str(), Aggregation::Sum);
    let Some(result) = lens.pivot(&config) else {
        eprintln!("Layout is not valid for this file");
        std::process::exit(1);
    };

    println!("## Sum of {} by {} x {}", args[4], args[2], args[3]);
    print!("  {:<20}", "");
    for column in &result.column_keys {
        print!("{:>14}", column);
    }
    println!("{:>14}", "Total");
    for row in &result.row_keys {
        print!("  {:<20}", row);
        for column in &result.column_keys {
            let cell = result.value(row, column, 0).map(|v| format!("{:.2}", v)).unwrap_or_default();
            print!("{:>14}", cell);
        }
        let total = result.row_total(row, 0).map(|v| format!("{:.2}", v)).unwrap_or_default();
        println!("{:>14}", total);
    }
    if let Some(total) = result.grand_total_value(0) {
        println!("  Grand total: {:.2}", total);
    }

    Ok(())
}
