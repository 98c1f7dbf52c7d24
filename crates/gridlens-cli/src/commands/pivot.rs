//! Pivot command - build, print and optionally save a pivot table.

use std::path::PathBuf;

use colored::Colorize;
use gridlens::{CalculatedField, PivotConfig, PivotResult};

use crate::cli::{CalcSpec, ValueSpec};
use crate::store::FileConfigStore;

pub struct PivotArgs {
    pub file: PathBuf,
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub values: Vec<ValueSpec>,
    pub calcs: Vec<CalcSpec>,
    pub show_row_totals: bool,
    pub show_col_totals: bool,
    pub save: bool,
    pub restore: bool,
    pub json: bool,
}

pub fn run(args: PivotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let lens = super::load(&args.file)?;
    let mut store = FileConfigStore::beside(&args.file);

    let config = if args.restore {
        let restored = lens.restore_layout(&store);
        if !restored.is_configured() {
            return Err(format!(
                "No saved layout for this field set ({})",
                lens.storage_key()
            )
            .into());
        }
        restored.totals(args.show_row_totals, args.show_col_totals)
    } else {
        build_config(&args)
    };

    for field in config.referenced_fields() {
        if !lens.field_names().iter().any(|f| *f == field) {
            return Err(format!("Unknown field: {}", field).into());
        }
    }
    config.validate()?;

    let result = lens.pivot(&config).ok_or(
        "Layout needs at least one row or column field and at least one --value or --calc",
    )?;

    if args.save {
        let key = lens.save_layout(&mut store, &config)?;
        eprintln!(
            "{} {}",
            "Saved layout".green(),
            store.path_for(&key).display()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_table(&result);
    }

    Ok(())
}

fn build_config(args: &PivotArgs) -> PivotConfig {
    let mut config = PivotConfig::new().totals(args.show_row_totals, args.show_col_totals);
    for field in &args.rows {
        config = config.row(field.as_str());
    }
    for field in &args.cols {
        config = config.column(field.as_str());
    }
    for value in &args.values {
        config = config.value(value.field.as_str(), value.aggregation);
    }
    for calc in &args.calcs {
        config = config.calculated(CalculatedField::new(calc.id.as_str(), calc.formula.as_str()));
    }
    config
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{:.2}", v),
        None => String::new(),
    }
}

/// One display column: a column key and a value index, or a total.
struct Column {
    key: Option<String>,
    index: usize,
    header: String,
}

fn print_table(result: &PivotResult) {
    let multi_value = result.value_columns.len() > 1;
    let mut columns: Vec<Column> = Vec::new();
    for column_key in &result.column_keys {
        let label = result.column_labels(column_key).join(" / ");
        for (index, value) in result.value_columns.iter().enumerate() {
            let header = match (label.is_empty(), multi_value) {
                (true, _) => value.label.clone(),
                (false, false) => label.clone(),
                (false, true) => format!("{} / {}", label, value.label),
            };
            columns.push(Column {
                key: Some(column_key.clone()),
                index,
                header,
            });
        }
    }
    let has_column_fields = !result.column_fields.is_empty();
    if result.row_totals.is_some() && has_column_fields {
        for (index, value) in result.value_columns.iter().enumerate() {
            columns.push(Column {
                key: None,
                index,
                header: format!("Total {}", value.label),
            });
        }
    }

    let row_header = result.row_fields.join(" / ");
    let mut lines: Vec<(String, Vec<String>)> = Vec::new();
    for row_key in &result.row_keys {
        let cells = columns
            .iter()
            .map(|c| match &c.key {
                Some(ck) => format_value(result.value(row_key, ck, c.index)),
                None => format_value(result.row_total(row_key, c.index)),
            })
            .collect();
        lines.push((result.row_labels(row_key).join(" / "), cells));
    }

    let footer: Option<Vec<String>> = result.column_totals.as_ref().map(|_| {
        columns
            .iter()
            .map(|c| match &c.key {
                Some(ck) => format_value(result.column_total(ck, c.index)),
                None => format_value(result.grand_total_value(c.index)),
            })
            .collect()
    });

    let first_width = lines
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain([row_header.chars().count(), "Total".len()])
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            lines
                .iter()
                .map(|(_, cells)| cells[i].len())
                .chain(footer.iter().map(|f| f[i].len()))
                .chain([c.header.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    print!("{:<width$}", row_header, width = first_width);
    for (c, width) in columns.iter().zip(&widths) {
        print!("  {}", format!("{:>width$}", c.header, width = width).cyan().bold());
    }
    println!();

    for (label, cells) in &lines {
        print!("{:<width$}", label, width = first_width);
        for (cell, width) in cells.iter().zip(&widths) {
            print!("  {:>width$}", cell, width = width);
        }
        println!();
    }

    if let Some(footer) = footer {
        print!("{}", format!("{:<width$}", "Total", width = first_width).yellow().bold());
        for (cell, width) in footer.iter().zip(&widths) {
            print!("  {}", format!("{:>width$}", cell, width = width).yellow());
        }
        println!();
    }

    println!();
    println!(
        "{} rows aggregated into {} x {} groups",
        result.source_row_count,
        result.row_keys.len(),
        result.column_keys.len()
    );
}
