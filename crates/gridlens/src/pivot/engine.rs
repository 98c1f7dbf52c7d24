//! Pivot aggregation engine.
//!
//! One pass over the rows feeds four families of accumulators: the cell
//! `(row key, column key)`, the row total `(row key, *)`, the column total
//! `(*, column key)` and the grand total `(*, *)`. Calculated fields are
//! evaluated after each accumulator set is finalized, on cells and totals
//! alike.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::input::{Row, Value, field_value};
use crate::view::sort_keys;

use super::accumulator::Accumulator;
use super::config::{Aggregation, ConfigError, PivotConfig, ValueFieldRef, split_binding};
use super::formula::{Expr, evaluate};
use super::key::make_key;
use super::result::{PivotResult, ValueColumn, ValueVector};

/// One raw accumulator column: a field and how it is aggregated.
#[derive(Debug, Clone)]
struct Slot {
    field: String,
    aggregation: Aggregation,
}

#[derive(Debug, Clone, Copy)]
enum Output {
    Raw(usize),
    Calculated(usize),
}

/// The validated, resolved form of a [`PivotConfig`].
#[derive(Debug)]
struct Plan {
    /// Displayed raw value fields first, then hidden ones that formulas need.
    slots: Vec<Slot>,
    /// Slots before this index are displayed.
    displayed: usize,
    /// Formula binding name to slot.
    bindings: HashMap<String, usize>,
    /// Calculated fields in dependency order.
    calcs: Vec<(String, Expr)>,
    outputs: Vec<Output>,
    columns: Vec<ValueColumn>,
}

impl Plan {
    fn build(config: &PivotConfig) -> Result<Self, ConfigError> {
        let ordered = config.ordered_calculations()?;

        let mut plan = Plan {
            slots: Vec::new(),
            displayed: 0,
            bindings: HashMap::new(),
            calcs: Vec::new(),
            outputs: Vec::new(),
            columns: Vec::new(),
        };

        for value_field in &config.value_fields {
            match value_field {
                ValueFieldRef::Raw { field, aggregation } => {
                    let slot = plan.slot(field, *aggregation);
                    plan.bindings
                        .entry(format!("{}_{}", field, aggregation.key()))
                        .or_insert(slot);
                    plan.bindings.entry(field.clone()).or_insert(slot);
                    plan.outputs.push(Output::Raw(slot));
                    plan.columns.push(ValueColumn {
                        label: format!("{} of {}", aggregation.label(), field),
                        reference: value_field.clone(),
                    });
                }
                ValueFieldRef::Calculated { id } => {
                    let Some(position) = ordered.iter().position(|(c, _)| c.id == *id) else {
                        return Err(ConfigError::UnknownCalculatedField(id.clone()));
                    };
                    plan.outputs.push(Output::Calculated(position));
                    plan.columns.push(ValueColumn {
                        label: ordered[position].0.display_name().to_string(),
                        reference: value_field.clone(),
                    });
                }
            }
        }

        // Formulas may name aggregations that are not displayed; those get
        // hidden slots.
        plan.displayed = plan.slots.len();
        let calc_ids: HashSet<&str> = ordered.iter().map(|(c, _)| c.id.as_str()).collect();
        for (_, expr) in &ordered {
            for name in expr.references() {
                if calc_ids.contains(name) || plan.bindings.contains_key(name) {
                    continue;
                }
                let (field, aggregation) = split_binding(name);
                let slot = plan.slot(field, aggregation);
                plan.bindings.insert(name.to_string(), slot);
            }
        }

        plan.calcs = ordered
            .into_iter()
            .map(|(calc, expr)| (calc.id.clone(), expr))
            .collect();
        Ok(plan)
    }

    fn slot(&mut self, field: &str, aggregation: Aggregation) -> usize {
        if let Some(index) = self
            .slots
            .iter()
            .position(|s| s.field == field && s.aggregation == aggregation)
        {
            return index;
        }
        self.slots.push(Slot {
            field: field.to_string(),
            aggregation,
        });
        self.slots.len() - 1
    }

    fn fresh(&self) -> Vec<Accumulator> {
        self.slots
            .iter()
            .map(|s| Accumulator::for_aggregation(s.aggregation))
            .collect()
    }

    /// Finalize one accumulator set into the displayed value vector.
    ///
    /// A hidden slot over a field that no input row has binds as blank.
    fn finish(&self, accumulators: &[Accumulator], present: &[bool]) -> ValueVector {
        let raw: Vec<Option<f64>> = self
            .slots
            .iter()
            .zip(accumulators)
            .map(|(slot, acc)| acc.finish(slot.aggregation))
            .collect();

        let mut calculated: Vec<Option<f64>> = Vec::with_capacity(self.calcs.len());
        let mut by_id: HashMap<&str, Option<f64>> = HashMap::new();
        for (id, expr) in &self.calcs {
            let value = evaluate(expr, &|name: &str| match by_id.get(name) {
                Some(v) => *v,
                None => self
                    .bindings
                    .get(name)
                    .filter(|&&slot| slot < self.displayed || present[slot])
                    .and_then(|&slot| raw[slot]),
            });
            by_id.insert(id.as_str(), value);
            calculated.push(value);
        }

        self.outputs
            .iter()
            .map(|output| match output {
                Output::Raw(slot) => raw[*slot],
                Output::Calculated(index) => calculated[*index],
            })
            .collect()
    }
}

#[derive(Default)]
struct Groups {
    cells: IndexMap<String, IndexMap<String, Vec<Accumulator>>>,
    rows: IndexMap<String, Vec<Accumulator>>,
    columns: IndexMap<String, Vec<Accumulator>>,
    grand: Vec<Accumulator>,
    /// Per slot: whether any row carries the field.
    present: Vec<bool>,
    source_rows: usize,
}

impl Groups {
    fn add(&mut self, plan: &Plan, config: &PivotConfig, row: &Row) {
        let values: Vec<&Value> = plan
            .slots
            .iter()
            .map(|s| field_value(row, &s.field))
            .collect();
        let row_key = make_key(row, &config.row_fields);
        let column_key = make_key(row, &config.column_fields);

        let cell = self
            .cells
            .entry(row_key.clone())
            .or_default()
            .entry(column_key.clone())
            .or_insert_with(|| plan.fresh());
        feed(cell, &values);
        feed(self.rows.entry(row_key).or_insert_with(|| plan.fresh()), &values);
        feed(
            self.columns.entry(column_key).or_insert_with(|| plan.fresh()),
            &values,
        );
        feed(&mut self.grand, &values);
        for (index, slot) in plan.slots.iter().enumerate().skip(plan.displayed) {
            if !self.present[index] && row.contains_key(&slot.field) {
                self.present[index] = true;
            }
        }
        self.source_rows += 1;
    }
}

fn feed(accumulators: &mut [Accumulator], values: &[&Value]) {
    for (acc, value) in accumulators.iter_mut().zip(values) {
        acc.add(value);
    }
}

/// Group `rows` according to `config` and aggregate every value field.
///
/// Returns `None` when the config is not configured or fails validation;
/// both are normal states while a user builds a layout. Empty input yields
/// an empty result with a grand total.
pub fn compute_pivot_result<'a, I>(rows: I, config: &PivotConfig) -> Option<PivotResult>
where
    I: IntoIterator<Item = &'a Row>,
{
    if !config.is_configured() {
        debug!("pivot config is not configured; skipping");
        return None;
    }

    let plan = match Plan::build(config) {
        Ok(plan) => plan,
        Err(e) => {
            debug!(error = %e, "pivot config is invalid; skipping");
            return None;
        }
    };

    let mut groups = Groups {
        grand: plan.fresh(),
        present: vec![false; plan.slots.len()],
        ..Groups::default()
    };
    for row in rows {
        if config.filters.iter().all(|f| f.matches(row)) {
            groups.add(&plan, config, row);
        }
    }

    let row_totals: IndexMap<String, ValueVector> = groups
        .rows
        .iter()
        .map(|(key, accs)| (key.clone(), plan.finish(accs, &groups.present)))
        .collect();
    let column_totals: IndexMap<String, ValueVector> = groups
        .columns
        .iter()
        .map(|(key, accs)| (key.clone(), plan.finish(accs, &groups.present)))
        .collect();

    let mut row_keys: Vec<String> = row_totals.keys().cloned().collect();
    sort_keys(&mut row_keys, &config.row_order, |key, index| {
        row_totals.get(key)?.get(index).copied().flatten()
    });
    let mut column_keys: Vec<String> = column_totals.keys().cloned().collect();
    sort_keys(&mut column_keys, &config.column_order, |key, index| {
        column_totals.get(key)?.get(index).copied().flatten()
    });

    let mut cells = IndexMap::with_capacity(row_keys.len());
    for row_key in &row_keys {
        let Some(row_cells) = groups.cells.get(row_key) else {
            continue;
        };
        let ordered: IndexMap<String, ValueVector> = column_keys
            .iter()
            .filter_map(|ck| {
                row_cells
                    .get(ck)
                    .map(|accs| (ck.clone(), plan.finish(accs, &groups.present)))
            })
            .collect();
        cells.insert(row_key.clone(), ordered);
    }

    debug!(
        source_rows = groups.source_rows,
        row_keys = row_keys.len(),
        column_keys = column_keys.len(),
        values = plan.columns.len(),
        "computed pivot"
    );

    Some(PivotResult {
        row_fields: config.row_fields.clone(),
        column_fields: config.column_fields.clone(),
        grand_total: plan.finish(&groups.grand, &groups.present),
        value_columns: plan.columns,
        row_keys,
        column_keys,
        cells,
        row_totals: config.show_row_totals.then_some(row_totals),
        column_totals: config.show_column_totals.then_some(column_totals),
        source_row_count: groups.source_rows,
    })
}
