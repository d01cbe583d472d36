//! Sort executor implementation.
//!
//! Stable multi-term sort of matched rows for `ORDER BY`:
//! - strings compare case-insensitively unless the term is `BINARY`
//! - NULL values, NaN doubles and values that fail to evaluate sort after
//!   all others in both directions

use crate::catalog::DataTable;
use crate::expression::{ExpressionEvaluator, OrderByTerm};
use crate::types::{compare_values, Value};
use log::debug;
use std::cmp::Ordering;

/// Executor that sorts row indexes by `ORDER BY` terms
pub struct SortExecutor<'a> {
    table: &'a DataTable,
    terms: &'a [OrderByTerm],
}

impl<'a> SortExecutor<'a> {
    pub fn new(table: &'a DataTable, terms: &'a [OrderByTerm]) -> Self {
        Self { table, terms }
    }

    pub fn execute(&self, rows: &mut Vec<usize>) {
        if self.terms.is_empty() {
            return;
        }

        // Materialize sort keys once per row; `None` marks NULL, NaN or error
        let mut keyed: Vec<(usize, Vec<Option<Value>>)> = rows
            .iter()
            .map(|&index| (index, self.sort_keys(index)))
            .collect();

        keyed.sort_by(|(_, a), (_, b)| self.compare_keys(a, b));

        *rows = keyed.into_iter().map(|(index, _)| index).collect();
    }

    fn sort_keys(&self, index: usize) -> Vec<Option<Value>> {
        let Some(row) = self.table.row(index) else {
            return vec![None; self.terms.len()];
        };
        let evaluator = ExpressionEvaluator::with_row(row);

        self.terms
            .iter()
            .map(|term| match evaluator.evaluate_column(&term.column) {
                Ok(Value::Double(d)) if d.is_nan() => None,
                Ok(value) if !value.is_null() => Some(value),
                Ok(_) => None,
                Err(err) => {
                    debug!(
                        "Sort key \"{}\" of row {} sorts last: {}",
                        term.column.name, index, err
                    );
                    None
                }
            })
            .collect()
    }

    fn compare_keys(&self, a: &[Option<Value>], b: &[Option<Value>]) -> Ordering {
        for (term, (a, b)) in self.terms.iter().zip(a.iter().zip(b)) {
            let ordering = match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => {
                    let ordering = compare_values(a, b, term.exact_match)
                        .ok()
                        .flatten()
                        .unwrap_or(Ordering::Equal);
                    if term.ascending {
                        ordering
                    } else {
                        ordering.reverse()
                    }
                }
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }
}
