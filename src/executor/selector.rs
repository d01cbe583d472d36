//! Statement runner for complete filter expressions.
//!
//! A filter expression is a `;` separated list of statements. Each one
//! contributes matching rows and signal IDs to a [`StatementResults`]:
//! - literal identifiers are looked up directly on the primary table
//! - `FILTER` statements and bare expressions run as expression trees
//!
//! With a single statement the results keep that statement's order exactly.
//! From the second statement on, results are deduplicated while keeping
//! first-seen order.

use crate::catalog::{DataRow, DataSet, DataTable, RowRef, TableIdFields};
use crate::error::{FilterError, Result};
use crate::executor;
use crate::expression::{ColumnRef, ExpressionEvaluator, ExpressionTree};
use crate::planner::{Binder, Planner};
use crate::sql::{self, IdentifierLiteral, Statement};
use crate::types::coercion::compare_strings;
use crate::types::{convert, DataType, Value};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

/// Receives syntax errors before they are returned to the caller
pub type ParseErrorCallback<'a> = Box<dyn FnMut(&FilterError) + 'a>;

/// Rows and signal IDs selected by a filter expression
#[derive(Debug, Default, Clone)]
pub struct StatementResults {
    filtered_rows: Vec<RowRef>,
    /// Engaged from the second statement on
    filtered_row_set: Option<HashSet<RowRef>>,
    filtered_signal_ids: Vec<Uuid>,
    filtered_signal_id_set: Option<HashSet<Uuid>>,
    statement_count: usize,
}

impl StatementResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next statement; the second one switches to set semantics
    pub fn begin_statement(&mut self) {
        self.statement_count += 1;

        if self.statement_count == 2 {
            self.filtered_row_set = Some(self.filtered_rows.iter().copied().collect());
            self.filtered_signal_id_set = Some(self.filtered_signal_ids.iter().copied().collect());
        }
    }

    pub fn add_row(&mut self, row: RowRef) {
        match &mut self.filtered_row_set {
            Some(set) => {
                if set.insert(row) {
                    self.filtered_rows.push(row);
                }
            }
            None => self.filtered_rows.push(row),
        }
    }

    pub fn add_signal_id(&mut self, signal_id: Uuid) {
        match &mut self.filtered_signal_id_set {
            Some(set) => {
                if set.insert(signal_id) {
                    self.filtered_signal_ids.push(signal_id);
                }
            }
            None => self.filtered_signal_ids.push(signal_id),
        }
    }

    pub fn filtered_rows(&self) -> &[RowRef] {
        &self.filtered_rows
    }

    pub fn into_filtered_rows(self) -> Vec<RowRef> {
        self.filtered_rows
    }

    /// Signal IDs in first-seen order
    pub fn filtered_signal_ids(&self) -> &[Uuid] {
        &self.filtered_signal_ids
    }

    pub fn into_filtered_signal_ids(self) -> Vec<Uuid> {
        self.filtered_signal_ids
    }

    pub fn filtered_signal_id_set(&self) -> HashSet<Uuid> {
        match &self.filtered_signal_id_set {
            Some(set) => set.clone(),
            None => self.filtered_signal_ids.iter().copied().collect(),
        }
    }

    pub fn statement_count(&self) -> usize {
        self.statement_count
    }
}

/// Parses and runs a filter expression against a data set
pub struct FilterExpressionParser<'a> {
    data_set: &'a DataSet,
    filter: String,
    primary_table: String,
    id_fields: TableIdFields,
    track_filtered_rows: bool,
    track_filtered_signal_ids: bool,
    parse_error_callback: Option<ParseErrorCallback<'a>>,
}

impl<'a> FilterExpressionParser<'a> {
    /// Create a parser tracking both rows and signal IDs, with default id fields
    pub fn new(data_set: &'a DataSet, filter: impl Into<String>) -> Self {
        Self {
            data_set,
            filter: filter.into(),
            primary_table: String::new(),
            id_fields: TableIdFields::default(),
            track_filtered_rows: true,
            track_filtered_signal_ids: true,
            parse_error_callback: None,
        }
    }

    /// Table for literal identifiers and bare expressions
    pub fn with_primary_table(mut self, table: impl Into<String>) -> Self {
        self.primary_table = table.into();
        self
    }

    pub fn with_id_fields(mut self, id_fields: TableIdFields) -> Self {
        self.id_fields = id_fields;
        self
    }

    pub fn track_filtered_rows(mut self, track: bool) -> Self {
        self.track_filtered_rows = track;
        self
    }

    pub fn track_filtered_signal_ids(mut self, track: bool) -> Self {
        self.track_filtered_signal_ids = track;
        self
    }

    pub fn on_parse_error(mut self, callback: impl FnMut(&FilterError) + 'a) -> Self {
        self.parse_error_callback = Some(Box::new(callback));
        self
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn primary_table(&self) -> &str {
        &self.primary_table
    }

    fn parse_statements(&mut self) -> Result<Vec<Statement>> {
        match sql::parse_filter(&self.filter) {
            Ok(statements) => Ok(statements),
            Err(err) => {
                if let FilterError::Syntax { .. } = &err {
                    warn!("Failed to parse filter \"{}\": {}", self.filter, err);
                    if let Some(callback) = self.parse_error_callback.as_mut() {
                        callback(&err);
                    }
                }
                Err(err)
            }
        }
    }

    /// One bound tree per statement
    pub fn expression_trees(&mut self) -> Result<Vec<ExpressionTree>> {
        let statements = self.parse_statements()?;
        let planner = Planner::new(self.data_set, &self.primary_table, &self.id_fields);

        statements
            .into_iter()
            .map(|statement| planner.plan(statement))
            .collect()
    }

    /// Run every statement, merging their results
    pub fn evaluate(&mut self) -> Result<StatementResults> {
        let statements = self.parse_statements()?;
        let planner = Planner::new(self.data_set, &self.primary_table, &self.id_fields);
        let mut results = StatementResults::new();

        for statement in statements {
            results.begin_statement();

            match statement {
                Statement::Identifier(literal) => {
                    self.select_identifier(&planner, &literal, &mut results)?
                }
                statement => {
                    let tree = planner.plan(statement)?;
                    self.select_tree(&planner, &tree, &mut results)?;
                }
            }
        }

        debug!(
            "Filter \"{}\" selected {} row(s) and {} signal ID(s) from {} statement(s)",
            self.filter,
            results.filtered_rows().len(),
            results.filtered_signal_ids().len(),
            results.statement_count()
        );

        Ok(results)
    }

    fn select_tree(
        &self,
        planner: &Planner<'_>,
        tree: &ExpressionTree,
        results: &mut StatementResults,
    ) -> Result<()> {
        let table = planner.table(&tree.table_name)?;
        let table_index = self.table_index(table)?;

        let signal_id_column = if self.track_filtered_signal_ids {
            Some(id_column(table, &self.id_fields.signal_id)?)
        } else {
            None
        };

        let rows = executor::execute_tree(table, tree);
        debug!("Statement \"{}\" matched {} row(s)", tree, rows.len());

        for index in rows {
            if self.track_filtered_rows {
                results.add_row(RowRef::new(table_index, index));
            }

            if let (Some(column), Some(row)) = (&signal_id_column, table.row(index)) {
                if let Some(signal_id) = signal_id_of(table, index, row, column) {
                    results.add_signal_id(signal_id);
                }
            }
        }

        Ok(())
    }

    fn select_identifier(
        &self,
        planner: &Planner<'_>,
        literal: &IdentifierLiteral,
        results: &mut StatementResults,
    ) -> Result<()> {
        if let IdentifierLiteral::Guid(value) = literal {
            let Some(signal_id) = value.as_guid()? else {
                return Ok(());
            };

            if self.track_filtered_signal_ids {
                results.add_signal_id(signal_id);
            }

            if self.track_filtered_rows {
                let table = planner.primary_table()?;
                let column = id_column(table, planner.id_field(literal))?;
                let target = Value::Guid(signal_id);
                if let Some(index) = find_row(table, &column, |value| *value == target) {
                    results.add_row(RowRef::new(self.table_index(table)?, index));
                }
            }

            return Ok(());
        }

        let (IdentifierLiteral::MeasurementKey(text) | IdentifierLiteral::PointTag(text)) = literal
        else {
            return Ok(());
        };

        let table = planner.primary_table()?;
        let column = id_column(table, planner.id_field(literal))?;
        let Some(index) = find_row(table, &column, |value| match value {
            Value::String(s) => compare_strings(s, text, false) == Ordering::Equal,
            _ => false,
        }) else {
            debug!(
                "No row of table \"{}\" has {} \"{}\"",
                table.name(),
                column.name,
                text
            );
            return Ok(());
        };

        if self.track_filtered_rows {
            results.add_row(RowRef::new(self.table_index(table)?, index));
        }

        if self.track_filtered_signal_ids {
            let signal_id_column = id_column(table, &self.id_fields.signal_id)?;
            if let Some(row) = table.row(index) {
                if let Some(signal_id) = signal_id_of(table, index, row, &signal_id_column) {
                    results.add_signal_id(signal_id);
                }
            }
        }

        Ok(())
    }

    fn table_index(&self, table: &DataTable) -> Result<usize> {
        self.data_set.table_index(table.name()).ok_or_else(|| {
            FilterError::resolution(format!("table \"{}\" not found", table.name()))
        })
    }
}

/// Resolve an identifier field of a table
fn id_column(table: &DataTable, field: &str) -> Result<ColumnRef> {
    Binder::new(table).bind_column(field).map_err(|err| match err {
        FilterError::Resolution(_) if table.column_index(field).is_none() => {
            FilterError::resolution(format!(
                "table \"{}\" has no identifier field \"{}\"",
                table.name(),
                field
            ))
        }
        err => err,
    })
}

/// First row whose column value satisfies the predicate
fn find_row(table: &DataTable, column: &ColumnRef, predicate: impl Fn(&Value) -> bool) -> Option<usize> {
    table.rows().iter().position(|row| {
        ExpressionEvaluator::with_row(row)
            .evaluate_column(column)
            .map_or(false, |value| predicate(&value))
    })
}

fn signal_id_of(table: &DataTable, index: usize, row: &DataRow, column: &ColumnRef) -> Option<Uuid> {
    let signal_id = ExpressionEvaluator::with_row(row)
        .evaluate_column(column)
        .and_then(|value| convert(&value, DataType::Guid))
        .and_then(|value| value.as_guid());

    match signal_id {
        Ok(signal_id) => signal_id,
        Err(err) => {
            debug!(
                "Row {} of table \"{}\" has no usable signal ID: {}",
                index,
                table.name(),
                err
            );
            None
        }
    }
}
