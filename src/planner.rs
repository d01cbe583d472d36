//! Statement planner: turns parsed statements into bound expression trees.
//!
//! Each statement becomes one [`ExpressionTree`]:
//! 1. `FILTER` statements bind against their named table, keeping TOP and ORDER BY
//! 2. Bare expressions bind against the primary table
//! 3. Literal identifiers become `<id field> = <literal>` on the primary table

pub mod binder;

pub use binder::Binder;

use crate::catalog::{DataSet, DataTable, TableIdFields};
use crate::error::{FilterError, Result};
use crate::expression::{Expression, ExpressionTree};
use crate::sql::{self, FilterStatement, IdentifierLiteral, Statement};
use crate::types::Value;

/// Planner that binds statements against a data set
pub struct Planner<'a> {
    data_set: &'a DataSet,
    primary_table: &'a str,
    id_fields: &'a TableIdFields,
}

impl<'a> Planner<'a> {
    /// Create a new planner; `primary_table` may be empty when only `FILTER`
    /// statements are planned
    pub fn new(data_set: &'a DataSet, primary_table: &'a str, id_fields: &'a TableIdFields) -> Self {
        Self {
            data_set,
            primary_table,
            id_fields,
        }
    }

    /// Convert a statement to an expression tree
    pub fn plan(&self, statement: Statement) -> Result<ExpressionTree> {
        match statement {
            Statement::Filter(filter) => self.plan_filter(filter),
            Statement::Expression(expr) => {
                let table = self.primary_table()?;
                let root = Binder::new(table).bind_expression(expr)?;
                Ok(ExpressionTree::new(table.name(), root))
            }
            Statement::Identifier(literal) => self.plan_identifier(&literal),
        }
    }

    /// Look up a table by name, case-insensitively
    pub fn table(&self, name: &str) -> Result<&'a DataTable> {
        self.data_set
            .table(name)
            .ok_or_else(|| FilterError::resolution(format!("table \"{}\" not found", name)))
    }

    pub fn primary_table(&self) -> Result<&'a DataTable> {
        if self.primary_table.is_empty() {
            return Err(FilterError::resolution(
                "no primary table was specified for statements without a FILTER clause",
            ));
        }
        self.table(self.primary_table)
    }

    /// Name of the primary table column matching a literal identifier kind
    pub fn id_field(&self, literal: &IdentifierLiteral) -> &'a str {
        match literal {
            IdentifierLiteral::Guid(_) => &self.id_fields.signal_id,
            IdentifierLiteral::MeasurementKey(_) => &self.id_fields.measurement_key,
            IdentifierLiteral::PointTag(_) => &self.id_fields.point_tag,
        }
    }

    fn plan_filter(&self, filter: FilterStatement) -> Result<ExpressionTree> {
        let table = self.table(&filter.table_name)?;
        let mut binder = Binder::new(table);

        let mut tree = ExpressionTree::new(table.name(), binder.bind_expression(filter.where_clause)?);
        tree.order_by = binder.bind_order_by(filter.order_by)?;
        tree.top_limit = filter.top.unwrap_or(-1);

        Ok(tree)
    }

    fn plan_identifier(&self, literal: &IdentifierLiteral) -> Result<ExpressionTree> {
        let table = self.primary_table()?;
        let field = self.id_field(literal);

        let column = Binder::new(table).bind_column(field).map_err(|_| {
            FilterError::resolution(format!(
                "primary table \"{}\" has no identifier field \"{}\"",
                table.name(),
                field
            ))
        })?;

        let value = match literal {
            IdentifierLiteral::Guid(value) => value.clone(),
            IdentifierLiteral::MeasurementKey(text) | IdentifierLiteral::PointTag(text) => {
                Value::string(text.as_str())
            }
        };

        Ok(ExpressionTree::new(
            table.name(),
            Expression::eq(Expression::column(column), Expression::value(value)),
        ))
    }
}

/// Bind a single expression to a table, e.g. a computed column definition
pub fn generate_expression_tree(table: &DataTable, expression: &str) -> Result<ExpressionTree> {
    let root = Binder::new(table).bind_expression(sql::parse_expression(expression)?)?;
    Ok(ExpressionTree::new(table.name(), root))
}

/// Parse and bind an expression that reads no columns
pub fn bind_context_free(expression: &str) -> Result<Expression> {
    Binder::context_free().bind_expression(sql::parse_expression(expression)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataColumn;
    use crate::types::DataType;

    fn data_set() -> DataSet {
        let mut data_set = DataSet::new();
        let table = DataTable::with_columns(
            "ActiveMeasurements",
            vec![
                DataColumn::new("SignalID", DataType::Guid),
                DataColumn::new("ID", DataType::String),
                DataColumn::new("SignalType", DataType::String),
            ],
        )
        .unwrap();
        data_set.add_table(table).unwrap();
        data_set
    }

    fn plan_all(data_set: &DataSet, primary: &str, text: &str) -> Result<Vec<ExpressionTree>> {
        let id_fields = TableIdFields::default();
        let planner = Planner::new(data_set, primary, &id_fields);
        sql::parse_filter(text)?
            .into_iter()
            .map(|statement| planner.plan(statement))
            .collect()
    }

    #[test]
    fn test_plan_filter_statement() {
        let data_set = data_set();
        let trees = plan_all(
            &data_set,
            "",
            "FILTER TOP 3 activemeasurements WHERE signaltype = 'FREQ' ORDER BY id DESC",
        )
        .unwrap();

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].table_name, "ActiveMeasurements");
        assert_eq!(trees[0].top_limit, 3);
        assert_eq!(trees[0].order_by[0].column.name, "ID");
        assert_eq!(
            trees[0].to_string(),
            "FILTER TOP 3 ActiveMeasurements WHERE (SignalType = 'FREQ') ORDER BY ID DESC"
        );
    }

    #[test]
    fn test_plan_identifier_and_expression_statements() {
        let data_set = data_set();
        let trees = plan_all(&data_set, "ActiveMeasurements", "PPA:1; SignalType = 'STAT'").unwrap();

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].to_string(), "FILTER ActiveMeasurements WHERE (ID = 'PPA:1')");
        assert_eq!(trees[0].top_limit, -1);
        assert_eq!(trees[1].table_name, "ActiveMeasurements");
    }

    #[test]
    fn test_missing_tables_and_fields() {
        let data_set = data_set();
        assert!(matches!(
            plan_all(&data_set, "", "FILTER Nope WHERE True"),
            Err(FilterError::Resolution(_))
        ));
        assert!(matches!(
            plan_all(&data_set, "", "True"),
            Err(FilterError::Resolution(_))
        ));
        assert!(matches!(
            plan_all(&data_set, "ActiveMeasurements", "\"TAG-1\""),
            Err(FilterError::Resolution(_))
        ));
    }

    #[test]
    fn test_generate_expression_tree() {
        let data_set = data_set();
        let table = data_set.table("ActiveMeasurements").unwrap();
        let tree = generate_expression_tree(table, "Len(ID) > 3").unwrap();
        assert_eq!(tree.table_name, "ActiveMeasurements");
        assert!(generate_expression_tree(table, "Len(ID) >").is_err());

        assert_eq!(
            bind_context_free("1 + 2").unwrap().to_string(),
            "(1 + 2)"
        );
    }
}
