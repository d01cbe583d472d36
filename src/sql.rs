// Filter expression language - lexing, parsing and the unbound syntax tree

pub mod ast;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::*;

use crate::error::Result;

/// Parse `;` separated filter statements
pub fn parse_filter(text: &str) -> Result<Vec<Statement>> {
    let statements = Parser::new(text)?.parse_statements()?;
    log::trace!("parsed {} statement(s) from \"{}\"", statements.len(), text);
    Ok(statements)
}

/// Parse text that must hold a single expression
pub fn parse_expression(text: &str) -> Result<Expression> {
    Parser::new(text)?.parse_standalone_expression()
}

/// Parse a comma separated `[BINARY] column [ASC|DESC]` list
pub fn parse_order_by(text: &str) -> Result<Vec<OrderByItem>> {
    Parser::new(text)?.parse_order_by_list()
}
