// Recursive-descent parser for filter expressions

use super::ast::{
    Expression, FilterStatement, IdentifierLiteral, OrderByItem, OrderDirection, Statement,
};
use super::lexer::Lexer;
use super::literal::{parse_datetime_literal, parse_guid_literal, parse_hex, parse_integer, parse_real};
use super::token::Token;
use crate::error::{FilterError, Result};
use crate::expression::{FunctionType, Operator, UnaryOperator};
use crate::types::Value;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(text: &str) -> Result<Self> {
        let tokens = Lexer::new(text).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
        })
    }

    /// Parse a `;` separated statement list; empty statements are skipped
    pub fn parse_statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            while self.match_token(&Token::Semicolon) {
                self.advance();
            }
            if self.match_token(&Token::Eof) {
                break;
            }

            statements.push(self.parse_statement()?);

            if !self.current_token().is_statement_end() {
                return Err(self.unexpected("';' or end of input"));
            }
        }

        Ok(statements)
    }

    /// Parse input that must be exactly one expression
    pub fn parse_standalone_expression(&mut self) -> Result<Expression> {
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse input that must be exactly one ORDER BY term list
    pub fn parse_order_by_list(&mut self) -> Result<Vec<OrderByItem>> {
        let items = self.parse_order_by_items()?;
        self.expect_end()?;
        Ok(items)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let token = self.current_token();

        if token.is_identifier_literal() && self.peek_token(1).is_statement_end() {
            self.advance();
            let literal = match token {
                Token::Guid(text) => IdentifierLiteral::Guid(parse_guid_literal(&text)?),
                Token::MeasurementKey(key) => IdentifierLiteral::MeasurementKey(key),
                Token::PointTag(tag) => IdentifierLiteral::PointTag(tag),
                _ => unreachable!("identifier literal token {:?}", token),
            };
            return Ok(Statement::Identifier(literal));
        }

        if self.match_token(&Token::Filter) {
            return Ok(Statement::Filter(self.parse_filter_statement()?));
        }

        Ok(Statement::Expression(self.parse_expression()?))
    }

    /// FILTER [TOP n] table WHERE expr [ORDER BY ...] [TOP n]
    fn parse_filter_statement(&mut self) -> Result<FilterStatement> {
        self.expect_token(Token::Filter)?;

        let mut top = None;
        if self.match_token(&Token::Top) {
            self.advance();
            top = Some(self.parse_signed_int()?);
        }

        let table_name = self.expect_identifier()?;
        self.expect_token(Token::Where)?;
        let where_clause = self.parse_expression()?;

        let mut order_by = Vec::new();
        if self.match_token(&Token::Order) {
            self.advance();
            self.expect_token(Token::By)?;
            order_by = self.parse_order_by_items()?;
        }

        if self.match_token(&Token::Top) {
            if top.is_some() {
                return Err(FilterError::syntax("TOP specified more than once"));
            }
            self.advance();
            top = Some(self.parse_signed_int()?);
        }

        Ok(FilterStatement {
            table_name,
            top,
            where_clause,
            order_by,
        })
    }

    fn parse_order_by_items(&mut self) -> Result<Vec<OrderByItem>> {
        let mut items = vec![self.parse_order_by_item()?];

        while self.match_token(&Token::Comma) {
            self.advance();
            items.push(self.parse_order_by_item()?);
        }

        Ok(items)
    }

    fn parse_order_by_item(&mut self) -> Result<OrderByItem> {
        let exact_match = self.consume(&Token::Binary);
        let column = self.expect_identifier()?;

        let direction = match self.current_token() {
            Token::Asc => {
                self.advance();
                OrderDirection::Asc
            }
            Token::Desc => {
                self.advance();
                OrderDirection::Desc
            }
            _ => OrderDirection::Asc,
        };

        Ok(OrderByItem {
            column,
            direction,
            exact_match,
        })
    }

    fn parse_signed_int(&mut self) -> Result<i32> {
        let negative = match self.current_token() {
            Token::Minus => {
                self.advance();
                true
            }
            Token::Plus => {
                self.advance();
                false
            }
            _ => false,
        };

        match self.current_token() {
            Token::Integer(digits) => {
                self.advance();
                let text = if negative {
                    format!("-{}", digits)
                } else {
                    digits
                };
                text.parse::<i32>()
                    .map_err(|_| FilterError::syntax(format!("TOP value {} is out of range", text)))
            }
            _ => Err(self.unexpected("integer TOP value")),
        }
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;

        while matches!(self.current_token(), Token::Or | Token::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::binary(left, Operator::Or, right);
        }

        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;

        while matches!(self.current_token(), Token::And | Token::AndAnd) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::binary(left, Operator::And, right);
        }

        Ok(left)
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> Result<Expression> {
        if matches!(self.current_token(), Token::Not | Token::Bang) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expression::unary(UnaryOperator::Not, operand))
        } else {
            self.parse_predicate()
        }
    }

    /// Parse comparison, IS NULL, IN and LIKE predicates
    fn parse_predicate(&mut self) -> Result<Expression> {
        let mut left = self.parse_bitwise()?;

        loop {
            left = match self.current_token() {
                Token::Is => {
                    self.advance();
                    let negated = self.consume(&Token::Not);
                    self.expect_token(Token::Null)?;
                    Expression::IsNull {
                        expr: Box::new(left),
                        negated,
                    }
                }
                Token::In => {
                    self.advance();
                    self.parse_in_list(left, false)?
                }
                Token::Like => {
                    self.advance();
                    self.parse_like(left, false)?
                }
                Token::Not if self.peek_token(1) == Token::In => {
                    self.advance();
                    self.advance();
                    self.parse_in_list(left, true)?
                }
                Token::Not if self.peek_token(1) == Token::Like => {
                    self.advance();
                    self.advance();
                    self.parse_like(left, true)?
                }
                token => {
                    let op = match token {
                        Token::Less => Operator::LessThan,
                        Token::LessEqual => Operator::LessThanOrEqual,
                        Token::Greater => Operator::GreaterThan,
                        Token::GreaterEqual => Operator::GreaterThanOrEqual,
                        Token::Equal => Operator::Equal,
                        Token::ExactEqual => Operator::EqualExactMatch,
                        Token::NotEqual => Operator::NotEqual,
                        Token::ExactNotEqual => Operator::NotEqualExactMatch,
                        _ => break,
                    };
                    self.advance();
                    let right = self.parse_bitwise()?;
                    Expression::binary(left, op, right)
                }
            };
        }

        Ok(left)
    }

    fn parse_in_list(&mut self, expr: Expression, negated: bool) -> Result<Expression> {
        let exact_match = self.consume_exact_match();
        self.expect_token(Token::LeftParen)?;
        let list = self.parse_expression_list()?;
        self.expect_token(Token::RightParen)?;

        Ok(Expression::InList {
            expr: Box::new(expr),
            list,
            negated,
            exact_match,
        })
    }

    fn parse_like(&mut self, expr: Expression, negated: bool) -> Result<Expression> {
        let exact_match = self.consume_exact_match();
        let pattern = self.parse_bitwise()?;

        let op = match (negated, exact_match) {
            (false, false) => Operator::Like,
            (false, true) => Operator::LikeExactMatch,
            (true, false) => Operator::NotLike,
            (true, true) => Operator::NotLikeExactMatch,
        };

        Ok(Expression::binary(expr, op, pattern))
    }

    /// Parse shift and bitwise expression
    fn parse_bitwise(&mut self) -> Result<Expression> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Token::ShiftLeft => Operator::BitShiftLeft,
                Token::ShiftRight => Operator::BitShiftRight,
                Token::Ampersand => Operator::BitwiseAnd,
                Token::Pipe => Operator::BitwiseOr,
                Token::Caret | Token::Xor => Operator::BitwiseXor,
                _ => break,
            };
            self.advance();

            let right = self.parse_additive()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    /// Parse addition/subtraction expression
    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => Operator::Add,
                Token::Minus => Operator::Subtract,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    /// Parse multiplication/division expression
    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => Operator::Multiply,
                Token::Slash => Operator::Divide,
                Token::Percent => Operator::Modulus,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> Result<Expression> {
        match self.current_token() {
            Token::Plus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expression::unary(UnaryOperator::Plus, operand))
            }
            Token::Minus => {
                self.advance();
                // Fold the sign into numeric literals so Int32::MIN stays Int32
                if matches!(
                    self.current_token(),
                    Token::Integer(_) | Token::Hex(_) | Token::Real(_)
                ) {
                    return self.parse_number(true);
                }
                let operand = self.parse_unary()?;
                Ok(Expression::unary(UnaryOperator::Minus, operand))
            }
            Token::Tilde | Token::Bang | Token::Not => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expression::unary(UnaryOperator::Not, operand))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_number(&mut self, negative: bool) -> Result<Expression> {
        let value = match self.current_token() {
            Token::Integer(digits) => parse_integer(&digits, negative)?,
            Token::Hex(digits) => parse_hex(&digits, negative)?,
            Token::Real(text) => parse_real(&text, negative),
            _ => return Err(self.unexpected("number")),
        };
        self.advance();
        Ok(Expression::Literal(value))
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expression> {
        let value = match self.current_token() {
            Token::Integer(_) | Token::Hex(_) | Token::Real(_) => return self.parse_number(false),
            Token::String(s) | Token::MeasurementKey(s) | Token::PointTag(s) => Value::String(s),
            Token::DateTime(text) => parse_datetime_literal(&text)?,
            Token::Guid(text) => parse_guid_literal(&text)?,
            Token::True => Value::TRUE,
            Token::False => Value::FALSE,
            Token::Null => Value::NULL,
            Token::Identifier(name) => {
                self.advance();
                if self.match_token(&Token::LeftParen) {
                    return self.parse_function_call(&name);
                }
                return Ok(Expression::Column(name));
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("expression")),
        };

        self.advance();
        Ok(Expression::Literal(value))
    }

    fn parse_function_call(&mut self, name: &str) -> Result<Expression> {
        let function = FunctionType::from_name(name)
            .ok_or_else(|| FilterError::syntax(format!("unknown function \"{}\"", name)))?;

        self.expect_token(Token::LeftParen)?;
        let args = if self.match_token(&Token::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect_token(Token::RightParen)?;

        Ok(Expression::Function { function, args })
    }

    /// Parse list of expressions
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression()?];

        while self.match_token(&Token::Comma) {
            self.advance();
            expressions.push(self.parse_expression()?);
        }

        Ok(expressions)
    }

    // Helper methods

    /// Get current token
    fn current_token(&self) -> Token {
        self.peek_token(0)
    }

    fn peek_token(&self, offset: usize) -> Token {
        self.tokens
            .get(self.position + offset)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Advance to next token
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Check if current token matches
    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    /// Skip the current token if it matches
    fn consume(&mut self, token: &Token) -> bool {
        let matched = self.match_token(token);
        if matched {
            self.advance();
        }
        matched
    }

    /// `BINARY` or `===` after IN / LIKE
    fn consume_exact_match(&mut self) -> bool {
        self.consume(&Token::Binary) || self.consume(&Token::ExactEqual)
    }

    /// Expect a specific token
    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    /// Expect an identifier
    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.match_token(&Token::Eof) {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn unexpected(&self, expected: &str) -> FilterError {
        FilterError::syntax(format!(
            "expected {}, found \"{}\"",
            expected,
            self.current_token()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(text: &str) -> Vec<Statement> {
        Parser::new(text).unwrap().parse_statements().unwrap()
    }

    fn expression(text: &str) -> Expression {
        Parser::new(text)
            .unwrap()
            .parse_standalone_expression()
            .unwrap()
    }

    fn column(name: &str) -> Expression {
        Expression::Column(name.to_string())
    }

    #[test]
    fn test_parse_filter_statement() {
        let parsed = statements(
            "FILTER TOP 5 ActiveMeasurements WHERE SignalType = 'FREQ' ORDER BY BINARY PointTag DESC, ID",
        );
        assert_eq!(parsed.len(), 1);

        match &parsed[0] {
            Statement::Filter(filter) => {
                assert_eq!(filter.table_name, "ActiveMeasurements");
                assert_eq!(filter.top, Some(5));
                assert_eq!(
                    filter.where_clause,
                    Expression::binary(
                        column("SignalType"),
                        Operator::Equal,
                        Expression::Literal(Value::string("FREQ"))
                    )
                );
                assert_eq!(
                    filter.order_by,
                    vec![
                        OrderByItem {
                            column: "PointTag".to_string(),
                            direction: OrderDirection::Desc,
                            exact_match: true,
                        },
                        OrderByItem {
                            column: "ID".to_string(),
                            direction: OrderDirection::Asc,
                            exact_match: false,
                        },
                    ]
                );
            }
            other => panic!("Expected FILTER statement, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_top_and_negative_top() {
        match &statements("filter T where true order by Col top -1")[0] {
            Statement::Filter(filter) => assert_eq!(filter.top, Some(-1)),
            other => panic!("Expected FILTER statement, got {:?}", other),
        }

        let err = Parser::new("FILTER TOP 1 T WHERE True TOP 2")
            .unwrap()
            .parse_statements()
            .unwrap_err();
        assert!(matches!(err, FilterError::Syntax { .. }));
    }

    #[test]
    fn test_identifier_literal_statements() {
        let parsed = statements(
            ";{0f9c3a4b-1111-2222-3333-444455556666}; PPA:12 ;; \"GPA_SHELBY:FREQ\";",
        );
        assert_eq!(parsed.len(), 3);
        assert!(matches!(
            &parsed[0],
            Statement::Identifier(IdentifierLiteral::Guid(Value::Guid(_)))
        ));
        assert_eq!(
            parsed[1],
            Statement::Identifier(IdentifierLiteral::MeasurementKey("PPA:12".to_string()))
        );
        assert_eq!(
            parsed[2],
            Statement::Identifier(IdentifierLiteral::PointTag("GPA_SHELBY:FREQ".to_string()))
        );
    }

    #[test]
    fn test_guid_in_expression_is_a_literal() {
        let parsed = statements("SignalID = {0f9c3a4b-1111-2222-3333-444455556666}");
        match &parsed[0] {
            Statement::Expression(Expression::BinaryOp { right, .. }) => {
                assert!(matches!(**right, Expression::Literal(Value::Guid(_))));
            }
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 = 7 OR NOT x AND y
        let parsed = expression("1 + 2 * 3 = 7 OR NOT x AND y");
        let sum = Expression::binary(
            Expression::Literal(Value::Int32(1)),
            Operator::Add,
            Expression::binary(
                Expression::Literal(Value::Int32(2)),
                Operator::Multiply,
                Expression::Literal(Value::Int32(3)),
            ),
        );
        let comparison =
            Expression::binary(sum, Operator::Equal, Expression::Literal(Value::Int32(7)));
        let conjunction = Expression::binary(
            Expression::unary(UnaryOperator::Not, column("x")),
            Operator::And,
            column("y"),
        );
        assert_eq!(
            parsed,
            Expression::binary(comparison, Operator::Or, conjunction)
        );
    }

    #[test]
    fn test_bitwise_binds_looser_than_additive() {
        let parsed = expression("1 + 2 << 3 XOR 4");
        let shifted = Expression::binary(
            Expression::binary(
                Expression::Literal(Value::Int32(1)),
                Operator::Add,
                Expression::Literal(Value::Int32(2)),
            ),
            Operator::BitShiftLeft,
            Expression::Literal(Value::Int32(3)),
        );
        assert_eq!(
            parsed,
            Expression::binary(
                shifted,
                Operator::BitwiseXor,
                Expression::Literal(Value::Int32(4))
            )
        );
    }

    #[test]
    fn test_predicates() {
        assert_eq!(
            expression("x IS NOT NULL"),
            Expression::IsNull {
                expr: Box::new(column("x")),
                negated: true,
            }
        );

        assert_eq!(
            expression("Tag NOT IN BINARY ('a', 'b')"),
            Expression::InList {
                expr: Box::new(column("Tag")),
                list: vec![
                    Expression::Literal(Value::string("a")),
                    Expression::Literal(Value::string("b")),
                ],
                negated: true,
                exact_match: true,
            }
        );

        assert_eq!(
            expression("Tag NOT LIKE === 'ST%'"),
            Expression::binary(
                column("Tag"),
                Operator::NotLikeExactMatch,
                Expression::Literal(Value::string("ST%"))
            )
        );

        assert_eq!(
            expression("a !== b"),
            Expression::binary(column("a"), Operator::NotEqualExactMatch, column("b"))
        );
    }

    #[test]
    fn test_negative_literals() {
        assert_eq!(
            expression("-2147483648"),
            Expression::Literal(Value::Int32(i32::MIN))
        );
        assert_eq!(
            expression("-x"),
            Expression::unary(UnaryOperator::Minus, column("x"))
        );
        assert_eq!(
            expression("5 - -3"),
            Expression::binary(
                Expression::Literal(Value::Int32(5)),
                Operator::Subtract,
                Expression::Literal(Value::Int32(-3))
            )
        );
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            expression("iif(x, Now(), NULL)"),
            Expression::Function {
                function: FunctionType::IIf,
                args: vec![
                    column("x"),
                    Expression::Function {
                        function: FunctionType::Now,
                        args: vec![],
                    },
                    Expression::Literal(Value::NULL),
                ],
            }
        );

        let err = Parser::new("Bogus(1)")
            .unwrap()
            .parse_standalone_expression()
            .unwrap_err();
        assert_eq!(err, FilterError::syntax("unknown function \"Bogus\""));
    }

    #[test]
    fn test_syntax_errors() {
        for text in [
            "FILTER T x = 1",
            "FILTER T WHERE",
            "(1 + 2",
            "x IN ()",
            "1 2",
            "FILTER TOP x T WHERE True",
        ] {
            let result = Parser::new(text).and_then(|mut p| p.parse_statements());
            assert!(
                matches!(result, Err(FilterError::Syntax { .. })),
                "{} should fail",
                text
            );
        }
    }

    #[test]
    fn test_standalone_expression_rejects_trailing_tokens() {
        let err = Parser::new("1 + 1; 2")
            .unwrap()
            .parse_standalone_expression()
            .unwrap_err();
        assert_eq!(err, FilterError::syntax("expected end of input, found \";\""));
    }

    #[test]
    fn test_order_by_list() {
        let items = Parser::new("Tag DESC, BINARY Name")
            .unwrap()
            .parse_order_by_list()
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].direction, OrderDirection::Desc);
        assert!(items[1].exact_match);
    }
}
