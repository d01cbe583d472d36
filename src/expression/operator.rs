//! Operator definitions for expressions.

use std::fmt;

/// Binary (and NULL-test) operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Multiply,
    Divide,
    Modulus,
    Add,
    Subtract,

    // Bitwise
    BitShiftLeft,
    BitShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,

    // Comparison
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    EqualExactMatch,
    NotEqual,
    NotEqualExactMatch,

    // NULL checks, right operand absent
    IsNull,
    IsNotNull,

    // Pattern matching
    Like,
    LikeExactMatch,
    NotLike,
    NotLikeExactMatch,

    // Logical
    And,
    Or,
}

/// Groups of operators sharing one type derivation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    Arithmetic,
    Integer,
    Shift,
    Comparison,
    NullTest,
    Like,
    Boolean,
}

impl Operator {
    pub fn family(&self) -> OperatorFamily {
        match self {
            Operator::Multiply | Operator::Divide | Operator::Add | Operator::Subtract => {
                OperatorFamily::Arithmetic
            }
            Operator::Modulus
            | Operator::BitwiseAnd
            | Operator::BitwiseOr
            | Operator::BitwiseXor => OperatorFamily::Integer,
            Operator::BitShiftLeft | Operator::BitShiftRight => OperatorFamily::Shift,
            Operator::LessThan
            | Operator::LessThanOrEqual
            | Operator::GreaterThan
            | Operator::GreaterThanOrEqual
            | Operator::Equal
            | Operator::EqualExactMatch
            | Operator::NotEqual
            | Operator::NotEqualExactMatch => OperatorFamily::Comparison,
            Operator::IsNull | Operator::IsNotNull => OperatorFamily::NullTest,
            Operator::Like
            | Operator::LikeExactMatch
            | Operator::NotLike
            | Operator::NotLikeExactMatch => OperatorFamily::Like,
            Operator::And | Operator::Or => OperatorFamily::Boolean,
        }
    }

    /// Whether string operands are compared ordinally (case-sensitive)
    pub fn is_exact_match(&self) -> bool {
        matches!(
            self,
            Operator::EqualExactMatch
                | Operator::NotEqualExactMatch
                | Operator::LikeExactMatch
                | Operator::NotLikeExactMatch
        )
    }

    /// Whether this operator takes no right operand
    pub fn is_unary(&self) -> bool {
        self.family() == OperatorFamily::NullTest
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulus => "%",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::BitShiftLeft => "<<",
            Operator::BitShiftRight => ">>",
            Operator::BitwiseAnd => "&",
            Operator::BitwiseOr => "|",
            Operator::BitwiseXor => "^",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Equal => "=",
            Operator::EqualExactMatch => "===",
            Operator::NotEqual => "<>",
            Operator::NotEqualExactMatch => "!==",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Like => "LIKE",
            Operator::LikeExactMatch => "LIKE BINARY",
            Operator::NotLike => "NOT LIKE",
            Operator::NotLikeExactMatch => "NOT LIKE BINARY",
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    /// Logical NOT for Boolean, bitwise complement for integers
    Not,
}

impl UnaryOperator {
    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "NOT ",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_families() {
        assert_eq!(Operator::Add.family(), OperatorFamily::Arithmetic);
        assert_eq!(Operator::Modulus.family(), OperatorFamily::Integer);
        assert_eq!(Operator::BitShiftRight.family(), OperatorFamily::Shift);
        assert_eq!(Operator::NotEqualExactMatch.family(), OperatorFamily::Comparison);
        assert_eq!(Operator::IsNotNull.family(), OperatorFamily::NullTest);
        assert_eq!(Operator::NotLike.family(), OperatorFamily::Like);
        assert_eq!(Operator::Or.family(), OperatorFamily::Boolean);
    }

    #[test]
    fn test_exact_match_flags() {
        assert!(Operator::EqualExactMatch.is_exact_match());
        assert!(Operator::NotLikeExactMatch.is_exact_match());
        assert!(!Operator::Equal.is_exact_match());
        assert!(!Operator::Like.is_exact_match());
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(Operator::Add.as_str(), "+");
        assert_eq!(Operator::Equal.as_str(), "=");
        assert_eq!(Operator::NotEqual.as_str(), "<>");
        assert_eq!(Operator::And.as_str(), "AND");
        assert_eq!(Operator::IsNotNull.as_str(), "IS NOT NULL");
        assert_eq!(UnaryOperator::Minus.as_str(), "-");
    }
}
