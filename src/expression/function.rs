//! Built-in function identifiers and their arities.

use crate::error::{FilterError, Result};
use std::fmt;

/// Built-in functions callable from filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionType {
    // Math
    Abs,
    Ceiling,
    Floor,
    Power,
    Round,
    Sqrt,

    // String
    Len,
    Lower,
    Upper,
    Trim,
    TrimLeft,
    TrimRight,
    SubStr,
    Replace,
    Reverse,
    Split,
    StartsWith,
    EndsWith,
    Contains,
    IndexOf,
    LastIndexOf,
    NthIndexOf,
    StrCount,
    StrCmp,
    RegExMatch,
    RegExVal,

    // Predicate / inspection
    IsNull,
    IsDate,
    IsInteger,
    IsGuid,
    IsNumeric,
    Coalesce,
    IIf,

    // Conversion
    Convert,

    // Aggregation over the argument list
    MaxOf,
    MinOf,

    // Date/time
    Now,
    UtcNow,
    DateAdd,
    DateDiff,
    DatePart,
}

/// Accepted argument count of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => count >= min && count <= max,
            Arity::AtLeast(min) => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

impl FunctionType {
    pub const ALL: [FunctionType; 41] = [
        FunctionType::Abs,
        FunctionType::Ceiling,
        FunctionType::Floor,
        FunctionType::Power,
        FunctionType::Round,
        FunctionType::Sqrt,
        FunctionType::Len,
        FunctionType::Lower,
        FunctionType::Upper,
        FunctionType::Trim,
        FunctionType::TrimLeft,
        FunctionType::TrimRight,
        FunctionType::SubStr,
        FunctionType::Replace,
        FunctionType::Reverse,
        FunctionType::Split,
        FunctionType::StartsWith,
        FunctionType::EndsWith,
        FunctionType::Contains,
        FunctionType::IndexOf,
        FunctionType::LastIndexOf,
        FunctionType::NthIndexOf,
        FunctionType::StrCount,
        FunctionType::StrCmp,
        FunctionType::RegExMatch,
        FunctionType::RegExVal,
        FunctionType::IsNull,
        FunctionType::IsDate,
        FunctionType::IsInteger,
        FunctionType::IsGuid,
        FunctionType::IsNumeric,
        FunctionType::Coalesce,
        FunctionType::IIf,
        FunctionType::Convert,
        FunctionType::MaxOf,
        FunctionType::MinOf,
        FunctionType::Now,
        FunctionType::UtcNow,
        FunctionType::DateAdd,
        FunctionType::DateDiff,
        FunctionType::DatePart,
    ];

    /// Resolve a function by name, case-insensitive
    pub fn from_name(name: &str) -> Option<FunctionType> {
        FunctionType::ALL
            .iter()
            .copied()
            .find(|function| function.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FunctionType::Abs => "Abs",
            FunctionType::Ceiling => "Ceiling",
            FunctionType::Floor => "Floor",
            FunctionType::Power => "Power",
            FunctionType::Round => "Round",
            FunctionType::Sqrt => "Sqrt",
            FunctionType::Len => "Len",
            FunctionType::Lower => "Lower",
            FunctionType::Upper => "Upper",
            FunctionType::Trim => "Trim",
            FunctionType::TrimLeft => "TrimLeft",
            FunctionType::TrimRight => "TrimRight",
            FunctionType::SubStr => "SubStr",
            FunctionType::Replace => "Replace",
            FunctionType::Reverse => "Reverse",
            FunctionType::Split => "Split",
            FunctionType::StartsWith => "StartsWith",
            FunctionType::EndsWith => "EndsWith",
            FunctionType::Contains => "Contains",
            FunctionType::IndexOf => "IndexOf",
            FunctionType::LastIndexOf => "LastIndexOf",
            FunctionType::NthIndexOf => "NthIndexOf",
            FunctionType::StrCount => "StrCount",
            FunctionType::StrCmp => "StrCmp",
            FunctionType::RegExMatch => "RegExMatch",
            FunctionType::RegExVal => "RegExVal",
            FunctionType::IsNull => "IsNull",
            FunctionType::IsDate => "IsDate",
            FunctionType::IsInteger => "IsInteger",
            FunctionType::IsGuid => "IsGuid",
            FunctionType::IsNumeric => "IsNumeric",
            FunctionType::Coalesce => "Coalesce",
            FunctionType::IIf => "IIf",
            FunctionType::Convert => "Convert",
            FunctionType::MaxOf => "MaxOf",
            FunctionType::MinOf => "MinOf",
            FunctionType::Now => "Now",
            FunctionType::UtcNow => "UtcNow",
            FunctionType::DateAdd => "DateAdd",
            FunctionType::DateDiff => "DateDiff",
            FunctionType::DatePart => "DatePart",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            FunctionType::Now | FunctionType::UtcNow => Arity::Exact(0),

            FunctionType::Abs
            | FunctionType::Ceiling
            | FunctionType::Floor
            | FunctionType::Round
            | FunctionType::Sqrt
            | FunctionType::Len
            | FunctionType::Lower
            | FunctionType::Upper
            | FunctionType::Trim
            | FunctionType::TrimLeft
            | FunctionType::TrimRight
            | FunctionType::Reverse
            | FunctionType::IsDate
            | FunctionType::IsInteger
            | FunctionType::IsGuid
            | FunctionType::IsNumeric => Arity::Exact(1),

            FunctionType::Power
            | FunctionType::RegExMatch
            | FunctionType::RegExVal
            | FunctionType::IsNull
            | FunctionType::Convert
            | FunctionType::DatePart => Arity::Exact(2),

            FunctionType::IIf | FunctionType::DateAdd | FunctionType::DateDiff => Arity::Exact(3),

            FunctionType::SubStr => Arity::Range(2, 3),

            FunctionType::StartsWith
            | FunctionType::EndsWith
            | FunctionType::Contains
            | FunctionType::IndexOf
            | FunctionType::LastIndexOf
            | FunctionType::StrCount
            | FunctionType::StrCmp => Arity::Range(2, 3),

            FunctionType::Replace | FunctionType::Split | FunctionType::NthIndexOf => {
                Arity::Range(3, 4)
            }

            FunctionType::Coalesce | FunctionType::MaxOf | FunctionType::MinOf => {
                Arity::AtLeast(1)
            }
        }
    }

    /// Validate an argument count against this function's arity
    pub fn check_arity(&self, count: usize) -> Result<()> {
        let arity = self.arity();
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(FilterError::FunctionArgumentCount {
                function: self.name().to_string(),
                expected: arity.to_string(),
                actual: count,
            })
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
