//! Error codes for all compiler diagnostics.
//!
//! Each code is a unique identifier (e.g. `E2003`) whose first digit names
//! the compiler phase.

use std::fmt;

/// Format: E#### where the first digit is the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Semantic errors
/// - E6xxx: Compile-time evaluation errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string or character literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Invalid escape sequence
    E0004,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected type
    E1004,
    /// Expected declaration
    E1005,

    // Semantic Errors (E2xxx)
    /// Undefined identifier
    E2001,
    /// No matching overload, or an ambiguous one
    E2002,
    /// Type mismatch
    E2003,
    /// Expression is not an lvalue
    E2004,
    /// Cannot modify a constant, immutable or manifest value
    E2005,
    /// Reference or address escapes its storage
    E2006,
    /// Impure access from a pure function
    E2007,
    /// Unsafe operation in a @safe function
    E2008,
    /// Use of a deprecated symbol (warning by default)
    E2009,
    /// No such member
    E2010,
    /// Incompatible operand types
    E2011,
    /// Duplicate declaration
    E2012,
    /// Wrong number of arguments
    E2013,
    /// Expression is not callable
    E2014,
    /// Static assertion failed
    E2015,
    /// Construct not supported here (templates, invalid mixin text)
    E2016,
    /// String import failed
    E2017,
    /// Misplaced control flow (break outside a loop, unknown label)
    E2018,
    /// Function that returns a value may fall off its end
    E2019,

    // CTFE Errors (E6xxx)
    /// Cannot be evaluated at compile time
    E6001,
    /// Array index or slice out of bounds
    E6002,
    /// Division by zero
    E6003,
    /// Assertion failed
    E6004,
    /// Recursion limit exceeded
    E6005,
    /// Uncaught throw
    E6006,
    /// Null dereference
    E6007,
    /// Step budget exceeded
    E6008,
    /// Key not found in associative array
    E6009,
    /// Arithmetic fault (shift or exponent out of range)
    E6010,
    /// Invalid cast of a compile-time value
    E6011,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        ErrorCode::E2019,
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6005,
        ErrorCode::E6006,
        ErrorCode::E6007,
        ErrorCode::E6008,
        ErrorCode::E6009,
        ErrorCode::E6010,
        ErrorCode::E6011,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description used by `--explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "Unterminated string or character literal",
            ErrorCode::E0002 => "Invalid character in source",
            ErrorCode::E0003 => "Invalid number literal",
            ErrorCode::E0004 => "Invalid escape sequence",
            ErrorCode::E1001 => "Unexpected token",
            ErrorCode::E1002 => "Expected expression",
            ErrorCode::E1003 => "Unclosed delimiter",
            ErrorCode::E1004 => "Expected type",
            ErrorCode::E1005 => "Expected declaration",
            ErrorCode::E2001 => "Undefined identifier",
            ErrorCode::E2002 => "No matching overload, or an ambiguous one",
            ErrorCode::E2003 => "Type mismatch",
            ErrorCode::E2004 => "Expression is not an lvalue",
            ErrorCode::E2005 => "Cannot modify a constant, immutable or manifest value",
            ErrorCode::E2006 => "Reference or address escapes its storage",
            ErrorCode::E2007 => "Impure access from a pure function",
            ErrorCode::E2008 => "Unsafe operation in a @safe function",
            ErrorCode::E2009 => "Use of a deprecated symbol (warning by default)",
            ErrorCode::E2010 => "No such member",
            ErrorCode::E2011 => "Incompatible operand types",
            ErrorCode::E2012 => "Duplicate declaration",
            ErrorCode::E2013 => "Wrong number of arguments",
            ErrorCode::E2014 => "Expression is not callable",
            ErrorCode::E2015 => "Static assertion failed",
            ErrorCode::E2016 => "Construct not supported here (templates, invalid mixin text)",
            ErrorCode::E2017 => "String import failed",
            ErrorCode::E2018 => "Misplaced control flow (break outside a loop, unknown label)",
            ErrorCode::E2019 => "Function that returns a value may fall off its end",
            ErrorCode::E6001 => "Cannot be evaluated at compile time",
            ErrorCode::E6002 => "Array index or slice out of bounds",
            ErrorCode::E6003 => "Division by zero",
            ErrorCode::E6004 => "Assertion failed",
            ErrorCode::E6005 => "Recursion limit exceeded",
            ErrorCode::E6006 => "Uncaught throw",
            ErrorCode::E6007 => "Null dereference",
            ErrorCode::E6008 => "Step budget exceeded",
            ErrorCode::E6009 => "Key not found in associative array",
            ErrorCode::E6010 => "Arithmetic fault (shift or exponent out of range)",
            ErrorCode::E6011 => "Invalid cast of a compile-time value",
            ErrorCode::E9001 => "Internal compiler error",
            ErrorCode::E9002 => "Too many errors",
        }
    }

    fn phase_digit(self) -> u8 {
        self.as_str().as_bytes()[1] - b'0'
    }

    pub fn is_lexer_error(&self) -> bool {
        self.phase_digit() == 0
    }

    pub fn is_parser_error(&self) -> bool {
        matches!(self.phase_digit(), 0 | 1)
    }

    pub fn is_semantic_error(&self) -> bool {
        self.phase_digit() == 2
    }

    pub fn is_ctfe_error(&self) -> bool {
        self.phase_digit() == 6
    }

    pub fn is_internal_error(&self) -> bool {
        self.phase_digit() == 9
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
