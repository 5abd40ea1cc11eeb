//! Error codes for every diagnostic the engine can produce.
//!
//! The leading letter and digit give the phase:
//! - `E0xxx`: lexer errors, which abort the parse
//! - `E1xxx`: parser errors, recovered from
//! - `E6xxx`: runtime errors raised while rendering
//! - `W1xxx`: parser warnings

use std::fmt;

macro_rules! error_codes {
    ($($(#[$attr:meta])* $code:ident => $summary:literal,)*) => {
        /// A stable, searchable diagnostic code.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum ErrorCode {
            $($(#[$attr])* #[doc = $summary] $code,)*
        }

        impl ErrorCode {
            /// Every code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$code,)*];

            /// The code as written in reports, e.g. `"E1001"`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ErrorCode::$code => stringify!($code),)*
                }
            }

            /// One-line description of what the code means.
            pub fn summary(self) -> &'static str {
                match self {
                    $(ErrorCode::$code => $summary,)*
                }
            }
        }
    };
}

error_codes! {
    E0001 => "unterminated string literal",
    E0002 => "unterminated code block",
    E0003 => "unterminated raw block",
    E0004 => "unterminated comment",
    E0005 => "invalid escape sequence",
    E0006 => "unterminated front matter",
    E0007 => "source too large to address",

    E1001 => "unexpected token",
    E1002 => "expected expression",
    E1003 => "unclosed delimiter",
    E1004 => "expected identifier",
    E1005 => "block is missing its `end`",
    E1006 => "invalid assignment target",
    E1007 => "block keyword outside of its block",
    E1008 => "unknown Liquid tag",
    E1009 => "invalid character",
    E1010 => "invalid number literal",

    E6001 => "undefined variable",
    E6002 => "member access failed",
    E6003 => "index access failed",
    E6004 => "operator not defined for the operand types",
    E6005 => "division by zero",
    E6006 => "value is not callable",
    E6007 => "wrong number of arguments",
    E6008 => "loop iteration limit exceeded",
    E6009 => "call depth limit exceeded",
    E6010 => "include failed",
    E6011 => "write to a read-only member",
    E6012 => "host value has no usable accessor",
    E6013 => "invalid assignment",
    E6014 => "builtin rejected its arguments",
    E6015 => "template contains syntax errors",
    E6016 => "value cannot be iterated",

    W1001 => "unreachable statement",
}

impl ErrorCode {
    pub fn is_lexer_error(self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_runtime_error(self) -> bool {
        self.as_str().starts_with("E6")
    }

    pub fn is_warning(self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
