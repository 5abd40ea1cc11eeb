//! Binary and unary operators.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    /// `/` always produces a float.
    Div,
    /// `//` integer division.
    FloorDiv,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Contains,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Native source symbol.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Contains => "contains",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Liquid spelling; logical operators use words.
    pub const fn as_liquid_symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            other => other.as_symbol(),
        }
    }

    /// Binding power, higher binds tighter. Ranges sit at `RANGE_PRECEDENCE`.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Contains => 3,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::FloorDiv | Self::Mod => 6,
        }
    }
}

/// Precedence of `..` / `..<`, between comparison and additive operators.
pub const RANGE_PRECEDENCE: u8 = 4;

/// Precedence of prefix operators.
pub const UNARY_PRECEDENCE: u8 = 7;

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
        }
    }
}
