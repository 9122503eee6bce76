use sha2::{Digest, Sha256};

use crate::eval::stack::StackValue;

/// One operator application, as identified for content addressing.
#[derive(Clone, Copy, Debug)]
pub enum Step<'a> {
    Unary {
        symbol: &'a str,
        operand: &'a StackValue,
    },
    Binary {
        symbol: &'a str,
        first: &'a StackValue,
        second: &'a StackValue,
    },
    Linear {
        symbol: &'a str,
        operand: &'a StackValue,
        coefficient: f64,
    },
}

fn tag(v: &StackValue) -> String {
    match v {
        StackValue::SourceRef(id) => format!("src:{id}"),
        StackValue::ComputedRef(fp) => format!("art:{fp}"),
        StackValue::Number(n) => format!("num:{n}"),
    }
}

impl Step<'_> {
    /// Stable text that the fingerprint is hashed from. Operands carry a kind tag, so a source
    /// id can never collide with an artifact fingerprint.
    pub fn canonical(&self) -> String {
        match *self {
            Self::Unary { symbol, operand } => format!("{}{symbol}", tag(operand)),
            Self::Binary {
                symbol,
                first,
                second,
            } => format!("{},{}{symbol}", tag(first), tag(second)),
            Self::Linear {
                symbol,
                operand,
                coefficient,
            } => format!("{}{symbol}{coefficient}", tag(operand)),
        }
    }

    /// Human-readable sub-expression, used in error context and logs.
    pub fn expr(&self) -> String {
        match *self {
            Self::Unary { symbol, operand } => format!("{operand}{symbol}"),
            Self::Binary {
                symbol,
                first,
                second,
            } => format!("{first},{second}{symbol}"),
            Self::Linear {
                symbol,
                operand,
                coefficient,
            } => format!("{operand},{coefficient}{symbol}"),
        }
    }

    pub fn fingerprint(&self) -> String {
        hex_digest(self.canonical().as_bytes())
    }
}

/// Lowercase hex SHA-256.
pub(crate) fn hex_digest(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
