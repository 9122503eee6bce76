use std::fmt;

use crate::foundation::error::EmoteError;

/// One operand-stack slot.
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    /// A source emote that has not been fetched yet.
    SourceRef(String),
    /// A produced (or about to be produced) artifact, by fingerprint.
    ComputedRef(String),
    /// A coefficient for a linear operator.
    Number(f64),
}

impl StackValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SourceRef(_) => "source reference",
            Self::ComputedRef(_) => "computed reference",
            Self::Number(_) => "number",
        }
    }
}

impl fmt::Display for StackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceRef(id) => f.write_str(id),
            Self::ComputedRef(fp) => write!(f, "@{fp}"),
            Self::Number(v) => write!(f, "{v}"),
        }
    }
}

/// Operand stack with first-failure poisoning: once an operation fails, every later operation
/// is a no-op and the first error is kept.
#[derive(Debug, Default)]
pub struct OperandStack {
    items: Vec<StackValue>,
    error: Option<EmoteError>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        if self.error.is_some() {
            return 0;
        }
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> &[StackValue] {
        &self.items
    }

    pub fn is_poisoned(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&EmoteError> {
        self.error.as_ref()
    }

    /// Record `err` unless an earlier failure is already recorded.
    pub fn poison(&mut self, err: EmoteError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn push(&mut self, value: StackValue) {
        if self.error.is_some() {
            return;
        }
        self.items.push(value);
    }

    /// Check that `op` can pop `needed` values, poisoning the stack otherwise.
    pub fn require(&mut self, op: &str, needed: usize) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.items.len() < needed {
            self.poison(EmoteError::StackUnderflow {
                op: op.to_owned(),
                needed,
                available: self.items.len(),
            });
            return false;
        }
        true
    }

    pub fn pop(&mut self, op: &str) -> Option<StackValue> {
        if !self.require(op, 1) {
            return None;
        }
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&StackValue> {
        if self.error.is_some() {
            return None;
        }
        self.items.last()
    }

    pub fn dup(&mut self, op: &str) {
        if let Some(top) = self.pop(op) {
            self.items.push(top.clone());
            self.items.push(top);
        }
    }

    pub fn swap(&mut self, op: &str) {
        if self.require(op, 2) {
            let n = self.items.len();
            self.items.swap(n - 1, n - 2);
        }
    }

    /// Final result: exactly one computed reference, or the first recorded failure.
    pub fn finish(self) -> Result<String, EmoteError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut items = self.items;
        match items.len() {
            0 => Err(EmoteError::malformed("query produced no value")),
            1 => match items.pop() {
                Some(StackValue::ComputedRef(fp)) => Ok(fp),
                Some(other) => Err(EmoteError::malformed(format!(
                    "result is a bare {} ('{other}'); apply at least one operator",
                    other.kind_name()
                ))),
                None => Err(EmoteError::malformed("query produced no value")),
            },
            n => Err(EmoteError::malformed(format!(
                "stack holds {n} values at end of query, expected 1"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/stack.rs"]
mod tests;
