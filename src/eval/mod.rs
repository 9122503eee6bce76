//! Stack-machine evaluation of lexed queries.

pub(crate) mod evaluator;
pub(crate) mod stack;
