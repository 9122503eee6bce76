pub(crate) mod lexer;
