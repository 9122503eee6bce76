/// Result alias used across the crate.
pub type EmoteResult<T> = Result<T, EmoteError>;

/// Every failure a query evaluation can surface.
///
/// Collaborator failures (`Codec`, `Format`, `NotFound`, `Io`) carry the identifier they failed
/// on. Failures raised while executing one operator are wrapped in [`EmoteError::Step`] with the
/// sub-expression text; use [`EmoteError::root_cause`] to match on the underlying kind.
#[derive(thiserror::Error, Debug)]
pub enum EmoteError {
    #[error("lex error at byte {offset}: {message}")]
    Lex { offset: usize, message: String },

    #[error("stack underflow: '{op}' needs {needed} operand(s), stack has {available}")]
    StackUnderflow {
        op: String,
        needed: usize,
        available: usize,
    },

    #[error("type mismatch in '{op}': expected {expected}, found {found}")]
    TypeMismatch {
        op: String,
        expected: &'static str,
        found: String,
    },

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("dimension mismatch in '{op}': {message}")]
    DimensionMismatch { op: &'static str, message: String },

    #[error("time series must not be empty")]
    EmptyTimeSeries,

    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid animation: {0}")]
    InvalidAnimation(String),

    #[error("codec error for '{id}': {message}")]
    Codec { id: String, message: String },

    #[error("format error for '{id}': {message}")]
    Format { id: String, message: String },

    #[error("not found: '{0}'")]
    NotFound(String),

    #[error("io error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("in '{expr}': {source}")]
    Step {
        expr: String,
        #[source]
        source: Box<EmoteError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EmoteError {
    pub fn lex(offset: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            offset,
            message: message.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedExpression(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::InvalidAnimation(msg.into())
    }

    pub fn codec(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Codec {
            id: id.into(),
            message: msg.into(),
        }
    }

    pub fn format(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Format {
            id: id.into(),
            message: msg.into(),
        }
    }

    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach the text of the sub-expression that was executing when `self` was raised.
    pub fn at_step(self, expr: impl Into<String>) -> Self {
        Self::Step {
            expr: expr.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every [`EmoteError::Step`] wrapper removed.
    pub fn root_cause(&self) -> &EmoteError {
        let mut cur = self;
        while let Self::Step { source, .. } = cur {
            cur = source;
        }
        cur
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
