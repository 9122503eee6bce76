//! Content-addressed artifact cache over pluggable blob storage.

pub(crate) mod artifact;
pub(crate) mod fingerprint;
pub(crate) mod storage;
