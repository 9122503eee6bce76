//! emotemod evaluates short postfix queries over animated emotes.
//!
//! A query such as `Kappa,Pog>stackx>rave` names source emotes and applies operators from a fixed
//! catalog. Evaluation goes through an [`Engine`]:
//!
//! - the query is split into [`Token`]s by [`lex`]
//! - tokens drive an [`OperandStack`]; every operator application is content-addressed by a
//!   SHA-256 fingerprint and memoized in an [`ArtifactCache`]
//! - the fingerprint of the final artifact is returned in an [`Evaluation`]
//!
//! Bitstream codecs ([`Codec`]), source retrieval ([`AssetFetcher`]) and blob storage
//! ([`Storage`]) are traits, with filesystem and in-memory implementations provided.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod cache;
pub(crate) mod codec;
pub(crate) mod config;
pub(crate) mod eval;
pub(crate) mod fetch;
pub(crate) mod ops;
pub(crate) mod query;

pub use crate::foundation::error::{EmoteError, EmoteResult};
pub use crate::foundation::rng::Rng64;

pub use crate::animation::frame::{Animation, Frame};
pub use crate::animation::timeline::{MergedEntry, merge_timelines, reverse_timeline};
pub use crate::cache::artifact::{ArtifactCache, Lookup, artifact_key, source_key};
pub use crate::cache::fingerprint::Step;
pub use crate::cache::storage::{FsStorage, MemoryStorage, Storage};
pub use crate::codec::image_codec::ImageCodec;
pub use crate::codec::raw::RawCodec;
pub use crate::codec::{Codec, decode_any};
pub use crate::config::{ArtifactFormat, EngineConfig};
pub use crate::eval::evaluator::{Engine, EvalStats, Evaluation, OperatorInfo};
pub use crate::eval::stack::{OperandStack, StackValue};
pub use crate::fetch::{AssetFetcher, DirFetcher, SourceFormat};
pub use crate::ops::{
    Arity, CATALOG, DEFAULT_STILL_FRAME_MILLIS, Operation, StackOp, Transform, TransformCtx, lookup,
};
pub use crate::query::lexer::{LexMode, Lexed, Span, Token, TokenKind, lex};
