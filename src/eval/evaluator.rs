use std::sync::Arc;

use crate::animation::frame::Animation;
use crate::cache::artifact::{ArtifactCache, Lookup};
use crate::cache::fingerprint::Step;
use crate::cache::storage::{FsStorage, Storage};
use crate::codec::{Codec, decode_any};
use crate::codec::image_codec::ImageCodec;
use crate::codec::raw::RawCodec;
use crate::config::{ArtifactFormat, EngineConfig};
use crate::eval::stack::{OperandStack, StackValue};
use crate::fetch::{AssetFetcher, DirFetcher};
use crate::foundation::error::{EmoteError, EmoteResult};
use crate::ops::{Arity, CATALOG, Operation, StackOp, Transform, TransformCtx, lookup};
use crate::query::lexer::{LexMode, Token, TokenKind, lex};

/// Counters for one evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EvalStats {
    /// Operator applications that produced a value, stack ops included.
    pub steps: usize,
    pub cache_hits: usize,
    pub transforms_run: usize,
}

/// Result of a successful query: the fingerprint of the final artifact.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Evaluation {
    pub fingerprint: String,
    pub stats: EvalStats,
}

/// Serializable view of one catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OperatorInfo {
    pub symbol: &'static str,
    pub arity: Arity,
    pub summary: &'static str,
}

/// Query evaluator bound to one artifact cache and one set of collaborators.
///
/// An `Engine` is `Sync`; independent queries may be evaluated from several threads at once and
/// will share cached artifacts. Within one query, tokens execute strictly in order.
pub struct Engine {
    cache: ArtifactCache,
    fetcher: Arc<dyn AssetFetcher>,
    source_codec: Arc<dyn Codec>,
    artifact_codec: Arc<dyn Codec>,
    lex_mode: LexMode,
    ctx: TransformCtx,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cache", &self.cache)
            .field("source_codec", &self.source_codec.name())
            .field("artifact_codec", &self.artifact_codec.name())
            .field("lex_mode", &self.lex_mode)
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn AssetFetcher>,
        source_codec: Arc<dyn Codec>,
        artifact_codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            cache: ArtifactCache::new(storage),
            fetcher,
            source_codec,
            artifact_codec,
            lex_mode: LexMode::default(),
            ctx: TransformCtx::default(),
        }
    }

    /// Filesystem store, directory fetcher and `image`-backed source decoding, as configured.
    pub fn from_config(cfg: &EngineConfig) -> EmoteResult<Self> {
        cfg.validate()?;
        let artifact_codec: Arc<dyn Codec> = match cfg.artifact_format {
            ArtifactFormat::Raw => Arc::new(RawCodec),
            ArtifactFormat::Gif => Arc::new(ImageCodec),
        };
        Ok(Self::new(
            Arc::new(FsStorage::new(&cfg.store_dir)),
            Arc::new(DirFetcher::new(&cfg.sources_dir, cfg.source_format)),
            Arc::new(ImageCodec),
            artifact_codec,
        )
        .with_lex_mode(cfg.lex_mode)
        .with_transform_ctx(cfg.transform_ctx()))
    }

    pub fn with_lex_mode(mut self, mode: LexMode) -> Self {
        self.lex_mode = mode;
        self
    }

    pub fn with_transform_ctx(mut self, ctx: TransformCtx) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn lex_mode(&self) -> LexMode {
        self.lex_mode
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn catalog() -> impl Iterator<Item = OperatorInfo> {
        CATALOG.iter().map(|op| OperatorInfo {
            symbol: op.symbol,
            arity: op.arity(),
            summary: op.summary,
        })
    }

    /// Lex and run `query`, returning the fingerprint of the single resulting artifact.
    #[tracing::instrument(skip(self))]
    pub fn evaluate(&self, query: &str) -> EmoteResult<Evaluation> {
        let lexed = lex(query, self.lex_mode)?;
        if !lexed.skipped.is_empty() {
            tracing::debug!(skipped = ?lexed.skipped, "ignored unmatched input");
        }
        tracing::debug!(tokens = lexed.tokens.len(), "lexed query");
        self.eval_tokens(&lexed.tokens)
    }

    pub fn eval_tokens(&self, tokens: &[Token]) -> EmoteResult<Evaluation> {
        let mut stack = OperandStack::new();
        let mut stats = EvalStats::default();

        for token in tokens {
            match &token.kind {
                TokenKind::EmoteRef(id) => stack.push(StackValue::SourceRef(id.clone())),
                TokenKind::Number(v) => stack.push(StackValue::Number(*v)),
                TokenKind::Separator => {}
                TokenKind::Operator(symbol) => {
                    let op =
                        lookup(symbol).ok_or_else(|| EmoteError::UnknownOperator(symbol.clone()))?;
                    self.apply(op, &mut stack, &mut stats)?;
                }
            }
        }

        let fingerprint = stack.finish()?;
        tracing::info!(
            %fingerprint,
            steps = stats.steps,
            cache_hits = stats.cache_hits,
            transforms_run = stats.transforms_run,
            "query evaluated"
        );
        Ok(Evaluation { fingerprint, stats })
    }

    /// Decode a stored artifact.
    ///
    /// Artifact keys do not record the codec, so a blob the configured codec rejects is retried
    /// by signature; stores written under another `artifact_format` stay readable.
    pub fn load_artifact(&self, fingerprint: &str) -> EmoteResult<Animation> {
        let bytes = self.cache.load(fingerprint)?;
        match self.artifact_codec.decode(fingerprint, &bytes) {
            Err(EmoteError::Codec { message, .. }) => {
                tracing::debug!(
                    %fingerprint,
                    %message,
                    "artifact codec mismatch, decoding by signature"
                );
                decode_any(fingerprint, &bytes)
            }
            other => other,
        }
    }

    /// Stack failures poison `stack` and are reported by [`OperandStack::finish`]; transform and
    /// collaborator failures return immediately.
    #[tracing::instrument(level = "debug", skip_all, fields(op = op.symbol))]
    fn apply(
        &self,
        op: &'static Operation,
        stack: &mut OperandStack,
        stats: &mut EvalStats,
    ) -> EmoteResult<()> {
        if stack.is_poisoned() {
            return Ok(());
        }
        let symbol = op.symbol;

        match op.transform {
            Transform::Stack(StackOp::Dup) => {
                stack.dup(symbol);
                stats.steps += 1;
            }
            Transform::Stack(StackOp::Swap) => {
                stack.swap(symbol);
                stats.steps += 1;
            }
            Transform::Unary(f) => {
                let Some(operand) = pop_operand(stack, symbol) else {
                    return Ok(());
                };
                let step = Step::Unary {
                    symbol,
                    operand: &operand,
                };
                self.run_step(step, stack, stats, || {
                    f(&self.materialize(&operand)?, &self.ctx)
                })?;
            }
            Transform::Fixed { apply, coefficient } => {
                let Some(operand) = pop_operand(stack, symbol) else {
                    return Ok(());
                };
                let step = Step::Unary {
                    symbol,
                    operand: &operand,
                };
                self.run_step(step, stack, stats, || {
                    apply(&self.materialize(&operand)?, coefficient, &self.ctx)
                })?;
            }
            Transform::Binary(f) => {
                if !stack.require(symbol, 2) {
                    return Ok(());
                }
                let Some(second) = pop_operand(stack, symbol) else {
                    return Ok(());
                };
                let Some(first) = pop_operand(stack, symbol) else {
                    return Ok(());
                };
                let step = Step::Binary {
                    symbol,
                    first: &first,
                    second: &second,
                };
                self.run_step(step, stack, stats, || {
                    let a = self.materialize(&first)?;
                    if first == second {
                        return f(&a, &a, &self.ctx);
                    }
                    let b = self.materialize(&second)?;
                    f(&a, &b, &self.ctx)
                })?;
            }
            Transform::Linear(f) => {
                let Some((operand, coefficient)) = pop_linear(stack, symbol) else {
                    return Ok(());
                };
                let step = Step::Linear {
                    symbol,
                    operand: &operand,
                    coefficient,
                };
                self.run_step(step, stack, stats, || {
                    f(&self.materialize(&operand)?, coefficient, &self.ctx)
                })?;
            }
        }
        Ok(())
    }

    fn run_step<F>(
        &self,
        step: Step<'_>,
        stack: &mut OperandStack,
        stats: &mut EvalStats,
        compute: F,
    ) -> EmoteResult<()>
    where
        F: FnOnce() -> EmoteResult<Animation>,
    {
        let fingerprint = step.fingerprint();
        let expr = step.expr();

        let outcome = self
            .cache
            .get_or_create(&fingerprint, || {
                let anim = compute()?;
                self.artifact_codec.encode(&fingerprint, &anim)
            })
            .map_err(|e| e.at_step(&expr))?;

        match outcome {
            Lookup::Hit => {
                stats.cache_hits += 1;
                tracing::debug!(%expr, %fingerprint, "cache hit");
            }
            Lookup::Created => {
                stats.transforms_run += 1;
                tracing::info!(%expr, %fingerprint, "artifact created");
            }
        }

        stack.push(StackValue::ComputedRef(fingerprint));
        stats.steps += 1;
        Ok(())
    }

    fn materialize(&self, value: &StackValue) -> EmoteResult<Animation> {
        match value {
            StackValue::SourceRef(id) => {
                let bytes = self.cache.source_bytes(id, || self.fetcher.fetch(id))?;
                self.source_codec.decode(id, &bytes)
            }
            StackValue::ComputedRef(fp) => self.load_artifact(fp),
            StackValue::Number(_) => Err(type_mismatch("materialize", "emote reference", value)),
        }
    }
}

fn type_mismatch(op: &str, expected: &'static str, found: &StackValue) -> EmoteError {
    EmoteError::TypeMismatch {
        op: op.to_owned(),
        expected,
        found: format!("{} '{found}'", found.kind_name()),
    }
}

/// Pop an emote reference; a number poisons the stack.
fn pop_operand(stack: &mut OperandStack, symbol: &str) -> Option<StackValue> {
    match stack.pop(symbol)? {
        v @ StackValue::Number(_) => {
            stack.poison(type_mismatch(symbol, "emote reference", &v));
            None
        }
        v => Some(v),
    }
}

/// Pop `(operand, coefficient)`, accepting the coefficient either above or below the operand.
fn pop_linear(stack: &mut OperandStack, symbol: &str) -> Option<(StackValue, f64)> {
    if !stack.require(symbol, 2) {
        return None;
    }
    let top = stack.pop(symbol)?;
    let below = stack.pop(symbol)?;
    match (top, below) {
        (StackValue::Number(_), other @ StackValue::Number(_)) => {
            stack.poison(type_mismatch(symbol, "emote reference", &other));
            None
        }
        (StackValue::Number(k), operand) | (operand, StackValue::Number(k)) => Some((operand, k)),
        (_, other) => {
            stack.poison(type_mismatch(symbol, "number", &other));
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
