use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::animation::frame::Frame;
use crate::cache::storage::MemoryStorage;

#[derive(Default)]
struct MapFetcher {
    sources: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl AssetFetcher for MapFetcher {
    fn fetch(&self, id: &str) -> EmoteResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.sources
            .get(id)
            .cloned()
            .ok_or_else(|| EmoteError::NotFound(id.to_owned()))
    }
}

#[derive(Default)]
struct CountingCodec {
    decodes: AtomicUsize,
    encodes: AtomicUsize,
}

impl Codec for CountingCodec {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn decode(&self, id: &str, bytes: &[u8]) -> EmoteResult<Animation> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        RawCodec.decode(id, bytes)
    }

    fn encode(&self, id: &str, anim: &Animation) -> EmoteResult<Vec<u8>> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        RawCodec.encode(id, anim)
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> Frame {
    let data = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
    Frame::new(w, h, data).unwrap()
}

fn anim(w: u32, h: u32, timestamps: &[i64]) -> Animation {
    let frames = (0..timestamps.len())
        .map(|i| solid(w, h, [i as u8 * 40, 10, 20, 255]))
        .collect();
    Animation::new(w, h, frames, timestamps.to_vec()).unwrap()
}

struct Harness {
    engine: Engine,
    fetcher: Arc<MapFetcher>,
    codec: Arc<CountingCodec>,
}

fn harness(sources: &[(&str, Animation)]) -> Harness {
    let fetcher = Arc::new(MapFetcher {
        sources: sources
            .iter()
            .map(|(id, a)| ((*id).to_owned(), RawCodec.encode(id, a).unwrap()))
            .collect(),
        fetches: AtomicUsize::new(0),
    });
    let codec = Arc::new(CountingCodec::default());
    let engine = Engine::new(
        Arc::new(MemoryStorage::new()),
        fetcher.clone(),
        codec.clone(),
        codec.clone(),
    );
    Harness {
        engine,
        fetcher,
        codec,
    }
}

fn root(err: &EmoteError) -> &EmoteError {
    err.root_cause()
}

#[test]
fn unary_step_is_computed_then_served_from_cache() {
    let h = harness(&[("Kappa", anim(2, 2, &[10, 20]))]);

    let first = h.engine.evaluate("Kappa>revx").unwrap();
    assert_eq!(
        first.stats,
        EvalStats {
            steps: 1,
            cache_hits: 0,
            transforms_run: 1
        }
    );

    let second = h.engine.evaluate("Kappa>revx").unwrap();
    assert_eq!(second.fingerprint, first.fingerprint);
    assert_eq!(second.stats.cache_hits, 1);
    assert_eq!(second.stats.transforms_run, 0);
    assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(h.codec.decodes.load(Ordering::SeqCst), 1);
    assert_eq!(h.codec.encodes.load(Ordering::SeqCst), 1);
}

#[test]
fn linear_coefficient_is_accepted_above_or_below() {
    let h = harness(&[("Kappa", anim(2, 2, &[10, 20]))]);
    let above = h.engine.evaluate("Kappa,2.0>scalet").unwrap();
    let below = h.engine.evaluate("2.0,Kappa>scalet").unwrap();
    assert_eq!(above.fingerprint, below.fingerprint);
    assert_eq!(below.stats.cache_hits, 1);

    let out = h.engine.load_artifact(&above.fingerprint).unwrap();
    assert_eq!(out.timestamps(), &[20, 40]);
}

#[test]
fn linear_without_number_is_a_type_mismatch() {
    let h = harness(&[("Kappa", anim(2, 2, &[0])), ("Pog", anim(2, 2, &[0]))]);
    let err = h.engine.evaluate("Kappa,Pog>scalex").unwrap_err();
    assert!(matches!(
        err,
        EmoteError::TypeMismatch {
            expected: "number",
            ..
        }
    ));

    let err = h.engine.evaluate("1.5,2.5>scalex").unwrap_err();
    assert!(matches!(err, EmoteError::TypeMismatch { .. }));
}

#[test]
fn number_where_an_emote_is_needed_is_a_type_mismatch() {
    let h = harness(&[]);
    let err = h.engine.evaluate("2.0>revx").unwrap_err();
    match err {
        EmoteError::TypeMismatch { op, expected, .. } => {
            assert_eq!(op, ">revx");
            assert_eq!(expected, "emote reference");
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn underflow_is_reported_after_the_token_stream() {
    let h = harness(&[("Kappa", anim(2, 2, &[0]))]);
    let err = h.engine.evaluate(">revx").unwrap_err();
    assert!(matches!(err, EmoteError::StackUnderflow { needed: 1, .. }));

    let err = h.engine.evaluate("Kappa>over").unwrap_err();
    assert!(matches!(
        err,
        EmoteError::StackUnderflow {
            needed: 2,
            available: 1,
            ..
        }
    ));
    // underflow poisons before any materialization
    assert_eq!(h.fetcher.fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_operator_fails_immediately() {
    let h = harness(&[]);
    let tokens = vec![Token {
        kind: TokenKind::Operator(">explode".into()),
        span: crate::query::lexer::Span { start: 0, end: 8 },
    }];
    let err = h.engine.eval_tokens(&tokens).unwrap_err();
    assert!(matches!(err, EmoteError::UnknownOperator(s) if s == ">explode"));
}

#[test]
fn transform_failures_carry_the_sub_expression() {
    let h = harness(&[("Kappa", anim(4, 10, &[0])), ("Pog", anim(4, 20, &[0]))]);
    let err = h.engine.evaluate("Kappa,Pog>stackx").unwrap_err();
    match &err {
        EmoteError::Step { expr, .. } => assert_eq!(expr, "Kappa,Pog>stackx"),
        other => panic!("{other:?}"),
    }
    assert!(matches!(root(&err), EmoteError::DimensionMismatch { .. }));
}

#[test]
fn missing_source_propagates_not_found() {
    let h = harness(&[]);
    let err = h.engine.evaluate("Ghost>gray").unwrap_err();
    assert!(matches!(root(&err), EmoteError::NotFound(id) if id == "Ghost"));
    assert!(err.to_string().contains("Ghost>gray"));
}

#[test]
fn identical_binary_operands_are_materialized_once() {
    let h = harness(&[("Kappa", anim(2, 2, &[10, 20]))]);
    h.engine.evaluate("Kappa,Kappa>stacky").unwrap();
    assert_eq!(h.codec.decodes.load(Ordering::SeqCst), 1);
}

#[test]
fn chained_steps_reuse_intermediate_artifacts() {
    let h = harness(&[("Kappa", anim(3, 2, &[10, 20, 30]))]);
    let a = h.engine.evaluate("Kappa>revx>gray").unwrap();
    assert_eq!(a.stats.transforms_run, 2);

    let b = h.engine.evaluate("Kappa>revx>revy").unwrap();
    assert_eq!(b.stats.cache_hits, 1);
    assert_eq!(b.stats.transforms_run, 1);
    assert_ne!(a.fingerprint, b.fingerprint);
}

#[test]
fn stack_ops_count_as_steps() {
    let h = harness(&[("Kappa", anim(2, 2, &[10]))]);
    let out = h.engine.evaluate("Kappa>dup>over").unwrap();
    assert_eq!(out.stats.steps, 2);
    assert_eq!(out.stats.transforms_run, 1);
}

#[test]
fn catalog_exposes_every_operator() {
    let ops: Vec<_> = Engine::catalog().collect();
    assert_eq!(ops.len(), CATALOG.len());
    let scalet = ops.iter().find(|o| o.symbol == ">scalet").unwrap();
    assert_eq!(scalet.arity, Arity::Linear);
    let iscalet = ops.iter().find(|o| o.symbol == ">iscalet").unwrap();
    assert_eq!(iscalet.arity, Arity::Unary);
}

#[test]
fn lenient_mode_is_carried_into_evaluation() {
    let h = harness(&[("Kappa", anim(2, 2, &[10]))]);
    assert!(matches!(
        h.engine.evaluate("Kappa !>revx"),
        Err(EmoteError::Lex { .. })
    ));

    let engine = h.engine.with_lex_mode(LexMode::Lenient);
    assert!(engine.evaluate("Kappa !>revx").is_ok());
}

#[test]
fn timeline_overflow_is_an_invalid_argument() {
    let h = harness(&[("Kappa", anim(2, 2, &[10, 20]))]);
    for query in [
        "Kappa,99999999999999999999>scalet",
        "Kappa,300000000000000000>scalet>dup>stackt",
        "Kappa,200000000000000000>scalet>dup>stackt",
    ] {
        let err = h.engine.evaluate(query).unwrap_err();
        assert!(
            matches!(root(&err), EmoteError::InvalidArgument(_)),
            "{query}: {err:?}"
        );
    }
}

#[test]
fn artifacts_survive_an_artifact_format_change() {
    let storage = Arc::new(MemoryStorage::new());
    let fetcher = Arc::new(MapFetcher {
        sources: HashMap::from([(
            "Kappa".to_owned(),
            RawCodec.encode("Kappa", &anim(2, 2, &[10, 20])).unwrap(),
        )]),
        fetches: AtomicUsize::new(0),
    });
    let with_codec = |codec: Arc<dyn Codec>| {
        Engine::new(storage.clone(), fetcher.clone(), Arc::new(RawCodec), codec)
    };
    let gif = with_codec(Arc::new(ImageCodec));
    let raw = with_codec(Arc::new(RawCodec));

    let first = gif.evaluate("Kappa>revx").unwrap();
    let second = raw.evaluate("Kappa>revx>revy").unwrap();
    assert_eq!(second.stats.cache_hits, 1);
    assert_eq!(second.stats.transforms_run, 1);

    assert_eq!(raw.load_artifact(&first.fingerprint).unwrap().timestamps(), &[10, 20]);
    assert_eq!(gif.load_artifact(&second.fingerprint).unwrap().timestamps(), &[10, 20]);
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
}
