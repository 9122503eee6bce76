use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use emotemod::{
    Codec as _, Engine, EngineConfig, ImageCodec, LexMode, SourceFormat, TokenKind, decode_any,
};

#[derive(Parser, Debug)]
#[command(name = "emotemod", version, about = "Compose and transform animated emotes")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a query and print the result fingerprint.
    Eval(EvalArgs),
    /// Print canvas size and frame timing of an animation file.
    Dump(DumpArgs),
    /// List the operator catalog.
    Ops(OpsArgs),
    /// Print the token stream of a query.
    Tokens(TokensArgs),
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Query text, e.g. `Kappa,Pog>stackx`.
    query: String,

    /// Engine config JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Artifact store directory.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Directory of `<id>.<ext>` source emotes.
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Accepted source format.
    #[arg(long, value_enum)]
    source_format: Option<FormatChoice>,

    /// Skip characters that match no token instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Seed for `>shake`.
    #[arg(long)]
    seed: Option<u64>,

    /// Also export the result as an animated GIF.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print a JSON report instead of the bare fingerprint.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Animation file (GIF, WebP, PNG or EMOTERAW).
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct OpsArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct TokensArgs {
    query: String,

    #[arg(long)]
    lenient: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Webp,
    Gif,
    Png,
}

impl From<FormatChoice> for SourceFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Webp => SourceFormat::Webp,
            FormatChoice::Gif => SourceFormat::Gif,
            FormatChoice::Png => SourceFormat::Png,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Eval(args) => cmd_eval(args),
        Command::Dump(args) => cmd_dump(args),
        Command::Ops(args) => cmd_ops(args),
        Command::Tokens(args) => cmd_tokens(args),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn lex_mode(lenient: bool) -> LexMode {
    if lenient {
        LexMode::Lenient
    } else {
        LexMode::Strict
    }
}

fn load_config(args: &EvalArgs) -> anyhow::Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.store {
        cfg.store_dir = dir.clone();
    }
    if let Some(dir) = &args.sources {
        cfg.sources_dir = dir.clone();
    }
    if let Some(f) = args.source_format {
        cfg.source_format = f.into();
    }
    if args.lenient {
        cfg.lex_mode = LexMode::Lenient;
    }
    if args.seed.is_some() {
        cfg.shake_seed = args.seed;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let engine = Engine::from_config(&cfg)?;

    let eval = engine
        .evaluate(&args.query)
        .with_context(|| format!("evaluate '{}'", args.query))?;

    if let Some(out) = &args.out {
        let anim = engine.load_artifact(&eval.fingerprint)?;
        let bytes = ImageCodec.encode(&eval.fingerprint, &anim)?;
        write_file(out, &bytes)?;
        eprintln!("wrote {}", out.display());
    }

    if args.json {
        let report = serde_json::json!({
            "query": args.query,
            "fingerprint": eval.fingerprint,
            "stats": eval.stats,
            "out": args.out,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", eval.fingerprint);
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("read '{}'", args.file.display()))?;
    let id = args.file.to_string_lossy();
    let anim = decode_any(&id, &bytes)?;

    println!(
        "{}x{}, {} frame(s), {} ms",
        anim.canvas_width(),
        anim.canvas_height(),
        anim.frame_count(),
        anim.duration_ms()
    );
    for (i, (d, t)) in anim.durations().iter().zip(anim.timestamps()).enumerate() {
        println!("{i:>4}: {d:>6} ms  (ends at {t} ms)");
    }
    Ok(())
}

fn cmd_ops(args: OpsArgs) -> anyhow::Result<()> {
    let ops: Vec<_> = Engine::catalog().collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&ops)?);
        return Ok(());
    }
    for op in ops {
        let arity = serde_json::to_value(op.arity)?;
        println!(
            "{:<10} {:<9} {}",
            op.symbol,
            arity.as_str().unwrap_or_default(),
            op.summary
        );
    }
    Ok(())
}

fn cmd_tokens(args: TokensArgs) -> anyhow::Result<()> {
    let lexed = emotemod::lex(&args.query, lex_mode(args.lenient))?;
    for t in &lexed.tokens {
        let text = &args.query[t.span.start..t.span.end];
        let kind = match &t.kind {
            TokenKind::EmoteRef(_) => "emote",
            TokenKind::Number(_) => "number",
            TokenKind::Operator(_) => "operator",
            TokenKind::Separator => "separator",
        };
        println!("{:>3}..{:<3} {kind:<9} {text}", t.span.start, t.span.end);
    }
    for s in &lexed.skipped {
        println!(
            "{:>3}..{:<3} skipped   {:?}",
            s.start,
            s.end,
            &args.query[s.start..s.end]
        );
    }
    Ok(())
}
