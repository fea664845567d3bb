use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use penwright::GlyphStore as _;
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "penwright", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile text into a G-code program.
    Compile(CompileArgs),
    /// Render the compiled strokes as a PNG or SVG preview.
    Preview(PreviewArgs),
    /// Run only the content safeguard on a text.
    Check(CheckArgs),
    /// Describe a user's glyph library.
    Inspect(InspectArgs),
    /// Decode a G-code file and check its pen state sequence.
    Verify(VerifyArgs),
    /// Clean and normalize every sample of a library into another directory.
    Normalize(NormalizeArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Directory holding `<user>.json` glyph libraries.
    #[arg(long)]
    library_dir: PathBuf,

    /// Library owner.
    #[arg(long)]
    user: String,

    /// Text to write.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the text from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Job config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Declare the request a signature (always refused).
    #[arg(long, default_value_t = false)]
    signature: bool,
}

#[derive(Args, Debug)]
struct CompileArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output G-code path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the command stream as JSON next to the output.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output path; `.svg` writes vector output, anything else PNG.
    #[arg(long)]
    out: PathBuf,

    /// Raster resolution.
    #[arg(long, default_value_t = 4.0)]
    px_per_mm: f64,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Text to check.
    #[arg(long)]
    text: String,

    /// Job config JSON for the safeguard settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Add this library's signature labels to the deny-list.
    #[arg(long, requires = "user")]
    library_dir: Option<PathBuf>,

    /// Library owner.
    #[arg(long)]
    user: Option<String>,

    /// Declare the request a signature.
    #[arg(long, default_value_t = false)]
    signature: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Directory holding `<user>.json` glyph libraries.
    #[arg(long)]
    library_dir: PathBuf,

    /// Library owner.
    #[arg(long)]
    user: String,

    /// Report which characters of this text have no sample.
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Input G-code.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Job config JSON for the dialect.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Source library directory.
    #[arg(long)]
    library_dir: PathBuf,

    /// Library owner.
    #[arg(long)]
    user: String,

    /// Destination library directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Target glyph height in sample units.
    #[arg(long, default_value_t = 100.0)]
    height: f64,

    /// Chaikin smoothing passes.
    #[arg(long, default_value_t = 0)]
    smooth: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Check(args) => cmd_check(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Verify(args) => cmd_verify(args),
        Command::Normalize(args) => cmd_normalize(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<penwright::JobConfig> {
    Ok(match path {
        Some(p) => penwright::JobConfig::from_path(p)?,
        None => penwright::JobConfig::default(),
    })
}

fn prepare(args: &JobArgs) -> anyhow::Result<(penwright::CompileRequest, penwright::JobConfig)> {
    let text = match (&args.text, &args.text_file) {
        (Some(t), _) => t.clone(),
        (None, Some(p)) => std::fs::read_to_string(p)
            .with_context(|| format!("read text file '{}'", p.display()))?,
        (None, None) => anyhow::bail!("one of --text or --text-file is required"),
    };
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let intent = if args.signature {
        penwright::RequestIntent::Signature
    } else {
        penwright::RequestIntent::Text
    };
    let request = penwright::CompileRequest::new(args.user.clone(), text).with_intent(intent);
    Ok((request, config))
}

fn compile(args: &JobArgs) -> anyhow::Result<(penwright::CompiledJob, penwright::JobConfig)> {
    let (request, config) = prepare(args)?;
    tracing::info!(user = %request.user_id, chars = request.text.chars().count(), "compiling");
    let store = penwright::FsGlyphStore::new(&args.library_dir);
    let job = penwright::compile_job(&request, &store, &config)?;
    for s in &job.substitutions {
        match s.placeholder {
            Some(p) => eprintln!("note: {:?} at {} drawn as {:?}", s.requested, s.position, p),
            None => eprintln!("note: {:?} at {} skipped", s.requested, s.position),
        }
    }
    Ok((job, config))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let (job, config) = compile(&args.job)?;
    let gcode = job.to_gcode(&config.gcode)?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, gcode.as_bytes())
        .with_context(|| format!("write gcode '{}'", args.out.display()))?;

    if args.json {
        let json_path = args.out.with_extension("json");
        let json = serde_json::to_vec_pretty(&job.commands).context("serialize commands")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("write commands '{}'", json_path.display()))?;
        eprintln!("wrote {}", json_path.display());
    }

    let s = &job.stats;
    eprintln!(
        "glyphs: {}  strokes: {}  lines: {}  commands: {}",
        s.glyphs, s.strokes, s.lines, s.commands
    );
    eprintln!(
        "draw: {:.1} mm  travel: {:.1} mm  estimate: {:.0} s",
        s.draw_length_mm, s.travel_length_mm, s.estimated_seconds
    );
    eprintln!("wrote {} (sha256 {})", args.out.display(), sha256_hex(gcode.as_bytes()));
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let (job, config) = compile(&args.job)?;
    ensure_parent(&args.out)?;

    let is_svg = args
        .out
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let svg = penwright::render_svg(&job.strokes, &config.machine);
        std::fs::write(&args.out, svg)
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    } else {
        let img = penwright::render_png(&job.strokes, &config.machine, args.px_per_mm)?;
        img.save_with_format(&args.out, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", args.out.display()))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut gate = penwright::ContentSafeguard::new(&config.safeguard);
    if let (Some(dir), Some(user)) = (&args.library_dir, &args.user) {
        let library = penwright::FsGlyphStore::new(dir).load(user)?;
        gate = gate.with_labels(library.signatures());
    }
    let intent = if args.signature {
        penwright::RequestIntent::Signature
    } else {
        penwright::RequestIntent::Text
    };
    match gate.check(&args.text, intent) {
        penwright::Verdict::Allow => {
            println!("allow");
            Ok(())
        }
        penwright::Verdict::Reject(reason) => {
            println!("reject: {reason}");
            Err(penwright::PenwrightError::content_rejected(reason).into())
        }
    }
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let library = penwright::FsGlyphStore::new(&args.library_dir).load(&args.user)?;

    println!("user:       {}", library.user());
    println!("characters: {}", library.characters().count());
    println!("samples:    {}", library.sample_count());
    println!("signatures: {}", library.signatures().len());
    for (c, samples) in library.iter() {
        let strokes: usize = samples.iter().map(|s| s.strokes().len()).sum();
        let h = samples.iter().map(|s| s.height()).fold(0.0_f64, f64::max);
        println!("  {c:?}: {} variant(s), {strokes} stroke(s), max height {h:.1}", samples.len());
    }

    if let Some(text) = &args.text {
        let missing = library.missing_characters(text);
        if missing.is_empty() {
            println!("text is fully covered");
        } else {
            let list: String = missing.iter().map(|c| format!("{c:?} ")).collect();
            println!("missing: {}", list.trim_end());
        }
    }
    Ok(())
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read gcode '{}'", args.in_path.display()))?;
    let commands = penwright::decode_gcode(&text, &config.gcode)?;
    penwright::validate_pen_states(&commands)?;

    let downs = commands
        .iter()
        .filter(|c| **c == penwright::MachineCommand::PenDown)
        .count();
    println!("ok: {} commands, {downs} strokes", commands.len());
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let source = penwright::FsGlyphStore::new(&args.library_dir).load(&args.user)?;
    let clean = penwright::CleanOpts {
        chaikin_iterations: args.smooth,
        ..penwright::CleanOpts::default()
    };
    let norm = penwright::NormalizeOpts {
        target_height: args.height,
    };

    let mut out = penwright::GlyphLibrary::new(source.user());
    for (_, samples) in source.iter() {
        for sample in samples {
            let cleaned = penwright::clean_sample(sample, &clean)?;
            out.insert(penwright::normalize_sample(&cleaned, &norm)?);
        }
    }
    for label in source.signatures() {
        out.add_signature(label.clone());
    }

    let path = penwright::FsGlyphStore::new(&args.out_dir).save(&out)?;
    eprintln!("wrote {} ({} samples)", path.display(), out.sample_count());
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
