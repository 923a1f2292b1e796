//! CLI binary for ats-resume-expert.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `EvaluatorConfig`, runs one action and prints the result.

use anyhow::{Context, Result};
use ats_resume_expert::{
    load_document, Action, AtsError, EvaluationOutcome, Evaluator, EvaluatorConfig, MatchVerdict,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Strengths and weaknesses against a job description
  ats-expert evaluate --resume cv.pdf --job "Senior Data Scientist, Spark, MLOps"

  # ATS match % with accept/reject verdict, job description from a file
  ats-expert match --resume cv.pdf --job-file jd.txt

  # Job description from stdin
  pbpaste | ats-expert format --resume cv.pdf --job -

  # Resume from a URL, JSON output
  ats-expert projects --resume https://example.com/cv.pdf --job-file jd.txt --json

  # Another provider through edgequake-llm
  ats-expert match --provider openai --model gpt-4.1-mini --resume cv.pdf --job-file jd.txt

ACTIONS:
  evaluate   Resume evaluation: strengths and weaknesses
  match      ATS match percentage; ≥ 80% is accepted
  format     Formatting, layout and structure suggestions
  projects   Better project ideas for the role

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY     Gemini API key (required unless --provider is set)
  ATS_MODEL          Override model ID (default: gemini-1.5-flash)
  ATS_PROVIDER       Use an edgequake-llm provider (openai, anthropic, ollama, …)
  GEMINI_BASE_URL    Override the Gemini API root
  PDFIUM_LIB_PATH    Directory containing libpdfium
  RUST_LOG           Log filter (overrides -v / -q)

A .env file in the working directory is loaded at startup.
"#;

/// Resume feedback from Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "ats-expert",
    version,
    about = "Get expert feedback on your resume: evaluation, ATS match %, format and project suggestions",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Action to run: evaluate, match, format, projects.
    #[arg(value_enum)]
    action: ActionArg,

    /// Resume PDF: local path or HTTP/HTTPS URL.
    #[arg(short, long, env = "ATS_RESUME")]
    resume: Option<String>,

    /// Job description text; `-` reads it from stdin.
    #[arg(short, long, conflicts_with = "job_file")]
    job: Option<String>,

    /// File containing the job description.
    #[arg(long)]
    job_file: Option<PathBuf>,

    /// Model ID (default: gemini-1.5-flash).
    #[arg(long, env = "ATS_MODEL")]
    model: Option<String>,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "ATS_PROVIDER")]
    provider: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini API root (default: https://generativelanguage.googleapis.com).
    #[arg(long, env = "GEMINI_BASE_URL")]
    gemini_base_url: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// JPEG quality of the page preview (1–100).
    #[arg(long, env = "ATS_JPEG_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Longest edge of the rendered page in pixels.
    #[arg(long, env = "ATS_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// PDF user password for encrypted resumes.
    #[arg(long, env = "ATS_PASSWORD")]
    password: Option<String>,

    /// Model call timeout in seconds (default: transport default).
    #[arg(long, env = "ATS_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "ATS_TEMPERATURE")]
    temperature: Option<f32>,

    /// HTTP download timeout in seconds for URL resumes.
    #[arg(long, env = "ATS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output the structured outcome as JSON.
    #[arg(long, env = "ATS_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "ATS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ATS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "ATS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    Evaluate,
    Match,
    Format,
    Projects,
}

impl From<ActionArg> for Action {
    fn from(v: ActionArg) -> Self {
        match v {
            ActionArg::Evaluate => Action::Evaluate,
            ActionArg::Match => Action::Match,
            ActionArg::Format => Action::Format,
            ActionArg::Projects => Action::Projects,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

async fn run(cli: Cli, show_progress: bool) -> Result<()> {
    // ── Build config & backend (fails fast on missing credentials) ───────
    let config = build_config(&cli)?;
    let evaluator = Evaluator::from_config(config).context("Startup configuration error")?;
    let action: Action = cli.action.into();

    // ── Inputs ───────────────────────────────────────────────────────────
    let job_description = read_job_description(&cli)?;
    let document = match cli.resume.as_deref() {
        Some(input) => Some(
            load_document(input, cli.download_timeout)
                .await
                .with_context(|| format!("Failed to load resume '{input}'"))?,
        ),
        None => None,
    };

    if let Some(ref doc) = document {
        if !cli.quiet && !cli.json {
            eprintln!("{} Resume loaded: {}", green("✔"), doc.name());
        }
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let spinner = show_progress.then(|| spinner(action.progress_message()));
    let result = evaluator
        .run(action, document.as_ref(), &job_description)
        .await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let outcome = result?;

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?;
        println!("{json}");
    } else {
        print_outcome(&outcome).context("Failed to write to stdout")?;
        if !cli.quiet {
            print_stats(&outcome);
        }
    }

    Ok(())
}

/// Map CLI args to `EvaluatorConfig`.
fn build_config(cli: &Cli) -> Result<EvaluatorConfig> {
    let mut builder = EvaluatorConfig::builder()
        .jpeg_quality(cli.jpeg_quality)
        .max_rendered_pixels(cli.max_pixels);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(ref url) = cli.gemini_base_url {
        builder = builder.gemini_base_url(url.clone());
    }
    if let Some(ref dir) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

/// `--job`, `--job -` (stdin), `--job-file`, or empty.
fn read_job_description(cli: &Cli) -> Result<String> {
    if let Some(ref path) = cli.job_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job description from {:?}", path));
    }
    match cli.job.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read job description from stdin")?;
            Ok(buf)
        }
        Some(text) => Ok(text.to_string()),
        None => Ok(String::new()),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_outcome(outcome: &EvaluationOutcome) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}\n", bold(&outcome.heading))?;
    handle.write_all(outcome.response.as_bytes())?;
    if !outcome.response.ends_with('\n') {
        handle.write_all(b"\n")?;
    }

    if let Some(verdict) = outcome.verdict {
        let line = match verdict {
            MatchVerdict::Accepted { .. } => green(&format!("✅ {}", verdict.message())),
            MatchVerdict::Rejected { .. } => red(&format!("❌ {}", verdict.message())),
            MatchVerdict::Indeterminate => yellow(&format!("⚠ {}", verdict.message())),
        };
        writeln!(handle, "\n{line}")?;
    }
    Ok(())
}

fn print_stats(outcome: &EvaluationOutcome) {
    let s = &outcome.stats;
    let tokens = match (s.input_tokens, s.output_tokens) {
        (Some(i), Some(o)) => format!("  {i} tokens in / {o} tokens out"),
        _ => String::new(),
    };
    eprintln!(
        "{}",
        dim(&format!(
            "{}  page 1 {}x{} ({} KB)  render {}ms  model {}ms{}",
            outcome.model,
            s.preview_width,
            s.preview_height,
            s.preview_bytes / 1024,
            s.render_duration_ms,
            s.model_duration_ms,
            tokens
        ))
    );
}

/// Print `err` and pick the exit code: 2 for input the user can fix, else 1.
fn report_error(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<AtsError>() {
        Some(AtsError::MissingInput) => {
            eprintln!("{} {}", yellow("⚠"), yellow(&AtsError::MissingInput.to_string()));
            ExitCode::from(2)
        }
        Some(e) if e.is_user_correctable() => {
            eprintln!("{} {:#}", yellow("⚠"), err);
            ExitCode::from(2)
        }
        _ => {
            eprintln!("{} {:#}", red("✘"), err);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ats-expert").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn endpoint_and_pdfium_flags_reach_config() {
        let cli = parse(&[
            "match",
            "--api-key",
            "k",
            "--gemini-base-url",
            "http://localhost:9000/",
            "--pdfium-lib-path",
            "/opt/pdfium/lib",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.gemini_base_url, "http://localhost:9000");
        assert_eq!(config.pdfium_lib_path, Some(PathBuf::from("/opt/pdfium/lib")));
    }

    #[test]
    fn bad_base_url_is_config_error() {
        let cli = parse(&["evaluate", "--gemini-base-url", "ftp://nope"]);
        let err = build_config(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AtsError>(),
            Some(AtsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn job_and_job_file_conflict() {
        let res = Cli::try_parse_from([
            "ats-expert",
            "format",
            "--job",
            "text",
            "--job-file",
            "jd.txt",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn jpeg_quality_is_range_checked() {
        assert!(Cli::try_parse_from(["ats-expert", "match", "--jpeg-quality", "0"]).is_err());
        assert_eq!(parse(&["match", "--jpeg-quality", "60"]).jpeg_quality, 60);
    }
}
