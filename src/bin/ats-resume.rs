//! CLI binary for resume-ats.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `OptimizerConfig` / `KeywordGroups` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use resume_ats::{
    optimize, suggested_stem, validate, write_atomic, ExportFormat, KeywordGroups,
    OptimizerConfig, PipelineOutput, PipelineProgressCallback, ProgressCallback, Stage,
    ValidationReport,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per finished stage to stderr.
struct CliProgressCallback;

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: f64) {
        eprintln!(
            "  {} {:<20} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{elapsed_ms:.1}ms"))
        );
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        eprintln!("  {} {:<20} {}", red("✗"), stage.to_string(), red(error));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Optimise and print the plain-text résumé
  ats-resume resume.txt --high Kubernetes,Terraform --medium Jira

  # Keyword buckets from a JSON file, all formats into ./out
  ats-resume resume.txt --keywords keywords.json -o out

  # Only DOCX and PDF, fixed file stem, reproducible phrasing
  ats-resume resume.txt --keywords kw.json -o out --stem jane --formats docx,pdf --seed 7

  # Check an existing résumé for ATS problems without changing it
  ats-resume --validate-only resume.txt

KEYWORD FILE:
  {"highROI": ["Kubernetes"], "mediumROI": ["Jira"], "lowROI": ["Agile"], "unclassified": []}
  Bucket names "high", "medium" and "low" are accepted as well.

ENVIRONMENT VARIABLES:
  ATS_RESUME_KEYWORDS     Keyword JSON file
  ATS_RESUME_OUTPUT_DIR   Output directory
  ATS_RESUME_LOCATION     Location override
  ATS_RESUME_LOCATION_BEFORE_HEADING
                          Ignore location-like lines below the first heading
  ATS_RESUME_SEED         Random seed for phrase selection
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Tune a plain-text résumé for applicant tracking systems.
#[derive(Parser, Debug)]
#[command(
    name = "ats-resume",
    version,
    about = "Tune a plain-text résumé for applicant tracking systems",
    long_about = "Parse a plain-text résumé, weave prioritised keywords into its skills and \
experience bullets, and export ATS-friendly TXT, DOCX and PDF files.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Plain-text résumé file.
    input: PathBuf,

    /// JSON file with keyword buckets.
    #[arg(short, long, env = "ATS_RESUME_KEYWORDS")]
    keywords: Option<PathBuf>,

    /// High-priority keywords (comma-separated).
    #[arg(long, value_delimiter = ',')]
    high: Vec<String>,

    /// Medium-priority keywords (comma-separated).
    #[arg(long, value_delimiter = ',')]
    medium: Vec<String>,

    /// Low-priority keywords (comma-separated).
    #[arg(long, value_delimiter = ',')]
    low: Vec<String>,

    /// Replace the detected location.
    #[arg(long, env = "ATS_RESUME_LOCATION")]
    location: Option<String>,

    /// Only take the location from header lines above the first section heading.
    #[arg(long, env = "ATS_RESUME_LOCATION_BEFORE_HEADING")]
    location_before_heading: bool,

    /// Seed for phrase selection; omit for varied phrasing.
    #[arg(long, env = "ATS_RESUME_SEED")]
    seed: Option<u64>,

    /// Maximum bullet injections.
    #[arg(long, env = "ATS_RESUME_MAX_INJECTIONS", default_value_t = 15)]
    max_injections: usize,

    /// Maximum high-priority keywords added to skills.
    #[arg(long, env = "ATS_RESUME_MAX_SKILLS", default_value_t = 5)]
    max_skills: usize,

    /// Write artifacts into this directory instead of printing text to stdout.
    #[arg(short, long = "output-dir", env = "ATS_RESUME_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// File name stem for artifacts (default: <Name>_Resume).
    #[arg(long)]
    stem: Option<String>,

    /// Formats written with --output-dir.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [FormatArg::Txt, FormatArg::Docx, FormatArg::Pdf]
    )]
    formats: Vec<FormatArg>,

    /// Print the full result as JSON (binary artifacts base64-encoded).
    #[arg(long, env = "ATS_RESUME_JSON")]
    json: bool,

    /// Only run the ATS checks on the input text.
    #[arg(long)]
    validate_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ATS_RESUME_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ATS_RESUME_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Txt,
    Docx,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Txt => ExportFormat::Text,
            FormatArg::Docx => ExportFormat::Docx,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let raw = tokio::fs::read_to_string(&cli.input)
        .await
        .with_context(|| format!("Failed to read résumé from {:?}", cli.input))?;

    // ── Validate-only mode ───────────────────────────────────────────────
    if cli.validate_only {
        let report = validate(&raw);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else if !cli.quiet {
            print_validation(&report);
        }
        if !report.is_valid {
            std::process::exit(1);
        }
        return Ok(());
    }

    // ── Build inputs ─────────────────────────────────────────────────────
    let groups = load_keywords(&cli).await?;
    let show_progress = !cli.quiet && !cli.json;
    let progress: Option<ProgressCallback> = if show_progress {
        Some(Arc::new(CliProgressCallback) as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress)?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    let output = optimize(raw, &groups, &config)
        .await
        .context("Optimisation failed")?;

    let mut written = Vec::new();
    if let Some(ref dir) = cli.output_dir {
        let stem = cli
            .stem
            .clone()
            .unwrap_or_else(|| suggested_stem(&output.document));
        for &format in &cli.formats {
            let format = ExportFormat::from(format);
            let path = dir.join(format!("{stem}.{}", format.extension()));
            write_atomic(&path, output.bytes(format))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.output_dir.is_none() {
        io::stdout()
            .lock()
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&output, &written);
    }
    Ok(())
}

/// Merge the keyword file (if any) with the inline bucket flags.
async fn load_keywords(cli: &Cli) -> Result<KeywordGroups> {
    let from_file = match cli.keywords {
        Some(ref path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read keywords from {:?}", path))?;
            KeywordGroups::from_json(&json)
                .with_context(|| format!("Invalid keyword file {:?}", path))?
        }
        None => KeywordGroups::default(),
    };
    let inline = KeywordGroups {
        high: cli.high.clone(),
        medium: cli.medium.clone(),
        low: cli.low.clone(),
        unclassified: Vec::new(),
    };
    let groups = from_file.merge(inline);
    if groups.is_empty() {
        tracing::warn!("No keywords given; the résumé is only reformatted");
    }
    Ok(groups)
}

/// Map CLI args to `OptimizerConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<OptimizerConfig> {
    let mut builder = OptimizerConfig::builder()
        .max_total_injections(cli.max_injections)
        .max_high_prio_skills(cli.max_skills)
        .location_stops_at_heading(cli.location_before_heading);

    // Keep the synthetic-bullet bound valid under a small injection budget.
    let synthetic = OptimizerConfig::default()
        .policy
        .max_synthetic_bullets
        .min(cli.max_injections);
    builder = builder.max_synthetic_bullets(synthetic);

    if let Some(ref location) = cli.location {
        builder = builder.location_override(location.clone());
    }
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn print_validation(report: &ValidationReport) {
    let mark = |ok: bool| if ok { green("✓") } else { red("✗") };
    eprintln!(
        "{} ATS check {}",
        cyan("◆"),
        if report.is_valid {
            green("passed")
        } else {
            red("failed")
        }
    );
    eprintln!("  {} no keyword stuffing", mark(report.checks.no_keyword_stuffing));
    eprintln!("  {} comma-separated skills", mark(report.checks.skills_comma_formatted));
    eprintln!("  {} standard sections", mark(report.checks.standard_sections));
    for issue in &report.issues {
        eprintln!("    {}", dim(issue));
    }
}

fn print_summary(output: &PipelineOutput, written: &[PathBuf]) {
    let stats = &output.stats;
    eprintln!(
        "{} match score {} → {}  {}",
        cyan("◆"),
        output.original_score,
        bold(&output.match_report.score.to_string()),
        dim(&format!("({:+})", output.score_delta()))
    );
    eprintln!(
        "   {} skills added, {} bullets modified, {} new bullets, {} injections",
        stats.skills_added, stats.bullets_modified, stats.new_bullets_created, stats.total_injections
    );
    if !output.match_report.missing.is_empty() {
        eprintln!(
            "   missing: {}",
            dim(&output.match_report.missing.join(", "))
        );
    }
    print_validation(&output.validation);
    for path in written {
        eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
    }
    eprintln!("   {}", dim(&format!("{:.1}ms total", output.timing_ms)));
}
