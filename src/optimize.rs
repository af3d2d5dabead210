//! Pipeline entry points.
//!
//! ## Why a synchronous core?
//!
//! Every stage is CPU-bound and finishes in milliseconds, so
//! [`run_pipeline`] is a plain function. [`optimize`] moves it onto tokio's
//! blocking pool for callers that live on an async runtime and must not stall
//! their executor while archives and PDFs are assembled.
//!
//! ```text
//! raw text ─▶ Parse ─▶ Normalize ─▶ Inject ─▶ RenderText ─▶ BuildDocx ─▶ BuildPdf ─▶ Score
//! ```

use crate::config::OptimizerConfig;
use crate::error::{AtsError, ExportError};
use crate::keywords::{self, KeywordGroups};
use crate::model::{Document, Keyword};
use crate::output::{suggested_filename, Artifact, ExportFormat, ExportReport, MatchReport, PipelineOutput};
use crate::pipeline::{clean, docx, inject, parse, pdf, text, validate};
use crate::progress::{PipelineProgressCallback, Stage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the full pipeline on raw résumé text.
///
/// # Errors
/// - [`AtsError::EmptyInput`] when the text is blank; no later stage runs.
/// - [`AtsError::ArchiveOverflow`] / [`AtsError::PdfWrite`] when packaging fails.
pub fn run_pipeline(
    raw: &str,
    groups: &KeywordGroups,
    config: &OptimizerConfig,
) -> Result<PipelineOutput, AtsError> {
    let total_start = Instant::now();
    let stages = Stages::new(config.progress_callback.as_deref());
    info!("Starting pipeline: {} chars of résumé text", raw.len());

    // ── Step 1: Parse ────────────────────────────────────────────────────
    let parsed = stages.run(Stage::Parse, || {
        parse::parse_with(&clean::clean_input(raw), &config.parse).ok_or(AtsError::EmptyInput)
    })?;

    // ── Step 2: Normalize keywords ───────────────────────────────────────
    let keywords = stages.run(Stage::Normalize, || Ok(keywords::normalize(groups)))?;

    // ── Step 3: Inject ───────────────────────────────────────────────────
    let (document, stats) = stages.run(Stage::Inject, || {
        let mut rng = config.rng();
        Ok(inject::inject(&parsed, &keywords, &config.policy, &mut rng))
    })?;

    // ── Step 4: Render ───────────────────────────────────────────────────
    let rendered = stages.run(Stage::RenderText, || Ok(text::render(&document)))?;
    let docx = stages.run(Stage::BuildDocx, || docx::build(&document))?;
    let pdf = stages.run(Stage::BuildPdf, || pdf::build(&document))?;

    // ── Step 5: Score ────────────────────────────────────────────────────
    let (match_report, original_score, validation) = stages.run(Stage::Score, || {
        let original = match_score(&text::render(&parsed), &keywords).score;
        Ok((match_score(&rendered, &keywords), original, validate::validate(&rendered)))
    })?;

    let timing_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    info!(
        "Pipeline complete: score {} → {}, {} injection(s), valid={}, {:.1}ms",
        original_score, match_report.score, stats.total_injections, validation.is_valid, timing_ms
    );

    Ok(PipelineOutput {
        document,
        text: rendered,
        docx,
        pdf,
        stats,
        match_report,
        original_score,
        validation,
        timing_ms,
    })
}

/// Async wrapper: runs [`run_pipeline`] on tokio's blocking pool.
pub async fn optimize(
    raw: impl Into<String>,
    groups: &KeywordGroups,
    config: &OptimizerConfig,
) -> Result<PipelineOutput, AtsError> {
    let raw = raw.into();
    let groups = groups.clone();
    let config = config.clone();
    tokio::task::spawn_blocking(move || run_pipeline(&raw, &groups, &config))
        .await
        .map_err(|e| AtsError::Internal(format!("Pipeline task failed: {}", e)))?
}

/// Run the pipeline and write `<stem>.txt`, `<stem>.docx` and `<stem>.pdf`
/// into `dir`, creating it if needed.
///
/// Each file is written to a temporary sibling first and then renamed, so a
/// reader never observes a partial artifact.
pub async fn optimize_to_dir(
    raw: impl Into<String>,
    groups: &KeywordGroups,
    dir: impl AsRef<Path>,
    stem: &str,
    config: &OptimizerConfig,
) -> Result<PipelineOutput, AtsError> {
    let output = optimize(raw, groups, config).await?;
    let dir = dir.as_ref();
    for format in ExportFormat::ALL {
        let path = dir.join(format!("{stem}.{}", format.extension()));
        write_atomic(&path, output.bytes(format)).await?;
    }
    info!("Wrote {} artifacts to {}", ExportFormat::ALL.len(), dir.display());
    Ok(output)
}

/// Write `bytes` to `path` through a temporary file and a rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AtsError> {
    let fail = |source| AtsError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, bytes).await.map_err(fail)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Build the artifact for one format from an already injected document.
pub fn export(document: &Document, format: ExportFormat) -> Result<Vec<u8>, AtsError> {
    match format {
        ExportFormat::Text => Ok(text::render(document).into_bytes()),
        ExportFormat::Docx => docx::build(document),
        ExportFormat::Pdf => pdf::build(document),
    }
}

/// Build several formats in order, stopping at the first failure.
///
/// The report keeps every artifact produced before the failure.
pub fn export_formats(document: &Document, formats: &[ExportFormat]) -> ExportReport {
    let mut report = ExportReport::default();
    for &format in formats {
        match export(document, format) {
            Ok(bytes) => report.artifacts.push(Artifact {
                format,
                file_name: suggested_filename(document, format),
                bytes,
            }),
            Err(e) => {
                warn!("Export to {} failed: {}", format, e);
                report.failure = Some(ExportError {
                    format: format.extension().to_string(),
                    detail: e.to_string(),
                });
                break;
            }
        }
    }
    report
}

/// Keyword coverage of `text`: a keyword matches when it occurs as a
/// case-insensitive substring.
pub fn match_score(text: &str, keywords: &[Keyword]) -> MatchReport {
    if keywords.is_empty() {
        return MatchReport::default();
    }
    let haystack = text.to_lowercase();
    let (matched, missing): (Vec<&Keyword>, Vec<&Keyword>) = keywords
        .iter()
        .partition(|k| haystack.contains(&k.text.to_lowercase()));

    let score = (100.0 * matched.len() as f64 / keywords.len() as f64).round() as u32;
    MatchReport {
        score,
        matched: matched.into_iter().map(|k| k.text.clone()).collect(),
        missing: missing.into_iter().map(|k| k.text.clone()).collect(),
    }
}

// ── Stage runner ─────────────────────────────────────────────────────────

/// Wraps each stage with timing, debug logging and progress callbacks.
struct Stages<'a> {
    callback: Option<&'a dyn PipelineProgressCallback>,
}

impl<'a> Stages<'a> {
    fn new(callback: Option<&'a dyn PipelineProgressCallback>) -> Self {
        Self { callback }
    }

    fn run<T>(&self, stage: Stage, f: impl FnOnce() -> Result<T, AtsError>) -> Result<T, AtsError> {
        if let Some(cb) = self.callback {
            cb.on_stage_start(stage);
        }
        let start = Instant::now();
        let result = f();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => {
                debug!("Stage '{}' done in {:.2}ms", stage, elapsed_ms);
                if let Some(cb) = self.callback {
                    cb.on_stage_complete(stage, elapsed_ms);
                }
            }
            Err(e) => {
                warn!("Stage '{}' failed: {}", stage, e);
                if let Some(cb) = self.callback {
                    cb.on_stage_error(stage, &e.to_string());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Target};
    use std::sync::{Arc, Mutex};

    const RESUME: &str = "JOHN SMITH\njohn@x.com\nEXPERIENCE\nAcme Co | Engineer | 2020-Present\n- Built systems.\nSKILLS\nPython, Go\nEDUCATION\nBSc CS";

    fn kw(text: &str) -> Keyword {
        Keyword::new(text, Priority::High, [Target::Experience, Target::Skills])
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for Recorder {
        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: f64) {
            self.events.lock().unwrap().push(stage.to_string());
        }

        fn on_stage_error(&self, stage: Stage, error: &str) {
            self.events.lock().unwrap().push(format!("{stage} failed: {error}"));
        }
    }

    #[test]
    fn match_score_bounds() {
        let kws = [kw("Rust"), kw("Kafka")];
        assert_eq!(match_score("nothing here", &kws).score, 0);
        assert_eq!(match_score("RUST and kafka", &kws).score, 100);

        let half = match_score("rust only", &kws);
        assert_eq!(half.score, 50);
        assert_eq!(half.matched, ["Rust"]);
        assert_eq!(half.missing, ["Kafka"]);

        assert_eq!(match_score("anything", &[]), MatchReport::default());
    }

    #[test]
    fn match_score_rounds() {
        let kws = [kw("a1"), kw("b2"), kw("c3")];
        assert_eq!(match_score("a1 b2", &kws).score, 67);
        assert_eq!(match_score("a1", &kws).score, 33);
    }

    #[test]
    fn empty_input_fails_fast() {
        let recorder = Arc::new(Recorder::default());
        let config = OptimizerConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        let err = run_pipeline("  \n ", &KeywordGroups::default(), &config).unwrap_err();
        assert!(matches!(err, AtsError::EmptyInput));

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1, "no stage after parse may run: {events:?}");
        assert!(events[0].starts_with("parse failed"));
    }

    #[test]
    fn stages_report_in_order() {
        let recorder = Arc::new(Recorder::default());
        let config = OptimizerConfig::builder()
            .seed(1)
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        run_pipeline(RESUME, &KeywordGroups::default(), &config).unwrap();
        assert_eq!(
            *recorder.events.lock().unwrap(),
            [
                "parse",
                "normalize keywords",
                "inject keywords",
                "render text",
                "build docx",
                "build pdf",
                "score"
            ]
        );
    }

    #[test]
    fn pipeline_improves_score() {
        let groups = KeywordGroups {
            high: vec!["Kubernetes".into(), "Terraform".into()],
            ..Default::default()
        };
        let config = OptimizerConfig::builder().seed(3).build().unwrap();
        let out = run_pipeline(RESUME, &groups, &config).unwrap();
        assert_eq!(out.original_score, 0);
        assert_eq!(out.match_report.score, 100);
        assert_eq!(out.score_delta(), 100);
        assert!(out.validation.is_valid, "{:?}", out.validation.issues);
        assert!(out.docx.starts_with(b"PK"));
        assert!(out.pdf.starts_with(b"%PDF-1.4"));
        assert_eq!(out.bytes(ExportFormat::Text), out.text.as_bytes());
    }

    #[test]
    fn export_formats_in_order() {
        let doc = parse::parse(RESUME).unwrap();
        let report = export_formats(&doc, &[ExportFormat::Pdf, ExportFormat::Text]);
        assert!(report.is_complete());
        assert_eq!(report.formats(), [ExportFormat::Pdf, ExportFormat::Text]);
        assert_eq!(report.artifacts[0].file_name, "JOHN_SMITH_Resume.pdf");
        assert_eq!(report.artifacts[1].bytes, text::render(&doc).into_bytes());
    }

    #[test]
    fn tmp_sibling_keeps_directory() {
        assert_eq!(
            tmp_sibling(Path::new("out/resume.pdf")),
            PathBuf::from("out/resume.pdf.tmp")
        );
    }
}
