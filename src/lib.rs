//! # resume-ats
//!
//! Tune a plain-text résumé for applicant tracking systems (ATS) and export
//! it as text, DOCX and PDF.
//!
//! ## Why this crate?
//!
//! ATS software scores a résumé by the keywords it finds and often chokes on
//! anything but simple, single-column documents. This crate parses free-form
//! résumé text into a structured [`Document`], weaves prioritised keywords
//! into the skills list and experience bullets (within a hard budget so the
//! result does not read as keyword stuffing), and renders ATS-friendly
//! artifacts. The DOCX and PDF writers are self-contained byte builders with
//! no native dependencies.
//!
//! ## Pipeline Overview
//!
//! ```text
//! résumé text
//!  │
//!  ├─ 1. Parse      heuristics → Document (name, contact, roles, skills, …)
//!  ├─ 2. Normalize  keyword buckets → ordered Keyword list
//!  ├─ 3. Inject     skills + bullet phrases on a cloned Document
//!  ├─ 4. Render     plain text, DOCX (stored ZIP), PDF (single page)
//!  └─ 5. Score      keyword match before/after + ATS validation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use resume_ats::{run_pipeline, KeywordGroups, OptimizerConfig};
//!
//! let resume = "JANE DOE\njane@x.com\nEXPERIENCE\nAcme | Engineer | 2021 - Present\n\
//!               - Shipped the billing service.\nSKILLS\nRust, SQL\nEDUCATION\nBSc CS";
//! let groups = KeywordGroups::from_json(r#"{"highROI": ["Kubernetes", "Terraform"]}"#)?;
//! let config = OptimizerConfig::builder().seed(42).build()?;
//!
//! let output = run_pipeline(resume, &groups, &config)?;
//! assert!(output.match_report.score > output.original_score);
//! assert!(output.pdf.starts_with(b"%PDF"));
//! # Ok::<(), resume_ats::AtsError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ats-resume` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! resume-ats = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod codec;
pub mod config;
pub mod error;
pub mod keywords;
pub mod model;
pub mod optimize;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{InjectionPolicy, OptimizerConfig, OptimizerConfigBuilder, ParseOptions};
pub use error::{AtsError, ExportError};
pub use keywords::{normalize, KeywordGroups};
pub use model::{
    Document, EducationEntry, ExperienceEntry, InjectionStats, Keyword, Personal, Priority,
    SkillSet, Skills, Target,
};
pub use optimize::{
    export, export_formats, match_score, optimize, optimize_to_dir, run_pipeline, write_atomic,
};
pub use output::{
    suggested_filename, suggested_stem, Artifact, ExportFormat, ExportReport, MatchReport,
    PipelineOutput,
};
pub use pipeline::validate::{validate, ValidationChecks, ValidationReport};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
