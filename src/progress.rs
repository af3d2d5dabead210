//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::OptimizerConfigBuilder::progress_callback`] to be told
//! when each stage starts, finishes, or fails. The CLI uses it to print one
//! status line per stage; a host application might forward the events to its
//! own UI instead.
//!
//! # Example
//!
//! ```rust
//! use resume_ats::{OptimizerConfig, PipelineProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: f64) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done in {elapsed_ms:.1}ms");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = OptimizerConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Parse,
    Normalize,
    Inject,
    RenderText,
    BuildDocx,
    BuildPdf,
    Score,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Normalize => "normalize keywords",
            Stage::Inject => "inject keywords",
            Stage::RenderText => "render text",
            Stage::BuildDocx => "build docx",
            Stage::BuildPdf => "build pdf",
            Stage::Score => "score",
        };
        f.write_str(name)
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// Implementations must be `Send + Sync` because [`crate::optimize::optimize`]
/// runs the pipeline on a blocking worker thread. All methods have default
/// no-op implementations so callers only override what they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before `stage` runs.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when `stage` finished successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: f64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when `stage` failed; the pipeline stops afterwards.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OptimizerConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
