//! Pipeline stages for résumé optimisation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable; [`crate::optimize`] chains
//! them and reports progress.
//!
//! ## Data Flow
//!
//! ```text
//! clean ──▶ parse ──▶ inject ──▶ text ──▶ docx ──▶ pdf
//! (raw)    (Document) (copy)   (String)  (ZIP)   (bytes)
//!                                 │
//!                                 └──▶ validate
//! ```
//!
//! 1. [`clean`]: normalise line endings and invisible characters
//! 2. [`parse`]: line-oriented heuristics produce a [`crate::model::Document`]
//! 3. [`inject`]: keywords are merged into a cloned document
//! 4. [`text`]: plain-text rendering, also the basis for scoring
//! 5. [`docx`]: five-part WordprocessingML package
//! 6. [`pdf`]: single-page PDF with the standard Helvetica fonts
//! 7. [`validate`]: ATS-friendliness checks on the rendered text

pub mod clean;
pub mod docx;
pub mod inject;
pub mod parse;
pub mod pdf;
pub mod text;
pub mod validate;
