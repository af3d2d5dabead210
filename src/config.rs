//! Configuration types for the parse → inject → export pipeline.
//!
//! All tunable behaviour is carried by an immutable [`OptimizerConfig`],
//! built via [`OptimizerConfigBuilder`] and passed explicitly into each
//! operation. Two runs with different configs never influence each other.
//!
//! The injection knobs live in their own serialisable [`InjectionPolicy`]
//! so they can be logged, stored next to an output, or diffed between runs.

use crate::error::AtsError;
use crate::progress::ProgressCallback;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Knobs of the keyword-injection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionPolicy {
    /// High-priority keywords considered for the skills list. Default: 5.
    pub max_high_prio_skills: usize,

    /// Hard ceiling on bullet injections per run, synthetic bullets
    /// included. Default: 15.
    ///
    /// Screening systems and human reviewers both penalise keyword stuffing;
    /// past this ceiling the remaining bullets are left untouched.
    pub max_total_injections: usize,

    /// High-priority keywords placed at the front of the bullet candidate
    /// pool. Default: 3.
    pub experience_high_pool: usize,

    /// Medium-priority keywords appended to the bullet candidate pool. Default: 2.
    pub experience_medium_pool: usize,

    /// Upper bound on synthesised bullets per run. Default: 2.
    pub max_synthetic_bullets: usize,

    /// Only the first experience entry may receive a synthesised bullet.
    /// Default: true.
    ///
    /// The most recent role is the one reviewers read first; disabling this
    /// lets later entries receive synthetic bullets too, still bounded by
    /// `max_synthetic_bullets`.
    pub synthesize_bullets_for_first_entry_only: bool,

    /// Replaces `personal.location` after injection when set.
    pub location_override: Option<String>,
}

impl Default for InjectionPolicy {
    fn default() -> Self {
        Self {
            max_high_prio_skills: 5,
            max_total_injections: 15,
            experience_high_pool: 3,
            experience_medium_pool: 2,
            max_synthetic_bullets: 2,
            synthesize_bullets_for_first_entry_only: true,
            location_override: None,
        }
    }
}

/// Knobs of the text parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Only header lines above the first section heading feed the location
    /// heuristic. Default: false.
    ///
    /// Contact fields are always searched in the first ten lines. A short
    /// résumé can put a `Python, Go` skills line inside that window, where it
    /// reads as a `City, Region` location; enabling this stops that.
    pub location_stops_at_heading: bool,
}

/// Configuration for one pipeline run.
///
/// Built via [`OptimizerConfig::builder()`] or [`OptimizerConfig::default()`].
///
/// # Example
/// ```rust
/// use resume_ats::OptimizerConfig;
///
/// let config = OptimizerConfig::builder()
///     .max_total_injections(10)
///     .location_override("Remote")
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.policy.max_total_injections, 10);
/// ```
#[derive(Clone, Default)]
pub struct OptimizerConfig {
    pub policy: InjectionPolicy,

    pub parse: ParseOptions,

    /// Seed for metric-phrase selection. `None` seeds from OS entropy, so
    /// repeated runs phrase injected bullets differently.
    pub seed: Option<u64>,

    /// Receives stage events while the pipeline runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for OptimizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerConfig")
            .field("policy", &self.policy)
            .field("parse", &self.parse)
            .field("seed", &self.seed)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl OptimizerConfig {
    /// Create a new builder for `OptimizerConfig`.
    pub fn builder() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Random source for this run: seeded when `seed` is set, entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Builder for [`OptimizerConfig`].
#[derive(Debug)]
pub struct OptimizerConfigBuilder {
    config: OptimizerConfig,
}

impl OptimizerConfigBuilder {
    pub fn max_high_prio_skills(mut self, n: usize) -> Self {
        self.config.policy.max_high_prio_skills = n;
        self
    }

    pub fn max_total_injections(mut self, n: usize) -> Self {
        self.config.policy.max_total_injections = n;
        self
    }

    pub fn experience_high_pool(mut self, n: usize) -> Self {
        self.config.policy.experience_high_pool = n;
        self
    }

    pub fn experience_medium_pool(mut self, n: usize) -> Self {
        self.config.policy.experience_medium_pool = n;
        self
    }

    pub fn max_synthetic_bullets(mut self, n: usize) -> Self {
        self.config.policy.max_synthetic_bullets = n;
        self
    }

    pub fn synthesize_bullets_for_first_entry_only(mut self, v: bool) -> Self {
        self.config.policy.synthesize_bullets_for_first_entry_only = v;
        self
    }

    pub fn location_override(mut self, location: impl Into<String>) -> Self {
        self.config.policy.location_override = Some(location.into());
        self
    }

    pub fn policy(mut self, policy: InjectionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn location_stops_at_heading(mut self, v: bool) -> Self {
        self.config.parse.location_stops_at_heading = v;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OptimizerConfig, AtsError> {
        let p = &self.config.policy;
        if p.max_total_injections > 100 {
            return Err(AtsError::InvalidConfig(format!(
                "max_total_injections must be ≤ 100, got {}",
                p.max_total_injections
            )));
        }
        if p.max_synthetic_bullets > p.max_total_injections {
            return Err(AtsError::InvalidConfig(format!(
                "max_synthetic_bullets ({}) cannot exceed max_total_injections ({})",
                p.max_synthetic_bullets, p.max_total_injections
            )));
        }
        if matches!(p.location_override.as_deref(), Some(l) if l.trim().is_empty()) {
            return Err(AtsError::InvalidConfig(
                "location_override must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}
