//! Run configuration
//!
//! A [`PipelineConfig`] carries everything one run needs: input and output
//! locations, both rule sets and the keyword limits. Rule sets are values
//! handed to the run, so tests can run different rule sets side by side.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::rules::{creator_rules, video_rules, RuleSet};
use crate::stats::KeywordLimits;

/// Environment variable prefix for [`PipelineConfig::from_env`].
pub const ENV_PREFIX: &str = "CREATOR_STATS_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub creators_path: PathBuf,
    pub videos_path: PathBuf,
    pub output_dir: PathBuf,
    pub creator_rules: RuleSet,
    pub video_rules: RuleSet,
    pub trending_top_n: usize,
    pub per_video_top_n: usize,
    pub per_creator_top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let limits = KeywordLimits::default();
        Self {
            creators_path: PathBuf::from("data/creators.csv"),
            videos_path: PathBuf::from("data/videos.csv"),
            output_dir: PathBuf::from("output"),
            creator_rules: creator_rules(),
            video_rules: video_rules(),
            trending_top_n: limits.trending,
            per_video_top_n: limits.per_video,
            per_creator_top_n: limits.per_creator,
        }
    }
}

/// Values read from `CREATOR_STATS_*` variables; unset ones keep defaults.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    creators_path: Option<PathBuf>,
    videos_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    creator_rules_path: Option<PathBuf>,
    video_rules_path: Option<PathBuf>,
    trending_top_n: Option<usize>,
    per_video_top_n: Option<usize>,
    per_creator_top_n: Option<usize>,
}

impl PipelineConfig {
    pub fn new(
        creators_path: impl Into<PathBuf>,
        videos_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            creators_path: creators_path.into(),
            videos_path: videos_path.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load a whole config, rule sets included, from JSON. Missing fields
    /// take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `CREATOR_STATS_*` variables (a `.env` file is
    /// honoured).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_env::<EnvOverrides>()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Self::default().apply(overrides)
    }

    /// Like [`from_env`](Self::from_env), over explicit `(name, value)`
    /// pairs instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, EnvOverrides>(vars)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Self::default().apply(overrides)
    }

    fn apply(mut self, o: EnvOverrides) -> Result<Self> {
        if let Some(p) = o.creators_path {
            self.creators_path = p;
        }
        if let Some(p) = o.videos_path {
            self.videos_path = p;
        }
        if let Some(p) = o.output_dir {
            self.output_dir = p;
        }
        if let Some(p) = o.creator_rules_path {
            self.creator_rules = RuleSet::from_json_file(&p)?;
        }
        if let Some(p) = o.video_rules_path {
            self.video_rules = RuleSet::from_json_file(&p)?;
        }
        if let Some(n) = o.trending_top_n {
            self.trending_top_n = n;
        }
        if let Some(n) = o.per_video_top_n {
            self.per_video_top_n = n;
        }
        if let Some(n) = o.per_creator_top_n {
            self.per_creator_top_n = n;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.creators_path.as_os_str().is_empty() || self.videos_path.as_os_str().is_empty() {
            return Err(PipelineError::Config("input paths must be set".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(PipelineError::Config("output_dir must be set".into()));
        }
        Ok(())
    }

    pub fn keyword_limits(&self) -> KeywordLimits {
        KeywordLimits {
            trending: self.trending_top_n,
            per_video: self.per_video_top_n,
            per_creator: self.per_creator_top_n,
        }
    }
}
