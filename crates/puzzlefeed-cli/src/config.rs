//! Config file and backend resolution.
//!
//! Values are resolved in order: command-line flag > environment variable >
//! `config.toml` in the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use puzzlefeed::{FeedConfig, FetchConfig, FilePreferences, MemorySource, PuzzleSource, RestSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cli::BackendArgs;

const CONFIG_FILE: &str = "config.toml";
const PREFS_FILE: &str = "preferences.json";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub fetch: FetchSection,
    pub feed: FeedSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    pub bucket_size: Option<i64>,
    pub max_hops: Option<u32>,
    pub default_rating: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    pub default_bucket_start: Option<i64>,
    pub bucket_stride: Option<i64>,
    pub page_size: Option<usize>,
}

impl FileConfig {
    /// Load a config file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Config file not found: {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let mut builder = FetchConfig::builder();
        if let Some(size) = self.fetch.bucket_size {
            builder = builder.bucket_size(size);
        }
        if let Some(hops) = self.fetch.max_hops {
            builder = builder.max_hops(hops);
        }
        if let Some(rating) = self.fetch.default_rating {
            builder = builder.default_rating(rating);
        }
        builder.build()
    }

    pub fn feed_config(&self) -> FeedConfig {
        let mut builder = FeedConfig::builder();
        if let Some(start) = self.feed.default_bucket_start {
            builder = builder.default_bucket_start(start);
        }
        if let Some(stride) = self.feed.bucket_stride {
            builder = builder.bucket_stride(stride);
        }
        if let Some(size) = self.feed.page_size {
            builder = builder.page_size(size);
        }
        builder.build()
    }
}

/// Directory holding `config.toml` and `preferences.json`
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(dir.join("puzzlefeed"))
}

/// Everything a command needs to talk to the backend
pub struct Backend {
    pub config: FileConfig,
    pub source: Arc<dyn PuzzleSource>,
    pub prefs_path: PathBuf,
}

impl Backend {
    pub fn resolve(args: &BackendArgs) -> Result<Self> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => config_dir()?.join(CONFIG_FILE),
        };
        let config = FileConfig::load(&config_path)?;
        let source = open_source(args, &config)?;
        let prefs_path = prefs_path(args)?;

        Ok(Self {
            config,
            source,
            prefs_path,
        })
    }

    pub fn preferences(&self) -> FilePreferences {
        FilePreferences::new(&self.prefs_path)
    }
}

pub fn prefs_path(args: &BackendArgs) -> Result<PathBuf> {
    match &args.prefs {
        Some(path) => Ok(path.clone()),
        None => Ok(config_dir()?.join(PREFS_FILE)),
    }
}

fn open_source(args: &BackendArgs, config: &FileConfig) -> Result<Arc<dyn PuzzleSource>> {
    if let Some(fixture) = &args.fixture {
        let source = MemorySource::load(fixture)
            .with_context(|| format!("Failed to load fixture {}", fixture.display()))?;
        info!(
            "Using {} puzzles from {}",
            source.len(),
            fixture.display()
        );
        return Ok(Arc::new(source));
    }

    let endpoint = args
        .endpoint
        .as_ref()
        .or(config.endpoint.as_ref())
        .context("No endpoint specified. Use --endpoint, PUZZLEFEED_ENDPOINT env, config.toml or --fixture.")?;
    let api_key = args
        .api_key
        .as_ref()
        .or(config.api_key.as_ref())
        .context("No API key specified. Use --api-key, PUZZLEFEED_API_KEY env or config.toml.")?;

    info!("Using backend {}", endpoint);
    Ok(Arc::new(RestSource::new(endpoint, api_key)))
}
