//! TOML run file and settings resolution

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use vrp_bench_core::{BenchmarkConfig, DemoDataset};
use vrp_bench_vendors::{parse_base_url, HttpConfig};

/// Solver URL used when neither flag, env nor file set one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Output directory used when neither flag nor file set one
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Optional run file
///
/// ```toml
/// base_url = "http://localhost:8080"
/// iterations = 5
/// dataset = "SINGAPORE_WIDE"
/// output_dir = "results"
/// request_timeout_secs = 300
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    pub base_url: Option<String>,
    pub iterations: Option<usize>,
    pub dataset: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl RunFile {
    /// Read and parse a run file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate on its own, without command-line overrides
    pub fn validate(&self) -> Result<RunSettings> {
        RunSettings::resolve(None, self.clone(), RunOverrides::default())
    }
}

/// Values given on the command line; each wins over the run file
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub iterations: Option<usize>,
    pub dataset: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

/// Fully resolved settings of a `run`
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub base_url: String,
    pub config: BenchmarkConfig,
    pub output_dir: PathBuf,
    pub http: HttpConfig,
}

impl RunSettings {
    /// Merge flags, run file and defaults, then validate
    pub fn resolve(
        cli_base_url: Option<&str>,
        file: RunFile,
        overrides: RunOverrides,
    ) -> Result<Self> {
        let defaults = BenchmarkConfig::default();

        let base_url = cli_base_url
            .map(str::to_string)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url)?;

        let dataset = match overrides.dataset.or(file.dataset) {
            Some(raw) => raw.parse::<DemoDataset>()?,
            None => defaults.dataset,
        };
        let iterations = overrides
            .iterations
            .or(file.iterations)
            .unwrap_or(defaults.iteration_count);
        let config = BenchmarkConfig::new(iterations, dataset);
        config.validate_offered()?;

        let mut http = HttpConfig::default();
        if let Some(secs) = overrides.request_timeout_secs.or(file.request_timeout_secs) {
            http = http.with_request_timeout(Duration::from_secs(secs));
        }
        http.validate()?;

        let output_dir = overrides
            .output_dir
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            base_url,
            config,
            output_dir,
            http,
        })
    }
}
