//! Application configuration and environment variable parsing.
//!
//! Settings are loaded once at startup from the environment (optionally via a
//! .env file). The `AppConfig` struct names the target repository, the
//! reporting window, the sink selection, and the fetch limits.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// The owner of the repository (e.g., "rust-lang").
    pub owner: String,
    /// The name of the repository (e.g., "cargo").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Optional GitHub Personal Access Token for higher rate limits and
    /// private repositories.
    pub github_token: Option<String>,

    /// Owner of the repository to ingest pull requests from.
    pub repo_owner: String,

    /// Name of the repository to ingest pull requests from.
    pub repo_name: String,

    /// Upper (most recent) bound of the reporting window, `YYYY-MM-DD`.
    /// Pull requests created on or after this date are skipped.
    pub window_start: String,

    /// Lower bound of the reporting window, `YYYY-MM-DD`. Listing stops once
    /// pull requests older than this date appear.
    pub window_end: String,

    /// Path the flat-file sink writes to, one JSON record per line.
    /// Exactly one of `output_file` / `index_url` must be set.
    pub output_file: Option<PathBuf>,

    /// Base URL of the search-index sink (e.g., "http://localhost:9200").
    pub index_url: Option<String>,

    /// Index that metric records are upserted into.
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Maximum number of pull requests processed concurrently.
    /// Defaults to 10 if not specified.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Hard limit on the number of paginated listing requests per run.
    #[serde(default = "default_max_api_pages")]
    pub max_api_pages: u32,
}

fn default_index_name() -> String {
    "pr-metrics".to_string()
}

fn default_fetch_concurrency() -> usize {
    10
}

fn default_max_api_pages() -> u32 {
    50
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn repo(&self) -> RepoId {
        RepoId {
            owner: self.repo_owner.clone(),
            repo: self.repo_name.clone(),
        }
    }
}
