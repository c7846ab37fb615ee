pub mod config;
pub mod error;
pub mod github;
pub mod ingest;
pub mod metrics;
pub mod record;
pub mod sink;
pub mod window;

use chrono::{DateTime, Utc};

use config::{AppConfig, RepoId};
use error::PipelineError;
use github::GitHubClient;
use sink::{Sink, SinkTarget};
use window::Window;

/// Immutable per-run state shared by the ingestion loop and every
/// per-pull-request unit.
pub struct AppContext {
    /// Application configuration loaded from environment variables.
    pub config: AppConfig,
    /// The repository being ingested.
    pub repo: RepoId,
    /// The reporting window all pull requests are classified against.
    pub window: Window,
    /// Authenticated GitHub client.
    pub github: GitHubClient,
    /// Destination for emitted records.
    pub sink: Sink,
    /// Captured once at startup so every unit computes against the same
    /// instant.
    pub now: DateTime<Utc>,
}

impl AppContext {
    /// Validates the configuration and opens the collaborators.
    ///
    /// Window and sink-target validation run first, so configuration problems
    /// surface before any network activity.
    pub async fn new(config: AppConfig) -> Result<Self, PipelineError> {
        let window = Window::parse(&config.window_start, &config.window_end)?;
        let target = SinkTarget::from_config(&config)?;

        let repo = config.repo();
        let github = GitHubClient::new(config.github_token.clone(), repo.clone())?;
        let sink = Sink::open(&target).await?;

        Ok(Self {
            config,
            repo,
            window,
            github,
            sink,
            now: Utc::now(),
        })
    }
}
