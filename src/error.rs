use thiserror::Error;

/// Failure kinds surfaced by the ingestion pipeline. All of them are fatal;
/// there is no retry policy.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or missing configuration. Raised before any network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote signalled quota exhaustion, either on the listing call or
    /// while fetching a pull request's comments.
    #[error("GitHub rate limit exhausted, try again after the quota resets")]
    RateLimit,

    /// Any other GitHub failure, including rejected credentials.
    #[error("GitHub API request failed: {0}")]
    Api(octocrab::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write to output file: {0}")]
    SinkIo(#[from] std::io::Error),

    #[error("search index request failed: {0}")]
    Index(#[from] reqwest::Error),
}

impl From<octocrab::Error> for PipelineError {
    fn from(err: octocrab::Error) -> Self {
        if is_rate_limit(&err) {
            PipelineError::RateLimit
        } else {
            PipelineError::Api(err)
        }
    }
}

// TODO: switch to inspecting the response status code once octocrab exposes
// a typed rate-limit variant.
fn is_rate_limit(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            source.message.to_lowercase().contains("rate limit")
        }
        _ => false,
    }
}
