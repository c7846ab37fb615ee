use chrono::{DateTime, Utc};
use octocrab::models::pulls::PullRequest;
use octocrab::{Octocrab, Page};

use crate::config::RepoId;
use crate::error::PipelineError;

/// The pull-request fields consumed by the metrics pipeline.
#[derive(Debug, Clone)]
pub struct PrSummary {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub assignee: Option<String>,
    pub state: String,
}

pub struct GitHubClient {
    octocrab: Octocrab,
    repo: RepoId,
}

impl GitHubClient {
    pub fn new(token: Option<String>, repo: RepoId) -> Result<Self, PipelineError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            octocrab: builder.build()?,
            repo,
        })
    }

    /// Requests the first page of the pull-request listing, newest first.
    pub async fn first_page(&self) -> Result<Page<PullRequest>, PipelineError> {
        let page = self
            .octocrab
            .pulls(&self.repo.owner, &self.repo.repo)
            .list()
            .state(octocrab::params::State::All)
            .sort(octocrab::params::pulls::Sort::Created)
            .direction(octocrab::params::Direction::Descending)
            .per_page(100)
            .send()
            .await?;

        Ok(page)
    }

    /// Follows the listing's next-page link, if the API reported one.
    pub async fn next_page(
        &self,
        page: &Page<PullRequest>,
    ) -> Result<Option<Page<PullRequest>>, PipelineError> {
        Ok(self.octocrab.get_page(&page.next).await?)
    }

    /// Fetches the creation time of the earliest comment on a pull request's
    /// discussion thread. Issue comments come back oldest-first, so a single
    /// entry is enough.
    pub async fn first_comment_at(
        &self,
        number: u64,
    ) -> Result<Option<DateTime<Utc>>, PipelineError> {
        let comments = self
            .octocrab
            .issues(&self.repo.owner, &self.repo.repo)
            .list_comments(number)
            .per_page(1)
            .send()
            .await?;

        Ok(comments.items.first().map(|comment| comment.created_at))
    }
}

/// Converts an octocrab pull request into the fields the pipeline needs.
/// Items without a creation timestamp are dropped.
pub fn summarize(pr: &PullRequest) -> Option<PrSummary> {
    let created_at = pr.created_at?;

    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => "open",
        Some(octocrab::models::IssueState::Closed) => "closed",
        _ => "unknown",
    };

    Some(PrSummary {
        number: pr.number,
        created_at,
        closed_at: pr.closed_at,
        merged_at: pr.merged_at,
        author: pr.user.as_ref().map(|user| user.login.clone()),
        assignee: pr.assignee.as_ref().map(|user| user.login.clone()),
        state: state.to_string(),
    })
}
