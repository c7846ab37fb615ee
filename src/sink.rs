//! Record persistence: a flat file of JSON lines or a search index.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::record::MetricRecord;

/// The validated sink selection, derived from configuration before any I/O
/// happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkTarget {
    File(PathBuf),
    Index { url: String, index: String },
}

impl SinkTarget {
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        match (&config.output_file, &config.index_url) {
            (Some(path), None) => Ok(SinkTarget::File(path.clone())),
            (None, Some(url)) => Ok(SinkTarget::Index {
                url: url.trim_end_matches('/').to_string(),
                index: config.index_name.clone(),
            }),
            (Some(_), Some(_)) => Err(PipelineError::Config(
                "OUTPUT_FILE and INDEX_URL are mutually exclusive".to_string(),
            )),
            (None, None) => Err(PipelineError::Config(
                "one of OUTPUT_FILE or INDEX_URL must be set".to_string(),
            )),
        }
    }
}

pub enum Sink {
    File(FileSink),
    Index(IndexSink),
}

impl Sink {
    /// Opens the configured sink: creates the output file, or makes sure the
    /// target index exists before the first write.
    pub async fn open(target: &SinkTarget) -> Result<Self, PipelineError> {
        match target {
            SinkTarget::File(path) => Ok(Sink::File(FileSink::create(path).await?)),
            SinkTarget::Index { url, index } => {
                Ok(Sink::Index(IndexSink::connect(url, index).await?))
            }
        }
    }

    /// Persists one record. Concurrent callers may arrive in any order; each
    /// call lands as one complete record.
    pub async fn write(&self, record: &MetricRecord) -> Result<(), PipelineError> {
        match self {
            Sink::File(file) => file.append(record).await,
            Sink::Index(index) => index.upsert(record).await,
        }
    }

    /// Releases the sink once every dispatched unit has completed.
    pub async fn close(&self) -> Result<(), PipelineError> {
        match self {
            Sink::File(file) => file.flush().await,
            Sink::Index(_) => Ok(()),
        }
    }
}

/// Append-only JSON-lines file: one object per line, newline-terminated.
pub struct FileSink {
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    async fn create(path: &Path) -> Result<Self, PipelineError> {
        let file = File::create(path).await?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Serializes the record and writes it as a single line. The write holds
    /// the lock, so lines from concurrent units never interleave.
    async fn append(&self, record: &MetricRecord) -> Result<(), PipelineError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), PipelineError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Document-index sink speaking the Elasticsearch HTTP conventions.
pub struct IndexSink {
    http: reqwest::Client,
    base: String,
    index: String,
}

impl IndexSink {
    async fn connect(url: &str, index: &str) -> Result<Self, PipelineError> {
        let sink = Self {
            http: reqwest::Client::new(),
            base: url.to_string(),
            index: index.to_string(),
        };
        sink.ensure_index().await?;
        Ok(sink)
    }

    async fn ensure_index(&self) -> Result<(), PipelineError> {
        let response = self
            .http
            .head(format!("{}/{}", self.base, self.index))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::info!(index = %self.index, "target index is missing, creating it");
            self.http
                .put(format!("{}/{}", self.base, self.index))
                .send()
                .await?
                .error_for_status()?;
        } else {
            response.error_for_status()?;
        }

        Ok(())
    }

    /// Upserts the record, keyed by pull-request number, so reruns overwrite
    /// rather than duplicate.
    async fn upsert(&self, record: &MetricRecord) -> Result<(), PipelineError> {
        self.http
            .put(format!("{}/{}/_doc/{}", self.base, self.index, record.pr_id))
            .json(record)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(output_file: Option<&str>, index_url: Option<&str>) -> AppConfig {
        AppConfig {
            github_token: None,
            repo_owner: "owner1".to_string(),
            repo_name: "repo1".to_string(),
            window_start: "2024-06-01".to_string(),
            window_end: "2024-01-01".to_string(),
            output_file: output_file.map(PathBuf::from),
            index_url: index_url.map(String::from),
            index_name: "pr-metrics".to_string(),
            fetch_concurrency: 10,
            max_api_pages: 50,
        }
    }

    #[test]
    fn test_target_selects_file() {
        let target = SinkTarget::from_config(&config_with(Some("out.json"), None)).unwrap();
        assert_eq!(target, SinkTarget::File(PathBuf::from("out.json")));
    }

    #[test]
    fn test_target_selects_index_and_trims_trailing_slash() {
        let target =
            SinkTarget::from_config(&config_with(None, Some("http://localhost:9200/"))).unwrap();
        assert_eq!(
            target,
            SinkTarget::Index {
                url: "http://localhost:9200".to_string(),
                index: "pr-metrics".to_string(),
            }
        );
    }

    #[test]
    fn test_target_rejects_both_sinks() {
        let result = SinkTarget::from_config(&config_with(Some("out.json"), Some("http://x")));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_target_rejects_no_sink() {
        let result = SinkTarget::from_config(&config_with(None, None));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
