//! Client for the tab-separated reference dataset.

use std::path::PathBuf;

use csv::StringRecord;
use phishguard_core::{Label, LabelledText, ReferenceLocation};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("reference dataset at {0} has no usable rows")]
    Empty(String),
}

/// Parsed reference rows plus the number of lines that could not be parsed.
#[derive(Debug, Default)]
pub struct ReferenceData {
    pub rows: Vec<LabelledText>,
    pub dropped: usize,
}

/// Fetches the reference corpus from its configured location.
pub struct ReferenceClient {
    client: reqwest::Client,
    location: ReferenceLocation,
}

impl ReferenceClient {
    pub fn new(location: ReferenceLocation) -> Self {
        Self {
            client: reqwest::Client::new(),
            location,
        }
    }

    pub fn location(&self) -> &ReferenceLocation {
        &self.location
    }

    /// Fetch and parse the dataset. Any failure to obtain it, or a dataset
    /// with zero usable rows, is an error.
    pub async fn fetch(&self) -> Result<ReferenceData, FetchError> {
        let body = match &self.location {
            ReferenceLocation::Url(url) => self.fetch_url(url).await?,
            ReferenceLocation::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
        };

        let data = parse_tsv(&body);
        if data.dropped > 0 {
            warn!(dropped = data.dropped, "skipped malformed reference rows");
        }
        if data.rows.is_empty() {
            return Err(FetchError::Empty(self.location.to_string()));
        }
        info!(rows = data.rows.len(), source = %self.location, "loaded reference dataset");
        Ok(data)
    }

    async fn fetch_url(&self, url: &str) -> Result<String, FetchError> {
        info!(url = %url, "fetching reference dataset");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}

/// Parse `label<TAB>message` records. A message may be double-quoted, in
/// which case it can hold tabs, quotes, or line breaks. Blank lines are
/// ignored; records without exactly two fields, with an unknown label, or
/// with an empty message are dropped.
pub fn parse_tsv(body: &str) -> ReferenceData {
    let mut data = ReferenceData::default();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    for record in reader.records() {
        match record.ok().as_ref().and_then(parse_record) {
            Some(row) => data.rows.push(row),
            None => data.dropped += 1,
        }
    }

    data
}

fn parse_record(record: &StringRecord) -> Option<LabelledText> {
    if record.len() != 2 {
        return None;
    }
    let label = record[0].parse::<Label>().ok()?;
    let message = &record[1];
    (!message.is_empty()).then(|| LabelledText::new(label, message))
}
