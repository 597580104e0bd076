//! Client for the provider's file search endpoint.
//!
//! The endpoint answers a form POST with a plaintext body: a two-line
//! banner (the second line confirming `generated <N> results`) followed by
//! one `<checksum> <filename>` line per match.

use std::sync::LazyLock;
use std::time::Duration;

use datamirror::{QueryError, RemoteFileRecord, SourceDescriptor, normalize_listing};
use regex::Regex;
use tracing::{debug, warn};

pub const DEFAULT_LISTING_URL: &str = "https://oceandata.sci.gsfc.nasa.gov/api/file_search";

const HEADER_LINES: usize = 2;
const NO_MATCH_MARKER: &str = "no files matched";

static RESULT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)generated\s+(\d+)\s+results?").expect("result count pattern is valid")
});

/// Retry schedule for transport-level listing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt.
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Same attempt count, no waiting between attempts.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

enum Attempt {
    Retry(String),
    Fail(QueryError),
}

/// Issues listing queries and parses the responses into records.
pub struct ListingClient {
    client: reqwest::Client,
    url: Option<String>,
    retry: RetryPolicy,
}

impl ListingClient {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self {
            client,
            url,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_LISTING_URL)
    }

    /// Query the endpoint for `source.search_pattern`, retrying transport
    /// failures. Records come back sorted by filename and unique.
    #[tracing::instrument(skip_all, fields(search = %source.search_pattern))]
    pub async fn list(&self, source: &SourceDescriptor) -> Result<Vec<RemoteFileRecord>, QueryError> {
        if source.search_pattern.trim().is_empty() {
            return Err(QueryError::EmptyPattern);
        }

        let attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.initial_delay;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.attempt(source).await {
                Ok(body) => return parse_listing(&body, &source.search_pattern),
                Err(Attempt::Fail(error)) => return Err(error),
                Err(Attempt::Retry(message)) => {
                    warn!(attempt, max_attempts = attempts, error = %message, "listing request failed");
                    last_error = message;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, self.retry.max_delay);
            }
        }

        Err(QueryError::Transport {
            attempts,
            message: last_error,
        })
    }

    async fn attempt(&self, source: &SourceDescriptor) -> Result<String, Attempt> {
        let mut form = vec![("cksum", "1"), ("search", source.search_pattern.as_str())];
        if let Some(dtype) = &source.data_type_filter {
            form.push(("dtype", dtype.as_str()));
        }

        let mut request = self.client.post(self.endpoint()).form(&form);
        if let Some(creds) = &source.credentials {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Attempt::Fail(QueryError::Status(status.as_u16())));
        }

        response.text().await.map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> Attempt {
    if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        Attempt::Retry(err.to_string())
    } else {
        Attempt::Fail(QueryError::Transport {
            attempts: 1,
            message: err.to_string(),
        })
    }
}

/// Parse a listing response body.
///
/// Fails on an explicit no-match marker, on a missing result count, on a
/// result line that is not exactly two fields, and on a positive result
/// count with no result lines.
pub fn parse_listing(body: &str, pattern: &str) -> Result<Vec<RemoteFileRecord>, QueryError> {
    if body.to_lowercase().contains(NO_MATCH_MARKER) {
        return Err(QueryError::NoMatch(pattern.to_owned()));
    }

    let expected: usize = RESULT_COUNT
        .captures(body)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| QueryError::Malformed("result count line is missing".into()))?;

    let mut records = Vec::new();
    for line in body.lines().skip(HEADER_LINES) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [checksum, filename] = fields.as_slice() else {
            return Err(QueryError::Malformed(format!(
                "expected `<checksum> <filename>`, got `{line}`"
            )));
        };
        records.push(RemoteFileRecord::new(*filename, *checksum));
    }

    if records.is_empty() && expected > 0 {
        return Err(QueryError::Malformed(format!(
            "response announced {expected} results but listed none"
        )));
    }
    if records.len() != expected {
        debug!(expected, listed = records.len(), "result count differs from listed lines");
    }

    Ok(normalize_listing(records))
}
