//! Problem catalog client (LeetCode GraphQL).

pub mod parse;

use leetcard_core::CatalogData;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::CatalogConfig;

const QUERY: &str = r#"
query questionData($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionId
    title
    titleSlug
    content
  }
}
"#;

const USER_AGENT: &str = concat!("leetcard-sync/", env!("CARGO_PKG_VERSION"));

/// Catalog fetch errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot derive a problem slug from {url:?} (expected .../problems/<slug>/)")]
    InvalidUrl { url: String },

    #[error("network failure fetching `{slug}`: {message}")]
    Network { slug: String, message: String },

    #[error("catalog answered {status} for `{slug}`")]
    Status { slug: String, status: u16 },

    #[error("problem `{slug}` not found in catalog")]
    NotFound { slug: String },

    #[error("malformed catalog response for `{slug}`: {message}")]
    Malformed { slug: String, message: String },
}

impl CatalogError {
    /// Worth one more attempt: network trouble or a 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    title_slug: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QuestionData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct QuestionData {
    question: Option<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Question {
    #[allow(dead_code)]
    question_id: Option<String>,
    #[allow(dead_code)]
    title: Option<String>,
    content: Option<String>,
}

struct CatalogClientInner {
    client: Client,
    graphql_url: String,
    retry_backoff: Duration,
    cache: Mutex<HashMap<String, CatalogData>>,
}

/// Fetches problem statements by slug.
///
/// Cheap to clone; clones share the HTTP client and the slug cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                graphql_url: config.graphql_url.clone(),
                retry_backoff: config.retry_backoff(),
                cache: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Fetch the catalog entry for a problem URL.
    ///
    /// A transient failure is retried once after the configured backoff.
    pub async fn fetch(&self, problem_url: &str) -> Result<CatalogData, CatalogError> {
        let slug = slug_from_url(problem_url)?;

        if let Some(cached) = self.inner.cache.lock().await.get(&slug) {
            tracing::debug!(%slug, "catalog cache hit");
            return Ok(cached.clone());
        }

        let data = match self.query(&slug).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(%slug, error = %e, "catalog fetch failed, retrying once");
                tokio::time::sleep(self.inner.retry_backoff).await;
                self.query(&slug).await?
            }
            other => other?,
        };

        self.inner
            .cache
            .lock()
            .await
            .insert(slug, data.clone());

        Ok(data)
    }

    async fn query(&self, slug: &str) -> Result<CatalogData, CatalogError> {
        tracing::debug!(%slug, url = %self.inner.graphql_url, "querying catalog");

        let request = GraphQlRequest {
            query: QUERY,
            variables: Variables { title_slug: slug },
        };

        let resp = self
            .inner
            .client
            .post(&self.inner.graphql_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CatalogError::Network {
                slug: slug.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                slug: slug.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                slug: slug.to_string(),
                status: status.as_u16(),
            });
        }

        let body: GraphQlResponse = resp.json().await.map_err(|e| CatalogError::Malformed {
            slug: slug.to_string(),
            message: e.to_string(),
        })?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(CatalogError::Malformed {
                slug: slug.to_string(),
                message: messages.join("; "),
            });
        }

        let question = body
            .data
            .and_then(|d| d.question)
            .ok_or_else(|| CatalogError::NotFound {
                slug: slug.to_string(),
            })?;

        let content = question
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CatalogError::Malformed {
                slug: slug.to_string(),
                message: "question has no content (premium problem?)".to_string(),
            })?;

        Ok(parse::parse_content(&content))
    }
}

/// Path segment after `/problems/` in a problem URL.
pub fn slug_from_url(problem_url: &str) -> Result<String, CatalogError> {
    let invalid = || CatalogError::InvalidUrl {
        url: problem_url.to_string(),
    };

    let url = url::Url::parse(problem_url).map_err(|_| invalid())?;
    let mut segments = url.path_segments().ok_or_else(invalid)?;

    segments
        .by_ref()
        .find(|s| *s == "problems")
        .ok_or_else(invalid)?;

    segments
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(invalid)
}
