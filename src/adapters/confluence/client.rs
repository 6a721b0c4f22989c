//! Confluence Cloud REST client
//!
//! Uses the v2 API for page metadata, labels and space listings and the v1
//! API for the export-view body and CQL search, which v2 does not offer.

use super::api::ConfluenceApi;
use super::models::{
    parse_optional_page_id, ContentSummaryV1, ContentV1, LabelV2, PageV2, Paginated, SpaceV2,
};
use crate::config::{secret_string, ConfluenceConfig, SecretString};
use crate::domain::{
    ConfluenceError, DumpError, PageContent, PageId, PageSummary, Result, SpaceId, SpaceSummary,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Confluence Cloud client authenticated with an account e-mail and API token
///
/// # Example
///
/// ```no_run
/// use confluence_dump::adapters::confluence::{ConfluenceApi, ConfluenceClient};
/// use confluence_dump::config::{secret_string, ConfluenceConfig};
///
/// # async fn example() -> confluence_dump::domain::Result<()> {
/// let config = ConfluenceConfig {
///     site: Some("acme".to_string()),
///     username: Some("me@acme.com".to_string()),
///     api_token: Some(secret_string("token".to_string())),
///     ..Default::default()
/// };
/// let client = ConfluenceClient::new(&config)?;
/// for space in client.list_spaces().await? {
///     println!("{} {}", space.key, space.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfluenceClient {
    base_url: String,
    client: Client,

    /// Precomputed `Basic ...` header value
    auth_header: SecretString,

    config: ConfluenceConfig,
}

impl ConfluenceClient {
    /// Create a client from the connection configuration
    ///
    /// Fails with a configuration error when the site or either credential
    /// is missing; no request is made here.
    pub fn new(config: &ConfluenceConfig) -> Result<Self> {
        let base_url = config.resolved_base_url().ok_or_else(|| {
            DumpError::Configuration("Confluence site is not set (use --site)".to_string())
        })?;

        config
            .validate_credentials()
            .map_err(DumpError::Configuration)?;

        let username = config.username.as_deref().unwrap_or_default();
        let token = config
            .api_token
            .as_ref()
            .map(|t| t.expose_secret().as_ref().to_string())
            .unwrap_or_default();
        let encoded = general_purpose::STANDARD.encode(format!("{username}:{token}").as_bytes());

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DumpError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url,
            client,
            auth_header: secret_string(format!("Basic {encoded}")),
            config: config.clone(),
        })
    }

    /// Turn a pagination or attachment link into an absolute URL
    ///
    /// v2 links carry the `/wiki` prefix, v1 links are relative to `/wiki`.
    fn resolve_link(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with("/wiki/") {
            format!("{}{}", self.base_url, link)
        } else if link.starts_with('/') {
            format!("{}/wiki{}", self.base_url, link)
        } else {
            format!("{}/wiki/{}", self.base_url, link)
        }
    }

    /// Send an authenticated GET and map non-success statuses to errors
    async fn send_get(&self, url: &str, accept: &str) -> Result<Response> {
        let mut request = self.client.get(url).header(ACCEPT, accept);

        // Never hand the credentials to a foreign origin
        if is_same_origin(&self.base_url, url) {
            request = request.header(AUTHORIZATION, self.auth_header.expose_secret().as_ref());
        }

        let resp = request.send().await.map_err(map_transport_error)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(DumpError::Confluence(map_status(status, url, &body)))
    }

    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.retry_request(|| async {
            let resp = self.send_get(url, "application/json").await?;
            resp.json::<T>().await.map_err(|e| {
                DumpError::Confluence(ConfluenceError::InvalidResponse(format!("{url}: {e}")))
            })
        })
        .await
    }

    /// Follow `_links.next` until the listing is exhausted
    async fn get_all<T>(&self, first_url: String) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let mut results = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let page: Paginated<T> = self.get_json(&url).await?;
            next = page.next().map(|link| self.resolve_link(link));

            tracing::trace!(url = %url, count = page.results.len(), "Fetched listing page");
            results.extend(page.results);
        }

        Ok(results)
    }

    async fn get_page(&self, page_id: &PageId) -> Result<PageV2> {
        let url = format!("{}/wiki/api/v2/pages/{}", self.base_url, page_id);
        self.get_json(&url).await
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transport failures, 429 and 5xx responses are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let retry = &self.config.retry;
        let max_retries = retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    let retryable = matches!(&e, DumpError::Confluence(ce) if ce.is_retryable());
                    if !retryable || attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = (retry.initial_delay_ms as f64
                        * retry.backoff_multiplier.powi(attempt as i32 - 1))
                        as u64;
                    let delay_ms = delay_ms.min(retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> DumpError {
    if e.is_timeout() {
        DumpError::Confluence(ConfluenceError::Timeout(e.to_string()))
    } else {
        DumpError::Confluence(ConfluenceError::ConnectionFailed(e.to_string()))
    }
}

fn map_status(status: StatusCode, url: &str, body: &str) -> ConfluenceError {
    let message = format!("{url}: {}", truncate(body, 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ConfluenceError::Authentication(format!("{status} {message}"))
        }
        StatusCode::NOT_FOUND => ConfluenceError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => ConfluenceError::RateLimited(message),
        s if s.is_server_error() => ConfluenceError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => ConfluenceError::ClientError {
            status: s.as_u16(),
            message,
        },
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl ConfluenceApi for ConfluenceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn page_last_modified(&self, page_id: &PageId) -> Result<DateTime<Utc>> {
        let page = self.get_page(page_id).await?;
        let created_at = page.version.map(|v| v.created_at).ok_or_else(|| {
            ConfluenceError::InvalidResponse(format!("page {page_id} has no version"))
        })?;

        DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                DumpError::Confluence(ConfluenceError::InvalidResponse(format!(
                    "page {page_id} has an unparseable version timestamp {created_at}: {e}"
                )))
            })
    }

    async fn page_title(&self, page_id: &PageId) -> Result<String> {
        Ok(self.get_page(page_id).await?.title)
    }

    async fn page_parent(&self, page_id: &PageId) -> Result<Option<PageId>> {
        let page = self.get_page(page_id).await?;
        Ok(parse_optional_page_id(page.parent_id)?)
    }

    async fn page_export_view(&self, page_id: &PageId) -> Result<PageContent> {
        let url = format!(
            "{}/wiki/rest/api/content/{}?expand=body.export_view",
            self.base_url, page_id
        );
        let content: ContentV1 = self.get_json(&url).await?;

        let html = content
            .body
            .and_then(|b| b.export_view)
            .map(|v| v.value)
            .ok_or_else(|| {
                ConfluenceError::InvalidResponse(format!("page {page_id} has no export_view body"))
            })?;

        let links = content.links.unwrap_or_default();
        let base = links
            .base
            .unwrap_or_else(|| format!("{}/wiki", self.base_url));
        let page_url = match links.webui {
            Some(webui) => format!("{base}{webui}"),
            None => format!("{base}/pages/viewpage.action?pageId={page_id}"),
        };

        Ok(PageContent {
            title: content.title,
            html,
            url: page_url,
        })
    }

    async fn page_labels(&self, page_id: &PageId) -> Result<Vec<String>> {
        let url = format!(
            "{}/wiki/api/v2/pages/{}/labels?limit={}",
            self.base_url, page_id, self.config.page_limit
        );
        let labels: Vec<LabelV2> = self.get_all(url).await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn list_spaces(&self) -> Result<Vec<SpaceSummary>> {
        let url = format!(
            "{}/wiki/api/v2/spaces?limit={}&description-format=plain",
            self.base_url, self.config.page_limit
        );
        let spaces: Vec<SpaceV2> = self.get_all(url).await?;

        let spaces = spaces
            .into_iter()
            .map(SpaceV2::into_summary)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(count = spaces.len(), "Listed spaces");
        Ok(spaces)
    }

    async fn space_title(&self, space_id: &SpaceId) -> Result<String> {
        let url = format!("{}/wiki/api/v2/spaces/{}", self.base_url, space_id);
        let space: SpaceV2 = self.get_json(&url).await?;
        Ok(space.name)
    }

    async fn list_pages(&self, space_id: &SpaceId) -> Result<Vec<PageSummary>> {
        let url = format!(
            "{}/wiki/api/v2/spaces/{}/pages?limit={}",
            self.base_url, space_id, self.config.page_limit
        );
        let pages: Vec<PageV2> = self.get_all(url).await?;

        let pages = pages
            .into_iter()
            .map(PageV2::into_summary)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(space_id = %space_id, count = pages.len(), "Listed pages");
        Ok(pages)
    }

    async fn search_by_label(&self, label: &str) -> Result<Vec<PageSummary>> {
        let cql = format!(
            "label = \"{}\" and type = page",
            label.replace('\\', "\\\\").replace('"', "\\\"")
        );
        let limit = self.config.page_limit.to_string();
        let url = url::Url::parse_with_params(
            &format!("{}/wiki/rest/api/content/search", self.base_url),
            &[
                ("cql", cql.as_str()),
                ("limit", limit.as_str()),
                ("expand", "space"),
            ],
        )
        .map_err(|e| DumpError::Configuration(format!("Invalid search URL: {e}")))?;

        let results: Vec<ContentSummaryV1> = self.get_all(url.to_string()).await?;

        let pages = results
            .into_iter()
            .map(ContentSummaryV1::into_summary)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(label = %label, count = pages.len(), "Label search finished");
        Ok(pages)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.resolve_link(url);

        self.retry_request(|| async {
            let resp = self.send_get(&url, "*/*").await?;
            let bytes = resp.bytes().await.map_err(map_transport_error)?;
            Ok(bytes.to_vec())
        })
        .await
    }
}

/// Whether `url` has the same scheme, host and port as `base_url`
///
/// URLs carrying userinfo never match, so `https://site@other/` is foreign.
pub fn is_same_origin(base_url: &str, url: &str) -> bool {
    let (Ok(base), Ok(candidate)) = (url::Url::parse(base_url), url::Url::parse(url)) else {
        return false;
    };

    candidate.username().is_empty()
        && candidate.password().is_none()
        && base.scheme() == candidate.scheme()
        && base.host_str() == candidate.host_str()
        && base.port_or_known_default() == candidate.port_or_known_default()
}
