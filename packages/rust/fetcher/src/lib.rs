//! Source text retrieval from the Aozora Bunko archive.
//!
//! For each work the fetcher tries the ruby-annotated zip archive first and
//! falls back once to the plain-text endpoint. Both paths decode Shift_JIS and
//! drop undecodable bytes. A work that cannot be retrieved either way yields
//! an error the caller treats as "skip this work", never as a fatal one.

mod archive;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use aozora_shared::{CorpusError, FetchConfig, Result, Work};

/// User-Agent string for archive requests.
const USER_AGENT: &str = concat!("aozora-corpus/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FetchedText
// ---------------------------------------------------------------------------

/// Which endpoint produced a work's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Archive,
    Fallback,
}

impl std::fmt::Display for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextSource::Archive => f.write_str("archive"),
            TextSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// Decoded raw text for one work.
#[derive(Debug, Clone)]
pub struct FetchedText {
    /// Work identifier.
    pub work_id: String,
    /// Decoded text, still carrying archive markup.
    pub text: String,
    /// Endpoint the text came from.
    pub source: TextSource,
    /// URL actually fetched.
    pub url: String,
}

// ---------------------------------------------------------------------------
// SourceFetcher
// ---------------------------------------------------------------------------

/// HTTP client for archive and fallback endpoints.
pub struct SourceFetcher {
    config: FetchConfig,
    client: Client,
}

impl SourceFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CorpusError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Retrieve and decode the text of `work`.
    ///
    /// Tries the archive, then the fallback exactly once. The error returned
    /// when both fail describes each attempt.
    #[instrument(skip_all, fields(work_id = %work.id, title = %work.title))]
    pub async fn fetch(&self, work: &Work) -> Result<FetchedText> {
        let Some(author_id) = work.author_id.as_deref() else {
            return Err(CorpusError::Network(format!(
                "work {} has no author mapping",
                work.id
            )));
        };

        let archive_url = expand_url(&self.config.archive_url, author_id, &work.id)?;
        let archive_err = match self.fetch_archive(&archive_url).await {
            Ok(text) => return Ok(fetched(work, text, TextSource::Archive, &archive_url)),
            Err(e) => e,
        };
        warn!(url = %archive_url, error = %archive_err, "archive fetch failed, trying plain text");

        let fallback_url = expand_url(&self.config.fallback_url, author_id, &work.id)?;
        match self.fetch_plain(&fallback_url).await {
            Ok(text) => Ok(fetched(work, text, TextSource::Fallback, &fallback_url)),
            Err(fallback_err) => Err(CorpusError::Network(format!(
                "archive: {archive_err}; fallback: {fallback_err}"
            ))),
        }
    }

    async fn fetch_archive(&self, url: &Url) -> Result<String> {
        let bytes = self.get_bytes(url).await?;
        let member = archive::extract_text_member(&bytes)?;
        non_empty(archive::decode_shift_jis(&member), url)
    }

    async fn fetch_plain(&self, url: &Url) -> Result<String> {
        let bytes = self.get_bytes(url).await?;
        non_empty(archive::decode_shift_jis(&bytes), url)
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(%url, "requesting");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| CorpusError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CorpusError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CorpusError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(body.to_vec())
    }
}

/// Fill `{author_id}` and `{work_id}` into a URL template.
fn expand_url(template: &str, author_id: &str, work_id: &str) -> Result<Url> {
    let expanded = template
        .replace("{author_id}", author_id)
        .replace("{work_id}", work_id);
    Url::parse(&expanded).map_err(|e| CorpusError::config(format!("invalid URL '{expanded}': {e}")))
}

fn non_empty(text: String, url: &Url) -> Result<String> {
    if text.trim().is_empty() {
        return Err(CorpusError::Network(format!("{url}: empty text")));
    }
    Ok(text)
}

fn fetched(work: &Work, text: String, source: TextSource, url: &Url) -> FetchedText {
    info!(%source, chars = text.chars().count(), "fetched work text");
    FetchedText {
        work_id: work.id.clone(),
        text,
        source,
        url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::archive::tests::{build_zip, sjis};
    use super::*;

    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = "影が墓地で血を見つけた。";

    fn work(author_id: Option<&str>) -> Work {
        Work {
            id: "482".into(),
            title: "人間椅子".into(),
            author: "江戸川乱歩".into(),
            genre: "horror".into(),
            author_id: author_id.map(String::from),
        }
    }

    fn fetcher_for(server: &MockServer) -> SourceFetcher {
        let config = FetchConfig {
            archive_url: format!("{}/cards/{{author_id}}/files/{{work_id}}_ruby.zip", server.uri()),
            fallback_url: format!("{}/cards/{{author_id}}/files/{{work_id}}.txt", server.uri()),
            timeout_secs: 5,
        };
        SourceFetcher::new(config).unwrap()
    }

    #[test]
    fn test_expand_url() {
        let url = expand_url(
            "https://www.aozora.gr.jp/cards/{author_id}/files/{work_id}_ruby.zip",
            "001779",
            "482",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.aozora.gr.jp/cards/001779/files/482_ruby.zip"
        );
    }

    #[tokio::test]
    async fn test_archive_success() {
        let server = MockServer::start().await;
        let zip = build_zip(&[("readme.html", b"<p/>"), ("482_ruby.txt", &sjis(BODY))]);

        Mock::given(method("GET"))
            .and(path("/cards/001779/files/482_ruby.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(zip))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/cards/001779/files/482.txt"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = fetcher_for(&server).fetch(&work(Some("001779"))).await.unwrap();
        assert_eq!(result.text, BODY);
        assert_eq!(result.source, TextSource::Archive);
        assert_eq!(result.work_id, "482");
        assert!(result.url.ends_with("482_ruby.zip"));
    }

    #[tokio::test]
    async fn test_fallback_on_missing_archive() {
        let server = MockServer::start().await;

        Mock::given(path("/cards/001779/files/482_ruby.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/cards/001779/files/482.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sjis(BODY)))
            .expect(1)
            .mount(&server)
            .await;

        let result = fetcher_for(&server).fetch(&work(Some("001779"))).await.unwrap();
        assert_eq!(result.text, BODY);
        assert_eq!(result.source, TextSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_on_malformed_archive() {
        let server = MockServer::start().await;

        Mock::given(path("/cards/001779/files/482_ruby.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK but not really".to_vec()))
            .mount(&server)
            .await;
        Mock::given(path("/cards/001779/files/482.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sjis(BODY)))
            .mount(&server)
            .await;

        let result = fetcher_for(&server).fetch(&work(Some("001779"))).await.unwrap();
        assert_eq!(result.source, TextSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_on_archive_without_text() {
        let server = MockServer::start().await;
        let zip = build_zip(&[("cover.png", b"\x89PNG")]);

        Mock::given(path("/cards/001779/files/482_ruby.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(zip))
            .mount(&server)
            .await;
        Mock::given(path("/cards/001779/files/482.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sjis(BODY)))
            .mount(&server)
            .await;

        let result = fetcher_for(&server).fetch(&work(Some("001779"))).await.unwrap();
        assert_eq!(result.source, TextSource::Fallback);
        assert_eq!(result.text, BODY);
    }

    #[tokio::test]
    async fn test_both_endpoints_fail() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let err = fetcher_for(&server)
            .fetch(&work(Some("001779")))
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("archive:"));
        assert!(msg.contains("fallback:"));
    }

    #[tokio::test]
    async fn test_empty_fallback_is_failure() {
        let server = MockServer::start().await;

        Mock::given(path("/cards/001779/files/482_ruby.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/cards/001779/files/482.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"  \n".to_vec()))
            .mount(&server)
            .await;

        let err = fetcher_for(&server)
            .fetch(&work(Some("001779")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty text"));
    }

    #[tokio::test]
    async fn test_missing_author_mapping_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch(&work(None)).await.unwrap_err();
        assert!(err.to_string().contains("no author mapping"));
    }
}
