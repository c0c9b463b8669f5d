//! Upload session protocol client.
//!
//! An upload runs through three phases against the service:
//!
//! 1. **Initiate**: `POST {endpoint}/f/` with the file name and size. The
//!    service answers with a session id and one pre-signed URL per chunk.
//! 2. **Transfer**: every chunk is `PUT` to its URL, strictly in order, one
//!    request at a time. The `ETag` of each answer is kept as the part's
//!    integrity token.
//! 3. **Complete**: `POST {endpoint}/f/{uploadId}` with the ordered part list.
//!    The service answers with the id of the stored object.
//!
//! Any error aborts the whole upload. There is no retry and no resume.
//!
//! ## State machine
//!
//! ```text
//! Created -> Initiated -> Transferring -> Completed
//!    \           \             \
//!     `-----------`-------------`--> Failed
//! ```

pub mod wire;

pub use wire::Part;

use std::fmt;
use std::io::SeekFrom;
use std::ops::Range;
use std::sync::Arc;

use reqwest::header::{HeaderMap, CONTENT_LENGTH, ETAG};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result, UploadPhase};
use crate::progress::{ProgressReader, SectionReader};
use wire::{CompleteRequest, CompleteResponse, InitiateRequest, InitiateResponse};

/// Options for an upload session.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Base URL of the service, without trailing slash
    pub endpoint: String,
    /// Destination directory (requires `token`)
    pub directory_id: Option<String>,
    /// Bearer credential
    pub token: Option<String>,
    /// Size of each part in bytes
    pub chunk_size: u64,
    /// Block size used when streaming a part from disk
    pub read_block_size: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            endpoint: crate::DEFAULT_ENDPOINT.to_string(),
            directory_id: None,
            token: None,
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            read_block_size: crate::DEFAULT_READ_BLOCK_SIZE,
        }
    }
}

/// Upload session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// Session created locally, nothing sent yet
    Created,
    /// Service assigned a session id and part URLs
    Initiated,
    /// At least one part transferred
    Transferring,
    /// Session finalized into a stored object
    Completed,
    /// Upload aborted
    Failed,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Initiated => "initiated",
            Self::Transferring => "transferring",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Number of chunks needed to cover `size` bytes.
#[must_use]
pub const fn chunk_count(size: u64, chunk_size: u64) -> u64 {
    size.div_ceil(chunk_size)
}

/// Byte ranges of every chunk, in part order.
///
/// The ranges cover `[0, size)` exactly, without gaps or overlap.
#[must_use]
pub fn chunk_ranges(size: u64, chunk_size: u64) -> Vec<Range<u64>> {
    (0..chunk_count(size, chunk_size))
        .map(|i| {
            let start = i * chunk_size;
            start..start.saturating_add(chunk_size).min(size)
        })
        .collect()
}

/// Parse and check a service endpoint.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] unless the value is an absolute
/// `http` or `https` URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Client for one file's upload session.
pub struct Uploader {
    reader: Arc<ProgressReader>,
    client: Client,
    endpoint: String,
    name: String,
    size: u64,
    chunk_size: u64,
    read_block_size: usize,
    directory_id: Option<String>,
    token: Option<String>,
    upload_id: String,
    upload_urls: Vec<String>,
    completed_parts: Vec<Part>,
    state: UploadState,
}

impl Uploader {
    /// Create an upload session for the content behind `reader`.
    ///
    /// Validation happens here, before any network call.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, a directory is given
    /// without a token, the chunk size is zero or the endpoint is invalid.
    pub fn new(reader: Arc<ProgressReader>, name: &str, options: UploadOptions) -> Result<Self> {
        let size = reader.size();
        if size == 0 {
            return Err(Error::EmptyFile);
        }

        let token = options.token.filter(|t| !t.is_empty());
        let directory_id = options.directory_id.filter(|d| !d.is_empty());
        if directory_id.is_some() && token.is_none() {
            return Err(Error::DirectoryRequiresToken);
        }

        if options.chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }

        parse_endpoint(&options.endpoint)?;

        let client = Client::builder()
            .user_agent(format!("barfi/{}", crate::VERSION))
            .build()?;

        tracing::info!(name, size, "init upload");

        Ok(Self {
            reader,
            client,
            endpoint: options.endpoint.trim_end_matches('/').to_string(),
            name: name.to_string(),
            size,
            chunk_size: options.chunk_size,
            read_block_size: options.read_block_size,
            directory_id,
            token,
            upload_id: String::new(),
            upload_urls: Vec::new(),
            completed_parts: Vec::new(),
            state: UploadState::Created,
        })
    }

    /// Current session state.
    pub const fn state(&self) -> UploadState {
        self.state
    }

    /// Session id assigned by the service, empty before initiation.
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Pre-signed part URLs assigned by the service.
    pub fn upload_urls(&self) -> &[String] {
        &self.upload_urls
    }

    /// Parts transferred so far, in part order.
    pub fn completed_parts(&self) -> &[Part] {
        &self.completed_parts
    }

    /// Number of chunks the upload is split into.
    pub fn chunk_count(&self) -> usize {
        usize::try_from(chunk_count(self.size, self.chunk_size)).unwrap_or(usize::MAX)
    }

    /// Byte range of the chunk at `index` (0-based).
    pub fn chunk_range(&self, index: usize) -> Range<u64> {
        let start = (index as u64).saturating_mul(self.chunk_size).min(self.size);
        start..start.saturating_add(self.chunk_size).min(self.size)
    }

    /// Shareable address of a stored object.
    pub fn share_link(&self, id: &str) -> String {
        format!("{}/{id}", self.endpoint)
    }

    /// Run the full lifecycle: initiate, transfer every part in order,
    /// complete. Returns the id of the stored object.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; the session is then `Failed`.
    pub async fn upload(&mut self) -> Result<String> {
        self.initiate().await?;

        for index in 0..self.chunk_count() {
            self.upload_chunk(index).await?;
        }

        let id = self.complete().await?;
        tracing::info!(id = %id, link = %self.share_link(&id), "upload complete");
        Ok(id)
    }

    /// Open the session with the service.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, a non-200 answer, an undecodable body or a
    /// URL count that doesn't match the chunk count.
    pub async fn initiate(&mut self) -> Result<()> {
        let result = self.try_initiate().await;
        self.track(result)
    }

    /// Transfer the chunk at `index` (0-based) as part `index + 1`.
    ///
    /// Chunks must be transferred in order, starting at 0.
    ///
    /// # Errors
    ///
    /// Fails on out-of-order calls, I/O or transport errors, and any answer
    /// other than 200 or 201.
    pub async fn upload_chunk(&mut self, index: usize) -> Result<()> {
        let result = self.try_upload_chunk(index).await;
        self.track(result)
    }

    /// Finalize the session and return the id of the stored object.
    ///
    /// # Errors
    ///
    /// Fails if parts are missing, on transport errors, a non-200 answer or
    /// an undecodable body.
    pub async fn complete(&mut self) -> Result<String> {
        let result = self.try_complete().await;
        self.track(result)
    }

    async fn try_initiate(&mut self) -> Result<()> {
        self.expect_state("initiate", &[UploadState::Created])?;

        let body = InitiateRequest {
            name: &self.name,
            size: self.size,
        };
        let request = self.client.post(format!("{}/f/", self.endpoint)).json(&body);
        let response = self.authorized(request).send().await?;

        let data: InitiateResponse = decode(response, UploadPhase::Initiate).await?;

        tracing::debug!(
            upload_id = %data.upload_id,
            urls = ?data.upload_urls,
            "retrieved upload id"
        );

        let expected = self.chunk_count();
        if data.upload_urls.len() != expected {
            return Err(Error::UploadUrlMismatch {
                expected,
                actual: data.upload_urls.len(),
            });
        }

        self.upload_id = data.upload_id;
        self.upload_urls = data.upload_urls;
        self.state = UploadState::Initiated;
        Ok(())
    }

    async fn try_upload_chunk(&mut self, index: usize) -> Result<()> {
        self.expect_state(
            "upload part",
            &[UploadState::Initiated, UploadState::Transferring],
        )?;

        let expected = self.completed_parts.len();
        if index != expected {
            return Err(Error::PartOutOfOrder {
                expected: expected + 1,
                actual: index + 1,
            });
        }

        let Some(url) = self.upload_urls.get(index).cloned() else {
            return Err(Error::InvalidState {
                operation: "upload part",
                state: format!("{} with all {} parts sent", self.state, expected),
            });
        };

        let part_number = index + 1;
        let range = self.chunk_range(index);
        let len = range.end - range.start;

        self.reader.seek(SeekFrom::Start(range.start))?;

        tracing::debug!(
            url = %url,
            start = range.start,
            end = range.end,
            part = part_number,
            "uploading chunk"
        );

        let section = SectionReader::new(Arc::clone(&self.reader), range.start, len);
        let response = self
            .client
            .put(&url)
            .header(CONTENT_LENGTH, section.len())
            .body(Body::wrap_stream(section.into_stream(self.read_block_size)))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(Error::UnexpectedStatus {
                phase: UploadPhase::Part(part_number),
                status: status.as_u16(),
            });
        }

        let etag = etag_token(response.headers(), part_number);

        self.completed_parts.push(Part { etag, part_number });
        self.state = UploadState::Transferring;
        Ok(())
    }

    async fn try_complete(&mut self) -> Result<String> {
        self.expect_state("complete", &[UploadState::Transferring])?;

        let count = self.chunk_count();
        if self.completed_parts.len() != count {
            return Err(Error::InvalidState {
                operation: "complete",
                state: format!(
                    "{} with {} of {} parts sent",
                    self.state,
                    self.completed_parts.len(),
                    count
                ),
            });
        }
        if let Some((i, part)) = self
            .completed_parts
            .iter()
            .enumerate()
            .find(|(i, part)| part.part_number != i + 1)
        {
            return Err(Error::PartOutOfOrder {
                expected: i + 1,
                actual: part.part_number,
            });
        }

        let body = CompleteRequest {
            directory_id: self.directory_id.as_deref(),
            parts: &self.completed_parts,
        };

        let mut request = self
            .client
            .post(format!("{}/f/{}", self.endpoint, self.upload_id))
            .json(&body);
        // The service expects the directory both in the body and the query.
        if let Some(directory_id) = &self.directory_id {
            request = request.query(&[("directoryId", directory_id)]);
        }

        tracing::debug!(
            upload_id = %self.upload_id,
            parts = self.completed_parts.len(),
            authorized = self.token.is_some(),
            "sending complete upload request"
        );

        let response = self.authorized(request).send().await?;
        let data: CompleteResponse = decode(response, UploadPhase::Complete).await?;

        self.state = UploadState::Completed;
        Ok(data.id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn expect_state(&self, operation: &'static str, allowed: &[UploadState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state.to_string(),
            })
        }
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.state = UploadState::Failed;
        }
        result
    }
}

impl fmt::Debug for Uploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader")
            .field("endpoint", &self.endpoint)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("chunk_size", &self.chunk_size)
            .field("directory_id", &self.directory_id)
            .field("upload_id", &self.upload_id)
            .field("parts", &self.completed_parts.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Integrity token from the `ETag` header, empty when the header is absent.
///
/// Bytes that are not valid UTF-8 are replaced rather than dropped.
fn etag_token(headers: &HeaderMap, part_number: usize) -> String {
    let Some(value) = headers.get(ETAG) else {
        tracing::warn!(part = part_number, "service returned no ETag for part");
        return String::new();
    };

    match value.to_str() {
        Ok(etag) => etag.to_string(),
        Err(_) => {
            tracing::warn!(part = part_number, "ETag for part is not valid UTF-8");
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        }
    }
}

/// Check for a 200 answer and decode its JSON body.
async fn decode<T: DeserializeOwned>(response: Response, phase: UploadPhase) -> Result<T> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus {
            phase,
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Decode { phase, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::io::Cursor;

    fn reader(size: usize) -> Arc<ProgressReader> {
        Arc::new(ProgressReader::new(
            Cursor::new(vec![0u8; size]),
            size as u64,
            |_, _| {},
        ))
    }

    #[test]
    fn test_chunk_ranges_cover_file() {
        for (size, chunk) in [(1u64, 1u64), (10, 3), (12, 4), (12_000_000, 5_000_000), (7, 100)] {
            let ranges = chunk_ranges(size, chunk);
            assert_eq!(ranges.len() as u64, size.div_ceil(chunk));
            assert_eq!(ranges.first().unwrap().start, 0);
            assert_eq!(ranges.last().unwrap().end, size);
            assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
            assert!(ranges.iter().all(|r| r.end > r.start && r.end - r.start <= chunk));
        }
    }

    #[test]
    fn test_chunk_ranges_example() {
        assert_eq!(
            chunk_ranges(12_000_000, 5_000_000),
            vec![0..5_000_000, 5_000_000..10_000_000, 10_000_000..12_000_000]
        );
    }

    #[test]
    fn test_small_file_is_one_chunk() {
        let uploader = Uploader::new(reader(1024), "a.bin", UploadOptions::default()).unwrap();
        assert_eq!(uploader.chunk_count(), 1);
        assert_eq!(uploader.chunk_range(0), 0..1024);
    }

    #[test]
    fn test_new_rejects_empty_file() {
        let result = Uploader::new(reader(0), "empty.bin", UploadOptions::default());
        assert!(matches!(result, Err(Error::EmptyFile)));
    }

    #[test]
    fn test_new_rejects_directory_without_token() {
        let options = UploadOptions {
            directory_id: Some("dir1".to_string()),
            ..Default::default()
        };
        let result = Uploader::new(reader(10), "a.bin", options);
        assert!(matches!(result, Err(Error::DirectoryRequiresToken)));

        let options = UploadOptions {
            directory_id: Some("dir1".to_string()),
            token: Some(String::new()),
            ..Default::default()
        };
        let result = Uploader::new(reader(10), "a.bin", options);
        assert!(matches!(result, Err(Error::DirectoryRequiresToken)));
    }

    #[test]
    fn test_new_rejects_bad_options() {
        let options = UploadOptions {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Uploader::new(reader(10), "a.bin", options),
            Err(Error::InvalidChunkSize)
        ));

        let options = UploadOptions {
            endpoint: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Uploader::new(reader(10), "a.bin", options),
            Err(Error::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_share_link_trims_slash() {
        let options = UploadOptions {
            endpoint: "https://example.com/".to_string(),
            ..Default::default()
        };
        let uploader = Uploader::new(reader(10), "a.bin", options).unwrap();
        assert_eq!(uploader.share_link("abc123"), "https://example.com/abc123");
        assert_eq!(uploader.state(), UploadState::Created);
        assert!(uploader.upload_id().is_empty());
    }

    #[tokio::test]
    async fn test_chunk_before_initiate_fails() {
        let mut uploader = Uploader::new(reader(10), "a.bin", UploadOptions::default()).unwrap();
        let result = uploader.upload_chunk(0).await;

        assert!(matches!(result, Err(Error::InvalidState { .. })));
        assert_eq!(uploader.state(), UploadState::Failed);
    }

    #[tokio::test]
    async fn test_failed_session_rejects_everything() {
        let mut uploader = Uploader::new(reader(10), "a.bin", UploadOptions::default()).unwrap();
        let _ = uploader.complete().await;
        assert_eq!(uploader.state(), UploadState::Failed);

        assert!(matches!(
            uploader.initiate().await,
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_etag_token_kept_verbatim() {
        let mut headers = HeaderMap::new();
        assert_eq!(etag_token(&headers, 1), "");

        headers.insert(ETAG, HeaderValue::from_static("\"abc\""));
        assert_eq!(etag_token(&headers, 1), "\"abc\"");

        headers.insert(ETAG, HeaderValue::from_bytes(b"\"ab\xffc\"").unwrap());
        assert_eq!(etag_token(&headers, 2), "\"ab\u{fffd}c\"");
    }

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("https://fuckingfast.co").is_ok());
        assert!(parse_endpoint("http://127.0.0.1:8080").is_ok());
        assert!(parse_endpoint("fuckingfast.co").is_err());
        assert!(parse_endpoint("file:///tmp").is_err());
    }
}
