//! File transfer implementation
//!
//! This module downloads the data files a harvest discovers:
//! - deriving the local file name from the URL
//! - streaming the body to disk in fixed-size chunks
//! - reporting progress after every chunk
//! - classifying failures (timeout, bad status, network, disk)
//!
//! The body is written to `<name>.part` and renamed on success. A failed
//! transfer never leaves a file behind.

use crate::config::{TransferConfig, UserAgentConfig};
use crate::state::TransferState;
use crate::url::{derive_file_name, partial_path};
use crate::TransferError;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

/// Called after every chunk written to disk
pub type ProgressCallback = Arc<dyn Fn(&TransferState) + Send + Sync>;

/// A completed download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Final location of the file
    pub path: PathBuf,

    /// Local file name, derived from the URL
    pub file_name: String,

    /// Bytes written
    pub bytes_written: u64,

    /// Declared `Content-Length`, if any
    pub total_bytes: Option<u64>,
}

/// Downloads one URL into a directory
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        url: &Url,
        destination_dir: &Path,
    ) -> Result<TransferOutcome, TransferError>;
}

/// Progress callback that writes one console line per chunk
pub fn log_progress() -> ProgressCallback {
    Arc::new(|state: &TransferState| tracing::info!("{}", state))
}

/// HTTP downloader with a whole-transfer time limit
pub struct TransferFetcher {
    client: Client,
    timeout: Duration,
    chunk_size: usize,
    progress: ProgressCallback,
}

impl TransferFetcher {
    /// Builds a fetcher from the transfer configuration
    pub fn from_config(
        config: &TransferConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Self::new(config.timeout(), config.chunk_size, user_agent)
    }

    /// Builds a fetcher with an explicit time limit and chunk size
    ///
    /// Transparent decompression is turned off so compressed payloads land
    /// on disk byte for byte.
    pub fn new(
        timeout: Duration,
        chunk_size: usize,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .no_gzip()
            .no_brotli()
            .build()?;

        Ok(Self {
            client,
            timeout,
            chunk_size: chunk_size.max(1),
            progress: log_progress(),
        })
    }

    /// Replaces the progress callback
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Sends the request and streams the body into `partial`
    async fn transfer(&self, url: &Url, partial: &Path) -> Result<TransferState, TransferError> {
        // Returns once the headers are in; the body is pulled chunk by chunk below
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length();
        tracing::debug!("{} declares {:?} bytes", url, total_bytes);

        let mut file = tokio::fs::File::create(partial)
            .await
            .map_err(|e| io_error(partial, e))?;

        let stream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| self.classify(url, e))),
        );

        let state = stream_to_writer(
            stream,
            &mut file,
            partial,
            total_bytes,
            self.chunk_size,
            &self.progress,
        )
        .await?;

        file.sync_all().await.map_err(|e| io_error(partial, e))?;
        Ok(state)
    }

    fn classify(&self, url: &Url, e: reqwest::Error) -> TransferError {
        if e.is_timeout() {
            TransferError::Timeout {
                url: url.to_string(),
                limit: self.timeout,
            }
        } else {
            TransferError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Downloader for TransferFetcher {
    /// Downloads `url` into `destination_dir`
    ///
    /// # Flow
    ///
    /// 1. Derive the file name from the URL's last path segment
    /// 2. Create the destination directory if needed
    /// 3. GET the URL; fail on a non-success status
    /// 4. Stream the body into `<name>.part`, reporting after every chunk
    /// 5. Rename to `<name>`, replacing any earlier download
    ///
    /// On any failure the partial file is removed.
    async fn download(
        &self,
        url: &Url,
        destination_dir: &Path,
    ) -> Result<TransferOutcome, TransferError> {
        let file_name = derive_file_name(url).ok_or_else(|| TransferError::NoFileName {
            url: url.to_string(),
        })?;

        tokio::fs::create_dir_all(destination_dir)
            .await
            .map_err(|e| io_error(destination_dir, e))?;

        let destination = destination_dir.join(&file_name);
        let partial = partial_path(&destination);

        tracing::info!("Starting download: {}", file_name);

        match self.transfer(url, &partial).await {
            Ok(state) => {
                tokio::fs::rename(&partial, &destination)
                    .await
                    .map_err(|e| io_error(&destination, e))?;

                Ok(TransferOutcome {
                    path: destination,
                    file_name,
                    bytes_written: state.bytes_read,
                    total_bytes: state.total_bytes,
                })
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Could not remove partial file {}: {}",
                            partial.display(),
                            remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> TransferError {
    TransferError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Copies a byte stream to a writer in fixed-size chunks
///
/// Network buffers arrive in arbitrary sizes; they are re-sliced so that
/// every write (and progress report) covers exactly `chunk_size` bytes,
/// except the last one. A body of S bytes produces `ceil(S / chunk_size)`
/// reports. The first stream error stops the copy; nothing is reported for
/// the bytes still buffered.
///
/// # Arguments
///
/// * `stream` - The body, as a stream of byte buffers
/// * `writer` - Destination
/// * `path` - Destination path, for error messages
/// * `total_bytes` - Declared length, None when unknown
/// * `chunk_size` - Bytes per write and per report
/// * `progress` - Called after every write
pub async fn stream_to_writer<S, B, W>(
    mut stream: S,
    writer: &mut W,
    path: &Path,
    total_bytes: Option<u64>,
    chunk_size: usize,
    progress: &ProgressCallback,
) -> Result<TransferState, TransferError>
where
    S: Stream<Item = Result<B, TransferError>> + Unpin,
    B: AsRef<[u8]>,
    W: AsyncWrite + Unpin,
{
    let chunk_size = chunk_size.max(1);
    let mut state = TransferState::new(total_bytes);
    let mut pending: Vec<u8> = Vec::with_capacity(chunk_size);

    while let Some(buffer) = stream.next().await {
        let buffer = buffer?;
        let mut data = buffer.as_ref();

        while !data.is_empty() {
            let take = (chunk_size - pending.len()).min(data.len());
            pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if pending.len() == chunk_size {
                write_chunk(writer, path, &pending, &mut state, progress).await?;
                pending.clear();
            }
        }
    }

    if !pending.is_empty() {
        write_chunk(writer, path, &pending, &mut state, progress).await?;
    }

    writer.flush().await.map_err(|e| io_error(path, e))?;
    Ok(state)
}

async fn write_chunk<W: AsyncWrite + Unpin>(
    writer: &mut W,
    path: &Path,
    chunk: &[u8],
    state: &mut TransferState,
    progress: &ProgressCallback,
) -> Result<(), TransferError> {
    writer
        .write_all(chunk)
        .await
        .map_err(|e| io_error(path, e))?;
    state.advance(chunk.len());
    progress(state);
    Ok(())
}
