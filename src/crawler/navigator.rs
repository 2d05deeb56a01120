//! Page navigation
//!
//! The `Navigator` is the harvest's single browsing session. It loads a URL
//! through a `PageRenderer`, then waits for the page to settle: rendering is
//! repeated until the links the caller expects are present or the settle
//! deadline passes.

use crate::config::{NavigatorConfig, UserAgentConfig};
use crate::crawler::parser::{find_links, LinkPredicate, RenderedPage};
use crate::NavigationError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Something that can turn a URL into a rendered page
///
/// The HTTP implementation below reads server-rendered markup; a headless
/// browser backend plugs in through the same trait.
#[async_trait]
pub trait PageRenderer: Send {
    /// Loads the URL and returns the page as currently rendered
    async fn render(&mut self, url: &Url) -> Result<RenderedPage, NavigationError>;

    /// Releases the underlying session
    async fn close(&mut self) {}
}

/// Builds the HTTP client used for page loads
///
/// # Arguments
///
/// * `config` - Page loading timings
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &NavigatorConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders pages with a plain HTTP GET
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(
        config: &NavigatorConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, user_agent)?,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&mut self, url: &Url) -> Result<RenderedPage, NavigationError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                NavigationError::Timeout {
                    url: url.to_string(),
                }
            } else {
                NavigationError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        tracing::trace!("Rendered {} ({} bytes)", final_url, html.len());
        Ok(RenderedPage::new(final_url, html))
    }

    async fn close(&mut self) {
        tracing::debug!("Closing HTTP page session");
    }
}

fn classify_request_error(url: &Url, e: reqwest::Error) -> NavigationError {
    if e.is_timeout() {
        NavigationError::Timeout {
            url: url.to_string(),
        }
    } else {
        NavigationError::Unreachable {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// The browsing session
///
/// Owned by the coordinator for the lifetime of a run and closed exactly
/// once on the way out.
pub struct Navigator {
    renderer: Box<dyn PageRenderer>,
    settle_timeout: Duration,
    poll_interval: Duration,
    closed: bool,
}

impl Navigator {
    pub fn new(renderer: Box<dyn PageRenderer>, config: &NavigatorConfig) -> Self {
        Self::with_timings(renderer, config.settle_timeout(), config.poll_interval())
    }

    pub fn with_timings(
        renderer: Box<dyn PageRenderer>,
        settle_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            renderer,
            settle_timeout,
            poll_interval,
            closed: false,
        }
    }

    /// Loads a page and waits for it to settle
    ///
    /// With a readiness predicate, the page is re-rendered every poll
    /// interval until at least one link matches or the settle timeout
    /// elapses; the last render is returned either way. Without one, the
    /// navigator waits out the whole settle timeout once.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the URL is invalid, the session is
    /// closed, or the renderer cannot load the page.
    pub async fn load(
        &mut self,
        url: &str,
        ready: Option<&LinkPredicate>,
    ) -> Result<RenderedPage, NavigationError> {
        if self.closed {
            return Err(NavigationError::SessionClosed);
        }

        let url = Url::parse(url).map_err(|e| NavigationError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let deadline = Instant::now() + self.settle_timeout;

        let Some(predicate) = ready else {
            let page = self.renderer.render(&url).await?;
            tokio::time::sleep_until(deadline).await;
            return Ok(page);
        };

        let mut renders = 0u32;
        loop {
            let page = self.renderer.render(&url).await?;
            renders += 1;

            if !find_links(&page, predicate).is_empty() {
                tracing::debug!("{} ready after {} render(s)", url, renders);
                return Ok(page);
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(
                    "{} settled without a match for {:?} after {} render(s)",
                    url,
                    predicate,
                    renders
                );
                return Ok(page);
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Closes the session; later loads fail with `SessionClosed`
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.renderer.close().await;
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
