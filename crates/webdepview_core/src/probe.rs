use anyhow::{Context, Result, anyhow};
use futures::{FutureExt, future::BoxFuture};
use log::trace;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};

use crate::types::SizeProbe;

/// Reads an artifact's size from the `Content-Length` of a `HEAD` request.
///
/// The body is never downloaded and nothing is retried; any transport or
/// protocol failure is returned as an error.
#[derive(Debug, Clone, Default)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn head_content_length(&self, locator: &str) -> Result<u64> {
        trace!("HEAD {}", locator);
        let response = self
            .client
            .head(locator)
            .send()
            .await
            .with_context(|| format!("HEAD request failed for {}", locator))?
            .error_for_status()
            .with_context(|| format!("Unexpected response for {}", locator))?;

        content_length(response.headers()).with_context(|| format!("No usable size for {}", locator))
    }
}

impl SizeProbe for HttpProbe {
    fn size_of<'a>(&'a self, locator: &'a str) -> BoxFuture<'a, Result<u64>> {
        self.head_content_length(locator).boxed()
    }
}

/// Parses the declared `Content-Length` header.
pub(crate) fn content_length(headers: &HeaderMap) -> Result<u64> {
    let value = headers.get(CONTENT_LENGTH).ok_or_else(|| anyhow!("missing content-length"))?;
    let text = value.to_str().map_err(|_| anyhow!("content-length is not valid text"))?;
    text.trim().parse::<u64>().map_err(|_| anyhow!("non-numeric content-length: {:?}", text))
}
