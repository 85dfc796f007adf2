use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Reachability check of an instance URL.
pub trait Probe: Send + Sync {
    /// True when the URL answered with a success status within the timeout.
    fn is_reachable(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// GETs the instance URL with a per-probe timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

impl Probe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.http.get(url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!(
                    event = "core.probe.completed",
                    url = url,
                    status = response.status().as_u16(),
                    reachable = ok
                );
                ok
            }
            Err(e) => {
                debug!(
                    event = "core.probe.failed",
                    url = url,
                    timeout = e.is_timeout(),
                    error = %e
                );
                false
            }
        }
    }
}
