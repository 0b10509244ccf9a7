//! HTTP health probe

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::domain::ports::{HealthProbe, ProbeError};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

/// Issues one GET per probe and reports the status code
pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ProbeError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HealthProbe for HttpHealthProbe {
    fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        self.client
            .get(url)
            .send()
            .map(|response| response.status().as_u16())
            .map_err(|e| ProbeError(e.to_string()))
    }
}
