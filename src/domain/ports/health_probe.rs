//! HealthProbe port - post-deploy HTTP verification

use thiserror::Error;

#[derive(Debug, Error)]
#[error("health probe failed: {0}")]
pub struct ProbeError(pub String);

/// Issues one HTTP GET and reports the status code
pub trait HealthProbe {
    fn probe(&self, url: &str) -> Result<u16, ProbeError>;
}

impl<T: HealthProbe + ?Sized> HealthProbe for &T {
    fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        (**self).probe(url)
    }
}
