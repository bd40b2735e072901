//! Connection settings for IBM Quantum.

use std::fmt;

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// IBM Cloud IAM token endpoint.
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// Device the prediction circuit runs on unless configured otherwise.
pub const DEFAULT_BACKEND: &str = "ibm_perth";

/// Settings needed to reach an IBM Quantum device.
#[derive(Clone)]
pub struct IbmConfig {
    /// IBM Cloud API key, exchanged for an IAM bearer token.
    pub api_key: String,
    /// Service CRN of the Quantum instance, sent as `Service-CRN`.
    pub service_crn: Option<String>,
    /// Target device name.
    pub target: String,
    /// Runtime API base URL.
    pub endpoint: String,
    /// IAM token URL.
    pub iam_url: String,
}

impl IbmConfig {
    /// Create a configuration with the default endpoints and target.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            service_crn: None,
            target: DEFAULT_BACKEND.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            iam_url: DEFAULT_IAM_URL.to_string(),
        }
    }

    /// Set the service CRN.
    pub fn with_service_crn(mut self, crn: impl Into<String>) -> Self {
        self.service_crn = Some(crn.into());
        self
    }

    /// Set the target device.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the runtime API base URL. A trailing slash is dropped.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the IAM token URL.
    pub fn with_iam_url(mut self, iam_url: impl Into<String>) -> Self {
        self.iam_url = iam_url.into();
        self
    }
}

impl fmt::Debug for IbmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmConfig")
            .field("api_key", &"[REDACTED]")
            .field("service_crn", &self.service_crn)
            .field("target", &self.target)
            .field("endpoint", &self.endpoint)
            .field("iam_url", &self.iam_url)
            .finish()
    }
}
