//! Response bodies.
//!
//! Every informational endpoint returns a fixed body; field order matches
//! the serialized JSON.

use std::collections::BTreeMap;

use serde::Serialize;

/// Version reported by `/version` and `/about`.
pub const API_VERSION: &str = "1.0.0";

const CONTACT_EMAIL: &str = "ranjan@accelcq.com";

/// Single-message body used by `/`, `/docs` and `/support`.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    /// Body for `GET /`.
    pub fn welcome() -> Self {
        Self {
            message: "Welcome to the Quantum Stock Prediction API. Use /predict to get predictions.",
        }
    }

    /// Body for `GET /docs`.
    pub fn docs() -> Self {
        Self {
            message: "API documentation is available at /docs.",
        }
    }

    /// Body for `GET /support`.
    pub fn support() -> Self {
        Self {
            message: "For support, please contact us at ranjan@accelcq.com",
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Status (always "ok" if responding).
    pub status: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub description: &'static str,
}

impl Default for VersionResponse {
    fn default() -> Self {
        Self {
            version: API_VERSION,
            description: "Quantum Stock Prediction API using Qiskit and IBM Quantum.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub contact: &'static str,
}

impl Default for AboutResponse {
    fn default() -> Self {
        Self {
            name: "Quantum Stock Prediction API from AccelCQ",
            version: API_VERSION,
            description: "An API that uses quantum computing to predict stock market trends.",
            author: "Your Name",
            contact: CONTACT_EMAIL,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialMedia {
    pub twitter: &'static str,
    pub linkedin: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub email: &'static str,
    pub phone: &'static str,
    pub website: &'static str,
    pub social_media: SocialMedia,
}

impl Default for ContactResponse {
    fn default() -> Self {
        Self {
            email: CONTACT_EMAIL,
            phone: "+1234567890",
            website: "https://www.accelcq.com",
            social_media: SocialMedia {
                twitter: "@accelcq",
                linkedin: "https://www.linkedin.com/company/accelcq",
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrivacyResponse {
    pub policy: &'static str,
    pub data_usage: &'static str,
    pub contact: &'static str,
}

impl Default for PrivacyResponse {
    fn default() -> Self {
        Self {
            policy: "We respect your privacy. No personal data is collected through this API.",
            data_usage: "Data is used solely for the purpose of providing quantum stock predictions.",
            contact: "For any privacy concerns, please contact us at ranjan@accelcq.com",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TermsResponse {
    pub terms: &'static str,
    pub usage: &'static str,
    pub liability: &'static str,
    pub contact: &'static str,
}

impl Default for TermsResponse {
    fn default() -> Self {
        Self {
            terms: "By using this API, you agree to the terms and conditions set forth by AccelCQ.",
            usage: "The API is provided 'as is' without any warranties.",
            liability: "AccelCQ is not liable for any damages arising from the use of this API.",
            contact: "For any inquiries, please contact us at ranjan@accelcq.com",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub message: &'static str,
    pub email: &'static str,
}

impl Default for FeedbackResponse {
    fn default() -> Self {
        Self {
            message: "We welcome your feedback to improve our API.",
            email: CONTACT_EMAIL,
        }
    }
}

/// `/predict` body: either the outcome distribution or an error message.
///
/// Both shapes are sent with status 200.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    /// Bitstring → probability, keys in ascending order.
    Distribution(BTreeMap<String, f64>),
    /// The prediction failed.
    Error { error: String },
}

impl PredictResponse {
    /// Create an error body.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}
