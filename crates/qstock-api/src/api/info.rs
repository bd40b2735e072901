//! Informational endpoints. Each returns a fixed body.

use axum::Json;

use crate::dto::{
    AboutResponse, ContactResponse, FeedbackResponse, MessageResponse, PrivacyResponse,
    TermsResponse, VersionResponse,
};

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::welcome())
}

/// GET /version
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse::default())
}

/// GET /docs
pub async fn docs() -> Json<MessageResponse> {
    Json(MessageResponse::docs())
}

/// GET /about
pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse::default())
}

/// GET /contact
pub async fn contact() -> Json<ContactResponse> {
    Json(ContactResponse::default())
}

/// GET /privacy
pub async fn privacy() -> Json<PrivacyResponse> {
    Json(PrivacyResponse::default())
}

/// GET /terms
pub async fn terms() -> Json<TermsResponse> {
    Json(TermsResponse::default())
}

/// GET /feedback
pub async fn feedback() -> Json<FeedbackResponse> {
    Json(FeedbackResponse::default())
}

/// GET /support
pub async fn support() -> Json<MessageResponse> {
    Json(MessageResponse::support())
}
