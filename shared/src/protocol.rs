use crate::{GenerateReviewRequest, HealthResponse, PaymentRequest, PaymentResponse, GenerateReviewResponse};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize + DeserializeOwned {
    /// The response type returned by this request.
    type Response: Serialize + DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
}

// =========================================================
// Request Definitions
// =========================================================

impl ApiRequest for GenerateReviewRequest {
    type Response = GenerateReviewResponse;
    const PATH: &'static str = "/api/generate-review";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for PaymentRequest {
    type Response = PaymentResponse;
    const PATH: &'static str = "/api/process-payment";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Liveness probe
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthRequest;

impl ApiRequest for HealthRequest {
    type Response = HealthResponse;
    const PATH: &'static str = "/api/health";
    const METHOD: HttpMethod = HttpMethod::Get;
}
