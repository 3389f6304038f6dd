use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client as HttpClient, Url};
use tracing::{debug, warn};

use super::models::{ApiError, DetailBody, ListBody, PaymentEnvelope, PaymentQuery, WirePayment};
use crate::api::PaymentSource;
use crate::utils::errors::extract_api_message;
use crate::utils::ratelimit::rate_limit_api;

/// HTTP client for the node dashboard backend
pub struct DashboardClient {
    http_client: HttpClient,
    api_token: Option<String>,
    base_url: String,
}

impl DashboardClient {
    /// Create a new dashboard API client
    pub fn new(
        base_url: String,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create default headers, with authorization when a token is configured
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.api_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                ApiError::RequestError(format!("Failed to create auth header: {}", e))
            })?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Map a non-success response to an `ApiError`
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_text = response.text().await.unwrap_or_default();
        classify_status(status.as_u16(), retry_after.as_deref(), &body_text)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        rate_limit_api().await;
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /payments
    ///
    /// Lists one page of payments matching the query.
    ///
    /// # Returns
    /// * `Ok(PaymentEnvelope)` - Raw page of rows plus whatever total metadata the backend sent
    /// * `Err(ApiError)` - Transport, status or decoding failure
    pub async fn list_payments(&self, query: &PaymentQuery) -> Result<PaymentEnvelope, ApiError> {
        let url = format!("{}/payments", self.base_url);
        let pairs = query.to_query_pairs();
        debug!("GET {} {:?}", url, pairs);

        let body = self.get_json::<ListBody>(&url, &pairs).await?;
        accept_list_body(body)
    }

    /// GET /payments/{id}
    ///
    /// Retrieves a single payment by hash or id. The id is sent as one
    /// percent-encoded path segment.
    pub async fn get_payment(&self, id: &str) -> Result<WirePayment, ApiError> {
        let url = payment_url(&self.base_url, id)?;
        debug!("GET {}", url);

        let body: DetailBody = self.get_json(url.as_str(), &[]).await?;
        Ok(body.into())
    }
}

/// Map a non-success status to an `ApiError`, using the Retry-After header on 429
/// and the backend's error message from the body
fn classify_status(status_code: u16, retry_after: Option<&str>, body: &str) -> ApiError {
    let message = extract_api_message(body);

    match status_code {
        400 => ApiError::BadRequest(message),
        401 => ApiError::Unauthorized(message),
        403 => ApiError::Forbidden(message),
        404 => ApiError::NotFound(message),
        429 => {
            let retry_after_secs = retry_after
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            warn!("Rate limited by dashboard API, retry after {} s", retry_after_secs);
            ApiError::RateLimited { retry_after_secs }
        }
        500..=599 => {
            warn!("Server error {}: {}", status_code, message);
            ApiError::ServerError(status_code, message)
        }
        _ => ApiError::HttpError(status_code, message),
    }
}

/// A 2xx list body still fails when the backend says `success: false`
fn accept_list_body(body: ListBody) -> Result<PaymentEnvelope, ApiError> {
    let envelope: PaymentEnvelope = body.into();

    if envelope.success == Some(false) {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| "backend reported failure".to_string());
        return Err(ApiError::Rejected(message));
    }

    Ok(envelope)
}

fn payment_url(base_url: &str, id: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::RequestError(format!("Invalid base URL '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::RequestError(format!("Base URL '{}' cannot take a path", base_url)))?
        .pop_if_empty()
        .push("payments")
        .push(id);
    Ok(url)
}

#[async_trait]
impl PaymentSource for DashboardClient {
    async fn list_payments(&self, query: &PaymentQuery) -> Result<PaymentEnvelope, ApiError> {
        DashboardClient::list_payments(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn list_body(json: &str) -> ListBody {
        serde_json::from_str(json).unwrap()
    }

    /// Answer a single HTTP request with `status` and `body`, returning the base URL
    async fn serve_once(status: &str, extra_headers: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            concat!(
                "HTTP/1.1 {}\r\n{}",
                "Content-Type: application/json\r\n",
                "Content-Length: {}\r\n",
                "Connection: close\r\n\r\n{}"
            ),
            status,
            extra_headers,
            body.len(),
            body
        );
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> DashboardClient {
        DashboardClient::new(base_url, Some("secret".to_string()), Duration::from_secs(5)).unwrap()
    }

    fn first_page() -> PaymentQuery {
        PaymentQuery::new(crate::models::DirectionTab::All, &Default::default(), 1, 10)
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(429, Some(" 30 "), ""),
            ApiError::RateLimited { retry_after_secs: 30 }
        ));
        assert!(matches!(
            classify_status(429, None, ""),
            ApiError::RateLimited { retry_after_secs: 1 }
        ));
        assert!(matches!(
            classify_status(429, Some("Wed, 21 Oct 2015 07:28:00 GMT"), ""),
            ApiError::RateLimited { retry_after_secs: 1 }
        ));

        match classify_status(503, None, r#"{"message":"node unreachable"}"#) {
            ApiError::ServerError(503, message) => assert_eq!(message, "node unreachable"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(classify_status(401, None, ""), ApiError::Unauthorized(_)));
        assert!(matches!(classify_status(404, None, ""), ApiError::NotFound(_)));
        assert!(matches!(classify_status(418, None, ""), ApiError::HttpError(418, _)));
    }

    #[test]
    fn test_unsuccessful_envelope_is_rejected() {
        let rejected = accept_list_body(list_body(r#"{"success":false,"message":"node offline"}"#));
        match rejected {
            Err(ApiError::Rejected(message)) => assert_eq!(message, "node offline"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            accept_list_body(list_body(r#"{"success":false}"#)),
            Err(ApiError::Rejected(_))
        ));

        let body = list_body(r#"{"success":true,"data":{"items":[],"total":4}}"#);
        let envelope = accept_list_body(body).unwrap();
        assert_eq!(envelope.total_items(), 4);
        let bare = accept_list_body(list_body(r#"[{"id":"a"},{"id":"b"}]"#)).unwrap();
        assert_eq!(bare.total_items(), 2);
    }

    #[test]
    fn test_payment_url_encodes_id() {
        let url = payment_url("https://node.example/api", "a?b/../c").unwrap();
        assert_eq!(url.as_str(), "https://node.example/api/payments/a%3Fb%2F..%2Fc");

        let url = payment_url("https://node.example", "abc123").unwrap();
        assert_eq!(url.as_str(), "https://node.example/payments/abc123");

        assert!(payment_url("not a url", "x").is_err());
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let base = serve_once("429 Too Many Requests", "Retry-After: 7\r\n", "").await;
        let result = client(base).list_payments(&first_page()).await;
        assert!(matches!(result, Err(ApiError::RateLimited { retry_after_secs: 7 })));
    }

    #[tokio::test]
    async fn test_success_false_over_http_is_rejected() {
        let base = serve_once("200 OK", "", r#"{"success":false,"message":"node offline"}"#).await;
        let result = client(base).list_payments(&first_page()).await;
        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_list_page_over_http() {
        let body = r#"{"success":true,"data":{"items":[{"id":"a"}],"total":11}}"#;
        let base = serve_once("200 OK", "", body).await;
        let envelope = client(base).list_payments(&first_page()).await.unwrap();
        assert_eq!(envelope.total_items(), 11);
        assert_eq!(envelope.rows().len(), 1);
    }
}
