use crate::error::TransportError;
use crate::store::files::ByteStream;
use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// One file on its way to the remote endpoint.
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub len: u64,
    pub body: ByteStream,
}

/// Sends a file to the remote endpoint. `Ok` means the endpoint acknowledged
/// receipt; anything else is a failed attempt.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<(), TransportError>;
}

#[derive(Debug, Deserialize)]
struct Acknowledgement {
    success: bool,
}

/// Multipart POST to a media endpoint.
///
/// The file travels in the `file` field, with `Content-Disposition:
/// attachment; filename=<name>` and a bearer token on the request. Only a 2xx
/// response whose JSON body says `"success": true` counts as delivered.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl HttpTransport {
    pub fn new(
        endpoint: Url,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::NetworkFailure(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn upload(&self, request: UploadRequest) -> Result<(), TransportError> {
        let part = Part::stream_with_length(Body::wrap_stream(request.body), request.len)
            .file_name(request.file_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| TransportError::NetworkFailure(e.to_string()))?;
        let form = Form::new().part("file", part);

        debug!(endpoint = %self.endpoint, file_name = %request.file_name, len = request.len, "sending upload");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", request.file_name),
            )
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(format!("HTTP {}", status)));
        }

        let ack: Acknowledgement = response
            .json()
            .await
            .map_err(|e| TransportError::Rejected(format!("Unexpected response: {}", e)))?;
        if !ack.success {
            return Err(TransportError::Rejected(
                "Endpoint reported failure".to_string(),
            ));
        }
        Ok(())
    }
}

/// MIME type guessed from the stored name's extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::{Matcher, Server};

    fn request(name: &str, bytes: &'static [u8]) -> UploadRequest {
        UploadRequest {
            file_name: name.to_string(),
            content_type: content_type_for(name).to_string(),
            len: bytes.len() as u64,
            body: Box::pin(futures::stream::iter(vec![Ok(Bytes::from_static(bytes))])),
        }
    }

    fn transport(url: &str) -> HttpTransport {
        HttpTransport::new(
            Url::parse(url).unwrap(),
            "secret-token",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_multipart_with_required_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/wp-json/wp/v2/media")
            .match_header("authorization", "Bearer secret-token")
            .match_header(
                "content-disposition",
                "attachment; filename=photo-1-0.jpg",
            )
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="photo-1-0.jpg""#.to_string()),
                Matcher::Regex("image/jpeg".to_string()),
                Matcher::Regex("fake jpeg bytes".to_string()),
            ]))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "id": 42}"#)
            .create_async()
            .await;

        let url = format!("{}/wp-json/wp/v2/media", server.url());
        let result = transport(&url)
            .upload(request("photo-1-0.jpg", b"fake jpeg bytes"))
            .await;

        mock.assert_async().await;
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn negative_acknowledgement_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/media")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false}"#)
            .create_async()
            .await;

        let url = format!("{}/media", server.url());
        let result = transport(&url).upload(request("a.jpg", b"x")).await;

        assert!(matches!(result, Err(TransportError::Rejected(_))));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/media")
            .with_status(500)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let url = format!("{}/media", server.url());
        let result = transport(&url).upload(request("a.jpg", b"x")).await;

        assert_eq!(
            result,
            Err(TransportError::Rejected(
                "HTTP 500 Internal Server Error".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn unexpected_body_shape_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/media")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let url = format!("{}/media", server.url());
        let result = transport(&url).upload(request("a.jpg", b"x")).await;

        assert!(matches!(result, Err(TransportError::Rejected(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_failure() {
        let result = transport("http://127.0.0.1:1/media")
            .upload(request("a.jpg", b"x"))
            .await;

        assert!(matches!(result, Err(TransportError::NetworkFailure(_))));
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }
}
