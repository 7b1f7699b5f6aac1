//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use relive_core::config::ClientConfig;
use relive_core::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartForm, RequestBody,
};
use relive_core::{ReliveError, Result};
use reqwest::Client;
use reqwest::multipart::{Form, Part};

/// Sends requests to the configured API base URL.
///
/// JSON requests use the request timeout, multipart uploads the upload timeout.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("relive-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReliveError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_form(form: MultipartForm) -> Result<Form> {
        let mut multipart = Form::new();
        for (name, value) in form.fields {
            multipart = multipart.text(name, value);
        }
        for file in form.files {
            let part = Part::bytes(file.data.to_vec())
                .file_name(file.file_name)
                .mime_str(&file.mime_type)
                .map_err(|e| {
                    ReliveError::transport(format!("Invalid MIME type '{}': {}", file.mime_type, e))
                })?;
            multipart = multipart.part(file.field, part);
        }
        Ok(multipart)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest { spec, bearer } = request;
        let url = self.config.endpoint(&spec.path);
        let timeout = if spec.is_multipart() {
            self.config.upload_timeout()
        } else {
            self.config.request_timeout()
        };

        let mut builder = self
            .client
            .request(to_reqwest_method(spec.method), &url)
            .timeout(timeout);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match spec.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(Self::build_form(form)?),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("[HttpTransport] {} {} failed: {}", spec.method, spec.path, e);
            ReliveError::transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ReliveError::transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!("[HttpTransport] {} {} -> {}", spec.method, spec.path, status);
        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use relive_core::http::FilePart;

    #[test]
    fn test_invalid_mime_is_rejected() {
        let form = MultipartForm::new().file(FilePart {
            field: "image".into(),
            file_name: "x".into(),
            mime_type: "not a mime".into(),
            data: Bytes::from_static(b"x"),
        });
        assert!(matches!(
            ReqwestTransport::build_form(form),
            Err(ReliveError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:1/api".into(),
            request_timeout_secs: 2,
            ..ClientConfig::default()
        };
        let transport = ReqwestTransport::new(config).unwrap();

        let err = transport
            .execute(relive_core::http::RequestSpec::get("/auth/me/").anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, ReliveError::Transport(_)));
    }
}
