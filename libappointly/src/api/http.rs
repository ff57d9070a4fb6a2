//! HTTP implementation of the collaborator traits

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ApiResult, ProviderSource, UserApi};
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::types::{AvatarUpload, Provider, ProfileUpdateRequest, SignUpRequest, UserProfile};

/// Error body the API sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a non-success response to an `ApiError::Status`, preferring the
/// server's `message` field over the raw body
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// REST client for the booking API.
///
/// Every request carries the bearer token of the current session, if any.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies)
    pub fn with_client(client: Client, base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.authorized(request).send().await?;
        Self::read(response).await
    }

    async fn read<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProviderSource for HttpApi {
    async fn list_providers(&self) -> ApiResult<Vec<Provider>> {
        tracing::debug!("GET {}", self.url("providers"));
        self.send(self.client.get(self.url("providers"))).await
    }
}

#[async_trait]
impl UserApi for HttpApi {
    async fn create_user(&self, request: &SignUpRequest) -> ApiResult<UserProfile> {
        tracing::debug!("POST {}", self.url("users"));
        self.send(self.client.post(self.url("users")).json(request))
            .await
    }

    async fn update_profile(&self, request: &ProfileUpdateRequest) -> ApiResult<UserProfile> {
        tracing::debug!(
            password_change = request.password_change.is_some(),
            "PUT {}",
            self.url("profile")
        );
        self.send(self.client.put(self.url("profile")).json(request))
            .await
    }

    async fn update_avatar(&self, upload: AvatarUpload) -> ApiResult<UserProfile> {
        tracing::debug!(
            file_name = %upload.file_name,
            bytes = upload.bytes.len(),
            "PATCH {}",
            self.url("users/avatar")
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.content_type)?;
        let form = Form::new().part("avatar", part);

        self.send(self.client.patch(self.url("users/avatar")).multipart(form))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PasswordChange, Session};
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const PROFILE_JSON: &str =
        r#"{"id":"u1","name":"Ana","email":"ana@x.com","avatar_url":"https://cdn.example.com/u1.jpg"}"#;

    /// One HTTP request as the server saw it
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
            })
        }

        fn body_text(&self) -> String {
            String::from_utf8_lossy(&self.body).to_string()
        }

        fn body_json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    /// Accept a single request on a local port and answer it with
    /// `status` and a JSON `body`
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before the request head");
                raw.extend_from_slice(&chunk[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let mut captured = Captured {
                head: String::from_utf8_lossy(&raw[..head_end]).to_string(),
                body: Vec::new(),
            };
            let content_length = captured
                .header("content-length")
                .and_then(|value| value.parse::<usize>().ok());
            let chunked = captured
                .header("transfer-encoding")
                .is_some_and(|value| value.eq_ignore_ascii_case("chunked"));

            loop {
                let body = &raw[head_end..];
                let complete = match content_length {
                    Some(len) => body.len() >= len,
                    None if chunked => body.ends_with(b"0\r\n\r\n"),
                    None => true,
                };
                if complete {
                    break;
                }
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before the request body");
                raw.extend_from_slice(&chunk[..n]);
            }
            captured.body = raw[head_end..].to_vec();

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            captured
        });

        (base_url, server)
    }

    fn client(base_url: &str, session: SessionStore) -> HttpApi {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpApi::with_client(client, base_url, session)
    }

    fn signed_in() -> SessionStore {
        let store = SessionStore::in_memory();
        store
            .sign_in(Session::new(
                UserProfile {
                    id: "u1".to_string(),
                    name: "Ana".to_string(),
                    email: "ana@x.com".to_string(),
                    avatar_url: None,
                },
                "token-123",
            ))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_list_providers_request() {
        let (base_url, server) =
            serve_once("200 OK", r#"[{"id":"1","name":"Dr. Ana","avatar_url":""}]"#).await;

        let providers = client(&base_url, signed_in()).list_providers().await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(request.request_line(), "GET /providers HTTP/1.1");
        assert_eq!(request.header("authorization"), Some("Bearer token-123"));
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "Dr. Ana");
    }

    #[tokio::test]
    async fn test_profile_update_without_password_keys() {
        let (base_url, server) = serve_once("200 OK", PROFILE_JSON).await;
        let request = ProfileUpdateRequest {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password_change: None,
        };

        let profile = client(&base_url, signed_in())
            .update_profile(&request)
            .await
            .unwrap();
        let captured = server.await.unwrap();

        assert_eq!(captured.request_line(), "PUT /profile HTTP/1.1");
        assert_eq!(captured.header("authorization"), Some("Bearer token-123"));
        assert!(captured
            .header("content-type")
            .is_some_and(|value| value.starts_with("application/json")));
        assert_eq!(
            captured.body_json(),
            json!({"name": "Ana", "email": "ana@x.com"})
        );
        assert_eq!(profile.id, "u1");
    }

    #[tokio::test]
    async fn test_profile_update_sends_password_block() {
        let (base_url, server) = serve_once("200 OK", PROFILE_JSON).await;
        let request = ProfileUpdateRequest {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password_change: Some(PasswordChange {
                old_password: "old".to_string(),
                password: "new-secret".to_string(),
                password_confirmation: "new-secret".to_string(),
            }),
        };

        client(&base_url, signed_in())
            .update_profile(&request)
            .await
            .unwrap();
        let captured = server.await.unwrap();

        assert_eq!(
            captured.body_json(),
            json!({
                "name": "Ana",
                "email": "ana@x.com",
                "old_password": "old",
                "password": "new-secret",
                "password_confirmation": "new-secret"
            })
        );
    }

    #[tokio::test]
    async fn test_avatar_upload_is_multipart() {
        let (base_url, server) = serve_once("200 OK", PROFILE_JSON).await;

        let profile = client(&base_url, signed_in())
            .update_avatar(AvatarUpload::for_user("u1", b"jpeg-bytes".to_vec()))
            .await
            .unwrap();
        let captured = server.await.unwrap();
        let body = captured.body_text();

        assert_eq!(captured.request_line(), "PATCH /users/avatar HTTP/1.1");
        assert_eq!(captured.header("authorization"), Some("Bearer token-123"));
        assert!(captured
            .header("content-type")
            .is_some_and(|value| value.starts_with("multipart/form-data; boundary=")));
        assert!(body.contains(r#"name="avatar""#));
        assert!(body.contains(r#"filename="u1.jpg""#));
        assert!(body.to_ascii_lowercase().contains("content-type: image/jpeg"));
        assert!(body.contains("jpeg-bytes"));
        assert!(profile.avatar_url.is_some());
    }

    #[tokio::test]
    async fn test_create_user_without_session() {
        let (base_url, server) = serve_once("201 Created", PROFILE_JSON).await;
        let request = SignUpRequest {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "secret1".to_string(),
        };

        client(&base_url, SessionStore::in_memory())
            .create_user(&request)
            .await
            .unwrap();
        let captured = server.await.unwrap();

        assert_eq!(captured.request_line(), "POST /users HTTP/1.1");
        assert_eq!(captured.header("authorization"), None);
        assert_eq!(
            captured.body_json(),
            json!({"name": "Ana", "email": "ana@x.com", "password": "secret1"})
        );
    }

    #[tokio::test]
    async fn test_error_response_carries_server_message() {
        let (base_url, server) = serve_once(
            "400 Bad Request",
            r#"{"status":"error","message":"Old password does not match"}"#,
        )
        .await;
        let request = ProfileUpdateRequest {
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password_change: None,
        };

        let error = client(&base_url, signed_in())
            .update_profile(&request)
            .await
            .unwrap_err();
        server.await.unwrap();

        match error {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Old password does not match");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_url_joining() {
        let api = HttpApi::new("http://localhost:3333/", SessionStore::in_memory());

        assert_eq!(api.base_url(), "http://localhost:3333");
        assert_eq!(api.url("providers"), "http://localhost:3333/providers");
        assert_eq!(api.url("/users/avatar"), "http://localhost:3333/users/avatar");
    }

    #[test]
    fn test_status_error_uses_server_message() {
        let error = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"status":"error","message":"Old password does not match"}"#,
        );

        match error {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Old password does not match");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_falls_back_to_body_or_reason() {
        let error = status_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert!(error.to_string().contains("upstream down"));

        let error = status_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(
            error.to_string(),
            "Server responded with 401: Unauthorized"
        );
    }
}
