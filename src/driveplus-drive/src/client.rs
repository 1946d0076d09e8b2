//! File-provider API client.
//!
//! Thin wrapper over the five file calls the metadata store needs (query,
//! read, create, update, delete). Every call resolves a bearer token through
//! [`TokenProvider`] right before it is sent.

use std::sync::Arc;

use driveplus_common::DriveplusConfig;
use driveplus_login::TokenProvider;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{DriveError, Result};
use crate::model::{CreateMetadata, FileList, RemoteFile};
use crate::multipart;

const JSON_MIME: &str = "application/json";

/// Client for the file-provider REST API.
#[derive(Clone)]
pub struct DriveClient {
    client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    api_url: String,
    upload_url: String,
}

impl DriveClient {
    /// Create a client for the given metadata and upload base URLs.
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        api_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client using the base URLs from `config`.
    pub fn from_config(
        client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        config: &DriveplusConfig,
    ) -> Self {
        Self::new(
            client,
            tokens,
            &config.drive_api_url,
            &config.drive_upload_url,
        )
    }

    /// The token provider authorizing requests.
    pub fn tokens(&self) -> &Arc<TokenProvider> {
        &self.tokens
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens
            .get_valid_access_token()
            .await?
            .ok_or(DriveError::Unauthenticated)
    }

    /// Find a non-trashed file called `name` directly inside `parent_id`.
    ///
    /// Returns the first match; at most one is expected.
    pub async fn find_file(&self, parent_id: &str, name: &str) -> Result<Option<RemoteFile>> {
        let token = self.bearer().await?;
        let query = format!(
            "'{}' in parents and name='{}' and trashed=false",
            escape_query_literal(parent_id),
            escape_query_literal(name)
        );

        let response = self
            .client
            .get(format!("{}/files", self.api_url))
            .bearer_auth(&token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .await?;
        let response = check_status(response, "File query").await?;

        let list: FileList = response.json().await?;
        let file = list.files.into_iter().next();
        debug!(parent_id, name, found = file.is_some(), "Queried file");
        Ok(file)
    }

    /// Download a file's content and parse it as JSON.
    pub async fn read_json<T: DeserializeOwned>(&self, file_id: &str) -> Result<T> {
        let token = self.bearer().await?;

        let response = self
            .client
            .get(format!("{}/files/{}", self.api_url, file_id))
            .bearer_auth(&token)
            .header(reqwest::header::ACCEPT, JSON_MIME)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = check_status(response, "File read").await?;

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Create a JSON file named `name` inside `parent_id` in one multipart request.
    pub async fn create_json<T: Serialize + ?Sized>(
        &self,
        parent_id: &str,
        name: &str,
        content: &T,
    ) -> Result<RemoteFile> {
        let token = self.bearer().await?;

        let metadata = serde_json::to_string(&CreateMetadata {
            name,
            mime_type: JSON_MIME,
            parents: [parent_id],
        })?;
        let body = multipart::related_body(&metadata, &serde_json::to_string(content)?);

        let response = self
            .client
            .post(format!("{}/files", self.upload_url))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, multipart::content_type())
            .query(&[("uploadType", "multipart")])
            .body(body)
            .send()
            .await?;
        let response = check_status(response, "File create").await?;

        Ok(response.json().await?)
    }

    /// Replace a file's content with JSON.
    pub async fn update_json<T: Serialize + ?Sized>(
        &self,
        file_id: &str,
        content: &T,
    ) -> Result<RemoteFile> {
        let token = self.bearer().await?;

        let response = self
            .client
            .patch(format!("{}/files/{}", self.upload_url, file_id))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, JSON_MIME)
            .query(&[("uploadType", "media")])
            .body(serde_json::to_string(content)?)
            .send()
            .await?;
        let response = check_status(response, "File update").await?;

        Ok(response.json().await?)
    }

    /// Delete a file permanently.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let token = self.bearer().await?;

        let response = self
            .client
            .delete(format!("{}/files/{}", self.api_url, file_id))
            .bearer_auth(&token)
            .send()
            .await?;
        check_status(response, "File delete").await?;

        debug!(file_id, "File deleted");
        Ok(())
    }
}

async fn check_status(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DriveError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// Escape a value for use inside a single-quoted query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveplus_login::{MemorySessionStore, Session};
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, session: Session) -> DriveClient {
        let store = Arc::new(MemorySessionStore::with_session(&session));
        let tokens = Arc::new(TokenProvider::new(
            store,
            reqwest::Client::new(),
            server.uri(),
        ));
        DriveClient::new(
            reqwest::Client::new(),
            tokens,
            server.uri(),
            format!("{}/upload", server.uri()),
        )
    }

    fn logged_in() -> Session {
        Session::new(
            "token-1".to_string(),
            Some("refresh".to_string()),
            chrono::Utc::now().timestamp() + 3600,
        )
    }

    #[tokio::test]
    async fn test_find_file_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .and(header("authorization", "Bearer token-1"))
            .and(query_param(
                "q",
                "'abc123' in parents and name='drive++meta.json' and trashed=false",
            ))
            .and(query_param("fields", "files(id,name)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": [{"id": "file-1", "name": "drive++meta.json"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let file = client.find_file("abc123", "drive++meta.json").await.unwrap();
        assert_eq!(
            file,
            Some(RemoteFile {
                id: "file-1".to_string(),
                name: "drive++meta.json".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_find_file_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        assert_eq!(client.find_file("abc", "x.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unauthenticated_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Session::default());
        let err = client.find_file("abc", "x.json").await.unwrap_err();
        assert!(matches!(err, DriveError::Unauthenticated));
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_read_json_requests_media() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/file-1"))
            .and(query_param("alt", "media"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"[{"url":"https://example.com"}]"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let value: serde_json::Value = client.read_json("file-1").await.unwrap();
        assert_eq!(value, serde_json::json!([{"url": "https://example.com"}]));
    }

    #[tokio::test]
    async fn test_read_json_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let err = client
            .read_json::<Vec<crate::LinkEntry>>("file-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::MalformedDocument(_)));
    }

    #[tokio::test]
    async fn test_create_json_multipart() {
        let server = MockServer::start().await;
        let expected_body = multipart::related_body(
            r#"{"name":"drive++meta.json","mimeType":"application/json","parents":["abc"]}"#,
            r#"[{"url":"https://example.com"}]"#,
        );
        Mock::given(method("POST"))
            .and(path("/upload/files"))
            .and(query_param("uploadType", "multipart"))
            .and(header(
                "content-type",
                "multipart/related; boundary=\"-------314159265358979323846\"",
            ))
            .and(body_string(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "new-file", "name": "drive++meta.json"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let created = client
            .create_json(
                "abc",
                "drive++meta.json",
                &[crate::LinkEntry::new("https://example.com")],
            )
            .await
            .unwrap();
        assert_eq!(created.id, "new-file");
    }

    #[tokio::test]
    async fn test_update_json_media_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/upload/files/file-1"))
            .and(query_param("uploadType", "media"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"[{"url":"a"},{"url":"b"}]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "file-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let updated = client
            .update_json(
                "file-1",
                &[crate::LinkEntry::new("a"), crate::LinkEntry::new("b")],
            )
            .await
            .unwrap();
        assert_eq!(updated.id, "file-1");
        assert_eq!(updated.name, "");
    }

    #[tokio::test]
    async fn test_delete_file_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("File not found"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, logged_in());
        let err = client.delete_file("file-1").await.unwrap_err();
        match err {
            DriveError::Status {
                operation,
                status,
                body,
            } => {
                assert_eq!(operation, "File delete");
                assert_eq!(status, 404);
                assert_eq!(body, "File not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_escape_query_literal() {
        assert_eq!(escape_query_literal("plain"), "plain");
        assert_eq!(escape_query_literal("o'neil"), "o\\'neil");
        assert_eq!(escape_query_literal("a\\b"), "a\\\\b");
    }
}
