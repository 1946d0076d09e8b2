//! In-memory fake of the file API for tests.
//!
//! [`FakeDrive`] runs a wiremock server that answers the query, read,
//! multipart create, media update and delete calls against a shared file
//! table, so write-then-read sequences behave like the real service.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use driveplus_common::config::DEFAULT_METADATA_FILE_NAME;
use driveplus_login::{MemorySessionStore, Session, TokenProvider};
use parking_lot::{Mutex, MutexGuard};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::client::DriveClient;
use crate::multipart::BOUNDARY;
use crate::store::MetadataStore;

/// Access token the fake accepts.
pub const FAKE_TOKEN: &str = "fake-access-token";

#[derive(Debug, Clone)]
struct FakeFile {
    parent: String,
    name: String,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct FakeState {
    files: BTreeMap<String, FakeFile>,
    next_id: u64,
    write_delay: Option<Duration>,
}

impl FakeState {
    fn insert(&mut self, file: FakeFile) -> String {
        self.next_id += 1;
        let id = format!("file-{}", self.next_id);
        self.files.insert(id.clone(), file);
        id
    }
}

/// Stateful fake of the file API.
pub struct FakeDrive {
    server: MockServer,
    state: Arc<Mutex<FakeState>>,
}

impl FakeDrive {
    /// Start the fake on a random local port.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(FakeState::default()));

        Mock::given(any())
            .respond_with(FakeResponder {
                state: Arc::clone(&state),
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    /// Base URL for metadata calls (`/files`).
    pub fn api_url(&self) -> String {
        self.server.uri()
    }

    /// Base URL for upload calls (`/upload/files`).
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.server.uri())
    }

    /// Token provider whose store holds `session`.
    ///
    /// Token API calls against the fake answer 404, so only sessions that do
    /// not need a refresh are useful here.
    pub fn token_provider(&self, session: &Session) -> Arc<TokenProvider> {
        let store = Arc::new(MemorySessionStore::with_session(session));
        Arc::new(TokenProvider::new(
            store,
            reqwest::Client::new(),
            self.server.uri(),
        ))
    }

    /// Client authorized with `tokens`.
    pub fn client(&self, tokens: Arc<TokenProvider>) -> DriveClient {
        DriveClient::new(
            reqwest::Client::new(),
            tokens,
            self.api_url(),
            self.upload_url(),
        )
    }

    /// Store logged in with [`FAKE_TOKEN`].
    pub fn store(&self) -> MetadataStore {
        self.store_with_token(FAKE_TOKEN)
    }

    /// Store logged in with an arbitrary (possibly rejected) token.
    pub fn store_with_token(&self, token: &str) -> MetadataStore {
        let session = Session::new(
            token.to_string(),
            Some("fake-refresh-token".to_string()),
            far_future_expiry(),
        );
        MetadataStore::new(
            self.client(self.token_provider(&session)),
            DEFAULT_METADATA_FILE_NAME,
        )
    }

    /// Store without any session.
    pub fn logged_out_store(&self) -> MetadataStore {
        MetadataStore::new(
            self.client(self.token_provider(&Session::default())),
            DEFAULT_METADATA_FILE_NAME,
        )
    }

    /// Put a file directly into the table, bypassing the API.
    pub fn insert_raw(&self, parent: &str, name: &str, content: &[u8]) -> String {
        self.lock().insert(FakeFile {
            parent: parent.to_string(),
            name: name.to_string(),
            content: content.to_vec(),
        })
    }

    /// Number of files whose parent is `parent`.
    pub fn files_in(&self, parent: &str) -> usize {
        self.lock()
            .files
            .values()
            .filter(|f| f.parent == parent)
            .count()
    }

    /// Raw content of the first file named `name` inside `parent`.
    pub fn content_of(&self, parent: &str, name: &str) -> Option<Vec<u8>> {
        self.lock()
            .files
            .values()
            .find(|f| f.parent == parent && f.name == name)
            .map(|f| f.content.clone())
    }

    /// Hold every create, update and delete response for `delay`.
    pub fn set_write_delay(&self, delay: Duration) {
        self.lock().write_delay = Some(delay);
    }

    /// Number of requests the fake has answered.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock()
    }
}

// One year ahead; the fake never refreshes.
fn far_future_expiry() -> i64 {
    chrono::Utc::now().timestamp() + 365 * 24 * 3600
}

struct FakeResponder {
    state: Arc<Mutex<FakeState>>,
}

impl Respond for FakeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {FAKE_TOKEN}"));
        if !authorized {
            return ResponseTemplate::new(401).set_body_string("Invalid Credentials");
        }

        let mut state = self.state.lock();
        let path = request.url.path();
        let query = |key: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };

        let response = match request.method.as_str() {
            "GET" if path == "/files" => {
                let Some((parent, name)) = query("q").as_deref().and_then(parse_query) else {
                    return ResponseTemplate::new(400).set_body_string("bad query");
                };
                let files: Vec<_> = state
                    .files
                    .iter()
                    .filter(|(_, f)| f.parent == parent && f.name == name)
                    .map(|(id, f)| serde_json::json!({"id": id, "name": f.name}))
                    .collect();
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": files }))
            }
            "GET" if path.starts_with("/files/") => {
                let id = &path["/files/".len()..];
                if query("alt").as_deref() != Some("media") {
                    return ResponseTemplate::new(400).set_body_string("expected alt=media");
                }
                match state.files.get(id) {
                    Some(file) => ResponseTemplate::new(200)
                        .set_body_raw(file.content.clone(), "application/json"),
                    None => ResponseTemplate::new(404).set_body_string("File not found"),
                }
            }
            "POST" if path == "/upload/files" => {
                let Some((metadata, content)) = parse_multipart(&request.body) else {
                    return ResponseTemplate::new(400).set_body_string("bad multipart body");
                };
                let name = metadata["name"].as_str().unwrap_or_default().to_string();
                let parent = metadata["parents"][0].as_str().unwrap_or_default().to_string();
                let id = state.insert(FakeFile {
                    parent,
                    name: name.clone(),
                    content,
                });
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": id, "name": name}))
            }
            "PATCH" if path.starts_with("/upload/files/") => {
                let id = &path["/upload/files/".len()..];
                match state.files.get_mut(id) {
                    Some(file) => {
                        file.content = request.body.clone();
                        ResponseTemplate::new(200)
                            .set_body_json(serde_json::json!({"id": id, "name": file.name}))
                    }
                    None => ResponseTemplate::new(404).set_body_string("File not found"),
                }
            }
            "DELETE" if path.starts_with("/files/") => {
                let id = &path["/files/".len()..];
                match state.files.remove(id) {
                    Some(_) => ResponseTemplate::new(204),
                    None => ResponseTemplate::new(404).set_body_string("File not found"),
                }
            }
            _ => ResponseTemplate::new(404),
        };

        match state.write_delay {
            Some(delay) if request.method.as_str() != "GET" => response.set_delay(delay),
            _ => response,
        }
    }
}

/// Split `'<parent>' in parents and name='<name>' and trashed=false`.
fn parse_query(q: &str) -> Option<(String, String)> {
    let rest = q.strip_prefix('\'')?;
    let (parent, rest) = rest.split_once("' in parents and name='")?;
    let name = rest.strip_suffix("' and trashed=false")?;
    Some((parent.to_string(), name.to_string()))
}

/// Extract the metadata and content parts of a multipart create body.
fn parse_multipart(body: &[u8]) -> Option<(serde_json::Value, Vec<u8>)> {
    let body = std::str::from_utf8(body).ok()?;
    let separator = format!("\r\n--{BOUNDARY}");
    let mut parts = body.split(separator.as_str()).skip(1);

    let metadata = parts.next()?.split_once("\r\n\r\n")?.1;
    let content = parts.next()?.split_once("\r\n\r\n")?.1;
    if parts.next()? != "--" {
        return None;
    }

    Some((
        serde_json::from_str(metadata).ok()?,
        content.as_bytes().to_vec(),
    ))
}
