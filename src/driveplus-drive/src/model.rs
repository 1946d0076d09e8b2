//! Wire types of the file API and the metadata document.

use serde::{Deserialize, Serialize};

/// One bookmark in a folder's metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub url: String,
}

impl LinkEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// File identity returned by the file API.
///
/// Only valid for the operation that looked it up; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// refer to https://developers.google.com/drive/api/reference/rest/v3/files/list
#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<RemoteFile>,
}

/// Metadata part of a multipart create.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateMetadata<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub parents: [&'a str; 1],
}
