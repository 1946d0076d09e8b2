//! `multipart/related` body for single-request file creation.

/// Boundary separating the metadata and content parts.
pub const BOUNDARY: &str = "-------314159265358979323846";

/// `Content-Type` header matching [`related_body`].
pub fn content_type() -> String {
    format!("multipart/related; boundary=\"{BOUNDARY}\"")
}

/// Join JSON file metadata and JSON file content into one multipart body.
pub fn related_body(metadata_json: &str, content_json: &str) -> String {
    let delimiter = format!("\r\n--{BOUNDARY}\r\n");
    let close_delimiter = format!("\r\n--{BOUNDARY}--");

    [
        delimiter.as_str(),
        "Content-Type: application/json; charset=UTF-8\r\n\r\n",
        metadata_json,
        delimiter.as_str(),
        "Content-Type: application/json\r\n\r\n",
        content_json,
        close_delimiter.as_str(),
    ]
    .concat()
}
