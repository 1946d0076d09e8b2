//! Folder-view URL recognition.

use regex::Regex;

/// Recognizes `<base>/drive/u/<userIndex>/folders/<folderId>` URLs.
#[derive(Debug, Clone)]
pub struct FolderMatcher {
    pattern: Regex,
}

impl FolderMatcher {
    /// Build a matcher for folder views served from `base`.
    pub fn new(base: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^{}/drive/u/([^/?#]+)/folders/([^/?#]+)",
            regex::escape(base.trim_end_matches('/'))
        ))?;
        Ok(Self { pattern })
    }

    /// The folder id in `url`, or `None` when `url` is not a folder view.
    pub fn folder_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(url)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str())
    }
}

/// One-off form of [`FolderMatcher::folder_id`].
pub fn folder_id_from_url(base: &str, url: &str) -> Option<String> {
    FolderMatcher::new(base)
        .ok()?
        .folder_id(url)
        .map(str::to_string)
}
