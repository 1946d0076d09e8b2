//! Utility functions for the driveplus-login module.

use std::path::Path;

/// Mask a token for safe display.
pub fn safe_format_token(token: &str) -> String {
    if token.len() <= 13 {
        return "***".to_string();
    }
    let prefix = &token[..8];
    let suffix = &token[token.len() - 5..];
    format!("{prefix}***{suffix}")
}

/// Set restrictive file permissions (0600 on Unix).
pub(crate) async fn set_file_permissions(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}
