//! Google Drive share-link parsing.
//!
//! Publish requests reference the source video by a Drive share link. The
//! file id has to be pulled out of the link and turned into the direct
//! download form before any request is made, so a bad link fails fast and
//! never touches the network.

use url::Url;

/// Errors that can occur during Drive file-id extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveLinkError {
    /// URL is not a Google Drive URL
    NotADriveUrl,
    /// File id has invalid format
    InvalidFileId,
    /// File id not found in URL
    FileIdNotFound,
}

impl std::fmt::Display for DriveLinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriveLinkError::NotADriveUrl => write!(f, "URL is not a Google Drive URL"),
            DriveLinkError::InvalidFileId => write!(f, "Drive file id has invalid format"),
            DriveLinkError::FileIdNotFound => write!(f, "Drive file id not found in URL"),
        }
    }
}

impl std::error::Error for DriveLinkError {}

/// Result type for Drive file-id extraction.
pub type DriveLinkResult<T> = Result<T, DriveLinkError>;

/// Drive file ids are at least this long; anything shorter is a path
/// fragment picked up by mistake.
const MIN_FILE_ID_LEN: usize = 12;
const MAX_FILE_ID_LEN: usize = 128;

/// Extract the opaque file id from a Google Drive share link.
///
/// Supports the link shapes Drive hands out:
/// - https://drive.google.com/file/d/FILE_ID/view?usp=sharing
/// - https://drive.google.com/d/FILE_ID/
/// - https://drive.google.com/open?id=FILE_ID
/// - https://drive.google.com/uc?export=download&id=FILE_ID
/// - docs.google.com equivalents of the above
///
/// Returns the file id or an error, without performing any network I/O.
pub fn extract_drive_file_id(link: &str) -> DriveLinkResult<String> {
    let link = link.trim();

    let parsed = Url::parse(link).map_err(|_| DriveLinkError::NotADriveUrl)?;
    if !is_drive_host(&parsed) {
        return Err(DriveLinkError::NotADriveUrl);
    }

    if let Some(id) = extract_from_d_segment(parsed.path()) {
        return validate_file_id(id);
    }

    if let Some(id) = extract_from_id_query(&parsed) {
        return validate_file_id(id);
    }

    Err(DriveLinkError::FileIdNotFound)
}

/// Build the direct-download URL for a previously extracted file id.
pub fn direct_download_url(file_id: &str) -> String {
    format!(
        "https://drive.google.com/uc?export=download&id={}",
        file_id
    )
}

fn is_drive_host(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("drive.google.com") | Some("docs.google.com") | Some("drive.usercontent.google.com")
    )
}

/// Extract the id from a `/d/FILE_ID` path segment.
fn extract_from_d_segment(path: &str) -> Option<String> {
    let d_pos = path.find("/d/")?;
    let start = d_pos + 3;
    if start >= path.len() {
        return None;
    }
    let remaining = &path[start..];
    let end = remaining.find('/').unwrap_or(remaining.len());
    Some(remaining[..end].to_string())
}

/// Extract the id from an `id=FILE_ID` query parameter.
fn extract_from_id_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
}

/// Check if string contains only valid Drive file-id characters
fn is_valid_file_id_chars(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validate Drive file-id format and return it
fn validate_file_id(id: String) -> DriveLinkResult<String> {
    if id.len() < MIN_FILE_ID_LEN || id.len() > MAX_FILE_ID_LEN {
        return Err(DriveLinkError::InvalidFileId);
    }

    if !is_valid_file_id_chars(&id) {
        return Err(DriveLinkError::InvalidFileId);
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE_ID: &str = "1aBcDeFgHiJkLmNoPqRsTuVwXyZ012345";

    #[test]
    fn test_extract_drive_file_id_success_cases() {
        // Standard share link
        assert_eq!(
            extract_drive_file_id(&format!(
                "https://drive.google.com/file/d/{}/view?usp=sharing",
                FILE_ID
            ))
            .unwrap(),
            FILE_ID
        );

        // Bare /d/ segment with trailing slash
        assert_eq!(
            extract_drive_file_id(&format!("https://drive.google.com/d/{}/", FILE_ID)).unwrap(),
            FILE_ID
        );

        // /d/ segment without trailing slash
        assert_eq!(
            extract_drive_file_id(&format!("https://drive.google.com/file/d/{}", FILE_ID))
                .unwrap(),
            FILE_ID
        );

        // Legacy open?id= form
        assert_eq!(
            extract_drive_file_id(&format!("https://drive.google.com/open?id={}", FILE_ID))
                .unwrap(),
            FILE_ID
        );

        // Already a direct-download link
        assert_eq!(
            extract_drive_file_id(&format!(
                "https://drive.google.com/uc?export=download&id={}",
                FILE_ID
            ))
            .unwrap(),
            FILE_ID
        );

        // Docs host
        assert_eq!(
            extract_drive_file_id(&format!(
                "https://docs.google.com/file/d/{}/edit",
                FILE_ID
            ))
            .unwrap(),
            FILE_ID
        );

        // Surrounding whitespace is trimmed
        assert_eq!(
            extract_drive_file_id(&format!(
                "  https://drive.google.com/file/d/{}/view  ",
                FILE_ID
            ))
            .unwrap(),
            FILE_ID
        );
    }

    #[test]
    fn test_extract_drive_file_id_error_cases() {
        // Non-Drive URLs
        assert!(matches!(
            extract_drive_file_id("https://example.com/video.mp4"),
            Err(DriveLinkError::NotADriveUrl)
        ));

        assert!(matches!(
            extract_drive_file_id("https://dropbox.com/s/abc/video.mp4"),
            Err(DriveLinkError::NotADriveUrl)
        ));

        // Not a URL at all
        assert!(matches!(
            extract_drive_file_id("not a url"),
            Err(DriveLinkError::NotADriveUrl)
        ));

        // Drive host but no id segment
        assert!(matches!(
            extract_drive_file_id("https://drive.google.com/drive/my-drive"),
            Err(DriveLinkError::FileIdNotFound)
        ));

        assert!(matches!(
            extract_drive_file_id("https://drive.google.com/file/d/"),
            Err(DriveLinkError::FileIdNotFound)
        ));

        // Id too short to be real
        assert!(matches!(
            extract_drive_file_id("https://drive.google.com/file/d/abc123/view"),
            Err(DriveLinkError::InvalidFileId)
        ));

        // Invalid characters in id
        assert!(matches!(
            extract_drive_file_id("https://drive.google.com/open?id=abc!!123%20def456789"),
            Err(DriveLinkError::InvalidFileId)
        ));

        // Empty id query
        assert!(matches!(
            extract_drive_file_id("https://drive.google.com/open?id="),
            Err(DriveLinkError::InvalidFileId)
        ));
    }

    #[test]
    fn test_direct_download_url() {
        assert_eq!(
            direct_download_url(FILE_ID),
            format!("https://drive.google.com/uc?export=download&id={}", FILE_ID)
        );
    }

    #[test]
    fn test_drive_link_error_display() {
        assert_eq!(
            DriveLinkError::NotADriveUrl.to_string(),
            "URL is not a Google Drive URL"
        );
        assert_eq!(
            DriveLinkError::InvalidFileId.to_string(),
            "Drive file id has invalid format"
        );
        assert_eq!(
            DriveLinkError::FileIdNotFound.to_string(),
            "Drive file id not found in URL"
        );
    }

    #[test]
    fn test_query_id_ignores_other_params() {
        assert_eq!(
            extract_drive_file_id(&format!(
                "https://drive.google.com/uc?export=download&confirm=t&id={}",
                FILE_ID
            ))
            .unwrap(),
            FILE_ID
        );
    }
}
