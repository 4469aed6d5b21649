//! Data models for Google Drive and Classroom API responses.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses as its folder sentinel.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by all Google-native document types.
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// Metadata for a file or folder in Google Drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
}

impl FileMetadata {
    /// Whether this node is a Drive folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Response from the Drive files.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A Classroom course.
#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
}

/// Response from the courses.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A Classroom topic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub topic_id: String,
    pub name: String,
}

/// Response from the topics.list endpoint. The API names the list field
/// `topic`, singular.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicListResponse {
    #[serde(default)]
    pub topic: Vec<Topic>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A course work material entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWorkMaterial {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub materials: Vec<Attachment>,
}

/// One attachment on a course work material. Only Drive file attachments
/// are downloadable; links, YouTube videos and forms carry no `driveFile`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub drive_file: Option<SharedDriveFile>,
}

/// The API nests the actual reference one level down: `driveFile.driveFile`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDriveFile {
    #[serde(default)]
    pub drive_file: Option<DriveFileRef>,
}

/// A Drive file reference embedded in a Classroom attachment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFileRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Response from the courseWorkMaterials.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialListResponse {
    #[serde(default)]
    pub course_work_material: Vec<CourseWorkMaterial>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Credentials JSON, either a service account key or an authorized-user
/// token file. Google tags both shapes with a `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    ServiceAccount(ServiceAccountCredentials),
    AuthorizedUser(AuthorizedUserCredentials),
}

/// Service account credentials from a JSON key file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// Authorized-user credentials with a long-lived refresh token.
#[derive(Debug, Deserialize)]
pub struct AuthorizedUserCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Replace characters that would break a path component. Remote names are
/// used verbatim as file and directory names otherwise.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format seconds into human-readable time (e.g., "2m 15s", "1h 5m", "< 1s").
pub fn format_eta(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--".to_string();
    }

    let secs = seconds.round() as u64;

    if secs == 0 {
        return "< 1s".to_string();
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let remaining_secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, remaining_secs)
    } else {
        format!("{}s", remaining_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0.4), "< 1s");
        assert_eq!(format_eta(5.0), "5s");
        assert_eq!(format_eta(65.0), "1m 5s");
        assert_eq!(format_eta(3665.0), "1h 1m");
        assert_eq!(format_eta(f64::INFINITY), "--");
        assert_eq!(format_eta(-5.0), "--");
        assert_eq!(format_eta(f64::NAN), "--");
    }

    #[test]
    fn test_file_metadata_deserialize() {
        let json = r#"{
            "id": "abc123",
            "name": "notes.pdf",
            "mimeType": "application/pdf",
            "size": "1024"
        }"#;

        let metadata: FileMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.id, "abc123");
        assert_eq!(metadata.name, "notes.pdf");
        assert_eq!(metadata.mime_type, Some("application/pdf".to_string()));
        assert_eq!(metadata.size, Some(1024));
        assert!(!metadata.is_folder());
    }

    #[test]
    fn test_folder_sentinel() {
        let metadata = FileMetadata {
            id: "folder1".to_string(),
            name: "Week 1".to_string(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            size: None,
        };
        assert!(metadata.is_folder());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("plain.pdf"), "plain.pdf");
        assert_eq!(sanitize_file_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_file_name("Topic: Unit 1"), "Topic: Unit 1");
    }

    #[test]
    fn test_credentials_tagged_parse() {
        let sa = r#"{
            "type": "service_account",
            "client_email": "bot@project.iam.gserviceaccount.com",
            "private_key": "key"
        }"#;
        assert!(matches!(
            serde_json::from_str::<Credentials>(sa).unwrap(),
            Credentials::ServiceAccount(_)
        ));

        let user = r#"{
            "type": "authorized_user",
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "refresh"
        }"#;
        assert!(matches!(
            serde_json::from_str::<Credentials>(user).unwrap(),
            Credentials::AuthorizedUser(_)
        ));
    }
}
