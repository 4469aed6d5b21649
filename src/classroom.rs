//! Google Classroom client: course, topic and material listings, plus the
//! per-course download driver.

use std::collections::HashMap;
use std::path::Path;

use reqwest::Client;
use tracing::{info, warn};

use crate::auth::Authenticator;
use crate::drive::DriveClient;
use crate::error::{api_error, Result};
use crate::models::{
    sanitize_file_name, Attachment, Course, CourseListResponse, CourseWorkMaterial,
    MaterialListResponse, Topic, TopicListResponse,
};
use crate::summary::DownloadSummary;
use crate::url_parser::extract_id;

/// Base URL for Google Classroom API v1.
const CLASSROOM_API_BASE: &str = "https://classroom.googleapis.com/v1";

/// Bucket for materials whose topic is absent or not in the topic listing.
const NO_TOPIC: &str = "No Topic";

/// What a course work material resolves to, in priority order: explicit
/// attachments win, then a description to scan for an embedded identifier,
/// then the bare title as a last resort.
#[derive(Debug, PartialEq, Eq)]
pub enum MaterialSource<'a> {
    Attachments(&'a [Attachment]),
    Description(&'a str),
    Title(&'a str),
    Empty,
}

/// Resolve a material to its downloadable source. Pure; blank strings are
/// treated as absent.
pub fn classify(material: &CourseWorkMaterial) -> MaterialSource<'_> {
    if !material.materials.is_empty() {
        return MaterialSource::Attachments(&material.materials);
    }
    if let Some(description) = material.description.as_deref() {
        if !description.trim().is_empty() {
            return MaterialSource::Description(description);
        }
    }
    if let Some(title) = material.title.as_deref() {
        if !title.trim().is_empty() {
            return MaterialSource::Title(title);
        }
    }
    MaterialSource::Empty
}

/// Client for the Classroom listings consumed by the downloader.
pub struct ClassroomClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl ClassroomClient {
    /// Create a new ClassroomClient against the production API.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, CLASSROOM_API_BASE)
    }

    /// Create a client against an alternate API base URL.
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// List every course visible to the authenticated user.
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let token = self.auth.get_access_token().await?;
        let mut all_courses = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/courses", self.base_url))
                .bearer_auth(&token)
                .query(&[("pageSize", "100")]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(api_error(response).await);
            }

            let list_response: CourseListResponse = response.json().await?;
            all_courses.extend(list_response.courses);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_courses)
    }

    /// List all topics of a course.
    pub async fn list_topics(&self, course_id: &str) -> Result<Vec<Topic>> {
        let token = self.auth.get_access_token().await?;
        let mut all_topics = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/courses/{}/topics", self.base_url, course_id))
                .bearer_auth(&token);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(api_error(response).await);
            }

            let list_response: TopicListResponse = response.json().await?;
            all_topics.extend(list_response.topic);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_topics)
    }

    /// List all course work materials of a course, in API order.
    pub async fn list_materials(&self, course_id: &str) -> Result<Vec<CourseWorkMaterial>> {
        let token = self.auth.get_access_token().await?;
        let mut all_materials = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!(
                    "{}/courses/{}/courseWorkMaterials",
                    self.base_url, course_id
                ))
                .bearer_auth(&token);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(api_error(response).await);
            }

            let list_response: MaterialListResponse = response.json().await?;
            all_materials.extend(list_response.course_work_material);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_materials)
    }

    /// Mirror one course into `dest/<course name>/<topic name>/...`,
    /// downloading every material the course references.
    ///
    /// Materials are processed oldest first. Listing errors are recorded in
    /// the summary, never fatal to the run.
    pub async fn download_course(
        &self,
        drive: &DriveClient,
        course: &Course,
        dest: &Path,
    ) -> DownloadSummary {
        let mut summary = DownloadSummary::new();

        let course_dir = dest.join(sanitize_file_name(&course.name));
        if let Err(e) = tokio::fs::create_dir_all(&course_dir).await {
            summary.add_failure(course.name.clone(), e.to_string());
            return summary;
        }

        let topic_names: HashMap<String, String> = match self.list_topics(&course.id).await {
            Ok(topics) => topics.into_iter().map(|t| (t.topic_id, t.name)).collect(),
            Err(e) => {
                warn!("Failed to list topics for {}: {}", course.name, e);
                summary.add_failure(course.name.clone(), e.to_string());
                HashMap::new()
            }
        };

        let mut materials = match self.list_materials(&course.id).await {
            Ok(materials) => materials,
            Err(e) => {
                summary.add_failure(course.name.clone(), e.to_string());
                return summary;
            }
        };

        if materials.is_empty() {
            info!("No materials found for {}", course.name);
            return summary;
        }

        // The API lists newest first; download oldest first.
        materials.reverse();

        for material in &materials {
            let topic_name = material
                .topic_id
                .as_deref()
                .and_then(|id| topic_names.get(id))
                .map(String::as_str)
                .unwrap_or(NO_TOPIC);

            let topic_dir = course_dir.join(sanitize_file_name(topic_name));
            if let Err(e) = tokio::fs::create_dir_all(&topic_dir).await {
                summary.add_failure(topic_name, e.to_string());
                continue;
            }

            info!("Downloading materials for topic: {}", topic_name);
            summary.merge(self.download_material(drive, material, &topic_dir).await);
        }

        summary
    }

    async fn download_material(
        &self,
        drive: &DriveClient,
        material: &CourseWorkMaterial,
        dest: &Path,
    ) -> DownloadSummary {
        let mut summary = DownloadSummary::new();
        let label = material.title.as_deref().unwrap_or("(untitled material)");

        match classify(material) {
            MaterialSource::Attachments(attachments) => {
                for attachment in attachments {
                    let file_id = attachment
                        .drive_file
                        .as_ref()
                        .and_then(|shared| shared.drive_file.as_ref())
                        .and_then(|file| file.id.as_deref());

                    match file_id {
                        Some(id) => summary.merge(drive.download_tree(id, dest).await),
                        None => summary.add_failure(label, "No drive file found in attachment"),
                    }
                }
            }
            MaterialSource::Description(text) => match extract_id(text) {
                Some(id) => summary.merge(drive.download_tree(&id, dest).await),
                None => {
                    summary.add_failure(label, "Could not extract file ID from description")
                }
            },
            MaterialSource::Title(text) => match extract_id(text) {
                Some(id) => summary.merge(drive.download_tree(&id, dest).await),
                None => summary.add_failure(label, "Could not extract file ID from title"),
            },
            MaterialSource::Empty => {
                summary.add_failure(label, "No materials or description found")
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn material(value: serde_json::Value) -> CourseWorkMaterial {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_prefers_attachments() {
        let m = material(json!({
            "title": "Week 1 slides",
            "description": "also see https://drive.google.com/file/d/abc/view",
            "materials": [{"driveFile": {"driveFile": {"id": "f1", "title": "slides.pdf"}}}]
        }));
        assert!(matches!(classify(&m), MaterialSource::Attachments(a) if a.len() == 1));
    }

    #[test]
    fn test_classify_falls_back_to_description() {
        let m = material(json!({
            "title": "Week 2",
            "description": "https://drive.google.com/drive/folders/XYZ"
        }));
        assert_eq!(
            classify(&m),
            MaterialSource::Description("https://drive.google.com/drive/folders/XYZ")
        );
    }

    #[test]
    fn test_classify_blank_description_falls_back_to_title() {
        let m = material(json!({
            "title": "1a2b3c4d5e6f7g8h9i0j1a2b3",
            "description": "   "
        }));
        assert_eq!(
            classify(&m),
            MaterialSource::Title("1a2b3c4d5e6f7g8h9i0j1a2b3")
        );
    }

    #[test]
    fn test_classify_empty() {
        let m = material(json!({}));
        assert_eq!(classify(&m), MaterialSource::Empty);
    }
}
