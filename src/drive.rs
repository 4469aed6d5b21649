//! Google Drive client: file downloads and recursive folder mirroring.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::auth::Authenticator;
use crate::error::{api_error, DownloadError, Result};
use crate::models::{
    format_size, sanitize_file_name, FileListResponse, FileMetadata, NATIVE_MIME_PREFIX,
};
use crate::summary::DownloadSummary;

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Result of a single file download attempt.
///
/// A skipped file is a success for the caller but does not count as a
/// transfer, so repeated runs against the same destination report zero
/// downloaded files for material that is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded,
    Skipped,
    Failed,
}

/// Export target for a Google-native document type: the MIME type to
/// request and the extension appended to the local path.
fn export_target(mime: &str) -> Option<(&'static str, &'static str)> {
    match mime {
        "application/vnd.google-apps.document" => Some(("application/pdf", "pdf")),
        "application/vnd.google-apps.spreadsheet" => Some((
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "xlsx",
        )),
        "application/vnd.google-apps.presentation" => Some((
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            "pptx",
        )),
        _ => None,
    }
}

/// Append an extension without touching any existing one in the name.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Client for downloading files and folder trees from Google Drive.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a new DriveClient against the production API.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, DRIVE_API_BASE)
    }

    /// Create a client against an alternate API base URL.
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Get file metadata by ID.
    pub async fn get_file(&self, file_id: &str) -> Result<FileMetadata> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .get(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(&token)
            .query(&[
                ("supportsAllDrives", "true"),
                ("fields", "id, name, mimeType, size"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let metadata: FileMetadata = response.json().await?;
        Ok(metadata)
    }

    /// List all children of a folder, following `nextPageToken` until the
    /// listing is exhausted.
    pub async fn list_children(&self, parent_id: &str) -> Result<Vec<FileMetadata>> {
        let token = self.auth.get_access_token().await?;
        let query = format!("'{}' in parents and trashed = false", parent_id);
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", self.base_url))
                .bearer_auth(&token)
                .query(&[
                    ("q", query.as_str()),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("spaces", "drive"),
                    ("fields", "nextPageToken, files(id, name, mimeType, size)"),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(api_error(response).await);
            }

            let list_response: FileListResponse = response.json().await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_files)
    }

    /// Download one file to `target`, recording any failure in `summary`.
    ///
    /// Native document types are exported to their fixed target format and
    /// the matching extension is appended to the path. A target path that
    /// already exists is treated as proof of a prior successful download
    /// and skipped without a transfer. A failed transfer leaves no partial
    /// file behind. One attempt only, no retries.
    pub async fn download_file(
        &self,
        meta: &FileMetadata,
        target: &Path,
        summary: &mut DownloadSummary,
    ) -> DownloadOutcome {
        let mime = meta.mime_type.as_deref().unwrap_or("");

        let export = if mime.starts_with(NATIVE_MIME_PREFIX) {
            match export_target(mime) {
                Some(target_format) => Some(target_format),
                None => {
                    let err = DownloadError::UnsupportedExport(mime.to_string());
                    warn!("Cannot download {}: {}", meta.name, err);
                    summary.add_failure(target.display().to_string(), err.to_string());
                    return DownloadOutcome::Failed;
                }
            }
        } else {
            None
        };

        let final_path = match export {
            Some((_, ext)) => append_extension(target, ext),
            None => target.to_path_buf(),
        };

        if final_path.exists() {
            info!(
                "File {} already exists. Skipping download.",
                final_path.display()
            );
            return DownloadOutcome::Skipped;
        }

        match self
            .fetch_to_disk(meta, export.map(|(mime, _)| mime), &final_path)
            .await
        {
            Ok(()) => {
                info!("File downloaded to {}", final_path.display());
                DownloadOutcome::Downloaded
            }
            Err(e) => {
                // No partial artifacts survive a failed download.
                if final_path.exists() {
                    if let Err(cleanup) = std::fs::remove_file(&final_path) {
                        warn!(
                            "Failed to remove partial file {}: {}",
                            final_path.display(),
                            cleanup
                        );
                    }
                }
                warn!("Download of {} failed: {}", meta.name, e);
                summary.add_failure(final_path.display().to_string(), e.to_string());
                DownloadOutcome::Failed
            }
        }
    }

    /// Stream file content to disk, chunk by chunk, driving a 0-100
    /// progress bar as chunks complete.
    async fn fetch_to_disk(
        &self,
        meta: &FileMetadata,
        export_mime: Option<&str>,
        path: &Path,
    ) -> Result<()> {
        let token = self.auth.get_access_token().await?;

        let request = match export_mime {
            Some(mime) => self
                .http
                .get(format!("{}/files/{}/export", self.base_url, meta.id))
                .query(&[("mimeType", mime)]),
            None => self
                .http
                .get(format!("{}/files/{}", self.base_url, meta.id))
                .query(&[("alt", "media"), ("supportsAllDrives", "true")]),
        };

        let response = request.bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        // Exported content has no declared size; fall back to a spinner.
        let total = meta.size.or_else(|| response.content_length());
        let progress = progress_bar(&meta.name, total);
        let mut written: u64 = 0;

        let mut file = File::create(path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(total) = total {
                if total > 0 {
                    progress.set_position((written * 100 / total).min(100));
                }
            }
        }

        file.flush().await?;
        progress.set_position(100);
        progress.finish_and_clear();

        Ok(())
    }

    /// Mirror the remote node `root_id` (file or folder) into `dest`.
    ///
    /// Folders are created locally and their children walked recursively;
    /// files are delegated to [`DriveClient::download_file`]. Every failure
    /// is recorded in the returned summary and never aborts siblings or
    /// ancestors. The traversal root itself is excluded from the folder
    /// count.
    pub async fn download_tree(&self, root_id: &str, dest: &Path) -> DownloadSummary {
        let mut summary = DownloadSummary::new();
        match self.get_file(root_id).await {
            Ok(meta) => self.walk(&meta, dest, true, &mut summary).await,
            Err(e) => summary.add_failure(root_id, e.to_string()),
        }
        summary
    }

    // Recursion depth equals remote nesting depth. No cycle guard: the
    // remote hierarchy is assumed to be acyclic.
    fn walk<'a>(
        &'a self,
        meta: &'a FileMetadata,
        dest: &'a Path,
        is_root: bool,
        summary: &'a mut DownloadSummary,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if meta.is_folder() {
                let folder = dest.join(sanitize_file_name(&meta.name));
                if let Err(e) = tokio::fs::create_dir_all(&folder).await {
                    summary.add_failure(meta.name.clone(), e.to_string());
                    return;
                }
                if !is_root {
                    summary.total_folders += 1;
                }

                match self.list_children(&meta.id).await {
                    Ok(children) => {
                        info!("Entering folder {} ({} items)", meta.name, children.len());
                        for child in &children {
                            // A failed child never aborts its siblings.
                            self.walk(child, &folder, false, summary).await;
                        }
                    }
                    Err(e) => summary.add_failure(meta.name.clone(), e.to_string()),
                }
            } else {
                let target = dest.join(sanitize_file_name(&meta.name));
                if let DownloadOutcome::Downloaded =
                    self.download_file(meta, &target, summary).await
                {
                    summary.total_files += 1;
                }
            }
        })
    }
}

fn progress_bar(name: &str, size: Option<u64>) -> ProgressBar {
    match size {
        Some(size) => {
            let pb = ProgressBar::new(100);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("  {spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% | {msg}")
            {
                pb.set_style(style.progress_chars("█▓░"));
            }
            pb.set_message(format!("{} ({})", name, format_size(size)));
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_message(name.to_string());
            pb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_target_mapping() {
        assert_eq!(
            export_target("application/vnd.google-apps.document"),
            Some(("application/pdf", "pdf"))
        );
        assert_eq!(
            export_target("application/vnd.google-apps.spreadsheet").map(|t| t.1),
            Some("xlsx")
        );
        assert_eq!(
            export_target("application/vnd.google-apps.presentation").map(|t| t.1),
            Some("pptx")
        );
        assert_eq!(export_target("application/vnd.google-apps.form"), None);
        assert_eq!(export_target("application/pdf"), None);
    }

    #[test]
    fn test_progress_indicator_shape() {
        // Known size gets a percentage bar; unknown size gets a spinner.
        assert_eq!(progress_bar("a", Some(10)).length(), Some(100));
        assert_eq!(progress_bar("a", None).length(), None);
    }

    #[test]
    fn test_append_extension_keeps_existing_suffix() {
        let path = Path::new("/tmp/Lecture 1.notes");
        assert_eq!(
            append_extension(path, "pdf"),
            PathBuf::from("/tmp/Lecture 1.notes.pdf")
        );
    }
}
