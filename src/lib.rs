//! classroom_dl - Mirror Google Classroom course materials and Drive
//! folders into a local directory tree.
//!
//! This library provides functionality to:
//! - List Classroom courses, topics and course work materials
//! - Resolve each material to the Drive files it references
//! - Recursively download Drive folders and files, skipping anything
//!   already present locally
//!
//! # Example
//!
//! ```no_run
//! use classroom_dl::{Authenticator, ClassroomClient, DriveClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_file("credentials.json")?
//!         .with_token_cache("token.json");
//!     let drive = DriveClient::new(auth.clone());
//!     let classroom = ClassroomClient::new(auth);
//!
//!     for course in classroom.list_courses().await? {
//!         let summary = classroom
//!             .download_course(&drive, &course, "downloads".as_ref())
//!             .await;
//!         println!("{summary}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod classroom;
pub mod drive;
pub mod error;
pub mod models;
pub mod summary;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use classroom::ClassroomClient;
pub use drive::{DownloadOutcome, DriveClient};
pub use error::{DownloadError, Result};
pub use models::{Course, FileMetadata};
pub use summary::DownloadSummary;
pub use url_parser::extract_id;
