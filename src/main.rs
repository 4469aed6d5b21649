//! classroom_dl CLI - download Classroom course materials and Drive trees.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use inquire::{MultiSelect, Select, Text};
use tracing::error;

use classroom_dl::models::format_eta;
use classroom_dl::{
    extract_id, Authenticator, ClassroomClient, Course, DriveClient,
};

/// Pause between menu-driven operations, a crude throttle against the APIs.
const MENU_DELAY: Duration = Duration::from_secs(3);

/// Download Google Classroom course materials and Drive folders.
#[derive(Parser)]
#[command(name = "classroom_dl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to Google credentials JSON (service account or authorized user).
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: PathBuf,

    /// Where the refreshed access token is cached between runs.
    #[arg(long, default_value = "token.json")]
    token: PathBuf,

    /// Destination directory. Defaults to the user's Downloads folder.
    #[arg(long, short = 'd')]
    dest: Option<PathBuf>,

    /// Courses to download: comma-separated 1-based indices, or "all".
    #[arg(long)]
    course_index: Option<String>,

    /// Drive folders or files to download: comma-separated URLs or IDs.
    #[arg(long)]
    drive_folder_id: Option<String>,

    /// Append log lines to this file instead of writing them to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("Failed to initialise logging: {e}");
    }

    let started = Instant::now();

    // Outermost guard: every error is logged and the process still exits
    // normally after reporting elapsed time.
    if let Err(e) = run(cli).await {
        error!("An error occurred: {e:#}");
    }

    println!(
        "Run finished in {}",
        format_eta(started.elapsed().as_secs_f64())
    );
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let auth = Authenticator::from_file(&cli.credentials)
        .with_context(|| format!("Failed to load credentials from {:?}", cli.credentials))?
        .with_token_cache(&cli.token);

    let drive = DriveClient::new(auth.clone());
    let classroom = ClassroomClient::new(auth);

    let dest = cli
        .dest
        .clone()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dest)
        .with_context(|| format!("Failed to create destination directory {:?}", dest))?;

    if cli.course_index.is_none() && cli.drive_folder_id.is_none() {
        return interactive(&classroom, &drive, &dest).await;
    }

    if let Some(spec) = &cli.drive_folder_id {
        download_drive_refs(&drive, spec, &dest).await;
    }

    if let Some(spec) = &cli.course_index {
        let courses = classroom
            .list_courses()
            .await
            .context("Failed to list courses")?;
        if courses.is_empty() {
            println!("No courses found.");
            return Ok(());
        }
        for course in select_by_index(&courses, spec)? {
            run_course(&classroom, &drive, course, &dest).await;
        }
    }

    Ok(())
}

/// Resolve a comma-separated list of 1-based indices (or "all").
fn select_by_index<'a>(courses: &'a [Course], spec: &str) -> Result<Vec<&'a Course>> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("all") {
        return Ok(courses.iter().collect());
    }

    let mut selected = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let index: usize = part
            .parse()
            .with_context(|| format!("Invalid course index: {part}"))?;
        let course = index
            .checked_sub(1)
            .and_then(|i| courses.get(i))
            .with_context(|| {
                format!("Course index {index} out of range (1-{})", courses.len())
            })?;
        selected.push(course);
    }
    Ok(selected)
}

async fn download_drive_refs(drive: &DriveClient, spec: &str, dest: &Path) {
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match extract_id(item) {
            Some(id) => {
                println!("Downloading {id}...");
                let summary = drive.download_tree(&id, dest).await;
                println!("\n{summary}\n");
            }
            None => error!("Could not extract a Drive ID from {item}"),
        }
    }
}

async fn run_course(
    classroom: &ClassroomClient,
    drive: &DriveClient,
    course: &Course,
    dest: &Path,
) {
    println!("Downloading course: {}", course.name);
    let summary = classroom.download_course(drive, course, dest).await;
    println!("\n{summary}\n");
}

async fn interactive(
    classroom: &ClassroomClient,
    drive: &DriveClient,
    dest: &Path,
) -> Result<()> {
    loop {
        let options = vec![
            "Download Classroom course materials",
            "Download a Drive folder or file",
            "Exit",
        ];

        let answer = Select::new("Choose an option:", options)
            .with_help_message("↑↓ to move, enter to select")
            .prompt();

        match answer {
            Ok("Download Classroom course materials") => {
                if let Err(e) = classroom_menu(classroom, drive, dest).await {
                    error!("An error occurred: {e:#}");
                }
            }
            Ok("Download a Drive folder or file") => {
                if let Err(e) = drive_menu(drive, dest).await {
                    error!("An error occurred: {e:#}");
                }
            }
            // "Exit", Esc or an interrupted prompt all leave the menu.
            Ok(_) | Err(_) => break,
        }

        tokio::time::sleep(MENU_DELAY).await;
    }

    Ok(())
}

async fn classroom_menu(
    classroom: &ClassroomClient,
    drive: &DriveClient,
    dest: &Path,
) -> Result<()> {
    let courses = classroom
        .list_courses()
        .await
        .context("Failed to list courses")?;
    if courses.is_empty() {
        println!("No courses found.");
        return Ok(());
    }

    let names: Vec<String> = courses
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}: {}", i + 1, c.name))
        .collect();

    let chosen = MultiSelect::new("Select courses to download:", names.clone()).prompt()?;

    for name in &chosen {
        if let Some(pos) = names.iter().position(|n| n == name) {
            run_course(classroom, drive, &courses[pos], dest).await;
        }
    }

    Ok(())
}

async fn drive_menu(drive: &DriveClient, dest: &Path) -> Result<()> {
    let input = Text::new("Drive folder/file URL or ID:").prompt()?;

    match extract_id(&input) {
        Some(id) => {
            let summary = drive.download_tree(&id, dest).await;
            println!("\n{summary}\n");
        }
        None => println!("Could not extract a Drive ID from that input."),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, name: &str) -> Course {
        Course {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_select_all() {
        let courses = vec![course("1", "Maths"), course("2", "Physics")];
        let selected = select_by_index(&courses, "all").unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_by_one_based_indices() {
        let courses = vec![course("1", "Maths"), course("2", "Physics"), course("3", "Art")];
        let selected = select_by_index(&courses, "3, 1").unwrap();
        assert_eq!(selected[0].name, "Art");
        assert_eq!(selected[1].name, "Maths");
    }

    #[test]
    fn test_select_rejects_zero_and_out_of_range() {
        let courses = vec![course("1", "Maths")];
        assert!(select_by_index(&courses, "0").is_err());
        assert!(select_by_index(&courses, "2").is_err());
        assert!(select_by_index(&courses, "x").is_err());
    }
}
