//! `payrep-server` — thin HTTP trigger surface for report generation.
//!
//! Upload the three workbooks, trigger a run, download the newest report.
//! Generation never runs in-process: `/process` spawns the `payrep` CLI as a
//! one-shot subprocess and relays its outcome. The output file is owned by
//! exactly one process at a time.

use std::net::TcpListener as StdTcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

/// Accepted upload labels; each becomes `<label>.xlsx` in the uploads dir.
pub const FILE_TYPES: [&str; 3] = ["bank_balance", "account_payables", "cash_management"];

#[derive(Clone)]
pub struct AppState {
    pub uploads_dir: PathBuf,
    pub processed_dir: PathBuf,
    /// Path to the `payrep` binary spawned by `/process`.
    pub payrep_bin: PathBuf,
}

impl AppState {
    /// Directories from the environment with the legacy defaults; the
    /// `payrep` binary is expected next to the server unless overridden.
    pub fn from_env() -> AppState {
        let payrep_bin = std::env::var("PAYREP_BIN").map(PathBuf::from).unwrap_or_else(|_| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("payrep")))
                .unwrap_or_else(|| PathBuf::from("payrep"))
        });
        AppState {
            uploads_dir: env_dir("PAYREP_UPLOADS", "uploads"),
            processed_dir: env_dir("PAYREP_PROCESSED", "processed"),
            payrep_bin,
        }
    }
}

fn env_dir(var: &str, default: &str) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/process", post(process))
        .route("/download/final_report", get(download_final_report))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "payrep-server",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Multipart upload: a `file` part plus a `file_type` label naming which of
/// the three inputs it is.
async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_type: Option<String> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some("file") => match field.bytes().await {
                        Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                        Err(e) => return (StatusCode::BAD_REQUEST, format!("bad file part: {e}")),
                    },
                    Some("file_type") => match field.text().await {
                        Ok(text) => file_type = Some(text),
                        Err(e) => {
                            return (StatusCode::BAD_REQUEST, format!("bad file_type part: {e}"))
                        }
                    },
                    _ => {}
                }
            }
            Ok(None) => break,
            Err(e) => return (StatusCode::BAD_REQUEST, format!("malformed multipart body: {e}")),
        }
    }

    let Some(bytes) = file_bytes else {
        return (StatusCode::BAD_REQUEST, "No file part".into());
    };
    if bytes.is_empty() {
        return (StatusCode::BAD_REQUEST, "No selected file".into());
    }
    let Some(file_type) = file_type else {
        return (StatusCode::BAD_REQUEST, "No file_type part".into());
    };
    if !FILE_TYPES.contains(&file_type.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            format!("unknown file_type '{file_type}' (expected one of {})", FILE_TYPES.join(", ")),
        );
    }

    if let Err(e) = tokio::fs::create_dir_all(&state.uploads_dir).await {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("cannot create uploads dir: {e}"));
    }
    let path = state.uploads_dir.join(format!("{file_type}.xlsx"));
    match tokio::fs::write(&path, &bytes).await {
        Ok(()) => {
            tracing::info!(%file_type, bytes = bytes.len(), "uploaded");
            (StatusCode::OK, format!("File uploaded successfully: {}", path.display()))
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Error uploading file: {e}")),
    }
}

/// Run the generation pipeline as a one-shot subprocess.
async fn process(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    let missing = missing_inputs(&state.uploads_dir);
    if !missing.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            format!("Missing required file(s): {}", missing.join(", ")),
        );
    }

    let output = tokio::process::Command::new(&state.payrep_bin)
        .arg("generate")
        .arg("--uploads")
        .arg(&state.uploads_dir)
        .arg("--output")
        .arg(&state.processed_dir)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            tracing::info!("processing completed");
            (StatusCode::OK, "Processing completed, final report ready.".into())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, "generate failed: {}", stderr.trim());
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Processing error: {}", stderr.trim()))
        }
        Err(e) => {
            tracing::error!("cannot spawn {}: {e}", state.payrep_bin.display());
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Processing failed: {e}"))
        }
    }
}

async fn download_final_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(path) = latest_report(&state.processed_dir) else {
        return (StatusCode::NOT_FOUND, "Final report not found.".to_string()).into_response();
    };

    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("report.xlsx").to_string();
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("cannot read report: {e}")).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Filesystem helpers
// ---------------------------------------------------------------------------

/// The required inputs that are not present yet, as display names.
pub fn missing_inputs(uploads_dir: &Path) -> Vec<String> {
    FILE_TYPES
        .iter()
        .map(|t| format!("{t}.xlsx"))
        .filter(|name| !uploads_dir.join(name).exists())
        .collect()
}

/// Newest produced report by modification time.
pub fn latest_report(processed_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(processed_dir).ok()?;
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("Payables_Summary_") && n.ends_with(".xlsx"))
                .unwrap_or(false)
        })
        .max_by_key(|p| {
            std::fs::metadata(p).and_then(|m| m.modified()).unwrap_or(std::time::UNIX_EPOCH)
        })
}

/// First free port in the range, probed by binding.
pub fn find_available_port(start: u16, end: u16) -> Option<u16> {
    (start..end).find(|port| StdTcpListener::bind(("127.0.0.1", *port)).is_ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
