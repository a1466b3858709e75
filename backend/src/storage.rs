use chrono::Utc;
use std::path::Path;

/// Replaces anything outside `[A-Za-z0-9._-]` so a client-supplied name
/// cannot escape the upload directory.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Writes an uploaded image under `upload_dir` and returns the public URL it
/// is served from. Names are prefixed with upload time in milliseconds to
/// keep repeated uploads of the same file apart.
pub async fn store_image(
    upload_dir: &str,
    original_name: &str,
    bytes: &[u8],
) -> std::io::Result<String> {
    let file_name = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_file_name(original_name)
    );
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = Path::new(upload_dir).join(&file_name);
    tokio::fs::write(&path, bytes).await?;
    log::info!("Stored upload {}", path.display());
    Ok(format!("/uploads/{}", file_name))
}
