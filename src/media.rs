//! File-backed store for recipe images.
//!
//! The database keeps a relative path; bytes live under MEDIA_ROOT. Serving
//! the files themselves is left to the reverse proxy.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("image host returned status {0}")]
    UpstreamStatus(u16),

    #[error("image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write image bytes under `recipes/` and return the relative path that
    /// gets persisted on the recipe row. A UUID prefix keeps repeated uploads
    /// of the same filename from colliding.
    pub fn save_recipe_image(&self, filename: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let relative = format!("recipes/{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(relative)
    }
}

/// Fetch image bytes from a remote URL. Any non-2xx status is an upstream
/// error; there are no retries.
pub async fn fetch_image(url: &str) -> Result<(String, Vec<u8>), MediaError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 (compatible; Skillet/1.0)")
        .build()?;

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(MediaError::UpstreamStatus(response.status().as_u16()));
    }

    let filename = filename_from_url(url);
    let bytes = response.bytes().await?;

    Ok((filename, bytes.to_vec()))
}

/// Derive a filename from the final path segment of a URL, ignoring any
/// query string or fragment.
pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        "image".to_string()
    } else {
        segment.to_string()
    }
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_final_path_segment() {
        assert_eq!(
            filename_from_url("https://example.com/photos/dinner.jpg"),
            "dinner.jpg"
        );
    }

    #[test]
    fn filename_strips_query_string() {
        assert_eq!(
            filename_from_url("https://example.com/a/b.png?width=300&h=1"),
            "b.png"
        );
    }

    #[test]
    fn filename_strips_fragment() {
        assert_eq!(filename_from_url("https://example.com/pic.gif#top"), "pic.gif");
    }

    #[test]
    fn trailing_slash_falls_back() {
        assert_eq!(filename_from_url("https://example.com/photos/"), "image");
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("a/b\\c d.jpg"), "a-b-c-d.jpg");
        assert_eq!(sanitize_filename("соус.jpg"), "----.jpg");
    }
}
