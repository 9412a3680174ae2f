use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{AnalysisError, ImageUpload};

/// Writes uploads to `{root}/{greenhouse_id | "unassigned"}/{uuid}.{ext}`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(
        &self,
        greenhouse_id: Option<Uuid>,
        image: &ImageUpload,
    ) -> Result<PathBuf, AnalysisError> {
        if image.bytes.is_empty() {
            return Err(AnalysisError::EmptyImage);
        }

        let dir = match greenhouse_id {
            Some(id) => self.root.join(id.to_string()),
            None => self.root.join("unassigned"),
        };
        fs::create_dir_all(&dir).await?;

        let ext = extension(image.file_name.as_deref());
        let path = dir.join(format!("{}.{ext}", Uuid::new_v4()));
        fs::write(&path, &image.bytes).await?;

        debug!(path = %path.display(), bytes = image.bytes.len(), "Image stored");
        Ok(path)
    }
}

/// Lowercase alphanumeric extension of `file_name`, or `bin`.
fn extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_owned())
}
