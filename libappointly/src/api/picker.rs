//! Media picker backed by a file on disk
//!
//! Used by the command-line front end, where "picking" an avatar means naming
//! a file. No path means the user backed out of the picker.

use async_trait::async_trait;
use std::path::PathBuf;

use super::{MediaPicker, PickedImage, PickerPrompt, PickerResponse};

const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    path: Option<PathBuf>,
}

impl FilePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl MediaPicker for FilePicker {
    async fn pick_image(&self, prompt: &PickerPrompt) -> PickerResponse {
        let Some(path) = &self.path else {
            tracing::debug!("{}: no file given, treating as cancel", prompt.title);
            return PickerResponse::Cancelled;
        };

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return PickerResponse::Failed(format!(
                "{} is not an image (expected one of: {})",
                path.display(),
                ACCEPTED_EXTENSIONS.join(", ")
            ));
        }

        match tokio::fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => {
                PickerResponse::Failed(format!("{} is empty", path.display()))
            }
            Ok(bytes) => PickerResponse::Picked(PickedImage {
                source: path.display().to_string(),
                bytes,
            }),
            Err(e) => PickerResponse::Failed(format!("Failed to read {}: {}", path.display(), e)),
        }
    }
}
