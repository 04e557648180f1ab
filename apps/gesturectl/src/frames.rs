//! Camera stand-in that replays still images from a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use control_core::{CameraError, Frame, FrameSource};
use tracing::info;

pub struct DirectoryFrameSource {
    frames: Vec<PathBuf>,
    next: usize,
    released: bool,
}

impl DirectoryFrameSource {
    pub async fn open(dir: &Path) -> Result<Self, CameraError> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| CameraError::Open(format!("{}: {e}", dir.display())))?;

        let mut frames = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CameraError::Open(e.to_string()))?
        {
            let path = entry.path();
            if mime_for(&path).is_some() {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.is_empty() {
            return Err(CameraError::Open(format!(
                "no jpeg/png frames found in {}",
                dir.display()
            )));
        }
        let source = Self {
            frames,
            next: 0,
            released: false,
        };
        info!(dir = %dir.display(), frames = source.len(), "opened frame directory");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn capture(&mut self) -> Result<Option<Frame>, CameraError> {
        if self.released {
            return Err(CameraError::Released);
        }
        let path = &self.frames[self.next % self.frames.len()];
        self.next = self.next.wrapping_add(1);

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CameraError::Capture(format!("{}: {e}", path.display())))?;
        let mime_type = mime_for(path).unwrap_or("image/jpeg").to_string();
        Ok(Some(Frame { bytes, mime_type }))
    }

    fn release(&mut self) {
        self.released = true;
        self.frames.clear();
    }
}
