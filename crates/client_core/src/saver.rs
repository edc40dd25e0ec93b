use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Host-side persistence of a converted MIDI file.
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Stores `bytes` under `suggested_name` and returns where they went.
    async fn save(&self, suggested_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes converted files into a fixed directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[async_trait]
impl FileSaver for DirectorySaver {
    async fn save(&self, suggested_name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create output dir '{}'", self.dir.display()))?;

        let path = self.dir.join(sanitize_file_name(suggested_name));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(path.display().to_string())
    }
}

// Names come from user input; keep them inside the output dir.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}
