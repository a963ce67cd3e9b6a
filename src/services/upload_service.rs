use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// A file held in the transient upload directory until its request is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write `bytes` under a generated name. The client-supplied name is kept
    /// only as metadata.
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload> {
        let original_name = sanitize_file_name(original_name);
        let content_type = content_type
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&original_name)
                    .first_or_octet_stream()
                    .to_string()
            });

        let stored_name = match Path::new(&original_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.dir.join(stored_name);

        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored upload");

        Ok(StoredUpload {
            path,
            original_name,
            content_type,
            size: bytes.len() as u64,
        })
    }

    pub async fn read(&self, upload: &StoredUpload) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&upload.path).await?)
    }

    /// Best-effort removal; failures are logged and otherwise ignored.
    pub async fn cleanup(&self, uploads: &[StoredUpload]) {
        for upload in uploads {
            if let Err(e) = tokio::fs::remove_file(&upload.path).await {
                tracing::warn!(
                    path = %upload.path.display(),
                    error = %e,
                    "Failed to delete transient upload"
                );
            }
        }
    }
}

/// Keep only the final path component and drop characters that would break
/// a MIME header.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect::<String>();

    let trimmed = base.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "attachment".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_paths_and_quotes() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\spec \"v2\".pdf"), "spec v2.pdf");
        assert_eq!(sanitize_file_name("a\r\nb.txt"), "ab.txt");
        assert_eq!(sanitize_file_name(""), "attachment");
        assert_eq!(sanitize_file_name(".."), "attachment");
    }

    #[tokio::test]
    async fn saves_reads_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        store.ensure_dir().await.unwrap();

        let upload = store
            .save("drawing.pdf", None, b"%PDF-1.4")
            .await
            .unwrap();

        assert_eq!(upload.original_name, "drawing.pdf");
        assert_eq!(upload.content_type, "application/pdf");
        assert_eq!(upload.size, 8);
        assert!(upload.path.starts_with(store.dir()));
        assert_eq!(store.read(&upload).await.unwrap(), b"%PDF-1.4");

        store.cleanup(std::slice::from_ref(&upload)).await;
        assert!(!upload.path.exists());
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let missing = StoredUpload {
            path: dir.path().join("gone.txt"),
            original_name: "gone.txt".to_string(),
            content_type: "text/plain".to_string(),
            size: 0,
        };

        store.cleanup(&[missing]).await;
    }

    #[tokio::test]
    async fn keeps_declared_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let upload = store
            .save("photo", Some("image/png"), &[0x89, 0x50])
            .await
            .unwrap();

        assert_eq!(upload.content_type, "image/png");
    }
}
