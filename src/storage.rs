use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::Config;

/// Durable reference returned by a successful upload. `duration` is only
/// known for backends that can probe media; the disk backend reports `None`.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub url: String,
    pub duration: Option<f64>,
}

/// Asset-store collaborator. Uploads consume a staged local file and hand
/// back a durable URL; the staged file is removed whether or not the upload
/// succeeds.
#[derive(Clone)]
pub struct AssetStore {
    storage_dir: PathBuf,
    public_base_url: String,
}

impl AssetStore {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let storage_dir = PathBuf::from(&config.assets.storage_dir);
        std::fs::create_dir_all(&storage_dir)?;
        Ok(AssetStore {
            storage_dir,
            public_base_url: config.assets.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn upload(&self, local_path: &str) -> Result<UploadedAsset, anyhow::Error> {
        let source = Path::new(local_path);
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let name = format!("{}{}", Uuid::new_v4(), ext);
        let target = self.storage_dir.join(&name);

        let copied = tokio::fs::copy(source, &target).await;
        if let Err(e) = tokio::fs::remove_file(source).await {
            log::warn!("failed to remove staged file {}: {}", local_path, e);
        }
        copied?;

        Ok(UploadedAsset {
            url: format!("{}/{}", self.public_base_url, name),
            duration: None,
        })
    }

    pub async fn delete(&self, url: &str) -> Result<(), anyhow::Error> {
        let name = url
            .strip_prefix(&self.public_base_url)
            .map(|rest| rest.trim_start_matches('/'))
            .ok_or_else(|| anyhow::anyhow!("asset url {} is not under this store", url))?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            anyhow::bail!("refusing to delete suspicious asset name: {}", name);
        }
        tokio::fs::remove_file(self.storage_dir.join(name)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> AssetStore {
        AssetStore {
            storage_dir: dir.to_path_buf(),
            public_base_url: "http://localhost:8080/assets".to_string(),
        }
    }

    #[tokio::test]
    async fn upload_moves_staged_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged.png");
        tokio::fs::write(&staged, b"png-bytes").await.unwrap();

        let store = store_in(dir.path());
        let asset = store.upload(staged.to_str().unwrap()).await.unwrap();

        assert!(asset.url.starts_with("http://localhost:8080/assets/"));
        assert!(asset.url.ends_with(".png"));
        assert!(asset.duration.is_none());
        assert!(!staged.exists(), "staged file should be consumed");
    }

    #[tokio::test]
    async fn upload_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.upload("/nonexistent/path.png").await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_uploaded_asset() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged.jpg");
        tokio::fs::write(&staged, b"jpg").await.unwrap();

        let store = store_in(dir.path());
        let asset = store.upload(staged.to_str().unwrap()).await.unwrap();
        store.delete(&asset.url).await.unwrap();

        let leftover: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftover.is_empty());
    }

    #[tokio::test]
    async fn delete_rejects_foreign_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.delete("http://elsewhere/x.png").await.is_err());
        assert!(store
            .delete("http://localhost:8080/assets/../../etc/passwd")
            .await
            .is_err());
    }
}
