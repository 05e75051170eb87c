//! Filesystem asset store for uploaded images.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use registrar_core::error::Result;
use registrar_core::record::AssetStore;
use registrar_core::transport::{Attachment, FileFetcher};

/// Writes attachments to `root/<folder>/<file id>.<ext>`.
pub struct LocalAssetStore {
    root: PathBuf,
    fetcher: Arc<dyn FileFetcher>,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, fetcher: Arc<dyn FileFetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
        }
    }
}

/// Keeps file ids from escaping the target folder.
fn sanitize(file_id: &str) -> String {
    file_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, attachment: &Attachment, folder: &str) -> Result<String> {
        let bytes = self.fetcher.fetch(attachment).await?;

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!(
            "{}.{}",
            sanitize(&attachment.file_id),
            attachment.extension()
        ));
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!("[AssetStore] Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::error::RegistrarError;

    struct StaticFetcher(Option<Vec<u8>>);

    #[async_trait]
    impl FileFetcher for StaticFetcher {
        async fn fetch(&self, attachment: &Attachment) -> Result<Vec<u8>> {
            self.0
                .clone()
                .ok_or_else(|| RegistrarError::transport(format!("{} unavailable", attachment.file_id)))
        }
    }

    #[tokio::test]
    async fn test_store_writes_under_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path(), Arc::new(StaticFetcher(Some(b"img".to_vec()))));

        let path = store
            .store(&Attachment::new("../abc", Some("card.PNG".into())), "father_cards")
            .await
            .unwrap();

        let expected = dir.path().join("father_cards").join("___abc.png");
        assert_eq!(PathBuf::from(&path), expected);
        assert_eq!(std::fs::read(expected).unwrap(), b"img");
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path(), Arc::new(StaticFetcher(None)));
        let err = store
            .store(&Attachment::new("x", None), "personal")
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
