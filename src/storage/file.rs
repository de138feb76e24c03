use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use anyhow::bail;
use bytes::Bytes;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use super::{check_key, Storage};

#[derive(Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub async fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir: PathBuf = dir.into();

        if !dir.exists() {
            bail!("directory {} does not exist", dir.display())
        }

        if !dir.is_dir() {
            bail!("{} is not a directory", dir.display());
        }

        Ok(FileStorage { dir })
    }

    fn path(&self, key: &str) -> io::Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl Storage for FileStorage {
    async fn get_object(&self, key: &str) -> io::Result<Bytes> {
        let mut buf = Vec::with_capacity(1024);
        let mut file = BufReader::new(fs::File::open(self.path(key)?).await?);
        file.read_to_end(&mut buf).await?;

        Ok(buf.into())
    }

    async fn put_object(&self, key: &str, data: Bytes) -> io::Result<()> {
        let path = self.path(key)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(&data[..]).await?;
            file.flush().await
        }
        .await;

        if let Err(err) = written {
            drop(file);
            if let Err(remove_err) = fs::remove_file(&path).await {
                warn!("failed to remove partial file {}: {remove_err}", path.display());
            }
            return Err(err);
        }

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> io::Result<()> {
        fs::remove_file(self.path(key)?).await
    }

    async fn list_stems(&self) -> io::Result<HashSet<String>> {
        let mut stems = HashSet::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            let path = entry.path();
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.insert(stem.to_owned());
            }
        }
        Ok(stems)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn scratch_storage() -> (FileStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        (storage, dir)
    }

    #[tokio::test]
    async fn missing_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(FileStorage::new(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn put_get_delete() {
        let (storage, dir) = scratch_storage().await;

        storage
            .put_object("abc.png", Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert!(dir.path().join("abc.png").exists());
        assert_eq!(&storage.get_object("abc.png").await.unwrap()[..], b"data");

        storage.delete_object("abc.png").await.unwrap();
        assert!(!dir.path().join("abc.png").exists());

        let err = storage.get_object("abc.png").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn put_does_not_overwrite() {
        let (storage, _dir) = scratch_storage().await;
        storage
            .put_object("a.png", Bytes::from_static(b"first"))
            .await
            .unwrap();

        let err = storage
            .put_object("a.png", Bytes::from_static(b"second"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(&storage.get_object("a.png").await.unwrap()[..], b"first");
    }

    #[tokio::test]
    async fn vanished_directory_fails_writes() {
        let (storage, dir) = scratch_storage().await;
        let path = dir.path().to_owned();
        dir.close().unwrap();

        let err = storage
            .put_object("a.png", Bytes::from_static(b"data"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(storage.list_stems().await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn stems_skip_directories() {
        let (storage, dir) = scratch_storage().await;
        std::fs::write(dir.path().join("one.png"), b"x").unwrap();
        std::fs::write(dir.path().join("two"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("three")).unwrap();

        let stems = storage.list_stems().await.unwrap();
        assert_eq!(stems.len(), 2);
        assert!(stems.contains("one"));
        assert!(stems.contains("two"));
    }

    #[tokio::test]
    async fn keys_must_be_plain_names() {
        let (storage, _dir) = scratch_storage().await;
        for key in ["", "..", "../escape.png", "a/b.png"] {
            let err = storage.get_object(key).await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
    }
}
