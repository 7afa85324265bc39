use chrono::Utc;
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;

/// How many consecutive millisecond values `create` tries before giving up.
const MAX_NAME_ATTEMPTS: i64 = 64;

/// Flat directory holding uploaded images, addressed by generated name.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

/// A file that has been written to the [`FileStore`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// A freshly created upload that is still being written.
///
/// Either [`finish`](Self::finish) it or [`discard`](Self::discard) it;
/// dropping it leaves a partial file behind.
#[derive(Debug)]
pub struct PendingFile {
    file: fs::File,
    name: String,
    path: PathBuf,
    written: u64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet.
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(self.root.as_path()).await
    }

    /// Opens a new, empty file named `<unix-millis><ext>`.
    pub async fn create(&self, original_name: Option<&str>) -> io::Result<PendingFile> {
        self.create_at(Utc::now().timestamp_millis(), original_name)
            .await
    }

    /// Same as [`create`](Self::create) with an explicit starting timestamp.
    ///
    /// A name that is already taken is never overwritten: the timestamp is
    /// bumped by one millisecond and creation retried.
    pub async fn create_at(
        &self,
        millis: i64,
        original_name: Option<&str>,
    ) -> io::Result<PendingFile> {
        let ext = original_name.map(extension_of).unwrap_or_default();

        for offset in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{}{}", millis + offset, ext);
            let path = self.root.join(&name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    return Ok(PendingFile {
                        file,
                        name,
                        path,
                        written: 0,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free upload name starting at {millis}{ext}"),
        ))
    }

    /// Deletes a completed upload that will not be referenced by any post.
    pub async fn remove(&self, file: StoredFile) {
        remove_logged(&file.path).await;
    }
}

impl PendingFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes to disk. On failure the partial file is removed.
    pub async fn finish(mut self) -> io::Result<StoredFile> {
        let synced = async {
            self.file.flush().await?;
            self.file.sync_all().await
        }
        .await;

        match synced {
            Ok(()) => Ok(StoredFile {
                name: self.name,
                path: self.path,
                size: self.written,
            }),
            Err(e) => {
                self.discard().await;
                Err(e)
            }
        }
    }

    /// Closes and deletes the partial file.
    pub async fn discard(self) {
        let PendingFile { file, path, .. } = self;
        drop(file);
        remove_logged(&path).await;
    }
}

async fn remove_logged(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!(
            "Could not remove upload {} ({}); file left orphaned",
            path.display(),
            e
        );
    }
}

/// Extension of the client-supplied file name, leading dot included.
///
/// Only the last path component is looked at, so a hostile name cannot
/// smuggle separators into the stored name.
pub fn extension_of(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    match Path::new(base).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_the_leading_dot() {
        assert_eq!(extension_of("photo.png"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("IMG_0001.JPG"), ".JPG");
    }

    #[test]
    fn names_without_extension() {
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of(""), "");
        assert_eq!(extension_of("photo."), ".");
    }

    #[test]
    fn only_the_last_component_counts() {
        assert_eq!(extension_of("../../etc/passwd"), "");
        assert_eq!(extension_of("dir.d/photo"), "");
        assert_eq!(extension_of("C:\\Users\\me\\cat.webp"), ".webp");
    }

    async fn write(store: &FileStore, millis: i64, name: &str, bytes: &[u8]) -> StoredFile {
        let mut pending = store.create_at(millis, Some(name)).await.unwrap();
        pending.write_chunk(bytes).await.unwrap();
        pending.finish().await.unwrap()
    }

    #[tokio::test]
    async fn chunks_are_written_under_timestamp_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let mut pending = store
            .create_at(1_700_000_000_000, Some("cat.jpg"))
            .await
            .unwrap();
        pending.write_chunk(b"me").await.unwrap();
        pending.write_chunk(b"ow").await.unwrap();
        let stored = pending.finish().await.unwrap();

        assert_eq!(stored.name, "1700000000000.jpg");
        assert_eq!(stored.path, dir.path().join("1700000000000.jpg"));
        assert_eq!(stored.size, 4);
        assert_eq!(fs::read(&stored.path).await.unwrap(), b"meow");
    }

    #[tokio::test]
    async fn taken_names_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let first = write(&store, 42, "a.png", b"first").await;
        let second = write(&store, 42, "b.png", b"second").await;

        assert_eq!(first.name, "42.png");
        assert_eq!(second.name, "43.png");
        assert_eq!(fs::read(&first.path).await.unwrap(), b"first");
        assert_eq!(fs::read(&second.path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn same_millisecond_with_other_extension_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let png = write(&store, 7, "a.png", b"").await;
        let gif = write(&store, 7, "a.gif", b"").await;

        assert_eq!(png.name, "7.png");
        assert_eq!(gif.name, "7.gif");
    }

    #[tokio::test]
    async fn discarded_and_removed_files_are_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let mut pending = store.create_at(1, Some("a.png")).await.unwrap();
        pending.write_chunk(b"partial").await.unwrap();
        let partial = pending.path().to_path_buf();
        assert!(partial.exists());
        pending.discard().await;
        assert!(!partial.exists());

        let stored = write(&store, 2, "b.png", b"done").await;
        let path = stored.path.clone();
        store.remove(stored).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_directory_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing"));

        let err = store.create(Some("a.png")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        store.ensure_root().await.unwrap();
        assert!(store.create(Some("a.png")).await.is_ok());
    }
}
