//! Local filesystem backend

use async_trait::async_trait;
use bytes::Bytes;
use filetime::FileTime;
use pail_core::{
    backend::{ByteRange, StorageBackend, TimeSpec, WriteMode},
    entry::{Entry, EntryKind},
    error::{PailError, PailResult},
    metadata::Metadata,
    UnifiedPath,
};
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Backend for real filesystem paths. The only backend with true
/// directories, POSIX metadata, and atomic rename.
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }

    fn real<'a>(&self, path: &'a UnifiedPath) -> PailResult<&'a Path> {
        path.as_local()
            .ok_or_else(|| PailError::InvalidArgument(format!("not a local path: {path}")))
    }

    fn map_io(err: std::io::Error, path: &UnifiedPath) -> PailError {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => PailError::NotFound(path.to_string()),
            ErrorKind::PermissionDenied => PailError::PermissionDenied(path.to_string()),
            ErrorKind::AlreadyExists => PailError::AlreadyExists(path.to_string()),
            _ => match err.raw_os_error() {
                Some(code) if code == libc::ENOTEMPTY => {
                    PailError::DirectoryNotEmpty(path.to_string())
                }
                Some(code) if code == libc::EISDIR => PailError::IsADirectory(path.to_string()),
                Some(code) if code == libc::ENOTDIR => PailError::NotADirectory(path.to_string()),
                _ => PailError::Io(err),
            },
        }
    }

    fn entry_from(path: &UnifiedPath, meta: &std::fs::Metadata) -> Entry {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else if meta.file_type().is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Unknown
        };

        let mut metadata = Metadata::new();
        metadata.size = Some(meta.len());
        if let Ok(modified) = meta.modified() {
            metadata.modified = Some(modified.into());
        }
        if let Ok(accessed) = meta.accessed() {
            metadata.accessed = Some(accessed.into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            metadata.mode = Some(meta.mode() & 0o7777);
            metadata.uid = Some(meta.uid());
            metadata.gid = Some(meta.gid());
            metadata.nlink = Some(meta.nlink());
            metadata.ino = Some(meta.ino());
        }

        Entry {
            path: path.clone(),
            kind,
            metadata,
        }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn scheme(&self) -> &str {
        "file"
    }

    fn synthetic_directories(&self) -> bool {
        false
    }

    async fn stat(&self, path: &UnifiedPath) -> PailResult<Entry> {
        let real = self.real(path)?;
        let meta = fs::metadata(real).await.map_err(|e| Self::map_io(e, path))?;
        Ok(Self::entry_from(path, &meta))
    }

    async fn list(&self, path: &UnifiedPath) -> PailResult<Vec<Entry>> {
        let real = self.real(path)?;
        let meta = fs::metadata(real).await.map_err(|e| Self::map_io(e, path))?;
        if !meta.is_dir() {
            return Err(PailError::NotADirectory(path.to_string()));
        }

        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(real).await.map_err(|e| Self::map_io(e, path))?;
        while let Some(item) = read_dir.next_entry().await.map_err(|e| Self::map_io(e, path))? {
            let child = UnifiedPath::from_local(item.path());
            // Link entries describe the link itself, as ls does
            let meta = fs::symlink_metadata(item.path())
                .await
                .map_err(|e| Self::map_io(e, &child))?;
            entries.push(Self::entry_from(&child, &meta));
        }
        Ok(entries)
    }

    async fn read(&self, path: &UnifiedPath, range: Option<ByteRange>) -> PailResult<Bytes> {
        let real = self.real(path)?;
        let meta = fs::metadata(real).await.map_err(|e| Self::map_io(e, path))?;
        if meta.is_dir() {
            return Err(PailError::IsADirectory(path.to_string()));
        }

        let mut file = fs::File::open(real).await.map_err(|e| Self::map_io(e, path))?;
        let mut buffer = Vec::new();
        match range {
            Some((start, end)) => {
                file.seek(SeekFrom::Start(start))
                    .await
                    .map_err(|e| Self::map_io(e, path))?;
                match end {
                    Some(end) => {
                        let len = end.saturating_sub(start);
                        let mut take = file.take(len);
                        take.read_to_end(&mut buffer)
                            .await
                            .map_err(|e| Self::map_io(e, path))?;
                    }
                    None => {
                        file.read_to_end(&mut buffer)
                            .await
                            .map_err(|e| Self::map_io(e, path))?;
                    }
                }
            }
            None => {
                file.read_to_end(&mut buffer)
                    .await
                    .map_err(|e| Self::map_io(e, path))?;
            }
        }
        Ok(Bytes::from(buffer))
    }

    async fn write(&self, path: &UnifiedPath, data: Bytes, mode: WriteMode) -> PailResult<Entry> {
        let real = self.real(path)?;
        match mode {
            WriteMode::Overwrite => {
                fs::write(real, &data).await.map_err(|e| Self::map_io(e, path))?;
            }
            WriteMode::Append => {
                let mut file = fs::OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(real)
                    .await
                    .map_err(|e| Self::map_io(e, path))?;
                file.write_all(&data).await.map_err(|e| Self::map_io(e, path))?;
                file.flush().await.map_err(|e| Self::map_io(e, path))?;
            }
        }
        self.stat(path).await
    }

    async fn create_dir(
        &self,
        path: &UnifiedPath,
        parents: bool,
        exist_ok: bool,
    ) -> PailResult<()> {
        let real = self.real(path)?;
        let result = if parents {
            fs::create_dir_all(real).await
        } else {
            fs::create_dir(real).await
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && exist_ok => {
                let meta = fs::metadata(real).await.map_err(|e| Self::map_io(e, path))?;
                if meta.is_dir() {
                    Ok(())
                } else {
                    Err(PailError::AlreadyExists(path.to_string()))
                }
            }
            Err(e) => Err(Self::map_io(e, path)),
        }
    }

    async fn remove_file(&self, path: &UnifiedPath) -> PailResult<()> {
        let real = self.real(path)?;
        fs::remove_file(real).await.map_err(|e| Self::map_io(e, path))
    }

    async fn remove_dir(&self, path: &UnifiedPath) -> PailResult<()> {
        let real = self.real(path)?;
        fs::remove_dir(real).await.map_err(|e| Self::map_io(e, path))
    }

    async fn rename(&self, src: &UnifiedPath, dest: &UnifiedPath) -> PailResult<Entry> {
        let src_real = self.real(src)?;
        let dest_real = self.real(dest)?;
        fs::rename(src_real, dest_real)
            .await
            .map_err(|e| Self::map_io(e, src))?;
        self.stat(dest).await
    }

    async fn copy(
        &self,
        src: &UnifiedPath,
        dest: &UnifiedPath,
        preserve: bool,
    ) -> PailResult<Entry> {
        let src_real = self.real(src)?;
        let dest_real = self.real(dest)?;
        fs::copy(src_real, dest_real)
            .await
            .map_err(|e| Self::map_io(e, src))?;

        if preserve {
            let meta = fs::metadata(src_real).await.map_err(|e| Self::map_io(e, src))?;
            let atime = FileTime::from_last_access_time(&meta);
            let mtime = FileTime::from_last_modification_time(&meta);
            filetime::set_file_times(dest_real, atime, mtime)
                .map_err(|e| Self::map_io(e, dest))?;
        }
        self.stat(dest).await
    }

    async fn set_times(
        &self,
        path: &UnifiedPath,
        atime: Option<TimeSpec>,
        mtime: Option<TimeSpec>,
    ) -> PailResult<()> {
        let real = self.real(path)?;
        let to_filetime = |spec: TimeSpec| match spec {
            TimeSpec::Now => FileTime::now(),
            TimeSpec::At(dt) => FileTime::from_unix_time(dt.timestamp(), dt.timestamp_subsec_nanos()),
        };

        match (atime, mtime) {
            (Some(a), Some(m)) => filetime::set_file_times(real, to_filetime(a), to_filetime(m))
                .map_err(|e| Self::map_io(e, path)),
            (Some(a), None) => {
                filetime::set_file_atime(real, to_filetime(a)).map_err(|e| Self::map_io(e, path))
            }
            (None, Some(m)) => {
                filetime::set_file_mtime(real, to_filetime(m)).map_err(|e| Self::map_io(e, path))
            }
            (None, None) => Ok(()),
        }
    }
}
