use std::fs::{File, OpenOptions};
use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::layout::StorageLayout;

/// Advisory lock on an index root: exclusive for writers, shared for readers.
/// Released when dropped.
pub struct FileLock {
    pub file: File,
    pub exclusive: bool,
}

impl FileLock {
    pub fn acquire(storage: &StorageLayout, exclusive: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(storage.lock_path())?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            use libc::{flock, LOCK_EX, LOCK_SH, LOCK_NB};

            let fd = file.as_raw_fd();
            let operation = (if exclusive { LOCK_EX } else { LOCK_SH }) | LOCK_NB;

            unsafe {
                if flock(fd, operation) != 0 {
                    return Err(Error::new(
                        ErrorKind::InvalidState,
                        format!("index at {} is locked by another process", storage.base_dir.display()),
                    ));
                }
            }
        }

        Ok(FileLock { file, exclusive })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            use libc::{flock, LOCK_UN};

            let fd = self.file.as_raw_fd();
            unsafe {
                flock(fd, LOCK_UN);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_lock_excludes_second_writer() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).unwrap();

        let first = FileLock::acquire(&layout, true).unwrap();
        let err = FileLock::acquire(&layout, true).err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidState);

        drop(first);
        assert!(FileLock::acquire(&layout, true).is_ok());
    }

    #[test]
    fn test_shared_locks_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::create(dir.path()).unwrap();

        let _a = FileLock::acquire(&layout, false).unwrap();
        let _b = FileLock::acquire(&layout, false).unwrap();
        assert!(FileLock::acquire(&layout, true).is_err());
    }
}
