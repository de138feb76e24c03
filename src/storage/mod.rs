use std::collections::HashSet;
use std::io;

use bytes::Bytes;

pub mod file;

pub use file::FileStorage;

pub trait Storage {
    /// Get an object by key.
    async fn get_object(&self, key: &str) -> io::Result<Bytes>;

    /// Create an object, failing if the key is already used.
    async fn put_object(&self, key: &str, data: Bytes) -> io::Result<()>;

    /// Delete an object by key.
    async fn delete_object(&self, key: &str) -> io::Result<()>;

    /// Keys of all stored objects, with any extension stripped.
    async fn list_stems(&self) -> io::Result<HashSet<String>>;
}

/// Reject keys that are not a single plain file name.
pub(crate) fn check_key(key: &str) -> io::Result<()> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid object key '{key}'"),
        ));
    }
    Ok(())
}
