use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// The filesystem operations the chart cache depends on. Errors are OS-level errors, the
/// callers add the context of the operation they were attempting.
pub trait Filesystem {
    /// Returns true if something exists at the path. A missing path is not an error.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Creates a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Moves a file, replacing the destination if it exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes a directory and everything inside it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Lists the entries of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Creates a new, uniquely named directory inside `dir`. The caller owns its removal.
    fn temp_dir_in(&self, dir: &Path, prefix: &str) -> io::Result<PathBuf>;
}

/// Filesystem backed by the host operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFs;

impl Filesystem for OsFs {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(path)?
            .map(|res| res.map(|e| e.path()))
            .collect::<Result<Vec<_>, io::Error>>()
    }

    fn temp_dir_in(&self, dir: &Path, prefix: &str) -> io::Result<PathBuf> {
        let tmp = tempfile::Builder::new().prefix(prefix).tempdir_in(dir)?;
        Ok(tmp.into_path())
    }
}
