use crate::common::error::{Result, TempFileCreation, WriteToTempFile};
use snafu::ResultExt;
use std::io::Write;
use tempfile::NamedTempFile as TempFile;

/// Create a new temporary file with the given suffix and write the buffer to it. The file is
/// removed when the returned handle is dropped.
pub(crate) fn write_to_tempfile(suffix: &str, buf: &[u8]) -> Result<TempFile> {
    let mut handle: TempFile = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .context(TempFileCreation)?;

    handle.write_all(buf).context(WriteToTempFile {
        filepath: handle.path().to_path_buf(),
    })?;
    handle.flush().context(WriteToTempFile {
        filepath: handle.path().to_path_buf(),
    })?;

    Ok(handle)
}
