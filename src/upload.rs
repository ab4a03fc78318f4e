use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// The largest dataset accepted by default, 16 MiB
pub const DEFAULT_MAX_SIZE: u64 = 16 * 1024 * 1024;

/// Possible errors to occur while accepting an uploaded dataset
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file at `{}`", .0.display())]
    MissingFile(PathBuf),
    #[error("The file `{}` is empty", .0.display())]
    EmptyFile(PathBuf),
    #[error("The file is {size} bytes, but at most {max} bytes are accepted")]
    TooLarge { size: u64, max: u64 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Opens the dataset at `path` if it is an acceptable upload
///
/// An acceptable upload is a regular, non-empty file of at most `max_size`
/// bytes.
pub fn open(path: &Path, max_size: u64) -> Result<File, UploadError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(UploadError::MissingFile(path.to_owned())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(UploadError::MissingFile(path.to_owned()));
        }
        Err(err) => return Err(err.into()),
    };

    match metadata.len() {
        0 => Err(UploadError::EmptyFile(path.to_owned())),
        size if size > max_size => Err(UploadError::TooLarge { size, max: max_size }),
        _ => Ok(File::open(path)?),
    }
}
