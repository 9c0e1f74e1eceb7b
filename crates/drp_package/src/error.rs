use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while packaging one input.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("input is neither a directory nor a zip archive: {path}")]
    UnreadableInput { path: Utf8PathBuf },

    #[error("input yields no installable file entries: {path}")]
    EmptyInput { path: Utf8PathBuf },

    #[error("no recognized content root or category folder in: {path}")]
    NoCanonicalRoot { path: Utf8PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("registry error: {0}")]
    Registry(#[from] drp_registry::RegistryError),
}

impl PackageError {
    /// Whether the failure is local to one input. Local failures skip the
    /// input with a diagnostic; anything else aborts the batch, since
    /// further product numbering would be unsafe.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnreadableInput { .. } | Self::EmptyInput { .. } | Self::NoCanonicalRoot { .. }
        )
    }
}
