use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Inputs directory not found: {path}")]
    #[diagnostic(
        code(inputs::not_found),
        help("Create the inputs directory and place product directories or zip archives inside it")
    )]
    InputsDirMissing { path: Utf8PathBuf },

    #[error("Failed to read inputs directory: {path}")]
    #[diagnostic(
        code(inputs::unreadable),
        help("Check file permissions on the inputs directory")
    )]
    InputsDirUnreadable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Product registry store is unusable: {path}")]
    #[diagnostic(
        code(registry::unusable),
        help("Fix or remove the registry store; packaging halts when product numbering cannot be trusted")
    )]
    RegistryUnusable {
        path: Utf8PathBuf,
        #[source]
        source: drp_registry::RegistryError,
    },

    #[error("Packaging aborted at input: {path}")]
    #[diagnostic(
        code(pack::aborted),
        help("The failure affects product numbering or output storage, so the batch cannot safely continue")
    )]
    PackagingAborted {
        path: Utf8PathBuf,
        #[source]
        source: drp_package::PackageError,
    },
}

impl CliError {
    pub fn inputs_dir_missing(path: Utf8PathBuf) -> Self {
        Self::InputsDirMissing { path }
    }

    pub fn inputs_dir_unreadable(path: Utf8PathBuf, source: std::io::Error) -> Self {
        Self::InputsDirUnreadable { path, source }
    }

    pub fn registry_unusable(path: Utf8PathBuf, source: drp_registry::RegistryError) -> Self {
        Self::RegistryUnusable { path, source }
    }

    pub fn packaging_aborted(path: Utf8PathBuf, source: drp_package::PackageError) -> Self {
        Self::PackagingAborted { path, source }
    }
}
