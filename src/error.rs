use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to load an image from the resources directory.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid SVG {path}: {source}")]
    Svg {
        path: PathBuf,
        #[source]
        source: resvg::usvg::Error,
    },
    #[error("could not decode {path}: {source}")]
    Raster {
        path: PathBuf,
        #[source]
        source: glib::Error,
    },
    #[error("no image named {0}")]
    Missing(String),
}

/// Failure to load a Fluent translation bundle.
#[derive(Debug, Error)]
pub enum I18nError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("syntax errors in {path}")]
    Parse { path: PathBuf },
    #[error("invalid language tag {0}")]
    Language(String),
    #[error("duplicate messages in {path}")]
    Bundle { path: PathBuf },
}
