use std::path::PathBuf;

use crate::aspects::AspectTaxonomy;
use crate::error::{AnnotateError, Result};

/// Where a taxonomy comes from: an in-memory mapping or a file on disk.
#[derive(Debug, Clone)]
pub enum AspectSource {
    Inline(AspectTaxonomy),
    Path(PathBuf),
}

impl AspectSource {
    /// Produce the taxonomy, failing before any parsing if the path is unusable.
    pub fn resolve(self) -> Result<AspectTaxonomy> {
        match self {
            AspectSource::Inline(taxonomy) => Ok(taxonomy),
            AspectSource::Path(path) => {
                if !path.is_file() {
                    return Err(AnnotateError::Configuration(format!(
                        "aspects must be either a mapping or a path to a taxonomy file, got '{}'",
                        path.display()
                    )));
                }
                AspectTaxonomy::from_file(&path)
            }
        }
    }
}

impl Default for AspectSource {
    fn default() -> Self {
        AspectSource::Inline(AspectTaxonomy::default_education())
    }
}

impl From<AspectTaxonomy> for AspectSource {
    fn from(taxonomy: AspectTaxonomy) -> Self {
        AspectSource::Inline(taxonomy)
    }
}

impl From<PathBuf> for AspectSource {
    fn from(path: PathBuf) -> Self {
        AspectSource::Path(path)
    }
}

impl From<&str> for AspectSource {
    fn from(path: &str) -> Self {
        AspectSource::Path(PathBuf::from(path))
    }
}
