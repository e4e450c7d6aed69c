//! Template name to source path resolution.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("template `{name}` not found (searched {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("invalid template name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps a template name, plus the active module if any, to a readable
/// source path. Must be deterministic for a given name and environment.
pub trait TemplateResolver {
    fn resolve(&self, name: &str, module: Option<&str>) -> Result<PathBuf, ResolveError>;
}

/// Resolves `<views_dir>/<name><extension>`, trying
/// `<modules_dir>/<module>/views/<name><extension>` first when a module is
/// active.
#[derive(Clone, Debug)]
pub struct FileSystemResolver {
    views_dir: PathBuf,
    modules_dir: Option<PathBuf>,
    extension: String,
}

impl FileSystemResolver {
    pub fn new(views_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        FileSystemResolver {
            views_dir: views_dir.into(),
            modules_dir: None,
            extension: extension.into(),
        }
    }

    #[must_use]
    pub fn with_modules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modules_dir = Some(dir.into());
        self
    }

    /// Paths tried for `name`, in order.
    pub fn candidates(&self, name: &str, module: Option<&str>) -> Vec<PathBuf> {
        let file = format!("{name}{}", self.extension);
        let mut paths = Vec::with_capacity(2);
        if let (Some(modules), Some(module)) = (&self.modules_dir, module) {
            paths.push(modules.join(module).join("views").join(&file));
        }
        paths.push(self.views_dir.join(&file));
        paths
    }
}

impl TemplateResolver for FileSystemResolver {
    fn resolve(&self, name: &str, module: Option<&str>) -> Result<PathBuf, ResolveError> {
        validate_name(name)?;
        if let Some(module) = module {
            validate_name(module)?;
        }

        let searched = self.candidates(name, module);
        match searched.iter().find(|path| path.is_file()) {
            Some(found) => {
                tracing::trace!(name, path = %found.display(), "resolved template");
                Ok(found.clone())
            }
            None => Err(ResolveError::NotFound {
                name: name.to_string(),
                searched,
            }),
        }
    }
}

/// Names are relative paths that stay inside the directory they're joined
/// onto.
fn validate_name(name: &str) -> Result<(), ResolveError> {
    let invalid = |reason| ResolveError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("`..` is not allowed")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("absolute paths are not allowed"));
            }
        }
    }
    Ok(())
}
