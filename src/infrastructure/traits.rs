//! I/O boundary traits for testability
//!
//! These traits abstract the file system and template persistence, allowing
//! services to be tested with mock implementations.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::Template;
use crate::infrastructure::{InfraError, InfraResult};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Entries of a directory (non-recursive).
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Persistence collaborator: load and save templates by id.
///
/// The editor core never performs I/O itself; the surrounding layer owns
/// a store and moves templates in and out of an `EditorService`.
pub trait TemplateStore: Send + Sync {
    fn load(&self, id: &str) -> InfraResult<Template>;

    fn save(&self, id: &str, template: &Template) -> InfraResult<()>;

    fn exists(&self, id: &str) -> bool;

    /// Ids of all stored templates, sorted.
    fn list(&self) -> InfraResult<Vec<String>>;

    fn delete(&self, id: &str) -> InfraResult<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Atomic: content goes to a sibling temp file that replaces the target.
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }
}

const TEMPLATE_EXTENSION: &str = "json";

fn template_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("template id pattern is valid"))
}

/// Check that a template id is safe to use as a file stem.
pub fn validate_template_id(id: &str) -> InfraResult<()> {
    if template_id_pattern().is_match(id) {
        Ok(())
    } else {
        Err(InfraError::InvalidTemplateId(id.to_string()))
    }
}

/// Template store keeping one pretty-printed JSON file per template:
/// `<dir>/<id>.json`.
pub struct FsTemplateStore {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FsTemplateStore {
    pub fn new(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> InfraResult<PathBuf> {
        validate_template_id(id)?;
        Ok(self.dir.join(format!("{}.{}", id, TEMPLATE_EXTENSION)))
    }
}

impl TemplateStore for FsTemplateStore {
    #[instrument(level = "debug", skip(self))]
    fn load(&self, id: &str) -> InfraResult<Template> {
        let path = self.path_for(id)?;
        if !self.fs.exists(&path) {
            return Err(InfraError::TemplateNotFound(id.to_string()));
        }
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| InfraError::io(format!("read template {}", path.display()), e))?;
        let template = Template::from_json(&content).map_err(ApplicationError::from)?;
        debug!("loaded {} ({} nodes)", id, template.node_count());
        Ok(template)
    }

    #[instrument(level = "debug", skip(self, template))]
    fn save(&self, id: &str, template: &Template) -> InfraResult<()> {
        let path = self.path_for(id)?;
        let json = template.to_json_pretty().map_err(ApplicationError::from)?;
        self.fs
            .ensure_parent(&path)
            .map_err(|e| InfraError::io(format!("create {}", self.dir.display()), e))?;
        self.fs
            .write(&path, &json)
            .map_err(|e| InfraError::io(format!("write template {}", path.display()), e))?;
        debug!("saved {}", path.display());
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.path_for(id)
            .map(|path| self.fs.is_file(&path))
            .unwrap_or(false)
    }

    fn list(&self) -> InfraResult<Vec<String>> {
        if !self.fs.exists(&self.dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .read_dir(&self.dir)
            .map_err(|e| InfraError::io(format!("list {}", self.dir.display()), e))?;
        let mut ids: Vec<String> = entries
            .iter()
            .filter(|path| {
                path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION)
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
            .filter(|stem| template_id_pattern().is_match(stem))
            .map(str::to_string)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, id: &str) -> InfraResult<()> {
        let path = self.path_for(id)?;
        if !self.fs.exists(&path) {
            return Err(InfraError::TemplateNotFound(id.to_string()));
        }
        self.fs
            .remove_file(&path)
            .map_err(|e| InfraError::io(format!("delete template {}", path.display()), e))
    }
}
