//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{EditorService, HtmlRenderer};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, FsTemplateStore, RealFileSystem, TemplateStore};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Template persistence
    pub store: Arc<dyn TemplateStore>,

    /// HTML export
    pub renderer: HtmlRenderer,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(FsTemplateStore::new(
            settings.templates_dir.clone(),
            fs.clone(),
        ));
        Self::with_deps(settings, fs, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn TemplateStore>,
    ) -> Self {
        let renderer = HtmlRenderer::new(settings.render.clone());
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            store,
            renderer,
        }
    }

    /// A fresh editing session with the configured history depth.
    pub fn editor(&self) -> EditorService {
        EditorService::new(self.settings.history_capacity)
    }
}
