//! Plugin loaders - turn an identifier into an uninitialized plugin
//!
//! - [`FactoryLoader`]: named constructor functions compiled into the host
//! - [`DylibLoader`]: dynamic libraries found in plugin directories
//! - [`ChainLoader`]: tries several loaders in order

use libloading::Library;
use std::collections::BTreeMap;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

use neuro_plugin_api::{
    API_VERSION, DebugEvent, EventKind, Plugin, PluginContext, PluginError, PluginManifest,
};

use super::error::PluginInitializationError;
use super::logger::LogPlugin;

/// Resolves plugin identifiers to plugin instances
pub trait PluginLoader: Send + Sync {
    fn resolve(&self, id: &str) -> Result<Box<dyn Plugin>, PluginInitializationError>;

    /// Directory holding the plugin's files (e.g. `config.toml`), if it has one
    fn plugin_dir(&self, _id: &str) -> Option<PathBuf> {
        None
    }
}

// ─── FactoryLoader ───────────────────────────────────────────────────

type Factory = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// Loader backed by an explicit table of constructor functions
#[derive(Default)]
pub struct FactoryLoader {
    factories: BTreeMap<String, Factory>,
}

impl FactoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that knows the plugins shipped with neuro-core
    pub fn with_builtins() -> Self {
        let mut loader = Self::new();
        loader.register(LogPlugin::ID, || Box::new(LogPlugin::default()));
        loader
    }

    /// Register a constructor under `id`, replacing any previous one
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Known identifiers, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl PluginLoader for FactoryLoader {
    fn resolve(&self, id: &str) -> Result<Box<dyn Plugin>, PluginInitializationError> {
        self.factories
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| PluginInitializationError::NotFound { id: id.to_string() })
    }
}

// ─── DylibLoader ─────────────────────────────────────────────────────

type CreateFn = extern "C" fn() -> *mut dyn Plugin;
type DestroyFn = extern "C" fn(*mut dyn Plugin);

/// Loader for plugins built as dynamic libraries with `export_plugin!`.
///
/// Each plugin lives in its own directory under one of the search
/// directories:
///
/// ```text
/// <dir>/<id>/<id>.so        (or lib<id>.so, .dylib on macOS, .dll on Windows)
/// <dir>/<id>/config.toml    (optional)
/// ```
///
/// Directories are searched in order; the first match wins.
pub struct DylibLoader {
    dirs: Vec<PathBuf>,
}

impl DylibLoader {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn find_plugin_dir(&self, id: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|base| base.join(id))
            .find(|dir| dir.is_dir())
    }

    /// Find the library file in a plugin directory
    fn find_library(dir: &Path, id: &str) -> Result<PathBuf, PluginInitializationError> {
        let extensions: &[&str] = if cfg!(target_os = "macos") {
            &["dylib", "so"]
        } else if cfg!(target_os = "windows") {
            &["dll"]
        } else {
            &["so"]
        };

        for ext in extensions {
            let lib_path = dir.join(format!("{}.{}", id, ext));
            if lib_path.exists() {
                return Ok(lib_path);
            }

            let lib_path = dir.join(format!("lib{}.{}", id, ext));
            if lib_path.exists() {
                return Ok(lib_path);
            }
        }

        Err(PluginInitializationError::LibraryNotFound {
            dir: dir.to_path_buf(),
        })
    }

    fn load_library(lib_path: &Path) -> Result<DylibPlugin, PluginInitializationError> {
        // SAFETY: the library is a plugin the user placed in a plugin
        // directory and is expected to follow the export_plugin! contract.
        let library = unsafe { Library::new(lib_path)? };

        // SAFETY: symbol signature is fixed by export_plugin!
        let api_version_fn: libloading::Symbol<extern "C" fn() -> u32> =
            unsafe { library.get(b"_neuro_plugin_api_version")? };

        let found = api_version_fn();
        if found != API_VERSION {
            return Err(PluginInitializationError::ApiVersionMismatch {
                expected: API_VERSION,
                found,
            });
        }

        // SAFETY: symbol signatures are fixed by export_plugin!
        let create: CreateFn = unsafe { *library.get::<CreateFn>(b"_neuro_plugin_create")? };
        let destroy: DestroyFn = unsafe { *library.get::<DestroyFn>(b"_neuro_plugin_destroy")? };

        // SAFETY: create returns a pointer from Box::into_raw
        let instance = unsafe { Box::from_raw(create()) };

        Ok(DylibPlugin {
            instance: ManuallyDrop::new(instance),
            destroy,
            _library: library,
        })
    }
}

impl PluginLoader for DylibLoader {
    fn resolve(&self, id: &str) -> Result<Box<dyn Plugin>, PluginInitializationError> {
        let dir = self
            .find_plugin_dir(id)
            .ok_or_else(|| PluginInitializationError::NotFound { id: id.to_string() })?;
        let lib_path = Self::find_library(&dir, id)?;

        tracing::debug!(plugin = %id, path = %lib_path.display(), "Loading plugin library");
        Ok(Box::new(Self::load_library(&lib_path)?))
    }

    fn plugin_dir(&self, id: &str) -> Option<PathBuf> {
        self.find_plugin_dir(id)
    }
}

/// A plugin instance together with the library its code lives in.
///
/// The instance is handed back to the library's destroy function before
/// the library is unloaded.
struct DylibPlugin {
    instance: ManuallyDrop<Box<dyn Plugin>>,
    destroy: DestroyFn,
    _library: Library,
}

impl Drop for DylibPlugin {
    fn drop(&mut self) {
        // SAFETY: instance is never used again after this point
        let instance = unsafe { ManuallyDrop::take(&mut self.instance) };
        (self.destroy)(Box::into_raw(instance));
    }
}

impl Plugin for DylibPlugin {
    fn manifest(&self) -> PluginManifest {
        self.instance.manifest()
    }

    fn init(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        self.instance.init(ctx)
    }

    fn stop(&self) -> Result<(), PluginError> {
        self.instance.stop()
    }

    fn handles(&self, kind: EventKind) -> bool {
        self.instance.handles(kind)
    }

    fn on_debug(&self, event: &DebugEvent) -> Result<(), PluginError> {
        self.instance.on_debug(event)
    }

    fn on_quit(&self) -> Result<(), PluginError> {
        self.instance.on_quit()
    }
}

// ─── ChainLoader ─────────────────────────────────────────────────────

/// Tries each loader in order until one knows the identifier
#[derive(Default)]
pub struct ChainLoader {
    loaders: Vec<Box<dyn PluginLoader>>,
}

impl ChainLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, loader: impl PluginLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }
}

impl PluginLoader for ChainLoader {
    fn resolve(&self, id: &str) -> Result<Box<dyn Plugin>, PluginInitializationError> {
        let mut last = PluginInitializationError::NotFound { id: id.to_string() };
        for loader in &self.loaders {
            match loader.resolve(id) {
                Ok(plugin) => return Ok(plugin),
                Err(e) if e.is_not_found() => last = e,
                Err(e) => return Err(e),
            }
        }
        Err(last)
    }

    fn plugin_dir(&self, id: &str) -> Option<PathBuf> {
        self.loaders.iter().find_map(|loader| loader.plugin_dir(id))
    }
}
