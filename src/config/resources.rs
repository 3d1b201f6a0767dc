//! Locating named resources.
//!
//! Source paths look absolute (`/app.properties`) but are resolved against a
//! list of resource roots, the way a search path works: the first root that
//! has the file wins.
//!
//! ## Environment Variables
//! - `MULTIPROPS_RESOURCE_PATH` - Resource roots, separated like `PATH`

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Environment variable listing resource roots.
pub const RESOURCE_PATH_ENV: &str = "MULTIPROPS_RESOURCE_PATH";

/// Reads a named resource as text.
pub trait ResourceLocator: Send + Sync {
    /// `Ok(None)` if nothing by that name exists, `Err` if it exists but
    /// could not be read.
    fn read(&self, path: &str) -> io::Result<Option<String>>;
}

/// Ordered list of directories that resource paths are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRoots {
    pub dirs: Vec<PathBuf>,
}

impl ResourceRoots {
    /// Discover roots from the environment, falling back to `./config` and
    /// `~/.multiprops`.
    pub fn discover() -> Self {
        if let Some(raw) = std::env::var_os(RESOURCE_PATH_ENV) {
            let dirs: Vec<PathBuf> = std::env::split_paths(&raw)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !dirs.is_empty() {
                return Self { dirs };
            }
        }

        let mut roots = vec![PathBuf::from("config")];
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".multiprops"));
        }
        Self { dirs: roots }
    }

    /// Create roots with explicit directories.
    pub fn with_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }
}

/// Resolves resource paths against directories on disk.
#[derive(Debug, Clone)]
pub struct DirLocator {
    roots: ResourceRoots,
}

impl DirLocator {
    pub fn new(roots: ResourceRoots) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &ResourceRoots {
        &self.roots
    }

    /// Find the entry a resource path would be read from. The first root
    /// that has anything at that location wins, even if it is not a file.
    pub fn find(&self, path: &str) -> Option<PathBuf> {
        let relative = relative_resource_path(path)?;
        self.roots
            .dirs
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.exists())
    }
}

impl ResourceLocator for DirLocator {
    fn read(&self, path: &str) -> io::Result<Option<String>> {
        let Some(file) = self.find(path) else {
            return Ok(None);
        };
        match std::fs::read(&file) {
            Ok(bytes) => Ok(Some(decode_text(bytes))),
            // Removed between the lookup and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// UTF-8 if the bytes are valid UTF-8, otherwise ISO-8859-1.
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Turn `/a/b.properties` into `a/b.properties`, refusing anything that
/// would climb out of a root.
fn relative_resource_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let mut out = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// In-memory resources, keyed by their exact path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocator {
    resources: HashMap<String, String>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.resources.insert(path.into(), content.into());
    }
}

impl ResourceLocator for MemoryLocator {
    fn read(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.resources.get(path).cloned())
    }
}

/// Tries each locator in turn; the first that finds the resource wins.
#[derive(Default)]
pub struct ChainLocator {
    locators: Vec<Box<dyn ResourceLocator>>,
}

impl ChainLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, locator: impl ResourceLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }
}

impl ResourceLocator for ChainLocator {
    fn read(&self, path: &str) -> io::Result<Option<String>> {
        for locator in &self.locators {
            if let Some(content) = locator.read(path)? {
                return Ok(Some(content));
            }
        }
        Ok(None)
    }
}
