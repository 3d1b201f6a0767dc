//! Layered properties configuration.
//!
//! Loads an ordered list of sources and merges them into one immutable
//! [`ConfigView`]:
//! 1. **Resources** - key/value text found through a [`ResourceLocator`]
//! 2. **Formatted resources** - `tag:/path`, read by a [`StructuredParser`]
//! 3. **Ambient settings** - the path `/`, a snapshot of [`AmbientSettings`]
//!
//! ## Merge Strategy
//! - Whole keys shadow; nothing is merged field-by-field
//! - The last source in load order wins in key and prefix lookups
//! - Per-source lookups always return what that source contained
//!
//! ## Environment Variables
//! - `MULTIPROPS_RESOURCE_PATH` - Resource roots (default: `./config`, `~/.multiprops`)

mod ambient;
mod condense;
mod loader;
mod properties;
mod resources;
mod source;
mod structured;
mod view;
mod vm;

pub use ambient::{AmbientSettings, ProcessEnvironment, StaticAmbient};
pub use condense::condense_paths;
pub use loader::{SourceLoader, YAML_TAG};
pub use properties::{Properties, escape, parse_properties};
pub use resources::{
    ChainLocator, DirLocator, MemoryLocator, RESOURCE_PATH_ENV, ResourceLocator, ResourceRoots,
};
pub use source::{AMBIENT_PATH, SourceId, parse_all};
pub use structured::{StructuredParser, YamlParser};
pub use view::ConfigView;
pub use vm::{HARDCODED_DEFAULT_PATHS, VM_MANIFEST_RESOURCES, VmConfigResolver, parse_manifest};
