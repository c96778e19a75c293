//! # Guillemet
//!
//! A file-based template composition engine: logical names resolve to
//! template files through wildcard-capable paths, pages render inside
//! a shared layout, and components nest with copy-on-extend prop
//! scoping, caller-provided slot content and deduplicated head
//! fragments.
//!
//! Resolution lives in the [`guillemet_resolve`] crate and is
//! re-exported here; this crate adds the typed wildcard vocabulary,
//! configuration, the template-engine seam and the composition
//! builtins.
//!
//! ## Example
//!
//! ```
//! use guillemet::{Config, MemSource, Templater, Value};
//!
//! let src = MemSource::new()
//!     .with(
//!         "base/layout.html.tmpl",
//!         "<html>{{ block \"body\" . }}</html>",
//!     )
//!     .with(
//!         "base/pages/products/{id.int}.html.tmpl",
//!         "product #{{ .PathParams.id }} for {{ .user }}",
//!     );
//!
//! let templater = Templater::new(Config::default(), src);
//! let out = templater
//!     .execute_page("products/42", &[Value::from("user"), Value::from("ada")])
//!     .unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "<html>product #42 for ada</html>"
//! );
//! ```

pub mod coerce;
pub mod config;
mod context;
pub mod engine;
pub mod error;
pub mod props;
pub mod templater;
pub mod value;

pub use config::{Config, DirsConfig};
pub use engine::{BraceEngine, Engine, EngineError, FuncResolver, NoFuncs};
pub use error::{Error, Phase};
pub use props::{Props, PATH_PARAMS_KEY, SLOT_KEY_PREFIX};
pub use templater::{TemplateFn, Templater};
pub use value::Value;

pub use guillemet_resolve::{
    resolve, DiskSource, MemSource, Resolved, ResolveError, Source, SourceError,
};
