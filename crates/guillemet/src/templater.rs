// File: src/templater.rs
// Purpose: Page and component composition over resolved template files

use std::collections::HashMap;
use std::sync::Arc;

use guillemet_resolve::{resolve, ResolveError, Resolved, Source};
use tracing::debug;

use crate::coerce::coerce;
use crate::config::Config;
use crate::context::{CallState, Scope, ScopeKind};
use crate::engine::{BraceEngine, Engine};
use crate::error::{Error, Phase};
use crate::props::{self, Props, PATH_PARAMS_KEY};
use crate::value::Value;

/// A caller-registered template function. Registered functions shadow
/// the composition builtins of the same name.
pub type TemplateFn = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// The composition engine.
///
/// Resolves logical names to files under the configured pages,
/// components and head-fragment roots, then renders them through the
/// template [`Engine`], wiring the `component`, `componentHead`,
/// `slot` and `props` builtins into every execution.
///
/// Component nesting is not depth-limited; a template tree whose
/// components invoke each other cyclically (outside `componentHead`,
/// which dedups) will recurse until the stack gives out.
pub struct Templater<E: Engine = BraceEngine> {
    config: Config,
    engine: E,
    source: Box<dyn Source + Send + Sync>,
    funcs: HashMap<String, TemplateFn>,
}

impl Templater<BraceEngine> {
    /// A templater over the built-in `{{ ... }}` engine.
    pub fn new(config: Config, source: impl Source + Send + Sync + 'static) -> Self {
        Self::with_engine(config, BraceEngine::new(), source)
    }
}

impl<E: Engine> Templater<E> {
    pub fn with_engine(
        config: Config,
        engine: E,
        source: impl Source + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            engine,
            source: Box::new(source),
            funcs: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a function callable from templates. A function named
    /// like a builtin (`component`, `slot`, ...) takes precedence over
    /// it in every scope.
    pub fn register_fn(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    ) {
        self.funcs.insert(name.into(), Arc::new(f));
    }

    pub(crate) fn registered(&self, name: &str) -> Option<&TemplateFn> {
        self.funcs.get(name)
    }

    /// Renders the page at logical name `name` inside the shared
    /// layout. `kvs` is a flat key/value prop list. The layout file
    /// must exist; a page head fragment under the page-heads subtree
    /// is optional.
    pub fn execute_page(&self, name: &str, kvs: &[Value]) -> Result<Vec<u8>, Error> {
        let props = props::from_kvs(kvs)?;
        let call = CallState::new();
        self.render_page(name, props, &call)
    }

    /// Renders the component at logical name `name` standalone, with
    /// no enclosing page. Slots are unavailable at the top level.
    pub fn execute_component(&self, name: &str, kvs: &[Value]) -> Result<Vec<u8>, Error> {
        let props = props::from_kvs(kvs)?;
        let call = CallState::new();
        self.render_component(name, props, None, &call, ScopeKind::Component)
    }

    /// Renders `name` as a page, falling back to a component of the
    /// same name when no page file exists. Only the resolver's
    /// not-found error triggers the fallback; every other page failure
    /// surfaces as-is.
    pub fn execute(&self, name: &str, kvs: &[Value]) -> Result<Vec<u8>, Error> {
        let page_err = match self.execute_page(name, kvs) {
            Ok(out) => return Ok(out),
            Err(err) if err.is_not_found() => err,
            Err(err) => return Err(err),
        };

        debug!(name, "no page file, trying component");
        match self.execute_component(name, kvs) {
            Ok(out) => Ok(out),
            Err(component_err) => Err(Error::NoMatch {
                name: name.to_string(),
                page: Box::new(page_err),
                component: Box::new(component_err),
            }),
        }
    }

    fn render_page(&self, name: &str, mut props: Props, call: &CallState) -> Result<Vec<u8>, Error> {
        let root = self.config.pages_root();
        let hit = resolve(self.source.as_ref(), &root, name, &self.config.file_ext)?;
        debug!(name, path = %hit.path, "resolved page");
        self.merge_path_params(&hit, &mut props)?;

        let layout_path = format!(
            "{}/{}",
            self.config.dirs.base,
            self.config.layout_filename()
        );
        let layout = self.read(&layout_path)?;

        let mut unit = self.engine.empty();
        self.parse(&mut unit, "layout", &layout, &layout_path)?;

        // Optional per-page head fragment, resolved with the same
        // wildcard machinery as the page itself. Parsed before the
        // body so a `head` block defined in the body wins.
        let heads_root = self.config.page_heads_root();
        match resolve(self.source.as_ref(), &heads_root, name, &self.config.file_ext) {
            Ok(head_hit) => {
                let head_path = format!("{heads_root}/{}", head_hit.path);
                let head = self.read(&head_path)?;
                self.parse(&mut unit, "head", &head, &head_path)?;
            }
            Err(ResolveError::NotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }

        let body_path = format!("{root}/{}", hit.path);
        let body = self.read(&body_path)?;
        self.parse(&mut unit, "body", &body, &body_path)?;

        let ctx = Value::Object(props.clone());
        let scope = Scope::new(self, call, &unit, &props, ScopeKind::Page, false);
        self.engine
            .execute(&unit, "layout", &ctx, &scope)
            .map_err(|source| Error::Engine {
                phase: Phase::Execute,
                file: body_path,
                source,
            })
    }

    /// Renders one component or head fragment. `parent_unit` is the
    /// invoking template's block set; the new unit snapshots it so
    /// slot content blocks defined upstream stay reachable.
    pub(crate) fn render_component(
        &self,
        name: &str,
        mut props: Props,
        parent_unit: Option<&E::Unit>,
        call: &CallState,
        kind: ScopeKind,
    ) -> Result<Vec<u8>, Error> {
        let root = match kind {
            ScopeKind::Head => self.config.heads_root(),
            _ => self.config.components_root(),
        };
        let hit = resolve(self.source.as_ref(), &root, name, &self.config.file_ext)?;
        debug!(name, path = %hit.path, ?kind, "resolved component");
        self.merge_path_params(&hit, &mut props)?;

        let file_path = format!("{root}/{}", hit.path);
        let content = self.read(&file_path)?;

        let mut unit = self.engine.empty();
        if let Some(parent) = parent_unit {
            self.engine.import(&mut unit, parent);
        }
        self.parse(&mut unit, name, &content, &file_path)?;

        let ctx = Value::Object(props.clone());
        let scope = Scope::new(self, call, &unit, &props, kind, parent_unit.is_some());
        self.engine
            .execute(&unit, name, &ctx, &scope)
            .map_err(|source| Error::Engine {
                phase: Phase::Execute,
                file: file_path,
                source,
            })
    }

    /// Executes one already-parsed block (slot content) against the
    /// given props. The block lives in the invoking template, so the
    /// scope keeps the invoker's unit and kind.
    pub(crate) fn execute_block(
        &self,
        block: &str,
        unit: &E::Unit,
        props: &Props,
        call: &CallState,
        kind: ScopeKind,
    ) -> Result<Vec<u8>, Error> {
        let ctx = Value::Object(props.clone());
        let scope = Scope::new(self, call, unit, props, kind, true);
        self.engine
            .execute(unit, block, &ctx, &scope)
            .map_err(|source| Error::Engine {
                phase: Phase::Execute,
                file: block.to_string(),
                source,
            })
    }

    /// Coerces the resolution's captured wildcards and merges them
    /// into the `PathParams` prop, on top of any captures inherited
    /// from an enclosing render.
    fn merge_path_params(&self, hit: &Resolved, props: &mut Props) -> Result<(), Error> {
        if hit.params.is_empty() {
            return Ok(());
        }

        let mut map = match props.get(PATH_PARAMS_KEY) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => HashMap::new(),
        };
        for (spec, raw) in &hit.params {
            let (key, value) = coerce(spec, raw)?;
            map.insert(key, value);
        }
        props.insert(PATH_PARAMS_KEY.to_string(), Value::Object(map));
        Ok(())
    }

    fn read(&self, path: &str) -> Result<String, Error> {
        let bytes = self.source.read(path).map_err(|source| Error::Read {
            file: path.to_string(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn parse(
        &self,
        unit: &mut E::Unit,
        name: &str,
        content: &str,
        file: &str,
    ) -> Result<(), Error> {
        self.engine
            .parse_into(unit, name, content)
            .map_err(|source| Error::Engine {
                phase: Phase::Parse,
                file: file.to_string(),
                source,
            })
    }
}
