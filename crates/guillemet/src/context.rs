// File: src/context.rs
// Purpose: Per-render function scope and per-call head cache

use std::cell::RefCell;
use std::collections::HashMap;

use crate::engine::{Engine, FuncResolver};
use crate::error::Error;
use crate::props::{self, Props, SLOT_KEY_PREFIX};
use crate::templater::Templater;
use crate::value::Value;

/// What kind of template the current scope is executing. The kind
/// decides which composition builtins are callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    Page,
    Component,
    Head,
}

/// Head fragments already emitted during one public call, keyed by
/// component name and the exact argument list the head was invoked
/// with. The same head with the same arguments renders once.
#[derive(Debug, Default)]
pub(crate) struct HeadCache {
    seen: HashMap<String, Vec<Vec<Value>>>,
}

impl HeadCache {
    /// Records the invocation; `false` means an identical one was
    /// already recorded.
    pub(crate) fn insert_if_new(&mut self, name: &str, args: &[Value]) -> bool {
        let entries = self.seen.entry(name.to_string()).or_default();
        if entries.iter().any(|prev| prev.as_slice() == args) {
            return false;
        }
        entries.push(args.to_vec());
        true
    }
}

/// State shared across one public `Templater` call, however deep the
/// component recursion goes.
#[derive(Debug, Default)]
pub(crate) struct CallState {
    pub(crate) heads: RefCell<HeadCache>,
}

impl CallState {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// The composition builtins, resolved after the caller's own function
/// table so user functions shadow them.
#[derive(Debug, Clone, Copy)]
enum Builtin {
    Component,
    ComponentHead,
    Slot,
    Props,
}

impl Builtin {
    fn lookup(kind: ScopeKind, name: &str) -> Option<Builtin> {
        match (kind, name) {
            (ScopeKind::Page | ScopeKind::Component, "component") => Some(Builtin::Component),
            (ScopeKind::Page | ScopeKind::Head, "componentHead") => Some(Builtin::ComponentHead),
            (ScopeKind::Page | ScopeKind::Component, "slot") => Some(Builtin::Slot),
            (_, "props") => Some(Builtin::Props),
            _ => None,
        }
    }
}

/// The function table for one block execution: the templater's
/// registered functions first, then the builtins allowed for this
/// scope's kind, acting on this scope's props and parsed unit.
pub(crate) struct Scope<'a, E: Engine> {
    templater: &'a Templater<E>,
    call: &'a CallState,
    unit: &'a E::Unit,
    props: &'a Props,
    kind: ScopeKind,
    has_parent: bool,
}

impl<'a, E: Engine> Scope<'a, E> {
    pub(crate) fn new(
        templater: &'a Templater<E>,
        call: &'a CallState,
        unit: &'a E::Unit,
        props: &'a Props,
        kind: ScopeKind,
        has_parent: bool,
    ) -> Self {
        Self {
            templater,
            call,
            unit,
            props,
            kind,
            has_parent,
        }
    }

    /// First argument of a composition builtin is always the template
    /// or slot name.
    fn name_arg<'v>(func: &'static str, args: &'v [Value]) -> Result<&'v str, Error> {
        match args.first() {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(Error::NameNotString {
                func,
                kind: other.type_name(),
            }),
            None => Err(Error::NameNotString {
                func,
                kind: "nothing",
            }),
        }
    }

    fn component(&self, args: &[Value]) -> Result<Value, Error> {
        let name = Self::name_arg("component", args)?;
        let overlay = props::from_kvs(&args[1..])?;
        let merged = props::extend(self.props, overlay);
        let bytes = self.templater.render_component(
            name,
            merged,
            Some(self.unit),
            self.call,
            ScopeKind::Component,
        )?;
        Ok(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }

    fn component_head(&self, args: &[Value]) -> Result<Value, Error> {
        let name = Self::name_arg("componentHead", args)?;
        // Validated before touching the cache so a malformed
        // invocation never registers as already rendered.
        let overlay = props::from_kvs(&args[1..])?;

        // Record before recursing, so a head pulling in itself (or an
        // identical sibling head) collapses instead of looping.
        if !self
            .call
            .heads
            .borrow_mut()
            .insert_if_new(name, &args[1..])
        {
            return Ok(Value::String(String::new()));
        }

        let merged = props::extend(self.props, overlay);
        match self
            .templater
            .render_component(name, merged, None, self.call, ScopeKind::Head)
        {
            Ok(bytes) => Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            // Components without a head fragment are the common case.
            Err(err) if err.is_not_found() => Ok(Value::String(String::new())),
            Err(err) => Err(err),
        }
    }

    fn slot(&self, args: &[Value]) -> Result<Value, Error> {
        let name = Self::name_arg("slot", args)?;
        if !self.has_parent {
            return Err(Error::SlotOutsideRender {
                slot: name.to_string(),
            });
        }

        let key = format!("{SLOT_KEY_PREFIX}{name}");
        let block = match self.props.get(&key) {
            None => {
                return Err(Error::SlotNotDefined {
                    slot: name.to_string(),
                    key,
                })
            }
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(Error::SlotNotString {
                    slot: name.to_string(),
                    kind: other.type_name(),
                })
            }
        };

        let overlay = props::from_kvs(&args[1..])?;
        let merged = props::extend(self.props, overlay);
        let bytes =
            self.templater
                .execute_block(&block, self.unit, &merged, self.call, self.kind)?;
        Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Bundles a key/value list into one object prop, validated like
    /// any other kvs list.
    fn props_obj(&self, args: &[Value]) -> Result<Value, Error> {
        let map = props::from_kvs(args)?;
        Ok(Value::Object(map))
    }
}

impl<E: Engine> FuncResolver for Scope<'_, E> {
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, Error>> {
        if let Some(f) = self.templater.registered(name) {
            return Some(f(args));
        }
        let builtin = Builtin::lookup(self.kind, name)?;
        Some(match builtin {
            Builtin::Component => self.component(args),
            Builtin::ComponentHead => self.component_head(args),
            Builtin::Slot => self.slot(args),
            Builtin::Props => self.props_obj(args),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn head_cache_dedups_on_name_and_args() {
        let mut cache = HeadCache::default();
        assert!(cache.insert_if_new("button", &[]));
        assert!(!cache.insert_if_new("button", &[]));

        let args = [Value::from("variant"), Value::from("primary")];
        assert!(cache.insert_if_new("button", &args));
        assert!(!cache.insert_if_new("button", &args));

        let other = [Value::from("variant"), Value::from("ghost")];
        assert!(cache.insert_if_new("button", &other));
    }

    #[test]
    fn builtin_availability_per_kind() {
        assert!(Builtin::lookup(ScopeKind::Page, "component").is_some());
        assert!(Builtin::lookup(ScopeKind::Page, "componentHead").is_some());
        assert!(Builtin::lookup(ScopeKind::Component, "slot").is_some());
        assert!(Builtin::lookup(ScopeKind::Component, "componentHead").is_none());
        assert!(Builtin::lookup(ScopeKind::Head, "component").is_none());
        assert!(Builtin::lookup(ScopeKind::Head, "componentHead").is_some());
        assert!(Builtin::lookup(ScopeKind::Head, "props").is_some());
        assert_eq!(
            Builtin::lookup(ScopeKind::Page, "nope").map(|_| ()),
            None
        );
    }
}
