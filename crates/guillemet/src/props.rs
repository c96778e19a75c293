// File: src/props.rs
// Purpose: Prop scopes built from key/value argument lists

use std::collections::HashMap;

use crate::error::Error;
use crate::value::Value;

/// One prop scope: string keys to template values.
///
/// Scopes extend by copying, so an inner render overriding a key never
/// affects the scope it inherited from.
pub type Props = HashMap<String, Value>;

/// Reserved prop key holding the coerced wildcard captures of the
/// current resolution.
pub const PATH_PARAMS_KEY: &str = "PathParams";

/// Prefix of the reserved prop keys that name slot content blocks:
/// slot `header` reads its definition from `#header`.
pub const SLOT_KEY_PREFIX: &str = "#";

/// Builds a prop map from a flat key/value argument list.
///
/// The list must have even length, with every key position holding a
/// string; violations name the offending argument (1-based, matching
/// how the list reads in a template).
pub fn from_kvs(args: &[Value]) -> Result<Props, Error> {
    if args.len() % 2 == 1 {
        return Err(Error::PropsNotPaired { count: args.len() });
    }

    let mut props = Props::with_capacity(args.len() / 2);
    for (i, pair) in args.chunks_exact(2).enumerate() {
        let key = match &pair[0] {
            Value::String(s) => s.clone(),
            other => {
                return Err(Error::PropKeyNotString {
                    index: i * 2 + 1,
                    kind: other.type_name(),
                })
            }
        };
        props.insert(key, pair[1].clone());
    }
    Ok(props)
}

/// Copy-on-extend: a clone of `base` with `overlay` written on top.
pub fn extend(base: &Props, overlay: Props) -> Props {
    let mut merged = base.clone();
    merged.extend(overlay);
    merged
}
