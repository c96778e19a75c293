// File: src/engine/brace.rs
// Purpose: Built-in template engine with {{ ... }} tags

//! Minimal block-based template engine.
//!
//! Supported tags:
//! - `{{ .Path.To.Value }}` — interpolate a value from the context
//!   (`{{ . }}` is the whole context; missing paths render empty)
//! - `{{ define "name" }} ... {{ end }}` — define a named block
//!   without rendering it in place
//! - `{{ block "name" . }}` — render a named block with the current
//!   context (nothing if the block is absent)
//! - `{{ fn "arg" .Prop 42 true }}` — call a function from the table;
//!   its result is inserted verbatim
//!
//! Escaping and auto-safety are deliberately not this engine's
//! business; it emits exactly what templates and functions produce.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Engine, EngineError, FuncResolver};
use crate::value::Value;

/// In-memory set of parsed named blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    blocks: HashMap<String, Arc<Vec<Node>>>,
}

#[derive(Debug)]
enum Node {
    Text(String),
    /// Context lookup; an empty path is the whole context.
    Var(Vec<String>),
    /// Render a named block with the current context.
    Block(String),
    Call {
        name: String,
        args: Vec<Arg>,
    },
}

#[derive(Debug)]
enum Arg {
    Lit(Value),
    /// Context lookup; an empty path is the whole context.
    Path(Vec<String>),
}

/// The built-in `{{ ... }}` engine.
#[derive(Debug, Clone, Default)]
pub struct BraceEngine;

impl BraceEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for BraceEngine {
    type Unit = BlockSet;

    fn empty(&self) -> BlockSet {
        BlockSet::default()
    }

    fn parse_into(
        &self,
        unit: &mut BlockSet,
        name: &str,
        source: &str,
    ) -> Result<(), EngineError> {
        let pieces = tokenize(source);
        let mut stream = pieces.into_iter();
        let nodes = parse_nodes(&mut stream, unit, name, false)?;
        unit.blocks.insert(name.to_string(), Arc::new(nodes));
        Ok(())
    }

    fn import(&self, dst: &mut BlockSet, src: &BlockSet) {
        for (name, nodes) in &src.blocks {
            dst.blocks.insert(name.clone(), Arc::clone(nodes));
        }
    }

    fn contains(&self, unit: &BlockSet, name: &str) -> bool {
        unit.blocks.contains_key(name)
    }

    fn execute(
        &self,
        unit: &BlockSet,
        name: &str,
        ctx: &Value,
        funcs: &dyn FuncResolver,
    ) -> Result<Vec<u8>, EngineError> {
        let mut out = String::new();
        exec_block(unit, name, ctx, funcs, &mut out)?;
        Ok(out.into_bytes())
    }
}

// ---------------------------------------------------------------------------
// Parsing

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());

enum Piece {
    Text(String),
    Tag(String),
}

fn tokenize(source: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in TAG_RE.captures_iter(source) {
        let whole = m.get(0).expect("match has group 0");
        if whole.start() > last {
            pieces.push(Piece::Text(source[last..whole.start()].to_string()));
        }
        pieces.push(Piece::Tag(m[1].trim().to_string()));
        last = whole.end();
    }
    if last < source.len() {
        pieces.push(Piece::Text(source[last..].to_string()));
    }
    pieces
}

#[derive(Debug, PartialEq)]
enum TagTok {
    Word(String),
    Str(String),
}

fn lex_tag(tag: &str) -> Result<Vec<TagTok>, String> {
    let mut toks = Vec::new();
    let mut chars = tag.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(e @ ('"' | '\\')) => s.push(e),
                        Some(other) => {
                            s.push('\\');
                            s.push(other);
                        }
                        None => return Err("unterminated string literal".to_string()),
                    },
                    Some(ch) => s.push(ch),
                    None => return Err("unterminated string literal".to_string()),
                }
            }
            toks.push(TagTok::Str(s));
        } else {
            let mut w = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                w.push(ch);
                chars.next();
            }
            toks.push(TagTok::Word(w));
        }
    }
    Ok(toks)
}

fn parse_err(block: &str, message: impl Into<String>) -> EngineError {
    EngineError::Parse {
        block: block.to_string(),
        message: message.into(),
    }
}

/// Splits a `.a.b.c` word into a lookup path; `.` alone is the whole
/// context.
fn dot_path(word: &str) -> Vec<String> {
    word.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_arg(block: &str, tok: &TagTok) -> Result<Arg, EngineError> {
    match tok {
        TagTok::Str(s) => Ok(Arg::Lit(Value::String(s.clone()))),
        TagTok::Word(w) if w.starts_with('.') => Ok(Arg::Path(dot_path(w))),
        TagTok::Word(w) if w == "true" => Ok(Arg::Lit(Value::Bool(true))),
        TagTok::Word(w) if w == "false" => Ok(Arg::Lit(Value::Bool(false))),
        TagTok::Word(w) => {
            if let Ok(n) = w.parse::<i64>() {
                Ok(Arg::Lit(Value::Int(n)))
            } else if let Ok(f) = w.parse::<f64>() {
                Ok(Arg::Lit(Value::Float(f)))
            } else {
                Err(parse_err(block, format!("unsupported argument {w:?}")))
            }
        }
    }
}

/// Parses pieces into nodes, recursing on `define` and stopping at the
/// matching `end` when `inside_define` is set. Defined blocks land in
/// `unit` as they complete.
fn parse_nodes(
    stream: &mut std::vec::IntoIter<Piece>,
    unit: &mut BlockSet,
    block: &str,
    inside_define: bool,
) -> Result<Vec<Node>, EngineError> {
    let mut nodes = Vec::new();
    while let Some(piece) = stream.next() {
        let tag = match piece {
            Piece::Text(t) => {
                nodes.push(Node::Text(t));
                continue;
            }
            Piece::Tag(t) => t,
        };

        let toks = lex_tag(&tag).map_err(|m| parse_err(block, m))?;
        match toks.split_first() {
            None => return Err(parse_err(block, "empty tag")),

            Some((TagTok::Word(w), [])) if w == "end" => {
                if inside_define {
                    return Ok(nodes);
                }
                return Err(parse_err(block, "unexpected {{ end }}"));
            }

            Some((TagTok::Word(w), [TagTok::Str(name)])) if w == "define" => {
                let inner = parse_nodes(stream, unit, name, true)?;
                unit.blocks.insert(name.clone(), Arc::new(inner));
            }
            Some((TagTok::Word(w), _)) if w == "define" => {
                return Err(parse_err(block, "define expects a quoted block name"));
            }

            Some((TagTok::Word(w), rest)) if w == "block" => match rest {
                [TagTok::Str(name)] => nodes.push(Node::Block(name.clone())),
                // Allow a trailing `.`: `{{ block "body" . }}` reads
                // naturally even though context always passes through.
                [TagTok::Str(name), TagTok::Word(dot)] if dot == "." => {
                    nodes.push(Node::Block(name.clone()))
                }
                _ => return Err(parse_err(block, "block expects a quoted block name")),
            },

            Some((TagTok::Word(w), [])) if w.starts_with('.') => {
                nodes.push(Node::Var(dot_path(w)));
            }

            Some((TagTok::Word(w), rest)) if !w.starts_with('.') => {
                let args = rest
                    .iter()
                    .map(|tok| parse_arg(block, tok))
                    .collect::<Result<Vec<_>, _>>()?;
                nodes.push(Node::Call {
                    name: w.clone(),
                    args,
                });
            }

            Some(_) => return Err(parse_err(block, format!("malformed tag {tag:?}"))),
        }
    }

    if inside_define {
        return Err(parse_err(block, "missing {{ end }}"));
    }
    Ok(nodes)
}

// ---------------------------------------------------------------------------
// Execution

fn exec_block(
    unit: &BlockSet,
    name: &str,
    ctx: &Value,
    funcs: &dyn FuncResolver,
    out: &mut String,
) -> Result<(), EngineError> {
    let nodes = unit
        .blocks
        .get(name)
        .ok_or_else(|| EngineError::MissingBlock {
            block: name.to_string(),
        })?;

    for node in nodes.iter() {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Var(path) => {
                if let Some(v) = ctx.get_path(path) {
                    out.push_str(&v.to_string());
                }
            }
            Node::Block(inner) => {
                if unit.blocks.contains_key(inner.as_str()) {
                    exec_block(unit, inner, ctx, funcs, out)?;
                }
            }
            Node::Call { name: func, args } => {
                let vals: Vec<Value> = args
                    .iter()
                    .map(|arg| match arg {
                        Arg::Lit(v) => v.clone(),
                        Arg::Path(path) => ctx.get_path(path).cloned().unwrap_or(Value::Null),
                    })
                    .collect();
                match funcs.call(func, &vals) {
                    None => {
                        return Err(EngineError::UnknownFunction {
                            block: name.to_string(),
                            name: func.clone(),
                        })
                    }
                    Some(Err(err)) => {
                        return Err(EngineError::Call {
                            name: func.clone(),
                            source: Box::new(err),
                        })
                    }
                    Some(Ok(v)) => out.push_str(&v.to_string()),
                }
            }
        }
    }
    Ok(())
}
