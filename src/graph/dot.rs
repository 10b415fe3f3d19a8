// src/graph/dot.rs

//! Minimal DOT reader for weighted task graphs.
//!
//! Accepts the subset used by task-scheduling inputs:
//!
//! ```dot
//! digraph "example" {
//!     a [Weight=2];
//!     b [Weight=3];
//!     a -> b [Weight=1];
//! }
//! ```
//!
//! Every node needs a `Weight` (execution time) and every edge a `Weight`
//! (communication cost). Attribute names are matched case-insensitively and
//! unrelated attributes are ignored.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::errors::{DagschedError, Result};
use crate::graph::task_graph::TaskGraph;

const ID: &str = r#"(?:"(?:[^"\\]|\\.)*"|[A-Za-z0-9_.]+)"#;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^\s*(strict\s+)?(di)?graph\s*({ID})?\s*\{{(.*)\}}\s*$"))
        .expect("header regex")
});

static EDGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^({ID})\s*->\s*({ID})\s*(?:\[(.*)\])?$")).expect("edge regex")
});

static NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^({ID})\s*(?:\[(.*)\])?$")).expect("node regex")
});

static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({ID})\s*=\s*({ID}|-[0-9.]+)")).expect("attr regex"));

static DEFAULTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:graph|node|edge)\s*\[").expect("defaults regex"));

/// Read and parse a DOT file from disk.
pub fn load_dot(path: impl AsRef<Path>) -> Result<TaskGraph> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let graph = parse_dot(&contents)?;
    debug!(
        path = %path.display(),
        tasks = graph.len(),
        edges = graph.edge_count(),
        "loaded task graph"
    );
    Ok(graph)
}

/// Parse a DOT description into a validated [`TaskGraph`].
pub fn parse_dot(input: &str) -> Result<TaskGraph> {
    let cleaned = strip_comments(input);
    let caps = HEADER_RE.captures(&cleaned).ok_or_else(|| {
        DagschedError::InvalidGraph("expected `digraph [name] { ... }`".to_string())
    })?;

    if caps.get(2).is_none() {
        return Err(DagschedError::InvalidGraph(
            "undirected `graph` is not a task graph; use `digraph`".to_string(),
        ));
    }

    let name = caps.get(3).map(|m| unquote(m.as_str())).unwrap_or_default();
    let body = caps.get(4).map(|m| m.as_str()).unwrap_or("");

    // Nodes keep the order in which they were first mentioned.
    let mut nodes: Vec<(String, Option<u64>)> = Vec::new();
    let mut edges: Vec<(String, String, u64)> = Vec::new();

    for raw in split_statements(body) {
        let stmt = raw.trim();
        if stmt.is_empty() || DEFAULTS_RE.is_match(stmt) {
            continue;
        }

        let bare = without_strings(stmt);
        if bare.contains("--") {
            return Err(DagschedError::InvalidGraph(format!(
                "undirected edge in statement `{stmt}`"
            )));
        }

        if bare.contains("->") {
            if bare.matches("->").count() > 1 {
                return Err(DagschedError::InvalidGraph(format!(
                    "chained edges are not supported: `{stmt}`"
                )));
            }
            let caps = EDGE_RE.captures(stmt).ok_or_else(|| {
                DagschedError::InvalidGraph(format!("malformed edge statement `{stmt}`"))
            })?;
            let from = unquote(&caps[1]);
            let to = unquote(&caps[2]);
            let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let weight = weight_attr(attrs)?.ok_or_else(|| {
                DagschedError::InvalidGraph(format!("edge '{from}' -> '{to}' has no Weight"))
            })?;

            mention(&mut nodes, &from);
            mention(&mut nodes, &to);
            edges.push((from, to, weight));
            continue;
        }

        if let Some(caps) = NODE_RE.captures(stmt) {
            let id = unquote(&caps[1]);
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let weight = weight_attr(attrs)?;
            let slot = mention(&mut nodes, &id);
            if let Some(w) = weight {
                match nodes[slot].1 {
                    Some(prev) if prev != w => {
                        return Err(DagschedError::InvalidGraph(format!(
                            "task '{id}' is given two different weights ({prev} and {w})"
                        )));
                    }
                    _ => nodes[slot].1 = Some(w),
                }
            }
            continue;
        }

        // Graph-level `key = value` attributes.
        if ATTR_RE.is_match(stmt) && !bare.contains('[') {
            continue;
        }

        return Err(DagschedError::InvalidGraph(format!(
            "unrecognised statement `{stmt}`"
        )));
    }

    let mut builder = TaskGraph::builder().name(name);
    for (id, weight) in nodes {
        let weight = weight
            .ok_or_else(|| DagschedError::InvalidGraph(format!("task '{id}' has no Weight")))?;
        builder = builder.task(id, weight);
    }
    for (from, to, cost) in edges {
        builder = builder.edge(from, to, cost);
    }
    builder.build()
}

/// Index of `id` in `nodes`, appending it if this is its first mention.
fn mention(nodes: &mut Vec<(String, Option<u64>)>, id: &str) -> usize {
    match nodes.iter().position(|(n, _)| n == id) {
        Some(i) => i,
        None => {
            nodes.push((id.to_string(), None));
            nodes.len() - 1
        }
    }
}

fn weight_attr(attrs: &str) -> Result<Option<u64>> {
    for caps in ATTR_RE.captures_iter(attrs) {
        if unquote(&caps[1]).eq_ignore_ascii_case("weight") {
            return parse_weight(&unquote(&caps[2])).map(Some);
        }
    }
    Ok(None)
}

/// Whole numbers only, read exactly; `4.0` and `4.00` are accepted as 4.
fn parse_weight(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let digits = match raw.split_once('.') {
        Some((int, frac)) if !int.is_empty() && frac.bytes().all(|b| b == b'0') => int,
        _ => raw,
    };
    digits.parse::<u64>().map_err(|_| {
        DagschedError::InvalidGraph(format!("weight '{raw}' must be a non-negative whole number"))
    })
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].replace("\\\"", "\"")
    } else {
        s.to_string()
    }
}

/// Split a graph body at `;` and newlines, except inside quoted strings and
/// attribute lists.
fn split_statements(body: &str) -> Vec<String> {
    let mut stmts = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();
    let mut in_string = false;
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        if in_string {
            current.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ';' | '\n' if depth == 0 => {
                stmts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    stmts.push(current);
    stmts
}

/// `stmt` with the contents of quoted strings removed.
fn without_strings(stmt: &str) -> String {
    let mut out = String::with_capacity(stmt.len());
    let mut chars = stmt.chars();
    while let Some(c) = chars.next() {
        if c != '"' {
            out.push(c);
            continue;
        }
        out.push_str("\"\"");
        while let Some(n) = chars.next() {
            match n {
                '\\' => {
                    chars.next();
                }
                '"' => break,
                _ => {}
            }
        }
    }
    out
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut at_line_start = true;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '#' if at_line_start => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            _ => out.push(c),
        }

        if c == '\n' {
            at_line_start = true;
        } else if !c.is_whitespace() {
            at_line_start = false;
        }
    }

    out
}
