//! Per-request style registry and critical CSS extraction.
//!
//! Views register CSS with [`StyleRegistry::insert`] and use the returned
//! class name in their markup. After rendering, [`extract_critical`] keeps
//! only the rules whose class names actually appear in the markup.

use std::collections::{HashMap, HashSet};

const CLASS_PREFIX: &str = "css-";

/// Class-scoped rules plus global rules, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    rules: Vec<(String, String)>,
    index: HashMap<String, usize>,
    globals: Vec<String>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration block and returns its class name.
    ///
    /// The name is derived from the CSS text alone, so the same block always
    /// yields the same class and is stored once.
    pub fn insert(&mut self, css: &str) -> String {
        let id = style_id(css);
        let class = format!("{CLASS_PREFIX}{id}");

        if !self.index.contains_key(&id) {
            self.index.insert(id.clone(), self.rules.len());
            self.rules.push((id, format!(".{class}{{{css}}}")));
        }

        class
    }

    /// Registers a rule that is always emitted, such as `body{margin:0}`.
    pub fn insert_global(&mut self, rule: impl Into<String>) {
        let rule = rule.into();
        if !self.globals.contains(&rule) {
            self.globals.push(rule);
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.globals.is_empty()
    }
}

/// Critical CSS for one rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalStyles {
    pub css: String,
    /// Ids (class names without the `css-` prefix) used by the markup.
    pub ids: Vec<String>,
}

/// Extracts the CSS used by `html`.
///
/// Output is deterministic: global rules first, then used class rules in
/// the order they were registered.
pub fn extract_critical(html: &str, registry: &StyleRegistry) -> CriticalStyles {
    let used = referenced_ids(html);

    let mut css: String = registry.globals.concat();
    let mut ids = Vec::new();

    for (id, rule) in &registry.rules {
        if used.contains(id.as_str()) {
            css.push_str(rule);
            ids.push(id.clone());
        }
    }

    CriticalStyles { css, ids }
}

fn referenced_ids(html: &str) -> HashSet<&str> {
    let mut ids = HashSet::new();
    let mut rest = html;

    while let Some(pos) = rest.find(CLASS_PREFIX) {
        let preceded_by_word = rest[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let after = &rest[pos + CLASS_PREFIX.len()..];
        let len = after
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after.len());

        if !preceded_by_word && len > 0 {
            ids.insert(&after[..len]);
        }
        rest = &after[len..];
    }

    ids
}

/// FNV-1a over the CSS text, rendered in base 36.
fn style_id(css: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in css.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }

    let mut digits = Vec::new();
    loop {
        let digit = (hash % 36) as u8;
        digits.push(if digit < 10 {
            b'0' + digit
        } else {
            b'a' + digit - 10
        });
        hash /= 36;
        if hash == 0 {
            break;
        }
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
