//! Safe identifier registry.
//!
//! Raw template, item, rule, and trigger names are free-form text;
//! emitted resources need stable, unique identifiers. The registry
//! sanitizes each raw name once and suffixes collisions in first-seen
//! order, so a given call sequence always produces the same ids.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Matches every maximal run of characters outside `[0-9a-zA-Z]`.
static SANITIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("SANITIZE_REGEX must compile"));

/// Bidirectional raw name to safe identifier mapping.
///
/// Every safe id is owned by exactly one raw name. A minted id is never
/// reassigned for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct IdentRegistry {
    by_raw: HashMap<String, String>,
    by_safe: HashMap<String, String>,
}

impl IdentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a raw name to its safe identifier, minting one on first use.
    ///
    /// Sanitizes the name (non-alphanumeric runs become a single hyphen,
    /// lowercased, outer hyphens trimmed) and appends `-N` for the
    /// smallest unused N when another raw name already owns the token.
    /// Idempotent: the same raw name always returns the same id.
    pub fn resolve(&mut self, raw: &str) -> String {
        if let Some(safe) = self.by_raw.get(raw) {
            return safe.clone();
        }

        let candidate = sanitize(raw);
        let safe = if self.by_safe.contains_key(&candidate) {
            let mut n = 0usize;
            loop {
                let suffixed = format!("{candidate}-{n}");
                if !self.by_safe.contains_key(&suffixed) {
                    break suffixed;
                }
                n += 1;
            }
        } else {
            candidate
        };

        self.by_raw.insert(raw.to_string(), safe.clone());
        self.by_safe.insert(safe.clone(), raw.to_string());
        safe
    }

    /// Whether a raw name already has a safe identifier.
    pub fn is_registered(&self, raw: &str) -> bool {
        self.by_raw.contains_key(raw)
    }

    /// Safe identifier for a raw name, without minting.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.by_raw.get(raw).map(String::as_str)
    }

    /// Raw name that owns a safe identifier.
    pub fn raw_name(&self, safe: &str) -> Option<&str> {
        self.by_safe.get(safe).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_raw.is_empty()
    }
}

fn sanitize(raw: &str) -> String {
    SANITIZE_REGEX
        .replace_all(raw, "-")
        .to_lowercase()
        .trim_matches('-')
        .to_string()
}
