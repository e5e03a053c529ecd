//! Trigger expression resolution.
//!
//! Trigger expressions reference other entities with an embedded syntax:
//! `{Template Name:item.key.func(args)}` names a template and one of its
//! items. Resolution rewrites both references into resource interpolation
//! text in two ordered phases over the string:
//!
//! 1. every `{NAME:` whose name is a registered identifier becomes
//!    `{${zabbix_template.<safe_id>.host}:`; unknown names stay as they
//!    are and are reported as warnings,
//! 2. one greedy match of `:KEY.func(` rewrites `:KEY.` into
//!    `:${<resource_kind>.<safe_key>.key}.`; a key that is not cached,
//!    or was cached but never emitted as a resource, fails resolution
//!    for the whole expression.
//!
//! Phase 2 keeps the historical greedy, single-shot match: an expression
//! referencing two items mis-segments (the greedy key spans both
//! references) and the containing trigger is skipped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::context::ItemCache;
use crate::error::{ImportError, Result};
use crate::ident::IdentRegistry;

/// Matches `{NAME:` where NAME contains no braces or colon.
static TEMPLATE_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^:{}]+):").expect("TEMPLATE_REF_REGEX must compile"));

/// Greedy match of `:KEY.func(`; the key capture extends as far as the
/// last `.func(` in the string.
static ITEM_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":(.+)\.([A-Za-z_][0-9A-Za-z_]*)\(").expect("ITEM_REF_REGEX must compile")
});

/// A resolved expression plus the template names it could not resolve.
#[derive(Debug)]
pub struct Resolved {
    pub text: String,
    pub warnings: Vec<String>,
}

/// Rewrites expressions against the registry and cache built during
/// extraction. Read-only; one resolver serves any number of expressions.
pub struct ExpressionResolver<'a> {
    idents: &'a IdentRegistry,
    items: &'a ItemCache,
}

impl<'a> ExpressionResolver<'a> {
    pub fn new(idents: &'a IdentRegistry, items: &'a ItemCache) -> Self {
        Self { idents, items }
    }

    /// Resolve every reference in one expression.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnresolvedItemReference`] when the item
    /// phase matches a key that cannot be resolved; the caller skips the
    /// containing trigger. Unknown template names are not errors.
    pub fn resolve(&self, expression: &str) -> Result<Resolved> {
        let mut warnings = Vec::new();
        let templated = self.rewrite_templates(expression, &mut warnings);
        let text = self.rewrite_item(&templated)?;
        Ok(Resolved { text, warnings })
    }

    fn rewrite_templates(&self, expression: &str, warnings: &mut Vec<String>) -> String {
        TEMPLATE_REF_REGEX
            .replace_all(expression, |caps: &regex::Captures| {
                let raw = &caps[1];
                match self.idents.lookup(raw) {
                    Some(safe_id) => format!("{{${{zabbix_template.{safe_id}.host}}:"),
                    None => {
                        warn!("unresolved template reference '{raw}', leaving as-is");
                        warnings.push(raw.to_string());
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    fn rewrite_item(&self, expression: &str) -> Result<String> {
        let caps = match ITEM_REF_REGEX.captures(expression) {
            Some(caps) => caps,
            None => return Ok(expression.to_string()),
        };
        let (whole, func) = match (caps.get(0), caps.get(2)) {
            (Some(whole), Some(func)) => (whole, func),
            _ => return Ok(expression.to_string()),
        };

        let key = &caps[1];
        let entry = self
            .items
            .get(key)
            .ok_or_else(|| ImportError::UnresolvedItemReference {
                key: key.to_string(),
            })?;
        let kind = entry
            .resource_kind
            .ok_or_else(|| ImportError::UnresolvedItemReference {
                key: key.to_string(),
            })?;

        let mut result = String::with_capacity(expression.len() + 32);
        result.push_str(&expression[..whole.start()]);
        result.push_str(&format!(":${{{kind}.{safe_key}.key}}.", safe_key = entry.safe_key));
        result.push_str(&expression[func.start()..]);
        Ok(result)
    }
}
