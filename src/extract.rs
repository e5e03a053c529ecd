//! Entity extraction from the parsed export document.
//!
//! One depth-first pass builds typed records for every template, item,
//! discovery rule, prototype, and trigger, registering identifiers and
//! filling the item cache along the way. The whole document is extracted
//! before anything renders, so trigger expressions can reference entities
//! defined later in the document.
//!
//! Entities missing a required field are dropped here with a debug log
//! and never reach the cache or the output.

use tracing::debug;

use crate::context::{CachedItem, ImportContext};
use crate::document::XmlNode;
use crate::model::{DiscoveryRule, Item, Template, Trigger, TypeCode};

/// Everything extracted from one export document.
#[derive(Debug)]
pub struct ExtractedDocument {
    pub templates: Vec<Template>,
    /// Document-level triggers, resolved and emitted after all templates.
    pub triggers: Vec<Trigger>,
}

/// Walks the document tree, populating the shared context as it goes.
pub struct Extractor<'a> {
    ctx: &'a mut ImportContext,
}

impl<'a> Extractor<'a> {
    pub fn new(ctx: &'a mut ImportContext) -> Self {
        Self { ctx }
    }

    /// Extract every template and standalone trigger under the root.
    pub fn extract(&mut self, root: &XmlNode) -> ExtractedDocument {
        let mut templates = Vec::new();
        for node in root.find_all("templates/template") {
            if let Some(template) = self.extract_template(node) {
                templates.push(template);
            }
        }

        let mut triggers = Vec::new();
        for node in root.find_all("triggers/trigger") {
            if let Some(trigger) = self.extract_trigger(node, false) {
                triggers.push(trigger);
            }
        }

        ExtractedDocument {
            templates,
            triggers,
        }
    }

    fn extract_template(&mut self, node: &XmlNode) -> Option<Template> {
        let host = match node.child_text("template") {
            Some(host) => host.to_string(),
            None => {
                debug!("dropping template without an internal host name");
                return None;
            }
        };
        // Register the template before walking its children so expressions
        // anywhere in the document can reference it.
        let safe_id = self.ctx.idents.resolve(&host);

        let name = node.child_text("name").map(str::to_string);
        let description = node.child_text("description").map(str::to_string);

        let mut items = Vec::new();
        for child in node.find_all("items/item") {
            if let Some(item) = self.extract_item(child, false) {
                items.push(item);
            }
        }

        let mut rules = Vec::new();
        for child in node.find_all("discovery_rules/discovery_rule") {
            if let Some(rule) = self.extract_rule(child) {
                rules.push(rule);
            }
        }

        let mut triggers = Vec::new();
        for child in node.find_all("triggers/trigger") {
            if let Some(trigger) = self.extract_trigger(child, false) {
                triggers.push(trigger);
            }
        }

        Some(Template {
            host,
            name,
            description,
            safe_id,
            items,
            rules,
            triggers,
        })
    }

    fn extract_item(&mut self, node: &XmlNode, prototype: bool) -> Option<Item> {
        let (key, value_type) = match (node.child_text("key"), node.child_text("value_type")) {
            (Some(key), Some(value_type)) => (key.to_string(), value_type.to_string()),
            (key, _) => {
                debug!("dropping item missing key or value_type (key: {key:?})");
                return None;
            }
        };

        let type_code = TypeCode::parse(node.child_text("type").unwrap_or(""));
        let name = node.child_text("name").map(str::to_string);
        let snmp_oid = node.child_text("snmp_oid").map(str::to_string);
        let params = node.child_text("params").map(str::to_string);
        let safe_key = self.ctx.idents.resolve(&key);

        self.ctx.items.insert(CachedItem {
            key: key.clone(),
            safe_key: safe_key.clone(),
            value_type: value_type.clone(),
            type_code: type_code.clone(),
            resource_kind: None,
        });

        Some(Item {
            key,
            value_type,
            type_code,
            name,
            snmp_oid,
            params,
            safe_key,
            prototype,
        })
    }

    fn extract_rule(&mut self, node: &XmlNode) -> Option<DiscoveryRule> {
        let (name, key) = match (node.child_text("name"), node.child_text("key")) {
            (Some(name), Some(key)) => (name.to_string(), key.to_string()),
            (name, _) => {
                debug!("dropping discovery rule missing name or key (name: {name:?})");
                return None;
            }
        };

        let safe_id = self.ctx.idents.resolve(&key);
        let type_code = TypeCode::parse(node.child_text("type").unwrap_or(""));
        let snmp_oid = node.child_text("snmp_oid").map(str::to_string);

        let mut item_prototypes = Vec::new();
        for child in node.find_all("item_prototypes/item_prototype") {
            if let Some(item) = self.extract_item(child, true) {
                item_prototypes.push(item);
            }
        }

        let mut trigger_prototypes = Vec::new();
        for child in node.find_all("trigger_prototypes/trigger_prototype") {
            if let Some(trigger) = self.extract_trigger(child, true) {
                trigger_prototypes.push(trigger);
            }
        }

        Some(DiscoveryRule {
            name,
            key,
            safe_id,
            type_code,
            snmp_oid,
            item_prototypes,
            trigger_prototypes,
        })
    }

    fn extract_trigger(&mut self, node: &XmlNode, prototype: bool) -> Option<Trigger> {
        let (name, expression) = match (node.child_text("name"), node.child_text("expression")) {
            (Some(name), Some(expression)) => (name.to_string(), expression.to_string()),
            (name, _) => {
                debug!("dropping trigger missing name or expression (name: {name:?})");
                return None;
            }
        };

        let safe_id = self.ctx.idents.resolve(&name);
        let description = node.child_text("description").map(str::to_string);
        let priority = node.child_text("priority").map(str::to_string);
        let recovery_mode = node.child_text("recovery_mode").map(str::to_string);
        let recovery_expression = if recovery_mode.as_deref() == Some("1") {
            node.child_text("recovery_expression").map(str::to_string)
        } else {
            None
        };

        Some(Trigger {
            name,
            expression,
            description,
            priority,
            recovery_mode,
            recovery_expression,
            safe_id,
            prototype,
        })
    }
}
