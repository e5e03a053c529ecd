//! Resource block emission.
//!
//! Walks the extracted document in a fixed order: each template, then its
//! items, then its discovery rules (rule block, item prototypes, trigger
//! prototypes), then document-level triggers. Emission assigns each
//! item's resource kind into the cache immediately, so trigger
//! expressions rendered afterwards resolve against what was actually
//! emitted.

use std::fmt::Write;

use tracing::{debug, error};

use crate::context::ImportContext;
use crate::extract::ExtractedDocument;
use crate::model::{
    priority_name, value_type_name, DiscoveryRule, Item, ItemClass, Template, Trigger,
};
use crate::resolve::ExpressionResolver;

/// Pipeline-wide rendering parameters.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// SNMP protocol version threaded into every SNMP-kind block.
    pub snmp_version: String,
    /// Host group literal assigned to every template block.
    pub group: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            snmp_version: "2".to_string(),
            group: "Templates".to_string(),
        }
    }
}

/// Counts of emitted blocks plus everything that did not convert cleanly.
#[derive(Debug, Default)]
pub struct ConvertReport {
    pub templates: usize,
    pub items: usize,
    pub rules: usize,
    pub prototypes: usize,
    pub triggers: usize,
    pub skipped_triggers: Vec<SkippedTrigger>,
    /// Template names left unresolved in emitted expressions.
    pub unresolved_references: Vec<String>,
}

/// A trigger dropped because its expression could not be resolved.
#[derive(Debug, Clone)]
pub struct SkippedTrigger {
    pub name: String,
    pub reason: String,
}

/// Emits resource blocks for one extracted document.
pub struct Renderer<'a> {
    ctx: &'a mut ImportContext,
    options: &'a ConvertOptions,
    out: String,
    report: ConvertReport,
}

/// Which resource an item block hangs off, and by which field.
enum ItemParent<'r> {
    Template(&'r str),
    Rule(&'r str),
}

impl<'a> Renderer<'a> {
    pub fn new(ctx: &'a mut ImportContext, options: &'a ConvertOptions) -> Self {
        Self {
            ctx,
            options,
            out: String::new(),
            report: ConvertReport::default(),
        }
    }

    /// Render every entity and return the output with its run report.
    pub fn render(mut self, document: &ExtractedDocument) -> (String, ConvertReport) {
        for template in &document.templates {
            self.render_template(template);
        }
        for trigger in &document.triggers {
            self.render_trigger(trigger);
        }
        (self.out, self.report)
    }

    fn render_template(&mut self, template: &Template) {
        self.report.templates += 1;
        open_block(&mut self.out, "zabbix_template", &template.safe_id);
        field(&mut self.out, "host", &template.host);
        list_field(&mut self.out, "groups", &[self.options.group.as_str()]);
        field(
            &mut self.out,
            "name",
            template.name.as_deref().unwrap_or(&template.host),
        );
        field(
            &mut self.out,
            "description",
            template
                .description
                .as_deref()
                .unwrap_or("Imported template"),
        );
        close_block(&mut self.out);

        for item in &template.items {
            self.render_item(item, ItemParent::Template(&template.safe_id));
        }
        for rule in &template.rules {
            self.render_rule(rule, &template.safe_id);
        }
        for trigger in &template.triggers {
            self.render_trigger(trigger);
        }
    }

    fn render_item(&mut self, item: &Item, parent: ItemParent<'_>) {
        let class = match item.type_code.item_class() {
            Some(class) => class,
            None => {
                debug!("item '{}' has no emitted resource type, skipping", item.key);
                return;
            }
        };
        let (kind, parent_field, parent_value) = match parent {
            ItemParent::Template(safe_id) => (
                class.item_kind(),
                "hostid",
                format!("${{zabbix_template.{safe_id}.id}}"),
            ),
            ItemParent::Rule(safe_id) => (
                class.prototype_kind(),
                "ruleid",
                format!("${{zabbix_lld_snmp.{safe_id}.id}}"),
            ),
        };

        self.ctx.items.assign_kind(&item.key, kind);
        if item.prototype {
            self.report.prototypes += 1;
        } else {
            self.report.items += 1;
        }

        open_block(&mut self.out, kind, &item.safe_key);
        field(&mut self.out, parent_field, &parent_value);
        field(&mut self.out, "key", &item.key);
        field(&mut self.out, "name", item.name.as_deref().unwrap_or(""));
        field(
            &mut self.out,
            "valuetype",
            value_type_name(&item.value_type),
        );
        match class {
            ItemClass::Snmp => {
                field(
                    &mut self.out,
                    "snmp_oid",
                    item.snmp_oid.as_deref().unwrap_or(""),
                );
                field(&mut self.out, "snmp_version", &self.options.snmp_version);
            }
            ItemClass::Aggregate => {}
            ItemClass::Calculated => {
                field(
                    &mut self.out,
                    "formula",
                    item.params.as_deref().unwrap_or(""),
                );
            }
        }
        close_block(&mut self.out);
    }

    fn render_rule(&mut self, rule: &DiscoveryRule, template_safe_id: &str) {
        let kind = match rule.type_code.item_class().and_then(ItemClass::rule_kind) {
            Some(kind) => kind,
            None => {
                debug!(
                    "discovery rule '{}' has no emitted resource type, skipping it and its prototypes",
                    rule.key
                );
                return;
            }
        };

        self.report.rules += 1;
        open_block(&mut self.out, kind, &rule.safe_id);
        field(
            &mut self.out,
            "hostid",
            &format!("${{zabbix_template.{template_safe_id}.id}}"),
        );
        field(&mut self.out, "key", &rule.key);
        field(&mut self.out, "name", &rule.name);
        field(
            &mut self.out,
            "snmp_oid",
            rule.snmp_oid.as_deref().unwrap_or(""),
        );
        field(&mut self.out, "snmp_version", &self.options.snmp_version);
        close_block(&mut self.out);

        for item in &rule.item_prototypes {
            self.render_item(item, ItemParent::Rule(&rule.safe_id));
        }
        for trigger in &rule.trigger_prototypes {
            self.render_trigger(trigger);
        }
    }

    fn render_trigger(&mut self, trigger: &Trigger) {
        let resolver = ExpressionResolver::new(&self.ctx.idents, &self.ctx.items);

        let resolved = match resolver.resolve(&trigger.expression) {
            Ok(resolved) => resolved,
            Err(err) => {
                error!("skipping trigger '{}': {err}", trigger.name);
                self.report.skipped_triggers.push(SkippedTrigger {
                    name: trigger.name.clone(),
                    reason: err.to_string(),
                });
                return;
            }
        };
        let recovery = match trigger.recovery_expression.as_deref() {
            Some(raw) => match resolver.resolve(raw) {
                Ok(resolved) => Some(resolved),
                Err(err) => {
                    error!(
                        "skipping trigger '{}' (recovery expression): {err}",
                        trigger.name
                    );
                    self.report.skipped_triggers.push(SkippedTrigger {
                        name: trigger.name.clone(),
                        reason: err.to_string(),
                    });
                    return;
                }
            },
            None => None,
        };

        self.report.triggers += 1;
        self.report.unresolved_references.extend(resolved.warnings);

        let kind = if trigger.prototype {
            "zabbix_proto_trigger"
        } else {
            "zabbix_trigger"
        };
        open_block(&mut self.out, kind, &trigger.safe_id);
        field(&mut self.out, "name", &trigger.name);
        field(&mut self.out, "expression", &resolved.text);
        if let Some(description) = &trigger.description {
            field(&mut self.out, "comments", description);
        }
        if let Some(priority) = &trigger.priority {
            field(&mut self.out, "priority", priority_name(priority));
        }
        if let Some(recovery) = recovery {
            self.report
                .unresolved_references
                .extend(recovery.warnings);
            field(&mut self.out, "recovery_expression", &recovery.text);
        }
        close_block(&mut self.out);
    }
}

fn open_block(out: &mut String, kind: &str, id: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "resource \"{kind}\" \"{id}\" {{");
}

fn field(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "  {name} = \"{}\"", escape(value));
}

fn list_field(out: &mut String, name: &str, values: &[&str]) {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", escape(v))).collect();
    let _ = writeln!(out, "  {name} = [{}]", quoted.join(", "));
}

fn close_block(out: &mut String) {
    let _ = writeln!(out, "}}");
}

/// Escape a value for an emitted quoted string. `$` stays untouched so
/// resolved expressions keep their interpolation references.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CachedItem;
    use crate::model::TypeCode;

    fn item(key: &str, type_code: TypeCode, ctx: &mut ImportContext, prototype: bool) -> Item {
        let safe_key = ctx.idents.resolve(key);
        let record = Item {
            key: key.to_string(),
            value_type: "3".to_string(),
            type_code: type_code.clone(),
            name: Some("An item".to_string()),
            snmp_oid: Some("1.3.6.1.2.1.1".to_string()),
            params: Some("last(\"a\")+last(\"b\")".to_string()),
            safe_key: safe_key.clone(),
            prototype,
        };
        ctx.items.insert(CachedItem {
            key: key.to_string(),
            safe_key,
            value_type: "3".to_string(),
            type_code,
            resource_kind: None,
        });
        record
    }

    fn trigger(name: &str, expression: &str, ctx: &mut ImportContext) -> Trigger {
        let safe_id = ctx.idents.resolve(name);
        Trigger {
            name: name.to_string(),
            expression: expression.to_string(),
            description: None,
            priority: Some("4".to_string()),
            recovery_mode: None,
            recovery_expression: None,
            safe_id,
            prototype: false,
        }
    }

    fn template(host: &str, ctx: &mut ImportContext) -> Template {
        let safe_id = ctx.idents.resolve(host);
        Template {
            host: host.to_string(),
            name: None,
            description: None,
            safe_id,
            items: Vec::new(),
            rules: Vec::new(),
            triggers: Vec::new(),
        }
    }

    fn render(ctx: &mut ImportContext, document: &ExtractedDocument) -> (String, ConvertReport) {
        let options = ConvertOptions::default();
        Renderer::new(ctx, &options).render(document)
    }

    #[test]
    fn template_block_fills_defaults() {
        let mut ctx = ImportContext::new();
        let document = ExtractedDocument {
            templates: vec![template("Template App", &mut ctx)],
            triggers: Vec::new(),
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(out.starts_with("resource \"zabbix_template\" \"template-app\" {\n"));
        assert!(out.contains("  host = \"Template App\"\n"));
        assert!(out.contains("  groups = [\"Templates\"]\n"));
        assert!(out.contains("  name = \"Template App\"\n"));
        assert!(out.contains("  description = \"Imported template\"\n"));
        assert_eq!(report.templates, 1);
    }

    #[test]
    fn snmp_item_block_references_its_template() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items.push(item("cpu.load", TypeCode::SnmpV2, &mut ctx, false));
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(out.contains("resource \"zabbix_item_snmp\" \"cpu-load\" {"));
        assert!(out.contains("  hostid = \"${zabbix_template.t.id}\"\n"));
        assert!(out.contains("  valuetype = \"unsigned\"\n"));
        assert!(out.contains("  snmp_version = \"2\"\n"));
        assert_eq!(report.items, 1);
        assert_eq!(
            ctx.items.get("cpu.load").unwrap().resource_kind,
            Some("zabbix_item_snmp")
        );
    }

    #[test]
    fn calculated_item_emits_formula_not_snmp_fields() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items
            .push(item("calc.total", TypeCode::Calculated, &mut ctx, false));
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, _report) = render(&mut ctx, &document);
        assert!(out.contains("resource \"zabbix_item_calculated\" \"calc-total\" {"));
        assert!(out.contains("  formula = \"last(\\\"a\\\")+last(\\\"b\\\")\"\n"));
        assert!(!out.contains("snmp_oid"));
    }

    #[test]
    fn aggregate_item_has_no_extra_fields() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items
            .push(item("grpsum.all", TypeCode::Aggregate, &mut ctx, false));
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, _report) = render(&mut ctx, &document);
        assert!(out.contains("resource \"zabbix_item_aggregate\" \"grpsum-all\" {"));
        assert!(!out.contains("snmp_oid"));
        assert!(!out.contains("formula"));
    }

    #[test]
    fn noop_item_emits_nothing_and_keeps_cache_unassigned() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items
            .push(item("agent.ping", TypeCode::Agent, &mut ctx, false));
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(!out.contains("agent-ping"));
        assert_eq!(report.items, 0);
        assert_eq!(ctx.items.get("agent.ping").unwrap().resource_kind, None);
    }

    #[test]
    fn rule_block_owns_its_prototypes() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        let rule_safe_id = ctx.idents.resolve("net.if.discovery");
        let proto = item("net.if.in[{#IFNAME}]", TypeCode::SnmpV2, &mut ctx, true);
        tmpl.rules.push(DiscoveryRule {
            name: "Interface discovery".to_string(),
            key: "net.if.discovery".to_string(),
            safe_id: rule_safe_id,
            type_code: TypeCode::SnmpV2,
            snmp_oid: Some("discovery[{#IFNAME}]".to_string()),
            item_prototypes: vec![proto],
            trigger_prototypes: Vec::new(),
        });
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(out.contains("resource \"zabbix_lld_snmp\" \"net-if-discovery\" {"));
        assert!(out.contains("resource \"zabbix_proto_item_snmp\" \"net-if-in-ifname\" {"));
        assert!(out.contains("  ruleid = \"${zabbix_lld_snmp.net-if-discovery.id}\"\n"));
        // the rule block itself has no valuetype
        let rule_block = out
            .split("\n\n")
            .find(|block| block.contains("zabbix_lld_snmp"))
            .unwrap();
        assert!(!rule_block.contains("valuetype"));
        assert_eq!(report.rules, 1);
        assert_eq!(report.prototypes, 1);
    }

    #[test]
    fn noop_rule_suppresses_prototypes() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        let rule_safe_id = ctx.idents.resolve("custom.discovery");
        let proto = item("found.thing", TypeCode::SnmpV2, &mut ctx, true);
        tmpl.rules.push(DiscoveryRule {
            name: "Custom discovery".to_string(),
            key: "custom.discovery".to_string(),
            safe_id: rule_safe_id,
            type_code: TypeCode::Trapper,
            snmp_oid: None,
            item_prototypes: vec![proto],
            trigger_prototypes: Vec::new(),
        });
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(!out.contains("custom-discovery"));
        assert!(!out.contains("found-thing"));
        assert_eq!(report.rules, 0);
        assert_eq!(report.prototypes, 0);
    }

    #[test]
    fn trigger_resolves_through_emitted_items() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items.push(item("cpu.load", TypeCode::SnmpV2, &mut ctx, false));
        let standalone = trigger("High load", "{T:cpu.load.avg(5m)}>5", &mut ctx);
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: vec![standalone],
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(out.contains("resource \"zabbix_trigger\" \"high-load\" {"));
        assert!(out.contains(
            "  expression = \"{${zabbix_template.t.host}:${zabbix_item_snmp.cpu-load.key}.avg(5m)}>5\"\n"
        ));
        assert!(out.contains("  priority = \"high\"\n"));
        assert_eq!(report.triggers, 1);
        assert!(report.skipped_triggers.is_empty());
    }

    #[test]
    fn unresolvable_trigger_is_skipped_and_reported() {
        let mut ctx = ImportContext::new();
        let tmpl = template("T", &mut ctx);
        let standalone = trigger("Ghost", "{T:ghost.key.last(0)}=0", &mut ctx);
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: vec![standalone],
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(!out.contains("zabbix_trigger"));
        assert_eq!(report.triggers, 0);
        assert_eq!(report.skipped_triggers.len(), 1);
        assert_eq!(report.skipped_triggers[0].name, "Ghost");
        assert!(report.skipped_triggers[0].reason.contains("ghost.key"));
    }

    #[test]
    fn unknown_template_reference_is_reported_not_fatal() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items.push(item("cpu.load", TypeCode::SnmpV2, &mut ctx, false));
        let standalone = trigger("Odd", "{Elsewhere:cpu.load.last(0)}=0", &mut ctx);
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: vec![standalone],
        };
        let (out, report) = render(&mut ctx, &document);
        assert!(out.contains("{Elsewhere:"));
        assert_eq!(report.triggers, 1);
        assert_eq!(report.unresolved_references, vec!["Elsewhere".to_string()]);
    }

    #[test]
    fn blocks_are_separated_by_one_blank_line() {
        let mut ctx = ImportContext::new();
        let mut tmpl = template("T", &mut ctx);
        tmpl.items.push(item("cpu.load", TypeCode::SnmpV2, &mut ctx, false));
        let document = ExtractedDocument {
            templates: vec![tmpl],
            triggers: Vec::new(),
        };
        let (out, _report) = render(&mut ctx, &document);
        assert!(out.contains("}\n\nresource"));
        assert!(!out.contains("\n\n\n"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn escape_handles_quotes_and_backslashes() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"a\b"), r"a\\b");
        assert_eq!(escape("line1\nline2"), "line1\\nline2");
        assert_eq!(escape("${kept.as.is}"), "${kept.as.is}");
    }
}
