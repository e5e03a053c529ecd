//! Typed records for extracted entities and the item type dispatch.
//!
//! The export format tags every item and discovery rule with a numeric
//! collector type. Only SNMP, aggregate, and calculated types map to
//! emitted resources; every other code is a defined no-op.

/// Collector type code of an item or discovery rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCode {
    Agent,
    SnmpV1,
    Trapper,
    Simple,
    SnmpV2,
    Internal,
    SnmpV3,
    ActiveAgent,
    Aggregate,
    External,
    Calculated,
    /// Any code without a dispatch entry, kept verbatim for logging.
    Other(String),
}

impl TypeCode {
    /// Parse the numeric code from the export document.
    pub fn parse(code: &str) -> TypeCode {
        match code {
            "0" => TypeCode::Agent,
            "1" => TypeCode::SnmpV1,
            "2" => TypeCode::Trapper,
            "3" => TypeCode::Simple,
            "4" => TypeCode::SnmpV2,
            "5" => TypeCode::Internal,
            "6" => TypeCode::SnmpV3,
            "7" => TypeCode::ActiveAgent,
            "8" => TypeCode::Aggregate,
            "10" => TypeCode::External,
            "15" => TypeCode::Calculated,
            other => TypeCode::Other(other.to_string()),
        }
    }

    /// Resource class this type maps to, or `None` for the defined no-ops.
    pub fn item_class(&self) -> Option<ItemClass> {
        match self {
            TypeCode::SnmpV1 | TypeCode::SnmpV2 | TypeCode::SnmpV3 => Some(ItemClass::Snmp),
            TypeCode::Aggregate => Some(ItemClass::Aggregate),
            TypeCode::Calculated => Some(ItemClass::Calculated),
            _ => None,
        }
    }
}

/// Resource class of an emittable item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    Snmp,
    Aggregate,
    Calculated,
}

impl ItemClass {
    /// Resource kind for a template-level item.
    pub fn item_kind(self) -> &'static str {
        match self {
            ItemClass::Snmp => "zabbix_item_snmp",
            ItemClass::Aggregate => "zabbix_item_aggregate",
            ItemClass::Calculated => "zabbix_item_calculated",
        }
    }

    /// Resource kind for an item prototype under a discovery rule.
    pub fn prototype_kind(self) -> &'static str {
        match self {
            ItemClass::Snmp => "zabbix_proto_item_snmp",
            ItemClass::Aggregate => "zabbix_proto_item_aggregate",
            ItemClass::Calculated => "zabbix_proto_item_calculated",
        }
    }

    /// Resource kind for a discovery rule itself. Only SNMP rules have one.
    pub fn rule_kind(self) -> Option<&'static str> {
        match self {
            ItemClass::Snmp => Some("zabbix_lld_snmp"),
            ItemClass::Aggregate | ItemClass::Calculated => None,
        }
    }
}

/// Symbolic name for a numeric value type code.
///
/// Unknown codes pass through unchanged.
pub fn value_type_name(code: &str) -> &str {
    match code {
        "0" => "float",
        "1" => "character",
        "2" => "log",
        "3" => "unsigned",
        "4" => "text",
        other => other,
    }
}

/// Symbolic name for a numeric trigger priority code.
///
/// Unknown codes pass through unchanged.
pub fn priority_name(code: &str) -> &str {
    match code {
        "0" => "not_classified",
        "1" => "info",
        "2" => "warn",
        "3" => "average",
        "4" => "high",
        "5" => "disaster",
        other => other,
    }
}

/// A top-level template definition.
#[derive(Debug, Clone)]
pub struct Template {
    /// Internal host name, the reference target for trigger expressions.
    pub host: String,
    /// Display name, defaults to `host` at render time.
    pub name: Option<String>,
    pub description: Option<String>,
    pub safe_id: String,
    pub items: Vec<Item>,
    pub rules: Vec<DiscoveryRule>,
    /// Triggers nested under the template element. Most exports keep
    /// triggers at document level, leaving this empty.
    pub triggers: Vec<Trigger>,
}

/// A single metric definition, either template-level or a prototype.
#[derive(Debug, Clone)]
pub struct Item {
    pub key: String,
    pub value_type: String,
    pub type_code: TypeCode,
    pub name: Option<String>,
    pub snmp_oid: Option<String>,
    /// Formula source for calculated items.
    pub params: Option<String>,
    pub safe_key: String,
    pub prototype: bool,
}

/// A low-level discovery rule with its prototypes.
#[derive(Debug, Clone)]
pub struct DiscoveryRule {
    pub name: String,
    pub key: String,
    pub safe_id: String,
    pub type_code: TypeCode,
    pub snmp_oid: Option<String>,
    pub item_prototypes: Vec<Item>,
    pub trigger_prototypes: Vec<Trigger>,
}

/// An alert condition, either standalone or a prototype.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub name: String,
    pub expression: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub recovery_mode: Option<String>,
    /// Kept only when `recovery_mode` is `"1"`.
    pub recovery_expression: Option<String>,
    pub safe_id: String,
    pub prototype: bool,
}
