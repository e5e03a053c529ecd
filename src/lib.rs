//! zbx2tf - Convert Zabbix template exports to Terraform resources.
//!
//! Reads a Zabbix template export document (XML) and emits the
//! equivalent Terraform resource blocks: templates, their SNMP,
//! aggregate, and calculated items, low-level discovery rules with item
//! and trigger prototypes, and triggers with expressions rewritten to
//! interpolate the emitted resources.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`context`] - Per-run shared state: identifier registry and item cache
//! - [`document`] - Minimal XML document tree
//! - [`error`] - Error types and result aliases
//! - [`extract`] - Entity extraction from the parsed document
//! - [`ident`] - Identifier sanitizing and deduplication
//! - [`model`] - Typed entity records and item type dispatch
//! - [`render`] - Resource block emission
//! - [`resolve`] - Trigger expression rewriting
//!
//! # Example
//!
//! ```
//! use zbx2tf::{convert, ConvertOptions};
//!
//! let xml = r#"
//! <zabbix_export>
//!   <templates>
//!     <template>
//!       <template>Template OS Linux</template>
//!     </template>
//!   </templates>
//! </zabbix_export>"#;
//!
//! let conversion = convert(xml, &ConvertOptions::default()).unwrap();
//! assert!(conversion
//!     .output
//!     .contains("resource \"zabbix_template\" \"template-os-linux\""));
//! ```

pub mod cli;
pub mod context;
pub mod document;
pub mod error;
pub mod extract;
pub mod ident;
pub mod model;
pub mod render;
pub mod resolve;

pub use error::{ImportError, Result};
pub use render::{ConvertOptions, ConvertReport, SkippedTrigger};

use tracing::{debug, info};

/// Everything produced by one conversion run.
#[derive(Debug)]
pub struct Conversion {
    /// Rendered resource blocks, ready to write out.
    pub output: String,
    pub report: ConvertReport,
}

/// Run the full pipeline over one export document.
///
/// # Errors
///
/// Returns an error when the input is not well-formed XML or has no
/// root element. Triggers that fail expression resolution do not fail
/// the run; they are dropped and listed in the report.
pub fn convert(xml: &str, options: &ConvertOptions) -> Result<Conversion> {
    let root = document::parse_document(xml)?;
    debug!("parsed document with root element '{}'", root.tag);

    let mut ctx = context::ImportContext::new();
    let extracted = extract::Extractor::new(&mut ctx).extract(&root);
    debug!(
        "extracted {} templates and {} standalone triggers ({} items cached)",
        extracted.templates.len(),
        extracted.triggers.len(),
        ctx.items.len()
    );

    let (output, report) = render::Renderer::new(&mut ctx, options).render(&extracted);
    info!(
        "emitted {} templates, {} items, {} rules, {} prototypes, {} triggers ({} skipped)",
        report.templates,
        report.items,
        report.rules,
        report.prototypes,
        report.triggers,
        report.skipped_triggers.len()
    );

    Ok(Conversion { output, report })
}
