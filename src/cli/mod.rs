//! Command-line interface for zbx2tf.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Wiring from parsed arguments into the conversion pipeline

pub mod args;

pub use args::Cli;

use std::fs;
use std::io::Write;

use clap::CommandFactory;
use tracing::info;

use crate::error::{ImportError, Result};
use crate::render::ConvertOptions;

/// Execute one CLI invocation.
///
/// Converted output goes to `--output` or stdout; all logging goes to
/// stderr so the two can be piped independently.
pub fn run(cli: &Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "zbx2tf", &mut std::io::stdout());
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        return Err(anyhow::anyhow!("--input is required").into());
    };
    let xml = fs::read_to_string(input).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => ImportError::InputNotFound {
            path: input.to_path_buf(),
        },
        _ => ImportError::Io(err),
    })?;

    let options = ConvertOptions {
        snmp_version: cli.snmp_version.clone(),
        group: cli.group.clone(),
    };
    let conversion = crate::convert(&xml, &options)?;

    match cli.output.as_deref() {
        Some(path) => {
            fs::write(path, conversion.output.as_bytes())?;
            info!("wrote output to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(conversion.output.as_bytes())?;
        }
    }

    Ok(())
}
