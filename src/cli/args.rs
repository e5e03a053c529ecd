//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// zbx2tf - Convert Zabbix template exports to Terraform resources.
#[derive(Debug, Parser)]
#[command(name = "zbx2tf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the template export XML file
    #[arg(short, long, required_unless_present = "completions")]
    pub input: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// SNMP version for emitted SNMP items and discovery rules
    #[arg(
        short,
        long,
        env = "ZBX2TF_SNMP_VERSION",
        default_value = "2",
        value_parser = ["1", "2", "3"]
    )]
    pub snmp_version: String,

    /// Host group assigned to emitted templates
    #[arg(short, long, env = "ZBX2TF_GROUP", default_value = "Templates")]
    pub group: String,

    /// Enable debug logging
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
