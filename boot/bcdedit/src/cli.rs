use std::ffi::OsString;
use std::path::PathBuf;

use bcd::RegType;
use clap::{Parser, Subcommand};

use crate::input;

#[derive(Parser, Debug)]
#[command(name = "bcdedit", about = "Boot configuration data store editor", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store image to operate on
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Output result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new and empty boot configuration data store
    #[command(long_flag = "createstore")]
    Createstore {
        /// Path of the store image to create
        path: PathBuf,
    },

    /// List entries in a store
    #[command(long_flag = "enum")]
    Enum {
        /// `all`, or the identifier of one entry
        #[arg(default_value = "all")]
        filter: String,
    },

    /// Create a new entry in the store
    #[command(long_flag = "create")]
    Create {
        /// Entry identifier, e.g. {bootmgr} or a braced GUID
        id: String,

        /// Packed object type (e.g. 0x10200003)
        #[arg(long = "object-type", value_parser = input::parse_u32)]
        object_type: u32,

        /// Entry description (element 12000004)
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },

    /// Set an element of an entry
    #[command(long_flag = "set")]
    Set {
        /// Entry identifier
        id: String,

        /// Element code, 8 hex digits (e.g. 12000004)
        key: String,

        /// Value type (e.g. RegSz, RegMultiSz, RegDword)
        #[arg(long = "type")]
        kind: RegType,

        /// Raw payload, base64
        #[arg(long, conflicts_with = "value")]
        raw: Option<String>,

        /// Value; repeat for RegMultiSz
        #[arg(long)]
        value: Vec<String>,
    },
}

/// Long switches that may also be written `/switch`
const LONG_SWITCHES: &[&str] = &[
    "store",
    "json",
    "verbose",
    "createstore",
    "enum",
    "create",
    "set",
    "object-type",
    "description",
    "type",
    "raw",
    "value",
    "help",
    "version",
];

/// Short switches that may also be written `/x`
const SHORT_SWITCHES: &[&str] = &["d", "v"];

/// `--` or `-` spelling of a `/switch`, if `arg` is one
fn switch_for(arg: &str) -> Option<String> {
    let name = arg.strip_prefix('/')?;
    if name == "?" {
        return Some("--help".to_string());
    }
    let lower = name.to_ascii_lowercase();
    if SHORT_SWITCHES.contains(&lower.as_str()) {
        Some(format!("-{lower}"))
    } else if LONG_SWITCHES.contains(&lower.as_str()) {
        Some(format!("--{lower}"))
    } else {
        None
    }
}

/// Rewrite `/switch` arguments so clap can parse them
///
/// Only known switch names are rewritten; anything else starting with `/`
/// (such as an absolute path) passes through.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            match arg.to_str().and_then(switch_for) {
                Some(switch) => OsString::from(switch),
                None => arg,
            }
        })
        .collect()
}
