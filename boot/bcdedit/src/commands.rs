//! Subcommand implementations

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bcd::known_ids::resolve_alias;
use bcd::{BcdDescription, BcdStore, ElementValue, HiveAccess, MemoryHive, ObjectFilter, RegType};
use log::debug;

use crate::cli::{Cli, Commands};
use crate::{input, output};

/// Element holding an object's description text
const DESCRIPTION_ELEMENT: &str = "12000004";

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let store = cli.store.as_deref();
    match cli.command {
        Commands::Createstore { path } => create_store(&path),
        Commands::Enum { filter } => with_store(store, false, |bcd| {
            enumerate(bcd, &filter, cli.json, &mut *out)
        }),
        Commands::Create {
            id,
            object_type,
            description,
        } => with_store(store, true, |bcd| {
            create_object(bcd, &id, object_type, description.as_deref())
        }),
        Commands::Set {
            id,
            key,
            kind,
            raw,
            value,
        } => with_store(store, true, |bcd| {
            let payload = match raw {
                Some(raw) => input::decode_raw(&raw)?,
                None => input::encode_input(kind, &value)?,
            };
            set_element(bcd, &id, &key, kind, &payload)
        }),
    }
}

/// Open the store, run `f`, then close it
///
/// The store is closed (and committed when writable) even when `f` fails;
/// the error from `f` takes precedence.
fn with_store<T>(
    path: Option<&Path>,
    writable: bool,
    f: impl FnOnce(&mut BcdStore<MemoryHive>) -> Result<T>,
) -> Result<T> {
    let path = path.context("no store given, use --store <path>")?;
    let hive = MemoryHive::open(path, HiveAccess::for_writable(writable))
        .with_context(|| format!("opening store {}", path.display()))?;
    let mut store = BcdStore::new(hive);

    let result = f(&mut store);
    let closed = store
        .close()
        .with_context(|| format!("closing store {}", path.display()));
    let value = result?;
    closed?;
    Ok(value)
}

fn create_store(path: &Path) -> Result<()> {
    let hive = MemoryHive::create(path)
        .with_context(|| format!("creating store {}", path.display()))?;
    debug!("created store {}", path.display());
    BcdStore::new(hive).close()?;
    Ok(())
}

fn enumerate(
    store: &mut BcdStore<MemoryHive>,
    filter: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let filter = ObjectFilter::parse(resolve_alias(filter));
    let objects = store.enumerate(&filter)?;
    if json {
        writeln!(out, "{}", output::render_json(&objects)?)?;
    } else {
        write!(out, "{}", output::render_text(&objects))?;
    }
    Ok(())
}

fn create_object(
    store: &mut BcdStore<MemoryHive>,
    id: &str,
    object_type: u32,
    description: Option<&str>,
) -> Result<()> {
    if object_type == 0 {
        bail!("need --object-type");
    }
    let id = resolve_alias(id);
    let mut object = store
        .upsert_object(id, BcdDescription::from_raw(object_type))
        .with_context(|| format!("creating {id}"))?;
    if let Some(text) = description.filter(|text| !text.is_empty()) {
        store.set_element_value(&mut object, DESCRIPTION_ELEMENT, &ElementValue::from(text))?;
    }
    Ok(())
}

fn set_element(
    store: &mut BcdStore<MemoryHive>,
    id: &str,
    key: &str,
    kind: RegType,
    payload: &[u8],
) -> Result<()> {
    let id = resolve_alias(id);
    let mut object = store.get_object(id).with_context(|| format!("reading {id}"))?;
    store
        .set_element(&mut object, key, kind, payload)
        .with_context(|| format!("setting {id} {key}"))?;
    Ok(())
}
