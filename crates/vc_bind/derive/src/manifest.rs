use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

const BIND_CRATE: &str = "vc_bind";
const FACADE_CRATE: &str = "vc_config";
const FACADE_MODULE: &str = "bind";

/// Resolved path of the binding crate, keyed by manifest.
///
/// `syn::Path` holds spans that cannot leave the macro invocation, so the
/// cache keeps the rendered text.
struct Resolved {
    modified: Option<SystemTime>,
    path: String,
}

/// Locates the binding crate as seen from the caller's `Cargo.toml`.
///
/// 1. `vc_bind` in `dependencies` or `dev-dependencies` gives `::vc_bind`.
/// 2. The facade `vc_config` gives `::vc_config::bind`.
/// 3. Anything else falls back to `::vc_bind`.
///
/// The binding crate refers to itself through `extern crate self as vc_bind`.
pub(crate) fn bind_path() -> syn::Path {
    static RESOLVED: Mutex<BTreeMap<PathBuf, Resolved>> = Mutex::new(BTreeMap::new());

    let Some(manifest_path) = manifest_path() else {
        return parse_path(&format!("::{BIND_CRATE}"));
    };
    let modified = std::fs::metadata(&manifest_path)
        .and_then(|metadata| metadata.modified())
        .ok();

    let mut resolved = RESOLVED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(entry) = resolved.get(&manifest_path)
        && entry.modified == modified
    {
        return parse_path(&entry.path);
    }

    let path = resolve(&manifest_path);
    let rendered = parse_path(&path);
    resolved.insert(manifest_path, Resolved { modified, path });
    rendered
}

fn manifest_path() -> Option<PathBuf> {
    let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
    path.push("Cargo.toml");
    path.exists().then_some(path)
}

fn resolve(manifest_path: &Path) -> String {
    let fallback = format!("::{BIND_CRATE}");
    let Ok(text) = std::fs::read_to_string(manifest_path) else {
        return fallback;
    };
    let Ok(manifest) = Document::parse(text) else {
        return fallback;
    };

    ["dependencies", "dev-dependencies"]
        .into_iter()
        .filter_map(|section| match manifest.get(section) {
            Some(Item::Table(deps)) => find_in_deps(deps),
            _ => None,
        })
        .next()
        .unwrap_or(fallback)
}

fn find_in_deps(deps: &Table) -> Option<String> {
    if deps.contains_key(BIND_CRATE) {
        Some(format!("::{BIND_CRATE}"))
    } else if deps.contains_key(FACADE_CRATE) {
        Some(format!("::{FACADE_CRATE}::{FACADE_MODULE}"))
    } else {
        None
    }
}

#[inline]
fn parse_path(path: &str) -> syn::Path {
    // Only ever called with the constants above.
    syn::parse_str(path).unwrap_or_else(|_| panic!("invalid crate path `{path}`"))
}
