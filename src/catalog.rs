//! Collection and query template loading.
//!
//! A path may name a single JSON file or a directory. Directories load
//! every `*.json` file except `default.json`; when the built-in workload is
//! requested only `default.json` is loaded. The built-in flights workload
//! is embedded in the binary and used whenever no usable file is found.

use crate::config::AppConfig;
use anyhow::Context;
use loadtest_generator::{DocumentGenerator, DocumentShape, ProviderRegistry};
use loadtest_runner::{CollectionTarget, Workload};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use workload_core::{CollectionSpec, QueryTemplate};

pub const DEFAULT_FILE_NAME: &str = "default.json";

/// Collection that gets the flight reference generator in the built-in workload.
pub const FLIGHTS_COLLECTION: &str = "flights";

const EMBEDDED_COLLECTIONS: &str = include_str!("../resources/collections/default.json");
const EMBEDDED_QUERIES: &str = include_str!("../resources/queries/default.json");

/// Collections and templates a run will use.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub collections: Vec<CollectionSpec>,
    pub templates: Vec<QueryTemplate>,
    pub default_workload: bool,
}

impl Catalog {
    /// The embedded flights workload.
    pub fn embedded() -> anyhow::Result<Self> {
        Ok(Self {
            collections: embedded_collections()?,
            templates: embedded_queries()?,
            default_workload: true,
        })
    }

    /// Load collections and templates as configured.
    pub fn load(config: &AppConfig) -> anyhow::Result<Self> {
        let default_workload = config.uses_default_workload();
        let collections = load_collections(config.collections_path.as_deref(), default_workload)?;
        if collections.is_empty() {
            anyhow::bail!(
                "No collections found in {} (default_workload={default_workload})",
                display_path(config.collections_path.as_deref())
            );
        }
        let templates = load_queries(config.queries_path.as_deref(), default_workload)?;

        Ok(Self {
            collections,
            templates,
            default_workload,
        })
    }

    /// Build the engine workload. In the built-in workload the flights
    /// collection uses the flight reference generator.
    pub fn into_workload(self) -> anyhow::Result<Workload> {
        let providers = Arc::new(ProviderRegistry::builtin());
        let targets = self
            .collections
            .into_iter()
            .map(|spec| {
                let shape = if self.default_workload && spec.name == FLIGHTS_COLLECTION {
                    DocumentShape::Flights
                } else {
                    DocumentShape::Generic
                };
                CollectionTarget::new(DocumentGenerator::new(spec, providers.clone()).with_shape(shape))
            })
            .collect();

        Ok(Workload::new(targets, self.templates)?)
    }
}

pub fn embedded_collections() -> anyhow::Result<Vec<CollectionSpec>> {
    CollectionSpec::list_from_json_str(EMBEDDED_COLLECTIONS)
        .context("Failed to parse embedded collections")
}

pub fn embedded_queries() -> anyhow::Result<Vec<QueryTemplate>> {
    QueryTemplate::list_from_json_str(EMBEDDED_QUERIES).context("Failed to parse embedded queries")
}

/// Load collection definitions from a file or directory.
pub fn load_collections(
    path: Option<&Path>,
    load_default: bool,
) -> anyhow::Result<Vec<CollectionSpec>> {
    load_definitions(
        path,
        load_default,
        "Collections",
        embedded_collections,
        |content| CollectionSpec::list_from_json_str(content).map_err(anyhow::Error::from),
    )
}

/// Load query templates from a file or directory.
///
/// Without a path the built-in queries are used only for the built-in
/// workload; custom collections then run on fallback filters alone.
pub fn load_queries(path: Option<&Path>, load_default: bool) -> anyhow::Result<Vec<QueryTemplate>> {
    if path.is_none() && !load_default {
        return Ok(Vec::new());
    }
    load_definitions(
        path,
        load_default,
        "Queries",
        embedded_queries,
        |content| QueryTemplate::list_from_json_str(content).map_err(anyhow::Error::from),
    )
}

fn load_definitions<T>(
    path: Option<&Path>,
    load_default: bool,
    what: &str,
    embedded: fn() -> anyhow::Result<Vec<T>>,
    parse: fn(&str) -> anyhow::Result<Vec<T>>,
) -> anyhow::Result<Vec<T>> {
    let Some(path) = path else {
        return embedded();
    };

    if !path.exists() {
        warn!(
            "{what} path '{}' not found, using embedded {DEFAULT_FILE_NAME}",
            path.display()
        );
        return embedded();
    }

    if !path.is_dir() {
        return parse_file(path, parse);
    }

    let files = json_files(path, load_default)?;
    if files.is_empty() && load_default {
        info!(
            "No {DEFAULT_FILE_NAME} in '{}', using embedded {DEFAULT_FILE_NAME}",
            path.display()
        );
        return embedded();
    }

    let mut all = Vec::new();
    for file in files {
        all.extend(parse_file(&file, parse)?);
    }
    Ok(all)
}

fn parse_file<T>(path: &Path, parse: fn(&str) -> anyhow::Result<Vec<T>>) -> anyhow::Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// `*.json` files in `dir`, sorted by name, filtered on `default.json`.
fn json_files(dir: &Path, load_default: bool) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.to_ascii_lowercase().ends_with(".json") {
            continue;
        }
        let is_default = name.eq_ignore_ascii_case(DEFAULT_FILE_NAME);
        if is_default == load_default {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<embedded>".to_string())
}
