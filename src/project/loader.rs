//! Phase 0: source discovery, file filtering, sidecar configuration, file
//! parsing, and import wiring.
//!
//! Everything here is sequential and finishes before any worker starts —
//! workers need their imports' Package entities, not just names.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, info, warn};

use crate::parser;
use crate::semantic::package::PackageForest;
use crate::semantic::symbol_table::{Occurrence, PackageId, Symbol, SymbolKind, SymbolTable};
use crate::semantic::ResolveError;
use crate::syntax::{NodeIdGen, SourceFile};

/// Inputs of a resolution run.
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    /// Root source directory, scanned recursively for packages.
    pub root: PathBuf,
    /// Extra roots consulted when an import path is not found under the
    /// project root; packages loaded from them are marked external.
    pub library_roots: Vec<PathBuf>,
    /// Directory holding `<package>.cfg` sidecar files; defaults to `root`.
    pub config_dir: Option<PathBuf>,
    /// Packages restricted to the file subset listed in their sidecar.
    pub special_packages: Vec<String>,
}

impl LoadConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

/// The default file-membership rule.
pub fn is_source_file(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go")
}

pub(crate) struct Loaded {
    pub forests: Vec<PackageForest>,
}

/// Run phase zero: discover, parse, and wire imports.
pub(crate) fn load(
    config: &LoadConfig,
    table: &RwLock<SymbolTable>,
) -> Result<Loaded, ResolveError> {
    let special = load_sidecars(config)?;
    let mut ids = NodeIdGen::new();
    let mut forests = Vec::new();

    locate_packages(&config.root, config, &special, table, &mut ids, &mut forests, false)?;
    if forests.is_empty() {
        return Err(ResolveError::EmptyPackage {
            name: String::new(),
            dir: config.root.display().to_string(),
        });
    }

    resolve_imports(config, &special, table, &mut ids, &mut forests)?;

    info!(packages = forests.len(), "phase zero complete");
    Ok(Loaded { forests })
}

/// Read each special package's `<name>.cfg`, one filename per line.
fn load_sidecars(config: &LoadConfig) -> Result<FxHashMap<String, Vec<String>>, ResolveError> {
    let dir = config.config_dir.as_ref().unwrap_or(&config.root);
    let mut map = FxHashMap::default();
    for name in &config.special_packages {
        let path = dir.join(format!("{name}.cfg"));
        let text = fs::read_to_string(&path).map_err(|source| ResolveError::Config {
            package: name.clone(),
            source,
        })?;
        let files: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();
        debug!(package = %name, files = files.len(), "sidecar loaded");
        map.insert(name.clone(), files);
    }
    Ok(map)
}

/// Recursive package discovery: a directory directly holding source files
/// is one package; otherwise its subdirectories may still contain some.
#[allow(clippy::too_many_arguments)]
fn locate_packages(
    dir: &Path,
    config: &LoadConfig,
    special: &FxHashMap<String, Vec<String>>,
    table: &RwLock<SymbolTable>,
    ids: &mut NodeIdGen,
    forests: &mut Vec<PackageForest>,
    external: bool,
) -> Result<(), ResolveError> {
    let entries = read_dir_sorted(dir)?;
    let has_sources = entries.iter().any(|p| {
        p.is_file()
            && p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_source_file)
    });

    if has_sources {
        load_package(dir, special, table, ids, forests, external)?;
        return Ok(());
    }

    for entry in entries {
        if entry.is_dir() {
            locate_packages(&entry, config, special, table, ids, forests, external)?;
        }
    }
    Ok(())
}

/// Parse one package directory into a forest and register its entity.
fn load_package(
    dir: &Path,
    special: &FxHashMap<String, Vec<String>>,
    table: &RwLock<SymbolTable>,
    ids: &mut NodeIdGen,
    forests: &mut Vec<PackageForest>,
    external: bool,
) -> Result<PackageId, ResolveError> {
    let dir_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();
    let restrict = special.get(&dir_name);

    let mut files = Vec::new();
    for path in read_dir_sorted(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_source_file(name) {
            continue;
        }
        if let Some(allowed) = restrict
            && !allowed.iter().any(|f| f == name)
        {
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|source| ResolveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let parse = parser::parse_file(name, &text, ids);
        if let Some(err) = parse.errors.first() {
            return Err(ResolveError::Parse {
                file: name.to_owned(),
                pos: err.pos,
                message: err.message.clone(),
            });
        }
        files.push(parse.file);
    }

    // the package is named by its clause, which matches the directory
    let mut files: Vec<SourceFile> = files;
    let clause_matches = files.iter().filter(|f| f.package.name == dir_name).count();
    if clause_matches > 0 && clause_matches < files.len() {
        files.retain(|f| f.package.name == dir_name);
    }
    let Some(first) = files.first() else {
        return Err(ResolveError::EmptyPackage {
            name: dir_name,
            dir: dir.display().to_string(),
        });
    };
    let package_name = first.package.name.clone();

    let mut t = table.write();
    let id = t.add_package(dir.display().to_string(), package_name.clone());
    t.package_mut(id).is_external = external;
    // the predeclared scope is an ancestor of every package scope
    let top = t.package(id).top;
    let universe = t.universe();
    t.open_scope(top, universe);
    drop(t);

    debug!(package = %package_name, path = %dir.display(), external, "package parsed");
    forests.push(PackageForest {
        id,
        path: dir.display().to_string(),
        files,
    });
    Ok(id)
}

/// Resolve every package's import list to Package entities, loading
/// external packages from the library roots as they are first imported.
/// Newly loaded packages join the worklist, so transitive imports resolve
/// too.
fn resolve_imports(
    config: &LoadConfig,
    special: &FxHashMap<String, Vec<String>>,
    table: &RwLock<SymbolTable>,
    ids: &mut NodeIdGen,
    forests: &mut Vec<PackageForest>,
) -> Result<(), ResolveError> {
    let mut next = 0;
    while next < forests.len() {
        let importer = forests[next].id;
        let specs: Vec<(SmolStr, crate::syntax::ImportSpec)> = forests[next]
            .files
            .iter()
            .flat_map(|f| f.imports().map(|s| (f.name.clone(), s.clone())))
            .collect();
        next += 1;

        for (file, spec) in specs {
            if spec.path.is_empty() {
                continue;
            }
            let target = find_or_load(&spec.path, &file, config, special, table, ids, forests)?;
            register_import(table, importer, &file, &spec, target);
        }
    }
    Ok(())
}

fn find_or_load(
    path: &str,
    importing_file: &str,
    config: &LoadConfig,
    special: &FxHashMap<String, Vec<String>>,
    table: &RwLock<SymbolTable>,
    ids: &mut NodeIdGen,
    forests: &mut Vec<PackageForest>,
) -> Result<PackageId, ResolveError> {
    let mut candidates: Vec<(PathBuf, bool)> = vec![(config.root.join(path), false)];
    for root in &config.library_roots {
        candidates.push((root.join(path), true));
    }

    for (dir, external) in candidates {
        let key = dir.display().to_string();
        if let Some(existing) = table.read().find_package_by_path(&key) {
            return Ok(existing);
        }
        if dir.is_dir() {
            return load_package(&dir, special, table, ids, forests, external);
        }
    }

    warn!(import = path, file = importing_file, "import not found");
    Err(ResolveError::ImportNotFound {
        path: path.to_owned(),
        file: importing_file.to_owned(),
    })
}

/// One Package symbol per import spec, living in the importing file's
/// import scope (opened during phase A).
fn register_import(
    table: &RwLock<SymbolTable>,
    importer: PackageId,
    file: &SmolStr,
    spec: &crate::syntax::ImportSpec,
    target: PackageId,
) {
    let mut t = table.write();

    let local_name = match &spec.alias {
        Some(alias) => alias.name.clone(),
        None => t.package(target).name.clone(),
    };
    let symbol = t.alloc(
        Symbol::new(local_name, SymbolKind::Package { package: target })
            .with_package(Some(importer)),
    );
    t.add_position(
        symbol,
        Occurrence {
            file: file.clone(),
            pos: spec.pos,
        },
    );
    if let Some(alias) = &spec.alias {
        t.bind(alias.id, symbol);
    }

    let scope = match t.package(importer).import_scopes.get(file).copied() {
        Some(scope) => scope,
        None => {
            let scope = t.new_file_scope(importer, file.clone());
            t.package_mut(importer)
                .import_scopes
                .insert(file.clone(), scope);
            scope
        }
    };
    if t.add_symbol(scope, symbol).is_err() {
        warn!(file = %file, "duplicate import name in file");
    }
    t.package_mut(importer)
        .imports
        .entry(file.clone())
        .or_default()
        .push(symbol);
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let entries = fs::read_dir(dir).map_err(|source| ResolveError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    paths.sort();
    Ok(paths)
}
