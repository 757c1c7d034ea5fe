//! Local availability of the three raw extracts.
//!
//! Files in the working directory are matched to canonical names by keyword
//! and renamed in place. When none of the canonical files can be found, the
//! configured [`RemoteFolder`] is fetched into a throw-away staging directory
//! (with bounded retries) and its tables are moved into the working
//! directory before matching again.

use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
    process::Command,
    thread,
};

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    config::{DEFAULT_FETCH_PROGRAM, FETCH_PROGRAM_ENV, RemoteConfig, RetryPolicy},
    error::AcquisitionError,
    io_utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Products,
    Branches,
    Commerce,
}

#[derive(Debug, Clone, Copy)]
pub struct CanonicalSource {
    pub kind: SourceKind,
    pub keyword: &'static str,
    pub file_name: &'static str,
}

/// Matching priority: a file claimed by an earlier entry is not reconsidered.
pub const CANONICAL_SOURCES: &[CanonicalSource] = &[
    CanonicalSource {
        kind: SourceKind::Products,
        keyword: "producto",
        file_name: "productos.csv",
    },
    CanonicalSource {
        kind: SourceKind::Branches,
        keyword: "sucursal",
        file_name: "sucursales.csv",
    },
    CanonicalSource {
        kind: SourceKind::Commerce,
        keyword: "comercio",
        file_name: "comercio.csv",
    },
];

/// Input file paths handed to the dataset build; `None` when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePaths {
    pub products: Option<PathBuf>,
    pub branches: Option<PathBuf>,
    pub commerce: Option<PathBuf>,
}

impl SourcePaths {
    pub fn get(&self, kind: SourceKind) -> Option<&Path> {
        match kind {
            SourceKind::Products => self.products.as_deref(),
            SourceKind::Branches => self.branches.as_deref(),
            SourceKind::Commerce => self.commerce.as_deref(),
        }
    }

    fn set(&mut self, kind: SourceKind, path: PathBuf) {
        match kind {
            SourceKind::Products => self.products = Some(path),
            SourceKind::Branches => self.branches = Some(path),
            SourceKind::Commerce => self.commerce = Some(path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_none() && self.branches.is_none() && self.commerce.is_none()
    }
}

/// A shared folder that can be copied wholesale into a local directory.
pub trait RemoteFolder {
    /// Human-readable identifier for logs and errors.
    fn describe(&self) -> String;

    fn fetch(&self, dest: &Path) -> Result<()>;
}

/// Fetches by spawning an external downloader.
#[derive(Debug, Clone)]
pub struct CommandFolder {
    pub folder: String,
    pub program: String,
    pub args: Vec<String>,
}

impl CommandFolder {
    pub fn new(folder: impl Into<String>, program: Option<String>, args: Vec<String>) -> Self {
        let program = env::var(FETCH_PROGRAM_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .or(program)
            .unwrap_or_else(|| DEFAULT_FETCH_PROGRAM.to_string());
        Self {
            folder: folder.into(),
            program,
            args,
        }
    }

    fn render_args(&self, dest: &Path) -> Vec<String> {
        let dest = dest.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{folder}", &self.folder).replace("{dest}", &dest))
            .collect()
    }
}

impl RemoteFolder for CommandFolder {
    fn describe(&self) -> String {
        self.folder.clone()
    }

    fn fetch(&self, dest: &Path) -> Result<()> {
        let args = self.render_args(dest);
        debug!("Spawning {} {}", self.program, args.iter().join(" "));
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to spawn `{}`", self.program))?;
        if !status.success() {
            return Err(anyhow!("`{}` exited with status {status}", self.program));
        }
        Ok(())
    }
}

/// Fetches by copying a mounted directory tree.
#[derive(Debug, Clone)]
pub struct MirrorFolder {
    pub root: PathBuf,
}

impl RemoteFolder for MirrorFolder {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn fetch(&self, dest: &Path) -> Result<()> {
        if !self.root.is_dir() {
            return Err(anyhow!("Mirror folder {:?} is not a directory", self.root));
        }
        copy_tree(&self.root, dest)
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("Creating {to:?}"))?;
    for entry in fs::read_dir(from).with_context(|| format!("Listing {from:?}"))? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Copying {:?} to {target:?}", entry.path()))?;
        }
    }
    Ok(())
}

pub fn remote_from_config(config: &RemoteConfig) -> Box<dyn RemoteFolder> {
    match config {
        RemoteConfig::Command {
            folder,
            program,
            args,
        } => Box::new(CommandFolder::new(folder.clone(), program.clone(), args.clone())),
        RemoteConfig::Mirror { path } => Box::new(MirrorFolder { root: path.clone() }),
    }
}

/// Ensures the canonical files are present in `work_dir`, fetching `remote`
/// only when none of them can be found locally.
pub fn acquire_sources(
    work_dir: &Path,
    remote: Option<&dyn RemoteFolder>,
    policy: &RetryPolicy,
) -> Result<SourcePaths> {
    fs::create_dir_all(work_dir).with_context(|| format!("Creating work directory {work_dir:?}"))?;
    let local = canonicalize_sources(work_dir)?;
    if !local.is_empty() {
        return Ok(local);
    }
    let Some(remote) = remote else {
        warn!("No raw extracts in {work_dir:?} and no remote folder configured");
        return Ok(local);
    };
    info!(
        "No raw extracts in {work_dir:?}; fetching remote folder '{}'",
        remote.describe()
    );
    let staging = fetch_with_retry(remote, work_dir, policy)?;
    let moved = move_staged_tables(staging.path(), work_dir)?;
    info!("Moved {moved} table file(s) from staging into {work_dir:?}");
    drop(staging);
    canonicalize_sources(work_dir)
}

/// Fetches into a fresh staging directory per attempt. Failed attempts have
/// their staging directory removed before the next one starts.
pub fn fetch_with_retry(
    remote: &dyn RemoteFolder,
    staging_parent: &Path,
    policy: &RetryPolicy,
) -> Result<tempfile::TempDir> {
    let attempts = policy.attempts.max(1);
    let mut last_error = anyhow!("No fetch attempts made");
    for attempt in 1..=attempts {
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(staging_parent)
            .with_context(|| format!("Creating staging directory in {staging_parent:?}"))?;
        match remote.fetch(staging.path()) {
            Ok(()) => {
                info!("Fetched '{}' on attempt {attempt}/{attempts}", remote.describe());
                return Ok(staging);
            }
            Err(err) => {
                warn!(
                    "Fetch attempt {attempt}/{attempts} for '{}' failed: {err:#}",
                    remote.describe()
                );
                last_error = err;
                drop(staging);
                if attempt < attempts {
                    thread::sleep(policy.delay_after(attempt));
                }
            }
        }
    }
    Err(AcquisitionError {
        folder: remote.describe(),
        attempts,
        source: last_error,
    }
    .into())
}

/// Moves every table-like file under `staging` (recursively) into `work_dir`,
/// overwriting same-named files.
pub fn move_staged_tables(staging: &Path, work_dir: &Path) -> Result<usize> {
    let mut found = Vec::new();
    collect_tables(staging, &mut found)?;
    for source in &found {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = work_dir.join(name);
        move_file(source, &target)?;
        debug!("Moved {source:?} -> {target:?}");
    }
    Ok(found.len())
}

fn collect_tables(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Listing {dir:?}"))?
        .collect::<std::io::Result<Vec<_>>>()?;
    for entry in entries.into_iter().sorted_by_key(|e| e.file_name()) {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_tables(&path, found)?;
        } else if io_utils::is_table_file(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn move_file(source: &Path, target: &Path) -> Result<()> {
    if target.exists() {
        fs::remove_file(target).with_context(|| format!("Replacing {target:?}"))?;
    }
    if fs::rename(source, target).is_err() {
        fs::copy(source, target).with_context(|| format!("Copying {source:?} to {target:?}"))?;
        fs::remove_file(source).with_context(|| format!("Removing {source:?}"))?;
    }
    Ok(())
}

/// Renames keyword-matching files in `work_dir` to their canonical names.
///
/// Candidates are visited in case-insensitive name order and the first match
/// wins; additional matches are left untouched and reported.
pub fn canonicalize_sources(work_dir: &Path) -> Result<SourcePaths> {
    let files = fs::read_dir(work_dir)
        .with_context(|| format!("Listing {work_dir:?}"))?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|entry| entry.file_type().is_ok_and(|ty| ty.is_file()))
        .map(|entry| entry.path())
        .filter(|path| io_utils::is_table_file(path))
        .sorted_by_key(|path| lowercase_name(path))
        .collect::<Vec<_>>();

    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let mut sources = SourcePaths::default();
    for canonical in CANONICAL_SOURCES {
        let mut candidates = files
            .iter()
            .filter(|path| !claimed.contains(*path))
            .filter(|path| lowercase_name(path).contains(canonical.keyword));
        let Some(found) = candidates.next().cloned() else {
            continue;
        };
        let ignored = candidates.map(|path| lowercase_name(path)).collect::<Vec<_>>();
        if !ignored.is_empty() {
            warn!(
                "Several files match '{}'; using {:?}, ignoring {}",
                canonical.keyword,
                found.file_name().unwrap_or_default(),
                ignored.join(", ")
            );
        }
        let target = work_dir.join(canonical.file_name);
        claimed.insert(found.clone());
        claimed.insert(target.clone());
        if found != target {
            move_file(&found, &target)?;
            info!("Renamed {found:?} to canonical {target:?}");
        }
        sources.set(canonical.kind, target);
    }
    Ok(sources)
}

fn lowercase_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
