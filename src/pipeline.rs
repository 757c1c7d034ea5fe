//! End-to-end dataset build: acquire, read, reconcile, derive, join, publish.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    acquire::{self, SourceKind, SourcePaths},
    assemble,
    config::PipelineConfig,
    discount,
    frame::Frame,
    join, reader,
    schema::{self, TableSchema},
};

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub output: PathBuf,
    pub rows: usize,
    /// The product extract was missing and an empty snapshot was published.
    pub degraded: bool,
    pub promo_column: Option<String>,
    pub sources: SourcePaths,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub frame: Frame,
    pub degraded: bool,
    pub promo_column: Option<String>,
}

/// Acquires sources according to `config` and publishes the snapshot.
pub fn run(config: &PipelineConfig) -> Result<BuildOutcome> {
    config.validate()?;
    let remote = config.remote.as_ref().map(acquire::remote_from_config);
    let sources = acquire::acquire_sources(&config.work_dir, remote.as_deref(), &config.retry)?;
    build_dataset(&sources, &config.output)
}

/// Builds and publishes the snapshot from already-located input files.
pub fn build_dataset(sources: &SourcePaths, output: &Path) -> Result<BuildOutcome> {
    let dataset = assemble_dataset(sources)?;
    assemble::write_snapshot(&dataset.frame, output)?;
    Ok(BuildOutcome {
        output: output.to_path_buf(),
        rows: dataset.frame.len(),
        degraded: dataset.degraded,
        promo_column: dataset.promo_column,
        sources: sources.clone(),
    })
}

/// Produces the output frame without touching the filesystem beyond reads.
pub fn assemble_dataset(sources: &SourcePaths) -> Result<Dataset> {
    let Some(products_path) = sources.get(SourceKind::Products) else {
        warn!("Product extract is missing; publishing an empty dataset");
        return Ok(Dataset {
            frame: assemble::empty_output(),
            degraded: true,
            promo_column: None,
        });
    };

    let products = reader::read_table(products_path)
        .with_context(|| format!("Loading products from {products_path:?}"))?;
    let reconciled = schema::reconcile_products(products);
    let promotions =
        discount::compute_promotions(&reconciled.frame, reconciled.promo_column.as_deref());

    let branches = load_lookup(sources, SourceKind::Branches, &schema::BRANCHES)?;
    let commerce = load_lookup(sources, SourceKind::Commerce, &schema::COMMERCE)?;

    let joined = join::join_promotions(&promotions, &branches, &commerce)?;
    let frame = assemble::project_output(&joined);
    info!("Assembled dataset with {} row(s)", frame.len());
    Ok(Dataset {
        frame,
        degraded: false,
        promo_column: reconciled.promo_column,
    })
}

fn load_lookup(sources: &SourcePaths, kind: SourceKind, table: &TableSchema) -> Result<Frame> {
    match sources.get(kind) {
        Some(path) => {
            let raw = reader::read_table(path)
                .with_context(|| format!("Loading {} from {path:?}", table.table))?;
            Ok(table.reconcile(raw))
        }
        None => {
            warn!("{} extract is missing; joining against an empty table", table.table);
            Ok(table.empty_frame())
        }
    }
}
