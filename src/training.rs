//! Feature/target view of the snapshot for the training collaborator.
//!
//! Prefers the published snapshot; when it has not been built yet the raw
//! product extract stands in so a training run can still start (with a null
//! target), and as a last resort an empty frame is returned.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    acquire::CANONICAL_SOURCES,
    acquire::SourceKind,
    assemble,
    data::ColumnType,
    frame::Frame,
    reader,
    schema::{DESCUENTO, ID_BANDERA, PRECIO_LISTA, PRODUCTOS_MARCA},
};

pub const FEATURE_COLUMNS: &[&str] = &[ID_BANDERA, PRODUCTOS_MARCA, PRECIO_LISTA];
pub const TARGET_COLUMN: &str = DESCUENTO;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingView {
    pub frame: Frame,
}

impl TrainingView {
    pub fn columns() -> Vec<&'static str> {
        let mut columns = FEATURE_COLUMNS.to_vec();
        columns.push(TARGET_COLUMN);
        columns
    }

    fn from_frame(frame: &Frame) -> Self {
        let mut view = frame.project(&Self::columns(), ColumnType::String);
        view.coerce_column(PRECIO_LISTA, ColumnType::Float);
        view.coerce_column(TARGET_COLUMN, ColumnType::Float);
        Self { frame: view }
    }

    /// Rows whose target is known.
    pub fn labelled(&self) -> Frame {
        let mut frame = self.frame.clone();
        if let Some(idx) = frame.column_index(TARGET_COLUMN) {
            frame.retain_rows(|row| row[idx].is_some());
        }
        frame
    }
}

pub fn load_training_view(work_dir: &Path, snapshot: &Path) -> Result<TrainingView> {
    if snapshot.exists() {
        let frame = assemble::read_snapshot(snapshot)
            .with_context(|| format!("Loading snapshot {snapshot:?}"))?;
        info!("Training view loaded from snapshot {snapshot:?}");
        return Ok(TrainingView::from_frame(&frame));
    }
    let products = CANONICAL_SOURCES
        .iter()
        .find(|source| source.kind == SourceKind::Products)
        .map(|source| work_dir.join(source.file_name));
    match products {
        Some(path) if path.exists() => {
            warn!("Snapshot {snapshot:?} not found; falling back to raw products {path:?}");
            let frame = reader::read_table(&path)
                .with_context(|| format!("Loading raw products {path:?}"))?;
            Ok(TrainingView::from_frame(&frame))
        }
        _ => {
            warn!("Neither snapshot nor raw products found; training view is empty");
            Ok(TrainingView::from_frame(&Frame::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn falls_back_to_raw_products() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("productos.csv"),
            "id_bandera|productos_marca|productos_precio_lista\n1|X|10.5\n",
        )
        .unwrap();
        let view = load_training_view(dir.path(), &dir.path().join("df.csv")).unwrap();
        assert_eq!(view.frame.column_names(), TrainingView::columns());
        assert_eq!(view.frame.value(0, PRECIO_LISTA), Some(&Value::Float(10.5)));
        assert!(view.labelled().is_empty());
    }

    #[test]
    fn snapshot_takes_precedence_over_raw_products() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("productos.csv"), "productos_marca\nRAW\n").unwrap();
        let snapshot = dir.path().join("df.csv");
        let mut joined = Frame::from_text(
            vec![PRODUCTOS_MARCA.to_string()],
            vec![vec![Some(Value::String("SNAP".into()))]],
        );
        joined.set_column(DESCUENTO, ColumnType::Float, vec![Some(Value::Float(20.0))]);
        assemble::write_snapshot(&assemble::project_output(&joined), &snapshot).unwrap();
        let view = load_training_view(dir.path(), &snapshot).unwrap();
        assert_eq!(view.frame.value(0, PRODUCTOS_MARCA), Some(&Value::String("SNAP".into())));
        assert_eq!(view.labelled().len(), 1);
        assert_eq!(view.frame.value(0, DESCUENTO), Some(&Value::Float(20.0)));
    }

    #[test]
    fn empty_view_when_nothing_exists() {
        let dir = tempdir().unwrap();
        let view = load_training_view(dir.path(), &dir.path().join("df.csv")).unwrap();
        assert!(view.frame.is_empty());
        assert_eq!(view.frame.columns().len(), 4);
    }
}
