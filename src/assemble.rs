use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    data::ColumnType,
    frame::Frame,
    io_utils,
    reader::{self, ReadAttempt},
    schema::{
        COMERCIO_BANDERA_NOMBRE, DESCUENTO, ID_BANDERA, NOMBRE_PROVINCIA_COMPLETO, PRECIO_LISTA,
        PRODUCTOS_MARCA, SUCURSALES_CODIGO_POSTAL, SUCURSALES_PROVINCIA, SUCURSALES_TIPO,
    },
};

/// Column set of the published snapshot, in output order.
pub const OUTPUT_COLUMNS: &[&str] = &[
    ID_BANDERA,
    PRODUCTOS_MARCA,
    PRECIO_LISTA,
    DESCUENTO,
    COMERCIO_BANDERA_NOMBRE,
    SUCURSALES_TIPO,
    SUCURSALES_CODIGO_POSTAL,
    SUCURSALES_PROVINCIA,
    NOMBRE_PROVINCIA_COMPLETO,
];

/// Snapshots are always written as comma-delimited UTF-8.
pub static SNAPSHOT_FORMAT: ReadAttempt = ReadAttempt {
    delimiter: io_utils::OUTPUT_DELIMITER,
    encoding: &encoding_rs::UTF_8_INIT,
};

pub fn project_output(joined: &Frame) -> Frame {
    joined.project(OUTPUT_COLUMNS, ColumnType::String)
}

/// Zero rows, full output schema.
pub fn empty_output() -> Frame {
    project_output(&Frame::default())
}

/// Publishes `output` to `path`, replacing any previous snapshot.
pub fn write_snapshot(output: &Frame, path: &Path) -> Result<()> {
    io_utils::publish_csv(path, &output.column_names(), &output.display_rows())
        .with_context(|| format!("Writing dataset snapshot to {path:?}"))?;
    info!(
        "Snapshot with {} row(s) and {} column(s) written to {:?}",
        output.len(),
        output.columns().len(),
        path
    );
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Frame> {
    let frame = reader::read_table_with(path, &[SNAPSHOT_FORMAT])?;
    Ok(project_output(&frame))
}
