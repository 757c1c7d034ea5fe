#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const PRODUCT_HEADER: &str = "id_producto|id_sucursal|id_bandera|productos_marca|productos_precio_lista|productos_precio_unitario_promo1";
pub const BRANCH_HEADER: &str =
    "id_bandera|id_sucursal|sucursales_tipo|sucursales_codigo_postal|sucursales_provincia";
pub const COMMERCE_HEADER: &str = "id_bandera|comercio_bandera_nombre";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory the raw extracts live in.
    pub fn raw_dir(&self) -> PathBuf {
        let dir = self.path().join("raw");
        fs::create_dir_all(&dir).expect("create raw dir");
        dir
    }

    pub fn output_path(&self) -> PathBuf {
        self.path().join("df.csv")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// Writes a pipe-delimited extract with `header` and `rows` under `raw/`.
    pub fn write_extract(&self, name: &str, header: &str, rows: &[&str]) -> PathBuf {
        let mut body = String::from(header);
        body.push('\n');
        for row in rows {
            body.push_str(row);
            body.push('\n');
        }
        self.write(&format!("raw/{name}"), &body)
    }

    /// The single-promotion scenario shared by end-to-end tests.
    pub fn write_reference_extracts(&self) {
        self.write_extract("productos.csv", PRODUCT_HEADER, &["p1|10|1|X|100|80"]);
        self.write_extract("sucursales.csv", BRANCH_HEADER, &["1|10|A|1000|AR-C"]);
        self.write_extract("comercio.csv", COMMERCE_HEADER, &["1|ChainY"]);
    }
}

/// Reads a published snapshot as header plus string rows.
pub fn read_snapshot(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .expect("open snapshot");
    let headers = reader
        .headers()
        .expect("snapshot headers")
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("snapshot row")
                .iter()
                .map(|field| field.to_string())
                .collect()
        })
        .collect();
    (headers, rows)
}
