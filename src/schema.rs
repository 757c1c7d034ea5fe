//! Declarative column requirements for the three raw extracts.
//!
//! Each table has a fixed [`TableSchema`] naming the columns later stages
//! read. Reconciliation inserts any missing column as all-null instead of
//! failing, since the upstream export format is not contractually stable.

use log::warn;

use crate::{
    data::ColumnType,
    frame::Frame,
};

pub const ID_PRODUCTO: &str = "id_producto";
pub const ID_SUCURSAL: &str = "id_sucursal";
pub const ID_BANDERA: &str = "id_bandera";
pub const PRODUCTOS_MARCA: &str = "productos_marca";
pub const PRECIO_LISTA: &str = "productos_precio_lista";
pub const SUCURSALES_TIPO: &str = "sucursales_tipo";
pub const SUCURSALES_CODIGO_POSTAL: &str = "sucursales_codigo_postal";
pub const SUCURSALES_PROVINCIA: &str = "sucursales_provincia";
pub const COMERCIO_BANDERA_NOMBRE: &str = "comercio_bandera_nombre";
pub const DESCUENTO: &str = "descuento";
pub const NOMBRE_PROVINCIA_COMPLETO: &str = "nombre_provincia_completo";

/// Promo price column names seen across export versions, most preferred first.
pub const PROMO_PRICE_ALIASES: &[&str] = &[
    "productos_precio_unitario_promo1",
    "productos_precio_unitario_promo2",
    "productos_precio_promocional",
    "productos_precio_promo",
];

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub datatype: ColumnType,
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        datatype: ColumnType::String,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
    /// Drop every column not listed once reconciled.
    pub project: bool,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Null-fills missing columns and applies the declared types.
    pub fn reconcile(&self, frame: Frame) -> Frame {
        let mut frame = frame;
        for spec in self.columns {
            if frame.ensure_column(spec.name, spec.datatype) {
                warn!(
                    "{} table is missing column '{}'; filling with nulls",
                    self.table, spec.name
                );
            }
        }
        if self.project {
            frame = frame.project(&self.column_names(), ColumnType::String);
        }
        for spec in self.columns {
            let nulled = frame.coerce_column(spec.name, spec.datatype);
            if nulled > 0 {
                warn!(
                    "{} table: {} value(s) in '{}' are not valid {} and were nulled",
                    self.table, nulled, spec.name, spec.datatype
                );
            }
        }
        frame
    }

    /// An empty table carrying the declared columns.
    pub fn empty_frame(&self) -> Frame {
        self.reconcile(Frame::default())
    }
}

pub const PRODUCTS: TableSchema = TableSchema {
    table: "productos",
    columns: &[
        text(ID_PRODUCTO),
        text(ID_SUCURSAL),
        text(ID_BANDERA),
        text(PRODUCTOS_MARCA),
        text(PRECIO_LISTA),
    ],
    project: false,
};

pub const BRANCHES: TableSchema = TableSchema {
    table: "sucursales",
    columns: &[
        text(ID_BANDERA),
        text(ID_SUCURSAL),
        text(SUCURSALES_TIPO),
        text(SUCURSALES_CODIGO_POSTAL),
        text(SUCURSALES_PROVINCIA),
    ],
    project: true,
};

pub const COMMERCE: TableSchema = TableSchema {
    table: "comercio",
    columns: &[
        ColumnSpec {
            name: ID_BANDERA,
            datatype: ColumnType::Integer,
        },
        text(COMERCIO_BANDERA_NOMBRE),
    ],
    project: true,
};

/// Returns the first promo price alias present in `frame`.
pub fn select_promo_column(frame: &Frame) -> Option<String> {
    PROMO_PRICE_ALIASES
        .iter()
        .find(|alias| frame.has_column(alias))
        .map(|alias| alias.to_string())
}

#[derive(Debug, Clone)]
pub struct ReconciledProducts {
    pub frame: Frame,
    pub promo_column: Option<String>,
}

pub fn reconcile_products(frame: Frame) -> ReconciledProducts {
    let frame = PRODUCTS.reconcile(frame);
    let promo_column = select_promo_column(&frame);
    if promo_column.is_none() {
        warn!(
            "productos table has none of the promo price columns {:?}",
            PROMO_PRICE_ALIASES
        );
    }
    ReconciledProducts {
        frame,
        promo_column,
    }
}

pub fn reconcile_branches(frame: Frame) -> Frame {
    BRANCHES.reconcile(frame)
}

pub fn reconcile_commerce(frame: Frame) -> Frame {
    COMMERCE.reconcile(frame)
}
