//! In-memory table used by every pipeline stage.
//!
//! A [`Frame`] is an ordered list of typed columns plus rows of nullable
//! cells. Stages never index rows positionally by column; they resolve names
//! through [`Frame::column_index`] so that reconciled, joined and projected
//! frames can be handled uniformly.

use crate::data::{ColumnType, Value, coerce_value};

pub type Cell = Option<Value>;
pub type Row = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub datatype: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: ColumnType) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds an all-text frame from raw headers and rows.
    pub fn from_text(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let columns = headers
            .into_iter()
            .map(|name| Column::new(name, ColumnType::String))
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|idx| self.columns[idx].datatype)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Appends an all-null column when `name` is absent. Returns whether it was inserted.
    pub fn ensure_column(&mut self, name: &str, datatype: ColumnType) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.columns.push(Column::new(name, datatype));
        for row in &mut self.rows {
            row.push(None);
        }
        true
    }

    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Replaces (or appends) a column with the provided cells, one per row.
    pub fn set_column(&mut self, name: &str, datatype: ColumnType, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                self.columns[idx].datatype = datatype;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(Column::new(name, datatype));
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Converts a column in place; values that do not fit become null.
    /// Returns the number of non-null cells that were nulled by the conversion.
    pub fn coerce_column(&mut self, name: &str, datatype: ColumnType) -> usize {
        let Some(idx) = self.column_index(name) else {
            return 0;
        };
        self.columns[idx].datatype = datatype;
        let mut nulled = 0usize;
        for row in &mut self.rows {
            if let Some(value) = row[idx].take() {
                row[idx] = coerce_value(&value, datatype);
                if row[idx].is_none() {
                    nulled += 1;
                }
            }
        }
        nulled
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Selects `names` in order, null-filling any column the frame lacks.
    pub fn project(&self, names: &[&str], missing_type: ColumnType) -> Frame {
        let sources = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Vec<_>>();
        let columns = names
            .iter()
            .zip(&sources)
            .map(|(name, source)| match source {
                Some(idx) => Column::new(*name, self.columns[*idx].datatype),
                None => Column::new(*name, missing_type),
            })
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|source| source.and_then(|idx| row[idx].clone()))
                    .collect()
            })
            .collect();
        Frame { columns, rows }
    }

    /// Renders every cell as text, nulls as empty strings.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}
