use std::collections::{HashMap, HashSet};

use anyhow::{Result, anyhow};
use log::{info, warn};

use crate::{
    data::{ColumnType, Value},
    frame::{Column, Frame, Row},
    provinces,
    schema::{ID_BANDERA, ID_SUCURSAL, NOMBRE_PROVINCIA_COMPLETO, SUCURSALES_PROVINCIA},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub output_rows: usize,
    pub matched_rows: usize,
    pub unmatched_left: usize,
}

/// Left joins `left` to `right` on the column `key` present in both.
///
/// Every left row is kept; a left row matching several right rows fans out
/// once per match. Keys compare by display text and null keys never match.
/// The right key column is not repeated in the output.
pub fn left_join(left: &Frame, right: &Frame, key: &str) -> Result<(Frame, JoinStats)> {
    let left_idx = left
        .column_index(key)
        .ok_or_else(|| anyhow!("Join key '{key}' not found in left table"))?;
    let right_idx = right
        .column_index(key)
        .ok_or_else(|| anyhow!("Join key '{key}' not found in right table"))?;

    let lookup = build_right_lookup(right, right_idx);
    let (columns, right_columns) = build_output_columns(left.columns(), right.columns(), right_idx);

    let mut joined = Frame::new(columns);
    let mut stats = JoinStats::default();
    for row in left.rows() {
        let bucket = row[left_idx]
            .as_ref()
            .and_then(|value| lookup.get(&join_key(value)));
        match bucket {
            Some(matches) => {
                for right_row in matches {
                    let mut combined = row.clone();
                    combined.extend(right_columns.iter().map(|idx| right_row[*idx].clone()));
                    joined.push_row(combined);
                    stats.matched_rows += 1;
                }
            }
            None => {
                let mut combined = row.clone();
                combined.extend(right_columns.iter().map(|_| None));
                joined.push_row(combined);
                stats.unmatched_left += 1;
            }
        }
    }
    stats.output_rows = joined.len();
    Ok((joined, stats))
}

fn join_key(value: &Value) -> String {
    value.as_display()
}

fn build_right_lookup(right: &Frame, key_idx: usize) -> HashMap<String, Vec<&Row>> {
    let mut map: HashMap<String, Vec<&Row>> = HashMap::new();
    for row in right.rows() {
        if let Some(value) = &row[key_idx] {
            map.entry(join_key(value)).or_default().push(row);
        }
    }
    map
}

fn build_output_columns(
    left: &[Column],
    right: &[Column],
    right_key_idx: usize,
) -> (Vec<Column>, Vec<usize>) {
    let mut columns = left.to_vec();
    let mut seen: HashSet<String> = columns.iter().map(|c| c.name.clone()).collect();
    let mut right_columns = Vec::new();

    for (idx, column) in right.iter().enumerate() {
        if idx == right_key_idx {
            continue;
        }
        let mut candidate = column.name.clone();
        if seen.contains(&candidate) {
            let mut counter = 1usize;
            let base = candidate.clone();
            while seen.contains(&candidate) {
                candidate = format!("right_{base}_{counter}");
                counter += 1;
            }
        }
        seen.insert(candidate.clone());
        columns.push(Column::new(candidate, column.datatype));
        right_columns.push(idx);
    }

    (columns, right_columns)
}

/// Trims province codes and appends their display names.
pub fn expand_provinces(frame: &mut Frame) {
    let Some(codes) = frame.column_values(SUCURSALES_PROVINCIA) else {
        return;
    };
    let mut unknown: HashSet<String> = HashSet::new();
    let normalized = codes
        .into_iter()
        .map(|cell| {
            let text = cell?.as_display().trim().to_string();
            if text.is_empty() { None } else { Some(text) }
        })
        .collect::<Vec<_>>();
    let names = normalized
        .iter()
        .map(|code| {
            let code = code.as_deref()?;
            match provinces::province_name(code) {
                Some(name) => Some(Value::String(name.to_string())),
                None => {
                    unknown.insert(code.to_string());
                    None
                }
            }
        })
        .collect::<Vec<_>>();
    frame.set_column(
        SUCURSALES_PROVINCIA,
        ColumnType::String,
        normalized.into_iter().map(|code| code.map(Value::String)).collect(),
    );
    frame.set_column(NOMBRE_PROVINCIA_COMPLETO, ColumnType::String, names);
    if !unknown.is_empty() {
        let mut codes = unknown.into_iter().collect::<Vec<_>>();
        codes.sort();
        warn!("Unmapped province code(s) left null: {}", codes.join(", "));
    }
}

/// Joins the promotion subset with branches and chains, then expands provinces.
pub fn join_promotions(promotions: &Frame, branches: &Frame, commerce: &Frame) -> Result<Frame> {
    let mut left = promotions.clone();
    left.drop_column(ID_BANDERA);

    let (with_branches, branch_stats) = left_join(&left, branches, ID_SUCURSAL)?;
    info!(
        "Branch join on '{}': {} output row(s), {} matched, {} without branch",
        ID_SUCURSAL, branch_stats.output_rows, branch_stats.matched_rows, branch_stats.unmatched_left
    );
    let (mut joined, commerce_stats) = left_join(&with_branches, commerce, ID_BANDERA)?;
    info!(
        "Chain join on '{}': {} output row(s), {} matched, {} without chain",
        ID_BANDERA,
        commerce_stats.output_rows,
        commerce_stats.matched_rows,
        commerce_stats.unmatched_left
    );
    expand_provinces(&mut joined);
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<Value> {
        Some(Value::String(value.to_string()))
    }

    fn frame(headers: &[&str], rows: Vec<Vec<Option<Value>>>) -> Frame {
        Frame::from_text(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn left_join_preserves_unmatched_rows() {
        let left = frame(&["k", "v"], vec![vec![text("1"), text("a")], vec![text("2"), text("b")]]);
        let right = frame(&["k", "w"], vec![vec![text("1"), text("x")]]);
        let (joined, stats) = left_join(&left, &right, "k").unwrap();
        assert_eq!(joined.column_names(), vec!["k", "v", "w"]);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.value(0, "w"), Some(&Value::String("x".into())));
        assert_eq!(joined.value(1, "w"), None);
        assert_eq!(stats.unmatched_left, 1);
    }

    #[test]
    fn duplicate_right_keys_fan_out() {
        let left = frame(&["k"], vec![vec![text("1")]]);
        let right = frame(&["k", "w"], vec![vec![text("1"), text("x")], vec![text("1"), text("y")]]);
        let (joined, stats) = left_join(&left, &right, "k").unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(stats.matched_rows, 2);
    }

    #[test]
    fn null_keys_never_match() {
        let left = frame(&["k"], vec![vec![None]]);
        let right = frame(&["k", "w"], vec![vec![None, text("x")]]);
        let (joined, _) = left_join(&left, &right, "k").unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.value(0, "w"), None);
    }

    #[test]
    fn integer_keys_match_text_keys() {
        let left = frame(&["k"], vec![vec![text("7")]]);
        let mut right = frame(&["k", "w"], vec![vec![text("7"), text("x")]]);
        right.coerce_column("k", ColumnType::Integer);
        let (joined, _) = left_join(&left, &right, "k").unwrap();
        assert_eq!(joined.value(0, "w"), Some(&Value::String("x".into())));
    }

    #[test]
    fn colliding_right_columns_are_renamed() {
        let left = frame(&["k", "w"], vec![vec![text("1"), text("a")]]);
        let right = frame(&["k", "w"], vec![vec![text("1"), text("b")]]);
        let (joined, _) = left_join(&left, &right, "k").unwrap();
        assert_eq!(joined.column_names(), vec!["k", "w", "right_w_1"]);
    }

    #[test]
    fn provinces_are_trimmed_and_expanded() {
        let mut joined = frame(
            &[SUCURSALES_PROVINCIA],
            vec![vec![text(" AR-C ")], vec![text("AR-ZZ")], vec![text("  ")], vec![None]],
        );
        expand_provinces(&mut joined);
        assert_eq!(joined.value(0, SUCURSALES_PROVINCIA), Some(&Value::String("AR-C".into())));
        assert_eq!(
            joined.value(0, NOMBRE_PROVINCIA_COMPLETO),
            Some(&Value::String("Ciudad Autónoma de Buenos Aires".into()))
        );
        assert_eq!(joined.value(1, NOMBRE_PROVINCIA_COMPLETO), None);
        assert_eq!(joined.value(2, SUCURSALES_PROVINCIA), None);
        assert_eq!(joined.value(3, NOMBRE_PROVINCIA_COMPLETO), None);
    }

    #[test]
    fn promotion_bandera_is_replaced_by_branch_bandera() {
        let promos = frame(
            &["id_sucursal", "id_bandera", "productos_marca"],
            vec![vec![text("10"), text("999"), text("X")]],
        );
        let branches = frame(
            &["id_bandera", "id_sucursal", "sucursales_provincia"],
            vec![vec![text("1"), text("10"), text("AR-B")]],
        );
        let commerce = frame(
            &["id_bandera", "comercio_bandera_nombre"],
            vec![vec![text("1"), text("ChainY")]],
        );
        let joined = join_promotions(&promos, &branches, &commerce).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.value(0, "id_bandera"), Some(&Value::String("1".into())));
        assert_eq!(
            joined.value(0, "comercio_bandera_nombre"),
            Some(&Value::String("ChainY".into()))
        );
        assert_eq!(
            joined.column_names().iter().filter(|c| c.as_str() == "id_bandera").count(),
            1
        );
    }
}
