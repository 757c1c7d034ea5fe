use log::{info, warn};

use crate::{
    data::{ColumnType, Value},
    frame::{Cell, Frame},
    schema::{DESCUENTO, PRECIO_LISTA},
};

pub const MIN_DISCOUNT: f64 = 0.0;
pub const MAX_DISCOUNT: f64 = 100.0;

/// Percentage reduction from `list` to `promo`, clamped to `[0, 100]`.
/// Undefined for non-positive list prices.
pub fn discount_percentage(list: f64, promo: f64) -> Option<f64> {
    if list <= 0.0 || !list.is_finite() || !promo.is_finite() {
        return None;
    }
    let pct = (list - promo) / list * 100.0;
    Some(pct.clamp(MIN_DISCOUNT, MAX_DISCOUNT))
}

/// Restricts reconciled products to rows carrying a usable promotion and
/// appends the `descuento` column.
///
/// With no promo column every row with a positive list price is kept and
/// `descuento` is null throughout.
pub fn compute_promotions(products: &Frame, promo_column: Option<&str>) -> Frame {
    let mut frame = products.clone();
    let input_rows = frame.len();
    frame.coerce_column(PRECIO_LISTA, ColumnType::Float);
    let Some(list_idx) = frame.column_index(PRECIO_LISTA) else {
        frame.ensure_column(PRECIO_LISTA, ColumnType::Float);
        frame.retain_rows(|_| false);
        frame.set_column(DESCUENTO, ColumnType::Float, Vec::new());
        return frame;
    };

    let promo_idx = match promo_column {
        Some(name) => {
            frame.coerce_column(name, ColumnType::Float);
            frame.column_index(name)
        }
        None => None,
    };

    match promo_idx {
        Some(promo_idx) => {
            frame.retain_rows(|row| row[promo_idx].is_some());
            frame.retain_rows(|row| positive(&row[list_idx]));
            let discounts = frame
                .rows()
                .iter()
                .map(|row| {
                    let list = row[list_idx].as_ref().and_then(Value::as_f64)?;
                    let promo = row[promo_idx].as_ref().and_then(Value::as_f64)?;
                    discount_percentage(list, promo).map(Value::Float)
                })
                .collect::<Vec<Cell>>();
            frame.set_column(DESCUENTO, ColumnType::Float, discounts);
        }
        None => {
            warn!("No promo price column available; descuento will be null for every row");
            frame.retain_rows(|row| positive(&row[list_idx]));
            let nulls = vec![None; frame.len()];
            frame.set_column(DESCUENTO, ColumnType::Float, nulls);
        }
    }
    info!(
        "Derived descuento for {} of {} product row(s)",
        frame.len(),
        input_rows
    );
    frame
}

fn positive(cell: &Cell) -> bool {
    cell.as_ref()
        .and_then(Value::as_f64)
        .is_some_and(|value| value > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Cell {
        Some(Value::String(value.to_string()))
    }

    fn products(rows: Vec<(Option<&str>, Option<&str>)>) -> Frame {
        Frame::from_text(
            vec![
                "id_producto".to_string(),
                PRECIO_LISTA.to_string(),
                "productos_precio_unitario_promo1".to_string(),
            ],
            rows.into_iter()
                .enumerate()
                .map(|(idx, (list, promo))| {
                    vec![text(&format!("p{idx}")), list.and_then(text), promo.and_then(text)]
                })
                .collect(),
        )
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(discount_percentage(100.0, 80.0), Some(20.0));
        assert_eq!(discount_percentage(100.0, 150.0), Some(0.0));
        assert_eq!(discount_percentage(100.0, -50.0), Some(100.0));
        assert_eq!(discount_percentage(0.0, 10.0), None);
    }

    #[test]
    fn rows_without_promo_or_valid_list_are_dropped() {
        let frame = products(vec![
            (Some("100"), Some("80")),
            (Some("100"), None),
            (Some("0"), Some("10")),
            (Some("-5"), Some("1")),
            (Some("abc"), Some("1")),
            (Some("50"), Some("n/a")),
        ]);
        let promos = compute_promotions(&frame, Some("productos_precio_unitario_promo1"));
        assert_eq!(promos.len(), 1);
        assert_eq!(promos.value(0, "id_producto"), Some(&Value::String("p0".into())));
        assert_eq!(promos.value(0, DESCUENTO), Some(&Value::Float(20.0)));
        assert_eq!(promos.value(0, PRECIO_LISTA), Some(&Value::Float(100.0)));
    }

    #[test]
    fn missing_promo_column_yields_null_discounts() {
        let frame = products(vec![(Some("100"), Some("80")), (Some("0"), None)]);
        let promos = compute_promotions(&frame, None);
        assert_eq!(promos.len(), 1);
        assert!(promos.has_column(DESCUENTO));
        assert_eq!(promos.value(0, DESCUENTO), None);
    }

    #[test]
    fn order_is_preserved() {
        let frame = products(vec![
            (Some("10"), Some("5")),
            (Some("20"), Some("5")),
            (Some("40"), Some("5")),
        ]);
        let promos = compute_promotions(&frame, Some("productos_precio_unitario_promo1"));
        let ids = promos
            .column_values("id_producto")
            .unwrap()
            .into_iter()
            .map(|cell| cell.unwrap().as_display())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["p0", "p1", "p2"]);
    }
}
