use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::String => "String",
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::String(s) => parse_float(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Builds a raw text cell; empty fields are null.
pub fn raw_cell(value: &str) -> Option<Value> {
    if value.is_empty() {
        None
    } else {
        Some(Value::String(value.to_string()))
    }
}

/// Lenient conversion: anything that cannot be represented as `ty` becomes null.
pub fn coerce_value(value: &Value, ty: ColumnType) -> Option<Value> {
    match ty {
        ColumnType::String => {
            let text = value.as_display();
            if text.is_empty() {
                None
            } else {
                Some(Value::String(text))
            }
        }
        ColumnType::Float => value.as_f64().map(Value::Float),
        ColumnType::Integer => match value {
            Value::Integer(i) => Some(Value::Integer(*i)),
            Value::Float(f) => integral(*f).map(Value::Integer),
            Value::String(s) => parse_integer(s).map(Value::Integer),
        },
    }
}

pub fn parse_float(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

pub fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    parse_float(trimmed).and_then(integral)
}

fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
