//! Conversion of tiberius rows into JSON values.

use base64::Engine;
use serde_json::{Map, Number, Value};
use tiberius::Row;

/// Convert a result row into a JSON object, preserving column order.
///
/// Tiberius surfaces column values through typed `try_get` accessors rather
/// than a dynamic value enum, so each cell is probed across the scalar types
/// SQL Server can produce. A NULL in any column becomes JSON `null`, binary
/// columns render as base64 text, and a value no probe can decode degrades to
/// `null` instead of failing the whole row.
pub fn row_to_json(row: &Row) -> Map<String, Value> {
    let mut object = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), cell_to_json(row, idx));
    }
    object
}

fn cell_to_json(row: &Row, idx: usize) -> Value {
    // Ok(None) means SQL NULL; Err means wrong type, try the next probe.
    macro_rules! probe {
        ($ty:ty, $conv:expr) => {
            match row.try_get::<$ty, usize>(idx) {
                Ok(Some(v)) => return $conv(v),
                Ok(None) => return Value::Null,
                Err(_) => {}
            }
        };
    }

    probe!(&str, |v: &str| Value::String(v.to_string()));
    probe!(i32, |v: i32| Value::Number(v.into()));
    probe!(i64, |v: i64| Value::Number(v.into()));
    probe!(u8, |v: u8| Value::Number(v.into()));
    probe!(i16, |v: i16| Value::Number(v.into()));
    probe!(f64, |v: f64| Number::from_f64(v).map_or(Value::Null, Value::Number));
    probe!(f32, |v: f32| {
        Number::from_f64(v as f64).map_or(Value::Null, Value::Number)
    });
    probe!(bool, Value::Bool);
    probe!(chrono::NaiveDateTime, |v: chrono::NaiveDateTime| {
        Value::String(v.to_string())
    });
    probe!(chrono::NaiveDate, |v: chrono::NaiveDate| Value::String(
        v.to_string()
    ));
    probe!(chrono::NaiveTime, |v: chrono::NaiveTime| Value::String(
        v.to_string()
    ));
    probe!(
        chrono::DateTime<chrono::Utc>,
        |v: chrono::DateTime<chrono::Utc>| Value::String(v.to_rfc3339())
    );
    probe!(uuid::Uuid, |v: uuid::Uuid| Value::String(v.to_string()));
    probe!(&[u8], |v: &[u8]| {
        Value::String(base64::engine::general_purpose::STANDARD.encode(v))
    });

    Value::Null
}
