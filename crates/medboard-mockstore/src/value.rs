//! Record representation and value semantics.
//!
//! Records are schema-less JSON objects. Equality and ordering follow the
//! loose rules a dashboard expects from its backend: numbers compare by
//! value regardless of integer/float representation, and every pair of
//! values has a defined order so sorting never fails.

use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// One row: field name to JSON value.
pub type Record = Map<String, Value>;

/// One or many records handed to an insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows(pub Vec<Record>);

impl From<Record> for Rows {
    fn from(record: Record) -> Self {
        Self(vec![record])
    }
}

impl From<Vec<Record>> for Rows {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl<const N: usize> From<[Record; N]> for Rows {
    fn from(records: [Record; N]) -> Self {
        Self(records.into())
    }
}

/// Column projection requested by `select`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Columns {
    /// Every field (`"*"` or an empty list).
    #[default]
    All,
    /// Only the named fields, in request order.
    Only(Vec<String>),
}

impl Columns {
    /// Parse a comma-separated column list.
    pub fn parse(list: &str) -> Self {
        let names: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if names.is_empty() || names.iter().any(|n| n == "*") {
            Self::All
        } else {
            Self::Only(names)
        }
    }

    /// Project `record`; unknown column names are skipped.
    pub fn apply(&self, record: &Record) -> Record {
        match self {
            Self::All => record.clone(),
            Self::Only(names) => names
                .iter()
                .filter_map(|n| record.get(n).map(|v| (n.clone(), v.clone())))
                .collect(),
        }
    }
}

/// Equality used by `eq` filters.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        _ => a == b,
    }
}

/// A JSON number without loss: every i64 and u64 fits an i128.
#[derive(Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    fn of(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            Num::Int(i128::from(i))
        } else if let Some(u) = n.as_u64() {
            Num::Int(i128::from(u))
        } else {
            Num::Float(n.as_f64().unwrap_or(0.0))
        }
    }
}

/// Exact integer against float comparison, no rounding through f64.
fn compare_int_float(i: i128, f: f64) -> Ordering {
    // 2^127; i128::MIN is exactly -2^127
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let floor = f.floor();
    match i.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        other => other,
    }
}

/// Numeric order across integer and float representations.
///
/// Exact for all values, so it stays transitive past 2^53 where f64 can no
/// longer tell neighbouring integers apart.
pub fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (Num::of(a), Num::of(b)) {
        (Num::Int(i), Num::Int(j)) => i.cmp(&j),
        (Num::Float(x), Num::Float(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Num::Int(i), Num::Float(f)) => compare_int_float(i, f),
        (Num::Float(f), Num::Int(i)) => compare_int_float(i, f).reverse(),
    }
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order used by `order`: null < bool < number < string < array <
/// object, natural order within a kind.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| compare_values(l, r))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => {
            let mut xs: Vec<_> = x.iter().collect();
            let mut ys: Vec<_> = y.iter().collect();
            xs.sort_by(|l, r| l.0.cmp(r.0));
            ys.sort_by(|l, r| l.0.cmp(r.0));
            xs.iter()
                .zip(ys.iter())
                .map(|((lk, lv), (rk, rv))| lk.cmp(rk).then_with(|| compare_values(lv, rv)))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or_else(|| xs.len().cmp(&ys.len()))
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}
