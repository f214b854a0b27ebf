//! In-memory evaluation of a [`QuerySpec`] over JSON documents
//!
//! Matching rules:
//! - a missing field never satisfies `eq`, `in` or a range comparison, and always
//!   satisfies `ne`
//! - against an array field, `eq`, `in` and range comparisons hold when any element
//!   does; `ne` holds when no element equals the operand
//! - operands only compare with values of the same JSON type
//!
//! Sorting is stable and orders values the way Postgres orders `jsonb`
//! (missing < null < string < number < boolean < array < object).

use std::cmp::Ordering;

use serde_json::{Map, Value as JsonValue};

use super::{CmpOp, Condition, Filter, Operand, Pagination, QuerySpec, SortDirection, SortKey};
use crate::{db::QueryPage, geo, models::GeoPoint};

const MAX_PATH_DEPTH: usize = 16;

/// Filter, sort, paginate and project `docs`.
///
/// `total` counts every match before pagination.
pub fn execute(docs: Vec<JsonValue>, spec: &QuerySpec) -> QueryPage {
    let mut matched: Vec<JsonValue> = docs
        .into_iter()
        .filter(|doc| matches(doc, &spec.filter))
        .collect();
    sort_docs(&mut matched, &spec.sort);

    let total = matched.len();
    let items = paginate(matched, spec.pagination)
        .into_iter()
        .map(|doc| project(doc, &spec.select))
        .collect();

    QueryPage { total, items }
}

pub fn matches(doc: &JsonValue, filter: &Filter) -> bool {
    filter.conditions.iter().all(|c| eval_condition(doc, c))
}

fn eval_condition(doc: &JsonValue, condition: &Condition) -> bool {
    match condition {
        Condition::Compare { field, op, value } => {
            let found = get_path(doc, field);
            match op {
                CmpOp::Ne => !found.is_some_and(|v| any_element(v, |e| equals(e, value))),
                _ => found.is_some_and(|v| any_element(v, |e| compare_op(e, *op, value))),
            }
        }
        Condition::In { field, values } => get_path(doc, field)
            .is_some_and(|v| any_element(v, |e| values.iter().any(|candidate| equals(e, candidate)))),
        Condition::WithinSphere {
            field,
            center,
            radius,
        } => get_path(doc, field)
            .and_then(as_point)
            .is_some_and(|point| geo::central_angle(center, &point) <= *radius),
    }
}

/// Arrays match element-wise; scalars match themselves.
fn any_element(value: &JsonValue, pred: impl Fn(&JsonValue) -> bool) -> bool {
    match value {
        JsonValue::Array(items) => items.iter().any(pred),
        other => pred(other),
    }
}

fn equals(value: &JsonValue, operand: &Operand) -> bool {
    compare_operand(value, operand) == Some(Ordering::Equal)
}

fn compare_op(value: &JsonValue, op: CmpOp, operand: &Operand) -> bool {
    let Some(ord) = compare_operand(value, operand) else {
        return false;
    };
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Gte => ord != Ordering::Less,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Lte => ord != Ordering::Greater,
    }
}

/// `None` when the types differ.
fn compare_operand(value: &JsonValue, operand: &Operand) -> Option<Ordering> {
    match (value, operand) {
        (JsonValue::Number(n), Operand::Number(x)) => n.as_f64().and_then(|n| n.partial_cmp(x)),
        (JsonValue::String(s), Operand::Text(x)) => Some(s.as_str().cmp(x.as_str())),
        (JsonValue::Bool(b), Operand::Bool(x)) => Some(b.cmp(x)),
        _ => None,
    }
}

fn as_point(value: &JsonValue) -> Option<GeoPoint> {
    serde_json::from_value(value.clone()).ok()
}

/// Resolve a dotted path (`geoPosition.type`) inside nested objects.
pub fn get_path<'a>(doc: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return None;
    }
    let mut current = doc;
    for (depth, part) in path.split('.').enumerate() {
        if depth >= MAX_PATH_DEPTH {
            return None;
        }
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

pub fn sort_docs(docs: &mut [JsonValue], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    docs.sort_by(|a, b| compare_docs(a, b, keys));
}

fn compare_docs(a: &JsonValue, b: &JsonValue, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = match (get_path(a, &key.field), get_path(b, &key.field)) {
            (Some(x), Some(y)) => compare_json(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
        }
    }
    Ordering::Equal
}

pub fn compare_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        (JsonValue::Array(x), JsonValue::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| compare_json(l, r))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &JsonValue) -> u8 {
    match value {
        JsonValue::Null => 0,
        JsonValue::String(_) => 1,
        JsonValue::Number(_) => 2,
        JsonValue::Bool(_) => 3,
        JsonValue::Array(_) => 4,
        JsonValue::Object(_) => 5,
    }
}

pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.skip())
        .take(pagination.limit as usize)
        .collect()
}

/// Keep only the selected fields; `id` is always kept. Empty selection keeps all.
pub fn project(doc: JsonValue, select: &[String]) -> JsonValue {
    if select.is_empty() {
        return doc;
    }

    let mut out = Map::new();
    if let Some(id) = doc.get("id") {
        out.insert("id".to_string(), id.clone());
    }
    for path in select {
        if let Some(value) = get_path(&doc, path) {
            insert_path(&mut out, path, value.clone());
        }
    }
    JsonValue::Object(out)
}

fn insert_path(out: &mut Map<String, JsonValue>, path: &str, value: JsonValue) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let Some(child) = child.as_object_mut() {
                insert_path(child, rest, value);
            }
        }
    }
}
