//! Request parameters → [`QuerySpec`]
//!
//! Query-string conventions:
//! - `field=value` is an equality match (or the field's catalog default comparison)
//! - `field[op]=value` with `op` one of `eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `in`
//! - repeating an equality key (`skills=rust&skills=go`) is an in-set match
//! - `select=a,b` chooses fields, `sort=-a,b` orders results (`-` = descending)
//! - `page` / `limit` choose the page window
//!
//! Translation is pure: no I/O, no access to stored data.

use std::str::FromStr;

use super::{CmpOp, Condition, Filter, Operand, Pagination, QuerySpec, SortKey};
use crate::{Error, Result};

/// Control keys; never part of the filter predicate.
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Field and direction applied when a request has no `sort`.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Internships,
    Companies,
}

impl ResourceKind {
    fn catalog(self) -> &'static [FieldSpec] {
        match self {
            Self::Internships => INTERNSHIP_FIELDS,
            Self::Companies => COMPANY_FIELDS,
        }
    }

    fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.catalog().iter().find(|f| f.name == name)
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "internships" => Ok(Self::Internships),
            "companies" => Ok(Self::Companies),
            other => Err(Error::UnsupportedResource(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Number,
    Text,
    Bool,
}

#[derive(Debug)]
struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    /// Comparison used for a bare `field=value`.
    default_op: CmpOp,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        default_op: CmpOp::Eq,
    }
}

const INTERNSHIP_FIELDS: &[FieldSpec] = &[
    field("id", FieldKind::Text),
    field("jobId", FieldKind::Text),
    field("title", FieldKind::Text),
    field("description", FieldKind::Text),
    field("location", FieldKind::Text),
    // Salary floor: `minSalary=50` asks for postings paying at least 50.
    FieldSpec {
        name: "minSalary",
        kind: FieldKind::Number,
        default_op: CmpOp::Gte,
    },
    field("durationMonths", FieldKind::Number),
    field("remote", FieldKind::Bool),
    field("skills", FieldKind::Text),
    field("createdAt", FieldKind::Text),
    field("companyId", FieldKind::Text),
    field("companyName", FieldKind::Text),
];

const COMPANY_FIELDS: &[FieldSpec] = &[
    field("id", FieldKind::Text),
    field("companyName", FieldKind::Text),
    field("description", FieldKind::Text),
    field("website", FieldKind::Text),
    field("email", FieldKind::Text),
    field("phone", FieldKind::Text),
    field("address", FieldKind::Text),
    field("revision", FieldKind::Number),
    field("createdAt", FieldKind::Text),
];

/// Page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 100,
        }
    }
}

/// Query-string parameters in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    items: Vec<(String, String)>,
}

impl RawParams {
    /// Parse an `application/x-www-form-urlencoded` query string.
    pub fn from_query(raw_query: Option<&str>) -> Self {
        let items = raw_query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { items }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Values grouped by key, keys in first-seen order.
    fn grouped(&self) -> Vec<(&str, Vec<&str>)> {
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for (key, value) in &self.items {
            match groups.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some((_, values)) => values.push(value.as_str()),
                None => groups.push((key.as_str(), vec![value.as_str()])),
            }
        }
        groups
    }
}

/// Translate request parameters for `resource` into a [`QuerySpec`].
pub fn translate(params: &RawParams, resource: ResourceKind, limits: &QueryLimits) -> Result<QuerySpec> {
    let mut filter = Filter::default();
    let mut select_values = Vec::new();
    let mut sort_values = Vec::new();
    let mut page = None;
    let mut limit = None;

    for (key, values) in params.grouped() {
        let (name, op_token) = split_key(key)?;
        if op_token.is_some() && RESERVED_KEYS.contains(&name) {
            return Err(Error::InvalidQuery(format!(
                "'{name}' is a control parameter and takes no operator"
            )));
        }

        match name {
            "select" => select_values.extend(values),
            "sort" => sort_values.extend(values),
            "page" => page = values.last().copied(),
            "limit" => limit = values.last().copied(),
            _ => translate_filter_key(&mut filter, resource, name, op_token, &values)?,
        }
    }

    let select = split_fields(&select_values);
    let sort = parse_sort(&sort_values)?;
    let pagination = parse_pagination(page, limit, limits)?;

    Ok(QuerySpec {
        resource,
        filter,
        select,
        sort,
        pagination,
    })
}

fn translate_filter_key(
    filter: &mut Filter,
    resource: ResourceKind,
    name: &str,
    op_token: Option<&str>,
    values: &[&str],
) -> Result<()> {
    let spec = resource.field(name);

    match op_token {
        Some("in") => {
            let members: Vec<&str> = values
                .iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect();
            if members.is_empty() {
                return Err(Error::InvalidQuery(format!(
                    "'{name}[in]' needs at least one value"
                )));
            }
            let values = members
                .into_iter()
                .map(|v| coerce(name, spec, v))
                .collect::<Result<Vec<_>>>()?;
            filter.push(Condition::In {
                field: name.to_string(),
                values,
            });
        }
        token => {
            let op = match token {
                None => spec.map(|s| s.default_op).unwrap_or(CmpOp::Eq),
                Some(t) => parse_op(name, t)?,
            };

            if op == CmpOp::Eq && values.len() > 1 {
                let values = values
                    .iter()
                    .map(|v| coerce(name, spec, v))
                    .collect::<Result<Vec<_>>>()?;
                filter.push(Condition::In {
                    field: name.to_string(),
                    values,
                });
            } else {
                for raw in values {
                    filter.push(Condition::Compare {
                        field: name.to_string(),
                        op,
                        value: coerce(name, spec, raw)?,
                    });
                }
            }
        }
    }

    Ok(())
}

/// `minSalary[gte]` → (`minSalary`, Some(`gte`)); `title` → (`title`, None).
fn split_key(key: &str) -> Result<(&str, Option<&str>)> {
    let (name, op) = match key.strip_suffix(']').and_then(|k| k.split_once('[')) {
        Some((name, op)) => (name, Some(op)),
        None => (key, None),
    };

    if name.is_empty() || name.starts_with('$') || name.contains(['[', ']']) {
        return Err(Error::InvalidQuery(format!("Invalid filter key '{key}'")));
    }
    Ok((name, op))
}

fn parse_op(field: &str, token: &str) -> Result<CmpOp> {
    match token {
        "eq" => Ok(CmpOp::Eq),
        "ne" => Ok(CmpOp::Ne),
        "gt" => Ok(CmpOp::Gt),
        "gte" => Ok(CmpOp::Gte),
        "lt" => Ok(CmpOp::Lt),
        "lte" => Ok(CmpOp::Lte),
        other => Err(Error::InvalidQuery(format!(
            "Unknown operator '{other}' on '{field}'"
        ))),
    }
}

fn coerce(field: &str, spec: Option<&FieldSpec>, raw: &str) -> Result<Operand> {
    match spec.map(|s| s.kind) {
        Some(FieldKind::Number) => parse_number(raw).map(Operand::Number).ok_or_else(|| {
            Error::InvalidQuery(format!("'{field}' expects a number, got '{raw}'"))
        }),
        Some(FieldKind::Bool) => parse_bool(raw).map(Operand::Bool).ok_or_else(|| {
            Error::InvalidQuery(format!("'{field}' expects true or false, got '{raw}'"))
        }),
        Some(FieldKind::Text) => Ok(Operand::Text(raw.to_string())),
        None => Ok(parse_number(raw)
            .map(Operand::Number)
            .or_else(|| parse_bool(raw).map(Operand::Bool))
            .unwrap_or_else(|| Operand::Text(raw.to_string()))),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn split_fields(values: &[&str]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for name in values.iter().flat_map(|v| v.split(',')).map(str::trim) {
        if !name.is_empty() && !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    }
    fields
}

fn parse_sort(values: &[&str]) -> Result<Vec<SortKey>> {
    let tokens = split_fields(values);
    if tokens.is_empty() {
        return Ok(vec![SortKey::desc(DEFAULT_SORT_FIELD)]);
    }

    tokens
        .iter()
        .map(|token| {
            let token = token.as_str();
            let key = match token.strip_prefix('-') {
                Some(field) => SortKey::desc(field),
                None => SortKey::asc(token.strip_prefix('+').unwrap_or(token)),
            };
            if key.field.is_empty() {
                return Err(Error::InvalidQuery(format!("Invalid sort key '{token}'")));
            }
            Ok(key)
        })
        .collect()
}

fn parse_pagination(
    page: Option<&str>,
    limit: Option<&str>,
    limits: &QueryLimits,
) -> Result<Pagination> {
    let page = match page {
        Some(raw) => parse_positive("page", raw)?,
        None => 1,
    };
    let limit = match limit {
        Some(raw) => parse_positive("limit", raw)?,
        None => limits.default_limit,
    };

    Ok(Pagination {
        page,
        limit: limit.min(limits.max_limit),
    })
}

fn parse_positive(name: &str, raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidQuery(format!(
            "'{name}' must be a positive integer, got '{raw}'"
        ))),
    }
}
