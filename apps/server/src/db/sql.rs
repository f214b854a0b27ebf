//! [`QuerySpec`] → SQL over JSONB documents
//!
//! Queries run against a `docs(seq, ord, doc)` CTE: one row per company, or one row
//! per embedded internship tagged with its company. Paths are bound as `text[]` and
//! resolved with `#>`, so field names never reach the SQL text. Ties in the sort
//! order are broken by storage order (`seq`, `ord`).

use serde_json::Value as JsonValue;

use crate::query::{CmpOp, Condition, Filter, Operand, QuerySpec, SortDirection};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    TextArray(Vec<String>),
    Json(JsonValue),
    Float(f64),
    Int(i64),
}

/// Rows a query ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocSource {
    Companies,
    Internships,
}

impl DocSource {
    fn cte(self) -> &'static str {
        match self {
            Self::Companies => {
                "WITH docs AS (SELECT c.seq, 0::bigint AS ord, c.document AS doc FROM companies c)"
            }
            Self::Internships => concat!(
                "WITH docs AS (",
                "SELECT c.seq, i.ord, ",
                "i.elem || jsonb_build_object('companyId', c.id::text, 'companyName', c.company_name) AS doc ",
                "FROM companies c ",
                "CROSS JOIN LATERAL jsonb_array_elements(c.document -> 'internships') ",
                "WITH ORDINALITY AS i(elem, ord))"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

fn push(binds: &mut Vec<BindValue>, value: BindValue) -> usize {
    binds.push(value);
    binds.len()
}

fn push_path(binds: &mut Vec<BindValue>, field: &str) -> usize {
    push(
        binds,
        BindValue::TextArray(field.split('.').map(str::to_string).collect()),
    )
}

/// Page of matching documents, sorted.
pub fn compile_select(source: DocSource, spec: &QuerySpec) -> CompiledQuery {
    let mut binds = Vec::new();
    let predicate = compile_filter(&spec.filter, &mut binds);

    let mut order: Vec<String> = spec
        .sort
        .iter()
        .map(|key| {
            let idx = push_path(&mut binds, &key.field);
            match key.direction {
                SortDirection::Asc => format!("doc #> ${idx}::text[] ASC NULLS FIRST"),
                SortDirection::Desc => format!("doc #> ${idx}::text[] DESC NULLS LAST"),
            }
        })
        .collect();
    order.push("seq ASC".to_string());
    order.push("ord ASC".to_string());

    let limit = push(&mut binds, BindValue::Int(i64::from(spec.pagination.limit)));
    let offset = push(
        &mut binds,
        BindValue::Int(i64::try_from(spec.pagination.skip()).unwrap_or(i64::MAX)),
    );

    CompiledQuery {
        sql: format!(
            "{} SELECT doc FROM docs WHERE {predicate} ORDER BY {} LIMIT ${limit} OFFSET ${offset}",
            source.cte(),
            order.join(", ")
        ),
        binds,
    }
}

/// Number of matching documents.
pub fn compile_count(source: DocSource, spec: &QuerySpec) -> CompiledQuery {
    let mut binds = Vec::new();
    let predicate = compile_filter(&spec.filter, &mut binds);
    CompiledQuery {
        sql: format!(
            "{} SELECT count(*) FROM docs WHERE {predicate}",
            source.cte()
        ),
        binds,
    }
}

fn compile_filter(filter: &Filter, binds: &mut Vec<BindValue>) -> String {
    if filter.is_empty() {
        return "TRUE".to_string();
    }
    filter
        .conditions
        .iter()
        .map(|c| format!("({})", compile_condition(c, binds)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Array fields are unnested; scalar fields become a one-element array.
fn elements(path_idx: usize) -> String {
    format!(
        "jsonb_array_elements(CASE WHEN jsonb_typeof(doc #> ${path_idx}::text[]) = 'array' \
         THEN doc #> ${path_idx}::text[] ELSE jsonb_build_array(doc #> ${path_idx}::text[]) END) AS e(v)"
    )
}

fn compile_condition(condition: &Condition, binds: &mut Vec<BindValue>) -> String {
    match condition {
        Condition::Compare { field, op, value } => {
            let path = push_path(binds, field);
            let operand = push(binds, BindValue::Json(value.to_json()));
            let elems = elements(path);
            match op {
                CmpOp::Eq => format!("EXISTS (SELECT 1 FROM {elems} WHERE e.v = ${operand}::jsonb)"),
                CmpOp::Ne => {
                    format!("NOT EXISTS (SELECT 1 FROM {elems} WHERE e.v = ${operand}::jsonb)")
                }
                range => {
                    let sym = match range {
                        CmpOp::Gt => ">",
                        CmpOp::Gte => ">=",
                        CmpOp::Lt => "<",
                        _ => "<=",
                    };
                    format!(
                        "EXISTS (SELECT 1 FROM {elems} WHERE jsonb_typeof(e.v) = jsonb_typeof(${operand}::jsonb) \
                         AND e.v {sym} ${operand}::jsonb)"
                    )
                }
            }
        }
        Condition::In { field, values } => {
            let path = push_path(binds, field);
            let set = push(
                binds,
                BindValue::Json(JsonValue::Array(values.iter().map(Operand::to_json).collect())),
            );
            format!(
                "EXISTS (SELECT 1 FROM {} WHERE e.v IS NOT NULL AND jsonb_typeof(e.v) <> 'null' \
                 AND ${set}::jsonb @> jsonb_build_array(e.v))",
                elements(path)
            )
        }
        Condition::WithinSphere {
            field,
            center,
            radius,
        } => {
            let path = push_path(binds, field);
            let lng = push(binds, BindValue::Float(center.longitude()));
            let lat = push(binds, BindValue::Float(center.latitude()));
            let rad = push(binds, BindValue::Float(*radius));
            let p = format!("doc #> ${path}::text[]");
            let x = format!("({p} #>> '{{coordinates,0}}')::float8");
            let y = format!("({p} #>> '{{coordinates,1}}')::float8");
            format!(
                "CASE WHEN {p} ->> 'type' = 'Point' \
                 AND jsonb_typeof({p} #> '{{coordinates,0}}') = 'number' \
                 AND jsonb_typeof({p} #> '{{coordinates,1}}') = 'number' \
                 THEN 2 * asin(least(1.0, sqrt(\
                 power(sin(radians({y} - ${lat}::float8) / 2), 2) + \
                 cos(radians(${lat}::float8)) * cos(radians({y})) * power(sin(radians({x} - ${lng}::float8) / 2), 2)\
                 ))) <= ${rad}::float8 \
                 ELSE FALSE END"
            )
        }
    }
}
