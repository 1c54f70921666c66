//! Authoring surface for the curriculum hierarchy: grade bands, grades,
//! AI-literacy strands, competencies and learning-progression indicators.
//!
//! The five entities share one list/create/update implementation driven by
//! an `Entity` descriptor per table.

use crate::defaults;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, now_ts, parse_opt_i64, row_exists};
use crate::ipc::types::{AppState, Request};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

#[derive(Clone, Copy)]
enum FieldKind {
    Text { required: bool },
    /// Must name an existing row: `SELECT 1 FROM table WHERE column = ?`.
    Ref {
        table: &'static str,
        column: &'static str,
        nullable: bool,
    },
}

#[derive(Clone, Copy)]
struct Field {
    key: &'static str,
    column: &'static str,
    kind: FieldKind,
}

struct Entity {
    label: &'static str,
    table: &'static str,
    id_param: &'static str,
    list_key: &'static str,
    fields: &'static [Field],
    /// (param, column) pairs accepted as equality filters by `list`.
    filters: &'static [(&'static str, &'static str)],
    /// Rows in other tables that hold a copy of one of this entity's columns.
    dependents: &'static [Dependent],
}

/// `table.ref_column` stores the value of the owning entity's `column`.
struct Dependent {
    column: &'static str,
    table: &'static str,
    ref_column: &'static str,
}

const fn text(key: &'static str, column: &'static str, required: bool) -> Field {
    Field {
        key,
        column,
        kind: FieldKind::Text { required },
    }
}

const GRADE_BANDS: Entity = Entity {
    label: "grade band",
    table: "grade_bands",
    id_param: "gradeBandId",
    list_key: "gradeBands",
    fields: &[text("name", "name", true), text("description", "description", false)],
    filters: &[],
    dependents: &[],
};

const GRADES: Entity = Entity {
    label: "grade",
    table: "grades",
    id_param: "gradeId",
    list_key: "grades",
    fields: &[
        Field {
            key: "gradeBandId",
            column: "grade_band_id",
            kind: FieldKind::Ref {
                table: "grade_bands",
                column: "id",
                nullable: false,
            },
        },
        text("name", "name", true),
    ],
    filters: &[("gradeBandId", "grade_band_id")],
    dependents: &[],
};

const STRANDS: Entity = Entity {
    label: "strand",
    table: "ai_strands",
    id_param: "strandId",
    list_key: "strands",
    fields: &[
        text("code", "code", true),
        text("name", "name", true),
        text("description", "description", false),
    ],
    filters: &[],
    dependents: &[],
};

const COMPETENCIES: Entity = Entity {
    label: "competency",
    table: "competencies",
    id_param: "competencyId",
    list_key: "competencies",
    fields: &[
        text("code", "code", true),
        text("name", "name", true),
        text("description", "description", false),
    ],
    filters: &[],
    dependents: &[Dependent {
        column: "code",
        table: "indicators",
        ref_column: "competency_code",
    }],
};

const INDICATORS: Entity = Entity {
    label: "indicator",
    table: "indicators",
    id_param: "indicatorId",
    list_key: "indicators",
    fields: &[
        Field {
            key: "gradeBandId",
            column: "grade_band_id",
            kind: FieldKind::Ref {
                table: "grade_bands",
                column: "id",
                nullable: false,
            },
        },
        Field {
            key: "strandId",
            column: "strand_id",
            kind: FieldKind::Ref {
                table: "ai_strands",
                column: "id",
                nullable: false,
            },
        },
        Field {
            key: "competencyCode",
            column: "competency_code",
            kind: FieldKind::Ref {
                table: "competencies",
                column: "code",
                nullable: true,
            },
        },
        text("description", "description", true),
    ],
    filters: &[("gradeBandId", "grade_band_id"), ("strandId", "strand_id")],
    dependents: &[],
};

fn sql_to_json(v: Value) -> JsonValue {
    match v {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => json!(i),
        Value::Real(f) => json!(f),
        Value::Text(s) => JsonValue::String(s),
        Value::Blob(_) => JsonValue::Null,
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation
    )
}

fn write_failure(req: &Request, entity: &Entity, fallback_code: &str, e: rusqlite::Error) -> JsonValue {
    if is_constraint_violation(&e) {
        err(
            &req.id,
            "conflict",
            format!("{} conflicts with an existing record", entity.label),
            Some(json!({ "table": entity.table })),
        )
    } else {
        err(&req.id, fallback_code, e.to_string(), None)
    }
}

/// Validates one input value for `field`. `Ok(None)` means "leave unset".
fn parse_field(
    conn: &Connection,
    field: &Field,
    raw: Option<&JsonValue>,
    creating: bool,
) -> Result<Option<Value>, (&'static str, String)> {
    match field.kind {
        FieldKind::Text { required } => match raw {
            None if creating && required => {
                Err(("bad_params", format!("{} is required", field.key)))
            }
            None if creating => Ok(Some(Value::Text(String::new()))),
            None => Ok(None),
            Some(v) => {
                let Some(s) = v.as_str() else {
                    return Err(("bad_params", format!("{} must be string", field.key)));
                };
                let s = s.trim();
                if required && s.is_empty() {
                    return Err(("bad_params", format!("{} must not be empty", field.key)));
                }
                Ok(Some(Value::Text(s.to_string())))
            }
        },
        FieldKind::Ref {
            table,
            column,
            nullable,
        } => {
            let value = match raw {
                None if creating && !nullable => {
                    return Err(("bad_params", format!("{} is required", field.key)))
                }
                None if creating => return Ok(Some(Value::Null)),
                None => return Ok(None),
                Some(v) if v.is_null() || v.as_str().map(|s| s.trim().is_empty()) == Some(true) => {
                    if nullable {
                        return Ok(Some(Value::Null));
                    }
                    return Err(("bad_params", format!("{} must not be empty", field.key)));
                }
                Some(v) => match v.as_str() {
                    Some(s) => s.trim().to_string(),
                    None => return Err(("bad_params", format!("{} must be string", field.key))),
                },
            };
            let sql = format!("SELECT 1 FROM {} WHERE {} = ? LIMIT 1", table, column);
            match row_exists(conn, &sql, [&value]) {
                Ok(true) => Ok(Some(Value::Text(value))),
                Ok(false) => Err(("not_found", format!("{} not found: {}", field.key, value))),
                Err(e) => Err(("db_query_failed", e.to_string())),
            }
        }
    }
}

fn handle_list(state: &mut AppState, req: &Request, entity: &Entity) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    for (param, column) in entity.filters {
        match req.params.get(*param) {
            None => {}
            Some(v) if v.is_null() => {}
            Some(v) => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", format!("{} must be string", param), None);
                };
                clauses.push(format!("{} = ?", column));
                values.push(Value::Text(s.trim().to_string()));
            }
        }
    }
    let columns: Vec<&str> = entity.fields.iter().map(|f| f.column).collect();
    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT id, sort_order, {} FROM {}{} ORDER BY sort_order, id",
        columns.join(", "),
        entity.table,
        where_sql
    );
    let mut stmt = match conn.prepare(&sql) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let rows = stmt
        .query_map(params_from_iter(values), |r| {
            let mut obj = Map::new();
            obj.insert("id".into(), JsonValue::String(r.get(0)?));
            obj.insert("sortOrder".into(), json!(r.get::<_, i64>(1)?));
            for (idx, field) in entity.fields.iter().enumerate() {
                obj.insert(field.key.into(), sql_to_json(r.get::<_, Value>(idx + 2)?));
            }
            Ok(JsonValue::Object(obj))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());
    match rows {
        Ok(items) => ok(&req.id, json!({ entity.list_key: items })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_create(state: &mut AppState, req: &Request, entity: &Entity) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let Some(input) = req.params.get("input").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing input", None);
    };
    // Caller-chosen ids let bands keep stable slugs such as "early-years".
    let id = match input.get("id") {
        None => Uuid::new_v4().to_string(),
        Some(v) => match v.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return err(&req.id, "bad_params", "input.id must be a non-empty string", None),
        },
    };

    let mut columns: Vec<&str> = vec!["id", "sort_order"];
    let sort_order = match parse_opt_i64(input.get("sortOrder")) {
        Ok(Some(v)) if v >= 0 => v,
        Ok(Some(_)) => return err(&req.id, "bad_params", "input.sortOrder must be >= 0", None),
        Ok(None) => {
            let sql = format!(
                "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM {}",
                entity.table
            );
            match conn.query_row(&sql, [], |r| r.get::<_, i64>(0)) {
                Ok(v) => v,
                Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
            }
        }
        Err(m) => return err(&req.id, "bad_params", format!("input.sortOrder {}", m), None),
    };
    let mut values: Vec<Value> = vec![Value::Text(id.clone()), Value::Integer(sort_order)];
    for field in entity.fields {
        match parse_field(conn, field, input.get(field.key), true) {
            Ok(Some(v)) => {
                columns.push(field.column);
                values.push(v);
            }
            Ok(None) => {}
            Err((code, msg)) => return err(&req.id, code, format!("input.{}", msg), None),
        }
    }
    for key in input.keys() {
        let known = key == "id" || key == "sortOrder" || entity.fields.iter().any(|f| f.key == key);
        if !known {
            return err(&req.id, "bad_params", format!("unknown input field: {}", key), None);
        }
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {}({}) VALUES({})",
        entity.table,
        columns.join(", "),
        placeholders
    );
    if let Err(e) = conn.execute(&sql, params_from_iter(values)) {
        return write_failure(req, entity, "db_insert_failed", e);
    }
    ok(&req.id, json!({ entity.id_param: id }))
}

fn handle_update(state: &mut AppState, req: &Request, entity: &Entity) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let Some(id) = req
        .params
        .get(entity.id_param)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return err(&req.id, "bad_params", format!("missing {}", entity.id_param), None);
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };
    let exists_sql = format!("SELECT 1 FROM {} WHERE id = ?", entity.table);
    match row_exists(conn, &exists_sql, [&id]) {
        Ok(true) => {}
        Ok(false) => return err(&req.id, "not_found", format!("{} not found", entity.label), None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    }

    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    for (k, v) in patch {
        if k == "sortOrder" {
            match v.as_i64() {
                Some(n) if n >= 0 => {
                    fields.push("sort_order = ?".to_string());
                    values.push(Value::Integer(n));
                }
                _ => return err(&req.id, "bad_params", "patch.sortOrder must be integer >= 0", None),
            }
            continue;
        }
        let Some(field) = entity.fields.iter().find(|f| f.key == k) else {
            return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None);
        };
        match parse_field(conn, field, Some(v), false) {
            Ok(Some(value)) => {
                fields.push(format!("{} = ?", field.column));
                values.push(value);
            }
            Ok(None) => {}
            Err((code, msg)) => return err(&req.id, code, format!("patch.{}", msg), None),
        }
    }
    if fields.is_empty() {
        return ok(&req.id, json!({ "ok": true }));
    }
    values.push(Value::Text(id.clone()));
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?",
        entity.table,
        fields.join(", ")
    );

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };
    let mut previous: Vec<(&Dependent, Option<String>)> = Vec::new();
    for dep in entity.dependents {
        let touched = entity
            .fields
            .iter()
            .any(|f| f.column == dep.column && patch.contains_key(f.key));
        if !touched {
            continue;
        }
        let old_sql = format!("SELECT {} FROM {} WHERE id = ?", dep.column, entity.table);
        match tx.query_row(&old_sql, [&id], |r| r.get::<_, Option<String>>(0)) {
            Ok(v) => previous.push((dep, v)),
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        }
    }
    if let Err(e) = tx.execute(&sql, params_from_iter(values)) {
        return write_failure(req, entity, "db_update_failed", e);
    }
    for (dep, old) in previous {
        let Some(old) = old else { continue };
        let cascade_sql = format!(
            "UPDATE {} SET {} = (SELECT {} FROM {} WHERE id = ?) WHERE {} = ?",
            dep.table, dep.ref_column, dep.column, entity.table, dep.ref_column
        );
        match tx.execute(&cascade_sql, params![id, old]) {
            Ok(n) if n > 0 => {
                tracing::info!(table = dep.table, rows = n, from = %old, "renamed references")
            }
            Ok(_) => {}
            Err(e) => return err(&req.id, "db_update_failed", e.to_string(), None),
        }
    }
    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

fn handle_seed_defaults(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    match defaults::seed_workspace(conn, &now_ts()) {
        Ok(s) => {
            tracing::info!(
                grade_bands = s.grade_bands,
                grades = s.grades,
                lessons = s.lessons,
                "seeded default curriculum"
            );
            ok(
                &req.id,
                json!({
                    "inserted": {
                        "gradeBands": s.grade_bands,
                        "grades": s.grades,
                        "strands": s.strands,
                        "competencies": s.competencies,
                        "indicators": s.indicators,
                        "lessons": s.lessons,
                        "activities": s.activities,
                    }
                }),
            )
        }
        Err(e) => err(&req.id, "db_insert_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let (entity, op) = match req.method.as_str() {
        "curriculum.seedDefaults" => return Some(handle_seed_defaults(state, req)),
        "gradeBands.list" => (&GRADE_BANDS, "list"),
        "gradeBands.create" => (&GRADE_BANDS, "create"),
        "gradeBands.update" => (&GRADE_BANDS, "update"),
        "grades.list" => (&GRADES, "list"),
        "grades.create" => (&GRADES, "create"),
        "grades.update" => (&GRADES, "update"),
        "strands.list" => (&STRANDS, "list"),
        "strands.create" => (&STRANDS, "create"),
        "strands.update" => (&STRANDS, "update"),
        "competencies.list" => (&COMPETENCIES, "list"),
        "competencies.create" => (&COMPETENCIES, "create"),
        "competencies.update" => (&COMPETENCIES, "update"),
        "indicators.list" => (&INDICATORS, "list"),
        "indicators.create" => (&INDICATORS, "create"),
        "indicators.update" => (&INDICATORS, "update"),
        _ => return None,
    };
    Some(match op {
        "list" => handle_list(state, req, entity),
        "create" => handle_create(state, req, entity),
        _ => handle_update(state, req, entity),
    })
}
