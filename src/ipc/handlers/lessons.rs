use crate::db::{json_array_string, parse_json_array_string};
use crate::generator::ActivityKind;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    db_conn, ids_in_order, merge_order, next_sort_order, now_ts, parse_bool, parse_id_order,
    parse_opt_i64, parse_opt_string, parse_string_array, required_str, row_exists,
};
use crate::ipc::handlers::setup::MAX_LESSON_MINUTES;
use crate::ipc::types::{AppState, Request};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

const LESSON_COLUMNS: &str = "id, grade_id, sort_order, title, summary, objectives_json, duration_minutes, archived, created_at, updated_at";
const ACTIVITY_COLUMNS: &str = "id, sort_order, title, description, kind, duration_minutes, materials_json, instructions_json, strand_ids_json, competency_codes_json";

fn lesson_json(r: &Row<'_>) -> rusqlite::Result<JsonValue> {
    let objectives_raw: String = r.get(5)?;
    Ok(json!({
        "id": r.get::<_, String>(0)?,
        "gradeId": r.get::<_, String>(1)?,
        "sortOrder": r.get::<_, i64>(2)?,
        "title": r.get::<_, String>(3)?,
        "summary": r.get::<_, String>(4)?,
        "objectives": parse_json_array_string(&objectives_raw),
        "durationMinutes": r.get::<_, Option<i64>>(6)?,
        "archived": r.get::<_, i64>(7)? != 0,
        "createdAt": r.get::<_, String>(8)?,
        "updatedAt": r.get::<_, String>(9)?,
    }))
}

fn activity_json(r: &Row<'_>) -> rusqlite::Result<JsonValue> {
    Ok(json!({
        "id": r.get::<_, String>(0)?,
        "sortOrder": r.get::<_, i64>(1)?,
        "title": r.get::<_, String>(2)?,
        "description": r.get::<_, String>(3)?,
        "kind": r.get::<_, String>(4)?,
        "durationMinutes": r.get::<_, i64>(5)?,
        "materials": parse_json_array_string(&r.get::<_, String>(6)?),
        "instructions": parse_json_array_string(&r.get::<_, String>(7)?),
        "strandIds": parse_json_array_string(&r.get::<_, String>(8)?),
        "competencyCodes": parse_json_array_string(&r.get::<_, String>(9)?),
    }))
}

fn list_activities(conn: &Connection, lesson_id: &str) -> rusqlite::Result<Vec<JsonValue>> {
    let sql = format!(
        "SELECT {} FROM lesson_activities WHERE lesson_id = ? ORDER BY sort_order, id",
        ACTIVITY_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([lesson_id], activity_json)?;
    let out = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(out)
}

fn ensure_grade_exists(conn: &Connection, req: &Request, grade_id: &str) -> Result<(), JsonValue> {
    match row_exists(conn, "SELECT 1 FROM grades WHERE id = ? LIMIT 1", [grade_id]) {
        Ok(true) => Ok(()),
        Ok(false) => Err(err(&req.id, "not_found", "grade not found", None)),
        Err(e) => Err(err(&req.id, "db_query_failed", e.to_string(), None)),
    }
}

fn ensure_lesson_exists(conn: &Connection, req: &Request, lesson_id: &str) -> Result<(), JsonValue> {
    match row_exists(conn, "SELECT 1 FROM lessons WHERE id = ? LIMIT 1", [lesson_id]) {
        Ok(true) => Ok(()),
        Ok(false) => Err(err(&req.id, "not_found", "lesson not found", None)),
        Err(e) => Err(err(&req.id, "db_query_failed", e.to_string(), None)),
    }
}

fn touch_lesson(conn: &Connection, lesson_id: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE lessons SET updated_at = ? WHERE id = ?",
        params![now_ts(), lesson_id],
    )?;
    Ok(())
}

fn parse_kind(v: Option<&JsonValue>, key: &str) -> Result<ActivityKind, String> {
    let Some(raw) = v.and_then(|v| v.as_str()) else {
        return Err(format!("{} is required", key));
    };
    ActivityKind::parse(raw)
        .ok_or_else(|| format!("{} must be one of: classroom, online, assessment, project", key))
}

fn list_input(input: &Map<String, JsonValue>, key: &str) -> Result<String, String> {
    parse_string_array(input.get(key))
        .map(|v| json_array_string(&v))
        .map_err(|m| format!("input.{} {}", key, m))
}

fn handle_lessons_list(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let grade_id = match required_str(req, "gradeId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let include_archived = match parse_bool(req.params.get("includeArchived"), false) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("includeArchived {}", m), None),
    };
    if let Err(e) = ensure_grade_exists(conn, req, &grade_id) {
        return e;
    }

    let sql = if include_archived {
        format!(
            "SELECT {} FROM lessons WHERE grade_id = ? ORDER BY sort_order, id",
            LESSON_COLUMNS
        )
    } else {
        format!(
            "SELECT {} FROM lessons WHERE grade_id = ? AND archived = 0 ORDER BY sort_order, id",
            LESSON_COLUMNS
        )
    };
    let mut stmt = match conn.prepare(&sql) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let lessons = match stmt.query_map([&grade_id], lesson_json) {
        Ok(rows) => match rows.collect::<Result<Vec<_>, _>>() {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(&req.id, json!({ "lessons": lessons }))
}

fn handle_lessons_open(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let sql = format!("SELECT {} FROM lessons WHERE id = ?", LESSON_COLUMNS);
    let lesson = match conn.query_row(&sql, [&lesson_id], lesson_json).optional() {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "not_found", "lesson not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let activities = match list_activities(conn, &lesson_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let total: i64 = activities
        .iter()
        .filter_map(|a| a.get("durationMinutes").and_then(|v| v.as_i64()))
        .sum();
    ok(
        &req.id,
        json!({
            "lesson": lesson,
            "activities": activities,
            "totalActivityMinutes": total
        }),
    )
}

fn handle_lessons_create(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let grade_id = match required_str(req, "gradeId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = ensure_grade_exists(conn, req, &grade_id) {
        return e;
    }
    let Some(input) = req.params.get("input").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing input", None);
    };
    let title = match input.get("title").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "input.title is required", None),
    };
    if title.is_empty() {
        return err(&req.id, "bad_params", "input.title must not be empty", None);
    }
    let summary = match parse_opt_string(input.get("summary")) {
        Ok(v) => v.unwrap_or_default(),
        Err(m) => return err(&req.id, "bad_params", format!("input.summary {}", m), None),
    };
    let objectives = match parse_string_array(input.get("objectives")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("input.objectives {}", m), None),
    };
    let duration_minutes = match parse_opt_i64(input.get("durationMinutes")) {
        Ok(Some(v)) if v > 0 => Some(v),
        Ok(Some(_)) => return err(&req.id, "bad_params", "input.durationMinutes must be > 0", None),
        Ok(None) => None,
        Err(m) => return err(&req.id, "bad_params", format!("input.durationMinutes {}", m), None),
    };
    let sort_order = match parse_opt_i64(input.get("sortOrder")) {
        Ok(Some(v)) if v >= 0 => v,
        Ok(Some(_)) => return err(&req.id, "bad_params", "input.sortOrder must be >= 0", None),
        Ok(None) => match next_sort_order(
            conn,
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM lessons WHERE grade_id = ?",
            &grade_id,
        ) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        Err(m) => return err(&req.id, "bad_params", format!("input.sortOrder {}", m), None),
    };

    let lesson_id = Uuid::new_v4().to_string();
    let ts = now_ts();
    if let Err(e) = conn.execute(
        "INSERT INTO lessons(
            id, grade_id, sort_order, title, summary, objectives_json, duration_minutes, archived, created_at, updated_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        params![
            lesson_id,
            grade_id,
            sort_order,
            title,
            summary,
            json_array_string(&objectives),
            duration_minutes,
            ts,
            ts
        ],
    ) {
        return err(&req.id, "db_insert_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "lessonId": lesson_id }))
}

fn handle_lessons_update(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };
    if let Err(e) = ensure_lesson_exists(conn, req, &lesson_id) {
        return e;
    }

    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    for (k, v) in patch {
        match k.as_str() {
            "gradeId" => {
                let Some(gid) = v.as_str().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
                else {
                    return err(&req.id, "bad_params", "patch.gradeId must be a non-empty string", None);
                };
                if let Err(e) = ensure_grade_exists(conn, req, &gid) {
                    return e;
                }
                fields.push("grade_id = ?".to_string());
                values.push(Value::Text(gid));
            }
            "title" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.title must be string", None);
                };
                let s = s.trim();
                if s.is_empty() {
                    return err(&req.id, "bad_params", "patch.title must not be empty", None);
                }
                fields.push("title = ?".to_string());
                values.push(Value::Text(s.to_string()));
            }
            "summary" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.summary must be string", None);
                };
                fields.push("summary = ?".to_string());
                values.push(Value::Text(s.to_string()));
            }
            "objectives" => {
                let list = match parse_string_array(Some(v)) {
                    Ok(v) => v,
                    Err(m) => return err(&req.id, "bad_params", format!("patch.objectives {}", m), None),
                };
                fields.push("objectives_json = ?".to_string());
                values.push(Value::Text(json_array_string(&list)));
            }
            "durationMinutes" => {
                fields.push("duration_minutes = ?".to_string());
                if v.is_null() {
                    values.push(Value::Null);
                } else if let Some(n) = v.as_i64() {
                    if n <= 0 {
                        return err(&req.id, "bad_params", "patch.durationMinutes must be > 0", None);
                    }
                    values.push(Value::Integer(n));
                } else {
                    return err(
                        &req.id,
                        "bad_params",
                        "patch.durationMinutes must be integer or null",
                        None,
                    );
                }
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        }
    }
    if fields.is_empty() {
        return ok(&req.id, json!({ "ok": true }));
    }
    fields.push("updated_at = ?".to_string());
    values.push(Value::Text(now_ts()));
    values.push(Value::Text(lesson_id));
    let sql = format!("UPDATE lessons SET {} WHERE id = ?", fields.join(", "));
    if let Err(e) = conn.execute(&sql, params_from_iter(values)) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

fn handle_lessons_archive(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let archived = match parse_bool(req.params.get("archived"), true) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("archived {}", m), None),
    };
    match conn.execute(
        "UPDATE lessons SET archived = ?, updated_at = ? WHERE id = ?",
        params![if archived { 1 } else { 0 }, now_ts(), lesson_id],
    ) {
        Ok(0) => err(&req.id, "not_found", "lesson not found", None),
        Ok(_) => ok(&req.id, json!({ "ok": true })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

/// Shared reorder flow: listed ids first, the rest keep their relative order.
fn apply_reorder(
    conn: &Connection,
    req: &Request,
    list_sql: &str,
    update_sql: &str,
    scope: &str,
    provided: Vec<String>,
) -> JsonValue {
    let existing = match ids_in_order(conn, list_sql, scope) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let final_order = match merge_order(provided, existing) {
        Ok(v) => v,
        Err(missing) => {
            return err(
                &req.id,
                "bad_params",
                format!("id not found in scope: {}", missing),
                None,
            )
        }
    };
    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };
    for (idx, id) in final_order.iter().enumerate() {
        if let Err(e) = tx.execute(update_sql, params![idx as i64, scope, id]) {
            let _ = tx.rollback();
            return err(&req.id, "db_update_failed", e.to_string(), None);
        }
    }
    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

fn handle_lessons_reorder(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let grade_id = match required_str(req, "gradeId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let provided = match parse_id_order(req, "lessonIdOrder") {
        Ok(v) => v,
        Err(e) => return e,
    };
    apply_reorder(
        conn,
        req,
        "SELECT id FROM lessons WHERE grade_id = ? ORDER BY sort_order, id",
        "UPDATE lessons SET sort_order = ? WHERE grade_id = ? AND id = ?",
        &grade_id,
        provided,
    )
}

fn handle_activities_list(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = ensure_lesson_exists(conn, req, &lesson_id) {
        return e;
    }
    match list_activities(conn, &lesson_id) {
        Ok(activities) => ok(&req.id, json!({ "activities": activities })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_activities_create(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = ensure_lesson_exists(conn, req, &lesson_id) {
        return e;
    }
    let Some(input) = req.params.get("input").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing input", None);
    };
    let title = match input.get("title").and_then(|v| v.as_str()).map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return err(&req.id, "bad_params", "input.title is required", None),
    };
    let description = match parse_opt_string(input.get("description")) {
        Ok(v) => v.unwrap_or_default(),
        Err(m) => return err(&req.id, "bad_params", format!("input.description {}", m), None),
    };
    let kind = match parse_kind(input.get("kind"), "input.kind") {
        Ok(k) => k,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };
    let duration_minutes = match parse_opt_i64(input.get("durationMinutes")) {
        Ok(Some(v)) if (0..=MAX_LESSON_MINUTES).contains(&v) => v,
        Ok(Some(_)) => {
            return err(
                &req.id,
                "bad_params",
                format!("input.durationMinutes must be in 0..={}", MAX_LESSON_MINUTES),
                None,
            )
        }
        Ok(None) => return err(&req.id, "bad_params", "input.durationMinutes is required", None),
        Err(m) => return err(&req.id, "bad_params", format!("input.durationMinutes {}", m), None),
    };
    let mut lists: Vec<String> = Vec::with_capacity(4);
    for key in ["materials", "instructions", "strandIds", "competencyCodes"] {
        match list_input(input, key) {
            Ok(v) => lists.push(v),
            Err(m) => return err(&req.id, "bad_params", m, None),
        }
    }
    let sort_order = match parse_opt_i64(input.get("sortOrder")) {
        Ok(Some(v)) if v >= 0 => v,
        Ok(Some(_)) => return err(&req.id, "bad_params", "input.sortOrder must be >= 0", None),
        Ok(None) => match next_sort_order(
            conn,
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM lesson_activities WHERE lesson_id = ?",
            &lesson_id,
        ) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        },
        Err(m) => return err(&req.id, "bad_params", format!("input.sortOrder {}", m), None),
    };

    let activity_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO lesson_activities(
            id, lesson_id, sort_order, title, description, kind, duration_minutes,
            materials_json, instructions_json, strand_ids_json, competency_codes_json
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            activity_id,
            lesson_id,
            sort_order,
            title,
            description,
            kind.as_str(),
            duration_minutes,
            lists[0],
            lists[1],
            lists[2],
            lists[3],
        ],
    ) {
        return err(&req.id, "db_insert_failed", e.to_string(), None);
    }
    let _ = touch_lesson(conn, &lesson_id);
    ok(&req.id, json!({ "activityId": activity_id }))
}

fn handle_activities_update(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let activity_id = match required_str(req, "activityId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };
    match row_exists(
        conn,
        "SELECT 1 FROM lesson_activities WHERE lesson_id = ? AND id = ?",
        params![lesson_id, activity_id],
    ) {
        Ok(true) => {}
        Ok(false) => return err(&req.id, "not_found", "activity not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    }

    let mut fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    for (k, v) in patch {
        match k.as_str() {
            "title" => {
                let Some(s) = v.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
                    return err(&req.id, "bad_params", "patch.title must be a non-empty string", None);
                };
                fields.push("title = ?".to_string());
                values.push(Value::Text(s.to_string()));
            }
            "description" => {
                let Some(s) = v.as_str() else {
                    return err(&req.id, "bad_params", "patch.description must be string", None);
                };
                fields.push("description = ?".to_string());
                values.push(Value::Text(s.to_string()));
            }
            "kind" => {
                let kind = match parse_kind(Some(v), "patch.kind") {
                    Ok(k) => k,
                    Err(m) => return err(&req.id, "bad_params", m, None),
                };
                fields.push("kind = ?".to_string());
                values.push(Value::Text(kind.as_str().to_string()));
            }
            "durationMinutes" => match v.as_i64() {
                Some(n) if (0..=MAX_LESSON_MINUTES).contains(&n) => {
                    fields.push("duration_minutes = ?".to_string());
                    values.push(Value::Integer(n));
                }
                _ => {
                    return err(
                        &req.id,
                        "bad_params",
                        format!("patch.durationMinutes must be integer in 0..={}", MAX_LESSON_MINUTES),
                        None,
                    )
                }
            },
            "materials" | "instructions" | "strandIds" | "competencyCodes" => {
                let list = match parse_string_array(Some(v)) {
                    Ok(v) => v,
                    Err(m) => return err(&req.id, "bad_params", format!("patch.{} {}", k, m), None),
                };
                let column = match k.as_str() {
                    "materials" => "materials_json",
                    "instructions" => "instructions_json",
                    "strandIds" => "strand_ids_json",
                    _ => "competency_codes_json",
                };
                fields.push(format!("{} = ?", column));
                values.push(Value::Text(json_array_string(&list)));
            }
            _ => return err(&req.id, "bad_params", format!("unknown patch field: {}", k), None),
        }
    }
    if fields.is_empty() {
        return ok(&req.id, json!({ "ok": true }));
    }
    values.push(Value::Text(lesson_id.clone()));
    values.push(Value::Text(activity_id));
    let sql = format!(
        "UPDATE lesson_activities SET {} WHERE lesson_id = ? AND id = ?",
        fields.join(", ")
    );
    if let Err(e) = conn.execute(&sql, params_from_iter(values)) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    let _ = touch_lesson(conn, &lesson_id);
    ok(&req.id, json!({ "ok": true }))
}

fn handle_activities_delete(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let activity_id = match required_str(req, "activityId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match conn.execute(
        "DELETE FROM lesson_activities WHERE lesson_id = ? AND id = ?",
        params![lesson_id, activity_id],
    ) {
        Ok(0) => err(&req.id, "not_found", "activity not found", None),
        Ok(_) => {
            let _ = touch_lesson(conn, &lesson_id);
            ok(&req.id, json!({ "ok": true }))
        }
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_activities_reorder(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = ensure_lesson_exists(conn, req, &lesson_id) {
        return e;
    }
    let provided = match parse_id_order(req, "activityIdOrder") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let resp = apply_reorder(
        conn,
        req,
        "SELECT id FROM lesson_activities WHERE lesson_id = ? ORDER BY sort_order, id",
        "UPDATE lesson_activities SET sort_order = ? WHERE lesson_id = ? AND id = ?",
        &lesson_id,
        provided,
    );
    let _ = touch_lesson(conn, &lesson_id);
    resp
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lessons.list" => Some(handle_lessons_list(state, req)),
        "lessons.open" => Some(handle_lessons_open(state, req)),
        "lessons.create" => Some(handle_lessons_create(state, req)),
        "lessons.update" => Some(handle_lessons_update(state, req)),
        "lessons.archive" => Some(handle_lessons_archive(state, req)),
        "lessons.reorder" => Some(handle_lessons_reorder(state, req)),
        "activities.list" => Some(handle_activities_list(state, req)),
        "activities.create" => Some(handle_activities_create(state, req)),
        "activities.update" => Some(handle_activities_update(state, req)),
        "activities.delete" => Some(handle_activities_delete(state, req)),
        "activities.reorder" => Some(handle_activities_reorder(state, req)),
        _ => None,
    }
}
