use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, JsonValue> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn now_ts() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

pub fn parse_bool(v: Option<&JsonValue>, default: bool) -> Result<bool, &'static str> {
    match v {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(v) => v.as_bool().ok_or("must be boolean"),
    }
}

pub fn parse_opt_string(v: Option<&JsonValue>) -> Result<Option<String>, &'static str> {
    match v {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let s = v.as_str().ok_or("must be string or null")?.trim().to_string();
            if s.is_empty() {
                Ok(None)
            } else {
                Ok(Some(s))
            }
        }
    }
}

pub fn parse_opt_i64(v: Option<&JsonValue>) -> Result<Option<i64>, &'static str> {
    match v {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or("must be integer or null"),
    }
}

pub fn parse_string_array(v: Option<&JsonValue>) -> Result<Vec<String>, &'static str> {
    match v {
        None => Ok(Vec::new()),
        Some(v) if v.is_null() => Ok(Vec::new()),
        Some(v) => {
            let arr = v.as_array().ok_or("must be array of strings")?;
            let mut out = Vec::with_capacity(arr.len());
            for item in arr {
                let s = item
                    .as_str()
                    .ok_or("must be array of strings")?
                    .trim()
                    .to_string();
                if !s.is_empty() {
                    out.push(s);
                }
            }
            Ok(out)
        }
    }
}

/// Reads a reorder list: trimmed, de-duplicated, no blanks.
pub fn parse_id_order(req: &Request, key: &str) -> Result<Vec<String>, JsonValue> {
    let Some(ids) = req.params.get(key).and_then(|v| v.as_array()) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    let mut provided: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for v in ids {
        let Some(s) = v.as_str() else {
            return Err(err(&req.id, "bad_params", format!("{} must be strings", key), None));
        };
        let s = s.trim();
        if s.is_empty() {
            return Err(err(
                &req.id,
                "bad_params",
                format!("{} must not contain empty values", key),
                None,
            ));
        }
        if seen.insert(s.to_string()) {
            provided.push(s.to_string());
        }
    }
    Ok(provided)
}

/// Requested ids first, then any remaining ids in their current order.
/// Fails with the first requested id that is not in `existing`.
pub fn merge_order(provided: Vec<String>, existing: Vec<String>) -> Result<Vec<String>, String> {
    let existing_set: HashSet<&String> = existing.iter().collect();
    if let Some(missing) = provided.iter().find(|id| !existing_set.contains(id)) {
        return Err(missing.clone());
    }
    let mut final_order = provided;
    for id in existing {
        if !final_order.contains(&id) {
            final_order.push(id);
        }
    }
    Ok(final_order)
}

/// `sql` must select a single row/column.
pub fn row_exists(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> rusqlite::Result<bool> {
    Ok(conn.query_row(sql, params, |_r| Ok(())).optional()?.is_some())
}

pub fn next_sort_order(conn: &Connection, sql: &str, scope: &str) -> rusqlite::Result<i64> {
    let next: i64 = conn.query_row(sql, [scope], |r| r.get(0))?;
    Ok(next.max(0))
}

pub fn ids_in_order(conn: &Connection, sql: &str, scope: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([scope], |r| r.get::<_, String>(0))?;
    let ids = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_order_appends_unlisted_ids() {
        let out = merge_order(
            vec!["c".into(), "a".into()],
            vec!["a".into(), "b".into(), "c".into()],
        )
        .expect("merged");
        assert_eq!(out, vec!["c", "a", "b"]);
        assert_eq!(
            merge_order(vec!["z".into()], vec!["a".into()]).unwrap_err(),
            "z"
        );
    }
}
