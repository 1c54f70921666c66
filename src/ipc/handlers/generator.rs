use crate::defaults;
use crate::generator::{self, selector, templates, GenerateError, InMemoryCatalog, PlanRequest};
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup::{
    load_generator_policy, load_planner_defaults, MAX_LESSON_MINUTES, MIN_LESSON_MINUTES,
};
use crate::ipc::helpers::{parse_bool, parse_opt_i64, parse_opt_string};
use crate::ipc::types::{AppState, Request};
use crate::snapshot;
use serde_json::{json, Value as JsonValue};

fn handle_templates_list(_state: &mut AppState, req: &Request) -> JsonValue {
    let band = match parse_opt_string(req.params.get("gradeBandId")) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("gradeBandId {}", m), None),
    };
    let rule = band.as_deref().map(selector::eligibility_for);

    let mut out = Vec::new();
    for template in templates::supplementary_catalog() {
        let eligible = rule.map(|r| r.permits(&template.id)).unwrap_or(true);
        let mut entry = match serde_json::to_value(&template) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "internal", e.to_string(), None),
        };
        if let Some(obj) = entry.as_object_mut() {
            obj.insert("eligible".into(), JsonValue::Bool(eligible));
        }
        out.push(entry);
    }
    ok(
        &req.id,
        json!({
            "gradeBandId": band,
            "templates": out
        }),
    )
}

fn raw_id(req: &Request, key: &str) -> String {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn handle_generate(state: &mut AppState, req: &Request) -> JsonValue {
    let conn = state.db.as_ref();
    let planner = load_planner_defaults(conn);
    let policy = load_generator_policy(conn);

    let duration = match parse_opt_i64(req.params.get("durationMinutes")) {
        Ok(Some(v)) => v,
        Ok(None) => i64::from(planner.default_duration_minutes),
        Err(m) => return err(&req.id, "bad_params", format!("durationMinutes {}", m), None),
    };
    if !(MIN_LESSON_MINUTES..=MAX_LESSON_MINUTES).contains(&duration) {
        return err(
            &req.id,
            "bad_params",
            format!(
                "durationMinutes must be in {}..={}",
                MIN_LESSON_MINUTES, MAX_LESSON_MINUTES
            ),
            Some(json!({ "durationMinutes": duration })),
        );
    }
    let include_supplementary = match parse_bool(
        req.params.get("includeSupplementary"),
        planner.include_supplementary_by_default,
    ) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", format!("includeSupplementary {}", m), None),
    };

    let request = PlanRequest {
        grade_id: raw_id(req, "gradeId"),
        lesson_id: raw_id(req, "lessonId"),
        // Range-checked above.
        requested_duration_minutes: duration as u32,
        include_supplementary,
    };

    let (catalog, source): (InMemoryCatalog, &str) = match conn {
        Some(conn) if !request.grade_id.is_empty() => {
            match snapshot::load_grade_snapshot(conn, &request.grade_id) {
                Ok(c) => (c, "workspace"),
                Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
            }
        }
        Some(_) => (InMemoryCatalog::new(), "workspace"),
        None => (defaults::default_catalog(), "defaults"),
    };
    tracing::debug!(
        grades = catalog.grade_count(),
        lessons = catalog.lesson_count(),
        source,
        "catalog loaded"
    );
    let supplementary = templates::supplementary_catalog();

    match generator::generate(&catalog, &supplementary, &policy, &request) {
        Ok(plan) => {
            let supplied = plan.activities.iter().filter(|a| a.is_supplied).count();
            tracing::info!(
                grade = %plan.grade_id,
                lesson = %plan.lesson_id,
                base = plan.activities.len() - supplied,
                supplied,
                total_minutes = plan.total_scaled_minutes,
                source,
                "lesson plan generated"
            );
            match serde_json::to_value(&plan) {
                Ok(v) => ok(&req.id, json!({ "plan": v, "source": source })),
                Err(e) => err(&req.id, "internal", e.to_string(), None),
            }
        }
        Err(GenerateError::SelectionIncomplete { reason }) => {
            tracing::info!(%reason, "lesson plan rejected");
            err(&req.id, "selection_incomplete", reason, None)
        }
        Err(e @ GenerateError::InvalidDuration(_)) => err(&req.id, "bad_params", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "generator.templates.list" => Some(handle_templates_list(state, req)),
        "lessonPlan.generate" => Some(handle_generate(state, req)),
        _ => None,
    }
}
