use crate::db;
use crate::generator::policy::GeneratorPolicy;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const MIN_LESSON_MINUTES: i64 = 15;
pub const MAX_LESSON_MINUTES: i64 = 480;

#[derive(Clone, Copy, Debug)]
enum SetupSection {
    Generator,
    Planner,
}

impl SetupSection {
    const ALL: [SetupSection; 2] = [Self::Generator, Self::Planner];

    fn parse(s: &str) -> Option<Self> {
        match s {
            "generator" => Some(Self::Generator),
            "planner" => Some(Self::Planner),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Planner => "planner",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Generator => "setup.generator",
            Self::Planner => "setup.planner",
        }
    }
}

/// Planner-side defaults applied when a generate request omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerDefaults {
    pub default_duration_minutes: u32,
    pub include_supplementary_by_default: bool,
}

impl Default for PlannerDefaults {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
            include_supplementary_by_default: true,
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Generator => {
            let p = GeneratorPolicy::default();
            json!({
                "activationRemainingMinutes": p.activation_remaining_minutes,
                "activationMinActivities": p.activation_min_activities,
                "toleranceMinutes": p.tolerance_minutes,
                "maxSupplementary": p.max_supplementary
            })
        }
        SetupSection::Planner => {
            let p = PlannerDefaults::default();
            json!({
                "defaultDurationMinutes": p.default_duration_minutes,
                "includeSupplementaryByDefault": p.include_supplementary_by_default
            })
        }
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn parse_bool(v: &Value, key: &str) -> Result<bool, String> {
    v.as_bool().ok_or_else(|| format!("{} must be boolean", key))
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Generator => match k.as_str() {
                "activationRemainingMinutes" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 240)?));
                }
                "activationMinActivities" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 20)?));
                }
                "toleranceMinutes" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 120)?));
                }
                "maxSupplementary" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 20)?));
                }
                _ => return Err(format!("unknown generator field: {}", k)),
            },
            SetupSection::Planner => match k.as_str() {
                "defaultDurationMinutes" => {
                    obj.insert(
                        k.clone(),
                        Value::from(parse_i64_range(
                            v,
                            k,
                            MIN_LESSON_MINUTES,
                            MAX_LESSON_MINUTES,
                        )?),
                    );
                }
                "includeSupplementaryByDefault" => {
                    obj.insert(k.clone(), Value::Bool(parse_bool(v, k)?));
                }
                _ => return Err(format!("unknown planner field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            if let Err(msg) = merge_section_patch(section, &mut current, saved_obj) {
                // Keep whatever merged cleanly; the rest stays at defaults.
                tracing::warn!(section = section.name(), error = %msg, "ignoring invalid saved setting");
            }
        }
    }
    Ok(current)
}

fn load_typed<T>(conn: Option<&Connection>, section: SetupSection) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(conn) = conn else {
        return T::default();
    };
    let value = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(section = section.name(), error = %e, "setup load failed, using defaults");
            return T::default();
        }
    };
    match serde_json::from_value(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(section = section.name(), error = %e, "setup decode failed, using defaults");
            T::default()
        }
    }
}

/// Effective generator thresholds; built-in defaults without a workspace.
pub fn load_generator_policy(conn: Option<&Connection>) -> GeneratorPolicy {
    load_typed(conn, SetupSection::Generator)
}

pub fn load_planner_defaults(conn: Option<&Connection>) -> PlannerDefaults {
    load_typed(conn, SetupSection::Planner)
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let mut out = Map::new();
    for section in SetupSection::ALL {
        match load_section(conn, section) {
            Ok(v) => {
                out.insert(section.name().to_string(), v);
            }
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        }
    }
    ok(&req.id, Value::Object(out))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    tracing::info!(section = section.name(), "setup section updated");
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_decode_into_typed_settings() {
        let policy: GeneratorPolicy =
            serde_json::from_value(default_section(SetupSection::Generator)).expect("policy");
        assert_eq!(policy, GeneratorPolicy::default());
        let planner: PlannerDefaults =
            serde_json::from_value(default_section(SetupSection::Planner)).expect("planner");
        assert_eq!(planner, PlannerDefaults::default());
    }

    #[test]
    fn patch_rejects_unknown_and_out_of_range() {
        let mut current = default_section(SetupSection::Planner);
        let bad = json!({ "defaultDurationMinutes": 5 });
        assert!(merge_section_patch(
            SetupSection::Planner,
            &mut current,
            bad.as_object().expect("object")
        )
        .is_err());
        let unknown = json!({ "colour": "blue" });
        assert!(merge_section_patch(
            SetupSection::Generator,
            &mut current,
            unknown.as_object().expect("object")
        )
        .is_err());
    }

    #[test]
    fn no_workspace_uses_builtin_defaults() {
        assert_eq!(load_generator_policy(None), GeneratorPolicy::default());
        assert_eq!(load_planner_defaults(None).default_duration_minutes, 60);
    }
}
