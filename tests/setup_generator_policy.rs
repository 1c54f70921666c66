mod test_support;

use serde_json::json;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn setup_defaults_and_validation() {
    let workspace = temp_dir("curriculumd-setup-defaults");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let setup = request_ok(&mut stdin, &mut reader, "2", "setup.get", json!({}));
    assert_eq!(
        setup.pointer("/generator/activationRemainingMinutes").and_then(|v| v.as_i64()),
        Some(15)
    );
    assert_eq!(
        setup.pointer("/generator/activationMinActivities").and_then(|v| v.as_i64()),
        Some(2)
    );
    assert_eq!(
        setup.pointer("/generator/toleranceMinutes").and_then(|v| v.as_i64()),
        Some(10)
    );
    assert_eq!(
        setup.pointer("/generator/maxSupplementary").and_then(|v| v.as_i64()),
        Some(3)
    );
    assert_eq!(
        setup.pointer("/planner/defaultDurationMinutes").and_then(|v| v.as_i64()),
        Some(60)
    );

    let unknown_section = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "setup.update",
        json!({ "section": "printer", "patch": {} }),
    );
    assert_eq!(error_code(&unknown_section), "bad_params");
    let out_of_range = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "setup.update",
        json!({ "section": "planner", "patch": { "defaultDurationMinutes": 600 } }),
    );
    assert_eq!(error_code(&out_of_range), "bad_params");
    let unknown_field = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "setup.update",
        json!({ "section": "generator", "patch": { "strategy": "best-fit" } }),
    );
    assert_eq!(error_code(&unknown_field), "bad_params");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn saved_settings_drive_generation() {
    let workspace = temp_dir("curriculumd-setup-generation");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "curriculum.seedDefaults", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "setup.update",
        json!({ "section": "generator", "patch": { "maxSupplementary": 1 } }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "setup.update",
        json!({ "section": "planner", "patch": { "defaultDurationMinutes": 90 } }),
    );

    let plan = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "lessonPlan.generate",
        json!({ "gradeId": "grade-7", "lessonId": "lesson-7-training-data" }),
    );
    assert_eq!(
        plan.pointer("/plan/requestedDurationMinutes").and_then(|v| v.as_u64()),
        Some(90)
    );
    let acts = plan
        .pointer("/plan/activities")
        .and_then(|v| v.as_array())
        .expect("activities");
    assert_eq!(acts.len(), 2);
    assert_eq!(
        acts[1].get("id").and_then(|v| v.as_str()),
        Some("pattern-recognition-game")
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "setup.update",
        json!({ "section": "planner", "patch": { "includeSupplementaryByDefault": false } }),
    );
    let plan = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "lessonPlan.generate",
        json!({ "gradeId": "grade-7", "lessonId": "lesson-7-training-data" }),
    );
    let acts = plan
        .pointer("/plan/activities")
        .and_then(|v| v.as_array())
        .expect("activities");
    assert_eq!(acts.len(), 1);
    assert_eq!(
        acts[0].get("scaledDurationMinutes").and_then(|v| v.as_u64()),
        Some(90)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
