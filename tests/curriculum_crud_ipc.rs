mod test_support;

use serde_json::json;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn grade_bands_grades_and_indicators_crud() {
    let workspace = temp_dir("curriculumd-curriculum-crud");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let band = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "gradeBands.create",
        json!({ "input": { "name": "Upper Primary", "description": "Grades 4 to 6" } }),
    );
    let band_id = band
        .get("gradeBandId")
        .and_then(|v| v.as_str())
        .expect("gradeBandId")
        .to_string();

    let missing_band = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "grades.create",
        json!({ "input": { "gradeBandId": "nope", "name": "Grade 4" } }),
    );
    assert_eq!(error_code(&missing_band), "not_found");

    let grade = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "grades.create",
        json!({ "input": { "gradeBandId": band_id, "name": "Grade 4" } }),
    );
    let grade_id = grade
        .get("gradeId")
        .and_then(|v| v.as_str())
        .expect("gradeId")
        .to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.update",
        json!({ "gradeId": grade_id, "patch": { "name": "Grade Four" } }),
    );
    let grades = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "grades.list",
        json!({ "gradeBandId": band_id }),
    );
    let rows = grades
        .get("grades")
        .and_then(|v| v.as_array())
        .expect("grades");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name").and_then(|v| v.as_str()), Some("Grade Four"));
    assert_eq!(rows[0].get("sortOrder").and_then(|v| v.as_i64()), Some(0));

    let unknown_field = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "grades.update",
        json!({ "gradeId": grade_id, "patch": { "colour": "red" } }),
    );
    assert_eq!(error_code(&unknown_field), "bad_params");

    let strand = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "strands.create",
        json!({ "input": { "code": "S1", "name": "Understanding AI" } }),
    );
    let strand_id = strand
        .get("strandId")
        .and_then(|v| v.as_str())
        .expect("strandId")
        .to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "competencies.create",
        json!({ "input": { "code": "TECH.U", "name": "Technique: understand" } }),
    );
    let duplicate = request_err(
        &mut stdin,
        &mut reader,
        "10",
        "competencies.create",
        json!({ "input": { "code": "TECH.U", "name": "Duplicate" } }),
    );
    assert_eq!(error_code(&duplicate), "conflict");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "indicators.create",
        json!({
            "input": {
                "gradeBandId": band_id,
                "strandId": strand_id,
                "competencyCode": "TECH.U",
                "description": "Explains that a model learns from examples."
            }
        }),
    );
    let bad_code = request_err(
        &mut stdin,
        &mut reader,
        "12",
        "indicators.create",
        json!({
            "input": {
                "gradeBandId": band_id,
                "strandId": strand_id,
                "competencyCode": "NOPE.X",
                "description": "Unknown competency"
            }
        }),
    );
    assert_eq!(error_code(&bad_code), "not_found");

    let indicators = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "indicators.list",
        json!({ "strandId": strand_id }),
    );
    let rows = indicators
        .get("indicators")
        .and_then(|v| v.as_array())
        .expect("indicators");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("competencyCode").and_then(|v| v.as_str()),
        Some("TECH.U")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn seed_defaults_is_idempotent() {
    let workspace = temp_dir("curriculumd-seed-defaults");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let no_ws = request_err(&mut stdin, &mut reader, "0", "curriculum.seedDefaults", json!({}));
    assert_eq!(error_code(&no_ws), "no_workspace");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let first = request_ok(&mut stdin, &mut reader, "2", "curriculum.seedDefaults", json!({}));
    assert_eq!(first.pointer("/inserted/gradeBands").and_then(|v| v.as_u64()), Some(4));
    assert_eq!(first.pointer("/inserted/grades").and_then(|v| v.as_u64()), Some(13));
    assert_eq!(first.pointer("/inserted/lessons").and_then(|v| v.as_u64()), Some(4));

    let second = request_ok(&mut stdin, &mut reader, "3", "curriculum.seedDefaults", json!({}));
    assert_eq!(second.pointer("/inserted/grades").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(second.pointer("/inserted/lessons").and_then(|v| v.as_u64()), Some(0));

    let grades = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "grades.list",
        json!({ "gradeBandId": "high-school" }),
    );
    let ids: Vec<&str> = grades
        .get("grades")
        .and_then(|v| v.as_array())
        .expect("grades")
        .iter()
        .filter_map(|g| g.get("id").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(ids, vec!["grade-9", "grade-10", "grade-11", "grade-12"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn renaming_competency_code_follows_into_indicators() {
    let workspace = temp_dir("curriculumd-competency-rename");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "curriculum.seedDefaults", json!({}));
    let competency = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "competencies.create",
        json!({ "input": { "code": "X.1", "name": "Experimental" } }),
    );
    let competency_id = competency
        .get("competencyId")
        .and_then(|v| v.as_str())
        .expect("competencyId")
        .to_string();
    let indicator = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "indicators.create",
        json!({
            "input": {
                "gradeBandId": "middle-school",
                "strandId": "strand-using-ai",
                "competencyCode": "X.1",
                "description": "Uses the experimental competency."
            }
        }),
    );
    let indicator_id = indicator
        .get("indicatorId")
        .and_then(|v| v.as_str())
        .expect("indicatorId")
        .to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "competencies.update",
        json!({ "competencyId": competency_id, "patch": { "code": "Y.1" } }),
    );

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "indicators.list",
        json!({ "gradeBandId": "middle-school", "strandId": "strand-using-ai" }),
    );
    let rows = listed
        .get("indicators")
        .and_then(|v| v.as_array())
        .expect("indicators");
    let renamed = rows
        .iter()
        .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(indicator_id.as_str()))
        .expect("indicator listed");
    assert_eq!(
        renamed.get("competencyCode").and_then(|v| v.as_str()),
        Some("Y.1")
    );
    assert!(rows
        .iter()
        .all(|r| r.get("competencyCode").and_then(|v| v.as_str()) != Some("X.1")));

    // A rename that collides leaves both the competency and its indicators alone.
    let clash = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "competencies.update",
        json!({ "competencyId": competency_id, "patch": { "code": "TECH.U" } }),
    );
    assert_eq!(error_code(&clash), "conflict");
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "indicators.list",
        json!({ "gradeBandId": "middle-school", "strandId": "strand-using-ai" }),
    );
    let still = listed
        .get("indicators")
        .and_then(|v| v.as_array())
        .expect("indicators")
        .iter()
        .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(indicator_id.as_str()))
        .and_then(|r| r.get("competencyCode").and_then(|v| v.as_str()))
        .map(str::to_string);
    assert_eq!(still.as_deref(), Some("Y.1"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
