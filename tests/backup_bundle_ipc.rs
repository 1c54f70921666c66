mod test_support;

use serde_json::json;
use std::fs::File;
use std::io::Read;
use test_support::{error_code, request_err, request_ok, spawn_sidecar, temp_dir};

fn lesson_titles(result: &serde_json::Value) -> Vec<String> {
    result
        .get("lessons")
        .and_then(|v| v.as_array())
        .expect("lessons")
        .iter()
        .filter_map(|l| l.get("title").and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

#[test]
fn export_then_import_restores_workspace() {
    let workspace = temp_dir("curriculumd-backup-ws");
    let out_dir = temp_dir("curriculumd-backup-out");
    let bundle = out_dir.join("workspace.curriculum.zip");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let no_ws = request_err(
        &mut stdin,
        &mut reader,
        "0",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(error_code(&no_ws), "no_workspace");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "curriculum.seedDefaults", json!({}));

    let export = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(
        export.get("bundleFormat").and_then(|v| v.as_str()),
        Some("curriculum-workspace-v1")
    );
    let digest = export
        .get("dbSha256")
        .and_then(|v| v.as_str())
        .expect("dbSha256")
        .to_string();
    assert_eq!(digest.len(), 64);

    let mut archive = zip::ZipArchive::new(File::open(&bundle).expect("open bundle")).expect("zip");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    let manifest: serde_json::Value = serde_json::from_str(&manifest).expect("manifest json");
    assert_eq!(
        manifest.get("dbSha256").and_then(|v| v.as_str()),
        Some(digest.as_str())
    );
    archive.by_name("db/curriculum.sqlite3").expect("db entry");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "lessons.create",
        json!({ "gradeId": "grade-7", "input": { "title": "Added after export" } }),
    );
    let before = request_ok(&mut stdin, &mut reader, "5", "lessons.list", json!({ "gradeId": "grade-7" }));
    assert_eq!(lesson_titles(&before).len(), 2);

    let import = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "backup.importWorkspaceBundle",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(
        import.get("bundleFormatDetected").and_then(|v| v.as_str()),
        Some("curriculum-workspace-v1")
    );
    let after = request_ok(&mut stdin, &mut reader, "7", "lessons.list", json!({ "gradeId": "grade-7" }));
    assert_eq!(lesson_titles(&after), vec!["What Is Training Data?".to_string()]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn rejected_import_keeps_workspace_open() {
    let workspace = temp_dir("curriculumd-backup-reject");
    let junk = workspace.join("not-a-bundle.zip");
    std::fs::write(&junk, b"plain text, not a zip").expect("write junk");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "curriculum.seedDefaults", json!({}));

    let failed = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "backup.importWorkspaceBundle",
        json!({ "inPath": junk.to_string_lossy() }),
    );
    assert_eq!(error_code(&failed), "io_failed");
    let missing = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "backup.importWorkspaceBundle",
        json!({ "inPath": workspace.join("missing.zip").to_string_lossy() }),
    );
    assert_eq!(error_code(&missing), "not_found");

    let listed = request_ok(&mut stdin, &mut reader, "5", "lessons.list", json!({ "gradeId": "grade-7" }));
    assert_eq!(lesson_titles(&listed).len(), 1);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
