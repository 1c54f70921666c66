//! Materializes the generator's catalog view from a workspace.

use crate::db::parse_json_array_string;
use crate::generator::{ActivityKind, ActivityTemplate, InMemoryCatalog, LessonEntry};
use rusqlite::{Connection, OptionalExtension};

pub fn load_activities(conn: &Connection, lesson_id: &str) -> anyhow::Result<Vec<ActivityTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, kind, duration_minutes, materials_json, instructions_json, strand_ids_json, competency_codes_json
         FROM lesson_activities
         WHERE lesson_id = ?
         ORDER BY sort_order, id",
    )?;
    let rows = stmt.query_map([lesson_id], |r| {
        let id: String = r.get(0)?;
        let kind_raw: String = r.get(3)?;
        let activity_kind = ActivityKind::parse(&kind_raw).unwrap_or_else(|| {
            tracing::warn!(activity = %id, kind = %kind_raw, "unknown activity kind, treating as classroom");
            ActivityKind::Classroom
        });
        Ok(ActivityTemplate {
            id,
            title: r.get(1)?,
            description: r.get(2)?,
            activity_kind,
            base_duration_minutes: r.get(4)?,
            materials: parse_json_array_string(&r.get::<_, String>(5)?),
            instructions: parse_json_array_string(&r.get::<_, String>(6)?),
            ai_strand_ids: parse_json_array_string(&r.get::<_, String>(7)?),
            unesco_competency_codes: parse_json_array_string(&r.get::<_, String>(8)?),
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Loads one grade and its unarchived lessons. An unknown grade yields an
/// empty catalog, which the generator reports as an incomplete selection.
pub fn load_grade_snapshot(conn: &Connection, grade_id: &str) -> anyhow::Result<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::new();
    let grade = conn
        .query_row(
            "SELECT name, grade_band_id FROM grades WHERE id = ?",
            [grade_id],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((name, grade_band_id)) = grade else {
        return Ok(catalog);
    };
    catalog.add_grade(grade_id, name, grade_band_id);

    let mut stmt = conn.prepare(
        "SELECT id, title FROM lessons
         WHERE grade_id = ? AND archived = 0
         ORDER BY sort_order, id",
    )?;
    let lessons = stmt
        .query_map([grade_id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    for (lesson_id, title) in lessons {
        let base_activities = load_activities(conn, &lesson_id)?;
        catalog.add_lesson(LessonEntry {
            id: lesson_id,
            grade_id: grade_id.to_string(),
            title,
            base_activities,
        });
    }
    Ok(catalog)
}
