//! Built-in curriculum.
//!
//! Serves plan generation when no workspace is open and seeds new workspaces
//! through `curriculum.seedDefaults`. Seeded rows use fixed ids so seeding
//! twice is a no-op.

use crate::db;
use crate::generator::{ActivityKind, ActivityTemplate, InMemoryCatalog, LessonEntry};
use rusqlite::{params, Connection};
use std::collections::HashMap;

struct BandSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    grades: &'static [(&'static str, &'static str)],
}

const BANDS: &[BandSeed] = &[
    BandSeed {
        id: "early-years",
        name: "Early Years",
        description: "Kindergarten to Grade 2",
        grades: &[
            ("grade-k", "Kindergarten"),
            ("grade-1", "Grade 1"),
            ("grade-2", "Grade 2"),
        ],
    },
    BandSeed {
        id: "elementary",
        name: "Elementary",
        description: "Grades 3 to 5",
        grades: &[
            ("grade-3", "Grade 3"),
            ("grade-4", "Grade 4"),
            ("grade-5", "Grade 5"),
        ],
    },
    BandSeed {
        id: "middle-school",
        name: "Middle School",
        description: "Grades 6 to 8",
        grades: &[
            ("grade-6", "Grade 6"),
            ("grade-7", "Grade 7"),
            ("grade-8", "Grade 8"),
        ],
    },
    BandSeed {
        id: "high-school",
        name: "High School",
        description: "Grades 9 to 12",
        grades: &[
            ("grade-9", "Grade 9"),
            ("grade-10", "Grade 10"),
            ("grade-11", "Grade 11"),
            ("grade-12", "Grade 12"),
        ],
    },
];

// (id, code, name, description)
const STRANDS: &[(&str, &str, &str, &str)] = &[
    (
        "strand-understanding-ai",
        "UA",
        "Understanding AI",
        "How AI systems learn from data and make predictions.",
    ),
    (
        "strand-using-ai",
        "UU",
        "Using AI",
        "Choosing and using AI tools critically and effectively.",
    ),
    (
        "strand-ai-ethics",
        "AE",
        "AI Ethics",
        "Fairness, privacy, accountability and the social impact of AI.",
    ),
    (
        "strand-creating-ai",
        "CA",
        "Creating with AI",
        "Designing, training and evaluating simple AI systems.",
    ),
];

const COMPETENCY_DIMENSIONS: &[(&str, &str)] = &[
    ("HCM", "Human-centred mindset"),
    ("ETH", "Ethics of AI"),
    ("TECH", "AI techniques and applications"),
    ("DES", "AI system design"),
];

const COMPETENCY_LEVELS: &[(&str, &str)] = &[("U", "Understand"), ("A", "Apply"), ("C", "Create")];

// (id, band, strand, competency code, description)
const INDICATORS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "indicator-ey-ua-1",
        "early-years",
        "strand-understanding-ai",
        "TECH.U",
        "Tells apart a machine that follows fixed rules from one that makes guesses.",
    ),
    (
        "indicator-el-ua-1",
        "elementary",
        "strand-understanding-ai",
        "TECH.U",
        "Explains that AI learns patterns from examples.",
    ),
    (
        "indicator-ms-ae-1",
        "middle-school",
        "strand-ai-ethics",
        "ETH.U",
        "Identifies how unrepresentative training data leads to unfair outcomes.",
    ),
    (
        "indicator-hs-ca-1",
        "high-school",
        "strand-creating-ai",
        "DES.A",
        "Trains, evaluates and documents a simple classifier.",
    ),
];

struct ActivitySeed {
    title: &'static str,
    description: &'static str,
    kind: ActivityKind,
    minutes: u32,
    materials: &'static [&'static str],
    strands: &'static [&'static str],
    competencies: &'static [&'static str],
}

struct LessonSeed {
    id: &'static str,
    grade_id: &'static str,
    title: &'static str,
    summary: &'static str,
    activities: &'static [ActivitySeed],
}

const LESSONS: &[LessonSeed] = &[
    LessonSeed {
        id: "lesson-k-robots-and-rules",
        grade_id: "grade-k",
        title: "Robots Follow Rules",
        summary: "Learners act out a robot that can only follow exact instructions.",
        activities: &[
            ActivitySeed {
                title: "Story time: The Helpful Robot",
                description: "Read a picture book and talk about what the robot could and could not do.",
                kind: ActivityKind::Classroom,
                minutes: 15,
                materials: &["Picture book"],
                strands: &["strand-understanding-ai"],
                competencies: &["TECH.U"],
            },
            ActivitySeed {
                title: "Simon Says Robot",
                description: "Play Simon Says where the robot only moves on exact commands.",
                kind: ActivityKind::Classroom,
                minutes: 10,
                materials: &[],
                strands: &["strand-understanding-ai"],
                competencies: &["TECH.U"],
            },
        ],
    },
    LessonSeed {
        id: "lesson-3-how-computers-learn",
        grade_id: "grade-3",
        title: "How Computers Learn",
        summary: "Learners sort examples to discover how a model learns a pattern.",
        activities: &[
            ActivitySeed {
                title: "Sorting with examples",
                description: "Groups sort animal cards using only labelled examples.",
                kind: ActivityKind::Classroom,
                minutes: 20,
                materials: &["Animal cards"],
                strands: &["strand-understanding-ai"],
                competencies: &["TECH.U"],
            },
            ActivitySeed {
                title: "Exit ticket",
                description: "Three quick questions on learning from examples.",
                kind: ActivityKind::Assessment,
                minutes: 10,
                materials: &[],
                strands: &["strand-understanding-ai"],
                competencies: &["TECH.U"],
            },
        ],
    },
    LessonSeed {
        id: "lesson-7-training-data",
        grade_id: "grade-7",
        title: "What Is Training Data?",
        summary: "Learners examine where training data comes from and what it leaves out.",
        activities: &[ActivitySeed {
            title: "Training data walkthrough",
            description: "Walk through a small labelled dataset and predict what a model would learn from it.",
            kind: ActivityKind::Classroom,
            minutes: 20,
            materials: &["Sample dataset printout"],
            strands: &["strand-understanding-ai", "strand-ai-ethics"],
            competencies: &["TECH.U", "ETH.U"],
        }],
    },
    LessonSeed {
        id: "lesson-10-bias-in-ai",
        grade_id: "grade-10",
        title: "Bias in AI Systems",
        summary: "Learners audit a dataset for bias and propose fixes.",
        activities: &[
            ActivitySeed {
                title: "Bias mini-lecture",
                description: "Short talk with examples of biased automated decisions.",
                kind: ActivityKind::Classroom,
                minutes: 20,
                materials: &["Slide deck"],
                strands: &["strand-ai-ethics"],
                competencies: &["ETH.U"],
            },
            ActivitySeed {
                title: "Dataset audit",
                description: "Teams inspect a public dataset and count who is missing.",
                kind: ActivityKind::Online,
                minutes: 30,
                materials: &[],
                strands: &["strand-ai-ethics", "strand-creating-ai"],
                competencies: &["ETH.A", "DES.U"],
            },
            ActivitySeed {
                title: "Reflection",
                description: "Written reflection on one fix the team would make.",
                kind: ActivityKind::Assessment,
                minutes: 10,
                materials: &[],
                strands: &["strand-ai-ethics"],
                competencies: &["ETH.A"],
            },
        ],
    },
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn activity_id(lesson_id: &str, idx: usize) -> String {
    format!("{}-a{}", lesson_id, idx + 1)
}

fn seed_activities(lesson: &LessonSeed) -> Vec<ActivityTemplate> {
    lesson
        .activities
        .iter()
        .enumerate()
        .map(|(idx, a)| ActivityTemplate {
            id: activity_id(lesson.id, idx),
            title: a.title.to_string(),
            description: a.description.to_string(),
            activity_kind: a.kind,
            base_duration_minutes: a.minutes,
            materials: owned(a.materials),
            instructions: Vec::new(),
            ai_strand_ids: owned(a.strands),
            unesco_competency_codes: owned(a.competencies),
        })
        .collect()
}

pub fn default_catalog() -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    for band in BANDS {
        for (grade_id, name) in band.grades {
            catalog.add_grade(*grade_id, *name, band.id);
        }
    }
    for lesson in LESSONS {
        catalog.add_lesson(LessonEntry {
            id: lesson.id.to_string(),
            grade_id: lesson.grade_id.to_string(),
            title: lesson.title.to_string(),
            base_activities: seed_activities(lesson),
        });
    }
    catalog
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub grade_bands: usize,
    pub grades: usize,
    pub strands: usize,
    pub competencies: usize,
    pub indicators: usize,
    pub lessons: usize,
    pub activities: usize,
}

/// Inserts the built-in curriculum. Existing rows with the same ids are left
/// untouched; counts reflect rows actually inserted.
pub fn seed_workspace(conn: &Connection, ts: &str) -> anyhow::Result<SeedSummary> {
    let tx = conn.unchecked_transaction()?;
    let mut summary = SeedSummary::default();

    for (band_idx, band) in BANDS.iter().enumerate() {
        summary.grade_bands += tx.execute(
            "INSERT OR IGNORE INTO grade_bands(id, name, description, sort_order) VALUES(?, ?, ?, ?)",
            params![band.id, band.name, band.description, band_idx as i64],
        )?;
        for (grade_idx, (grade_id, name)) in band.grades.iter().enumerate() {
            summary.grades += tx.execute(
                "INSERT OR IGNORE INTO grades(id, grade_band_id, name, sort_order) VALUES(?, ?, ?, ?)",
                params![grade_id, band.id, name, grade_idx as i64],
            )?;
        }
    }

    for (idx, (id, code, name, description)) in STRANDS.iter().enumerate() {
        summary.strands += tx.execute(
            "INSERT OR IGNORE INTO ai_strands(id, code, name, description, sort_order) VALUES(?, ?, ?, ?, ?)",
            params![id, code, name, description, idx as i64],
        )?;
    }

    let mut sort_order: i64 = 0;
    for (dim_code, dim_name) in COMPETENCY_DIMENSIONS {
        for (level_code, level_name) in COMPETENCY_LEVELS {
            let code = format!("{}.{}", dim_code, level_code);
            let id = format!("competency-{}", code.to_ascii_lowercase().replace('.', "-"));
            summary.competencies += tx.execute(
                "INSERT OR IGNORE INTO competencies(id, code, name, description, sort_order) VALUES(?, ?, ?, '', ?)",
                params![id, code, format!("{}: {}", dim_name, level_name), sort_order],
            )?;
            sort_order += 1;
        }
    }

    for (idx, (id, band, strand, competency, description)) in INDICATORS.iter().enumerate() {
        summary.indicators += tx.execute(
            "INSERT OR IGNORE INTO indicators(id, grade_band_id, strand_id, competency_code, description, sort_order)
             VALUES(?, ?, ?, ?, ?, ?)",
            params![id, band, strand, competency, description, idx as i64],
        )?;
    }

    let mut next_in_grade: HashMap<&str, i64> = HashMap::new();
    for lesson in LESSONS {
        let slot = next_in_grade.entry(lesson.grade_id).or_insert(0);
        let lesson_order = *slot;
        *slot += 1;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO lessons(id, grade_id, sort_order, title, summary, objectives_json, duration_minutes, archived, created_at, updated_at)
             VALUES(?, ?, ?, ?, ?, '[]', NULL, 0, ?, ?)",
            params![lesson.id, lesson.grade_id, lesson_order, lesson.title, lesson.summary, ts, ts],
        )?;
        summary.lessons += inserted;
        for (idx, a) in seed_activities(lesson).iter().enumerate() {
            summary.activities += tx.execute(
                "INSERT OR IGNORE INTO lesson_activities(
                    id, lesson_id, sort_order, title, description, kind, duration_minutes,
                    materials_json, instructions_json, strand_ids_json, competency_codes_json
                 ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    a.id,
                    lesson.id,
                    idx as i64,
                    a.title,
                    a.description,
                    a.activity_kind.as_str(),
                    a.base_duration_minutes,
                    db::json_array_string(&a.materials),
                    db::json_array_string(&a.instructions),
                    db::json_array_string(&a.ai_strand_ids),
                    db::json_array_string(&a.unesco_competency_codes),
                ],
            )?;
        }
    }

    tx.commit()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{resolve, CurriculumCatalog};

    fn band_of(grade_id: &str) -> Option<&'static str> {
        BANDS
            .iter()
            .find(|b| b.grades.iter().any(|(g, _)| *g == grade_id))
            .map(|b| b.id)
    }

    #[test]
    fn every_seed_lesson_resolves() {
        let catalog = default_catalog();
        for lesson in LESSONS {
            let r = resolve(&catalog, lesson.grade_id, lesson.id).expect("resolves");
            assert_eq!(Some(r.grade.grade_band_id.as_str()), band_of(lesson.grade_id));
            assert!(!r.lesson.base_activities.is_empty());
        }
        assert_eq!(catalog.grade_count(), 13);
        assert!(catalog.grade("grade-12").is_some());
    }

    #[test]
    fn seeding_twice_inserts_once() {
        let dir = std::env::temp_dir().join(format!("curriculumd-seed-{}", uuid::Uuid::new_v4()));
        let conn = db::open_db(&dir).expect("open db");
        let first = seed_workspace(&conn, "0").expect("seed");
        assert_eq!(first.grade_bands, 4);
        assert_eq!(first.competencies, 12);
        assert_eq!(first.lessons, LESSONS.len());
        let second = seed_workspace(&conn, "0").expect("seed again");
        assert_eq!(second, SeedSummary::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn seeded_lesson_order_starts_at_zero_per_grade() {
        let dir = std::env::temp_dir().join(format!("curriculumd-seed-order-{}", uuid::Uuid::new_v4()));
        let conn = db::open_db(&dir).expect("open db");
        seed_workspace(&conn, "0").expect("seed");
        let mut stmt = conn
            .prepare("SELECT grade_id, MIN(sort_order) FROM lessons GROUP BY grade_id")
            .expect("prepare");
        let mins: Vec<(String, i64)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");
        assert_eq!(mins.len(), 4);
        assert!(mins.iter().all(|(_, min)| *min == 0), "{mins:?}");
        drop(stmt);
        drop(conn);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
