use std::collections::HashMap;

use super::{ActivityTemplate, GenerateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeEntry {
    pub id: String,
    pub name: String,
    pub grade_band_id: String,
    pub lesson_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonEntry {
    pub id: String,
    pub grade_id: String,
    pub title: String,
    pub base_activities: Vec<ActivityTemplate>,
}

/// Read-only view over grades and the lessons filed under them.
pub trait CurriculumCatalog {
    fn grade(&self, grade_id: &str) -> Option<&GradeEntry>;

    /// Only returns lessons listed under `grade_id`.
    fn lesson(&self, grade_id: &str, lesson_id: &str) -> Option<&LessonEntry>;
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedLesson<'a> {
    pub grade: &'a GradeEntry,
    pub lesson: &'a LessonEntry,
}

pub fn resolve<'a, C>(
    catalog: &'a C,
    grade_id: &str,
    lesson_id: &str,
) -> Result<ResolvedLesson<'a>, GenerateError>
where
    C: CurriculumCatalog + ?Sized,
{
    let grade_id = grade_id.trim();
    let lesson_id = lesson_id.trim();
    if grade_id.is_empty() {
        return Err(GenerateError::selection_incomplete("gradeId is required"));
    }
    if lesson_id.is_empty() {
        return Err(GenerateError::selection_incomplete("lessonId is required"));
    }
    let grade = catalog
        .grade(grade_id)
        .ok_or_else(|| GenerateError::selection_incomplete(format!("grade {grade_id} not found")))?;
    let lesson = catalog.lesson(grade_id, lesson_id).ok_or_else(|| {
        GenerateError::selection_incomplete(format!(
            "lesson {lesson_id} not found under grade {grade_id}"
        ))
    })?;
    Ok(ResolvedLesson { grade, lesson })
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    grades: HashMap<String, GradeEntry>,
    lessons: HashMap<String, LessonEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_grade(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        grade_band_id: impl Into<String>,
    ) {
        let id = id.into();
        self.grades.insert(
            id.clone(),
            GradeEntry {
                id,
                name: name.into(),
                grade_band_id: grade_band_id.into(),
                lesson_ids: Vec::new(),
            },
        );
    }

    /// Files the lesson under its grade. Returns false when the grade is unknown.
    pub fn add_lesson(&mut self, lesson: LessonEntry) -> bool {
        let Some(grade) = self.grades.get_mut(&lesson.grade_id) else {
            return false;
        };
        if !grade.lesson_ids.contains(&lesson.id) {
            grade.lesson_ids.push(lesson.id.clone());
        }
        self.lessons.insert(lesson.id.clone(), lesson);
        true
    }

    pub fn grade_count(&self) -> usize {
        self.grades.len()
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }
}

impl CurriculumCatalog for InMemoryCatalog {
    fn grade(&self, grade_id: &str) -> Option<&GradeEntry> {
        self.grades.get(grade_id)
    }

    fn lesson(&self, grade_id: &str, lesson_id: &str) -> Option<&LessonEntry> {
        let grade = self.grades.get(grade_id)?;
        if !grade.lesson_ids.iter().any(|id| id == lesson_id) {
            return None;
        }
        self.lessons
            .get(lesson_id)
            .filter(|lesson| lesson.grade_id == grade_id)
    }
}
