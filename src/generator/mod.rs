//! Lesson plan generation.
//!
//! A plan is built in one pass: resolve the lesson, optionally backfill
//! supplementary activities, scale durations to the requested budget, fill
//! missing materials/instructions and number the result.

pub mod catalog;
pub mod materials;
pub mod policy;
pub mod scaler;
pub mod selector;
pub mod templates;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use catalog::{resolve, CurriculumCatalog, InMemoryCatalog, LessonEntry};
pub use policy::GeneratorPolicy;
use scaler::PlannedActivity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Classroom,
    Online,
    Assessment,
    Project,
}

impl ActivityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classroom" => Some(Self::Classroom),
            "online" => Some(Self::Online),
            "assessment" => Some(Self::Assessment),
            "project" => Some(Self::Project),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classroom => "classroom",
            Self::Online => "online",
            Self::Assessment => "assessment",
            Self::Project => "project",
        }
    }
}

/// An activity before scaling. Base activities attached to a lesson and the
/// supplementary catalog entries share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub activity_kind: ActivityKind,
    pub base_duration_minutes: u32,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub ai_strand_ids: Vec<String>,
    #[serde(default)]
    pub unesco_competency_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedActivity {
    pub sequence_order: u32,
    #[serde(flatten)]
    pub template: ActivityTemplate,
    pub scaled_duration_minutes: u32,
    pub is_supplied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub grade_id: String,
    pub grade_band_id: String,
    pub lesson_id: String,
    pub lesson_title: String,
    pub requested_duration_minutes: u32,
    pub total_scaled_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub activities: Vec<GeneratedActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub grade_id: String,
    pub lesson_id: String,
    pub requested_duration_minutes: u32,
    pub include_supplementary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("selection incomplete: {reason}")]
    SelectionIncomplete { reason: String },

    #[error("requested duration must be positive, got {0}")]
    InvalidDuration(u32),
}

impl GenerateError {
    pub fn selection_incomplete(reason: impl Into<String>) -> Self {
        Self::SelectionIncomplete {
            reason: reason.into(),
        }
    }
}

pub fn generate<C>(
    catalog: &C,
    supplementary: &[ActivityTemplate],
    policy: &GeneratorPolicy,
    request: &PlanRequest,
) -> Result<LessonPlan, GenerateError>
where
    C: CurriculumCatalog + ?Sized,
{
    generate_at(catalog, supplementary, policy, request, Utc::now())
}

/// Same as [`generate`] with an explicit creation instant.
pub fn generate_at<C>(
    catalog: &C,
    supplementary: &[ActivityTemplate],
    policy: &GeneratorPolicy,
    request: &PlanRequest,
    created_at: DateTime<Utc>,
) -> Result<LessonPlan, GenerateError>
where
    C: CurriculumCatalog + ?Sized,
{
    if request.requested_duration_minutes == 0 {
        return Err(GenerateError::InvalidDuration(
            request.requested_duration_minutes,
        ));
    }
    let resolved = resolve(catalog, &request.grade_id, &request.lesson_id)?;

    let mut planned: Vec<PlannedActivity> = resolved
        .lesson
        .base_activities
        .iter()
        .cloned()
        .map(|template| PlannedActivity {
            template,
            is_supplied: false,
        })
        .collect();

    if request.include_supplementary {
        let base_total: i64 = resolved
            .lesson
            .base_activities
            .iter()
            .map(|a| i64::from(a.base_duration_minutes))
            .sum();
        let remaining = i64::from(request.requested_duration_minutes) - base_total;
        let picked = selector::select(
            supplementary,
            &resolved.grade.grade_band_id,
            remaining,
            resolved.lesson.base_activities.len(),
            policy,
        );
        tracing::debug!(
            remaining_minutes = remaining,
            picked = picked.len(),
            band = %resolved.grade.grade_band_id,
            "supplementary selection"
        );
        planned.extend(picked.into_iter().cloned().map(|template| PlannedActivity {
            template,
            is_supplied: true,
        }));
    }

    let mut activities = scaler::scale(&planned, request.requested_duration_minutes);
    for (idx, activity) in activities.iter_mut().enumerate() {
        materials::fill_missing(&mut activity.template);
        activity.sequence_order = (idx + 1) as u32;
    }
    let total_scaled_minutes = activities.iter().map(|a| a.scaled_duration_minutes).sum();

    Ok(LessonPlan {
        grade_id: resolved.grade.id.clone(),
        grade_band_id: resolved.grade.grade_band_id.clone(),
        lesson_id: resolved.lesson.id.clone(),
        lesson_title: resolved.lesson.title.clone(),
        requested_duration_minutes: request.requested_duration_minutes,
        total_scaled_minutes,
        created_at,
        activities,
    })
}
