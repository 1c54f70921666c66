use super::{ActivityKind, ActivityTemplate};

const BASELINE_MATERIALS: &[&str] = &["Whiteboard/Projector", "Student worksheets", "Timer"];

fn kind_materials(kind: ActivityKind) -> &'static [&'static str] {
    match kind {
        ActivityKind::Classroom => &["Chart paper", "Markers"],
        ActivityKind::Online => &["Computers/Tablets", "Internet access"],
        ActivityKind::Assessment => &["Assessment rubrics", "Feedback forms"],
        ActivityKind::Project => &["Project planning templates", "Presentation materials"],
    }
}

fn kind_instructions(kind: ActivityKind) -> &'static [&'static str] {
    match kind {
        ActivityKind::Classroom => &[
            "Introduce the activity and its learning goal",
            "Model the task with a worked example",
            "Students work in pairs or small groups",
            "Debrief as a class and record key ideas",
        ],
        ActivityKind::Online => &[
            "Check devices are logged in and the site loads",
            "Demonstrate the tool on the projector",
            "Students complete the task on their devices",
            "Share one finding per group",
        ],
        ActivityKind::Assessment => &[
            "Explain the assessment criteria",
            "Students complete the assessment individually",
            "Collect responses and review against the rubric",
            "Return feedback to students",
        ],
        ActivityKind::Project => &[
            "Present the project brief and success criteria",
            "Teams plan roles and milestones",
            "Teams build and test their work",
            "Teams present and reflect on what they would change",
        ],
    }
}

/// Baseline list first, then the kind-specific additions.
pub fn default_materials(kind: ActivityKind) -> Vec<String> {
    BASELINE_MATERIALS
        .iter()
        .chain(kind_materials(kind))
        .map(|s| s.to_string())
        .collect()
}

pub fn default_instructions(kind: ActivityKind) -> Vec<String> {
    kind_instructions(kind).iter().map(|s| s.to_string()).collect()
}

pub fn fill_missing(activity: &mut ActivityTemplate) {
    if activity.materials.is_empty() {
        activity.materials = default_materials(activity.activity_kind);
    }
    if activity.instructions.is_empty() {
        activity.instructions = default_instructions(activity.activity_kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_present_for_every_kind() {
        for kind in [
            ActivityKind::Classroom,
            ActivityKind::Online,
            ActivityKind::Assessment,
            ActivityKind::Project,
        ] {
            let m = default_materials(kind);
            for b in BASELINE_MATERIALS {
                assert!(m.iter().any(|x| x == b), "{:?} missing {}", kind, b);
            }
            assert!(!default_instructions(kind).is_empty());
        }
        assert!(default_materials(ActivityKind::Online).contains(&"Computers/Tablets".to_string()));
    }

    #[test]
    fn authored_lists_are_kept() {
        let mut a = ActivityTemplate {
            id: "x".into(),
            title: "x".into(),
            description: String::new(),
            activity_kind: ActivityKind::Assessment,
            base_duration_minutes: 10,
            materials: vec!["Sticky notes".into()],
            instructions: Vec::new(),
            ai_strand_ids: Vec::new(),
            unesco_competency_codes: Vec::new(),
        };
        fill_missing(&mut a);
        assert_eq!(a.materials, vec!["Sticky notes".to_string()]);
        assert_eq!(a.instructions, default_instructions(ActivityKind::Assessment));
    }
}
