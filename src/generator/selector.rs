use super::{ActivityTemplate, GeneratorPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandEligibility {
    AllowList(&'static [&'static str]),
    DenyList(&'static [&'static str]),
    AllowAll,
}

impl BandEligibility {
    pub fn permits(&self, template_id: &str) -> bool {
        match self {
            Self::AllowList(ids) => ids.contains(&template_id),
            Self::DenyList(ids) => !ids.contains(&template_id),
            Self::AllowAll => true,
        }
    }
}

/// Pattern games, movement-based algorithms and simple video analysis only.
pub const EARLY_YEARS_ALLOWED: &[&str] = &[
    "pattern-recognition-game",
    "algorithm-unplugged-dance",
    "ai-video-analysis",
];

/// Abstract ethics case studies and multi-week research projects.
pub const ELEMENTARY_DENIED: &[&str] = &["ai-ethics-case-study", "ai-research-presentation"];

const BAND_ELIGIBILITY: &[(&str, BandEligibility)] = &[
    ("early-years", BandEligibility::AllowList(EARLY_YEARS_ALLOWED)),
    ("elementary", BandEligibility::DenyList(ELEMENTARY_DENIED)),
    ("middle-school", BandEligibility::AllowAll),
    ("high-school", BandEligibility::AllowAll),
];

/// Unmapped bands fall back to allow-all.
pub fn eligibility_for(grade_band_id: &str) -> BandEligibility {
    BAND_ELIGIBILITY
        .iter()
        .find(|(band, _)| *band == grade_band_id)
        .map(|(_, rule)| *rule)
        .unwrap_or(BandEligibility::AllowAll)
}

/// Greedy first-fit over eligible templates in catalog order.
pub fn select<'a>(
    templates: &'a [ActivityTemplate],
    grade_band_id: &str,
    remaining_minutes: i64,
    base_count: usize,
    policy: &GeneratorPolicy,
) -> Vec<&'a ActivityTemplate> {
    if !policy.should_supplement(remaining_minutes, base_count) {
        return Vec::new();
    }
    let rule = eligibility_for(grade_band_id);
    let limit = policy.packing_limit(remaining_minutes);

    let mut accepted = Vec::new();
    let mut time_used: i64 = 0;
    for template in templates.iter().filter(|t| rule.permits(&t.id)) {
        if accepted.len() >= policy.max_supplementary {
            break;
        }
        let minutes = i64::from(template.base_duration_minutes);
        if time_used + minutes <= limit {
            time_used += minutes;
            accepted.push(template);
        }
    }
    accepted
}
