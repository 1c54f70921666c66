use super::{ActivityTemplate, GeneratedActivity};

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedActivity {
    pub template: ActivityTemplate,
    pub is_supplied: bool,
}

/// `base * target / source`, rounded half up in integer arithmetic.
///
/// A zero source total keeps the nominal duration; the plan total will then
/// not match the target.
pub fn scaled_minutes(base: u32, source_total: u64, target_total_minutes: u32) -> u32 {
    if source_total == 0 {
        return base;
    }
    let numerator = 2 * u128::from(base) * u128::from(target_total_minutes) + u128::from(source_total);
    let scaled = numerator / (2 * u128::from(source_total));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Each duration is rounded on its own (half rounds up), so the plan total
/// can drift from the target by at most one minute per activity beyond the first.
pub fn scale(activities: &[PlannedActivity], target_total_minutes: u32) -> Vec<GeneratedActivity> {
    let source_total: u64 = activities
        .iter()
        .map(|a| u64::from(a.template.base_duration_minutes))
        .sum();

    activities
        .iter()
        .enumerate()
        .map(|(idx, a)| GeneratedActivity {
            sequence_order: (idx + 1) as u32,
            template: a.template.clone(),
            scaled_duration_minutes: scaled_minutes(
                a.template.base_duration_minutes,
                source_total,
                target_total_minutes,
            ),
            is_supplied: a.is_supplied,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ActivityKind;
    use proptest::prelude::*;

    fn planned(minutes: u32) -> PlannedActivity {
        PlannedActivity {
            template: ActivityTemplate {
                id: format!("a{minutes}"),
                title: String::new(),
                description: String::new(),
                activity_kind: ActivityKind::Classroom,
                base_duration_minutes: minutes,
                materials: Vec::new(),
                instructions: Vec::new(),
                ai_strand_ids: Vec::new(),
                unesco_competency_codes: Vec::new(),
            },
            is_supplied: false,
        }
    }

    #[test]
    fn zero_source_keeps_nominal_durations() {
        let input = vec![planned(0), planned(0)];
        let out = scale(&input, 90);
        assert!(out.iter().all(|a| a.scaled_duration_minutes == 0));
        assert!(scale(&[], 60).is_empty());
        assert_eq!(scaled_minutes(0, 0, 60), 0);
    }

    #[test]
    fn half_minutes_round_up() {
        // 3 * (5/2) = 7.5 -> 8
        let out = scale(&[planned(3), planned(1)], 10);
        assert_eq!(out[0].scaled_duration_minutes, 8);
        assert_eq!(out[1].scaled_duration_minutes, 3);
    }

    #[test]
    fn exact_halves_round_up_without_float_drift() {
        // 7 * 61 / 14 = 30.5 exactly
        let out = scale(&[planned(7), planned(7)], 61);
        let scaled: Vec<u32> = out.iter().map(|a| a.scaled_duration_minutes).collect();
        assert_eq!(scaled, vec![31, 31]);
        // 1 * 45 / 6 = 7.5, 5 * 45 / 6 = 37.5
        let out = scale(&[planned(1), planned(5)], 45);
        let scaled: Vec<u32> = out.iter().map(|a| a.scaled_duration_minutes).collect();
        assert_eq!(scaled, vec![8, 38]);
    }

    #[test]
    fn input_is_not_touched() {
        let input = vec![planned(10), planned(30)];
        let before = input.clone();
        let out = scale(&input, 20);
        assert_eq!(input, before);
        assert_eq!(out[0].template.base_duration_minutes, 10);
        assert_eq!(out[0].scaled_duration_minutes, 5);
        assert_eq!(out[1].scaled_duration_minutes, 15);
        assert_eq!(out[1].sequence_order, 2);
    }

    proptest! {
        #[test]
        fn scaled_sum_within_rounding_slack(
            durations in prop::collection::vec(1u32..=240, 1..12),
            target in 1u32..=480,
        ) {
            let input: Vec<PlannedActivity> = durations.iter().copied().map(planned).collect();
            let out = scale(&input, target);
            let total: i64 = out.iter().map(|a| i64::from(a.scaled_duration_minutes)).sum();
            let slack = (input.len() as i64 - 1).max(0);
            prop_assert!((total - i64::from(target)).abs() <= slack,
                "total {} target {} n {}", total, target, input.len());
        }
    }
}
