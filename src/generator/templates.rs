//! Supplementary activity catalog.
//!
//! Content, not configuration: entries are edited here. Declaration order is
//! the scan order used when packing.

use super::{ActivityKind, ActivityTemplate};

struct TemplateSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    kind: ActivityKind,
    minutes: u32,
    materials: &'static [&'static str],
    instructions: &'static [&'static str],
    strands: &'static [&'static str],
    competencies: &'static [&'static str],
}

const CATALOG: &[TemplateSeed] = &[
    TemplateSeed {
        id: "pattern-recognition-game",
        title: "Pattern Recognition Game",
        description: "Learners sort picture cards into groups and explain the rule they found, the way a model learns from examples.",
        kind: ActivityKind::Classroom,
        minutes: 20,
        materials: &["Picture cards", "Sorting mats"],
        instructions: &[
            "Show a small set of sorted cards and ask what the rule is",
            "Hand out mixed cards to pairs",
            "Pairs sort the cards and name their rule",
            "Share rules and discuss cards that were hard to place",
        ],
        strands: &["strand-understanding-ai"],
        competencies: &["TECH.U"],
    },
    TemplateSeed {
        id: "algorithm-unplugged-dance",
        title: "Algorithm Dance",
        description: "Learners write a sequence of movement steps and follow each other's instructions exactly.",
        kind: ActivityKind::Classroom,
        minutes: 15,
        materials: &["Step cards", "Open floor space"],
        instructions: &[],
        strands: &["strand-understanding-ai"],
        competencies: &["TECH.U"],
    },
    TemplateSeed {
        id: "ai-video-analysis",
        title: "Spot the AI: Video Analysis",
        description: "Watch a short clip of everyday technology and identify where a computer is making a guess.",
        kind: ActivityKind::Online,
        minutes: 25,
        materials: &[],
        instructions: &[
            "Play the clip once without stopping",
            "Replay and pause at each device shown",
            "Ask whether the device is following a rule or making a guess",
            "Record answers on a class chart",
        ],
        strands: &["strand-using-ai"],
        competencies: &["HCM.U"],
    },
    TemplateSeed {
        id: "chatbot-conversation-lab",
        title: "Chatbot Conversation Lab",
        description: "Learners test a classroom chatbot with prepared questions and log where its answers are wrong or vague.",
        kind: ActivityKind::Online,
        minutes: 30,
        materials: &[],
        instructions: &[],
        strands: &["strand-using-ai", "strand-ai-ethics"],
        competencies: &["TECH.A", "ETH.U"],
    },
    TemplateSeed {
        id: "ai-ethics-case-study",
        title: "AI Ethics Case Study",
        description: "Small groups analyse a real case of an automated decision and argue who was affected and who is responsible.",
        kind: ActivityKind::Classroom,
        minutes: 35,
        materials: &["Case study handout"],
        instructions: &[
            "Read the case individually",
            "List every stakeholder in the case",
            "Discuss in groups who benefits and who is harmed",
            "Each group presents a recommendation",
        ],
        strands: &["strand-ai-ethics"],
        competencies: &["ETH.A", "HCM.A"],
    },
    TemplateSeed {
        id: "data-detectives-survey",
        title: "Data Detectives Survey",
        description: "The class designs a short survey, collects responses and looks for patterns and gaps in the data.",
        kind: ActivityKind::Project,
        minutes: 40,
        materials: &[],
        instructions: &[],
        strands: &["strand-understanding-ai", "strand-creating-ai"],
        competencies: &["TECH.A", "DES.U"],
    },
    TemplateSeed {
        id: "image-classifier-training",
        title: "Train an Image Classifier",
        description: "Learners train a browser-based classifier on their own photos and test it with tricky examples.",
        kind: ActivityKind::Online,
        minutes: 30,
        materials: &["Computers/Tablets", "Webcam", "Internet access"],
        instructions: &[
            "Collect ten photos for each of two classes",
            "Train the model and record its accuracy",
            "Test with images that mix both classes",
            "Explain one mistake the model made",
        ],
        strands: &["strand-creating-ai"],
        competencies: &["DES.A", "TECH.A"],
    },
    TemplateSeed {
        id: "ai-exit-ticket-quiz",
        title: "AI Exit Ticket",
        description: "A five-question check on the key ideas from the lesson.",
        kind: ActivityKind::Assessment,
        minutes: 15,
        materials: &[],
        instructions: &[],
        strands: &["strand-understanding-ai"],
        competencies: &["TECH.U"],
    },
    TemplateSeed {
        id: "ai-research-presentation",
        title: "AI Research Presentation",
        description: "Multi-week project: teams research an AI application in their community and present findings.",
        kind: ActivityKind::Project,
        minutes: 60,
        materials: &["Research guide", "Presentation software"],
        instructions: &[
            "Choose an AI application used locally",
            "Gather sources and interview a user",
            "Prepare a presentation with evidence",
            "Present and answer questions",
        ],
        strands: &["strand-using-ai", "strand-ai-ethics"],
        competencies: &["HCM.C", "ETH.C"],
    },
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn supplementary_catalog() -> Vec<ActivityTemplate> {
    CATALOG
        .iter()
        .map(|t| ActivityTemplate {
            id: t.id.to_string(),
            title: t.title.to_string(),
            description: t.description.to_string(),
            activity_kind: t.kind,
            base_duration_minutes: t.minutes,
            materials: owned(t.materials),
            instructions: owned(t.instructions),
            ai_strand_ids: owned(t.strands),
            unesco_competency_codes: owned(t.competencies),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique_and_durations_positive() {
        let all = supplementary_catalog();
        let ids: HashSet<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
        assert!(all.iter().all(|t| t.base_duration_minutes > 0));
    }
}
