use serde::Deserialize;

/// A preset question button in the chat UI.
///
/// Each action expands to a fixed question that runs through the ordinary
/// pipeline, so quick-action turns land in session history like typed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    /// "What do I need to graduate?"
    GraduationRequirements,
    /// Next-year course planning guidance.
    CoursePlanning,
    /// AP vs Honors and general college prep.
    CollegePrep,
    /// Counselor contact information.
    MeetCounselor,
}

impl QuickAction {
    /// The question this action stands for.
    pub fn question(self) -> &'static str {
        match self {
            QuickAction::GraduationRequirements => {
                "What are the graduation requirements at Green Level High School?"
            }
            QuickAction::CoursePlanning => {
                "Help me plan my courses for next year. What should I consider?"
            }
            QuickAction::CollegePrep => {
                "What are some college preparation tips? Tell me about AP vs Honors courses."
            }
            QuickAction::MeetCounselor => {
                "Who are the counselors at Green Level and how can I contact them?"
            }
        }
    }
}
