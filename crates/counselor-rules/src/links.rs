use serde::{Deserialize, Serialize};

/// A trigger phrase with its score contribution.
///
/// Single keywords carry low weights; multi-word discriminating phrases carry
/// high ones, biasing the scorer toward specific intent over generic mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseWeight {
    /// The phrase, matched case-insensitively as a substring.
    pub text: String,
    /// Score contributed when the phrase is present.
    pub weight: u32,
}

/// One link category: trigger phrases, a minimum-score gate, and the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRule {
    /// Category label, unique within the table.
    pub category: String,
    /// Display title for the markdown link.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Minimum phrase-weight sum before the link may be attached.
    pub min_score: u32,
    /// The trigger phrase set.
    pub phrases: Vec<PhraseWeight>,
}

impl LinkRule {
    /// The built-in link-rule table.
    ///
    /// Narrowly-scoped categories gate at 10 so a bare "Wake Tech" mention
    /// never attaches a link; the club directory is broad and attaches on any
    /// clear club mention.
    pub fn default_rules() -> Vec<LinkRule> {
        vec![
            LinkRule {
                category: "club_directory".to_string(),
                title: "GLHS Club Directory".to_string(),
                url: "https://glhs.wcpss.net/student-life/clubs".to_string(),
                min_score: 5,
                phrases: phrases(&[
                    ("club", 5),
                    ("club directory", 10),
                    ("extracurricular", 5),
                    ("student organizations", 8),
                    ("after school activities", 8),
                ]),
            },
            LinkRule {
                category: "wake_tech_eligibility".to_string(),
                title: "Wake Tech CCP Eligibility Requirements".to_string(),
                url: "https://www.waketech.edu/programs-courses/non-degree/ccp/eligibility"
                    .to_string(),
                min_score: 10,
                phrases: phrases(&[
                    ("eligibility requirements", 10),
                    ("eligibility", 5),
                    ("eligible", 4),
                    ("qualify for", 4),
                    ("career and college promise", 10),
                    ("ccp", 5),
                    ("wake tech", 3),
                ]),
            },
            LinkRule {
                category: "dual_credit".to_string(),
                title: "Wake Tech Dual Enrollment Guide".to_string(),
                url: "https://www.waketech.edu/programs-courses/non-degree/ccp".to_string(),
                min_score: 10,
                phrases: phrases(&[
                    ("dual credit", 10),
                    ("dual enrollment", 10),
                    ("college credit in high school", 10),
                    ("college credit", 5),
                    ("wake tech", 3),
                ]),
            },
            LinkRule {
                category: "wake_tech_faq".to_string(),
                title: "Wake Tech CCP FAQ".to_string(),
                url: "https://www.waketech.edu/programs-courses/non-degree/ccp/faq".to_string(),
                min_score: 10,
                phrases: phrases(&[
                    ("faq", 10),
                    ("frequently asked", 10),
                    ("how do i enroll", 8),
                    ("how do i apply", 8),
                    ("application process", 6),
                    ("wake tech", 3),
                ]),
            },
            LinkRule {
                category: "operating_procedures".to_string(),
                title: "CCP Operating Procedures".to_string(),
                url: "https://www.waketech.edu/programs-courses/non-degree/ccp/procedures"
                    .to_string(),
                min_score: 10,
                phrases: phrases(&[
                    ("operating procedures", 10),
                    ("drop a class", 8),
                    ("withdraw from", 6),
                    ("registration process", 8),
                    ("add a class", 8),
                    ("wake tech", 3),
                ]),
            },
        ]
    }
}

fn phrases(items: &[(&str, u32)]) -> Vec<PhraseWeight> {
    items
        .iter()
        .map(|(text, weight)| PhraseWeight {
            text: (*text).to_string(),
            weight: *weight,
        })
        .collect()
}

/// A qualifying link recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHit {
    /// The winning rule's category.
    pub category: String,
    /// Link display title.
    pub title: String,
    /// Link target.
    pub url: String,
    /// The phrase-weight sum that qualified it.
    pub score: u32,
}

impl LinkHit {
    /// Render the hit as a markdown link.
    pub fn to_markdown(&self) -> String {
        format!("[{}]({})", self.title, self.url)
    }
}

/// Scores (question, answer) pairs against the link-rule table.
///
/// Pure: at most one link per answer, and only when the winning rule's score
/// meets its gate. Ties at equal score prefer the rule whose longest matched
/// phrase is longer — the more specific category wins.
pub struct LinkScorer {
    rules: Vec<LinkRule>,
}

impl LinkScorer {
    /// Build a scorer over a rule table.
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    /// Score the question and generated answer, returning the single
    /// qualifying link, if any.
    pub fn score(&self, question: &str, answer: &str) -> Option<LinkHit> {
        let haystack = format!("{} {}", question.to_lowercase(), answer.to_lowercase());

        let mut best: Option<(u32, usize, &LinkRule)> = None;
        for rule in &self.rules {
            let mut score = 0u32;
            let mut longest = 0usize;
            for phrase in &rule.phrases {
                if haystack.contains(&phrase.text) {
                    score += phrase.weight;
                    longest = longest.max(phrase.text.len());
                }
            }
            if score == 0 || score < rule.min_score {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_score, best_longest, _)) => {
                    score > *best_score || (score == *best_score && longest > *best_longest)
                }
            };
            if better {
                best = Some((score, longest, rule));
            }
        }

        best.map(|(score, _, rule)| LinkHit {
            category: rule.category.clone(),
            title: rule.title.clone(),
            url: rule.url.clone(),
            score,
        })
    }
}
