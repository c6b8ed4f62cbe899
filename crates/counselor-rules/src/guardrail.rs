use counselor_core::{CounselorError, CounselorResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A response template keyed on substrings of the user's greeting, so "how
/// are you" and "what's up" get different replies than a bare "hi".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingReply {
    /// Any of these substrings selects this reply.
    pub contains: Vec<String>,
    /// The canned reply text.
    pub response: String,
}

/// Static guardrail rule tables: trigger phrases and response templates.
///
/// Matching is case-insensitive; trigger phrases are stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    /// Crisis-language substrings. Checked before everything else.
    pub safety_triggers: Vec<String>,
    /// Safety response; `{resources}` is replaced with the resource list.
    pub safety_response: String,
    /// Crisis resources rendered into the safety response.
    pub safety_resources: Vec<String>,
    /// Greeting regex patterns.
    pub greeting_patterns: Vec<String>,
    /// Short messages treated as greetings when they match exactly.
    pub greeting_exact: Vec<String>,
    /// Content-sensitive greeting replies, first match wins.
    pub greeting_replies: Vec<GreetingReply>,
    /// Fallback greeting reply.
    pub default_greeting: String,
    /// Domain vocabulary: any overlap keeps the turn in scope.
    pub domain_vocabulary: Vec<String>,
    /// Explicit school-context phrases that always keep the turn in scope.
    pub school_context: Vec<String>,
    /// Regexes for homework/test/general-knowledge questions.
    pub homework_patterns: Vec<String>,
    /// Clearly unrelated topic keywords.
    pub unrelated_keywords: Vec<String>,
    /// Polite redirect for out-of-scope questions.
    pub out_of_scope_response: String,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            safety_triggers: strings(&[
                "kill myself",
                "suicide",
                "suicidal",
                "self harm",
                "self-harm",
                "hurt myself",
                "end my life",
                "want to die",
                "don't want to live",
                "cutting myself",
            ]),
            safety_response: "It sounds like you're going through something really hard right \
                              now, and I'm glad you reached out. You don't have to deal with \
                              this alone. Please talk to someone who can support you right away:\n\
                              {resources}\n\
                              If you are in immediate danger, call 911. Your school counselors \
                              care about you and are there to help."
                .to_string(),
            safety_resources: strings(&[
                "- 988 Suicide & Crisis Lifeline: call or text 988",
                "- Crisis Text Line: text HOME to 741741",
                "- GLHS Student Services: (919) 694-8700",
            ]),
            greeting_patterns: strings(&[
                r"^\s*(hi|hello|hey|greetings|howdy)\b",
                r"\bwhat'?s\s+up\b",
                r"\bhow\s+are\s+you\b",
                r"\bhow\s+do\s+you\s+do\b",
                r"\bgood\s+(morning|afternoon|evening|day)\b",
                r"\bnice\s+to\s+meet\s+you\b",
                r"\b(hey|hi|hello)\s+there\b",
            ]),
            greeting_exact: strings(&["hi", "hello", "hey", "sup", "yo", "hiya"]),
            greeting_replies: vec![
                GreetingReply {
                    contains: strings(&["how are you", "how do you do"]),
                    response: "I'm doing great, thank you for asking! I'm here to help you \
                               with questions about Green Level High School, course planning, \
                               graduation requirements, college preparation, and academic \
                               counseling. What can I help you with today?"
                        .to_string(),
                },
                GreetingReply {
                    contains: strings(&["what's up", "whats up", "sup"]),
                    response: "Not much! I'm here to help you with anything related to Green \
                               Level High School — courses, graduation requirements, college \
                               prep, scheduling, and more. What's on your mind?"
                        .to_string(),
                },
            ],
            default_greeting: "Hello! I'm the Green Level High School AI counselor. I can help \
                               you with questions about courses, graduation requirements, \
                               college preparation, scheduling, and academic planning. How can \
                               I assist you today?"
                .to_string(),
            domain_vocabulary: strings(&[
                "school",
                "academic",
                "course",
                "class",
                "grade",
                "gpa",
                "credit",
                "graduation",
                "graduate",
                "college",
                "university",
                "counselor",
                "counseling",
                "schedule",
                "curriculum",
                "requirement",
                "prerequisite",
                "honors",
                "ap ",
                "advanced placement",
                "teacher",
                "student",
                "semester",
                "freshman",
                "sophomore",
                "junior",
                "senior",
                "club",
                "extracurricular",
                "scholarship",
                "admission",
                "transcript",
                "diploma",
                "pathway",
                "major",
                "career",
                "dual credit",
                "dual enrollment",
                "wake tech",
                "ccp",
                "career and college promise",
            ]),
            school_context: strings(&[
                "green level",
                "glhs",
                "wcpss",
                "wake county",
                "our school",
                "the school",
                "at school",
                "this school",
            ]),
            homework_patterns: strings(&[
                r"\bwhat\s+is\s+\d+\s*[-+*/x×÷]\s*\d+",
                r"\b\d+\s*[-+*/×÷]\s*\d+\s*(=|\?|$)",
                r"\bsolve\s+(this|that|the|my)\b",
                r"\b(calculate|compute|evaluate)\b",
                r"\bwhat\s+is\s+the\s+answer\s+to\b",
                r"\bhelp\s+me\s+(solve|do)\s+(this|my|the)\s+(homework|assignment|problem)",
                r"\bwhat\s+is\s+(photosynthesis|gravity|evolution|dna|rna)\b",
                r"\bwho\s+(invented|discovered)\b",
                r"\b(capital|president)\s+of\b",
            ]),
            unrelated_keywords: strings(&[
                "weather",
                "recipe",
                "cooking",
                "movie",
                "tv show",
                "celebrity",
                "gossip",
                "politics",
                "dating",
                "shopping",
                "restaurant",
                "vacation",
                "video game",
                "nfl",
                "nba",
                "mlb",
                "trivia",
                "fun fact",
            ]),
            out_of_scope_response: "I'm designed to help with questions about Green Level High \
                                    School, including courses, graduation requirements, college \
                                    preparation, scheduling, and academic planning. I'm not able \
                                    to answer questions outside of these topics. Is there \
                                    something school-related I can help you with instead?"
                .to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// The short-circuit category a turn was classified into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardrailOutcome {
    /// Crisis language: redirect to support resources, never to retrieval.
    Safety(String),
    /// A greeting: reply with the canned greeting.
    Greeting(String),
    /// Clearly off-topic: polite refusal.
    OutOfScope(String),
}

impl GuardrailOutcome {
    /// The response text for this outcome.
    pub fn response(&self) -> &str {
        match self {
            Self::Safety(text) | Self::Greeting(text) | Self::OutOfScope(text) => text,
        }
    }
}

/// Pure classifier over the guardrail rule tables.
///
/// Priority is safety > greeting > out-of-scope > pass-through: crisis
/// language must never be masked by a greeting or a topical match. Never
/// fails at classification time; unmatched input yields `None` and the turn
/// proceeds to retrieval.
pub struct GuardrailClassifier {
    config: GuardrailConfig,
    greeting_res: Vec<Regex>,
    homework_res: Vec<Regex>,
}

impl GuardrailClassifier {
    /// Compile the classifier. An invalid regex in the config is a
    /// [`CounselorError::Config`] and must abort startup.
    pub fn new(config: GuardrailConfig) -> CounselorResult<Self> {
        let compile = |patterns: &[String]| -> CounselorResult<Vec<Regex>> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|e| {
                        CounselorError::Config(format!("Invalid guardrail pattern '{p}': {e}"))
                    })
                })
                .collect()
        };
        let greeting_res = compile(&config.greeting_patterns)?;
        let homework_res = compile(&config.homework_patterns)?;
        Ok(Self {
            config,
            greeting_res,
            homework_res,
        })
    }

    /// Classify raw user text. `None` means pass-through to retrieval.
    pub fn classify(&self, text: &str) -> Option<GuardrailOutcome> {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        if self.is_safety(&lower) {
            let resources = self.config.safety_resources.join("\n");
            let response = self.config.safety_response.replace("{resources}", &resources);
            return Some(GuardrailOutcome::Safety(response));
        }

        if self.is_greeting(&lower) {
            return Some(GuardrailOutcome::Greeting(self.greeting_reply(&lower)));
        }

        if self.is_outside_scope(&lower) {
            return Some(GuardrailOutcome::OutOfScope(
                self.config.out_of_scope_response.clone(),
            ));
        }

        None
    }

    fn is_safety(&self, lower: &str) -> bool {
        self.config.safety_triggers.iter().any(|t| lower.contains(t.as_str()))
    }

    fn is_greeting(&self, lower: &str) -> bool {
        if self.greeting_res.iter().any(|re| re.is_match(lower)) {
            return true;
        }
        lower.split_whitespace().count() <= 3
            && self.config.greeting_exact.iter().any(|g| g == lower)
    }

    fn greeting_reply(&self, lower: &str) -> String {
        for reply in &self.config.greeting_replies {
            if reply.contains.iter().any(|c| lower.contains(c.as_str())) {
                return reply.response.clone();
            }
        }
        self.config.default_greeting.clone()
    }

    fn has_school_context(&self, lower: &str) -> bool {
        self.config.school_context.iter().any(|k| lower.contains(k.as_str()))
    }

    fn has_domain_word(&self, lower: &str) -> bool {
        self.config.domain_vocabulary.iter().any(|k| lower.contains(k.as_str()))
    }

    /// The out-of-scope heuristic, ported from the original classifier.
    /// Deliberately heuristic: edge-case false positives/negatives are
    /// accepted over a heavier NLP approach.
    fn is_outside_scope(&self, lower: &str) -> bool {
        // Explicit school context always keeps the turn in scope.
        if self.has_school_context(lower) {
            return false;
        }

        let has_domain = self.has_domain_word(lower);

        // Homework, arithmetic, and general-knowledge shapes are off-limits
        // unless they lean on domain vocabulary ("when is the math exam").
        if self.homework_res.iter().any(|re| re.is_match(lower)) && !has_domain {
            return true;
        }

        if self
            .config
            .unrelated_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
            && !has_domain
        {
            return true;
        }

        if has_domain {
            return false;
        }

        // Short question-shaped input with no recognizable topic gets the
        // benefit of the doubt and goes to retrieval.
        let words: Vec<&str> = lower.split_whitespace().collect();
        let question_lead = words.first().is_some_and(|w| {
            matches!(
                *w,
                "what" | "what's" | "how" | "when" | "where" | "why" | "which" | "can" | "should"
                    | "do" | "does" | "who"
            )
        });
        if question_lead && words.len() <= 5 {
            return false;
        }

        // No domain overlap and not question-shaped: block it (strict mode).
        true
    }
}
