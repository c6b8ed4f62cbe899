use counselor_index::Passage;

/// Default system instruction: persona, domain boundary, formatting rules.
///
/// The model is told never to fabricate links; reference links are injected
/// exclusively by the link scorer after generation.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful AI counselor for Green Level High School (GLHS). \
You ONLY answer questions that are DIRECTLY related to Green Level High School: \
courses offered at GLHS, graduation requirements, school policies, schedules, \
clubs, events, counselors, and college preparation guidance.\n\
\n\
CRITICAL RULES:\n\
- DO NOT answer general knowledge questions or solve homework problems\n\
- ONLY use information from the provided context about GLHS\n\
- NEVER invent or include links; reference links are added separately\n\
- If the question is not about GLHS, politely redirect to school-related topics\n\
\n\
Format answers in markdown and put key numbers (credits, GPAs, dates) in bold. \
Be friendly, professional, and accurate. If the context doesn't contain enough \
information, say so politely and suggest what might help. Always be encouraging \
and supportive of students' academic goals.";

/// Assemble the retrieval-augmented user prompt: passage context in
/// descending score order, then the question.
pub fn build_user_prompt(passages: &[Passage], question: &str) -> String {
    let context = passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Context from school documents:\n{context}\n\nQuestion: {question}\n\n\
         Please provide a helpful answer based on the context above."
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use counselor_index::SourceTag;
    use uuid::Uuid;

    fn passage(text: &str, score: f32) -> Passage {
        Passage {
            id: Uuid::new_v4(),
            text: text.to_string(),
            source: SourceTag::Fact,
            score,
        }
    }

    #[test]
    fn test_prompt_orders_context_as_given() {
        let passages = vec![passage("best match", 2.0), passage("second match", 1.0)];
        let prompt = build_user_prompt(&passages, "What clubs exist?");
        let best = prompt.find("best match").unwrap();
        let second = prompt.find("second match").unwrap();
        assert!(best < second);
        assert!(prompt.contains("Question: What clubs exist?"));
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let prompt = build_user_prompt(&[], "Anything?");
        assert!(prompt.starts_with("Context from school documents:\n\n"));
        assert!(prompt.contains("Question: Anything?"));
    }
}
