use mep_core::Evidence;

const SYSTEM_PROMPT: &str = "You are a professional MEP and ISO 14644 Compliance Engineer. \
Provide a high-level technical summary of how regulatory standards apply to the user's query.\n\n\
STRICT RULES:\n\
1. Format your response as 3 BULLET POINTS ONLY.\n\
2. Be extremely concise (MAX 100 WORDS total).\n\
3. Focus on high-level technical implications, not document-level verbosity.";

const BIOMEDICAL_RULE: &str =
    "\n4. Use your scientific expertise to highlight filtration and contamination control priorities.";

const CONTEXT_HEADER: &str = "CONTEXT FROM REGULATORY MANUALS (FDA, WHO, EU GMP):\n";

const CONTEXT_FOOTER: &str = "Use the above regulatory evidence to inform your reasoning. \
If the context is relevant, cite the specific manual and page.\n\n";

/// Builds the compliance-engineer prompt sent for an AI analysis.
#[derive(Debug, Clone)]
pub struct ReasoningPrompt<'a> {
    query: &'a str,
    model: &'a str,
    evidence: &'a [Evidence],
}

impl<'a> ReasoningPrompt<'a> {
    pub fn new(query: &'a str, model: &'a str) -> Self {
        Self {
            query,
            model,
            evidence: &[],
        }
    }

    pub fn with_evidence(mut self, evidence: &'a [Evidence]) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn build(&self) -> String {
        let mut prompt = String::from(SYSTEM_PROMPT);
        if self.model.contains("biomistral") {
            prompt.push_str(BIOMEDICAL_RULE);
        }
        prompt.push_str("\n\n");

        if !self.evidence.is_empty() {
            prompt.push_str(CONTEXT_HEADER);
            for item in self.evidence {
                prompt.push_str(&format!(
                    "[Source: {}, Page: {}] Content: {}\n\n",
                    item.source, item.page, item.content
                ));
            }
            prompt.push_str(CONTEXT_FOOTER);
        }

        prompt.push_str("Question: ");
        prompt.push_str(self.query);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mep_core::PageRef;

    #[test]
    fn plain_prompt_ends_with_question() {
        let prompt = ReasoningPrompt::new("iso 7 ach", "llama3").build();
        assert!(prompt.starts_with("You are a professional MEP"));
        assert!(prompt.ends_with("\n\nQuestion: iso 7 ach"));
        assert!(!prompt.contains("filtration and contamination"));
        assert!(!prompt.contains("CONTEXT FROM REGULATORY MANUALS"));
    }

    #[test]
    fn biomistral_gets_extra_rule() {
        let prompt = ReasoningPrompt::new("q", "biomistral:7b").build();
        assert!(prompt.contains("4. Use your scientific expertise"));
    }

    #[test]
    fn evidence_is_cited() {
        let evidence = vec![Evidence {
            content: "Grade B background".into(),
            source: "EU_GMP_Annex1.pdf".into(),
            page: PageRef::Number(14),
        }];
        let prompt = ReasoningPrompt::new("grade b", "llama3")
            .with_evidence(&evidence)
            .build();
        assert!(prompt.contains(
            "[Source: EU_GMP_Annex1.pdf, Page: 14] Content: Grade B background\n\n"
        ));
        assert!(prompt.contains("cite the specific manual and page"));
        let context = prompt.find("CONTEXT FROM").unwrap();
        let question = prompt.find("Question:").unwrap();
        assert!(context < question);
    }
}
