//! Composite search results: local standards hits, regulatory evidence,
//! and the prompt to request an AI analysis.

use serde::Serialize;
use std::fmt::Write as _;

use crate::html::{escape, truncate_chars};
use crate::{Evidence, StandardsMatch};

/// Local hits shown in the first tier.
pub const LOCAL_RESULT_LIMIT: usize = 5;

/// Characters of each evidence snippet shown inline.
pub const EVIDENCE_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPanel {
    pub query: String,
    pub local: Vec<StandardsMatch>,
    pub evidence: Vec<Evidence>,
    pub llm_online: bool,
    pub model: String,
}

impl SearchPanel {
    pub fn new(
        query: impl Into<String>,
        mut local: Vec<StandardsMatch>,
        evidence: Vec<Evidence>,
        llm_online: bool,
        model: impl Into<String>,
    ) -> Self {
        local.truncate(LOCAL_RESULT_LIMIT);
        Self {
            query: query.into(),
            local,
            evidence,
            llm_online,
            model: model.into(),
        }
    }

    pub fn render_html(&self) -> String {
        let mut html = String::new();

        if !self.local.is_empty() {
            html.push_str(r#"<div class="search-category-header">Local Standards Reference</div>"#);
            for (index, hit) in self.local.iter().enumerate() {
                let _ = write!(
                    html,
                    r#"<div class="result-item" data-index="{index}"><span class="insight-tag">LOCAL EXPERT: {}</span><p>{}</p></div>"#,
                    escape(&hit.path),
                    escape(&hit.value)
                );
            }
        }

        if !self.evidence.is_empty() {
            html.push_str(
                r#"<div class="search-category-header">Regulatory Manual Evidence (RAG)</div>"#,
            );
            for item in &self.evidence {
                let _ = write!(
                    html,
                    r#"<div class="result-item evidence"><span class="insight-tag">{} (Pg {})</span><p>"{}..."</p></div>"#,
                    escape(&item.source),
                    escape(&item.page.to_string()),
                    escape(truncate_chars(&item.content, EVIDENCE_PREVIEW_CHARS))
                );
            }
        }

        let prompt = if self.llm_online {
            format!(
                "Generate a technical breakdown using {}.",
                escape(&self.model.to_uppercase())
            )
        } else {
            "LLM is currently Busy/Offline. You can still try to trigger an analysis.".to_string()
        };
        let _ = write!(
            html,
            r#"<div class="result-item ai-analysis"><span class="insight-tag">AI ENGINEERING ANALYSIS</span><p>{prompt}</p><button class="primary-btn mini" data-query="{}" data-online="{}">Generate Deep AI Insight</button></div>"#,
            escape(&self.query),
            self.llm_online
        );

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{standards, PageRef};

    #[test]
    fn local_tier_is_capped() {
        let hits = standards::search("a");
        assert!(hits.len() > LOCAL_RESULT_LIMIT);
        let panel = SearchPanel::new("a", hits, Vec::new(), false, "biomistral");
        assert_eq!(panel.local.len(), LOCAL_RESULT_LIMIT);
        assert_eq!(panel.render_html().matches("LOCAL EXPERT").count(), LOCAL_RESULT_LIMIT);
    }

    #[test]
    fn evidence_is_previewed_and_escaped() {
        let evidence = vec![Evidence {
            content: format!("<grade A>{}", "x".repeat(400)),
            source: "EU_GMP_Annex1.pdf".into(),
            page: PageRef::Number(9),
        }];
        let panel = SearchPanel::new("grade a", Vec::new(), evidence, true, "biomistral");
        let html = panel.render_html();
        assert!(html.contains("Regulatory Manual Evidence"));
        assert!(html.contains("EU_GMP_Annex1.pdf (Pg 9)"));
        assert!(html.contains("&lt;grade A&gt;"));
        assert!(!html.contains(&"x".repeat(300)));
        assert!(html.contains("using BIOMISTRAL"));
    }

    #[test]
    fn analysis_tier_is_always_present() {
        let panel = SearchPanel::new("nothing", Vec::new(), Vec::new(), false, "m");
        let html = panel.render_html();
        assert!(!html.contains("Local Standards Reference"));
        assert!(html.contains("Busy/Offline"));
        assert!(html.contains(r#"data-query="nothing""#));
    }
}
