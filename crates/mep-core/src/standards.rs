//! Built-in regulatory reference: a small, ordered, read-only tree of
//! standards text, plus substring search and failure-mode insights over it.

use once_cell::sync::Lazy;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Path separator used when reporting where a match lives in the tree.
pub const PATH_SEPARATOR: &str = " > ";

/// Section holding the failure-mode explanations used by insight cards.
pub const FAILURE_MODES: &str = "Failure_Modes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandardsNode {
    Text(&'static str),
    Section(Vec<(&'static str, StandardsNode)>),
}

impl StandardsNode {
    pub fn child(&self, key: &str) -> Option<&StandardsNode> {
        match self {
            StandardsNode::Section(children) => children
                .iter()
                .find(|(k, _)| k.trim() == key)
                .map(|(_, node)| node),
            StandardsNode::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&'static str> {
        match self {
            StandardsNode::Text(t) => Some(t),
            StandardsNode::Section(_) => None,
        }
    }
}

impl Serialize for StandardsNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StandardsNode::Text(text) => serializer.serialize_str(text),
            StandardsNode::Section(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, node) in children {
                    map.serialize_entry(key.trim(), node)?;
                }
                map.end()
            }
        }
    }
}

/// A leaf whose key or text contains the query.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StandardsMatch {
    pub key: String,
    pub value: String,
    /// Ancestor keys joined by [`PATH_SEPARATOR`]
    pub path: String,
}

/// Engineering explanation for a failure category.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailureInsight {
    pub kind: String,
    pub title: String,
    pub explanation: String,
    pub regulatory_ref: Option<String>,
    pub action: String,
}

fn section(children: Vec<(&'static str, StandardsNode)>) -> StandardsNode {
    StandardsNode::Section(children)
}

fn text(t: &'static str) -> StandardsNode {
    StandardsNode::Text(t)
}

static STANDARDS_DB: Lazy<StandardsNode> = Lazy::new(|| {
    section(vec![
        (
            "ISO_14644",
            section(vec![
                ("General", text("ISO 14644-1 is the primary standard for Cleanrooms and associated controlled environments. Part 1 covers classification of air cleanliness by particle concentration.")),
                (
                    "Part_1",
                    section(vec![
                        ("ISO_5", text("Maximum concentration of 3,520 particles/m³ (≥0.5µm). Equivalent to Class 100. Typical for sterile filling or surgical suites.")),
                        ("ISO_7", text("Maximum concentration of 352,000 particles/m³ (≥0.5µm). Equivalent to Class 10,000. Typical for life science prep areas.")),
                        ("ISO_8", text("Maximum concentration of 3,520,000 particles/m³ (≥0.5µm). Equivalent to Class 100,000. General laboratory prep.")),
                    ]),
                ),
                (
                    "Part_3",
                    section(vec![
                        ("Airflow_Test", text("Verification that the air system is providing the required airflow rate and uniformity (HEPA filter face velocity).")),
                        ("Pressure_Diff", text("Requirement for pressure differentials between rooms to prevent cross-contamination. Positive pressure for sterile (min 10-15 Pa), Negative for containment (min -15 to -30 Pa).")),
                    ]),
                ),
            ]),
        ),
        (
            "BS_EN_12469",
            section(vec![
                ("Title", text("Biotechnology - Performance criteria for microbiological safety cabinets.")),
                ("Requirement", text("Ensures operator and environment protection for BSL-2 and BSL-3 labs. Requires specific inflow and downflow velocities.")),
            ]),
        ),
        (
            FAILURE_MODES,
            section(vec![
                (
                    "Low_ACH",
                    section(vec![
                        ("Explanation", text("Air Changes per Hour (ACH) are below standard. This increases the time needed to 'clean up' contaminants after an event.")),
                        ("Regulatory_Ref", text("ISO 14644-3 / GMP Annex 1")),
                        ("Action", text("Check fan static pressure, terminal unit damper positions, or HEPA filter loading.")),
                    ]),
                ),
                (
                    "Low_Pressure",
                    section(vec![
                        ("Explanation", text("Pressure differential is insufficient to maintain the design hygiene envelope.")),
                        ("Regulatory_Ref", text("ISO 14644-1 / BSRIA BG 65")),
                        ("Action", text("Validate room airtightness, check door seals, and verify supply/exhaust balance.")),
                    ]),
                ),
                (
                    "Negative_Pressure_Fail",
                    section(vec![
                        ("Explanation", text("Required negative pressure for bio-containment (BSL-3) is not maintained, risking aerosol escape.")),
                        ("Regulatory_Ref", text("ACDP / BS EN 12128")),
                        ("Action", text("IMMEDIATE ACTION REQUIRED. Inspect exhaust fan redundancy and secondary containment seals.")),
                    ]),
                ),
            ]),
        ),
    ])
});

/// The bundled standards tree.
pub fn standards_db() -> &'static StandardsNode {
    &STANDARDS_DB
}

/// Depth-first, case-insensitive substring search over keys and leaf text.
pub fn search(query: &str) -> Vec<StandardsMatch> {
    search_in(standards_db(), query)
}

pub fn search_in(root: &StandardsNode, query: &str) -> Vec<StandardsMatch> {
    let needle = query.trim().to_lowercase();
    let mut hits = Vec::new();
    if needle.is_empty() {
        return hits;
    }
    let mut trail: Vec<&str> = Vec::new();
    walk(root, &needle, &mut trail, &mut hits);
    hits
}

fn walk<'a>(
    node: &'a StandardsNode,
    needle: &str,
    trail: &mut Vec<&'a str>,
    hits: &mut Vec<StandardsMatch>,
) {
    let StandardsNode::Section(children) = node else {
        return;
    };
    for (key, child) in children {
        let key = key.trim();
        match child {
            StandardsNode::Section(_) => {
                trail.push(key);
                walk(child, needle, trail, hits);
                trail.pop();
            }
            StandardsNode::Text(value) => {
                if value.to_lowercase().contains(needle) || key.to_lowercase().contains(needle) {
                    hits.push(StandardsMatch {
                        key: key.to_string(),
                        value: value.to_string(),
                        path: trail.join(PATH_SEPARATOR),
                    });
                }
            }
        }
    }
}

/// Look up the insight card for a failure category such as `Low_ACH`.
pub fn failure_insight(kind: &str) -> Option<FailureInsight> {
    let entry = standards_db().child(FAILURE_MODES)?.child(kind)?;
    Some(FailureInsight {
        kind: kind.to_string(),
        title: kind.replace('_', " "),
        explanation: entry.child("Explanation")?.text()?.to_string(),
        regulatory_ref: entry
            .child("Regulatory_Ref")
            .and_then(StandardsNode::text)
            .map(str::to_string),
        action: entry.child("Action")?.text()?.to_string(),
    })
}
