use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Geographic and temporal bounds of a debate topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssueScope {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub timeframe: String,
}

/// Core stance of each side on the refined issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Positions {
    #[serde(default)]
    pub pro: String,
    #[serde(default)]
    pub con: String,
}

/// The neutral, evaluative framing of a user topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FramedIssue {
    pub refined_issue: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub scope: IssueScope,
    #[serde(default)]
    pub positions: Positions,
    #[serde(default)]
    pub clarification_needed: bool,
}

impl FramedIssue {
    pub fn new(refined_issue: impl Into<String>) -> Self {
        Self {
            refined_issue: refined_issue.into(),
            ..Default::default()
        }
    }

    pub fn with_positions(mut self, pro: impl Into<String>, con: impl Into<String>) -> Self {
        self.positions = Positions {
            pro: pro.into(),
            con: con.into(),
        };
        self
    }

    pub fn with_scope(mut self, country: impl Into<String>, timeframe: impl Into<String>) -> Self {
        self.scope = IssueScope {
            country: country.into(),
            timeframe: timeframe.into(),
        };
        self
    }

    /// A draft is usable once it names a non-blank question.
    pub fn is_usable(&self) -> bool {
        !self.refined_issue.trim().is_empty()
    }
}

/// Reply of one refinement cycle: a chat message plus the updated draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IssueRefinement {
    pub message: String,
    pub draft: FramedIssue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_draft_deserializes() {
        let issue: FramedIssue =
            serde_json::from_str(r#"{"refined_issue":"Should X be banned?"}"#).unwrap();
        assert_eq!(issue.refined_issue, "Should X be banned?");
        assert!(issue.positions.pro.is_empty());
        assert!(!issue.clarification_needed);
    }

    #[test]
    fn test_is_usable() {
        assert!(FramedIssue::new("Should X be banned?").is_usable());
        assert!(!FramedIssue::new("   ").is_usable());
    }
}
