use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One of the six fixed evidence categories research is partitioned into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum Sector {
    Statistics,
    PublicOpinion,
    DomesticCases,
    InternationalCases,
    Theories,
    Stakeholders,
}

impl Sector {
    pub const ALL: [Sector; 6] = [
        Sector::Statistics,
        Sector::PublicOpinion,
        Sector::DomesticCases,
        Sector::InternationalCases,
        Sector::Theories,
        Sector::Stakeholders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statistics => "Statistics",
            Self::PublicOpinion => "PublicOpinion",
            Self::DomesticCases => "DomesticCases",
            Self::InternationalCases => "InternationalCases",
            Self::Theories => "Theories",
            Self::Stakeholders => "Stakeholders",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sector| sector.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownSector(s.to_string()))
    }

    /// Three-letter tag used in evidence ids.
    ///
    /// Statistics and Stakeholders share a first syllable, so Stakeholders
    /// gets `STK` to keep ids unique across the board.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Statistics => "STA",
            Self::PublicOpinion => "PUB",
            Self::DomesticCases => "DOM",
            Self::InternationalCases => "INT",
            Self::Theories => "THE",
            Self::Stakeholders => "STK",
        }
    }

    /// Maximum number of items kept for this sector after the quality gate.
    pub fn target_count(&self) -> usize {
        match self {
            Self::Statistics | Self::PublicOpinion => 10,
            Self::DomesticCases | Self::Theories => 5,
            Self::InternationalCases => 3,
            Self::Stakeholders => 6,
        }
    }

    /// Sectors whose search concept is broadened before research.
    pub fn generalizes_topic(&self) -> bool {
        matches!(
            self,
            Self::Statistics | Self::DomesticCases | Self::InternationalCases | Self::Theories
        )
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Research progress of a single sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SectorStatus {
    #[default]
    Pending,
    Loading,
    Completed,
    Error,
}

impl SectorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Loading => "loading",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Pending moves to loading, loading settles; a settled sector never moves.
    pub fn can_advance_to(&self, next: SectorStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Loading)
                | (Self::Loading, Self::Completed)
                | (Self::Loading, Self::Error)
        )
    }
}

/// Reputation tier of the publishing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum SourceTier {
    /// Government, international organisations, academic journals.
    Tier1,
    /// Major legacy media and established think tanks.
    Tier2,
    /// Minor press, op-eds, corporate PR.
    #[default]
    Tier3,
}

impl SourceTier {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tier1" | "1" => Ok(Self::Tier1),
            "tier2" | "2" => Ok(Self::Tier2),
            "tier3" | "3" => Ok(Self::Tier3),
            _ => Err(CoreError::UnknownSourceTier(s.to_string())),
        }
    }
}

/// How directly the evidence measures the concept under debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum OperationalFit {
    Direct,
    Proxy,
    #[default]
    Weak,
}

impl OperationalFit {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "proxy" => Ok(Self::Proxy),
            "weak" => Ok(Self::Weak),
            _ => Err(CoreError::UnknownOperationalFit(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum StakeholderType {
    Benefit,
    Loss,
}

impl StakeholderType {
    pub fn headline_prefix(&self) -> &'static str {
        match self {
            Self::Benefit => "[Gain] ",
            Self::Loss => "[Loss] ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliabilityLevel {
    High,
    Medium,
    Low,
}

impl ReliabilityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::High,
            60..=79 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// The four InfoQ axis values an evidence score is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoQBreakdown {
    pub resolution: u8,
    pub temporal: u8,
    pub reliability: u8,
    pub context: u8,
}

/// Three-axis summary shown alongside an evidence card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub objectivity: u8,
    pub relevance: u8,
    pub significance: u8,
}

/// A scored, curated piece of evidence on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub content: String,
    pub detail: String,
    pub sector: Sector,
    pub source_summary: String,
    pub reliability: ReliabilityLevel,
    pub url: String,
    pub score: u8,
    pub score_breakdown: ScoreBreakdown,
    pub info_q: InfoQBreakdown,
    pub stakeholder_type: Option<StakeholderType>,
}

/// Evidence as extracted by the research model, before scoring.
///
/// Field names are kept short on the wire to save tokens in long
/// search-grounded responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvidence {
    #[serde(rename = "c")]
    pub headline: String,
    #[serde(rename = "d", default)]
    pub detail: String,
    #[serde(rename = "src", default)]
    pub source: String,
    #[serde(rename = "u", default)]
    pub url: String,
    #[serde(default)]
    pub pub_year: Option<i32>,
    #[serde(default)]
    pub source_tier: SourceTier,
    #[serde(default)]
    pub has_stats: bool,
    #[serde(default)]
    pub op_fit: OperationalFit,
    #[serde(default)]
    pub st_type: Option<StakeholderType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_parse() {
        assert_eq!(Sector::parse("Theories").unwrap(), Sector::Theories);
        assert_eq!(Sector::parse("publicopinion").unwrap(), Sector::PublicOpinion);
        assert!(Sector::parse("Economics").is_err());
    }

    #[test]
    fn test_id_prefixes_are_unique() {
        let mut prefixes: Vec<_> = Sector::ALL.iter().map(|s| s.id_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), Sector::ALL.len());
    }

    #[test]
    fn test_sector_status_never_regresses() {
        assert!(SectorStatus::Pending.can_advance_to(SectorStatus::Loading));
        assert!(SectorStatus::Loading.can_advance_to(SectorStatus::Completed));
        assert!(!SectorStatus::Completed.can_advance_to(SectorStatus::Loading));
        assert!(!SectorStatus::Completed.can_advance_to(SectorStatus::Pending));
        assert!(!SectorStatus::Pending.can_advance_to(SectorStatus::Completed));
    }

    #[test]
    fn test_reliability_level_thresholds() {
        assert_eq!(ReliabilityLevel::from_score(100), ReliabilityLevel::High);
        assert_eq!(ReliabilityLevel::from_score(80), ReliabilityLevel::High);
        assert_eq!(ReliabilityLevel::from_score(79), ReliabilityLevel::Medium);
        assert_eq!(ReliabilityLevel::from_score(60), ReliabilityLevel::Medium);
        assert_eq!(ReliabilityLevel::from_score(59), ReliabilityLevel::Low);
    }

    #[test]
    fn test_raw_evidence_wire_names() {
        let raw: RawEvidence = serde_json::from_str(
            r#"{"c":"Rents up","d":"Rents rose **4%**","src":"Stats Office","u":"https://stats.example.org/r","pub_year":2024,"source_tier":"Tier1","has_stats":true,"op_fit":"Direct","st_type":null}"#,
        )
        .unwrap();
        assert_eq!(raw.headline, "Rents up");
        assert_eq!(raw.source_tier, SourceTier::Tier1);
        assert_eq!(raw.op_fit, OperationalFit::Direct);
        assert_eq!(raw.pub_year, Some(2024));
        assert!(raw.st_type.is_none());
    }
}
