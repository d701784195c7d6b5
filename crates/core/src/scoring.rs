//! InfoQ evidence scoring.
//!
//! Each evidence item is rated on four axes (resolution, temporal,
//! reliability, context) from metadata the research model extracts. The
//! final score is the geometric mean of the axes. Two sectors carry a hard
//! requirement: Statistics must have verified numbers and Theories must come
//! from an authoritative source. A failed requirement zeroes the axis, which
//! drags the whole mean below the keep threshold.

use url::Url;

use crate::domain::{
    EvidenceItem, InfoQBreakdown, OperationalFit, RawEvidence, ReliabilityLevel, ScoreBreakdown,
    Sector, SourceTier,
};

/// Items scoring below this are dropped.
pub const MIN_EVIDENCE_SCORE: u8 = 60;

/// Detail text must be longer than this many characters.
pub const MIN_DETAIL_CHARS: usize = 10;

const AXIS_FLOOR: u8 = 40;

/// Raw signals the score is computed from.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceSignals<'a> {
    pub has_stats: bool,
    pub detail: &'a str,
    pub pub_year: Option<i32>,
    pub source_tier: SourceTier,
    pub op_fit: OperationalFit,
}

impl<'a> From<&'a RawEvidence> for EvidenceSignals<'a> {
    fn from(raw: &'a RawEvidence) -> Self {
        Self {
            has_stats: raw.has_stats,
            detail: &raw.detail,
            pub_year: raw.pub_year,
            source_tier: raw.source_tier,
            op_fit: raw.op_fit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoQScore {
    pub score: u8,
    pub info_q: InfoQBreakdown,
    pub breakdown: ScoreBreakdown,
}

/// 100 when claimed stats are backed by a digit in the detail text, 50 when
/// the claim cannot be verified, 40 for qualitative evidence.
pub fn resolution_score(has_stats: bool, detail: &str) -> u8 {
    let verified = detail.chars().any(|c| c.is_ascii_digit());
    match (has_stats, verified) {
        (true, true) => 100,
        (true, false) => 50,
        (false, _) => AXIS_FLOOR,
    }
}

pub fn temporal_score(pub_year: Option<i32>, current_year: i32) -> u8 {
    let Some(year) = pub_year else {
        return AXIS_FLOOR;
    };
    let age = current_year.saturating_sub(year);
    if age <= 1 {
        100
    } else if age <= 3 {
        90
    } else if age <= 5 {
        80
    } else {
        let decayed = 80i32.saturating_sub((age - 5).saturating_mul(5));
        decayed.max(i32::from(AXIS_FLOOR)) as u8
    }
}

pub fn reliability_score(tier: SourceTier) -> u8 {
    match tier {
        SourceTier::Tier1 => 100,
        SourceTier::Tier2 => 80,
        SourceTier::Tier3 => AXIS_FLOOR,
    }
}

pub fn context_score(fit: OperationalFit) -> u8 {
    match fit {
        OperationalFit::Direct => 100,
        OperationalFit::Proxy => 70,
        OperationalFit::Weak => AXIS_FLOOR,
    }
}

/// Scores one item. Pure: identical inputs always yield the same score.
pub fn score(signals: &EvidenceSignals<'_>, sector: Sector, current_year: i32) -> InfoQScore {
    let mut resolution = resolution_score(signals.has_stats, signals.detail);
    let temporal = temporal_score(signals.pub_year, current_year);
    let mut reliability = reliability_score(signals.source_tier);
    let context = context_score(signals.op_fit);

    // Statistics need verified numbers and theories an authoritative source.
    if sector == Sector::Statistics && resolution < 80 {
        resolution = 0;
    }
    if sector == Sector::Theories && reliability < 80 {
        reliability = 0;
    }

    let product = [resolution, temporal, reliability, context]
        .iter()
        .map(|axis| f64::from((*axis).max(1)))
        .product::<f64>();
    let score = product.powf(0.25).round().clamp(0.0, 100.0) as u8;

    InfoQScore {
        score,
        info_q: InfoQBreakdown {
            resolution,
            temporal,
            reliability,
            context,
        },
        breakdown: ScoreBreakdown {
            objectivity: ((u16::from(reliability) + u16::from(resolution)) as f64 / 2.0).round()
                as u8,
            relevance: context,
            significance: temporal,
        },
    }
}

/// Turns raw research output into scored evidence items.
///
/// Ids follow generation order (`EV-STA-01`, `EV-STA-02`, ...) so an item
/// keeps its id whether or not its neighbours survive the quality gate.
pub fn expand_evidence(raw: &[RawEvidence], sector: Sector, current_year: i32) -> Vec<EvidenceItem> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| {
            let scored = score(&EvidenceSignals::from(item), sector, current_year);
            let content = match (sector, item.st_type) {
                (Sector::Stakeholders, Some(kind)) => {
                    format!("{}{}", kind.headline_prefix(), item.headline)
                }
                _ => item.headline.clone(),
            };

            EvidenceItem {
                id: format!("EV-{}-{:02}", sector.id_prefix(), index + 1),
                content,
                detail: item.detail.clone(),
                sector,
                source_summary: item.source.clone(),
                reliability: ReliabilityLevel::from_score(scored.score),
                url: item.url.clone(),
                score: scored.score,
                score_breakdown: scored.breakdown,
                info_q: scored.info_q,
                stakeholder_type: item.st_type,
            }
        })
        .collect()
}

/// Whether `url` is an absolute http(s) URL with a host.
pub fn is_well_formed_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        })
        .unwrap_or(false)
}

/// Hard keep/discard gate applied before evidence reaches the board.
pub fn passes_quality_gate(item: &EvidenceItem) -> bool {
    item.score >= MIN_EVIDENCE_SCORE
        && is_well_formed_url(&item.url)
        && item.detail.chars().count() > MIN_DETAIL_CHARS
}

/// Scores, filters and caps one sector's research output.
pub fn curate(raw: &[RawEvidence], sector: Sector, current_year: i32) -> Vec<EvidenceItem> {
    expand_evidence(raw, sector, current_year)
        .into_iter()
        .filter(passes_quality_gate)
        .take(sector.target_count())
        .collect()
}
