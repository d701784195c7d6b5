//! Terminal rendering of the timeline, evidence board and analysis.

use std::collections::HashSet;

use colored::{ColoredString, Colorize};
use debate_core::{EvidenceItem, FramedIssue, MetaAnalysis, ReliabilityLevel, Sector};
use orchestrator::{TimelineItem, TimelineItemKind, TimelineSide};

fn side_tag(side: TimelineSide) -> ColoredString {
    match side {
        TimelineSide::Pro => "[PRO]".blue().bold(),
        TimelineSide::Con => "[CON]".red().bold(),
        TimelineSide::User => "[YOU]".yellow().bold(),
        TimelineSide::Center => "[REF]".white().bold(),
    }
}

pub fn render_item(item: &TimelineItem) -> String {
    let tag = side_tag(item.side);
    match item.kind {
        TimelineItemKind::Divider => format!("\n── {} ──", item.content.bold()),
        TimelineItemKind::Intro => {
            let mut out = format!(
                "{tag} {}\n{}",
                item.title.as_deref().unwrap_or_default().bold(),
                item.content
            );
            if let Some(meta) = &item.meta {
                if !meta.hook.is_empty() {
                    out.push_str(&format!("\n  {} {}", "Hook:".dimmed(), meta.hook));
                }
                out.push_str(&format!("\n  {} {}", "Value:".dimmed(), meta.value));
            }
            out
        }
        TimelineItemKind::Argument | TimelineItemKind::Conclusion => {
            let mut out = format!(
                "{tag} {}\n{}",
                item.title.as_deref().unwrap_or_default().bold(),
                item.content
            );
            if !item.evidence.is_empty() {
                out.push_str(&format!("\n  {}", item.evidence.join(", ").dimmed()));
            }
            out
        }
        TimelineItemKind::Question | TimelineItemKind::Answer => format!(
            "{tag} {} {}",
            item.label.as_deref().unwrap_or_default().italic(),
            item.content
        ),
        TimelineItemKind::Rebuttal => {
            let target = item.ref_id.as_deref().unwrap_or_default();
            let defense = item.defense.as_deref().unwrap_or_default();
            format!(
                "{tag} {} {target}\n  {} {defense}\n  {} {}",
                "Against:".bold(),
                "Defense:".dimmed(),
                "Attack:".dimmed(),
                item.content
            )
        }
        TimelineItemKind::UserQuery => format!("{tag} {}", item.content.yellow()),
        TimelineItemKind::Loading | TimelineItemKind::Analyzing => {
            format!("{tag} {}", "...".dimmed())
        }
    }
}

/// Prints each timeline item once, in projection order.
#[derive(Debug, Default)]
pub struct TimelinePrinter {
    seen: HashSet<String>,
}

impl TimelinePrinter {
    /// Render items not printed before. Placeholders are skipped.
    pub fn render_new(&mut self, items: &[TimelineItem]) -> Vec<String> {
        items
            .iter()
            .filter(|item| !item.is_placeholder())
            .filter(|item| self.seen.insert(item.id.clone()))
            .map(render_item)
            .collect()
    }

    pub fn print_new(&mut self, items: &[TimelineItem]) {
        for block in self.render_new(items) {
            println!("{block}");
        }
    }
}

pub fn print_issue(issue: &FramedIssue) {
    println!();
    println!("{} {}", "Issue:".bold(), issue.refined_issue);
    if !issue.definition.is_empty() {
        println!("  {} {}", "Definition:".dimmed(), issue.definition);
    }
    if !issue.scope.country.is_empty() || !issue.scope.timeframe.is_empty() {
        println!(
            "  {} {} {}",
            "Scope:".dimmed(),
            issue.scope.country,
            issue.scope.timeframe
        );
    }
    println!("  {} {}", "Pro:".blue(), issue.positions.pro);
    println!("  {} {}", "Con:".red(), issue.positions.con);
}

fn reliability(level: ReliabilityLevel) -> ColoredString {
    match level {
        ReliabilityLevel::High => "high".green(),
        ReliabilityLevel::Medium => "medium".yellow(),
        ReliabilityLevel::Low => "low".red(),
    }
}

pub fn print_evidence(board: &[EvidenceItem]) {
    println!();
    println!("{} ({} items)", "Evidence board".bold(), board.len());
    for sector in Sector::ALL {
        let items: Vec<_> = board.iter().filter(|item| item.sector == sector).collect();
        println!("  {} {}", sector.as_str().bold(), format!("({})", items.len()).dimmed());
        for item in items {
            println!(
                "    {} {:>3} {} {}",
                item.id.dimmed(),
                item.score,
                reliability(item.reliability),
                item.content
            );
        }
    }
}

pub fn print_analysis(analysis: &MetaAnalysis) {
    println!();
    println!("{}", "Referee analysis".bold().underline());
    for (sector, points) in &analysis.issue_map {
        println!("  {}", sector.as_str().bold());
        for point in points {
            println!("    - {}", point.issue);
            println!("      {} {}", "Pro:".blue(), point.pro_argument);
            println!("      {} {}", "Con:".red(), point.con_argument);
        }
    }
    println!(
        "  {} {} ({:.0})",
        "Evidence:".bold(),
        analysis.evidence_evaluation.description,
        analysis.evidence_evaluation.score
    );
    for (title, list) in [
        ("Agreements", &analysis.key_agreements),
        ("Disagreements", &analysis.key_disagreements),
        ("Uncertainties", &analysis.uncertainties),
        ("Reflect on", &analysis.reflection_prompts),
    ] {
        if list.is_empty() {
            continue;
        }
        println!("  {}", title.bold());
        for entry in list {
            println!("    - {entry}");
        }
    }
}

#[cfg(test)]
mod tests {
    use debate_core::{SimulationState, SimulationStep, Side, RebuttalItem};
    use orchestrator::{project, TimelineLabels, TimelineView};

    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    fn state_with_rebuttal() -> SimulationState {
        let mut state = SimulationState::new();
        state.status = SimulationStep::Rebuttal;
        state.rebuttals.turns_mut(Side::Con).push(RebuttalItem {
            target_claim: "Productivity rises".to_string(),
            defense: "Our data holds".to_string(),
            rebuttal: "Their survey is biased".to_string(),
            ..Default::default()
        });
        state
    }

    #[test]
    fn test_rebuttal_rendering() {
        plain();
        let items = project(
            &state_with_rebuttal(),
            TimelineView::default(),
            &TimelineLabels::default(),
        );
        let rendered = render_item(&items[1]);
        assert!(rendered.starts_with("[CON] Against: Productivity rises"));
        assert!(rendered.contains("Defense: Our data holds"));
        assert!(rendered.contains("Attack: Their survey is biased"));
    }

    #[test]
    fn test_printer_skips_seen_and_placeholders() {
        plain();
        let state = state_with_rebuttal();
        let items = project(&state, TimelineView::default(), &TimelineLabels::default());
        assert!(items.iter().any(|item| item.is_placeholder()));

        let mut printer = TimelinePrinter::default();
        assert_eq!(printer.render_new(&items).len(), 2);
        assert!(printer.render_new(&items).is_empty());
    }
}
