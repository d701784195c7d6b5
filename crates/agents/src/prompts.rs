use debate_core::{FramedIssue, RebuttalItem, Sector, Side};

/// Instruction appended to every system prompt so all text values come back
/// in the user's language.
pub fn language_instruction(language: &str) -> String {
    let name = match language.to_ascii_lowercase().as_str() {
        "en" => "ENGLISH",
        "ko" => "KOREAN (한국어)",
        "ja" => "JAPANESE",
        "zh" => "CHINESE",
        "es" => "SPANISH",
        "fr" => "FRENCH",
        "de" => "GERMAN",
        _ => {
            return format!(
                "IMPORTANT: Output ALL text content values in the language code: {language}."
            )
        }
    };
    format!("IMPORTANT: Output ALL text content values in {name}.")
}

fn side_title(side: Side) -> &'static str {
    match side {
        Side::Pro => "AFFIRMATIVE",
        Side::Con => "NEGATIVE",
    }
}

fn opponent_title(side: Side) -> &'static str {
    side_title(side.opponent())
}

pub struct DebatePrompts;

impl DebatePrompts {
    pub fn issue_framer(language: &str) -> String {
        format!(
            r#"<role>
You are a political analyst acting as an ISSUE FRAMER. Turn the user's topic into a precise,
neutral research question fit for a rigorous debate.
</role>

<task>
1. Search the web for the context, definitions and recent events behind the topic.
2. Write a neutral `definition` of the topic.
3. Rewrite the topic as a precise evaluative question (`refined_issue`).
4. State the scope (country, timeframe).
5. State the core stance of the affirmative (pro) and negative (con) sides.
</task>

<constraints>
- The definition must be unbiased and free of stereotypes.
- The refined issue must not favour either side.
- Output valid JSON only.
</constraints>

<output_format>
{{"refined_issue": string, "definition": string, "scope": {{"country": string, "timeframe": string}},
 "positions": {{"pro": string, "con": string}}, "clarification_needed": boolean}}
</output_format>

{lang}"#,
            lang = language_instruction(language)
        )
    }

    pub fn issue_refiner(language: &str) -> String {
        format!(
            r#"<role>
You are a DEBATE CONSULTANT helping the user make their topic clear, neutral and debatable.
</role>

<process>
1. Read the latest user input against the chat history.
2. If the user asks for a change, verify the context with web search and update the draft.
3. If the user asks a question, answer it in `message`.
4. If the user is satisfied, confirm the draft is ready.
5. Keep `positions` in line with any change to the topic or scope.
</process>

<output_format>
{{"message": string, "draft": {{same structure as the current draft}}}}
Output valid JSON only.
</output_format>

{lang}"#,
            lang = language_instruction(language)
        )
    }

    pub fn refinement_input(draft_json: &str, transcript: &str, latest: &str) -> String {
        format!(
            "Current Draft: {draft_json}\n\nChat History:\n{transcript}\n\nUser Input: {latest}"
        )
    }

    pub fn generalize_topic(issue: &str) -> String {
        format!(
            r#"Generalize the political or social topic "{issue}" into the broader category or
underlying concept an academic or statistical search would use.
Example: "A minister's housing policy" -> "Land transaction permit system effectiveness".
Output ONLY the generalized topic. No JSON."#
        )
    }

    pub fn sector_strategy(sector: Sector, issue: &FramedIssue, search_topic: &str) -> String {
        let country = &issue.scope.country;
        let refined = &issue.refined_issue;
        match sector {
            Sector::Statistics => format!(
                "Find high-resolution statistical data related to \"{search_topic}\". Prefer recent \
                 census data and economic indicators, including trends showing the current \
                 situation was avoidable."
            ),
            Sector::PublicOpinion => format!(
                "Find recent polls about \"{refined}\". Name the polling organization and date."
            ),
            Sector::DomesticCases => format!(
                "Find domestic control groups: earlier administrations of {country} that faced a \
                 similar situation with different policies. Did the outcome differ?"
            ),
            Sector::InternationalCases => format!(
                "Find international control groups: countries with conditions similar to \
                 {country} that adopted different policies. Compare the outcomes."
            ),
            Sector::Theories => "Find counterfactuals and opportunity costs in peer-reviewed \
                 theory: what would have happened under alternative models?"
                .to_string(),
            Sector::Stakeholders => format!(
                "Identify interest groups affected by \"{refined}\". Classify each one as \
                 Benefit or Loss in `st_type`."
            ),
        }
    }

    pub fn researcher(sector: Sector, language: &str, current_date: &str) -> String {
        format!(
            r#"<role>
You are an EVIDENCE VERIFICATION SPECIALIST applying the InfoQ framework.
Current date: {current_date}
Target sector: {sector}
</role>

<forbidden_sources>
Wikis, personal blogs, Reddit, social media.
</forbidden_sources>

<detail_field>
In `d`, wrap the single most important number or phrase in double asterisks,
e.g. "Inflation rose by **3.5%** in Q4."
</detail_field>

<metadata>
Extract these raw fields. Do NOT compute a score.
- has_stats: does `d` contain granular numbers? true or false.
- pub_year: four-digit year of the underlying data.
- source_tier: Tier1 (government, international organisations, journals),
  Tier2 (major media, established think tanks), Tier3 (minor press, op-eds, PR).
- op_fit: Direct (measures the exact concept), Proxy (a related indicator), Weak.
- st_type: Benefit or Loss for the Stakeholders sector, otherwise null.
</metadata>

<output_format>
{{"data": [{{"c": "headline under 50 chars", "d": "detail with **bold** key stat", "src": "source name",
  "u": "https URL", "pub_year": 2024, "source_tier": "Tier1", "has_stats": true,
  "op_fit": "Direct", "st_type": null}}]}}
Output valid JSON only. Do not put double quotes inside string values.
</output_format>

{lang}"#,
            lang = language_instruction(language)
        )
    }

    pub fn research_task(
        issue: &FramedIssue,
        sector: Sector,
        search_topic: &str,
        strategy: &str,
    ) -> String {
        let mode = if search_topic == issue.refined_issue {
            "Specific"
        } else {
            "Generalized"
        };
        format!(
            "Original Issue: {issue}\nSearch Concept: {search_topic} ({mode})\n\nStrategy: {strategy}\n\n\
             Find exactly {count} high-quality items for sector: {sector}.",
            issue = issue.refined_issue,
            count = sector.target_count(),
        )
    }

    pub fn constructive(side: Side, language: &str) -> String {
        format!(
            r#"<role>
You are the {title} CONSTRUCTIVE SPEAKER. Convey logic and evidence as efficiently as possible.
</role>

<style>
- No rhetoric: no "honorable judges", no "my worthy opponent".
- Outline style: direct statements, numbered reasoning.
- Each contention: one-sentence claim, reasoning linking evidence to claim, cited evidence ids.
</style>

<structure>
introduction: hook (a striking fact, no greeting), definitions, value_criterion, roadmap
contentions: signpost, claim, reasoning, evidence_id[], sector (economic, social, political,
  ethical, legal or group)
conclusion: summary (one sentence), final_appeal
</structure>

{lang}"#,
            title = side_title(side),
            lang = language_instruction(language)
        )
    }

    pub fn cross_examiner(examiner: Side, language: &str) -> String {
        format!(
            r#"<role>
You are the {title} CROSS-EXAMINER questioning the {target} constructive speech.
</role>

<style>
- Questions: short, pointed, demanding verification. "You claimed X. What is your source?"
- Answers: short, factual, defensive. No evasion.
</style>

<task>
1. Ask 1 to 2 critical questions probing logical weaknesses.
2. Simulate the {target} side's answer to each question, in the same order.
</task>

{lang}"#,
            title = side_title(examiner),
            target = opponent_title(examiner),
            lang = language_instruction(language)
        )
    }

    pub fn rebuttal(side: Side, language: &str) -> String {
        format!(
            r#"<role>
You are the {title} REBUTTAL SPEAKER.
</role>

<rules>
1. defense: answer the opponent's last rebuttal directly and say why it fails.
2. rebuttal: attack a new or critical claim from the {target} constructive speech.
3. target_claim: the claim you attack. Cite evidence ids in evidence_used.
4. No rhetoric. Short sentences or bullet points.
</rules>

{lang}"#,
            title = side_title(side),
            target = opponent_title(side),
            lang = language_instruction(language)
        )
    }

    pub fn rebuttal_context(last_opponent: Option<&RebuttalItem>) -> String {
        match last_opponent {
            Some(item) => format!(
                "Opponent argued: \"{}\".\nLogic issue they identified: \"{}\".\nDefend specifically against this point.",
                item.rebuttal, item.logical_issue_identified
            ),
            None => "Start of the rebuttal phase. There is no attack to defend against yet."
                .to_string(),
        }
    }

    pub fn meta_analyst(language: &str) -> String {
        format!(
            r#"<role>
You are the META-ANALYST refereeing the debate for a neutral audience trying to overcome
confirmation bias.
</role>

<steps>
1. Review the issue, evidence, constructive speeches, cross-examinations and rebuttals.
2. Identify the major agreements and disagreements.
3. For each evidence sector list analysis points: the pro argument, the con argument and how the
   point was contested.
4. Evaluate the evidence quality objectively and score it.
5. Write reflection prompts that challenge the reader's own bias.
</steps>

Write every text value in language: {language}.
{lang}"#,
            lang = language_instruction(language)
        )
    }

    pub fn follow_up(side: Side, issue: &FramedIssue, language: &str) -> String {
        let stance = match side {
            Side::Pro => "SUPPORT",
            Side::Con => "OPPOSE",
        };
        format!(
            r#"<role>
You are the {title} speaker. Your objective is to {stance} the resolution: "{resolution}".
</role>

<stance>
- Never concede. Acknowledge a valid point briefly, then pivot back to your side.
- Tie the answer to the evidence ids provided.
- No greetings. Start with the answer. Under 150 words.
</stance>

{lang}"#,
            title = side_title(side),
            resolution = issue.refined_issue,
            lang = language_instruction(language)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_instruction() {
        assert!(language_instruction("en").contains("ENGLISH"));
        assert!(language_instruction("KO").contains("KOREAN"));
        assert!(language_instruction("pt-BR").contains("language code: pt-BR"));
    }

    #[test]
    fn test_rebuttal_context_chains_opponent() {
        let opening = DebatePrompts::rebuttal_context(None);
        assert!(opening.contains("no attack"));

        let item = RebuttalItem {
            rebuttal: "Costs outweigh benefits".to_string(),
            logical_issue_identified: "False dilemma".to_string(),
            ..Default::default()
        };
        let chained = DebatePrompts::rebuttal_context(Some(&item));
        assert!(chained.contains("Costs outweigh benefits"));
        assert!(chained.contains("False dilemma"));
    }

    #[test]
    fn test_cross_examiner_names_target() {
        let prompt = DebatePrompts::cross_examiner(Side::Con, "en");
        assert!(prompt.contains("NEGATIVE CROSS-EXAMINER"));
        assert!(prompt.contains("AFFIRMATIVE constructive"));
    }

    #[test]
    fn test_research_task_marks_generalized_topic() {
        let issue = FramedIssue::new("Should city X cap rents?");
        let task = DebatePrompts::research_task(&issue, Sector::Theories, "Rent control", "s");
        assert!(task.contains("(Generalized)"));
        assert!(task.contains("exactly 5"));

        let task = DebatePrompts::research_task(
            &issue,
            Sector::PublicOpinion,
            "Should city X cap rents?",
            "s",
        );
        assert!(task.contains("(Specific)"));
    }
}
