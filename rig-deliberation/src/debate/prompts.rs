//! Prompt builders for the debate nodes
//!
//! Each builder asks for a single JSON object so the reply can go through
//! `extract_as`. Wording is free to change; the requested keys are not.

use crate::debate::state::{Finding, ResearchSummary, Side};
use crate::llm::truncate_chars;

const ANSWER_IN_KIND: &str = "Answer in the same language as the question.";

pub fn research_queries(question: &str, max_queries: usize) -> String {
    format!(
        "You are a research assistant preparing evidence for a debate.\n\
         Propose 2 to {max_queries} web search queries that would gather the facts and data \
         needed to answer the question below.\n\n\
         Question: {question}\n\n\
         Reply with JSON only: {{\"queries\": [\"...\", \"...\"]}}"
    )
}

pub fn research_summary(question: &str, serialized_results: &str, budget: usize) -> String {
    format!(
        "Summarize the search results below for a debate about the question.\n\
         Extract concrete facts and numeric data points, citing the source URL.\n\n\
         Question: {question}\n\n\
         Search results:\n{results}\n\n\
         Reply with JSON only: {{\"summary\": \"...\", \"key_facts\": [\"...\"], \
         \"data_points\": [{{\"source\": \"...\", \"value\": \"...\", \"context\": \"...\"}}]}}\n\
         {ANSWER_IN_KIND}",
        results = truncate_chars(serialized_results, budget),
    )
}

pub fn research_plan(question: &str, breadth: u32) -> String {
    format!(
        "Break the question below into {breadth} independent research sub-queries, \
         each covering a different angle.\n\n\
         Question: {question}\n\n\
         Reply with JSON only: {{\"subQueries\": [{{\"query\": \"...\", \"rationale\": \"...\"}}]}}"
    )
}

pub fn deep_check(question: &str, findings: &[Finding], current_depth: u32, max_depth: u32, breadth: u32) -> String {
    let digest = findings
        .iter()
        .map(|f| format!("- [{}] {}", f.query, truncate_chars(&f.content, 400)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are reviewing research gathered so far (depth {current_depth} of {max_depth}).\n\
         Decide whether another round of research would materially improve the answer.\n\n\
         Question: {question}\n\n\
         Findings:\n{digest}\n\n\
         If more research is needed, propose up to {breadth} new angles not yet covered.\n\
         Reply with JSON only: {{\"shouldContinue\": true, \"reason\": \"...\", \"newAngles\": [\"...\"]}}"
    )
}

fn stance(side: Side) -> &'static str {
    match side {
        Side::Optimistic => {
            "You are the optimistic analyst. Argue for the upside: opportunities, \
             favourable trends and reasons for confidence, grounded in the evidence."
        }
        Side::Pessimistic => {
            "You are the pessimistic analyst. Argue for the downside: risks, \
             unfavourable trends and reasons for caution, grounded in the evidence."
        }
    }
}

/// Facts and data points as a prompt section
pub fn evidence(summary: Option<&ResearchSummary>) -> String {
    let Some(summary) = summary else {
        return "No research summary is available; rely on general knowledge and say so.".to_string();
    };

    let mut out = format!("Research summary: {}\n", summary.summary);
    if !summary.key_facts.is_empty() {
        out.push_str("Key facts:\n");
        for fact in &summary.key_facts {
            out.push_str(&format!("- {fact}\n"));
        }
    }
    if !summary.data_points.is_empty() {
        out.push_str("Data points:\n");
        for point in &summary.data_points {
            out.push_str(&format!("- {} ({}; source: {})\n", point.value, point.context, point.source));
        }
    }
    out
}

pub fn persona_initial(side: Side, question: &str, summary: Option<&ResearchSummary>) -> String {
    format!(
        "{stance}\n\n\
         Question: {question}\n\n\
         {evidence}\n\
         Reply with JSON only: {{\"thinking\": \"your reasoning\", \"answer\": \"your position\"}}\n\
         {ANSWER_IN_KIND}",
        stance = stance(side),
        evidence = evidence(summary),
    )
}

pub fn persona_rebuttal(side: Side, question: &str, own_answer: &str, opponent_answer: &str) -> String {
    format!(
        "{stance}\n\n\
         Question: {question}\n\n\
         Your position so far:\n{own_answer}\n\n\
         The {opponent} analyst argues:\n{opponent_answer}\n\n\
         Rebut the opposing argument point by point and defend your position.\n\
         Reply with JSON only: {{\"rebuttal\": \"...\"}}\n\
         {ANSWER_IN_KIND}",
        stance = stance(side),
        opponent = side.opponent().as_str(),
    )
}

pub fn decider(
    question: &str,
    optimistic: &str,
    pessimistic: &str,
    round: u32,
    max_rounds: u32,
    answer_chars: usize,
) -> String {
    format!(
        "You are the judge of a debate between an optimistic and a pessimistic analyst.\n\
         This is round {round} of at most {max_rounds}.\n\n\
         Question: {question}\n\n\
         Optimistic side:\n{opt}\n\n\
         Pessimistic side:\n{pes}\n\n\
         Decide which side argued better from the evidence, or call a draw, and whether \
         another round of rebuttals would change the outcome.\n\
         Reply with JSON only: {{\"should_continue\": false, \"reason\": \"...\", \
         \"winner\": \"optimistic|pessimistic|draw\", \"summary\": \"...\"}}\n\
         {ANSWER_IN_KIND}",
        opt = truncate_chars(optimistic, answer_chars),
        pes = truncate_chars(pessimistic, answer_chars),
    )
}
