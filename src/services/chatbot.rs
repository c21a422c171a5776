// src/services/chatbot.rs
use std::sync::Arc;

use crate::{
    message::{HistoryTurn, ReplyOrigin, TurnRole},
    services::{
        knowledge::KnowledgeBase,
        matcher::{LessonMatch, Matcher},
        provider::{ProviderClient, ProviderMessage},
    },
};

/// Prior turns beyond this are dropped from the prompt to bound its size.
const HISTORY_LIMIT: usize = 10;
/// Summary text per lesson is capped before it goes into the prompt.
const CONTEXT_CHARS_PER_LESSON: usize = 3000;
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = "You are SpectroScience AI, an expert NIR (Near-Infrared) Spectroscopy teaching assistant.\n\
\n\
You have access to a comprehensive NIR Essentials Course covering all aspects of near-infrared spectroscopy, \
from fundamental concepts to advanced applications in agriculture, pharmaceuticals, and industry.\n\
\n\
Your role is to:\n\
1. Answer questions about NIR spectroscopy concepts, theory, and applications naturally\n\
2. Draw from course materials when relevant, but present information conversationally\n\
3. Explain complex topics in clear, educational language suitable for students\n\
4. Reference videos and documents from the course when they help illustrate concepts\n\
\n\
Answer naturally without explicitly mentioning \"Week X\" or \"Lesson Y\" unless specifically asked. \
When referencing course materials, say things like \"In the course materials on calibration...\". \
Be encouraging, patient, and thorough in your explanations.";

const NO_MATCH_REPLY: &str = "That's a great question, but we haven't covered that specific topic \
in this course yet. Let me know if you'd like me to point you to additional resources.";

/// The outcome of one chat turn: the reply plus which branch produced it.
/// Provider failures never escape this type; they collapse into the local
/// fallback branch.
#[derive(Clone, Debug)]
pub struct ChatOutcome {
    pub reply: String,
    pub origin: ReplyOrigin,
    pub sources: Vec<String>,
    pub matched_score: Option<u32>,
}

/// Answers a single chat turn against the immutable corpus. Stateless per
/// request; safe to share across handlers.
pub struct ChatService {
    knowledge: Arc<KnowledgeBase>,
    matcher: Box<dyn Matcher>,
    provider: Option<ProviderClient>,
}

impl ChatService {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        matcher: Box<dyn Matcher>,
        provider: Option<ProviderClient>,
    ) -> Self {
        Self { knowledge, matcher, provider }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Always returns an outcome. The caller has already rejected empty
    /// messages, so `message` is non-empty here.
    pub async fn answer(&self, message: &str, history: &[HistoryTurn]) -> ChatOutcome {
        let matches = self.matcher.rank(message, &self.knowledge);
        let sources: Vec<String> = matches
            .iter()
            .map(|m| m.lesson.lesson_name.clone())
            .collect();
        let matched_score = matches.first().map(|m| m.score);

        if let Some(provider) = &self.provider {
            let prompt = build_prompt(&matches, history, message);
            match provider.complete(&prompt, TEMPERATURE, MAX_TOKENS).await {
                Ok(reply) if !reply.is_empty() => {
                    return ChatOutcome {
                        reply,
                        origin: ReplyOrigin::Provider,
                        sources,
                        matched_score,
                    };
                }
                Ok(_) => {
                    tracing::warn!("provider returned an empty reply, using fallback");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "provider call failed, using fallback");
                }
            }
        }

        self.fallback(&matches, sources, matched_score)
    }

    /// Local branch: answer straight from the best-matching lesson, or admit
    /// the corpus has nothing on the topic. Deterministic for a fixed corpus.
    fn fallback(
        &self,
        matches: &[LessonMatch<'_>],
        sources: Vec<String>,
        matched_score: Option<u32>,
    ) -> ChatOutcome {
        match matches.first() {
            Some(best) => {
                let lesson = best.lesson;
                let mut reply = if lesson.summary.is_empty() {
                    format!(
                        "The course covers this in \"{}\" ({}).",
                        lesson.lesson_name, lesson.week
                    )
                } else {
                    format!(
                        "From the course materials on \"{}\": {}",
                        lesson.lesson_name,
                        truncate_chars(&lesson.summary, CONTEXT_CHARS_PER_LESSON)
                    )
                };
                if let Some(video) = lesson.videos.first() {
                    reply.push_str(&format!(
                        "\n\nThere's a helpful video on this: {}",
                        video.cdn_url
                    ));
                }
                ChatOutcome {
                    reply,
                    origin: ReplyOrigin::KnowledgeBase,
                    sources,
                    matched_score,
                }
            }
            None => ChatOutcome {
                reply: NO_MATCH_REPLY.to_string(),
                origin: ReplyOrigin::Unmatched,
                sources,
                matched_score,
            },
        }
    }
}

/// Prompt layout mirrors the widget contract: system prompt, then retrieved
/// course context as a second system message, then bounded history, then the
/// user's message.
fn build_prompt(
    matches: &[LessonMatch<'_>],
    history: &[HistoryTurn],
    message: &str,
) -> Vec<ProviderMessage> {
    let mut messages = Vec::with_capacity(history.len().min(HISTORY_LIMIT) + 3);
    messages.push(ProviderMessage::system(SYSTEM_PROMPT));

    if !matches.is_empty() {
        let mut context = String::from("Relevant course materials:\n");
        for m in matches {
            let lesson = m.lesson;
            context.push_str(&format!("\n=== {} ({}) ===\n", lesson.lesson_name, lesson.week));
            if !lesson.summary.is_empty() {
                context.push_str(truncate_chars(&lesson.summary, CONTEXT_CHARS_PER_LESSON));
                context.push('\n');
            }
            for video in &lesson.videos {
                context.push_str(&format!("Video: {} ({})\n", video.filename, video.cdn_url));
            }
            for doc in &lesson.documents {
                context.push_str(&format!("Document: {} ({})\n", doc.filename, doc.cdn_url));
            }
        }
        messages.push(ProviderMessage::system(context));
    }

    let start = history.len().saturating_sub(HISTORY_LIMIT);
    for turn in &history[start..] {
        let mapped = match turn.role {
            TurnRole::User => ProviderMessage::user(turn.content.clone()),
            TurnRole::Assistant => ProviderMessage::assistant(turn.content.clone()),
        };
        messages.push(mapped);
    }

    messages.push(ProviderMessage::user(message.to_string()));
    messages
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
