// src/services/grading.rs
use serde::{Deserialize, Serialize};

use crate::services::provider::{ProviderClient, ProviderError, ProviderMessage};

const MAX_SCORE_PER_QUESTION: u32 = 20;
const GRADING_TEMPERATURE: f32 = 0.3;
const GRADING_MAX_TOKENS: u32 = 300;

const GRADER_SYSTEM_PROMPT: &str =
    "You are an expert NIR spectroscopy instructor grading student assignments.";

#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Shape the provider is asked to produce. A reply that isn't valid JSON
/// degrades to a neutral score with the raw text as feedback.
#[derive(Debug, Deserialize)]
struct GraderVerdict {
    #[serde(default)]
    score: u32,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionGrade {
    pub question_id: String,
    pub score: u32,
    pub max_score: u32,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GradeReport {
    pub overall_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub grade: char,
    pub results: Vec<QuestionGrade>,
    pub overall_feedback: String,
}

fn grading_prompt(question: &str, answer: &str) -> String {
    format!(
        "As an NIR spectroscopy instructor, grade this student's answer.\n\n\
Question: {question}\n\n\
Student's Answer: {answer}\n\n\
Provide:\n\
1. Score out of {MAX_SCORE_PER_QUESTION} points\n\
2. Brief feedback (2-3 sentences)\n\
3. What they did well\n\
4. What needs improvement\n\n\
Format your response as JSON:\n\
{{\n\
    \"score\": <number 0-{MAX_SCORE_PER_QUESTION}>,\n\
    \"feedback\": \"<feedback text>\",\n\
    \"strengths\": [\"<strength 1>\", \"<strength 2>\"],\n\
    \"improvements\": [\"<improvement 1>\", \"<improvement 2>\"]\n\
}}"
    )
}

fn parse_verdict(raw: &str) -> GraderVerdict {
    match serde_json::from_str::<GraderVerdict>(raw) {
        Ok(verdict) => GraderVerdict {
            score: verdict.score.min(MAX_SCORE_PER_QUESTION),
            ..verdict
        },
        Err(_) => GraderVerdict {
            score: 15,
            feedback: raw.to_string(),
            strengths: vec!["Answer provided".to_string()],
            improvements: vec!["Could be more detailed".to_string()],
        },
    }
}

pub fn letter_grade(percentage: f64) -> char {
    match percentage {
        p if p >= 90.0 => 'A',
        p if p >= 80.0 => 'B',
        p if p >= 70.0 => 'C',
        p if p >= 60.0 => 'D',
        _ => 'F',
    }
}

/// Grades each answer with one provider call. Unlike chat, grading has no
/// meaningful local fallback, so provider errors propagate to the handler.
pub async fn grade_answers(
    provider: &ProviderClient,
    answers: &[AnswerSubmission],
) -> Result<GradeReport, ProviderError> {
    let mut results = Vec::with_capacity(answers.len());
    let mut total_score = 0;
    let mut max_score = 0;

    for submission in answers {
        let prompt = vec![
            ProviderMessage::system(GRADER_SYSTEM_PROMPT),
            ProviderMessage::user(grading_prompt(&submission.question, &submission.answer)),
        ];
        let raw = provider
            .complete(&prompt, GRADING_TEMPERATURE, GRADING_MAX_TOKENS)
            .await?;
        let verdict = parse_verdict(&raw);

        total_score += verdict.score;
        max_score += MAX_SCORE_PER_QUESTION;
        results.push(QuestionGrade {
            question_id: submission.question_id.clone(),
            score: verdict.score,
            max_score: MAX_SCORE_PER_QUESTION,
            feedback: verdict.feedback,
            strengths: verdict.strengths,
            improvements: verdict.improvements,
        });
    }

    let percentage = if max_score > 0 {
        f64::from(total_score) / f64::from(max_score) * 100.0
    } else {
        0.0
    };
    let percentage = (percentage * 10.0).round() / 10.0;
    let encouragement = if percentage >= 80.0 {
        "Excellent work!"
    } else {
        "Keep practicing!"
    };

    Ok(GradeReport {
        overall_score: total_score,
        max_score,
        percentage,
        grade: letter_grade(percentage),
        overall_feedback: format!(
            "You scored {total_score}/{max_score} ({percentage:.1}%). {encouragement}"
        ),
        results,
    })
}
