// src/services/matcher.rs
use crate::services::knowledge::{KnowledgeBase, Lesson};

/// A lesson judged relevant to a query, with its score.
#[derive(Clone, Debug)]
pub struct LessonMatch<'a> {
    pub lesson: &'a Lesson,
    pub score: u32,
}

/// Retrieval strategy behind the answering service. The scoring algorithm is
/// deliberately pluggable; the service only depends on "rank lessons for a
/// query".
pub trait Matcher: Send + Sync {
    /// Ranks lessons for `query`, best first. Lessons with zero relevance are
    /// not returned.
    fn rank<'a>(&self, query: &str, knowledge: &'a KnowledgeBase) -> Vec<LessonMatch<'a>>;
}

const NAME_HIT_SCORE: u32 = 10;
const TOPIC_HIT_SCORE: u32 = 5;
const VIDEO_BOOST: u32 = 2;
const DOCUMENT_BOOST: u32 = 1;

/// Topic groups: a query word from the left side makes lessons whose name or
/// key terms mention the group relevant.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("calibration", &["calibration", "model", "prediction", "accuracy"]),
    (
        "instrumentation",
        &["instrument", "spectrometer", "detector", "hardware"],
    ),
    (
        "applications",
        &["application", "agriculture", "pharmaceutical", "food", "industry"],
    ),
    (
        "theory",
        &["theory", "wavelength", "absorption", "light", "molecular"],
    ),
    ("data", &["data", "analysis", "chemometrics", "statistics"]),
];

/// Default strategy: keyword scoring over lesson names, key terms, and topic
/// groups, with a small boost for lessons that carry media.
#[derive(Clone, Copy, Debug)]
pub struct KeywordMatcher {
    /// How many matches to keep. The prompt only has room for a few lessons.
    pub top_k: usize,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordMatcher {
    pub fn new() -> Self {
        Self { top_k: 3 }
    }

    fn score(&self, query_words: &[String], week_asked: Option<u32>, lesson: &Lesson) -> u32 {
        let mut score = 0;
        let name_lower = lesson.lesson_name.to_lowercase();

        // "week 3" style queries pin the match to that week's lessons.
        if week_asked == Some(lesson.week_num) {
            score += NAME_HIT_SCORE;
        }

        if query_words
            .iter()
            .any(|word| name_lower.contains(word.as_str()))
        {
            score += NAME_HIT_SCORE;
        }

        let terms_lower: Vec<String> =
            lesson.key_terms.iter().map(|t| t.to_lowercase()).collect();
        if query_words
            .iter()
            .any(|word| terms_lower.iter().any(|term| term.contains(word.as_str())))
        {
            score += NAME_HIT_SCORE;
        }

        for (_, keywords) in TOPIC_KEYWORDS {
            let query_hits_topic = keywords
                .iter()
                .any(|kw| query_words.iter().any(|word| word.contains(kw)));
            if !query_hits_topic {
                continue;
            }
            let lesson_in_topic = keywords.iter().any(|kw| {
                name_lower.contains(kw) || terms_lower.iter().any(|term| term.contains(kw))
            });
            if lesson_in_topic {
                score += TOPIC_HIT_SCORE;
            }
        }

        if score > 0 {
            if !lesson.videos.is_empty() {
                score += VIDEO_BOOST;
            }
            if !lesson.documents.is_empty() {
                score += DOCUMENT_BOOST;
            }
        }

        score
    }
}

impl Matcher for KeywordMatcher {
    fn rank<'a>(&self, query: &str, knowledge: &'a KnowledgeBase) -> Vec<LessonMatch<'a>> {
        let lowered = query.to_lowercase();
        let raw_words: Vec<String> = lowered
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .collect();

        let week_asked = raw_words
            .windows(2)
            .find(|pair| pair[0] == "week")
            .and_then(|pair| pair[1].parse::<u32>().ok());

        let query_words: Vec<String> = raw_words
            .into_iter()
            .filter(|word| word.len() > 2)
            .collect();

        if query_words.is_empty() && week_asked.is_none() {
            return Vec::new();
        }

        let mut matches: Vec<LessonMatch<'a>> = knowledge
            .lessons()
            .iter()
            .filter_map(|lesson| {
                let score = self.score(&query_words, week_asked, lesson);
                (score > 0).then_some(LessonMatch { lesson, score })
            })
            .collect();

        // Stable sort keeps corpus order among equal scores, so results are
        // deterministic for a static corpus.
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(self.top_k);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(name: &str, terms: &[&str], videos: usize) -> Lesson {
        Lesson {
            lesson_id: name.to_lowercase().replace(' ', "-"),
            lesson_name: name.to_string(),
            week: "Week 1".to_string(),
            week_num: 1,
            summary: format!("{name} summary"),
            key_terms: terms.iter().map(|t| t.to_string()).collect(),
            slide_count: 10,
            videos: (0..videos)
                .map(|i| crate::services::knowledge::MediaRef {
                    filename: format!("v{i}.mp4"),
                    cdn_url: format!("https://cdn.example.com/v{i}.mp4"),
                })
                .collect(),
            documents: vec![],
        }
    }

    #[test]
    fn ranks_name_hits_above_topic_hits() {
        let kb = KnowledgeBase::new(vec![
            lesson("Calibration Model Development", &[], 0),
            lesson("Moisture Analysis", &["prediction"], 0),
            lesson("Course Welcome", &[], 0),
        ]);

        let matches = KeywordMatcher::new().rank("how do I build a calibration model?", &kb);
        assert_eq!(matches[0].lesson.lesson_name, "Calibration Model Development");
        assert!(matches.iter().all(|m| m.lesson.lesson_name != "Course Welcome"));
    }

    #[test]
    fn media_boost_breaks_ties() {
        let kb = KnowledgeBase::new(vec![
            lesson("Detector Basics", &[], 0),
            lesson("Detector Hardware Tour", &[], 2),
        ]);

        let matches = KeywordMatcher::new().rank("what detector should I buy", &kb);
        assert_eq!(matches[0].lesson.lesson_name, "Detector Hardware Tour");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn week_number_query_pins_that_week() {
        let mut other = lesson("Sampling Techniques", &[], 0);
        other.week = "Week 2".to_string();
        other.week_num = 2;
        let mut target = lesson("Quantitative Analysis", &[], 0);
        target.week = "Week 3".to_string();
        target.week_num = 3;

        let kb = KnowledgeBase::new(vec![other, target]);
        let matches = KeywordMatcher::new().rank("what is covered in week 3?", &kb);
        assert_eq!(matches[0].lesson.week_num, 3);
        assert!(matches.iter().all(|m| m.lesson.week_num != 2));
    }

    #[test]
    fn irrelevant_query_matches_nothing() {
        let kb = KnowledgeBase::new(vec![lesson("Beer's Law", &["absorbance"], 0)]);
        assert!(KeywordMatcher::new().rank("favorite pizza topping", &kb).is_empty());
    }

    #[test]
    fn short_words_are_ignored() {
        let kb = KnowledgeBase::new(vec![lesson("An Overview", &[], 0)]);
        // "an" alone is too short to count as a query word
        assert!(KeywordMatcher::new().rank("an", &kb).is_empty());
    }
}
