// src/services/knowledge.rs
use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// A media file attached to a lesson, hosted on the course CDN.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MediaRef {
    pub filename: String,
    pub cdn_url: String,
}

/// One lesson of the course corpus. Parsed once at startup, immutable after.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Lesson {
    pub lesson_id: String,
    pub lesson_name: String,
    pub week: String,
    pub week_num: u32,
    /// Narration/summary text the fallback reply is built from.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_terms: Vec<String>,
    #[serde(default)]
    pub slide_count: u32,
    #[serde(default)]
    pub videos: Vec<MediaRef>,
    #[serde(default)]
    pub documents: Vec<MediaRef>,
}

/// The static lesson corpus. Read-only during request handling; shared across
/// requests behind an `Arc`, so no locking is needed.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    lessons: Vec<Lesson>,
}

impl KnowledgeBase {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    /// Loads the corpus from a JSON array of lessons. Failure here is fatal at
    /// boot: the service must not answer without its corpus.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read knowledge base at {}", path.display()))?;
        let lessons: Vec<Lesson> = serde_json::from_str(&raw)
            .with_context(|| format!("knowledge base at {} is not valid JSON", path.display()))?;
        Ok(Self { lessons })
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Course catalog view: lessons grouped by week, in week order.
    pub fn weeks(&self) -> BTreeMap<u32, WeekOverview> {
        let mut weeks: BTreeMap<u32, WeekOverview> = BTreeMap::new();
        for lesson in &self.lessons {
            let entry = weeks.entry(lesson.week_num).or_insert_with(|| WeekOverview {
                week: lesson.week.clone(),
                week_num: lesson.week_num,
                lessons: Vec::new(),
            });
            entry.lessons.push(LessonOverview {
                lesson_id: lesson.lesson_id.clone(),
                lesson_name: lesson.lesson_name.clone(),
                slide_count: lesson.slide_count,
            });
        }
        weeks
    }
}

#[derive(Debug, Serialize)]
pub struct WeekOverview {
    pub week: String,
    pub week_num: u32,
    pub lessons: Vec<LessonOverview>,
}

#[derive(Debug, Serialize)]
pub struct LessonOverview {
    pub lesson_id: String,
    pub lesson_name: String,
    pub slide_count: u32,
}
