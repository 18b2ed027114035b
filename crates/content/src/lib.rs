pub mod error;
pub mod validate;

use error::{Error, Result};
use model::{
    content::{TopicDetail, TopicListing},
    QuizContent, Summary,
};
use serde::de::DeserializeOwned;
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

const SUMMARIES: &str = "summaries";
const QUESTIONS: &str = "questions";

/// Read-only topic summaries and question banks keyed by topic slug.
#[derive(Debug, Default)]
pub struct ContentStore {
    summaries: BTreeMap<Box<str>, Summary>,
    /// Shared so that every quiz session can hold the bank without copying it.
    quizzes: BTreeMap<Box<str>, Arc<QuizContent>>,
}

impl ContentStore {
    /// Loads `{root}/summaries/*.json` and `{root}/questions/*.json`. The slug of each
    /// document is its file stem. A missing `questions` directory simply yields no quizzes.
    pub fn load(root: &Path) -> Result<Self> {
        let summaries = read_documents(&root.join(SUMMARIES), true)?;
        let quizzes = read_documents(&root.join(QUESTIONS), false)?;
        let store = Self::from_documents(summaries, quizzes)?;
        log::info!("Loaded {} summaries and {} question banks.", store.summaries.len(), store.quizzes.len());
        Ok(store)
    }

    /// Builds a store from already parsed documents, validating every question bank.
    pub fn from_documents<S, Q>(summaries: S, quizzes: Q) -> Result<Self>
    where
        S: IntoIterator<Item = (Box<str>, Summary)>,
        Q: IntoIterator<Item = (Box<str>, QuizContent)>,
    {
        let mut store = Self::default();

        for (slug, summary) in summaries {
            if !validate::is_valid_slug(&slug) {
                return Err(Error::InvalidSlug(slug));
            }
            store.summaries.insert(slug, summary);
        }

        for (slug, quiz) in quizzes {
            if !validate::is_valid_slug(&slug) {
                return Err(Error::InvalidSlug(slug));
            }
            validate::validate_quiz(&slug, &quiz)?;
            store.quizzes.insert(slug, Arc::new(quiz));
        }

        Ok(store)
    }

    pub fn quiz(&self, slug: &str) -> Option<&Arc<QuizContent>> {
        self.quizzes.get(slug)
    }

    pub fn summary(&self, slug: &str) -> Option<&Summary> {
        self.summaries.get(slug)
    }

    /// Declared size of the question bank, or zero if the topic has none.
    pub fn question_count(&self, slug: &str) -> u32 {
        self.quizzes.get(slug).map_or(0, |quiz| quiz.total_questions)
    }

    /// Every summarized topic, ordered by sort order and then by slug.
    pub fn summaries(&self) -> impl Iterator<Item = (&str, &Summary)> {
        let mut entries: Vec<_> = self.summaries.iter().map(|(slug, summary)| (&**slug, summary)).collect();
        entries.sort_by_key(|&(slug, summary)| (summary.sort_order.unwrap_or(i32::MAX), slug));
        entries.into_iter()
    }

    pub fn listings(&self) -> impl Iterator<Item = TopicListing<'_>> {
        self.summaries().map(|(slug, summary)| TopicListing {
            slug,
            name_en: &summary.name_en,
            name_th: &summary.name_th,
            reading_time_min: summary.reading_time_min,
            question_count: self.question_count(slug),
            tags: &summary.tags,
        })
    }

    pub fn detail(&self, slug: &str) -> Option<TopicDetail<'_>> {
        let summary = self.summaries.get(slug)?;
        Some(TopicDetail { summary, question_count: self.question_count(slug) })
    }
}

fn read_documents<T: DeserializeOwned>(dir: &Path, required: bool) -> Result<Vec<(Box<str>, T)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Content directory {} does not exist.", dir.display());
            return Ok(Vec::new());
        }
        Err(source) => return Err(Error::Io { path: dir.to_path_buf(), source }),
    };

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let Some(slug) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let slug: Box<str> = slug.into();

        let bytes = fs::read(&path).map_err(|source| Error::Io { path: path.clone(), source })?;
        let document = parse(&slug, &bytes)?;
        documents.push((slug, document));
    }

    Ok(documents)
}

fn parse<T: DeserializeOwned>(slug: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|err| Error::json(slug, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::tests::quiz;

    fn summary(name: &str, sort_order: Option<i32>) -> Summary {
        Summary {
            topic_id: name.into(),
            title: name.into(),
            name_en: name.into(),
            name_th: name.into(),
            reading_time_min: 5,
            sort_order,
            tags: Vec::new(),
            sections: Vec::new(),
        }
    }

    fn slug(text: &str) -> Box<str> {
        text.into()
    }

    fn store() -> ContentStore {
        ContentStore::from_documents(
            [
                (slug("quantum"), summary("Quantum", Some(4))),
                (slug("iot"), summary("IoT", Some(2))),
                (slug("ai"), summary("AI", None)),
                (slug("bigdata"), summary("Big Data", Some(1))),
            ],
            [(slug("iot"), quiz(20)), (slug("orphan"), quiz(2))],
        )
        .unwrap()
    }

    #[test]
    fn lists_topics_in_sort_order() {
        let store = store();
        let slugs: Vec<_> = store.listings().map(|listing| listing.slug).collect();
        assert_eq!(slugs, ["bigdata", "iot", "quantum", "ai"]);
    }

    #[test]
    fn counts_questions_per_topic() {
        let store = store();
        assert_eq!(store.question_count("iot"), 20);
        assert_eq!(store.question_count("ai"), 0);
        assert_eq!(store.detail("iot").unwrap().question_count, 20);
        assert!(store.detail("unknown-slug").is_none());
    }

    #[test]
    fn quizzes_do_not_require_a_summary() {
        let store = store();
        assert_eq!(store.quiz("orphan").unwrap().questions.len(), 2);
        assert!(store.summary("orphan").is_none());
        assert!(store.quiz("unknown-slug").is_none());
    }

    #[test]
    fn rejects_invalid_slugs_and_banks() {
        let err = ContentStore::from_documents([(slug("Bad Slug"), summary("x", None))], Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidSlug(_)));

        let mut broken = quiz(2);
        broken.total_questions = 3;
        let err = ContentStore::from_documents(Vec::new(), [(slug("iot"), broken)]).unwrap_err();
        assert!(matches!(err, Error::CountMismatch { .. }));
    }

    #[test]
    fn classifies_json_errors() {
        assert!(matches!(parse::<QuizContent>("iot", b"{ not json"), Err(Error::Syntax { .. })));
        assert!(matches!(
            parse::<QuizContent>("iot", br#"{ "topicId": "iot", "topicName": "IoT", "totalQuestions": "many", "questions": [] }"#),
            Err(Error::Data { .. })
        ));
        let quiz: QuizContent = parse(
            "iot",
            br#"{ "topicId": "iot", "topicName": "IoT", "totalQuestions": 0, "questions": [] }"#,
        )
        .unwrap();
        assert!(quiz.questions.is_empty());
    }

    #[test]
    fn loads_from_directory() {
        let root = std::env::temp_dir().join(format!("studyquiz-content-{}", std::process::id()));
        fs::create_dir_all(root.join(SUMMARIES)).unwrap();
        fs::create_dir_all(root.join(QUESTIONS)).unwrap();
        fs::write(
            root.join(SUMMARIES).join("iot.json"),
            r#"{ "topicId": "iot", "title": "IoT", "nameEn": "Internet of Things", "nameTh": "IoT" }"#,
        )
        .unwrap();
        fs::write(root.join(SUMMARIES).join("notes.txt"), "ignored").unwrap();
        fs::write(
            root.join(QUESTIONS).join("iot.json"),
            serde_json::to_vec(&quiz(3)).unwrap(),
        )
        .unwrap();

        let store = ContentStore::load(&root).unwrap();
        assert_eq!(store.summary("iot").unwrap().name_en.as_ref(), "Internet of Things");
        assert_eq!(store.question_count("iot"), 3);
        assert_eq!(store.listings().count(), 1);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_summaries_directory_is_an_error() {
        let root = std::env::temp_dir().join("studyquiz-content-does-not-exist");
        assert!(matches!(ContentStore::load(&root), Err(Error::Io { .. })));
    }
}
