use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One labeled answer option of a question.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Choice {
    /// Short label such as `A` or `B`.
    pub label: Box<str>,
    pub text: Box<str>,
}

/// A single multiple-choice question as authored in the content files.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within its topic.
    pub id: u32,
    pub question_text: Box<str>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<Box<str>>,
    /// Ordered exactly as they should be displayed.
    pub choices: Vec<Choice>,
    /// Label of the correct choice.
    pub correct_answer: Box<str>,
    pub explanation: Box<str>,
    /// Rationale keyed by the label of each wrong choice.
    #[serde(default)]
    pub wrong_reasons: BTreeMap<Box<str>, Box<str>>,
}

impl Question {
    pub fn choice(&self, label: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.label.as_ref() == label)
    }

    pub fn is_correct(&self, label: &str) -> bool {
        self.correct_answer.as_ref() == label
    }

    /// Rationale for picking `label`. Always `None` for the correct label.
    pub fn wrong_reason(&self, label: &str) -> Option<&str> {
        if self.is_correct(label) {
            return None;
        }
        self.wrong_reasons.get(label).map(AsRef::as_ref)
    }
}

/// The question bank of a single topic.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    pub topic_id: Box<str>,
    pub topic_name: Box<str>,
    /// Declared count. Validated against `questions.len()` at load time.
    pub total_questions: u32,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: Box<str>,
    pub content: Box<str>,
    #[serde(default)]
    pub key_points: Vec<Box<str>>,
}

const fn default_reading_time() -> u16 {
    5
}

/// Reading material of a topic.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub topic_id: Box<str>,
    pub title: Box<str>,
    pub name_en: Box<str>,
    pub name_th: Box<str>,
    #[serde(default = "default_reading_time")]
    pub reading_time_min: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub tags: Vec<Box<str>>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Entry of the topic index.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicListing<'a> {
    pub slug: &'a str,
    pub name_en: &'a str,
    pub name_th: &'a str,
    pub reading_time_min: u16,
    pub question_count: u32,
    pub tags: &'a [Box<str>],
}

/// A summary document augmented with the size of its question bank.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail<'a> {
    #[serde(flatten)]
    pub summary: &'a Summary,
    pub question_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTION: &str = r#"{
        "id": 7,
        "questionText": "Which layer does MQTT operate on?",
        "difficulty": "medium",
        "tags": ["protocols"],
        "choices": [
            { "label": "A", "text": "Physical" },
            { "label": "B", "text": "Application" }
        ],
        "correctAnswer": "B",
        "explanation": "MQTT is an application-layer protocol.",
        "wrongReasons": { "A": "Physical layer concerns signalling." }
    }"#;

    #[test]
    fn parses_authored_question() {
        let question: Question = serde_json::from_str(QUESTION).unwrap();
        assert_eq!(question.id, 7);
        assert_eq!(question.difficulty, Difficulty::Medium);
        assert_eq!(question.choice("B").unwrap().text.as_ref(), "Application");
        assert!(question.choice("C").is_none());
        assert!(question.is_correct("B"));
        assert!(!question.is_correct("A"));
    }

    #[test]
    fn wrong_reason_is_never_given_for_correct_label() {
        let mut question: Question = serde_json::from_str(QUESTION).unwrap();
        assert_eq!(question.wrong_reason("A"), Some("Physical layer concerns signalling."));
        assert_eq!(question.wrong_reason("B"), None);

        question.wrong_reasons.insert("B".into(), "bogus".into());
        assert_eq!(question.wrong_reason("B"), None);
    }

    #[test]
    fn summary_defaults() {
        let summary: Summary = serde_json::from_str(
            r#"{ "topicId": "iot", "title": "IoT", "nameEn": "Internet of Things", "nameTh": "IoT" }"#,
        )
        .unwrap();
        assert_eq!(summary.reading_time_min, 5);
        assert!(summary.sort_order.is_none());
        assert!(summary.sections.is_empty());
    }

    #[test]
    fn detail_flattens_summary() {
        let summary: Summary = serde_json::from_str(
            r#"{ "topicId": "ai", "title": "AI", "nameEn": "Artificial Intelligence", "nameTh": "AI", "readingTimeMin": 8 }"#,
        )
        .unwrap();
        let value = serde_json::to_value(TopicDetail { summary: &summary, question_count: 12 }).unwrap();
        assert_eq!(value["nameEn"], "Artificial Intelligence");
        assert_eq!(value["readingTimeMin"], 8);
        assert_eq!(value["questionCount"], 12);
    }
}
