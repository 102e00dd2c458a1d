//! Catalog data model
//!
//! Topics own an ordered list of questions, and each question carries one or
//! more worked approaches. The catalog is written once at seed time and is
//! read-only from the client's point of view.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Difficulty label shown next to a question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// One worked solution for a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approach {
    /// Short name, e.g. "XOR Approach"
    pub title: String,
    /// Thought process and strategy
    pub strategy: String,
    /// Literal C++ source
    pub code: String,
}

impl Approach {
    pub fn new(
        title: impl Into<String>,
        strategy: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self { title: title.into(), strategy: strategy.into(), code: code.into() }
    }
}

/// A single problem in the set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable key, also the progress document id (e.g. "cses_1068")
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Link to the problem statement
    pub link: String,
    #[serde(default)]
    pub approaches: Vec<Approach>,
}

/// A named group of questions, stored as one catalog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Document key the topic was read from (empty before seeding)
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Display name
    #[serde(rename = "topic")]
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Topic {
    /// Decode a stored topic document, stamping its document key as the id
    pub fn from_document(key: &str, value: &Value) -> Result<Self, serde_json::Error> {
        let mut topic: Topic = serde_json::from_value(value.clone())?;
        topic.id = key.to_string();
        Ok(topic)
    }

    /// Find a question in this topic by id
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Total number of questions across the catalog
pub fn question_count(catalog: &[Topic]) -> usize {
    catalog.iter().map(|t| t.questions.len()).sum()
}

/// Look up a question anywhere in the catalog
///
/// Returns `None` when the catalog does not (yet) contain the id, which
/// happens transiently while a fresh catalog snapshot is in flight.
pub fn find_question<'a>(catalog: &'a [Topic], id: &str) -> Option<(&'a Topic, &'a Question)> {
    catalog.iter().find_map(|topic| topic.question(id).map(|q| (topic, q)))
}

/// Decode a catalog snapshot into topics, in document-key order
///
/// Documents that do not decode as topics are logged and skipped.
pub fn decode_catalog<'a>(
    documents: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> Vec<Topic> {
    documents
        .into_iter()
        .filter_map(|(key, value)| match Topic::from_document(key, value) {
            Ok(topic) => Some(topic),
            Err(e) => {
                tracing::warn!("Skipping malformed catalog document {}: {}", key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_topic() -> Topic {
        Topic {
            id: "Basics".into(),
            name: "Basics".into(),
            questions: vec![Question {
                id: "q1".into(),
                name: "First".into(),
                difficulty: Difficulty::Medium,
                link: "https://example.com/q1".into(),
                approaches: vec![Approach::new("Direct", "Just do it", "int main() {}")],
            }],
        }
    }

    #[test]
    fn topic_serializes_name_as_topic_field() {
        let value = serde_json::to_value(sample_topic()).unwrap();
        assert_eq!(value["topic"], "Basics");
        assert!(value.get("id").is_none());
        assert_eq!(value["questions"][0]["difficulty"], "Medium");
    }

    #[test]
    fn from_document_stamps_key() {
        let value = json!({
            "topic": "Graph Algorithms",
            "questions": [{"id": "g1", "name": "Counting Rooms", "link": "x"}]
        });
        let topic = Topic::from_document("Graph_Algorithms", &value).unwrap();
        assert_eq!(topic.id, "Graph_Algorithms");
        assert_eq!(topic.name, "Graph Algorithms");
        assert_eq!(topic.questions[0].difficulty, Difficulty::Easy);
        assert!(topic.questions[0].approaches.is_empty());
    }

    #[test]
    fn from_document_rejects_missing_name() {
        assert!(Topic::from_document("x", &json!({"questions": []})).is_err());
    }

    #[test]
    fn find_question_tolerates_missing_ids() {
        let catalog = vec![sample_topic()];
        let (topic, question) = find_question(&catalog, "q1").unwrap();
        assert_eq!(topic.name, "Basics");
        assert_eq!(question.name, "First");
        assert!(find_question(&catalog, "nope").is_none());
        assert_eq!(question_count(&catalog), 1);
    }

    #[test]
    fn decode_catalog_skips_bad_documents() {
        let good = serde_json::to_value(sample_topic()).unwrap();
        let bad = json!({"questions": "nope"});
        let docs = vec![("Basics".to_string(), good), ("Broken".to_string(), bad)];

        let catalog = decode_catalog(docs.iter().map(|(k, v)| (k, v)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, "Basics");
    }
}
