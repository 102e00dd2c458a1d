//! View routing
//!
//! Three views: Dashboard (initial), Topic and Question. Transitions are pure
//! and carry the selected payload; nothing here touches the store.

use crate::catalog::{Question, Topic};

/// What the main area is showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Topic(Topic),
    Question { topic: Topic, question: Question },
}

/// A user intent that changes the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Sidebar dashboard entry
    Dashboard,
    /// Sidebar topic entry
    SelectTopic(Topic),
    /// Question row in the topic list
    SelectQuestion(Question),
    Back,
}

impl View {
    /// Apply a navigation intent
    ///
    /// `SelectQuestion` only makes sense from a topic, so it is ignored
    /// elsewhere. `Back` steps Question -> Topic -> Dashboard.
    pub fn navigate(self, navigation: Navigation) -> View {
        match (self, navigation) {
            (_, Navigation::Dashboard) => View::Dashboard,
            (_, Navigation::SelectTopic(topic)) => View::Topic(topic),
            (View::Topic(topic), Navigation::SelectQuestion(question)) => {
                View::Question { topic, question }
            }
            (View::Question { topic, .. }, Navigation::SelectQuestion(question)) => {
                View::Question { topic, question }
            }
            (view @ View::Dashboard, Navigation::SelectQuestion(_)) => view,
            (View::Question { topic, .. }, Navigation::Back) => View::Topic(topic),
            (View::Topic(_) | View::Dashboard, Navigation::Back) => View::Dashboard,
        }
    }

    /// Replace the carried payload with its copy from a fresh catalog
    ///
    /// When the topic or question no longer exists the old payload is kept,
    /// so the view never jumps because of a transient snapshot.
    pub fn refreshed(&self, catalog: &[Topic]) -> View {
        let fresh_topic = |topic: &Topic| catalog.iter().find(|t| t.id == topic.id).cloned();

        match self {
            View::Dashboard => View::Dashboard,
            View::Topic(topic) => View::Topic(fresh_topic(topic).unwrap_or_else(|| topic.clone())),
            View::Question { topic, question } => {
                let topic = fresh_topic(topic).unwrap_or_else(|| topic.clone());
                let question =
                    topic.question(&question.id).cloned().unwrap_or_else(|| question.clone());
                View::Question { topic, question }
            }
        }
    }

    /// Topic highlighted in the sidebar
    pub fn topic(&self) -> Option<&Topic> {
        match self {
            View::Dashboard => None,
            View::Topic(topic) | View::Question { topic, .. } => Some(topic),
        }
    }

    pub fn question(&self) -> Option<&Question> {
        match self {
            View::Question { question, .. } => Some(question),
            _ => None,
        }
    }

    /// Short name for the status bar
    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Topic(_) => "Topic",
            View::Question { .. } => "Question",
        }
    }
}
