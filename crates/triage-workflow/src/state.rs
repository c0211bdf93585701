use crate::errors::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use triage_core::Category;

/// Everything the workflow knows about one email so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Partial write: only the fields that are `Some` replace the state's values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl StateUpdate {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_priority(mut self, priority_score: u8) -> Self {
        self.priority_score = Some(priority_score);
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl EmailState {
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(priority_score) = update.priority_score {
            self.priority_score = Some(priority_score);
        }
        if let Some(response) = update.response {
            self.response = Some(response);
        }
    }

    pub fn require_email(&self, node: &str) -> GraphResult<&str> {
        self.email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| GraphError::missing(node, "email"))
    }

    pub fn require_category(&self, node: &str) -> GraphResult<Category> {
        self.category.ok_or_else(|| GraphError::missing(node, "category"))
    }

    pub fn require_priority(&self, node: &str) -> GraphResult<u8> {
        self.priority_score
            .ok_or_else(|| GraphError::missing(node, "priority_score"))
    }
}

impl From<StateUpdate> for EmailState {
    fn from(update: StateUpdate) -> Self {
        let mut state = EmailState::default();
        state.apply(update);
        state
    }
}
