//! Who is acting.
//!
//! Every operation that depends on the logged-in operator takes an
//! [`OperatorContext`] explicitly. There is no ambient "current user".

use serde::{Deserialize, Serialize};

/// The operator performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorContext {
    /// Authenticated user id (the auth layer is external)
    pub operator_id: String,

    pub display_name: Option<String>,
}

impl OperatorContext {
    pub fn new(operator_id: impl Into<String>) -> Self {
        OperatorContext {
            operator_id: operator_id.into(),
            display_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.operator_id
    }
}
