//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: vigil — threshold-custody trusted authority for versioned records.
//

//! Triage classification. The orchestrator only ever sees a [`Priority`]
//! label — what produces it is an external collaborator and is not
//! modeled beyond this trait.

use std::str::FromStr;

use async_trait::async_trait;
use vigil_types::Priority;

use crate::error::CoreResult;

#[async_trait]
pub trait TriageClassifier: Send + Sync {
    async fn classify(&self, bytes: &[u8], filename: &str) -> CoreResult<Priority>;
}

/// Forces a fixed priority, ignoring the file entirely. Backs the
/// `MOCK_LLM_PRIORITY` environment override, and stands in for a real
/// classifier in tests.
pub struct MockClassifier {
    priority: Priority,
}

impl MockClassifier {
    pub fn new(priority: Priority) -> Self {
        Self { priority }
    }

    /// Build from `MOCK_LLM_PRIORITY`, defaulting unknown or missing values
    /// to MEDIUM.
    pub fn from_env_or_medium() -> Self {
        let priority = std::env::var("MOCK_LLM_PRIORITY")
            .ok()
            .and_then(|v| Priority::from_str(&v).ok())
            .unwrap_or(Priority::Medium);
        Self::new(priority)
    }
}

#[async_trait]
impl TriageClassifier for MockClassifier {
    async fn classify(&self, _bytes: &[u8], _filename: &str) -> CoreResult<Priority> {
        Ok(self.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_falls_back_to_medium_for_unknown_values() {
        std::env::set_var("MOCK_LLM_PRIORITY", "urgent");
        let classifier = MockClassifier::from_env_or_medium();
        assert_eq!(classifier.priority, Priority::Medium);
        std::env::remove_var("MOCK_LLM_PRIORITY");
    }

    #[tokio::test]
    async fn mock_classifier_always_returns_its_priority() {
        let classifier = MockClassifier::new(Priority::High);
        let result = classifier.classify(b"data", "file.txt").await.unwrap();
        assert_eq!(result, Priority::High);
    }
}
