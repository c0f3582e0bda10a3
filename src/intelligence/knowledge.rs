use std::collections::HashMap;
use std::path::Path;

use crate::config::TEST_KNOWLEDGE_FILE;
use crate::models::TestDefinition;

use super::reference::normalize_test_name;
use super::types::InterpretError;

static BUNDLED_KNOWLEDGE: &str = include_str!("../../resources/test_knowledge.json");

/// Plain-language background per test, keyed like the reference ranges.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, TestDefinition>,
}

impl KnowledgeBase {
    pub fn bundled() -> Result<Self, InterpretError> {
        Self::from_json(TEST_KNOWLEDGE_FILE, BUNDLED_KNOWLEDGE)
    }

    /// Load `test_knowledge.json` from a resources directory.
    pub fn load(resources_dir: &Path) -> Result<Self, InterpretError> {
        let path = resources_dir.join(TEST_KNOWLEDGE_FILE);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            InterpretError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        Self::from_json(TEST_KNOWLEDGE_FILE, &json)
    }

    pub fn from_json(source: &str, json: &str) -> Result<Self, InterpretError> {
        let definitions: Vec<TestDefinition> = serde_json::from_str(json)
            .map_err(|e| InterpretError::ReferenceDataParse(source.into(), e.to_string()))?;

        let mut entries = HashMap::with_capacity(definitions.len());
        for mut definition in definitions {
            let key = normalize_test_name(&definition.test_key);
            if key.is_empty() || definition.definition.trim().is_empty() {
                return Err(InterpretError::ReferenceDataParse(
                    source.into(),
                    format!("incomplete entry '{}'", definition.test_key),
                ));
            }
            definition.test_key = key.clone();
            if entries.insert(key.clone(), definition).is_some() {
                return Err(InterpretError::ReferenceDataParse(
                    source.into(),
                    format!("duplicate entry '{}'", key),
                ));
            }
        }
        Ok(Self { entries })
    }

    pub fn describe(&self, test_name: &str) -> Option<&TestDefinition> {
        self.entries.get(&normalize_test_name(test_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
