pub mod assessment;
pub mod detection;
pub mod engine;
pub mod knowledge;
pub mod messages;
pub mod normalize;
pub mod reference;
pub mod report;
pub mod types;

pub use assessment::RiskAssessor;
pub use detection::{PatternDetector, PatternRule};
pub use engine::DefaultLabInterpreter;
pub use knowledge::KnowledgeBase;
pub use messages::MessageTemplates;
pub use normalize::normalize_entry;
pub use reference::{normalize_test_name, ReferenceRangeRepository};
pub use report::build_report;
pub use types::{InterpretError, LabInterpreter};
