pub mod enums;
pub mod lab;
pub mod report;

pub use enums::{AgeGroup, Gender, Priority, SkipReason, Tier};
pub use lab::{
    AnalysisRequest, AssessedResult, LabInput, LabPanel, LabValue, PatientContext, PatientProfile,
};
pub use report::{NextStep, Pattern, Report, SkippedValue, TestDefinition, TierCounts};
