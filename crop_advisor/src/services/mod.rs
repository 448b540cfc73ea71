pub mod submission;
pub mod suitability;

pub use submission::{
    FormEvent, FormView, Message, MessageKind, SubmissionOrchestrator, SubmissionState,
    SubmitControl, SubmitLease, SubmitOutcome,
};
pub use suitability::{
    estimate_climate, estimate_soil, ReferencePoint, ReferenceTable, SuitabilityEstimator,
    SuitabilityScore,
};
