//! Crop advisor client: measurement validation, suitability scoring and
//! submission to a crop prediction service.

pub mod client;
pub mod config;
pub mod models;
pub mod preprocessing;
pub mod presentation;
pub mod services;

pub use client::{ClientError, ClientResult, PredictionClient};
pub use config::{AdvisorConfig, ConfigError};
pub use models::{Field, FormInput, MeasurementSet, PredictionResult};
pub use services::{FormEvent, SubmissionOrchestrator, SubmissionState, SubmitOutcome};
