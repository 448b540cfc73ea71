//! Submission state machine driving the measurement form.
//!
//! Form events (`FieldChanged`, `Submit`, `Reset`) are dispatched into a
//! [`SubmissionOrchestrator`], which validates, calls the prediction client and
//! updates a rendering-agnostic [`FormView`].
//!
//! ```text
//! Idle -> Validating -> Submitting -> Success -> Idle
//!             |              \-----> Failed  -> Idle
//!             \-> Idle (invalid form, no request)
//! ```
//!
//! The submit control is held disabled by a [`SubmitLease`] for as long as a
//! request is in flight. The lease is released on drop, so every exit from
//! `Submitting` re-enables the control, including a cancelled future.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::{ClientError, PredictionClient};
use crate::models::{Field, FormInput};
use crate::preprocessing::FormValidator;
use crate::presentation::{CropCatalog, ResultView};
use crate::services::suitability::SuitabilityEstimator;

pub const LOADING_MESSAGE: &str = "Analyzing soil and climate data...";
pub const SUCCESS_MESSAGE: &str = "Prediction ready. Happy farming!";
pub const FAILURE_MESSAGE: &str = "Prediction failed. Please try again.";
pub const RESET_MESSAGE: &str = "Form cleared successfully!";

/// Lifecycle of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

impl SubmissionState {
    pub fn can_transition_to(&self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (*self, next),
            (Idle, Validating)
                | (Validating, Idle)
                | (Validating, Submitting)
                | (Submitting, Success)
                | (Submitting, Failed)
                | (Success, Idle)
                | (Failed, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Success => "success",
            SubmissionState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// Form-level message area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Everything a front end needs to draw the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormView {
    pub state: SubmissionState,
    field_errors: [Option<String>; 7],
    /// Field that should hold input focus.
    pub focus: Option<Field>,
    pub message: Option<Message>,
    pub result: Option<ResultView>,
}

impl FormView {
    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors[field.index()].as_deref()
    }

    pub fn has_errors(&self) -> bool {
        self.field_errors.iter().any(Option::is_some)
    }
}

/// User interaction with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    FieldChanged { field: Field, raw: String },
    Submit,
    Reset,
}

/// What a submit attempt led to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; no request was sent.
    Invalid { focus: Field },
    Succeeded,
    Failed(ClientError),
    /// A request is already in flight.
    Busy,
}

/// Shared enabled/disabled flag of the submit control.
#[derive(Debug, Clone)]
pub struct SubmitControl {
    enabled: Arc<AtomicBool>,
}

impl SubmitControl {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Disable the control, or return `None` if it is already disabled.
    pub fn try_acquire(&self) -> Option<SubmitLease> {
        self.enabled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitLease {
                enabled: Arc::clone(&self.enabled),
            })
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the submit control disabled until dropped.
#[derive(Debug)]
pub struct SubmitLease {
    enabled: Arc<AtomicBool>,
}

impl Drop for SubmitLease {
    fn drop(&mut self) {
        self.enabled.store(true, Ordering::Release);
    }
}

/// Event handler and state machine for the measurement form.
pub struct SubmissionOrchestrator<C: PredictionClient> {
    client: C,
    validator: FormValidator,
    estimator: SuitabilityEstimator,
    catalog: CropCatalog,
    form: FormInput,
    view: FormView,
    control: SubmitControl,
}

impl<C: PredictionClient> SubmissionOrchestrator<C> {
    pub fn new(
        client: C,
        validator: FormValidator,
        estimator: SuitabilityEstimator,
        catalog: CropCatalog,
    ) -> Self {
        Self {
            client,
            validator,
            estimator,
            catalog,
            form: FormInput::new(),
            view: FormView::default(),
            control: SubmitControl::new(),
        }
    }

    /// Orchestrator with the bounded validator and default tables.
    pub fn with_defaults(client: C) -> Self {
        Self::new(
            client,
            FormValidator::default(),
            SuitabilityEstimator::default(),
            CropCatalog::default(),
        )
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    /// The view with any abandoned submission already marked as failed.
    ///
    /// A dropped `on_submit` future leaves `Submitting` behind with the
    /// control re-enabled; this resolves it to `Failed` without waiting for
    /// the next event.
    pub fn settled_view(&mut self) -> &FormView {
        self.resolve_abandoned();
        &self.view
    }

    pub fn state(&self) -> SubmissionState {
        self.view.state
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Handle to the submit control, for front ends that grey out the button.
    pub fn submit_control(&self) -> SubmitControl {
        self.control.clone()
    }

    pub async fn dispatch(&mut self, event: FormEvent) -> Option<SubmitOutcome> {
        match event {
            FormEvent::FieldChanged { field, raw } => {
                self.on_field_changed(field, raw);
                None
            }
            FormEvent::Submit => Some(self.on_submit().await),
            FormEvent::Reset => {
                self.on_reset();
                None
            }
        }
    }

    /// Store the new raw value and re-validate that field.
    pub fn on_field_changed(&mut self, field: Field, raw: impl Into<String>) {
        self.settle();
        self.form.set(field, raw);
        let result = self.validator.validate(field, self.form.get(field));
        self.view.field_errors[field.index()] = result.message;
    }

    pub fn on_reset(&mut self) {
        self.settle();
        self.form.clear();
        self.view = FormView {
            message: Some(Message::new(MessageKind::Success, RESET_MESSAGE)),
            ..FormView::default()
        };
    }

    pub async fn on_submit(&mut self) -> SubmitOutcome {
        self.settle();
        if !self.control.is_enabled() {
            return SubmitOutcome::Busy;
        }

        self.transition(SubmissionState::Validating);
        self.view.message = None;
        self.view.result = None;
        self.view.focus = None;

        let validation = self.validator.validate_all(&self.form);
        for result in &validation.fields {
            self.view.field_errors[result.field.index()] = result.message.clone();
        }

        let Some(measurements) = validation.measurements() else {
            let focus = validation.first_invalid.unwrap_or(Field::Nitrogen);
            debug!("Submission blocked by validation, focusing {}", focus);
            self.view.focus = Some(focus);
            self.view.message = validation
                .summary
                .map(|text| Message::new(MessageKind::Error, text));
            self.transition(SubmissionState::Idle);
            return SubmitOutcome::Invalid { focus };
        };

        let Some(lease) = self.control.try_acquire() else {
            self.transition(SubmissionState::Idle);
            return SubmitOutcome::Busy;
        };

        self.transition(SubmissionState::Submitting);
        self.view.message = Some(Message::new(MessageKind::Info, LOADING_MESSAGE));
        info!("Submitting measurements: {:?}", measurements);

        let response = self.client.predict(&measurements).await;
        drop(lease);

        match response {
            Ok(prediction) => {
                let suitability = self.estimator.estimate(&measurements);
                info!(
                    "Prediction succeeded: crop={} confidence={:?} soil={} climate={}",
                    prediction.crop, prediction.confidence, suitability.soil, suitability.climate
                );
                self.view.result = Some(ResultView::build(&prediction, suitability, &self.catalog));
                self.view.message = Some(Message::new(MessageKind::Success, SUCCESS_MESSAGE));
                self.transition(SubmissionState::Success);
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                let text = match &e {
                    ClientError::ServiceError(message) => message.clone(),
                    _ => FAILURE_MESSAGE.to_string(),
                };
                self.view.message = Some(Message::new(MessageKind::Error, text));
                self.transition(SubmissionState::Failed);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Return to `Idle` before handling a new event.
    fn settle(&mut self) {
        self.resolve_abandoned();
        if matches!(self.view.state, SubmissionState::Success | SubmissionState::Failed) {
            self.transition(SubmissionState::Idle);
        }
    }

    fn resolve_abandoned(&mut self) {
        // Still `Submitting` with the lease gone: the in-flight future was dropped
        if self.view.state == SubmissionState::Submitting && self.control.is_enabled() {
            warn!("Previous submission was abandoned before completing");
            self.view.message = Some(Message::new(MessageKind::Error, FAILURE_MESSAGE));
            self.transition(SubmissionState::Failed);
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug_assert!(
            self.view.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.view.state.as_str(),
            next.as_str()
        );
        debug!("Submission state: {} -> {}", self.view.state.as_str(), next.as_str());
        self.view.state = next;
    }
}
