use std::{sync::Arc, time::Duration};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    identity::Identity,
    models::Severity,
    store::{Store, StoreError},
};

use super::{
    draft::{self, OrderValidationError},
    form::OrderForm,
    navigation::{AppRoute, Navigator},
};

pub const SUBMIT_SUCCEEDED_MESSAGE: &str = "Order submitted successfully.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit order. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded { order_id: Uuid },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FormMessage {
    pub severity: Severity,
    pub text: String,
}

impl FormMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSnapshot {
    pub state: SubmissionState,
    pub message: Option<FormMessage>,
}

impl SubmissionSnapshot {
    /// True while the submit control must stay disabled.
    pub fn loading(&self) -> bool {
        self.state == SubmissionState::Submitting
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] OrderValidationError),
    #[error("Failed to submit order. Please try again.")]
    Persistence(#[source] StoreError),
    #[error("a submission is already in progress")]
    Busy,
    #[error("this order has already been submitted")]
    AlreadySubmitted,
}

/// Drives one order submission from the form to a persisted record.
///
/// `Idle -> Submitting -> Succeeded | Failed`, `Failed -> Idle`.
/// `Succeeded` is final until [`SubmissionController::reset`].
pub struct SubmissionController<I, N> {
    store: Arc<dyn Store>,
    identity: I,
    navigator: N,
    confirmation_delay: Duration,
    idempotency_key: Uuid,
    snapshot: watch::Sender<SubmissionSnapshot>,
}

impl<I: Identity, N: Navigator> SubmissionController<I, N> {
    pub fn new(store: Arc<dyn Store>, identity: I, navigator: N) -> Self {
        let (snapshot, _) = watch::channel(SubmissionSnapshot {
            state: SubmissionState::Idle,
            message: None,
        });
        Self {
            store,
            identity,
            navigator,
            confirmation_delay: Duration::ZERO,
            idempotency_key: Uuid::new_v4(),
            snapshot,
        }
    }

    /// Time the success message stays up before navigating away.
    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    /// Replaces the generated key, e.g. with one supplied by a client.
    pub fn with_idempotency_key(mut self, key: Uuid) -> Self {
        self.idempotency_key = key;
        self
    }

    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.snapshot.borrow().state
    }

    pub fn loading(&self) -> bool {
        self.snapshot.borrow().loading()
    }

    pub fn message(&self) -> Option<FormMessage> {
        self.snapshot.borrow().message.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub async fn submit(&mut self, form: &OrderForm) -> Result<Uuid, SubmitError> {
        match self.state() {
            SubmissionState::Submitting => return Err(SubmitError::Busy),
            SubmissionState::Succeeded { .. } => return Err(SubmitError::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed => {}
        }

        let user = self.identity.current_user_value();
        let draft = match draft::build(user.as_ref(), form.service(), form.options(), form.notes())
        {
            Ok(draft) => draft
                .with_idempotency_key(self.idempotency_key)
                .with_pickup_at(form.pickup_at())
                .with_documents(form.documents().to_vec()),
            Err(err) => {
                tracing::debug!(error = %err, "order draft rejected");
                self.publish(SubmissionState::Idle, Some(FormMessage::error(err.to_string())));
                if err == OrderValidationError::NotAuthenticated {
                    self.navigator.navigate(AppRoute::SignIn);
                }
                return Err(err.into());
            }
        };

        self.publish(SubmissionState::Submitting, None);

        match self.store.create_order(&draft).await {
            Ok(order_id) => {
                tracing::info!(
                    order_id = %order_id,
                    user_id = %draft.user_id,
                    total_amount = draft.total_amount,
                    "order submitted"
                );
                self.publish(
                    SubmissionState::Succeeded { order_id },
                    Some(FormMessage::success(SUBMIT_SUCCEEDED_MESSAGE)),
                );
                if !self.confirmation_delay.is_zero() {
                    tokio::time::sleep(self.confirmation_delay).await;
                }
                self.navigator.navigate(AppRoute::OrderDetail(order_id));
                Ok(order_id)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    idempotency_key = %self.idempotency_key,
                    "order submission failed"
                );
                self.publish(
                    SubmissionState::Failed,
                    Some(FormMessage::error(SUBMIT_FAILED_MESSAGE)),
                );
                Err(SubmitError::Persistence(err))
            }
        }
    }

    /// Clears a failure so the form can be submitted again.
    pub fn acknowledge_failure(&mut self) {
        if self.state() == SubmissionState::Failed {
            self.publish(SubmissionState::Idle, None);
        }
    }

    /// Starts a fresh submission instance for a new order.
    pub fn reset(&mut self) {
        self.idempotency_key = Uuid::new_v4();
        self.publish(SubmissionState::Idle, None);
    }

    fn publish(&self, state: SubmissionState, message: Option<FormMessage>) {
        self.snapshot
            .send_replace(SubmissionSnapshot { state, message });
    }
}
