use std::{sync::Arc, time::Duration};

use printshop_api::{
    identity::{CurrentUser, Session},
    models::{OrderStatus, PaymentStatus, Service, Severity, UserRole},
    ordering::{
        AppRoute, ColorMode, OrderForm, OrderValidationError, PaperType, RecordingNavigator,
        SubmissionController, SubmissionState, SubmitError,
        submission::{SUBMIT_FAILED_MESSAGE, SUBMIT_SUCCEEDED_MESSAGE},
    },
    store::{MemoryStore, NewService, Store},
};
use uuid::Uuid;

type Controller = SubmissionController<Session, RecordingNavigator>;

async fn seeded_store() -> anyhow::Result<(Arc<MemoryStore>, Service)> {
    let store = Arc::new(MemoryStore::new());
    let service = store
        .create_service(NewService {
            name: "Color Printing".into(),
            description: None,
            base_price: 5_000,
            price_per_page: 200,
            active: true,
        })
        .await?;
    Ok((store, service))
}

fn customer() -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        email: "maria@example.com".into(),
        name: "Maria".into(),
        role: UserRole::Customer,
    }
}

fn filled_form(service: &Service) -> OrderForm {
    let mut form = OrderForm::new();
    form.select_service(Some(service.clone()));
    form.set_copies(10);
    form.set_color_mode(ColorMode::Color);
    form.set_paper_type(PaperType::Glossy);
    form.set_notes("Pick up after lunch");
    form
}

fn controller(store: &Arc<MemoryStore>, session: Session) -> Controller {
    SubmissionController::new(store.clone(), session, RecordingNavigator::default())
}

#[tokio::test]
async fn successful_submit_persists_once_and_navigates_to_detail() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let user = customer();
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(user.clone()));

    let order_id = ctrl.submit(&form).await?;

    assert_eq!(store.create_order_calls(), 1);
    let order = store.get_order(order_id).await?.expect("order stored");
    assert_eq!(order.user_id, user.id);
    assert_eq!(order.service_id, service.id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.total_amount, 12_000);
    assert_eq!(order.notes.as_deref(), Some("Pick up after lunch"));

    assert_eq!(ctrl.state(), SubmissionState::Succeeded { order_id });
    assert!(!ctrl.loading());
    let message = ctrl.message().expect("success message");
    assert_eq!(message.severity, Severity::Success);
    assert_eq!(message.text, SUBMIT_SUCCEEDED_MESSAGE);
    assert_eq!(ctrl.navigator().routes(), [AppRoute::OrderDetail(order_id)]);
    Ok(())
}

#[tokio::test]
async fn store_failure_reports_error_and_stays_on_form() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()));
    store.fail_next_create("connection reset").await;

    let err = ctrl.submit(&form).await.unwrap_err();

    assert!(matches!(err, SubmitError::Persistence(_)));
    assert_eq!(ctrl.state(), SubmissionState::Failed);
    assert!(!ctrl.loading());
    let message = ctrl.message().expect("failure message");
    assert_eq!(message.severity, Severity::Danger);
    assert_eq!(message.text, SUBMIT_FAILED_MESSAGE);
    assert!(ctrl.navigator().routes().is_empty());
    assert_eq!(store.order_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn retry_after_failure_creates_a_single_order() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()));
    let key = ctrl.idempotency_key();
    store.fail_next_create("timeout").await;

    assert!(ctrl.submit(&form).await.is_err());
    let order_id = ctrl.submit(&form).await?;

    assert_eq!(ctrl.idempotency_key(), key);
    assert_eq!(store.create_order_calls(), 2);
    assert_eq!(store.order_count().await, 1);
    assert_eq!(ctrl.state(), SubmissionState::Succeeded { order_id });
    Ok(())
}

#[tokio::test]
async fn repeated_idempotency_key_returns_the_first_order() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let user = customer();
    let form = filled_form(&service);
    let key = Uuid::new_v4();

    let mut first = controller(&store, Session::signed_in(user.clone())).with_idempotency_key(key);
    let mut second = controller(&store, Session::signed_in(user)).with_idempotency_key(key);

    let a = first.submit(&form).await?;
    let b = second.submit(&form).await?;

    assert_eq!(a, b);
    assert_eq!(store.order_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn idempotency_keys_are_scoped_to_each_customer() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let key = Uuid::new_v4();
    let maria = customer();
    let jun = CurrentUser {
        id: Uuid::new_v4(),
        email: "jun@example.com".into(),
        name: "Jun".into(),
        role: UserRole::Customer,
    };

    let mut first = controller(&store, Session::signed_in(maria.clone())).with_idempotency_key(key);
    let mut second = controller(&store, Session::signed_in(jun.clone())).with_idempotency_key(key);

    let a = first.submit(&form).await?;
    let b = second.submit(&form).await?;

    assert_ne!(a, b);
    assert_eq!(store.order_count().await, 2);
    assert_eq!(store.get_order(a).await?.map(|o| o.user_id), Some(maria.id));
    assert_eq!(store.get_order(b).await?.map(|o| o.user_id), Some(jun.id));
    Ok(())
}

#[tokio::test]
async fn loading_is_published_while_the_store_call_is_in_flight() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()));
    let mut updates = ctrl.subscribe();
    let gate = store.gate_creates().await;

    let observer = async {
        let seen = updates
            .wait_for(|snapshot| snapshot.state == SubmissionState::Submitting)
            .await
            .map(|snapshot| (snapshot.loading(), snapshot.message.clone()));
        gate.notify_one();
        seen
    };
    let (result, seen) = tokio::join!(ctrl.submit(&form), observer);

    let (loading, message) = seen?;
    assert!(loading);
    assert_eq!(message, None);
    result?;
    assert!(!ctrl.loading());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_in_flight_is_rejected() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()));
    let _gate = store.gate_creates().await;

    let abandoned = tokio::time::timeout(Duration::from_secs(5), ctrl.submit(&form)).await;
    assert!(abandoned.is_err());
    assert_eq!(ctrl.state(), SubmissionState::Submitting);

    let err = ctrl.submit(&form).await.unwrap_err();
    assert!(matches!(err, SubmitError::Busy));
    assert_eq!(store.create_order_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn succeeded_is_final_until_reset() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()));
    let first_key = ctrl.idempotency_key();

    ctrl.submit(&form).await?;
    let err = ctrl.submit(&form).await.unwrap_err();
    assert!(matches!(err, SubmitError::AlreadySubmitted));

    ctrl.reset();
    assert_eq!(ctrl.state(), SubmissionState::Idle);
    assert_ne!(ctrl.idempotency_key(), first_key);
    ctrl.submit(&form).await?;
    assert_eq!(store.order_count().await, 2);
    Ok(())
}

#[tokio::test]
async fn acknowledging_a_failure_returns_to_idle() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()));
    store.fail_next_create("down").await;

    let _ = ctrl.submit(&form).await;
    ctrl.acknowledge_failure();

    assert_eq!(ctrl.state(), SubmissionState::Idle);
    assert_eq!(ctrl.message(), None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn navigation_waits_for_the_confirmation_delay() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::signed_in(customer()))
        .with_confirmation_delay(Duration::from_secs(2));
    let mut updates = ctrl.subscribe();
    let started = tokio::time::Instant::now();

    let observer = async {
        updates
            .wait_for(|snapshot| matches!(snapshot.state, SubmissionState::Succeeded { .. }))
            .await
            .map(|_| started.elapsed())
    };
    let (result, success_seen_after) = tokio::join!(ctrl.submit(&form), observer);
    let order_id = result?;

    assert!(success_seen_after? < Duration::from_secs(2));
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(ctrl.navigator().last(), Some(AppRoute::OrderDetail(order_id)));
    Ok(())
}

#[tokio::test]
async fn signed_out_submit_is_rejected_and_sent_to_sign_in() -> anyhow::Result<()> {
    let (store, service) = seeded_store().await?;
    let form = filled_form(&service);
    let mut ctrl = controller(&store, Session::new());

    let err = ctrl.submit(&form).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Invalid(OrderValidationError::NotAuthenticated)
    ));
    assert_eq!(ctrl.state(), SubmissionState::Idle);
    assert_eq!(
        ctrl.message().map(|m| m.text),
        Some("Please sign in to place an order.".to_string())
    );
    assert_eq!(ctrl.navigator().routes(), [AppRoute::SignIn]);
    assert_eq!(store.create_order_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_service_is_reported_without_touching_the_store() -> anyhow::Result<()> {
    let (store, _) = seeded_store().await?;
    let mut ctrl = controller(&store, Session::signed_in(customer()));

    let err = ctrl.submit(&OrderForm::new()).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Invalid(OrderValidationError::MissingService)
    ));
    assert_eq!(
        ctrl.message().map(|m| m.text),
        Some("Please select a service.".to_string())
    );
    assert!(ctrl.navigator().routes().is_empty());
    assert_eq!(store.create_order_calls(), 0);
    Ok(())
}
