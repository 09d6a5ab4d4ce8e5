use printshop_api::{
    identity::{CurrentUser, Identity, Session},
    models::UserRole,
    store::{MemoryStore, NewUser, ProfilePatch, Store},
};
use uuid::Uuid;

fn current(id: Uuid, role: UserRole) -> CurrentUser {
    CurrentUser {
        id,
        email: format!("{id}@example.com"),
        name: "Ana".into(),
        role,
    }
}

#[tokio::test]
async fn late_subscribers_see_the_latest_user() {
    let mut session = Session::new();
    assert_eq!(*session.current_user().borrow(), None);

    let user = current(Uuid::new_v4(), UserRole::Customer);
    session.sign_in(user.clone());

    let late = session.current_user();
    assert_eq!(late.borrow().as_ref(), Some(&user));
    assert_eq!(session.current_user_value(), Some(user));
}

#[tokio::test]
async fn existing_subscribers_are_notified_on_sign_out() -> anyhow::Result<()> {
    let mut session = Session::signed_in(current(Uuid::new_v4(), UserRole::Admin));
    let mut rx = session.current_user();
    rx.borrow_and_update();

    session.sign_out();

    rx.changed().await?;
    assert_eq!(*rx.borrow(), None);
    assert_eq!(session.current_user_value(), None);
    Ok(())
}

#[tokio::test]
async fn profile_is_cached_and_cleared_on_sign_out() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let user = store
        .create_user(NewUser {
            email: "ana@example.com".into(),
            name: "Ana".into(),
            role: UserRole::Customer,
            password_hash: "x".into(),
        })
        .await?;
    let mut session = Session::signed_in(CurrentUser::from(&user));

    let loaded = session.load_profile(&store).await?.cloned();
    assert_eq!(loaded.map(|p| p.id), Some(user.id));

    let updated = store
        .update_profile(
            user.id,
            ProfilePatch {
                phone: Some("0917 000 0000".into()),
                ..Default::default()
            },
        )
        .await?
        .expect("user exists");
    session.cache_profile(updated);
    assert_eq!(
        session.profile().and_then(|p| p.phone.as_deref()),
        Some("0917 000 0000")
    );

    session.sign_out();
    assert!(session.profile().is_none());
    assert!(session.load_profile(&store).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn profiles_of_other_users_are_not_cached() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let other = store
        .create_user(NewUser {
            email: "other@example.com".into(),
            name: "Other".into(),
            role: UserRole::Customer,
            password_hash: "x".into(),
        })
        .await?;
    let mut session = Session::signed_in(current(Uuid::new_v4(), UserRole::Customer));

    session.cache_profile(other);
    assert!(session.profile().is_none());
    Ok(())
}
