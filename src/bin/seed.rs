use printshop_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    models::{Amount, UserRole},
    services::auth_service::hash_password,
    store::{NewService, NewUser, PgStore, Store},
};
use uuid::Uuid;

const DEFAULT_SERVICES: &[(&str, &str, Amount, Amount)] = &[
    ("Black & White Printing", "Plain text and document printing", 500, 200),
    ("Color Printing", "Full color document printing", 1000, 500),
    ("Photo Printing", "Glossy or matte photo prints", 2000, 1500),
    ("Document Binding", "Ring or tape binding", 5000, 0),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm, "migrations").await?;
    let store = PgStore::new(orm);

    let admin_id = ensure_user(
        &store,
        "admin@example.com",
        "Shop Admin",
        "admin1234",
        UserRole::Admin,
    )
    .await?;
    let user_id = ensure_user(
        &store,
        "user@example.com",
        "Sample Customer",
        "user12345",
        UserRole::Customer,
    )
    .await?;
    seed_services(&store).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    store: &dyn Store,
    email: &str,
    name: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = store.find_user_by_email(email).await? {
        println!("User {email} already exists (role={})", existing.role.as_str());
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = store
        .create_user(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            role,
            password_hash,
        })
        .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn seed_services(store: &dyn Store) -> anyhow::Result<()> {
    let existing = store.list_services(false).await?;
    for (name, description, base_price, price_per_page) in DEFAULT_SERVICES {
        if existing.iter().any(|s| s.name == *name) {
            continue;
        }
        store
            .create_service(NewService {
                name: name.to_string(),
                description: Some(description.to_string()),
                base_price: *base_price,
                price_per_page: *price_per_page,
                active: true,
            })
            .await?;
        println!("Seeded service {name}");
    }
    Ok(())
}
