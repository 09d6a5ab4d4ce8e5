use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use printshop_api::{
    build_router,
    config::AppConfig,
    models::{User, UserRole},
    services::auth_service::issue_token,
    state::AppState,
    store::{MemoryStore, NewUser, Store},
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    config: AppConfig,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::for_tests("test-secret");
        let router = build_router(AppState::new(store.clone(), config.clone()));
        Self {
            router,
            store,
            config,
        }
    }

    async fn user(&self, email: &str, role: UserRole) -> anyhow::Result<(User, String)> {
        let user = self
            .store
            .create_user(NewUser {
                email: email.into(),
                name: email.split('@').next().unwrap_or_default().into(),
                role,
                password_hash: "not-used".into(),
            })
            .await?;
        let token = issue_token(&self.config, &user)?;
        Ok((user, format!("Bearer {token}")))
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send_with(method, uri, token, &[], body).await
    }

    async fn send_with(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    async fn create_service(&self, admin: &str, name: &str) -> anyhow::Result<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/services",
                Some(admin),
                Some(json!({ "name": name, "base_price": 5000, "price_per_page": 200 })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Ok(body["data"]["id"].as_str().unwrap_or_default().to_string())
    }
}

fn glossy_color_order(service_id: &str) -> Value {
    json!({
        "service_id": service_id,
        "print_options": {
            "paper_size": "A4",
            "color_mode": "color",
            "copies": 10,
            "orientation": "portrait",
            "paper_type": "glossy"
        },
        "notes": "Staple top left",
        "documents": [{ "name": "thesis.pdf", "size_bytes": 20480 }]
    })
}

#[tokio::test]
async fn register_login_and_read_profile() -> anyhow::Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "Rosa@Example.com", "password": "printing123", "name": "Rosa" })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], "rosa@example.com");
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "rosa@example.com", "password": "printing123" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "rosa@example.com", "password": "wrong-password" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "rosa@example.com", "password": "printing123" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let token = body["data"]["token"].as_str().unwrap_or_default().to_string();
    assert!(token.starts_with("Bearer "));
    assert_eq!(body["data"]["user"]["role"], "customer");

    let (status, body) = app
        .send(
            Method::PATCH,
            "/api/profile",
            Some(&token),
            Some(json!({ "phone": " 0917 123 4567 ", "address": "Quezon City" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["phone"], "0917 123 4567");

    let (status, body) = app.send(Method::GET, "/api/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Rosa");
    assert_eq!(body["data"]["address"], "Quezon City");

    let (status, _) = app.send(Method::POST, "/api/auth/logout", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    let actions = app.store.audit_actions().await;
    assert!(actions.contains(&"user_register".to_string()));
    assert!(actions.contains(&"user_login".to_string()));
    assert!(actions.contains(&"user_logout".to_string()));
    Ok(())
}

#[tokio::test]
async fn quote_needs_no_sign_in() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let service_id = app.create_service(&admin, "Color Printing").await?;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/orders/quote",
            None,
            Some(glossy_color_order(&service_id)),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total_amount"], 12_000);
    assert_eq!(body["data"]["breakdown"]["paper_surcharge"], 3_000);

    let (status, body) = app
        .send(Method::POST, "/api/orders/quote", None, Some(json!({})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"], 0);
    Ok(())
}

#[tokio::test]
async fn submit_creates_a_pending_order_and_redirects_to_it() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (customer, token) = app.user("lia@example.com", UserRole::Customer).await?;
    let service_id = app.create_service(&admin, "Color Printing").await?;
    let key = "7f1d5a0e-3c1b-4d8e-9b65-2f9a3c0d4e11";

    let (status, body) = app
        .send_with(
            Method::POST,
            "/api/orders",
            Some(&token),
            &[("idempotency-key", key)],
            Some(glossy_color_order(&service_id)),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = &body["data"]["order"];
    let order_id = order["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(order["user_id"], customer.id.to_string());
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "unpaid");
    assert_eq!(order["status_severity"], "warn");
    assert_eq!(order["payment_status_severity"], "danger");
    assert_eq!(order["total_amount"], 12_000);
    assert_eq!(order["documents"][0]["name"], "thesis.pdf");
    assert_eq!(body["data"]["redirect_to"], format!("/orders/{order_id}"));
    assert_eq!(body["data"]["message"]["text"], "Order submitted successfully.");

    let (status, body) = app
        .send_with(
            Method::POST,
            "/api/orders",
            Some(&token),
            &[("idempotency-key", key)],
            Some(glossy_color_order(&service_id)),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["order"]["id"], order_id.as_str());
    assert_eq!(app.store.order_count().await, 1);

    let (status, body) = app
        .send(Method::GET, "/api/orders?status=pending&q=ord-", Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["meta"]["total"], 1);

    let (status, _) = app
        .send(Method::GET, &format!("/api/orders/{order_id}"), Some(&token), None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, stranger) = app.user("someone@example.com", UserRole::Customer).await?;
    let (status, _) = app
        .send(Method::GET, &format!("/api/orders/{order_id}"), Some(&stranger), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn reused_idempotency_key_from_another_customer_creates_their_own_order()
-> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (lia, lia_token) = app.user("lia@example.com", UserRole::Customer).await?;
    let (ben, ben_token) = app.user("ben@example.com", UserRole::Customer).await?;
    let service_id = app.create_service(&admin, "Color Printing").await?;
    let key = "0b8e2f4c-6a1d-4e3f-8c2b-9d7a5e1f3c60";

    let (status, body) = app
        .send_with(
            Method::POST,
            "/api/orders",
            Some(&lia_token),
            &[("idempotency-key", key)],
            Some(glossy_color_order(&service_id)),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let lia_order = body["data"]["order"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .send_with(
            Method::POST,
            "/api/orders",
            Some(&ben_token),
            &[("idempotency-key", key)],
            Some(json!({ "service_id": service_id, "notes": "Ben's flyers" })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = &body["data"]["order"];
    assert_ne!(order["id"], lia_order.as_str());
    assert_eq!(order["user_id"], ben.id.to_string());
    assert_eq!(order["notes"], "Ben's flyers");
    assert_eq!(order["total_amount"], 5_200);
    assert_eq!(app.store.order_count().await, 2);

    let (_, body) = app
        .send(Method::GET, &format!("/api/orders/{lia_order}"), Some(&lia_token), None)
        .await?;
    assert_eq!(body["data"]["user_id"], lia.id.to_string());
    assert_eq!(body["data"]["notes"], "Staple top left");
    Ok(())
}

#[tokio::test]
async fn page_numbers_past_the_limit_return_an_empty_page() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (_, token) = app.user("lia@example.com", UserRole::Customer).await?;

    for (uri, auth) in [
        ("/api/orders", &token),
        ("/api/admin/orders", &admin),
        ("/api/admin/payments", &admin),
    ] {
        let uri = format!("{uri}?page=9223372036854775807&per_page=100");
        let (status, body) = app.send(Method::GET, &uri, Some(auth.as_str()), None).await?;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0), "{uri}");
        assert_eq!(body["meta"]["page"], 1_000_000, "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn service_prices_above_the_ceiling_are_rejected() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/services",
            Some(&admin),
            Some(json!({ "name": "Banner", "base_price": i64::MAX, "price_per_page": 0 })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let service_id = app.create_service(&admin, "Poster").await?;
    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/services/{service_id}"),
            Some(&admin),
            Some(json!({ "price_per_page": i64::MAX })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/orders/quote",
            None,
            Some(json!({ "service_id": service_id, "print_options": { "copies": 1000 } })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total_amount"], 5_000 + 200 * 1_000);
    Ok(())
}

#[tokio::test]
async fn submit_rejections_use_form_messages() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (_, token) = app.user("lia@example.com", UserRole::Customer).await?;
    let service_id = app.create_service(&admin, "Color Printing").await?;

    let (status, body) = app
        .send(Method::POST, "/api/orders", None, Some(glossy_color_order(&service_id)))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please sign in to place an order.");

    let (status, body) = app
        .send(Method::POST, "/api/orders", Some(&token), Some(json!({ "notes": "hi" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please select a service.");

    let mut with_image = glossy_color_order(&service_id);
    with_image["documents"] = json!([{ "name": "scan.png", "size_bytes": 10 }]);
    let (status, _) = app
        .send(Method::POST, "/api/orders", Some(&token), Some(with_image))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.store.fail_next_create("database offline").await;
    let (status, body) = app
        .send(Method::POST, "/api/orders", Some(&token), Some(glossy_color_order(&service_id)))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to submit order. Please try again.");
    assert_eq!(app.store.order_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn payment_verification_is_mirrored_onto_the_order() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (_, token) = app.user("lia@example.com", UserRole::Customer).await?;
    let service_id = app.create_service(&admin, "Color Printing").await?;

    let (_, body) = app
        .send(Method::POST, "/api/orders", Some(&token), Some(glossy_color_order(&service_id)))
        .await?;
    let order_id = body["data"]["order"]["id"].as_str().unwrap_or_default().to_string();
    let payments_uri = format!("/api/orders/{order_id}/payments");

    let (status, _) = app
        .send(
            Method::POST,
            &payments_uri,
            Some(&token),
            Some(json!({ "payment_method": "gcash", "receipt_ref": "receipts/1.jpg" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            &payments_uri,
            Some(&token),
            Some(json!({
                "payment_method": "gcash",
                "reference_no": "GC-0001",
                "receipt_ref": "receipts/1.jpg"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["amount"], 12_000);
    let payment_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (_, body) = app.send(Method::GET, "/api/payments/pending", Some(&token), None).await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    let verify_uri = format!("/api/admin/payments/{payment_id}/verify");
    let (status, _) = app
        .send(Method::PATCH, &verify_uri, Some(&token), Some(json!({ "status": "paid" })))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PATCH, &verify_uri, Some(&admin), Some(json!({ "status": "paid" })))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status_severity"], "success");

    let (_, body) = app
        .send(Method::GET, &format!("/api/orders/{order_id}"), Some(&token), None)
        .await?;
    assert_eq!(body["data"]["payment_status"], "paid");

    let (status, _) = app
        .send(
            Method::POST,
            &payments_uri,
            Some(&token),
            Some(json!({ "payment_method": "pay_on_shop" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_endpoints_reject_customers() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (_, token) = app.user("lia@example.com", UserRole::Customer).await?;
    let service_id = app.create_service(&admin, "Photo Printing").await?;

    for uri in ["/api/admin/orders", "/api/admin/services", "/api/admin/payments"] {
        let (status, _) = app.send(Method::GET, uri, Some(&token), None).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
    let (status, _) = app.send(Method::GET, "/api/admin/orders", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/services/{service_id}"),
            Some(&admin),
            Some(json!({ "active": false })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = app.send(Method::GET, "/api/services", None, None).await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
    let (_, body) = app.send(Method::GET, "/api/admin/services", Some(&admin), None).await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/services",
            Some(&admin),
            Some(json!({ "name": "Photo Printing", "base_price": 100 })),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn admin_moves_orders_through_statuses() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;
    let (_, token) = app.user("lia@example.com", UserRole::Customer).await?;
    let service_id = app.create_service(&admin, "Color Printing").await?;
    let (_, body) = app
        .send(Method::POST, "/api/orders", Some(&token), Some(glossy_color_order(&service_id)))
        .await?;
    let order_id = body["data"]["order"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/orders/{order_id}/status"),
            Some(&admin),
            Some(json!({ "status": "processing" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "processing");
    assert_eq!(body["data"]["status_severity"], "info");

    let (_, body) = app
        .send(Method::GET, "/api/admin/orders?status=processing", Some(&admin), None)
        .await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
    let (_, body) = app
        .send(Method::GET, "/api/admin/orders?status=pending", Some(&admin), None)
        .await?;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn menu_matches_the_caller_role() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", UserRole::Admin).await?;

    let (status, body) = app.send(Method::GET, "/api/menu", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "guest");

    let (_, body) = app.send(Method::GET, "/api/menu", Some(&admin), None).await?;
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["entries"][1]["label"], "Order Management");

    let (status, _) = app
        .send(Method::GET, "/api/menu", Some("Bearer not-a-token"), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_return_not_found() -> anyhow::Result<()> {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/nowhere", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/api/nowhere");

    let (status, body) = app.send(Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["store"], "memory");
    Ok(())
}
