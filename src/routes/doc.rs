use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        menu::MenuResponse,
        orders::{
            OrderList, OrderRequest, OrderView, QuoteResponse, SubmitOrderResponse,
            UpdateOrderStatusRequest,
        },
        payments::{CreatePaymentRequest, PaymentList, PaymentView, VerifyPaymentRequest},
        profile::UpdateProfileRequest,
        services::{CreateServiceRequest, ServiceList, UpdateServiceRequest},
    },
    identity::CurrentUser,
    menu::{MenuEntry, MenuItem, Role},
    models::{
        Order, OrderStatus, Payment, PaymentMethod, PaymentStatus, Service, Severity, User,
        UserRole,
    },
    ordering::{
        ColorMode, Copies, DocumentRef, Orientation, PaperSize, PaperType, PrintOptions,
        pricing::PriceBreakdown, submission::FormMessage,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, menu, orders, params, payments, profile, services},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::logout,
        profile::get_profile,
        profile::update_profile,
        menu::get_menu,
        services::list_services,
        orders::quote,
        orders::submit_order,
        orders::list_orders,
        orders::get_order,
        orders::create_payment,
        payments::payment_history,
        payments::pending_payments,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::list_services,
        admin::create_service,
        admin::update_service,
        admin::list_all_payments,
        admin::verify_payment
    ),
    components(
        schemas(
            User,
            UserRole,
            CurrentUser,
            Service,
            Order,
            OrderStatus,
            Payment,
            PaymentMethod,
            PaymentStatus,
            Severity,
            PrintOptions,
            Copies,
            PaperSize,
            ColorMode,
            Orientation,
            PaperType,
            DocumentRef,
            PriceBreakdown,
            FormMessage,
            Role,
            MenuEntry,
            MenuItem,
            MenuResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            OrderRequest,
            QuoteResponse,
            OrderView,
            OrderList,
            SubmitOrderResponse,
            UpdateOrderStatusRequest,
            CreatePaymentRequest,
            VerifyPaymentRequest,
            PaymentView,
            PaymentList,
            CreateServiceRequest,
            UpdateServiceRequest,
            ServiceList,
            params::Pagination,
            params::SortOrder,
            params::OrderListQuery,
            params::PaymentListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<PaymentList>,
            ApiResponse<ServiceList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Profile", description = "Profile endpoints"),
        (name = "Menu", description = "Role-based navigation"),
        (name = "Services", description = "Print service catalog"),
        (name = "Orders", description = "Order pricing and submission"),
        (name = "Payments", description = "Payment endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
