use std::fmt::Display;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        payments::{
            ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments,
            Model as PaymentModel,
        },
        services::{
            ActiveModel as ServiceActive, Column as ServiceCol, Entity as Services,
            Model as ServiceModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    models::{Order, Payment, PaymentStatus, Service, User},
    ordering::OrderDraft,
};

use super::{
    AuditEntry, NewPayment, NewService, NewUser, OrderFilter, OrderPatch, Page, PageRequest,
    PaymentFilter, ProfilePatch, ServicePatch, Store, StoreError, build_order_number,
};

/// PostgreSQL backend: sea-orm for records, the raw sqlx pool for audit rows.
#[derive(Clone)]
pub struct PgStore {
    orm: DatabaseConnection,
    pool: PgPool,
}

impl PgStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        let pool = orm.get_postgres_connection_pool().clone();
        Self { orm, pool }
    }

    /// Order already created by `draft.user_id` under the draft's key.
    async fn order_for_key(&self, draft: &OrderDraft) -> Result<Option<Uuid>, StoreError> {
        let existing = Orders::find()
            .filter(OrderCol::UserId.eq(draft.user_id))
            .filter(OrderCol::IdempotencyKey.eq(draft.idempotency_key))
            .one(&self.orm)
            .await?;
        Ok(existing.map(|order| order.id))
    }
}

fn corrupt(err: impl Display) -> StoreError {
    StoreError::Corrupt(err.to_string())
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let model = UserActive {
            id: Set(Uuid::new_v4()),
            email: Set(user.email),
            name: Set(user.name),
            role: Set(user.role.as_str().to_string()),
            phone: Set(None),
            address: Set(None),
            password_hash: Set(user.password_hash),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.orm)
        .await?;
        user_from_entity(model)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Users::find()
            .filter(UserCol::Email.eq(email))
            .one(&self.orm)
            .await?
            .map(user_from_entity)
            .transpose()
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Users::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(user_from_entity)
            .transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: ProfilePatch,
    ) -> Result<Option<User>, StoreError> {
        let Some(existing) = Users::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };
        let mut active: UserActive = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(phone) = patch.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = patch.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.orm).await?;
        user_from_entity(model).map(Some)
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, StoreError> {
        let mut finder = Services::find();
        if active_only {
            finder = finder.filter(ServiceCol::Active.eq(true));
        }
        let services = finder
            .order_by_asc(ServiceCol::Name)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(service_from_entity)
            .collect();
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, StoreError> {
        Ok(Services::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(service_from_entity))
    }

    async fn create_service(&self, service: NewService) -> Result<Service, StoreError> {
        let exists = Services::find()
            .filter(ServiceCol::Name.eq(service.name.as_str()))
            .one(&self.orm)
            .await?;
        if exists.is_some() {
            return Err(StoreError::Conflict(format!(
                "service {} exists",
                service.name
            )));
        }

        let model = ServiceActive {
            id: Set(Uuid::new_v4()),
            name: Set(service.name),
            description: Set(service.description),
            base_price: Set(service.base_price),
            price_per_page: Set(service.price_per_page),
            active: Set(service.active),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.orm)
        .await?;
        Ok(service_from_entity(model))
    }

    async fn update_service(
        &self,
        id: Uuid,
        patch: ServicePatch,
    ) -> Result<Option<Service>, StoreError> {
        let Some(existing) = Services::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };
        let mut active: ServiceActive = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(base_price) = patch.base_price {
            active.base_price = Set(base_price);
        }
        if let Some(price_per_page) = patch.price_per_page {
            active.price_per_page = Set(price_per_page);
        }
        if let Some(flag) = patch.active {
            active.active = Set(flag);
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.orm).await?;
        Ok(Some(service_from_entity(model)))
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Uuid, StoreError> {
        if let Some(existing) = self.order_for_key(draft).await? {
            tracing::debug!(order_id = %existing, "idempotent replay of order draft");
            return Ok(existing);
        }

        let order_id = Uuid::new_v4();
        let print_options = serde_json::to_value(draft.print_options).map_err(corrupt)?;
        let documents = serde_json::to_value(&draft.documents).map_err(corrupt)?;

        let inserted = OrderActive {
            id: Set(order_id),
            order_number: Set(build_order_number(order_id)),
            idempotency_key: Set(draft.idempotency_key),
            user_id: Set(draft.user_id),
            service_id: Set(draft.service_id),
            status: Set(draft.status.as_str().to_string()),
            payment_status: Set(draft.payment_status.as_str().to_string()),
            total_amount: Set(draft.total_amount),
            print_options: Set(print_options),
            notes: Set(draft.notes.clone()),
            pickup_at: Set(draft.pickup_at.map(Into::into)),
            documents: Set(documents),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.orm)
        .await;

        match inserted {
            Ok(order) => Ok(order.id),
            // A concurrent request with the same key committed first.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                match self.order_for_key(draft).await? {
                    Some(existing) => {
                        tracing::debug!(order_id = %existing, "lost idempotent insert race");
                        Ok(existing)
                    }
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Orders::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(order_from_entity)
            .transpose()
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let mut condition = Condition::all();
        if let Some(user_id) = filter.user_id {
            condition = condition.add(OrderCol::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(OrderCol::Status.eq(status.as_str()));
        }
        if let Some(search) = filter.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(OrderCol::OrderNumber).ilike(pattern.clone()))
                    .add(Expr::col(OrderCol::Status).ilike(pattern)),
            );
        }

        let mut finder = Orders::find().filter(condition);
        finder = if filter.oldest_first {
            finder.order_by_asc(OrderCol::CreatedAt)
        } else {
            finder.order_by_desc(OrderCol::CreatedAt)
        };

        let total = finder.clone().count(&self.orm).await?;

        let items = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    async fn update_order(
        &self,
        id: Uuid,
        patch: OrderPatch,
    ) -> Result<Option<Order>, StoreError> {
        let Some(existing) = Orders::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };
        let mut active: OrderActive = existing.into();
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(payment_status) = patch.payment_status {
            active.payment_status = Set(payment_status.as_str().to_string());
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.orm).await?;
        order_from_entity(model).map(Some)
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let model = PaymentActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(payment.order_id),
            user_id: Set(payment.user_id),
            reference_no: Set(payment.reference_no),
            amount: Set(payment.amount),
            payment_method: Set(payment.payment_method.as_str().to_string()),
            status: Set(payment.status.as_str().to_string()),
            receipt_ref: Set(payment.receipt_ref),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.orm)
        .await?;
        payment_from_entity(model)
    }

    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        Payments::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(payment_from_entity)
            .transpose()
    }

    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, StoreError> {
        let mut condition = Condition::all();
        if let Some(user_id) = filter.user_id {
            condition = condition.add(PaymentCol::UserId.eq(user_id));
        }
        if let Some(order_id) = filter.order_id {
            condition = condition.add(PaymentCol::OrderId.eq(order_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(PaymentCol::Status.eq(status.as_str()));
        }

        let finder = Payments::find()
            .filter(condition)
            .order_by_desc(PaymentCol::CreatedAt);
        let total = finder.clone().count(&self.orm).await?;

        let items = finder
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(payment_from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError> {
        let Some(existing) = Payments::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };
        let mut active: PaymentActive = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.orm).await?;
        payment_from_entity(model).map(Some)
    }

    async fn record_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, resource, metadata)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.resource)
        .bind(entry.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn user_from_entity(model: UserModel) -> Result<User, StoreError> {
    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        role: model.role.parse().map_err(corrupt)?,
        phone: model.phone,
        address: model.address,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn service_from_entity(model: ServiceModel) -> Service {
    Service {
        id: model.id,
        name: model.name,
        description: model.description,
        base_price: model.base_price,
        price_per_page: model.price_per_page,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_from_entity(model: OrderModel) -> Result<Order, StoreError> {
    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        user_id: model.user_id,
        service_id: model.service_id,
        status: model.status.parse().map_err(corrupt)?,
        payment_status: model.payment_status.parse().map_err(corrupt)?,
        total_amount: model.total_amount,
        print_options: serde_json::from_value(model.print_options).map_err(corrupt)?,
        notes: model.notes,
        pickup_at: model.pickup_at.map(|dt| dt.with_timezone(&Utc)),
        documents: serde_json::from_value(model.documents).map_err(corrupt)?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn payment_from_entity(model: PaymentModel) -> Result<Payment, StoreError> {
    Ok(Payment {
        id: model.id,
        order_id: model.order_id,
        user_id: model.user_id,
        reference_no: model.reference_no,
        amount: model.amount,
        payment_method: model.payment_method.parse().map_err(corrupt)?,
        status: model.status.parse().map_err(corrupt)?,
        receipt_ref: model.receipt_ref,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
