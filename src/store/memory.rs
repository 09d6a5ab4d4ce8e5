use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::{
    models::{Order, Payment, PaymentStatus, Service, User},
    ordering::OrderDraft,
};

use super::{
    AuditEntry, NewPayment, NewService, NewUser, OrderFilter, OrderPatch, Page, PageRequest,
    PaymentFilter, ProfilePatch, ServicePatch, Store, StoreError, build_order_number,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    services: Vec<Service>,
    orders: Vec<Order>,
    /// `(user_id, idempotency_key)` → order id.
    order_keys: HashMap<(Uuid, Uuid), Uuid>,
    payments: Vec<Payment>,
    audit: Vec<AuditEntry>,
}

/// Process-local store used by tests and demos.
///
/// Order creation can be made to fail once or to wait for a release signal,
/// which lets callers observe a submission while it is in flight.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    create_order_calls: AtomicUsize,
    fail_next_create: Mutex<Option<String>>,
    create_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_order_calls(&self) -> usize {
        self.create_order_calls.load(Ordering::SeqCst)
    }

    /// The next `create_order` call fails with [`StoreError::Unavailable`].
    pub async fn fail_next_create(&self, reason: impl Into<String>) {
        *self.fail_next_create.lock().await = Some(reason.into());
    }

    /// Holds the next `create_order` call until the returned gate is notified.
    pub async fn gate_creates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().await = Some(gate.clone());
        gate
    }

    pub async fn audit_actions(&self) -> Vec<String> {
        self.tables
            .lock()
            .await
            .audit
            .iter()
            .map(|entry| entry.action.clone())
            .collect()
    }

    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset as usize)
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect();
    Page { items, total }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} exists", user.email)));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            role: user.role,
            phone: None,
            address: None,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: ProfilePatch,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(phone) = patch.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            user.address = Some(address);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, StoreError> {
        let tables = self.tables.lock().await;
        let mut services: Vec<Service> = tables
            .services
            .iter()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, service: NewService) -> Result<Service, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.services.iter().any(|s| s.name == service.name) {
            return Err(StoreError::Conflict(format!(
                "service {} exists",
                service.name
            )));
        }
        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            name: service.name,
            description: service.description,
            base_price: service.base_price,
            price_per_page: service.price_per_page,
            active: service.active,
            created_at: now,
            updated_at: now,
        };
        tables.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: Uuid,
        patch: ServicePatch,
    ) -> Result<Option<Service>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(service) = tables.services.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            service.name = name;
        }
        if let Some(description) = patch.description {
            service.description = Some(description);
        }
        if let Some(base_price) = patch.base_price {
            service.base_price = base_price;
        }
        if let Some(price_per_page) = patch.price_per_page {
            service.price_per_page = price_per_page;
        }
        if let Some(active) = patch.active {
            service.active = active;
        }
        service.updated_at = Utc::now();
        Ok(Some(service.clone()))
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Uuid, StoreError> {
        self.create_order_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.create_gate.lock().await.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(reason) = self.fail_next_create.lock().await.take() {
            return Err(StoreError::Unavailable(reason));
        }

        let mut tables = self.tables.lock().await;
        let key = (draft.user_id, draft.idempotency_key);
        if let Some(existing) = tables.order_keys.get(&key) {
            return Ok(*existing);
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        tables.orders.push(Order {
            id,
            order_number: build_order_number(id),
            user_id: draft.user_id,
            service_id: draft.service_id,
            status: draft.status,
            payment_status: draft.payment_status,
            total_amount: draft.total_amount,
            print_options: draft.print_options,
            notes: draft.notes.clone(),
            pickup_at: draft.pickup_at,
            documents: draft.documents.clone(),
            created_at: now,
            updated_at: now,
        });
        tables.order_keys.insert(key, id);
        Ok(id)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let tables = self.tables.lock().await;
        let search = filter
            .search
            .as_ref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|o| filter.user_id.is_none_or(|user_id| o.user_id == user_id))
            .filter(|o| filter.status.is_none_or(|status| o.status == status))
            .filter(|o| {
                search.as_ref().is_none_or(|needle| {
                    o.order_number.to_lowercase().contains(needle)
                        || o.status.as_str().contains(needle.as_str())
                })
            })
            .cloned()
            .collect();
        if !filter.oldest_first {
            orders.reverse();
        }
        Ok(paginate(orders, page))
    }

    async fn update_order(
        &self,
        id: Uuid,
        patch: OrderPatch,
    ) -> Result<Option<Order>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            order.payment_status = payment_status;
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id: payment.order_id,
            user_id: payment.user_id,
            reference_no: payment.reference_no,
            amount: payment.amount,
            payment_method: payment.payment_method,
            status: payment.status,
            receipt_ref: payment.receipt_ref,
            created_at: now,
            updated_at: now,
        };
        tables.payments.push(payment.clone());
        Ok(payment)
    }

    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.payments.iter().find(|p| p.id == id).cloned())
    }

    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, StoreError> {
        let tables = self.tables.lock().await;
        let payments: Vec<Payment> = tables
            .payments
            .iter()
            .rev()
            .filter(|p| filter.user_id.is_none_or(|user_id| p.user_id == user_id))
            .filter(|p| filter.order_id.is_none_or(|order_id| p.order_id == order_id))
            .filter(|p| filter.status.is_none_or(|status| p.status == status))
            .cloned()
            .collect();
        Ok(paginate(payments, page))
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(payment) = tables.payments.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        payment.status = status;
        payment.updated_at = Utc::now();
        Ok(Some(payment.clone()))
    }

    async fn record_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.tables.lock().await.audit.push(entry);
        Ok(())
    }
}
