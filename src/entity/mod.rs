pub mod audit_logs;
pub mod orders;
pub mod payments;
pub mod services;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use services::Entity as Services;
pub use users::Entity as Users;
