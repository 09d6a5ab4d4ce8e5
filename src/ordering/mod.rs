//! The new-order workflow: form state, pricing, payload assembly and
//! submission.

pub mod catalog;
pub mod draft;
pub mod form;
pub mod navigation;
pub mod options;
pub mod pricing;
pub mod submission;

pub use catalog::ServiceCatalog;
pub use draft::{OrderDraft, OrderValidationError};
pub use form::{DocumentRef, OrderForm};
pub use navigation::{AppRoute, Navigator, RecordingNavigator};
pub use options::{ColorMode, Copies, Orientation, PaperSize, PaperType, PrintOptions};
pub use submission::{SubmissionController, SubmissionState, SubmitError};
