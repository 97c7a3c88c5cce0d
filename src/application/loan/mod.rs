mod errors;
mod loan_service;
mod notification_dispatch;
mod saga;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{ServiceDependencies, borrow_item, loan_history, return_item};
pub use notification_dispatch::{DEFAULT_QUEUE_CAPACITY, NotificationDispatcher};
pub use saga::{CollaboratorTimeouts, SagaStage};
