pub mod inventory_client;
pub mod loan_store;
pub mod notification_publisher;
pub mod token_verifier;
pub mod user_directory;

pub use inventory_client::{InventoryClient, InventoryError, ItemSnapshot};
pub use loan_store::{LoanStore, LoanStoreError};
pub use notification_publisher::NotificationPublisher;
pub use token_verifier::{AuthError, TokenVerifier};
pub use user_directory::{ServiceCredential, UserDirectory};
