pub mod inventory_client;
pub mod loan_store;
pub mod notification_publisher;
pub mod user_directory;

pub use inventory_client::InventoryClient;
pub use loan_store::LoanStore;
pub use notification_publisher::NotificationPublisher;
pub use user_directory::UserDirectory;
