pub mod inventory_client;
pub mod user_directory;

pub use inventory_client::InventoryClient as HttpInventoryClient;
pub use user_directory::UserDirectory as HttpUserDirectory;
