pub mod app_config;
pub mod database;
pub mod tour_repo;
pub mod order_repo;
pub mod payment;
pub mod mailer;
pub mod memory;

pub use database::DbClient;
pub use tour_repo::StoreTourCatalog;
pub use order_repo::StoreOrderRepository;
pub use payment::{MockPaymentGateway, StripeGateway};
pub use mailer::{LogNotifier, SendGridNotifier};
pub use memory::MemoryStore;
