use std::sync::Arc;
use tourbook_catalog::RiderPolicy;
use tourbook_core::notify::{Mailbox, Notifier};
use tourbook_core::payment::PaymentGateway;
use tourbook_core::repository::{OrderRepository, TourCatalog};
use tourbook_core::CoreResult;
use tourbook_order::{CheckoutPolicy, ConfirmationDeps, ConfirmationOrchestrator, MailPolicy};
use tourbook_store::app_config::{Config, MailProvider, PaymentProvider, StoreBackend};
use tourbook_store::{
    DbClient, LogNotifier, MemoryStore, MockPaymentGateway, SendGridNotifier, StoreOrderRepository,
    StoreTourCatalog, StripeGateway,
};
use crate::view::ConfirmationView;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConfirmationOrchestrator>,
    pub views: Arc<ConfirmationView>,
}

impl AppState {
    pub fn new(deps: ConfirmationDeps, policy: CheckoutPolicy, views: ConfirmationView) -> Self {
        Self {
            orchestrator: Arc::new(ConfirmationOrchestrator::new(deps, policy)),
            views: Arc::new(views),
        }
    }

    /// Connects every collaborator selected in `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (catalog, orders): (Arc<dyn TourCatalog>, Arc<dyn OrderRepository>) = match config.store.backend {
            StoreBackend::Postgres => {
                let db = DbClient::new(&config.store.database_url, config.store.max_connections).await?;
                db.migrate().await?;
                let catalog: Arc<dyn TourCatalog> = Arc::new(StoreTourCatalog::new(db.pool.clone()));
                let orders: Arc<dyn OrderRepository> = Arc::new(StoreOrderRepository::new(db.pool));
                (catalog, orders)
            }
            StoreBackend::Memory => {
                let store = match &config.store.seed_file {
                    Some(path) => MemoryStore::from_seed_file(path)
                        .map_err(|e| anyhow::anyhow!("Failed to load seed file {}: {}", path, e))?,
                    None => MemoryStore::new(),
                };
                let store = Arc::new(store);
                let catalog: Arc<dyn TourCatalog> = store.clone();
                let orders: Arc<dyn OrderRepository> = store;
                (catalog, orders)
            }
        };
        tracing::info!("Store backend: {:?}", config.store.backend);

        let payments: Arc<dyn PaymentGateway> = match config.payment.provider {
            PaymentProvider::Stripe => Arc::new(StripeGateway::new(
                &config.payment.api_base,
                &config.payment.secret_key,
            )?),
            PaymentProvider::Mock => {
                tracing::warn!("Using mock payment gateway, no cards will be charged");
                Arc::new(MockPaymentGateway::new())
            }
        };

        let notifier: Arc<dyn Notifier> = match config.mail.provider {
            MailProvider::Sendgrid => Arc::new(SendGridNotifier::new(
                &config.mail.api_base,
                &config.mail.api_key,
            )?),
            MailProvider::Log => Arc::new(LogNotifier::new()),
        };

        let policy = checkout_policy(config)?;
        let views = ConfirmationView::new(config.views.templates_dir.as_deref(), policy.mail.timezone)?;

        Ok(Self::new(
            ConfirmationDeps { catalog, orders, payments, notifier },
            policy,
            views,
        ))
    }
}

pub fn checkout_policy(config: &Config) -> CoreResult<CheckoutPolicy> {
    Ok(CheckoutPolicy {
        default_capacity: config.checkout.default_capacity,
        currency: config.checkout.currency.clone(),
        require_email: config.checkout.require_email,
        riders: RiderPolicy {
            min_height: config.checkout.min_height,
            max_height: config.checkout.max_height,
        },
        mail: MailPolicy {
            from: Mailbox::new(config.mail.from_name.as_str(), config.mail.from_address.as_str()),
            operator: Mailbox::new("", config.mail.operator_address.as_str()),
            bcc_operator: config.mail.bcc_operator,
            timezone: config.checkout.timezone()?,
        },
    })
}
