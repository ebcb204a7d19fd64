use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};
use crate::actor_framework::ResourceActor;
use crate::app_system::Config;
use crate::assistant::{Assistant, GeminiProvider, ProviderError, ProviderResult};
use crate::clients::{OrderClient, ProductClient};
use crate::domain::{Order, Product, ProductCreate};
use crate::invoice::InvoiceRenderer;
use crate::order_actor::next_order_id;
use crate::store::{JsonStore, Layout, MissingFile, StoreLock, StoreResult};

/// Top-level key of the stock document.
pub const STOCK_KEY: &str = "products";

/// The stock store. A missing file is an error rather than an empty stock.
pub fn stock_store(config: &Config) -> JsonStore<Product> {
    JsonStore::new(&config.stock_path, Layout::Keyed(STOCK_KEY.to_string()), MissingFile::Error)
}

/// The order store. A missing file means no orders yet.
pub fn order_store(config: &Config) -> JsonStore<Order> {
    JsonStore::new(&config.orders_path, Layout::Array, MissingFile::Empty)
}

/// Lock file guarding both stores, next to the stock file.
pub fn lock_path(config: &Config) -> PathBuf {
    let mut name = config
        .stock_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "stock.json".into());
    name.push(".lock");
    config.stock_path.with_file_name(name)
}

/// Write an empty stock file if none exists. Returns whether one was created.
pub async fn init_stock(config: &Config) -> StoreResult<bool> {
    let _lock = StoreLock::acquire(lock_path(config), config.lock_timeout()).await?;
    let store = stock_store(config);
    if store.exists().await {
        return Ok(false);
    }
    store.save(&[]).await?;
    info!(path = %store.path().display(), "Created empty stock file");
    Ok(true)
}

/// The main application system that orchestrates all actors.
///
/// Responsible for locking and loading both stores, starting one actor per
/// store, wiring the clients together, and handling shutdown. The store lock
/// is held until shutdown, so no other process reads or rewrites the files
/// in between.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
    lock: StoreLock,
}

impl OrderSystem {
    #[instrument(name = "order_system", skip(config))]
    pub async fn start(config: &Config) -> StoreResult<Self> {
        info!("Starting order system");

        let lock = StoreLock::acquire(lock_path(config), config.lock_timeout()).await?;

        // 1. Stock actor, keyed by product name
        let (product_actor, product_resource_client) =
            ResourceActor::open(config.mailbox_size, stock_store(config), |p: &ProductCreate| p.name.clone())
                .await?;
        let product_client = ProductClient::new(product_resource_client);
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Order actor, with generated short IDs
        let (order_actor, order_resource_client) =
            ResourceActor::open(config.mailbox_size, order_store(config), next_order_id).await?;
        let invoices = InvoiceRenderer::new(&config.invoice_dir, &config.shop_name, &config.currency);
        let order_client = OrderClient::new(order_resource_client, product_client.clone(), invoices);
        let order_handle = tokio::spawn(order_actor.run());

        info!(lock = %lock.path().display(), "Order system started successfully");

        Ok(Self {
            order_client,
            product_client,
            handles: vec![product_handle, order_handle],
            lock,
        })
    }

    /// Build the chat assistant over the running stock actor.
    pub fn assistant(&self, config: &Config) -> ProviderResult<Assistant> {
        let api_key = config
            .llm
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey("google".to_string()))?;
        let model = GeminiProvider::new(api_key, &config.llm.model, &config.llm.base_url)?;

        Ok(Assistant::new(
            Arc::new(model),
            self.product_client.clone(),
            &config.shop_name,
            &config.currency,
        ))
    }

    /// Stop all actors and wait for them to finish.
    ///
    /// Actors stop once every client is dropped, so clients handed out
    /// elsewhere (e.g. to an [`Assistant`]) must be dropped first.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        info!("Shutting down order system");

        drop(self.order_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(e);
            }
        }

        drop(self.lock);
        info!("Order system shutdown complete");
        Ok(())
    }
}
