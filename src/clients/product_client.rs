use tracing::{debug, instrument};
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError, Reservation};
use crate::actor_framework::ResourceClient;

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {:?}", result))
}

impl ProductClient {
    #[instrument(skip(self), fields(name = %product.name))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(product).await.map_err(ProductError::from)
    }

    /// Manual admin edit of an existing product.
    #[instrument(skip(self))]
    pub async fn update_product(&self, name: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(name, patch).await.map_err(ProductError::from)
    }

    /// Removes a product. Orders that reference it are left as they are.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, name: String) -> Result<(), ProductError> {
        debug!("Sending request");
        self.inner.delete(name).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, name: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(name, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, name: String, quantity: u32) -> Result<Reservation, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(name, ProductAction::ReserveStock(quantity)).await? {
            ProductActionResult::ReserveStock(reservation) => Ok(reservation),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn release_stock(&self, name: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(name, ProductAction::ReleaseStock(quantity)).await? {
            ProductActionResult::ReleaseStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }
}
