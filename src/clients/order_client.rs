use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus, PlaceOrder};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::actor_framework::ResourceClient;
use crate::clients::ProductClient;
use crate::invoice::InvoiceRenderer;

/// Outcome of a successful placement.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order: Order,
    /// `None` when the order was recorded but its invoice could not be rendered.
    pub invoice: Option<PathBuf>,
}

/// Client for interacting with the Order actor.
///
/// Placement is orchestrated here: stock is reserved through the product
/// actor, the order is recorded through the order actor, and the invoice is
/// rendered last.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    product_client: ProductClient,
    invoices: InvoiceRenderer,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        product_client: ProductClient,
        invoices: InvoiceRenderer,
    ) -> Self {
        Self {
            inner,
            product_client,
            invoices,
        }
    }

    #[instrument(
        fields(product = %request.product, quantity = request.quantity),
        skip(self, request)
    )]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Placement, OrderError> {
        info!("Processing place_order request");

        // Step 1: Validate customer input
        let request = validate(request)?;

        // Step 2: Reserve stock (check and decrement happen in one actor step)
        let reservation = match self
            .product_client
            .reserve_stock(request.product.clone(), request.quantity)
            .await
        {
            Ok(reservation) => {
                info!(remaining = reservation.remaining, "Stock reserved successfully");
                reservation
            }
            Err(ProductError::InsufficientStock { requested, available }) => {
                warn!(requested, available, "Insufficient stock");
                return Err(OrderError::InsufficientStock {
                    product: request.product,
                    requested,
                    available,
                });
            }
            Err(ProductError::NotFound(product)) => {
                warn!("Product not found");
                return Err(OrderError::InsufficientStock {
                    product,
                    requested: request.quantity,
                    available: 0,
                });
            }
            Err(e) => {
                error!(error = %e, "Stock reservation failed");
                return Err(product_failure(e));
            }
        };

        // Step 3: Record the order at the reserved price
        let payload = OrderCreate {
            total: reservation.unit_price * f64::from(request.quantity),
            name: request.name,
            address: request.address,
            location: request.location,
            product: request.product.clone(),
            quantity: request.quantity,
        };

        let order = match self.inner.create(payload).await {
            Ok(order) => order,
            Err(e) => {
                let err = OrderError::from(e);
                error!(error = %err, "Order creation failed, releasing reserved stock");
                if let Err(release) = self
                    .product_client
                    .release_stock(request.product, request.quantity)
                    .await
                {
                    error!(error = %release, "Stock release failed");
                }
                return Err(err);
            }
        };

        info!(order_id = %order.id, total = order.total, "Order created successfully");

        // Step 4: Render the invoice; the order stands even if this fails
        let invoice = match self.invoices.render(&order).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Invoice rendering failed");
                None
            }
        };

        Ok(Placement { order, invoice })
    }

    /// Current status of an order.
    #[instrument(skip(self))]
    pub async fn track_order(&self, id: String) -> Result<OrderStatus, OrderError> {
        debug!("Sending request");
        match self.inner.get(id.clone()).await? {
            Some(order) => Ok(order.status),
            None => Err(OrderError::NotFound(id)),
        }
    }

    /// Sets the status of an order. No transition is refused.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        let order = self
            .inner
            .update(id, OrderPatch { status: Some(status) })
            .await?;
        info!(order_id = %order.id, status = %order.status, "Order status updated");
        Ok(order)
    }
}

fn validate(mut request: PlaceOrder) -> Result<PlaceOrder, OrderError> {
    if request.quantity == 0 {
        return Err(OrderError::InvalidQuantity(0));
    }
    request.name = request.name.trim().to_string();
    request.address = request.address.trim().to_string();
    if request.name.is_empty() {
        return Err(OrderError::ValidationError("Name required".to_string()));
    }
    if request.address.is_empty() {
        return Err(OrderError::ValidationError("Address required".to_string()));
    }
    request.location = request
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    Ok(request)
}

fn product_failure(err: ProductError) -> OrderError {
    match err {
        ProductError::DatabaseError(msg) => OrderError::DatabaseError(msg),
        ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        other => OrderError::ValidationError(other.to_string()),
    }
}
