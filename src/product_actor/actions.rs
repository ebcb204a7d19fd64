/// Custom actions for Product entities.
///
/// These actions represent stock operations that go beyond a plain admin
/// edit. Each one runs inside the product actor, so the check and the
/// change happen in a single step.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Takes `u32` units out of stock for an order.
    ///
    /// # Errors
    /// Fails without changing anything if the requested amount exceeds
    /// available stock or is zero.
    ReserveStock(u32),
    /// Puts `u32` units back, undoing a reservation whose order was never
    /// recorded.
    ReleaseStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    ReserveStock(Reservation),
    /// Stock level after the release.
    ReleaseStock(u32),
}

/// Outcome of a successful stock reservation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservation {
    /// Price per unit at the moment stock was taken.
    pub unit_price: f64,
    pub remaining: u32,
}
