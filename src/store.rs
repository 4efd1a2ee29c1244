//! In-memory delivery collection and pickup point.
//!
//! The store owns every [`Delivery`]. One ordered list of ids holds every
//! delivery; the visit order is that list filtered to pending items, so a
//! status flip never moves anything. Updates are addressed by id, so an
//! answer that arrives after its delivery was deleted simply misses.
//!
//! Coordinates and fees are validated on the way in.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinate::LatLng;
use crate::error::StoreError;
use crate::traits::Stop;

/// Shown until the first reverse lookup answers.
pub const LOADING_ADDRESS: &str = "Loading address...";
/// Shown after a delivery was moved, until the new lookup answers.
pub const UPDATING_ADDRESS: &str = "Updating address...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub items: String,
    pub is_paid: bool,
    pub amount: f64,
    pub delivery_fee: f64,
    pub payment_details: Option<String>,
}

impl OrderDetails {
    /// Amount to collect: goods plus delivery fee.
    pub fn total(&self) -> f64 {
        self.amount + self.delivery_fee
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub location: LatLng,
    pub address: String,
    pub customer: Customer,
    pub order: OrderDetails,
    pub status: DeliveryStatus,
}

impl Stop for Delivery {
    type Id = DeliveryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> LatLng {
        self.location
    }

    fn is_pending(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }
}

/// Partial edit of the user-editable fields. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct DeliveryPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Option<String>,
    pub is_paid: Option<bool>,
    pub amount: Option<f64>,
    pub delivery_fee: Option<f64>,
    /// `Some(None)` clears the details.
    pub payment_details: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryStore {
    pickup: Option<LatLng>,
    deliveries: HashMap<DeliveryId, Delivery>,
    order: Vec<DeliveryId>,
}

impl DeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pickup(&self) -> Option<LatLng> {
        self.pickup
    }

    pub fn set_pickup(&mut self, location: LatLng) -> Result<(), StoreError> {
        check_location(location)?;
        self.pickup = Some(location);
        Ok(())
    }

    /// Drops the pickup point and every delivery.
    pub fn clear(&mut self) {
        self.pickup = None;
        self.clear_deliveries();
    }

    pub fn clear_deliveries(&mut self) {
        self.deliveries.clear();
        self.order.clear();
    }

    /// Appends a new pending delivery at the end of the visit order.
    ///
    /// The same coordinate may be added any number of times; each call yields
    /// a new, independent delivery.
    pub fn add(&mut self, location: LatLng, delivery_fee: f64) -> Result<DeliveryId, StoreError> {
        check_location(location)?;
        check_amount("delivery_fee", delivery_fee)?;

        let id = DeliveryId::new();
        let delivery = Delivery {
            id,
            location,
            address: LOADING_ADDRESS.to_string(),
            customer: Customer::default(),
            order: OrderDetails {
                delivery_fee,
                ..OrderDetails::default()
            },
            status: DeliveryStatus::Pending,
        };
        self.deliveries.insert(id, delivery);
        self.order.push(id);
        Ok(id)
    }

    pub fn get(&self, id: DeliveryId) -> Option<&Delivery> {
        self.deliveries.get(&id)
    }

    pub fn contains(&self, id: DeliveryId) -> bool {
        self.deliveries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Pending ids in visit order.
    pub fn pending_ids(&self) -> Vec<DeliveryId> {
        self.pending().map(|delivery| delivery.id).collect()
    }

    /// Pending deliveries in visit order.
    pub fn pending(&self) -> impl Iterator<Item = &Delivery> + '_ {
        self.with_status(DeliveryStatus::Pending)
    }

    /// Delivered items, in list order.
    pub fn completed(&self) -> impl Iterator<Item = &Delivery> + '_ {
        self.with_status(DeliveryStatus::Delivered)
    }

    fn with_status(&self, status: DeliveryStatus) -> impl Iterator<Item = &Delivery> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.deliveries.get(id))
            .filter(move |delivery| delivery.status == status)
    }

    /// Everything in display order: pending by visit order, then completed.
    pub fn iter(&self) -> impl Iterator<Item = &Delivery> + '_ {
        self.pending().chain(self.completed())
    }

    /// Owned copy of [`iter`](Self::iter) for readers that outlive a borrow.
    pub fn snapshot(&self) -> Vec<Delivery> {
        self.iter().cloned().collect()
    }

    pub fn pending_locations(&self) -> Vec<LatLng> {
        self.pending().map(|delivery| delivery.location).collect()
    }

    /// Applies `patch`. Nothing changes if any amount is invalid.
    pub fn update(&mut self, id: DeliveryId, patch: DeliveryPatch) -> Result<(), StoreError> {
        if let Some(amount) = patch.amount {
            check_amount("amount", amount)?;
        }
        if let Some(fee) = patch.delivery_fee {
            check_amount("delivery_fee", fee)?;
        }

        let delivery = self
            .deliveries
            .get_mut(&id)
            .ok_or(StoreError::UnknownDelivery(id))?;

        if let Some(name) = patch.customer_name {
            delivery.customer.name = name;
        }
        if let Some(phone) = patch.customer_phone {
            delivery.customer.phone = phone;
        }
        if let Some(items) = patch.items {
            delivery.order.items = items;
        }
        if let Some(is_paid) = patch.is_paid {
            delivery.order.is_paid = is_paid;
        }
        if let Some(amount) = patch.amount {
            delivery.order.amount = amount;
        }
        if let Some(fee) = patch.delivery_fee {
            delivery.order.delivery_fee = fee;
        }
        if let Some(details) = patch.payment_details {
            delivery.order.payment_details = details;
        }

        Ok(())
    }

    /// Stores a resolved address. Returns `false` if the delivery is gone.
    pub fn set_address(&mut self, id: DeliveryId, address: impl Into<String>) -> bool {
        match self.deliveries.get_mut(&id) {
            Some(delivery) => {
                delivery.address = address.into();
                true
            }
            None => false,
        }
    }

    /// Moves a delivery and marks its address as stale.
    pub fn set_location(&mut self, id: DeliveryId, location: LatLng) -> Result<(), StoreError> {
        check_location(location)?;
        let delivery = self
            .deliveries
            .get_mut(&id)
            .ok_or(StoreError::UnknownDelivery(id))?;
        delivery.location = location;
        delivery.address = UPDATING_ADDRESS.to_string();
        Ok(())
    }

    /// Returns whether the status actually changed.
    ///
    /// Only the flag changes: an undone delivery is back in its old slot and
    /// every other item keeps its place.
    pub fn set_status(&mut self, id: DeliveryId, status: DeliveryStatus) -> Result<bool, StoreError> {
        let delivery = self
            .deliveries
            .get_mut(&id)
            .ok_or(StoreError::UnknownDelivery(id))?;
        if delivery.status == status {
            return Ok(false);
        }
        delivery.status = status;
        Ok(true)
    }

    pub fn remove(&mut self, id: DeliveryId) -> Option<Delivery> {
        let removed = self.deliveries.remove(&id)?;
        self.order.retain(|kept| *kept != id);
        Some(removed)
    }

    /// Moves a pending delivery to `to_index` in the visit order, shifting the
    /// ones in between. Indexes past the end clamp to the last slot.
    pub fn move_pending(&mut self, id: DeliveryId, to_index: usize) -> Result<(), StoreError> {
        let mut pending = self.pending_ids();
        let from = pending
            .iter()
            .position(|pending| *pending == id)
            .ok_or(StoreError::UnknownDelivery(id))?;
        let moved = pending.remove(from);
        let to = to_index.min(pending.len());
        pending.insert(to, moved);
        self.refill_pending(pending);
        Ok(())
    }

    /// Replaces the visit order. `order` must be a permutation of the
    /// current pending ids. Completed items move behind the pending ones.
    pub fn reorder_pending(&mut self, order: Vec<DeliveryId>) -> Result<(), StoreError> {
        let mut expected = self.pending_ids();
        if order.len() != expected.len() {
            return Err(StoreError::InvalidOrder);
        }
        let mut given = order.clone();
        expected.sort();
        given.sort();
        if expected != given {
            return Err(StoreError::InvalidOrder);
        }

        let completed: Vec<DeliveryId> = self.completed().map(|delivery| delivery.id).collect();
        self.order = order.into_iter().chain(completed).collect();
        Ok(())
    }

    /// Writes `pending` back into the slots pending items occupy, leaving
    /// completed items where they are.
    fn refill_pending(&mut self, pending: Vec<DeliveryId>) {
        let mut next = pending.into_iter();
        for slot in self.order.iter_mut() {
            let is_pending = self
                .deliveries
                .get(&*slot)
                .is_some_and(|delivery| delivery.status == DeliveryStatus::Pending);
            if is_pending {
                if let Some(id) = next.next() {
                    *slot = id;
                }
            }
        }
    }
}

fn check_location(location: LatLng) -> Result<(), StoreError> {
    if location.is_valid() {
        Ok(())
    } else {
        Err(StoreError::InvalidLocation {
            lat: location.lat,
            lng: location.lng,
        })
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), StoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(StoreError::InvalidAmount { field, value })
    }
}
