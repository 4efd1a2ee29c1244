//! One courier's delivery run: store, pricing and the displayed route.
//!
//! Every mutation that changes the pending sequence or the pickup point
//! hands back a [`RouteRequest`]. The caller runs it against a
//! [`RouteProvider`] whenever it likes and feeds the answer to
//! [`Planner::apply_route`]. Requests carry a monotonic [`RouteToken`]; only
//! the answer to the newest request is applied, so a slow response can never
//! overwrite a fresher one.

use std::future::Future;

use crate::coordinate::LatLng;
use crate::error::{PlanError, StoreError};
use crate::geocode_queue::GeocodeQueue;
use crate::haversine;
use crate::pricing::PricingTable;
use crate::route::{RouteResult, compute_route};
use crate::sequencer;
use crate::store::{DeliveryId, DeliveryPatch, DeliveryStatus, DeliveryStore};
use crate::traits::RouteProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteToken(u64);

/// A route computation to run for the current pending order.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "the displayed route is stale until this request is run and applied"]
pub struct RouteRequest {
    pub token: RouteToken,
    pub pickup: LatLng,
    pub stops: Vec<LatLng>,
}

impl RouteRequest {
    pub async fn fetch<P>(&self, provider: &P) -> Option<RouteResult>
    where
        P: RouteProvider,
    {
        compute_route(provider, self.pickup, &self.stops).await
    }
}

/// What a map tap turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Pickup,
    Delivery(DeliveryId),
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    store: DeliveryStore,
    pricing: PricingTable,
    route: Option<RouteResult>,
    latest_token: u64,
}

impl Planner {
    pub fn new(pricing: PricingTable) -> Self {
        Self {
            pricing,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &DeliveryStore {
        &self.store
    }

    pub fn pickup(&self) -> Option<LatLng> {
        self.store.pickup()
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Editing the table does not reprice existing deliveries.
    pub fn pricing_mut(&mut self) -> &mut PricingTable {
        &mut self.pricing
    }

    /// Route currently on display, if any.
    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    /// The first location becomes the pickup point; later ones are deliveries.
    /// An out-of-range location changes nothing.
    pub fn select_location(
        &mut self,
        location: LatLng,
    ) -> Result<(Selection, Option<RouteRequest>), PlanError> {
        if self.store.pickup().is_none() {
            self.store.set_pickup(location)?;
            self.store.clear_deliveries();
            self.clear_route();
            return Ok((Selection::Pickup, None));
        }

        let id = self.store.add(location, self.fee_for(location))?;
        Ok((Selection::Delivery(id), self.request_route()))
    }

    /// Moves the pickup point, keeping every delivery.
    pub fn set_pickup(&mut self, location: LatLng) -> Result<Option<RouteRequest>, PlanError> {
        self.store.set_pickup(location)?;
        Ok(self.request_route())
    }

    /// Adds a pending delivery priced by its distance from the pickup.
    pub fn add_delivery(
        &mut self,
        location: LatLng,
    ) -> Result<(DeliveryId, Option<RouteRequest>), PlanError> {
        if self.store.pickup().is_none() {
            return Err(PlanError::NoPickup);
        }
        let id = self.store.add(location, self.fee_for(location))?;
        Ok((id, self.request_route()))
    }

    /// Drag of a delivery marker. The address goes back to a placeholder
    /// until a new lookup lands.
    pub fn move_delivery(
        &mut self,
        id: DeliveryId,
        location: LatLng,
    ) -> Result<Option<RouteRequest>, PlanError> {
        self.store.set_location(id, location)?;
        Ok(self.request_route())
    }

    /// Field edits never touch the visit order or the route.
    pub fn update_delivery(&mut self, id: DeliveryId, patch: DeliveryPatch) -> Result<(), PlanError> {
        Ok(self.store.update(id, patch)?)
    }

    pub fn set_status(
        &mut self,
        id: DeliveryId,
        status: DeliveryStatus,
    ) -> Result<Option<RouteRequest>, PlanError> {
        self.store.set_status(id, status)?;
        Ok(self.request_route())
    }

    pub fn mark_delivered(&mut self, id: DeliveryId) -> Result<Option<RouteRequest>, PlanError> {
        self.set_status(id, DeliveryStatus::Delivered)
    }

    pub fn mark_pending(&mut self, id: DeliveryId) -> Result<Option<RouteRequest>, PlanError> {
        self.set_status(id, DeliveryStatus::Pending)
    }

    pub fn delete(&mut self, id: DeliveryId) -> Result<Option<RouteRequest>, PlanError> {
        self.store
            .remove(id)
            .ok_or(StoreError::UnknownDelivery(id))?;
        Ok(self.request_route())
    }

    /// Manual reorder of one pending delivery.
    pub fn move_pending(
        &mut self,
        id: DeliveryId,
        to_index: usize,
    ) -> Result<Option<RouteRequest>, PlanError> {
        self.store.move_pending(id, to_index)?;
        Ok(self.request_route())
    }

    /// Re-sequences pending deliveries by nearest neighbor from the pickup.
    pub fn optimize(&mut self) -> Result<Option<RouteRequest>, PlanError> {
        let pickup = self.store.pickup().ok_or(PlanError::NoPickup)?;
        let pending: Vec<_> = self.store.pending().cloned().collect();
        let order = sequencer::nearest_neighbor(pickup, &pending);
        tracing::debug!(stops = order.len(), "pending deliveries re-sequenced");
        self.store.reorder_pending(order)?;
        Ok(self.request_route())
    }

    /// Forgets the pickup point, every delivery and the displayed route.
    pub fn reset(&mut self) {
        self.store.clear();
        self.clear_route();
    }

    /// Reconciles a reverse-geocoding answer by id. A delivery deleted in the
    /// meantime is ignored.
    pub fn apply_address(&mut self, id: DeliveryId, address: impl Into<String>) -> bool {
        let applied = self.store.set_address(id, address);
        if !applied {
            tracing::debug!(%id, "address for removed delivery dropped");
        }
        applied
    }

    /// Queues a reverse lookup for a delivery's current location.
    ///
    /// The returned future yields the id with the address so it can be
    /// handed straight to [`apply_address`](Self::apply_address).
    pub fn lookup_address(
        &self,
        queue: &GeocodeQueue,
        id: DeliveryId,
    ) -> Option<impl Future<Output = (DeliveryId, String)> + Send + use<>> {
        let location = self.store.get(id)?.location;
        let answer = queue.enqueue(location);
        Some(async move { (id, answer.await) })
    }

    /// Tiered fee for a delivery at `location`; zero without a pickup.
    pub fn fee_for(&self, location: LatLng) -> f64 {
        match self.store.pickup() {
            Some(pickup) => self.pricing.price_for(haversine::distance_m(pickup, location)),
            None => 0.0,
        }
    }

    /// Straight-line distance between the pickup and a delivery.
    pub fn distance_from_pickup_m(&self, id: DeliveryId) -> Option<f64> {
        let pickup = self.store.pickup()?;
        let delivery = self.store.get(id)?;
        Some(haversine::distance_m(pickup, delivery.location))
    }

    /// `"(2.4km)"`-style label used next to each delivery.
    pub fn distance_label(&self, id: DeliveryId) -> Option<String> {
        self.distance_from_pickup_m(id)
            .map(|meters| format!("{:.1}km", meters / 1000.0))
    }

    /// Issues a new token. Returns `None` (and clears the displayed route)
    /// when there is nothing to route.
    pub fn request_route(&mut self) -> Option<RouteRequest> {
        self.latest_token += 1;
        let token = RouteToken(self.latest_token);

        let Some(pickup) = self.store.pickup() else {
            self.route = None;
            return None;
        };
        let stops = self.store.pending_locations();
        if stops.is_empty() {
            self.route = None;
            return None;
        }

        Some(RouteRequest {
            token,
            pickup,
            stops,
        })
    }

    /// Applies a route answer if it belongs to the newest request.
    ///
    /// `None` clears the display rather than leaving a stale path up.
    pub fn apply_route(&mut self, token: RouteToken, result: Option<RouteResult>) -> bool {
        if token.0 != self.latest_token {
            tracing::debug!(
                token = token.0,
                latest = self.latest_token,
                "stale route response dropped"
            );
            return false;
        }
        self.route = result;
        true
    }

    /// Requests, fetches and applies a route in one go.
    pub async fn refresh_route<P>(&mut self, provider: &P) -> Option<&RouteResult>
    where
        P: RouteProvider,
    {
        let request = self.request_route()?;
        let result = request.fetch(provider).await;
        self.apply_route(request.token, result);
        self.route.as_ref()
    }

    fn clear_route(&mut self) {
        self.latest_token += 1;
        self.route = None;
    }
}
