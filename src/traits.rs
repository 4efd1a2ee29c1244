//! Seams between the planning core and the outside world.
//!
//! The core never talks HTTP directly. Each external collaborator is a trait
//! so the HTTP clients in [`crate::osrm`], [`crate::nominatim`] and
//! [`crate::link_proxy`] can be swapped for fakes.

use std::future::Future;
use std::hash::Hash;

use crate::coordinate::LatLng;
use crate::error::{GeocodeError, ProviderError, RouteFailure};
use crate::route::RouteResult;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// Anything the sequencer can put in visit order.
pub trait Stop {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Location coordinates.
    fn location(&self) -> LatLng;

    /// Pending stops are sequenced; completed ones trail behind.
    fn is_pending(&self) -> bool;
}

/// Driving route between ordered waypoints.
pub trait RouteProvider: Send + Sync {
    fn fetch_route(
        &self,
        waypoints: &[LatLng],
    ) -> impl Future<Output = Result<RouteResult, RouteFailure>> + Send;
}

/// Coordinate to human-readable address.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, at: LatLng) -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

/// A place-search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub location: LatLng,
    pub label: String,
}

/// Free-text query to the best matching place.
pub trait PlaceSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<Place>, ProviderError>> + Send;
}

/// What a short link turned into after following it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnwrappedLink {
    /// Final URL after redirects, when the proxy reports it.
    pub final_url: Option<String>,
    /// Raw page body.
    pub body: String,
}

/// Follows a (possibly redirecting) link and returns what it points at.
pub trait LinkUnwrapper: Send + Sync {
    fn unwrap_link(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<UnwrappedLink, ProviderError>> + Send;
}
