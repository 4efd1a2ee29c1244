//! Turns whatever the user pasted into a coordinate pair.
//!
//! Strategies run in a fixed order and the first accepted match wins:
//!
//! 1. [`Strategy::DirectCoordinates`]: the input is `lat, lng`, or carries a
//!    decimal pair somewhere in pasted text.
//! 2. [`Strategy::MapLink`]: a map URL carrying `@lat,lng`, `q=`, `ll=` or
//!    `center=` parameters.
//! 3. [`Strategy::ShortLink`]: any other link is unwrapped through a
//!    [`LinkUnwrapper`] and the result scanned again.
//! 4. [`Strategy::PlaceQuery`]: free text (place names, plus codes) goes to a
//!    [`PlaceSearch`] provider.
//!
//! Every candidate is range-checked before it is accepted. Nothing ever
//! defaults to `(0, 0)`: if no strategy produces a coordinate the caller gets a
//! [`ParseFailure`] that still carries the input.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::coordinate::LatLng;
use crate::error::ParseFailure;
use crate::traits::{LinkUnwrapper, PlaceSearch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DirectCoordinates,
    MapLink,
    ShortLink,
    PlaceQuery,
}

/// Evaluation order.
pub const STRATEGIES: [Strategy; 4] = [
    Strategy::DirectCoordinates,
    Strategy::MapLink,
    Strategy::ShortLink,
    Strategy::PlaceQuery,
];

/// An accepted resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub location: LatLng,
    /// Human-readable name when the provider supplied one.
    pub label: Option<String>,
    pub strategy: Strategy,
}

enum Attempt {
    Matched(Resolved),
    Deferred,
    Failed(ParseFailure),
}

static DIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)\s*(?:,\s*|\s+)([-+]?\d+(?:\.\d+)?)\s*$")
        .expect("valid regex")
});

/// A decimal pair anywhere in the text, not glued to a preceding word.
static EMBEDDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.])([-+]?\d{1,3}\.\d+)[,\s]+([-+]?\d{1,3}\.\d+)").expect("valid regex")
});

/// Map-link parameter conventions, highest priority first.
static MAP_LINK: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"@([-+]?\d{1,3}\.\d+),\s*([-+]?\d{1,3}\.\d+)",
        r"[?&;]q=([-+]?\d{1,3}\.\d+)[,\s+]+([-+]?\d{1,3}\.\d+)",
        r"[?&;]ll=([-+]?\d{1,3}\.\d+)[,\s+]+([-+]?\d{1,3}\.\d+)",
        r"\bcenter=([-+]?\d{1,3}\.\d+)[,\s+]+([-+]?\d{1,3}\.\d+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
});

/// Last-resort patterns for still-encoded pairs inside page bodies.
static DEEP_SCAN: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        r"(?i)q(?:=|\\u003d)([-+]?\d{1,3}\.\d+)(?:%2C|,)(?:\+|%20|\s)*([-+]?\d{1,3}\.\d+)",
        r"(?i)([-+]?\d{1,3}\.\d{3,})(?:%2C|%20|\+|,|\s)+([-+]?\d{1,3}\.\d{3,})",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://\S+|(?:[\w-]+\.)*goo\.gl/\S*)$").expect("valid regex")
});

/// Location resolution cascade over an unwrapper and a place search.
#[derive(Debug, Clone)]
pub struct LocationResolver<L, S> {
    links: L,
    places: S,
}

impl<L, S> LocationResolver<L, S>
where
    L: LinkUnwrapper,
    S: PlaceSearch,
{
    pub fn new(links: L, places: S) -> Self {
        Self { links, places }
    }

    pub async fn resolve(&self, raw: &str) -> Result<Resolved, ParseFailure> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ParseFailure::Empty);
        }

        for strategy in STRATEGIES {
            match self.attempt(strategy, input).await {
                Attempt::Matched(resolved) => {
                    tracing::debug!(?strategy, location = %resolved.location, "location resolved");
                    return Ok(resolved);
                }
                Attempt::Deferred => continue,
                Attempt::Failed(failure) => {
                    tracing::warn!(?strategy, error = %failure, "location not resolved");
                    return Err(failure);
                }
            }
        }

        Err(ParseFailure::Unrecognized {
            input: input.to_string(),
        })
    }

    async fn attempt(&self, strategy: Strategy, input: &str) -> Attempt {
        match strategy {
            Strategy::DirectCoordinates => direct(input),
            Strategy::MapLink => match find_map_link_coords(input) {
                Some(location) => Attempt::Matched(Resolved {
                    location,
                    label: None,
                    strategy,
                }),
                None => Attempt::Deferred,
            },
            Strategy::ShortLink => self.short_link(input).await,
            Strategy::PlaceQuery => self.place_query(input).await,
        }
    }

    async fn short_link(&self, input: &str) -> Attempt {
        if !looks_like_link(input) {
            return Attempt::Deferred;
        }

        let page = match self.links.unwrap_link(&with_scheme(input)).await {
            Ok(page) => page,
            Err(source) => {
                return Attempt::Failed(ParseFailure::LinkFetch {
                    input: input.to_string(),
                    source,
                });
            }
        };

        let found = page
            .final_url
            .as_deref()
            .and_then(find_map_link_coords)
            .or_else(|| find_map_link_coords(&page.body))
            .or_else(|| deep_scan(&page.body));

        match found {
            Some(location) => Attempt::Matched(Resolved {
                location,
                label: None,
                strategy: Strategy::ShortLink,
            }),
            None => Attempt::Failed(ParseFailure::LinkUnresolved {
                input: input.to_string(),
            }),
        }
    }

    async fn place_query(&self, input: &str) -> Attempt {
        if !input.chars().any(char::is_alphanumeric) {
            return Attempt::Deferred;
        }

        match self.places.search(input).await {
            Ok(Some(place)) if place.location.is_valid() => Attempt::Matched(Resolved {
                location: place.location,
                label: Some(place.label),
                strategy: Strategy::PlaceQuery,
            }),
            Ok(Some(place)) => Attempt::Failed(ParseFailure::OutOfRange {
                input: input.to_string(),
                lat: place.location.lat,
                lng: place.location.lng,
            }),
            Ok(None) => Attempt::Failed(ParseFailure::NoPlaceFound {
                input: input.to_string(),
            }),
            Err(source) => Attempt::Failed(ParseFailure::PlaceSearch {
                input: input.to_string(),
                source,
            }),
        }
    }
}

/// A pair is unambiguous, so an out-of-range one fails outright instead of
/// being sent to place search. Links are left to the map-link patterns.
fn direct(input: &str) -> Attempt {
    if looks_like_link(input) {
        return Attempt::Deferred;
    }
    let Some((lat, lng)) = parse_pair(&DIRECT, input).or_else(|| parse_pair(&EMBEDDED, input))
    else {
        return Attempt::Deferred;
    };

    match LatLng::checked(lat, lng) {
        Some(location) => Attempt::Matched(Resolved {
            location,
            label: None,
            strategy: Strategy::DirectCoordinates,
        }),
        None => Attempt::Failed(ParseFailure::OutOfRange {
            input: input.to_string(),
            lat,
            lng,
        }),
    }
}

/// Scans `text` for map-link coordinate parameters, as given first and then
/// percent-decoded.
pub fn find_map_link_coords(text: &str) -> Option<LatLng> {
    let decoded = percent_decode_str(text).decode_utf8_lossy();
    [text, decoded.as_ref()].into_iter().find_map(|candidate| {
        MAP_LINK
            .iter()
            .find_map(|pattern| first_valid_pair(pattern, candidate))
    })
}

/// Looks for encoded or space-joined pairs the map-link patterns missed.
pub fn deep_scan(body: &str) -> Option<LatLng> {
    DEEP_SCAN
        .iter()
        .find_map(|pattern| first_valid_pair(pattern, body))
}

pub fn looks_like_link(input: &str) -> bool {
    LINK.is_match(input)
}

fn with_scheme(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

fn parse_pair(pattern: &Regex, text: &str) -> Option<(f64, f64)> {
    let caps = pattern.captures(text)?;
    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some((lat, lng))
}

fn first_valid_pair(pattern: &Regex, text: &str) -> Option<LatLng> {
    pattern.captures_iter(text).find_map(|caps| {
        let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
        LatLng::checked(lat, lng)
    })
}
