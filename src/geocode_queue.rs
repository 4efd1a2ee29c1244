//! Single-file, rate-limited queue for reverse geocoding.
//!
//! All lookups go through one worker task that owns the geocoder. Requests
//! are served strictly in submission order and each one starts at least
//! `spacing` after the previous one finished, so any number of concurrent
//! callers is throttled to the provider's rate limit. A failed lookup resolves
//! to [`LOOKUP_FAILED`] and the worker moves on to the next entry.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use crate::coordinate::LatLng;
use crate::traits::ReverseGeocoder;

/// Address used when the lookup itself failed.
pub const LOOKUP_FAILED: &str = "Address lookup failed";

/// Nominatim's published limit is one request per second.
pub const DEFAULT_SPACING: Duration = Duration::from_secs(1);

struct Job {
    at: LatLng,
    reply: oneshot::Sender<String>,
}

/// Handle to the queue. Cheap to clone; all clones share one worker.
#[derive(Debug, Clone)]
pub struct GeocodeQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl GeocodeQueue {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn<G>(geocoder: G, spacing: Duration) -> Self
    where
        G: ReverseGeocoder + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(geocoder, rx, spacing));
        Self { tx }
    }

    /// Queues a lookup and returns a future for its address.
    ///
    /// The position in the queue is taken when this is called, not when the
    /// returned future is first polled. The future never fails: if the worker
    /// is gone it yields [`LOOKUP_FAILED`].
    pub fn enqueue(&self, at: LatLng) -> impl Future<Output = String> + Send + use<> {
        let (reply, answer) = oneshot::channel();
        if self.tx.send(Job { at, reply }).is_err() {
            tracing::warn!(%at, "geocode queue closed");
        }

        async move { answer.await.unwrap_or_else(|_| LOOKUP_FAILED.to_string()) }
    }
}

async fn run_worker<G>(geocoder: G, mut rx: mpsc::UnboundedReceiver<Job>, spacing: Duration)
where
    G: ReverseGeocoder,
{
    let mut next_slot: Option<Instant> = None;

    while let Some(job) = rx.recv().await {
        if let Some(slot) = next_slot {
            sleep_until(slot).await;
        }

        let address = match geocoder.reverse(job.at).await {
            Ok(address) => {
                tracing::debug!(at = %job.at, %address, "address resolved");
                address
            }
            Err(err) => {
                tracing::warn!(at = %job.at, error = %err, "reverse geocoding failed");
                LOOKUP_FAILED.to_string()
            }
        };
        next_slot = Some(Instant::now() + spacing);

        // caller may have stopped waiting; that is fine
        let _ = job.reply.send(address);
    }

    tracing::debug!("geocode queue drained");
}
