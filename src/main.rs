use thiserror::Error;
use tracing_subscriber::EnvFilter;

use courier_route::config::Config;
use courier_route::error::{ConfigError, ParseFailure, PlanError};
use courier_route::geocode_queue::GeocodeQueue;
use courier_route::link_proxy::LinkProxyClient;
use courier_route::nominatim::NominatimClient;
use courier_route::osrm::OsrmClient;
use courier_route::planner::{Planner, Selection};
use courier_route::resolver::LocationResolver;
use courier_route::route::{format_distance, format_duration};

#[derive(Debug, Error)]
enum CliError {
    #[error("usage: courier-route <pickup> <delivery>...\n  each location may be \"lat, lng\", a map link or a place name")]
    Usage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{input:?}: {source}\n  {hint}")]
    Resolve {
        input: String,
        hint: &'static str,
        #[source]
        source: ParseFailure,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl From<ParseFailure> for CliError {
    fn from(failure: ParseFailure) -> Self {
        CliError::Resolve {
            input: failure.input().to_string(),
            hint: failure.hint(),
            source: failure,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        return Err(CliError::Usage);
    }

    let nominatim = NominatimClient::new(config.nominatim.clone()).map_err(ConfigError::from)?;
    let links = LinkProxyClient::new(config.link_proxy.clone()).map_err(ConfigError::from)?;
    let osrm = OsrmClient::new(config.osrm.clone()).map_err(ConfigError::from)?;
    let resolver = LocationResolver::new(links, nominatim.clone());
    let geocoder = GeocodeQueue::spawn(nominatim, config.geocode_spacing);

    let mut planner = Planner::default();
    let mut lookups = Vec::new();

    for arg in &args {
        let resolved = resolver.resolve(arg).await?;
        tracing::info!(input = %arg, location = %resolved.location, strategy = ?resolved.strategy, "location accepted");

        // one route request after optimizing is enough
        let (selection, _) = planner.select_location(resolved.location)?;
        if let Selection::Delivery(id) = selection {
            if let Some(lookup) = planner.lookup_address(&geocoder, id) {
                lookups.push(lookup);
            }
        }
    }

    if let Some(request) = planner.optimize()? {
        let result = request.fetch(&osrm).await;
        planner.apply_route(request.token, result);
    }

    for lookup in lookups {
        let (id, address) = lookup.await;
        planner.apply_address(id, address);
    }

    print_run_sheet(&planner);
    Ok(())
}

fn print_run_sheet(planner: &Planner) {
    if let Some(pickup) = planner.pickup() {
        println!("Pickup: {pickup}");
    }

    for (stop, delivery) in planner.store().pending().enumerate() {
        let distance = planner.distance_label(delivery.id).unwrap_or_default();
        println!(
            "{:>2}. {} ({}) fee {:.2}",
            stop + 1,
            delivery.address,
            distance,
            delivery.order.delivery_fee
        );
    }

    match planner.route() {
        Some(route) => println!(
            "Route: {}, {} ({} path points)",
            format_distance(route.distance_m),
            format_duration(route.duration_s),
            route.path.len()
        ),
        None => println!("Route: unavailable"),
    }
}
