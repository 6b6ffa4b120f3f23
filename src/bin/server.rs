use std::{env, fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use pocketbook_rs::{
    AppState, RetentionPolicy, build_router, graceful_shutdown, logging_middleware,
    run_periodic_sweep, seed_demo_user,
    store::{JsonFileStore, Store},
};

/// The REST API server for pocketbook_rs.
///
/// The secret used to sign bearer tokens is read from the `SECRET` environment variable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON store file. It is created on the first write if it does not exist.
    #[arg(long, default_value = "data.json")]
    store_path: String,

    /// The IP address to serve the API from.
    #[arg(long, default_value = "127.0.0.1")]
    address: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How many hours a bearer token is valid for.
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(i64).range(1..=8760))]
    token_hours: i64,

    /// Users who have not logged in for this many days are removed by the cleanup sweep.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i64).range(1..=3650))]
    inactive_days: i64,

    /// How many minutes to wait between cleanup sweeps.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=10080))]
    sweep_minutes: u64,

    /// Create the demo user (demo@local / demo123) if it does not exist.
    #[arg(long)]
    seed_demo_user: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        exit(1);
    };

    let addr: SocketAddr = match format!("{}:{}", args.address, args.port).parse() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!("Invalid address {}:{}: {error}", args.address, args.port);
            exit(1);
        }
    };

    let store = Store::new(JsonFileStore::new(&args.store_path));
    let retention = RetentionPolicy {
        max_user_inactivity: Duration::days(args.inactive_days),
        ..Default::default()
    };
    let state = AppState::new(store.clone(), &secret)
        .with_token_duration(Duration::hours(args.token_hours))
        .with_retention(retention);

    if args.seed_demo_user {
        match seed_demo_user(&store, state.password_cost) {
            Ok(Some(user)) => tracing::info!("Created demo user {} ({})", user.id, user.email),
            Ok(None) => tracing::info!("Demo user already exists"),
            Err(error) => {
                tracing::error!("Could not create demo user: {error}");
                exit(1);
            }
        }
    }

    tokio::spawn(run_periodic_sweep(
        store,
        retention,
        std::time::Duration::from_secs(args.sweep_minutes * 60),
    ));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!(
        "HTTP server listening on {} using the store at {}",
        addr,
        args.store_path
    );
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file)),
        ),
        Err(error) => {
            eprintln!("Could not create log file, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
