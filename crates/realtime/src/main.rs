//! Parses CLI args, opens the two store connections, builds and publishes
//! the Nominal Index, starts the Flush Scheduler, optionally the Pub/Sub
//! Intake, and the HTTP Read API, then waits for SIGINT/SIGTERM to shut
//! everything down in order.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwap;
use clap::Parser;
use database::{StoreReader, StoreWriter};
use mqtt::subscription::Subscription;
use public_transport::flush::{self, FlushConfig};
use public_transport::nominal_index;
use public_transport::queue::WriteQueues;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use web::config::{CachingConfig, RoutingConfig, WebConfig};

use crate::config::Config;

/// Reconciles GTFS-realtime feeds against a static GTFS schedule and
/// republishes them over HTTP, binary or JSON.
#[derive(Debug, Parser)]
#[command(name = "realtime")]
struct Cli {
    /// Path to the DuckDB store file.
    database: PathBuf,

    /// YAML config file; every key has a default, so this is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address the HTTP Read API binds to.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port the HTTP Read API binds to.
    #[arg(long, default_value_t = 8030)]
    port: u16,

    /// Path to a static GTFS ZIP bundle to load into the static tables
    /// before starting the core. Static loading is routine bulk ingestion,
    /// out of this engine's scope beyond making the Nominal Index
    /// buildable, so this does not diff against an existing load.
    #[arg(long)]
    gtfs_zip: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    let writer = StoreWriter::open(&cli.database).context("opening writer connection")?;
    let reader = StoreReader::open(&cli.database).context("opening reader connection")?;

    if let Some(gtfs_zip) = &cli.gtfs_zip {
        let file = std::fs::File::open(gtfs_zip)
            .with_context(|| format!("opening static GTFS bundle at {}", gtfs_zip.display()))?;
        let bundle = gtfs::static_loader::load_zip(file).context("parsing static GTFS bundle")?;
        tracing::info!(
            path = %gtfs_zip.display(),
            agencies = bundle.agencies.len(),
            routes = bundle.routes.len(),
            stops = bundle.stops.len(),
            trips = bundle.trips.len(),
            "loading static GTFS bundle"
        );
        writer
            .load_static(
                &bundle.agencies,
                &bundle.routes,
                &bundle.stops,
                &bundle.trips,
                &bundle.stop_times,
                &bundle.calendar,
                &bundle.calendar_dates,
            )
            .context("loading static GTFS bundle into the store")?;
    }

    let timezone: chrono_tz::Tz = config.app.timezone.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = %config.app.timezone, "unrecognized timezone, falling back to Europe/Berlin");
        chrono_tz::Europe::Berlin
    });
    let operation_day = chrono::Utc::now().with_timezone(&timezone).date_naive();

    let index = nominal_index::build(&reader, operation_day).context("building nominal index")?;
    tracing::info!(
        operation_day = %operation_day,
        trips = index.trip_ids.len(),
        stops = index.stop_ids.len(),
        routes = index.route_ids.len(),
        "nominal index built"
    );
    let nominal_index = Arc::new(ArcSwap::new(Arc::new(index)));

    let aged_out = writer
        .age_out(chrono::Utc::now().timestamp(), config.app.data_review_seconds)
        .context("clearing stale realtime rows at startup")?;
    tracing::info!(aged_out, "cleared stale realtime rows at startup");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        });
    }

    // Rebuilds the Nominal Index when the day-of-service reference date
    // rolls over. Uses its own reader connection so it never contends
    // with the writer's flush ticks or the HTTP read path.
    {
        let shutdown = shutdown.clone();
        let nominal_index = nominal_index.clone();
        let database_path = cli.database.clone();
        tokio::spawn(async move {
            day_rollover_loop(database_path, timezone, nominal_index, shutdown).await;
        });
    }

    // Owns the writer connection for the rest of the process's life.
    let (queue_handle, queues) = WriteQueues::new();
    let flush_config = FlushConfig {
        interval: std::time::Duration::from_secs(15),
        max_age_seconds: config.app.data_review_seconds,
    };
    let (flush_shutdown_tx, flush_shutdown_rx) = oneshot::channel();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            let _ = flush_shutdown_tx.send(());
        });
    }
    let flush_task = tokio::spawn(flush::run(writer, queues, flush_config, flush_shutdown_rx));

    // MQTT intake, optional.
    if config.app.mqtt_enabled {
        let mqtt_config = config
            .mqtt
            .clone()
            .context("app.mqtt_enabled is true but no mqtt config section was provided")?;

        let subscriptions: Vec<Subscription> = mqtt_config
            .subscriptions
            .iter()
            .cloned()
            .map(Subscription::from_config)
            .collect::<Result<_, _>>()
            .context("parsing mqtt subscription id mappings")?;

        let (client, eventloop) = mqtt::intake::connect(&mqtt_config, &subscriptions)
            .await
            .context("connecting to mqtt broker")?;
        tracing::info!(
            host = %mqtt_config.host,
            port = mqtt_config.port,
            subscriptions = subscriptions.len(),
            "mqtt intake subscribed"
        );

        let intake_task = tokio::spawn(mqtt::intake::run(
            eventloop,
            subscriptions,
            nominal_index.clone(),
            queue_handle.clone(),
            config.matching,
            config.app.data_review_seconds,
            config.app.translation_language.clone(),
        ));

        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            let _ = client.disconnect().await;
            intake_task.abort();
        });
    }

    // HTTP Read API and response cache.
    let web_config = build_web_config(&cli, &config, timezone);
    let web_shutdown = shutdown.clone().cancelled_owned();
    if let Err(why) = web::start_web_server(reader, web_config, web_shutdown).await {
        tracing::error!(error = %why, "http server exited with an error");
    }

    if let Err(why) = flush_task.await {
        tracing::error!(error = %why, "flush scheduler task panicked during shutdown");
    }

    Ok(())
}

fn build_web_config(cli: &Cli, config: &Config, timezone: chrono_tz::Tz) -> WebConfig {
    WebConfig {
        bind: format!("{}:{}", cli.host, cli.port),
        monitor_enabled: config.app.monitor_enabled,
        cors_enabled: config.app.cors_enabled,
        timezone,
        translation_language: config.app.translation_language.clone(),
        routing: RoutingConfig {
            service_alerts_endpoint: config.app.routing.service_alerts_endpoint.clone(),
            trip_updates_endpoint: config.app.routing.trip_updates_endpoint.clone(),
            vehicle_positions_endpoint: config.app.routing.vehicle_positions_endpoint.clone(),
            monitor_endpoint: config.app.routing.monitor_endpoint.clone(),
        },
        caching: CachingConfig {
            enabled: config.app.caching_enabled,
            service_alerts_ttl: std::time::Duration::from_secs(config.caching.caching_service_alerts_ttl_seconds),
            trip_updates_ttl: std::time::Duration::from_secs(config.caching.caching_trip_updates_ttl_seconds),
            vehicle_positions_ttl: std::time::Duration::from_secs(
                config.caching.caching_vehicle_positions_ttl_seconds,
            ),
        },
    }
}

/// Polls the current operation day and rebuilds + publishes a fresh
/// Nominal Index whenever it changes from the one the snapshot was
/// built for. Checked on a short period rather than scheduled for
/// midnight exactly, since the cost of an extra no-op check is
/// negligible next to the cost of missing a rollover on a sleeping
/// host.
async fn day_rollover_loop(
    database_path: PathBuf,
    timezone: chrono_tz::Tz,
    nominal_index: Arc<ArcSwap<public_transport::nominal_index::NominalIndex>>,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.cancelled() => return,
        }

        let today = chrono::Utc::now().with_timezone(&timezone).date_naive();
        if today == nominal_index.load().operation_day {
            continue;
        }

        let reader = match StoreReader::open(&database_path) {
            Ok(reader) => reader,
            Err(why) => {
                tracing::error!(error = %why, "failed to open reader for nominal index rebuild");
                continue;
            }
        };
        match nominal_index::build(&reader, today) {
            Ok(rebuilt) => {
                tracing::info!(
                    operation_day = %today,
                    trips = rebuilt.trip_ids.len(),
                    "nominal index rebuilt on day rollover"
                );
                nominal_index.store(Arc::new(rebuilt));
            }
            Err(why) => {
                tracing::error!(error = %why, operation_day = %today, "failed to rebuild nominal index on day rollover");
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(why) => tracing::warn!(error = %why, "failed to install SIGTERM handler"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

