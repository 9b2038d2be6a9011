//! dataflow-rs demo
//!
//! Wires a small graph, feeds it from a worker thread and logs every
//! delivery. Pass a path to a JSON `GraphConfig` as the first argument to
//! override the defaults.

use dataflow_rs::{
    graph::transforms::{Filter, Map, Take},
    Attach, Callbacks, Graph, GraphConfig, ResultExt, WorkerHandle, WorkerSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> dataflow_rs::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dataflow_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dataflow demo");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading graph config from {}", path);
            GraphConfig::load_or_default(path)
        }
        None => GraphConfig::default(),
    };
    let capacity = config.worker_channel_capacity;
    let mut graph: Graph<i64> = Graph::with_config(config);

    // R ──► A (identity)
    //   └─► B (x > 10) ──► C (x * 2, first 3)
    let root = graph.source_named("readings");
    graph
        .attach(
            root,
            Attach::receiver(Callbacks::new(|v: &i64| {
                tracing::info!("A received {}", v);
                Ok(())
            }))
            .named("A"),
        )
        .context("wiring A")?;

    let large = graph
        .attach(
            root,
            Attach::transform(Filter::new(|v: &i64| *v > 10))
                .with_receiver(Callbacks::new(|v: &i64| {
                    tracing::info!("B received {}", v);
                    Ok(())
                }))
                .named("B"),
        )
        .context("wiring B")?;

    let doubled = graph
        .transform(
            large,
            vec![Box::new(Map::new(|v: i64| v * 2)), Box::new(Take::new(3))],
            Some("C"),
        )
        .context("wiring C")?;
    graph
        .subscribe(
            doubled,
            Callbacks::new(|v: &i64| {
                tracing::info!("C received {}", v);
                Ok(())
            })
            .on_complete(|| {
                tracing::info!("C complete");
                Ok(())
            }),
        )
        .context("subscribing to C")?;

    let mut worker = WorkerSource::spawn("demo-producer", capacity, |handle: WorkerHandle<i64>| {
        for value in [5, 20, 3, 42, 11, 17, 8] {
            if !handle.send(value) {
                return;
            }
        }
        handle.done();
    })?;

    let forwarded = worker.run(&mut graph, root)?;
    worker.join()?;

    tracing::info!(
        "Forwarded {} messages, {} of {} nodes still live",
        forwarded,
        graph.live_nodes(),
        graph.len()
    );
    for node in graph.snapshot() {
        tracing::debug!("{:?} {} {:?}", node.id, node.name, node.state);
    }

    Ok(())
}
