//! Integration tests for worker sources feeding a graph

mod common;

use common::builders::quiet_graph;
use common::mock_helpers::create_test_channel;
use common::{test_timeout, Event, Recorder};
use dataflow_rs::graph::transforms::{Dedupe, Take};
use dataflow_rs::graph::{Attach, NodeState};
use dataflow_rs::{WorkerHandle, WorkerMessage, WorkerSource};
use std::time::Instant;

#[test]
fn test_existing_channel_pumped_incrementally() {
    let (tx, rx) = create_test_channel::<i32>();
    let mut source = WorkerSource::from_receiver("external", rx);
    let mut graph = quiet_graph();
    let root = graph.source();
    let recorder = Recorder::new();
    graph
        .attach(
            root,
            Attach::transform(Dedupe::new()).with_receiver(recorder.tagged("dedupe")),
        )
        .unwrap();

    for v in [1, 1, 2] {
        tx.send(WorkerMessage::Value(v)).unwrap();
    }
    assert_eq!(source.pump(&mut graph, root).unwrap(), 3);

    for v in [2, 3] {
        tx.send(WorkerMessage::Value(v)).unwrap();
    }
    drop(tx);
    source.pump(&mut graph, root).unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            Event::Value("dedupe", 1),
            Event::Value("dedupe", 2),
            Event::Value("dedupe", 3),
            Event::Complete("dedupe"),
        ]
    );
    assert!(source.is_finished());
}

#[test]
fn test_spawned_worker_stops_when_root_terminates() {
    let mut graph = quiet_graph();
    let root = graph
        .add_root(Attach::transform(Take::new(3)))
        .unwrap();
    let recorder = Recorder::new();
    graph.subscribe(root, recorder.tagged("out")).unwrap();

    let mut source = WorkerSource::spawn("endless", 2, |handle: WorkerHandle<i32>| {
        let mut i = 0;
        // Runs until the graph side drops the channel.
        while handle.send(i) {
            i += 1;
        }
    })
    .unwrap();

    source.run(&mut graph, root).unwrap();
    assert!(source.is_finished());
    assert_eq!(graph.state(root).unwrap(), NodeState::Done);
    assert_eq!(recorder.value_tags(), vec!["out", "out", "out"]);
    assert_eq!(recorder.count_completions("out"), 1);

    let started = Instant::now();
    source.join().unwrap();
    assert!(started.elapsed() < test_timeout() * 10);
}

#[test]
fn test_worker_failure_reaches_subscribers() {
    let mut graph = quiet_graph();
    let root = graph.source();
    let recorder = Recorder::new();
    graph.subscribe(root, recorder.tagged_with_fail("out")).unwrap();

    let mut source = WorkerSource::spawn("flaky", 4, |handle: WorkerHandle<i32>| {
        handle.send(1);
        handle.fail(anyhow::anyhow!("read timeout"));
    })
    .unwrap();

    source.run(&mut graph, root).unwrap();
    source.join().unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            Event::Value("out", 1),
            Event::Fail("out", "read timeout".to_string()),
        ]
    );
    assert_eq!(graph.state(root).unwrap(), NodeState::Error);
}

#[test]
fn test_pump_on_terminated_root_forwards_nothing() {
    let (tx, rx) = create_test_channel::<i32>();
    let mut source = WorkerSource::from_receiver("late", rx);
    let mut graph = quiet_graph();
    let root = graph.source();
    graph.complete(root).unwrap();

    tx.send(WorkerMessage::Value(1)).unwrap();
    assert_eq!(source.pump(&mut graph, root).unwrap(), 0);
    assert!(source.is_finished());
}
