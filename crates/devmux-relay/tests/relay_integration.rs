#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! End-to-end tests over real FIFOs in a scratch directory.
//!
//! A FIFO opened read-write stands in for the device: every byte the relay
//! writes to it comes straight back on the next read, so input-pipe bytes
//! travel through both relay directions before landing on the output pipe.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use devmux_core::error::RelayError;
use devmux_core::state::EndpointRole;
use devmux_relay::endpoints::FdEndpoints;
use devmux_relay::engine::{RelayEngine, StopReason};
use devmux_relay::setup;

struct TestRelay {
    handle: JoinHandle<Result<StopReason, RelayError>>,
    input_writer: Option<File>,
    output_reader: Option<File>,
    shutdown: watch::Sender<bool>,
}

/// Create device/in/out FIFOs under `dir`, start a relay over them, and
/// rendezvous with its blocking opens from the peer side.
async fn start_relay(dir: &Path, capacity: usize) -> TestRelay {
    let device_path = dir.join("device");
    let input_path = dir.join("in");
    let output_path = dir.join("out");

    setup::ensure_fifo(&device_path).unwrap();
    setup::ensure_fifo(&input_path).unwrap();
    setup::ensure_fifo(&output_path).unwrap();

    let (shutdown, shutdown_rx) = watch::channel(false);

    let handle = {
        let (device_path, input_path, output_path) = (
            device_path.clone(),
            input_path.clone(),
            output_path.clone(),
        );
        tokio::spawn(async move {
            // The opens block until the peer side shows up, so they run on
            // the blocking pool.
            let (device, input, output) = tokio::task::spawn_blocking(move || {
                let device = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(&device_path)
                    .unwrap();
                let input = setup::open_input(&input_path).unwrap();
                let output = setup::open_output(&output_path).unwrap();
                (device, input, output)
            })
            .await
            .unwrap();

            for handle in [&input, &device, &output] {
                setup::set_nonblocking(handle).unwrap();
            }
            let endpoints = FdEndpoints::new(input, device, output).unwrap();
            let mut engine = RelayEngine::new(endpoints, capacity, shutdown_rx);
            engine.run().await
        })
    };

    // Writer side of `in` first, then reader side of `out`, matching the
    // relay's own open order.
    let input_writer = tokio::task::spawn_blocking(move || {
        OpenOptions::new().write(true).open(&input_path).unwrap()
    })
    .await
    .unwrap();
    let output_reader = tokio::task::spawn_blocking(move || File::open(&output_path).unwrap())
        .await
        .unwrap();

    TestRelay {
        handle,
        input_writer: Some(input_writer),
        output_reader: Some(output_reader),
        shutdown,
    }
}

async fn write_input(relay: &mut TestRelay, payload: &'static [u8]) {
    let mut writer = relay.input_writer.take().unwrap();
    relay.input_writer = Some(
        tokio::task::spawn_blocking(move || {
            writer.write_all(payload).unwrap();
            writer
        })
        .await
        .unwrap(),
    );
}

async fn read_output(relay: &mut TestRelay, len: usize) -> Vec<u8> {
    let mut reader = relay.output_reader.take().unwrap();
    let (reader, received) = tokio::time::timeout(
        Duration::from_secs(10),
        tokio::task::spawn_blocking(move || {
            let mut received = vec![0u8; len];
            reader.read_exact(&mut received).unwrap();
            (reader, received)
        }),
    )
    .await
    .unwrap()
    .unwrap();
    relay.output_reader = Some(reader);
    received
}

async fn stop_reason(relay: TestRelay) -> StopReason {
    tokio::time::timeout(Duration::from_secs(10), relay.handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bytes_loop_from_input_pipe_to_output_pipe() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = start_relay(dir.path(), 16).await;

    // Longer than the 16-byte relay buffers, so both directions cycle
    // through several fill/drain rounds.
    let payload: &[u8] = b"devmux loopback payload: 0123456789abcdef";
    write_input(&mut relay, payload).await;

    let received = read_output(&mut relay, payload.len()).await;
    assert_eq!(received, payload);

    // Closing the input writer ends the stream; the relay finishes cleanly.
    relay.input_writer.take();
    assert_eq!(
        stop_reason(relay).await,
        StopReason::EndOfStream(EndpointRole::InputSource)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn payload_order_survives_many_small_writes() {
    let dir = tempfile::tempdir().unwrap();
    let mut relay = start_relay(dir.path(), 4).await;

    write_input(&mut relay, b"abcdefghij").await;
    write_input(&mut relay, b"klmnopqrst").await;

    let received = read_output(&mut relay, 20).await;
    assert_eq!(received, b"abcdefghijklmnopqrst");

    relay.input_writer.take();
    assert_eq!(
        stop_reason(relay).await,
        StopReason::EndOfStream(EndpointRole::InputSource)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_watch_stops_an_idle_relay() {
    let dir = tempfile::tempdir().unwrap();
    let relay = start_relay(dir.path(), 16).await;

    relay.shutdown.send(true).unwrap();
    assert_eq!(stop_reason(relay).await, StopReason::ShutdownRequested);
}
