//! Runtime Protocol Tests
//!
//! End-to-end exchange scenarios over real localhost sockets. The server
//! binds port 0 and the tester connects to whatever the OS picked.

use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

use benchwire::{
    BenchwireError, Config, Measurements, Message, MessageType, ModelRuntime, PollEvent, Result,
    Runner, RuntimeProtocol, ServerStatus, TcpProtocol,
};

const TEST_DEADLINE: Duration = Duration::from_secs(30);

fn config_for(port: u16) -> Config {
    Config::builder()
        .host("127.0.0.1")
        .port(port)
        .poll_timeout_ms(200)
        .poll_interval_ms(2)
        .build()
}

/// Polls the protocol until the wanted status is observed
fn wait_for_status(protocol: &mut TcpProtocol, wanted: ServerStatus) -> PollEvent {
    let deadline = Instant::now() + TEST_DEADLINE;
    loop {
        for event in protocol.wait_for_activity() {
            if event.status == wanted {
                return event;
            }
        }
        assert!(Instant::now() < deadline, "did not observe {:?}", wanted);
    }
}

// =============================================================================
// Test Runtime
// =============================================================================

/// Scripted model runtime used as the runner-side collaborator
#[derive(Default)]
struct TestRuntime {
    model: Option<Vec<u8>>,
    input: Option<Vec<u8>>,
    processed: bool,
}

impl ModelRuntime for TestRuntime {
    fn prepare_model(&mut self, model: &[u8]) -> Result<()> {
        self.model = Some(model.to_vec());
        Ok(())
    }

    fn prepare_input(&mut self, input: &[u8]) -> Result<()> {
        self.input = Some(input.to_vec());
        Ok(())
    }

    fn prepare_io_specification(&mut self, _spec: &[u8]) -> Result<()> {
        Ok(())
    }

    fn process_input(&mut self) -> Result<()> {
        if self.input.is_none() {
            return Err(BenchwireError::Protocol("no input staged".to_string()));
        }
        // simulated inference latency, so the completion ack trails the
        // start ack like it would on real hardware
        thread::sleep(Duration::from_millis(50));
        self.processed = true;
        Ok(())
    }

    fn fetch_output(&mut self) -> Result<Vec<u8>> {
        if !self.processed {
            return Err(BenchwireError::Protocol("nothing processed".to_string()));
        }
        Ok(b"result".to_vec())
    }

    fn statistics(&mut self) -> Measurements {
        let mut measurements = Measurements::new();
        measurements.add("latency_ms", json!(12.5));
        measurements
    }
}

/// Drives the runner until the client thread finishes
fn drive<R: ModelRuntime, T>(runner: &mut Runner<TcpProtocol, R>, client: &thread::JoinHandle<T>) {
    let deadline = Instant::now() + TEST_DEADLINE;
    while !client.is_finished() {
        runner.run_once();
        assert!(Instant::now() < deadline, "client did not finish in time");
    }
}

// =============================================================================
// Round Trip Scenarios
// =============================================================================

#[test]
fn test_full_benchmark_round_trip() {
    let mut protocol = TcpProtocol::new(config_for(0));
    protocol.initialize_server().unwrap();
    let port = protocol.local_addr().unwrap().port();

    let mut runner = Runner::new(protocol, TestRuntime::default());

    let client = thread::spawn(move || {
        let mut protocol = TcpProtocol::new(config_for(port));
        protocol.initialize_client().unwrap();

        let model_file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(model_file.path(), b"0123456789").unwrap();

        protocol.upload_model(model_file.path()).unwrap();
        protocol.upload_input(b"tensor-bytes").unwrap();
        protocol.request_processing().unwrap();

        let output = protocol.download_output().unwrap();

        let mut measurements = Measurements::new();
        assert!(measurements.is_empty());
        protocol.download_statistics(&mut measurements).unwrap();

        protocol.disconnect();
        (output, measurements)
    });

    drive(&mut runner, &client);

    let (output, measurements) = client.join().unwrap();
    assert_eq!(output.as_slice(), b"result");
    assert_eq!(measurements.get("latency_ms"), Some(&json!(12.5)));
}

#[test]
fn test_io_specification_upload() {
    let mut protocol = TcpProtocol::new(config_for(0));
    protocol.initialize_server().unwrap();
    let port = protocol.local_addr().unwrap().port();

    let mut runner = Runner::new(protocol, TestRuntime::default());

    let client = thread::spawn(move || {
        let mut protocol = TcpProtocol::new(config_for(port));
        protocol.initialize_client().unwrap();

        let spec_file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(spec_file.path(), br#"{"inputs": []}"#).unwrap();

        protocol.upload_io_specification(spec_file.path()).unwrap();
        protocol.disconnect();
    });

    drive(&mut runner, &client);
    client.join().unwrap();
}

#[test]
fn test_processing_failure_aborts_exchange() {
    let mut protocol = TcpProtocol::new(config_for(0));
    protocol.initialize_server().unwrap();
    let port = protocol.local_addr().unwrap().port();

    // no input staged: PROCESS gets the start ack, then an ERROR completion
    let mut runner = Runner::new(protocol, TestRuntime::default());

    let client = thread::spawn(move || {
        let mut protocol = TcpProtocol::new(config_for(port));
        protocol.initialize_client().unwrap();

        let result = protocol.request_processing();
        protocol.disconnect();
        result
    });

    drive(&mut runner, &client);

    let result = client.join().unwrap();
    assert!(result.is_err());
}

// =============================================================================
// Single-Peer Exclusivity
// =============================================================================

#[test]
fn test_second_client_is_ignored() {
    use std::io::Read;
    use std::net::TcpStream;

    let mut server = TcpProtocol::new(config_for(0));
    server.initialize_server().unwrap();
    let addr = server.local_addr().unwrap();

    let mut first = TcpProtocol::new(config_for(addr.port()));
    first.initialize_client().unwrap();
    wait_for_status(&mut server, ServerStatus::ClientConnected);

    // a second peer while one is bound is rejected, not queued
    let mut second = TcpStream::connect(addr).unwrap();
    wait_for_status(&mut server, ServerStatus::ClientIgnored);
    assert!(server.is_connected());

    // the original session is unaffected
    first
        .send_message(&Message::new(MessageType::Data, b"ping".to_vec()))
        .unwrap();

    let event = wait_for_status(&mut server, ServerStatus::DataReady);
    let frames = event.frames.unwrap();
    assert_eq!(frames.len(), 1);
    let message = Message::parse(&frames[0], server.endianness()).unwrap();
    assert_eq!(message.message_type, MessageType::Data);
    assert_eq!(message.payload.as_slice(), b"ping");

    server.request_success(&[]).unwrap();
    let payload = first.receive_confirmation().unwrap();
    assert!(payload.is_empty());

    // the rejected socket was closed with no handshake
    second
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut buf = [0u8; 1];
    assert_eq!(second.read(&mut buf).unwrap(), 0);
}

// =============================================================================
// Disconnect Scenarios
// =============================================================================

#[test]
fn test_peer_disconnect_reported_once_and_socket_released() {
    use std::net::TcpStream;

    let mut server = TcpProtocol::new(config_for(0));
    server.initialize_server().unwrap();
    let addr = server.local_addr().unwrap();

    let client = TcpStream::connect(addr).unwrap();
    wait_for_status(&mut server, ServerStatus::ClientConnected);

    drop(client);

    let mut disconnects = 0;
    for _ in 0..5 {
        for event in server.wait_for_activity() {
            if event.status == ServerStatus::ClientDisconnected {
                disconnects += 1;
            }
        }
    }
    assert_eq!(disconnects, 1);
    assert!(!server.is_connected());

    // the released socket cannot be reused: sends fail cleanly
    let result = server.send_message(&Message::bodyless(MessageType::Ok));
    assert!(matches!(result, Err(BenchwireError::NotConnected)));
}

#[test]
fn test_disconnect_during_exchange_fails_confirmation() {
    let mut server = TcpProtocol::new(config_for(0));
    server.initialize_server().unwrap();
    let port = server.local_addr().unwrap().port();

    let client = thread::spawn(move || {
        let mut protocol = TcpProtocol::new(config_for(port));
        protocol.initialize_client().unwrap();
        protocol
            .send_message(&Message::bodyless(MessageType::Output))
            .unwrap();

        // the peer vanishes instead of replying
        let result = protocol.receive_confirmation();
        assert!(result.is_err());
    });

    // connect and request may land in the same poll cycle, so wait only
    // for the request frame
    wait_for_status(&mut server, ServerStatus::DataReady);
    server.disconnect();

    client.join().unwrap();
}

// =============================================================================
// Protocol Violations
// =============================================================================

#[test]
fn test_two_reply_frames_fail_the_exchange() {
    let mut server = TcpProtocol::new(config_for(0));
    server.initialize_server().unwrap();
    let port = server.local_addr().unwrap().port();

    let mut client = TcpProtocol::new(config_for(port));
    client.initialize_client().unwrap();
    wait_for_status(&mut server, ServerStatus::ClientConnected);

    client
        .send_message(&Message::bodyless(MessageType::Stats))
        .unwrap();
    wait_for_status(&mut server, ServerStatus::DataReady);

    // desynchronized server sends two replies to one request
    server.request_success(b"a").unwrap();
    server.request_success(b"b").unwrap();
    thread::sleep(Duration::from_millis(200));

    let result = client.receive_confirmation();
    assert!(matches!(result, Err(BenchwireError::Protocol(_))));
}

#[test]
fn test_error_reply_fails_the_exchange() {
    let mut server = TcpProtocol::new(config_for(0));
    server.initialize_server().unwrap();
    let port = server.local_addr().unwrap().port();

    let mut client = TcpProtocol::new(config_for(port));
    client.initialize_client().unwrap();
    wait_for_status(&mut server, ServerStatus::ClientConnected);

    client
        .send_message(&Message::new(MessageType::Data, b"bad".to_vec()))
        .unwrap();
    wait_for_status(&mut server, ServerStatus::DataReady);
    server.request_failure().unwrap();

    let result = client.receive_confirmation();
    assert!(matches!(result, Err(BenchwireError::Protocol(_))));
}
