use std::collections::BTreeSet;

use bytes::BytesMut;
use peerwire::compress::{decompress, ChunkedInput, ZeroCopyInput};
use peerwire::frame::message_type::{ENDPOINTS, LEDGER_DATA, PING, TRANSACTION};
use peerwire::frame::{parse_header, JsonPayload, Message, RawPayload, HEADER_SIZE};
use peerwire::protocol::{DecoderRegistry, Dispatched, Dispatcher, InboundMessage, MessageHandler};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Default)]
struct Collect {
    messages: Vec<InboundMessage>,
    wire_sizes: Vec<usize>,
}

impl MessageHandler for Collect {
    fn on_message_begin(
        &mut self,
        _message_type: u16,
        _message: &InboundMessage,
        wire_size: usize,
    ) {
        self.wire_sizes.push(wire_size);
    }

    fn on_message(&mut self, message: &InboundMessage) {
        self.messages.push(message.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Endpoint {
    hops: u32,
    address: String,
}

fn ledger_payload(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut seq = 0u64;
    while out.len() < len {
        let line = format!("ledger {seq} hash {:016x}\n", seq.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        out.extend_from_slice(line.as_bytes());
        seq += 1;
    }
    out.truncate(len);
    out
}

fn split_into(wire: &[u8], pieces: usize, seed: u64) -> Vec<&[u8]> {
    let mut cuts = BTreeSet::new();
    let mut state = seed;
    while cuts.len() < pieces - 1 {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        cuts.insert(1 + (state >> 33) as usize % (wire.len() - 1));
    }

    let mut chunks = Vec::with_capacity(pieces);
    let mut start = 0;
    for cut in cuts {
        chunks.push(&wire[start..cut]);
        start = cut;
    }
    chunks.push(&wire[start..]);
    chunks
}

#[test]
fn ledger_data_survives_fragmented_delivery() {
    let payload = ledger_payload(100 * 1024);
    let message = Message::new(&RawPayload::from(payload.clone()), LEDGER_DATA).unwrap();
    let wire = message.buffer(true);
    assert!(wire.len() < payload.len(), "ledger data should compress");

    let chunks = split_into(wire, 37, 0x5EED);
    assert_eq!(chunks.len(), 37);

    let header = parse_header(&chunks, wire.len()).unwrap();
    assert!(header.compressed);
    assert_eq!(header.message_type, LEDGER_DATA);
    assert_eq!(header.total_wire_size as usize, wire.len());

    let mut input = ChunkedInput::new(&chunks);
    assert!(input.skip(header.header_size as usize));
    let mut decoded = Vec::new();
    let size = decompress(
        &mut input,
        header.payload_wire_size as usize,
        payload.len(),
        &mut decoded,
        header.algorithm,
    )
    .unwrap();

    assert_eq!(size, payload.len());
    assert_eq!(decoded, payload);
    assert_eq!(input.position(), wire.len());
}

#[test]
fn ledger_data_dispatches_from_fragments() {
    let payload = ledger_payload(100 * 1024);
    let message = Message::new(&RawPayload::from(payload.clone()), LEDGER_DATA).unwrap();
    let wire = message.buffer(true);
    let chunks = split_into(wire, 37, 0xC0FFEE);
    let dispatcher = Dispatcher::new(DecoderRegistry::with_raw_payloads());
    let mut handler = Collect::default();

    let outcome = dispatcher.dispatch_one(&chunks, &mut handler);
    assert_eq!(
        outcome,
        Dispatched {
            consumed: wire.len(),
            error: None
        }
    );
    assert_eq!(handler.wire_sizes, [wire.len() - HEADER_SIZE]);
    let received = handler.messages[0].payload::<RawPayload>().unwrap();
    assert_eq!(received.as_bytes(), &payload[..]);
}

#[test]
fn compressed_header_is_identical_across_fragmentations() {
    let message = Message::new(&RawPayload::from(ledger_payload(20_000)), LEDGER_DATA).unwrap();
    let wire = message.buffer(true);
    let expected = parse_header(&[wire], wire.len()).unwrap();

    for pieces in [1usize, 4, 20, 100] {
        let chunks = if pieces == 1 {
            vec![&wire[..]]
        } else {
            split_into(wire, pieces, pieces as u64)
        };
        assert_eq!(parse_header(&chunks, wire.len()), Some(expected), "{pieces} chunks");
    }
}

#[test]
fn mixed_stream_dispatches_byte_by_byte() {
    let endpoints: Vec<Endpoint> = (0..64)
        .map(|i| Endpoint {
            hops: i % 4,
            address: format!("192.168.{}.{}:51235", i / 16, i),
        })
        .collect();
    let outbound = [
        Message::new(&RawPayload::new(&b"ping"[..]), PING).unwrap(),
        Message::new(&JsonPayload(endpoints.clone()), ENDPOINTS).unwrap(),
        Message::new(&RawPayload::from(ledger_payload(8000)), TRANSACTION).unwrap(),
    ];
    let mut stream = Vec::new();
    for message in &outbound {
        stream.extend_from_slice(message.buffer(true));
    }

    let mut registry = DecoderRegistry::with_raw_payloads();
    registry.register::<JsonPayload<Vec<Endpoint>>>(ENDPOINTS);
    let dispatcher = Dispatcher::new(registry);
    let mut handler = Collect::default();
    let mut buf = BytesMut::new();

    let mut dispatched = 0;
    for byte in stream {
        buf.extend_from_slice(&[byte]);
        dispatched += dispatcher.dispatch_all(&mut buf, &mut handler).unwrap();
    }

    assert_eq!(dispatched, 3);
    assert!(buf.is_empty());
    assert_eq!(handler.messages[0].payload::<RawPayload>().unwrap().as_bytes(), b"ping");
    let decoded = handler.messages[1]
        .payload::<JsonPayload<Vec<Endpoint>>>()
        .unwrap();
    assert_eq!(decoded.0, endpoints);
    assert_eq!(
        handler.messages[2].payload::<RawPayload>().unwrap().as_bytes(),
        &ledger_payload(8000)[..]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_fragmentation_dispatches_the_same_payload(
        payload in proptest::collection::vec(any::<u8>(), 0..4096),
        repeat in 1usize..8,
        pieces in 1usize..40,
        seed in any::<u64>(),
    ) {
        let payload = payload.repeat(repeat);
        let message = Message::new(&RawPayload::from(payload.clone()), LEDGER_DATA).unwrap();
        let wire = message.buffer(true);
        let chunks = if pieces == 1 || wire.len() <= pieces {
            vec![&wire[..]]
        } else {
            split_into(wire, pieces, seed)
        };

        let dispatcher = Dispatcher::new(DecoderRegistry::with_raw_payloads());
        let mut handler = Collect::default();
        let outcome = dispatcher.dispatch_one(&chunks, &mut handler);

        prop_assert_eq!(outcome.consumed, wire.len());
        prop_assert!(outcome.error.is_none());
        let received = handler.messages[0].payload::<RawPayload>().unwrap();
        prop_assert_eq!(received.as_bytes(), &payload[..]);
    }
}
