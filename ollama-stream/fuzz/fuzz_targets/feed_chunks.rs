#![no_main]

use libfuzzer_sys::fuzz_target;
use ollama_stream::{DomainEvent, Protocol, StreamSession};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let protocol = match selector % 4 {
        0 => Protocol::Generate,
        1 => Protocol::Chat,
        2 => Protocol::Pull,
        _ => Protocol::Create,
    };

    // Feed in chunks whose sizes are derived from the input itself.
    let mut session = StreamSession::new(protocol);
    let mut events = Vec::new();
    let mut rest = body;
    while !rest.is_empty() {
        let n = (usize::from(rest[0]) % 7 + 1).min(rest.len());
        let (chunk, tail) = rest.split_at(n);
        events.extend(session.feed(chunk));
        rest = tail;
    }
    events.extend(session.finish());

    let terminal = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminal, 1);
    assert!(events.last().is_some_and(DomainEvent::is_terminal));
});
