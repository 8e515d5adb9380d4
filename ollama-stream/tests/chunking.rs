//! Property-based tests: event sequences do not depend on chunk boundaries.

use ollama_stream::*;
use proptest::prelude::*;
use proptest::sample::Index;

fn run(protocol: Protocol, chunks: &[&[u8]]) -> Vec<DomainEvent> {
    let mut session = StreamSession::new(protocol);
    let mut events = Vec::new();
    for chunk in chunks {
        events.extend(session.feed(chunk));
    }
    events.extend(session.finish());
    events
}

fn split_at<'a>(body: &'a [u8], cuts: &[Index]) -> Vec<&'a [u8]> {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(body.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();

    let mut parts = Vec::new();
    let mut start = 0;
    for p in points {
        parts.push(&body[start..p]);
        start = p;
    }
    parts.push(&body[start..]);
    parts
}

fn arb_generate_line() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => any::<String>().prop_map(|t| {
            serde_json::json!({"model": "llama3.2", "response": t, "done": false}).to_string()
        }),
        1 => "[a-z ]{0,12}".prop_map(|s| format!("oops {s}")),
        1 => Just(String::new()),
    ]
}

fn arb_pull_line() -> impl Strategy<Value = String> {
    (0u64..10_000, 1u64..5_000).prop_map(|(completed, total)| {
        serde_json::json!({
            "status": "pulling 6a0746a1ec1a",
            "digest": "sha256:6a0746a1ec1a",
            "completed": completed,
            "total": total,
        })
        .to_string()
    })
}

proptest! {
    #[test]
    fn generate_events_independent_of_chunking(
        lines in proptest::collection::vec(arb_generate_line(), 0..12),
        cuts in proptest::collection::vec(any::<Index>(), 0..24),
    ) {
        let mut body = String::new();
        for line in &lines {
            body.push_str(line);
            body.push('\n');
        }
        body.push_str(r#"{"response":"✓ fin","done":true}"#);
        body.push('\n');
        let bytes = body.as_bytes();

        let whole = run(Protocol::Generate, &[bytes]);
        let split = run(Protocol::Generate, &split_at(bytes, &cuts));
        prop_assert_eq!(&whole, &split);

        let completes = whole
            .iter()
            .filter(|e| matches!(e, DomainEvent::Complete { .. }))
            .count();
        prop_assert_eq!(completes, 1);
        prop_assert!(
            matches!(whole.last(), Some(DomainEvent::Complete { .. })),
            "last event should be Complete"
        );

        let garbage = lines.iter().filter(|l| l.starts_with("oops")).count();
        let decode_errors = whole
            .iter()
            .filter(|e| matches!(e, DomainEvent::DecodeError { .. }))
            .count();
        prop_assert_eq!(garbage, decode_errors);

        let deltas: String = whole
            .iter()
            .filter_map(|e| match e {
                DomainEvent::TokenDelta { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(
            whole.last(),
            Some(&DomainEvent::Complete { final_text: Some(deltas) })
        );
    }

    #[test]
    fn pull_fraction_capped_until_success(
        lines in proptest::collection::vec(arb_pull_line(), 1..10),
        cuts in proptest::collection::vec(any::<Index>(), 0..16),
    ) {
        let mut body = lines.join("\n");
        body.push_str("\n{\"status\":\"verifying sha256 digest\"}\n{\"status\":\"success\"}\n");
        let events = run(Protocol::Pull, &split_at(body.as_bytes(), &cuts));

        let fractions: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                DomainEvent::ProgressUpdate { fraction, .. } => Some(*fraction),
                _ => None,
            })
            .collect();
        let (last, rest) = fractions.split_last().expect("success emits progress");
        prop_assert_eq!(*last, PROGRESS_DONE);
        for f in rest {
            prop_assert!(*f <= PROGRESS_CAP);
        }
        prop_assert_eq!(events.last(), Some(&DomainEvent::Complete { final_text: None }));
    }
}
