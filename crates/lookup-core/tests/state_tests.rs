use lookup_core::state_machine::{allowed_transitions, validate_transition};
use lookup_core::{
    LookupError, LookupMachine, LookupPayload, LookupRequest, LookupState, StatusKind,
    SubmitOutcome,
};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_idle_transitions() {
    assert!(validate_transition(StatusKind::Idle, StatusKind::Idle).is_ok());
    assert!(validate_transition(StatusKind::Idle, StatusKind::Fetching).is_ok());

    // Nothing resolves without a request in flight
    assert!(validate_transition(StatusKind::Idle, StatusKind::Success).is_err());
    assert!(validate_transition(StatusKind::Idle, StatusKind::Error).is_err());
}

#[test]
fn test_settled_states_only_submit() {
    for from in [StatusKind::Success, StatusKind::Error] {
        assert_eq!(
            allowed_transitions(from),
            vec![StatusKind::Idle, StatusKind::Fetching]
        );
    }
}

#[derive(Debug, Clone)]
enum Op {
    Submit(String),
    Resolve { index: usize, ok: bool },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![
            Just(String::new()),
            Just("   ".to_string()),
            Just("a".to_string()),
            Just(" b ".to_string()),
            Just("test-id-12345".to_string()),
        ]
        .prop_map(Op::Submit),
        (0usize..8, any::<bool>()).prop_map(|(index, ok)| Op::Resolve { index, ok }),
    ]
}

fn status() -> impl Strategy<Value = StatusKind> {
    prop_oneof![
        Just(StatusKind::Idle),
        Just(StatusKind::Fetching),
        Just(StatusKind::Success),
        Just(StatusKind::Error),
    ]
}

proptest! {
    #[test]
    fn prop_validation_matches_table(from in status(), to in status()) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_blank_submit_always_idles(
        history in prop::collection::vec(op(), 0..16),
        blank in prop_oneof![Just(""), Just(" "), Just("\t\n  ")],
    ) {
        let mut machine = LookupMachine::new();
        let mut issued: Vec<LookupRequest> = Vec::new();
        for op in history {
            match op {
                Op::Submit(raw) => {
                    if let SubmitOutcome::Issued { request, .. } = machine.submit(&raw) {
                        issued.push(request);
                    }
                }
                Op::Resolve { index, .. } => {
                    if let Some(request) = issued.get(index) {
                        machine.resolve(request, Err(LookupError::failed("x")));
                    }
                }
            }
        }

        let before = machine.issued();
        let outcome = machine.submit(blank);
        prop_assert!(
            matches!(outcome, SubmitOutcome::Cleared { .. }),
            "blank submission issued a request"
        );
        prop_assert_eq!(machine.state(), &LookupState::Idle);
        prop_assert_eq!(machine.issued(), before);

        machine.submit(blank);
        prop_assert_eq!(machine.state(), &LookupState::Idle);
    }

    #[test]
    fn prop_state_follows_latest_submission(ops in prop::collection::vec(op(), 1..32)) {
        let mut machine = LookupMachine::new();
        let mut issued: Vec<LookupRequest> = Vec::new();
        // (request, resolved outcome) of the latest non-blank submission
        let mut latest: Option<(LookupRequest, Option<bool>)> = None;

        for op in ops {
            match op {
                Op::Submit(raw) => match machine.submit(&raw) {
                    SubmitOutcome::Issued { request, .. } => {
                        prop_assert_eq!(request.identifier.as_str(), raw.trim());
                        issued.push(request.clone());
                        latest = Some((request, None));
                    }
                    SubmitOutcome::Cleared { .. } => latest = None,
                },
                Op::Resolve { index, ok } => {
                    let Some(request) = issued.get(index).cloned() else { continue };
                    let outcome = if ok {
                        Ok(LookupPayload::new(&request.identifier, json!({ "ok": true })))
                    } else {
                        Err(LookupError::failed("failed"))
                    };
                    machine.resolve(&request, outcome);

                    if let Some((latest_request, resolved)) = latest.as_mut() {
                        if latest_request.submission == request.submission && resolved.is_none() {
                            *resolved = Some(ok);
                        }
                    }
                }
            }

            let expected = match &latest {
                None => StatusKind::Idle,
                Some((_, None)) => StatusKind::Fetching,
                Some((_, Some(true))) => StatusKind::Success,
                Some((_, Some(false))) => StatusKind::Error,
            };
            prop_assert_eq!(machine.state().kind(), expected);
            prop_assert_eq!(
                machine.state().identifier(),
                latest.as_ref().map(|(r, _)| r.identifier.as_str())
            );
            prop_assert_eq!(machine.pending().is_some(), expected == StatusKind::Fetching);
        }
    }
}
