use battleship_link::protocol::RestartSignal;
use battleship_link::restart::{RestartAction, RestartHandshake, RestartVote};

/// Feed the messages each side sends to the other until both are quiet.
/// Returns how many times each side reset.
fn exchange(a: &mut RestartHandshake, b: &mut RestartHandshake, a_out: Vec<RestartSignal>, b_out: Vec<RestartSignal>) -> (usize, usize) {
    let (mut to_b, mut to_a) = (a_out, b_out);
    let (mut resets_a, mut resets_b) = (0, 0);
    while !to_a.is_empty() || !to_b.is_empty() {
        let mut next_a = Vec::new();
        let mut next_b = Vec::new();
        for sig in to_a.drain(..) {
            match a.on_remote(sig) {
                RestartAction::AgreeAndReset => {
                    resets_a += 1;
                    next_b.push(RestartSignal::Agree);
                }
                RestartAction::Reset => resets_a += 1,
                _ => {}
            }
        }
        for sig in to_b.drain(..) {
            match b.on_remote(sig) {
                RestartAction::AgreeAndReset => {
                    resets_b += 1;
                    next_a.push(RestartSignal::Agree);
                }
                RestartAction::Reset => resets_b += 1,
                _ => {}
            }
        }
        to_a = next_a;
        to_b = next_b;
    }
    (resets_a, resets_b)
}

#[test]
fn test_sequential_request_and_consent() {
    let mut a = RestartHandshake::new();
    let mut b = RestartHandshake::new();
    assert_eq!(a.request_local(), RestartAction::SendRequest);
    assert_eq!(a.vote(), RestartVote::RequestedByLocal);
    assert_eq!(b.on_remote(RestartSignal::Request), RestartAction::AwaitLocalConsent);
    assert_eq!(b.vote(), RestartVote::RequestedByRemote);

    assert_eq!(b.request_local(), RestartAction::AgreeAndReset);
    assert_eq!(a.on_remote(RestartSignal::Agree), RestartAction::Reset);
    assert_eq!(a.vote(), RestartVote::NoRequest);
    assert_eq!(b.vote(), RestartVote::NoRequest);
}

#[test]
fn test_crossing_requests_reset_each_side_once() {
    let mut a = RestartHandshake::new();
    let mut b = RestartHandshake::new();
    assert_eq!(a.request_local(), RestartAction::SendRequest);
    assert_eq!(b.request_local(), RestartAction::SendRequest);
    let resets = exchange(
        &mut a,
        &mut b,
        vec![RestartSignal::Request],
        vec![RestartSignal::Request],
    );
    assert_eq!(resets, (1, 1));
    assert_eq!(a.vote(), RestartVote::NoRequest);
    assert_eq!(b.vote(), RestartVote::NoRequest);
}

#[test]
fn test_single_request_never_resets() {
    let mut a = RestartHandshake::new();
    let mut b = RestartHandshake::new();
    a.request_local();
    let resets = exchange(&mut a, &mut b, vec![RestartSignal::Request], vec![]);
    assert_eq!(resets, (0, 0));
    assert_eq!(a.request_local(), RestartAction::Ignore);
}

#[test]
fn test_stray_agree_ignored() {
    let mut a = RestartHandshake::new();
    assert_eq!(a.on_remote(RestartSignal::Agree), RestartAction::Ignore);
    a.on_remote(RestartSignal::Request);
    assert_eq!(a.on_remote(RestartSignal::Request), RestartAction::Ignore);
    assert_eq!(a.on_remote(RestartSignal::Agree), RestartAction::Ignore);
    a.clear();
    assert_eq!(a.vote(), RestartVote::NoRequest);
}
