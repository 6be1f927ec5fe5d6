use battleship_link::protocol::{
    Message, MessageKind, ProtocolError, RestartSignal, Shot, StartSignal,
};

#[test]
fn test_encode_wire_forms() {
    assert_eq!(Message::Name("Ada".into()).encode(), "NAME::Ada");
    assert_eq!(
        Message::Place { row: 3, col: 0, length: 5, horizontal: true }.encode(),
        "PLACE::3,0,5,true"
    );
    assert_eq!(Message::Move(Shot::At { row: 3, col: 4 }).encode(), "MOVE::3,4");
    assert_eq!(Message::Move(Shot::Forfeit).encode(), "MOVE::-1,-1");
    assert_eq!(Message::Start(StartSignal::AckStart).encode(), "START::ACK_START");
    assert_eq!(Message::Start(StartSignal::Placed).encode(), "START::PLACED");
    assert_eq!(Message::Restart(RestartSignal::Request).encode(), "RESTART::0");
    assert_eq!(Message::Restart(RestartSignal::Agree).encode(), "RESTART::1");
    assert_eq!(Message::Disconnect.encode(), "DISCONNECT::");
}

#[test]
fn test_chat_stays_on_one_line() {
    let line = Message::Chat("hello\nMOVE::1,1".into()).encode();
    assert!(!line.contains('\n'));
    assert_eq!(
        Message::decode(&line).unwrap(),
        Message::Chat("hello MOVE::1,1".into())
    );
}

#[test]
fn test_chat_payload_keeps_separators() {
    assert_eq!(
        Message::decode("CHAT::Ada : see you::later").unwrap(),
        Message::Chat("Ada : see you::later".into())
    );
}

#[test]
fn test_decode_forfeit_sentinel() {
    assert_eq!(Message::decode("MOVE::-1,-1").unwrap(), Message::Move(Shot::Forfeit));
    assert!(matches!(
        Message::decode("MOVE::-1,4"),
        Err(ProtocolError::MalformedPayload { kind: MessageKind::Move, .. })
    ));
    assert!(Message::decode("MOVE::10,0").is_err());
}

#[test]
fn test_decode_without_separator() {
    assert_eq!(Message::decode("DISCONNECT").unwrap(), Message::Disconnect);
    assert_eq!(Message::decode("NAME").unwrap(), Message::Name(String::new()));
    assert!(Message::decode("MOVE").is_err());
}

#[test]
fn test_decode_strips_line_endings() {
    assert_eq!(
        Message::decode("MOVE::3,4\r\n").unwrap(),
        Message::Move(Shot::At { row: 3, col: 4 })
    );
}

#[test]
fn test_lossy_payload_is_malformed() {
    let line = String::from_utf8_lossy(b"CHAT::caf\xff").into_owned();
    assert!(matches!(
        Message::decode(&line),
        Err(ProtocolError::MalformedPayload { kind: MessageKind::Chat, .. })
    ));
    assert_eq!(Message::decode("CHAT::café").unwrap(), Message::Chat("café".into()));
}

#[test]
fn test_legacy_restart_agree() {
    assert_eq!(
        Message::decode("RESTART::2").unwrap(),
        Message::Restart(RestartSignal::Agree)
    );
    assert!(Message::decode("RESTART::yes").is_err());
}

#[test]
fn test_unknown_and_malformed() {
    assert_eq!(
        Message::decode("HELLO::there"),
        Err(ProtocolError::UnknownType("HELLO".into()))
    );
    assert_eq!(Message::decode("   "), Err(ProtocolError::Empty));
    assert!(Message::decode("PLACE::1,2,3").is_err());
    assert!(Message::decode("PLACE::1,2,0,true").is_err());
    assert!(Message::decode("PLACE::1,2,3,sideways").is_err());
    assert!(Message::decode("START::GO").is_err());
    assert_eq!(
        Message::decode("PLACE::1,2,3,FALSE").unwrap(),
        Message::Place { row: 1, col: 2, length: 3, horizontal: false }
    );
}
