use wire::{decode, EncodeError, Field, Message};

#[test]
fn round_trip_preserves_field_count_and_order() {
    let msg = Message::Fields(vec![
        Field::Num(0.5),
        Field::Num(-3.0),
        Field::Text("left".into()),
        Field::Num(42.0),
    ]);
    let bytes = msg.encode().unwrap();
    let fields = decode(&bytes);
    assert_eq!(fields, vec!["0.5", "-3", "left", "42"]);
}

#[test]
fn action_encodes_as_csv() {
    // The canonical scenario: action [1, 0] travels as "1,0".
    let bytes = Message::from_values(&[1.0, 0.0]).encode().unwrap();
    assert_eq!(bytes, b"1,0");
}

#[test]
fn observation_fragment_decodes_field_wise() {
    let fields = decode(b"0.5,0.5,1");
    assert_eq!(fields, vec!["0.5", "0.5", "1"]);
    let parsed: Vec<f32> = fields.iter().map(|f| f.parse().unwrap()).collect();
    assert_eq!(parsed, vec![0.5, 0.5, 1.0]);
}

#[test]
fn empty_packet_decodes_to_single_empty_field() {
    assert_eq!(decode(b""), vec![String::new()]);
}

#[test]
fn single_field_round_trip() {
    let bytes = Message::Fields(vec![Field::Text("go".into())]).encode().unwrap();
    assert_eq!(decode(&bytes), vec!["go"]);
}

#[test]
fn delimiter_in_text_field_is_rejected() {
    let msg = Message::Fields(vec![Field::Text("a,b".into())]);
    assert_eq!(
        msg.encode(),
        Err(EncodeError::DelimiterInField("a,b".into()))
    );
}

#[test]
fn joined_string_passes_through_unchecked() {
    // The pre-joined form is the caller's responsibility; it is sent as-is.
    let bytes = Message::Joined("1,0".into()).encode().unwrap();
    assert_eq!(bytes, b"1,0");
}

#[test]
fn arbitrary_bytes_always_decode() {
    let fields = decode(&[0xff, 0xfe, b',', b'x']);
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1], "x");
}
