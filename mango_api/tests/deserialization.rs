use mango_api::stats::decode_calls;
use mango_api::types::{StatsKeyResponse, UsersResponse};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_users_full() {
    let json = load_fixture("users.json");
    let resp: UsersResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.users.len(), 1);

    let user = &resp.users[0];
    assert_eq!(user.general.name, "Ivan Petrov");
    assert_eq!(user.general.email, "ivan.petrov@example.com");
    assert_eq!(user.general.position, "Manager");
    assert_eq!(user.telephony.extension, "101");
    assert_eq!(user.telephony.outgoingline, "74950000000");

    let first = &user.telephony.numbers[0];
    assert_eq!(first.protocol, "sip");
    assert_eq!(first.order, 2);
    assert_eq!(first.wait_sec, 20);
    assert_eq!(first.status, "on");
}

#[test]
fn numbers_sorted_by_ring_order() {
    let json = load_fixture("users.json");
    let resp: UsersResponse = serde_json::from_str(&json).unwrap();
    let numbers = resp.users[0].numbers_by_order();
    assert_eq!(numbers[0].number, "79161234567");
    assert_eq!(numbers[1].protocol, "sip");
}

#[test]
fn deserialize_users_empty() {
    let json = load_fixture("users_empty.json");
    let resp: UsersResponse = serde_json::from_str(&json).unwrap();
    assert!(resp.users.is_empty());
}

#[test]
fn deserialize_users_missing_members_default() {
    let json = load_fixture("users_partial.json");
    let resp: UsersResponse = serde_json::from_str(&json).unwrap();
    let user = &resp.users[0];
    assert_eq!(user.general.name, "Operator");
    assert_eq!(user.general.email, "");
    assert_eq!(user.telephony.extension, "200");
    assert!(user.telephony.numbers.is_empty());
}

#[test]
fn deserialize_stats_key() {
    let resp: StatsKeyResponse = serde_json::from_str(r#"{"key":"abc"}"#).unwrap();
    assert_eq!(resp.key, "abc");

    let resp: StatsKeyResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.key.is_empty());
}

#[test]
fn deserialize_malformed_json_returns_error() {
    let bad_json = r#"{"users": not valid json}"#;
    assert!(serde_json::from_str::<UsersResponse>(bad_json).is_err());
}

#[test]
fn decode_stats_fixture() {
    let body = load_fixture("stats.csv");
    let calls = decode_calls(body.as_bytes()).unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[2].records,
        vec!["MToxOjE=", "MToxOjI=", "MToxOjM="]
    );
    assert_eq!(calls[2].duration_secs(), 600);
    assert_eq!(calls[1].answer_time(), None);
}
