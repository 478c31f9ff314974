//! Behavior tests against a canned-response transport.
//!
//! # Design
//! `StubTransport` records every call and replays queued responses, which
//! makes fetch counts observable: lazy-once caching, never-cached
//! collections, and "no network before validation" are all asserted by
//! counting recorded calls.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use trello_core::{
    Error, Fields, Method, MutationOutcome, Remote, Response, Result, Transport, TrelloClient,
    ENV_API_KEY, ENV_TOKEN,
};

#[derive(Debug, Clone)]
struct RecordedCall {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
}

/// Replays queued responses and records every executed call.
#[derive(Clone, Default)]
struct StubTransport {
    responses: Rc<RefCell<VecDeque<Response>>>,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

impl StubTransport {
    fn push(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Response {
            status,
            body: body.to_string(),
        });
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for StubTransport {
    fn execute(&self, method: Method, url: &str, query: &[(String, String)]) -> Result<Response> {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            url: url.to_string(),
            query: query.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::Transport("no canned response queued".to_string()))
    }
}

fn client_with(stub: &StubTransport) -> TrelloClient {
    TrelloClient::with_transport(Some("test-key"), Some("test-token"), Box::new(stub.clone()))
        .unwrap()
        .base_url("http://mock.local/1")
}

// --- accessor pass-through ---

#[test]
fn board_accessors_return_source_fields() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{"id":"b1","name":"Sprint 1","closed":false,"desc":"plans","url":"https://trello.example/b/b1"}"#,
    );
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    assert_eq!(board.id(), "b1");
    assert_eq!(board.name(), Some("Sprint 1"));
    assert_eq!(board.desc(), Some("plans"));
    assert_eq!(board.url(), Some("https://trello.example/b/b1"));
    // closed was present in the source, so no refresh fires
    assert!(!board.closed().unwrap());
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn card_accessors_return_source_fields() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{
            "id": "c1", "name": "Task", "closed": false, "desc": "do it",
            "idBoard": "b1", "idList": "l1", "idLabels": ["lb1"],
            "labels": [{"id":"lb1","idBoard":"b1","name":"bug","color":"red"}],
            "pos": 1024, "shortLink": "abc123", "subscribed": true
        }"#,
    );
    let client = client_with(&stub);

    let card = client.get_card("c1").unwrap();
    assert_eq!(card.id(), "c1");
    assert_eq!(card.name(), Some("Task"));
    assert_eq!(card.desc(), Some("do it"));
    assert_eq!(card.closed(), Some(false));
    assert_eq!(card.id_board(), Some("b1"));
    assert_eq!(card.id_list(), Some("l1"));
    assert_eq!(card.id_labels(), ["lb1".to_string()]);
    assert_eq!(card.pos(), Some(1024.0));
    assert_eq!(card.short_link(), Some("abc123"));
    assert_eq!(card.subscribed(), Some(true));

    let labels = card.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].id(), "lb1");
    assert_eq!(labels[0].color(), Some("red"));
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn comment_accessors_flatten_the_action_payload() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{
            "id": "a1", "date": "2024-01-01T00:00:01.000Z", "idMemberCreator": "m1",
            "data": {"text": "looks good", "board": {"id":"b1"}, "card": {"id":"c1"}, "list": {"id":"l1"}}
        }"#,
    );
    let client = client_with(&stub);

    let comment = client.get_comment_by_id("a1").unwrap();
    assert_eq!(comment.id(), "a1");
    assert_eq!(comment.text(), Some("looks good"));
    assert_eq!(comment.id_board(), Some("b1"));
    assert_eq!(comment.id_card(), Some("c1"));
    assert_eq!(comment.id_list(), Some("l1"));
    assert_eq!(comment.id_member_creator(), Some("m1"));
    assert_eq!(comment.date(), Some("2024-01-01T00:00:01.000Z"));
}

// --- lazy fetching ---

#[test]
fn board_lists_fetch_exactly_once() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(
        200,
        r#"[{"id":"l1","idBoard":"b1","name":"Doing","pos":1024,"closed":false}]"#,
    );
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    assert_eq!(board.lists().unwrap().len(), 1);
    assert_eq!(board.lists().unwrap()[0].name(), Some("Doing"));
    // second access served from cache
    assert_eq!(stub.call_count(), 2);
    assert!(stub.calls()[1].url.ends_with("/board/b1/lists"));
}

#[test]
fn refresh_lists_forces_a_new_fetch() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(200, r#"[]"#);
    stub.push(
        200,
        r#"[{"id":"l1","idBoard":"b1","name":"Doing","pos":1024,"closed":false}]"#,
    );
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    assert!(board.lists().unwrap().is_empty());
    board.refresh_lists().unwrap();
    assert_eq!(board.lists().unwrap().len(), 1);
    assert_eq!(stub.call_count(), 3);
}

#[test]
fn board_cards_are_never_cached() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(200, r#"[{"id":"c1","name":"Task"}]"#);
    stub.push(200, r#"[{"id":"c1","name":"Task"}]"#);
    let client = client_with(&stub);

    let board = client.get_board("b1", None).unwrap();
    assert_eq!(board.cards().unwrap().len(), 1);
    assert_eq!(board.cards().unwrap().len(), 1);
    assert_eq!(stub.call_count(), 3);
}

#[test]
fn board_closed_unknown_triggers_one_full_fetch() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1"}"#);
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":true}"#);
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    assert!(board.closed().unwrap());
    assert!(board.closed().unwrap());
    assert_eq!(stub.call_count(), 2);
    // the refresh asks for every field
    let refresh = &stub.calls()[1];
    assert!(refresh.url.ends_with("/boards/b1"));
    assert!(refresh
        .query
        .iter()
        .any(|(k, v)| k == "fields" && v == "all"));
}

#[test]
fn list_subscribed_unknown_triggers_one_full_fetch() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{"id":"l1","idBoard":"b1","name":"Doing","pos":1024,"closed":false}"#,
    );
    stub.push(
        200,
        r#"{"id":"l1","idBoard":"b1","name":"Doing","pos":1024,"closed":false,"subscribed":true}"#,
    );
    let client = client_with(&stub);

    let mut list = client.get_list("l1", Some(Fields::All)).unwrap();
    assert!(list.subscribed().unwrap());
    assert!(list.subscribed().unwrap());
    assert_eq!(stub.call_count(), 2);
}

// --- mutation commit rule ---

#[test]
fn rename_commits_when_server_echoes_the_value() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(200, r#"{"id":"b1","name":"Sprint 2","closed":false}"#);
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    let outcome = board.rename("Sprint 2").unwrap();
    assert_eq!(outcome, MutationOutcome::Confirmed);
    assert_eq!(board.name(), Some("Sprint 2"));

    let put = &stub.calls()[1];
    assert_eq!(put.method, Method::Put);
    assert!(put.url.ends_with("/boards/b1"));
    assert!(put
        .query
        .iter()
        .any(|(k, v)| k == "name" && v == "Sprint 2"));
    assert!(put.query.iter().any(|(k, v)| k == "key" && v == "test-key"));
}

#[test]
fn rename_mismatch_leaves_local_state_untouched() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(200, r#"{"id":"b1","name":"Something Else","closed":false}"#);
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    let outcome = board.rename("Sprint 2").unwrap();
    assert_eq!(outcome, MutationOutcome::Mismatched);
    assert_eq!(board.name(), Some("Sprint 1"));
}

#[test]
fn archive_commits_closed_without_refetch() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":true}"#);
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    let outcome = board.archive().unwrap();
    assert!(outcome.is_confirmed());
    assert!(board.closed().unwrap());
    assert_eq!(stub.call_count(), 2);
}

#[test]
fn board_set_closed_dispatches_by_value() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":true}"#);
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    assert!(board.set_closed(true).unwrap().is_confirmed());
    assert!(board.closed().unwrap());
    assert!(board.set_closed(false).unwrap().is_confirmed());
    assert!(!board.closed().unwrap());

    let calls = stub.calls();
    assert!(calls[1]
        .query
        .iter()
        .any(|(k, v)| k == "closed" && v == "true"));
    assert!(calls[2]
        .query
        .iter()
        .any(|(k, v)| k == "closed" && v == "false"));
}

#[test]
fn full_data_fetches_once_and_keeps_the_snapshot() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1","closed":false}"#);
    stub.push(
        200,
        r#"{"id":"b1","name":"Sprint 1","closed":false,"desc":"plans","prefs":{"voting":"disabled"}}"#,
    );
    let client = client_with(&stub);

    let mut board = client.get_board("b1", None).unwrap();
    // fields beyond the modeled record are visible through the snapshot
    assert_eq!(board.full_data().unwrap()["prefs"]["voting"], "disabled");
    // second read is served from the cached snapshot
    assert_eq!(board.full_data().unwrap()["desc"], "plans");
    assert_eq!(stub.call_count(), 2);
    // the refresh re-populated the plain fields as well
    assert_eq!(board.desc(), Some("plans"));
}

#[test]
fn card_move_adopts_echoed_board_id() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"c1","name":"Task","idBoard":"b1","idList":"l1"}"#);
    stub.push(200, r#"{"id":"c1","name":"Task","idBoard":"b2","idList":"l9"}"#);
    let client = client_with(&stub);

    let mut card = client.get_card("c1").unwrap();
    let outcome = card.move_to_list("l9").unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(card.id_list(), Some("l9"));
    assert_eq!(card.id_board(), Some("b2"));
}

#[test]
fn comment_edit_repopulates_from_echoed_action() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{"id":"a1","date":"2024-01-01T00:00:01.000Z","idMemberCreator":"m1",
            "data":{"text":"first","board":{"id":"b1"},"card":{"id":"c1"},"list":{"id":"l1"}}}"#,
    );
    stub.push(
        200,
        r#"{"id":"a1","date":"2024-01-01T00:00:09.000Z","idMemberCreator":"m1",
            "data":{"text":"edited","board":{"id":"b1"},"card":{"id":"c1"},"list":{"id":"l1"}}}"#,
    );
    let client = client_with(&stub);

    let mut comment = client.get_comment_by_id("a1").unwrap();
    let outcome = comment.set_text("edited").unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(comment.text(), Some("edited"));
    assert_eq!(comment.date(), Some("2024-01-01T00:00:09.000Z"));
}

#[test]
fn comment_edit_mismatch_keeps_old_text_and_date() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{"id":"a1","date":"2024-01-01T00:00:01.000Z","idMemberCreator":"m1",
            "data":{"text":"first","board":{"id":"b1"},"card":{"id":"c1"},"list":{"id":"l1"}}}"#,
    );
    stub.push(
        200,
        r#"{"id":"a1","date":"2024-01-01T00:00:09.000Z","idMemberCreator":"m1",
            "data":{"text":"sanitized","board":{"id":"b1"},"card":{"id":"c1"},"list":{"id":"l1"}}}"#,
    );
    let client = client_with(&stub);

    let mut comment = client.get_comment_by_id("a1").unwrap();
    let outcome = comment.set_text("edited").unwrap();
    assert_eq!(outcome, MutationOutcome::Mismatched);
    assert_eq!(comment.text(), Some("first"));
    assert_eq!(comment.date(), Some("2024-01-01T00:00:01.000Z"));
}

// --- name lookup ---

#[test]
fn get_board_by_name_with_no_match_is_a_validation_error() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"boards":[]}"#);
    let client = client_with(&stub);

    let err = client.get_board_by_name("Sprint 1", false).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    assert!(err.to_string().contains("no board"));
}

#[test]
fn get_board_by_name_with_one_match_returns_it() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"boards":[{"id":"b1","name":"Sprint 1"}]}"#);
    let client = client_with(&stub);

    // equality is trimmed and case-insensitive
    let board = client.get_board_by_name("  sprint 1 ", false).unwrap();
    assert_eq!(board.id(), "b1");
}

#[test]
fn get_board_by_name_with_two_matches_is_ambiguous() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{"boards":[{"id":"b1","name":"Sprint 1"},{"id":"b2","name":"sprint 1"}]}"#,
    );
    let client = client_with(&stub);

    let err = client.get_board_by_name("Sprint 1", false).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("2 boards"));
}

#[test]
fn search_boards_by_name_passes_model_types() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"boards":[]}"#);
    let client = client_with(&stub);

    assert!(client.search_boards_by_name("anything").unwrap().is_empty());
    let call = &stub.calls()[0];
    assert!(call.url.ends_with("/search"));
    assert!(call
        .query
        .iter()
        .any(|(k, v)| k == "modelTypes" && v == "boards"));
}

// --- argument validation ---

#[test]
fn get_cards_with_both_ids_fails_before_any_network_call() {
    let stub = StubTransport::default();
    let client = client_with(&stub);

    let err = client.get_cards(Some("b1"), Some("l1")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn get_cards_with_neither_id_fails_before_any_network_call() {
    let stub = StubTransport::default();
    let client = client_with(&stub);

    let err = client.get_cards(None, None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(stub.call_count(), 0);
}

// --- credential resolution ---

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

#[test]
fn missing_both_credentials_names_the_api_key_first() {
    let _guard = env_guard();
    std::env::remove_var(ENV_API_KEY);
    std::env::remove_var(ENV_TOKEN);

    let err = TrelloClient::with_transport(None, None, Box::new(StubTransport::default()))
        .err()
        .expect("construction must fail");
    match err {
        Error::Authentication { credential, env_var } => {
            assert_eq!(credential, "api_key");
            assert_eq!(env_var, ENV_API_KEY);
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[test]
fn missing_token_is_named_when_key_is_present() {
    let _guard = env_guard();
    std::env::set_var(ENV_API_KEY, "env-key");
    std::env::remove_var(ENV_TOKEN);

    let err = TrelloClient::with_transport(None, None, Box::new(StubTransport::default()))
        .err()
        .expect("construction must fail");
    match err {
        Error::Authentication { credential, env_var } => {
            assert_eq!(credential, "token");
            assert_eq!(env_var, ENV_TOKEN);
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
    std::env::remove_var(ENV_API_KEY);
}

#[test]
fn environment_fills_in_missing_credentials() {
    let _guard = env_guard();
    std::env::set_var(ENV_API_KEY, "env-key");
    std::env::set_var(ENV_TOKEN, "env-token");

    let stub = StubTransport::default();
    stub.push(200, r#"[]"#);
    let client =
        TrelloClient::with_transport(None, None, Box::new(stub.clone())).unwrap();
    let client = client.base_url("http://mock.local/1");
    assert!(client.get_all_boards().unwrap().is_empty());
    assert!(stub.calls()[0]
        .query
        .iter()
        .any(|(k, v)| k == "key" && v == "env-key"));

    std::env::remove_var(ENV_API_KEY);
    std::env::remove_var(ENV_TOKEN);
}

// --- status mapping ---

#[test]
fn status_429_maps_to_rate_limit_without_json_parsing() {
    let stub = StubTransport::default();
    // deliberately not JSON: parsing must never be attempted
    stub.push(429, "slow down");
    let client = client_with(&stub);

    let err = client.get_board("b1", None).unwrap_err();
    assert!(matches!(err, Error::RateLimitExceeded), "got {err:?}");
}

#[test]
fn other_error_statuses_carry_status_body_and_url() {
    let stub = StubTransport::default();
    stub.push(404, "board not found");
    let client = client_with(&stub);

    let err = client.get_board("missing", None).unwrap_err();
    match err {
        Error::Request { status, url, body } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/boards/missing"));
            assert_eq!(body, "board not found");
        }
        other => panic!("expected Request, got {other:?}"),
    }
}

// --- delete confirmation ---

#[test]
fn delete_succeeds_on_null_value_sentinel() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"_value":null}"#);
    let client = client_with(&stub);

    client.delete_board("b1").unwrap();
    assert_eq!(stub.calls()[0].method, Method::Delete);
}

#[test]
fn delete_with_populated_value_sentinel_fails() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"_value":"unexpectedly present"}"#);
    let client = client_with(&stub);

    let err = client.delete_board("b1").unwrap_err();
    assert!(matches!(err, Error::UnexpectedDeleteResponse(_)));
}

// --- reserved operations ---

#[test]
fn reserved_operations_fail_loudly() {
    let stub = StubTransport::default();
    let client = client_with(&stub);

    assert!(matches!(
        client.move_list("l1", "b2").unwrap_err(),
        Error::Unimplemented(_)
    ));
    assert!(matches!(
        client.move_card("c1", "l2").unwrap_err(),
        Error::Unimplemented(_)
    ));
    assert!(matches!(
        client.get_shared_boards().unwrap_err(),
        Error::Unimplemented(_)
    ));
    assert!(matches!(
        client.get_private_boards().unwrap_err(),
        Error::Unimplemented(_)
    ));
    assert!(matches!(
        client.get_boards_by_name("x", true).unwrap_err(),
        Error::Unimplemented(_)
    ));
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn unimplemented_entity_operations_fail_loudly() {
    let stub = StubTransport::default();
    stub.push(
        200,
        r#"{"id":"l1","idBoard":"b1","name":"Doing","pos":1024,"closed":false}"#,
    );
    stub.push(200, r#"{"id":"c1","name":"Task","idList":"l1"}"#);
    let client = client_with(&stub);

    let mut list = client.get_list("l1", None).unwrap();
    assert!(matches!(list.set_pos(2048.0).unwrap_err(), Error::Unimplemented(_)));
    assert!(matches!(list.set_board("b2").unwrap_err(), Error::Unimplemented(_)));
    assert!(matches!(
        list.move_to_board("b2", "bottom").unwrap_err(),
        Error::Unimplemented(_)
    ));

    let mut card = client.get_card("c1").unwrap();
    assert!(matches!(card.id_members().unwrap_err(), Error::Unimplemented(_)));
    assert!(matches!(card.comments().unwrap_err(), Error::Unimplemented(_)));
    assert!(matches!(
        card.add_comment("hi").unwrap_err(),
        Error::Unimplemented(_)
    ));
    assert_eq!(stub.call_count(), 2);
}

// --- summary ---

#[test]
fn summary_skips_absent_attributes() {
    let stub = StubTransport::default();
    stub.push(200, r#"{"id":"b1","name":"Sprint 1"}"#);
    let client = client_with(&stub);

    let board = client.get_board("b1", None).unwrap();
    let summary = board.summary();
    assert!(summary.contains("id: b1"));
    assert!(summary.contains("name: Sprint 1"));
    assert!(!summary.contains("desc:"));
    assert!(!summary.contains("closed:"));
}

// --- the full mocked scenario ---

#[test]
fn board_lifecycle_against_canned_responses() {
    let stub = StubTransport::default();
    let client = client_with(&stub);

    // create: response echoes the name, closed not included
    stub.push(200, r#"{"id":"b9","name":"Sprint 1"}"#);
    let mut board = client.create_board("Sprint 1").unwrap();
    assert_eq!(board.name(), Some("Sprint 1"));

    // first closed read triggers exactly one full-data fetch
    stub.push(200, r#"{"id":"b9","name":"Sprint 1","closed":false}"#);
    assert!(!board.closed().unwrap());
    assert_eq!(stub.call_count(), 2);

    // archive: echoed true commits locally without a re-fetch
    stub.push(200, r#"{"id":"b9","name":"Sprint 1","closed":true}"#);
    let outcome = board.archive().unwrap();
    assert!(outcome.is_confirmed());
    assert!(board.closed().unwrap());
    assert_eq!(stub.call_count(), 3);

    // delete confirms with a null sentinel
    stub.push(200, r#"{"_value":null}"#);
    board.delete().unwrap();

    // the handle is stale now; the server answers 404
    stub.push(404, "board not found");
    let err = client.get_board("b9", None).unwrap_err();
    assert!(matches!(err, Error::Request { status: 404, .. }));
}
