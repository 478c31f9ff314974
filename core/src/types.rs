//! Wire schemas for the Trello REST API.
//!
//! # Design
//! Each payload the client reads is an explicit serde record rather than a
//! dynamic JSON map. `id` is the only field the server guarantees; every
//! other field is `Option`, and an absent field decodes to `None` — the
//! defined "unknown / not yet fetched" sentinel. Unknown fields in responses
//! are ignored, since the live API returns far more than is modeled here.

use serde::{Deserialize, Serialize};

/// A board as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A list as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    pub id: String,
    #[serde(default)]
    pub id_board: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub subscribed: Option<bool>,
}

/// A card as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub id_board: Option<String>,
    #[serde(default)]
    pub id_list: Option<String>,
    #[serde(default)]
    pub id_labels: Option<Vec<String>>,
    #[serde(default)]
    pub labels: Option<Vec<LabelData>>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub short_link: Option<String>,
    #[serde(default)]
    pub subscribed: Option<bool>,
}

/// A label as returned by the API, standalone or nested in a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelData {
    pub id: String,
    #[serde(default)]
    pub id_board: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A comment action as returned by the API. The interesting parts — text and
/// the board/card/list the comment belongs to — live in the nested `data`
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentData {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub id_member_creator: Option<String>,
    #[serde(default)]
    pub data: CommentPayload,
}

/// The `data` payload of a comment action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub board: Option<IdRef>,
    #[serde(default)]
    pub card: Option<IdRef>,
    #[serde(default)]
    pub list: Option<IdRef>,
}

/// A nested resource reference carrying only an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

/// Input to [`crate::TrelloClient::create_board`]: either a bare name
/// shorthand or a full parameter list passed through to the API.
#[derive(Debug, Clone)]
pub enum CreateBoard {
    Name(String),
    Params(Vec<(String, String)>),
}

impl From<&str> for CreateBoard {
    fn from(name: &str) -> Self {
        CreateBoard::Name(name.to_string())
    }
}

impl From<String> for CreateBoard {
    fn from(name: String) -> Self {
        CreateBoard::Name(name)
    }
}

impl From<Vec<(String, String)>> for CreateBoard {
    fn from(params: Vec<(String, String)>) -> Self {
        CreateBoard::Params(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_decodes_with_absent_optionals() {
        let data: BoardData = serde_json::from_str(r#"{"id":"b1"}"#).unwrap();
        assert_eq!(data.id, "b1");
        assert!(data.name.is_none());
        assert!(data.closed.is_none());
    }

    #[test]
    fn board_tolerates_unknown_fields() {
        let raw = r#"{"id":"b1","name":"Sprint 1","closed":false,"prefs":{"voting":"disabled"}}"#;
        let data: BoardData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.name.as_deref(), Some("Sprint 1"));
        assert_eq!(data.closed, Some(false));
    }

    #[test]
    fn board_rejects_missing_id() {
        let result: Result<BoardData, _> = serde_json::from_str(r#"{"name":"No id"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn list_decodes_camel_case_board_id() {
        let raw = r#"{"id":"l1","idBoard":"b1","name":"Doing","pos":1024,"closed":false}"#;
        let data: ListData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.id_board.as_deref(), Some("b1"));
        assert_eq!(data.pos, Some(1024.0));
        assert!(data.subscribed.is_none());
    }

    #[test]
    fn card_decodes_nested_labels() {
        let raw = r#"{
            "id": "c1",
            "name": "Task",
            "idBoard": "b1",
            "idList": "l1",
            "idLabels": ["lb1"],
            "labels": [{"id":"lb1","idBoard":"b1","name":"bug","color":"red"}],
            "shortLink": "abc123"
        }"#;
        let data: CardData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.short_link.as_deref(), Some("abc123"));
        let labels = data.labels.unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].color.as_deref(), Some("red"));
    }

    #[test]
    fn comment_decodes_nested_payload() {
        let raw = r#"{
            "id": "a1",
            "date": "2024-01-01T00:00:00.000Z",
            "idMemberCreator": "m1",
            "data": {
                "text": "looks good",
                "board": {"id": "b1"},
                "card": {"id": "c1"},
                "list": {"id": "l1"}
            }
        }"#;
        let data: CommentData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.data.text.as_deref(), Some("looks good"));
        assert_eq!(data.data.board.as_ref().map(|r| r.id.as_str()), Some("b1"));
        assert_eq!(data.id_member_creator.as_deref(), Some("m1"));
    }

    #[test]
    fn comment_payload_defaults_when_data_absent() {
        let data: CommentData = serde_json::from_str(r#"{"id":"a1"}"#).unwrap();
        assert!(data.data.text.is_none());
        assert!(data.data.card.is_none());
    }

    #[test]
    fn create_board_from_str_is_name_shorthand() {
        match CreateBoard::from("Sprint 1") {
            CreateBoard::Name(name) => assert_eq!(name, "Sprint 1"),
            other => panic!("expected name shorthand, got {other:?}"),
        }
    }
}
