//! The comment entity: a timestamped text action attached to a card.

use serde_json::Value;

use crate::client::{params, TrelloClient};
use crate::entities::{echo_outcome, MutationOutcome, Remote};
use crate::error::Result;
use crate::types::CommentData;

/// A comment action on the remote service.
///
/// Editing the text re-populates the whole entity from the echoed action so
/// the date and author fields stay consistent with the server.
#[derive(Debug)]
pub struct Comment<'a> {
    client: &'a TrelloClient,
    id: String,
    id_board: Option<String>,
    id_card: Option<String>,
    id_list: Option<String>,
    id_member_creator: Option<String>,
    date: Option<String>,
    text: Option<String>,
}

impl<'a> Comment<'a> {
    pub(crate) fn from_data(client: &'a TrelloClient, data: CommentData) -> Self {
        let mut comment = Self {
            client,
            id: String::new(),
            id_board: None,
            id_card: None,
            id_list: None,
            id_member_creator: None,
            date: None,
            text: None,
        };
        comment.populate(data);
        comment
    }

    /// Re-initialize every field from an action payload.
    fn populate(&mut self, data: CommentData) {
        self.id = data.id;
        self.id_member_creator = data.id_member_creator;
        self.date = data.date;
        self.id_board = data.data.board.map(|r| r.id);
        self.id_card = data.data.card.map(|r| r.id);
        self.id_list = data.data.list.map(|r| r.id);
        self.text = data.data.text;
    }

    /// Server-assigned id, stable for the lifetime of this handle.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn id_board(&self) -> Option<&str> {
        self.id_board.as_deref()
    }

    pub fn id_card(&self) -> Option<&str> {
        self.id_card.as_deref()
    }

    pub fn id_list(&self) -> Option<&str> {
        self.id_list.as_deref()
    }

    pub fn id_member_creator(&self) -> Option<&str> {
        self.id_member_creator.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Edit the comment text. When the server echoes the requested text the
    /// entire entity re-populates from the echoed action, keeping the edit
    /// date correct; otherwise nothing changes locally.
    pub fn set_text(&mut self, text: &str) -> Result<MutationOutcome> {
        let response = self.put(&["actions", &self.id], params([("text", text.to_string())]))?;
        let echoed = response.get("data").and_then(|d| d.get("text"));
        let outcome = echo_outcome(echoed, &Value::from(text), "comment text");
        if outcome.is_confirmed() {
            let data: CommentData = serde_json::from_value(response)?;
            self.populate(data);
        }
        Ok(outcome)
    }
}

impl Remote for Comment<'_> {
    fn client(&self) -> &TrelloClient {
        self.client
    }

    fn summary_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("id", Some(self.id.clone())),
            ("date", self.date.clone()),
        ]
    }
}
