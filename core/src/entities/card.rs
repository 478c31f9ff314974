//! The card entity: an individual task item within a list.

use serde_json::Value;

use crate::client::{params, TrelloClient};
use crate::entities::{echo_outcome, Label, MutationOutcome, Remote};
use crate::error::{Error, Result};
use crate::types::{CardData, LabelData};

/// A card on the remote service.
///
/// Moving the card to another list goes through
/// [`move_to_list`](Card::move_to_list), which also adopts the board id the
/// server echoes — a cross-board move changes both.
#[derive(Debug)]
pub struct Card<'a> {
    client: &'a TrelloClient,
    id: String,
    name: Option<String>,
    closed: Option<bool>,
    desc: Option<String>,
    id_board: Option<String>,
    id_list: Option<String>,
    id_labels: Vec<String>,
    labels: Vec<LabelData>,
    pos: Option<f64>,
    short_link: Option<String>,
    subscribed: Option<bool>,
}

impl<'a> Card<'a> {
    pub(crate) fn from_data(client: &'a TrelloClient, data: CardData) -> Self {
        let mut card = Self {
            client,
            id: String::new(),
            name: None,
            closed: None,
            desc: None,
            id_board: None,
            id_list: None,
            id_labels: Vec::new(),
            labels: Vec::new(),
            pos: None,
            short_link: None,
            subscribed: None,
        };
        card.populate(data);
        card
    }

    /// Re-initialize every field from wire data.
    fn populate(&mut self, data: CardData) {
        self.id = data.id;
        self.name = data.name;
        self.closed = data.closed;
        self.desc = data.desc;
        self.id_board = data.id_board;
        self.id_list = data.id_list;
        self.id_labels = data.id_labels.unwrap_or_default();
        self.labels = data.labels.unwrap_or_default();
        self.pos = data.pos;
        self.short_link = data.short_link;
        self.subscribed = data.subscribed;
    }

    /// Server-assigned id, stable for the lifetime of this handle.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn closed(&self) -> Option<bool> {
        self.closed
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn id_board(&self) -> Option<&str> {
        self.id_board.as_deref()
    }

    pub fn id_list(&self) -> Option<&str> {
        self.id_list.as_deref()
    }

    pub fn id_labels(&self) -> &[String] {
        &self.id_labels
    }

    pub fn pos(&self) -> Option<f64> {
        self.pos
    }

    pub fn short_link(&self) -> Option<&str> {
        self.short_link.as_deref()
    }

    pub fn subscribed(&self) -> Option<bool> {
        self.subscribed
    }

    /// The card's labels as entities, built from the cached wire data.
    pub fn labels(&self) -> Vec<Label<'a>> {
        let client = self.client;
        self.labels
            .iter()
            .cloned()
            .map(|data| Label::from_data(client, data))
            .collect()
    }

    /// Member-id listing is deliberately unimplemented.
    pub fn id_members(&self) -> Result<Vec<String>> {
        Err(Error::Unimplemented("card member listing"))
    }

    /// Listing comments through the card is deliberately unimplemented; use
    /// [`TrelloClient::get_card_comments`].
    pub fn comments(&self) -> Result<Vec<crate::entities::Comment<'a>>> {
        Err(Error::Unimplemented(
            "card comment listing; use TrelloClient::get_card_comments",
        ))
    }

    /// Adding comments is deliberately unimplemented.
    pub fn add_comment(&mut self, _text: &str) -> Result<()> {
        Err(Error::Unimplemented("adding a comment to a card"))
    }

    /// Rename the card. The cached name is committed only when the server
    /// echoes the requested value.
    pub fn rename(&mut self, new_name: &str) -> Result<MutationOutcome> {
        let response = self.put(&["cards", &self.id], params([("name", new_name.to_string())]))?;
        let outcome = echo_outcome(response.get("name"), &Value::from(new_name), "card name");
        if outcome.is_confirmed() {
            self.name = Some(new_name.to_string());
        }
        Ok(outcome)
    }

    /// Replace the card's description.
    pub fn set_desc(&mut self, desc: &str) -> Result<MutationOutcome> {
        let response = self.put(&["cards", &self.id], params([("desc", desc.to_string())]))?;
        let outcome = echo_outcome(response.get("desc"), &Value::from(desc), "card desc");
        if outcome.is_confirmed() {
            self.desc = Some(desc.to_string());
        }
        Ok(outcome)
    }

    /// Archive the card.
    pub fn archive(&mut self) -> Result<MutationOutcome> {
        self.put_closed(true)
    }

    /// Restore an archived card.
    pub fn unarchive(&mut self) -> Result<MutationOutcome> {
        self.put_closed(false)
    }

    /// Archive or restore by value.
    pub fn set_closed(&mut self, value: bool) -> Result<MutationOutcome> {
        if value {
            self.archive()
        } else {
            self.unarchive()
        }
    }

    fn put_closed(&mut self, value: bool) -> Result<MutationOutcome> {
        let response = self.put(
            &["cards", &self.id],
            params([("closed", value.to_string())]),
        )?;
        let outcome = echo_outcome(response.get("closed"), &Value::Bool(value), "card closed");
        if outcome.is_confirmed() {
            self.closed = Some(value);
        }
        Ok(outcome)
    }

    /// Move the card to another list. On confirmation the cached list id is
    /// committed and the board id the server echoes is adopted, so a
    /// cross-board move updates both.
    pub fn move_to_list(&mut self, list_id: &str) -> Result<MutationOutcome> {
        let response = self.put(
            &["cards", &self.id],
            params([("idList", list_id.to_string())]),
        )?;
        let outcome = echo_outcome(response.get("idList"), &Value::from(list_id), "card list");
        if outcome.is_confirmed() {
            self.id_list = Some(list_id.to_string());
            if let Some(board_id) = response.get("idBoard").and_then(Value::as_str) {
                self.id_board = Some(board_id.to_string());
            }
        }
        Ok(outcome)
    }
}

impl Remote for Card<'_> {
    fn client(&self) -> &TrelloClient {
        self.client
    }

    fn summary_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("id", Some(self.id.clone())),
            ("name", self.name.clone()),
            ("desc", self.desc.clone()),
            ("closed", self.closed.map(|c| c.to_string())),
        ]
    }
}
