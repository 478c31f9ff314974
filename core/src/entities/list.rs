//! The list entity: ordered container within a board, holding cards.

use serde_json::Value;

use crate::client::{params, TrelloClient};
use crate::entities::{echo_outcome, Card, MutationOutcome, Remote};
use crate::error::{Error, Result};
use crate::types::ListData;
use crate::utils::Fields;

/// A list on the remote service.
///
/// `subscribed` is lazy: an unknown value triggers one full refresh on first
/// read. The `cards` collection is fetched once and cached until
/// [`refresh_cards`](List::refresh_cards). Position is read-only here —
/// mutation is deliberately unimplemented.
#[derive(Debug)]
pub struct List<'a> {
    client: &'a TrelloClient,
    id: String,
    id_board: Option<String>,
    name: Option<String>,
    pos: Option<f64>,
    closed: Option<bool>,
    subscribed: Option<bool>,
    cards: Option<Vec<Card<'a>>>,
}

impl<'a> List<'a> {
    pub(crate) fn from_data(client: &'a TrelloClient, data: ListData) -> Self {
        let mut list = Self {
            client,
            id: String::new(),
            id_board: None,
            name: None,
            pos: None,
            closed: None,
            subscribed: None,
            cards: None,
        };
        list.populate(data);
        list
    }

    /// Re-initialize every field from wire data and drop the cards cache.
    fn populate(&mut self, data: ListData) {
        self.id = data.id;
        self.id_board = data.id_board;
        self.name = data.name;
        self.pos = data.pos;
        self.closed = data.closed;
        self.subscribed = data.subscribed;
        self.cards = None;
    }

    /// Server-assigned id, stable for the lifetime of this handle.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the owning board. Immutable through this handle.
    pub fn id_board(&self) -> Option<&str> {
        self.id_board.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pos(&self) -> Option<f64> {
        self.pos
    }

    pub fn closed(&self) -> Option<bool> {
        self.closed
    }

    /// Whether the member is subscribed to the list. An unknown value
    /// triggers one full refresh.
    pub fn subscribed(&mut self) -> Result<bool> {
        if self.subscribed.is_none() {
            self.refresh_full_data()?;
        }
        self.subscribed.ok_or(Error::MissingField("subscribed"))
    }

    /// The list's cards, fetched once and cached until
    /// [`refresh_cards`](List::refresh_cards).
    pub fn cards(&mut self) -> Result<&[Card<'a>]> {
        if self.cards.is_none() {
            self.refresh_cards()?;
        }
        Ok(self.cards.as_deref().unwrap_or(&[]))
    }

    /// Re-fetch the cards collection.
    pub fn refresh_cards(&mut self) -> Result<()> {
        let client = self.client;
        self.cards = Some(client.get_cards(None, Some(&self.id))?);
        Ok(())
    }

    /// Re-fetch the list with all fields and re-populate from the result.
    pub fn refresh_full_data(&mut self) -> Result<()> {
        let client = self.client;
        let raw = client.get_list_raw(&self.id, Some(Fields::All))?;
        let data: ListData = serde_json::from_value(raw)?;
        self.populate(data);
        Ok(())
    }

    /// Rename the list. The cached name is committed only when the server
    /// echoes the requested value.
    pub fn rename(&mut self, new_name: &str) -> Result<MutationOutcome> {
        let response = self.put(&["lists", &self.id], params([("name", new_name.to_string())]))?;
        let outcome = echo_outcome(response.get("name"), &Value::from(new_name), "list name");
        if outcome.is_confirmed() {
            self.name = Some(new_name.to_string());
        }
        Ok(outcome)
    }

    /// Archive the list.
    pub fn archive(&mut self) -> Result<MutationOutcome> {
        self.put_closed(true)
    }

    /// Restore an archived list.
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
            &["lists", &self.id],
            params([("closed", value.to_string())]),
        )?;
        let outcome = echo_outcome(response.get("closed"), &Value::Bool(value), "list closed");
        if outcome.is_confirmed() {
            self.closed = Some(value);
        }
        Ok(outcome)
    }

    /// Position mutation is deliberately unimplemented.
    pub fn set_pos(&mut self, _pos: f64) -> Result<MutationOutcome> {
        Err(Error::Unimplemented("list position mutation"))
    }

    /// The owning board cannot be changed through this handle.
    pub fn set_board(&mut self, _board_id: &str) -> Result<MutationOutcome> {
        Err(Error::Unimplemented("moving a list to another board"))
    }

    /// Create a card at the given position on this list.
    pub fn create_card(&self, name: &str, desc: Option<&str>, pos: &str) -> Result<Card<'a>> {
        let client = self.client;
        client.create_card(name, &self.id, desc, pos, None)
    }

    /// Moving a list across boards is deliberately unimplemented.
    pub fn move_to_board(&mut self, _board_id: &str, _pos: &str) -> Result<MutationOutcome> {
        Err(Error::Unimplemented("moving a list to another board"))
    }

    /// Create a copy of this list on another board.
    pub fn copy_to_board(&self, board_id: &str, pos: &str) -> Result<List<'a>> {
        let client = self.client;
        let name = self.name().ok_or(Error::MissingField("name"))?;
        client.create_list(name, board_id, pos, Some(&self.id))
    }
}

impl Remote for List<'_> {
    fn client(&self) -> &TrelloClient {
        self.client
    }

    fn summary_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("id", Some(self.id.clone())),
            ("name", self.name.clone()),
            ("closed", self.closed.map(|c| c.to_string())),
        ]
    }
}
