//! The label entity: a tag scoped to a board, attachable to cards.

use serde_json::Value;

use crate::client::{params, TrelloClient};
use crate::entities::{echo_outcome, MutationOutcome, Remote};
use crate::types::LabelData;
use crate::error::Result;

/// A label on the remote service. Obtained from a card's cached label data.
#[derive(Debug)]
pub struct Label<'a> {
    client: &'a TrelloClient,
    id: String,
    id_board: Option<String>,
    name: Option<String>,
    color: Option<String>,
}

impl<'a> Label<'a> {
    pub(crate) fn from_data(client: &'a TrelloClient, data: LabelData) -> Self {
        Self {
            client,
            id: data.id,
            id_board: data.id_board,
            name: data.name,
            color: data.color,
        }
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

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Rename the label. The cached name is committed only when the server
    /// echoes the requested value.
    pub fn rename(&mut self, new_name: &str) -> Result<MutationOutcome> {
        let response = self.put(&["labels", &self.id], params([("name", new_name.to_string())]))?;
        let outcome = echo_outcome(response.get("name"), &Value::from(new_name), "label name");
        if outcome.is_confirmed() {
            self.name = Some(new_name.to_string());
        }
        Ok(outcome)
    }

    /// Change the label's color.
    pub fn set_color(&mut self, color: &str) -> Result<MutationOutcome> {
        let response = self.put(&["labels", &self.id], params([("color", color.to_string())]))?;
        let outcome = echo_outcome(response.get("color"), &Value::from(color), "label color");
        if outcome.is_confirmed() {
            self.color = Some(color.to_string());
        }
        Ok(outcome)
    }
}

impl Remote for Label<'_> {
    fn client(&self) -> &TrelloClient {
        self.client
    }

    fn summary_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("id", Some(self.id.clone())),
            ("name", self.name.clone()),
        ]
    }
}
