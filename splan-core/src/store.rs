//! Session state: the single place where input, tool, settings and history change.
//!
//! Callers read through accessors and mutate only by applying an [`Action`].
//! Each action runs to completion under `&mut self`, so no reader ever sees a
//! half-applied update.

use crate::document::StudyDocument;
use crate::settings::{SettingsPatch, ToolSettings, ToolType};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MessageBody {
    Text(String),
    Document(StudyDocument),
}

/// A message before the store has given it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub role: Role,
    pub body: MessageBody,
    pub kind: MessageKind,
    pub file_name: Option<String>,
}

impl NewMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            body: MessageBody::Text(text.into()),
            kind: MessageKind::Text,
            file_name: None,
        }
    }

    pub fn user_file(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            body: MessageBody::Text(text.into()),
            kind: MessageKind::File,
            file_name: Some(file_name.into()),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::Text(text.into()),
            kind: MessageKind::Text,
            file_name: None,
        }
    }

    pub fn assistant_document(document: StudyDocument) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::Document(document),
            kind: MessageKind::Text,
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub body: MessageBody,
    pub kind: MessageKind,
    pub file_name: Option<String>,
}

impl Message {
    /// Markdown for documents, the raw text otherwise.
    pub fn content(&self) -> String {
        match &self.body {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Document(doc) => doc.to_markdown(),
        }
    }

    pub fn document(&self) -> Option<&StudyDocument> {
        match &self.body {
            MessageBody::Document(doc) => Some(doc),
            MessageBody::Text(_) => None,
        }
    }
}

/// Every mutation the store accepts.
#[derive(Debug, Clone)]
pub enum Action {
    SetInputText(String),
    SetProcessing(bool),
    /// `None` clears the selection.
    SelectTool(Option<ToolType>),
    UpdateSettings(SettingsPatch),
    AddMessage(NewMessage),
    RemoveMessage(Uuid),
    ClearMessages,
}

/// What applying an action produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Added(Uuid),
    /// `RemoveMessage` named an id that is not in the history.
    NotFound,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    input_text: String,
    processing: bool,
    selected_tool: Option<ToolType>,
    settings: ToolSettings,
    messages: Vec<Message>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(ToolSettings::default())
    }
}

impl SessionStore {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            input_text: String::new(),
            processing: false,
            selected_tool: Some(ToolType::default()),
            settings,
            messages: Vec::new(),
        }
    }

    /// Appends `new` to the history; same as [`Action::AddMessage`] but
    /// hands back the assigned id directly.
    pub fn add_message(&mut self, new: NewMessage) -> Uuid {
        debug!(action = "add_message", "Applying store action");
        self.push_message(new)
    }

    fn push_message(&mut self, new: NewMessage) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(Message {
            id,
            role: new.role,
            body: new.body,
            kind: new.kind,
            file_name: new.file_name,
        });
        id
    }

    pub fn apply(&mut self, action: Action) -> Outcome {
        debug!(action = action_name(&action), "Applying store action");
        match action {
            Action::SetInputText(text) => {
                self.input_text = text;
                Outcome::Applied
            }
            Action::SetProcessing(flag) => {
                self.processing = flag;
                Outcome::Applied
            }
            Action::SelectTool(tool) => {
                self.selected_tool = tool;
                Outcome::Applied
            }
            Action::UpdateSettings(patch) => {
                self.settings.apply(&patch);
                Outcome::Applied
            }
            Action::AddMessage(new) => Outcome::Added(self.push_message(new)),
            Action::RemoveMessage(id) => {
                let before = self.messages.len();
                self.messages.retain(|m| m.id != id);
                if self.messages.len() == before {
                    Outcome::NotFound
                } else {
                    Outcome::Applied
                }
            }
            Action::ClearMessages => {
                self.messages.clear();
                Outcome::Applied
            }
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn selected_tool(&self) -> Option<ToolType> {
        self.selected_tool
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::SetInputText(_) => "set_input_text",
        Action::SetProcessing(_) => "set_processing",
        Action::SelectTool(_) => "select_tool",
        Action::UpdateSettings(_) => "update_settings",
        Action::AddMessage(_) => "add_message",
        Action::RemoveMessage(_) => "remove_message",
        Action::ClearMessages => "clear_messages",
    }
}
