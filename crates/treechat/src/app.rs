use std::sync::Arc;

use chat_provider::{ProviderError, RequestId};
use chat_tree::{Clock, ConversationTree, Direction, NodeId, Role, SystemClock};

use crate::commands::{parse_slash_command, SlashCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    /// One model request is outstanding; its reply is attached under `parent_id`.
    Requesting {
        request_id: RequestId,
        parent_id: NodeId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Input,
}

impl Focus {
    fn toggled(self) -> Self {
        match self {
            Self::Tree => Self::Input,
            Self::Input => Self::Tree,
        }
    }
}

/// Host side effects the app asks for. Implemented by the runtime controller.
pub trait HostOps {
    fn start_request(
        &mut self,
        parent_id: NodeId,
        system_prompt: String,
        prompt: String,
    ) -> Result<RequestId, ProviderError>;
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

const HELP_TEXT: &str =
    "Commands: /help, /quit. Keys: Tab focus, arrows/hjkl move, e edit, n new conversation, q quit";
pub const WELCOME_TEXT: &str =
    "Welcome to treechat. Edits branch instead of overwriting; use the arrows to explore.";
pub const SYSTEM_PROMPT_ENV_VAR: &str = "TREECHAT_SYSTEM_PROMPT";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer concisely.";

pub fn system_prompt_from_env() -> String {
    sanitize_system_prompt(std::env::var(SYSTEM_PROMPT_ENV_VAR).ok())
}

fn sanitize_system_prompt(raw: Option<String>) -> String {
    let Some(value) = raw else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_SYSTEM_PROMPT.to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct App {
    pub tree: ConversationTree,
    pub mode: Mode,
    pub focus: Focus,
    pub input: String,
    /// Node whose content is loaded in the input for editing.
    pub editing: Option<NodeId>,
    pub status: Option<String>,
    pub should_exit: bool,
    system_prompt: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::detect()), None)
    }

    /// Builds the app with a seeded welcome node selected.
    pub fn with_clock(clock: Arc<dyn Clock>, system_prompt: Option<String>) -> Self {
        let mut tree = ConversationTree::with_clock(clock);
        if let Ok(welcome) = tree.create_node(Role::System, WELCOME_TEXT, None) {
            let _ = tree.select(Some(welcome));
        }

        Self {
            tree,
            mode: Mode::Idle,
            focus: Focus::Input,
            input: String::new(),
            editing: None,
            status: None,
            should_exit: false,
            system_prompt: sanitize_system_prompt(system_prompt),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.mode, Mode::Requesting { .. })
    }

    pub fn on_input_replace(&mut self, text: String) {
        self.input = text;
    }

    pub fn on_toggle_focus(&mut self, host: &mut dyn HostOps) {
        self.focus = self.focus.toggled();
        host.request_render();
    }

    pub fn on_submit(&mut self, host: &mut dyn HostOps) {
        let submitted = std::mem::take(&mut self.input);
        let text = submitted.trim().to_string();

        if text.is_empty() {
            host.request_render();
            return;
        }

        if let Some(command) = parse_slash_command(&text) {
            match command {
                SlashCommand::Help => self.status = Some(HELP_TEXT.to_string()),
                SlashCommand::Quit => {
                    self.on_quit(host);
                    return;
                }
                SlashCommand::Unknown(command) => {
                    self.status = Some(format!("Unknown command: {command}"));
                }
            }
            host.request_render();
            return;
        }

        if self.is_busy() {
            self.input = submitted;
            self.status = Some(ProviderError::Busy.to_string());
            host.request_render();
            return;
        }

        let created = match self.editing.take() {
            Some(original) => self.apply_edit(original, text.clone()),
            None => self.append_user_message(text.clone()),
        };

        if let Some(node_id) = created {
            self.start_request(node_id, text, host);
        }
        host.request_render();
    }

    fn append_user_message(&mut self, text: String) -> Option<NodeId> {
        let parent = self.tree.selected_id();
        match self.tree.create_node(Role::User, text, parent) {
            Ok(id) => {
                let _ = self.tree.select(Some(id));
                self.status = None;
                Some(id)
            }
            Err(error) => {
                self.status = Some(error.to_string());
                None
            }
        }
    }

    fn apply_edit(&mut self, original: NodeId, text: String) -> Option<NodeId> {
        match self.tree.edit_node(original, text) {
            Ok(Some(forked)) => {
                self.status = Some(format!("Branched #{original:04} into #{forked:04}"));
                Some(forked)
            }
            Ok(None) => {
                self.status = Some("No changes; edit discarded".to_string());
                None
            }
            Err(error) => {
                self.status = Some(error.to_string());
                None
            }
        }
    }

    fn start_request(&mut self, parent_id: NodeId, prompt: String, host: &mut dyn HostOps) {
        match host.start_request(parent_id, self.system_prompt.clone(), prompt) {
            Ok(request_id) => {
                self.mode = Mode::Requesting {
                    request_id,
                    parent_id,
                };
            }
            Err(error) => {
                tracing::warn!(parent_id, %error, "request not started");
                self.status = Some(error.to_string());
            }
        }
    }

    pub fn on_navigate(&mut self, direction: Direction, host: &mut dyn HostOps) {
        let before = self.tree.selected_id();
        let after = self.tree.move_selection(direction);
        if before != after {
            self.editing = None;
        }
        host.request_render();
    }

    /// Loads the selected message into the input for editing.
    pub fn on_edit_selected(&mut self, host: &mut dyn HostOps) {
        let Some(node) = self.tree.selected() else {
            self.status = Some("Select a message to edit".to_string());
            host.request_render();
            return;
        };

        if node.role == Role::System {
            self.status = Some("System messages cannot be edited".to_string());
            host.request_render();
            return;
        }

        self.editing = Some(node.id);
        self.input = node.content.clone();
        self.focus = Focus::Input;
        self.status = Some(format!("Editing #{:04}; Enter forks a new branch", node.id));
        host.request_render();
    }

    /// Clears the selection so the next message starts a new root.
    pub fn on_new_conversation(&mut self, host: &mut dyn HostOps) {
        let _ = self.tree.select(None);
        self.editing = None;
        self.focus = Focus::Input;
        self.status = Some("New conversation".to_string());
        host.request_render();
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        host.request_stop();
        host.request_render();
    }

    pub fn on_response(&mut self, request_id: RequestId, text: String) {
        let Some(parent_id) = self.take_matching_request(request_id) else {
            return;
        };

        if text.trim().is_empty() {
            tracing::warn!(request_id, "blank response discarded");
            self.status =
                Some(ProviderError::MalformedResponse("empty reply".to_string()).to_string());
            return;
        }

        match self.tree.create_node(Role::Assistant, text, Some(parent_id)) {
            Ok(id) => {
                let _ = self.tree.select(Some(id));
                self.status = None;
                tracing::debug!(request_id, id, "response attached");
            }
            Err(error) => {
                self.status = Some(format!("Response discarded: {error}"));
            }
        }
    }

    pub fn on_response_failed(&mut self, request_id: RequestId, error: &ProviderError) {
        if self.take_matching_request(request_id).is_none() {
            return;
        }
        self.status = Some(error.to_string());
    }

    fn take_matching_request(&mut self, request_id: RequestId) -> Option<NodeId> {
        match self.mode {
            Mode::Requesting {
                request_id: active,
                parent_id,
            } if active == request_id => {
                self.mode = Mode::Idle;
                Some(parent_id)
            }
            _ => {
                tracing::debug!(request_id, "ignoring stale request event");
                None
            }
        }
    }
}
