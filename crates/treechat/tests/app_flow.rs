use chat_provider::{ProviderError, RequestId};
use chat_tree::{render, NodeId, Role};
use treechat::app::{App, Focus, HostOps, Mode, DEFAULT_SYSTEM_PROMPT};
use treechat::commands::{parse_slash_command, SlashCommand};

#[derive(Default)]
struct HostSpy {
    next_request_id: RequestId,
    started: Vec<(NodeId, String, String)>,
    start_error: Option<ProviderError>,
    render_requests: usize,
    stop_requests: usize,
}

impl HostSpy {
    fn with_next_request_id(request_id: RequestId) -> Self {
        Self {
            next_request_id: request_id,
            ..Self::default()
        }
    }

    fn prompts(&self) -> Vec<&str> {
        self.started
            .iter()
            .map(|(_, _, prompt)| prompt.as_str())
            .collect()
    }
}

impl HostOps for HostSpy {
    fn start_request(
        &mut self,
        parent_id: NodeId,
        system_prompt: String,
        prompt: String,
    ) -> Result<RequestId, ProviderError> {
        if let Some(error) = self.start_error.clone() {
            return Err(error);
        }
        self.started.push((parent_id, system_prompt, prompt));
        Ok(self.next_request_id)
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}

fn submit(app: &mut App, host: &mut HostSpy, text: &str) {
    app.on_input_replace(text.to_string());
    app.on_submit(host);
}

/// Fresh app with the selection cleared so the next message is a root.
fn app_without_selection(host: &mut HostSpy) -> App {
    let mut app = App::new();
    app.on_new_conversation(host);
    app
}

#[test]
fn startup_seeds_selected_welcome_node() {
    let app = App::new();
    assert_eq!(app.tree.len(), 1);
    let welcome = app.tree.selected().expect("welcome selected");
    assert_eq!(welcome.id, 1);
    assert_eq!(welcome.role, Role::System);
    assert_eq!(app.mode, Mode::Idle);
    assert_eq!(app.focus, Focus::Input);
}

#[test]
fn submit_continues_selected_branch_and_starts_request() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(7);

    submit(&mut app, &mut host, "  Hi  ");

    let node = app.tree.node(2).expect("user node");
    assert_eq!(node.role, Role::User);
    assert_eq!(node.content, "Hi");
    assert_eq!(node.parent_id, Some(1));
    assert_eq!(app.tree.selected_id(), Some(2));
    assert_eq!(
        host.started,
        vec![(2, DEFAULT_SYSTEM_PROMPT.to_string(), "Hi".to_string())]
    );
    assert_eq!(
        app.mode,
        Mode::Requesting {
            request_id: 7,
            parent_id: 2
        }
    );
    assert_eq!(app.input, "");
}

#[test]
fn response_is_attached_under_the_triggering_message() {
    let mut host = HostSpy::with_next_request_id(3);
    let mut app = app_without_selection(&mut host);

    submit(&mut app, &mut host, "Hi");
    app.on_response(3, "Hello".to_string());

    assert_eq!(app.mode, Mode::Idle);
    let reply = app.tree.node(3).expect("assistant node");
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.parent_id, Some(2));
    assert_eq!(app.tree.selected_id(), Some(3));

    let lines = render(&app.tree);
    let user = lines.iter().find(|line| line.node_id == Some(2)).expect("line 2");
    let asst = lines.iter().find(|line| line.node_id == Some(3)).expect("line 3");
    assert_eq!(user.depth, 0);
    assert_eq!(asst.depth, 1);
    assert!(asst.is_last);
    assert!(asst.text.contains("└─ 0003 Asst"));
}

#[test]
fn busy_submit_is_rejected_before_touching_the_tree() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(1);

    submit(&mut app, &mut host, "first");
    let nodes_before = app.tree.len();
    let selected_before = app.tree.selected_id();

    submit(&mut app, &mut host, "second");

    assert_eq!(app.tree.len(), nodes_before);
    assert_eq!(app.tree.selected_id(), selected_before);
    assert_eq!(host.prompts(), vec!["first"]);
    assert_eq!(
        app.status.as_deref(),
        Some("Busy: waiting for the current response")
    );
    assert_eq!(app.input, "second");
}

#[test]
fn busy_edit_keeps_edit_target_and_tree() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(1);
    submit(&mut app, &mut host, "first");

    app.on_edit_selected(&mut host);
    assert_eq!(app.editing, Some(2));
    submit(&mut app, &mut host, "first, revised");

    assert_eq!(app.tree.len(), 2);
    assert_eq!(app.editing, Some(2));
    assert_eq!(host.started.len(), 1);
}

#[test]
fn unchanged_edit_creates_nothing_and_sends_nothing() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(4);
    submit(&mut app, &mut host, "Hi");
    app.on_response(4, "Hello".to_string());
    app.tree.select(Some(2)).expect("select user node");

    app.on_edit_selected(&mut host);
    assert_eq!(app.input, "Hi");
    assert_eq!(app.focus, Focus::Input);
    app.on_submit(&mut host);

    assert_eq!(app.tree.len(), 3);
    assert_eq!(host.started.len(), 1);
    assert_eq!(app.editing, None);
    assert_eq!(app.tree.selected_id(), Some(2));
    assert_eq!(app.mode, Mode::Idle);
}

#[test]
fn changed_edit_forks_a_sibling_and_requests_once() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(4);
    submit(&mut app, &mut host, "Hi");
    app.on_response(4, "Hello".to_string());
    app.tree.select(Some(2)).expect("select user node");

    host.next_request_id = 5;
    app.on_edit_selected(&mut host);
    submit(&mut app, &mut host, "Hey there");

    let fork = app.tree.node(4).expect("forked node");
    assert_eq!(fork.role, Role::User);
    assert_eq!(fork.parent_id, Some(1));
    assert_eq!(fork.content, "Hey there");
    assert_eq!(app.tree.children(1), &[2, 4]);
    assert_eq!(app.tree.node(2).expect("original").content, "Hi");
    assert_eq!(app.tree.children(2), &[3]);
    assert_eq!(app.tree.selected_id(), Some(4));
    assert_eq!(host.prompts(), vec!["Hi", "Hey there"]);
    assert_eq!(host.started[1].0, 4);
    assert_eq!(
        app.mode,
        Mode::Requesting {
            request_id: 5,
            parent_id: 4
        }
    );
}

#[test]
fn system_messages_are_not_editable() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    app.on_edit_selected(&mut host);

    assert_eq!(app.editing, None);
    assert_eq!(app.input, "");
    assert_eq!(
        app.status.as_deref(),
        Some("System messages cannot be edited")
    );
}

#[test]
fn failed_response_surfaces_status_and_keeps_tree() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(9);
    submit(&mut app, &mut host, "Hi");

    app.on_response_failed(
        9,
        &ProviderError::Http {
            status: 500,
            message: "boom".to_string(),
        },
    );

    assert_eq!(app.mode, Mode::Idle);
    assert_eq!(app.tree.len(), 2);
    assert_eq!(app.status.as_deref(), Some("HTTP 500: boom"));

    submit(&mut app, &mut host, "retry by hand");
    assert_eq!(host.started.len(), 2);
}

#[test]
fn blank_reply_is_reported_and_selection_stays_visible() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(5);
    submit(&mut app, &mut host, "hello");

    app.on_response(5, "\n  ".to_string());

    assert_eq!(app.mode, Mode::Idle);
    assert_eq!(app.tree.len(), 2);
    assert_eq!(app.tree.selected_id(), Some(2));
    assert_eq!(
        app.status.as_deref(),
        Some("Malformed response: empty reply")
    );
    let lines = render(&app.tree);
    assert!(lines.iter().any(|line| line.selected && line.node_id == Some(2)));

    submit(&mut app, &mut host, "again");
    assert_eq!(app.tree.node(3).expect("follow-up").parent_id, Some(2));
}

#[test]
fn stale_request_events_are_ignored() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(2);
    submit(&mut app, &mut host, "Hi");

    app.on_response(99, "late".to_string());
    app.on_response_failed(98, &ProviderError::Cancelled);

    assert_eq!(app.tree.len(), 2);
    assert!(app.is_busy());
    assert_eq!(app.status, None);
}

#[test]
fn start_failure_leaves_app_idle_with_status() {
    let mut app = App::new();
    let mut host = HostSpy {
        start_error: Some(ProviderError::Transport("no worker".to_string())),
        ..HostSpy::default()
    };

    submit(&mut app, &mut host, "Hi");

    assert_eq!(app.mode, Mode::Idle);
    assert_eq!(app.status.as_deref(), Some("Request failed: no worker"));
}

#[test]
fn navigation_moves_selection_and_drops_edit_target() {
    let mut app = App::new();
    let mut host = HostSpy::with_next_request_id(1);
    submit(&mut app, &mut host, "Hi");
    app.on_response(1, "Hello".to_string());

    app.tree.select(Some(2)).expect("select user node");
    app.on_edit_selected(&mut host);
    app.on_navigate("right".parse().expect("direction"), &mut host);

    assert_eq!(app.tree.selected_id(), Some(3));
    assert_eq!(app.editing, None);

    app.on_navigate("l".parse().expect("direction"), &mut host);
    assert_eq!(app.tree.selected_id(), Some(3));
    app.on_navigate("h".parse().expect("direction"), &mut host);
    assert_eq!(app.tree.selected_id(), Some(2));
}

#[test]
fn new_conversation_clears_selection_for_a_root_message() {
    let mut host = HostSpy::with_next_request_id(1);
    let mut app = app_without_selection(&mut host);
    assert_eq!(app.tree.selected_id(), None);

    submit(&mut app, &mut host, "fresh start");
    assert_eq!(app.tree.roots(), &[1, 2]);
    assert_eq!(host.started[0].0, 2);
}

#[test]
fn slash_commands_update_status_or_quit() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    submit(&mut app, &mut host, "/help");
    assert!(app.status.as_deref().is_some_and(|s| s.starts_with("Commands:")));

    submit(&mut app, &mut host, "/branch");
    assert_eq!(app.status.as_deref(), Some("Unknown command: /branch"));
    assert_eq!(app.tree.len(), 1);
    assert!(host.started.is_empty());

    submit(&mut app, &mut host, "/quit");
    assert!(app.should_exit);
    assert_eq!(host.stop_requests, 1);
    assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Quit));
}

#[test]
fn blank_submit_only_rerenders() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    submit(&mut app, &mut host, "   ");

    assert_eq!(app.tree.len(), 1);
    assert!(host.started.is_empty());
    assert_eq!(host.render_requests, 1);
}
