use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use chat_provider::{
    CancelSignal, CompletionProvider, CompletionRequest, ProviderError, RequestId,
};
use chat_tree::NodeId;
use treechat_tui::{Command, CustomCommand, CustomCommandCtx, CustomCommandError, RuntimeHandle};

use crate::app::{App, HostOps};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    Completed {
        request_id: RequestId,
        text: String,
    },
    Failed {
        request_id: RequestId,
        error: ProviderError,
    },
}

impl RequestEvent {
    fn request_id(&self) -> RequestId {
        match self {
            Self::Completed { request_id, .. } | Self::Failed { request_id, .. } => *request_id,
        }
    }
}

struct ActiveRequest {
    request_id: RequestId,
    cancel: CancelSignal,
    join_handle: Option<JoinHandle<()>>,
}

/// Runs model requests on worker threads, one at a time.
pub struct RuntimeController {
    app: Arc<Mutex<App>>,
    runtime_handle: RuntimeHandle,
    pending_events: Arc<Mutex<VecDeque<RequestEvent>>>,
    next_request_id: AtomicU64,
    active_request: Mutex<Option<ActiveRequest>>,
    provider: Arc<dyn CompletionProvider>,
}

impl RuntimeController {
    /// Creates a controller that buffers request events before applying them to `App`.
    ///
    /// In UI environments, events are drained by the runtime command path. In headless
    /// environments, call [`RuntimeController::flush_pending_request_events`] instead.
    pub fn new(
        app: Arc<Mutex<App>>,
        runtime_handle: RuntimeHandle,
        provider: Arc<dyn CompletionProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            app,
            runtime_handle,
            pending_events: Arc::new(Mutex::new(VecDeque::new())),
            next_request_id: AtomicU64::new(1),
            active_request: Mutex::new(None),
            provider,
        })
    }

    fn start_request_internal(
        self: &Arc<Self>,
        parent_id: NodeId,
        system_prompt: String,
        prompt: String,
    ) -> Result<RequestId, ProviderError> {
        let mut active_request = self.lock_active_request();
        if active_request.is_some() {
            return Err(ProviderError::Busy);
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancelSignal::default();
        let request = CompletionRequest {
            request_id,
            parent_id,
            system_prompt,
            prompt,
        };
        let join_handle = self.spawn_worker(request, Arc::clone(&cancel))?;

        *active_request = Some(ActiveRequest {
            request_id,
            cancel,
            join_handle: Some(join_handle),
        });
        tracing::debug!(request_id, parent_id, "request started");

        Ok(request_id)
    }

    fn spawn_worker(
        self: &Arc<Self>,
        request: CompletionRequest,
        cancel: CancelSignal,
    ) -> Result<JoinHandle<()>, ProviderError> {
        let request_id = request.request_id;
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("treechat-request-{request_id}"))
            .spawn(move || controller.run_worker(request, cancel))
            .map_err(|error| ProviderError::Transport(format!("failed to spawn worker: {error}")))
    }

    fn run_worker(self: Arc<Self>, request: CompletionRequest, cancel: CancelSignal) {
        let request_id = request.request_id;
        let provider = Arc::clone(&self.provider);

        let outcome = catch_unwind(AssertUnwindSafe(|| provider.complete(&request, cancel)));
        let event = match outcome {
            Ok(Ok(text)) => RequestEvent::Completed { request_id, text },
            Ok(Err(error)) => {
                tracing::warn!(request_id, %error, "request failed");
                RequestEvent::Failed { request_id, error }
            }
            Err(_) => RequestEvent::Failed {
                request_id,
                error: ProviderError::Transport("provider panicked".to_string()),
            },
        };

        self.enqueue_request_event(event);
    }

    fn enqueue_request_event(self: &Arc<Self>, event: RequestEvent) {
        let should_drain = {
            let mut queue = lock_unpoisoned(&self.pending_events);
            let should_drain = queue.is_empty();
            queue.push_back(event);
            should_drain
        };

        if should_drain {
            self.runtime_handle
                .dispatch(Command::Custom(Box::new(DrainRequestEventsCommand {
                    controller: Arc::clone(self),
                })));
        }
    }

    fn drain_pending_request_events(&self) -> usize {
        let mut drained = 0usize;

        loop {
            let event = lock_unpoisoned(&self.pending_events).pop_front();
            match event {
                Some(event) => {
                    self.apply_request_event(event);
                    drained += 1;
                }
                None => break,
            }
        }

        drained
    }

    /// Drains queued request events and schedules a render.
    pub fn flush_pending_request_events(&self) -> usize {
        let drained = self.drain_pending_request_events();
        if drained > 0 {
            self.runtime_handle.dispatch(Command::RequestRender);
        }

        drained
    }

    fn apply_request_event(&self, event: RequestEvent) {
        let request_id = event.request_id();

        {
            let mut app = lock_unpoisoned(&self.app);
            match event {
                RequestEvent::Completed { request_id, text } => app.on_response(request_id, text),
                RequestEvent::Failed { request_id, error } => {
                    app.on_response_failed(request_id, &error)
                }
            }
        }

        self.clear_active_request_if_matching(request_id);
    }

    fn clear_active_request_if_matching(&self, request_id: RequestId) {
        let mut active_request = self.lock_active_request();
        let matches = active_request.as_ref().map(|active| active.request_id) == Some(request_id);
        if !matches {
            return;
        }

        let Some(mut completed) = active_request.take() else {
            return;
        };

        if let Some(join_handle) = completed.join_handle.take() {
            let is_current_thread = join_handle.thread().id() == thread::current().id();
            if !is_current_thread && join_handle.is_finished() {
                let _ = join_handle.join();
            }
        }
    }

    pub fn has_active_request(&self) -> bool {
        self.lock_active_request().is_some()
    }

    /// Signals the outstanding request, if any, to stop. Used on shutdown.
    pub fn cancel_active_request(&self) {
        if let Some(active) = self.lock_active_request().as_ref() {
            active.cancel.store(true, Ordering::SeqCst);
            tracing::debug!(request_id = active.request_id, "request cancelled");
        }
    }

    fn lock_active_request(&self) -> MutexGuard<'_, Option<ActiveRequest>> {
        lock_unpoisoned(&self.active_request)
    }
}

struct DrainRequestEventsCommand {
    controller: Arc<RuntimeController>,
}

impl CustomCommand for DrainRequestEventsCommand {
    fn name(&self) -> &'static str {
        "drain_request_events"
    }

    fn apply(self: Box<Self>, ctx: &mut CustomCommandCtx) -> Result<(), CustomCommandError> {
        let drained = self.controller.drain_pending_request_events();
        if drained > 0 {
            ctx.request_render();
        }
        Ok(())
    }
}

impl HostOps for Arc<RuntimeController> {
    fn start_request(
        &mut self,
        parent_id: NodeId,
        system_prompt: String,
        prompt: String,
    ) -> Result<RequestId, ProviderError> {
        self.start_request_internal(parent_id, system_prompt, prompt)
    }

    fn request_render(&mut self) {
        self.runtime_handle.dispatch(Command::RequestRender);
    }

    fn request_stop(&mut self) {
        self.runtime_handle.dispatch(Command::RequestStop);
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

