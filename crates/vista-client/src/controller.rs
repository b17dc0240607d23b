use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use vista_types::{ClearRequest, PromptRequest};

use crate::reducer::{reduce, Action, Route, ThreadView};
use crate::transport::ThreadTransport;

/// How long a top-level error banner stays up.
pub const BANNER_TIMEOUT: Duration = Duration::from_millis(3200);
const CANCELLED_MESSAGE: &str = "Request was cancelled.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank prompt or a request already in flight; nothing was sent.
    Rejected,
    Ready(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Rejected,
    Cleared,
    Failed,
}

type SharedView = Arc<Mutex<ThreadView>>;

fn dispatch(view: &SharedView, action: Action) {
    let mut guard = view.lock();
    let current = std::mem::take(&mut *guard);
    *guard = reduce(current, action);
}

/// Dismiss whatever banner is up now after `timeout`. Later banners are left alone.
fn schedule_dismissal(view: &SharedView, timeout: Duration) {
    let Some(banner_id) = view.lock().banner.as_ref().map(|banner| banner.id) else {
        return;
    };
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return;
    };

    let view = Arc::clone(view);
    runtime.spawn(async move {
        tokio::time::sleep(timeout).await;
        dispatch(&view, Action::DismissBanner { banner_id });
    });
}

/// Fails the pending entry if the submit future is dropped before it settles,
/// so the view never stays busy.
struct PendingEntry<'a> {
    view: &'a SharedView,
    entry_id: String,
    banner_timeout: Duration,
    settled: bool,
}

impl PendingEntry<'_> {
    fn settle(mut self, action: Action) {
        dispatch(self.view, action);
        self.settled = true;
    }
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        if !self.settled {
            dispatch(
                self.view,
                Action::Failed {
                    entry_id: self.entry_id.clone(),
                    message: CANCELLED_MESSAGE.to_string(),
                },
            );
            schedule_dismissal(self.view, self.banner_timeout);
        }
    }
}

/// Drives one thread UI: owns the thread id, the view, and the transport.
pub struct ThreadController<T: ThreadTransport> {
    thread_id: String,
    transport: Arc<T>,
    view: SharedView,
    banner_timeout: Duration,
}

impl<T: ThreadTransport + 'static> ThreadController<T> {
    pub fn new(transport: T) -> Self {
        Self::with_thread_id(transport, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_thread_id(transport: T, thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            transport: Arc::new(transport),
            view: Arc::new(Mutex::new(ThreadView::new())),
            banner_timeout: BANNER_TIMEOUT,
        }
    }

    pub fn with_banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout;
        self
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> ThreadView {
        self.view.lock().clone()
    }

    /// Submit a prompt. The check and the optimistic entry happen under one
    /// lock, so concurrent calls can't both get through.
    pub async fn submit_prompt(&self, prompt: &str) -> SubmitOutcome {
        let prompt = prompt.trim().to_string();
        let entry_id = uuid::Uuid::new_v4().to_string();

        let (route, request) = {
            let mut view = self.view.lock();
            if !view.can_submit(&prompt) {
                return SubmitOutcome::Rejected;
            }

            let route = view.route();
            let request = PromptRequest::new(prompt.clone(), self.thread_id.clone())
                .with_continuation(view.last_image_id.clone(), view.last_seed.clone());

            let current = std::mem::take(&mut *view);
            *view = reduce(
                current,
                Action::Submitted {
                    entry_id: entry_id.clone(),
                    prompt,
                    timestamp: Utc::now(),
                },
            );
            (route, request)
        };

        let pending = PendingEntry {
            view: &self.view,
            entry_id: entry_id.clone(),
            banner_timeout: self.banner_timeout,
            settled: false,
        };

        tracing::debug!(thread_id = %self.thread_id, entry_id = %entry_id, ?route, "Submitting prompt");

        let result = match route {
            Route::Generate => self.transport.generate(request).await,
            Route::Refine => self.transport.refine(request).await,
        };

        match result {
            Ok(response) => {
                pending.settle(Action::Resolved {
                    entry_id: entry_id.clone(),
                    image_id: response.image_id,
                    image_data: response.image_data,
                    seed: response.seed,
                });
                SubmitOutcome::Ready(entry_id)
            }
            Err(e) => {
                tracing::warn!(thread_id = %self.thread_id, entry_id = %entry_id, error = %e, "Prompt failed");
                pending.settle(Action::Failed {
                    entry_id: entry_id.clone(),
                    message: e.to_string(),
                });
                self.schedule_banner_dismissal();
                SubmitOutcome::Failed(entry_id)
            }
        }
    }

    /// Reset the thread. Local history is only dropped once the server
    /// confirms the clear.
    pub async fn clear_thread(&self) -> ClearOutcome {
        {
            let mut view = self.view.lock();
            if view.busy {
                return ClearOutcome::Rejected;
            }
            let current = std::mem::take(&mut *view);
            *view = reduce(current, Action::ClearStarted);
        }

        match self.transport.clear(ClearRequest::new(self.thread_id.clone())).await {
            Ok(()) => {
                dispatch(&self.view, Action::Cleared);
                ClearOutcome::Cleared
            }
            Err(e) => {
                tracing::warn!(thread_id = %self.thread_id, error = %e, "Clear failed");
                dispatch(&self.view, Action::ClearFailed { message: e.to_string() });
                self.schedule_banner_dismissal();
                ClearOutcome::Failed
            }
        }
    }

    /// Dismiss the current banner now.
    pub fn acknowledge_error(&self) {
        let banner_id = self.view.lock().banner.as_ref().map(|banner| banner.id);
        if let Some(banner_id) = banner_id {
            dispatch(&self.view, Action::DismissBanner { banner_id });
        }
    }

    fn schedule_banner_dismissal(&self) {
        schedule_dismissal(&self.view, self.banner_timeout);
    }
}
