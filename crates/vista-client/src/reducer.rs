//! Client thread state machine.
//!
//! Every change to a [`ThreadView`] goes through [`reduce`], a pure function
//! from (view, action) to the next view. Entry status only ever moves
//! `Loading -> Ready` or `Loading -> Error`; both are terminal.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Loading,
    Ready,
    Error,
}

/// One submitted prompt and what became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEntry {
    pub id: String,
    pub prompt: String,
    pub status: EntryStatus,
    /// Present iff `Ready`
    pub image_data: Option<String>,
    /// Present iff `Ready`
    pub seed: Option<String>,
    /// Present iff `Error`
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Transient top-level error. Dismissed by id so a late timer can't hide a newer banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub id: u64,
    pub message: String,
}

/// Which endpoint the next submission should hit. Advisory: the server has
/// the final say on whether a refine is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Generate,
    Refine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadView {
    pub entries: Vec<ThreadEntry>,
    pub busy: bool,
    pub banner: Option<Banner>,
    pub last_image_id: Option<String>,
    pub last_seed: Option<String>,
    next_banner_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submitted {
        entry_id: String,
        prompt: String,
        timestamp: DateTime<Utc>,
    },
    Resolved {
        entry_id: String,
        image_id: String,
        image_data: String,
        seed: String,
    },
    Failed {
        entry_id: String,
        message: String,
    },
    ClearStarted,
    Cleared,
    ClearFailed {
        message: String,
    },
    DismissBanner {
        banner_id: u64,
    },
}

impl ThreadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_loading_entry(&self) -> bool {
        self.entries.iter().any(|entry| entry.status == EntryStatus::Loading)
    }

    pub fn can_submit(&self, prompt: &str) -> bool {
        !prompt.trim().is_empty() && !self.busy && !self.has_loading_entry()
    }

    pub fn route(&self) -> Route {
        if self.entries.iter().any(|entry| entry.status == EntryStatus::Ready) {
            Route::Refine
        } else {
            Route::Generate
        }
    }

    pub fn entry(&self, entry_id: &str) -> Option<&ThreadEntry> {
        self.entries.iter().find(|entry| entry.id == entry_id)
    }

    fn loading_entry_mut(&mut self, entry_id: &str) -> Option<&mut ThreadEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == entry_id && entry.status == EntryStatus::Loading)
    }

    fn raise_banner(&mut self, message: String) {
        self.next_banner_id += 1;
        self.banner = Some(Banner {
            id: self.next_banner_id,
            message,
        });
    }
}

pub fn reduce(mut view: ThreadView, action: Action) -> ThreadView {
    match action {
        Action::Submitted {
            entry_id,
            prompt,
            timestamp,
        } => {
            if !view.can_submit(&prompt) {
                return view;
            }
            view.entries.push(ThreadEntry {
                id: entry_id,
                prompt: prompt.trim().to_string(),
                status: EntryStatus::Loading,
                image_data: None,
                seed: None,
                error_message: None,
                timestamp,
            });
            view.banner = None;
            view.busy = true;
            view
        }
        Action::Resolved {
            entry_id,
            image_id,
            image_data,
            seed,
        } => {
            let Some(entry) = view.loading_entry_mut(&entry_id) else {
                return view;
            };
            entry.status = EntryStatus::Ready;
            entry.image_data = Some(image_data);
            entry.seed = Some(seed.clone());
            view.last_image_id = Some(image_id);
            view.last_seed = Some(seed);
            view.busy = false;
            view
        }
        Action::Failed { entry_id, message } => {
            let Some(entry) = view.loading_entry_mut(&entry_id) else {
                return view;
            };
            entry.status = EntryStatus::Error;
            entry.error_message = Some(message.clone());
            view.raise_banner(message);
            view.busy = false;
            view
        }
        Action::ClearStarted => {
            if view.busy {
                return view;
            }
            view.busy = true;
            view
        }
        Action::Cleared => ThreadView {
            next_banner_id: view.next_banner_id,
            ..ThreadView::default()
        },
        Action::ClearFailed { message } => {
            view.raise_banner(message);
            view.busy = false;
            view
        }
        Action::DismissBanner { banner_id } => {
            if view.banner.as_ref().is_some_and(|banner| banner.id == banner_id) {
                view.banner = None;
            }
            view
        }
    }
}
