//! Panel session: explicit state, events, reducer and effect driver
//!
//! `reduce` is pure: it mutates the session state and returns the backend
//! calls to make. `PanelSession` runs those calls one at a time and feeds
//! each outcome back into the reducer as a completion event.

use std::collections::VecDeque;
use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use crate::channel_formats::ChannelFormatEditor;
use crate::directory::ParameterDirectory;
use crate::error::{Error, ErrorCode, Result};
use crate::importer::{self, ImportSource};
use crate::pagination::{Direction, Pagination};
use crate::protocol::{ActionObject, ParameterPage, RecordDraft, RecordPatch};
use crate::purge::{PurgeState, PURGE_WARNING};

// ─────────────────────────────────────────────────────────────────
// Notices
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// User-visible outcome of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Error code behind an error notice
    pub code: Option<ErrorCode>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            code: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    /// Error notice prefixed with what was being attempted
    pub fn failure(context: &str, error: &Error) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: format!("{}: {}", context, error),
            code: Some(error.code()),
        }
    }

    /// Error notice for an error that stands on its own
    pub fn from_error(error: &Error) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: error.to_string(),
            code: Some(error.code()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

// ─────────────────────────────────────────────────────────────────
// State, Events, Effects
// ─────────────────────────────────────────────────────────────────

/// Everything one panel session owns
#[derive(Debug, Clone)]
pub struct SessionState {
    pub agent_id: String,
    pub action_id: Option<String>,
    pub pagination: Pagination,
    /// The page currently on screen
    pub page: Option<ParameterPage>,
    pub purge: PurgeState,
    pub editor: ChannelFormatEditor,
    pub notices: Vec<Notice>,
}

impl SessionState {
    pub fn new(agent_id: impl Into<String>, action_id: Option<String>, pagination: Pagination) -> Self {
        Self {
            agent_id: agent_id.into(),
            action_id,
            pagination,
            page: None,
            purge: PurgeState::Idle,
            editor: ChannelFormatEditor::new(),
            notices: Vec::new(),
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn list_current(&self) -> Effect {
        Effect::ListParameters {
            page: self.pagination.current_page(),
            per_page: self.pagination.per_page(),
        }
    }
}

/// Operator actions and backend completions
#[derive(Debug)]
pub enum Event {
    Refresh,
    Paginate(Direction),
    ToggleEnabled(String),
    SaveRecord { id: String, draft: RecordDraft },
    Import(ImportSource),
    RequestPurge,
    ConfirmPurge,
    CancelPurge,
    LoadConfiguration,
    EditDirective { channel: String, text: String },
    SetConfigField { key: String, value: Value },
    CommitConfiguration,

    PageLoaded(Result<ParameterPage>),
    ParameterUpdated { id: String, result: Result<()> },
    ImportFinished { count: usize, result: Result<()> },
    PurgeFinished(Result<()>),
    ConfigurationLoaded(Result<Map<String, Value>>),
    ConfigurationCommitted(Result<ActionObject>),
}

impl Event {
    /// Log line for the event; import payloads are reduced to their source
    pub fn summary(&self) -> String {
        match self {
            Event::Import(source) => format!("Import({})", source.describe()),
            other => format!("{:?}", other),
        }
    }
}

/// Backend call requested by the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ListParameters { page: u32, per_page: u32 },
    UpdateParameter { id: String, patch: RecordPatch },
    ImportParameters(Vec<Map<String, Value>>),
    PurgeAll,
    GetAction,
    UpdateAction(Map<String, Value>),
}

impl Effect {
    /// Log line for the effect; imported records are reduced to a count
    pub fn summary(&self) -> String {
        match self {
            Effect::ImportParameters(records) => {
                format!("ImportParameters({} records)", records.len())
            }
            other => format!("{:?}", other),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Reducer
// ─────────────────────────────────────────────────────────────────

/// Apply one event; never performs I/O
pub fn reduce(state: &mut SessionState, event: Event) -> Vec<Effect> {
    match event {
        Event::Refresh => vec![state.list_current()],

        Event::Paginate(direction) => {
            match state.pagination.navigate(direction, state.page.as_ref()) {
                Some(page) => vec![Effect::ListParameters {
                    page,
                    per_page: state.pagination.per_page(),
                }],
                None => {
                    state.notify(Notice::info(format!("No {} page.", direction)));
                    Vec::new()
                }
            }
        }

        Event::ToggleEnabled(id) => {
            let current = state.page.as_ref().and_then(|p| p.find(&id)).map(|r| r.enabled);
            match current {
                Some(enabled) => vec![Effect::UpdateParameter {
                    id,
                    patch: RecordPatch::enabled(!enabled),
                }],
                None => {
                    state.notify(not_displayed(&id));
                    Vec::new()
                }
            }
        }

        Event::SaveRecord { id, draft } => {
            let patch = state
                .page
                .as_ref()
                .and_then(|p| p.find(&id))
                .map(|record| draft.diff(record));
            match patch {
                Some(patch) if patch.is_empty() => {
                    state.notify(Notice::info("No changes to save."));
                    Vec::new()
                }
                Some(patch) => vec![Effect::UpdateParameter { id, patch }],
                None => {
                    state.notify(not_displayed(&id));
                    Vec::new()
                }
            }
        }

        Event::Import(source) => match importer::normalize(&source) {
            Ok(records) => vec![Effect::ImportParameters(records)],
            Err(e) => {
                state.notify(Notice::from_error(&e));
                Vec::new()
            }
        },

        Event::RequestPurge => {
            state.purge.request();
            state.notify(Notice::warning(PURGE_WARNING));
            Vec::new()
        }

        Event::ConfirmPurge => {
            if state.purge.confirm() {
                vec![Effect::PurgeAll]
            } else {
                Vec::new()
            }
        }

        Event::CancelPurge => {
            if state.purge.is_awaiting() {
                state.notify(Notice::info("Purge cancelled."));
            }
            state.purge.cancel();
            Vec::new()
        }

        Event::LoadConfiguration => {
            if state.action_id.is_none() {
                state.notify(missing_action_id());
                Vec::new()
            } else if state.editor.is_seeded() {
                Vec::new()
            } else {
                vec![Effect::GetAction]
            }
        }

        Event::EditDirective { channel, text } => {
            if let Err(e) = state.editor.edit_directive(&channel, text) {
                state.notify(Notice::from_error(&e));
            }
            Vec::new()
        }

        Event::SetConfigField { key, value } => {
            if let Err(e) = state.editor.set_field(&key, value) {
                state.notify(Notice::from_error(&e));
            }
            Vec::new()
        }

        Event::CommitConfiguration => {
            if state.action_id.is_none() {
                state.notify(missing_action_id());
                return Vec::new();
            }
            match state.editor.snapshot() {
                Ok(config) => vec![Effect::UpdateAction(config)],
                Err(e) => {
                    state.notify(Notice::from_error(&e));
                    Vec::new()
                }
            }
        }

        // Completions

        Event::PageLoaded(Ok(page)) => {
            state.pagination.page_loaded(&page);
            state.page = Some(page);
            Vec::new()
        }
        Event::PageLoaded(Err(e)) => {
            state.pagination.revert(state.page.as_ref());
            state.notify(Notice::failure("Failed to load parameters", &e));
            Vec::new()
        }

        Event::ParameterUpdated { result: Ok(()), .. } => {
            state.notify(Notice::success("Changes saved successfully."));
            vec![state.list_current()]
        }
        Event::ParameterUpdated { id, result: Err(e) } => {
            state.notify(Notice::failure(&format!("Failed to update parameter {}", id), &e));
            Vec::new()
        }

        Event::ImportFinished { count, result: Ok(()) } => {
            state.notify(Notice::success(format!(
                "Agent parameters imported successfully ({} records)",
                count
            )));
            vec![state.list_current()]
        }
        Event::ImportFinished { result: Err(e), .. } => {
            state.notify(Notice::failure("Failed to import parameters", &e));
            Vec::new()
        }

        Event::PurgeFinished(Ok(())) => {
            state.notify(Notice::success("Collection purged successfully"));
            // Records on screen no longer exist; a failed refresh falls back to page 1
            state.page = None;
            state.pagination.reset();
            vec![state.list_current()]
        }
        Event::PurgeFinished(Err(e)) => {
            state.notify(Notice::failure("Failed to complete purge", &e));
            Vec::new()
        }

        Event::ConfigurationLoaded(Ok(config)) => {
            state.editor.seed(config);
            Vec::new()
        }
        Event::ConfigurationLoaded(Err(e)) => {
            state.notify(Notice::failure("Failed to load persona configuration", &e));
            Vec::new()
        }

        Event::ConfigurationCommitted(Ok(_)) => {
            state.editor.mark_saved();
            state.notify(Notice::success("Changes saved"));
            Vec::new()
        }
        Event::ConfigurationCommitted(Err(e)) => {
            state.notify(Notice::failure("Unable to save changes", &e));
            Vec::new()
        }
    }
}

fn not_displayed(id: &str) -> Notice {
    Notice::from_error(&Error::InvalidArgument(format!(
        "Parameter {} is not on the displayed page",
        id
    )))
}

fn missing_action_id() -> Notice {
    Notice::from_error(&Error::config_field_invalid(
        "session.action_id",
        "action_id is required for persona configuration",
    ))
}

// ─────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────

/// Runs reducer effects against the backend, one call at a time
pub struct PanelSession {
    directory: ParameterDirectory,
    state: SessionState,
}

impl PanelSession {
    pub fn new(directory: ParameterDirectory, state: SessionState) -> Self {
        Self { directory, state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drain notices produced so far
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.state.notices)
    }

    /// Feed an event and run every resulting backend call to completion
    pub async fn dispatch(&mut self, event: Event) {
        debug!(agent_id = %self.state.agent_id, event = %event.summary(), "Dispatching event");
        let mut queue: VecDeque<Effect> = reduce(&mut self.state, event).into();

        while let Some(effect) = queue.pop_front() {
            debug!(effect = %effect.summary(), "Executing effect");
            let completion = self.execute(effect).await;
            queue.extend(reduce(&mut self.state, completion));
        }
    }

    async fn execute(&self, effect: Effect) -> Event {
        let agent_id = self.state.agent_id.as_str();
        let action_id = self.state.action_id.as_deref().unwrap_or_default();

        match effect {
            Effect::ListParameters { page, per_page } => {
                Event::PageLoaded(self.directory.list(agent_id, page, per_page).await)
            }
            Effect::UpdateParameter { id, patch } => {
                let result = self.directory.update(agent_id, &id, &patch).await;
                Event::ParameterUpdated { id, result }
            }
            Effect::ImportParameters(records) => Event::ImportFinished {
                count: records.len(),
                result: self.directory.import_many(agent_id, &records).await,
            },
            Effect::PurgeAll => Event::PurgeFinished(self.directory.purge_all(agent_id).await),
            Effect::GetAction => {
                Event::ConfigurationLoaded(self.directory.get_action(agent_id, action_id).await)
            }
            Effect::UpdateAction(config) => Event::ConfigurationCommitted(
                self.directory.update_action(agent_id, action_id, &config).await,
            ),
        }
    }
}
