//! The approval state machine and the publish gate.
//!
//! State lives under one store key as a JSON object mapping document path
//! to [`ApprovalRecord`]. Every write is a whole-map read-modify-write and
//! the last writer wins. There is no transition validation: any status may
//! follow any other.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use panelgate_contracts::{
    approval::{ApprovalRecord, ApprovalStatus},
    error::{GateError, GateResult},
    message::{Notice, OutboundMessage, PanelState, StateReply, StateRequest},
};
use panelgate_core::traits::{KeyValueStore, Location, PageWindow};

use crate::config::WorkflowConfig;

/// Path → record, as persisted.
pub type ApprovalMap = BTreeMap<String, ApprovalRecord>;

/// Outcome of a publish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishDecision {
    /// The document is not approved. The user was notified; nothing opened.
    Blocked { status: ApprovalStatus },
    /// The live URL was opened in a new window.
    Opened { url: String },
}

impl PublishDecision {
    pub fn is_opened(&self) -> bool {
        matches!(self, PublishDecision::Opened { .. })
    }
}

/// Per-document approval workflow over an injected store.
pub struct ApprovalWorkflow<S> {
    store: S,
    config: WorkflowConfig,
}

impl<S: KeyValueStore> ApprovalWorkflow<S> {
    pub fn new(store: S, config: WorkflowConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored map with each record left undecoded.
    ///
    /// A payload that is not a JSON object reads as an empty map; store IO
    /// failures propagate.
    fn raw_records(&self) -> GateResult<BTreeMap<String, Value>> {
        let key = &self.config.storage_key;
        let Some(raw) = self.store.get(key)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(key = %key, error = %e, "stored approval state is corrupt; treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Every stored record that decodes. Unreadable entries are skipped.
    pub fn records(&self) -> GateResult<ApprovalMap> {
        Ok(self
            .raw_records()?
            .into_iter()
            .filter_map(|(path, value)| decode_record(&path, value).map(|record| (path, record)))
            .collect())
    }

    /// The record for `path`, or the implicit draft. Never fails.
    pub fn get_status(&self, path: &str) -> ApprovalRecord {
        match self.raw_records() {
            Ok(mut map) => map
                .remove(path)
                .and_then(|value| decode_record(path, value))
                .unwrap_or_else(ApprovalRecord::implicit_draft),
            Err(e) => {
                warn!(path = %path, error = %e, "approval state unreadable; reporting draft");
                ApprovalRecord::implicit_draft()
            }
        }
    }

    /// Replace the record for `path` with `{status, comments, updated: now}`.
    ///
    /// Other entries are written back exactly as they were read, including
    /// ones that do not decode.
    pub fn set_status(
        &self,
        path: &str,
        status: impl Into<ApprovalStatus>,
        comments: &str,
    ) -> GateResult<ApprovalRecord> {
        let record = ApprovalRecord::written(status.into(), comments);

        let mut map = self.raw_records()?;
        let value = serde_json::to_value(&record).map_err(|e| GateError::Serialization {
            reason: format!("failed to encode approval record: {}", e),
        })?;
        map.insert(path.to_string(), value);
        let encoded = serde_json::to_string(&map).map_err(|e| GateError::Serialization {
            reason: format!("failed to encode approval state: {}", e),
        })?;
        self.store.set(&self.config.storage_key, &encoded)?;

        info!(path = %path, status = %record.status, "approval status set");
        Ok(record)
    }

    /// Publish intent: open the live URL if the current document is approved.
    pub fn request_publish<W: PageWindow + ?Sized>(&self, window: &W) -> PublishDecision {
        let location = window.location();
        let path = location.path();
        let record = self.get_status(path);

        if !record.status.is_approved() {
            info!(path = %path, status = %record.status, "publish blocked; document not approved");
            window.alert(&Notice::PublishDenied);
            return PublishDecision::Blocked { status: record.status };
        }

        let url = self.live_url(location.href.as_str());
        info!(path = %path, url = %url, "publishing to live");
        window.open(&url);
        PublishDecision::Opened { url }
    }

    /// Preview intent: open the preview counterpart of the current URL.
    pub fn open_preview<W: PageWindow + ?Sized>(&self, window: &W) -> String {
        let url = self.preview_url(window.location().href.as_str());
        debug!(url = %url, "opening preview");
        window.open(&url);
        url
    }

    /// Edit intent: documents are edited outside the panel.
    pub fn edit_notice<W: PageWindow + ?Sized>(&self, window: &W) {
        window.alert(&Notice::EditInstructions);
    }

    /// Answer a cross-context state query.
    ///
    /// Returns a reply addressed to `origin` only for a `getState` request
    /// from an allow-listed origin.
    pub fn handle_message(&self, origin: &str, data: &Value, location: &Location) -> Option<OutboundMessage> {
        let Some(_request) = StateRequest::from_value(data) else {
            debug!(origin = %origin, "ignoring message that is not a state request");
            return None;
        };
        if !self.config.allowed_origins.iter().any(|allowed| allowed == origin) {
            warn!(origin = %origin, "state request from origin not on the allow-list; ignored");
            return None;
        }

        let path = location.path().to_string();
        let status = self.get_status(&path);
        debug!(origin = %origin, path = %path, status = %status.status, "answering state request");
        Some(OutboundMessage {
            target_origin: origin.to_string(),
            body: StateReply {
                sidekick: PanelState { location: path, status },
            },
        })
    }

    /// `href` with its first preview marker replaced by the live marker.
    pub fn live_url(&self, href: &str) -> String {
        replace_first(href, &self.config.preview_marker, &self.config.live_marker)
    }

    /// `href` with its first live marker replaced by the preview marker.
    pub fn preview_url(&self, href: &str) -> String {
        replace_first(href, &self.config.live_marker, &self.config.preview_marker)
    }
}

fn decode_record(path: &str, value: Value) -> Option<ApprovalRecord> {
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path, error = %e, "unreadable approval record skipped");
            None
        }
    }
}

fn replace_first(s: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return s.to_string();
    }
    s.replacen(from, to, 1)
}
