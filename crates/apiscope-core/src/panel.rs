//! Per-panel UI state with stale-response protection
//!
//! Each panel owns its own inputs and last result. A send or snippet fetch
//! is tagged with a [`Ticket`]; when the reply arrives it is applied only if
//! its ticket is still the panel's newest one. Replies to superseded calls
//! are dropped, so the latest *issued* call decides what is displayed, no
//! matter which reply settles last.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BodyParseError, ExploreError};
use crate::request::{RequestDescriptor, RequestInput, build_request};
use crate::result::ResponseResult;
use crate::schema::{Endpoint, Parameter};
use crate::template::ParamSplit;

/// Shown the instant a snippet refetch starts.
pub const SNIPPET_LOADING: &str = "Loading...";
/// Shown when a snippet fetch fails.
pub const SNIPPET_ERROR: &str = "Error loading snippet";

/// Generation tag for one outgoing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets and recognizes the newest one.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    current: u64,
}

impl GenerationGuard {
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}

/// Target language for code snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Curl,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::Python, Self::Javascript, Self::Curl];

    /// Identifier sent to the snippet generator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Javascript => "javascript",
            Self::Curl => "curl",
        }
    }

    /// Tab label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::Javascript => "NodeJs",
            Self::Curl => "CURL",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an endpoint panel currently displays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultView {
    #[default]
    Idle,
    Sending,
    Completed(ResponseResult),
    Failed(String),
}

/// A send that has been started but not settled.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub ticket: Ticket,
    pub request: RequestDescriptor,
}

/// State for one open endpoint panel.
#[derive(Debug)]
pub struct EndpointPanel {
    endpoint: Endpoint,
    base_url: Option<String>,
    split: ParamSplit,
    input: RequestInput,
    view: ResultView,
    guard: GenerationGuard,
}

impl EndpointPanel {
    pub fn open(endpoint: &Endpoint, base_url: Option<&str>) -> Self {
        Self {
            split: ParamSplit::of(endpoint),
            endpoint: endpoint.clone(),
            base_url: base_url.map(str::to_string),
            input: RequestInput::default(),
            view: ResultView::Idle,
            guard: GenerationGuard::default(),
        }
    }

    /// Pre-fill inputs from defaults. Only names this endpoint uses are taken.
    #[must_use]
    pub fn with_defaults(
        mut self,
        path_values: &HashMap<String, String>,
        query_values: &HashMap<String, String>,
    ) -> Self {
        for name in &self.split.path {
            if let Some(v) = path_values.get(name) {
                self.input.path_values.insert(name.clone(), v.clone());
            }
        }
        for p in &self.split.query {
            if let Some(v) = query_values.get(&p.name) {
                self.input.query_values.insert(p.name.clone(), v.clone());
            }
        }
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn path_parameters(&self) -> &[String] {
        &self.split.path
    }

    pub fn query_parameters(&self) -> &[Parameter] {
        &self.split.query
    }

    /// Whether the body editor applies to this endpoint.
    pub fn accepts_body(&self) -> bool {
        self.endpoint.carries_body()
    }

    pub fn input(&self) -> &RequestInput {
        &self.input
    }

    pub fn set_path_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.input.path_values.insert(name.into(), value.into());
    }

    pub fn set_query_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.input.query_values.insert(name.into(), value.into());
    }

    pub fn set_body(&mut self, text: impl Into<String>) {
        self.input.body_text = text.into();
    }

    pub fn view(&self) -> &ResultView {
        &self.view
    }

    /// Start a send: issue a ticket and build the request.
    ///
    /// The ticket is issued even when the body does not parse, so replies to
    /// earlier sends can no longer overwrite the error.
    ///
    /// # Errors
    ///
    /// Returns `BodyParseError` (and shows it) when the body is not JSON;
    /// nothing must be sent in that case.
    pub fn begin_send(&mut self) -> Result<PendingSend, BodyParseError> {
        let ticket = self.guard.issue();
        match build_request(&self.endpoint, self.base_url.as_deref(), &self.input) {
            Ok(request) => {
                self.view = ResultView::Sending;
                Ok(PendingSend { ticket, request })
            }
            Err(e) => {
                self.view = ResultView::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply a reply. Returns `false` (and changes nothing) for a stale ticket.
    pub fn settle(&mut self, ticket: Ticket, result: Result<ResponseResult, ExploreError>) -> bool {
        if !self.guard.is_current(ticket) {
            debug!(
                endpoint = %self.endpoint.label(),
                generation = ticket.generation(),
                "discarding stale response"
            );
            return false;
        }
        self.view = match result {
            Ok(r) => ResultView::Completed(r),
            Err(e) => ResultView::Failed(e.to_string()),
        };
        true
    }
}

/// What the snippet panel currently displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SnippetView {
    #[default]
    Empty,
    Loading,
    Ready(String),
    Failed(String),
}

impl SnippetView {
    /// Text to render, including placeholders.
    pub fn text(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Loading => SNIPPET_LOADING,
            Self::Ready(code) => code,
            Self::Failed(_) => SNIPPET_ERROR,
        }
    }
}

/// The code-snippet view, keyed by (endpoint index, language).
///
/// Indices are positions in the current schema; two endpoints sharing a
/// label are still distinct targets.
#[derive(Debug, Default)]
pub struct SnippetPanel {
    active: Option<(usize, Language)>,
    view: SnippetView,
    guard: GenerationGuard,
}

impl SnippetPanel {
    /// Record the active selection.
    ///
    /// Returns a ticket when the pair changed, meaning a fetch must be
    /// issued; the view switches to the loading placeholder immediately.
    /// Returns `None` when the selection is unchanged.
    pub fn select(&mut self, endpoint: usize, language: Language) -> Option<Ticket> {
        if self.active == Some((endpoint, language)) {
            return None;
        }
        self.active = Some((endpoint, language));
        Some(self.restart())
    }

    /// Force a refetch of the active selection.
    pub fn refresh(&mut self) -> Option<Ticket> {
        self.active.is_some().then(|| self.restart())
    }

    fn restart(&mut self) -> Ticket {
        self.view = SnippetView::Loading;
        self.guard.issue()
    }

    pub fn active(&self) -> Option<(usize, Language)> {
        self.active
    }

    pub fn view(&self) -> &SnippetView {
        &self.view
    }

    /// Apply a fetch result. Returns `false` (and changes nothing) for a
    /// stale ticket.
    pub fn settle(&mut self, ticket: Ticket, result: Result<String, ExploreError>) -> bool {
        if !self.guard.is_current(ticket) {
            debug!(generation = ticket.generation(), "discarding stale snippet");
            return false;
        }
        self.view = match result {
            Ok(code) => SnippetView::Ready(code),
            Err(e) => SnippetView::Failed(e.to_string()),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_user() -> Endpoint {
        Endpoint::new("GET", "/users/{id}")
            .with_parameter(Parameter::new("id").required())
            .with_parameter(Parameter::new("verbose"))
    }

    fn ok(status: u16) -> Result<ResponseResult, ExploreError> {
        Ok(ResponseResult {
            status_code: Some(status),
            is_healthy: (200..300).contains(&status),
            ..ResponseResult::default()
        })
    }

    #[test]
    fn guard_only_accepts_newest_ticket() {
        let mut guard = GenerationGuard::default();
        let a = guard.issue();
        let b = guard.issue();
        assert!(a < b);
        assert!(!guard.is_current(a));
        assert!(guard.is_current(b));
    }

    #[test]
    fn language_wire_names_and_labels() {
        assert_eq!(Language::Javascript.as_str(), "javascript");
        assert_eq!(Language::Javascript.label(), "NodeJs");
        assert_eq!(Language::Curl.label(), "CURL");
        let parsed: Language = serde_json::from_str("\"curl\"").unwrap();
        assert_eq!(parsed, Language::Curl);
        assert_eq!(Language::default(), Language::Python);
    }

    #[test]
    fn panel_splits_parameters() {
        let panel = EndpointPanel::open(&get_user(), Some("https://api.x.com"));
        assert_eq!(panel.path_parameters(), ["id".to_string()]);
        assert_eq!(panel.query_parameters().len(), 1);
        assert_eq!(panel.query_parameters()[0].name, "verbose");
        assert!(!panel.accepts_body());
        assert_eq!(panel.view(), &ResultView::Idle);
    }

    #[test]
    fn begin_send_builds_descriptor() {
        let mut panel = EndpointPanel::open(&get_user(), Some("https://api.x.com"));
        panel.set_path_value("id", "42");
        let pending = panel.begin_send().unwrap();
        assert_eq!(pending.request.url, "https://api.x.com/users/42");
        assert_eq!(panel.view(), &ResultView::Sending);
    }

    #[test]
    fn body_parse_failure_shows_error() {
        let mut panel = EndpointPanel::open(&Endpoint::new("PUT", "/x"), None);
        panel.set_body("{invalid");
        assert!(panel.begin_send().is_err());
        assert!(matches!(panel.view(), ResultView::Failed(m) if m.contains("not valid JSON")));
    }

    #[test]
    fn failed_body_parse_supersedes_in_flight_send() {
        let mut panel = EndpointPanel::open(&Endpoint::new("POST", "/x"), None);
        panel.set_body("{}");
        let first = panel.begin_send().unwrap();
        panel.set_body("{oops");
        assert!(panel.begin_send().is_err());
        assert!(!panel.settle(first.ticket, ok(200)));
        assert!(matches!(panel.view(), ResultView::Failed(_)));
    }

    #[test]
    fn stale_send_is_discarded_when_it_settles_last() {
        let mut panel = EndpointPanel::open(&get_user(), Some("http://h"));
        panel.set_path_value("id", "1");
        let first = panel.begin_send().unwrap();
        panel.set_path_value("id", "2");
        let second = panel.begin_send().unwrap();

        assert!(panel.settle(second.ticket, ok(404)));
        assert!(!panel.settle(first.ticket, ok(200)));

        match panel.view() {
            ResultView::Completed(r) => assert_eq!(r.status_code, Some(404)),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn settle_error_is_displayed() {
        let mut panel = EndpointPanel::open(&get_user(), None);
        let pending = panel.begin_send().unwrap();
        panel.settle(pending.ticket, Err(ExploreError::Network("refused".into())));
        assert_eq!(
            panel.view(),
            &ResultView::Failed("Cannot reach relay: refused".into())
        );
    }

    #[test]
    fn defaults_fill_only_known_names() {
        let path = HashMap::from([("id".to_string(), "7".to_string())]);
        let query = HashMap::from([
            ("verbose".to_string(), "1".to_string()),
            ("other".to_string(), "x".to_string()),
        ]);
        let panel = EndpointPanel::open(&get_user(), None).with_defaults(&path, &query);
        assert_eq!(panel.input().path_values.get("id").map(String::as_str), Some("7"));
        assert_eq!(panel.input().query_values.len(), 1);
    }

    #[test]
    fn snippet_select_only_refetches_on_change() {
        let mut snippets = SnippetPanel::default();
        assert!(snippets.select(0, Language::Python).is_some());
        assert_eq!(snippets.view(), &SnippetView::Loading);
        assert!(snippets.select(0, Language::Python).is_none());
        assert!(snippets.select(0, Language::Curl).is_some());
        assert!(snippets.select(1, Language::Curl).is_some());
        assert_eq!(snippets.active(), Some((1, Language::Curl)));
    }

    #[test]
    fn snippet_loading_placeholder_replaces_previous_text() {
        let mut snippets = SnippetPanel::default();
        let t = snippets.select(0, Language::Python).unwrap();
        snippets.settle(t, Ok("print(1)".into()));
        assert_eq!(snippets.view().text(), "print(1)");
        snippets.select(0, Language::Curl);
        assert_eq!(snippets.view().text(), SNIPPET_LOADING);
    }

    #[test]
    fn overlapping_snippet_fetches_keep_latest_selection() {
        let mut snippets = SnippetPanel::default();
        let python = snippets.select(0, Language::Python).unwrap();
        let curl = snippets.select(0, Language::Curl).unwrap();

        // The curl reply settles first, the python reply last.
        assert!(snippets.settle(curl, Ok("curl https://x/a".into())));
        assert!(!snippets.settle(python, Ok("import requests".into())));

        assert_eq!(snippets.view().text(), "curl https://x/a");
    }

    #[test]
    fn snippet_failure_shows_error_placeholder() {
        let mut snippets = SnippetPanel::default();
        let t = snippets.select(0, Language::Python).unwrap();
        snippets.settle(t, Err(ExploreError::Network("down".into())));
        assert_eq!(snippets.view().text(), SNIPPET_ERROR);
    }

    #[test]
    fn refresh_requires_a_selection() {
        let mut snippets = SnippetPanel::default();
        assert!(snippets.refresh().is_none());
        let first = snippets.select(0, Language::Python).unwrap();
        let again = snippets.refresh().unwrap();
        assert!(again > first);
    }

    #[test]
    fn same_language_on_another_endpoint_refetches() {
        let mut snippets = SnippetPanel::default();
        let first = snippets.select(0, Language::Python).unwrap();
        snippets.settle(first, Ok("requests.get(\"/items\")".into()));
        assert!(snippets.select(1, Language::Python).is_some());
        assert_eq!(snippets.view(), &SnippetView::Loading);
        assert_eq!(snippets.active(), Some((1, Language::Python)));
    }
}
