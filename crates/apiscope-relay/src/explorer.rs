//! Session controller: the current schema, open panels and the snippet view
//!
//! Sends and snippet fetches run in three steps. `begin_*` is synchronous:
//! it issues the panel's ticket and returns a task that owns everything the
//! relay call needs. The task's `run` future borrows nothing from the
//! explorer, so other panels, the snippet view and schema reloads stay usable
//! while it waits. `finish_*` hands the outcome back and applies it only if
//! its ticket is still the newest one. `send` and `show_snippet` chain the
//! three steps for callers that wait anyway.

use std::collections::HashMap;

use tracing::{debug, info};

use apiscope_core::{
    ApiSchema, Config, Endpoint, EndpointPanel, ExploreError, Language, RequestDescriptor,
    ResponseResult, SnippetPanel, SnippetView, Ticket,
};

use crate::docs::DocsClient;
use crate::executor::RequestExecutor;
use crate::snippet::SnippetClient;
use crate::transport::Relay;

/// An open panel and the epoch it was opened in.
#[derive(Debug)]
struct PanelSlot {
    epoch: u64,
    panel: EndpointPanel,
}

#[derive(Debug)]
pub struct Explorer<R> {
    executor: RequestExecutor<R>,
    snippets: SnippetClient<R>,
    docs: DocsClient<R>,
    schema: Option<ApiSchema>,
    base_url: Option<String>,
    path_defaults: HashMap<String, String>,
    query_defaults: HashMap<String, String>,
    panels: HashMap<usize, PanelSlot>,
    snippet_panel: SnippetPanel,
    snippet_epoch: u64,
    epoch: u64,
}

/// A send detached from the explorer.
#[derive(Debug)]
pub struct SendTask<R> {
    index: usize,
    epoch: u64,
    ticket: Ticket,
    request: RequestDescriptor,
    executor: RequestExecutor<R>,
}

/// Result of a [`SendTask`], to be passed to [`Explorer::finish_send`].
#[derive(Debug)]
pub struct SendOutcome {
    index: usize,
    epoch: u64,
    ticket: Ticket,
    result: Result<ResponseResult, ExploreError>,
}

impl<R: Relay> SendTask<R> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub async fn run(self) -> SendOutcome {
        let result = self.executor.try_execute(&self.request).await;
        SendOutcome {
            index: self.index,
            epoch: self.epoch,
            ticket: self.ticket,
            result,
        }
    }
}

impl SendOutcome {
    pub fn result(&self) -> &Result<ResponseResult, ExploreError> {
        &self.result
    }
}

/// A snippet fetch detached from the explorer.
#[derive(Debug)]
pub struct SnippetTask<R> {
    epoch: u64,
    ticket: Ticket,
    language: Language,
    endpoint: Endpoint,
    base_url: String,
    client: SnippetClient<R>,
}

/// Result of a [`SnippetTask`], to be passed to [`Explorer::finish_snippet`].
#[derive(Debug)]
pub struct SnippetOutcome {
    epoch: u64,
    ticket: Ticket,
    result: Result<String, ExploreError>,
}

impl<R: Relay> SnippetTask<R> {
    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn run(self) -> SnippetOutcome {
        let result = self
            .client
            .fetch(&self.endpoint, &self.base_url, self.language)
            .await;
        SnippetOutcome {
            epoch: self.epoch,
            ticket: self.ticket,
            result,
        }
    }
}

impl SnippetOutcome {
    pub fn result(&self) -> &Result<String, ExploreError> {
        &self.result
    }
}

impl<R: Relay> Explorer<R> {
    pub fn new(relay: R) -> Self {
        Self {
            executor: RequestExecutor::new(relay.clone()),
            snippets: SnippetClient::new(relay.clone()),
            docs: DocsClient::new(relay),
            schema: None,
            base_url: None,
            path_defaults: HashMap::new(),
            query_defaults: HashMap::new(),
            panels: HashMap::new(),
            snippet_panel: SnippetPanel::default(),
            snippet_epoch: 0,
            epoch: 0,
        }
    }

    /// Explorer with base URL override and input defaults from `config`.
    pub fn from_config(relay: R, config: &Config) -> Self {
        let mut explorer = Self::new(relay);
        explorer.base_url.clone_from(&config.base_url);
        explorer.path_defaults.clone_from(&config.path_params);
        explorer.query_defaults.clone_from(&config.query_params);
        explorer
    }

    fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Replace the current schema. Open panels and the snippet view belong
    /// to the old schema and are dropped; outcomes of their tasks are
    /// discarded.
    pub fn load_schema(&mut self, schema: ApiSchema) {
        info!(
            title = %schema.title,
            endpoints = schema.endpoints.len(),
            "schema loaded"
        );
        self.panels.clear();
        self.snippet_panel = SnippetPanel::default();
        self.snippet_epoch = self.next_epoch();
        self.schema = Some(schema);
    }

    /// Parse a documentation URL and make the result current.
    ///
    /// To keep the session usable during the parse, run
    /// `docs().clone().parse(url)` and pass the result to
    /// [`load_schema`](Self::load_schema) instead.
    ///
    /// # Errors
    ///
    /// Propagates relay failures; the previous schema stays loaded.
    pub async fn parse_documentation(&mut self, url: &str) -> Result<&ApiSchema, ExploreError> {
        let schema = self.docs.parse(url).await?;
        self.load_schema(schema);
        self.schema()
    }

    /// # Errors
    ///
    /// `EmptyState` when nothing has been loaded yet.
    pub fn schema(&self) -> Result<&ApiSchema, ExploreError> {
        self.schema
            .as_ref()
            .ok_or_else(|| ExploreError::empty_state("No API schema loaded"))
    }

    /// Base URL requests are built against: the override, else the schema's.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.schema.as_ref()?.base_url.as_deref())
    }

    fn endpoint(&self, index: usize) -> Result<&Endpoint, ExploreError> {
        self.schema()?
            .endpoints
            .get(index)
            .ok_or_else(|| ExploreError::empty_state(format!("No endpoint at index {index}")))
    }

    /// The panel for endpoint `index`, opened with defaults on first use.
    ///
    /// # Errors
    ///
    /// `EmptyState` when no schema is loaded or the index is out of range.
    pub fn open_panel(&mut self, index: usize) -> Result<&mut EndpointPanel, ExploreError> {
        if !self.panels.contains_key(&index) {
            let panel = EndpointPanel::open(self.endpoint(index)?, self.base_url())
                .with_defaults(&self.path_defaults, &self.query_defaults);
            debug!(endpoint = %panel.endpoint().label(), "panel opened");
            let epoch = self.next_epoch();
            self.panels.insert(index, PanelSlot { epoch, panel });
        }
        self.panels
            .get_mut(&index)
            .map(|slot| &mut slot.panel)
            .ok_or_else(|| ExploreError::empty_state(format!("No endpoint at index {index}")))
    }

    pub fn panel(&self, index: usize) -> Option<&EndpointPanel> {
        self.panels.get(&index).map(|slot| &slot.panel)
    }

    pub fn close_panel(&mut self, index: usize) {
        self.panels.remove(&index);
    }

    /// Start a send from panel `index` with its current inputs.
    ///
    /// # Errors
    ///
    /// `EmptyState` for a missing schema or endpoint, `Validation` for a body
    /// that is not JSON. No task exists in either case, so nothing is sent.
    pub fn begin_send(&mut self, index: usize) -> Result<SendTask<R>, ExploreError> {
        self.open_panel(index)?;
        let slot = self
            .panels
            .get_mut(&index)
            .ok_or_else(|| ExploreError::empty_state(format!("No endpoint at index {index}")))?;
        let pending = slot.panel.begin_send()?;
        Ok(SendTask {
            index,
            epoch: slot.epoch,
            ticket: pending.ticket,
            request: pending.request,
            executor: self.executor.clone(),
        })
    }

    /// Apply a send outcome to its panel.
    ///
    /// Returns `false` when the outcome is stale: a newer send was begun on
    /// the panel, or the panel was closed or replaced since.
    pub fn finish_send(&mut self, outcome: SendOutcome) -> bool {
        match self.panels.get_mut(&outcome.index) {
            Some(slot) if slot.epoch == outcome.epoch => {
                slot.panel.settle(outcome.ticket, outcome.result)
            }
            _ => {
                debug!(index = outcome.index, "discarding response for a closed panel");
                false
            }
        }
    }

    /// Send panel `index` and wait for the result, which is also shown in
    /// the panel.
    ///
    /// # Errors
    ///
    /// As [`begin_send`](Self::begin_send), plus `Network` and `Backend`
    /// when the relay call fails.
    pub async fn send(&mut self, index: usize) -> Result<ResponseResult, ExploreError> {
        let outcome = self.begin_send(index)?.run().await;
        let result = outcome.result.clone();
        self.finish_send(outcome);
        result
    }

    fn snippet_task(
        &self,
        index: usize,
        language: Language,
        ticket: Ticket,
    ) -> Result<SnippetTask<R>, ExploreError> {
        Ok(SnippetTask {
            epoch: self.snippet_epoch,
            ticket,
            language,
            endpoint: self.endpoint(index)?.clone(),
            base_url: self.base_url().unwrap_or_default().to_string(),
            client: self.snippets.clone(),
        })
    }

    /// Select endpoint `index` in `language` for the snippet view.
    ///
    /// Returns a fetch task when the (endpoint, language) pair changed; the
    /// view shows the loading placeholder until it is finished. `None`
    /// means the selection is unchanged.
    ///
    /// # Errors
    ///
    /// `EmptyState` for a missing schema or endpoint.
    pub fn begin_snippet(
        &mut self,
        index: usize,
        language: Language,
    ) -> Result<Option<SnippetTask<R>>, ExploreError> {
        self.endpoint(index)?;
        self.snippet_panel
            .select(index, language)
            .map(|ticket| self.snippet_task(index, language, ticket))
            .transpose()
    }

    /// Start a refetch of the active snippet.
    ///
    /// # Errors
    ///
    /// `EmptyState` when no snippet has been selected.
    pub fn begin_snippet_refresh(&mut self) -> Result<SnippetTask<R>, ExploreError> {
        let (index, language) = self
            .snippet_panel
            .active()
            .ok_or_else(|| ExploreError::empty_state("No snippet selected"))?;
        let ticket = self
            .snippet_panel
            .refresh()
            .ok_or_else(|| ExploreError::empty_state("No snippet selected"))?;
        self.snippet_task(index, language, ticket)
    }

    /// Apply a snippet outcome. Returns `false` for a stale one.
    pub fn finish_snippet(&mut self, outcome: SnippetOutcome) -> bool {
        if outcome.epoch != self.snippet_epoch {
            debug!("discarding snippet for a replaced schema");
            return false;
        }
        self.snippet_panel.settle(outcome.ticket, outcome.result)
    }

    /// Snippet for endpoint `index` in `language`.
    ///
    /// Fetches when the selection changed or the current view holds no
    /// snippet; otherwise returns the snippet already shown.
    ///
    /// # Errors
    ///
    /// `EmptyState` for a missing schema or endpoint; `Network`/`Backend`
    /// when the fetch fails (the view then shows the error placeholder).
    pub async fn show_snippet(
        &mut self,
        index: usize,
        language: Language,
    ) -> Result<String, ExploreError> {
        let task = match self.begin_snippet(index, language)? {
            Some(task) => task,
            None => {
                if let SnippetView::Ready(code) = self.snippet_panel.view() {
                    return Ok(code.clone());
                }
                self.begin_snippet_refresh()?
            }
        };
        self.complete_snippet(task).await
    }

    /// Refetch the active snippet and wait for it.
    ///
    /// # Errors
    ///
    /// `EmptyState` when no snippet has been selected, otherwise as
    /// [`show_snippet`](Self::show_snippet).
    pub async fn refresh_snippet(&mut self) -> Result<String, ExploreError> {
        let task = self.begin_snippet_refresh()?;
        self.complete_snippet(task).await
    }

    async fn complete_snippet(&mut self, task: SnippetTask<R>) -> Result<String, ExploreError> {
        let outcome = task.run().await;
        let result = outcome.result.clone();
        self.finish_snippet(outcome);
        result
    }

    pub fn snippet_view(&self) -> &SnippetView {
        self.snippet_panel.view()
    }

    pub fn executor(&self) -> &RequestExecutor<R> {
        &self.executor
    }

    pub fn snippets(&self) -> &SnippetClient<R> {
        &self.snippets
    }

    pub fn docs(&self) -> &DocsClient<R> {
        &self.docs
    }
}
