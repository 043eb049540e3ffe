use crate::connect::{detector_for, fetcher_for};
use crate::state::{LoadOutcome, LoadTicket, LoadedSheet, SearchOutcome, SessionState};
use sheetseek_config::{ConfigPatch, ConfigStore, SourceConfig};
use sheetseek_core::{
    DetectedFields, FieldConstraint, Grid, SeekError, SeekResult, SheetInfo, Table,
};
use sheetseek_http::GridFetcher;
use sheetseek_sheet::{find_match, normalize, FieldDetector};
use std::future::Future;
use std::sync::Arc;

/// Drives one user's browsing of one source: load a sheet, propose fields,
/// resolve searches.
///
/// The session owns the current table and discards it whenever another
/// sheet is selected. Loads are split into [`begin_load`] and
/// [`complete_load`] so a caller can run the fetch elsewhere; a result
/// arriving for a superseded ticket is dropped.
///
/// [`begin_load`]: SearchSession::begin_load
/// [`complete_load`]: SearchSession::complete_load
pub struct SearchSession {
    fetcher: Arc<dyn GridFetcher>,
    source_id: String,
    detector: FieldDetector,
    remembered_fields: Vec<String>,
    store: Option<Arc<dyn ConfigStore>>,
    state: SessionState,
    current_sheet: Option<String>,
    loaded: Option<LoadedSheet>,
    generation: u64,
}

impl SearchSession {
    /// Create a session over an explicit fetcher.
    ///
    /// # Errors
    ///
    /// `ConfigurationMissing` when the source identifier is blank.
    pub fn new(fetcher: Arc<dyn GridFetcher>, config: &SourceConfig) -> SeekResult<Self> {
        let source_id = config.source_id.trim();
        if source_id.is_empty() {
            return Err(SeekError::config_missing("sourceId"));
        }
        Ok(Self {
            fetcher,
            source_id: source_id.to_string(),
            detector: detector_for(config),
            remembered_fields: config.last_selected_fields.clone(),
            store: None,
            state: SessionState::Idle,
            current_sheet: None,
            loaded: None,
            generation: 0,
        })
    }

    /// Create a session from stored configuration, choosing the transport it
    /// names. Fields used by successful searches are written back to `store`.
    pub fn connect(store: Arc<dyn ConfigStore>) -> SeekResult<Self> {
        let config = store.get_config()?;
        let fetcher = fetcher_for(&config)?;
        let mut session = Self::new(fetcher, &config)?;
        session.store = Some(store);
        Ok(session)
    }

    /// Persist searched fields to this store after each hit.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name of the sheet being loaded or loaded last.
    pub fn current_sheet(&self) -> Option<&str> {
        self.current_sheet.as_deref()
    }

    pub fn loaded(&self) -> Option<&LoadedSheet> {
        self.loaded.as_ref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.loaded.as_ref().map(|l| &l.table)
    }

    pub fn detected_fields(&self) -> Option<&DetectedFields> {
        self.loaded.as_ref().map(|l| &l.detected)
    }

    /// Whether a search can run: a sheet is loaded and it has headers.
    pub fn can_search(&self) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|l| l.detected.is_usable())
    }

    /// Fields to pre-fill the search form with.
    ///
    /// Fields remembered from the last successful search win when the loaded
    /// table still has all of them; otherwise the detected fields are used.
    pub fn proposed_fields(&self) -> Vec<String> {
        let Some(loaded) = &self.loaded else {
            return Vec::new();
        };
        let remembered_fit = !self.remembered_fields.is_empty()
            && self
                .remembered_fields
                .iter()
                .all(|f| loaded.table.has_header(f));
        if remembered_fit {
            self.remembered_fields.clone()
        } else {
            loaded.detected.as_fields()
        }
    }

    /// List the sheets of the source. Does not change the session state.
    pub async fn list_sheets(&self) -> SeekResult<Vec<SheetInfo>> {
        self.fetcher.fetch_available_sheets(&self.source_id).await
    }

    /// Select a sheet and start loading it. Any previously loaded table is
    /// discarded and any earlier ticket becomes stale.
    pub fn begin_load(&mut self, sheet: &str) -> LoadTicket {
        self.generation += 1;
        self.loaded = None;
        self.current_sheet = Some(sheet.to_string());
        self.state = SessionState::SheetLoading {
            sheet: sheet.to_string(),
        };
        LoadTicket {
            generation: self.generation,
            sheet: sheet.to_string(),
        }
    }

    /// The fetch for a ticket, detached from the session so it can be
    /// spawned or raced.
    pub fn fetch_for(
        &self,
        ticket: &LoadTicket,
    ) -> impl Future<Output = SeekResult<Grid>> + Send + 'static {
        let fetcher = Arc::clone(&self.fetcher);
        let source_id = self.source_id.clone();
        let sheet = ticket.sheet.clone();
        async move { fetcher.fetch_grid(&source_id, &sheet).await }
    }

    /// Apply the result of a fetch.
    ///
    /// # Errors
    ///
    /// Fetch failures other than a missing sheet return the session to
    /// `Idle` with no sheet selected and are handed back to the caller.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: SeekResult<Grid>,
    ) -> SeekResult<LoadOutcome> {
        if ticket.generation != self.generation {
            tracing::debug!(sheet = %ticket.sheet, "discarding stale sheet load");
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(grid) => {
                let table = normalize(&ticket.sheet, &grid);
                tracing::info!(
                    sheet = %ticket.sheet,
                    rows = table.record_count(),
                    columns = table.headers.len(),
                    "sheet loaded"
                );
                self.install(table);
                Ok(LoadOutcome::Ready)
            }
            Err(SeekError::NotFound { sheet }) => {
                tracing::warn!(sheet = %sheet, "sheet unavailable, using an empty table");
                self.install(Table::empty(&ticket.sheet));
                Ok(LoadOutcome::Unavailable { sheet })
            }
            Err(e) => {
                tracing::warn!(sheet = %ticket.sheet, "sheet load failed: {e}");
                self.loaded = None;
                self.current_sheet = None;
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Select and load a sheet in one step.
    pub async fn load_sheet(&mut self, sheet: &str) -> SeekResult<LoadOutcome> {
        let ticket = self.begin_load(sheet);
        let result = self.fetch_for(&ticket).await;
        self.complete_load(ticket, result)
    }

    fn install(&mut self, table: Table) {
        let detected = self.detector.detect(&table.headers);
        self.loaded = Some(LoadedSheet { table, detected });
        self.state = SessionState::SheetReady;
    }

    /// Resolve constraints against the loaded sheet.
    ///
    /// An empty constraint list means "not searching yet": it returns
    /// `NotFound` and leaves the state untouched.
    ///
    /// # Errors
    ///
    /// `NoSheetSelected` when no sheet is loaded, `SearchDisabled` when the
    /// loaded sheet has no headers. Neither changes the state.
    pub fn search(&mut self, constraints: &[FieldConstraint]) -> SeekResult<SearchOutcome> {
        let loaded = searchable(self.loaded.as_ref())?;
        if constraints.is_empty() {
            return Ok(SearchOutcome::NotFound);
        }

        self.state = SessionState::Searching;
        let outcome = match find_match(&loaded.table, constraints) {
            Some(record) => SearchOutcome::Found(record.clone()),
            None => SearchOutcome::NotFound,
        };
        tracing::debug!(
            constraints = constraints.len(),
            found = outcome.record().is_some(),
            "search resolved"
        );

        if outcome.record().is_some() {
            let fields: Vec<String> = constraints.iter().map(|c| c.field.clone()).collect();
            self.remember(fields);
        }
        self.state = SessionState::Resolved(outcome.clone());
        Ok(outcome)
    }

    /// Search the first proposed field for a single value.
    pub fn search_value(&mut self, value: &str) -> SeekResult<SearchOutcome> {
        searchable(self.loaded.as_ref())?;
        let Some(constraint) = self.value_constraint(value) else {
            return Ok(SearchOutcome::NotFound);
        };
        self.search(&[constraint])
    }

    /// The constraint [`search_value`] builds: the first proposed field
    /// paired with `value`.
    ///
    /// [`search_value`]: SearchSession::search_value
    pub fn value_constraint(&self, value: &str) -> Option<FieldConstraint> {
        self.proposed_fields()
            .into_iter()
            .next()
            .map(|field| FieldConstraint::new(field, value))
    }

    fn remember(&mut self, fields: Vec<String>) {
        if fields == self.remembered_fields {
            return;
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.set_config(ConfigPatch::selected_fields(fields.clone())) {
                tracing::warn!("could not save selected fields: {e}");
            }
        }
        self.remembered_fields = fields;
    }

    /// Drop the loaded sheet and return to `Idle`, invalidating any load in
    /// flight.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.loaded = None;
        self.current_sheet = None;
        self.state = SessionState::Idle;
    }
}

/// The loaded sheet, provided it has fields to search by.
fn searchable(loaded: Option<&LoadedSheet>) -> SeekResult<&LoadedSheet> {
    let loaded = loaded.ok_or(SeekError::NoSheetSelected)?;
    if !loaded.detected.is_usable() {
        return Err(SeekError::SearchDisabled {
            sheet: loaded.table.sheet_name.clone(),
        });
    }
    Ok(loaded)
}
