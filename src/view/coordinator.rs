//! View coordinator: the state machine behind the history tables.
//!
//! The coordinator owns the installed datasets and the [`ViewState`], and
//! changes them only in [`Coordinator::handle`], one [`ViewEvent`] at a time.
//! Anything that has to leave the process (an upload, a remote sort) is
//! returned as an [`Effect`] for the caller to run; its result comes back as
//! another event.
//!
//! # Derivation
//!
//! The ordered sequence is always derived the same way: select the dataset of
//! the active granularity, filter it, then sort it. Filtering comes first so
//! the stats only cover matching rows.
//!
//! Up to `remote_sort_threshold` matching rows are sorted locally. Above that
//! the sort is delegated: the coordinator emits [`Effect::RemoteSort`], shows
//! the current base order in the meantime, and swaps in the backend's order
//! once the matching response arrives.
//!
//! # Stale responses
//!
//! Every upload and every remote sort carries an id from a counter that only
//! grows. Only the latest upload, and the latest sort per granularity, may
//! land; anything else is logged and dropped.

use tracing::{debug, info, warn};

use super::filter::{SearchTerm, matching_indices};
use super::sort::{SortDirection, SortSpec, sort_indices};
use super::window::{WindowConfig, window};
use crate::model::{Column, Dataset, Datasets, Granularity, Record, Row};

/// Above this many matching rows, sorting is handed to the backend.
pub const DEFAULT_REMOTE_SORT_THRESHOLD: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub window: WindowConfig,
    pub remote_sort_threshold: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            remote_sort_threshold: DEFAULT_REMOTE_SORT_THRESHOLD,
        }
    }
}

impl CoordinatorSettings {
    /// Settings that never delegate sorting.
    pub fn local_only(self) -> Self {
        Self {
            remote_sort_threshold: usize::MAX,
            ..self
        }
    }
}

/// What the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub granularity: Granularity,
    /// Last clicked column, `None` until the first click.
    pub sort_key: Option<Column>,
    pub sort_direction: SortDirection,
    pub filter_term: String,
    pub visible_count: usize,
}

impl ViewState {
    fn new(initial_rows: usize) -> Self {
        Self {
            granularity: Granularity::default(),
            sort_key: None,
            sort_direction: SortDirection::Desc,
            filter_term: String::new(),
            visible_count: initial_rows,
        }
    }

    /// Sort actually applied at the current granularity.
    ///
    /// A key the schema lacks falls back to the default sort; the stored key
    /// is kept for when a granularity that has it comes back.
    pub fn effective_sort(&self) -> SortSpec {
        match self.sort_key {
            Some(column) if self.granularity.has_column(column) => SortSpec {
                column,
                direction: self.sort_direction,
            },
            Some(_) => SortSpec::default_for(self.granularity),
            None => SortSpec {
                column: self.granularity.default_sort_key(),
                direction: self.sort_direction,
            },
        }
    }
}

/// A delegated sort, as sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRequest {
    pub id: u64,
    pub granularity: Granularity,
    pub spec: SortSpec,
}

/// Statistics over the filtered sequence, independent of the window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub total_plays: u64,
    pub total_minutes: f64,
}

impl Stats {
    fn over<R: Record>(rows: &[R], order: &[usize]) -> Self {
        order.iter().fold(Self::default(), |acc, &i| Self {
            count: acc.count + 1,
            total_plays: acc.total_plays + rows[i].plays(),
            total_minutes: acc.total_minutes + rows[i].minutes_played(),
        })
    }
}

/// Discrete user actions and collaborator completions.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A file was dropped; an upload is about to start.
    UploadRequested,
    UploadCompleted {
        id: u64,
        outcome: Result<Datasets, String>,
    },
    /// Datasets produced without an upload (e.g. read from disk).
    DatasetsLoaded(Datasets),
    GranularityChanged(Granularity),
    FilterChanged(String),
    SortClicked(Column),
    RevealMore,
    RemoteSortCompleted {
        request: SortRequest,
        outcome: Result<Dataset, String>,
    },
}

/// Work the caller must perform on the coordinator's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Upload { id: u64 },
    RemoteSort(SortRequest),
}

/// Coarse state for the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing uploaded yet.
    Idle,
    Uploading,
    /// The last upload failed; no dataset from it was installed.
    Failed(String),
    /// Data is installed, but nothing matches.
    NoData,
    Ready,
}

/// One exposed page of the ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: Vec<Row<'a>>,
    pub has_more: bool,
    /// Length of the full ordered sequence.
    pub total: usize,
}

#[derive(Debug, Default)]
struct Derived {
    /// Indices into the active base dataset, filtered and ordered.
    order: Vec<usize>,
    stats: Stats,
}

pub struct Coordinator {
    settings: CoordinatorSettings,
    state: ViewState,
    datasets: Option<[Dataset; 3]>,
    /// Order each base dataset is known to carry from a remote sort.
    base_order: [Option<SortSpec>; 3],
    pending: [Option<SortRequest>; 3],
    next_request_id: u64,
    upload_in_flight: Option<u64>,
    upload_error: Option<String>,
    next_upload_id: u64,
    notice: Option<String>,
    derived: Derived,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorSettings::default())
    }
}

impl Coordinator {
    pub fn new(settings: CoordinatorSettings) -> Self {
        Self {
            settings,
            state: ViewState::new(settings.window.initial),
            datasets: None,
            base_order: [None; 3],
            pending: [None; 3],
            next_request_id: 0,
            upload_in_flight: None,
            upload_error: None,
            next_upload_id: 0,
            notice: None,
            derived: Derived::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn stats(&self) -> Stats {
        self.derived.stats
    }

    /// Columns of the active granularity.
    pub fn columns(&self) -> &'static [Column] {
        self.state.granularity.columns()
    }

    pub fn active_sort(&self) -> SortSpec {
        self.state.effective_sort()
    }

    pub fn status(&self) -> Status {
        if self.upload_in_flight.is_some() {
            return Status::Uploading;
        }
        if let Some(message) = &self.upload_error {
            return Status::Failed(message.clone());
        }
        match &self.datasets {
            None => Status::Idle,
            Some(_) if self.derived.order.is_empty() => Status::NoData,
            Some(_) => Status::Ready,
        }
    }

    /// Whether a remote sort is pending for `granularity`.
    pub fn is_busy(&self, granularity: Granularity) -> bool {
        self.pending[granularity.index()].is_some()
    }

    /// Last non-fatal problem worth showing, e.g. a failed remote sort.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The exposed window of the ordered sequence.
    pub fn page(&self) -> Page<'_> {
        let w = window(&self.derived.order, self.state.visible_count);
        Page {
            rows: w.visible.iter().filter_map(|&i| self.row_at(i)).collect(),
            has_more: w.has_more,
            total: self.derived.order.len(),
        }
    }

    /// The full ordered sequence, ignoring the window.
    pub fn ordered_rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.derived.order.iter().filter_map(|&i| self.row_at(i))
    }

    fn row_at(&self, index: usize) -> Option<Row<'_>> {
        self.datasets.as_ref()?[self.state.granularity.index()].row(index)
    }

    /// Apply one event and return the work it requires.
    pub fn handle(&mut self, event: ViewEvent) -> Effect {
        match event {
            ViewEvent::UploadRequested => {
                self.next_upload_id += 1;
                let id = self.next_upload_id;
                if let Some(previous) = self.upload_in_flight.replace(id) {
                    debug!(previous, id, "Upload superseded");
                }
                self.upload_error = None;
                Effect::Upload { id }
            }
            ViewEvent::UploadCompleted { id, outcome } => {
                if self.upload_in_flight != Some(id) {
                    warn!(id, "Discarding stale upload response");
                    return Effect::None;
                }
                self.upload_in_flight = None;
                match outcome {
                    Ok(datasets) => self.install(datasets),
                    Err(message) => {
                        warn!("Upload failed: {}", message);
                        self.upload_error = Some(message);
                        Effect::None
                    }
                }
            }
            ViewEvent::DatasetsLoaded(datasets) => {
                self.upload_error = None;
                self.install(datasets)
            }
            ViewEvent::GranularityChanged(granularity) => {
                if granularity == self.state.granularity {
                    return Effect::None;
                }
                self.state.granularity = granularity;
                self.rederive()
            }
            ViewEvent::FilterChanged(term) => {
                if term == self.state.filter_term {
                    return Effect::None;
                }
                self.state.filter_term = term;
                self.rederive()
            }
            ViewEvent::SortClicked(column) => {
                if !self.state.granularity.has_column(column) {
                    debug!(?column, granularity = %self.state.granularity, "Ignoring sort on absent column");
                    return Effect::None;
                }
                let spec = self.state.effective_sort().toggled(column);
                self.state.sort_key = Some(spec.column);
                self.state.sort_direction = spec.direction;
                self.rederive()
            }
            ViewEvent::RevealMore => {
                self.state.visible_count = self
                    .settings
                    .window
                    .grow(self.state.visible_count, self.derived.order.len());
                Effect::None
            }
            ViewEvent::RemoteSortCompleted { request, outcome } => {
                self.complete_remote_sort(request, outcome)
            }
        }
    }

    fn install(&mut self, datasets: Datasets) -> Effect {
        info!(
            songs = datasets.songs.len(),
            albums = datasets.albums.len(),
            artists = datasets.artists.len(),
            "Installing listening history"
        );
        self.datasets = Some(datasets.into_parts());
        self.base_order = [None; 3];
        // responses for the previous upload must not land on this one
        self.pending = [None; 3];
        self.notice = None;
        self.rederive()
    }

    fn complete_remote_sort(
        &mut self,
        request: SortRequest,
        outcome: Result<Dataset, String>,
    ) -> Effect {
        let slot = request.granularity.index();
        if self.pending[slot] != Some(request) {
            warn!(id = request.id, granularity = %request.granularity, "Discarding stale sort response");
            return Effect::None;
        }
        self.pending[slot] = None;

        let dataset = match outcome {
            Ok(dataset) if dataset.granularity() == request.granularity => dataset,
            Ok(dataset) => {
                warn!(
                    expected = %request.granularity,
                    actual = %dataset.granularity(),
                    "Remote sort returned the wrong granularity, keeping current order"
                );
                self.notice = Some("Sort failed: unexpected response".to_string());
                return Effect::None;
            }
            Err(message) => {
                warn!("Remote sort failed, keeping current order: {}", message);
                self.notice = Some(format!("Sort failed: {message}"));
                return Effect::None;
            }
        };

        let Some(datasets) = self.datasets.as_mut() else {
            return Effect::None;
        };
        debug!(id = request.id, rows = dataset.len(), "Applying remote sort");
        datasets[slot] = dataset;
        self.base_order[slot] = Some(request.spec);
        self.notice = None;

        if request.granularity == self.state.granularity {
            self.rederive()
        } else {
            Effect::None
        }
    }

    /// Recompute the ordered sequence and stats, and reset the window.
    fn rederive(&mut self) -> Effect {
        let granularity = self.state.granularity;
        let slot = granularity.index();
        let spec = self.state.effective_sort();
        let term = SearchTerm::new(&self.state.filter_term);

        let Some(datasets) = self.datasets.as_ref() else {
            self.derived = Derived::default();
            return Effect::None;
        };

        let dataset = &datasets[slot];
        let mut order = filtered(dataset, &term);
        let delegate = order.len() > self.settings.remote_sort_threshold;
        if !delegate {
            sort_local(dataset, &mut order, spec);
        }
        let stats = stats_over(dataset, &order);

        debug!(
            %granularity,
            rows = order.len(),
            column = %spec.column,
            direction = %spec.direction,
            delegate,
            "Derived view"
        );
        self.derived = Derived { order, stats };
        self.state.visible_count = self.settings.window.initial;

        if !delegate || self.base_order[slot] == Some(spec) {
            if let Some(stale) = self.pending[slot].take() {
                debug!(id = stale.id, "Remote sort no longer needed");
            }
            return Effect::None;
        }
        self.request_remote_sort(granularity, spec)
    }

    fn request_remote_sort(&mut self, granularity: Granularity, spec: SortSpec) -> Effect {
        let slot = granularity.index();
        if let Some(pending) = self.pending[slot] {
            if pending.spec == spec {
                return Effect::None;
            }
        }
        self.next_request_id += 1;
        let request = SortRequest {
            id: self.next_request_id,
            granularity,
            spec,
        };
        self.pending[slot] = Some(request);
        Effect::RemoteSort(request)
    }
}

fn filtered(dataset: &Dataset, term: &SearchTerm) -> Vec<usize> {
    match dataset {
        Dataset::Songs(rows) => matching_indices(rows, term),
        Dataset::Albums(rows) => matching_indices(rows, term),
        Dataset::Artists(rows) => matching_indices(rows, term),
    }
}

fn sort_local(dataset: &Dataset, order: &mut [usize], spec: SortSpec) {
    match dataset {
        Dataset::Songs(rows) => sort_indices(rows, order, spec),
        Dataset::Albums(rows) => sort_indices(rows, order, spec),
        Dataset::Artists(rows) => sort_indices(rows, order, spec),
    }
}

fn stats_over(dataset: &Dataset, order: &[usize]) -> Stats {
    match dataset {
        Dataset::Songs(rows) => Stats::over(rows, order),
        Dataset::Albums(rows) => Stats::over(rows, order),
        Dataset::Artists(rows) => Stats::over(rows, order),
    }
}
