use std::sync::Arc;

use ratatui::widgets::ListState;
use tracing::{debug, info, warn};

use crate::analytics::{SearchLog, SearchRecord};
use crate::catalog::{Movie, MovieCatalog, MovieDetails};
use crate::config::UiSettings;
use crate::debounce::Debouncer;
use crate::events::{self, AppEvent, EventReceiver, EventSender};
use crate::fetch::{FetchController, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Search,
    Details,
}

/// Which list has focus on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Trending,
    Popular,
}

pub struct App {
    catalog: Arc<dyn MovieCatalog>,
    search_log: Arc<dyn SearchLog>,
    trending_limit: usize,

    /// Popular listing, fetched on startup.
    pub popular: FetchController<Vec<Movie>>,
    /// Most-searched terms, fetched on startup and after every recorded search.
    pub trending: FetchController<Vec<SearchRecord>>,
    /// Results for the settled search query.
    pub results: FetchController<Vec<Movie>>,
    /// Present only while the details screen is open.
    pub details: Option<FetchController<MovieDetails>>,

    pub screen: Screen,
    return_to: Screen,
    pub pane: Pane,
    /// Search input as typed.
    pub query: String,

    pub popular_state: ListState,
    pub trending_state: ListState,
    pub results_state: ListState,

    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,

    debouncer: Debouncer,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

impl App {
    /// Build the app and start the popular and trending fetches.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        search_log: Arc<dyn SearchLog>,
        ui: &UiSettings,
    ) -> Self {
        let (events_tx, events_rx) = events::channel();
        let status = format!("{} · trending via {}", catalog.name(), search_log.name());
        Self {
            popular: FetchController::new(search_operation(&catalog, ""), true),
            trending: FetchController::new(trending_operation(&search_log, ui.trending_limit), true),
            results: FetchController::new(search_operation(&catalog, ""), false),
            details: None,
            catalog,
            search_log,
            trending_limit: ui.trending_limit,
            screen: Screen::Home,
            return_to: Screen::Home,
            pane: Pane::Popular,
            query: String::new(),
            popular_state: ListState::default(),
            trending_state: ListState::default(),
            results_state: ListState::default(),
            quit: false,
            status,
            debouncer: Debouncer::new(ui.debounce()),
            events_tx,
            events_rx,
        }
    }

    pub fn trending_limit(&self) -> usize {
        self.trending_limit
    }

    // -- screens -------------------------------------------------------------

    pub fn enter_search(&mut self) {
        self.screen = Screen::Search;
    }

    /// Leave the current screen.  Closing details tears its fetch down.
    pub fn back(&mut self) {
        match self.screen {
            Screen::Details => {
                self.details = None;
                self.screen = self.return_to;
            }
            Screen::Search => {
                self.debouncer.cancel();
                self.screen = Screen::Home;
            }
            Screen::Home => self.quit = true,
        }
    }

    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Trending => Pane::Popular,
            Pane::Popular => Pane::Trending,
        };
    }

    /// Open the details screen for the selected movie, if any.
    pub fn open_details(&mut self) {
        let Some(movie_id) = self.selected_movie_id() else {
            return;
        };
        info!(movie_id, "opening details");
        self.details = Some(FetchController::new(
            details_operation(&self.catalog, movie_id),
            true,
        ));
        self.return_to = self.screen;
        self.screen = Screen::Details;
    }

    /// Refetch whatever the current screen shows.
    pub fn refresh(&mut self) {
        match self.screen {
            Screen::Home => {
                self.popular.refetch();
                self.trending.refetch();
            }
            Screen::Search => {
                if !self.query.trim().is_empty() {
                    self.results.refetch();
                }
            }
            Screen::Details => {
                if let Some(details) = &self.details {
                    details.refetch();
                }
            }
        }
    }

    // -- search input --------------------------------------------------------

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.schedule_search();
    }

    pub fn pop_char(&mut self) {
        if self.query.pop().is_some() {
            self.schedule_search();
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.schedule_search();
    }

    fn schedule_search(&mut self) {
        let tx = self.events_tx.clone();
        let query = self.query.clone();
        self.debouncer.call(async move {
            let _ = tx.send(AppEvent::SearchSettled(query));
        });
    }

    /// Run a settled search and, once its results are committed, count it.
    fn run_search(&mut self, query: String) {
        self.results
            .set_operation(search_operation(&self.catalog, &query));
        self.results_state.select(None);
        let handle = self.results.refetch();

        let search_log = Arc::clone(&self.search_log);
        let tx = self.events_tx.clone();
        let query = query.trim().to_string();
        tokio::spawn(async move {
            let movies = match handle.await {
                Ok(Ok(Some(movies))) => movies,
                _ => return,
            };
            let Some(first) = movies.first() else {
                return;
            };
            let result = search_log.record_search(&query, first).await;
            let _ = tx.send(AppEvent::SearchRecorded { query, result });
        });
    }

    // -- events --------------------------------------------------------------

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchSettled(query) => {
                if query != self.query {
                    debug!(%query, current = %self.query, "ignoring stale search");
                    return;
                }
                if query.trim().is_empty() {
                    self.results.reset();
                    self.results_state.select(None);
                    return;
                }
                self.run_search(query);
            }
            AppEvent::SearchRecorded { query, result } => match result {
                Ok(()) => {
                    debug!(%query, "search recorded");
                    self.trending.refetch();
                }
                Err(err) => {
                    warn!(%query, error = %err, "could not record search");
                    self.status = format!("Could not record search: {err}");
                }
            },
        }
    }

    /// Apply every event queued since the last tick.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for the next background event.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    // -- navigation ----------------------------------------------------------

    fn active_len(&self) -> usize {
        match self.screen {
            Screen::Home => match self.pane {
                Pane::Popular => list_len(&self.popular),
                Pane::Trending => list_len(&self.trending),
            },
            Screen::Search => list_len(&self.results),
            Screen::Details => 0,
        }
    }

    fn active_state(&mut self) -> Option<&mut ListState> {
        match self.screen {
            Screen::Home => Some(match self.pane {
                Pane::Popular => &mut self.popular_state,
                Pane::Trending => &mut self.trending_state,
            }),
            Screen::Search => Some(&mut self.results_state),
            Screen::Details => None,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        if let Some(state) = self.active_state() {
            let i = match state.selected() {
                Some(i) => (i + 1).min(len - 1),
                None => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn select_previous(&mut self) {
        if self.active_len() == 0 {
            return;
        }
        if let Some(state) = self.active_state() {
            let i = match state.selected() {
                Some(i) => i.saturating_sub(1),
                None => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn select_first(&mut self) {
        if self.active_len() == 0 {
            return;
        }
        if let Some(state) = self.active_state() {
            state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        if let Some(state) = self.active_state() {
            state.select(Some(len - 1));
        }
    }

    pub fn selected_movie_id(&self) -> Option<i64> {
        match self.screen {
            Screen::Home => match self.pane {
                Pane::Popular => selected(&self.popular, &self.popular_state, |m| m.id),
                Pane::Trending => selected(&self.trending, &self.trending_state, |r| r.movie_id),
            },
            Screen::Search => selected(&self.results, &self.results_state, |m| m.id),
            Screen::Details => None,
        }
    }
}

fn list_len<T>(controller: &FetchController<Vec<T>>) -> usize
where
    T: Clone + Send + Sync + 'static,
{
    controller.snapshot().data.map_or(0, |items| items.len())
}

fn selected<T>(
    controller: &FetchController<Vec<T>>,
    state: &ListState,
    id: impl Fn(&T) -> i64,
) -> Option<i64>
where
    T: Clone + Send + Sync + 'static,
{
    let index = state.selected()?;
    controller.snapshot().data?.get(index).map(id)
}

// -- operations --------------------------------------------------------------

/// Listing when `query` is blank, search otherwise.
fn search_operation(catalog: &Arc<dyn MovieCatalog>, query: &str) -> Operation<Vec<Movie>> {
    let catalog = Arc::clone(catalog);
    let query = query.trim().to_string();
    let key = if query.is_empty() {
        "popular".to_string()
    } else {
        format!("search:{query}")
    };
    Operation::new(key, move || {
        let catalog = Arc::clone(&catalog);
        let query = query.clone();
        async move { catalog.search_or_list_movies(&query).await }
    })
}

fn trending_operation(search_log: &Arc<dyn SearchLog>, limit: usize) -> Operation<Vec<SearchRecord>> {
    let search_log = Arc::clone(search_log);
    Operation::new(format!("trending:{limit}"), move || {
        let search_log = Arc::clone(&search_log);
        async move { search_log.top_trending(limit).await }
    })
}

fn details_operation(catalog: &Arc<dyn MovieCatalog>, movie_id: i64) -> Operation<MovieDetails> {
    let catalog = Arc::clone(catalog);
    Operation::new(format!("details:{movie_id}"), move || {
        let catalog = Arc::clone(&catalog);
        async move { catalog.movie_details(movie_id).await }
    })
}
