//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Every list is rendered from a
//! controller snapshot, so a frame always shows one consistent
//! `data` / `loading` / `error` triple per list.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::analytics::SearchRecord;
use crate::app::{App, Pane, Screen};
use crate::catalog::{Movie, MovieDetails};
use crate::fetch::FetchState;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    match app.screen {
        Screen::Home => draw_home(app, frame, main_area),
        Screen::Search => draw_search(app, frame, main_area),
        Screen::Details => draw_details(app, frame, main_area),
    }
    draw_status_bar(app, frame, status_area);
}

fn draw_home(app: &mut App, frame: &mut Frame, area: Rect) {
    let trending_height = u16::try_from(app.trending_limit())
        .unwrap_or(u16::MAX)
        .saturating_add(2);
    let [trending_area, popular_area] = Layout::vertical([
        Constraint::Length(trending_height),
        Constraint::Min(1),
    ])
    .areas(area);

    let trending = app.trending.snapshot();
    draw_list(
        frame,
        trending_area,
        " Trending Searches ",
        app.pane == Pane::Trending,
        &trending,
        "No searches yet",
        trending_line,
        &mut app.trending_state,
    );

    let popular = app.popular.snapshot();
    draw_list(
        frame,
        popular_area,
        " Latest Movies ",
        app.pane == Pane::Popular,
        &popular,
        "No movies found",
        |_, movie| movie_line(movie),
        &mut app.popular_state,
    );
}

fn draw_search(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, results_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

    let input = Paragraph::new(Line::from(vec![
        Span::styled(&app.query, Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().title(" Search movies ").borders(Borders::ALL));
    frame.render_widget(input, input_area);

    let results = app.results.snapshot();
    let title = if app.query.trim().is_empty() {
        " Results ".to_string()
    } else {
        format!(" Search Results for {} ", app.query.trim())
    };
    let empty = if app.query.trim().is_empty() {
        "Search for a movie"
    } else {
        "No movies found"
    };
    draw_list(
        frame,
        results_area,
        &title,
        true,
        &results,
        empty,
        |_, movie| movie_line(movie),
        &mut app.results_state,
    );
}

fn draw_details(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Details ").borders(Borders::ALL);
    let state = app
        .details
        .as_ref()
        .map(|d| d.snapshot())
        .unwrap_or_default();

    let lines = match placeholder(&state, "No details") {
        Some(message) => vec![Line::from(message)],
        None => state.data.as_ref().map(details_lines).unwrap_or_default(),
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Message to show instead of a list, if the state has nothing to list.
fn placeholder<T: AsEmpty>(state: &FetchState<T>, empty: &str) -> Option<String> {
    if state.loading {
        Some("Loading…".into())
    } else if let Some(err) = &state.error {
        Some(format!("Error: {err}"))
    } else if state.data.as_ref().map_or(true, AsEmpty::is_empty) {
        Some(empty.into())
    } else {
        None
    }
}

/// Payloads that can be "empty" for display purposes.
trait AsEmpty {
    fn is_empty(&self) -> bool;
}

impl<T> AsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl AsEmpty for MovieDetails {
    fn is_empty(&self) -> bool {
        false
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_list<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    focused: bool,
    state: &FetchState<Vec<T>>,
    empty: &str,
    line: impl Fn(usize, &T) -> Line<'static>,
    list_state: &mut ListState,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(border_style);

    if let Some(message) = placeholder(state, empty) {
        let color = if state.error.is_some() {
            Color::Red
        } else {
            Color::DarkGray
        };
        let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(color))).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state
        .data
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, item)| ListItem::new(line(i, item)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, list_state);
}

fn movie_line(movie: &Movie) -> Line<'static> {
    let year = movie
        .release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".into());

    Line::from(vec![
        Span::styled(format!("{year:<6}"), Style::default().fg(Color::DarkGray)),
        Span::styled(movie.title.clone(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            format!("★ {:.1}", movie.vote_average),
            Style::default().fg(Color::Yellow),
        ),
    ])
}

fn trending_line(index: usize, record: &SearchRecord) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:>2}. ", index + 1),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(record.title.clone(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            format!("\"{}\" × {}", record.search_term, record.count),
            Style::default().fg(Color::Cyan),
        ),
    ])
}

fn details_lines(details: &MovieDetails) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(Span::styled(
        details.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(Span::styled(
            tagline.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));

    let mut field = |name: &str, value: String| {
        lines.push(Line::from(vec![
            Span::styled(format!("{name:<10}"), label),
            Span::raw(value),
        ]));
    };
    if let Some(year) = details.release_year() {
        field("Released", year.to_string());
    }
    if let Some(runtime) = details.runtime_label() {
        field("Runtime", runtime);
    }
    if !details.genres.is_empty() {
        field("Genres", details.genre_names());
    }
    field(
        "Rating",
        format!("{:.1} ({} votes)", details.vote_average, details.vote_count),
    );
    if details.budget > 0 {
        field("Budget", format!("${}", details.budget));
    }
    if details.revenue > 0 {
        field("Revenue", format!("${}", details.revenue));
    }
    if let Some(status) = &details.status {
        field("Status", status.clone());
    }

    if let Some(overview) = details.overview.as_deref().filter(|o| !o.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(overview.to_string()));
    }
    lines
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.screen {
        Screen::Home => "q: quit  /: search  Tab: pane  Enter: details  r: refresh",
        Screen::Search => "Esc: back  ↑/↓: scroll  Enter: details",
        Screen::Details => "Esc: back  r: refresh",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(hints, Style::default().fg(Color::Green)),
    ]));
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::analytics::MemorySearchLog;
    use crate::app::tests::{harness, loaded_harness, StubCatalog};
    use crate::config::UiSettings;
    use crate::error::FetchError;
    use crate::fetch::{FetchController, Operation};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn placeholder_prefers_loading_then_error_then_empty() {
        let mut state: FetchState<Vec<u8>> = FetchState {
            data: Some(vec![]),
            loading: true,
            error: None,
        };
        assert_eq!(placeholder(&state, "empty").as_deref(), Some("Loading…"));

        state.loading = false;
        state.error = Some(FetchError::Http {
            status: 404,
            status_text: "Not Found".into(),
        });
        assert!(placeholder(&state, "empty").unwrap().contains("404"));

        state.error = None;
        assert_eq!(placeholder(&state, "empty").as_deref(), Some("empty"));

        state.data = Some(vec![1]);
        assert!(placeholder(&state, "empty").is_none());
    }

    #[tokio::test]
    async fn draw_home_with_movies() {
        let mut h = loaded_harness().await;
        h.app.select_first();
        let text = render(&mut h.app);
        assert!(text.contains("Popular One"));
        assert!(text.contains("No searches yet"));
        assert!(text.contains("q: quit"));
    }

    #[tokio::test]
    async fn draw_search_prompt() {
        let mut h = harness();
        h.app.enter_search();
        let text = render(&mut h.app);
        assert!(text.contains("Search for a movie"));
    }

    #[tokio::test]
    async fn draw_details_shows_fields() {
        let mut h = loaded_harness().await;
        h.app.select_first();
        h.app.open_details();
        h.app
            .details
            .as_ref()
            .unwrap()
            .subscribe()
            .wait_for(|s| s.data.is_some())
            .await
            .unwrap();

        let text = render(&mut h.app);
        assert!(text.contains("Movie 1"));
        assert!(text.contains("2h"));
        assert!(text.contains("Drama"));
    }

    #[tokio::test]
    async fn draw_details_error() {
        let mut h = loaded_harness().await;
        let missing = Operation::new("details:404", || async {
            Err::<MovieDetails, _>(FetchError::Http {
                status: 404,
                status_text: "Not Found".into(),
            })
        });
        let details = FetchController::new(missing, true);
        details
            .subscribe()
            .wait_for(|s| s.error.is_some())
            .await
            .unwrap();
        h.app.details = Some(details);
        h.app.screen = Screen::Details;

        let text = render(&mut h.app);
        assert!(text.contains("Error: request failed: 404 Not Found"));
    }

    #[tokio::test]
    async fn huge_trending_limit_still_renders() {
        let ui = UiSettings {
            trending_limit: 65_535,
            ..UiSettings::default()
        };
        let mut app = App::new(
            Arc::new(StubCatalog::default()),
            Arc::new(MemorySearchLog::new()),
            &ui,
        );
        let text = render(&mut app);
        assert!(text.contains("Trending Searches"));
    }
}
