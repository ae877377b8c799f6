//! Terminal rendering for result pages: the cards grid, the coverflow strip,
//! the detail view and the status header.
//!
//! Every renderer returns lines instead of writing, so the browse loop and the
//! `search` command share them and tests can inspect the layout.

#![allow(missing_docs)]

use colored::Colorize;
use crossterm::terminal;

use crate::catalog::movie::Movie;
use crate::paging::page::PageInfo;
use crate::paging::session::ViewMode;
use crate::query::filter::{FilterState, FilterWarning};

/// Width used when the terminal size is unknown (pipes, CI).
pub const FALLBACK_WIDTH: usize = 100;

const CARD_WIDTH: usize = 30;
const CARD_GAP: usize = 2;
const PLOT_WIDTH: usize = 72;

// ──────────────────── geometry ────────────────────

/// Current terminal width in columns.
pub fn terminal_width() -> usize {
    terminal::size().map_or(FALLBACK_WIDTH, |(cols, _)| usize::from(cols).max(CARD_WIDTH))
}

/// Number of cards per grid row at `width` columns.
pub fn cards_per_row(width: usize) -> usize {
    ((width + CARD_GAP) / (CARD_WIDTH + CARD_GAP)).max(1)
}

/// Truncate to `width` characters (with an ellipsis) and pad with spaces.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut out = text.to_string();
        out.extend(std::iter::repeat_n(' ', width - count));
        return out;
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ──────────────────── field formatting ────────────────────

fn year_label(movie: &Movie) -> String {
    movie
        .year
        .map_or_else(|| "----".to_string(), |y| y.to_string())
}

fn rating_label(movie: &Movie) -> String {
    movie
        .imdb_rating
        .map_or_else(|| "★ n/a".to_string(), |r| format!("★ {r:.1}"))
}

fn genres_label(movie: &Movie) -> String {
    if movie.genres.is_empty() {
        "-".to_string()
    } else {
        movie.genres.join(", ")
    }
}

// ──────────────────── header ────────────────────

/// One-line summary of the active filters, `no filters` when none are set.
pub fn filter_summary(filters: &FilterState) -> String {
    let mut parts = Vec::new();
    if !filters.search.is_empty() {
        parts.push(format!("search={:?}", filters.search));
    }
    if let Some(genre) = filters.genre.as_named() {
        parts.push(format!("genre={genre}"));
    }
    match (filters.min_year, filters.max_year) {
        (Some(lo), Some(hi)) => parts.push(format!("year={lo}..={hi}")),
        (Some(lo), None) => parts.push(format!("year>={lo}")),
        (None, Some(hi)) => parts.push(format!("year<={hi}")),
        (None, None) => {}
    }
    if let Some(rating) = filters.min_rating
        && rating > 0.0
    {
        parts.push(format!("rating>={rating}"));
    }
    if parts.is_empty() {
        "no filters".to_string()
    } else {
        parts.join("  ")
    }
}

/// Status header: page label, view and filters.
pub fn render_header(info: &PageInfo, view: ViewMode, filters: &FilterState) -> Vec<String> {
    vec![
        format!(
            "{}   {}   {}",
            info.label().bold(),
            format!("[{view}]").cyan(),
            filter_summary(filters).dimmed()
        ),
        String::new(),
    ]
}

pub fn render_warnings(warnings: &[FilterWarning]) -> Vec<String> {
    warnings
        .iter()
        .map(|w| format!("{} {w}", "warning:".yellow().bold()))
        .collect()
}

pub fn render_empty() -> Vec<String> {
    vec!["No movies match the current filters.".dimmed().to_string()]
}

// ──────────────────── cards ────────────────────

/// Grid of bordered cards, as many per row as fit in `width`.
pub fn render_cards(records: &[Movie], width: usize) -> Vec<String> {
    if records.is_empty() {
        return render_empty();
    }
    let inner = CARD_WIDTH - 4;
    let per_row = cards_per_row(width);
    let gap = " ".repeat(CARD_GAP);
    let mut lines = Vec::new();

    for (row_index, row) in records.chunks(per_row).enumerate() {
        let cards: Vec<[String; 5]> = row
            .iter()
            .enumerate()
            .map(|(i, movie)| {
                let n = row_index * per_row + i + 1;
                let title = fit(&format!("{n:>2}. {}", movie.display_title()), inner);
                let meta = fit(
                    &format!("{}  {}", year_label(movie), rating_label(movie)),
                    inner,
                );
                [
                    format!("┌{}┐", "─".repeat(CARD_WIDTH - 2)),
                    format!("│ {} │", title.bold()),
                    format!("│ {meta} │"),
                    format!("│ {} │", fit(&genres_label(movie), inner).dimmed()),
                    format!("└{}┘", "─".repeat(CARD_WIDTH - 2)),
                ]
            })
            .collect();

        for line in 0..5 {
            let joined: Vec<&str> = cards.iter().map(|card| card[line].as_str()).collect();
            lines.push(joined.join(&gap));
        }
    }
    lines
}

// ──────────────────── coverflow ────────────────────

/// Indices of the records visible in a strip of `slots` items centered on
/// `selected`.
pub fn coverflow_window(len: usize, selected: usize, slots: usize) -> std::ops::Range<usize> {
    if len == 0 || slots == 0 {
        return 0..0;
    }
    let slots = slots.min(len);
    let selected = selected.min(len - 1);
    let start = selected.saturating_sub(slots / 2).min(len - slots);
    start..start + slots
}

/// Horizontal strip of titles with the selected one highlighted, followed by
/// a short description of the selection.
pub fn render_coverflow(records: &[Movie], selected: usize, width: usize) -> Vec<String> {
    if records.is_empty() {
        return render_empty();
    }
    let tile = 18;
    let slots = (width.saturating_sub(4) / (tile + 1)).max(1);
    let window = coverflow_window(records.len(), selected, slots);

    let mut strip = Vec::new();
    if window.start > 0 {
        strip.push("‹".dimmed().to_string());
    }
    for index in window.clone() {
        let movie = &records[index];
        let label = fit(movie.display_title(), tile - 2);
        if index == selected {
            strip.push(format!("[{label}]").reversed().bold().to_string());
        } else {
            strip.push(format!(" {label} ").dimmed().to_string());
        }
    }
    if window.end < records.len() {
        strip.push("›".dimmed().to_string());
    }

    let mut lines = vec![strip.join(" "), String::new()];
    if let Some(movie) = records.get(selected) {
        lines.push(format!(
            "{}  ({})  {}",
            movie.display_title().bold(),
            year_label(movie),
            rating_label(movie).yellow()
        ));
        lines.push(genres_label(movie).dimmed().to_string());
        if let Some(plot) = movie.plot.as_deref().filter(|p| !p.trim().is_empty()) {
            lines.extend(wrap(plot, width.min(PLOT_WIDTH)));
        }
        lines.push(format!(
            "{} of {}",
            selected + 1,
            records.len()
        ));
    }
    lines
}

// ──────────────────── detail ────────────────────

/// Every field of one record.
pub fn render_detail(movie: &Movie, width: usize) -> Vec<String> {
    let mut lines = vec![
        movie.display_title().bold().underline().to_string(),
        String::new(),
        format!("{:<9}{}", "id", movie.id),
        format!("{:<9}{}", "year", year_label(movie)),
        format!("{:<9}{}", "rating", rating_label(movie)),
        format!("{:<9}{}", "genres", genres_label(movie)),
    ];
    if let Some(rated) = &movie.rated {
        lines.push(format!("{:<9}{rated}", "rated"));
    }
    if let Some(runtime) = movie.runtime {
        lines.push(format!("{:<9}{runtime} min", "runtime"));
    }
    let poster = if movie.poster.as_deref().is_some_and(|p| !p.trim().is_empty()) {
        movie.poster_or_placeholder().to_string()
    } else {
        "(placeholder)".dimmed().to_string()
    };
    lines.push(format!("{:<9}{poster}", "poster"));
    if let Some(plot) = movie.plot.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.push(String::new());
        lines.extend(wrap(plot, width.min(PLOT_WIDTH)));
    }
    lines
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(10);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Page body for `view`.
pub fn render_page(records: &[Movie], view: ViewMode, selected: usize, width: usize) -> Vec<String> {
    match view {
        ViewMode::Cards => render_cards(records, width),
        ViewMode::Coverflow => render_coverflow(records, selected, width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::movie::{MovieDraft, MovieId};
    use crate::query::filter::GenreChoice;

    fn plain() {
        colored::control::set_override(false);
    }

    fn movie(id: i64, title: &str) -> Movie {
        MovieDraft {
            title: title.to_string(),
            year: Some(1994),
            genres: vec!["Crime".to_string(), "Drama".to_string()],
            imdb_rating: Some(8.9),
            plot: Some("A burger-loving hit man and his partner.".to_string()),
            ..MovieDraft::default()
        }
        .into_movie(MovieId(id))
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn grid_columns_follow_width() {
        assert_eq!(cards_per_row(10), 1);
        assert_eq!(cards_per_row(62), 2);
        assert_eq!(cards_per_row(100), 3);
    }

    #[test]
    fn cards_render_five_lines_per_row() {
        plain();
        let records: Vec<Movie> = (1..=4).map(|i| movie(i, &format!("Film {i}"))).collect();
        let lines = render_cards(&records, 100);
        // 3 per row at 100 columns → two rows.
        assert_eq!(lines.len(), 10);
        assert!(lines[1].contains(" 1. Film 1"));
        assert!(lines[1].contains(" 3. Film 3"));
        assert!(lines[6].contains(" 4. Film 4"));
        assert!(lines[2].contains("1994  ★ 8.9"));
    }

    #[test]
    fn untitled_and_unrated_records_render() {
        plain();
        let mut bare = movie(1, "");
        bare.imdb_rating = None;
        bare.year = None;
        let lines = render_cards(&[bare], 40);
        assert!(lines[1].contains("Untitled"));
        assert!(lines[2].contains("---- "));
        assert!(lines[2].contains("★ n/a"));
    }

    #[test]
    fn empty_page_renders_no_results() {
        plain();
        assert_eq!(render_cards(&[], 80), render_empty());
        assert!(render_coverflow(&[], 0, 80)[0].contains("No movies"));
    }

    #[test]
    fn coverflow_window_centers_selection() {
        assert_eq!(coverflow_window(10, 0, 5), 0..5);
        assert_eq!(coverflow_window(10, 5, 5), 3..8);
        assert_eq!(coverflow_window(10, 9, 5), 5..10);
        assert_eq!(coverflow_window(3, 2, 5), 0..3);
        assert_eq!(coverflow_window(0, 0, 5), 0..0);
    }

    #[test]
    fn coverflow_highlights_selected() {
        plain();
        let records: Vec<Movie> = (1..=3).map(|i| movie(i, &format!("Film {i}"))).collect();
        let lines = render_coverflow(&records, 1, 100);
        assert!(lines[0].contains("[Film 2"));
        assert!(!lines[0].contains("[Film 1"));
        assert!(lines[2].starts_with("Film 2  (1994)"));
        assert_eq!(lines.last().unwrap(), "2 of 3");
    }

    #[test]
    fn detail_lists_fields_and_placeholder() {
        plain();
        let lines = render_detail(&movie(7, "Pulp Fiction"), 80);
        assert_eq!(lines[0], "Pulp Fiction");
        assert!(lines.iter().any(|l| l == "id       7"));
        assert!(lines.iter().any(|l| l == "genres   Crime, Drama"));
        assert!(lines.iter().any(|l| l == "poster   (placeholder)"));
        assert!(lines.iter().any(|l| l.contains("hit man")));
    }

    #[test]
    fn filter_summary_lists_only_set_filters() {
        assert_eq!(filter_summary(&FilterState::default()), "no filters");
        let filters = FilterState {
            search: "godfather".to_string(),
            genre: GenreChoice::Named("Crime".to_string()),
            min_year: Some(1970),
            max_year: None,
            min_rating: Some(0.0),
        };
        assert_eq!(
            filter_summary(&filters),
            "search=\"godfather\"  genre=Crime  year>=1970"
        );
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("one two three four five six", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "one two three four five six");
    }
}
