//! Line-driven interactive browser.
//!
//! Reads one command per line, applies it to a [`BrowseSession`] and redraws
//! the page. Store failures are shown inline and browsing continues; only
//! terminal I/O errors end the loop early.

#![allow(missing_docs)]

use std::io::{self, BufRead, Write};

use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::cli::render;
use crate::core::errors::{MflixError, Result};
use crate::paging::page::PageSize;
use crate::paging::session::BrowseSession;
use crate::query::filter::FilterInputs;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    ToggleView,
    PageSize(PageSize),
    /// Empty text clears the search.
    Search(String),
    Genre(String),
    ListGenres,
    Years { min: String, max: String },
    Rating(String),
    Reset,
    /// 1-based position on the current page.
    Open(usize),
    Left,
    Right,
    Redraw,
    Help,
    Quit,
}

pub const HELP: &[&str] = &[
    "n | next                 next page",
    "p | prev                 previous page",
    "v | view                 toggle cards / coverflow",
    "size 10|25|50            change page size",
    "s | search [text]        title/plot search (blank clears)",
    "g | genre [name]         genre filter (blank or Any clears)",
    "genres                   list genres",
    "y | year [min] [max]     year range (- leaves a bound open)",
    "r | rating [value]       minimum IMDb rating, 0 clears",
    "reset                    clear all filters",
    "o | open N               details of item N on this page",
    "h | left, l | right      move the coverflow selection",
    "q | quit                 leave",
];

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(v, r)| (v, r.trim()));

        let command = match verb.to_ascii_lowercase().as_str() {
            "" => Self::Redraw,
            "n" | "next" => Self::Next,
            "p" | "prev" | "previous" => Self::Prev,
            "v" | "view" => Self::ToggleView,
            "size" => Self::PageSize(rest.parse()?),
            "s" | "search" => Self::Search(rest.to_string()),
            "g" | "genre" => Self::Genre(rest.to_string()),
            "genres" => Self::ListGenres,
            "y" | "year" | "years" => {
                let mut bounds = rest.split_whitespace().map(|b| {
                    if b == "-" { String::new() } else { b.to_string() }
                });
                Self::Years {
                    min: bounds.next().unwrap_or_default(),
                    max: bounds.next().unwrap_or_default(),
                }
            }
            "r" | "rating" => Self::Rating(rest.to_string()),
            "reset" => Self::Reset,
            "o" | "open" => {
                let position: usize = rest.parse().map_err(|_| {
                    MflixError::invalid_input("open", format!("expected an item number, got {rest:?}"))
                })?;
                if position == 0 {
                    return Err(MflixError::invalid_input("open", "items are numbered from 1"));
                }
                Self::Open(position)
            }
            "h" | "left" => Self::Left,
            "l" | "right" => Self::Right,
            "?" | "help" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => {
                return Err(MflixError::invalid_input(
                    "command",
                    format!("unknown command {other:?}; type help"),
                ));
            }
        };
        Ok(command)
    }
}

/// Raw text of every filter field, kept so one field can change at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FilterForm {
    search: String,
    genre: String,
    min_year: String,
    max_year: String,
    min_rating: String,
}

impl FilterForm {
    fn inputs(&self) -> FilterInputs<'_> {
        FilterInputs {
            search: &self.search,
            genre: &self.genre,
            min_year: &self.min_year,
            max_year: &self.max_year,
            min_rating: &self.min_rating,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BrowseOptions {
    pub width: usize,
    /// Clear the screen before each redraw.
    pub clear: bool,
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseExit {
    Quit,
    EndOfInput,
}

impl BrowseExit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::EndOfInput => "end of input",
        }
    }
}

/// Run the loop until `quit` or end of input.
pub fn run_browse<R: BufRead, W: Write>(
    session: &mut BrowseSession,
    input: R,
    out: &mut W,
    options: BrowseOptions,
) -> io::Result<BrowseExit> {
    let mut form = FilterForm::default();
    let mut notice = session.load().err().map(|e| error_line(&e));
    draw(session, out, options, notice.take())?;

    for line in input.lines() {
        let line = line?;
        let command = match BrowseCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "{}", error_line(&err))?;
                continue;
            }
        };

        let outcome = match command {
            BrowseCommand::Quit => return Ok(BrowseExit::Quit),
            BrowseCommand::Help => {
                for line in HELP {
                    writeln!(out, "  {line}")?;
                }
                continue;
            }
            BrowseCommand::ListGenres => {
                match session.genre_choices() {
                    Ok(choices) => writeln!(out, "{}", choices.join(", "))?,
                    Err(err) => writeln!(out, "{}", error_line(&err))?,
                }
                continue;
            }
            BrowseCommand::Open(position) => {
                match session.open(position - 1) {
                    Ok(movie) => {
                        for line in render::render_detail(movie, options.width) {
                            writeln!(out, "{line}")?;
                        }
                    }
                    Err(err) => writeln!(out, "{}", error_line(&err))?,
                }
                continue;
            }
            BrowseCommand::Next => session.next().map(|moved| {
                (!moved).then(|| "already on the last page".to_string())
            }),
            BrowseCommand::Prev => session.prev().map(|moved| {
                (!moved).then(|| "already on the first page".to_string())
            }),
            BrowseCommand::ToggleView => session.toggle_view().map(|()| None),
            BrowseCommand::PageSize(size) => session.set_page_size(size).map(|()| None),
            BrowseCommand::Search(text) => {
                form.search = text;
                session.apply_filters(&form.inputs()).map(|()| None)
            }
            BrowseCommand::Genre(genre) => {
                form.genre = genre;
                session.apply_filters(&form.inputs()).map(|()| None)
            }
            BrowseCommand::Years { min, max } => {
                form.min_year = min;
                form.max_year = max;
                session.apply_filters(&form.inputs()).map(|()| None)
            }
            BrowseCommand::Rating(rating) => {
                form.min_rating = rating;
                session.apply_filters(&form.inputs()).map(|()| None)
            }
            BrowseCommand::Reset => {
                form = FilterForm::default();
                session.reset_filters().map(|()| None)
            }
            BrowseCommand::Left => {
                session.select_left();
                Ok(None)
            }
            BrowseCommand::Right => {
                session.select_right();
                Ok(None)
            }
            BrowseCommand::Redraw => Ok(None),
        };

        notice = match outcome {
            Ok(message) => message,
            Err(err) => Some(error_line(&err)),
        };
        draw(session, out, options, notice.take())?;
    }

    Ok(BrowseExit::EndOfInput)
}

fn error_line(err: &MflixError) -> String {
    format!("{} {}", "error:".red().bold(), err.surface_message())
}

fn draw<W: Write>(
    session: &BrowseSession,
    out: &mut W,
    options: BrowseOptions,
    notice: Option<String>,
) -> io::Result<()> {
    if options.clear {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    let mut lines = render::render_header(&session.page_info(), session.view(), session.filters());
    lines.extend(render::render_warnings(session.warnings()));
    lines.extend(render::render_page(
        session.records(),
        session.view(),
        session.selected(),
        options.width,
    ));
    if let Some(notice) = notice {
        lines.push(notice);
    }
    lines.push("command (help for keys)> ".dimmed().to_string());

    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
