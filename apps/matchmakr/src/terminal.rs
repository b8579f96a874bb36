//! Line-oriented presentation layer: parses typed commands and renders the
//! browser's current view as plain text.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::browser::filter::{FilterDimension, FilterOptions, FilterState};
use crate::browser::BrowserView;
use crate::errors::BrowserError;
use crate::models::{Candidate, Decision};

pub const HELP: &str = "\
Commands:
  y | yes | i                 interested in the current candidate
  n | no | p                  pass on the current candidate
  filter <dimension> <value>  dimensions: experience, role, location, skill
  clear <dimension> | all     remove one or every filter
  options                     list filter choices
  retry                       reload candidates after an error
  help                        show this message
  q | quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Decide(Decision),
    Filter(FilterDimension, String),
    Clear(Option<FilterDimension>),
    Options,
    Retry,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = BrowserError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head.to_ascii_lowercase().as_str() {
            "y" | "yes" | "i" | "interested" => Ok(Command::Decide(Decision::Interested)),
            "n" | "no" | "p" | "pass" => Ok(Command::Decide(Decision::Pass)),
            "filter" | "f" => {
                let (dimension, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(BrowserError::MissingArgument("filter <dimension> <value>"))?;
                let value = value.trim();
                if value.is_empty() {
                    return Err(BrowserError::MissingArgument("filter <dimension> <value>"));
                }
                Ok(Command::Filter(dimension.parse()?, value.to_string()))
            }
            "clear" | "c" => match rest {
                "" => Err(BrowserError::MissingArgument("clear <dimension> | all")),
                "all" => Ok(Command::Clear(None)),
                dimension => Ok(Command::Clear(Some(dimension.parse()?))),
            },
            "options" | "o" => Ok(Command::Options),
            "retry" | "r" => Ok(Command::Retry),
            "help" | "h" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(BrowserError::UnknownCommand(other.to_string())),
        }
    }
}

/// Overlay shown while a card leaves the screen.
pub fn transition_glyph(decision: Decision) -> &'static str {
    match decision {
        Decision::Interested => "✓ Interested",
        Decision::Pass => "✗ Passed",
    }
}

pub fn render_view(view: &BrowserView<'_>) -> String {
    match view {
        BrowserView::Loading => "Loading candidates...".to_string(),
        BrowserView::Error { message } => format!("{message}\nType 'retry' to try again."),
        BrowserView::NoMatches => {
            "No matches found. Adjust or clear your filters.".to_string()
        }
        BrowserView::Card {
            candidate,
            position,
            total,
        } => render_card(candidate, *position, *total),
    }
}

fn render_card(candidate: &Candidate, position: usize, total: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{position}/{total}] {}", candidate.display_name());

    let headline: Vec<&str> = [candidate.current_title.as_str(), candidate.location.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !headline.is_empty() {
        let _ = writeln!(out, "{}", headline.join(" · "));
    }

    let years = match candidate.years_of_experience {
        1 => "1 year of experience".to_string(),
        n => format!("{n} years of experience"),
    };
    if candidate.role_type.is_empty() {
        let _ = writeln!(out, "{years}");
    } else {
        let _ = writeln!(out, "{} · {years}", candidate.role_type);
    }

    if !candidate.skills.is_empty() {
        let names: Vec<&str> = candidate.skills.iter().map(|s| s.name.as_str()).collect();
        let _ = writeln!(out, "Skills: {}", names.join(", "));
    }
    if !candidate.bio.is_empty() {
        let _ = writeln!(out, "About: {}", candidate.bio);
    }
    if !candidate.previous_titles.is_empty() {
        let _ = writeln!(out, "Previously:");
        for prev in &candidate.previous_titles {
            let _ = writeln!(out, "  - {} at {} ({})", prev.title, prev.company, prev.duration);
        }
    }
    for (label, url) in candidate.links() {
        let _ = writeln!(out, "{label}: {url}");
    }

    out.trim_end().to_string()
}

/// Lists every dimension's choices, marking the active selection with `*`.
pub fn render_options(options: &FilterOptions, active: &FilterState) -> String {
    let mut out = String::new();
    for dimension in FilterDimension::ALL {
        let selected = active.get(dimension);
        let choices: Vec<String> = options
            .for_dimension(dimension)
            .iter()
            .map(|c| {
                if Some(c.as_str()) == selected {
                    format!("*{c}")
                } else {
                    c.clone()
                }
            })
            .collect();
        let _ = writeln!(out, "{}: {}", dimension.label(), choices.join(", "));
    }
    out.trim_end().to_string()
}
