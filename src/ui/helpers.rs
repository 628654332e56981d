use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::columns::{BadgeTone, Cell, ColumnId};
use crate::selection::CheckState;

/// Tables narrower than this drop their compact-hidden columns.
pub(crate) const COMPACT_WIDTH: u16 = 100;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

pub(crate) fn badge_style(tone: BadgeTone) -> Style {
    match tone {
        BadgeTone::Default => Style::default().fg(Color::Black).bg(Color::Gray),
        BadgeTone::Outline => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        BadgeTone::Success => Style::default().fg(Color::Black).bg(Color::Green),
        BadgeTone::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
        BadgeTone::Info => Style::default().fg(Color::Black).bg(Color::Cyan),
    }
}

pub(crate) fn checkbox(checked: CheckState) -> &'static str {
    match checked {
        CheckState::Unchecked => "[ ]",
        CheckState::Indeterminate => "[-]",
        CheckState::Checked => "[x]",
    }
}

/// Turn a library-neutral cell into a styled line. An empty configuration
/// reads as "N/A"; other empty cells stay blank.
pub(crate) fn cell_line(column: ColumnId, cell: Cell) -> Line<'static> {
    match cell {
        Cell::Checkbox(checked) => Line::from(checkbox(if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        })),
        Cell::Text(text) => Line::from(text),
        Cell::Title { segments, link } => {
            let base = if link.is_some() {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Line::from(
                segments
                    .into_iter()
                    .map(|segment| {
                        if segment.highlighted {
                            Span::styled(
                                segment.text,
                                base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
                            )
                        } else {
                            Span::styled(segment.text, base)
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        }
        Cell::Badges(badges) => {
            let mut spans = Vec::with_capacity(badges.len() * 2);
            for badge in badges {
                if !spans.is_empty() {
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled(
                    format!(" {} ", badge.label),
                    badge_style(badge.tone),
                ));
            }
            Line::from(spans)
        }
        Cell::Tags(tags) => Line::from(Span::styled(
            tags.join(", "),
            Style::default().fg(Color::Gray),
        )),
        Cell::Empty if column == ColumnId::Configuration => {
            Line::from(Span::styled("N/A", Style::default().fg(Color::DarkGray)))
        }
        Cell::Empty => Line::from(""),
    }
}

/// Width of each column in the table layout.
pub(crate) fn column_constraint(column: ColumnId) -> Constraint {
    match column {
        ColumnId::Select => Constraint::Length(3),
        ColumnId::Title => Constraint::Min(20),
        ColumnId::Type => Constraint::Length(20),
        ColumnId::Configuration => Constraint::Length(14),
        ColumnId::Categories => Constraint::Min(16),
        ColumnId::AlternativeNames => Constraint::Min(16),
        ColumnId::PublicationStatus => Constraint::Length(12),
        ColumnId::EditProposal => Constraint::Length(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::TextSegment;

    #[test]
    fn empty_configuration_reads_not_applicable() {
        let line = cell_line(ColumnId::Configuration, Cell::Empty);
        assert_eq!(line.to_string(), "N/A");
        assert_eq!(cell_line(ColumnId::AlternativeNames, Cell::Empty).to_string(), "");
    }

    #[test]
    fn highlighted_title_keeps_text_intact() {
        let line = cell_line(
            ColumnId::Title,
            Cell::Title {
                segments: vec![
                    TextSegment {
                        text: "Zip ".into(),
                        highlighted: false,
                    },
                    TextSegment {
                        text: "Zap".into(),
                        highlighted: true,
                    },
                ],
                link: None,
            },
        );
        assert_eq!(line.to_string(), "Zip Zap");
        assert_eq!(line.spans[1].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn surfaces_root_cause() {
        let err = anyhow::anyhow!("disk full").context("failed to save resource");
        assert_eq!(surface_error(&err), "disk full");
    }
}
