use super::layout::LayoutError;
use super::state::ViewState;
use super::wrap::{display_line, wrap_body};
use crate::model::{Item, Status};
use ratatui::layout::Alignment;
use ratatui::prelude::{Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

/// Rows taken by the title, metadata and separator lines.
const HEADER_ROWS: usize = 3;
const PADDING: u16 = 1;

/// Text area of the reader pane: inside the border and padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderLayout {
    pub text_width: usize,
    pub body_rows: usize,
}

impl ReaderLayout {
    pub fn for_area(area: Rect) -> Self {
        let text = padded(inner(area));
        ReaderLayout {
            text_width: usize::from(text.width).max(1),
            body_rows: usize::from(text.height).saturating_sub(HEADER_ROWS),
        }
    }
}

/// Largest useful body scroll for `item` shown in a reader of `area`.
pub fn max_body_scroll(item: &Item, area: Rect) -> usize {
    let layout = ReaderLayout::for_area(area);
    wrap_body(&item.body, layout.text_width)
        .len()
        .saturating_sub(layout.body_rows)
}

/// Percentage through the body, or `None` when it fits on screen.
pub fn scroll_percent(total_lines: usize, scroll: usize, rows: usize) -> Option<u16> {
    if total_lines <= rows {
        return None;
    }
    let position = scroll.min(total_lines.saturating_sub(1)) as f64;
    let span = total_lines.saturating_sub(rows).max(1) as f64;
    let pct = (position / span * 100.0).round().clamp(0.0, 100.0);
    Some(pct as u16)
}

pub fn draw_sidebar(f: &mut Frame<'_>, area: Rect, items: &[Item], view: &ViewState) {
    let area = area.intersection(f.size());
    if area.is_empty() {
        return;
    }
    let inner_width = usize::from(area.width.saturating_sub(2));
    let rows = usize::from(area.height.saturating_sub(2));

    let list_items = items
        .iter()
        .enumerate()
        .skip(view.sidebar_top)
        .take(rows)
        .map(|(idx, item)| {
            let selected = idx == view.selected;
            let marker = if selected { "> " } else { "  " };
            let text = fit_width(&format!("{}{}", marker, item.title), inner_width);
            let style = if selected {
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else if item.status == Status::Done {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::raw(text)).style(style)
        })
        .collect::<Vec<_>>();

    let block = Block::default()
        .title(Span::styled(
            format!(" Items ({}) ", items.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(List::new(list_items).block(block), area);
}

pub fn draw_reader(f: &mut Frame<'_>, area: Rect, item: &Item, body_scroll: usize) {
    let area = area.intersection(f.size());
    if area.is_empty() {
        return;
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(block, area);

    let text_area = padded(inner(area));
    let layout = ReaderLayout::for_area(area);
    let body = wrap_body(&item.body, layout.text_width);
    let start = body_scroll.min(body.len().saturating_sub(layout.body_rows));

    let mut lines = vec![
        Line::from(Span::styled(
            fit_width(&format!("[#{}] {}", item.id, item.title), layout.text_width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            fit_width(&item.meta_line(), layout.text_width),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "─".repeat(layout.text_width),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    lines.extend(
        body.iter()
            .skip(start)
            .take(layout.body_rows)
            .map(|line| Line::raw(line.clone())),
    );
    f.render_widget(Paragraph::new(lines), text_area);

    let Some(pct) = scroll_percent(body.len(), start, layout.body_rows) else {
        return;
    };
    let inner_area = inner(area);
    if inner_area.height == 0 {
        return;
    }
    let hint_row = Rect::new(
        text_area.x,
        inner_area.y + inner_area.height - 1,
        text_area.width,
        1,
    )
    .intersection(f.size());
    let hint = Paragraph::new(Span::styled(
        format!("{:>3}%", pct),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Right);
    f.render_widget(hint, hint_row);
}

pub fn draw_footer(f: &mut Frame<'_>, area: Rect, status: &str) {
    let area = area.intersection(f.size());
    if area.is_empty() {
        return;
    }
    let key = Style::default().fg(Color::LightCyan);
    let mut spans = vec![
        Span::styled("↑↓/jk", key),
        Span::raw(" select  "),
        Span::styled("PgDn/PgUp", key),
        Span::raw(" page  "),
        Span::styled("g/G", key),
        Span::raw(" top/bottom  "),
        Span::styled("s", Style::default().fg(Color::LightGreen)),
        Span::raw(" status  "),
        Span::styled("r", Style::default().fg(Color::LightYellow)),
        Span::raw(" refresh  "),
        Span::styled("q", Style::default().fg(Color::LightRed)),
        Span::raw(" quit"),
    ];
    if !status.is_empty() {
        spans.push(Span::styled("  │ ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Gray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_too_small(f: &mut Frame<'_>, area: Rect, err: &LayoutError) {
    let area = area.intersection(f.size());
    if area.is_empty() {
        return;
    }
    let message = format!(
        "Enlarge terminal (min {}x{}, now {}x{}) • q to quit",
        super::layout::MIN_WIDTH,
        super::layout::MIN_HEIGHT,
        err.width,
        err.height
    );
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::LightYellow))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

fn padded(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(PADDING),
        area.y.saturating_add(PADDING),
        area.width.saturating_sub(PADDING * 2),
        area.height.saturating_sub(PADDING * 2),
    )
}

fn fit_width(text: &str, width: usize) -> String {
    display_line(text).chars().take(width).collect()
}
