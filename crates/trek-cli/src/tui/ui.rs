//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Create vertical layout for status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer_chunks[0]);

    draw_entries_pane(frame, app, pane_chunks[0]);
    draw_detail_pane(frame, app, pane_chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[1]),
        InputMode::Command => draw_command_input(frame, app, outer_chunks[1]),
        InputMode::ConfirmDelete => {
            draw_status_bar(frame, app, outer_chunks[1]);
            draw_confirm_delete(frame, app);
        }
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(error) = &app.error_message {
        draw_error_modal(frame, error);
    }
}

/// Draw the entries pane (left)
fn draw_entries_pane(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Journal ({}) ", app.view.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    if let Some(placeholder) = app.view.placeholder() {
        let paragraph = Paragraph::new(placeholder)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    }

    let max_len = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .view
        .entries()
        .iter()
        .map(|entry| {
            let mut title = clip(&entry.title, max_len);
            if entry.image.is_some() {
                title.push_str(" 📷");
            }

            let date_line = Line::from(vec![Span::styled(
                entry.local_date(),
                Style::default().fg(Color::Cyan),
            )]);

            let preview = entry.preview(max_len).replace('\n', " ");
            let preview_line = Line::from(vec![Span::styled(
                preview,
                Style::default().add_modifier(Modifier::DIM),
            )]);

            ListItem::new(vec![Line::from(title), date_line, preview_line])
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(Some(app.view.selected_index()));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the detail pane (right)
fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    let content = if let Some(entry) = app.selected_entry() {
        let mut lines = vec![
            Line::from(Span::styled(entry.title.as_str(), bold)),
            Line::from(Span::styled(
                entry.local_date(),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
        ];

        if let Some(location) = &entry.location {
            lines.push(Line::from(vec![
                Span::styled("Location: ", bold),
                Span::raw(location.as_str()),
            ]));
        }
        if let Some(image) = &entry.image {
            lines.push(Line::from(vec![
                Span::styled("Photo: ", bold),
                Span::raw(image.as_str()),
            ]));
        }
        if entry.location.is_some() || entry.image.is_some() {
            lines.push(Line::from(""));
        }

        if entry.description.is_empty() {
            lines.push(Line::from(Span::styled(
                "No description. Press E to write one.",
                Style::default().add_modifier(Modifier::DIM),
            )));
        } else {
            lines.extend(entry.description.lines().map(Line::from));
        }

        lines
    } else {
        vec![Line::from(Span::styled(
            "Nothing selected",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = match &app.status_message {
        Some(msg) => msg.clone(),
        None => "a:add  e:title  E:description  d:del  r:reload  ?:help  q:quit".to_string(),
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw command input at the bottom
fn draw_command_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = app.command_type.map(|c| c.prompt()).unwrap_or(":");

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(app.command_input.as_str()),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = area.x + prefix.chars().count() as u16 + app.command_cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw the delete confirmation prompt
fn draw_confirm_delete(frame: &mut Frame, app: &App) {
    let title = app.pending_delete_title().unwrap_or_default();
    let popup_area = centered_rect(frame.area(), 44, 5);

    frame.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(format!("Delete \"{}\"?", clip(title, 36))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(": delete   "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": keep"),
        ]),
    ];

    let block = Block::default()
        .title(" Delete entry ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}

fn draw_error_modal(frame: &mut Frame, error: &str) {
    let popup_area = centered_rect(frame.area(), 60, 8);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(error)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(frame.area(), 50, 20);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  g/G         First/last entry"),
        Line::from("  J/K         Scroll detail"),
        Line::from(""),
        Line::from("Entries:"),
        Line::from("  a           Add entry"),
        Line::from("  e           Edit title"),
        Line::from("  E           Edit description"),
        Line::from("  d           Delete entry"),
        Line::from("  r           Reload"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Clip to `max` characters with a trailing ellipsis
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
