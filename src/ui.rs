use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use crate::palette::CATEGORY_PALETTE;
use crate::state::{AppState, Focus};

/// Szerokość panelu z filtrami
const PANEL_WIDTH: u16 = 34;

pub fn draw(f: &mut Frame, state: &AppState) {
    let legend = legend_lines(f.area().width);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(legend.len() as u16 + 1),
            Constraint::Length(1),
        ].as_ref())
        .split(f.area());

    let body = if state.filters_open {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(0)].as_ref())
            .split(rows[0]);
        draw_filters(f, cols[0], state);
        cols[1]
    } else {
        rows[0]
    };

    // Mapa
    let title = if state.filter.is_unset() {
        format!("地図  {}", state.hits_label())
    } else {
        format!("地図 (絞り込み中)  {}", state.hits_label())
    };
    state.map.draw(f, body, &title, state.highlighted());

    draw_legend(f, rows[1], legend);

    // Pasek stanu: licznik, przełącznik panelu, adres
    let status = Line::from(vec![
        Span::styled(state.hits_label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::raw(format!("F2: {}", state.toggle_label())),
        Span::raw(" | "),
        Span::styled(state.address.href(), Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(status), rows[2]);

    if let Some(popup) = state.popup() {
        let area = popup_area(body, 60, 40);
        let text = vec![
            Line::from(Span::styled(popup.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(popup.subtitle.clone()),
            Line::from(popup.body.clone()),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("詳細"))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(paragraph, area);
    }
}

fn draw_filters(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ].as_ref())
        .split(area);

    for (idx, focus) in [Focus::Category, Focus::Region, Focus::Vegetation, Focus::Query].into_iter().enumerate() {
        let mut value = state.control_value(focus).to_string();
        if focus == Focus::Query && state.focus == Focus::Query {
            value.push('▏');
        } else if focus != Focus::Query {
            value = format!("◀ {} ▶", value);
        }
        let widget = Paragraph::new(value).block(control_block(focus.label(), state.focus == focus));
        f.render_widget(widget, chunks[idx]);
    }

    // Przyciski
    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[4]);
    let clear = Paragraph::new(Focus::Clear.label())
        .alignment(Alignment::Center)
        .block(control_block("", state.focus == Focus::Clear));
    f.render_widget(clear, buttons[0]);
    let share = Paragraph::new(state.share_label())
        .alignment(Alignment::Center)
        .block(control_block("", state.focus == Focus::Share));
    f.render_widget(share, buttons[1]);

    let help = Paragraph::new(AppState::HELP_TEXT)
        .block(Block::default().borders(Borders::ALL).title(state.toggle_label()))
        .wrap(Wrap { trim: true });
    f.render_widget(help, chunks[5]);
}

fn control_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title)
}

/// Legenda: wszystkie typy w stałej kolejności, pakowane w wiersze
/// tak, żeby żaden wpis nie był łamany
fn legend_lines(width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for (label, color) in CATEGORY_PALETTE.iter() {
        let entry = [
            Span::styled("■ ", Style::default().fg(*color)),
            Span::raw(format!("{}  ", label)),
        ];
        let entry_width: usize = entry.iter().map(Span::width).sum();
        if used > 0 && used + entry_width > width {
            lines.push(Line::from(std::mem::take(&mut current)));
            used = 0;
        }
        used += entry_width;
        current.extend(entry);
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

fn draw_legend(f: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let legend = Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP).title("凡例"));
    f.render_widget(legend, area);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ].as_ref())
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::app;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect()
    }

    #[test]
    fn status_line_shows_current_address() {
        let mut state = app("");
        state.handle_input(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        let mut terminal = Terminal::new(TestBackend::new(200, 40)).unwrap();
        terminal.draw(|f| draw(f, &state)).unwrap();

        let status = row_text(terminal.backend().buffer(), 39);
        assert!(status.contains("https://localhost/landforms/#type=%E7%81%AB"), "{status}");
        assert!(status.contains("&pref=&veg=&q="), "{status}");
    }

    #[test]
    fn legend_lists_every_category_on_narrow_terminal() {
        let mut state = app("");
        state.handle_input(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE));
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        terminal.draw(|f| draw(f, &state)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..24).map(|y| row_text(buffer, y).replace(' ', "")).collect();
        for (label, _) in CATEGORY_PALETTE.iter() {
            assert!(screen.contains(label), "{label} missing");
        }
        assert!(legend_lines(60).len() > 3);
    }

    #[test]
    fn collapsed_panel_and_popup_render() {
        let mut state = app("");
        state.handle_input(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE));
        state.handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(state.popup().is_some());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &state)).unwrap();
    }
}
