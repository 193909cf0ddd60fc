use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::domain::DashConfig;
use crate::model::{ColumnView, Model, UIData};
use crate::records::ProjectField;

pub const COLUMN_WIDTH_MARGIN: usize = 2;
pub const PROGRESS_BAR_WIDTH: usize = 10;
pub const PROGRESS_COLUMN_WIDTH: usize = PROGRESS_BAR_WIDTH + 6;
pub const SIDEBAR_WIDTH: u16 = 14;
pub const CMDLINE_HEIGH: u16 = 1;
pub const PAGINATION_HEIGHT: u16 = 1;

const SIDEBAR_ITEMS: [&str; 4] = ["Dashboard", "Projects", "Clients", "Settings"];

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            max_column_width: cfg.max_column_width,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let area = frame.area();

        let [body, cmdline] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(CMDLINE_HEIGH)])
            .areas(area);

        let main = if uidata.sidebar_visible {
            let [sidebar, main] = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
                .areas(body);
            Self::render_sidebar(frame, sidebar);
            main
        } else {
            body
        };

        let [table_area, pagination] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(PAGINATION_HEIGHT)])
            .areas(main);

        self.render_table(frame, uidata, table_area);
        Self::render_pagination(frame, uidata, pagination);
        Self::render_cmdline(frame, uidata, cmdline);

        if uidata.show_popup {
            Self::render_popup(frame, &uidata.popup_message, area);
        }
    }

    fn render_sidebar(frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(" Logo ".bold()), Line::from("")];
        for (idx, item) in SIDEBAR_ITEMS.iter().enumerate() {
            let style = if idx == 1 {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(format!(" {item}"), style)));
        }
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_table(&self, frame: &mut Frame, uidata: &UIData, area: Rect) {
        let header = Row::new(
            uidata
                .table
                .iter()
                .map(|c| Cell::from(c.name.clone()))
                .collect::<Vec<_>>(),
        )
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows: Vec<Row> = (0..nrows)
            .map(|ridx| {
                Row::new(
                    uidata
                        .table
                        .iter()
                        .map(|column| self.build_cell(column, uidata, ridx))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let widths: Vec<Constraint> = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16))
            .collect();

        let mut title = format!(" {} ", uidata.name);
        if !uidata.search_query.is_empty() {
            title.push_str(&format!("[/{}] ", uidata.search_query));
        }
        if let Some(field) = uidata.sort_key.field() {
            title.push_str(&format!("[sort: {field} {}] ", uidata.sort_order.arrow()));
        }
        for (field, pattern) in uidata.filters.iter() {
            title.push_str(&format!("[{field}={pattern}] "));
        }

        let block = Block::bordered()
            .title(Line::from(Span::styled(title, Style::default().bold())))
            .title_bottom(Line::from(" ? help ").right_aligned())
            .border_set(border::ROUNDED);

        if rows.is_empty() {
            let empty = Paragraph::new(Text::from("No projects match the current filters."))
                .centered()
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = TableState::default().with_selected(Some(uidata.selected_row));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn build_cell<'a>(&self, column: &'a ColumnView, uidata: &UIData, ridx: usize) -> Cell<'a> {
        match column.field {
            ProjectField::Progress => {
                let percent = uidata.progress.get(ridx).copied().flatten();
                Cell::from(progress_bar(percent))
            }
            ProjectField::Status => {
                let status = &column.data[ridx];
                Cell::from(status.as_str()).style(Style::default().fg(status_color(status)))
            }
            _ => Cell::from(truncate(&column.data[ridx], self.max_column_width)),
        }
    }

    fn render_pagination(frame: &mut Frame, uidata: &UIData, area: Rect) {
        let prev_style = if uidata.page > 1 {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let next_style = if uidata.page < uidata.total_pages {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let line = Line::from(vec![
            Span::raw(format!(
                "{} of {} projects   ",
                uidata.filtered_count, uidata.total_count
            )),
            Span::styled("◀ Previous", prev_style),
            Span::raw(format!("  Page {} of {}  ", uidata.page, uidata.total_pages)),
            Span::styled("Next ▶ ", next_style),
        ])
        .right_aligned();
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_cmdline(frame: &mut Frame, uidata: &UIData, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = uidata.cmd_mode.map(|m| m.prompt()).unwrap_or("");
            let line = Line::from(vec![
                Span::styled(prompt, Style::default().fg(Color::Blue).bold()),
                Span::raw(uidata.cmdinput.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + (prompt.chars().count() + uidata.cmdinput.curser_pos) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        } else {
            let line = Line::from(Span::styled(
                uidata.status_message.clone(),
                Style::default().fg(Color::Yellow),
            ));
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn render_popup(frame: &mut Frame, message: &str, area: Rect) {
        let popup = centered_rect(60, 80, area);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> close ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message.to_string())
                .block(block)
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .areas(area);
    let [_, center, _] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .areas(middle);
    center
}

fn progress_bar(percent: Option<u16>) -> String {
    let filled = percent
        .map(|p| (p as usize * PROGRESS_BAR_WIDTH).div_ceil(100))
        .unwrap_or(0);
    let label = percent.map(|p| format!(" {p:>3}%")).unwrap_or_default();
    format!(
        "{}{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_BAR_WIDTH - filled),
        label
    )
}

fn status_color(status: &str) -> Color {
    match status.to_lowercase().as_str() {
        "completed" => Color::Green,
        "in progress" => Color::Cyan,
        "pending" => Color::Yellow,
        "on hold" => Color::Red,
        _ => Color::Gray,
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width < 3 {
        return String::new();
    }
    let mut reduced: String = s.chars().take(width - 3).collect();
    reduced.push_str("...");
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::table::SourceList;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn progress_bar_fills_by_percent() {
        assert_eq!(progress_bar(Some(0)), format!("{}   0%", "░".repeat(10)));
        assert_eq!(progress_bar(Some(100)), format!("{} 100%", "█".repeat(10)));
        assert_eq!(
            progress_bar(Some(45)),
            format!("{}{}  45%", "█".repeat(5), "░".repeat(5))
        );
        assert_eq!(progress_bar(None), "░".repeat(10));
    }

    #[test]
    fn truncate_marks_cut_values() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer value", 8), "a muc...");
        assert_eq!(truncate("abcdef", 2), "");
    }

    #[test]
    fn status_colors() {
        assert_eq!(status_color("Completed"), Color::Green);
        assert_eq!(status_color("on hold"), Color::Red);
        assert_eq!(status_color("unknown"), Color::Gray);
    }

    fn render(model: &Model) -> String {
        let backend = TestBackend::new(160, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut ui = TableUI::new(&DashConfig::default());
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn draws_sidebar_table_and_pagination() {
        let model = Model::init(&DashConfig::default(), SourceList::seed());
        let screen = render(&model);
        assert!(screen.contains("Logo"));
        assert!(screen.contains("Ava Thompson"));
        assert!(screen.contains("Page 1 of 3"));
        assert!(screen.contains("Loaded 20 projects"));
    }

    #[test]
    fn hidden_sidebar_and_help_popup() {
        let mut model = Model::init(&DashConfig::default(), SourceList::seed());
        model.update(Some(Message::ToggleSidebar)).unwrap();
        model.update(Some(Message::Help)).unwrap();
        let screen = render(&model);
        assert!(!screen.contains("Logo"));
        assert!(screen.contains("Help"));
    }
}
