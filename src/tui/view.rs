//! Drawing the interface from state.
//!
//! Everything on screen is rebuilt from a [`ViewModel`] on every frame: the
//! list selector, the current list's item rows, the notes field and the
//! status bar. Given the same model the output buffer is identical, so the
//! caller never patches the screen by hand.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::fields::Tag;
use crate::state::AppState;
use crate::tui::{
    colors::{tag_color, BAR},
    enums::{Focus, Mode},
    input::InputField,
    utils::centered_rect,
};

const LIST_PANEL_WIDTH: u16 = 28;
const NOTES_HEIGHT: u16 = 8;
const HIGHLIGHT: &str = "> ";
const CHECKBOX_WIDTH: u16 = 3;

/// Everything the renderer needs, borrowed from the controller.
pub struct ViewModel<'a> {
    pub state: &'a AppState,
    pub focus: Focus,
    pub editor: &'a InputField,
    pub mode: Mode,
    pub status: &'a str,
}

/// Draw the whole screen.
pub fn draw(f: &mut Frame, model: &ViewModel) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LIST_PANEL_WIDTH), Constraint::Min(20)])
        .split(rows[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(NOTES_HEIGHT)])
        .split(columns[1]);

    let cursor_lists = draw_lists(f, columns[0], model);
    let cursor_items = draw_items(f, right[0], model);
    let cursor_notes = draw_notes(f, right[1], model);
    draw_status_bar(f, rows[1], model);

    if model.mode == Mode::Help {
        draw_help(f, rows[0]);
        return;
    }
    if let Some(pos) = cursor_lists.or(cursor_items).or(cursor_notes) {
        f.set_cursor_position(pos);
    }
}

fn focused_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title)
}

/// Text shown for a field: the editor value when it holds focus, else the
/// stored value.
fn field_text<'a>(model: &'a ViewModel, focused: bool, stored: &'a str) -> &'a str {
    if focused {
        model.editor.value.as_str()
    } else {
        stored
    }
}

/// Clamp a cursor column so it stays inside `area`.
fn cursor_x(area: Rect, offset: u16, col: usize) -> u16 {
    let max = area.x + area.width.saturating_sub(2);
    (area.x + offset).saturating_add(col as u16).min(max)
}

/// The list selector, one title per list with the current one marked.
fn draw_lists(f: &mut Frame, area: Rect, model: &ViewModel) -> Option<(u16, u16)> {
    let state = model.state;
    let current = state.current_index();
    let focused_idx = match model.focus {
        Focus::ListTitle(i) => Some(i),
        _ => None,
    };

    let items: Vec<ListItem> = state
        .lists()
        .iter()
        .enumerate()
        .map(|(i, list)| {
            let text = field_text(model, focused_idx == Some(i), &list.title);
            let (text, style) = if text.is_empty() {
                ("(untitled)".to_string(), Style::default().fg(Color::DarkGray))
            } else {
                (text.to_string(), Style::default())
            };
            let style = if i == current {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            };
            let open = list.open_count();
            ListItem::new(Line::from(vec![
                Span::styled(text, style),
                Span::styled(format!(" ({open})"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(focused_block(format!("Lists ({})", state.lists().len()), focused_idx.is_some()))
        .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
        .highlight_symbol(HIGHLIGHT);

    let mut list_state = ListState::default();
    list_state.select(Some(current));
    f.render_stateful_widget(list, area, &mut list_state);

    let idx = focused_idx?;
    let row = idx.checked_sub(list_state.offset())?;
    let inner = area.inner(ratatui::layout::Margin { horizontal: 1, vertical: 1 });
    if row as u16 >= inner.height {
        return None;
    }
    let x = cursor_x(area, 1 + HIGHLIGHT.len() as u16, model.editor.cursor);
    Some((x, inner.y + row as u16))
}

/// The current list's item rows.
fn draw_items(f: &mut Frame, area: Rect, model: &ViewModel) -> Option<(u16, u16)> {
    let list = model.state.current_list();
    let focused_idx = match model.focus {
        Focus::Item(i) if i < list.items.len() => Some(i),
        _ => None,
    };

    let rows: Vec<Row> = list
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let done = item.tags.done;
            let text = field_text(model, focused_idx == Some(i), &item.text);
            let text_style = if done {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            let mut cells = vec![
                Cell::from(if done { "[x]" } else { "[ ]" }),
                Cell::from(Span::styled(text.to_string(), text_style)),
                Cell::from(Span::styled("✕", Style::default().fg(Color::Red))),
            ];
            for tag in Tag::CATEGORIES {
                let cell = if item.tags.get(tag) {
                    Span::styled(
                        tag.marker().to_string(),
                        Style::default().fg(tag_color(tag)).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled("·", Style::default().fg(Color::DarkGray))
                };
                cells.push(Cell::from(cell));
            }
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![
        Constraint::Length(CHECKBOX_WIDTH),
        Constraint::Min(10),
        Constraint::Length(1),
    ];
    widths.extend(Tag::CATEGORIES.iter().map(|_| Constraint::Length(1)));

    let title = format!(
        "{} ({}/{} open)",
        if list.title.is_empty() { "(untitled)" } else { list.title.as_str() },
        list.open_count(),
        list.items.len()
    );
    let table = Table::new(rows, widths)
        .block(focused_block(title, matches!(model.focus, Focus::Item(_))))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(HIGHLIGHT);

    let mut table_state = TableState::default();
    table_state.select(focused_idx);
    f.render_stateful_widget(table, area, &mut table_state);

    if list.items.is_empty() {
        let hint = Paragraph::new("No items. Press Enter or Ctrl+T to add one.")
            .style(Style::default().fg(Color::DarkGray));
        let inner = area.inner(ratatui::layout::Margin { horizontal: 2, vertical: 1 });
        f.render_widget(hint, inner);
    }

    let idx = focused_idx?;
    let row = idx.checked_sub(table_state.offset())?;
    let inner = area.inner(ratatui::layout::Margin { horizontal: 1, vertical: 1 });
    if row as u16 >= inner.height {
        return None;
    }
    // Highlight symbol, checkbox column, one column of spacing.
    let offset = 1 + HIGHLIGHT.len() as u16 + CHECKBOX_WIDTH + 1;
    let x = cursor_x(area, offset, model.editor.cursor);
    Some((x, inner.y + row as u16))
}

/// The current list's notes.
fn draw_notes(f: &mut Frame, area: Rect, model: &ViewModel) -> Option<(u16, u16)> {
    let focused = model.focus == Focus::Notes;
    let notes = field_text(model, focused, &model.state.current_list().notes);
    let inner_height = area.height.saturating_sub(2) as usize;

    let (line, col) = if focused {
        model.editor.cursor_line_col()
    } else {
        (0, 0)
    };
    // Keep the cursor line visible.
    let scroll = if inner_height > 0 && line >= inner_height {
        line - (inner_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(notes.to_string())
        .block(focused_block("Notes".to_string(), focused))
        .scroll((scroll as u16, 0));
    f.render_widget(paragraph, area);

    if !focused || inner_height == 0 {
        return None;
    }
    let x = cursor_x(area, 1, col);
    Some((x, area.y + 1 + (line - scroll) as u16))
}

fn draw_status_bar(f: &mut Frame, area: Rect, model: &ViewModel) {
    let text = if !model.status.is_empty() {
        model.status.to_string()
    } else {
        match model.mode {
            Mode::Help => "Help | Press any key to return".to_string(),
            Mode::Lists => {
                "Tab Switch pane | Ctrl+N New list | Ctrl+T New item | Ctrl+S Sort | F1 Help | Esc Quit"
                    .to_string()
            }
        }
    };
    let bar = Paragraph::new(text)
        .style(Style::default().bg(BAR).fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(bar, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("To-do Lists Help", bold)),
        Line::from(""),
        Line::from(Span::styled("Items:", bold)),
        Line::from("  Enter             New item below"),
        Line::from("  Ctrl+Space        Toggle done"),
        Line::from("  Ctrl+Delete       Delete item"),
        Line::from("  Backspace         Delete item when its text is empty"),
        Line::from("  ↑/↓               Previous / next item (wraps)"),
        Line::from("  Ctrl+↑/↓          Move item up / down (wraps)"),
        Line::from("  Alt+1..6          Toggle pinned, health, project, life,"),
        Line::from("                    maintenance, entertainment"),
        Line::from(""),
        Line::from(Span::styled("Lists:", bold)),
        Line::from("  ↑/↓               Select list (type to rename)"),
        Line::from("  Ctrl+N            New list carrying over open items"),
        Line::from("  Ctrl+D            Delete current list"),
        Line::from("  Ctrl+S            Sort: open items first"),
        Line::from("  Ctrl+T            New item before the first done one"),
        Line::from(""),
        Line::from(Span::styled("General:", bold)),
        Line::from("  Tab / Shift+Tab   Switch between lists, items and notes"),
        Line::from("  F1                Show this help"),
        Line::from("  Esc / Ctrl+Q      Quit"),
    ];

    let area = centered_rect(70, 80, area);
    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Command, Position};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn render(model: &ViewModel) -> Buffer {
        let backend = TestBackend::new(90, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, model)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn sample_state() -> AppState {
        let mut state = AppState::seed("MON 2024/1/1");
        state.apply(Command::NewTodo(Position::BeforeFirstDone));
        state.apply(Command::EditText { index: 0, text: "write report".into() });
        state.apply(Command::NewTodo(Position::Index(1)));
        state.apply(Command::EditText { index: 1, text: "water plants".into() });
        state.apply(Command::ToggleTag(1, Tag::Done));
        state.apply(Command::EditNotes { list_id: 0, notes: "dentist friday".into() });
        state
    }

    #[test]
    fn test_render_is_idempotent() {
        let state = sample_state();
        let editor = InputField::with_value("write report");
        let model = ViewModel {
            state: &state,
            focus: Focus::Item(0),
            editor: &editor,
            mode: Mode::Lists,
            status: "",
        };
        assert_eq!(render(&model), render(&model));
    }

    #[test]
    fn test_render_shows_all_regions() {
        let state = sample_state();
        let editor = InputField::with_value("MON 2024/1/1");
        let model = ViewModel {
            state: &state,
            focus: Focus::ListTitle(0),
            editor: &editor,
            mode: Mode::Lists,
            status: "",
        };
        let text = buffer_text(&render(&model));
        assert!(text.contains("MON 2024/1/1"));
        assert!(text.contains("write report"));
        assert!(text.contains("[x]"));
        assert!(text.contains("dentist friday"));
        assert!(text.contains("(1/2 open)"));
    }

    #[test]
    fn test_focused_field_shows_editor_value() {
        let state = sample_state();
        let editor = InputField::with_value("write report today");
        let model = ViewModel {
            state: &state,
            focus: Focus::Item(0),
            editor: &editor,
            mode: Mode::Lists,
            status: "saved",
        };
        let text = buffer_text(&render(&model));
        assert!(text.contains("write report today"));
        assert!(text.contains("saved"));
    }

    #[test]
    fn test_help_overlay() {
        let state = sample_state();
        let editor = InputField::new();
        let model = ViewModel {
            state: &state,
            focus: Focus::Notes,
            editor: &editor,
            mode: Mode::Help,
            status: "",
        };
        assert!(buffer_text(&render(&model)).contains("To-do Lists Help"));
    }
}
