use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Tabs, Wrap,
    },
};
use unicode_width::UnicodeWidthChar;

use crate::app::{ApiStatus, App, Entry, Focus, NoticeKind};
use crate::format;
use crate::models::ModelId;
use crate::palette::FunctionTab;
use crate::state::ChatRole;

const SIDEBAR_WIDTH: u16 = 30;
const MARKET_WIDTH: u16 = 36;

fn you_label() -> Line<'static> {
    Line::from(Span::styled(
        "You:",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn ai_label() -> Line<'static> {
    Line::from(Span::styled(
        "AI:",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

/// Every transcript entry as styled lines, with a blank line after each.
pub fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in &app.transcript {
        match entry {
            Entry::Message(msg) => match msg.role {
                ChatRole::User => {
                    lines.push(you_label());
                    lines.extend(msg.content.split('\n').map(|l| Line::from(l.to_string())));
                }
                ChatRole::Assistant => {
                    lines.push(ai_label());
                    lines.extend(format::format_message(&msg.content));
                }
            },
            Entry::Typing(_) => {
                lines.push(ai_label());
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            Entry::Analysis(analysis) => {
                lines.push(ai_label());
                lines.extend(format::analysis_card(analysis));
            }
            Entry::Chart(card) => {
                lines.push(ai_label());
                lines.extend(format::chart_card(card));
            }
        }
        lines.push(Line::default());
    }

    lines
}

/// Display columns taken by the first `chars` characters of `text`.
fn prefix_width(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(|c| c.width().unwrap_or(0)).sum()
}

/// The part of `text` that fits in `width` columns after skipping `offset`
/// columns, plus the number of columns actually skipped. A wide character
/// straddling the offset is skipped whole.
fn visible_columns(text: &str, offset: usize, width: usize) -> (String, usize) {
    let mut skipped = 0;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if skipped < offset {
            skipped += w;
            continue;
        }
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    (out, skipped)
}

/// Horizontal scroll that keeps a cursor at column `cursor_x` inside `width`.
fn column_offset(cursor_x: usize, width: usize) -> usize {
    if width == 0 || cursor_x < width {
        0
    } else {
        cursor_x - width + 1
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let market_width = if app.show_market_panel { MARKET_WIDTH } else { 0 };
    let [sidebar_area, chat_column, market_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
        Constraint::Length(market_width),
    ])
    .areas(body_area);

    render_sidebar(app, frame, sidebar_area);
    render_chat_column(app, frame, chat_column);
    if app.show_market_panel {
        render_market_panel(app, frame, market_area);
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.show_model_picker {
        render_model_picker(app, frame, area);
    } else if app.show_attach_input {
        render_attach_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status_symbol, status_text, status_color) = match app.api_status {
        ApiStatus::Checking => ("○", "checking", Color::Yellow),
        ApiStatus::Connected => ("●", "connected", Color::Green),
        ApiStatus::Disconnected => ("○", "disconnected", Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" QuantDesk ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!(" {} ", app.current_model.display_name()),
            Style::default().fg(Color::White).bold(),
        ),
        Span::styled(
            format!("{} ", app.current_model.description()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!(" {} {} ", status_symbol, status_text), Style::default().fg(status_color)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(notice) = &app.notification {
        let style = match notice.kind {
            NoticeKind::Info => Style::default().bg(Color::Blue).fg(Color::White),
            NoticeKind::Success => Style::default().bg(Color::Green).fg(Color::Black),
            NoticeKind::Error => Style::default().bg(Color::Red).fg(Color::White),
        };
        let footer = Paragraph::new(Line::from(Span::styled(format!(" {} ", notice.text), style)))
            .style(Style::default().bg(Color::Black));
        frame.render_widget(footer, area);
        return;
    }

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = match app.focus {
        Focus::Input => (" INPUT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        Focus::Chat => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        Focus::Functions => (" FUNCTIONS ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let mut hints = match app.focus {
        Focus::Input => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" S-Enter ", key_style),
            Span::styled(" newline ", label_style),
        ],
        Focus::Chat => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
        ],
        Focus::Functions => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" h/l ", key_style),
            Span::styled(" tab ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" use ", label_style),
        ],
    };

    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" F2 ", key_style),
        Span::styled(" model ", label_style),
        Span::styled(" F3 ", key_style),
        Span::styled(" analyze ", label_style),
        Span::styled(" F4 ", key_style),
        Span::styled(" chart ", label_style),
        Span::styled(" F5 ", key_style),
        Span::styled(" market ", label_style),
        Span::styled(" F7 ", key_style),
        Span::styled(" attach ", label_style),
        Span::styled(" F9 ", key_style),
        Span::styled(if app.show_market_panel { " hide panel " } else { " show panel " }, label_style),
        Span::styled(" ^O ", key_style),
        Span::styled(" workflow ", label_style),
    ]);
    if app.latest_chart().is_some() {
        hints.extend(vec![
            Span::styled(" ^S ", key_style),
            Span::styled(" save chart ", label_style),
            Span::styled(" ^Y ", key_style),
            Span::styled(" copy chart ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" ^C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Functions;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let [tabs_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let titles: Vec<String> = FunctionTab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.function_tab.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Functions "),
        )
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, tabs_area);

    let items: Vec<ListItem> = app
        .function_tab
        .items()
        .iter()
        .map(|item| {
            ListItem::new(Text::from(vec![
                Line::from(format!("{} {}", item.icon, item.title)).bold(),
                Line::from(Span::styled(
                    format!("   {}", item.desc),
                    Style::default().fg(Color::Gray),
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(if focused {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        })
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.function_state);
}

fn render_chat_column(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(app.input_rows() + 2),
    ])
    .areas(area);

    // Store area for mouse hit-testing
    app.chat_area = Some(chat_area);

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Chat: {} ", app.current_model.display_name()));
    let inner = block.inner(area);

    if app.transcript.is_empty() {
        let placeholder = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                "Ask about factors, strategies or the market.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
            Line::from(Span::styled(
                "/analyze <code>  technical analysis of a stock",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "/chart <topic>   generate a chart",
                Style::default().fg(Color::DarkGray),
            )),
        ]))
        .block(block)
        .wrap(Wrap { trim: false });
        frame.render_widget(placeholder, area);
        return;
    }

    // Measure with the same word wrap used for drawing
    let paragraph = Paragraph::new(Text::from(transcript_lines(app))).wrap(Wrap { trim: false });
    let total = paragraph.line_count(inner.width).min(u16::MAX as usize) as u16;
    let max_scroll = total.saturating_sub(inner.height);

    if app.follow_tail {
        app.chat_scroll = max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(max_scroll);
        if app.chat_scroll == max_scroll {
            app.follow_tail = true;
        }
    }

    frame.render_widget(paragraph.block(block).scroll((app.chat_scroll, 0)), area);

    // Render scrollbar
    if total > inner.height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(max_scroll as usize)
            .position(app.chat_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Input;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let title = if app.busy {
        " Waiting for reply... "
    } else if app.can_send() {
        " Message (Enter to send) "
    } else {
        " Message "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_row, cursor_col) = app.input_cursor_position();
    let lines: Vec<&str> = app.input.split('\n').collect();
    let cursor_x = prefix_width(lines.get(cursor_row).copied().unwrap_or(""), cursor_col);

    // Keep the cursor visible in both directions
    let row_offset = if inner_height == 0 {
        0
    } else {
        (cursor_row + 1).saturating_sub(inner_height)
    };
    let col_offset = column_offset(cursor_x, inner_width);

    let mut cursor_skipped = 0;
    let mut visible = Vec::new();
    for (row, line) in lines.iter().enumerate().skip(row_offset).take(inner_height) {
        let (shown, skipped) = visible_columns(line, col_offset, inner_width);
        if row == cursor_row {
            cursor_skipped = skipped;
        }
        visible.push(Line::from(shown));
    }

    // Use cyan text to match the "You:" style - visible in both light and dark terminals
    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if focused && !app.show_model_picker && !app.show_attach_input {
        frame.set_cursor_position((
            area.x + 1 + cursor_x.saturating_sub(cursor_skipped) as u16,
            area.y + 1 + (cursor_row - row_offset) as u16,
        ));
    }
}

fn render_market_panel(app: &App, frame: &mut Frame, area: Rect) {
    let title = match &app.market_sentiment {
        Some(sentiment) => format!(" Market: {} ", sentiment),
        None => " Market ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
    };
    let empty = || Line::from(Span::styled("  no data", Style::default().fg(Color::DarkGray)));

    let mut lines = vec![heading("Indices")];
    if app.indices.is_empty() {
        lines.push(empty());
    }
    lines.extend(app.indices.iter().map(format::index_line));

    lines.push(Line::default());
    lines.push(heading("Sectors"));
    if app.sectors.is_empty() {
        lines.push(empty());
    }
    lines.extend(app.sectors.iter().map(format::sector_line));

    lines.push(Line::default());
    lines.push(heading("Hot Stocks"));
    if app.hot_stocks.is_empty() {
        lines.push(empty());
    }
    lines.extend(app.hot_stocks.iter().map(format::stock_line));

    let panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let models = ModelId::all();
    let popup_area = centered(area, 54, models.len() as u16 + 2);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Model (Enter to select, Esc to cancel) ");

    let items: Vec<ListItem> = models
        .iter()
        .map(|model| {
            let is_current = *model == app.current_model;
            let prefix = if is_current { "* " } else { "  " };
            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{}", prefix, model.display_name()), style),
                Span::styled(format!("  {}", model.description()), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}

fn render_attach_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 64, 7);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Attach Files ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    if inner.height < 3 {
        return;
    }

    let instructions = Paragraph::new("Comma-separated paths. Enter to attach, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let width = inner.width as usize;
    let cursor_x = prefix_width(&app.attach_input, app.attach_cursor);
    let (visible, skipped) =
        visible_columns(&app.attach_input, column_offset(cursor_x, width), width);
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan)),
        input_area,
    );

    frame.set_cursor_position((
        input_area.x + cursor_x.saturating_sub(skipped) as u16,
        input_area.y,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChartPoint;
    use crate::app::ChartCard;
    use crate::config::Config;
    use ratatui::{
        backend::{Backend, TestBackend},
        Terminal,
    };

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for row in buffer.content.chunks(width) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw(app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
    }

    #[test]
    fn test_transcript_lines_label_roles() {
        let mut app = App::new(Config::default(), None);
        app.add_message(ChatRole::User, "hi");
        app.add_message(ChatRole::Assistant, "use `ma5`");

        let text: Vec<String> = transcript_lines(&app).iter().map(format::plain).collect();
        assert_eq!(text, vec!["You:", "hi", "", "AI:", "use ma5", ""]);
    }

    #[test]
    fn test_typing_indicator_animates() {
        let mut app = App::new(Config::default(), None);
        app.add_typing_indicator();
        app.animation_frame = 2;
        let text: Vec<String> = transcript_lines(&app).iter().map(format::plain).collect();
        assert_eq!(text[1], "Thinking...");
    }

    #[test]
    fn test_visible_columns_use_display_width() {
        assert_eq!(prefix_width("分析ab", 2), 4);
        assert_eq!(prefix_width("分析ab", 3), 5);
        assert_eq!(visible_columns("分析ab", 0, 5), ("分析a".to_string(), 0));
        // A wide char is never split: it is either skipped or left out whole
        assert_eq!(visible_columns("分析ab", 1, 3), ("析a".to_string(), 2));
        assert_eq!(visible_columns("a分析", 0, 2), ("a".to_string(), 0));
        assert_eq!(column_offset(3, 10), 0);
        assert_eq!(column_offset(12, 10), 3);
    }

    #[test]
    fn test_render_shows_model_and_market() {
        let mut app = App::new(Config::default(), None);
        app.indices.push(crate::api::IndexQuote {
            name: "SSE".to_string(),
            code: "000001.SH".to_string(),
            price: 3000.0,
            change: 0.5,
        });
        let terminal = draw(&mut app);
        let text = buffer_text(&terminal);

        assert!(text.contains("QuantDesk"));
        assert!(text.contains("DeepSeek V3"));
        assert!(text.contains("Indices"));
        assert!(text.contains("+0.50%"));
        assert!(text.contains("Factor generation"));
    }

    #[test]
    fn test_hidden_market_panel_is_not_drawn() {
        let mut app = App::new(Config::default(), None);
        app.toggle_market_panel();
        let text = buffer_text(&draw(&mut app));
        assert!(!text.contains("Hot Stocks"));
    }

    #[test]
    fn test_new_entries_follow_tail() {
        let mut app = App::new(Config::default(), None);
        for i in 0..60 {
            app.add_message(ChatRole::User, format!("message {i}"));
        }
        let text = buffer_text(&draw(&mut app));
        assert!(app.chat_scroll > 0);
        assert!(text.contains("message 59"));
        assert!(!text.contains("message 0 "));
    }

    #[test]
    fn test_scroll_is_clamped_to_content() {
        let mut app = App::new(Config::default(), None);
        app.add_message(ChatRole::User, "short");
        app.follow_tail = false;
        app.chat_scroll = 500;
        draw(&mut app);
        assert_eq!(app.chat_scroll, 0);
        assert!(app.follow_tail);
    }

    #[test]
    fn test_chart_card_and_picker_render() {
        let mut app = App::new(Config::default(), None);
        app.transcript.push(Entry::Chart(ChartCard::new(
            "Data Analysis Chart",
            "data:image/png;base64,AAAA".to_string(),
            vec![ChartPoint { x: 0, y: 1.0 }, ChartPoint { x: 1, y: 2.0 }],
        )));
        app.open_model_picker();
        let text = buffer_text(&draw(&mut app));

        assert!(text.contains("Data Analysis Chart"));
        assert!(text.contains("Select Model"));
        assert!(text.contains("* DeepSeek V3"));
        assert!(text.contains("GLM-4 9B"));
    }

    #[test]
    fn test_word_wrapped_replies_keep_newest_entry_visible() {
        let mut app = App::new(Config::default(), None);
        let word = "x".repeat(36);
        let reply = vec![word.as_str(); 6].join(" ");
        for _ in 0..8 {
            app.add_message(ChatRole::Assistant, reply.clone());
        }
        app.add_message(ChatRole::Assistant, "FINAL-MARKER");

        let text = buffer_text(&draw(&mut app));
        assert!(app.chat_scroll > 0);
        assert!(text.contains("FINAL-MARKER"));
    }

    #[test]
    fn test_input_cursor_counts_wide_chars_as_two_columns() {
        let mut app = App::new(Config::default(), None);
        app.insert_char('分');
        app.insert_char('析');
        let mut terminal = draw(&mut app);

        // Input text starts one column inside the chat column's border
        let cursor = terminal.backend_mut().get_cursor_position().unwrap();
        assert_eq!((cursor.x, cursor.y), (SIDEBAR_WIDTH + 1 + 4, 37));
    }

    #[test]
    fn test_long_wide_input_scrolls_with_cursor() {
        let mut app = App::new(Config::default(), None);
        for _ in 0..60 {
            app.insert_char('分');
        }
        let mut terminal = draw(&mut app);
        let cursor = terminal.backend_mut().get_cursor_position().unwrap();
        // Chat column is 74 wide, so the input has 72 columns inside its border
        let input_right = SIDEBAR_WIDTH + 1 + 72;
        assert!(cursor.x < input_right);
        assert!(cursor.x >= input_right - 2);
    }
}
