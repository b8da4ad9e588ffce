//! Text → styled lines for the transcript and market panel.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

use crate::api::{IndexQuote, SectorQuote, StockAnalysis, StockQuote};
use crate::app::ChartCard;

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn code_style() -> Style {
    Style::default().fg(Color::Green).bg(Color::Black)
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").expect("fence pattern is valid"))
}

fn inline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"`([^`]+)`|\*\*([^*]+)\*\*").expect("inline pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block<'a> {
    Text(&'a str),
    Code(&'a str),
}

/// Split on fenced code blocks. An unterminated fence stays plain text.
/// The newline on either side of a fence belongs to the fence.
fn split_blocks(content: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut last = 0;

    for caps in fence_pattern().captures_iter(content) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let before = &content[last..whole.start()];
        let before = if last > 0 { before.strip_prefix('\n').unwrap_or(before) } else { before };
        let before = before.strip_suffix('\n').unwrap_or(before);
        if !before.is_empty() {
            blocks.push(Block::Text(before));
        }
        blocks.push(Block::Code(body.as_str().strip_suffix('\n').unwrap_or(body.as_str())));
        last = whole.end();
    }

    let tail = &content[last..];
    let tail = if last > 0 { tail.strip_prefix('\n').unwrap_or(tail) } else { tail };
    if !tail.is_empty() {
        blocks.push(Block::Text(tail));
    }
    blocks
}

/// `code` and **bold** spans within one line.
fn inline_spans(text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in inline_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::raw(text[last..whole.start()].to_string()));
        }
        if let Some(code) = caps.get(1) {
            spans.push(Span::styled(code.as_str().to_string(), code_style()));
        } else if let Some(bold) = caps.get(2) {
            spans.push(Span::styled(
                bold.as_str().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::raw(text[last..].to_string()));
    }
    spans
}

/// Render a message body: fenced code blocks, inline code, bold, and hard line breaks.
pub fn format_message(content: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for block in split_blocks(content) {
        match block {
            Block::Code(code) => {
                for line in code.split('\n') {
                    lines.push(Line::from(Span::styled(format!(" {} ", line), code_style())));
                }
            }
            Block::Text(text) => {
                for line in text.split('\n') {
                    let spans = inline_spans(line);
                    lines.push(if spans.is_empty() { Line::default() } else { Line::from(spans) });
                }
            }
        }
    }
    lines
}

/// Two decimals with a sign; `+` only for strictly positive values.
pub fn signed_pct(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Market-list variant: flat counts as up.
pub fn change_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

fn change_style(value: f64) -> Style {
    if value >= 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn indicator(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string())
}

fn signal(value: Option<&str>) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or("N/A").to_string()
}

pub fn analysis_card(analysis: &StockAnalysis) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(format!("Stock analysis - {}", analysis.code), heading)),
        Line::from(format!("  📊 Latest price: ¥{:.2}", analysis.latest_price)),
        Line::from(vec![
            Span::raw("  📈 Change: "),
            Span::styled(signed_pct(analysis.change_pct), change_style(analysis.change_pct)),
        ]),
        Line::from(Span::styled("  Indicators:", Style::default().add_modifier(Modifier::BOLD))),
    ];

    let ind = &analysis.indicators;
    for (name, value) in [("MA5", ind.ma5), ("MA20", ind.ma20), ("RSI", ind.rsi), ("MACD", ind.macd)] {
        lines.push(Line::from(format!("    • {}: {}", name, indicator(value))));
    }

    lines.push(Line::from(Span::styled("  Signals:", Style::default().add_modifier(Modifier::BOLD))));
    let sig = &analysis.signals;
    for (name, value) in [
        ("Trend", sig.trend.as_deref()),
        ("RSI", sig.rsi_signal.as_deref()),
        ("MACD", sig.macd_signal.as_deref()),
    ] {
        lines.push(Line::from(format!("    • {}: {}", name, signal(value))));
    }
    lines
}

/// One block character per value, scaled between the series min and max.
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if !span.is_finite() || span <= f64::EPSILON {
                SPARK_BLOCKS[SPARK_BLOCKS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_BLOCKS.len() - 1) as f64).round() as usize;
                SPARK_BLOCKS[idx.min(SPARK_BLOCKS.len() - 1)]
            }
        })
        .collect()
}

pub fn chart_card(card: &ChartCard) -> Vec<Line<'static>> {
    let values: Vec<f64> = card.series.iter().map(|p| p.y).collect();
    let size = card
        .image_size
        .map(|bytes| format!("{} KB image", bytes.div_ceil(1024)))
        .unwrap_or_else(|| "image not decodable".to_string());

    vec![
        Line::from(Span::styled(
            card.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("  {}", sparkline(&values)), Style::default().fg(Color::Magenta))),
        Line::from(Span::styled(format!("  {}", size), Style::default().fg(Color::DarkGray))),
        Line::from(vec![
            Span::styled(" Ctrl+S ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" download  "),
            Span::styled(" Ctrl+Y ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" copy"),
        ]),
    ]
}

pub fn index_line(quote: &IndexQuote) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", quote.name), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", quote.code), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{:.2} ", quote.price)),
        Span::styled(change_pct(quote.change), change_style(quote.change)),
    ])
}

pub fn sector_line(quote: &SectorQuote) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", quote.name), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", quote.leader), Style::default().fg(Color::DarkGray)),
        Span::styled(change_pct(quote.change), change_style(quote.change)),
    ])
}

pub fn stock_line(quote: &StockQuote) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", quote.name), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", quote.code), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{:.2} ", quote.price)),
        Span::styled(change_pct(quote.change), change_style(quote.change)),
    ])
}

/// Concatenated span text.
#[cfg(test)]
pub fn plain(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
