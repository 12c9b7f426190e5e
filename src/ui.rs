pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    evaluator::Outcome,
    histogram::BinScale,
    runtime::Clock,
    session::Phase,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const DIAGNOSED_COLOR: Color = Color::Blue;
const CONTROL_COLOR: Color = Color::Rgb(255, 165, 0);

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::Distribution => render_distribution(self, area, buf),
        }
    }
}

fn render_typing<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let tracker = &app.tracker;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let done_style = Style::default().fg(Color::Green).add_modifier(Modifier::DIM);
    let current_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let prompt = tracker.words().iter().collect::<Vec<_>>().join(" ");
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines = if prompt.width() <= max_chars_per_line as usize {
        1
    } else {
        (prompt.width() as f64 / max_chars_per_line as f64).ceil() as u16 + 1
    };
    let padding = area.height.saturating_sub(prompt_lines + 6) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2), // time left
            Constraint::Length(prompt_lines),
            Constraint::Length(2), // input echo
            Constraint::Length(1), // live stats
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let timer = Paragraph::new(Span::styled(
        format!("Time: {}s", tracker.state().seconds_remaining),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    timer.render(chunks[1], buf);

    let current = tracker.state().word_index;
    let spans = tracker
        .words()
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let style = match i.cmp(&current) {
                std::cmp::Ordering::Less => done_style,
                std::cmp::Ordering::Equal => current_style,
                std::cmp::Ordering::Greater => dim_bold_style,
            };
            Span::styled(format!("{word} "), style)
        })
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let echo = if app.input.is_empty() && tracker.phase() == Phase::Idle {
        Span::styled("start typing to begin", Style::default().add_modifier(Modifier::ITALIC))
    } else {
        Span::styled(format!("> {}", app.input.replace(' ', "·")), bold_style)
    };
    Paragraph::new(echo)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!(
            "WPM: {}   Accuracy: {}%",
            tracker.live_wpm(),
            tracker.live_accuracy()
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        "(tab) restart / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

fn render_results<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // wpm / accuracy
            Constraint::Length(2), // comparison
            Constraint::Length(1), // previous result
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let completion = app.tracker.completion();
    render_distribution_chart(app, completion.map(|c| c.wpm as f64), chunks[0], buf);

    if let Some(c) = completion {
        Paragraph::new(Span::styled(
            format!("{} wpm   {}% acc", c.wpm, c.accuracy),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled(
        outcome_text(&app.outcome()),
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[2], buf);

    if let Some(prev) = &app.previous {
        Paragraph::new(Span::styled(
            format!(
                "previous run: {} wpm, {}% acc ({})",
                prev.wpm,
                prev.accuracy,
                prev.recorded_at.format("%Y-%m-%d %H:%M")
            ),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled(
        "(r)etry / (h)istogram / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[5], buf);
}

fn render_distribution<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2), // group summaries
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let marker = app.tracker.completion().map(|c| c.wpm as f64);
    render_distribution_chart(app, marker, chunks[0], buf);

    if let Some(data) = app.reference() {
        let describe = |label: &str, diagnosed: bool| {
            let g = data.group_summary(diagnosed);
            match (g.mean_speed, g.std_dev_speed) {
                (Some(m), Some(sd)) => format!("{label}: n={} mean {m:.1} sd {sd:.1}", g.count),
                _ => format!("{label}: n=0"),
            }
        };
        Paragraph::new(vec![
            Line::styled(
                describe("Has Parkinson's", true),
                Style::default().fg(DIAGNOSED_COLOR),
            ),
            Line::styled(
                describe("No Parkinson's", false),
                Style::default().fg(CONTROL_COLOR),
            ),
        ])
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled(
        "(c)ount / (d)ensity / (b)ack / (r)etry / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

fn render_distribution_chart<C: Clock>(
    app: &App<C>,
    marker: Option<f64>,
    area: Rect,
    buf: &mut Buffer,
) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let Some(histogram) = app.histogram() else {
        let msg = if app.reference().is_some() {
            "No valid data found."
        } else {
            "Reference data not loaded."
        };
        Paragraph::new(Span::styled(msg, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };

    let (diagnosed, control) = charting::group_series(&histogram);
    let (x_bounds, y_bounds) = charting::compute_chart_bounds(&histogram, marker);
    let marker_points = marker
        .map(|m| charting::marker_line(m, y_bounds[1]))
        .unwrap_or_default();
    let bin_points = marker
        .map(|m| charting::highlighted_bin(&histogram, m))
        .unwrap_or_default();

    let mut datasets = vec![
        Dataset::default()
            .name("Has Parkinson's")
            .marker(Marker::Braille)
            .style(Style::default().fg(DIAGNOSED_COLOR))
            .graph_type(GraphType::Line)
            .data(&diagnosed),
        Dataset::default()
            .name("No Parkinson's")
            .marker(Marker::Braille)
            .style(Style::default().fg(CONTROL_COLOR))
            .graph_type(GraphType::Line)
            .data(&control),
    ];
    if !bin_points.is_empty() {
        datasets.push(
            Dataset::default()
                .name("Your bin")
                .marker(Marker::Braille)
                .style(Style::default().fg(Color::Yellow))
                .graph_type(GraphType::Line)
                .data(&bin_points),
        );
    }
    if !marker_points.is_empty() {
        datasets.push(
            Dataset::default()
                .name("You")
                .marker(Marker::Braille)
                .style(Style::default().fg(Color::Magenta))
                .graph_type(GraphType::Line)
                .data(&marker_points),
        );
    }

    let y_title = match histogram.scale {
        BinScale::Count => "count",
        BinScale::Density => "density",
    };

    Chart::new(datasets)
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(
            Axis::default()
                .title("typing speed")
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled(charting::format_label(x_bounds[0]), bold_style),
                    Span::styled(charting::format_label(x_bounds[1]), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(y_title)
                .bounds(y_bounds)
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(y_bounds[1]), bold_style),
                ]),
        )
        .render(area, buf);
}

fn outcome_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Idle => String::new(),
        Outcome::Pending(_) => "Comparing with the reference data...".to_string(),
        Outcome::Unavailable { reason, .. } => {
            format!("Percentile N/A, estimated UPDRS N/A ({reason})")
        }
        Outcome::Ready(summary) => summary.to_string(),
    }
}
