use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FormField};
use crate::models::{RequestStatus, SummarizeResult, SummaryModel, VideoMetadata};

pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub fn draw(frame: &mut Frame, app: &App) {
    // Main horizontal split: 1/3 left (form), 2/3 right (result)
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Left pane: request form
            Constraint::Ratio(2, 3), // Right pane: summary result
        ])
        .split(frame.area());

    // Left pane: header + three form fields + status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Video URL
            Constraint::Length(3), // Summary length
            Constraint::Length(3), // Model selector
            Constraint::Min(0),    // Filler
            Constraint::Length(1), // Status line
        ])
        .split(main_chunks[0]);

    render_header(frame, left_chunks[0]);
    render_url_input(frame, app, left_chunks[1]);
    render_length_input(frame, app, left_chunks[2]);
    render_model_selector(frame, app, left_chunks[3]);
    render_left_status(frame, left_chunks[5]);

    render_result_pane(frame, app, main_chunks[1]);

    // Render popups last so they sit on top
    if app.api_key_input_active {
        render_api_key_input(frame, app);
    }

    if let Some(message) = &app.alert {
        render_alert(frame, message);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan)
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Tube Digest ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new("AI video summaries").style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_url_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == FormField::VideoUrl;
    let text = if focused {
        format!("{}_", app.video_url_input)
    } else {
        app.video_url_input.clone()
    };

    let paragraph = Paragraph::new(text).block(field_block(" Video URL ", focused));
    frame.render_widget(paragraph, area);
}

fn render_length_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == FormField::SummaryLength;
    let text = if focused {
        format!("{}_", app.summary_length_input)
    } else {
        app.summary_length_input.clone()
    };

    let paragraph = Paragraph::new(text).block(field_block(" Summary length (words) ", focused));
    frame.render_widget(paragraph, area);
}

fn render_model_selector(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == FormField::Model;
    let selected = app.selected_model();

    let mut spans: Vec<Span> = Vec::new();
    for (i, model) in SummaryModel::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        let style = if *model == selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(model.as_str(), style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(field_block(" Model ", focused));
    frame.render_widget(paragraph, area);
}

fn render_left_status(frame: &mut Frame, area: Rect) {
    let status = "Tab:fields  \u{2190}/\u{2192}:model  Enter:summarize  ^H:help  Esc:quit";
    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_result_pane(frame: &mut Frame, app: &App, area: Rect) {
    if app.status == RequestStatus::Done {
        if let Some(result) = &app.current_result {
            render_result_boxes(frame, app, result, area);
            return;
        }
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let message = match app.status {
        RequestStatus::Idle => "Fill in the form and press Enter to summarize...".to_string(),
        RequestStatus::LoggingIn => format!(
            "{} Logging in...",
            SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
        ),
        RequestStatus::InFlight => format!(
            "{} Summarizing...",
            SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]
        ),
        RequestStatus::Failed => format!(
            "Error: {}",
            app.error_message.as_deref().unwrap_or("request failed")
        ),
        RequestStatus::Done => String::new(),
    };

    let style = if app.status == RequestStatus::Failed {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };

    let block = Block::default()
        .title(" Result ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(message)
        .block(block)
        .style(style)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, chunks[0]);

    render_right_status(frame, app, chunks[1]);
}

fn render_result_boxes(frame: &mut Frame, app: &App, result: &SummarizeResult, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),      // Metadata box
            Constraint::Min(8),         // Summary box
            Constraint::Length(6),      // Date and counts box
            Constraint::Percentage(25), // Full description box
            Constraint::Length(1),      // Status line
        ])
        .split(area);

    let metadata = Paragraph::new(metadata_text(&result.metadata))
        .block(
            Block::default()
                .title(" Video ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(metadata, chunks[0]);

    let summary = Paragraph::new(summary_text(result))
        .block(
            Block::default()
                .title(" Summary ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(summary, chunks[1]);

    let counts = Paragraph::new(counts_text(&result.metadata)).block(
        Block::default()
            .title(" Stats ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(counts, chunks[2]);

    let description = Paragraph::new(description_text(&result.metadata))
        .block(
            Block::default()
                .title(" Description ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(description, chunks[3]);

    render_right_status(frame, app, chunks[4]);
}

fn render_right_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = match app.status {
        RequestStatus::Idle => "",
        RequestStatus::LoggingIn => "\u{23f3} Logging in...",
        RequestStatus::InFlight => "\u{23f3} Summarizing...",
        RequestStatus::Failed => "\u{274c} Failed",
        RequestStatus::Done => "\u{2713} Done | ^O:open video  ^R:re-login",
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Title, channel and description preview for the metadata box.
pub fn metadata_text(metadata: &VideoMetadata) -> Text<'_> {
    Text::from(vec![
        Line::from(Span::styled(
            metadata.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Channel: ", label_style()),
            Span::raw(metadata.channel_title.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Description (1st line): ", label_style()),
            Span::raw(metadata.description_first_line()),
        ]),
    ])
}

/// Summary paragraphs separated by blank lines, followed by the word count.
pub fn summary_text(result: &SummarizeResult) -> Text<'_> {
    let mut lines: Vec<Line> = Vec::new();

    for (i, paragraph) in result.paragraphs().iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        for line in paragraph.lines() {
            lines.push(Line::from(Span::raw(line)));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Word count: {}", result.word_count),
        label_style(),
    )));

    Text::from(lines)
}

/// Publish date and view/like/comment counts.
pub fn counts_text(metadata: &VideoMetadata) -> Text<'static> {
    Text::from(vec![
        Line::from(vec![
            Span::styled("Published: ", label_style()),
            Span::raw(metadata.publish_date_display()),
        ]),
        Line::from(vec![
            Span::styled("Views: ", label_style()),
            Span::raw(metadata.view_count.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Likes: ", label_style()),
            Span::raw(metadata.like_count.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Comments: ", label_style()),
            Span::raw(metadata.comment_count.to_string()),
        ]),
    ])
}

/// Full description with embedded newlines rendered as line breaks.
pub fn description_text(metadata: &VideoMetadata) -> Text<'_> {
    let lines: Vec<Line> = metadata
        .description
        .lines()
        .map(|line| Line::from(Span::raw(line)))
        .collect();
    Text::from(lines)
}

fn render_api_key_input(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());

    let block = Block::default()
        .title(" Enter your API key ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    // Clear the area first
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    // Mask the key itself
    let masked = "*".repeat(app.api_key_input.chars().count());
    let input_text = format!("> {}_", masked);
    let paragraph = Paragraph::new(input_text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_alert(frame: &mut Frame, message: &str) {
    let area = centered_rect(40, 15, frame.area());

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(format!("{}\n\nPress any key to continue", message))
        .block(block)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Form:",
        "   Tab / \u{2193}   Next field",
        "   S-Tab / \u{2191} Previous field",
        "   \u{2190} / \u{2192}     Change model",
        "   Enter      Summarize",
        "",
        " Actions:",
        "   ^O         Open video in browser",
        "   ^R         Forget access token (re-login)",
        "",
        " General:",
        "   ^H / F1    Toggle this help",
        "   Esc / ^C   Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SummarizeResult {
        SummarizeResult {
            metadata: VideoMetadata {
                title: "T".to_string(),
                channel_title: "C".to_string(),
                description: "line1\nline2".to_string(),
                publish_date: "2024-01-01".to_string(),
                view_count: 5,
                like_count: 2,
                comment_count: 1,
            },
            summary: "Para one.\n\nPara two.".to_string(),
            word_count: 7,
        }
    }

    fn line_strings(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn metadata_box_shows_title_channel_and_preview() {
        let result = fixture();
        let lines = line_strings(&metadata_text(&result.metadata));

        assert_eq!(lines[0], "T");
        assert_eq!(lines[1], "Channel: C");
        assert_eq!(lines[2], "Description (1st line): line1");
        // The preview stops at the first line
        assert!(!lines[2].contains("line2"));
    }

    #[test]
    fn summary_box_has_distinct_paragraphs_and_word_count() {
        let result = fixture();
        let lines = line_strings(&summary_text(&result));

        assert_eq!(lines[0], "Para one.");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Para two.");
        assert_eq!(lines.last().unwrap(), "Word count: 7");
    }

    #[test]
    fn counts_box_shows_date_and_counts() {
        let result = fixture();
        let lines = line_strings(&counts_text(&result.metadata));

        assert_eq!(lines[0], "Published: 01 Jan 2024");
        assert_eq!(lines[1], "Views: 5");
        assert_eq!(lines[2], "Likes: 2");
        assert_eq!(lines[3], "Comments: 1");
    }

    #[test]
    fn description_box_renders_newlines_as_line_breaks() {
        let result = fixture();
        let lines = line_strings(&description_text(&result.metadata));

        assert_eq!(lines, vec!["line1", "line2"]);
    }

    #[test]
    fn rendering_is_idempotent() {
        let result = fixture();
        let first = line_strings(&summary_text(&result));
        let second = line_strings(&summary_text(&result));
        assert_eq!(first, second);
    }
}
