use std::io;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod api;
mod app;
mod config;
mod error;
mod models;
mod services;
mod tui;

use api::ApiClient;
use app::App;
use config::Config;
use error::{AppError, Result};
use models::{SummarizeRequest, SummaryModel};
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    // Check for --health flag (headless service check)
    if args.len() >= 2 && args[1] == "--health" {
        let client = ApiClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let status = client.health().await?;
        println!("Service at {} is {}", config.api_base_url, status);
        return Ok(());
    }

    // Check for --summarize flag (headless one-shot request)
    if args.len() >= 3 && args[1] == "--summarize" {
        return summarize_headless(&config, &args[2]).await;
    }

    // Initialize app
    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Advance spinner animation
        app.tick_spinner();

        // Poll for a completed login exchange
        app.poll_login_result();

        // Poll for a completed summarize request
        app.poll_summarize_result();

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(
                        key,
                        app.api_key_input_active,
                        app.alert.is_some(),
                        app.show_help,
                    ) {
                        let should_quit = app.handle_action(action)?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// One-shot summarize without the TUI, using config defaults and the
/// configured API key. Prints the result to stdout.
async fn summarize_headless(config: &Config, video_url: &str) -> Result<()> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        AppError::Config("api_key must be set in the config file for headless use".to_string())
    })?;

    let client = ApiClient::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let token = client.login(&api_key).await?;

    let model = config
        .default_model
        .as_deref()
        .and_then(SummaryModel::from_str)
        .unwrap_or_default();
    let request = SummarizeRequest::new(
        video_url.to_string(),
        config.default_summary_length,
        model,
    );

    let result = client.summarize(&token, &request).await?;

    println!("{}", result.metadata.title);
    println!("Channel: {}", result.metadata.channel_title);
    println!();
    println!("{}", result.summary);
    println!();
    println!("Word count: {}", result.word_count);

    Ok(())
}
