use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::api::{ApiClient, Session};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{RequestStatus, SummarizeRequest, SummarizeResult, SummaryModel};
use crate::services::extract_video_id;
use crate::tui::AppAction;

// Message for a completed login exchange
pub struct LoginOutcome {
    pub result: std::result::Result<String, LoginFailure>, // access token or failure
}

pub enum LoginFailure {
    Rejected,
    Transport(String),
}

// Message for a completed summarize request
pub struct SummarizeOutcome {
    pub request_id: u64,
    pub result: std::result::Result<SummarizeResult, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    VideoUrl,
    SummaryLength,
    Model,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::VideoUrl => FormField::SummaryLength,
            FormField::SummaryLength => FormField::Model,
            FormField::Model => FormField::VideoUrl,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::VideoUrl => FormField::Model,
            FormField::SummaryLength => FormField::VideoUrl,
            FormField::Model => FormField::SummaryLength,
        }
    }
}

pub struct App {
    // Form state
    pub video_url_input: String,
    pub summary_length_input: String,
    pub model_index: usize,
    pub focus: FormField,

    // Popup state
    pub api_key_input_active: bool,
    pub api_key_input: String,
    pub alert: Option<String>,
    pub show_help: bool,

    // Result state
    pub status: RequestStatus,
    pub current_result: Option<SummarizeResult>,
    pub error_message: Option<String>,
    pub spinner_frame: usize,

    // Async state
    queued_request: Option<SummarizeRequest>,
    pending_request_id: Option<u64>,
    next_request_id: u64,
    login_rx: mpsc::Receiver<LoginOutcome>,
    login_tx: mpsc::Sender<LoginOutcome>,
    summarize_rx: mpsc::Receiver<SummarizeOutcome>,
    summarize_tx: mpsc::Sender<SummarizeOutcome>,

    // Services
    session: Session,
    configured_api_key: Option<String>,
    client: Arc<ApiClient>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(ApiClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?);

        let model_index = config
            .default_model
            .as_deref()
            .and_then(SummaryModel::from_str)
            .and_then(|model| SummaryModel::all().iter().position(|m| *m == model))
            .unwrap_or(0);

        let (login_tx, login_rx) = mpsc::channel(1);
        let (summarize_tx, summarize_rx) = mpsc::channel(1);

        Ok(Self {
            video_url_input: String::new(),
            summary_length_input: config.default_summary_length.to_string(),
            model_index,
            focus: FormField::VideoUrl,
            api_key_input_active: false,
            api_key_input: String::new(),
            alert: None,
            show_help: false,
            status: RequestStatus::Idle,
            current_result: None,
            error_message: None,
            spinner_frame: 0,
            queued_request: None,
            pending_request_id: None,
            next_request_id: 0,
            login_rx,
            login_tx,
            summarize_rx,
            summarize_tx,
            session: Session::new(),
            configured_api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn selected_model(&self) -> SummaryModel {
        SummaryModel::all()[self.model_index]
    }

    pub fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::FocusNext => {
                self.focus = self.focus.next();
            }

            AppAction::FocusPrev => {
                self.focus = self.focus.prev();
            }

            AppAction::InputChar(c) => match self.focus {
                FormField::VideoUrl => self.video_url_input.push(c),
                // Coerced to an integer at submit time, so only digits get in
                FormField::SummaryLength => {
                    if c.is_ascii_digit() {
                        self.summary_length_input.push(c);
                    }
                }
                FormField::Model => {}
            },

            AppAction::InputBackspace => match self.focus {
                FormField::VideoUrl => {
                    self.video_url_input.pop();
                }
                FormField::SummaryLength => {
                    self.summary_length_input.pop();
                }
                FormField::Model => {}
            },

            AppAction::ModelNext => {
                if self.focus == FormField::Model {
                    self.model_index = (self.model_index + 1) % SummaryModel::all().len();
                }
            }

            AppAction::ModelPrev => {
                if self.focus == FormField::Model {
                    let count = SummaryModel::all().len();
                    self.model_index = (self.model_index + count - 1) % count;
                }
            }

            AppAction::Submit => {
                self.submit();
            }

            AppAction::OpenVideo => {
                if let Some(id) = extract_video_id(&self.video_url_input) {
                    let url = format!("https://www.youtube.com/watch?v={}", id);
                    let _ = open::that(&url);
                }
            }

            AppAction::ClearCredential => {
                self.session.clear();
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::DismissAlert => {
                self.alert = None;
            }

            AppAction::KeyInputChar(c) => {
                self.api_key_input.push(c);
            }

            AppAction::KeyInputBackspace => {
                self.api_key_input.pop();
            }

            AppAction::KeyInputConfirm => {
                let key = self.api_key_input.trim().to_string();
                self.api_key_input_active = false;
                self.api_key_input.clear();

                if key.is_empty() {
                    // Cancelled login: drop the queued request, no feedback
                    self.queued_request = None;
                } else {
                    self.start_login(key);
                }
            }

            AppAction::KeyInputCancel => {
                self.api_key_input_active = false;
                self.api_key_input.clear();
                self.queued_request = None;
            }
        }

        Ok(false)
    }

    /// Validate the form and kick off the login-then-summarize flow.
    fn submit(&mut self) {
        // One request at a time: Enter is ignored while one is pending
        if self.status.is_pending() {
            return;
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(message) => {
                self.status = RequestStatus::Failed;
                self.error_message = Some(message);
                self.current_result = None;
                return;
            }
        };

        if self.session.is_authenticated() {
            self.start_summarize(request);
        } else {
            self.queued_request = Some(request);
            if let Some(key) = self.configured_api_key.clone() {
                self.start_login(key);
            } else {
                self.api_key_input_active = true;
                self.api_key_input.clear();
            }
        }
    }

    fn build_request(&self) -> std::result::Result<SummarizeRequest, String> {
        let video_url = self.video_url_input.trim().to_string();
        if video_url.is_empty() {
            return Err("Please enter a video URL".to_string());
        }
        if extract_video_id(&video_url).is_none() {
            return Err("Not a recognizable YouTube URL".to_string());
        }

        let summary_length: u32 = self
            .summary_length_input
            .trim()
            .parse()
            .map_err(|_| "Summary length must be a whole number".to_string())?;

        Ok(SummarizeRequest::new(
            video_url,
            summary_length,
            self.selected_model(),
        ))
    }

    fn start_login(&mut self, api_key: String) {
        self.status = RequestStatus::LoggingIn;

        let client = Arc::clone(&self.client);
        let tx = self.login_tx.clone();

        tokio::spawn(async move {
            let result = match client.login(&api_key).await {
                Ok(token) => Ok(token),
                Err(AppError::InvalidApiKey) => Err(LoginFailure::Rejected),
                Err(e) => Err(LoginFailure::Transport(e.to_string())),
            };

            let _ = tx.send(LoginOutcome { result }).await;
        });
    }

    fn start_summarize(&mut self, request: SummarizeRequest) {
        // Callers ensure a credential is present before getting here
        let Some(token) = self.session.token().map(str::to_string) else {
            return;
        };

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending_request_id = Some(request_id);
        self.status = RequestStatus::InFlight;
        self.current_result = None;
        self.error_message = None;

        let client = Arc::clone(&self.client);
        let tx = self.summarize_tx.clone();

        tokio::spawn(async move {
            let result = client
                .summarize(&token, &request)
                .await
                .map_err(|e| e.to_string());

            let _ = tx.send(SummarizeOutcome { request_id, result }).await;
        });
    }

    /// Status to fall back to when no request is in flight. A previously
    /// rendered result stays on screen.
    fn settled_status(&self) -> RequestStatus {
        if self.current_result.is_some() {
            RequestStatus::Done
        } else {
            RequestStatus::Idle
        }
    }

    /// Poll for a completed login exchange (non-blocking)
    pub fn poll_login_result(&mut self) {
        if let Ok(outcome) = self.login_rx.try_recv() {
            match outcome.result {
                Ok(token) => {
                    self.session.set_token(token);
                    if let Some(request) = self.queued_request.take() {
                        self.start_summarize(request);
                    } else {
                        self.status = self.settled_status();
                    }
                }
                Err(LoginFailure::Rejected) => {
                    self.alert = Some("Invalid API key".to_string());
                    self.queued_request = None;
                    self.status = self.settled_status();
                }
                Err(LoginFailure::Transport(e)) => {
                    // Network trouble during login is logged, not rendered
                    tracing::error!("Login failed: {}", e);
                    self.queued_request = None;
                    self.status = self.settled_status();
                }
            }
        }
    }

    /// Poll for a completed summarize request (non-blocking)
    pub fn poll_summarize_result(&mut self) {
        if let Ok(outcome) = self.summarize_rx.try_recv() {
            // Only process the result we are waiting for
            if self.pending_request_id != Some(outcome.request_id) {
                tracing::debug!("Discarding stale summarize result");
                return;
            }

            match outcome.result {
                Ok(result) => {
                    self.current_result = Some(result);
                    self.error_message = None;
                    self.status = RequestStatus::Done;
                }
                Err(message) => {
                    tracing::error!("Summarize request failed: {}", message);
                    self.current_result = None;
                    self.error_message = Some(message);
                    self.status = RequestStatus::Failed;
                }
            }

            self.pending_request_id = None;
        }
    }

    pub fn tick_spinner(&mut self) {
        if self.status.is_pending() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoMetadata;

    fn test_config() -> Config {
        Config {
            // Nothing listens here; controller tests never complete a real call
            api_base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            request_timeout_secs: 1,
            default_summary_length: 100,
            default_model: None,
        }
    }

    fn test_app() -> App {
        App::new(&test_config()).unwrap()
    }

    fn fill_valid_form(app: &mut App) {
        app.video_url_input = "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string();
        app.summary_length_input = "150".to_string();
    }

    fn fixture_result() -> SummarizeResult {
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

    #[test]
    fn build_request_uses_form_values_with_integer_length() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.model_index = 1; // gpt-4

        let request = app.build_request().unwrap();
        assert_eq!(
            request,
            SummarizeRequest {
                video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                summary_length: 150,
                used_model: "gpt-4".to_string(),
            }
        );
    }

    #[test]
    fn build_request_rejects_unrecognizable_url() {
        let mut app = test_app();
        app.video_url_input = "https://vimeo.com/12345".to_string();
        app.summary_length_input = "150".to_string();

        assert!(app.build_request().is_err());
    }

    #[test]
    fn length_field_accepts_digits_only() {
        let mut app = test_app();
        app.summary_length_input.clear();
        app.focus = FormField::SummaryLength;

        app.handle_action(AppAction::InputChar('1')).unwrap();
        app.handle_action(AppAction::InputChar('x')).unwrap();
        app.handle_action(AppAction::InputChar('5')).unwrap();

        assert_eq!(app.summary_length_input, "15");
    }

    #[test]
    fn model_cycles_only_when_model_field_is_focused() {
        let mut app = test_app();

        app.focus = FormField::VideoUrl;
        app.handle_action(AppAction::ModelNext).unwrap();
        assert_eq!(app.model_index, 0);

        app.focus = FormField::Model;
        app.handle_action(AppAction::ModelNext).unwrap();
        assert_eq!(app.selected_model(), SummaryModel::Gpt4);
        app.handle_action(AppAction::ModelPrev).unwrap();
        assert_eq!(app.selected_model(), SummaryModel::Gpt35Turbo);
        app.handle_action(AppAction::ModelPrev).unwrap();
        assert_eq!(app.selected_model(), SummaryModel::Gpt4Turbo);
    }

    #[test]
    fn submit_without_credential_opens_key_popup() {
        let mut app = test_app();
        fill_valid_form(&mut app);

        app.handle_action(AppAction::Submit).unwrap();

        assert!(app.api_key_input_active);
        assert!(app.queued_request.is_some());
        // No network activity yet
        assert_eq!(app.status, RequestStatus::Idle);
        assert!(app.pending_request_id.is_none());
    }

    #[test]
    fn cancelled_key_popup_is_a_silent_noop() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.handle_action(AppAction::Submit).unwrap();

        // Confirming an empty key counts as cancelling
        app.handle_action(AppAction::KeyInputConfirm).unwrap();

        assert!(!app.api_key_input_active);
        assert!(app.queued_request.is_none());
        assert_eq!(app.status, RequestStatus::Idle);
        assert!(app.current_result.is_none());
        assert!(app.alert.is_none());
    }

    #[test]
    fn escaping_key_popup_drops_the_queued_request() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.handle_action(AppAction::Submit).unwrap();

        app.handle_action(AppAction::KeyInputCancel).unwrap();

        assert!(!app.api_key_input_active);
        assert!(app.queued_request.is_none());
        assert_eq!(app.status, RequestStatus::Idle);
    }

    #[test]
    fn rejected_login_shows_alert_and_issues_no_summarize() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.queued_request = app.build_request().ok();
        app.status = RequestStatus::LoggingIn;

        app.login_tx
            .try_send(LoginOutcome {
                result: Err(LoginFailure::Rejected),
            })
            .unwrap();
        app.poll_login_result();

        assert_eq!(app.alert.as_deref(), Some("Invalid API key"));
        assert!(app.queued_request.is_none());
        assert!(app.pending_request_id.is_none());
        assert_eq!(app.status, RequestStatus::Idle);
        assert!(!app.session.is_authenticated());
    }

    #[test]
    fn rejected_login_keeps_the_previous_result_on_screen() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.current_result = Some(fixture_result());
        app.status = RequestStatus::LoggingIn;
        app.queued_request = app.build_request().ok();

        app.login_tx
            .try_send(LoginOutcome {
                result: Err(LoginFailure::Rejected),
            })
            .unwrap();
        app.poll_login_result();

        assert_eq!(app.status, RequestStatus::Done);
        assert!(app.current_result.is_some());
    }

    #[test]
    fn login_transport_failure_is_silent() {
        let mut app = test_app();
        app.status = RequestStatus::LoggingIn;

        app.login_tx
            .try_send(LoginOutcome {
                result: Err(LoginFailure::Transport("connection refused".to_string())),
            })
            .unwrap();
        app.poll_login_result();

        assert!(app.alert.is_none());
        assert!(app.error_message.is_none());
        assert_eq!(app.status, RequestStatus::Idle);
    }

    #[tokio::test]
    async fn successful_login_submits_the_queued_request() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.queued_request = app.build_request().ok();
        app.status = RequestStatus::LoggingIn;

        app.login_tx
            .try_send(LoginOutcome {
                result: Ok("tok-123".to_string()),
            })
            .unwrap();
        app.poll_login_result();

        assert!(app.session.is_authenticated());
        assert_eq!(app.status, RequestStatus::InFlight);
        assert!(app.pending_request_id.is_some());
        assert!(app.queued_request.is_none());
    }

    #[tokio::test]
    async fn submit_with_credential_issues_exactly_one_request() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.session.set_token("tok-123".to_string());

        app.handle_action(AppAction::Submit).unwrap();

        assert_eq!(app.status, RequestStatus::InFlight);
        assert_eq!(app.pending_request_id, Some(1));
        assert_eq!(app.next_request_id, 1);
    }

    #[tokio::test]
    async fn resubmit_while_pending_is_ignored() {
        let mut app = test_app();
        fill_valid_form(&mut app);
        app.session.set_token("tok-123".to_string());

        app.handle_action(AppAction::Submit).unwrap();
        let pending = app.pending_request_id;

        app.handle_action(AppAction::Submit).unwrap();

        // Still the same single in-flight request
        assert_eq!(app.next_request_id, 1);
        assert_eq!(app.pending_request_id, pending);
    }

    #[test]
    fn failed_summarize_shows_server_detail_and_no_summary() {
        let mut app = test_app();
        app.status = RequestStatus::InFlight;
        app.pending_request_id = Some(7);

        app.summarize_tx
            .try_send(SummarizeOutcome {
                request_id: 7,
                result: Err("quota exceeded".to_string()),
            })
            .unwrap();
        app.poll_summarize_result();

        assert_eq!(app.status, RequestStatus::Failed);
        assert_eq!(app.error_message.as_deref(), Some("quota exceeded"));
        assert!(app.current_result.is_none());
        assert!(app.pending_request_id.is_none());
    }

    #[test]
    fn successful_summarize_stores_the_result() {
        let mut app = test_app();
        app.status = RequestStatus::InFlight;
        app.pending_request_id = Some(3);

        app.summarize_tx
            .try_send(SummarizeOutcome {
                request_id: 3,
                result: Ok(fixture_result()),
            })
            .unwrap();
        app.poll_summarize_result();

        assert_eq!(app.status, RequestStatus::Done);
        assert!(app.error_message.is_none());
        let result = app.current_result.as_ref().unwrap();
        assert_eq!(result.metadata.title, "T");
        assert_eq!(result.word_count, 7);
    }

    #[test]
    fn stale_summarize_result_is_discarded() {
        let mut app = test_app();
        app.status = RequestStatus::InFlight;
        app.pending_request_id = Some(2);

        app.summarize_tx
            .try_send(SummarizeOutcome {
                request_id: 1,
                result: Ok(fixture_result()),
            })
            .unwrap();
        app.poll_summarize_result();

        assert_eq!(app.status, RequestStatus::InFlight);
        assert!(app.current_result.is_none());
        assert_eq!(app.pending_request_id, Some(2));
    }

    #[test]
    fn invalid_form_fails_inline_without_network() {
        let mut app = test_app();
        app.video_url_input = "not a url".to_string();
        app.session.set_token("tok-123".to_string());

        app.handle_action(AppAction::Submit).unwrap();

        assert_eq!(app.status, RequestStatus::Failed);
        assert!(app.error_message.is_some());
        assert!(app.pending_request_id.is_none());
    }

    #[test]
    fn clear_credential_forces_next_login() {
        let mut app = test_app();
        app.session.set_token("tok-123".to_string());

        app.handle_action(AppAction::ClearCredential).unwrap();

        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn configured_api_key_skips_the_popup() {
        let mut config = test_config();
        config.api_key = Some("configured-key".to_string());
        let mut app = App::new(&config).unwrap();
        fill_valid_form(&mut app);

        app.handle_action(AppAction::Submit).unwrap();

        assert!(!app.api_key_input_active);
        assert_eq!(app.status, RequestStatus::LoggingIn);
        assert!(app.queued_request.is_some());
    }

    #[test]
    fn default_model_from_config_selects_the_matching_entry() {
        let mut config = test_config();
        config.default_model = Some("gpt-4-turbo".to_string());
        let app = App::new(&config).unwrap();
        assert_eq!(app.selected_model(), SummaryModel::Gpt4Turbo);
    }
}
