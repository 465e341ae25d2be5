use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone)]
pub enum AppAction {
    Quit,
    FocusNext,
    FocusPrev,
    InputChar(char),
    InputBackspace,
    ModelNext,
    ModelPrev,
    Submit,
    OpenVideo,
    ClearCredential,
    ShowHelp,
    HideHelp,
    DismissAlert,
    // API key popup actions
    KeyInputChar(char),
    KeyInputBackspace,
    KeyInputConfirm,
    KeyInputCancel,
}

pub fn handle_key_event(
    key: KeyEvent,
    api_key_input_active: bool,
    alert_active: bool,
    show_help: bool,
) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    // An alert blocks everything else until dismissed
    if alert_active {
        return Some(AppAction::DismissAlert);
    }

    // API key input mode
    if api_key_input_active {
        return match key.code {
            KeyCode::Enter => Some(AppAction::KeyInputConfirm),
            KeyCode::Esc => Some(AppAction::KeyInputCancel),
            KeyCode::Backspace => Some(AppAction::KeyInputBackspace),
            KeyCode::Char(c) => Some(AppAction::KeyInputChar(c)),
            _ => None,
        };
    }

    // Form mode
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),
        (KeyCode::Esc, _) => Some(AppAction::Quit),

        (KeyCode::Tab, _) | (KeyCode::Down, _) => Some(AppAction::FocusNext),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => Some(AppAction::FocusPrev),

        (KeyCode::Left, _) => Some(AppAction::ModelPrev),
        (KeyCode::Right, _) => Some(AppAction::ModelNext),

        (KeyCode::Enter, _) => Some(AppAction::Submit),

        (KeyCode::Char('o'), KeyModifiers::CONTROL) => Some(AppAction::OpenVideo),
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => Some(AppAction::ClearCredential),
        (KeyCode::Char('h'), KeyModifiers::CONTROL) => Some(AppAction::ShowHelp),
        (KeyCode::F(1), _) => Some(AppAction::ShowHelp),

        (KeyCode::Backspace, _) => Some(AppAction::InputBackspace),
        (KeyCode::Char(c), _) => Some(AppAction::InputChar(c)),

        _ => None,
    }
}
