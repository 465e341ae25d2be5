/// Credential state for the current run of the app.
///
/// The access token is absent until the first successful login, set once,
/// and never refreshed within a session. Held as an explicit object (rather
/// than free-standing mutable state) so tests can seed it directly.
#[derive(Debug, Clone, Default)]
pub struct Session {
    access_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    pub fn clear(&mut self) {
        self.access_token = None;
    }
}
