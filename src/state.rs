/// Page-level flags views raise and the shell consumes once per loop turn.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageState {
    status: Option<String>,
    status_dirty: bool,
    refresh_requested: bool,
    quit_requested: bool,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Replaces the status line message.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "status");
        self.status = Some(message);
        self.status_dirty = true;
    }

    pub fn clear_status(&mut self) {
        if self.status.take().is_some() {
            self.status_dirty = true;
        }
    }

    pub fn take_status_change(&mut self) -> Option<Option<String>> {
        if self.status_dirty {
            self.status_dirty = false;
            Some(self.status.clone())
        } else {
            None
        }
    }

    /// Asks the shell to re-render the active view.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_is_taken_once() {
        let mut s = PageState::new();
        assert!(s.take_status_change().is_none());
        s.notify("Config saved.");
        assert_eq!(s.take_status_change(), Some(Some("Config saved.".to_string())));
        // consumed
        assert!(s.take_status_change().is_none());
        assert_eq!(s.status(), Some("Config saved."));
        s.clear_status();
        assert_eq!(s.take_status_change(), Some(None));
    }

    #[test]
    fn refresh_request_is_taken_once() {
        let mut s = PageState::new();
        assert!(!s.take_refresh());
        s.request_refresh();
        assert!(s.take_refresh());
        assert!(!s.take_refresh());
    }
}
