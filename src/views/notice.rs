use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// What a notice's action button does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeAction {
    ShowEmptyTasks,
}

impl NoticeAction {
    pub fn label(self) -> &'static str {
        match self {
            NoticeAction::ShowEmptyTasks => "Show",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: Option<String>,
    pub action: Option<NoticeAction>,
    raised_at: Instant,
}

/// Transient, non-blocking notifications, newest last.
#[derive(Debug, Clone)]
pub struct Notices {
    items: Vec<Notice>,
    lifetime: Duration,
}

impl Notices {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
        }
    }

    pub fn push(
        &mut self,
        kind: NoticeKind,
        title: impl Into<String>,
        description: Option<String>,
        action: Option<NoticeAction>,
    ) {
        self.items.push(Notice {
            kind,
            title: title.into(),
            description,
            action,
            raised_at: Instant::now(),
        });
    }

    pub fn info(&mut self, title: impl Into<String>) {
        self.push(NoticeKind::Info, title, None, None);
    }

    pub fn error(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(NoticeKind::Error, title, Some(description.into()), None);
    }

    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.items
            .retain(|notice| now.saturating_duration_since(notice.raised_at) < lifetime);
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.last()
    }

    /// Invoke the newest notice's action, dismissing that notice.
    pub fn take_action(&mut self) -> Option<NoticeAction> {
        let action = self.items.last()?.action?;
        self.items.pop();
        Some(action)
    }

    pub fn dismiss_latest(&mut self) {
        self.items.pop();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
