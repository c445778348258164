use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Bounded queue of notices; the oldest is dropped when full.
#[derive(Debug, Clone)]
pub struct NoticeQueue {
    limit: usize,
    notices: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            notices: VecDeque::new(),
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text.into());
    }

    fn push(&mut self, level: NoticeLevel, text: String) {
        if self.notices.len() == self.limit {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice { level, text });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Remove and return every queued notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}
