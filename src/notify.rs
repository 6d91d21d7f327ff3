use async_trait::async_trait;
use tracing::{error, info};

/// User-facing success, error and confirmation dialogs.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn success(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Writes notifications to the log; confirmations resolve to a fixed answer.
pub struct TracingNotifier {
    confirm_answer: bool,
}

impl TracingNotifier {
    pub fn new(confirm_answer: bool) -> Self {
        Self { confirm_answer }
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    fn success(&self, title: &str, message: &str) {
        info!(target: "creche_attendance::notify", "{}: {}", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        error!(target: "creche_attendance::notify", "{}: {}", title, message);
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        info!(
            target: "creche_attendance::notify",
            "{}: {} -> {}", title, message, self.confirm_answer
        );
        self.confirm_answer
    }
}
