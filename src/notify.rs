use crate::error::RepositoryError;

/// Sink for user-facing notifications (toasts, status line).
pub trait Notifier {
    fn success(&self, message: &str);

    fn error(&self, message: &str);

    fn error_from_response(&self, response: &RepositoryError) {
        self.error(&response.to_string());
    }
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        log::info!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}
