use adsheet_core::ports::{Notification, Notifier};
use adsheet_core::AdsheetResult;
use tracing::info;

/// Notifier that records the message in the log instead of sending mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> AdsheetResult<()> {
        info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            body = %notification.body,
            "Report notification"
        );
        Ok(())
    }
}
