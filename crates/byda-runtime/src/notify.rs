//! Best-effort operator notifications.

/// Fire-and-forget notification sink. Implementations swallow their own
/// failures; a lost notice must never affect job processing.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Prints notifications to stdout.
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        println!("NOTIFICATION: {title}\n{message}");
    }
}
