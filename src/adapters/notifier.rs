use crate::core::Notifier;

/// Prints alerts on stderr, keeping stdout for the predicted digit.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("❌ {}", message);
    }
}
