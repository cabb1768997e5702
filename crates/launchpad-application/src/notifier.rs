use launchpad_core::notification::{Notification, Notifier};
use tokio::sync::mpsc;

/// Forwards notifications to a front end over an unbounded channel.
///
/// Sending never blocks; once the receiver is gone notifications are dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::debug!("[ChannelNotifier] Receiver dropped, notification discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::notification::NotificationLevel;

    #[test]
    fn test_forwards_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::info("Started", "Generating"));
        notifier.notify(Notification::error("Failed", "Marketing"));

        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Info);
        assert_eq!(rx.try_recv().unwrap().title, "Failed");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::success("Done", "All reports ready"));
    }
}
