use log::{debug, warn};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::state::{Notification, ServiceEvent, Timestamped};

const CHANNEL_CAPACITY: usize = 64;

/// Fans service events out to whoever renders them.
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Timestamped<ServiceEvent>>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Notifier { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Timestamped<ServiceEvent>> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ServiceEvent) {
        // no subscribers is not an error
        if self.sender.send(Timestamped::new(event)).is_err() {
            debug!("event dropped, nobody is listening");
        }
    }

    pub fn notify(&self, notification: Notification) {
        debug!(
            "[{}] {}",
            notification.severity.as_ref(),
            notification.message
        );
        self.emit(ServiceEvent::Notice(notification));
    }
}

/// Waits for the next event, skipping past any the receiver fell behind on.
/// `None` once every sender is gone.
pub async fn next_event(
    receiver: &mut broadcast::Receiver<Timestamped<ServiceEvent>>,
) -> Option<Timestamped<ServiceEvent>> {
    loop {
        match receiver.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => warn!("receiver lagged, {skipped} events skipped"),
            Err(RecvError::Closed) => return None,
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
