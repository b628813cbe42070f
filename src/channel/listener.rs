use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::ListenerError;
use crate::ReleaseMessage;

/// Callback seam for release-message delivery.
///
/// Invoked zero or more times by the scanner, in ascending message-id order
/// within one process. Implementations must not assume any particular task
/// identity across calls, and must tolerate seeing the same message twice
/// (the channel is at-least-once).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageListener: Send + Sync + 'static {
    /// Handle one scanned message. `channel` is always the fixed release
    /// channel name. Errors are isolated per listener: the scanner logs them
    /// and continues with the remaining listeners and messages.
    async fn handle_message(
        &self,
        message: &ReleaseMessage,
        channel: &str,
    ) -> std::result::Result<(), ListenerError>;
}
