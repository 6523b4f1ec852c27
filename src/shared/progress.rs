//! Progress events flowing from wallet runners to the orchestrator
//!
//! Each runner is a producer on a single mpsc channel; the orchestrator owns
//! the consuming end and surfaces lines in arrival order, interleaved across
//! wallets.

use solana_sdk::pubkey::Pubkey;
use tokio::sync::mpsc;

/// Severity of a progress line, used for operator-facing color coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warn,
    Error,
}

/// One human-readable status line from a wallet runner.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub wallet: Pubkey,
    pub severity: Severity,
    pub message: String,
}

pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Wallet-tagged sending half handed to each runner.
///
/// Sending never blocks; if the orchestrator is gone the line is dropped,
/// which only happens during teardown.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    wallet: Pubkey,
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    pub fn new(wallet: Pubkey, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { wallet, tx }
    }

    pub fn wallet(&self) -> &Pubkey {
        &self.wallet
    }

    fn emit(&self, severity: Severity, message: String) {
        let _ = self.tx.send(ProgressEvent {
            wallet: self.wallet,
            severity,
            message,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Severity::Success, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(Severity::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message.into());
    }
}

/// Create a progress channel for one run.
pub fn channel() -> (mpsc::UnboundedSender<ProgressEvent>, ProgressReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_send_order() {
        let (tx, mut rx) = channel();
        let sender = ProgressSender::new(Pubkey::new_unique(), tx);
        sender.info("first");
        sender.error("second");
        drop(sender);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.message, "first");
        assert_eq!(first.severity, Severity::Info);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.message, "second");
        assert_eq!(second.severity, Severity::Error);
        assert!(rx.recv().await.is_none());
    }
}
