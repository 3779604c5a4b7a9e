use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Track data read from a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    pub track1: Option<String>,
    pub track2: String,
    pub track3: Option<String>,
}

/// States an eject cycle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EjectOutcome {
    /// The card has been pushed out and is waiting at the slot.
    Ejected,
    /// The cardholder took the card.
    CardTaken,
    /// Nobody took the card; it was pulled back into the machine.
    Retracted,
}

/// Simulated read-head settle time.
const READ_DELAY: Duration = Duration::from_secs(1);

/// Cloneable handle to the simulated card reader.
///
/// Test and demo code drives the simulation through
/// [`set_card`](Self::set_card), [`clear_card`](Self::clear_card) and
/// [`take_card`](Self::take_card); the async operations behave like the
/// hardware would under those conditions.
#[derive(Clone)]
pub struct MockCardReader {
    card: Arc<Mutex<Option<CardData>>>,
    taken: watch::Sender<bool>,
}

impl MockCardReader {
    pub fn new() -> Self {
        Self {
            card: Arc::new(Mutex::new(None)),
            taken: watch::Sender::new(false),
        }
    }

    /// Load track data into the simulated reader.
    pub fn set_card(&self, data: CardData) {
        *self.lock_card() = Some(data);
    }

    /// Make subsequent reads fail, as if the card is unreadable.
    pub fn clear_card(&self) {
        *self.lock_card() = None;
    }

    /// Simulate the cardholder taking the ejected card.
    pub fn take_card(&self) {
        *self.lock_card() = None;
        self.taken.send_replace(true);
    }

    /// Read the inserted card.
    ///
    /// Takes the simulated settle time before answering. Returns `None`
    /// when cancelled up front or when no readable card is present.
    pub async fn read_card(&self, cancel: &CancellationToken) -> Option<CardData> {
        if cancel.is_cancelled() {
            return None;
        }
        tokio::time::sleep(READ_DELAY).await;
        self.lock_card().clone()
    }

    /// Start an eject cycle.
    ///
    /// Reports [`EjectOutcome::Ejected`] immediately, then either
    /// [`EjectOutcome::CardTaken`] once the cardholder takes the card, or
    /// [`EjectOutcome::Retracted`] when the cycle is cancelled first.
    pub fn eject_card(&self, cancel: CancellationToken) -> mpsc::Receiver<EjectOutcome> {
        let (tx, rx) = mpsc::channel(3);
        self.taken.send_replace(false);
        let mut taken = self.taken.subscribe();

        tokio::spawn(async move {
            if tx.send(EjectOutcome::Ejected).await.is_err() {
                return;
            }
            tokio::select! {
                result = async { taken.wait_for(|taken| *taken).await.map(|_| ()) } => {
                    if result.is_ok() {
                        debug!("card taken by cardholder");
                        let _ = tx.send(EjectOutcome::CardTaken).await;
                    }
                }
                _ = cancel.cancelled() => {
                    debug!("eject cancelled; retracting card");
                    let _ = tx.send(EjectOutcome::Retracted).await;
                }
            }
        });

        rx
    }

    fn lock_card(&self) -> std::sync::MutexGuard<'_, Option<CardData>> {
        // A poisoned lock only means a panicking test thread; the state
        // itself stays usable.
        self.card.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Default for MockCardReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> CardData {
        CardData {
            track1: Some("B4000001234567890^CARDHOLDER/TEST^29021010000000000".to_string()),
            track2: "4000001234567890=29021010000000000".to_string(),
            track3: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn read_returns_loaded_card_after_settle_delay() {
        let reader = MockCardReader::new();
        reader.set_card(sample_card());

        let started = tokio::time::Instant::now();
        let card = reader.read_card(&CancellationToken::new()).await;

        assert_eq!(card, Some(sample_card()));
        assert!(started.elapsed() >= READ_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn read_without_card_returns_none() {
        let reader = MockCardReader::new();
        assert_eq!(reader.read_card(&CancellationToken::new()).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn read_after_clear_returns_none() {
        let reader = MockCardReader::new();
        reader.set_card(sample_card());
        reader.clear_card();

        assert_eq!(reader.read_card(&CancellationToken::new()).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_read_returns_immediately() {
        let reader = MockCardReader::new();
        reader.set_card(sample_card());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let started = tokio::time::Instant::now();
        assert_eq!(reader.read_card(&cancel).await, None);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn eject_then_take_reports_card_taken() {
        let reader = MockCardReader::new();
        reader.set_card(sample_card());

        let mut outcomes = reader.eject_card(CancellationToken::new());
        assert_eq!(outcomes.recv().await, Some(EjectOutcome::Ejected));

        reader.take_card();
        assert_eq!(outcomes.recv().await, Some(EjectOutcome::CardTaken));
        assert_eq!(outcomes.recv().await, None);

        // Taking the card also removes it from the reader.
        assert_eq!(reader.read_card(&CancellationToken::new()).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn eject_then_cancel_reports_retracted() {
        let reader = MockCardReader::new();

        let cancel = CancellationToken::new();
        let mut outcomes = reader.eject_card(cancel.clone());
        assert_eq!(outcomes.recv().await, Some(EjectOutcome::Ejected));

        cancel.cancel();
        assert_eq!(outcomes.recv().await, Some(EjectOutcome::Retracted));
        assert_eq!(outcomes.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn take_from_an_earlier_cycle_does_not_leak_into_the_next() {
        let reader = MockCardReader::new();
        reader.set_card(sample_card());

        let mut first = reader.eject_card(CancellationToken::new());
        assert_eq!(first.recv().await, Some(EjectOutcome::Ejected));
        reader.take_card();
        assert_eq!(first.recv().await, Some(EjectOutcome::CardTaken));

        // A new cycle starts un-taken.
        let cancel = CancellationToken::new();
        let mut second = reader.eject_card(cancel.clone());
        assert_eq!(second.recv().await, Some(EjectOutcome::Ejected));

        cancel.cancel();
        assert_eq!(second.recv().await, Some(EjectOutcome::Retracted));
    }
}
