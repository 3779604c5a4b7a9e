use std::time::Duration;

use bytes::{Bytes, BytesMut};
use cardlink_driver::{CardData, EjectOutcome, MockCardReader};
use cardlink_frame::encode_frame;
use cardlink_status::{
    session, CardReaderState, FitnessEntry, GetFitnessData, SendStatus, StatusMessage,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cmd::SimulateArgs;
use crate::exit::{frame_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

const LUNO: &str = "00100355";
/// Device identifier graphic of the magnetic card reader.
const CARD_READER_DIG: char = 'D';
/// Deliberately misaligned with frame boundaries so the session has to
/// reassemble, like on the real line.
const CHUNK_SIZE: usize = 3;
/// How long the simulated cardholder hesitates before taking the card.
const CARDHOLDER_DELAY: Duration = Duration::from_millis(500);

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|err| CliError::new(INTERNAL, format!("runtime setup failed: {err}")))?;
    runtime.block_on(run_scenario(args, format))
}

async fn run_scenario(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted; stopping simulation");
                cancel.cancel();
            }
        });
    }

    let (tx, mut session) = session::channel(8);
    let producer = tokio::spawn(drive_peripheral(tx, cancel.clone(), args.transactions));

    while let Some(item) = session.next_message().await {
        match item {
            Ok(message) => print_message(&message, format),
            Err(err) => {
                producer.abort();
                return Err(frame_error("simulated stream violated the protocol", err));
            }
        }
    }

    let _ = producer.await;
    Ok(SUCCESS)
}

/// Plays scripted card transactions against the mock reader, emitting the
/// status frames the terminal would put on the line.
async fn drive_peripheral(tx: mpsc::Sender<Bytes>, cancel: CancellationToken, transactions: u32) {
    let reader = MockCardReader::new();

    for txn in 1..=transactions {
        if cancel.is_cancelled() {
            break;
        }
        reader.set_card(demo_card(txn));

        if reader.read_card(&cancel).await.is_none() {
            warn!(txn, "card read failed; skipping transaction");
            continue;
        }
        debug!(txn, "card read");
        send_message(&tx, &card_reader_state(0, 1)).await;
        send_message(&tx, &send_status(txn)).await;

        let mut outcomes = reader.eject_card(cancel.clone());
        {
            let reader = reader.clone();
            tokio::spawn(async move {
                tokio::time::sleep(CARDHOLDER_DELAY).await;
                reader.take_card();
            });
        }
        while let Some(outcome) = outcomes.recv().await {
            debug!(?outcome, txn, "eject state");
            if outcome == EjectOutcome::CardTaken {
                send_message(&tx, &card_reader_state(1, 1)).await;
            }
        }

        if cancel.is_cancelled() {
            break;
        }
        send_message(&tx, &fitness_report()).await;
    }
    // Dropping the sender ends the session's sequence.
}

/// Frame a message and feed it to the session in small chunks.
async fn send_message(tx: &mpsc::Sender<Bytes>, message: &StatusMessage) {
    let mut buf = BytesMut::new();
    if encode_frame(&message.encode(), &mut buf).is_err() {
        warn!("message too large to frame; skipping");
        return;
    }
    let wire = buf.freeze();

    let mut offset = 0;
    while offset < wire.len() {
        let end = (offset + CHUNK_SIZE).min(wire.len());
        if tx.send(wire.slice(offset..end)).await.is_err() {
            return;
        }
        offset = end;
    }
}

fn card_reader_state(device_status: u8, supplies_status: u8) -> StatusMessage {
    StatusMessage::CardReaderState(CardReaderState {
        luno: LUNO.to_string(),
        device_id: CARD_READER_DIG,
        device_status,
        error_severity: 0,
        diagnostic_status: 0,
        supplies_status,
    })
}

fn send_status(transaction_number: u32) -> StatusMessage {
    StatusMessage::SendStatus(SendStatus {
        luno: LUNO.to_string(),
        descriptor: 'B',
        transaction_number,
    })
}

fn fitness_report() -> StatusMessage {
    let entries = [
        ('D', "0"),
        ('y', "0"),
        ('A', "0"),
        ('E', "00000"),
        ('G', "0"),
        ('H', "0"),
    ];
    StatusMessage::GetFitnessData(GetFitnessData {
        luno: LUNO.to_string(),
        descriptor: 'F',
        message_identifier: 'J',
        hardware_fitness_identifier: 'A',
        fitness: entries
            .into_iter()
            .map(|(device_id, status)| FitnessEntry {
                device_id,
                status: status.to_string(),
            })
            .collect(),
    })
}

fn demo_card(txn: u32) -> CardData {
    CardData {
        track1: None,
        track2: format!("4000001234567890=290210100000{txn:05}"),
        track3: None,
    }
}
