use tracing::debug;

use crate::fitness::decode_fitness;
use crate::message::{CardReaderState, GetFitnessData, SendStatus, StatusMessage};
use crate::FIELD_SEPARATOR;

/// Decode one frame payload into a status message.
///
/// Returns `None` for any payload that doesn't match a recognized shape —
/// unknown class codes, missing or short fields, non-digit bytes where the
/// grammar requires digits. Dropping such payloads is normal flow control,
/// not an error: the stream carries message classes this decoder doesn't
/// recognize, and a malformed frame must never take the session down.
/// Dropped payloads are logged at debug level.
pub fn decode_status(payload: &[u8]) -> Option<StatusMessage> {
    let message = try_decode(payload);
    if message.is_none() {
        debug!(payload = %preview(payload), "dropped payload with no recognized shape");
    }
    message
}

fn try_decode(payload: &[u8]) -> Option<StatusMessage> {
    // Single-byte-per-character ASCII text; anything else fails the shape
    // check outright.
    if !payload.is_ascii() {
        return None;
    }
    let text = std::str::from_utf8(payload).ok()?;

    let fields: Vec<&str> = text
        .split(FIELD_SEPARATOR as char)
        .filter(|segment| !segment.is_empty())
        .collect();

    let class_code = *fields.first()?;
    let luno = (*fields.get(1)?).to_string();

    match class_code {
        "12" => decode_card_reader_state(luno, fields.get(2)?),
        "22" => match fields.get(2)?.chars().next()? {
            'B' => decode_send_status(luno, fields.get(3)?),
            'F' => decode_fitness_data(luno, fields.get(3)?),
            _ => None,
        },
        _ => None,
    }
}

// [DIG][device][severity][diagnostic][supplies], exactly five characters,
// the last four single decimal digits.
fn decode_card_reader_state(luno: String, status: &str) -> Option<StatusMessage> {
    let mut chars = status.chars();
    let device_id = chars.next()?;
    let device_status = digit(chars.next()?)?;
    let error_severity = digit(chars.next()?)?;
    let diagnostic_status = digit(chars.next()?)?;
    let supplies_status = digit(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }

    Some(StatusMessage::CardReaderState(CardReaderState {
        luno,
        device_id,
        device_status,
        error_severity,
        diagnostic_status,
        supplies_status,
    }))
}

fn decode_send_status(luno: String, number: &str) -> Option<StatusMessage> {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(StatusMessage::SendStatus(SendStatus {
        luno,
        descriptor: 'B',
        transaction_number: number.parse().ok()?,
    }))
}

// [messageIdentifier][hardwareFitnessIdentifier] then the GS-joined
// per-device entries.
fn decode_fitness_data(luno: String, info: &str) -> Option<StatusMessage> {
    let mut chars = info.chars();
    let message_identifier = chars.next()?;
    let hardware_fitness_identifier = chars.next()?;

    Some(StatusMessage::GetFitnessData(GetFitnessData {
        luno,
        descriptor: 'F',
        message_identifier,
        hardware_fitness_identifier,
        fitness: decode_fitness(chars.as_str()),
    }))
}

fn digit(c: char) -> Option<u8> {
    c.to_digit(10).map(|d| d as u8)
}

fn preview(payload: &[u8]) -> String {
    const MAX: usize = 32;
    let mut out: String = payload
        .iter()
        .take(MAX)
        .map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        })
        .collect();
    if payload.len() > MAX {
        out.push_str("..");
    }
    out
}
