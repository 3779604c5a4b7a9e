use std::fmt::Write;

use bytes::Bytes;
use serde::Serialize;

use crate::{FIELD_SEPARATOR, GROUP_SEPARATOR};

/// One solicited status message from the terminal.
///
/// The wire payload is ASCII text split into fields by [`FIELD_SEPARATOR`];
/// the first field carries the message class/sub-class code, the second the
/// LUNO of the originating device. Anything that doesn't match one of these
/// three shapes is dropped by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum StatusMessage {
    /// Card-reader device status (class/sub-class "12").
    CardReaderState(CardReaderState),
    /// Transaction-reply-ready status (class "22", descriptor 'B').
    SendStatus(SendStatus),
    /// Terminal fitness report (class "22", descriptor 'F').
    GetFitnessData(GetFitnessData),
}

/// Status of the card-reader device itself.
///
/// The status field is five characters: the device identifier graphic
/// followed by four single-decimal-digit sub-statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardReaderState {
    /// Logical unit number of the originating terminal (8 characters on
    /// the wire; carried opaquely).
    pub luno: String,
    /// Device identifier graphic.
    pub device_id: char,
    pub device_status: u8,
    pub error_severity: u8,
    pub diagnostic_status: u8,
    pub supplies_status: u8,
}

/// Transaction status for a reply the terminal is ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendStatus {
    pub luno: String,
    /// Status descriptor; always 'B' (transaction reply ready).
    pub descriptor: char,
    pub transaction_number: u32,
}

/// Per-device health report covering the terminal's sub-devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetFitnessData {
    pub luno: String,
    /// Status descriptor; always 'F' (terminal fitness state).
    pub descriptor: char,
    pub message_identifier: char,
    pub hardware_fitness_identifier: char,
    /// Ordered as the devices reported, which reflects the physical
    /// reporting order.
    pub fitness: Vec<FitnessEntry>,
}

/// One device's entry in a fitness report.
///
/// The status text's internal format varies by device type and is carried
/// opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FitnessEntry {
    /// Device identifier graphic.
    pub device_id: char,
    pub status: String,
}

impl StatusMessage {
    /// LUNO of the originating device.
    pub fn luno(&self) -> &str {
        match self {
            StatusMessage::CardReaderState(m) => &m.luno,
            StatusMessage::SendStatus(m) => &m.luno,
            StatusMessage::GetFitnessData(m) => &m.luno,
        }
    }

    /// Class/sub-class code this message carries on the wire.
    pub fn class_code(&self) -> &'static str {
        match self {
            StatusMessage::CardReaderState(_) => "12",
            StatusMessage::SendStatus(_) | StatusMessage::GetFitnessData(_) => "22",
        }
    }

    /// Build the wire payload for this message: fields joined by
    /// [`FIELD_SEPARATOR`], fitness entries by [`GROUP_SEPARATOR`].
    ///
    /// Exact inverse of [`decode_status`](crate::decode_status) for
    /// well-formed messages. Digit fields above 9 have no single-character
    /// wire shape and will not produce a decodable payload.
    pub fn encode(&self) -> Bytes {
        const FS: char = FIELD_SEPARATOR as char;
        const GS: char = GROUP_SEPARATOR as char;

        let mut out = String::new();
        match self {
            StatusMessage::CardReaderState(m) => {
                let _ = write!(
                    out,
                    "12{FS}{}{FS}{}{}{}{}{}",
                    m.luno,
                    m.device_id,
                    m.device_status,
                    m.error_severity,
                    m.diagnostic_status,
                    m.supplies_status
                );
            }
            StatusMessage::SendStatus(m) => {
                let _ = write!(out, "22{FS}{}{FS}B{FS}{}", m.luno, m.transaction_number);
            }
            StatusMessage::GetFitnessData(m) => {
                let _ = write!(
                    out,
                    "22{FS}{}{FS}F{FS}{}{}",
                    m.luno, m.message_identifier, m.hardware_fitness_identifier
                );
                for (i, entry) in m.fitness.iter().enumerate() {
                    if i > 0 {
                        out.push(GS);
                    }
                    out.push(entry.device_id);
                    out.push_str(&entry.status);
                }
            }
        }
        Bytes::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_status;

    #[test]
    fn card_reader_state_encodes_to_reference_payload() {
        let message = StatusMessage::CardReaderState(CardReaderState {
            luno: "00100355".to_string(),
            device_id: 'D',
            device_status: 1,
            error_severity: 0,
            diagnostic_status: 0,
            supplies_status: 1,
        });

        assert_eq!(message.encode().as_ref(), b"12\x1c00100355\x1cD1001");
    }

    #[test]
    fn send_status_encodes_to_reference_payload() {
        let message = StatusMessage::SendStatus(SendStatus {
            luno: "00100355".to_string(),
            descriptor: 'B',
            transaction_number: 4321,
        });

        assert_eq!(message.encode().as_ref(), b"22\x1c00100355\x1cB\x1c4321");
    }

    #[test]
    fn fitness_data_encodes_with_group_separators() {
        let message = StatusMessage::GetFitnessData(GetFitnessData {
            luno: "00100355".to_string(),
            descriptor: 'F',
            message_identifier: 'J',
            hardware_fitness_identifier: 'A',
            fitness: vec![
                FitnessEntry {
                    device_id: 'D',
                    status: "01".to_string(),
                },
                FitnessEntry {
                    device_id: 'y',
                    status: "1".to_string(),
                },
            ],
        });

        assert_eq!(
            message.encode().as_ref(),
            b"22\x1c00100355\x1cF\x1cJAD01\x1dy1"
        );
    }

    #[test]
    fn encode_decode_inverse() {
        let message = StatusMessage::GetFitnessData(GetFitnessData {
            luno: "00100355".to_string(),
            descriptor: 'F',
            message_identifier: 'J',
            hardware_fitness_identifier: 'A',
            fitness: vec![
                FitnessEntry {
                    device_id: 'E',
                    status: "00000".to_string(),
                },
                FitnessEntry {
                    device_id: 'w',
                    status: "00040003000200010".to_string(),
                },
            ],
        });

        assert_eq!(decode_status(&message.encode()), Some(message));
    }

    #[test]
    fn accessors() {
        let message = StatusMessage::SendStatus(SendStatus {
            luno: "00100355".to_string(),
            descriptor: 'B',
            transaction_number: 7,
        });

        assert_eq!(message.luno(), "00100355");
        assert_eq!(message.class_code(), "22");
    }

    #[test]
    fn serializes_with_type_tag() {
        let message = StatusMessage::SendStatus(SendStatus {
            luno: "00100355".to_string(),
            descriptor: 'B',
            transaction_number: 4321,
        });

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "SendStatus");
        assert_eq!(json["transaction_number"], 4321);
    }
}
