use crate::message::FitnessEntry;
use crate::GROUP_SEPARATOR;

/// Split a fitness remainder into ordered per-device entries.
///
/// Segments are separated by [`GROUP_SEPARATOR`]; empty segments are
/// discarded. Within a segment the first character is the device identifier
/// graphic and the rest is the device's status text, carried opaquely (its
/// internal format varies by device type). Order is preserved — it reflects
/// the physical device reporting order.
pub fn decode_fitness(remainder: &str) -> Vec<FitnessEntry> {
    remainder
        .split(GROUP_SEPARATOR as char)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let mut chars = segment.chars();
            let device_id = chars.next()?;
            Some(FitnessEntry {
                device_id,
                status: chars.as_str().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_entries_in_reporting_order() {
        let entries = decode_fitness("D01\x1dy1\x1dA0");

        assert_eq!(
            entries,
            vec![
                FitnessEntry {
                    device_id: 'D',
                    status: "01".to_string(),
                },
                FitnessEntry {
                    device_id: 'y',
                    status: "1".to_string(),
                },
                FitnessEntry {
                    device_id: 'A',
                    status: "0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn single_character_segment_has_empty_status() {
        let entries = decode_fitness("G");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].device_id, 'G');
        assert!(entries[0].status.is_empty());
    }

    #[test]
    fn empty_segments_are_discarded() {
        let entries = decode_fitness("\x1dD0\x1d\x1dH1\x1d");

        let devices: Vec<char> = entries.iter().map(|e| e.device_id).collect();
        assert_eq!(devices, vec!['D', 'H']);
    }

    #[test]
    fn empty_remainder_yields_no_entries() {
        assert!(decode_fitness("").is_empty());
    }

    #[test]
    fn status_text_is_carried_opaquely() {
        // Device-specific payloads are not interpreted, whatever they hold.
        let entries = decode_fitness("w00040003000200010");

        assert_eq!(entries[0].device_id, 'w');
        assert_eq!(entries[0].status, "00040003000200010");
    }
}
