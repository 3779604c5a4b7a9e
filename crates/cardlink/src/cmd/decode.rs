use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use cardlink_frame::{FrameConfig, FrameReader};
use cardlink_status::decode_status;
use tracing::info;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input: Box<dyn Read> = if args.input == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&args.input).map_err(|err| {
            io_error(&format!("failed opening {}", args.input.display()), err)
        })?;
        Box::new(file)
    };

    let config = FrameConfig {
        max_payload_size: args.max_payload,
        ..FrameConfig::default()
    };
    let mut reader = FrameReader::with_config(input, config);

    let mut printed = 0usize;
    let mut dropped = 0usize;

    loop {
        let payload = match reader.read_frame() {
            Ok(Some(payload)) => payload,
            Ok(None) => break,
            Err(err) => return Err(frame_error("decode failed", err)),
        };

        match decode_status(&payload) {
            Some(message) => {
                print_message(&message, format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    return Ok(SUCCESS);
                }
            }
            None => dropped = dropped.saturating_add(1),
        }
    }

    info!(printed, dropped, "capture decoded");
    Ok(SUCCESS)
}
