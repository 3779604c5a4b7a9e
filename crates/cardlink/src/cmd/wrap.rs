use std::fs::File;
use std::io::{self, Write};

use cardlink_frame::FrameWriter;
use cardlink_status::{FIELD_SEPARATOR, GROUP_SEPARATOR};

use crate::cmd::WrapArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: WrapArgs) -> CliResult<i32> {
    let payload = build_payload(&args.fields, args.gs);
    if !payload.is_ascii() {
        return Err(CliError::new(USAGE, "payload fields must be ASCII"));
    }

    let output: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            Box::new(file)
        }
        None => Box::new(io::stdout().lock()),
    };

    let mut writer = FrameWriter::new(output);
    writer
        .write_payload(payload.as_bytes())
        .map_err(|err| frame_error("wrap failed", err))?;

    Ok(SUCCESS)
}

fn build_payload(fields: &[String], gs: Option<char>) -> String {
    let fields: Vec<String> = fields
        .iter()
        .map(|field| match gs {
            Some(marker) => field.replace(marker, &(GROUP_SEPARATOR as char).to_string()),
            None => field.clone(),
        })
        .collect();
    fields.join(&(FIELD_SEPARATOR as char).to_string())
}
