use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cardlink_status::StatusMessage;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_message(message: &StatusMessage, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "LUNO", "DETAIL"]);
            table.add_row(vec![
                type_name(message).to_string(),
                message.luno().to_string(),
                detail(message),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} (LUNO {})", type_name(message), message.luno());
            match message {
                StatusMessage::CardReaderState(m) => {
                    println!("  device id graphic: {}", m.device_id);
                    println!("  device status:     {}", m.device_status);
                    println!("  error severity:    {}", m.error_severity);
                    println!("  diagnostic status: {}", m.diagnostic_status);
                    println!("  supplies status:   {}", m.supplies_status);
                }
                StatusMessage::SendStatus(m) => {
                    println!("  descriptor:         {}", m.descriptor);
                    println!("  transaction number: {}", m.transaction_number);
                }
                StatusMessage::GetFitnessData(m) => {
                    println!("  descriptor:       {}", m.descriptor);
                    println!("  message id:       {}", m.message_identifier);
                    println!("  hardware fitness: {}", m.hardware_fitness_identifier);
                    for entry in &m.fitness {
                        println!("  device {}: {}", entry.device_id, entry.status);
                    }
                }
            }
        }
        OutputFormat::Raw => {
            println!("{} {} {}", type_name(message), message.luno(), detail(message));
        }
    }
}

fn type_name(message: &StatusMessage) -> &'static str {
    match message {
        StatusMessage::CardReaderState(_) => "card-reader-state",
        StatusMessage::SendStatus(_) => "send-status",
        StatusMessage::GetFitnessData(_) => "get-fitness-data",
    }
}

fn detail(message: &StatusMessage) -> String {
    match message {
        StatusMessage::CardReaderState(m) => format!(
            "device={} status={} severity={} diagnostic={} supplies={}",
            m.device_id, m.device_status, m.error_severity, m.diagnostic_status, m.supplies_status
        ),
        StatusMessage::SendStatus(m) => {
            format!("descriptor={} txn={}", m.descriptor, m.transaction_number)
        }
        StatusMessage::GetFitnessData(m) => {
            let devices: String = m
                .fitness
                .iter()
                .map(|e| e.device_id)
                .flat_map(|c| [c, ','])
                .collect::<String>()
                .trim_end_matches(',')
                .to_string();
            format!(
                "msg={} hw={} devices={devices}",
                m.message_identifier, m.hardware_fitness_identifier
            )
        }
    }
}
