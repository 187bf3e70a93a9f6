use uwb_positioning::api::{OutputFormat, PositioningService};
use uwb_positioning::core::PositionOutcome;

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS] <batch_json_file>", program);
    eprintln!();
    eprintln!("Runs one survey session over a JSON batch of ranging samples");
    eprintln!("and prints the estimated positions.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --calibration <TEXT>   anchor distances in kx=<cm>&ky=<cm> form");
    eprintln!("  --csv                  list stored estimates as CSV");
    eprintln!("  --json                 list stored estimates as JSON");
    eprintln!("  --help                 show this message");
}

fn describe_axis(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1} cm", v),
        None => "default".to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.get(0).map_or("uwb-positioning", |s| s.as_str());

    let mut calibration_text: Option<String> = None;
    let mut output = OutputFormat::Text;
    let mut batch_path: Option<String> = None;

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "--help" => {
                print_usage(program);
                return Ok(());
            }
            "--csv" => output = OutputFormat::Csv,
            "--json" => output = OutputFormat::Json,
            "--calibration" => {
                index += 1;
                match args.get(index) {
                    Some(text) => calibration_text = Some(text.clone()),
                    None => {
                        eprintln!("--calibration requires a value");
                        return Err("Invalid arguments".into());
                    }
                }
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown option: {}", other);
                print_usage(program);
                return Err("Invalid arguments".into());
            }
            other => batch_path = Some(other.to_string()),
        }
        index += 1;
    }

    let batch_path = match batch_path {
        Some(path) => path,
        None => {
            print_usage(program);
            return Err("Invalid arguments".into());
        }
    };

    let payload = std::fs::read_to_string(&batch_path)?;

    let mut service = PositioningService::new();
    if let Some(text) = &calibration_text {
        let calibration = service.update_calibration(text);
        println!(
            "Calibration: kx={}, ky={}",
            describe_axis(calibration.kx),
            describe_axis(calibration.ky)
        );
    }

    let session_id = service.start_session()?;
    let summary = service.ingest_batch(&payload)?;
    service.finish_session()?;

    println!(
        "Session {}: {} received, {} saved, {} rejected",
        session_id, summary.received, summary.saved, summary.rejected
    );
    for outcome in &summary.outcomes {
        match outcome {
            PositionOutcome::Accepted(estimate) => println!(
                "  ({:.2}, {:.2}) cm via {} using {} anchors",
                estimate.x, estimate.y, estimate.algorithm, estimate.anchors_used
            ),
            PositionOutcome::Suppressed { x, y, dx, dy } => println!(
                "  ({:.2}, {:.2}) cm suppressed, moved ({:.2}, {:.2}) cm",
                x, y, dx, dy
            ),
        }
    }

    if summary.saved > 0 {
        println!();
        match output {
            OutputFormat::Json => println!("{}", service.recent_estimates_json(summary.saved, true)?),
            OutputFormat::Csv => println!("{}", service.recent_estimates_csv(summary.saved, true)),
            OutputFormat::Text => println!("{}", service.recent_estimates_text(summary.saved, false)),
        }
    }

    Ok(())
}
