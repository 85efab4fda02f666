//! Test command implementation.
//!
//! Feeds recorded bridge output through the same dispatch path the live
//! connection uses and prints the resulting exposition.

use sensors_exporter::{Dispatcher, LinkStatus, SampleKind, SensorMetrics, Session};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

/// Parses sample lines offline.
pub fn command_test(input: Option<PathBuf>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Sensors Exporter - Test Mode");
    println!("==============================");

    let reader: Box<dyn BufRead> = match &input {
        Some(path) => {
            println!("   📁 Reading from {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        None => {
            println!("   ⌨️  Reading from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    let metrics = Arc::new(SensorMetrics::new()?);
    let dispatcher = Dispatcher::new(metrics.clone(), Arc::new(LinkStatus::new()));
    let mut session = Session::new(1);

    let mut lines = 0usize;
    let mut temperature = 0usize;
    let mut humidity = 0usize;

    for raw in reader.split(b'\n') {
        let mut raw = raw?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        lines += 1;

        let kind = dispatcher.dispatch_line(&mut session, &raw);
        match kind {
            Some(SampleKind::Temperature) => temperature += 1,
            Some(SampleKind::Humidity) => humidity += 1,
            None => {}
        }
        if verbose {
            let label = match kind {
                Some(SampleKind::Temperature) => "temperature",
                Some(SampleKind::Humidity) => "humidity",
                None => "ignored",
            };
            println!("   ├─ {:11} {}", label, String::from_utf8_lossy(&raw));
        }
    }

    println!("   📊 Lines read: {}", lines);
    println!("      ├─ Temperature samples: {}", temperature);
    println!("      ├─ Humidity samples: {}", humidity);
    println!("      ├─ Ignored: {}", lines - temperature - humidity);
    println!("      └─ Dropped fields: {}", metrics.parse_errors.get());
    println!();
    print!("{}", metrics.encode_text()?);

    println!("\n✅ Test completed successfully");
    Ok(())
}
