//! Writing records as CSV and streaming them back.
//!
//! Run with: cargo run --example csv_stream

use serde::{Deserialize, Serialize};
use serde_pivot::{Charset, CsvListener, CsvOptions, CsvSerializer, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Reading {
    station: String,
    celsius: f64,
    note: String,
}

#[derive(Default)]
struct Counter {
    items: usize,
}

impl CsvListener for Counter {
    fn read_item(&mut self, _item: &Value) {
        self.items += 1;
    }

    fn end_list(&mut self) {
        println!("listener saw {} records", self.items);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let readings = vec![
        Reading {
            station: "Zürich".to_string(),
            celsius: 4.5,
            note: "clear".to_string(),
        },
        Reading {
            station: "Oslo".to_string(),
            celsius: -3.0,
            note: "snow, \"heavy\"".to_string(),
        },
    ];

    let options = CsvOptions::new().with_charset(Charset::Utf8).with_write_keys(true);
    let mut serializer = CsvSerializer::with_options(options);
    serializer.add_listener(Counter::default());

    let mut bytes = Vec::new();
    serializer.write(&readings, &mut bytes)?;
    println!("{}", String::from_utf8(bytes.clone())?);

    for record in serializer.stream::<Reading, _>(bytes.as_slice())? {
        println!("{:?}", record?);
    }

    Ok(())
}
