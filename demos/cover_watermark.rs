//! Cover the corner watermark in a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example cover_watermark -- input.jpg output.png
//! ```

use std::env;
use std::process;

use watermark_inpaint::{Config, FillMode, ProcessOptions, WatermarkProcessor};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output>", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];

    let processor = WatermarkProcessor::new(Config::default(), FillMode::Inpaint);
    let opts = ProcessOptions::default();
    let result = processor.process_file(input.as_ref(), output.as_ref(), &opts);

    if result.skipped {
        println!("Skipped: {}", result.message);
    } else if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
