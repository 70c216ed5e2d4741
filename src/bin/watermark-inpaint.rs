use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use watermark_inpaint::{
    default_output_path, Config, FillMode, ProcessOptions, ProcessResult, WatermarkProcessor,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Rebuild the watermark region from surrounding texture (default).
    Inpaint,
    /// Cover the watermark region with opaque black.
    Flat,
}

#[derive(Parser)]
#[command(
    name = "watermark-inpaint",
    about = "Locate corner watermarks and cover them with flat fill or texture-aware inpainting",
    version,
    after_help = "Simple usage: watermark-inpaint <image>  (detect and inpaint, write {name}_cleaned.{ext})\n\n\
                  NOTE: Detection assumes bottom-right watermark placement.\n\
                  Inpainting is a best-effort heuristic, not a guaranteed restoration."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_cleaned.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// How to cover the detected region
    #[arg(short, long, value_enum, default_value = "inpaint")]
    mode: Mode,

    /// Reset the adaptive search window before every file instead of letting
    /// it converge across the batch
    #[arg(long)]
    fresh_state: bool,

    /// Search-window ratio to start from (0.15-0.4)
    #[arg(long, default_value = "0.2")]
    search_ratio: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = Config::default();
    if !(config.min_search_ratio..=config.max_search_ratio).contains(&cli.search_ratio) {
        eprintln!(
            "Error: Search ratio must be between {} and {}",
            config.min_search_ratio, config.max_search_ratio
        );
        process::exit(1);
    }

    let config = Config {
        initial_search_ratio: cli.search_ratio,
        ..config
    };
    let mode = match cli.mode {
        Mode::Inpaint => FillMode::Inpaint,
        Mode::Flat => FillMode::FlatFill,
    };

    let opts = ProcessOptions {
        carry_state: !cli.fresh_state,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let processor = WatermarkProcessor::new(config, mode);

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if !opts.quiet {
        match mode {
            FillMode::Inpaint => eprintln!("Covering watermarks via texture inpainting"),
            FillMode::FlatFill => eprintln!("Covering watermarks with flat black fill"),
        }
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: watermark-inpaint <input_dir> -o <output_dir>");
            process::exit(1);
        };
        processor.process_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![processor.process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !opts.quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !opts.quiet {
            eprintln!(
                "[OK] {filename} ({}x{} region at {}, {})",
                result.region.width, result.region.height, result.region.x, result.region.y
            );
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
