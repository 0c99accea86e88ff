//! emx-transcode CLI
//!
//! Detect text encodings and convert files to UTF-8.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emx_transcode::{
    Resolver, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MAX_SAMPLE_SIZE, MIN_BUFFER_SIZE, SAMPLE_SIZE,
};
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "emx-transcode")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Text encoding detection and UTF-8 conversion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report the detected encoding of files/directories
    Detect {
        /// Files and directories to inspect
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Bytes sampled for detection
        #[arg(long, default_value_t = SAMPLE_SIZE, value_parser = parse_sample_size)]
        sample_size: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert a file to UTF-8
    Convert {
        /// File to convert (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Bytes sampled for detection
        #[arg(long, default_value_t = SAMPLE_SIZE, value_parser = parse_sample_size)]
        sample_size: usize,

        /// Transcoding buffer size
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = parse_buffer_size)]
        buffer_size: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { inputs, sample_size, verbose } => {
            init_logging(verbose);
            let resolver = Resolver::new().with_sample_size(sample_size);
            detect_inputs(inputs, &resolver)?;
        }
        Commands::Convert { input, output, sample_size, buffer_size, verbose } => {
            init_logging(verbose);
            let resolver = Resolver::new()
                .with_sample_size(sample_size)
                .with_buffer_size(buffer_size);
            convert(input, output, &resolver)?;
        }
    }

    Ok(())
}

fn parse_sample_size(value: &str) -> std::result::Result<usize, String> {
    parse_bounded(value, 1, MAX_SAMPLE_SIZE)
}

fn parse_buffer_size(value: &str) -> std::result::Result<usize, String> {
    parse_bounded(value, MIN_BUFFER_SIZE, MAX_BUFFER_SIZE)
}

fn parse_bounded(value: &str, min: usize, max: usize) -> std::result::Result<usize, String> {
    let size: usize = value.parse().map_err(|e| format!("{}", e))?;
    if !(min..=max).contains(&size) {
        return Err(format!("must be between {} and {}", min, max));
    }
    Ok(size)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn detect_inputs(inputs: Vec<PathBuf>, resolver: &Resolver) -> Result<()> {
    for input in &inputs {
        if input.is_dir() {
            let entries = walkdir::WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .collect::<Vec<_>>();

            for entry in entries {
                detect_file(resolver, entry.path())?;
            }
        } else {
            detect_file(resolver, input)?;
        }
    }

    Ok(())
}

fn detect_file(resolver: &Resolver, path: &Path) -> Result<()> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;

    match resolver.detect(&mut file) {
        Ok(candidate) => {
            println!(
                "{}  {}  {}  {}",
                path.display(),
                candidate.label,
                candidate.confidence,
                candidate.label.resolution()
            );
        }
        Err(emx_transcode::Error::Read(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
            println!("{}  (empty)", path.display());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to detect: {}", path.display()));
        }
    }

    Ok(())
}

fn convert(input: Option<PathBuf>, output: Option<PathBuf>, resolver: &Resolver) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(output_path) = &output {
        let file = fs::File::create(output_path)
            .with_context(|| format!("Failed to create: {}", output_path.display()))?;
        Box::new(io::BufWriter::new(file))
    } else {
        Box::new(io::stdout().lock())
    };

    let written = if let Some(input_path) = input {
        let file = fs::File::open(&input_path)
            .with_context(|| format!("Failed to open: {}", input_path.display()))?;
        let mut stream = resolver
            .resolve(file)
            .with_context(|| format!("Failed to convert: {}", input_path.display()))?;
        log::info!("{}: {}", input_path.display(), stream.label());
        io::copy(&mut stream, &mut writer)?
    } else {
        // stdin is not seekable
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        let mut stream = resolver.resolve(Cursor::new(buffer)).context("Failed to convert stdin")?;
        log::info!("stdin: {}", stream.label());
        io::copy(&mut stream, &mut writer)?
    };

    writer.flush()?;

    if let Some(output_path) = output {
        log::info!("Wrote: {} ({} bytes)", output_path.display(), written);
    }

    Ok(())
}
