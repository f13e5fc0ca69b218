//! # JisConv CLI - Japanese Character Encoding Converter
//!
//! Command-line interface for detecting and converting Shift_JIS, EUC-JP,
//! ISO-2022-JP and the Unicode encodings.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use jisconv::detection::EncodingDetector;
#[cfg(feature = "cli")]
use jisconv::options::{BomPolicy, ConvertOptions, FallbackPolicy};
#[cfg(feature = "cli")]
use jisconv::{Candidates, Encoding, Input, Output, Translator, registry};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// JisConv: Japanese character encoding detector and converter
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "jisconv")]
#[command(version, about, long_about = None)]
#[command(author = "JisConv Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert a file between character encodings
    Convert(ConvertArgs),

    /// Detect the encoding of a file
    Detect(DetectArgs),

    /// List all supported encodings
    List(ListArgs),

    /// Display detailed information about an encoding
    Info(InfoArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Target encoding
    #[arg(short = 't', long = "to")]
    to: Option<String>,

    /// Source encoding, AUTO, or a comma separated list of candidates
    #[arg(short = 'f', long = "from")]
    from: Option<String>,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replacement for unmappable characters (placeholder, html-entity, html-entity-hex, ignore)
    #[arg(long)]
    fallback: Option<FallbackPolicy>,

    /// Byte order mark for UTF-16/UTF-32 output (be, le, true)
    #[arg(long)]
    bom: Option<BomPolicy>,

    /// Conversion options as a JSON object; its fields override the flags above
    #[arg(long)]
    options: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Comma separated candidate encodings, in priority order
    #[arg(short, long, default_value = "AUTO")]
    encodings: String,

    /// Show every matching candidate
    #[arg(long)]
    all: bool,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ListArgs {
    /// Show only ASCII-compatible encodings
    #[arg(long)]
    ascii_compatible: bool,

    /// Show only multibyte encodings
    #[arg(long)]
    multibyte: bool,

    /// Show encoding details
    #[arg(long)]
    details: bool,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct InfoArgs {
    /// Encoding to describe
    encoding: String,

    /// Show sample characters in this encoding
    #[arg(long)]
    samples: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionResult {
    success: bool,
    from: Option<&'static str>,
    to: &'static str,
    bytes_processed: usize,
    bytes_written: usize,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Detect(ref args) => detect_command(args, &cli)?,
        Commands::List(ref args) => list_command(args, &cli)?,
        Commands::Info(ref args) => info_command(args, &cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn read_input(input: Option<&PathBuf>, verbose: bool) -> Result<Vec<u8>> {
    if let Some(input_path) = input {
        if verbose {
            eprintln!("Reading from: {}", input_path.display());
        }
        fs::read(input_path)
            .with_context(|| format!("Failed to read input file: {}", input_path.display()))
    } else {
        if verbose {
            eprintln!("Reading from stdin");
        }
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    }
}

#[cfg(feature = "cli")]
fn parse_encoding(name: &str) -> Result<Encoding> {
    name.parse::<Encoding>()
        .with_context(|| format!("Unsupported encoding: {}", name))
}

#[cfg(feature = "cli")]
fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    let mut options = ConvertOptions {
        to: args.to.clone(),
        from: args.from.clone(),
        fallback: args.fallback,
        bom: args.bom,
        ..ConvertOptions::default()
    };
    if let Some(ref json) = args.options {
        let object: ConvertOptions =
            serde_json::from_str(json).context("Failed to parse --options JSON")?;
        options = object.merge_over(options);
    }

    let Some(ref to_name) = options.to else {
        anyhow::bail!("No target encoding given; pass --to or \"to\" in --options");
    };
    let to_encoding = parse_encoding(to_name)?;

    let input_data = read_input(args.input.as_ref(), cli.verbose)?;

    // Resolved here only for reporting; convert_with repeats the same decision.
    let from_encoding = match options.from.as_deref() {
        Some(name) if !name.trim().eq_ignore_ascii_case("AUTO") && !name.contains(',') => {
            Some(parse_encoding(name)?)
        }
        candidates => {
            let detected = jisconv::detect(&input_data, candidates)
                .context("Invalid candidate encodings")?;
            if cli.verbose {
                match detected {
                    Some(encoding) => eprintln!("Detected source encoding: {}", encoding.name()),
                    None => eprintln!("Source encoding not detected, passing input through"),
                }
            }
            detected
        }
    };

    if cli.verbose {
        eprintln!(
            "Converting from {} to {}",
            from_encoding.map_or("(unknown)", Encoding::name),
            to_encoding.name()
        );
    }

    let output = jisconv::convert_with(&input_data, &options)
        .with_context(|| format!("Failed to convert to {}", to_encoding.name()))?;
    let output_data = output.into_bytes();

    if let Some(ref output_path) = args.output {
        fs::write(output_path, &output_data)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
        if cli.verbose {
            eprintln!("Wrote to: {}", output_path.display());
        }
    } else if matches!(cli.format, OutputFormat::Text) {
        io::stdout()
            .write_all(&output_data)
            .context("Failed to write to stdout")?;
    }

    let processing_time = start_time.elapsed();

    if cli.verbose {
        eprintln!(
            "Processed {} bytes -> {} bytes in {:?}",
            input_data.len(),
            output_data.len(),
            processing_time
        );
    }

    if let OutputFormat::Json = cli.format {
        let result = ConversionResult {
            success: true,
            from: from_encoding.map(Encoding::name),
            to: to_encoding.name(),
            bytes_processed: input_data.len(),
            bytes_written: output_data.len(),
            processing_time_ms: processing_time.as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let sample_data = read_input(args.input.as_ref(), cli.verbose)?;

    let candidates = Candidates::from(args.encodings.as_str())
        .resolve()
        .with_context(|| format!("Invalid candidate encodings: {}", args.encodings))?;
    if cli.verbose {
        let names: Vec<_> = candidates.iter().map(|e| e.name()).collect();
        eprintln!("Candidates: {}", names.join(", "));
    }

    let detector = EncodingDetector::with_candidates(candidates);
    let detection_result = detector.analyze(&sample_data);

    match cli.format {
        OutputFormat::Json => {
            let candidates_json: Vec<_> = detection_result
                .candidates
                .iter()
                .map(|encoding| encoding.name())
                .collect();

            let result = serde_json::json!({
                "detected_encoding": detection_result.encoding.map(Encoding::name),
                "bom_detected": detection_result.bom_detected,
                "sample_size": sample_data.len(),
                "candidates": candidates_json
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            match detection_result.encoding {
                Some(encoding) => println!(
                    "Detected encoding: {} ({})",
                    encoding.name(),
                    encoding.display_name()
                ),
                None => println!("Detected encoding: none"),
            }

            if detection_result.bom_detected {
                println!("BOM detected: Yes");
            }

            println!("Sample size: {} bytes", sample_data.len());

            if args.all && detection_result.candidates.len() > 1 {
                println!("\nAll matching candidates:");
                for encoding in &detection_result.candidates {
                    println!("  {}", encoding.name());
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn category(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::JIS | Encoding::EUCJP | Encoding::SJIS => "japanese",
        Encoding::ASCII | Encoding::BINARY => "other",
        _ => "unicode",
    }
}

#[cfg(feature = "cli")]
fn list_command(args: &ListArgs, cli: &Cli) -> Result<()> {
    let filtered_encodings: Vec<_> = Encoding::ALL
        .into_iter()
        .filter(|encoding| !args.ascii_compatible || encoding.is_ascii_compatible())
        .filter(|encoding| !args.multibyte || encoding.is_multibyte())
        .collect();

    match cli.format {
        OutputFormat::Json => {
            let encodings_info: Vec<_> = filtered_encodings
                .iter()
                .map(|encoding| {
                    serde_json::json!({
                        "name": encoding.name(),
                        "display_name": encoding.display_name(),
                        "category": category(*encoding),
                        "priority": encoding.priority(),
                        "aliases": registry::aliases_of(*encoding),
                        "ascii_compatible": encoding.is_ascii_compatible(),
                        "multibyte": encoding.is_multibyte(),
                        "has_bom": encoding.bom().is_some()
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&encodings_info)?);
        }
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", filtered_encodings.len());
            println!();

            for encoding in filtered_encodings {
                let priority = encoding
                    .priority()
                    .map_or_else(|| "-".to_string(), |p| p.to_string());
                println!(
                    "{:10} {:10} {:>3}  {}",
                    encoding.name(),
                    format!("[{}]", category(encoding)),
                    priority,
                    registry::aliases_of(encoding).join(", ")
                );

                if args.details {
                    println!("           {}", encoding.description());
                    println!(
                        "           ASCII Compatible: {}",
                        yes_no(encoding.is_ascii_compatible())
                    );
                    println!("           Multibyte: {}", yes_no(encoding.is_multibyte()));
                    if let Some(bom) = encoding.bom() {
                        println!("           BOM: {:02X?}", bom);
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn info_command(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let encoding = parse_encoding(&args.encoding)?;

    match cli.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": encoding.name(),
                "display_name": encoding.display_name(),
                "aliases": registry::aliases_of(encoding),
                "priority": encoding.priority(),
                "ascii_compatible": encoding.is_ascii_compatible(),
                "multibyte": encoding.is_multibyte(),
                "bom": encoding.bom().map(|b| format!("{:02X?}", b)),
                "description": encoding.description()
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("Encoding Information: {}", encoding.name());
            println!("Display Name: {}", encoding.display_name());
            println!("Description: {}", encoding.description());
            println!("Aliases: {}", registry::aliases_of(encoding).join(", "));
            match encoding.priority() {
                Some(priority) => println!("Detection Priority: {}", priority),
                None => println!("Detection Priority: not auto-detected"),
            }
            println!(
                "ASCII Compatible: {}",
                yes_no(encoding.is_ascii_compatible())
            );
            println!("Multibyte: {}", yes_no(encoding.is_multibyte()));

            if let Some(bom) = encoding.bom() {
                println!("BOM: {:02X?}", bom);
            } else {
                println!("BOM: None");
            }

            if args.samples {
                println!("\nCharacter Samples:");
                print_character_samples(encoding);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_character_samples(encoding: Encoding) {
    let translator = Translator::new(Encoding::UNICODE, encoding);
    for sample in ["A", "あ", "日本", "ｶﾅ", "𠮷"] {
        let units: Vec<u16> = sample.encode_utf16().collect();
        match translator.translate(Input::Units(&units)) {
            Output::Bytes(bytes) => println!("  {} -> {:02X?}", sample, bytes),
            Output::Units(units) => println!("  {} -> {:04X?}", sample, units),
            Output::Text(text) => println!("  {} -> {}", sample, text),
        }
    }
}
