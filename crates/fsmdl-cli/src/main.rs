use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fsmdl::bytecode::InstructionBody;
use fsmdl::{Chunk, ChunkReader, Registry};
use log::{error, info};

mod registry;

#[derive(Parser)]
#[command(name = "fsmdl", about = "Decode FS9 aircraft model files")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode models and write one JSON document per file.
    Dump {
        /// Model files, or directories to scan for `.mdl` files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// JSON variable registry used to name DICT entries.
        #[arg(long, env = "FSMDL_REGISTRY")]
        registry: Option<PathBuf>,
        /// Write JSON here instead of next to each model.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Emit compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },
    /// Print the block structure of a model.
    Info {
        file: PathBuf,
        /// JSON variable registry used to name DICT entries.
        #[arg(long, env = "FSMDL_REGISTRY")]
        registry: Option<PathBuf>,
    },
    /// Format 16 hex-encoded bytes as a canonical variable identifier.
    Guid {
        /// 32 hex digits, in file byte order.
        hex: String,
    },
}

fn init_logging(verbose: u8) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}

/// Expand directories into their `.mdl` files (case-insensitive, sorted).
/// Plain file arguments are passed through unchanged.
fn collect_models(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut models = Vec::new();
    for path in paths {
        if !path.is_dir() {
            models.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        let entries = fs::read_dir(path)
            .with_context(|| format!("reading model dir: {}", path.display()))?;
        for entry in entries {
            let entry_path = entry?.path();
            let is_mdl = entry_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("mdl"));
            if is_mdl && entry_path.is_file() {
                found.push(entry_path);
            }
        }
        found.sort();
        if found.is_empty() {
            log::warn!("no .mdl files in {}", path.display());
        }
        models.extend(found);
    }
    Ok(models)
}

/// `<stem>.json` next to the model, or inside `out_dir` when given.
fn output_path(model: &Path, out_dir: Option<&Path>) -> PathBuf {
    let json = model.with_extension("json");
    match (out_dir, json.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => json,
    }
}

fn decode_file(path: &Path, registry: &Registry) -> Result<Vec<Chunk>> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let chunks = ChunkReader::new(registry)
        .parse(&data)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(chunks)
}

fn write_json(out: &Path, chunks: &[Chunk], compact: bool) -> Result<()> {
    let file =
        fs::File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    if compact {
        serde_json::to_writer(&mut writer, chunks)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, chunks)?;
    }
    writer.flush().with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

fn cmd_dump(
    paths: &[PathBuf],
    registry: Option<&Path>,
    out_dir: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let registry = registry::load_optional(registry)?;
    let models = collect_models(paths)?;
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut failed = 0usize;
    for model in &models {
        let result = decode_file(model, &registry).and_then(|chunks| {
            let out = output_path(model, out_dir);
            write_json(&out, &chunks, compact)?;
            Ok(out)
        });
        match result {
            Ok(out) => info!("{} -> {}", model.display(), out.display()),
            Err(e) => {
                error!("{e:#}");
                failed += 1;
            }
        }
    }

    info!("decoded {} of {} models", models.len() - failed, models.len());
    if failed > 0 {
        bail!("{failed} model(s) failed to decode");
    }
    Ok(())
}

fn print_summary(chunks: &[Chunk], depth: usize) {
    let indent = "  ".repeat(depth);
    for chunk in chunks {
        let tag = chunk.tag();
        match chunk {
            Chunk::Riff { sub_block } => {
                println!("{indent}{tag} ({} blocks)", sub_block.len());
                print_summary(sub_block, depth + 1);
            }
            Chunk::Header(h) => println!(
                "{indent}{tag} radius={} after_offsets={:#x}",
                h.model_radius, h.after_offsets
            ),
            Chunk::Dict(d) => {
                let custom = d
                    .bindings
                    .iter()
                    .filter(|b| b.name == fsmdl::chunks::dict::CUSTOM_NAME)
                    .count();
                println!("{indent}{tag} {} variables ({custom} custom)", d.bindings.len());
            }
            Chunk::BoundingBox => println!("{indent}{tag}"),
            Chunk::Creator { creator } => println!("{indent}{tag} {creator:?}"),
            Chunk::Bytecode(bgl) => {
                let records = bgl
                    .instructions
                    .iter()
                    .filter(|i| !matches!(i.body, InstructionBody::Operands(_)))
                    .count();
                println!(
                    "{indent}{tag} {} instructions ({records} records), {} tail bytes",
                    bgl.instructions.len(),
                    bgl.tail.len()
                );
            }
        }
    }
}

fn cmd_info(file: &Path, registry: Option<&Path>) -> Result<()> {
    let registry = registry::load_optional(registry)?;
    let chunks = decode_file(file, &registry)?;
    println!("{}", file.display());
    print_summary(&chunks, 1);
    Ok(())
}

fn cmd_guid(hex: &str) -> Result<()> {
    let digits: Vec<char> = hex.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();
    if digits.len() != 32 {
        bail!("expected 32 hex digits, found {}", digits.len());
    }
    let mut bytes = [0u8; 16];
    for (i, pair) in digits.chunks(2).enumerate() {
        let text: String = pair.iter().collect();
        if !pair.iter().all(char::is_ascii_hexdigit) {
            bail!("invalid hex byte {text:?}");
        }
        bytes[i] = u8::from_str_radix(&text, 16)?;
    }
    println!("{}", fsmdl::guid::format(&bytes));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Dump {
            paths,
            registry,
            out_dir,
            compact,
        } => cmd_dump(&paths, registry.as_deref(), out_dir.as_deref(), compact),
        Command::Info { file, registry } => cmd_info(&file, registry.as_deref()),
        Command::Guid { hex } => cmd_guid(&hex),
    }
}
