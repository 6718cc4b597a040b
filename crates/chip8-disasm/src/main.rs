use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::collections::BTreeMap;
use std::path::Path;

use chip8_rs::arch::{CHIP8, LOAD_ADDRESS, MAX_PROGRAM_SIZE};
use chip8_rs::detect::{probe, ProbeConfig, Rejection};
use chip8_rs::disasm::fmt_word;
use chip8_rs::instructions::TABLE;

use chip8_disasm::analyze::{analyze_entries, build_cfg, Analysis, Block, Cfg, Report};
use chip8_disasm::model::{load_payload, load_rom, read_u8, read_u16, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "CHIP-8 ROM disassembler CLI", long_about=None)]
struct Cli {
    /// Load address of the ROM
    #[arg(long, default_value_t = LOAD_ADDRESS, value_parser = parse_u16)]
    base: u16,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input ROM path
    #[arg(value_name = "ROMFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the file plausibly is a CHIP-8 ROM
    Detect {
        /// Largest accepted image in bytes
        #[arg(long, default_value_t = MAX_PROGRAM_SIZE)]
        max_size: usize,
        /// Leading instructions that must decode
        #[arg(long, default_value_t = 20usize)]
        probe: usize,
    },
    /// List loaded segments
    Sections,
    /// Disassemble a range [start, end) linearly
    Range {
        /// Start address (hex or dec, default: load address)
        #[arg(value_parser = parse_u16)]
        start: Option<u16>,
        /// End address (hex or dec, exclusive, default: end of ROM)
        #[arg(value_parser = parse_u16)]
        end: Option<u16>,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Analyze code graph from entry points
    Analyze {
        /// Entry addresses (hex or dec). Repeat flag to add multiple entries.
        #[arg(long = "entry", value_name = "ADDR", num_args = 1.., required = false, value_parser = parse_u16)]
        entries: Vec<u16>,
        /// Maximum instructions to decode before stopping
        #[arg(long, default_value_t = 4096usize)]
        max_instr: usize,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Emit a linear disassembly listing of analyzed code (text format only)
        #[arg(long)]
        listing: bool,
        /// Show instruction bytes in listings
        #[arg(long)]
        show_bytes: bool,
        /// Import labels from JSON (Vec<{ addr, name }>)
        #[arg(long, value_name = "FILE")]
        labels_in: Option<String>,
        /// Export labels to JSON (Vec<{ addr, name }>)
        #[arg(long, value_name = "FILE")]
        labels_out: Option<String>,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Print the opcode table
    Opcodes,
    /// Print architecture facts (register file, alignment, load address) as JSON
    Arch,
}

fn parse_u16(s: &str) -> Result<u16> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u16::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u16>()?)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, serde::Serialize)]
struct BlockOut { start: u16, end: u16, insns: Vec<String> }

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct LabelKV { addr: u16, name: String }

#[derive(Debug, Clone, serde::Serialize)]
struct ReportWithLabels {
    #[serde(flatten)]
    report: Report<BlockOut>,
    labels: Vec<LabelKV>,
}

/// One listing line: `0x0200: CLS`, optionally with the raw bytes.
fn listing_line(img: &Image, pc: u16, show_bytes: bool) -> Option<String> {
    let word = read_u16(img, pc)?;
    let text = fmt_word(word);
    Some(if show_bytes {
        let [hi, lo] = word.to_be_bytes();
        format!("{pc:#06x}: {hi:02x} {lo:02x}   {text}")
    } else {
        format!("{pc:#06x}: {text}")
    })
}

fn emit(out: Option<String>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

/// Imported labels first, then `entry` for the ROM entry point, `sub_` for
/// other entries and call targets, `loc_` for remaining block starts.
fn build_labels(imported: Vec<LabelKV>, img: &Image, seeds: &[u16], a: &Analysis, cfg: &Cfg) -> BTreeMap<u16, String> {
    let mut labels: BTreeMap<u16, String> = imported.into_iter().map(|kv| (kv.addr, kv.name)).collect();
    if seeds.contains(&img.entry) {
        labels.entry(img.entry).or_insert_with(|| "entry".to_string());
    }
    for &e in seeds.iter().chain(a.call_targets.iter()) {
        labels.entry(e).or_insert_with(|| format!("sub_{e:04x}"));
    }
    for b in &cfg.blocks {
        labels.entry(b.start).or_insert_with(|| format!("loc_{:04x}", b.start));
    }
    labels
}

fn read_labels(path: &str) -> Result<Vec<LabelKV>> {
    let txt = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&txt)?)
}

fn write_labels(path: &str, labels: &BTreeMap<u16, String>) -> Result<()> {
    let arr: Vec<LabelKV> = labels.iter().map(|(k, v)| LabelKV { addr: *k, name: v.clone() }).collect();
    std::fs::write(path, serde_json::to_string_pretty(&arr)?)?;
    Ok(())
}

fn enrich_blocks_with_mnemonics(img: &Image, blocks: &[Block], show_bytes: bool) -> Vec<BlockOut> {
    blocks
        .iter()
        .map(|b| {
            let insns = (b.start..b.end)
                .step_by(2)
                .filter_map(|pc| listing_line(img, pc, show_bytes))
                .collect();
            BlockOut { start: b.start, end: b.end, insns }
        })
        .collect()
}

/// Probe the same bytes the other subcommands map: `--skip`/`--len` apply.
fn detect_file(path: &Path, skip: usize, len: Option<usize>, cfg: &ProbeConfig) -> Result<Result<(), Rejection>> {
    let bytes = load_payload(path, skip, len)?;
    Ok(probe(&bytes, cfg))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Opcodes = cli.cmd {
        println!("{:<6} {:<6} {:<20} {:<8} {:<8}", "op", "mnem", "syntax", "mask", "match");
        for d in TABLE {
            println!("{:<6} {:<6} {:<20} {:#06x}   {:#06x}", d.pattern, d.mnemonic, d.syntax, d.mask, d.value);
        }
        return Ok(());
    }

    if let Command::Arch = cli.cmd {
        println!("{}", serde_json::to_string_pretty(&CHIP8)?);
        return Ok(());
    }

    if let Command::Detect { max_size, probe: probe_instructions } = cli.cmd {
        let cfg = ProbeConfig { max_program_size: max_size, probe_instructions };
        match detect_file(Path::new(&cli.input), cli.skip, cli.len, &cfg)? {
            Ok(()) => println!("{}: CHIP-8", cli.input),
            Err(why) => {
                println!("{}: not CHIP-8 ({why})", cli.input);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let img = load_rom(Path::new(&cli.input), cli.base, cli.skip, cli.len)?;

    match cli.cmd {
        Command::Opcodes | Command::Arch | Command::Detect { .. } => unreachable!("handled before loading"),
        Command::Sections => {
            println!("{:<10} {:<8} {:<8} {:<6} {:<6}", "name", "start", "end", "perms", "entry");
            for s in &img.segments {
                println!("{:<10} {:#06x}   {:#06x}   {:<6} {:#06x}", s.name, s.base, s.end(), s.flags, img.entry);
            }
        }
        Command::Range { start, end, show_bytes, out } => {
            let seg_end = img.segments.iter().map(|s| s.end()).max().unwrap_or(0);
            let start = start.unwrap_or(img.entry) as u32;
            let end = end.map_or(seg_end, u32::from);
            anyhow::ensure!(end >= start, "end must be >= start");

            let mut buf = String::new();
            let mut pc = start;
            while pc < end {
                use std::fmt::Write as _;
                match listing_line(&img, pc as u16, show_bytes) {
                    Some(line) => { let _ = writeln!(buf, "{line}"); }
                    None => {
                        match read_u8(&img, pc as u16) {
                            Some(b) => { let _ = writeln!(buf, "{pc:#06x}: .byte {b:#04x}"); }
                            None => { let _ = writeln!(buf, "{pc:#06x}: <oob>"); }
                        }
                        break;
                    }
                }
                pc += 2;
            }
            emit(out, &buf)?;
        }
        Command::Analyze { entries, max_instr, format, listing, show_bytes, labels_in, labels_out, out } => {
            // default seed: ROM entry point
            let mut seeds: Vec<u16> = if entries.is_empty() { vec![img.entry] } else { entries };
            seeds.sort_unstable();
            seeds.dedup();
            let analysis = analyze_entries(&img, &seeds, max_instr);
            let cfg = build_cfg(&analysis, &seeds);

            let imported = match &labels_in {
                Some(path) => read_labels(path)?,
                None => Vec::new(),
            };
            let labels = build_labels(imported, &img, &seeds, &analysis, &cfg);
            if let Some(path) = &labels_out {
                write_labels(path, &labels)?;
            }

            match format {
                OutputFormat::Json => {
                    let report = Report {
                        entries: seeds.clone(),
                        blocks: enrich_blocks_with_mnemonics(&img, &cfg.blocks, show_bytes),
                        edges: cfg.edges.clone(),
                        functions: cfg.functions.clone(),
                        indirect: analysis.indirect.iter().copied().collect(),
                        data: analysis.data.iter().copied().collect(),
                    };
                    let labels = labels.iter().map(|(k, v)| LabelKV { addr: *k, name: v.clone() }).collect();
                    let json = serde_json::to_string_pretty(&ReportWithLabels { report, labels })?;
                    emit(out, &format!("{json}\n"))?;
                }
                OutputFormat::Text => {
                    use std::fmt::Write as _;
                    let mut buf = String::new();
                    let _ = writeln!(buf, "Analysis summary:");
                    let _ = writeln!(buf, "  entries   : {:?}", seeds.iter().map(|a| format!("{a:#06x}")).collect::<Vec<_>>());
                    let _ = writeln!(buf, "  insts     : {}", analysis.insn_count());
                    let _ = writeln!(buf, "  blocks    : {}", cfg.blocks.len());
                    let _ = writeln!(buf, "  edges     : {}", cfg.edges.len());
                    let _ = writeln!(buf, "  functions : {}", cfg.functions.len());
                    let _ = writeln!(buf, "  indirect  : {}", analysis.indirect.len());
                    let _ = writeln!(buf, "Edges:");
                    for e in &cfg.edges {
                        let _ = writeln!(buf, "  {:#06x} -> {:#06x} ({})", e.from, e.to, e.kind);
                    }
                    for pc in &analysis.indirect {
                        let _ = writeln!(buf, "  {pc:#06x} -> ? (indirect)");
                    }
                    if listing {
                        let _ = writeln!(buf, "\nListing (analyzed PCs):");
                        for pc in analysis.insns() {
                            if let Some(lbl) = labels.get(&pc) {
                                let _ = writeln!(buf, "{pc:#06x} <{lbl}>:");
                            }
                            if let Some(line) = listing_line(&img, pc, show_bytes) {
                                let _ = writeln!(buf, "  {line}");
                            }
                        }
                    }
                    emit(out, &buf)?;
                }
            }
        }
    }

    Ok(())
}
