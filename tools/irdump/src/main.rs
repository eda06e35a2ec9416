//! dbt-irdump — raw guest code → IR dump tool.
//!
//! Reads a flat binary of ARC guest code, translates it unit by unit
//! and prints the IR in a human-readable format.

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::process;

use anyhow::{bail, Context as _, Result};

use dbt_core::context::Context;
use dbt_core::dump::dump_ops;
use dbt_core::unit::{cflags, ExitKind};
use dbt_frontend::arc::translate_unit;

struct Args {
    bin_path: String,
    base: u32,
    start: Option<u32>,
    output: Option<String>,
    count: Option<usize>,
    max_insns: u32,
    single_step: bool,
}

const USAGE: &str = "\
usage: dbt-irdump <bin> [options]

Options:
  --base <hex>       Guest load address of the binary (default: 0)
  --start <hex>      Start address (default: base)
  -o <file>          Output to file
  --count <n>        Max units to translate
  --max-insns <n>    Max insns per unit (default: 512)
  --single-step      One-instruction units
  -h, --help         Show this help";

fn parse_hex(s: &str) -> Result<u32> {
    let s = s.trim_start_matches("0x");
    u32::from_str_radix(s, 16).context("invalid hex address")
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("{USAGE}");
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let mut a = Args {
        bin_path: args[1].clone(),
        base: 0,
        start: None,
        output: None,
        count: None,
        max_insns: 512,
        single_step: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--base" => {
                i += 1;
                a.base = parse_hex(&args[i])?;
            }
            "--start" => {
                i += 1;
                a.start = Some(parse_hex(&args[i])?);
            }
            "-o" => {
                i += 1;
                a.output = Some(args[i].clone());
            }
            "--count" => {
                i += 1;
                a.count = Some(args[i].parse().context("invalid count")?);
            }
            "--max-insns" => {
                i += 1;
                a.max_insns = args[i].parse().context("invalid max-insns")?;
            }
            "--single-step" => a.single_step = true,
            other => bail!("unknown option: {other}"),
        }
        i += 1;
    }
    Ok(a)
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let code = fs::read(&args.bin_path)
        .with_context(|| format!("failed to read {}", args.bin_path))?;
    if code.is_empty() {
        bail!("{} is empty", args.bin_path);
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let f = fs::File::create(path).with_context(|| format!("cannot create {path}"))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut unit_cflags = args.max_insns & cflags::CF_COUNT_MASK;
    if args.single_step {
        unit_cflags |= cflags::CF_SINGLE_STEP;
    }

    let end = args.base + code.len() as u32;
    let mut pc = args.start.unwrap_or(args.base);
    let max_count = args.count.unwrap_or(usize::MAX);
    let mut ir = Context::new();
    let mut unit_count = 0usize;

    while pc >= args.base && pc < end && unit_count < max_count {
        writeln!(out, "unit #{unit_count} @ {pc:#010x}")?;
        let summary = translate_unit(&mut ir, &code, args.base, pc, 0, unit_cflags);
        dump_ops(&ir, &mut out)?;
        writeln!(out)?;

        unit_count += 1;
        match summary.exit {
            // Static fall-through: keep walking the image.
            ExitKind::Fallthrough | ExitKind::DebugStop => {
                pc = pc.wrapping_add(summary.size);
            }
            // Runtime pc needed to continue; stop here.
            ExitKind::Branch | ExitKind::BranchDelaySlot | ExitKind::Exception => break,
        }
        if summary.size == 0 {
            break;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("dbt-irdump: {e:#}");
        process::exit(1);
    }
}
