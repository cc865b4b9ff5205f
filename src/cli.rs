// Command-line front end for tag file inspection.
//
// Subcommands map one-to-one onto the library: `info` runs the file wrapper
// over one or more paths, `types` dumps the type table, `items` and
// `patches` list the INDX tables, `config` reports build features.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use serde_json::{Value, json};

use crate::dump;
use crate::io::{ReadStats, read_file, read_files};
use crate::tag::types::{TypeTable, raw_index};
use crate::tag::{Container, SUPPORTED_SDK_VERSION};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Tag file container inspector.
#[derive(Parser, Debug)]
#[command(
    name = "tagfile",
    version,
    about = "Inspect tagged binary containers and their embedded type tables",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Summarize one or more tag files.
    Info(InfoArgs),
    /// Dump the type table.
    Types(TypesArgs),
    /// List the ITEM table.
    Items(ListArgs),
    /// List the PTCH table.
    Patches(ListArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Tag files to summarize.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Xml,
    Json,
}

#[derive(Args, Debug)]
struct TypesArgs {
    /// Tag file input.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output format (`--json` implies json).
    #[arg(long, value_enum, default_value_t = DumpFormat::Xml)]
    format: DumpFormat,

    /// Write the dump to a file instead of stdout.
    #[arg(short = 'o', long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Tag file input.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Info,
    Types,
    Items,
    Patches,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    inputs: Vec<PathBuf>,
    format: DumpFormat,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(3),
        json_output: cli.json_output,
        inputs: Vec::new(),
        format: DumpFormat::Xml,
        output_file: None,
    };

    match cli.command {
        Cmd::Info(args) => {
            opts.command = Command::Info;
            opts.inputs = args.inputs;
        }
        Cmd::Types(args) => {
            opts.command = Command::Types;
            opts.inputs = vec![args.input];
            opts.format = if cli.json_output {
                DumpFormat::Json
            } else {
                args.format
            };
            opts.output_file = args.output;
        }
        Cmd::Items(args) => {
            opts.command = Command::Items;
            opts.inputs = vec![args.input];
        }
        Cmd::Patches(args) => {
            opts.command = Command::Patches;
            opts.inputs = vec![args.input];
        }
        Cmd::Config => {}
    }
    opts
}

/// Log filter implied by `-q` / `-v`; `RUST_LOG` still wins.
fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("tagfile".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn load(path: &Path) -> Option<(Container, ReadStats)> {
    match read_file(path) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            eprintln!("tagfile: {}: {e}", path.display());
            None
        }
    }
}

fn open_output(opts: &Options) -> Option<Box<dyn Write>> {
    let Some(path) = &opts.output_file else {
        return Some(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        )));
    };
    if path.exists() && !opts.force {
        eprintln!(
            "tagfile: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return None;
    }
    match File::create(path) {
        Ok(f) => Some(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
        Err(e) => {
            eprintln!("tagfile: output file: {}: {e}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("tagfile version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("SDK_VERSION={SUPPORTED_SDK_VERSION}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn info_json(path: &Path, container: &Container, stats: &ReadStats) -> Value {
    json!({
        "file": path.display().to_string(),
        "sdk_version": container.sdk_version,
        "file_size": stats.file_size,
        "types": stats.types,
        "items": stats.items,
        "patches": stats.patches,
        "data_size": stats.data_size,
        "sha256": stats.sha256_hex(),
    })
}

fn cmd_info(opts: &Options) -> i32 {
    let mut status = 0;
    let mut reports = Vec::new();

    for (path, result) in read_files(opts.inputs.as_slice()) {
        let (container, stats) = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("tagfile: {}: {e}", path.display());
                status = 1;
                continue;
            }
        };

        if opts.json_output {
            reports.push(info_json(&path, &container, &stats));
            continue;
        }
        println!("{}:", path.display());
        println!("  SDK version:   {}", container.sdk_version);
        println!("  File size:     {}", stats.file_size);
        println!("  Types:         {}", stats.types);
        println!("  Items:         {}", stats.items);
        println!("  Patches:       {}", stats.patches);
        println!("  Data size:     {}", stats.data_size);
        if let Some(hex) = stats.sha256_hex() {
            println!("  SHA-256:       {hex}");
        }
    }

    if opts.json_output {
        print_json(&Value::Array(reports));
    }
    status
}

// ---------------------------------------------------------------------------
// Types command
// ---------------------------------------------------------------------------

fn types_json(types: &TypeTable) -> Value {
    let entries: Vec<Value> = types
        .iter()
        .map(|(id, t)| {
            json!({
                "id": id.get(),
                "name": t.name,
                "flags": t.flags.bits(),
                "parent": t.parent.map(|p| p.get()),
                "sub_type_flags": t.sub_type_flags,
                "pointee": t.pointee.map(|p| p.get()),
                "version": t.version,
                "byte_size": t.byte_size(),
                "alignment": t.alignment(),
                "abstract_value": t.abstract_value,
                "hash": t.hash,
                "templates": t.templates.iter().map(|tp| json!({
                    "name": tp.name,
                    "value": tp.value,
                })).collect::<Vec<_>>(),
                "members": t.members.iter().map(|m| json!({
                    "name": m.name,
                    "flags": m.flags,
                    "offset": m.offset,
                    "type": raw_index(m.type_ref),
                })).collect::<Vec<_>>(),
                "interfaces": t.interfaces.iter().map(|i| json!({
                    "type": raw_index(i.type_ref),
                    "value": i.value,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    Value::Array(entries)
}

fn cmd_types(opts: &Options) -> i32 {
    let Some(path) = opts.inputs.first() else {
        eprintln!("tagfile: types requires an input file");
        return 1;
    };
    let Some((container, _)) = load(path) else {
        return 1;
    };
    let Some(mut out) = open_output(opts) else {
        return 1;
    };

    let written = match opts.format {
        DumpFormat::Xml => dump::write_types_xml(&container.types, &mut out),
        DumpFormat::Json => {
            let text = serde_json::to_string_pretty(&types_json(&container.types))
                .unwrap_or_default();
            writeln!(out, "{text}")
        }
    };
    if let Err(e) = written.and_then(|()| out.flush()) {
        eprintln!("tagfile: write error: {e}");
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "tagfile: {}: {} types dumped",
            path.display(),
            container.types.len().saturating_sub(1)
        );
    }
    0
}

// ---------------------------------------------------------------------------
// Items / patches commands
// ---------------------------------------------------------------------------

fn cmd_items(opts: &Options) -> i32 {
    let Some(path) = opts.inputs.first() else {
        eprintln!("tagfile: items requires an input file");
        return 1;
    };
    let Some((container, _)) = load(path) else {
        return 1;
    };
    let types = &container.types;

    if opts.json_output {
        let items: Vec<Value> = container
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                json!({
                    "index": i,
                    "type": raw_index(item.type_ref),
                    "type_name": types.name_of(item.type_ref),
                    "pointer": item.is_pointer,
                    "offset": item.offset,
                    "count": item.count,
                })
            })
            .collect();
        print_json(&Value::Array(items));
        return 0;
    }

    println!("  Index  Type                             Ptr    Offset     Count");
    for (i, item) in container.items.iter().enumerate() {
        let name = types.name_of(item.type_ref).unwrap_or("-");
        let ptr = if item.is_pointer { "yes" } else { "no" };
        println!(
            "  {i:5}  {name:<32} {ptr:<5} {:>7} {:>9}",
            item.offset, item.count
        );
    }
    if !opts.quiet {
        eprintln!("tagfile: {} items", container.items.len());
    }
    0
}

fn cmd_patches(opts: &Options) -> i32 {
    let Some(path) = opts.inputs.first() else {
        eprintln!("tagfile: patches requires an input file");
        return 1;
    };
    let Some((container, _)) = load(path) else {
        return 1;
    };
    let types = &container.types;

    if opts.json_output {
        let patches: Vec<Value> = container
            .patches
            .iter()
            .map(|p| {
                json!({
                    "type": raw_index(p.type_ref),
                    "type_name": types.name_of(p.type_ref),
                    "offsets": p.offsets,
                })
            })
            .collect();
        print_json(&Value::Array(patches));
        return 0;
    }

    for patch in &container.patches {
        let name = types.name_of(patch.type_ref).unwrap_or("-");
        let offsets: Vec<String> = patch.offsets.iter().map(u32::to_string).collect();
        println!("  {name:<32} {:3}: {}", patch.offsets.len(), offsets.join(" "));
    }
    if !opts.quiet {
        eprintln!("tagfile: {} patches", container.patches.len());
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Info => cmd_info(&opts),
        Command::Types => cmd_types(&opts),
        Command::Items => cmd_items(&opts),
        Command::Patches => cmd_patches(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
