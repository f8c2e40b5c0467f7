use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use log::{debug, warn};

use mpegts_descriptors::display::display_list;
use mpegts_descriptors::io::{split_sections, ByteSource, FileSource};
use mpegts_descriptors::psi::{parse_section, TableDescriptors};
use mpegts_descriptors::report::Reporter;
use mpegts_descriptors::tree::{xml, Element};
use mpegts_descriptors::{Charset, Context, DescriptorFile, Options, OutputFormat, Registry, Standards};

#[derive(Parser)]
#[command(version, about = "Decode, encode and inspect MPEG-TS descriptors")]
struct Opt {
    /// Active standards, e.g. "DVB" or "DVB,ISDB"
    #[clap(long, global = true, default_value = "DVB")]
    standards: Standards,

    /// Default private data specifier (decimal or 0x hex)
    #[clap(long = "pds", global = true, value_parser = parse_u32)]
    private_specifier: Option<u32>,

    /// Default character set of strings without a table selector
    #[clap(long, global = true, default_value = "dvb")]
    charset: Charset,

    /// Table id enclosing raw descriptor lists
    #[clap(long, global = true, value_parser = parse_u8)]
    table_id: Option<u8>,

    /// Output syntax: text, xml or json
    #[clap(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Debug logging (RUST_LOG takes precedence)
    #[clap(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Decode binary descriptor lists
    Decode { files: Vec<PathBuf> },
    /// Convert an XML or JSON descriptor list to binary
    Encode {
        input: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
    },
    /// Decode the descriptor loops of concatenated PSI/SI sections
    Section { files: Vec<PathBuf> },
}

fn parse_u32(s: &str) -> Result<u32, String> {
    mpegts_descriptors::tree::parse_integer(s)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("invalid 32-bit value '{s}'"))
}

fn parse_u8(s: &str) -> Result<u8, String> {
    mpegts_descriptors::tree::parse_integer(s)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| format!("invalid table id '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let level = if opt.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let opts = Options {
        standards: opt.standards,
        private_specifier: opt.private_specifier,
        charset: opt.charset,
        table_id: opt.table_id,
        format: opt.format,
    };
    debug!("options: {}", serde_json::to_string(&opts).unwrap_or_default());

    match opt.cmd {
        Cmd::Decode { files } => {
            for out in run_all(files, opts, decode_file).await? {
                print!("{out}");
            }
        }
        Cmd::Encode { input, output } => {
            let ctx = opts.context();
            let mut file = DescriptorFile::new(ctx);
            file.set_table_id(opts.table_id);
            match OutputFormat::from_path(&input) {
                OutputFormat::Json => file.load_json(&input)?,
                _ => file.load_xml(&input)?,
            }
            file.save_binary(&output)?;
            println!("{}: {} descriptors, {} bytes", output.display(), file.count(), file.binary_size());
        }
        Cmd::Section { files } => {
            let ctx = opts.context();
            if opts.format == OutputFormat::Json {
                // One report for all files.
                let per_file = run_all(files, opts, |path, opts| {
                    let ctx = opts.context();
                    Ok(decode_sections(path, &ctx)?
                        .into_iter()
                        .map(|t| (path.display().to_string(), t))
                        .collect::<Vec<_>>())
                })
                .await?;
                let all: Vec<_> = per_file.into_iter().flatten().collect();
                println!("{}", Reporter::generate_json_report(&all, &ctx));
            } else {
                for out in run_all(files, opts, render_sections).await? {
                    print!("{out}");
                }
            }
        }
    }
    Ok(())
}

/// Runs `job` on every file on the blocking pool, results in file order.
async fn run_all<T, F>(files: Vec<PathBuf>, opts: Options, job: F) -> anyhow::Result<Vec<T>>
where
    T: Send + 'static,
    F: Fn(&Path, &Options) -> anyhow::Result<T> + Copy + Send + 'static,
{
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let opts = opts.clone();
            tokio::task::spawn_blocking(move || job(&path, &opts))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for h in handles {
        results.push(h.await.context("decoding task panicked")??);
    }
    Ok(results)
}

fn decode_file(path: &Path, opts: &Options) -> anyhow::Result<String> {
    let data = FileSource::new(path).read_all()?;
    let ctx = opts.context();
    match opts.format {
        OutputFormat::Text => {
            let mut out = format!("* {}, {} bytes\n", path.display(), data.len());
            for line in display_list(Registry::global(), &ctx, &data, opts.table_id) {
                out.push_str(&line);
                out.push('\n');
            }
            Ok(out)
        }
        format => {
            let mut file = DescriptorFile::new(ctx);
            file.set_table_id(opts.table_id);
            if let Err(e) = file.from_binary(&data) {
                warn!("{}: {e:#}", path.display());
            }
            let mut text = if format == OutputFormat::Json { file.to_json()? } else { file.to_xml()? };
            text.push('\n');
            Ok(text)
        }
    }
}

fn decode_sections(path: &Path, ctx: &Context) -> anyhow::Result<Vec<TableDescriptors>> {
    let data: Bytes = FileSource::new(path).read_all()?;
    let sections = split_sections(&data).with_context(|| path.display().to_string())?;
    let mut tables = Vec::with_capacity(sections.len());
    for (i, sec) in sections.iter().enumerate() {
        match parse_section(sec, ctx, Registry::global()) {
            Ok(t) => tables.push(t),
            Err(e) => warn!("{}: section #{i}: {e:#}", path.display()),
        }
    }
    Ok(tables)
}

fn render_sections(path: &Path, opts: &Options) -> anyhow::Result<String> {
    let ctx = opts.context();
    let tables = decode_sections(path, &ctx)?;

    if opts.format == OutputFormat::Xml {
        let mut root = Element::new("sections");
        root.set_attr("source", path.display());
        for t in &tables {
            let sec = root.add_child("section");
            sec.set_hex("table_id", u64::from(t.table_id), 8);
            if let Some(v) = t.version {
                sec.set_int("version", u64::from(v));
            }
            for l in &t.loops {
                let lp = sec.add_child("loop");
                lp.set_attr("label", &l.label);
                lp.children.push(l.descriptors.to_tree(&ctx));
            }
        }
        return Ok(xml::to_string(&root)? + "\n");
    }

    let mut out = String::new();
    for t in &tables {
        out.push_str(&format!(
            "* {}: {} (0x{:02X}), version {}\n",
            path.display(),
            mpegts_descriptors::constants::table_name(t.table_id),
            t.table_id,
            t.version.map_or_else(|| "-".to_string(), |v| v.to_string()),
        ));
        if let Some(utc) = t.utc_time {
            out.push_str(&format!("  UTC time: {utc}\n"));
        }
        for l in &t.loops {
            out.push_str(&format!("  {}:\n", l.label));
            for line in display_list(Registry::global(), &ctx, &l.raw, Some(t.table_id)) {
                out.push_str("    ");
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

