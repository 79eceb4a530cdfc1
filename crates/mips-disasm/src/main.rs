use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use mips_rs::{Decoder, DecoderConfig, Listing, Mips32Decoder, RegisterStyle};

const FORMAT_ERROR: &str = "Format of input file is incorrect.";
const EXIT_OK: u8 = 0;
const EXIT_FORMAT: u8 = 1;

#[derive(Parser, Debug)]
#[command(author, version, about = "Translate 32-bit MIPS binary encodings to assembly", long_about=None)]
struct Cli {
    /// Input text file, one 32-digit binary encoding per line
    #[arg(value_name = "FILE")]
    input: PathBuf,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write ABI register names ($t0, $sp) instead of $n
    #[arg(long)]
    names: bool,
    /// Accept CRLF line endings
    #[arg(long)]
    crlf: bool,
    /// Load decoder settings from JSON ({ "registers": "symbolic", "accept_crlf": true })
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

// Flags win over the config file.
fn load_config(cli: &Cli) -> Result<DecoderConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&txt).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DecoderConfig::default(),
    };
    if cli.names { cfg.registers = RegisterStyle::Symbolic; }
    if cli.crlf { cfg.accept_crlf = true; }
    Ok(cfg)
}

fn render(listing: &Listing, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut buf = String::new();
            for inst in listing {
                let _ = writeln!(buf, "{}\t{}", inst.encoding(), inst.assembly());
            }
            Ok(buf)
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(listing.instructions())?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).map(ExitCode::from)
}

// Exit status 1 with FORMAT_ERROR when the file is unreadable or malformed.
fn run(cli: Cli) -> Result<u8> {
    let dec = Mips32Decoder::with_config(load_config(&cli)?);
    debug!(cfg = ?dec.config(), input = %cli.input.display(), "decoding");

    let listing = match Listing::load(&dec, &cli.input) {
        Ok(listing) => listing,
        Err(err) => {
            error!("{err:#}");
            eprintln!("{FORMAT_ERROR}");
            return Ok(EXIT_FORMAT);
        }
    };
    if !listing.is_format_correct() {
        if let Some(err) = listing.error() { error!(%err, "input rejected"); }
        eprintln!("{FORMAT_ERROR}");
        return Ok(EXIT_FORMAT);
    }

    let text = render(&listing, cli.format)?;
    if let Some(path) = cli.out { std::fs::write(path, text)?; } else { print!("{}", text); }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ADD: &str = "00000000001000100001100000100000";
    const LW: &str = "10001100100000100000000000001000";

    fn cli_for(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("mips-disasm").chain(args.iter().copied()))
    }

    #[test]
    fn text_output_pairs_encoding_and_assembly() {
        let listing = Listing::produce(&Mips32Decoder::new(), &format!("{ADD}\n{LW}\n"));
        let out = render(&listing, OutputFormat::Text).unwrap();
        assert_eq!(out, format!("{ADD}\tadd\t$3, $1, $2\n{LW}\tlw\t$2, 8($4)\n"));
    }

    #[test]
    fn json_output_lists_instructions() {
        let listing = Listing::produce(&Mips32Decoder::new(), ADD);
        let out = render(&listing, OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["mnemonic"], "add");
        assert_eq!(v[0]["rd"], "$3");
        assert_eq!(v[0]["assembly"], "add\t$3, $1, $2");
    }

    #[test]
    fn flags_override_config_file() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_decoder_config.json");
        std::fs::write(&path, r#"{ "accept_crlf": true }"#).unwrap();
        let cli = cli_for(&["--config", path.to_str().unwrap(), "--names", "in.txt"]);
        let cfg = load_config(&cli).unwrap();
        assert!(cfg.accept_crlf);
        assert_eq!(cfg.registers, RegisterStyle::Symbolic);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn run_exit_status_follows_input() {
        let cwd = std::env::current_dir().unwrap();

        let missing = cwd.join("_no_such_encodings.txt");
        let status = run(cli_for(&[missing.to_str().unwrap()])).unwrap();
        assert_eq!(status, EXIT_FORMAT);

        let short = cwd.join("_test_short_line.txt");
        std::fs::write(&short, format!("{ADD}\n{}\n", &LW[..31])).unwrap();
        let status = run(cli_for(&[short.to_str().unwrap()])).unwrap();
        assert_eq!(status, EXIT_FORMAT);
        let _ = std::fs::remove_file(&short);

        let good = cwd.join("_test_good_lines.txt");
        let out = cwd.join("_test_good_lines.out");
        std::fs::write(&good, format!("{ADD}\n{LW}\n")).unwrap();
        let status =
            run(cli_for(&["--out", out.to_str().unwrap(), good.to_str().unwrap()])).unwrap();
        assert_eq!(status, EXIT_OK);
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, format!("{ADD}\tadd\t$3, $1, $2\n{LW}\tlw\t$2, 8($4)\n"));
        let _ = std::fs::remove_file(&good);
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn default_config_without_flags() {
        let cfg = load_config(&cli_for(&["in.txt"])).unwrap();
        assert_eq!(cfg, DecoderConfig::default());
    }
}
