mod parser;

use amf3::*;
use std::io::{self, Read, Write};
use anyhow::{Context, Result, anyhow};
use structopt::StructOpt;
use std::str::from_utf8;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Decode and print AMF3 messages
#[derive(StructOpt)]
#[structopt(name = "aq")]
struct Opt {
    /// parse a textual representation and encode it into AMF3 instead
    #[structopt(short, long)]
    encode: bool,
    /// read and write hexadecimal text instead of raw bytes
    #[structopt(short = "x", long)]
    hex: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    let opt = Opt::from_args();
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    if opt.encode {
        encode(&buffer, opt.hex)
    } else if opt.hex {
        let text = from_utf8(&buffer).context("input is not utf-8")?;
        print(&from_hex(text)?)
    } else {
        print(&buffer)
    }
}

/// Prints every value in the input. All values are read within one session, so later values may
/// refer to strings and objects of earlier ones.
fn print(buffer: &[u8]) -> Result<()> {
    let mut decoder = Decoder::new(buffer);
    let mut count = 0;
    while decoder.position() < buffer.len() {
        let value = decoder.decode_value().with_context(|| format!("Decoding error in value {}", count))?;
        debug!(value = count, end = decoder.position(), "decoded");
        println!("{}", &value);
        count += 1;
    }
    info!(values = count, bytes = buffer.len(), "done");
    Ok(())
}

fn encode(buffer: &[u8], hex: bool) -> Result<()> {
    let string = from_utf8(buffer).context("input is not utf-8")?;
    let values = parser::parse(string)?;
    let mut encoder = Encoder::new(Vec::new());
    for value in &values {
        encoder.encode_value(value).context("Encoding error")?;
    }
    let bytes = encoder.into_inner();
    info!(values = values.len(), bytes = bytes.len(), "done");
    let mut stdout = io::stdout();
    if hex {
        writeln!(stdout, "{}", to_hex(&bytes))?;
    } else {
        stdout.write_all(&bytes)?;
    }
    stdout.flush().context("Failed to write stdout")
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}

/// Accepts pairs of hex digits, optionally separated by whitespace.
fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>();
    if digits.len() % 2 != 0 {
        return Err(anyhow!("odd number of hex digits"));
    }
    digits.chunks(2).map(|pair| {
        let s = pair.iter().collect::<String>();
        u8::from_str_radix(&s, 16).with_context(|| format!("invalid hex byte `{}`", s))
    }).collect()
}
