//! Decode raw stream data through a chain of PDF filters
//!
//! Reads INPUT (the bytes between `stream` and `endstream`), decodes it with
//! the given filters in order and writes the result to OUTPUT or stdout.
//!
//! Usage:
//!   cargo run --bin decode_stream -- --filter FlateDecode data.bin out.bin
//!   cargo run --bin decode_stream -- --filter LZW --param Predictor=12 --param Columns=5 data.bin
//!   cargo run --bin decode_stream -- --filter A85 --filter DCT --keep-image data.bin photo.jpg
//!
//! `--param KEY=INT` applies to the most recent `--filter`. With
//! `--keep-image`, a final image-codec filter is left encoded and described
//! on stderr. `--strict` rejects unknown filter names. Set `RUST_LOG=debug`
//! for stage logging.

use pdf_streams::config::StreamOptions;
use pdf_streams::object::{Dictionary, Object};
use pdf_streams::xref::CrossRefTable;
use pdf_streams::{FilterParams, PdfDocument};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

struct DecodeConfig {
    filters: Vec<(String, Dictionary)>,
    input: PathBuf,
    output: Option<PathBuf>,
    keep_image: bool,
    strict: bool,
}

impl DecodeConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut filters: Vec<(String, Dictionary)> = Vec::new();
        let mut paths = Vec::new();
        let mut keep_image = false;
        let mut strict = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--filter" | "-f" => {
                    i += 1;
                    let name = args.get(i).ok_or("--filter needs a name")?;
                    filters.push((name.clone(), Dictionary::new()));
                },
                "--param" | "-p" => {
                    i += 1;
                    let spec = args.get(i).ok_or("--param needs KEY=INT")?;
                    let (key, value) = spec
                        .split_once('=')
                        .ok_or_else(|| format!("bad parameter '{}', expected KEY=INT", spec))?;
                    let value: i64 = value
                        .parse()
                        .map_err(|_| format!("bad parameter value '{}'", value))?;
                    let (_, params) = filters
                        .last_mut()
                        .ok_or("--param must follow a --filter")?;
                    params.insert(key.to_string(), Object::Integer(value));
                },
                "--keep-image" => keep_image = true,
                "--strict" => strict = true,
                "--help" | "-h" => return Err(String::new()),
                other => paths.push(PathBuf::from(other)),
            }
            i += 1;
        }

        let mut paths = paths.into_iter();
        let input = paths.next().ok_or("missing INPUT")?;
        let output = paths.next();
        if paths.next().is_some() {
            return Err("too many arguments".to_string());
        }

        Ok(Self {
            filters,
            input,
            output,
            keep_image,
            strict,
        })
    }

    /// The stream dictionary these filters would appear in.
    fn stream_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        let names = self
            .filters
            .iter()
            .map(|(name, _)| Object::name(name.as_str()))
            .collect();
        let params = self
            .filters
            .iter()
            .map(|(_, p)| {
                if p.is_empty() {
                    Object::Null
                } else {
                    Object::Dictionary(p.clone())
                }
            })
            .collect();
        dict.insert("Filter".to_string(), Object::Array(names));
        dict.insert("DecodeParms".to_string(), Object::Array(params));
        dict
    }
}

fn usage() {
    eprintln!("Usage: decode_stream [--strict] [--keep-image] (--filter NAME [--param KEY=INT]...)... INPUT [OUTPUT]");
}

fn run(config: &DecodeConfig) -> pdf_streams::Result<()> {
    let file = File::open(&config.input)?;
    let length = file.metadata()?.len();
    let source: Rc<RefCell<dyn Read>> = Rc::new(RefCell::new(file));

    let options = if config.strict {
        StreamOptions::strict()
    } else {
        StreamOptions::lenient()
    };
    let doc = PdfDocument::new(Cursor::new(Vec::new()), CrossRefTable::new()).with_options(options);

    let dict = config.stream_dict();
    let mut terminal = FilterParams::Raw;
    let slot = if config.keep_image { Some(&mut terminal) } else { None };
    let mut stream = doc.open_inline_stream(&dict, length, source, slot)?;

    let mut decoded = Vec::new();
    stream.read_to_end(&mut decoded).map_err(pdf_streams::Error::from_io)?;
    log::info!("decoded {} bytes from {} input bytes", decoded.len(), length);

    if config.keep_image && terminal != FilterParams::Raw {
        eprintln!("left encoded: {:?}", terminal);
    }

    match &config.output {
        Some(path) => File::create(path)?.write_all(&decoded)?,
        None => io::stdout().lock().write_all(&decoded)?,
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let config = match DecodeConfig::from_args() {
        Ok(config) => config,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("Error: {}", msg);
            }
            usage();
            process::exit(2);
        },
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
