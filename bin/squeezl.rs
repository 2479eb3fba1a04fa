#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::{env, ffi, fs, io};

use squeezl::{huffman, lzw, AllResult, DEFAULT_ALPHABET_SIZE, DEFAULT_CODE_WIDTH};
use tracing_subscriber::EnvFilter;

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        let directives = env::var(EnvFilter::DEFAULT_ENV).ok();
        tracing_subscriber::fmt()
            .with_env_filter(log_filter(directives.as_deref()))
            .with_writer(io::stderr)
            .init();

        let flags = Flags::from_args(env::args_os());
        run_coding(flags)
    })
}

/// The filter given in `RUST_LOG`, or warnings only when it is unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let out: Box<dyn io::Write> = match &flags.output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let out = io::BufWriter::with_capacity(1 << 16, out);

    let result = match (flags.codec, flags.operation) {
        (Codec::Lzw, operation) => {
            let config = lzw::Configuration::new(flags.code_width, flags.alphabet_size)?;
            let input = open(&flags.input)?;
            match operation {
                Operation::Encode => lzw::Encoder::new(config)
                    .into_stream(out)
                    .encode_all(input),
                Operation::Decode => lzw::Decoder::new(config)
                    .into_stream(out)
                    .decode_all(input),
            }
        }
        (Codec::Huffman, Operation::Encode) => {
            let mut encoder = huffman::Encoder::new();
            match &flags.input {
                Input::File(path) => {
                    let file = io::BufReader::with_capacity(1 << 26, fs::File::open(path)?);
                    encoder.into_stream(out).encode_all(file)
                }
                // Two passes need a seekable source, so stdin is buffered completely.
                Input::Stdin => {
                    let mut data = vec![];
                    io::Read::read_to_end(&mut io::stdin().lock(), &mut data)?;
                    encoder.into_stream(out).encode_all(io::Cursor::new(data))
                }
            }
        }
        (Codec::Huffman, Operation::Decode) => {
            let input = open(&flags.input)?;
            huffman::Decoder::new().into_stream(out).decode_all(input)
        }
    };

    let AllResult {
        bytes_read,
        bytes_written,
        status,
    } = result;
    tracing::info!(bytes_read, bytes_written, codec = ?flags.codec, "coding finished");
    status.map_err(io::Error::from)
}

fn open(input: &Input) -> io::Result<Box<dyn io::BufRead>> {
    Ok(match input {
        Input::File(path) => Box::new(io::BufReader::with_capacity(
            1 << 26,
            fs::File::open(path)?,
        )),
        Input::Stdin => Box::new(io::BufReader::with_capacity(1 << 26, io::stdin())),
    })
}

struct Flags {
    input: Input,
    output: Option<PathBuf>,
    operation: Operation,
    codec: Codec,
    code_width: u8,
    alphabet_size: u16,
}

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Encode,
    Decode,
}

#[derive(Clone, Copy, Debug)]
enum Codec {
    Huffman,
    Lzw,
}

fn command() -> clap::Command<'static> {
    clap::Command::new("squeezl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress with Huffman or LZW coding")
        .arg(
            clap::Arg::new("decompress")
                .short('d')
                .long("decompress")
                .takes_value(false)
                .help("Decompress instead of compressing"),
        )
        .arg(
            clap::Arg::new("codec")
                .short('c')
                .long("codec")
                .default_value("lzw")
                .value_parser(["huffman", "lzw"]),
        )
        .arg(
            clap::Arg::new("code_width")
                .short('n')
                .long("nb")
                .takes_value(true)
                .value_parser(clap::value_parser!(u8).range(1..=32))
                .help("Bits per LZW code"),
        )
        .arg(
            clap::Arg::new("alphabet_size")
                .short('s')
                .long("size")
                .takes_value(true)
                .value_parser(clap::value_parser!(u16).range(1..=256))
                .help("Number of single byte LZW seed entries"),
        )
        .arg(
            clap::Arg::new("input")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf())
                .help("File path or '-' for stdin"),
        )
        .arg(
            clap::Arg::new("output")
                .value_parser(clap::builder::ValueParser::path_buf())
                .help("File path, stdout when omitted"),
        )
}

impl Flags {
    fn from_args(args: impl Iterator<Item = ffi::OsString>) -> Self {
        let matches = command().get_matches_from(args);

        let operation = if matches.contains_id("decompress") {
            Operation::Decode
        } else {
            Operation::Encode
        };

        let codec = match matches.get_one::<String>("codec").map(String::as_str) {
            Some("huffman") => Codec::Huffman,
            _ => Codec::Lzw,
        };

        let input = match matches.get_one::<PathBuf>("input") {
            Some(p) if *p != PathBuf::from("-") => Input::File(p.clone()),
            _ => Input::Stdin,
        };

        Flags {
            input,
            output: matches.get_one::<PathBuf>("output").cloned(),
            operation,
            codec,
            code_width: matches
                .get_one::<u8>("code_width")
                .copied()
                .unwrap_or(DEFAULT_CODE_WIDTH),
            alphabet_size: matches
                .get_one::<u16>("alphabet_size")
                .copied()
                .unwrap_or(DEFAULT_ALPHABET_SIZE),
        }
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: impl FnOnce() -> Result<(), io::Error> + std::panic::UnwindSafe) -> Self {
        std::panic::catch_unwind(op)
            .map(|result| match result {
                Ok(()) => CodingResult::Ok,
                Err(err) => CodingResult::Err(err),
            })
            .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::log_filter;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn global_level_from_env() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("trace")).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn scoped_level_from_env() {
        let filter = log_filter(Some("squeezl=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn warn_without_env() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("")).max_level_hint(), Some(LevelFilter::WARN));
    }
}
