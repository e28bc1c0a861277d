use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use either::Either;
use tracing::{debug, info};

use csslathe::logging::{level_for_verbosity, tracing_init};
use csslathe::{parse, OutputFormat, Settings};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Default,
    Compact,
    Pretty,
}

impl Format {
    fn output_format(self) -> OutputFormat {
        return match self {
            Format::Default => OutputFormat::default(),
            Format::Compact => OutputFormat::compact(),
            Format::Pretty => OutputFormat::pretty(),
        };
    }
}

#[derive(Parser, Debug)]
#[command(name = "csslathe")]
#[command(about = "Parse a stylesheet and render it back out")]
struct Options {
    /// Fail on the first syntax error instead of recovering.
    #[arg(long)]
    strict: bool,

    /// Split shorthand declarations into their longhands.
    #[arg(long)]
    expand: bool,

    /// Combine longhand declarations into shorthands.
    #[arg(long)]
    shorthand: bool,

    #[arg(long, value_enum, default_value_t = Format::Default)]
    format: Format,

    /// More output on stderr, repeatable.
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,

    /// Stylesheet to read, stdin when absent or `-`.
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let options = Options::parse();
    tracing_init(level_for_verbosity(options.verbose))?;

    let mut input: Either<File, io::Stdin> = match options.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => Either::Left(
            File::open(path).with_context(|| format!("could not open {}", path.display()))?,
        ),
        _ => Either::Right(io::stdin()),
    };
    let mut text = String::new();
    input.read_to_string(&mut text).context("could not read input")?;
    debug!(bytes = text.len(), "read input");

    let settings = Settings::create().with_lenient_parsing(!options.strict);
    let mut document = parse(&text, settings)?;
    if options.expand {
        document.expand_shorthands();
    }
    if options.shorthand {
        document.create_shorthands();
    }
    let rendered = document.render_with(&options.format.output_format())?;
    info!(bytes = rendered.len(), "rendered");

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    return Ok(());
}
