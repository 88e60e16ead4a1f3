use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use level_exporter::convert::{convert, convert_dense, convert_structure};
use level_exporter::{
    BlockDictionary, BlockLayout, ConvertError, ConvertOptions, FlatAddressing, LevelData,
    Result,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "level-exporter",
    about = "Convert voxel documents into sectioned level data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Log per-section progress
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    /// Disable colored console output
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a dense [[[id]]] array
    Dense {
        /// Input .json file
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert a paletted structure document
    Structure {
        /// Input .json file
        input: PathBuf,
        /// Block dictionary (.json) mapping names to ids
        #[arg(long, short)]
        dictionary: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Detect the input format and convert it
    Convert {
        /// Input .json file
        input: PathBuf,
        /// Block dictionary, required for structure input
        #[arg(long, short)]
        dictionary: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (default: <input>.level.json)
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Settings file with ConvertOptions fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
    #[arg(long, value_enum)]
    addressing: Option<AddressingArg>,
    #[arg(long, allow_hyphen_values = true)]
    padding_id: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    out_of_range_id: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    default_id: Option<i32>,
    /// Pretty-print the output JSON
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Flat,
    Nested,
}

#[derive(Clone, Copy, ValueEnum)]
enum AddressingArg {
    Windowed,
    Spatial,
}

impl OutputArgs {
    fn options(&self) -> Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_json(&std::fs::read_to_string(path)?)?,
            None => ConvertOptions::default(),
        };
        if let Some(layout) = self.layout {
            options.layout = match layout {
                LayoutArg::Flat => BlockLayout::Flat,
                LayoutArg::Nested => BlockLayout::Nested,
            };
        }
        if let Some(addressing) = self.addressing {
            options.addressing = match addressing {
                AddressingArg::Windowed => FlatAddressing::Windowed,
                AddressingArg::Spatial => FlatAddressing::Spatial,
            };
        }
        if let Some(id) = self.padding_id {
            options.padding_id = id;
        }
        if let Some(id) = self.out_of_range_id {
            options.out_of_range_id = id;
        }
        if let Some(id) = self.default_id {
            options.default_id = id;
        }
        Ok(options)
    }
}

fn check_json_path(path: &Path, what: &str) -> Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        Ok(())
    } else {
        Err(ConvertError::Argument(format!("{} must be a json file", what)))
    }
}

/// `region.json` becomes `region.level.json`.
fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("level.json")
}

fn read_dictionary(path: &Path) -> Result<BlockDictionary> {
    check_json_path(path, "block dictionary")?;
    BlockDictionary::from_slice(&std::fs::read(path)?)
}

/// Write through a sibling `.tmp` file so a failed write never leaves a
/// truncated output behind.
fn write_staged(path: &Path, contents: &str) -> Result<()> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    let result = std::fs::write(&staging, contents).and_then(|()| std::fs::rename(&staging, path));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

fn write_level(
    level: &LevelData,
    output: &OutputArgs,
    options: &ConvertOptions,
    input: &Path,
) -> Result<()> {
    let json = if output.pretty {
        level.to_json_pretty(options.layout)?
    } else {
        level.to_json(options.layout)?
    };
    let path = output
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    write_staged(&path, &json)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let (input, output) = match &cli.command {
        Command::Dense { input, output }
        | Command::Structure { input, output, .. }
        | Command::Convert { input, output, .. } => (input, output),
    };
    check_json_path(input, "input file")?;
    let options = output.options()?;
    let data = std::fs::read(input)?;

    let level = match &cli.command {
        Command::Dense { .. } => convert_dense(&data, &options)?,
        Command::Structure { dictionary, .. } => {
            convert_structure(&data, &read_dictionary(dictionary)?, &options)?
        }
        Command::Convert { dictionary, .. } => {
            let dictionary = dictionary.as_deref().map(read_dictionary).transpose()?;
            convert(&data, dictionary.as_ref(), &options)?
        }
    };

    write_level(&level, output, &options, input)?;
    info!("Successfully converted input file to level data");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    console::set_colors_enabled(!cli.no_color);
    console::set_colors_enabled_stderr(!cli.no_color);

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(!cli.no_color)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style(format!("ERROR: {}", e)).red().bright());
            ExitCode::FAILURE
        }
    }
}
