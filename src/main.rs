// Command-line front end for the `grayscale_vision` library.
//
// Given a file name it converts that one image; without one it shows a menu of the
// bundled example images, lets the user pick one (or name their own), and keeps
// going until the user is done. Display windows are replaced by `--previews`, which
// writes the footprint-fitted previews to disk instead.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use grayscale_vision::{
    io, ConversionData, DecodedImage, ParallelPipeline, PipelineConfig, Report, MAX_HEIGHT,
    MAX_WIDTH,
};
use log::{info, LevelFilter};
use std::io::{self as stdio, BufRead, StdinLock, Write};
use std::path::{Path, PathBuf};

/// Example images expected in the originals folder.
static EXAMPLE_IMAGES: [&str; 3] = [
    "japanese-landscape.jpg",
    "ghost-of-tsushima-torii-gate.jpg",
    "rick-and-morty.jpg",
];

/// Convert colour images to grayscale with the luminosity method
#[derive(Parser, Debug)]
#[command(name = "grayscale_vision", version, about, long_about = None)]
struct Args {
    /// Image file name inside the originals folder; omit to pick from a menu
    image: Option<String>,

    /// Folder holding the source images
    #[arg(long, default_value = "originals")]
    originals: PathBuf,

    /// Folder the grayscale images are written to
    #[arg(long, default_value = "grayscales")]
    grayscales: PathBuf,

    /// Overwrite existing grayscale images without asking
    #[arg(short, long)]
    yes: bool,

    /// Write previews fitted to the display footprint into this folder
    #[arg(long)]
    previews: Option<PathBuf>,

    /// Width of the display footprint
    #[arg(long, default_value_t = MAX_WIDTH)]
    max_width: u32,

    /// Height of the display footprint
    #[arg(long, default_value_t = MAX_HEIGHT)]
    max_height: u32,

    /// Conversion workers (default: number of CPUs)
    #[arg(long)]
    workers: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

enum Outcome {
    Converted,
    AlreadyGrayscale,
}

/// Line-oriented prompts on stdin/stdout.
struct Console {
    input: StdinLock<'static>,
}

impl Console {
    fn new() -> Self {
        Self {
            input: stdio::stdin().lock(),
        }
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        print!("{message}");
        stdio::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("standard input closed");
        }
        Ok(line.trim().to_string())
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(self.prompt(message)?.eq_ignore_ascii_case("y"))
    }

    /// Asks for a 1-based option number until a valid one is given; returns it 0-based.
    fn choose(&mut self, options: usize) -> Result<usize> {
        loop {
            match self.prompt("Enter the number of your choice: ")?.parse::<usize>() {
                Ok(choice) if (1..=options).contains(&choice) => return Ok(choice - 1),
                Ok(_) => println!("Invalid choice. Please enter a number between 1 and {options}."),
                Err(_) => println!("Invalid input. Please enter a valid number."),
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Shows the menu and returns the chosen file name and whether the user typed it.
fn choose_image(console: &mut Console) -> Result<(String, bool)> {
    println!(
        "You can convert an example image to its grayscale version or convert one of your own!\n\
         To use your own image, first put it (jpg, jpeg or png) inside the originals folder.\n"
    );
    println!("Choose an example image to convert to grayscale or convert your own:");
    for (i, name) in EXAMPLE_IMAGES.iter().enumerate() {
        println!("{}. {name}", i + 1);
    }
    println!("{}. Use your own image", EXAMPLE_IMAGES.len() + 1);

    let choice = console.choose(EXAMPLE_IMAGES.len() + 1)?;
    match EXAMPLE_IMAGES.get(choice) {
        Some(name) => Ok((name.to_string(), false)),
        None => {
            let name = console.prompt(
                "Write the file name of your image in the originals folder (including the extension): ",
            )?;
            Ok((name, true))
        }
    }
}

fn preview_path(dir: &Path, file_name: &str, label: &str) -> PathBuf {
    let source = Path::new(file_name);
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy())
        .unwrap_or_else(|| "png".into());
    dir.join(format!("{stem}-{label}-preview.{ext}"))
}

fn write_previews(
    pipeline: &ParallelPipeline,
    data: &ConversionData,
    dir: &Path,
    file_name: &str,
) -> Result<()> {
    let original = DecodedImage::from(pipeline.preview(&data.original).into_owned());
    let original_path = preview_path(dir, file_name, "original");
    io::save_decoded(&original, &original_path)?;

    let grayscale = pipeline.preview(&data.grayscale);
    let grayscale_path = preview_path(dir, file_name, "grayscale");
    io::save_grayscale(&grayscale, &grayscale_path)?;

    println!(
        "Previews written to {} and {}",
        original_path.display(),
        grayscale_path.display()
    );
    Ok(())
}

async fn convert_one(
    args: &Args,
    pipeline: &ParallelPipeline,
    console: &mut Console,
    file_name: &str,
    user_supplied: bool,
) -> Result<Outcome> {
    let source = args.originals.join(file_name);
    if user_supplied {
        io::validate_extension(&source)?;
    }

    let decoded = io::load_image(&source)?;
    let data = match pipeline.generate_report(decoded).await? {
        Report::AlreadyGrayscale(_) => {
            println!("The image {file_name} is already grayscaled. Process will be skipped.");
            return Ok(Outcome::AlreadyGrayscale);
        }
        Report::Converted(data) => data,
    };

    let output = io::grayscale_output_path(&args.grayscales, file_name);
    let keep_existing = output.exists()
        && !args.yes
        && !console.confirm(&format!(
            "The file {} already exists. Do you want to overwrite it? (y/n): ",
            output.display()
        ))?;
    if keep_existing {
        println!("Skipping the save operation.");
    } else {
        io::save_grayscale(&data.grayscale, &output)
            .with_context(|| format!("saving grayscale version of {file_name}"))?;
        println!("Grayscale image saved to {}", output.display());
    }

    if let Some(dir) = &args.previews {
        write_previews(pipeline, &data, dir, file_name)?;
    }
    Ok(Outcome::Converted)
}

async fn interactive(args: &Args, pipeline: &ParallelPipeline, console: &mut Console) -> Result<()> {
    loop {
        let (file_name, user_supplied) = choose_image(console)?;
        match convert_one(args, pipeline, console, &file_name, user_supplied).await {
            Ok(Outcome::Converted) => {}
            Ok(Outcome::AlreadyGrayscale) => continue,
            Err(err) => {
                println!("{err:#}");
                continue;
            }
        }
        if !console.confirm("Do you want to convert another image? (y/n): ")? {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = PipelineConfig {
        max_width: args.max_width,
        max_height: args.max_height,
        ..PipelineConfig::default()
    };
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    info!("starting with {config:?}");

    let pipeline = ParallelPipeline::new(config);
    let mut console = Console::new();

    let result = match &args.image {
        Some(file_name) => convert_one(&args, &pipeline, &mut console, file_name, true)
            .await
            .map(|_| ()),
        None => interactive(&args, &pipeline, &mut console).await,
    };

    pipeline.shutdown().await;
    result
}
