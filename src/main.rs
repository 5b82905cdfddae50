use clap::Parser;
use log::LevelFilter;
use luxel::{JpegDecoder, Logger, RgbImage, DEFAULT_QUALITY};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(name = "luxel")]
struct Cli {
    #[arg(required = true)]
    path: String,

    #[arg(short, long, value_parser = ["ppm", "jpg"], default_value = "ppm", help = "Output format")]
    format: String,

    #[arg(short = 'o', long = "output-dir", help = "Output directory for converted files")]
    output_dir: Option<String>,

    #[arg(short, long, default_value_t = DEFAULT_QUALITY, help = "JPEG quality (1-100) when re-encoding")]
    quality: u8,

    #[arg(long, help = "Print frame information instead of converting")]
    info: bool,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

fn get_output_path(file: &Path, output_dir: Option<&str>, format: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_stem = file
        .file_stem()
        .ok_or("Invalid file name")?
        .to_str()
        .ok_or("Invalid file stem")?;

    let output_path = if let Some(dir) = output_dir {
        let output_dir = Path::new(dir);

        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        output_dir.join(format!("{}.{}", file_stem, format))
    } else {
        file.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}.{}", file_stem, format))
    };

    Ok(output_path)
}

fn write_ppm(path: &Path, image: &RgbImage) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    write!(writer, "P6\n{} {}\n255\n", image.ncol(), image.nrow())?;
    writer.write_all(&image.to_interleaved())?;
    writer.flush()?;
    Ok(())
}

fn process_file(file: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("File: {}", file.display());

    let reader = BufReader::new(File::open(file)?);
    let mut decoder = JpegDecoder::new(reader);
    let image = decoder.decode()?;

    if cli.info {
        println!(
            "{}x{}, {}-bit, {} component(s)",
            decoder.width(),
            decoder.height(),
            decoder.precision(),
            decoder.components().len()
        );
        for component in decoder.components() {
            println!(
                "  component {}: sampling {}x{}, quantization table {}",
                component.id,
                component.horizontal_sampling,
                component.vertical_sampling,
                component.quant_table_id
            );
        }
        if decoder.restart_interval() > 0 {
            println!("  restart interval: {} MCUs", decoder.restart_interval());
        }
        return Ok(());
    }

    let output_path = get_output_path(file, cli.output_dir.as_deref(), &cli.format)?;
    println!("Writing to: {}", output_path.display());

    match cli.format.as_str() {
        "jpg" => luxel::save(&image, cli.quality, &output_path)?,
        _ => write_ppm(&output_path, &image)?,
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    Logger::init(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    process_file(Path::new(&cli.path), &cli)
}
