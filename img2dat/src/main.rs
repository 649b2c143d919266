use std::path::Path;
use std::process::ExitCode;

use argh::FromArgs;

use img2dat::{encode_file, EncodeError, ASSET_SUFFIX};

#[derive(FromArgs)]
/// Convert an image into a raw RGB565 asset file.
struct Args {
    /// input image path
    #[argh(positional)]
    input: String,

    /// output path; defaults to the input path with ".dat" appended
    #[argh(option, short = 'o')]
    output: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let output = args
        .output
        .unwrap_or_else(|| format!("{}{}", args.input, ASSET_SUFFIX));

    match convert(&args.input, &output) {
        Ok(written) => {
            log::info!("wrote {written} bytes to {output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn convert(input: &str, output: &str) -> Result<usize, EncodeError> {
    let bytes = encode_file(Path::new(input))?;

    // staged write: the final name only ever holds a complete asset
    let staging = format!("{output}.tmp");
    std::fs::write(&staging, &bytes)?;
    std::fs::rename(&staging, output)?;
    Ok(bytes.len())
}
