pub(crate) mod mesh;

use std::{fs, io, path::Path};

use anyhow::Result;
use log::{debug, warn};
use mesh::obj;
use structopt::StructOpt;
use walkdir::WalkDir;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "mesh_asset")]
struct CliArgs {
    /// Specify the input file or folder
    input: String,
    /// Output directory, to place the converted meshes in
    #[structopt(short = "o", long = "output")]
    output: String,
    /// Output debug info
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

/// Happens during setup
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Input path does not exist: {0}")]
    InputNonExistant(String),
    #[error("Output folder structure could not be created: {0}")]
    ErrorCreatingOutputStructure(#[from] io::Error),
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    convert(args)
}

fn convert(args: CliArgs) -> Result<()> {
    let output_path = Path::new(&args.output);

    let input_path = Path::new(&args.input);
    if !input_path.exists() {
        return Err(CliError::InputNonExistant(args.input.clone()).into());
    }

    // a single input file converts straight into the output folder
    if input_path.is_file() {
        fs::create_dir_all(output_path).map_err(CliError::ErrorCreatingOutputStructure)?;
        return dispatch(input_path, output_path);
    }

    for entry in WalkDir::new(input_path) {
        let path = match &entry {
            Err(err) => {
                warn!("Error walking input tree: {}", err);
                continue;
            }
            Ok(entry) => entry.path(),
        };

        if path.is_dir() {
            continue;
        }

        let output = output_path.join(
            path.strip_prefix(input_path)
                .expect("walked paths start with the input path"),
        );

        // mirror the input folder structure on the output side
        let local_output_folder = output.parent().unwrap_or(output_path);
        if !local_output_folder.exists() {
            fs::create_dir_all(&local_output_folder)
                .map_err(CliError::ErrorCreatingOutputStructure)?;
        }

        dispatch(path, local_output_folder)?;
    }

    Ok(())
}

fn dispatch(path: &Path, output_dir: &Path) -> Result<()> {
    match path.extension().and_then(|x| x.to_str()) {
        Some(extension) => match extension.to_ascii_lowercase().as_ref() {
            "obj" => obj::process(path, output_dir)?,
            // meta files are picked up next to the mesh they describe
            "toml" => debug!("Ignored meta file: {}", path.display()),
            _ => warn!("Could not handle path: {}", path.display()),
        },
        None => warn!(
            "Ignored file \"{}\", because no file extension was found.",
            path.display()
        ),
    }

    Ok(())
}
