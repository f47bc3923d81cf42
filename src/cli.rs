use clap::{Parser, Subcommand};
use placesync::config::Config;
use placesync::error::Result;
use placesync::import_export::{FileSink, HtmlFileSource, TimestampFormat};
use placesync::{browser, sync, Synchronizer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Show the program version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Optional custom configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the bookmark tree of a Firefox profile (default)
    Export {
        /// Firefox profile directory
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Output file (.html or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Identifier of the folder to export from
        #[arg(long)]
        root: Option<i64>,

        /// How timestamps are written
        #[arg(long, value_enum)]
        timestamps: Option<TimestampFormat>,
    },

    /// List detected Firefox profiles
    Profiles,

    /// Re-write a Netscape bookmark file as HTML or JSON
    Convert {
        /// Netscape bookmark file to read
        input: PathBuf,

        /// Output file (.html or .json)
        output: PathBuf,

        /// How timestamps are written
        #[arg(long, value_enum, default_value = "raw")]
        timestamps: TimestampFormat,
    },
}

pub fn handle_args(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        None => export(config),
        Some(Commands::Export {
            profile,
            output,
            root,
            timestamps,
        }) => {
            if let Some(profile) = profile {
                config.profile_path = Some(profile);
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(root) = root {
                config.root_id = root;
            }
            if let Some(timestamps) = timestamps {
                config.timestamps = timestamps;
            }
            export(config)
        }
        Some(Commands::Profiles) => {
            let profiles = browser::detect_firefox_profiles();
            if profiles.is_empty() {
                println!("No Firefox profiles found");
            }
            let default = browser::pick_default_profile(&profiles).map(|p| p.path.clone());
            for profile in &profiles {
                let marker = if Some(&profile.path) == default.as_ref() {
                    "*"
                } else {
                    " "
                };
                println!("{} {}  {}", marker, profile.name, profile.path.display());
            }
            Ok(())
        }
        Some(Commands::Convert {
            input,
            output,
            timestamps,
        }) => {
            let sink = FileSink::for_path(&output, timestamps)?;
            let summary = sync::transfer(&HtmlFileSource::new(&input), &sink)?;
            println!(
                "Converted {} folders and {} bookmarks to {}",
                summary.folders,
                summary.bookmarks,
                output.display()
            );
            Ok(())
        }
    }
}

fn export(config: Config) -> Result<()> {
    let output = config.output_path.clone();
    let summary = Synchronizer::new(config).run()?;
    println!(
        "Exported {} folders and {} bookmarks to {}",
        summary.folders,
        summary.bookmarks,
        output.display()
    );
    Ok(())
}
