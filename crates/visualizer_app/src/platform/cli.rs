use std::path::PathBuf;

use clap::{Parser, Subcommand};
use visualizer_core::wizard::{Category, DoorType, FrameColor, MeshChoice, MeshColor};
use visualizer_core::JobId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit and track security screen visualizations")]
pub struct Args {
    /// RON configuration file; missing means defaults
    #[arg(long, default_value = "visualizer.ron")]
    pub config: PathBuf,

    /// Backend root URL, overrides the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Poll interval in milliseconds, overrides the config file
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Order by screen category, then track the job
    Submit {
        /// Screen categories, e.g. `window,door`
        #[arg(long = "categories", required = true, value_delimiter = ',')]
        categories: Vec<Category>,

        #[command(flatten)]
        options: ScreenOptions,
    },

    /// Order by answering the scope questions, then track the job
    SubmitScoped {
        #[arg(long)]
        patio: bool,

        #[arg(long)]
        windows: bool,

        #[arg(long)]
        doors: bool,

        /// Only used together with --doors
        #[arg(long)]
        door_type: Option<DoorType>,

        #[command(flatten)]
        options: ScreenOptions,
    },

    /// Follow an existing job until it finishes
    Track { job_id: JobId },

    /// Re-run a finished job and follow it
    Regenerate { job_id: JobId },

    /// List jobs submitted or tracked from this machine
    History,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScreenOptions {
    /// Photo of the house
    #[arg(long)]
    pub image: PathBuf,

    /// 10x10, 12x12 or 12x12_american
    #[arg(long, default_value = "12x12")]
    pub mesh: MeshChoice,

    #[arg(long, default_value = "Black")]
    pub frame_color: FrameColor,

    #[arg(long, default_value = "Black")]
    pub mesh_color: MeshColor,

    /// Exit after submission instead of tracking
    #[arg(long)]
    pub no_track: bool,
}
