use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_INPUT_DIR: &str = "pdf_files";
pub const DEFAULT_WORK_ROOT: &str = "extracted_data";
pub const DEFAULT_OUTPUT_DIR: &str = "mcq_engine_data";

#[derive(Parser, Debug)]
#[command(
    name = "mcqbank",
    version,
    about = "Extract multiple-choice questions from PDF/HTML study material into quiz datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List and hash the source documents that `extract` would read.
    Inventory(InventoryArgs),
    /// Decode every source document into a line-oriented text dump.
    Extract(ExtractArgs),
    /// Segment and normalize the text dump into chapter datasets.
    Convert(ConvertArgs),
    /// Report which pipeline artifacts exist and what they contain.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_WORK_ROOT)]
    pub work_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_WORK_ROOT)]
    pub work_root: PathBuf,

    #[arg(long)]
    pub raw_text_path: Option<PathBuf>,

    #[arg(long)]
    pub max_pages_per_doc: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(long, default_value = DEFAULT_WORK_ROOT)]
    pub work_root: PathBuf,

    #[arg(long)]
    pub raw_text_path: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_WORK_ROOT)]
    pub work_root: PathBuf,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

pub fn raw_text_path_for(work_root: &Path, explicit: Option<&PathBuf>) -> PathBuf {
    explicit
        .cloned()
        .unwrap_or_else(|| work_root.join("raw_text.json"))
}

pub fn manifest_dir_for(work_root: &Path) -> PathBuf {
    work_root.join("manifests")
}
