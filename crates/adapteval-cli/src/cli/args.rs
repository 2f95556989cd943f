use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "adapteval",
    version,
    about = "Operator tooling for the climate-adaptation answer evaluation platform"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Init(InitArgs),
    Validate(ValidateArgs),
    Stats(StatsArgs),
    Export(ExportArgs),
    Users(UsersArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "adapteval.yaml")]
    pub config: PathBuf,

    /// also write a small demo response tree for local smoke runs
    #[arg(long)]
    pub demo: bool,

    /// generate .gitignore for local artifacts
    #[arg(long)]
    pub gitignore: bool,
}

#[derive(Parser, Clone)]
pub struct ValidateArgs {
    #[arg(long, default_value = "adapteval.yaml")]
    pub config: PathBuf,
}

#[derive(Parser, Clone)]
pub struct StatsArgs {
    #[arg(long, default_value = "adapteval.yaml")]
    pub config: PathBuf,

    /// write the report here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct ExportArgs {
    #[arg(long, default_value = "adapteval.yaml")]
    pub config: PathBuf,

    /// output format: json|csv
    #[arg(long, default_value = "json")]
    pub format: String,

    /// write the dump here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct UsersArgs {
    #[arg(long, default_value = "adapteval.yaml")]
    pub config: PathBuf,
}
