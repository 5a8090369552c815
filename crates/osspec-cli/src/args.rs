use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "osspec",
    version,
    about = "Compile and validate Open SSPM JSON spec repositories"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile the repository and report problems without writing output
    Validate(ValidateArgs),
    /// Compile the repository and write the dist tree
    Build(BuildArgs),
    /// Compile the repository and run a codegen plugin over the descriptor
    Codegen(CodegenArgs),
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Repository root
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Repository root
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Dist output directory, relative to the repository root
    #[arg(long, default_value = "dist")]
    pub out: String,
}

#[derive(clap::Args, Debug)]
pub struct CodegenArgs {
    /// Repository root
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Language plugin to run (resolves `osspec-gen-<lang>`)
    #[arg(long)]
    pub lang: String,

    /// Output directory for generated files
    #[arg(long)]
    pub out: PathBuf,
}
