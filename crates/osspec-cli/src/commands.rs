//! Subcommand implementations.

use anyhow::{Context, Result};
use osspec_core::compiler::{build, compile, BuildOptions, CompileOptions};
use osspec_core::loader::CancelToken;
use osspec_core::spec::{CodegenRequest, KIND_CODEGEN_REQUEST, SCHEMA_VERSION};

use crate::args::{BuildArgs, Cli, CodegenArgs, Command, ValidateArgs};
use crate::exit_codes;
use crate::plugin::{write_generated_files, PluginRunner};

pub fn dispatch(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::Validate(args) => run_validate(args),
        Command::Build(args) => run_build(args),
        Command::Codegen(args) => run_codegen(args),
    }
}

fn run_validate(args: ValidateArgs) -> Result<i32> {
    let opts = CompileOptions::new(&args.repo);
    match compile(&opts, &CancelToken::new()) {
        Ok(_) => {
            println!("ok");
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(exit_codes::FAILURE)
        }
    }
}

fn run_build(args: BuildArgs) -> Result<i32> {
    let opts = BuildOptions {
        compile: CompileOptions::new(&args.repo),
        dist_dir: args.out,
    };
    match build(&opts, &CancelToken::new()) {
        Ok(_) => {
            println!("built");
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(exit_codes::FAILURE)
        }
    }
}

fn run_codegen(args: CodegenArgs) -> Result<i32> {
    let repo_root = args
        .repo
        .canonicalize()
        .with_context(|| format!("resolving repo root {}", args.repo.display()))?;

    let opts = CompileOptions::new(&repo_root);
    let result = match compile(&opts, &CancelToken::new()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{e}");
            return Ok(exit_codes::FAILURE);
        }
    };

    let request = CodegenRequest {
        schema_version: SCHEMA_VERSION,
        kind: KIND_CODEGEN_REQUEST.to_string(),
        language: args.lang.clone(),
        descriptor: result.descriptor,
    };

    let runner = PluginRunner {
        repo_root: repo_root.clone(),
    };
    let response = match runner.run(&args.lang, &request) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("{e:#}");
            return Ok(exit_codes::FAILURE);
        }
    };

    let out_dir = if args.out.is_absolute() {
        args.out.clone()
    } else {
        repo_root.join(&args.out)
    };
    if let Err(e) = write_generated_files(&out_dir, &response.files) {
        eprintln!("{e:#}");
        return Ok(exit_codes::FAILURE);
    }
    println!("generated {} files", response.files.len());
    Ok(exit_codes::SUCCESS)
}
