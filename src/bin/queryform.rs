// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use queryform_rust::core::config::{CompilerConfig, FlatConfig, PropertySource};
use queryform_rust::core::config::compiler_config::{
    KEY_PARALLEL_EDGES, KEY_REQUIRE_CONNECTED, KEY_VALIDATE_OPERATORS,
};
use queryform_rust::core::validation::JoinGraph;
use queryform_rust::form_compiler::{compile_query_application, decompose};
use queryform_rust::query_api::definition::{CanonicalQuerySpec, JoinEdge};
use queryform_rust::{QueryFormError, QueryFormResult};

#[derive(Parser, Debug)]
#[command(name = "queryform", version, about = "Compile and check multi-source query forms")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a raw query form into the canonical spec
    Compile {
        /// Form JSON file, stdin when omitted
        file: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
        /// Parallel join policy: reject or merge
        #[arg(long)]
        parallel_edges: Option<String>,
        /// Accept joins that do not form one tree over every data set
        #[arg(long)]
        allow_disconnected: bool,
        /// Skip type/operator checks
        #[arg(long)]
        no_operator_check: bool,
    },
    /// Check that a JSON array of join conditions is acyclic
    CheckJoins {
        file: Option<PathBuf>,
        #[arg(long)]
        parallel_edges: Option<String>,
    },
    /// Rebuild the raw form of a canonical spec
    Decompose {
        file: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> QueryFormResult<ExitCode> {
    match cli.command {
        Command::Compile {
            file,
            pretty,
            parallel_edges,
            allow_disconnected,
            no_operator_check,
        } => {
            let mut overrides = FlatConfig::new();
            if let Some(policy) = parallel_edges {
                overrides.set(KEY_PARALLEL_EDGES, policy, PropertySource::CommandLine);
            }
            if allow_disconnected {
                overrides.set(KEY_REQUIRE_CONNECTED, "false", PropertySource::CommandLine);
            }
            if no_operator_check {
                overrides.set(KEY_VALIDATE_OPERATORS, "false", PropertySource::CommandLine);
            }
            let config = CompilerConfig::load(cli.config.as_deref(), &overrides)?;

            let input = read_input(file.as_deref())?;
            let compiled = compile_query_application(&input, &config)?;
            let output = if pretty {
                compiled.spec.to_json_pretty()?
            } else {
                compiled.spec.to_json()?
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckJoins {
            file,
            parallel_edges,
        } => {
            let mut overrides = FlatConfig::new();
            if let Some(policy) = parallel_edges {
                overrides.set(KEY_PARALLEL_EDGES, policy, PropertySource::CommandLine);
            }
            let config = CompilerConfig::load(cli.config.as_deref(), &overrides)?;
            let edges: Vec<JoinEdge> = serde_json::from_str(&read_input(file.as_deref())?)?;
            let graph = JoinGraph::build(&edges, config.parallel_edges);
            match graph.join_order() {
                Some(order) => {
                    println!("acyclic");
                    for idx in order {
                        let edge = &edges[idx];
                        println!(
                            "{}: {}.{} = {}.{}",
                            idx, edge.pos1, edge.field1, edge.pos2, edge.field2
                        );
                    }
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("cyclic");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Decompose { file, pretty } => {
            let spec = CanonicalQuerySpec::from_json(&read_input(file.as_deref())?)?;
            let form = decompose(&spec);
            let output = if pretty {
                serde_json::to_string_pretty(&form)?
            } else {
                serde_json::to_string(&form)?
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(path: Option<&Path>) -> QueryFormResult<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            QueryFormError::invalid_parameter_with_details(
                format!("cannot read {}: {}", path.display(), e),
                "file",
                "a readable JSON file",
            )
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
