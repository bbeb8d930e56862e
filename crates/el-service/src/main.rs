//! Main entry point for the `el-resolve` tool.
//!
//! Locates the ExpressionFactory provider the discovery chain would select,
//! optionally instantiates it, and lists the providers compiled into the
//! binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::parse_key_value;

/// Command-line arguments for the resolver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Process property override (key=value), repeatable
	#[arg(short = 'D', long = "define", value_parser = parse_key_value)]
	defines: Vec<(String, String)>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the provider the discovery chain selects
	Locate {
		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},
	/// Resolve and instantiate the provider
	Instantiate {
		/// Configuration property passed to the provider (key=value), repeatable
		#[arg(short, long = "property", value_parser = parse_key_value)]
		properties: Vec<(String, String)>,

		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},
	/// List the built-in providers
	Providers {
		/// Emit JSON instead of text
		#[arg(long)]
		json: bool,
	},
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let mut config = commands::load_config(args.config.as_deref())?;
	if let Some(path) = &args.config {
		tracing::info!(path = %path.display(), "Loaded configuration");
	}
	commands::apply_defines(&mut config, &args.defines);

	match args.command {
		Command::Locate { json } => {
			let report = commands::locate(config)?;
			if json {
				println!("{}", serde_json::to_string_pretty(&report)?);
			} else {
				println!("{} (from {})", report.provider, report.source);
			}
		},
		Command::Instantiate { properties, json } => {
			let report = commands::instantiate(config, &properties)?;
			tracing::info!(
				provider = %report.provider,
				source = report.source,
				configured = report.configured,
				"Instantiated provider"
			);
			if json {
				println!("{}", serde_json::to_string_pretty(&report)?);
			} else {
				println!(
					"{} (from {}, configured: {})",
					report.provider, report.source, report.configured
				);
			}
		},
		Command::Providers { json } => {
			let entries = commands::providers();
			if json {
				println!("{}", serde_json::to_string_pretty(&entries)?);
			} else {
				for entry in entries {
					let marker = if entry.default { " [default]" } else { "" };
					println!(
						"{}{} (configuration: {})",
						entry.name, marker, entry.accepts_configuration
					);
				}
			}
		},
	}

	Ok(())
}
