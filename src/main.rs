use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info, warn};

use gidkit::config::{self, Config, ConfigLoadStatus, LoadedConfig};
use gidkit::interface_doc::{self, group_thousands};
use gidkit::logging;
use gidkit::report::{self, Format};
use gidkit::{Draft, GidError, ModeResolver, Template, TemplateRegistry, Validator};

#[derive(Parser, Debug)]
#[command(
    name = "gidkit",
    version,
    about = "Validate Game Idea Document drafts and map Unity C# interfaces"
)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Debug-level logging and skipped-rule details"
    )]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a draft for missing sections and cross-section contradictions
    Validate(DraftArgs),
    /// Resolve the workflow mode of a draft
    Mode(DraftArgs),
    /// List registered templates
    Templates,
    /// Print a template's prompt text or section schema
    Show {
        id: String,
        #[arg(long, help = "Print the section schema instead of the prompt")]
        schema: bool,
    },
    /// Write a template's prompt text to a file
    Init {
        id: String,
        #[arg(short, long, help = "Destination file (default: <id>.md)")]
        output: Option<String>,
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
    /// Generate Markdown interface maps for a folder of C# scripts
    Map {
        input_dir: String,
        output_dir: Option<String>,
    },
}

#[derive(Args, Debug)]
struct DraftArgs {
    /// Markdown or JSON draft
    draft: String,
    #[arg(short, long, help = "Template id (default from config)")]
    template: Option<String>,
    #[arg(long, help = "Output machine-readable JSON")]
    json: bool,
}

impl DraftArgs {
    fn format(&self) -> Format {
        if self.json { Format::Json } else { Format::Text }
    }
}

fn main() -> ExitCode {
    let start_time = Instant::now();
    let cli = Cli::parse();

    // The log level comes from config, so config is read first and its
    // outcome logged once the subscriber exists.
    let loaded_config = config::load_config();

    let logging_context = match logging::init(&loaded_config.config.logging.level, cli.verbose) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };
    if let Some(ctx) = &logging_context {
        logging::cleanup_old_logs(&ctx.log_directory);
    }
    log_config(&loaded_config);

    let code = match run(cli.command, cli.verbose, &loaded_config.config) {
        Ok(code) => code,
        Err(e) => {
            let gid_error = e.downcast_ref::<GidError>();
            if gid_error.is_some_and(GidError::is_configuration) {
                error!(error = %e, "template_configuration_invalid");
            } else {
                warn!(error = %e, "command_failed");
            }
            eprintln!("Error: {:#}", e);
            gid_error.map_or(2, GidError::exit_code) as u8
        }
    };

    if let Some(ctx) = &logging_context {
        info!(
            session_id = %ctx.session_id,
            duration_secs = start_time.elapsed().as_secs_f64(),
            exit_code = code,
            "session_end"
        );
    }

    ExitCode::from(code)
}

fn log_config(loaded: &LoadedConfig) {
    debug!(
        config_path = ?loaded.config_path,
        project_config_path = ?loaded.project_config_path,
        status = ?loaded.status,
        default_template = %loaded.config.validation.default_template,
        abbreviated_threshold = loaded.config.validation.abbreviated_threshold,
        "config_loaded"
    );
    if let ConfigLoadStatus::Error(reason) = &loaded.status {
        warn!(reason = %reason, "config_defaults_used");
        eprintln!("Warning: config ignored: {}", reason);
    }
    if let Some(reason) = &loaded.project_error {
        warn!(reason = %reason, "project_config_ignored");
        eprintln!("Warning: {}", reason);
    }
}

fn run(command: Commands, verbose: bool, config: &Config) -> Result<u8> {
    let registry = TemplateRegistry::global()?;

    match command {
        Commands::Validate(args) => {
            let template = pick_template(registry, args.template.as_deref(), config)?;
            let draft = Draft::load(&Config::expand_tilde(&args.draft), template)?;
            let validator = Validator::new(ModeResolver::from_config(&config.validation));
            let report = validator.check(&draft, template);

            match args.format() {
                Format::Text => print!("{}", report::render_text(&report, verbose)),
                Format::Json => println!("{}", report::render_json(&report)?),
            }
            Ok(if report.passed() { 0 } else { 1 })
        }
        Commands::Mode(args) => {
            let template = pick_template(registry, args.template.as_deref(), config)?;
            let draft = Draft::load(&Config::expand_tilde(&args.draft), template)?;
            let resolution =
                ModeResolver::from_config(&config.validation).resolve(&draft, template);

            match args.format() {
                Format::Text => print!("{}", report::render_mode_text(template.id, &resolution)),
                Format::Json => println!(
                    "{}",
                    report::render_mode_json(template.id, &resolution)?
                ),
            }
            Ok(0)
        }
        Commands::Templates => {
            print!("{}", report::render_template_list(registry.templates()));
            Ok(0)
        }
        Commands::Show { id, schema } => {
            let template = registry.get_template(&id)?;
            if schema {
                print!("{}", report::render_schema(template));
            } else {
                println!("{}", template.id.prompt().trim_end());
            }
            Ok(0)
        }
        Commands::Init { id, output, force } => {
            let template = registry.get_template(&id)?;
            let path = output
                .map(|o| Config::expand_tilde(&o))
                .unwrap_or_else(|| PathBuf::from(format!("{}.md", template.id.slug())));

            if path.exists() && !force {
                eprintln!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
                return Ok(1);
            }

            fs::write(&path, template.id.prompt())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(template = template.id.label(), path = %path.display(), "template_written");
            println!("Wrote {} prompt to {}", template.id.label(), path.display());
            Ok(0)
        }
        Commands::Map {
            input_dir,
            output_dir,
        } => {
            let input = Config::expand_tilde(&input_dir);
            let output = output_dir
                .map(|o| Config::expand_tilde(&o))
                .unwrap_or_else(|| input.join(&config.map.output_dir_name));

            let summary = interface_doc::generate_maps(&input, &output)?;
            if summary.files_found == 0 {
                println!("No .cs files found in '{}'.", input.display());
                return Ok(0);
            }

            println!(
                "Found {} C# files in '{}'",
                summary.files_found,
                input.display()
            );
            for skipped in &summary.skipped {
                eprintln!("  WARN: Failed to parse {}", skipped.display());
            }
            println!(
                "Generated {} interface maps + README.md in '{}'",
                summary.maps_written,
                summary.output_dir.display()
            );
            println!(
                "Source total: {} bytes -> Interface maps total: {} bytes ({:.1}%)",
                group_thousands(summary.source_bytes),
                group_thousands(summary.map_bytes),
                summary.ratio()
            );
            Ok(0)
        }
    }
}

/// Template from `--template`, falling back to the configured default.
fn pick_template<'a>(
    registry: &'a TemplateRegistry,
    requested: Option<&str>,
    config: &Config,
) -> Result<&'a Template> {
    let id = requested.unwrap_or(&config.validation.default_template);
    Ok(registry.get_template(id)?)
}
