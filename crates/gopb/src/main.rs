use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use gopb_emit::{
    MappingOptions, ResponseShape, SchemaOptions, render_mapping,
    render_schema, service_name,
};
use gopb_extract::{ResolvedModel, Selector, resolve_path};
use itertools::Itertools;
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Generate a proto3 schema, and optionally Go conversion code, from the
/// exported functions and structs of a Go source file.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a proto3 schema
    ///
    /// Emits one service with an rpc per exported function, request and
    /// response messages for each, and a message for every struct the
    /// functions reference.
    Proto {
        /// Go source file to read
        file: PathBuf,

        /// Output file path (writes to stdout if not specified). Its stem
        /// also names the service unless --service is given.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write Go conversion functions to this path (`-` for stdout)
        #[arg(long, value_name = "PATH")]
        mapping: Option<PathBuf>,

        /// Go package of the conversion code (defaults to the source package)
        #[arg(long, value_name = "NAME", requires = "mapping")]
        mapping_package: Option<String>,

        /// Import path of the generated protobuf package, imported as `pb`
        #[arg(long, value_name = "IMPORT_PATH", requires = "mapping")]
        pb_import: Option<String>,

        /// Service name
        #[arg(long, value_name = "NAME")]
        service: Option<String>,

        /// Schema package (a `xxx` placeholder if not specified)
        #[arg(long, value_name = "NAME")]
        package: Option<String>,

        /// Put results directly in the response message instead of a
        /// code/msg/data envelope
        #[arg(long)]
        flat: bool,

        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Write the resolved model as JSON
    Model {
        /// Go source file to read
        file: PathBuf,

        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Write the JSON Schema of the `model` output
    JsonSchema {
        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SelectorArgs {
    /// Only generate the function with this name
    #[arg(long, value_name = "NAME")]
    function: Option<String>,

    /// Generate the message for this struct and everything it references.
    /// Without --function, no functions are generated.
    #[arg(long = "struct", value_name = "NAME")]
    root: Option<String>,

    /// Keep only these fields of the --struct type (comma-separated)
    #[arg(
        long,
        value_name = "FIELDS",
        value_delimiter = ',',
        requires = "root"
    )]
    fields: Vec<String>,

    /// Include methods as well as plain functions
    #[arg(long)]
    methods: bool,
}

impl From<SelectorArgs> for Selector {
    fn from(args: SelectorArgs) -> Self {
        Self {
            function: args.function,
            root: args.root,
            fields: args.fields,
            include_methods: args.methods,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Structured logging goes to stderr so generated text on stdout stays
    // clean for piping. Default to warn, allowlist our crates.
    const CRATES: &[&str] = &[
        "gopb",
        "gopb_emit",
        "gopb_extract",
        "gopb_schemas",
        "gopb_syntax",
    ];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        .init();

    match cli.command {
        Commands::Proto {
            file,
            output,
            mapping,
            mapping_package,
            pb_import,
            service,
            package,
            flat,
            selector,
        } => {
            // Everything is resolved and rendered before any output file
            // is created.
            let model = resolve_path(&file, &selector.into())?;

            let schema_options = SchemaOptions {
                package,
                service: service.or_else(|| {
                    output.as_deref().and_then(service_from_path)
                }),
                shape: if flat {
                    ResponseShape::Flat
                } else {
                    ResponseShape::Enveloped
                },
            };
            let schema = render_schema(&model, &schema_options)?;
            let code = mapping
                .as_ref()
                .map(|_| {
                    render_mapping(
                        &model,
                        &MappingOptions {
                            package: mapping_package,
                            pb_import,
                        },
                    )
                })
                .transpose()?;

            write_output(output.as_deref(), &schema)?;
            if let (Some(path), Some(code)) = (mapping, code) {
                let sink = (path != Path::new("-")).then_some(path.as_path());
                write_output(sink, &code)?;
            }
            Ok(())
        }
        Commands::Model {
            file,
            output,
            selector,
        } => {
            let model = resolve_path(&file, &selector.into())?;
            let mut json = serde_json::to_string_pretty(&model)?;
            json.push('\n');
            write_output(output.as_deref(), &json)
        }
        Commands::JsonSchema { output } => {
            let schema = schemars::schema_for!(ResolvedModel);
            let mut json = serde_json::to_string_pretty(&schema)?;
            json.push('\n');
            write_output(output.as_deref(), &json)
        }
    }
}

/// Service name derived from an output file's stem (`users.proto` gives
/// `Users`).
fn service_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| service_name(stem))
}

/// Writes `text` to the file at `path`, or to stdout when `path` is `None`.
fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    // Stdout must outlive the lock, so we bind it here first.
    let stdout = std::io::stdout();
    let mut writer: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path).with_context(|| {
                format!("failed to create {}", path.display())
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(stdout.lock()),
    };
    writer.write_all(text.as_bytes())?;
    writer.flush()?;

    if let Some(path) = path {
        info!(path = %path.display(), bytes = text.len(), "wrote output");
    }
    Ok(())
}
