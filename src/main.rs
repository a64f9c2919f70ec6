use anyhow::Context;
use clap::Parser;
use ruby_indent::{AutoIndenter, IndentConfig, TextDocument};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Re-indent Ruby source
#[derive(Parser, Debug)]
#[command(name = "ruby-indent")]
#[command(about = "Re-indent Ruby source the way the editor's auto-indenter would", long_about = None)]
struct Args {
    /// Ruby file to re-indent
    #[arg(value_name = "FILE", required_unless_present = "dump_schema")]
    file: Option<PathBuf>,

    /// JSON indent configuration
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Columns per indentation level
    #[arg(long)]
    indent_width: Option<usize>,

    /// Columns a tab advances to
    #[arg(long)]
    tab_width: Option<usize>,

    /// Indent with tabs instead of spaces
    #[arg(long)]
    tabs: bool,

    /// Rewrite the file instead of printing to stdout
    #[arg(long)]
    in_place: bool,

    /// Write debug logging to the specified file
    #[arg(long, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    dump_schema: bool,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Arc::new(log_file)))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .init();
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<IndentConfig> {
    let mut config = match &args.config {
        Some(path) => IndentConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => IndentConfig::default(),
    };

    if let Some(width) = args.indent_width {
        config.settings.indent_width = width;
    }
    if let Some(width) = args.tab_width {
        config.settings.tab_width = width;
    }
    if args.tabs {
        config.settings.use_spaces = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.dump_schema {
        let schema = schemars::schema_for!(IndentConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = load_config(&args)?;
    let indenter = AutoIndenter::from_config(&config)?;

    let Some(path) = &args.file else {
        anyhow::bail!("no input file given");
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    tracing::info!("re-indenting {}", path.display());
    let mut doc = TextDocument::from_text(&source, config.settings.tab_width);
    let last = doc.lines().len().saturating_sub(1);
    let changed = indenter.indent_lines(&mut doc, 0..=last);
    tracing::info!("{} lines changed", changed);

    let output = doc.text();
    if args.in_place {
        if changed > 0 {
            std::fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}
