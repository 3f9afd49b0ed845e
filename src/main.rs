//! Marklet - render a minimal markdown dialect in the terminal.
//!
//! # Usage
//!
//! ```bash
//! marklet README.md
//! marklet --format json README.md
//! marklet --no-images --plain README.md
//! ```

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use marklet::config::{
    ConfigFlags, OutputFormat, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use marklet::document::{Document, is_markdown_file};
use marklet::image::{ImageLoader, no_images};
use marklet::perf;
use marklet::render::Renderer;
use marklet::render::text::{TextOptions, write_nodes};

/// Render a minimal markdown dialect in the terminal
#[derive(Parser, Debug)]
#[command(name = "marklet", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Do not load images (show placeholders only)
    #[arg(long)]
    no_images: bool,

    /// Never emit ANSI styling
    #[arg(long)]
    plain: bool,

    /// Directory relative image paths are resolved against
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Maximum table width in columns
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Enable timing output
    #[arg(long)]
    perf: bool,

    /// Write image fetch events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn effective_flags(cli: &Cli, raw_args: &[String]) -> Result<ConfigFlags> {
    let global_path = global_config_path();
    let cli_flags = parse_flag_tokens(raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_override_path())?;
        global_flags.union(&local_flags)
    };
    Ok(file_flags.union(&cli_flags))
}

fn image_base_dir(file: &Path, flags: &ConfigFlags) -> PathBuf {
    flags.base_dir.clone().unwrap_or_else(|| {
        file.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    })
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let flags = effective_flags(&cli, &raw_args)?;

    // Initialize logging once the flags say whether timing is wanted
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(perf::log_filter(flags.perf))
        .init();

    perf::set_enabled(flags.perf);
    let render_debug_log_path = flags
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKLET_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = ?render_debug_log_path,
            %err,
            "failed to initialize render debug log"
        );
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }
    if !is_markdown_file(&cli.file) {
        tracing::warn!(file = %cli.file.display(), "file does not look like markdown");
    }

    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let document = Document::parse(&source);
    tracing::debug!(blocks = document.len(), "parsed document");

    let output = match flags.format.unwrap_or(OutputFormat::Text) {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize document")?;
            json.push('\n');
            json
        }
        OutputFormat::Text => {
            let renderer = Renderer::new();
            let nodes = if flags.no_images {
                renderer.render(&document, &no_images)
            } else {
                let loader = ImageLoader::new(image_base_dir(&cli.file, &flags));
                renderer.render(&document, &loader)
            };
            let options = TextOptions {
                ansi: !flags.plain && std::io::stdout().is_terminal(),
                width: cli.width,
            };
            write_nodes(&nodes, options)
        }
    };

    std::io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context("Failed to write output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_base_dir_defaults_to_file_parent() {
        let flags = ConfigFlags::default();
        assert_eq!(
            image_base_dir(Path::new("docs/readme.md"), &flags),
            PathBuf::from("docs")
        );
        assert_eq!(image_base_dir(Path::new("readme.md"), &flags), PathBuf::from("."));
    }

    #[test]
    fn test_image_base_dir_prefers_flag() {
        let flags = ConfigFlags {
            base_dir: Some(PathBuf::from("assets")),
            ..ConfigFlags::default()
        };
        assert_eq!(
            image_base_dir(Path::new("docs/readme.md"), &flags),
            PathBuf::from("assets")
        );
    }
}
