//! CLI tool for logsheet - renders one worksheet of an XLSX file as HTML
//!
//! Usage:
//!   logsheet_cli <input.xlsx>                    # HTML page to stdout
//!   logsheet_cli <input.xlsx> -o out.html        # HTML page to a file
//!   logsheet_cli <input.xlsx> --sheet Q2 --json  # SheetView as JSON
//!   logsheet_cli <input.xlsx> --list-sheets      # one sheet name per line

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::Parser;
use logsheet::file_info::mime_type_for;
use logsheet::render::render_document;
use logsheet::{load_sheet, parser, FileInfo, PageModel, RenderOptions};

#[derive(Parser)]
#[command(version, about = "Render a worksheet of an XLSX workbook as a styled HTML table.")]
struct Args {
    /// Workbook to read.
    input: PathBuf,

    /// Worksheet to render (default: the first one).
    #[arg(long)]
    sheet: Option<String>,

    /// Write output here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the sheet view as JSON instead of HTML.
    #[arg(long)]
    json: bool,

    /// Print the worksheet names and exit.
    #[arg(long)]
    list_sheets: bool,

    /// Page title.
    #[arg(long)]
    title: Option<String>,

    /// Case-insensitive text in cell A1 that is replaced by the logo.
    #[arg(long)]
    brand_marker: Option<String>,

    /// Logo image URL.
    #[arg(long)]
    logo: Option<String>,
}

impl Args {
    fn render_options(&self) -> RenderOptions {
        let mut options = RenderOptions::default();
        if let Some(title) = &self.title {
            options.title.clone_from(title);
        }
        if let Some(marker) = &self.brand_marker {
            options.brand_marker.clone_from(marker);
        }
        if let Some(logo) = &self.logo {
            options.logo_src.clone_from(logo);
        }
        options
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let data = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let workbook = parser::parse(&data)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    if args.list_sheets {
        let names: Vec<&str> = workbook.sheet_names().collect();
        let mut listing = names.join("\n");
        listing.push('\n');
        return emit(args.output.as_deref(), &listing);
    }

    let view = load_sheet(&workbook, args.sheet.as_deref())?;
    log::info!(
        "{}: sheet {:?}, {} rows x {} columns",
        args.input.display(),
        view.sheet_name,
        view.rows.len(),
        view.column_count
    );

    let output = if args.json {
        let mut json = serde_json::to_string_pretty(&view).context("serializing sheet view")?;
        json.push('\n');
        json
    } else {
        let info = file_info(&args.input, data.len())?;
        let model = PageModel {
            workbook: Some(&workbook),
            active_sheet: Some(&view.sheet_name),
            file_info: Some(&info),
            error: None,
            view: Some(&view),
        };
        render_document(&model, &args.render_options())
    };

    emit(args.output.as_deref(), &output)
}

fn file_info(path: &Path, size: usize) -> Result<FileInfo> {
    let metadata = fs::metadata(path).with_context(|| format!("reading metadata of {}", path.display()))?;
    let last_modified_ms = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime_type_for(&name);
    Ok(FileInfo::new(
        name,
        u64::try_from(size).unwrap_or(u64::MAX),
        mime_type,
        last_modified_ms,
    ))
}

fn emit(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Written: {}", path.display());
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("writing to stdout")?;
        }
    }
    Ok(())
}
