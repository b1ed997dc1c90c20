//! pdfjinja - fill PDF forms from Jinja templates in field tooltips

use anyhow::{bail, Context, Result};
use clap::Parser;
use form_template::{AttachmentSpec, FormTemplate, Pdftk};
use pdf_core::Attachment;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdfjinja")]
#[command(about = "Fill a PDF form using the Jinja templates in its field tooltips")]
struct Args {
    /// TTF font for attachment labels
    #[arg(short = 'f', long = "font")]
    font: Option<PathBuf>,

    /// JSON data file (reads stdin when omitted)
    #[arg(short = 'j', long = "json")]
    json: Option<PathBuf>,

    /// Pages to keep, comma separated, 0-based
    #[arg(short = 'p', long = "page", value_delimiter = ',')]
    pages: Vec<usize>,

    /// pdftk executable
    #[arg(long = "pdftk", default_value = "pdftk")]
    pdftk: PathBuf,

    /// Print the discovered fields and exit
    #[arg(long = "list-fields")]
    list_fields: bool,

    /// PDF form to fill
    #[arg(value_name = "PDF")]
    pdf: PathBuf,

    /// Output file (writes stdout when omitted)
    #[arg(value_name = "OUT")]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let form = FormTemplate::open(&args.pdf)
        .with_context(|| format!("Failed to load form {}", args.pdf.display()))?;

    if args.list_fields {
        return list_fields(&form);
    }

    let mut data = read_data(args.json.as_deref())?;
    let attachments = match data.remove("attachments") {
        Some(value) => load_attachments(value, args.font.as_deref())?,
        None => Vec::new(),
    };
    debug!(keys = data.len(), attachments = attachments.len(), "data loaded");

    let pages = (!args.pages.is_empty()).then_some(args.pages.as_slice());
    let mut output = form
        .render(&data, &attachments, pages, &Pdftk::new(&args.pdftk))
        .context("Failed to fill form")?;

    match &args.out {
        Some(path) => output
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let bytes = output.to_bytes().context("Failed to serialize output")?;
            io::stdout()
                .lock()
                .write_all(&bytes)
                .context("Failed to write output to stdout")?;
        }
    }

    Ok(())
}

fn read_data(path: Option<&Path>) -> Result<serde_json::Map<String, serde_json::Value>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read data from stdin")?;
            text
        }
    };

    match serde_json::from_str::<serde_json::Value>(&text).context("Invalid JSON data")? {
        serde_json::Value::Object(map) => Ok(map),
        _ => bail!("JSON data must be an object"),
    }
}

fn load_attachments(value: serde_json::Value, font: Option<&Path>) -> Result<Vec<Attachment>> {
    AttachmentSpec::parse_list(value)
        .context("Invalid attachments list")?
        .iter()
        .map(|spec| {
            spec.load(font)
                .with_context(|| format!("Failed to load attachment {}", spec.data.display()))
        })
        .collect()
}

fn list_fields(form: &FormTemplate) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for field in form.fields().iter() {
        let rect = match field.rect {
            Some(r) => format!("[{} {} {} {}]", r.x0, r.y0, r.x1, r.y1),
            None => "-".to_string(),
        };
        let template = if field.template.is_some() { "template" } else { "-" };
        writeln!(stdout, "{}\tpage {}\t{}\t{}", field.name, field.page, rect, template)?;
    }
    Ok(())
}
