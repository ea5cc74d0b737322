use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use factbook::export::ExportKind;
use factbook::loader::{self, HttpLoader, SeriesMapping, VectorFilter};
use factbook::narrative::TextLookup;
use factbook::{Locale, Page, PageConfig, PageState, Settings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "factbook",
    version,
    about = "Derive, narrate, chart & export bilingual factbook pages"
)]
struct Cli {
    /// Settings file (default: <config dir>/factbook/settings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the narrative and write the page's downloads.
    Render(RenderArgs),
    /// Print metrics, narrative and table (text or JSON).
    Summary(SummaryArgs),
    /// List the vectors in a tidy data.csv.
    Vectors(VectorsArgs),
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Page configuration (TOML)
    #[arg(short, long)]
    page: PathBuf,
    /// Tidy CSV: a file path or an http(s) URL
    #[arg(short, long)]
    data: String,
    /// Report language: en or fr (default from settings)
    #[arg(short, long)]
    locale: Option<Locale>,
    /// Year for shares and the donut (default: latest)
    #[arg(short, long)]
    year: Option<i32>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    page: PageArgs,
    /// Output directory (default from settings)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
    /// Downloads to write, comma separated: csv, docx, png, svg
    #[arg(short, long, value_delimiter = ',', default_value = "csv,docx,png")]
    format: Vec<ExportKind>,
    /// TTF font for chart text
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    page: PageArgs,
    /// Emit JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct VectorsArgs {
    /// Tidy CSV: a file path or an http(s) URL
    #[arg(short, long)]
    data: String,
    /// Glob filter, e.g. capex_* or *_total
    #[arg(long)]
    pattern: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(args, settings),
        Command::Summary(args) => cmd_summary(args, settings),
        Command::Vectors(args) => cmd_vectors(args),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(p) => Settings::load(Some(p.as_path()))
            .and_then(|s| s.apply_env(|k| std::env::var(k).ok())),
        None => Settings::resolve(),
    };
    settings.context("reading settings")
}

/// Load the page; a failed or empty dataset is reported, not retried.
fn open_page(args: &PageArgs, settings: &Settings) -> Result<(Page, Locale)> {
    let config = PageConfig::from_path(&args.page)
        .with_context(|| format!("loading page config {}", args.page.display()))?;
    let mapping = SeriesMapping::from_categories(&config.categories, config.total_vector.as_deref());
    let source = loader::loader_for(&args.data, mapping)?;
    let mut page = Page::open(config, source.as_ref());
    let locale = args.locale.unwrap_or(settings.locale);

    match page.state() {
        PageState::Failed(msg) => bail!("{}: {msg}", page.text().text("load_error", locale)?),
        PageState::NoData => bail!("{}", page.text().text("no_data", locale)?),
        PageState::Loading | PageState::Ready(_) => {}
    }
    if let Some(year) = args.year {
        if !page.select_year(year)? {
            eprintln!("Year {year} is not in the dataset; using the latest year");
        }
    }
    Ok((page, locale))
}

fn cmd_render(args: RenderArgs, settings: Settings) -> Result<()> {
    let (page, locale) = open_page(&args.page, &settings)?;
    let page = page.with_font(args.font.or(settings.font.clone()));

    for sentence in page.narrative(locale)? {
        println!("{sentence}");
    }

    let out_dir = args.out_dir.unwrap_or(settings.output_dir);
    let written = page
        .export_to(&args.format, locale, &out_dir)
        .with_context(|| format!("exporting to {}", out_dir.display()))?;
    for path in written {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_summary(args: SummaryArgs, settings: Settings) -> Result<()> {
    let (page, locale) = open_page(&args.page, &settings)?;
    let summary = page.summary(locale)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.title);
    println!();
    for sentence in &summary.narrative {
        println!("{sentence}");
    }
    println!();
    println!("{}", summary.table.headers.join(" | "));
    for row in &summary.table.rows {
        let cells: Vec<&str> = row.cells.iter().map(|c| c.display.as_str()).collect();
        println!("{} | {}", row.header, cells.join(" | "));
    }
    if let Some(ranks) = &summary.rankings {
        println!();
        println!("{}", ranks.headers.join(" | "));
        for r in &ranks.rows {
            println!("{} | {} | {} | {}", r.name, r.reserves, r.production, r.exports);
        }
    }
    Ok(())
}

fn cmd_vectors(args: VectorsArgs) -> Result<()> {
    let text = if args.data.starts_with("http://") || args.data.starts_with("https://") {
        HttpLoader::new(args.data.as_str(), SeriesMapping::default())?.fetch_text()?
    } else {
        std::fs::read_to_string(&args.data).with_context(|| format!("reading {}", args.data))?
    };
    let filter = args.pattern.as_deref().map(VectorFilter::new).transpose()?;
    for name in loader::list_vectors(&text, filter.as_ref())? {
        println!("{name}");
    }
    Ok(())
}
