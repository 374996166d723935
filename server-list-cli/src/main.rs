mod error;
mod paths;
mod print;

use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use serde_json::Value;
use serde_json::json;
use server_list_lib::ClientConfig;
use server_list_lib::Column;
use server_list_lib::ExtraParams;
use server_list_lib::FilterValue;
use server_list_lib::LayoutMode;
use server_list_lib::ListOptions;
use server_list_lib::PaginationMode;
use server_list_lib::QueryState;
use server_list_lib::RowKey;
use server_list_lib::SelectionProps;
use server_list_lib::ServerList;
use server_list_lib::ServerListClient;
use server_list_lib::SortDir;
use server_list_lib::Viewport;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse a paginated {data, meta} endpoint")]
struct Cli {
    /// Endpoint path, relative to the base URL
    endpoint: String,
    /// Base URL; defaults to SERVER_LIST_BASE_URL
    #[arg(long)]
    base_url: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Field holding the row key
    #[arg(long, default_value = "id")]
    key: String,
    /// Column as `key` or `key:Header`; repeatable
    #[arg(long = "column", short = 'c')]
    columns: Vec<String>,
    #[arg(long, default_value_t = 10)]
    per_page: u32,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, help = "Sort descending")]
    desc: bool,
    #[arg(long, short = 's')]
    search: Option<String>,
    /// Column filter as `key=value`; repeatable
    #[arg(long = "filter", short = 'f')]
    filters: Vec<String>,
    /// Extra request parameter as `key=value`; repeatable
    #[arg(long = "param", short = 'p')]
    params: Vec<String>,
    /// Body layout
    #[arg(long, value_enum, default_value_t = LayoutArg::Auto)]
    layout: LayoutArg,
    #[arg(long, default_value_t = 1024.0)]
    width: f64,
    #[arg(long, default_value_t = 600.0)]
    height: f64,
    /// Append pages instead of paging
    #[arg(long)]
    infinite: bool,
    /// Pages to load in infinite mode
    #[arg(long, default_value_t = 1)]
    pages: u32,
    #[arg(long, short = 'j', help = "Print rows as JSON")]
    json: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutArg {
    /// Table from 720 px wide, cards below
    Auto,
    Cards,
    Table,
}

impl From<LayoutArg> for LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => LayoutMode::Auto,
            LayoutArg::Cards => LayoutMode::Cards,
            LayoutArg::Table => LayoutMode::Table,
        }
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str), CliError> {
    raw.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| CliError::Argument(format!("expected key=value, got {raw:?}")))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    if let Ok(file) = File::create(&path) {
        let _ = WriteLogger::init(level, Config::default(), file);
    }
}

fn columns(cli: &Cli) -> Vec<Column<Value>> {
    if cli.columns.is_empty() {
        return vec![Column::new(cli.key.clone(), cli.key.clone()).sortable()];
    }
    cli.columns
        .iter()
        .map(|col| {
            let (key, header) = col.split_once(':').unwrap_or((col.as_str(), col.as_str()));
            Column::new(key, header).sortable()
        })
        .collect()
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.base_url {
        Some(url) => ClientConfig::new(url.clone()),
        None => ClientConfig::from_env()?,
    };
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    let client = ServerListClient::from_config(&config)?;

    let mut extra = ExtraParams::new();
    for raw in &cli.params {
        let (key, value) = split_pair(raw)?;
        extra.insert(key, value);
    }

    let options = ListOptions {
        initial_per_page: cli.per_page,
        initial_sort_by: cli.sort_by.clone().unwrap_or_default(),
        initial_sort_dir: if cli.desc { SortDir::Desc } else { SortDir::Asc },
        layout: cli.layout.into(),
        pagination: if cli.infinite {
            PaginationMode::Infinite
        } else {
            PaginationMode::Pager
        },
        ..ListOptions::default()
    };

    let key = cli.key.clone();
    let list = ServerList::builder(client, cli.endpoint.clone(), move |row: &Value| {
        RowKey::from_json(&row[key.as_str()]).unwrap_or_else(|| RowKey::Str(String::new()))
    })
    .columns(columns(&cli))
    .options(options)
    .extra_params(extra)
    .on_query_change(|q: &QueryState| log::info!("Query: {q:?}"))
    .build()?;

    if let Some(search) = &cli.search {
        list.set_search(search.clone());
    }
    for raw in &cli.filters {
        let (key, value) = split_pair(raw)?;
        list.set_filter(key, Some(FilterValue::from(value)));
    }
    if let Some(page) = cli.page {
        list.restore_query(QueryState {
            page,
            ..list.query()
        });
    }

    list.settle().await;
    if cli.infinite {
        for _ in 1..cli.pages {
            if !list.end_reached() {
                break;
            }
            list.settle().await;
        }
    }

    if cli.json {
        let out = json!({
            "query": list.query(),
            "meta": list.meta(),
            "error": list.error(),
            "data": list.rows(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let keys = HashSet::new();
        let view = list.view(
            Viewport::new(cli.width, cli.height),
            &SelectionProps::read_only(&keys),
        );
        print!("{}", print::render(&view));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
