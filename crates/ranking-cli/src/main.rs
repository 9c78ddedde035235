//! `ranking` command-line viewer and editor

mod render;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use parking_lot::Mutex;
use ranking_core::{members_of_area, RecordDraft};
use ranking_sync::{
    load_accounts, Backends, Debouncer, EditorSession, RankingConfig, ReconcileOutcome,
    ServingContext, ViewerSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("ranking")
        .version(ranking_sync::VERSION)
        .about("Leaderboard viewer and editor")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("context")
                .long("context")
                .global(true)
                .value_parser(value_parser!(ServingContext))
                .help("Serving context: public or local"),
        )
        .arg(
            Arg::new("api")
                .long("api")
                .global(true)
                .help("Base URL of the ranking API"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Do not talk to any remote store"),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory of the local cache"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("show")
                .about("Show the people ranking")
                .arg(Arg::new("filter").long("filter").help("Search text"))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Page to show"),
                )
                .arg(
                    Arg::new("wait")
                        .long("wait")
                        .action(ArgAction::SetTrue)
                        .help("Wait for the background refresh and show the result again"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Read search text from stdin, one query per line"),
        )
        .subcommand(
            Command::new("areas")
                .about("Show the area ranking")
                .arg(Arg::new("filter").long("filter").help("Search text"))
                .arg(
                    Arg::new("area")
                        .long("area")
                        .help("List the members of one area"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Replace every record with a people CSV")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("CSV file"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export a CSV")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(["people", "areas"])
                        .help("Which table to export"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file (stdout if omitted)"),
                ),
        )
        .subcommand(record_args(
            Command::new("add").about("Add a record"),
            true,
        ))
        .subcommand(record_args(
            Command::new("update")
                .about("Update the record at a ranking position")
                .arg(rank_arg()),
            false,
        ))
        .subcommand(
            Command::new("remove")
                .about("Remove the record at a ranking position")
                .arg(rank_arg()),
        )
        .subcommand(Command::new("accounts").about("List editor accounts"))
}

fn rank_arg() -> Arg {
    Arg::new("rank")
        .required(true)
        .value_parser(value_parser!(usize))
        .help("1-based position in the people ranking")
}

fn record_args(command: Command, required: bool) -> Command {
    command
        .arg(Arg::new("name").long("name").required(required).help("Name"))
        .arg(Arg::new("area").long("area").required(required).help("Area"))
        .arg(Arg::new("role").long("role").help("Role"))
        .arg(Arg::new("points").long("points").help("Points"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<RankingConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => RankingConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_overrides(|key| std::env::var(key).ok())?,
        None => RankingConfig::from_env()?,
    };
    if let Some(context) = matches.get_one::<ServingContext>("context") {
        config = config.with_context(*context);
    }
    if let Some(base) = matches.get_one::<String>("api") {
        config = config.with_api_base(base.clone());
    }
    if let Some(dir) = matches.get_one::<PathBuf>("cache-dir") {
        config = config.with_cache_dir(dir.clone());
    }
    if matches.get_flag("offline") {
        config = config.without_api();
    }
    Ok(config)
}

fn text_arg<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a str> {
    args.get_one::<String>(id).map(String::as_str)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = load_config(&matches)?;
    let backends = Backends::from_config(&config)?;
    let marks = render::terminal_highlighter();

    match matches.subcommand() {
        Some(("show", args)) => {
            let mut viewer = ViewerSession::open(&backends).await;
            println!("{}", render::source(viewer.tier()));
            viewer.set_people_filter(text_arg(args, "filter").unwrap_or_default());
            let page = args.get_one::<usize>("page").copied().unwrap_or(1);
            if page > 1 && !viewer.go_to_page(page) {
                tracing::warn!(page, "page out of range, showing page 1");
            }
            print!("{}", render::people(&viewer.people_view(), &marks));

            if args.get_flag("wait") {
                if let Some(ReconcileOutcome::Applied(_)) = viewer.wait_reconciliation().await {
                    println!("\nActualizado desde el servidor:");
                    print!("{}", render::people(&viewer.people_view(), &marks));
                }
            }
        }
        Some(("search", _)) => {
            let viewer = Arc::new(Mutex::new(ViewerSession::open(&backends).await));
            let debouncer = Debouncer::new(config.debounce());
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut pending = None;

            while let Some(line) = lines.next_line().await? {
                if !viewer.lock().set_people_filter(&line) {
                    continue;
                }
                let viewer = Arc::clone(&viewer);
                let marks = marks.clone();
                pending = Some(debouncer.trigger(move || {
                    print!("{}", render::people(&viewer.lock().people_view(), &marks));
                    std::future::ready(())
                }));
            }
            if let Some(pending) = pending {
                pending.await?;
            }
        }
        Some(("areas", args)) => {
            let mut viewer = ViewerSession::open(&backends).await;
            println!("{}", render::source(viewer.tier()));
            if let Some(area) = text_arg(args, "area") {
                let listing = viewer
                    .store()
                    .with_set(|set| render::members(area, &members_of_area(set.records(), area)));
                print!("{listing}");
            } else {
                viewer.set_area_filter(text_arg(args, "filter").unwrap_or_default());
                print!("{}", render::areas(&viewer.area_view(), &marks));
            }
        }
        Some(("import", args)) => {
            let Some(path) = args.get_one::<PathBuf>("path") else {
                bail!("missing CSV path");
            };
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let editor = EditorSession::open(&backends).await;
            let (count, outcome) = editor.import_csv(&text).await?;
            println!("Se importaron {count} registros");
            println!("{}", render::save(&outcome));
        }
        Some(("export", args)) => {
            let editor = EditorSession::open(&backends).await;
            let csv = match text_arg(args, "kind") {
                Some("areas") => editor.export_areas_csv(),
                _ => editor.export_people_csv(),
            };
            match args.get_one::<PathBuf>("out") {
                Some(path) => std::fs::write(path, csv)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{csv}"),
            }
        }
        Some(("add", args)) => {
            let editor = EditorSession::open(&backends).await;
            let draft = RecordDraft::new(
                text_arg(args, "name").unwrap_or_default(),
                text_arg(args, "area").unwrap_or_default(),
                text_arg(args, "role").unwrap_or_default(),
                text_arg(args, "points").unwrap_or("0"),
            );
            let (_, outcome) = editor.add(draft).await?;
            println!("{}", render::save(&outcome));
        }
        Some(("update", args)) => {
            let editor = EditorSession::open(&backends).await;
            let rank = args.get_one::<usize>("rank").copied().unwrap_or_default();
            let Some(entry) = editor.entry_at_rank(rank) else {
                bail!("no record at position {rank}");
            };
            let mut draft = RecordDraft::from(&entry.record);
            for (id, field) in [
                ("name", &mut draft.name),
                ("area", &mut draft.area),
                ("role", &mut draft.role),
                ("points", &mut draft.points),
            ] {
                if let Some(value) = text_arg(args, id) {
                    *field = value.to_string();
                }
            }
            let outcome = editor.update(entry.id, draft).await?;
            println!("{}", render::save(&outcome));
        }
        Some(("remove", args)) => {
            let editor = EditorSession::open(&backends).await;
            let rank = args.get_one::<usize>("rank").copied().unwrap_or_default();
            let Some(entry) = editor.entry_at_rank(rank) else {
                bail!("no record at position {rank}");
            };
            let (removed, outcome) = editor.remove(entry.id).await?;
            println!("Eliminado: {}", removed.name);
            println!("{}", render::save(&outcome));
        }
        Some(("accounts", _)) => {
            let accounts = load_accounts(backends.cache().as_ref()).await?;
            print!("{}", render::accounts(&accounts));
        }
        _ => {}
    }

    Ok(())
}
