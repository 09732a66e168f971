use color_eyre::eyre::Result;
use schema_editor::*;
use std::env;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: schema-shell <schema key> [base url]";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("schema_editor=warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
    color_eyre::install()?;

    // Get a schema key and an optional controller address from the command line.
    let args: Vec<_> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    if args[1] == "-h" || args[1] == "--help" {
        eprintln!("{USAGE}");
        std::process::exit(0);
    }

    let mut config = EditorConfig::default();
    if let Some(url) = args.get(2) {
        config = config.with_base_url(url.as_str());
    }

    let mut key: SchemaKey = args[1].parse()?;
    let mut controller = ScheduleController::new(
        HttpStore::new(&config)?,
        TextGrid::default(),
        StatusBoard::new(config.notice_timeout),
        Catalog::new(config.language),
    );
    controller.load(&key).await;
    status(&controller);

    // Mainloop: wait for user input, line by line
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(input) = lines.next_line().await? {
        let mut cmd = input.trim().splitn(2, ':');

        match cmd.next() {
            Some("set") => {
                let args = split_args(cmd.next());
                let (Some(index), Some(field), Some(value)) = (
                    args.first().and_then(|s| s.parse::<usize>().ok()),
                    args.get(1).and_then(|s| Field::from_name(s)),
                    args.get(2),
                ) else {
                    eprintln!("ERR Use set:<index>,<field>,<value>");
                    continue;
                };
                match controller.update_value(index, field, value) {
                    Ok(stored) => println!("OK {stored}"),
                    Err(e) => eprintln!("ERR {e}"),
                }
            }
            Some("open") => {
                let Some(index) = cmd.next().and_then(|s| s.trim().parse::<usize>().ok()) else {
                    eprintln!("ERR Use open:<index>");
                    continue;
                };
                match controller.open_color_modal(index) {
                    Ok(preview) => println!("OK {preview}"),
                    Err(e) => eprintln!("ERR {e}"),
                }
            }
            Some("slider") => {
                let args = split_args(cmd.next());
                let (Some(field), Some(value)) = (
                    args.first().and_then(|s| Field::from_name(s)).filter(|f| f.is_color()),
                    args.get(1).and_then(|s| s.parse::<u8>().ok()),
                ) else {
                    eprintln!("ERR Use slider:<r|g|b>,<0-255>");
                    continue;
                };
                match controller.set_preview(field, value) {
                    Some(preview) => println!("OK {preview}"),
                    None => eprintln!("ERR No slot is being edited"),
                }
            }
            Some("apply") => match controller.apply_color_modal() {
                Some(index) => println!("OK {}", index),
                None => eprintln!("ERR No slot is being edited"),
            },
            Some("cancel") => {
                controller.cancel_color_modal();
                println!("OK");
            }
            Some("show") => {
                print!("{}", controller.view());
                println!("OK");
            }
            Some("save") => {
                controller.save(&key).await;
                status(&controller);
            }
            Some("load") => {
                match cmd.next().map(|s| s.trim().parse::<SchemaKey>()) {
                    Some(Ok(next)) => key = next,
                    Some(Err(e)) => {
                        eprintln!("ERR {e}");
                        continue;
                    }
                    None => {}
                }
                controller.load(&key).await;
                status(&controller);
            }
            Some("quit") | Some("exit") => break,
            Some("") => {}
            Some(other) => {
                eprintln!("ERR Unknown command: {other}");
            }
            None => {
                eprintln!("ERR No command given");
            }
        }
    }

    Ok(())
}

/// Comma separated command arguments
fn split_args(rest: Option<&str>) -> Vec<String> {
    rest.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

/// Respond with the latest status notice
fn status<S, V, T>(controller: &ScheduleController<S, V, StatusBoard, T>)
where
    S: SchemaStore,
    V: ScheduleView,
    T: Translate,
{
    match controller.notifier().current(STATUS_ELEMENT) {
        Some(notice) if notice.kind == NoticeKind::Error => eprintln!("ERR {}", notice.message),
        Some(notice) => println!("OK {}", notice.message),
        None => println!("OK"),
    }
}
