use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use task_core::{ChatInput, EventRow, JobRow, ResourceRow, TrainingRow};
use task_kb::AnswerBank;
use task_llm::HttpGenerativeClient;
use task_observability::{init_tracing, AppMetrics};
use task_records::{RecordStore, Store};
use task_router::QueryRouter;

#[derive(Debug, Parser)]
#[command(name = "taskbot")]
#[command(about = "TASK Concierge CLI")]
struct Cli {
    /// Directory of JSON program-record overrides; builtin data when unset.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat; the previous turn's topic carries over.
    Chat,
    /// Answer one message and exit.
    Ask {
        text: String,
        #[arg(long)]
        last_topic: Option<String>,
        #[arg(long)]
        lang: Option<String>,
    },
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
    /// Load demo rows into the configured record store.
    Seed,
}

#[derive(Debug, Subcommand)]
enum RecordsCommand {
    Search {
        kind: String,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("task_cli");
    let cli = Cli::parse();

    let store = build_store().await?;
    let router = build_router(cli.data_dir.as_deref(), Arc::clone(&store))?;

    match cli.command {
        Command::Chat => run_chat(router).await?,
        Command::Ask {
            text,
            last_topic,
            lang,
        } => {
            let answer = router
                .handle(ChatInput {
                    text,
                    last_topic,
                    lang,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Command::Records { command } => match command {
            RecordsCommand::Search { kind, query, limit } => {
                let terms = vec![query];
                match kind.as_str() {
                    "trainings" => {
                        let rows = store.search_trainings(&terms, limit).await?;
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                    "jobs" => {
                        let rows = store.search_jobs(&terms, limit).await?;
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                    "resources" => {
                        let rows = store.search_resources(&terms, limit).await?;
                        println!("{}", serde_json::to_string_pretty(&rows)?);
                    }
                    other => bail!("unknown record kind '{other}', expected trainings, jobs, or resources"),
                }
            }
        },
        Command::Seed => seed_demo_rows(&store).await?,
    }

    Ok(())
}

async fn run_chat(router: QueryRouter<Store, HttpGenerativeClient>) -> Result<()> {
    let mut last_topic: Option<String> = None;

    println!("TASK Concierge chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        let answer = router
            .handle(ChatInput {
                text: message.to_string(),
                last_topic: last_topic.clone(),
                lang: None,
            })
            .await?;

        if let Some(topic) = answer.topic {
            last_topic = Some(topic.as_code().to_string());
        }

        println!("\n{}\n[{}]\n", answer.text, answer.source.as_code());
    }

    Ok(())
}

async fn build_store() -> Result<Arc<Store>> {
    let store = if let Ok(database_url) = env::var("TASK_DATABASE_URL") {
        Store::sqlite(&database_url)
            .await
            .context("failed to open record database")?
    } else {
        Store::memory()
    };
    Ok(Arc::new(store))
}

fn build_router(
    data_dir: Option<&std::path::Path>,
    store: Arc<Store>,
) -> Result<QueryRouter<Store, HttpGenerativeClient>> {
    let bank = match data_dir {
        Some(dir) => AnswerBank::from_data_dir(dir)
            .with_context(|| format!("failed loading program data from {}", dir.display()))?,
        None => AnswerBank::builtin(),
    };
    task_kb::verify_keyword_tables(&bank)?;

    let generative =
        HttpGenerativeClient::from_env().context("failed to build generative client")?;

    Ok(QueryRouter::new(
        Arc::new(bank),
        store,
        Arc::new(generative),
        AppMetrics::shared(),
    ))
}

async fn seed_demo_rows(store: &Store) -> Result<()> {
    let trainings = store
        .upsert_trainings(vec![
            TrainingRow {
                name: "Forklift Refresher".to_string(),
                description: "One-day refresher for holders of an expired certification.".to_string(),
                schedule: Some("Friday 2:00-4:00 PM".to_string()),
                next_start_date: NaiveDate::from_ymd_opt(2025, 11, 7),
                signup_link: None,
                contact_info: Some("(609) 337-1624".to_string()),
            },
            TrainingRow {
                name: "Digital Literacy Basics".to_string(),
                description: "Email, job applications, and everyday computer skills.".to_string(),
                schedule: Some("Tuesdays 10:00 AM".to_string()),
                next_start_date: None,
                signup_link: None,
                contact_info: None,
            },
        ])
        .await?;

    let jobs = store
        .upsert_jobs(vec![JobRow {
            title: "Warehouse Associate".to_string(),
            company: "Mercer Logistics".to_string(),
            location: "Ewing, NJ".to_string(),
            description: "Forklift certification preferred. Full time, day shift.".to_string(),
            apply_link: Some("https://example.org/warehouse-associate".to_string()),
            posted_at: None,
        }])
        .await?;

    let resources = store
        .upsert_resources(vec![ResourceRow {
            name: "Arm In Arm Food Pantry".to_string(),
            category: "food".to_string(),
            description: "Groceries and hunger relief for Mercer County residents.".to_string(),
            website: Some("https://arminarm.org".to_string()),
            phone_number: Some("(609) 396-9355".to_string()),
        }])
        .await?;

    let events = store
        .upsert_events(vec![EventRow {
            name: "SORA Info Session".to_string(),
            description: "Required session before applying to the security training.".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 10, 2),
            time: Some("11:00 AM".to_string()),
            location: Some("TASK Conference Room".to_string()),
            signup_link: None,
        }])
        .await?;

    println!("seeded {trainings} trainings, {jobs} jobs, {resources} resources, {events} events");
    Ok(())
}
