use clap::Parser;
use lastdone::config::cli::{Command, TaskCommand, TasksArgs};
use lastdone::domain::ports::Storage;
use lastdone::utils::{logger, validation::Validate};
use lastdone::{
    ApiClient, Cli, FileTaskRepository, LocalStorage, MemoryStorage, Settings, Task, TaskService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;

    // 初始化日誌
    if settings.logging.json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
        tracing::debug!("Effective settings: {:?}", settings);
    }

    match cli.command {
        Command::Serve(args) => {
            let mut settings = settings;
            args.apply(&mut settings);

            if let Err(e) = settings.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }

            if settings.storage.in_memory {
                tracing::info!("💾 Using in-memory storage, tasks will not be persisted");
                run_server(MemoryStorage::new(), &settings).await?;
            } else {
                tracing::info!("💾 Using data directory: {}", settings.storage.data_dir);
                run_server(LocalStorage::new(&settings.storage.data_dir), &settings).await?;
            }
        }
        Command::Fetch { url } => {
            let url = match url {
                Some(url) => url,
                None => settings.client_base_url()?,
            };
            let client = ApiClient::new(&url)?.with_api_prefix(&settings.server.api_v1_str);
            // 錯誤已在 fetch_data 內記錄
            match client.fetch_data().await {
                Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Tasks(args) => {
            if let Err(e) = run_task_command(args, &settings).await {
                tracing::error!("❌ Task command failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_server<S: Storage + 'static>(storage: S, settings: &Settings) -> anyhow::Result<()> {
    let repository = FileTaskRepository::open(storage).await?;
    let service = TaskService::new(repository);
    lastdone::serve(service, settings).await?;
    Ok(())
}

async fn run_task_command(args: TasksArgs, settings: &Settings) -> lastdone::Result<()> {
    let url = match args.url {
        Some(url) => url,
        None => settings.client_base_url()?,
    };
    let client = ApiClient::new(&url)?.with_api_prefix(&settings.server.api_v1_str);

    match args.command {
        TaskCommand::List { skip, limit } => {
            let tasks = client.list_tasks(skip, limit).await?;
            if tasks.is_empty() {
                println!("No tasks yet");
            }
            for task in &tasks {
                print_task_line(task);
            }
        }
        TaskCommand::Show { id } => print_task(&client.get_task(id).await?)?,
        TaskCommand::Add { name, fields } => {
            let task = client.create_task(&fields.into_create(name)).await?;
            println!("✅ Created task {}", task.id);
            print_task(&task)?;
        }
        TaskCommand::Update { id, name, fields } => {
            let task = client.update_task(id, &fields.into_update(name)).await?;
            println!("✅ Updated task {}", task.id);
            print_task(&task)?;
        }
        TaskCommand::Remove { id } => {
            let task = client.delete_task(id).await?;
            println!("🗑️  Deleted task {} '{}'", task.id, task.name);
        }
    }

    Ok(())
}

fn print_task_line(task: &Task) {
    let frequency = match task.frequency_value {
        Some(days) => format!("every {} days", days),
        None => task.frequency.to_string(),
    };
    let date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());

    println!(
        "{:>4}  {:<30}  {:<16}  last: {:<10}  next: {}",
        task.id,
        task.name,
        frequency,
        date(task.last_done),
        date(task.next_to_do)
    );
}

fn print_task(task: &Task) -> lastdone::Result<()> {
    println!("{}", serde_json::to_string_pretty(task)?);
    Ok(())
}
