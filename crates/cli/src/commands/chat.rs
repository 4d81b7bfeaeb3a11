use std::io::{self, BufRead, Write};

use anyhow::Result;
use uuid::Uuid;

use courier_agent::{HeuristicExtractor, NoopDispatcher, Orchestrator};
use courier_core::config::AppConfig;
use courier_core::domain::ServiceProvider;
use courier_directory::FileContactStore;

/// Interactive REPL: each line is one conversation turn on the current
/// thread. `/new` clears to a fresh thread, `/quit` exits.
pub async fn run(
    config: &AppConfig,
    provider: Option<String>,
    thread: Option<String>,
) -> Result<()> {
    let provider: ServiceProvider = match provider {
        Some(raw) => raw.parse()?,
        None => config.dispatch.default_provider,
    };
    let contacts = FileContactStore::from_config(&config.directory);
    let orchestrator = Orchestrator::new(HeuristicExtractor::new(), NoopDispatcher, contacts);

    let mut thread_id = thread.unwrap_or_else(|| Uuid::new_v4().to_string());
    println!("courier chat ({}) - thread {thread_id}", provider.display_name());
    println!("Type a request. `/new` starts a fresh thread, `/quit` exits.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "/quit" | "/exit" => break,
            "/new" => {
                orchestrator.clear_thread(&thread_id);
                thread_id = Uuid::new_v4().to_string();
                println!("Started a new thread: {thread_id}");
            }
            _ => {
                let reply = orchestrator.handle_turn(&thread_id, input, provider).await;
                println!("{reply}");
            }
        }
    }

    Ok(())
}
