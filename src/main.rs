use indicatif::ProgressBar;
use inquire::{InquireError, Select, Text};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use swu_card_list::{
    render, CardListController, CardListError, CardListHandle, CardListState, Settings, SortKey,
    SwuDbClient,
};
use tokio::task::JoinError;
use tracing_subscriber::EnvFilter;

// The controller and the menu share one thread; blocking prompts run on the
// blocking pool.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env()?;
    let client = SwuDbClient::new(&settings)?;
    let mut handle = CardListController::spawn(Arc::new(client), settings.machine_config());

    println!("Welcome to the SWU card list.");
    show(&wait_with_spinner(&mut handle).await?);

    loop {
        let menu_options: Vec<&str> = vec![
            "Search cards",
            "Sort by Name",
            "Sort by Set",
            "Sort by Cost",
            "Sort by Power",
            "Sort by HP",
            "Exit",
        ];
        let menu_ans = prompt(move || {
            Select::new("What would you like to do?", menu_options).prompt()
        })
        .await?;

        let sent = match menu_ans {
            Ok("Search cards") => match prompt(|| Text::new("Filter:").prompt()).await? {
                Ok(filter) => handle.set_filter(filter),
                Err(_) => {
                    println!("Failed to read the filter.");
                    continue;
                }
            },
            Ok("Sort by Name") => handle.request_sort(SortKey::Name),
            Ok("Sort by Set") => handle.request_sort(SortKey::Set),
            Ok("Sort by Cost") => handle.request_sort(SortKey::Cost),
            Ok("Sort by Power") => handle.request_sort(SortKey::Power),
            Ok("Sort by HP") => handle.request_sort(SortKey::Hp),
            Ok("Exit") | Err(InquireError::OperationInterrupted) => break,
            Ok(_) => {
                println!("Invalid choice");
                continue;
            }
            Err(_) => {
                println!("There was an error, please try again");
                continue;
            }
        };
        sent?;
        show(&wait_with_spinner(&mut handle).await?);
    }

    Ok(())
}

async fn prompt<T, F>(ask: F) -> Result<Result<T, InquireError>, JoinError>
where
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(ask).await
}

async fn wait_with_spinner(handle: &mut CardListHandle) -> Result<CardListState, CardListError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Loading cards...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let state = handle.settled().await;
    spinner.finish_and_clear();
    state
}

fn show(state: &CardListState) {
    for line in render::state_lines(state) {
        println!("{}", line);
    }
}
