use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use sokusuggest::{AutocompleteSession, FeedbackBus, HttpTransport, SearchConfig, Transport};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let config = match SearchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sokusuggest: {e}");
            std::process::exit(2);
        }
    };
    let demo = std::env::args().skip(1).any(|arg| arg == "--demo");
    info!("suggestions from {} with {:?} debounce", config.endpoint, config.delay);

    let feedback = FeedbackBus::default();
    let mut toasts = feedback.subscribe();
    tokio::spawn(async move {
        loop {
            match toasts.recv().await {
                Ok(toast) => eprintln!("[{:?}] {}", toast.level, toast.message),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let transport = Arc::new(HttpTransport::new());
    let mut session =
        AutocompleteSession::from_config(&config, transport, print_results).with_feedback(feedback);

    if demo {
        run_demo(&mut session).await;
    } else {
        run_stdin(&mut session).await;
    }

    if tokio::time::timeout(SETTLE_TIMEOUT, session.settle()).await.is_err() {
        warn!("gave up waiting for pending suggestions");
    }
    session.disconnect();
}

fn print_results(query: &str, results: &[String]) {
    println!("{query:?}:");
    for res in results.iter().take(10) {
        println!("  {res}");
    }
}

async fn run_stdin<T, F>(session: &mut AutocompleteSession<T, F>)
where
    T: Transport,
    F: FnMut(&str, &[String]),
{
    let (tx, rx) = mpsc::channel(32);

    // One query per line
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("failed to read stdin: {e}");
                    break;
                }
            }
        }
    });

    session.run(rx).await;
}

/// "tes" then "testi" 350ms later; on a slow link the first request is aborted.
async fn run_demo<T, F>(session: &mut AutocompleteSession<T, F>)
where
    T: Transport,
    F: FnMut(&str, &[String]),
{
    session.submit("tes");
    let _ = tokio::time::timeout(Duration::from_millis(350), async {
        loop {
            session.process_next_event().await;
        }
    })
    .await;
    session.submit("testi");
}
