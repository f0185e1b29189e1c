use cartola_session::application_port::*;
use cartola_session::client::*;
use cartola_session::domain_model::*;
use cartola_session::gate::*;
use cartola_session::logger::*;
use cartola_session::settings::*;
use futures_util::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let client = Client::try_new(&project_settings)?;

    let cancel = CancellationToken::new();
    let mut notices = client.renewal_signal.subscribe();
    let banner_cancel = cancel.clone();
    let banner_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = banner_cancel.cancelled() => break,
                notice = notices.recv() => match notice {
                    Ok(notice) => {
                        let prompt = RenewalPrompt::from(&notice.reason);
                        eprintln!("\n*** {} ***\n{}\n[{}]\n", prompt.title, prompt.body, prompt.action);
                    }
                    Err(RecvError::Lagged(n)) => warn!("missed {} renewal notice(s)", n),
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    let session = client.auth_service.sign_in().await?;
    info!(
        "signed in as {} <{}> (admin: {}, manager: {})",
        session.identity.display_name,
        session.identity.email,
        session.is_admin(),
        session.is_manager()
    );

    let mut failed = send_batch(&client, &cli.path, cli.concurrent.max(1)).await;

    if failed > 0 && cli.renew {
        info!("{} request(s) need a renewed session, renewing interactively", failed);
        client.auth_service.renew_manually().await?;
        failed = send_batch(&client, &cli.path, failed).await;
    }

    client.auth_service.sign_out().await?;
    cancel.cancel();
    let _ = banner_handle.await;

    if failed > 0 {
        return Err(anyhow::anyhow!("{} request(s) failed", failed));
    }
    Ok(())
}

/// Sends `count` simultaneous requests and returns how many failed.
async fn send_batch(client: &Client, path: &str, count: usize) -> usize {
    let results = join_all((0..count).map(|_| client.interceptor.send(ApiRequest::get(path)))).await;

    let mut failed = 0;
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(response) => println!("#{i} {} {}", response.status, response.body),
            Err(ApiError::RenewalNeeded(reason)) => {
                failed += 1;
                println!("#{i} renewal needed: {reason}");
            }
            Err(e) => {
                failed += 1;
                println!("#{i} failed: {e}");
            }
        }
    }
    failed
}
