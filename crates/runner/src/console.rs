//! Operator inputs: console commands and process signals
//!
//! Both run as background tasks that publish into the event loop's control
//! channel, so they reach the strategy on the loop thread like any other
//! event.

use log::{debug, error, info, warn};
use tempo_gateway::{PlatformEvent, ProcessSignal, Publisher, UserMessage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::task::JoinHandle;

/// Read `<command> [@<account>]` lines from stdin
pub fn spawn_console<P>(events: P) -> JoinHandle<()>
where
    P: Publisher<PlatformEvent> + 'static,
{
    tokio::spawn(async move {
        let forwarded = forward_commands(BufReader::new(tokio::io::stdin()), &events).await;
        debug!("console: stdin closed after {} commands", forwarded);
    })
}

/// Publish every parseable command line until the input ends or the loop
/// goes away. Returns the number of commands forwarded.
pub async fn forward_commands<R, P>(reader: R, events: &P) -> usize
where
    R: AsyncBufRead + Unpin,
    P: Publisher<PlatformEvent> + ?Sized,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(message) = UserMessage::parse_line(&line) else {
                    continue;
                };
                debug!("console: {} -> {:?}", message.command, message.recipient);
                if events.publish(PlatformEvent::UserMessage(message)).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Ok(None) => break,
            Err(e) => {
                warn!("console: failed to read input: {}", e);
                break;
            }
        }
    }
    forwarded
}

/// Forward SIGINT / SIGTERM until the loop goes away
pub fn spawn_signal_listener<P>(events: P) -> JoinHandle<()>
where
    P: Publisher<PlatformEvent> + 'static,
{
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(stream) => Some(stream),
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                None
            }
        };

        loop {
            #[cfg(unix)]
            let received = tokio::select! {
                result = signal::ctrl_c() => match result {
                    Ok(()) => ProcessSignal::Interrupt,
                    Err(e) => {
                        error!("Failed to install Ctrl+C handler: {}", e);
                        return;
                    }
                },
                Some(()) = recv_terminate(&mut terminate) => ProcessSignal::Terminate,
            };

            #[cfg(not(unix))]
            let received = match signal::ctrl_c().await {
                Ok(()) => ProcessSignal::Interrupt,
                Err(e) => {
                    error!("Failed to install Ctrl+C handler: {}", e);
                    return;
                }
            };

            info!("received {}", received);
            if events.publish(PlatformEvent::Signal { signal: received }).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(unix)]
async fn recv_terminate(stream: &mut Option<signal::unix::Signal>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}
