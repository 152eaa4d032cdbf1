use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::{
    dto::LinkCommand,
    error::ServiceError,
    link::EventLink,
    services::round_service::{EventOutcome, RoundController},
};

/// Run the single control loop until shutdown, end-of-stream, or a fatal
/// error.
///
/// One command is read and fully drained (ledger write, ranking read-back,
/// outbound send) before the next is read. The shutdown future is raced
/// only against the wait-for-line suspension, so no event is ever left
/// half-applied.
pub async fn run_event_loop<R, W>(
    controller: &mut RoundController,
    link: &mut EventLink<R, W>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ServiceError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            () = &mut shutdown => {
                info!("shutdown requested");
                return Ok(());
            }
            line = link.next_line() => line?,
        };

        let Some(line) = line else {
            info!("link closed by peer");
            return Ok(());
        };

        let Some(command) = LinkCommand::parse(&line) else {
            debug!(line = %line.trim(), "ignoring unrecognized line");
            continue;
        };

        match controller.apply(command).await? {
            EventOutcome::Broadcast(ranking) => link.send_order(&ranking).await?,
            EventOutcome::Ignored => {}
        }
    }
}
