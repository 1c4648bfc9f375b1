mod handler;
mod io;
mod protocol;

use std::sync::Arc;

use jsonwebdb_client::{error::JwdbResult, HttpSession, HttpSessionConfig, Session};

use crate::cli::Args;

use handler::{BridgeHandler, SessionControl};
use io::NdjsonIo;
use protocol::{BridgeRequest, BridgeResponse, PROTOCOL_VERSION};

pub async fn run(args: Args) -> JwdbResult<()> {
    let config = HttpSessionConfig::new(args.url.clone()).with_timeout_ms(args.timeout_ms);
    let session = Arc::new(HttpSession::new(config)?);

    if let (Some(user), Some(password)) = (args.username.as_deref(), args.password.as_deref()) {
        session.connect(user, password).await?;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let mut io = NdjsonIo::new(stdin, stdout);
    let mut handler = BridgeHandler::new(args, Arc::clone(&session));

    loop {
        let Some(line) = io.read_line().await? else { break };
        if line.is_empty() {
            continue;
        }

        let req: BridgeRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                // id unknown; still answer so the caller is not left waiting
                let resp: BridgeResponse<()> =
                    BridgeResponse::err(PROTOCOL_VERSION, String::new(), "INVALID_REQUEST", e.to_string());
                io.write_json_line(&resp).await?;
                continue;
            }
        };

        tracing::debug!(id = %req.id, cmd = %req.cmd, "bridge request");
        let resp = handler.handle(req).await;
        io.write_json_line(&resp).await?;
    }

    if session.guid().is_some() {
        if let Err(e) = SessionControl::disconnect(session.as_ref()).await {
            tracing::warn!(error = %e, "disconnect on shutdown failed");
        }
    }
    Ok(())
}
