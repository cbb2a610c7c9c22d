use crate::{actors::MatchRequest, server::services::requests};

use std::{convert::Infallible, net::SocketAddr};

use tokio::sync::{mpsc::UnboundedSender, watch::Receiver};

use hyper::{
    service::{make_service_fn, service_fn},
    Server,
};

pub async fn start_server(
    server_addr: SocketAddr,
    matchmaker_tx: UnboundedSender<MatchRequest>,
    mut shutdown: Receiver<()>,
) {
    let service = make_service_fn(move |_| {
        let matchmaker_tx = matchmaker_tx.clone();

        async move {
            Ok::<_, Infallible>(service_fn(move |req| requests(req, matchmaker_tx.clone())))
        }
    });

    let server = match Server::try_bind(&server_addr) {
        Ok(builder) => builder.serve(service),
        Err(e) => {
            tracing::error!("❗ Cannot bind {}. {}", server_addr, e);
            return;
        }
    };

    tracing::info!("✅ Gateway Online at {}", server_addr);

    let graceful = server.with_graceful_shutdown(async {
        if let Err(e) = shutdown.changed().await {
            tracing::error!("{}", e);
        }
    });

    if let Err(e) = graceful.await {
        tracing::error!("Server: {}", e);
    }

    tracing::info!("❌ Gateway Offline");
}
