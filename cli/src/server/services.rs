use crate::actors::MatchRequest;

use std::fmt::Debug;

use tokio::sync::{mpsc::UnboundedSender, oneshot};

use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    Body, Error, Method, Request, Response, StatusCode,
};

use strangers::{Action, Directive};

pub const ACTIONS: &str = "/actions";
pub const OUTBOX: &str = "/outbox";

const JSON: &str = "application/json";

pub async fn requests(
    req: Request<Body>,
    matchmaker_tx: UnboundedSender<MatchRequest>,
) -> Result<Response<Body>, Error> {
    #[cfg(debug_assertions)]
    tracing::trace!("Service: {:?}", req);

    match (req.method(), req.uri().path()) {
        (&Method::POST, ACTIONS) => action_response(req, matchmaker_tx).await,
        (&Method::GET, OUTBOX) => outbox_response(matchmaker_tx).await,
        _ => Ok(status_response(StatusCode::NOT_FOUND)),
    }
}

async fn action_response(
    req: Request<Body>,
    matchmaker_tx: UnboundedSender<MatchRequest>,
) -> Result<Response<Body>, Error> {
    let bytes = hyper::body::to_bytes(req.into_body()).await?;

    let action: Action = match serde_json::from_slice(&bytes) {
        Ok(action) => action,
        Err(e) => {
            tracing::debug!("Malformed action. {}", e);
            return Ok(status_response(StatusCode::BAD_REQUEST));
        }
    };

    let (reply, reply_rx) = oneshot::channel();

    if let Err(e) = matchmaker_tx.send(MatchRequest::Action { action, reply }) {
        return Ok(unavailable_response(&e));
    }

    match reply_rx.await {
        Ok(directives) => Ok(json_response(&directives)),
        Err(e) => Ok(unavailable_response(&e)),
    }
}

async fn outbox_response(
    matchmaker_tx: UnboundedSender<MatchRequest>,
) -> Result<Response<Body>, Error> {
    let (reply, reply_rx) = oneshot::channel();

    if let Err(e) = matchmaker_tx.send(MatchRequest::Drain { reply }) {
        return Ok(unavailable_response(&e));
    }

    match reply_rx.await {
        Ok(directives) => Ok(json_response(&directives)),
        Err(e) => Ok(unavailable_response(&e)),
    }
}

fn json_response(directives: &[Directive]) -> Response<Body> {
    let bytes = match serde_json::to_vec(directives) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Service: {}", e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut res = Response::new(Body::from(bytes));

    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));

    res
}

fn unavailable_response(error: &dyn Debug) -> Response<Body> {
    tracing::error!("Service: matchmaker unavailable {:?}", error);

    status_response(StatusCode::SERVICE_UNAVAILABLE)
}

fn status_response(status: StatusCode) -> Response<Body> {
    let mut res = Response::new(Body::empty());

    *res.status_mut() = status;

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::actors::Matchmaker;

    use strangers::{
        dictionary::NeverFlagged, persistence::MemoryStore, Dispatcher, EngineConfig, Notice,
        UserId,
    };

    use tokio::sync::{mpsc::unbounded_channel, watch};

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(ACTIONS)
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn action_roundtrip_over_http() {
        let dispatcher = Dispatcher::new(
            EngineConfig::default(),
            Box::new(MemoryStore::default()),
            Box::new(NeverFlagged),
            None,
        );

        let (tx, rx) = unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(());
        tokio::spawn(Matchmaker::new(dispatcher, rx, shutdown_rx).start());

        let res = requests(post(r#"{"action":"find","user":1}"#), tx.clone())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let directives: Vec<Directive> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(directives, vec![Directive::notice(UserId(1), Notice::Searching)]);

        let res = requests(post(r#"{"action":"dance"}"#), tx.clone())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method(Method::GET)
            .uri(OUTBOX)
            .body(Body::empty())
            .unwrap();
        let res = requests(req, tx.clone()).await.unwrap();
        let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
        assert_eq!(&bytes[..], b"[]");

        let req = Request::builder()
            .method(Method::GET)
            .uri("/elsewhere")
            .body(Body::empty())
            .unwrap();
        let res = requests(req, tx).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unavailable_without_matchmaker() {
        let (tx, rx) = unbounded_channel();
        drop(rx);

        let res = requests(post(r#"{"action":"find","user":1}"#), tx)
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
