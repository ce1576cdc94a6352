use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, header, server::conn::http1, service::service_fn,
};
use hyper_util::rt::{TokioIo, TokioTimer};
use log::{debug, trace};
use std::{io::ErrorKind, net::Ipv4Addr, time::Duration};
use tokio::net::TcpListener;

/// Connections that have not sent a full request head by then are dropped.
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Binds to `port`, moving on to the next port while the address is in use.
pub async fn bind_with_retry(port: u16) -> Result<TcpListener> {
    let mut port = port;
    loop {
        match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse && port < u16::MAX => {
                debug!("Port {} in use, trying {}", port, port + 1);
                port += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to bind port {}", port)),
        }
    }
}

/// Serves the rendered report over HTTP/1.1 until the process is stopped.
pub async fn serve_on(listener: TcpListener, html: String) -> Result<()> {
    let page = Bytes::from(html);
    loop {
        let (stream, peer) = listener.accept().await?;
        trace!("Accepted connection from {}", peer);

        let page = page.clone();
        let service = service_fn(move |req: Request<hyper::body::Incoming>| {
            let page = page.clone();
            async move { respond(&req, page) }
        });

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .timer(TokioTimer::new())
                .header_read_timeout(HEADER_READ_TIMEOUT)
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Connection from {} ended with an error: {}", peer, e);
            }
        });
    }
}

fn respond<B>(
    req: &Request<B>,
    page: Bytes,
) -> Result<Response<Full<Bytes>>, hyper::http::Error> {
    debug!("{} {}", req.method(), req.uri().path());

    match (req.method(), req.uri().path()) {
        (&Method::GET | &Method::HEAD, "/favicon.ico") => {
            Response::builder().status(StatusCode::NO_CONTENT).body(Full::default())
        }
        (&Method::GET | &Method::HEAD, _) => Response::builder()
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(Full::new(page)),
        _ => Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(header::ALLOW, "GET, HEAD")
            .body(Full::default()),
    }
}
