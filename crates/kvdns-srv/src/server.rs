//! DNS server runner: binds UDP and TCP and serves the record store.

use std::fmt::Write as _;
use std::iter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hickory_proto::op::{Header, Message, MessageType, ResponseCode};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo, ServerFuture};
use tokio::net::{TcpListener, UdpSocket};
use tracing::{debug, error, info, warn};

use crate::api::ManagementApi;
use crate::config::ServerConfig;
use crate::resolver::Resolver;
use crate::store::Store;
use crate::SrvError;

#[async_trait]
impl RequestHandler for Resolver {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let started = Instant::now();
        let header = *request.header();
        if header.message_type() == MessageType::Response {
            debug!(src = %request.src(), id = header.id(), "ignoring response packet");
            return ResponseInfo::from(header);
        }

        // redb reads are short but synchronous; keep them off the async workers.
        let message = request_message(request);
        let resolver = self.clone();
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = match tokio::task::spawn_blocking(move || resolver.resolve(&message)).await {
            Ok(response) => response,
            Err(e) => {
                error!(id = header.id(), error = %e, "resolver task failed");
                let reply = builder.error_msg(&header, ResponseCode::ServFail);
                return match response_handle.send_response(reply).await {
                    Ok(info) => info,
                    Err(_) => serve_failed(header),
                };
            }
        };

        info!(
            src = %request.src(),
            protocol = %request.protocol(),
            id = response.id(),
            questions = %describe_questions(&response),
            rcode = %response.response_code(),
            answers = response.answers().len(),
            elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            "query"
        );

        let reply = builder.build(
            *response.header(),
            response.answers().iter(),
            iter::empty(),
            iter::empty(),
            iter::empty(),
        );
        match response_handle.send_response(reply).await {
            Ok(info) => info,
            Err(e) => {
                warn!(src = %request.src(), id = header.id(), error = %e, "failed to send response");
                serve_failed(header)
            }
        }
    }
}

/// Rebuild the request as a plain message for the resolver.
fn request_message(request: &Request) -> Message {
    let header = request.header();
    let mut message = Message::new();
    message
        .set_id(header.id())
        .set_message_type(MessageType::Query)
        .set_op_code(header.op_code())
        .set_recursion_desired(header.recursion_desired());
    message.add_queries(request.queries().iter().map(|q| q.original().clone()));
    message
}

fn serve_failed(request: Header) -> ResponseInfo {
    let mut header = Header::response_from_request(&request);
    header.set_response_code(ResponseCode::ServFail);
    header.into()
}

fn describe_questions(message: &Message) -> String {
    let mut out = String::new();
    for (i, query) in message.queries().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}/{}", query.name(), query.query_type());
    }
    out
}

/// Bound DNS listeners sharing one resolver.
pub struct DnsServer {
    server: ServerFuture<Resolver>,
    udp_addr: Option<SocketAddr>,
    tcp_addr: Option<SocketAddr>,
}

impl DnsServer {
    /// Bind the listeners enabled in `config`.
    pub async fn bind(config: &ServerConfig, resolver: Resolver) -> crate::Result<Self> {
        config.validate()?;
        let mut server = ServerFuture::new(resolver);

        let udp_addr = if config.disable_udp {
            None
        } else {
            let socket = UdpSocket::bind(config.listen)
                .await
                .map_err(|e| SrvError::Server(format!("UDP bind {}: {e}", config.listen)))?;
            let addr = socket.local_addr()?;
            info!(%addr, "UDP socket bound");
            server.register_socket(socket);
            Some(addr)
        };

        let tcp_addr = if config.disable_tcp {
            None
        } else {
            let listener = TcpListener::bind(config.listen)
                .await
                .map_err(|e| SrvError::Server(format!("TCP bind {}: {e}", config.listen)))?;
            let addr = listener.local_addr()?;
            info!(%addr, "TCP listener bound");
            server.register_listener(listener, config.tcp_timeout());
            Some(addr)
        };

        Ok(Self {
            server,
            udp_addr,
            tcp_addr,
        })
    }

    /// Local address of the UDP socket, if bound.
    #[must_use]
    pub const fn udp_addr(&self) -> Option<SocketAddr> {
        self.udp_addr
    }

    /// Local address of the TCP listener, if bound.
    #[must_use]
    pub const fn tcp_addr(&self) -> Option<SocketAddr> {
        self.tcp_addr
    }

    /// Serve until the listeners shut down.
    pub async fn run(mut self) -> crate::Result<()> {
        self.server
            .block_until_done()
            .await
            .map_err(|e| SrvError::Server(format!("DNS listener stopped: {e}")))
    }
}

/// Open the store named in `config` and serve it over DNS and the
/// management API until shutdown.
pub async fn run(config: &ServerConfig) -> crate::Result<()> {
    let store = Arc::new(Store::open(&config.database)?);
    let dns = DnsServer::bind(config, Resolver::new(Arc::clone(&store), config.ttl)).await?;
    let api = if config.disable_api {
        None
    } else {
        Some(ManagementApi::bind(config.api_listen, store).await?)
    };

    info!(
        addr = %config.listen,
        api = ?api.as_ref().map(ManagementApi::local_addr),
        database = %config.database.display(),
        udp = !config.disable_udp,
        tcp = !config.disable_tcp,
        "kvdns server running"
    );

    match api {
        Some(api) => tokio::try_join!(dns.run(), api.run()).map(|_| ()),
        None => dns.run().await,
    }
}
