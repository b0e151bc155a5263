//! End-to-end request/response scenarios (§8 S1-S6), driving a real
//! `tcpproto-server` with a real `tcpproto-client` over a loopback TCP
//! socket.

use std::sync::Arc;

use rand::rngs::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tcpproto_client::Client;
use tcpproto_core::Configuration;
use tcpproto_proto::{FilePayload, Request};
use tcpproto_server::{Registry, Server};

async fn spawn_server(config: Configuration, registry: Registry, private_key: Option<RsaPrivateKey>) -> String {
    let server = Server::bind("127.0.0.1:0", config, registry, private_key).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

#[tokio::test]
async fn s1_tiny_exchange() {
    let mut registry = Registry::new();
    registry.on(
        "PING",
        Arc::new(|_req, resp| {
            resp.body = b"PONG".to_vec();
        }),
    );
    let config = Configuration::new("s1-secret");
    let addr = spawn_server(config.clone(), registry, None).await;

    let mut client = Client::new(&addr, config, None);
    let response = client.send(Request::with_command("PING")).await.unwrap();

    assert_eq!(response.body, b"PONG");
    assert_eq!(response.headers.get("CONTENT_LENGTH").map(String::as_str), Some("4"));
}

#[tokio::test]
async fn s2_cookie_set_and_forget() {
    let mut registry = Registry::new();
    registry.on(
        "LOGIN",
        Arc::new(|_req, resp| {
            resp.remember("sid", "abc");
            resp.forget_cookie("old");
        }),
    );
    let config = Configuration::new("s2-secret");
    let addr = spawn_server(config.clone(), registry, None).await;

    let mut client = Client::new(&addr, config, None);
    client.state_mut().cookies.set("old", "stale-value");
    let _ = client.send(Request::with_command("LOGIN")).await.unwrap();

    assert_eq!(client.state().cookies.get("sid").map(|c| c.value.as_str()), Some("abc"));
    assert!(client.state().cookies.get("old").is_none());
}

#[tokio::test]
async fn s3_file_round_trip() {
    let mut registry = Registry::new();
    registry.on(
        "ECHO_FILE",
        Arc::new(|req, resp| {
            if let Some(file) = &req.file {
                resp.body = file.content.clone();
            }
        }),
    );
    let config = Configuration::new("s3-secret");
    let addr = spawn_server(config.clone(), registry, None).await;

    let mut client = Client::new(&addr, config, None);
    let mut request = Request::with_command("ECHO_FILE");
    request.attach_file(FilePayload::new("hello.txt", b"hello, world!".to_vec(), "BND"));
    let response = client.send(request).await.unwrap();

    assert_eq!(response.body, b"hello, world!");
}

#[tokio::test]
async fn s4_server_vault_round_trip() {
    let mut registry = Registry::new();
    registry.on(
        "SET_VAULT",
        Arc::new(|_req, resp| {
            resp.lock("uid", "42");
        }),
    );
    registry.on(
        "READ_VAULT",
        Arc::new(|req, resp| {
            resp.body = req.vault.get("uid").cloned().unwrap_or_default().into_bytes();
        }),
    );
    let config = Configuration::new("s4-secret");
    let addr = spawn_server(config.clone(), registry, None).await;

    let mut client = Client::new(&addr, config, None);
    let _ = client.send(Request::with_command("SET_VAULT")).await.unwrap();
    assert!(client.state().vault_tokens.contains_key("uid"));

    let response = client.send(Request::with_command("READ_VAULT")).await.unwrap();
    assert_eq!(response.body, b"42");
}

#[tokio::test]
async fn s5_client_vault_with_crypto_enabled() {
    let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
    let public_key = RsaPublicKey::from(&private_key);

    let mut registry = Registry::new();
    registry.on(
        "READ_SECRET",
        Arc::new(|req, resp| {
            resp.body = req.data.get("pw").cloned().unwrap_or_default().into_bytes();
        }),
    );
    let config = Configuration::new("s5-secret");
    let addr = spawn_server(config.clone(), registry, Some(private_key)).await;

    let mut client = Client::new(&addr, config, Some(public_key));
    client.vault("pw", "hunter2");
    let response = client.send(Request::with_command("READ_SECRET")).await.unwrap();

    assert_eq!(response.body, b"hunter2");
}

#[tokio::test]
async fn s6_oversized_header_is_rejected() {
    let registry = Registry::new();
    let mut config = Configuration::new("s6-secret");
    config.max_header_size = 512;
    let addr = spawn_server(config.clone(), registry, None).await;

    let stream = tokio::net::TcpStream::connect(&addr).await.unwrap();
    use tokio::io::AsyncWriteExt;
    let mut stream = stream;
    let junk = vec![b'x'; 2048];
    stream.write_all(&junk).await.unwrap();
    stream.shutdown().await.unwrap();

    // The server closes the connection with no response rather than
    // echoing anything back; reading from our half should hit EOF.
    use tokio::io::AsyncReadExt;
    let mut buf = [0u8; 16];
    let n = stream.read(&mut buf).await.unwrap();
    assert_eq!(n, 0);
}
