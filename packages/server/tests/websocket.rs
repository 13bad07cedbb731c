#![allow(clippy::expect_used, clippy::unwrap_used)]

mod support;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use support::TestServer;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message, client::IntoClientRequest},
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(server: &TestServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server.app.clone();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(server: &TestServer, addr: SocketAddr, user_id: &str) -> Client {
    let mut request = format!("ws://{}/ws", addr).into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Authorization", format!("Bearer {}", server.token(user_id)).parse().unwrap());
    let (client, _) = connect_async(request).await.unwrap();
    client
}

async fn emit(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Next non-ping event
async fn next_event(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = frame {
            let event: Value = serde_json::from_str(text.as_str()).unwrap();
            if event["event"] != "ping" {
                return event;
            }
        }
    }
}

fn join(project_id: &str) -> Value {
    json!({ "event": "join-project", "data": { "project_id": project_id } })
}

fn send(project_id: &str, text: &str) -> Value {
    json!({ "event": "send-message", "data": { "project_id": project_id, "message_text": text } })
}

#[tokio::test]
async fn handshake_without_token_is_refused() {
    let server = TestServer::new().await;
    let addr = serve(&server).await;

    let err = connect_async(format!("ws://{}/ws", addr)).await.unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status().as_u16(), 401),
        other => panic!("expected an HTTP refusal, got {:?}", other),
    }
}

#[tokio::test]
async fn room_lifecycle_over_the_wire() {
    let server = TestServer::new().await;
    let project_id = server.project("lead", 4).await;
    server.state.workflow.invite("lead", &project_id, "w").await.unwrap();
    let addr = serve(&server).await;

    let mut lead = connect(&server, addr, "lead").await;
    let mut w = connect(&server, addr, "w").await;

    emit(&mut lead, join(&project_id)).await;
    let ack = next_event(&mut lead).await;
    assert_eq!(ack["event"], "ack");
    assert_eq!(ack["data"]["action"], "join-project");

    // Invited but not accepted yet
    emit(&mut w, join(&project_id)).await;
    let rejected = next_event(&mut w).await;
    assert_eq!(rejected["event"], "rejected");
    assert_eq!(rejected["data"]["errcode"], "FORBIDDEN");

    server.state.workflow.accept_invite("w", &project_id, "w").await.unwrap();
    emit(&mut w, join(&project_id)).await;
    assert_eq!(next_event(&mut w).await["event"], "ack");

    // The broadcast is queued before the reply, so the echo arrives first
    emit(&mut w, send(&project_id, "hello team")).await;
    let echo = next_event(&mut w).await;
    assert_eq!(echo["event"], "new-message");
    assert_eq!(echo["data"]["message_text"], "hello team");
    assert_eq!(next_event(&mut w).await["event"], "ack");

    let received = next_event(&mut lead).await;
    assert_eq!(received["event"], "new-message");
    assert_eq!(received["data"]["sender_id"], "w");
    assert_eq!(received["data"]["sender_name"], "w");

    server.state.workflow.remove_member("lead", &project_id, "w").await.unwrap();
    let revoked = next_event(&mut w).await;
    assert_eq!(revoked["event"], "membership-revoked");
    assert_eq!(revoked["data"]["project_id"], project_id.as_str());

    emit(&mut w, send(&project_id, "still there?")).await;
    let refused = next_event(&mut w).await;
    assert_eq!(refused["event"], "rejected");
    assert_eq!(refused["data"]["errcode"], "FORBIDDEN");
    assert_eq!(refused["data"]["action"], "send-message");

    let history = server.state.messages.list_for_project(&project_id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn malformed_frames_are_rejected_not_fatal() {
    let server = TestServer::new().await;
    let project_id = server.project("lead", 4).await;
    let addr = serve(&server).await;
    let mut lead = connect(&server, addr, "lead").await;

    lead.send(Message::Text("{not json".into())).await.unwrap();
    let rejected = next_event(&mut lead).await;
    assert_eq!(rejected["event"], "rejected");
    assert_eq!(rejected["data"]["errcode"], "BAD_REQUEST");
    assert!(rejected["data"]["action"].is_null());

    emit(&mut lead, join(&project_id)).await;
    assert_eq!(next_event(&mut lead).await["event"], "ack");
}
