use actix_web::{dev::ServerHandle, get, post, web, App, HttpRequest, HttpResponse, HttpServer};
use rss_robot::{
    errors::AppError,
    feishu::{FeishuClient, FeishuConfig, Messenger, TextMessage},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const APP_ID: &str = "cli_test";
const APP_SECRET: &str = "secret";

/// Local stand-in for the Feishu Open API endpoints the client uses.
#[derive(Default)]
struct OpenApiStub {
    token_expire: u64,
    token_requests: AtomicUsize,
    list_requests: AtomicUsize,
    sent: Mutex<Vec<Value>>,
}

impl OpenApiStub {
    fn expiring_in(secs: u64) -> Self {
        Self {
            token_expire: secs,
            ..Default::default()
        }
    }

    fn authorized(&self, req: &HttpRequest) -> bool {
        let current = format!("Bearer t-{}", self.token_requests.load(Ordering::SeqCst));
        req.headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == current)
    }
}

fn api_error(code: i64, msg: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({"code": code, "msg": msg}))
}

#[post("/open-apis/auth/v3/tenant_access_token/internal")]
async fn issue_token(stub: web::Data<OpenApiStub>, body: web::Json<Value>) -> HttpResponse {
    if body["app_id"] != APP_ID || body["app_secret"] != APP_SECRET {
        return api_error(10003, "invalid app_id or app_secret");
    }
    let issued = stub.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    HttpResponse::Ok().json(json!({
        "code": 0,
        "msg": "ok",
        "tenant_access_token": format!("t-{issued}"),
        "expire": stub.token_expire
    }))
}

#[get("/open-apis/chat/v4/list")]
async fn list_chats(
    stub: web::Data<OpenApiStub>,
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    stub.list_requests.fetch_add(1, Ordering::SeqCst);
    if !stub.authorized(&req) {
        return api_error(99991663, "tenant access token invalid");
    }
    if query.get("page_size").map(String::as_str) != Some("100") {
        return api_error(99992402, "page_size missing");
    }

    let page = match query.get("page_token").map(String::as_str) {
        None => json!({
            "groups": [
                {"chat_id": "oc_1", "name": "releases"},
                {"chat_id": "oc_2", "name": "backend"}
            ],
            "has_more": true,
            "page_token": "p2"
        }),
        Some("p2") => json!({
            "groups": [{"chat_id": "oc_3", "name": "infra"}],
            "has_more": false,
            "page_token": ""
        }),
        Some(_) => return api_error(99992402, "invalid page_token"),
    };
    HttpResponse::Ok().json(json!({"code": 0, "msg": "ok", "data": page}))
}

#[post("/open-apis/message/v4/send/")]
async fn send_message(stub: web::Data<OpenApiStub>, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !stub.authorized(&req) {
        return api_error(99991663, "tenant access token invalid");
    }
    if body["chat_id"] == "oc_gone" {
        return api_error(230002, "bot not in chat");
    }
    stub.sent.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({"code": 0, "msg": "ok", "data": {"message_id": "om_1"}}))
}

fn start_stub(stub: web::Data<OpenApiStub>) -> (FeishuClient, ServerHandle) {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(stub.clone())
            .service(issue_token)
            .service(list_chats)
            .service(send_message)
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let client = FeishuClient::new(FeishuConfig {
        app_id: APP_ID.to_string(),
        app_secret: APP_SECRET.to_string(),
        base_url: format!("http://{addr}"),
    })
    .unwrap();
    (client, handle)
}

fn chat_ids(chats: &[rss_robot::feishu::ChatGroup]) -> Vec<&str> {
    chats.iter().map(|c| c.chat_id.as_str()).collect()
}

#[actix_web::test]
async fn test_list_chats_follows_pages_and_reuses_token() {
    let stub = web::Data::new(OpenApiStub::expiring_in(7200));
    let (client, handle) = start_stub(stub.clone());

    let first = client.list_chats().await.unwrap();
    let second = client.list_chats().await.unwrap();

    assert_eq!(chat_ids(&first), vec!["oc_1", "oc_2", "oc_3"]);
    assert_eq!(first, second);
    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 1);
    assert_eq!(stub.list_requests.load(Ordering::SeqCst), 4);

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_token_refreshed_inside_expiry_margin() {
    // Valid for less than the refresh margin, so never reused
    let stub = web::Data::new(OpenApiStub::expiring_in(30));
    let (client, handle) = start_stub(stub.clone());

    client.list_chats().await.unwrap();
    client.send(&TextMessage::new("oc_1", "hello")).await.unwrap();

    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 2);
    handle.stop(false).await;
}

#[actix_web::test]
async fn test_concurrent_callers_share_one_token() {
    let stub = web::Data::new(OpenApiStub::expiring_in(7200));
    let (client, handle) = start_stub(stub.clone());

    let (a, b) = tokio::join!(client.list_chats(), client.list_chats());

    assert_eq!(a.unwrap().len(), 3);
    assert_eq!(b.unwrap().len(), 3);
    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 1);
    handle.stop(false).await;
}

#[actix_web::test]
async fn test_send_posts_text_message_and_maps_api_errors() {
    let stub = web::Data::new(OpenApiStub::expiring_in(7200));
    let (client, handle) = start_stub(stub.clone());

    client
        .send(&TextMessage::new("oc_1", "Example: v2 published!"))
        .await
        .unwrap();
    let rejected = client.send(&TextMessage::new("oc_gone", "hello")).await;

    assert!(matches!(rejected, Err(AppError::Feishu { code: 230002, .. })));
    let sent = stub.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![json!({
            "chat_id": "oc_1",
            "msg_type": "text",
            "content": {"text": "Example: v2 published!"}
        })]
    );
    handle.stop(false).await;
}
