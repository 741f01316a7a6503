use crate::support::{chat_body, completion_json, init_body, spawn_gateway, LLM_KEY, TEST_MODEL};
use serde_json::Value;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn chat_turn_returns_reply() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let gw = spawn_gateway(&llm.uri(), &speech.uri()).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {LLM_KEY}").as_str()))
        .and(body_partial_json(serde_json::json!({"model": TEST_MODEL})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("Los números reales incluyen racionales e irracionales.")))
        .mount(&llm)
        .await;

    let init = gw
        .client
        .post(gw.url("/init_session"))
        .json(&init_body("sess-1", "newton", "Fundamentos Algebraicos"))
        .send()
        .await
        .unwrap();
    assert_eq!(init.status(), 200);
    let init_json: Value = init.json().await.unwrap();
    assert_eq!(init_json["status"], "ok");
    assert!(init_json["welcome"].as_str().unwrap().len() > 0);

    let response = gw
        .client
        .post(gw.url("/chat"))
        .json(&chat_body("sess-1", "newton", "¿Qué son los números reales?"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["reply"],
        "Los números reales incluyen racionales e irracionales."
    );
}

#[tokio::test]
async fn chat_sends_system_prompt_and_accumulated_history() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let gw = spawn_gateway(&llm.uri(), &speech.uri()).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("ok")))
        .mount(&llm)
        .await;

    gw.client
        .post(gw.url("/init_session"))
        .json(&init_body("sess-2", "newton", "Modelación Lineal"))
        .send()
        .await
        .unwrap();

    for message in ["primera pregunta", "segunda pregunta"] {
        let response = gw
            .client
            .post(gw.url("/chat"))
            .json(&chat_body("sess-2", "newton", message))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let requests = llm.received_requests().await.unwrap();
    let chat_requests: Vec<Value> = requests
        .iter()
        .filter(|r| r.url.path().ends_with("/chat/completions"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(chat_requests.len(), 2);

    // First turn: system + user
    let first = chat_requests[0]["messages"].as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["role"], "system");
    let system_prompt = first[0]["content"].as_str().unwrap();
    assert!(system_prompt.contains("Isaac Newton"));
    assert!(system_prompt.contains("Lucía"));

    // Second turn: system + user + assistant + user
    let second = chat_requests[1]["messages"].as_array().unwrap();
    assert_eq!(second.len(), 4);
    assert_eq!(second[2]["role"], "assistant");
    assert_eq!(second[3]["content"], "segunda pregunta");
}

#[tokio::test]
async fn chat_without_init_creates_session_transparently() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let gw = spawn_gateway(&llm.uri(), &speech.uri()).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("bienvenida")))
        .mount(&llm)
        .await;

    let response = gw
        .client
        .post(gw.url("/chat"))
        .json(&chat_body("never-initialized", "raava", "hola"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn provider_failure_returns_502_and_keeps_user_turn() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let gw = spawn_gateway(&llm.uri(), &speech.uri()).await;

    // First completion attempt fails, the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("ahora sí")))
        .mount(&llm)
        .await;

    gw.client
        .post(gw.url("/init_session"))
        .json(&init_body("sess-3", "einstein", "Probabilidad"))
        .send()
        .await
        .unwrap();

    let failed = gw
        .client
        .post(gw.url("/chat"))
        .json(&chat_body("sess-3", "einstein", "pregunta perdida?"))
        .send()
        .await
        .unwrap();
    assert_eq!(failed.status(), 502);
    let body: Value = failed.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().len() > 0);

    let retried = gw
        .client
        .post(gw.url("/chat"))
        .json(&chat_body("sess-3", "einstein", "segundo intento"))
        .send()
        .await
        .unwrap();
    assert_eq!(retried.status(), 200);

    // The failed turn's user message is still in the history of the retry.
    let requests = llm.received_requests().await.unwrap();
    let last: Value = serde_json::from_slice(&requests.last().unwrap().body).unwrap();
    let contents: Vec<&str> = last["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["content"].as_str())
        .collect();
    assert!(contents.contains(&"pregunta perdida?"));
    assert!(contents.contains(&"segundo intento"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let gw = spawn_gateway(&llm.uri(), &speech.uri()).await;

    let response = gw
        .client
        .post(gw.url("/chat"))
        .json(&chat_body("sess-4", "newton", "   "))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn vendor_error_text_is_not_forwarded_to_client() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let gw = spawn_gateway(&llm.uri(), &speech.uri()).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("invalid api key sk-or-v1-verysecret"),
        )
        .mount(&llm)
        .await;

    let response = gw
        .client
        .post(gw.url("/chat"))
        .json(&chat_body("sess-5", "newton", "hola"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body = response.text().await.unwrap();
    assert!(!body.contains("verysecret"));
    assert!(!body.contains("401"));
}
