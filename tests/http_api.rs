//! End-to-end tests of the HTTP surface against a real listener.

use axum::http::StatusCode;
use lookup_service::config::DependencyConfig;
use lookup_service::http::{ProblemDetail, ServiceResponse, JSON_UTF8, PROBLEM_JSON_UTF8};

mod common;

fn assert_standard_headers(res: &reqwest::Response) {
    let headers = res.headers();
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["pragma"], "no-cache");
    assert_eq!(headers["expires"], "-1");
    assert_eq!(headers["content-language"], "en");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_lookup_success() {
    let service = common::start_service(common::test_config()).await;
    let url = format!("http://{}/42", service.local_addr());

    let res = common::client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], JSON_UTF8);
    assert_standard_headers(&res);

    let body = res.text().await.unwrap();
    assert_eq!(body, r#"{"ID":"42","Message":"Service running!","Status":"OK"}"#);

    service.shutdown().await;
}

#[tokio::test]
async fn test_lookup_id_is_percent_decoded() {
    let service = common::start_service(common::test_config()).await;
    let url = format!("http://{}/order%20%2342", service.local_addr());

    let res = common::client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: ServiceResponse = res.json().await.unwrap();
    assert_eq!(body.id, "order #42");

    service.shutdown().await;
}

#[tokio::test]
async fn test_encoded_reserved_characters_stay_in_the_id() {
    let service = common::start_service(common::test_config()).await;

    for (encoded, id) in [("a%2Fb", "a/b"), ("x%3Fy", "x?y"), ("50%25", "50%")] {
        let url = format!("http://{}/{}", service.local_addr(), encoded);
        let res = common::client().get(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{}", encoded);
        let body: ServiceResponse = res.json().await.unwrap();
        assert_eq!(body.id, id);
    }

    service.shutdown().await;
}

#[tokio::test]
async fn test_probes_return_empty_200() {
    let service = common::start_service(common::test_config()).await;
    let client = common::client();

    for path in ["/live", "/ready"] {
        let url = format!("http://{}{}", service.local_addr(), path);
        for res in [
            client.get(&url).send().await.unwrap(),
            client.post(&url).send().await.unwrap(),
        ] {
            assert_eq!(res.status(), StatusCode::OK, "{}", path);
            assert_eq!(res.headers()["content-type"], JSON_UTF8);
            assert_standard_headers(&res);
            assert!(res.text().await.unwrap().is_empty());
        }
    }

    service.shutdown().await;
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let service = common::start_service(common::test_config()).await;
    let url = format!("http://{}/live", service.local_addr());

    let res = common::client()
        .get(&url)
        .header("x-request-id", "probe-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "probe-123");

    service.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route_still_uncacheable() {
    let service = common::start_service(common::test_config()).await;
    let url = format!("http://{}/a/b", service.local_addr());

    let res = common::client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["cache-control"], "no-cache");

    service.shutdown().await;
}

#[tokio::test]
async fn test_fault_injection_returns_problem_detail() {
    let mut config = common::test_config();
    config.faults.failure_rate = 1.0;
    let service = common::start_service(config).await;
    let url = format!("http://{}/42", service.local_addr());

    let res = common::client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["content-type"], PROBLEM_JSON_UTF8);
    assert_standard_headers(&res);

    let problem: ProblemDetail = res.json().await.unwrap();
    assert_eq!(problem.status, 500);
    assert_eq!(problem.instance, "/42");
    assert!(!problem.title.is_empty());

    // Probes are unaffected by lookup faults.
    let live = format!("http://{}/live", service.local_addr());
    let res = common::client().get(&live).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    service.shutdown().await;
}

#[tokio::test]
async fn test_reachable_dependency_keeps_service_ready() {
    let (_dep, dep_addr) = common::start_dependency().await;
    let mut config = common::test_config();
    config.dependencies.push(DependencyConfig {
        name: "cache".into(),
        address: dep_addr.to_string(),
    });
    let service = common::start_service(config).await;
    let client = common::client();

    let ready = client
        .get(format!("http://{}/ready", service.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);

    let lookup = client
        .get(format!("http://{}/1", service.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(lookup.status(), StatusCode::OK);

    service.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_dependency_fails_readiness_and_lookup() {
    let dead = common::unused_addr().await;
    let mut config = common::test_config();
    config.health_check.timeout_ms = 200;
    config.dependencies.push(DependencyConfig {
        name: "db".into(),
        address: dead.to_string(),
    });
    let service = common::start_service(config).await;
    let client = common::client();

    let ready = client
        .get(format!("http://{}/ready", service.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);

    let live = client
        .get(format!("http://{}/live", service.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(live.status(), StatusCode::OK);

    let lookup = client
        .get(format!("http://{}/9", service.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(lookup.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let problem: ProblemDetail = lookup.json().await.unwrap();
    assert!(problem.detail.contains("'db'"));

    service.shutdown().await;
}
