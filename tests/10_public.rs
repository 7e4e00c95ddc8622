mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn empty_catalog_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/drinks")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 404);
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn public_listing_uses_summary_view() -> Result<()> {
    let server = common::spawn_server().await?;
    let first = server.seed("Mocha").await;
    let second = server.seed("Espresso").await;

    let res = server.client.get(server.url("/drinks")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    let drinks = body["drinks"].as_array().expect("drinks array");
    assert_eq!(drinks.len(), 2);
    assert_eq!(drinks[0]["id"], first);
    assert_eq!(drinks[1]["id"], second);

    for drink in drinks {
        for ingredient in drink["recipe"].as_array().expect("recipe array") {
            assert!(ingredient.get("name").is_none(), "summary leaked a name: {}", drink);
            assert!(ingredient.get("color").is_some());
            assert!(ingredient.get("parts").is_some());
        }
    }
    Ok(())
}

#[tokio::test]
async fn unknown_routes_use_error_shape() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/coffee")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 404);
    Ok(())
}

#[tokio::test]
async fn unserved_methods_use_error_shape() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.put(server.url("/drinks")).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 405);
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_drink_methods() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/drinks"))
        .header("Origin", "http://localhost:8100")
        .header("Access-Control-Request-Method", "PATCH")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await?;
    assert!(res.status().is_success());

    let methods = res
        .headers()
        .get("access-control-allow-methods")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_uppercase();
    for method in ["GET", "POST", "DELETE", "PATCH"] {
        assert!(methods.contains(method), "missing {} in {}", method, methods);
    }

    let headers = res
        .headers()
        .get("access-control-allow-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(headers.contains("authorization"));
    assert!(headers.contains("content-type"));
    Ok(())
}
