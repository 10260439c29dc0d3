//! No-lost-updates properties for the cook and add-product operations.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cookbook::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = cookbook::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    cookbook::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create_ingredient(app: &Router, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/ingredients")
                .header("Content-Type", "application/json")
                .body(Body::from(format!(r#"{{"name": "{}"}}"#, name)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_recipe(app: &Router, name: &str, entries: &[(i64, i32)]) -> i64 {
    let ingredients: Vec<serde_json::Value> = entries
        .iter()
        .map(|(id, weight)| serde_json::json!({ "id": id, "weight": weight }))
        .collect();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recipes")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_string(
                        &serde_json::json!({ "name": name, "ingredients": ingredients }),
                    )
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn ingredient_amount(app: &Router, id: i64) -> i64 {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/ingredients/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    body_json(response).await["data"]["amount"].as_i64().unwrap()
}

#[tokio::test]
async fn concurrent_cooks_never_lose_increments() {
    const COOKS: usize = 16;

    let app = spawn_app().await;

    let salt = create_ingredient(&app, "Salt").await;
    let water = create_ingredient(&app, "Water").await;
    let soup = create_recipe(&app, "Soup", &[(salt, 5), (water, 500)]).await;

    // Both recipes share the salt ingredient, so its counter sees the
    // combined load.
    let brine = create_recipe(&app, "Brine", &[(salt, 30)]).await;

    let mut requests = Vec::with_capacity(COOKS * 2);
    for _ in 0..COOKS {
        for recipe_id in [soup, brine] {
            let app = app.clone();
            requests.push(async move {
                app.oneshot(
                    Request::builder()
                        .uri(format!("/api/cook_recipe?recipe_id={}", recipe_id))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap()
            });
        }
    }

    let responses = futures::future::join_all(requests).await;
    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(ingredient_amount(&app, salt).await, (COOKS * 2) as i64);
    assert_eq!(ingredient_amount(&app, water).await, COOKS as i64);
}

#[tokio::test]
async fn concurrent_add_product_keeps_one_association() {
    const ATTEMPTS: usize = 8;

    let app = spawn_app().await;

    let salt = create_ingredient(&app, "Salt").await;
    let pepper = create_ingredient(&app, "Pepper").await;
    let stew = create_recipe(&app, "Stew", &[(salt, 5)]).await;

    let mut requests = Vec::with_capacity(ATTEMPTS);
    for i in 0..ATTEMPTS {
        let app = app.clone();
        let weight = 10 + (i as i32 % 3);
        requests.push(async move {
            app.oneshot(
                Request::builder()
                    .uri(format!(
                        "/api/add_product_to_recipe?recipe_id={}&product_id={}&weight={}",
                        stew, pepper, weight
                    ))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        });
    }

    // Every request must succeed; none may trip the uniqueness constraint.
    let responses = futures::future::join_all(requests).await;
    for response in responses {
        assert!(
            response.status() == StatusCode::OK || response.status() == StatusCode::CREATED,
            "unexpected status"
        );
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/recipes/{}", stew))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    let pepper_rows: Vec<&serde_json::Value> = json["data"]["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["name"] == "Pepper")
        .collect();
    assert_eq!(pepper_rows.len(), 1);
}
