use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use ndarray::{arr1, arr2};
use serde_json::{json, Value};

use iris_backend::routes;
use iris_backend::{save_artifact, LogisticModel, ModelState};

const FIELDS: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

fn sample_model() -> LogisticModel {
    LogisticModel::new(
        vec![0, 1, 2],
        arr2(&[
            [0.0, 0.0, -2.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
        ]),
        arr1(&[5.0, 0.0, -10.0]),
    )
    .unwrap()
}

fn loaded() -> ModelState {
    ModelState::Loaded(sample_model())
}

fn unloaded() -> ModelState {
    ModelState::Unavailable {
        reason: "no artifact".to_string(),
    }
}

fn setosa() -> Value {
    json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    })
}

macro_rules! service {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure)
                .default_service(web::route().to(routes::not_found)),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_loaded_model() {
    let app = service!(loaded());
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "healthy", "model_loaded": true}));
}

#[actix_web::test]
async fn health_is_ok_without_model() {
    let app = service!(unloaded());
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "healthy", "model_loaded": false}));
}

#[actix_web::test]
async fn health_reflects_missing_and_corrupt_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "definitely not a model").unwrap();

    for path in [dir.path().join("missing.json"), corrupt] {
        let app = service!(ModelState::load(&path));
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["model_loaded"], false);
    }
}

#[actix_web::test]
async fn predict_setosa_example() {
    let app = service!(loaded());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(setosa())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"prediction": 0, "model_version": "1.0.0"}));
}

#[actix_web::test]
async fn predict_uses_model_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    save_artifact(&sample_model(), &path).unwrap();

    let app = service!(ModelState::load(&path));
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({
            "sepal_length": 6.3,
            "sepal_width": 3.3,
            "petal_length": 6.0,
            "petal_width": 2.5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["prediction"], 2);
    assert_eq!(body["model_version"], "1.0.0");
}

#[actix_web::test]
async fn zero_or_negative_fields_are_422() {
    let app = service!(loaded());
    for field in FIELDS {
        for bad in [json!(0), json!(0.0), json!(-2.5)] {
            let mut body = setosa();
            body[field] = bad.clone();
            let req = test::TestRequest::post()
                .uri("/predict")
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(
                resp.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "{} = {}",
                field,
                bad
            );
            let detail: Value = test::read_body_json(resp).await;
            assert_eq!(detail["detail"][0]["loc"], json!(["body", field]));
            assert_eq!(detail["detail"][0]["type"], "greater_than");
        }
    }
}

#[actix_web::test]
async fn missing_fields_are_422() {
    let app = service!(loaded());
    for field in FIELDS {
        let mut body = setosa();
        body.as_object_mut().unwrap().remove(field);
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail: Value = test::read_body_json(resp).await;
        assert_eq!(detail["detail"][0]["loc"], json!(["body", field]));
        assert_eq!(detail["detail"][0]["type"], "missing");
    }
}

#[actix_web::test]
async fn all_failing_fields_are_listed() {
    let app = service!(loaded());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({"sepal_length": -1.0, "petal_width": 0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail: Value = test::read_body_json(resp).await;
    assert_eq!(detail["detail"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn non_numeric_value_is_422() {
    let app = service!(loaded());
    let mut body = setosa();
    body["sepal_width"] = json!("wide");
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail: Value = test::read_body_json(resp).await;
    assert_eq!(detail["detail"][0]["loc"], json!(["body"]));
}

#[actix_web::test]
async fn huge_positive_values_still_predict() {
    let app = service!(loaded());
    for value in [json!(1e308), json!(f64::MAX)] {
        let body = json!({
            "sepal_length": value,
            "sepal_width": value,
            "petal_length": value,
            "petal_width": value
        });
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", value);
        let body: Value = test::read_body_json(resp).await;
        let label = body["prediction"].as_i64().unwrap();
        assert!((0..=2).contains(&label));
        assert_eq!(body["model_version"], "1.0.0");
    }
}

#[actix_web::test]
async fn non_json_content_type_is_422() {
    let app = service!(loaded());
    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", "text/plain"))
        .set_payload(setosa().to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail: Value = test::read_body_json(resp).await;
    assert_eq!(detail["detail"][0]["loc"], json!(["body"]));
}

#[actix_web::test]
async fn predict_without_model_is_503() {
    let app = service!(unloaded());
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(setosa())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"detail": "Model not loaded"}));
}

#[actix_web::test]
async fn validation_runs_before_readiness_check() {
    let app = service!(unloaded());
    let mut body = setosa();
    body["petal_length"] = json!(0);
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn model_info_describes_loaded_model() {
    let app = service!(loaded());
    let req = test::TestRequest::get().uri("/model-info").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["feature_names"], json!(FIELDS));
    assert_eq!(body["classes"], json!([0, 1, 2]));
    assert_eq!(body["format_version"], 1);
}

#[actix_web::test]
async fn model_info_without_model_is_503() {
    let app = service!(unloaded());
    let req = test::TestRequest::get().uri("/model-info").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn unknown_route_is_json_404() {
    let app = service!(loaded());
    let req = test::TestRequest::get().uri("/predictions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"detail": "Not Found"}));
}
