//! Company CRUD over HTTP

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::support::{assert_failure, assert_status, data_ids, internship, TestApp, API};

#[tokio::test]
async fn create_and_list_companies() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let acme = app.create_company("Acme").await?;
    let globex = app.create_company("Globex").await?;

    let (status, body) = app.get(&format!("{API}/companies?sort=companyName")).await?;
    assert_status(status, StatusCode::OK, "list");
    assert_eq!(data_ids(&body), [acme, globex]);
    assert_eq!(body["count"], json!(2));
    Ok(())
}

#[tokio::test]
async fn duplicate_company_name_conflicts() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;

    let (status, body) = app
        .authed(
            Method::POST,
            &format!("{API}/companies"),
            Some(json!({"companyName": "Acme"})),
        )
        .await?;
    assert_status(status, StatusCode::CONFLICT, "duplicate");
    assert_failure(&body, "Conflict: Company name 'Acme' is already taken");
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_rejected() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .authed(
            Method::POST,
            &format!("{API}/companies"),
            Some(json!({"companyName": "Acme", "slogan": "We make things"})),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "unknown field");
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn company_read_embeds_internships() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.create_company("Acme").await?;
    let internship_id = app.create_internship("Acme", internship("J-1", "Backend")).await?;

    let (status, body) = app.get(&format!("{API}/companies/{id}")).await?;
    assert_status(status, StatusCode::OK, "read");
    assert_eq!(body["data"]["internships"][0]["id"], json!(internship_id));
    Ok(())
}

#[tokio::test]
async fn update_company_fields() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.create_company("Acme").await?;

    let (status, body) = app
        .authed(
            Method::PUT,
            &format!("{API}/companies/{id}"),
            Some(json!({"website": "https://acme.example"})),
        )
        .await?;
    assert_status(status, StatusCode::OK, "update");
    assert_eq!(body["data"]["website"], json!("https://acme.example"));
    assert_eq!(body["data"]["companyName"], json!("Acme"));
    Ok(())
}

#[tokio::test]
async fn deleting_company_removes_its_internships() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.create_company("Acme").await?;
    let internship_id = app.create_internship("Acme", internship("J-1", "Backend")).await?;

    let (status, _) = app
        .authed(Method::DELETE, &format!("{API}/companies/{id}"), None)
        .await?;
    assert_status(status, StatusCode::OK, "delete");

    let (status, body) = app.get(&format!("{API}/companies/{id}")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "company after delete");
    assert_failure(&body, &format!("company id {id} doesn't exist"));

    let (status, _) = app.get(&format!("{API}/internships/{internship_id}")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "internship after delete");
    Ok(())
}

#[tokio::test]
async fn undecodable_company_id_uses_failure_envelope() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get(&format!("{API}/companies/%C3%28")).await?;
    assert_status(status, StatusCode::BAD_REQUEST, "invalid utf-8 id");
    assert_eq!(body["success"], json!(false));
    Ok(())
}
