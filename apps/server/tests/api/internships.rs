//! Internship CRUD over HTTP
//!
//! - create requires an existing company (403 otherwise, nothing stored)
//! - list honours filters, `select`, `sort` and paging
//! - update is a field merge; repeating it changes nothing
//! - delete removes the record; later reads are 404

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::support::{assert_failure, assert_status, data_ids, internship, TestApp, API};

#[tokio::test]
async fn create_under_unknown_company_is_forbidden() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app
        .authed(
            Method::POST,
            &format!("{API}/internships"),
            Some(json!({"companyName": "Nowhere Ltd", "internship": internship("J-1", "Backend")})),
        )
        .await?;

    assert_status(status, StatusCode::FORBIDDEN, "create");
    assert_failure(&body, "Company doesn't exist");

    let (_, list) = app.get(&format!("{API}/internships")).await?;
    assert_eq!(list["count"], json!(0));
    Ok(())
}

#[tokio::test]
async fn create_then_read_back() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;

    let id = app
        .create_internship(
            "Acme",
            json!({"jobId": "J-7", "title": "Data intern", "minSalary": 55, "skills": ["sql"]}),
        )
        .await?;

    let (status, body) = app.get(&format!("{API}/internships/{id}")).await?;
    assert_status(status, StatusCode::OK, "read");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["title"], json!("Data intern"));
    assert_eq!(body["data"]["minSalary"], json!(55.0));
    assert!(body.get("count").is_none());
    Ok(())
}

#[tokio::test]
async fn create_geocodes_location_when_no_position_given() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    let id = app
        .create_internship(
            "Acme",
            json!({"jobId": "J-1", "title": "Backend", "location": "Jerusalem"}),
        )
        .await?;

    let (_, body) = app.get(&format!("{API}/internships/{id}")).await?;
    assert_eq!(
        body["data"]["geoPosition"],
        json!({"type": "Point", "coordinates": [35.2137, 31.7683]})
    );
    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_payload() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;

    let (status, body) = app
        .authed(
            Method::POST,
            &format!("{API}/internships"),
            Some(json!({"companyName": "Acme", "internship": {"jobId": "J-1", "title": ""}})),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "empty title");
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn salary_filter_defaults_to_minimum() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    app.create_internship("Acme", json!({"jobId": "A", "title": "Low", "minSalary": 30}))
        .await?;
    let high = app
        .create_internship("Acme", json!({"jobId": "B", "title": "High", "minSalary": 70}))
        .await?;
    app.create_internship("Acme", internship("C", "Unpaid")).await?;

    let (status, body) = app.get(&format!("{API}/internships?minSalary=50")).await?;
    assert_status(status, StatusCode::OK, "filter");
    assert_eq!(data_ids(&body), [high]);
    assert_eq!(body["count"], json!(1));
    Ok(())
}

#[tokio::test]
async fn explicit_operators_and_unknown_operator() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    let low = app
        .create_internship("Acme", json!({"jobId": "A", "title": "Low", "minSalary": 30}))
        .await?;
    app.create_internship("Acme", json!({"jobId": "B", "title": "High", "minSalary": 70}))
        .await?;

    let (_, body) = app
        .get(&format!("{API}/internships?minSalary%5Blt%5D=50"))
        .await?;
    assert_eq!(data_ids(&body), [low]);

    let (status, body) = app
        .get(&format!("{API}/internships?minSalary%5Blike%5D=5"))
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "unknown operator");
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn select_sort_and_paging() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    for (job, title) in [("1", "Charlie"), ("2", "Alpha"), ("3", "Bravo")] {
        app.create_internship("Acme", internship(job, title)).await?;
    }

    let (status, body) = app
        .get(&format!("{API}/internships?select=title&sort=title&limit=2&page=1"))
        .await?;
    assert_status(status, StatusCode::OK, "page 1");
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].clone())
        .collect();
    assert_eq!(titles, [json!("Alpha"), json!("Bravo")]);
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["pagination"]["total"], json!(3));
    assert_eq!(body["pagination"]["next"], json!({"page": 2, "limit": 2}));
    assert!(body["pagination"].get("prev").is_none());

    // Projection keeps only the selected field plus the id.
    let first = &body["data"][0];
    assert!(first.get("id").is_some());
    assert!(first.get("jobId").is_none());

    let (_, body) = app
        .get(&format!("{API}/internships?sort=-title&limit=2&page=2"))
        .await?;
    assert_eq!(body["data"][0]["title"], json!("Alpha"));
    assert_eq!(body["pagination"]["prev"], json!({"page": 1, "limit": 2}));
    Ok(())
}

#[tokio::test]
async fn update_is_idempotent() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    let id = app.create_internship("Acme", internship("J-1", "Backend")).await?;
    let patch = json!({"title": "Platform", "remote": true});

    let (status, first) = app
        .authed(Method::PUT, &format!("{API}/internships/{id}"), Some(patch.clone()))
        .await?;
    assert_status(status, StatusCode::OK, "first update");
    let (status, second) = app
        .authed(Method::PUT, &format!("{API}/internships/{id}"), Some(patch))
        .await?;
    assert_status(status, StatusCode::OK, "second update");

    assert_eq!(first["data"], second["data"]);
    assert_eq!(second["data"]["title"], json!("Platform"));
    assert_eq!(second["data"]["jobId"], json!("J-1"));
    Ok(())
}

#[tokio::test]
async fn update_cannot_change_id() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    let id = app.create_internship("Acme", internship("J-1", "Backend")).await?;

    let (status, body) = app
        .authed(
            Method::PUT,
            &format!("{API}/internships/{id}"),
            Some(json!({"id": "00000000-0000-0000-0000-000000000000", "title": "Renamed"})),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "patch id");
    assert_failure(&body, "Validation error: Field 'id' cannot be modified");

    let (_, body) = app.get(&format!("{API}/internships/{id}")).await?;
    assert_eq!(body["data"]["title"], json!("Backend"));
    Ok(())
}

#[tokio::test]
async fn delete_then_read_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.create_company("Acme").await?;
    let id = app.create_internship("Acme", internship("J-1", "Backend")).await?;

    let (status, body) = app
        .authed(Method::DELETE, &format!("{API}/internships/{id}"), None)
        .await?;
    assert_status(status, StatusCode::OK, "delete");
    assert_eq!(body, json!({"success": true, "data": {}}));

    let (status, body) = app.get(&format!("{API}/internships/{id}")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "read after delete");
    assert_failure(&body, &format!("internship id {id} doesn't exist"));

    let (status, _) = app
        .authed(Method::DELETE, &format!("{API}/internships/{id}"), None)
        .await?;
    assert_status(status, StatusCode::NOT_FOUND, "second delete");
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get(&format!("{API}/internships/not-a-uuid")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "malformed id");
    assert_failure(&body, "internship id not-a-uuid doesn't exist");
    Ok(())
}

#[tokio::test]
async fn undecodable_path_segment_uses_failure_envelope() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get(&format!("{API}/internships/%FF")).await?;
    assert_status(status, StatusCode::BAD_REQUEST, "invalid utf-8 id");
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some_and(|e| e.starts_with("Invalid query:")));

    let (status, body) = app
        .authed(Method::GET, &format!("{API}/internships/radius/%FF/10/km"), None)
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "invalid utf-8 address");
    assert_eq!(body["success"], json!(false));
    Ok(())
}
