use internhub::{db::CompanyStore, geo::EarthRadius, models::GeoPoint, Error};
use uuid::Uuid;

use crate::support::*;

fn radians(km: f64) -> f64 {
    km / EarthRadius::default().kilometers
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn owner_lookup_finds_embedded_internship() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let memory = seeded(&db).await?;

    let acme = db.store.find_by_name("Acme").await?.expect("seeded");
    let hill = acme
        .internships
        .iter()
        .find(|i| i.title == "Hill")
        .expect("seeded")
        .clone();

    let found = db.store.find_owner(hill.id).await?.expect("owner");
    assert_eq!(found.company.id, acme.id);
    assert_eq!(found.internship, hill);
    assert_eq!(memory.find_owner(hill.id).await?.map(|r| r.company.id), Some(acme.id));

    assert!(db.store.find_owner(Uuid::new_v4()).await?.is_none());

    db.cleanup().await
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn stale_save_is_a_conflict() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    seeded(&db).await?;

    let original = db.store.find_by_name("Acme").await?.expect("seeded");
    let mut first = original.clone();
    first.description = Some("first".to_string());
    let saved = db.store.save(first).await?;
    assert_eq!(saved.revision, original.revision + 1);

    let mut second = original;
    second.description = Some("second".to_string());
    assert!(matches!(db.store.save(second).await, Err(Error::Conflict(_))));

    let stored = db.store.get(saved.id).await?.expect("stored");
    assert_eq!(stored.description.as_deref(), Some("first"));

    assert!(matches!(
        db.store.save(company("Initech")).await,
        Err(Error::NotFound(_))
    ));

    db.cleanup().await
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_company_name_is_a_conflict() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    seeded(&db).await?;

    assert!(matches!(
        db.store.insert(company("Acme")).await,
        Err(Error::Conflict(_))
    ));

    db.cleanup().await
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn filters_agree_with_memory_store() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let memory = seeded(&db).await?;

    let cases: &[(&[(&str, &str)], &[&str])] = &[
        (&[("minSalary", "50"), ("sort", "title")], &["Hill"]),
        (&[("minSalary[gte]", "40"), ("sort", "title")], &["Hill", "Port"]),
        // a missing field satisfies `ne`
        (&[("minSalary[ne]", "40"), ("sort", "title")], &["Hill", "Unpaid"]),
        (&[("remote[ne]", "true"), ("sort", "title")], &["Port", "Unpaid"]),
        (&[("companyName", "Globex"), ("sort", "title")], &["Unpaid"]),
    ];

    for (pairs, expected) in cases {
        let spec = internship_spec(pairs);
        let from_pg = titles(&db.store, &spec).await?;
        let from_memory = titles(&memory, &spec).await?;
        assert_eq!(from_pg, *expected, "postgres: {pairs:?}");
        assert_eq!(from_pg, from_memory, "backends disagree: {pairs:?}");
    }

    let spec = internship_spec(&[("minSalary[ne]", "40")]);
    assert_eq!(db.store.query_internships(&spec).await?.total, 2);

    db.cleanup().await
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn radius_matches_agree_with_memory_store() -> anyhow::Result<()> {
    let db = TestDb::new().await?;
    let memory = seeded(&db).await?;
    let center = GeoPoint::new(TEL_AVIV.0, TEL_AVIV.1);

    let near = internship_spec(&[("sort", "title")]).within_sphere(
        "geoPosition",
        center,
        radians(10.0),
    );
    assert_eq!(titles(&db.store, &near).await?, ["Port"]);
    assert_eq!(titles(&memory, &near).await?, ["Port"]);

    let wide = internship_spec(&[("sort", "title")]).within_sphere(
        "geoPosition",
        center,
        radians(100.0),
    );
    assert_eq!(titles(&db.store, &wide).await?, ["Hill", "Port"]);
    assert_eq!(titles(&memory, &wide).await?, ["Hill", "Port"]);

    db.cleanup().await
}
