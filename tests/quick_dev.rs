use anyhow::Result;
use serde_json::json;

// Smoke run against a live server: `cargo test -- --ignored quick_dev`.
#[tokio::test]
#[ignore]
async fn quick_dev() -> Result<()> {
    let hc = httpc_test::new_client("http://localhost:8080/api")?;

    hc.do_post(
        "/auth/register",
        json!({
          "name": "John Doe",
          "email": "testee@gmal.com",
          "password": "123456",
        }),
    )
    .await?
    .print()
    .await?;

    // Sets the `token` cookie used by the requests below.
    hc.do_post(
        "/auth/login",
        json!({
          "email": "testee@gmal.com",
          "password": "123456",
        }),
    )
    .await?
    .print()
    .await?;

    hc.do_get("/users/me").await?.print().await?;

    hc.do_post("/posts", json!({ "text": "Let's create a cold wallet of Bitcoin" }))
        .await?
        .print()
        .await?;

    hc.do_post("/posts", json!({ "text": "" }))
        .await?
        .print()
        .await?;

    hc.do_get("/posts").await?.print().await?;

    hc.do_post(
        "/profile",
        json!({ "status": "Developer", "skills": "rust, postgres" }),
    )
    .await?
    .print()
    .await?;

    hc.do_put(
        "/profile/experience",
        json!({ "title": "Backend Engineer", "company": "Acme", "from": "2021-03-01" }),
    )
    .await?
    .print()
    .await?;

    hc.do_get("/profile/me").await?.print().await?;

    Ok(())
}
