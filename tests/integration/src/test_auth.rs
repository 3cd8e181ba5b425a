//! Outcome-to-status integration tests.

#[cfg(test)]
mod tests {
    use keysig_http::AuthHttpConfig;
    use keysig_http::response::REQUEST_ID_HEADER;

    use crate::{GOOD_SIGNATURE, KEY_ID, base_url, spawn_server};

    #[tokio::test]
    async fn test_should_authenticate_json_body() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/whoami", base_url(addr)))
            .json(&serde_json::json!({ "id": KEY_ID, "signature": GOOD_SIGNATURE }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["principal"], KEY_ID);
        assert_eq!(body["scope"], "read");
    }

    #[tokio::test]
    async fn test_should_authenticate_form_body() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/whoami", base_url(addr)))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(format!("id={KEY_ID}&signature={GOOD_SIGNATURE}"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["principal"], KEY_ID);
    }

    #[tokio::test]
    async fn test_should_return_400_for_missing_credentials() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/whoami", base_url(addr)))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Missing credentials");
    }

    #[tokio::test]
    async fn test_should_return_400_for_missing_principal_field() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/whoami", base_url(addr)))
            .json(&serde_json::json!({ "signature": GOOD_SIGNATURE }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Missing id");
    }

    #[tokio::test]
    async fn test_should_return_401_for_wrong_signature() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/whoami", base_url(addr)))
            .json(&serde_json::json!({ "id": KEY_ID, "signature": "forged" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[reqwest::header::WWW_AUTHENTICATE],
            "publicKey"
        );
    }

    #[tokio::test]
    async fn test_should_return_401_for_unknown_key() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/whoami", base_url(addr)))
            .json(&serde_json::json!({ "id": "9999", "signature": GOOD_SIGNATURE }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_should_issue_distinct_request_ids() {
        let addr = spawn_server(AuthHttpConfig::default()).await.unwrap();
        let client = reqwest::Client::new();

        let mut ids = Vec::new();
        for _ in 0..2 {
            let response = client
                .post(format!("{}/whoami", base_url(addr)))
                .send()
                .await
                .unwrap();
            ids.push(response.headers()[REQUEST_ID_HEADER].clone());
        }
        assert_ne!(ids[0], ids[1]);
    }
}
