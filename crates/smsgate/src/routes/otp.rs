//! OTP issuance and verification endpoints.

use axum::{extract::State, http::StatusCode, Json};
use otp_engine::OtpError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendOtpRequest {
    phone: Option<String>,
}

/// Issue a fresh OTP and hand it to the SMS provider.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(phone) = payload.phone else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing 'phone' in request"})),
        );
    };

    match state.service.request_code(&phone).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(json!({
                "status": "sent",
                "provider_response": receipt.provider_response,
            })),
        ),
        Err(err) => error_response(err),
    }
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    phone: Option<String>,
    code: Option<String>,
}

/// Check a candidate code against the live record.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(phone), Some(code)) = (payload.phone, payload.code) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing 'phone' or 'code'"})),
        );
    };

    match state.service.check_code(&phone, &code).await {
        Ok(()) => (StatusCode::OK, Json(json!({"valid": true}))),
        // The verify path reports "valid"/"reason" rather than the generic
        // error shape, distinguishing a missing record from a wrong code.
        Err(err @ (OtpError::NoActiveCode | OtpError::WrongCode)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"valid": false, "reason": err.to_string()})),
        ),
        Err(err) => error_response(err),
    }
}

/// Map the engine taxonomy onto the wire shapes.
fn error_response(err: OtpError) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match &err {
        OtpError::RateLimited(reason) => json!({
            "error": "rate limited",
            "reason": reason.to_string(),
        }),
        OtpError::Provider(details) => json!({
            "error": "SMS provider error",
            "details": details,
        }),
        OtpError::InvalidRequest(msg) => json!({"error": msg}),
        // NoActiveCode / WrongCode are handled by the verify route; if one
        // escapes here, fall back to the generic shape.
        other => json!({"error": other.to_string()}),
    };
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{header, Request};
    use otp_engine::{SmsError, SmsSender};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    struct MockSms {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SmsSender for MockSms {
        async fn send(&self, _phone: &str, message: &str) -> Result<Value, SmsError> {
            self.sent.lock().await.push(message.to_string());
            if self.fail {
                Err(SmsError::Provider("kaboom".into()))
            } else {
                Ok(json!({"return": true}))
            }
        }
    }

    fn test_app(fail: bool) -> (axum::Router, Arc<MockSms>) {
        let sms = Arc::new(MockSms {
            sent: Mutex::new(Vec::new()),
            fail,
        });
        let config = AppConfig {
            api_key: "test-key".into(),
            ..Default::default()
        };
        let state = crate::state::AppState::new(config, sms.clone());
        (crate::routes::create_router(state), sms)
    }

    async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn last_code(sms: &MockSms) -> String {
        let sent = sms.sent.lock().await;
        sent.last()
            .unwrap()
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn send_then_verify_roundtrip() {
        let (app, sms) = test_app(false);

        let (status, body) =
            post_json(&app, "/send-otp", json!({"phone": "9876543210"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "sent");
        assert_eq!(body["provider_response"]["return"], true);

        let code = last_code(&sms).await;
        let (status, body) = post_json(
            &app,
            "/verify-otp",
            json!({"phone": "+919876543210", "code": code}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    async fn missing_phone_is_bad_request() {
        let (app, _) = test_app(false);
        let (status, body) = post_json(&app, "/send-otp", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("phone"));
    }

    #[tokio::test]
    async fn immediate_retry_is_rate_limited() {
        let (app, _) = test_app(false);

        let (status, _) = post_json(&app, "/send-otp", json!({"phone": "9876543210"})).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json(&app, "/send-otp", json!({"phone": "9876543210"})).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "rate limited");
        assert!(body["reason"].as_str().unwrap().contains("wait"));
    }

    #[tokio::test]
    async fn provider_failure_maps_to_502_and_rolls_back() {
        let (app, sms) = test_app(true);

        let (status, body) =
            post_json(&app, "/send-otp", json!({"phone": "9876543210"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "SMS provider error");

        // The code that failed to send must not verify.
        let code = last_code(&sms).await;
        let (status, body) = post_json(
            &app,
            "/verify-otp",
            json!({"phone": "9876543210", "code": code}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
    }

    #[tokio::test]
    async fn wrong_code_reports_reason() {
        let (app, sms) = test_app(false);

        post_json(&app, "/send-otp", json!({"phone": "9876543210"})).await;
        let code = last_code(&sms).await;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let (status, body) = post_json(
            &app,
            "/verify-otp",
            json!({"phone": "9876543210", "code": wrong}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
        assert_eq!(body["reason"], "invalid OTP");
    }

    #[tokio::test]
    async fn verify_without_issuance_reports_no_active_code() {
        let (app, _) = test_app(false);
        let (status, body) = post_json(
            &app,
            "/verify-otp",
            json!({"phone": "9876543210", "code": "123456"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
        assert_eq!(body["reason"], "no OTP requested or OTP expired");
    }

    #[tokio::test]
    async fn missing_code_is_bad_request() {
        let (app, _) = test_app(false);
        let (status, body) =
            post_json(&app, "/verify-otp", json!({"phone": "9876543210"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("code"));
    }
}
