//! Tests for the gateway client

use super::AllinpayClient;
use crate::crypto::{self, fixtures, KeyStore};
use crate::transport::{Transport, TransportResponse};
use crate::types::{ClientConfig, ParameterSet};
use crate::{AllinpayError, Result};
use async_trait::async_trait;
use mockito::{Matcher, Server};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use std::sync::Mutex;

const METHOD: &str = "allinpay.yunst.memberService.createMember";
const SECRET: &str = "WaHVZNHZYX3v4si1bBTVseIwEMPMcKzz";

fn test_keys() -> KeyStore {
    KeyStore::new(
        RsaPrivateKey::from_pkcs1_pem(fixtures::USER_KEY_PEM).unwrap(),
        crypto::load_public_key(fixtures::GATEWAY_CERT_PEM).unwrap(),
    )
}

fn test_config(service_url: &str) -> ClientConfig {
    ClientConfig::new("10000", "unused.pfx", "123456", "unused.cer")
        .with_app_secret_key(SECRET)
        .with_app_account_id("40000")
        .with_service_url(service_url)
}

fn test_client(service_url: &str) -> AllinpayClient {
    AllinpayClient::with_transport(
        test_config(service_url),
        test_keys(),
        crate::transport::HttpTransport::new(None).unwrap(),
    )
    .unwrap()
}

fn biz_content() -> Value {
    json!({"bizUserId": "rust-test-1", "memberType": 3, "source": 1})
}

/// A response body signed by the gateway key
fn signed_body(fields: Value) -> String {
    let content = crypto::marshal_record(fields.as_object().unwrap()).unwrap();
    let signature = crypto::sign_bytes(content.as_bytes(), &fixtures::gateway_private_key()).unwrap();
    let mut body = fields;
    body["sign"] = json!(signature);
    body.to_string()
}

fn user_public_key() -> rsa::RsaPublicKey {
    crypto::load_public_key(fixtures::USER_CERT_PEM).unwrap()
}

#[test]
fn test_bind_params_fields() {
    let client = test_client("http://localhost/gateway");
    let envelope = client
        .bind_params_at(METHOD, &biz_content(), "2021-08-09 11:19:10")
        .unwrap();

    let params = envelope.params();
    assert_eq!(params.get("appId"), Some("10000"));
    assert_eq!(params.get("method"), Some(METHOD));
    assert_eq!(params.get("charset"), Some("utf-8"));
    assert_eq!(params.get("format"), Some("JSON"));
    assert_eq!(params.get("timestamp"), Some("2021-08-09 11:19:10"));
    assert_eq!(params.get("version"), Some("1.0"));
    assert_eq!(params.get("notifyUrl"), Some(""));
    assert_eq!(
        params.get("bizContent"),
        Some(r#"{"bizUserId":"rust-test-1","memberType":3,"source":1}"#)
    );
    assert!(!params.contains_key("sign"));
    assert!(!params.contains_key("signType"));

    let full = envelope.to_parameter_set();
    assert_eq!(full.get("signType"), Some("SHA256WithRSA"));
    crypto::verify_params(&full, &user_public_key()).unwrap();

    let form = envelope.to_form_body();
    assert!(!form.contains("notifyUrl"));
    assert!(form.contains("timestamp=2021-08-09+11%3A19%3A10"));
    assert!(form.ends_with("&signType=SHA256WithRSA&timestamp=2021-08-09+11%3A19%3A10&version=1.0"));
}

#[test]
fn test_bind_params_signature_is_over_canonical_set() {
    let client = test_client("http://localhost/gateway");
    let envelope = client
        .bind_params_at(METHOD, &biz_content(), "2021-08-09 11:19:10")
        .unwrap();

    let expected: ParameterSet = [
        ("appId", "10000"),
        ("method", METHOD),
        ("charset", "utf-8"),
        ("format", "JSON"),
        ("timestamp", "2021-08-09 11:19:10"),
        ("version", "1.0"),
        (
            "bizContent",
            r#"{"bizUserId":"rust-test-1","memberType":3,"source":1}"#,
        ),
    ]
    .into_iter()
    .collect();

    let private_key = RsaPrivateKey::from_pkcs1_pem(fixtures::USER_KEY_PEM).unwrap();
    assert_eq!(
        envelope.signature(),
        crypto::sign(&expected, &private_key).unwrap()
    );
}

#[test]
fn test_bind_params_timestamp_format() {
    let client = test_client("http://localhost/gateway");
    let envelope = client.bind_params(METHOD, &biz_content()).unwrap();
    let timestamp = envelope.params().get("timestamp").unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
    assert_eq!(timestamp.len(), 19);
}

#[test]
fn test_bind_params_notify_url_and_version() {
    let config = test_config("http://localhost/gateway")
        .with_notify_url("https://merchant.example.com/notify")
        .with_version("2.0");
    let client = AllinpayClient::with_transport(
        config,
        test_keys(),
        crate::transport::HttpTransport::new(None).unwrap(),
    )
    .unwrap();

    let envelope = client.bind_params(METHOD, &biz_content()).unwrap();
    assert_eq!(
        envelope.params().get("notifyUrl"),
        Some("https://merchant.example.com/notify")
    );
    assert_eq!(envelope.params().get("version"), Some("2.0"));
}

#[test]
fn test_bind_params_payload_error() {
    struct Unserializable;

    impl serde::Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(<S::Error as serde::ser::Error>::custom("refused"))
        }
    }

    let client = test_client("http://localhost/gateway");
    let err = client.bind_params(METHOD, &Unserializable).unwrap_err();
    assert!(matches!(err, AllinpayError::PayloadSerialization { .. }));
}

#[tokio::test]
async fn test_request_success() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/gateway")
        .match_header(
            "content-type",
            "application/x-www-form-urlencoded;charset=utf-8",
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("appId".into(), "10000".into()),
            Matcher::UrlEncoded("method".into(), METHOD.into()),
            Matcher::UrlEncoded("signType".into(), "SHA256WithRSA".into()),
            Matcher::UrlEncoded(
                "bizContent".into(),
                r#"{"bizUserId":"rust-test-1","memberType":3,"source":1}"#.into(),
            ),
            Matcher::Regex("sign=".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(signed_body(json!({
            "code": "10000",
            "msg": "处理成功",
            "subCode": "OK",
            "data": {"bizUserId": "rust-test-1", "userId": "b8a7"}
        })))
        .create_async()
        .await;

    let client = test_client(&format!("{}/gateway", server.url()));
    let response = client.request(METHOD, &biz_content()).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.sub_code(), Some("OK"));
    assert_eq!(response.data().unwrap()["userId"], "b8a7");
    assert!(response.get("sign").is_none());
}

#[tokio::test]
async fn test_request_pre_signed_fixture() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/gateway")
        .with_status(200)
        .with_body(fixtures::GATEWAY_RESPONSE)
        .create_async()
        .await;

    let client = test_client(&format!("{}/gateway", server.url()));
    let response = client.request(METHOD, &biz_content()).await.unwrap();
    assert_eq!(response.body(), fixtures::GATEWAY_RESPONSE);
    assert_eq!(response.data().unwrap()["bizUserId"], "rust-test-1");
}

#[tokio::test]
async fn test_request_tampered_response() {
    let body = signed_body(json!({"code": "10000", "data": {"amount": 100}}))
        .replace("100}", "999}");

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/gateway")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = test_client(&format!("{}/gateway", server.url()));
    let err = client.request(METHOD, &biz_content()).await.unwrap_err();
    assert!(matches!(err, AllinpayError::Verification { .. }));
}

#[tokio::test]
async fn test_request_unsigned_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/gateway")
        .with_status(200)
        .with_body(json!({"code": "40000", "msg": "sign error"}).to_string())
        .create_async()
        .await;

    let client = test_client(&format!("{}/gateway", server.url()));
    let err = client.request(METHOD, &biz_content()).await.unwrap_err();
    assert!(matches!(err, AllinpayError::Verification { .. }));
}

#[tokio::test]
async fn test_request_signed_by_wrong_key() {
    // Signed by the merchant key instead of the gateway key
    let fields = json!({"code": "10000"});
    let content = serde_json::to_string(&fields).unwrap();
    let private_key = RsaPrivateKey::from_pkcs1_pem(fixtures::USER_KEY_PEM).unwrap();
    let body = json!({
        "code": "10000",
        "sign": crypto::sign_bytes(content.as_bytes(), &private_key).unwrap()
    });

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/gateway")
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = test_client(&format!("{}/gateway", server.url()));
    let err = client.request(METHOD, &biz_content()).await.unwrap_err();
    assert!(matches!(err, AllinpayError::Verification { .. }));
}

#[tokio::test]
async fn test_request_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/gateway")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let client = test_client(&format!("{}/gateway", server.url()));
    let err = client.request(METHOD, &biz_content()).await.unwrap_err();
    assert!(matches!(err, AllinpayError::Transport { .. }));
    assert!(err.to_string().contains("500"));
}

/// Records request bodies and replays one canned response
struct RecordingTransport {
    requests: Mutex<Vec<(String, String, String)>>,
    response: TransportResponse,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, url: &str, content_type: &str, body: String) -> Result<TransportResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), content_type.to_string(), body));
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn test_custom_transport_shared_across_clones() {
    let transport = RecordingTransport {
        requests: Mutex::new(Vec::new()),
        response: TransportResponse {
            status: 200,
            body: signed_body(json!({"code": "10000", "msg": "ok"})).into_bytes(),
        },
    };
    let client =
        AllinpayClient::with_transport(test_config("https://gateway.test/op"), test_keys(), transport)
            .unwrap();
    let other = client.clone();

    let content = biz_content();
    let (first, second) = tokio::join!(
        client.request(METHOD, &content),
        other.request("allinpay.yunst.memberService.getMemberInfo", &content)
    );
    assert!(first.unwrap().is_success());
    assert!(second.unwrap().is_success());

    let requests = client.transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    for (url, content_type, body) in requests.iter() {
        assert_eq!(url, "https://gateway.test/op");
        assert_eq!(content_type, "application/x-www-form-urlencoded;charset=utf-8");

        let params: ParameterSet = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        crypto::verify_params(&params, &user_public_key()).unwrap();
    }
}

#[test]
fn test_encrypt_sensitive() {
    let client = test_client("http://localhost/gateway");
    let encrypted = client.encrypt_sensitive("320721199408140000").unwrap();
    assert_eq!(
        encrypted,
        "92F647AC47B4F65382929373B00BEF7DC95B60519796541505716B22E62FEDBA"
    );
    assert_eq!(
        client.decrypt_sensitive(&encrypted).unwrap(),
        "320721199408140000"
    );
}

#[test]
fn test_new_loads_key_files() {
    let dir = tempfile::tempdir().unwrap();
    let pfx_path = dir.path().join("user-rsa.pfx");
    let cert_path = dir.path().join("public-rsa.cer");
    std::fs::write(&pfx_path, fixtures::USER_PFX).unwrap();
    std::fs::write(&cert_path, fixtures::GATEWAY_CERT_PEM).unwrap();

    let config = ClientConfig::new("10000", &pfx_path, "123456", &cert_path)
        .with_app_account_id("40000")
        .with_production(true);
    let client = AllinpayClient::new(config).unwrap();

    assert_eq!(client.app_id(), "10000");
    assert_eq!(client.app_account_id(), "40000");
    assert_eq!(client.service_url(), "https://cloud.allinpay.com/gateway");
    assert_eq!(
        client.keys().public_key(),
        &crypto::load_public_key(fixtures::GATEWAY_CERT_PEM).unwrap()
    );
}

#[test]
fn test_new_fails_without_key_material() {
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("public-rsa.cer");
    std::fs::write(&cert_path, fixtures::GATEWAY_CERT_PEM).unwrap();

    let config = ClientConfig::new("10000", dir.path().join("missing.pfx"), "123456", &cert_path);
    let err = AllinpayClient::new(config).unwrap_err();
    assert!(matches!(err, AllinpayError::KeyExtraction { .. }));

    let pfx_path = dir.path().join("user-rsa.pfx");
    std::fs::write(&pfx_path, fixtures::USER_PFX).unwrap();
    let config = ClientConfig::new("10000", &pfx_path, "wrong", &cert_path);
    let err = AllinpayClient::new(config).unwrap_err();
    assert!(matches!(err, AllinpayError::KeyExtraction { .. }));

    let config = ClientConfig::new("", &pfx_path, "123456", &cert_path);
    let err = AllinpayClient::new(config).unwrap_err();
    assert!(matches!(err, AllinpayError::Config { .. }));
}
