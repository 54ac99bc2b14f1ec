//! Integration tests for the commerce REST client

use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
    time::Duration,
};

use serde_json::json;
use testresult::TestResult;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, body_partial_json, method, path},
};

use storefront::backend::{
    Address, CommerceClient, CommerceConfig, LineItemRequest, MetaData, OrderBackend,
    OrderBackendError, OrderId, OrderOperation, OrderRequest, OrderStatus, OrderUpdate,
};

fn client(server: &MockServer) -> Result<CommerceClient, OrderBackendError> {
    CommerceClient::new(CommerceConfig::new(server.uri(), "ck_test", "cs_test"))
}

fn address() -> Address {
    Address {
        first_name: "Asha Rao".to_string(),
        last_name: String::new(),
        address_1: "12 MG Road".to_string(),
        address_2: String::new(),
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        postcode: "411001".to_string(),
        country: "IN".to_string(),
        email: None,
        phone: None,
    }
}

fn request() -> OrderRequest {
    OrderRequest {
        payment_method: "cod".to_string(),
        payment_method_title: "Cash on Delivery (COD)".to_string(),
        status: OrderStatus::Processing,
        billing: Address {
            email: Some("asha@example.in".to_string()),
            phone: Some("9876543210".to_string()),
            ..address()
        },
        shipping: address(),
        line_items: vec![LineItemRequest {
            product_id: 2490.into(),
            quantity: 2,
        }],
        shipping_lines: Vec::new(),
        coupon_lines: Vec::new(),
        customer_note: "WhatsApp: 9876543210".to_string(),
        meta_data: vec![MetaData::new("payment_method", "cod")],
    }
}

#[tokio::test]
async fn create_order_posts_with_basic_auth() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/orders"))
        .and(basic_auth("ck_test", "cs_test"))
        .and(body_partial_json(json!({
            "status": "processing",
            "line_items": [{ "product_id": 2490, "quantity": 2 }],
            "billing": { "country": "IN", "email": "asha@example.in" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5012,
            "status": "processing",
            "total": "600.00",
            "order_key": "wc_order_abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let order = client(&server)?.create_order(&request()).await?;

    assert_eq!(order.id, OrderId::new(5012));
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.order_key.as_deref(), Some("wc_order_abc"));

    Ok(())
}

#[tokio::test]
async fn update_order_puts_status_and_metadata() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/orders/5012"))
        .and(body_partial_json(json!({
            "status": "processing",
            "meta_data": [{ "key": "razorpay_payment_id", "value": "pay_123" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5012,
            "status": "processing",
            "total": "540.00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = OrderUpdate {
        status: OrderStatus::Processing,
        meta_data: vec![MetaData::new("razorpay_payment_id", "pay_123")],
    };

    let order = client(&server)?.update_order(OrderId::new(5012), &update).await?;

    assert_eq!(order.status, OrderStatus::Processing);

    Ok(())
}

#[tokio::test]
async fn not_found_maps_to_typed_error() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wc/v3/orders"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client(&server)?.create_order(&request()).await;

    assert!(matches!(result, Err(OrderBackendError::NotFound)), "expected NotFound, got {result:?}");

    Ok(())
}

#[tokio::test]
async fn unauthorised_maps_to_typed_error() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "woocommerce_rest_cannot_create",
            "message": "Sorry, you are not allowed to create resources."
        })))
        .mount(&server)
        .await;

    let result = client(&server)?.create_order(&request()).await;

    assert!(
        matches!(result, Err(OrderBackendError::Unauthenticated)),
        "expected Unauthenticated, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn rejection_carries_backend_message() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "woocommerce_rest_invalid_product_id",
            "message": "Invalid product ID."
        })))
        .mount(&server)
        .await;

    let Err(error) = client(&server)?.create_order(&request()).await else {
        return Err("expected the order to be rejected".into());
    };

    assert!(
        matches!(&error, OrderBackendError::Rejected { status: 400, message: Some(message), .. } if message == "Invalid product ID."),
        "unexpected error {error:?}"
    );
    assert_eq!(error.user_message(), "Order creation failed: 400 - Invalid product ID.");

    Ok(())
}

#[tokio::test]
async fn rejection_without_json_body_has_no_message() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client(&server)?
        .update_order(OrderId::new(1), &OrderUpdate::status(OrderStatus::Failed))
        .await;

    assert!(
        matches!(
            result,
            Err(OrderBackendError::Rejected {
                operation: OrderOperation::Update,
                status: 502,
                message: None
            })
        ),
        "expected a bare rejection, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn slow_backend_times_out() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 1, "status": "processing" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = CommerceClient::new(CommerceConfig {
        timeout: Duration::from_millis(50),
        ..CommerceConfig::new(server.uri(), "ck_test", "cs_test")
    })?;

    let result = client.create_order(&request()).await;

    assert!(matches!(result, Err(OrderBackendError::Timeout)), "expected Timeout, got {result:?}");

    Ok(())
}

#[tokio::test]
async fn malformed_success_body_is_unexpected() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let result = client(&server)?.create_order(&request()).await;

    assert!(
        matches!(result, Err(OrderBackendError::UnexpectedResponse(_))),
        "expected UnexpectedResponse, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn rejected_update_is_reported_as_an_update() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wp-json/wc/v3/orders/44"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "woocommerce_rest_order_locked",
            "message": "Order is locked."
        })))
        .mount(&server)
        .await;

    let Err(error) = client(&server)?
        .update_order(OrderId::new(44), &OrderUpdate::status(OrderStatus::Cancelled))
        .await
    else {
        return Err("expected the update to be rejected".into());
    };

    assert_eq!(error.user_message(), "Order update failed: 409 - Order is locked.");

    Ok(())
}

/// Serve one response whose body is shorter than its declared length.
fn serve_truncated_rejection(listener: TcpListener) -> thread::JoinHandle<std::io::Result<()>> {
    thread::spawn(move || {
        let (mut stream, _) = listener.accept()?;

        let mut request = Vec::new();
        let mut chunk = [0_u8; 1024];

        loop {
            let read = stream.read(&mut chunk)?;
            request.extend(chunk.iter().take(read));

            if read == 0 || request_complete(&request) {
                break;
            }
        }

        stream.write_all(
            b"HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: 200\r\n\r\n{\"message\": \"Inv",
        )?;
        stream.flush()
    })
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);

    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };

    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then_some(value)?
                .trim()
                .parse::<usize>()
                .ok()
        })
        .unwrap_or(0);

    body.len() >= length
}

#[tokio::test]
async fn truncated_error_body_still_maps_the_status() -> TestResult {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let server = serve_truncated_rejection(listener);

    let client = CommerceClient::new(CommerceConfig::new(base_url, "ck_test", "cs_test"))?;

    let result = client.create_order(&request()).await;

    assert!(
        matches!(
            result,
            Err(OrderBackendError::Rejected {
                operation: OrderOperation::Create,
                status: 400,
                message: None
            })
        ),
        "expected a rejection without a message, got {result:?}"
    );

    server.join().map_err(|_err| "server thread panicked")??;

    Ok(())
}
