//! Router-level tests: real handlers, real token service, in-memory store.

use std::sync::Arc;

use assetflow_core::{
  Email,
  payment::{self, PaymentIntent, PaymentProvider},
};
use assetflow_store_sqlite::SqliteStore;
use async_trait::async_trait;
use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

/// Echoes the amount into the client secret so tests can see what was asked.
struct FakeProvider;

#[async_trait]
impl PaymentProvider for FakeProvider {
  async fn create_intent(
    &self,
    amount_minor: u64,
    currency: &str,
  ) -> assetflow_core::Result<PaymentIntent> {
    Ok(PaymentIntent {
      client_secret: format!("pi_{amount_minor}_secret"),
      amount:        amount_minor,
      currency:      currency.to_owned(),
    })
  }
}

struct TestApp {
  app:   Router,
  state: AppState<SqliteStore>,
}

impl TestApp {
  async fn new() -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    payment::seed_packages(&store, &payment::default_packages())
      .await
      .unwrap();
    let config: ServerConfig =
      serde_json::from_value(json!({ "token_secret": "test-secret" })).unwrap();
    let state = AppState::new(store, config, Arc::new(FakeProvider));
    Self { app: router(state.clone()), state }
  }

  fn cookie(&self, email: &str) -> String {
    let token = self.state.tokens.sign(&Email::parse(email).unwrap()).unwrap();
    format!("{}={token}", auth::TOKEN_COOKIE)
  }

  async fn send(
    &self,
    method: &str,
    uri: &str,
    as_user: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = as_user {
      builder = builder.header(header::COOKIE, self.cookie(user));
    }
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = self.app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  async fn register(&self, email: &str, role: &str) {
    let (status, _) = self
      .send(
        "POST",
        "/createuser",
        None,
        Some(json!({
          "userEmail": email,
          "userName": email.split('@').next().unwrap(),
          "userRole": role,
          "companyName": if role == "hr" { Some("Acme") } else { None },
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  /// `h@co.com` (basic package, five seats) with `e1@co.com` booked.
  async fn company() -> Self {
    let t = Self::new().await;
    t.register("h@co.com", "hr").await;
    t.register("e1@co.com", "employee").await;

    let (status, _) = t
      .send(
        "POST",
        "/membership/purchase",
        Some("h@co.com"),
        Some(json!({ "email": "h@co.com", "package": "basic" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);

    let (status, hr) = t
      .send(
        "POST",
        "/users/book",
        Some("h@co.com"),
        Some(json!({ "email": "h@co.com", "employees": ["e1@co.com"] })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hr["currentEmployees"], json!(["e1@co.com"]));
    t
  }

  async fn add_product(&self, name: &str, quantity: u32) -> String {
    let (status, asset) = self
      .send(
        "POST",
        "/product/add",
        Some("h@co.com"),
        Some(json!({
          "email": "h@co.com",
          "productName": name,
          "productType": "returnable",
          "productQuantity": quantity,
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    asset["id"].as_str().unwrap().to_owned()
  }

  async fn quantity(&self, product_id: &str) -> u64 {
    let (status, asset) = self
      .send(
        "GET",
        &format!("/product/{product_id}?email=h@co.com"),
        Some("h@co.com"),
        None,
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    asset["productQuantity"].as_u64().unwrap()
  }
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_cookie_is_unauthenticated() {
  let t = TestApp::company().await;
  let (status, body) = t.send("GET", "/products?email=h@co.com", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn forged_token_is_unauthenticated() {
  let t = TestApp::company().await;
  let other_key = session::TokenService::new(b"not-the-secret", chrono::Duration::hours(1));
  let forged = other_key
    .sign(&Email::parse("h@co.com").unwrap())
    .unwrap();
  let req = Request::builder()
    .uri("/users/me?email=h@co.com")
    .header(header::COOKIE, format!("token={forged}"))
    .body(Body::empty())
    .unwrap();
  let resp = t.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn declared_email_must_match_the_session() {
  let t = TestApp::company().await;
  t.register("e2@co.com", "employee").await;
  let product = t.add_product("Laptop", 3).await;

  let (_, request) = t
    .send(
      "POST",
      "/product/request",
      Some("e1@co.com"),
      Some(json!({ "email": "e1@co.com", "productId": product })),
    )
    .await;
  let request = request["id"].as_str().unwrap().to_owned();
  let (_, custom) = t
    .send(
      "POST",
      "/custom-product/request",
      Some("e1@co.com"),
      Some(json!({
        "email": "e1@co.com",
        "assetName": "Standing desk",
        "price": 420.0,
        "assetType": "returnable",
        "whyNeeded": "back pain",
      })),
    )
    .await;
  let custom = custom["id"].as_str().unwrap().to_owned();

  const OTHER: &str = "intruder@co.com";
  let hr = "h@co.com";
  let employee = "e1@co.com";
  let body = |extra: Value| {
    let mut body = json!({ "email": OTHER });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
      body.extend(extra);
    }
    Some(body)
  };

  let cases: Vec<(&str, String, &str, Option<Value>)> = vec![
    ("GET", format!("/users/me?email={OTHER}"), employee, None),
    ("PATCH", "/users/profile".into(), employee, body(json!({ "userName": "Mallory" }))),
    ("GET", format!("/users/unaffiliated?email={OTHER}"), hr, None),
    ("GET", format!("/users/team?email={OTHER}"), employee, None),
    ("POST", "/users/book".into(), hr, body(json!({ "employees": ["e2@co.com"] }))),
    ("POST", "/users/unbook".into(), hr, body(json!({ "employee": "e1@co.com" }))),
    ("GET", format!("/membership/check?email={OTHER}"), hr, None),
    ("POST", "/membership/purchase".into(), hr, body(json!({ "package": "premium" }))),
    ("POST", "/create-payment-intent".into(), hr, body(json!({ "package": "premium" }))),
    ("GET", format!("/products?email={OTHER}"), employee, None),
    (
      "POST",
      "/product/add".into(),
      hr,
      body(json!({
        "productName": "Phone",
        "productType": "returnable",
        "productQuantity": 1,
      })),
    ),
    ("GET", format!("/product/{product}?email={OTHER}"), employee, None),
    ("PATCH", format!("/product/{product}"), hr, body(json!({ "productQuantity": 9 }))),
    ("DELETE", format!("/product/{product}?email={OTHER}"), hr, None),
    ("POST", "/product/request".into(), employee, body(json!({ "productId": product }))),
    ("GET", format!("/product/requests?email={OTHER}"), hr, None),
    ("POST", format!("/product/request/{request}/approve"), hr, body(json!({}))),
    ("POST", format!("/product/request/{request}/reject"), hr, body(json!({}))),
    ("POST", format!("/product/request/{request}/return"), employee, body(json!({}))),
    (
      "POST",
      "/custom-product/request".into(),
      employee,
      body(json!({
        "assetName": "Monitor",
        "price": 150.0,
        "assetType": "returnable",
        "whyNeeded": "second screen",
      })),
    ),
    ("GET", format!("/custom-product/requests?email={OTHER}"), hr, None),
    ("POST", format!("/custom-product/request/{custom}/approve"), hr, body(json!({}))),
    ("POST", format!("/custom-product/request/{custom}/reject"), hr, body(json!({}))),
  ];

  for (method, uri, session, payload) in cases {
    let (status, _) = t.send(method, &uri, Some(session), payload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
  }

  // Nothing above took effect.
  assert_eq!(t.quantity(&product).await, 3);
  let (_, requests) = t
    .send("GET", "/product/requests?email=h@co.com", Some(hr), None)
    .await;
  assert_eq!(requests.as_array().unwrap().len(), 1);
  assert_eq!(requests[0]["approvalStatus"], "pending");
  let (_, customs) = t
    .send("GET", "/custom-product/requests?email=h@co.com", Some(hr), None)
    .await;
  assert_eq!(customs.as_array().unwrap().len(), 1);
  assert_eq!(customs[0]["approvalStatus"], "pending");
  let (_, check) = t
    .send("GET", "/membership/check?email=h@co.com", Some(hr), None)
    .await;
  assert_eq!(check, json!({ "limit": 5, "used": 1 }));
  let (_, me) = t
    .send("GET", "/users/me?email=e1@co.com", Some(employee), None)
    .await;
  assert_eq!(me["userName"], "e1");

  // Missing declaration.
  let (status, _) = t.send("GET", "/products", Some(employee), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = t
    .send("POST", "/product/request", Some(employee), Some(json!({ "productId": product })))
    .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // Case differences are not mismatches.
  let (status, products) = t
    .send("GET", "/products?email=E1@Co.Com", Some(employee), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(products.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn role_mismatch_is_forbidden() {
  let t = TestApp::company().await;
  let (status, _) = t
    .send(
      "POST",
      "/product/add",
      Some("e1@co.com"),
      Some(json!({
        "email": "e1@co.com",
        "productName": "Laptop",
        "productType": "returnable",
        "productQuantity": 1,
      })),
    )
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = t
    .send("GET", "/membership/check?email=e1@co.com", Some("e1@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unregistered_session_is_forbidden() {
  let t = TestApp::new().await;
  let (status, _) = t
    .send("GET", "/users/me?email=ghost@co.com", Some("ghost@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authenticate_sets_and_logout_clears_the_cookie() {
  let t = TestApp::company().await;
  let req = Request::builder()
    .method("POST")
    .uri("/authenticate")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(json!({ "email": "H@co.com" }).to_string()))
    .unwrap();
  let resp = t.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let set_cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .unwrap()
    .to_str()
    .unwrap()
    .to_owned();
  assert!(set_cookie.starts_with("token="));
  assert!(set_cookie.contains("HttpOnly"));

  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body["user"]["userEmail"], "h@co.com");

  // The issued cookie works on a protected route.
  let cookie = set_cookie.split(';').next().unwrap().to_owned();
  let req = Request::builder()
    .uri("/users/me?email=h@co.com")
    .header(header::COOKIE, cookie)
    .body(Body::empty())
    .unwrap();
  let resp = t.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);

  let req = Request::builder()
    .method("POST")
    .uri("/logout")
    .body(Body::empty())
    .unwrap();
  let resp = t.app.clone().oneshot(req).await.unwrap();
  let cleared = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
  assert!(cleared.starts_with("token="));
  assert!(cleared.contains("Max-Age=0"));
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_is_idempotent() {
  let t = TestApp::new().await;
  t.register("e@co.com", "employee").await;

  let (status, body) = t
    .send(
      "POST",
      "/createuser",
      None,
      Some(json!({ "userEmail": "E@CO.COM", "userName": "Again", "userRole": "employee" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["userExists"], true);
  assert_eq!(body["userInformation"]["userName"], "e");
  assert_eq!(body["userInformation"]["currentMemberShipLimit"], 0);
  assert!(body["userInformation"]["currentWorkingCompanyEmail"].is_null());
}

#[tokio::test]
async fn profile_updates_apply_to_the_caller_only() {
  let t = TestApp::company().await;
  let (status, user) = t
    .send(
      "PATCH",
      "/users/profile",
      Some("e1@co.com"),
      Some(json!({ "email": "e1@co.com", "userName": "Eve One", "dateOfBirth": "1991-02-03" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["userName"], "Eve One");
  assert_eq!(user["dateOfBirth"], "1991-02-03");
  assert_eq!(user["currentWorkingCompanyEmail"], "h@co.com");
}

// ─── Request workflow ────────────────────────────────────────────────────────

#[tokio::test]
async fn request_approve_return_round_trip() {
  let t = TestApp::company().await;
  let a1 = t.add_product("Laptop", 3).await;

  let (status, request) = t
    .send(
      "POST",
      "/product/request",
      Some("e1@co.com"),
      Some(json!({ "email": "e1@co.com", "productId": a1, "note": "new hire" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(request["approvalStatus"], "pending");
  let id = request["id"].as_str().unwrap().to_owned();

  let (status, approved) = t
    .send(
      "POST",
      &format!("/product/request/{id}/approve"),
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(approved["approvalStatus"], "approved");
  assert!(approved["approvalDate"].is_string());
  assert_eq!(t.quantity(&a1).await, 2);

  let (status, returned) = t
    .send(
      "POST",
      &format!("/product/request/{id}/return"),
      Some("e1@co.com"),
      Some(json!({ "email": "e1@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(returned["approvalStatus"], "returned");
  assert!(returned["approvalDate"].is_null());
  assert_eq!(t.quantity(&a1).await, 3);

  let (status, _) = t
    .send(
      "POST",
      &format!("/product/request/{id}/return"),
      Some("e1@co.com"),
      Some(json!({ "email": "e1@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(t.quantity(&a1).await, 3);
}

#[tokio::test]
async fn request_listing_is_scoped_by_role() {
  let t = TestApp::company().await;
  let a1 = t.add_product("Laptop", 3).await;
  t.send(
    "POST",
    "/product/request",
    Some("e1@co.com"),
    Some(json!({ "email": "e1@co.com", "productId": a1 })),
  )
  .await;

  let (status, all) = t
    .send("GET", "/product/requests?email=h@co.com&status=pending", Some("h@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(all.as_array().unwrap().len(), 1);

  let (_, none) = t
    .send("GET", "/product/requests?email=h@co.com&search=phone", Some("h@co.com"), None)
    .await;
  assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unbooked_employee_gets_empty_listings() {
  let t = TestApp::company().await;
  t.add_product("Laptop", 3).await;
  t.register("loner@co.com", "employee").await;

  for uri in [
    "/products?email=loner@co.com",
    "/product/requests?email=loner@co.com",
    "/custom-product/requests?email=loner@co.com",
    "/users/team?email=loner@co.com",
  ] {
    let (status, body) = t.send("GET", uri, Some("loner@co.com"), None).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    assert_eq!(body, json!([]), "{uri}");
  }
}

#[tokio::test]
async fn malformed_ids_are_rejected_up_front() {
  let t = TestApp::company().await;
  let (status, _) = t
    .send("GET", "/product/not-a-uuid?email=h@co.com", Some("h@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = t
    .send(
      "POST",
      "/product/request/42/approve",
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn custom_requests_flow_through_hr() {
  let t = TestApp::company().await;
  let (status, request) = t
    .send(
      "POST",
      "/custom-product/request",
      Some("e1@co.com"),
      Some(json!({
        "email": "e1@co.com",
        "assetName": "Standing desk",
        "price": 420.0,
        "assetType": "returnable",
        "whyNeeded": "back pain",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = request["id"].as_str().unwrap().to_owned();

  let (status, rejected) = t
    .send(
      "POST",
      &format!("/custom-product/request/{id}/reject"),
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(rejected["approvalStatus"], "rejected");

  let (status, _) = t
    .send(
      "POST",
      &format!("/custom-product/request/{id}/approve"),
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn product_lifecycle() {
  let t = TestApp::company().await;
  let a1 = t.add_product("Laptop", 3).await;

  let (status, updated) = t
    .send(
      "PATCH",
      &format!("/product/{a1}"),
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com", "productQuantity": 5 })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["productQuantity"], 5);
  assert_eq!(updated["productName"], "Laptop");

  let (status, listed) = t
    .send(
      "GET",
      "/products?email=h@co.com&availability=available&sort=desc",
      Some("h@co.com"),
      None,
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);

  let (status, _) = t
    .send("DELETE", &format!("/product/{a1}?email=h@co.com"), Some("h@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = t
    .send("GET", &format!("/product/{a1}?email=h@co.com"), Some("h@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Roster and membership ───────────────────────────────────────────────────

#[tokio::test]
async fn roster_and_membership() {
  let t = TestApp::company().await;
  t.register("e2@co.com", "employee").await;

  let (_, free) = t
    .send("GET", "/users/unaffiliated?email=h@co.com", Some("h@co.com"), None)
    .await;
  assert_eq!(free[0]["userEmail"], "e2@co.com");

  let (status, check) = t
    .send("GET", "/membership/check?email=h@co.com", Some("h@co.com"), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(check, json!({ "limit": 5, "used": 1 }));

  let (status, hr) = t
    .send(
      "POST",
      "/users/unbook",
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com", "employee": "e1@co.com" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(hr["currentEmployees"], json!([]));

  let (status, _) = t
    .send(
      "POST",
      "/users/book",
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com", "employees": ["nobody@co.com"] })),
    )
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn packages_are_public_and_priced_in_cents() {
  let t = TestApp::company().await;
  let (status, packages) = t.send("GET", "/packages", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(packages.as_array().unwrap().len(), 3);

  let (status, intent) = t
    .send(
      "POST",
      "/create-payment-intent",
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com", "package": "premium" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(intent["amount"], 1500);
  assert_eq!(intent["currency"], "usd");
  assert_eq!(intent["clientSecret"], "pi_1500_secret");
}

#[tokio::test]
async fn disabled_payments_surface_as_bad_gateway() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  payment::seed_packages(&store, &payment::default_packages()).await.unwrap();
  let config: ServerConfig =
    serde_json::from_value(json!({ "token_secret": "test-secret" })).unwrap();
  let state = AppState::new(store, config, Arc::new(crate::payment::DisabledProvider));
  let t = TestApp { app: router(state.clone()), state };
  t.register("h@co.com", "hr").await;

  let (status, _) = t
    .send(
      "POST",
      "/create-payment-intent",
      Some("h@co.com"),
      Some(json!({ "email": "h@co.com", "package": "basic" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
}
