//! Integration tests: run `ReviewClient` against a wiremock reviews API.

use std::sync::Arc;
use std::time::Duration;

use magnora_core::{
    ClientConfig, ClientError, PageSnapshot, ReviewClient, ReviewDraft, ReviewQuery, SortBy,
    SortOrder,
};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{
    body_partial_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(Url::parse(&server.uri()).expect("mock server uri"))
}

fn client_for(server: &MockServer) -> ReviewClient {
    ReviewClient::new(
        config_for(server).with_shop_id("demo"),
        Arc::new(PageSnapshot::empty()),
    )
}

fn review_json(id: usize, product_id: &str, rating: u8) -> Value {
    json!({
        "id": format!("r{id}"),
        "productId": product_id,
        "author": format!("Author {id}"),
        "title": format!("Review {id}"),
        "content": "Solid product.",
        "rating": rating,
        "date": "2024-05-01",
        "verified": id % 2 == 0,
        "helpful": id
    })
}

fn reviews_json(product_id: &str, count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| review_json(i, product_id, 5 - (i % 5) as u8))
            .collect(),
    )
}

#[tokio::test]
async fn reviews_are_returned_unmodified_and_cached_under_canonical_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("productId", "prod-1"))
        .and(query_param("shopId", "demo"))
        .and(query_param("limit", "3"))
        .and(query_param("sortBy", "rating"))
        .and(query_param("sortOrder", "desc"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("prod-1", 5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = ReviewQuery::new()
        .limit(3)
        .sort_by(SortBy::Rating)
        .sort_order(SortOrder::Desc);

    let reviews = client.get_reviews("prod-1", &query).await.unwrap();
    assert_eq!(reviews.len(), 5, "limit is advisory; nothing is truncated");
    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r0", "r1", "r2", "r3", "r4"]);

    assert!(
        client
            .cache()
            .contains_key(r#"reviews-prod-1-{"limit":3,"sortBy":"rating","sortOrder":"desc"}"#)
    );

    // Second call within the TTL is a cache hit.
    let again = client.get_reviews("prod-1", &query).await.unwrap();
    assert_eq!(again, reviews);
}

#[tokio::test]
async fn different_options_use_different_cache_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("sortBy", "rating"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("A", 2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("sortBy", "date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("A", 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let by_rating = ReviewQuery::new().sort_by(SortBy::Rating);
    let by_date = ReviewQuery::new().sort_by(SortBy::Date);

    assert_eq!(client.get_reviews("A", &by_rating).await.unwrap().len(), 2);
    assert_eq!(client.get_reviews("A", &by_date).await.unwrap().len(), 3);
    assert_eq!(client.get_reviews("A", &by_rating).await.unwrap().len(), 2);
    assert_eq!(client.get_reviews("A", &by_date).await.unwrap().len(), 3);
    assert_eq!(client.cache().len(), 2);
}

#[tokio::test]
async fn submitting_a_review_invalidates_only_that_products_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("productId", "P"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("P", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("productId", "Q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("Q", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/P"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "P",
            "title": "Product P",
            "handle": "product-p",
            "averageRating": 4.0,
            "reviewCount": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reviews"))
        .and(body_partial_json(json!({
            "productId": "P",
            "rating": 5,
            "shopId": "demo"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(review_json(9, "P", 5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sorted = ReviewQuery::new().sort_by(SortBy::Helpful);
    client.get_reviews("P", &ReviewQuery::default()).await.unwrap();
    client.get_reviews("P", &sorted).await.unwrap();
    client.get_reviews("Q", &ReviewQuery::default()).await.unwrap();
    client.get_product("P").await.unwrap();
    assert_eq!(client.cache().len(), 4);

    let draft = ReviewDraft {
        author: Some("Sam".into()),
        title: Some("Love it".into()),
        content: Some("Would buy again".into()),
        rating: Some(5.into()),
        ..ReviewDraft::for_product("P")
    };
    let created = client.submit_review(&draft).await.unwrap();
    assert_eq!(created.id, "r9");

    assert_eq!(
        client.cache().keys(),
        vec!["product-P".to_string(), "reviews-Q-{}".to_string()]
    );
}

#[tokio::test]
async fn failed_fetch_is_not_cached_and_the_next_call_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("A", 2)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_reviews("A", &ReviewQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch reviews: Internal Server Error");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    assert!(client.cache().is_empty());

    let reviews = client.get_reviews("A", &ReviewQuery::default()).await.unwrap();
    assert_eq!(reviews.len(), 2);
}

#[tokio::test]
async fn entries_expire_after_the_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shop"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "s1", "name": "Demo" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server).with_cache_ttl(Duration::from_millis(300));

    client.get_shop().await.unwrap();
    client.get_shop().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    client.get_shop().await.unwrap();
}

#[tokio::test]
async fn concurrent_misses_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reviews_json("A", 4))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = ReviewQuery::default();
    let (a, b) = tokio::join!(client.get_reviews("A", &query), client.get_reviews("A", &query));
    assert_eq!(a.unwrap().len(), 4);
    assert_eq!(b.unwrap().len(), 4);
    assert_eq!(client.cache().len(), 1);
}

#[tokio::test]
async fn concurrent_failures_reach_every_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shop"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (a, b) = tokio::join!(client.get_shop(), client.get_shop());
    for result in [a, b] {
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to fetch shop info: Service Unavailable"
        );
    }
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn sends_bearer_token_and_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(header("authorization", "Bearer secret-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("A", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_shop_id("demo")
        .with_api_key("secret-key");
    let client = ReviewClient::new(config, Arc::new(PageSnapshot::empty()));
    client.get_reviews("A", &ReviewQuery::default()).await.unwrap();
}

#[tokio::test]
async fn omits_authorization_without_api_key_and_sends_empty_shop_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("shopId", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("A", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReviewClient::new(config_for(&server), Arc::new(PageSnapshot::empty()));
    assert!(client.shop_id().is_none());
    client.get_reviews("A", &ReviewQuery::default()).await.unwrap();

    let requests = server.received_requests().await.expect("request recording");
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn shop_id_detected_from_page_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shop"))
        .and(query_param("shopId", "acme.myshopify.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "s1", "name": "Acme" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = PageSnapshot::empty().with_hostname("acme.myshopify.com");
    let client = ReviewClient::new(config_for(&server), Arc::new(page));
    assert_eq!(client.get_shop().await.unwrap().name, "Acme");
}

#[tokio::test]
async fn product_and_shop_are_fetched_once_per_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/p1"))
        .and(query_param("shopId", "demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "title": "Mug",
            "handle": "mug",
            "averageRating": 4.5,
            "reviewCount": 12
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/shop"))
        .and(query_param("shopId", "demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "name": "Demo",
            "contactEmail": "hello@demo.test"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let product = client.get_product("p1").await.unwrap();
    assert_eq!(product.review_count, 12);
    assert_eq!(client.get_product("p1").await.unwrap(), product);

    let shop = client.get_shop().await.unwrap();
    assert_eq!(shop.contact_email.as_deref(), Some("hello@demo.test"));
    assert_eq!(client.get_shop().await.unwrap(), shop);

    assert_eq!(
        client.cache().keys(),
        vec!["product-p1".to_string(), "shop-info".to_string()]
    );
}

#[tokio::test]
async fn api_url_overrides_every_default_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/reviews"))
        .and(query_param("productId", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("p1", 1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/reviews/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "title": "Mug",
            "handle": "mug",
            "averageRating": 5.0,
            "reviewCount": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_shop_id("demo")
        .with_api_url("/v2/reviews");
    let client = ReviewClient::new(config, Arc::new(PageSnapshot::empty()));
    client.get_reviews("p1", &ReviewQuery::default()).await.unwrap();
    client.get_product("p1").await.unwrap();
}

#[tokio::test]
async fn malformed_json_is_a_parse_error_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_reviews("A", &ReviewQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Json(_)), "got {err:?}");
    assert!(client.cache().is_empty());

    client
        .get_reviews("A", &ReviewQuery::default())
        .await
        .unwrap_err();
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind and release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let origin = Url::parse(&format!("http://{addr}")).expect("origin");
    let config = ClientConfig::new(origin).with_shop_id("demo");
    let client = ReviewClient::new(config, Arc::new(PageSnapshot::empty()));
    let err = client.get_shop().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn refresh_reviews_drops_cached_lists_and_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("productId", "P"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("P", 2)))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let newest = ReviewQuery::new().sort_by(SortBy::Date).sort_order(SortOrder::Desc);
    client.get_reviews("P", &ReviewQuery::default()).await.unwrap();
    client.get_reviews("P", &newest).await.unwrap();

    client.refresh_reviews("P").await.unwrap();

    assert_eq!(client.cache().keys(), vec!["reviews-P-{}".to_string()]);
}

#[tokio::test]
async fn failed_submission_leaves_the_cache_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("P", 1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_reviews("P", &ReviewQuery::default()).await.unwrap();

    let err = client
        .submit_review(&ReviewDraft::for_product("P"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to submit review: Unprocessable Entity"
    );
    assert!(client.cache().contains_key("reviews-P-{}"));
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/shop"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "s1", "name": "Demo" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_shop().await.unwrap();
    client.clear_cache();
    assert!(client.cache().is_empty());
    client.get_shop().await.unwrap();
}

#[tokio::test]
async fn submission_leaves_ids_sharing_a_dash_prefix_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews_json("prod-1", 1)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(201).set_body_json(review_json(7, "prod", 4)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.get_reviews("prod-1", &ReviewQuery::default()).await.unwrap();
    client
        .submit_review(&ReviewDraft::for_product("prod"))
        .await
        .unwrap();

    assert_eq!(client.cache().keys(), vec!["reviews-prod-1-{}".to_string()]);
}

fn single_review(id: &str) -> Value {
    let mut review = review_json(1, "A", 5);
    review["id"] = json!(id);
    json!([review])
}

#[tokio::test]
async fn cancelled_call_still_fills_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(single_review("first"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = ReviewQuery::default();
    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), client.get_reviews("A", &query)).await;
    assert!(timed_out.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(client.cache().contains_key("reviews-A-{}"));
    let reviews = client.get_reviews("A", &query).await.unwrap();
    assert_eq!(reviews[0].id, "first");
}

#[tokio::test]
async fn cancelled_call_is_not_replayed_after_the_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(single_review("OLD"))
                .set_delay(Duration::from_millis(100)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_review("NEW")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_cache_ttl(Duration::from_millis(200));
    let query = ReviewQuery::default();
    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), client.get_reviews("A", &query)).await;
    assert!(timed_out.is_err());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let reviews = client.get_reviews("A", &query).await.unwrap();
    assert_eq!(reviews[0].id, "NEW");
}
