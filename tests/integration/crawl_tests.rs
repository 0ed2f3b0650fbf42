//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full harvest cycle end-to-end.

use pledge_harvest::config::{Config, UserAgentConfig};
use pledge_harvest::crawler::{crawl, Coordinator};
use pledge_harvest::output::{to_json_string, write_json, FailureStage};
use pledge_harvest::{CompletionReason, CrawlState};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, with no delays
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.feed.base_url = base_url.to_string();
    config.crawler.item_delay_ms = 0;
    config.crawler.page_delay_ms = 0;
    config.fetch.max_retries = 1;
    config.fetch.retry_backoff_ms = 1;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    config
}

fn project_path(slug: &str) -> String {
    format!("/projects/maker/{}", slug)
}

/// A feed entry whose project page lives on the mock server
fn entry(base_url: &str, slug: &str, pledged: Value) -> Value {
    json!({
        "name": format!("Project {}", slug.to_uppercase()),
        "creator": { "name": format!("Maker of {}", slug) },
        "usd_pledged": pledged,
        "backers_count": 12,
        "deadline": 4_102_444_800i64,
        "urls": { "web": {
            "project": format!("{}{}?ref=discovery_category", base_url, project_path(slug))
        } }
    })
}

fn project_page(title: &str, all_or_nothing: bool) -> String {
    let badge = if all_or_nothing {
        "All or nothing. This project will only be funded if it reaches its goal."
    } else {
        "Flexible funding"
    };
    format!(
        r#"<html><head><title>{title}</title><script>track();</script></head><body>
        <h1>{title}</h1>
        <span class="link-soft-black medium">{badge}</span>
        <div class="pledge__info"><h3>Pledge without a reward</h3></div>
        <div class="pledge__info">
            <h2><span class="pledge__currency-conversion">About US$ 25</span></h2>
            <div class="pledge__reward-description pledge__reward-description--expanded">
                <p>Sticker pack</p>
            </div>
            <div class="pledge__backer-stats">
                <span class="pledge__limit">Limited (3 left of 10)</span>
                <span class="pledge__backer-count">7 backers</span>
            </div>
        </div>
        <div class="pledge__info">
            <h2><span class="pledge__currency-conversion">About US$ 1,000</span></h2>
            <div class="pledge__reward-description pledge__reward-description--expanded">
                <p>Founder edition</p>
            </div>
            <div class="pledge__backer-stats">
                <span class="pledge__limit">Reward no longer available</span>
                <span class="pledge__backer-count">1,204 backers</span>
            </div>
        </div>
        </body></html>"#
    )
}

async fn mount_feed_page(server: &MockServer, page: u32, projects: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/discover/advanced"))
        .and(query_param("page", page.to_string()))
        .and(query_param("category_id", "16"))
        .and(query_param("sort", "magic"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projects": projects })))
        .mount(server)
        .await;
}

async fn mount_project(server: &MockServer, slug: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(project_path(slug)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(project_page(&format!("Project {}", slug.to_uppercase()), true))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn record_urls(records: &Value) -> Vec<String> {
    records["records"]["record"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["url"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_quota_limits_fetched_items() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_feed_page(
        &mock_server,
        0,
        vec![
            entry(&base_url, "a", json!(10.5)),
            entry(&base_url, "b", json!("20")),
            entry(&base_url, "c", json!(30)),
        ],
    )
    .await;
    mount_project(&mock_server, "a", 1).await;
    mount_project(&mock_server, "b", 1).await;
    // never requested: the quota is met after "b"
    mount_project(&mock_server, "c", 0).await;

    let report = Coordinator::new(create_test_config(&base_url), 2)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.reason, CompletionReason::QuotaReached);
    assert_eq!(report.final_state(), CrawlState::Completed);

    let output = serde_json::to_value(&report.result).unwrap();
    let records = output["records"]["record"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], json!(0));
    assert_eq!(records[1]["id"], json!(1));
    assert_eq!(
        record_urls(&output),
        vec![
            format!("{}{}", base_url, project_path("a")),
            format!("{}{}", base_url, project_path("b")),
        ]
    );
    assert_eq!(records[0]["DollarsPledged"], json!(10.5));
    assert_eq!(records[1]["DollarsPledged"], json!(20.0));
    assert_eq!(records[0]["Creator"], json!("Maker of a"));
    assert_eq!(records[0]["Title"], json!("Project A"));
    assert_eq!(records[0]["AllOrNothing"], json!(true));
    assert_eq!(records[0]["NumBackers"], json!(12));
}

#[tokio::test]
async fn test_rewards_extracted_with_sentinels() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_feed_page(&mock_server, 0, vec![entry(&base_url, "a", json!(1))]).await;
    mount_project(&mock_server, "a", 1).await;

    let report = crawl(create_test_config(&base_url), 1).await.unwrap();

    let output = serde_json::to_value(&report.result).unwrap();
    let rewards = output["records"]["record"][0]["rewards"]["reward"]
        .as_array()
        .unwrap();

    // the "pledge without a reward" block is not a reward
    assert_eq!(rewards.len(), 2);
    assert_eq!(
        rewards[0],
        json!({ "Text": "Sticker pack", "Price": 25, "NumBackers": 7, "TotalPossibleBackers": 10 })
    );
    assert_eq!(
        rewards[1],
        json!({ "Text": "Founder edition", "Price": 1000, "NumBackers": 1204, "TotalPossibleBackers": 1204 })
    );
}

#[tokio::test]
async fn test_duplicates_across_pages_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_feed_page(
        &mock_server,
        0,
        vec![entry(&base_url, "a", json!(1)), entry(&base_url, "b", json!(2))],
    )
    .await;
    mount_feed_page(
        &mock_server,
        1,
        vec![entry(&base_url, "b", json!(2)), entry(&base_url, "c", json!(3))],
    )
    .await;
    mount_feed_page(&mock_server, 2, vec![]).await;
    mount_project(&mock_server, "a", 1).await;
    mount_project(&mock_server, "b", 1).await;
    mount_project(&mock_server, "c", 1).await;

    let report = Coordinator::new(create_test_config(&base_url), 10)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.reason, CompletionReason::FeedExhausted);
    assert_eq!(report.result.len(), 3);
    assert_eq!(report.stats.duplicates_skipped, 1);
    assert_eq!(report.stats.pages_fetched, 2);

    let ids: Vec<_> = report
        .result
        .records()
        .iter()
        .filter_map(|r| r.id())
        .collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_failed_item_does_not_stop_the_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_feed_page(
        &mock_server,
        0,
        vec![
            entry(&base_url, "a", json!(1)),
            entry(&base_url, "gone", json!(2)),
            entry(&base_url, "c", json!(3)),
        ],
    )
    .await;
    mount_feed_page(&mock_server, 1, vec![]).await;
    mount_project(&mock_server, "a", 1).await;
    mount_project(&mock_server, "c", 1).await;
    Mock::given(method("GET"))
        .and(path(project_path("gone")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = Coordinator::new(create_test_config(&base_url), 5)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.reason, CompletionReason::FeedExhausted);
    assert_eq!(report.result.len(), 2);
    assert_eq!(report.stats.items_failed(), 1);
    assert_eq!(report.stats.failures[0].stage, FailureStage::Fetch);
    assert!(report.stats.failures[0].message.contains("404"));

    let ids: Vec<_> = report
        .result
        .records()
        .iter()
        .filter_map(|r| r.id())
        .collect();
    assert_eq!(ids, vec![0, 1]);
}

#[tokio::test]
async fn test_transient_page_error_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/discover/advanced"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_feed_page(&mock_server, 0, vec![entry(&base_url, "a", json!(1))]).await;
    mount_project(&mock_server, "a", 1).await;

    let report = Coordinator::new(create_test_config(&base_url), 1)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.reason, CompletionReason::QuotaReached);
    assert_eq!(report.result.len(), 1);
}

#[tokio::test]
async fn test_page_failure_aborts_and_keeps_partial_result() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("harvest.json");

    mount_feed_page(&mock_server, 0, vec![entry(&base_url, "a", json!(1))]).await;
    Mock::given(method("GET"))
        .and(path("/discover/advanced"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        // first attempt plus one retry
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_project(&mock_server, "a", 1).await;

    let report = Coordinator::new(create_test_config(&base_url), 5)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.is_aborted());
    assert!(matches!(report.reason, CompletionReason::Aborted { page: 1, .. }));

    write_json(&report.result, &output_path).unwrap();
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(
        record_urls(&written),
        vec![format!("{}{}", base_url, project_path("a"))]
    );
}

#[tokio::test]
async fn test_zero_quota_sends_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = Coordinator::new(create_test_config(&mock_server.uri()), 0)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.result.is_empty());
    assert_eq!(report.reason, CompletionReason::QuotaReached);
}

#[tokio::test]
async fn test_requests_identify_the_crawler() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/discover/advanced"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projects": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = Coordinator::new(create_test_config(&base_url), 3)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.reason, CompletionReason::FeedExhausted);
}

#[tokio::test]
async fn test_written_document_round_trips() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("harvest.json");

    mount_feed_page(
        &mock_server,
        0,
        vec![entry(&base_url, "a", json!(1)), entry(&base_url, "b", json!(2))],
    )
    .await;
    mount_project(&mock_server, "a", 1).await;
    mount_project(&mock_server, "b", 1).await;

    let report = Coordinator::new(create_test_config(&base_url), 2)
        .unwrap()
        .run()
        .await
        .unwrap();
    write_json(&report.result, &output_path).unwrap();

    let text = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(text, to_json_string(&report.result).unwrap());
    assert!(text.starts_with("{\n    \"records\": {\n        \"record\": ["));

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, serde_json::to_value(&report.result).unwrap());

    // keys keep pipeline order in the file
    let first = &text[text.find("\"id\"").unwrap()..];
    let positions: Vec<_> = [
        "\"id\"",
        "\"url\"",
        "\"Creator\"",
        "\"Title\"",
        "\"Text\"",
        "\"DollarsPledged\"",
        "\"NumBackers\"",
        "\"DaysToGo\"",
        "\"AllOrNothing\"",
        "\"rewards\"",
    ]
    .iter()
    .map(|key| first.find(key).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}
