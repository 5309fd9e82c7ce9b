// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(value: Value) -> CandidateRecord {
    match value {
        Value::Object(map) => map,
        _ => panic!("record must be an object"),
    }
}

fn search_response() -> Value {
    json!({
        "batchcomplete": "",
        "query": {
            "searchinfo": {"totalhits": 3},
            "search": [
                {"ns": 0, "title": "Rust (programming language)", "pageid": 29414838,
                 "snippet": "<span class=\"searchmatch\">Rust</span> is a general-purpose programming language"},
                {"ns": 0, "title": "Rust", "pageid": 26477,
                 "snippet": "<span class=\"searchmatch\">Rust</span> is an iron oxide"},
                {"ns": 0, "title": "Empty snippet", "pageid": 1, "snippet": "<span></span>"},
                {"ns": 0, "title": "No id", "snippet": "text"}
            ]
        }
    })
}

fn details_response() -> Value {
    json!({
        "query": {
            "pages": {
                "29414838": {
                    "pageid": 29414838,
                    "title": "Rust (programming language)",
                    "extract": "Rust is a general-purpose programming language emphasizing performance.",
                    "fullurl": "https://en.wikipedia.org/wiki/Rust_(programming_language)"
                }
            }
        }
    })
}

fn crawler(server: &MockServer) -> WikipediaCrawler {
    let mut settings = CrawlerSettings::default();
    settings.wikipedia.base_url = server.uri();
    WikipediaCrawler::new("rust".to_string(), &settings).unwrap()
}

#[test]
fn test_parse_search_results_cleans_and_filters() {
    let records = parse_search_results(&search_response().to_string());

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["pageid"], json!(29414838));
    assert_eq!(records[0]["title"], json!("Rust (programming language)"));
    assert_eq!(
        records[0]["summary"],
        json!("Rust is a general-purpose programming language")
    );
    assert!(!records[0].contains_key("url"));
}

#[test]
fn test_parse_search_results_undecodable_body() {
    assert!(parse_search_results("<html>error</html>").is_empty());
    assert!(parse_search_results(r#"{"query": {}}"#).is_empty());
}

#[test]
fn test_parse_article_details_skips_non_numeric_keys() {
    let body = json!({
        "query": {"pages": {
            "12": {"extract": "text", "fullurl": "https://example.org/12"},
            "abc": {"extract": "ignored"}
        }}
    });

    let details = parse_article_details(&body.to_string());
    assert_eq!(details.len(), 1);
    assert_eq!(details[&12]["full_text"], json!("text"));
    assert_eq!(details[&12]["url"], json!("https://example.org/12"));

    assert!(parse_article_details("garbage").is_empty());
}

#[test]
fn test_merge_details_left_merges_in_search_order() {
    let search = vec![
        record(json!({"pageid": 1})),
        record(json!({"pageid": 2})),
        record(json!({"pageid": 3})),
    ];
    let details = HashMap::from([(2, record(json!({"url": "u2"})))]);

    let merged = merge_details(search, &details);

    assert_eq!(
        merged,
        vec![
            record(json!({"pageid": 1})),
            record(json!({"pageid": 2, "url": "u2"})),
            record(json!({"pageid": 3})),
        ]
    );
}

#[tokio::test]
async fn test_run_makes_two_round_trips_and_enriches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "rust"))
        .and(query_param("srlimit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("pageids", "29414838|26477"))
        .and(query_param("prop", "extracts|info"))
        .and(query_param("inprop", "url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_response()))
        .expect(1)
        .mount(&server)
        .await;

    let records = crawler(&server).run().await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["pageid"], json!(29414838));
    assert_eq!(
        records[0]["url"],
        json!("https://en.wikipedia.org/wiki/Rust_(programming_language)")
    );
    assert!(records[0]["full_text"]
        .as_str()
        .unwrap()
        .starts_with("Rust is a general-purpose"));
    // Not in the details map, keeps only the search fields
    assert_eq!(records[1]["pageid"], json!(26477));
    assert!(!records[1].contains_key("url"));
    assert!(!records[1].contains_key("full_text"));
}

#[tokio::test]
async fn test_run_degrades_to_search_results_when_details_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("prop", "extracts|info"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let records = crawler(&server).run().await;

    assert_eq!(records, parse_search_results(&search_response().to_string()));
    assert!(records.iter().all(|r| !r.contains_key("full_text")));
}

#[tokio::test]
async fn test_run_empty_search_skips_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("list", "search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"query": {"search": []}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("prop", "extracts|info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_response()))
        .expect(0)
        .mount(&server)
        .await;

    assert!(crawler(&server).run().await.is_empty());
}
