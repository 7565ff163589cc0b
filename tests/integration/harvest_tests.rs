use std::sync::{Arc, Mutex};
use sumi_harvest::config::HarvestConfig;
use sumi_harvest::crawler::{Harvester, HttpFetcher, Pacing, PageTemplate, RunState};
use sumi_harvest::output::{JsonDirectory, RecordSink};
use sumi_harvest::progress::ProgressLine;
use sumi_harvest::sites::StarTribune;
use sumi_harvest::HarvestError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_page(links: &[String]) -> String {
    let entries: String = links
        .iter()
        .map(|l| format!(r#"<div class="searchEntry"><h3><a href="{}">Story</a></h3></div>"#, l))
        .collect();
    format!("<html><body>{}</body></html>", entries)
}

fn article_page(title: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <ul><li class="updatedBy">Updated: March 2, 2015 - 10:12 PM</li></ul>
        <article><p>{title} happened.</p><p>More on {title}.</p></article>
        </body></html>"#,
        title = title
    )
}

fn harvester(
    server: &MockServer,
    target: u64,
) -> Harvester<HttpFetcher, StarTribune> {
    let template =
        PageTemplate::parse(&format!("{}/search/?stq=lakes&page={{page}}", server.uri()))
            .expect("Failed to parse template");

    Harvester::new(
        HttpFetcher::new().expect("Failed to build fetcher"),
        StarTribune::new().expect("Failed to build extractor"),
        template,
    )
    .harvest(HarvestConfig {
        target,
        start: 1,
        step: 1,
    })
    .pacing(Pacing::Disabled)
}

async fn mount_search(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_article(server: &MockServer, article_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_harvest_single_page() {
    let server = MockServer::start().await;

    let links: Vec<String> = (1..=4).map(|i| format!("/story/{}", i)).collect();
    mount_search(&server, "1", search_page(&links)).await;
    for (i, link) in links.iter().enumerate() {
        mount_article(&server, link, article_page(&format!("Story {}", i + 1))).await;
    }

    // Page 2 must never be requested: the run stops one past the target
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let mut records = harvester(&server, 3).records();
    let mut articles = Vec::new();
    while let Some(item) = records.next().await {
        articles.push(item.expect("Harvest failed"));
    }

    assert_eq!(articles.len(), 4);
    assert_eq!(records.progress().ticks(), 4);
    assert_eq!(records.state(), RunState::Done);

    let first = &articles[0];
    assert_eq!(first.get_str("title"), Some("Story 1"));
    assert_eq!(first.get_str("pub_date"), Some("March 2, 2015"));
    assert_eq!(first.get_str("url"), Some(format!("{}/story/1", server.uri()).as_str()));
    assert_eq!(first.content(), "Story 1 happened.\n\nMore on Story 1.");
}

#[tokio::test]
async fn test_empty_results_page_is_skipped() {
    let server = MockServer::start().await;

    mount_search(&server, "1", "<html><body>No results</body></html>".to_string()).await;
    mount_search(&server, "2", search_page(&["/story/a".to_string()])).await;
    mount_article(&server, "/story/a", article_page("Alpha")).await;

    let mut records = harvester(&server, 1).records();
    let mut titles = Vec::new();
    while let Some(item) = records.next().await {
        titles.push(item.expect("Harvest failed").get_str("title").map(str::to_string));
    }

    assert_eq!(titles, vec![Some("Alpha".to_string())]);
    assert_eq!(records.progress().ticks(), 2);
}

#[tokio::test]
async fn test_results_without_links_still_finish() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div class="searchEntry"><span>no link</span></div></body></html>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let mut records = harvester(&server, 1).records();
    let first = tokio::time::timeout(std::time::Duration::from_secs(5), records.next())
        .await
        .expect("Harvest never finished");

    assert!(first.is_none());
    assert_eq!(records.state(), RunState::Done);
    assert_eq!(records.progress().ticks(), 2);
}

#[tokio::test]
async fn test_http_error_status_is_recoverable() {
    let server = MockServer::start().await;

    mount_search(
        &server,
        "1",
        search_page(&["/story/gone".to_string(), "/story/here".to_string()]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/story/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html><body>Not found</body></html>"))
        .mount(&server)
        .await;
    mount_article(&server, "/story/here", article_page("Here")).await;

    let mut records = harvester(&server, 1).records();
    let mut articles = Vec::new();
    while let Some(item) = records.next().await {
        articles.push(item.expect("Harvest failed"));
    }

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].get_str("title"), Some("Here"));
    assert_eq!(records.progress().ticks(), 2);
}

#[tokio::test]
async fn test_transport_failure_aborts() {
    let server = MockServer::start().await;

    // The second link points at a port nothing listens on
    let links = vec![
        "/story/ok".to_string(),
        "http://127.0.0.1:9/story/unreachable".to_string(),
        "/story/never".to_string(),
    ];
    mount_search(&server, "1", search_page(&links)).await;
    mount_article(&server, "/story/ok", article_page("Ok")).await;
    Mock::given(method("GET"))
        .and(path("/story/never"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("Never")))
        .expect(0)
        .mount(&server)
        .await;

    let mut records = harvester(&server, 10).records();

    assert!(records.next().await.expect("Expected an article").is_ok());
    let failure = records.next().await.expect("Expected a failure");
    assert!(matches!(failure, Err(HarvestError::Http { .. })));
    assert!(records.next().await.is_none());
    assert_eq!(records.state(), RunState::Aborted);
    assert_eq!(records.progress().ticks(), 1);
}

#[tokio::test]
async fn test_referer_set_from_search_page() {
    let server = MockServer::start().await;
    let search_url = format!("{}/search/?stq=lakes&page=1", server.uri());

    mount_search(&server, "1", search_page(&["/story/r".to_string()])).await;
    Mock::given(method("GET"))
        .and(path("/story/r"))
        .and(header("referer", search_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("Referred")))
        .expect(1)
        .mount(&server)
        .await;

    let mut records = harvester(&server, 0).records();
    let article = records
        .next()
        .await
        .expect("Expected an article")
        .expect("Harvest failed");
    assert_eq!(article.get_str("title"), Some("Referred"));
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_progress_line_and_json_output() {
    let server = MockServer::start().await;

    let links: Vec<String> = (1..=3).map(|i| format!("/story/{}", i)).collect();
    mount_search(&server, "1", search_page(&links)).await;
    for (i, link) in links.iter().enumerate() {
        mount_article(&server, link, article_page(&format!("Story {}", i + 1))).await;
    }

    let buffer = SharedBuffer::default();
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let mut sink = JsonDirectory::create(dir.path()).expect("Failed to create sink");

    let mut records = harvester(&server, 3)
        .progress_sink(Box::new(ProgressLine::new(buffer.clone(), 6, "#")))
        .records();

    let mut index = 0;
    while let Some(item) = records.next().await {
        sink.write(index, &item.expect("Harvest failed"))
            .expect("Failed to write article");
        index += 1;
    }

    assert_eq!(index, 3);
    assert!(dir.path().join("2.json").exists());

    let rendered = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(rendered.contains("[      ] 0% (0/3)"));
    assert!(rendered.contains("[####  ] 66.67% (2/3)"));
    assert!(rendered.contains("[######] 100% (3/3)"));
    assert!(rendered.contains("\nTotal time: "));
}
