use std::sync::Arc;

use depth_crawler::config::ParserKind;
use depth_crawler::crawler::{CrawlEngine, CrawlError, CrawlerConfig, FetchError, NullSink};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1) // every page must be fetched exactly once
        .mount(server)
        .await;
}

fn engine(max_depth: usize, parser: ParserKind) -> CrawlEngine {
    let config = Arc::new(CrawlerConfig::new().with_max_depth(max_depth).with_request_timeout(5));
    CrawlEngine::new(config)
        .with_parser(parser.build())
        .with_sink(Arc::new(NullSink))
}

#[tokio::test]
async fn test_traversal_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;

    serve(&server, "/p1", r#"
        <html><head><title>Home</title></head><body>
            <a href="/p2.html">Two</a>
            <a href="/p1">Home</a>
            <a href="/docs/guide">Guide</a>
            <img src="/img/pic.png">
        </body></html>
    "#).await;
    serve(&server, "/p2.html", r#"<title>Two</title><a href="/docs/guide">Guide</a><a href="/p1">Home</a>"#).await;
    serve(&server, "/docs/guide", r#"<title>Guide</title><a href="/docs/deep">Deep</a>"#).await;
    Mock::given(path("/img/pic.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let seed = format!("{}/p1", server.uri());
    let tree = engine(3, ParserKind::Html).start_traversal(&seed).await?;

    // /docs/guide is reached first through /p2.html
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.root().page().title(), "Home");
    assert_eq!(tree.root().page().files(), vec![format!("{}/img/pic.png", server.uri())]);
    let two = tree.child(tree.root(), &format!("{}/p2.html", server.uri())).unwrap();
    let guide = tree.child(two, &format!("{}/docs/guide", server.uri())).unwrap();
    assert_eq!(guide.depth(), 3);
    assert!(!tree.is_interrupted());

    let json = serde_json::to_value(tree.report())?;
    assert_eq!(json["children"][0]["children"][0]["title"], "Guide");
    Ok(())
}

#[tokio::test]
async fn test_search_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;

    serve(&server, "/start", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    serve(&server, "/a", r#"Ferris the crab <a href="/c">c</a>"#).await;
    serve(&server, "/b", r#"nothing to see <a href="/a">a</a>"#).await;
    serve(&server, "/c", "another crab").await;

    let seed = format!("{}/start", server.uri());
    let result = engine(3, ParserKind::Regex).start_search(&seed, &["crab"]).await?;

    let matched: Vec<String> = result.matches().map(|node| node.url().to_string()).collect();
    assert_eq!(
        matched,
        vec![format!("{}/a", server.uri()), format!("{}/c", server.uri())]
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_seed_over_http() {
    let server = MockServer::start().await;
    Mock::given(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/down", server.uri());
    let err = engine(3, ParserKind::Regex).start_traversal(&seed).await.unwrap_err();

    assert!(matches!(err, CrawlError::RootUnreachable { source: FetchError::Status(503), .. }));
}
