//! Integration tests for the Navitia session (wiremock-based)

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use navitia::requests::{ConnectionsRequest, ExploreRequest, JourneyRequest, PlacesRequest};
use navitia::{
    CancellationToken, Collection, Connections, Continuation, ErrorKind, JourneyResults,
    NavitiaClient, NavitiaConfig, NavitiaError, Place, PtCollection, RenderError, Session,
};

/// `Basic base64("test-key:")`
const AUTH_HEADER: &str = "Basic dGVzdC1rZXk6";

fn config_for_mock(base_url: &str) -> NavitiaConfig {
    NavitiaConfig {
        base_url: format!("{base_url}/v1"),
        ..NavitiaConfig::for_testing()
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session_for_mock(server: &MockServer) -> Session {
    init_logging();
    Session::new(&config_for_mock(&server.uri())).unwrap()
}

fn sample_journeys_json(next: Option<&str>) -> String {
    let links = next.map_or_else(String::new, |href| {
        format!(r#"{{"href": "{href}", "type": "next", "rel": "next", "templated": false}}"#)
    });
    format!(
        r#"{{
            "journeys": [{{
                "duration": 1080,
                "nb_transfers": 0,
                "departure_date_time": "20260211T100000",
                "arrival_date_time": "20260211T101800",
                "type": "best",
                "from": {{
                    "id": "stop_area:OIF:SA:8768600",
                    "name": "Gare de Lyon (Paris)",
                    "embedded_type": "stop_area",
                    "quality": 0,
                    "stop_area": {{
                        "id": "stop_area:OIF:SA:8768600",
                        "name": "Gare de Lyon",
                        "coord": {{"lat": "48.844924", "lon": "2.373481"}}
                    }}
                }},
                "sections": [{{
                    "id": "section_0",
                    "type": "public_transport",
                    "duration": 1080,
                    "display_informations": {{"code": "A", "network": "RER", "direction": "Saint-Germain-en-Laye"}}
                }}]
            }}],
            "links": [{links}]
        }}"#
    )
}

#[tokio::test]
async fn test_journeys_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/journeys"))
        .and(header("authorization", AUTH_HEADER))
        .and(query_param("from", "stop_area:OIF:SA:8768600"))
        .and(query_param("to", "2.29;48.87"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_journeys_json(None)))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let cancel = CancellationToken::new();
    let request = JourneyRequest::new(
        "stop_area:OIF:SA:8768600",
        navitia::models::Coordinates::new(48.87, 2.29),
    )
    .with_count(1);

    let results = session.journeys(&cancel, &request).await.unwrap();

    assert_eq!(results.journeys.len(), 1);
    let journey = &results.journeys[0];
    assert_eq!(journey.duration, 1080);
    assert_eq!(journey.public_transport_sections().count(), 1);
    assert_eq!(journey.to_string(), "10:00 → 10:18 (18min, 0 transfers)");

    let from = journey.from.as_ref().unwrap();
    let Some(Place::StopArea(stop_area)) = from.place().unwrap() else {
        panic!("expected a stop area");
    };
    assert_eq!(stop_area.name, "Gare de Lyon");

    assert!(results.paging.is_terminal());
    assert!(results.timings.wait_time().is_some());
    assert!(results.timings.decode_time().is_some());
}

#[tokio::test]
async fn test_missing_credentials_are_rejected_before_sending() {
    let config = NavitiaConfig {
        api_key: String::new(),
        ..config_for_mock("http://127.0.0.1:9")
    };
    let err = Session::new(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_unknown_object_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/places"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"{"id": "unknown_object", "message": "Invalid id : stop_area:FOO"}"#,
        ))
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let err = session
        .places(&CancellationToken::new(), &PlacesRequest::new("nowhere"))
        .await
        .unwrap_err();

    let remote = err.remote().unwrap();
    assert_eq!(remote.status, 404);
    assert_eq!(remote.id, "unknown_object");
    assert_eq!(
        err.to_string(),
        "request error (id: unknown_object): Unknown Object: Invalid id : stop_area:FOO"
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/journeys"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string(r#"{"id": "service_unavailable", "message": "try later"}"#),
        )
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let err = session
        .journeys(
            &CancellationToken::new(),
            &JourneyRequest::new("stop_area:A", "stop_area:B"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.to_string(), "remote failure (id: service_unavailable): try later");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_undecodable_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let err = session
        .places(&CancellationToken::new(), &PlacesRequest::new("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, NavitiaError::Decode { .. }));
}

#[tokio::test]
async fn test_canceled_token_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_journeys_json(None)))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = session
        .journeys(&cancel, &JourneyRequest::new("stop_area:A", "stop_area:B"))
        .await
        .unwrap_err();
    assert!(err.is_canceled());
}

#[tokio::test]
async fn test_cancel_while_waiting() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sample_journeys_json(None))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = session
        .journeys(&cancel, &JourneyRequest::new("stop_area:A", "stop_area:B"))
        .await
        .unwrap_err();
    assert!(err.is_canceled());
}

#[tokio::test]
async fn test_cancel_while_reading_body() {
    init_logging();

    // Sends headers and the start of a body, then stalls
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await.unwrap();
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100000\r\n\r\n{\"journeys\": [",
            )
            .await
            .unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let session = Session::new(&config_for_mock(&format!("http://{addr}"))).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = session
        .journeys(&cancel, &JourneyRequest::new("stop_area:A", "stop_area:B"))
        .await
        .unwrap_err();
    assert!(err.is_canceled(), "{err}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sample_journeys_json(None))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = NavitiaConfig {
        timeout_secs: 1,
        ..config_for_mock(&server.uri())
    };
    let session = Session::new(&config).unwrap();
    let err = session
        .journeys(
            &CancellationToken::new(),
            &JourneyRequest::new("stop_area:A", "stop_area:B"),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_response_size_ceiling() {
    let server = MockServer::start().await;
    let body = sample_journeys_json(None);

    Mock::given(method("GET"))
        .and(path("/v1/journeys"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let request = JourneyRequest::new("stop_area:A", "stop_area:B");
    let cancel = CancellationToken::new();

    let config = NavitiaConfig {
        max_response_bytes: body.len() - 1,
        ..config_for_mock(&server.uri())
    };
    let err = Session::new(&config)
        .unwrap()
        .journeys(&cancel, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, NavitiaError::Decode { .. }));

    let config = NavitiaConfig {
        max_response_bytes: body.len(),
        ..config_for_mock(&server.uri())
    };
    let results = Session::new(&config)
        .unwrap()
        .journeys(&cancel, &request)
        .await
        .unwrap();
    assert_eq!(results.journeys.len(), 1);
}

#[tokio::test]
async fn test_pagination_fetches_next_href() {
    let server = MockServer::start().await;
    let next_href = format!(
        "{}/v1/journeys?from=stop_area%3AA&to=stop_area%3AB&after=page2",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/v1/journeys"))
        .and(query_param("after", "page2"))
        .and(header("authorization", AUTH_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_journeys_json(None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/journeys"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sample_journeys_json(Some(&next_href))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let cancel = CancellationToken::new();

    let first = session
        .journeys(&cancel, &JourneyRequest::new("stop_area:A", "stop_area:B"))
        .await
        .unwrap();
    let next = first.paging.next.as_ref().unwrap();
    assert_eq!(next.href(), next_href);

    let second: JourneyResults = next.fetch(&session, &cancel).await.unwrap();
    assert_eq!(second.journeys.len(), 1);
    assert!(second.paging.is_terminal());
}

#[tokio::test]
async fn test_pagination_refuses_foreign_origin() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_journeys_json(None)))
        .expect(0)
        .mount(&foreign)
        .await;

    let session = session_for_mock(&server);
    let link =
        Continuation::<JourneyResults>::new(format!("{}/v1/journeys?after=page2", foreign.uri()));

    let err = link
        .fetch(&session, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NavitiaError::Render(RenderError::InvalidParameter { name: "href", .. })
    ));
}

#[tokio::test]
async fn test_departures_and_arrivals() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/coverage/fr-idf/stop_areas/stop_area:OIF:SA:8768600/departures"))
        .and(query_param("count", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "departures": [
                    {"display_informations": {"code": "A"}, "stop_point": {"id": "sp:1"},
                     "stop_date_time": {"departure_date_time": "20260211T100500",
                                        "base_departure_date_time": "20260211T100000"}},
                    {"display_informations": {"code": "D"}, "stop_point": {"id": "sp:2"},
                     "stop_date_time": {"departure_date_time": "20260211T101000"}}
                ],
                "links": []
            }"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/coverage/fr-idf/arrivals"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"arrivals": [{"stop_point": {"id": "sp:3"}}], "links": []}"#,
        ))
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let cancel = CancellationToken::new();

    let request = ConnectionsRequest::new()
        .at(Collection::StopAreas, "stop_area:OIF:SA:8768600")
        .with_count(2);
    let departures = session.departures(&cancel, "fr-idf", &request).await.unwrap();
    let Connections::Departures(board) = &departures.connections else {
        panic!("expected departures");
    };
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].stop_date_time.departure_delay_minutes(), Some(5));

    let arrivals = session
        .scope("fr-idf")
        .arrivals(&cancel, &ConnectionsRequest::new())
        .await
        .unwrap();
    assert!(matches!(arrivals.connections, Connections::Arrivals(ref a) if a.len() == 1));
}

#[tokio::test]
async fn test_connections_without_known_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"disruptions": [], "links": []}"#),
        )
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let err = session
        .departures(&CancellationToken::new(), "fr-idf", &ConnectionsRequest::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NavitiaError::Decode { .. }));
    assert!(err.to_string().contains("no known key in response"));
}

#[tokio::test]
async fn test_explore_lines() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/coverage/fr-idf/networks/network:RER/lines"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "lines": [{"id": "line:A", "name": "RER A", "code": "A"}],
                "pagination": {"start_page": 0, "items_on_page": 1, "items_per_page": 25, "total_result": 1},
                "links": []
            }"#,
        ))
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let request = ExploreRequest::new(Collection::Lines).within(Collection::Networks, "network:RER");
    let results = session
        .explore(&CancellationToken::new(), "fr-idf", &request)
        .await
        .unwrap();

    let PtCollection::Lines(lines) = &results.objects else {
        panic!("expected lines");
    };
    assert_eq!(lines[0].code, "A");
    assert_eq!(results.pagination.unwrap().total_result, 1);
}

#[tokio::test]
async fn test_render_error_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_for_mock(&server);
    let cancel = CancellationToken::new();

    let err = session
        .journeys(&cancel, &JourneyRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, NavitiaError::Render(RenderError::MissingEndpoint)));

    let err = session
        .places(&cancel, &PlacesRequest::new(" "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
}
