use std::sync::Arc;

use sharecount_core::{
    dispatch, normalize_count, CollectorConfig, HttpResponse, PlatformDescriptor,
    PlatformRegistry, ScriptedHttpClient, StatValue,
};

const TARGET: &str = "https://news.test/story?id=7";

#[derive(Clone)]
struct PlatformCase {
    name: &'static str,
    body: &'static str,
    expected_count: i64,
}

fn platform_cases() -> Vec<PlatformCase> {
    vec![
        PlatformCase {
            name: "facebook",
            body: r#"[{"url":"https://news.test/story?id=7","share_count":10,"like_count":4,
                "comment_count":2,"total_count":16,"click_count":0,"commentsbox_count":1}]"#,
            expected_count: 16,
        },
        PlatformCase {
            name: "pinterest",
            body: r#"receiveCount({"url":"https://news.test/story?id=7","count":21})"#,
            expected_count: 21,
        },
        PlatformCase {
            name: "linkedin",
            body: r#"IN.Tags.Share.handleCount({"count":8,"url":"https://news.test/story?id=7"});"#,
            expected_count: 8,
        },
        PlatformCase {
            name: "google_plus",
            body: r#"<script>window.__SSR = {c: 33.0 ,a: "x"};</script>"#,
            expected_count: 33,
        },
        PlatformCase {
            name: "reddit",
            body: r#"{"kind":"Listing","data":{"children":[{"kind":"t3","data":{"ups":40,"downs":3}}]}}"#,
            expected_count: 43,
        },
        PlatformCase {
            name: "buffer",
            body: r#"{"shares":5}"#,
            expected_count: 5,
        },
        PlatformCase {
            name: "stumbleupon",
            body: r#"{"result":{"url":"https://news.test/story?id=7","in_index":true,"views":"12"},"timestamp":1,"success":true}"#,
            expected_count: 12,
        },
        PlatformCase {
            name: "pocket",
            body: r#"<div class="widget"><em id="cnt">17</em></div>"#,
            expected_count: 17,
        },
        PlatformCase {
            name: "tumblr",
            body: r#"{"meta":{"status":200,"msg":"OK"},"response":{"url":"https://news.test/story?id=7","note_count":2}}"#,
            expected_count: 2,
        },
    ]
}

fn descriptor(registry: &PlatformRegistry, name: &str) -> Arc<PlatformDescriptor> {
    registry
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("platform '{name}' should be registered"))
}

#[test]
fn every_builtin_platform_has_a_contract_case() {
    let registry = PlatformRegistry::default();
    let mut covered: Vec<_> = platform_cases().iter().map(|case| case.name).collect();
    covered.sort_unstable();

    let mut registered: Vec<_> = registry
        .platforms()
        .iter()
        .filter(|platform| !platform.is_origin())
        .map(|platform| platform.name())
        .collect();
    registered.sort_unstable();

    assert_eq!(covered, registered);
}

#[test]
fn canned_payloads_parse_to_expected_counts() {
    let registry = PlatformRegistry::default();

    for case in platform_cases() {
        let platform = descriptor(&registry, case.name);
        let stat = platform
            .parse(&HttpResponse::ok(case.body))
            .unwrap_or_else(|error| panic!("platform '{}' failed to parse: {error}", case.name));

        let count = stat
            .count()
            .unwrap_or_else(|| panic!("platform '{}' should report a count", case.name));
        assert_eq!(
            normalize_count(count),
            case.expected_count,
            "platform '{}': count",
            case.name
        );
    }
}

#[test]
fn garbage_payloads_are_rejected_or_count_zero() {
    let registry = PlatformRegistry::default();

    for case in platform_cases() {
        let platform = descriptor(&registry, case.name);
        match platform.parse(&HttpResponse::ok("<<garbage>>")) {
            Err(_) => {}
            Ok(stat) => assert_eq!(
                stat.count().map(normalize_count),
                Some(0),
                "platform '{}': garbage must not invent a count",
                case.name
            ),
        }
    }
}

#[tokio::test]
async fn every_platform_requests_its_template_with_the_encoded_target() {
    let registry = PlatformRegistry::default();

    for case in platform_cases() {
        let platform = descriptor(&registry, case.name);
        let endpoint = platform.request_url(TARGET);
        assert!(
            endpoint.contains("https%3A%2F%2Fnews.test%2Fstory%3Fid%3D7"),
            "platform '{}': target must be percent-encoded, got {endpoint}",
            case.name
        );

        let scripted = ScriptedHttpClient::new().respond(endpoint.clone(), HttpResponse::ok(case.body));
        let stat = dispatch(&platform, TARGET, &CollectorConfig::new(), &scripted)
            .await
            .unwrap_or_else(|error| panic!("platform '{}' dispatch failed: {error}", case.name));

        assert_eq!(stat.name, case.name);
        assert_eq!(scripted.recorded_urls(), vec![endpoint]);
        assert!(matches!(stat.get("fetched_in"), Some(StatValue::Float(_))));
    }
}

#[tokio::test]
async fn jsonp_platforms_send_their_content_type() {
    let registry = PlatformRegistry::default();

    for name in ["pinterest", "linkedin"] {
        let platform = descriptor(&registry, name);
        let scripted = ScriptedHttpClient::new();

        let _ = dispatch(&platform, TARGET, &CollectorConfig::new(), &scripted).await;

        let requests = scripted.recorded_requests();
        assert_eq!(
            requests[0].header("content-type"),
            Some("application/javascript"),
            "platform '{name}': content type"
        );
    }
}
