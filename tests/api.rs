use agora_client::{
    AgoraClient, AgoraService, ApiError, ClientConfig, CommentDraft, DiscussionDraft, Operation,
    Stance, VoteChoice, VoteCounts, parse_references,
};
use httpmock::Method::{GET, PATCH, POST};
use httpmock::MockServer;
use serde_json::json;

fn service_for(server: &MockServer) -> AgoraService {
    let config = ClientConfig::parse(&server.base_url()).unwrap();
    AgoraService::new(AgoraClient::new(&config, None).unwrap())
}

#[tokio::test]
async fn list_normalizes_and_defaults_category() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/discussions/list")
                .header("Content-Type", "application/json")
                .header("ngrok-skip-browser-warning", "true");
            then.status(200).json_body(json!([
                {
                    "id": 1,
                    "title": "프랑스 혁명",
                    "content": "정당했는가",
                    "writer": "역사학도",
                    "created_at": "2024-01-15T09:00:00Z",
                    "category": null,
                    "comment_count": 3,
                    "vote_count": 8,
                    "read_count": 40,
                    "agree_count": 5,
                    "disagree_count": 3
                },
                { "id": 2, "title": "쇄국정책", "category": "조선사" }
            ]));
        })
        .await;

    let service = service_for(&server);
    let discussions = service.discussions().await.unwrap();
    list.assert_async().await;

    assert_eq!(discussions.len(), 2);
    let first = &discussions[0];
    assert_eq!(first.id, "1");
    assert_eq!(first.category, "일반");
    assert_eq!(first.author, "역사학도");
    assert_eq!(first.created_at, "2024. 1. 15.");
    assert_eq!(first.visitors_count, 40);
    assert_eq!(first.vote_counts, VoteCounts::new(5, 3));
    assert_eq!(first.user_vote, None);
    assert_eq!(discussions[1].category, "조선사");
    assert_eq!(discussions[1].description, "내용 없음");
}

#[tokio::test]
async fn list_no_content_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/list");
            then.status(204);
        })
        .await;

    let discussions = service_for(&server).discussions().await.unwrap();
    assert!(discussions.is_empty());
}

#[tokio::test]
async fn detail_merges_comments() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/7");
            then.status(200).json_body(json!({
                "id": 7,
                "title": "콜럼버스",
                "agreeCount": 2,
                "disagreeCount": 9,
                "comments": [
                    {
                        "id": 70,
                        "name": "세계사탐구",
                        "content": "침략입니다",
                        "agree": "DISAGREE",
                        "like_count": 4,
                        "references": [{ "reference_title": "사료", "reference_url": "https://x" }]
                    },
                    { "id": 71, "agree": "AGREE" }
                ]
            }));
        })
        .await;

    let detail = service_for(&server).discussion("7").await.unwrap();
    assert_eq!(detail.discussion.vote_counts, VoteCounts::new(2, 9));
    assert_eq!(detail.comments.len(), 2);
    assert_eq!(detail.comments[0].stance, Stance::Disagree);
    assert_eq!(detail.comments[0].avatar, "세");
    assert_eq!(detail.comments[0].references[0].url, "https://x");
    assert_eq!(detail.comments[1].author, "익명");
    assert_eq!(detail.comments[1].stance, Stance::Agree);
}

#[tokio::test]
async fn detail_not_found_is_localized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/404");
            then.status(404);
        })
        .await;

    let err = service_for(&server).discussion("404").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "토론을 찾을 수 없습니다");
}

#[tokio::test]
async fn vote_uses_reported_counts() {
    let server = MockServer::start_async().await;
    let vote = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/discussions/1/vote")
                .query_param("agree", "true");
            then.status(200)
                .json_body(json!({ "agree_count": 7, "disagree_count": 3 }));
        })
        .await;

    let result = service_for(&server)
        .vote("1", VoteChoice::Agree)
        .await
        .unwrap();
    vote.assert_async().await;
    assert_eq!(result.vote_counts, VoteCounts::new(7, 3));
    assert_eq!(result.user_vote, Some(VoteChoice::Agree));
    assert!(result.counts_known);
}

#[tokio::test]
async fn vote_empty_body_rereads_discussion() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/discussions/1/vote")
                .query_param("agree", "false");
            then.status(200).body("");
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/1");
            then.status(200)
                .json_body(json!({ "id": 1, "agree_count": 5, "disagree_count": 2 }));
        })
        .await;

    let result = service_for(&server)
        .vote("1", VoteChoice::Disagree)
        .await
        .unwrap();
    detail.assert_async().await;
    assert_eq!(result.vote_counts, VoteCounts::new(5, 2));
    assert_eq!(result.user_vote, Some(VoteChoice::Disagree));
    assert!(result.counts_known);
}

#[tokio::test]
async fn vote_acknowledgement_without_tallies_rereads_discussion() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/discussions/4/vote");
            then.status(200).json_body(json!({ "success": true }));
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/4");
            then.status(200)
                .json_body(json!({ "id": 4, "agreeCount": 8, "disagreeCount": 1 }));
        })
        .await;

    let result = service_for(&server)
        .vote("4", VoteChoice::Agree)
        .await
        .unwrap();
    detail.assert_async().await;
    assert_eq!(result.vote_counts, VoteCounts::new(8, 1));
    assert!(result.counts_known);
}

#[tokio::test]
async fn vote_malformed_body_and_failed_reread_is_zeroed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/discussions/1/vote");
            then.status(200).body("<html>tunnel</html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/1");
            then.status(500);
        })
        .await;

    let result = service_for(&server)
        .vote("1", VoteChoice::Agree)
        .await
        .unwrap();
    assert_eq!(result.vote_counts, VoteCounts::new(0, 0));
    assert_eq!(result.user_vote, Some(VoteChoice::Agree));
    assert!(!result.counts_known);
}

#[tokio::test]
async fn vote_on_missing_discussion_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/discussions/9/vote");
            then.status(404);
        })
        .await;

    let err = service_for(&server)
        .vote("9", VoteChoice::Agree)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::NotFound {
            operation: Operation::Vote
        }
    ));
}

#[tokio::test]
async fn create_discussion_sends_payload_and_maps_errors() {
    let server = MockServer::start_async().await;
    let created = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/discussions").json_body(json!({
                "name": "kim",
                "title": "새 토론",
                "content": "본문",
                "category": "일반"
            }));
            then.status(201).json_body(json!({
                "id": 12,
                "title": "새 토론",
                "content": "본문",
                "writer": "kim"
            }));
        })
        .await;

    let service = service_for(&server);
    let draft = DiscussionDraft {
        name: "kim".into(),
        title: "새 토론".into(),
        content: "본문".into(),
        category: None,
    };
    let discussion = service.create_discussion(&draft).await.unwrap();
    created.assert_async().await;
    assert_eq!(discussion.id, "12");
    assert_eq!(discussion.author, "kim");
    assert_eq!(discussion.category, "일반");

    created.delete_async().await;
    let mut bad = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/discussions");
            then.status(400);
        })
        .await;
    let err = service.create_discussion(&draft).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest));
    assert_eq!(err.to_string(), "잘못된 요청입니다. 필수 항목을 확인해주세요.");

    bad.delete_async().await;
    bad = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/discussions");
            then.status(500);
        })
        .await;
    let err = service.create_discussion(&draft).await.unwrap_err();
    assert!(matches!(err, ApiError::ServerError));

    bad.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/discussions");
            then.status(418);
        })
        .await;
    let err = service.create_discussion(&draft).await.unwrap_err();
    assert!(err.to_string().contains("418"), "{err}");
}

#[tokio::test]
async fn comment_payload_maps_stance_and_references() {
    let server = MockServer::start_async().await;
    let comment = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/discussions/3/comments")
                .json_body(json!({
                    "name": "lee",
                    "content": "찬성합니다",
                    "agree": "AGREE",
                    "references": [
                        { "reference_title": "A", "reference_url": "u1" },
                        { "reference_title": "B", "reference_url": "#" }
                    ]
                }));
            then.status(200).body("");
        })
        .await;

    let draft = CommentDraft {
        nickname: "lee".into(),
        content: "찬성합니다".into(),
        stance: Stance::Agree,
        references: parse_references("A, B", "u1"),
    };
    let posted = service_for(&server)
        .submit_comment("3", &draft)
        .await
        .unwrap();
    comment.assert_async().await;

    assert_eq!(posted.author, "lee");
    assert_eq!(posted.avatar, "L");
    assert_eq!(posted.likes, 0);
    assert!(!posted.is_liked);
    assert_eq!(posted.references.len(), 2);
    assert_eq!(posted.references[1].url, "#");
}

#[tokio::test]
async fn echoed_comment_is_normalized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/discussions/3/comments");
            then.status(200).json_body(json!({
                "id": 555,
                "name": "park",
                "content": "반대",
                "agree": "DISAGREE",
                "like_count": 0
            }));
        })
        .await;

    let draft = CommentDraft {
        nickname: "park".into(),
        content: "반대".into(),
        stance: Stance::Disagree,
        references: Vec::new(),
    };
    let posted = service_for(&server)
        .submit_comment("3", &draft)
        .await
        .unwrap();
    assert_eq!(posted.id, "555");
    assert_eq!(posted.stance, Stance::Disagree);
}

#[tokio::test]
async fn acknowledgements_fall_back_to_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/comments/5/like");
            then.status(200).body("");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/discussions/5/visit");
            then.status(200).body("not json");
        })
        .await;

    let service = service_for(&server);
    assert_eq!(service.toggle_like("5").await.unwrap(), json!({ "success": true }));
    assert_eq!(service.visit("5").await.unwrap(), json!({ "success": true }));
}

#[tokio::test]
async fn acknowledgement_errors_propagate() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/comments/5/like");
            then.status(503);
        })
        .await;

    let err = service_for(&server).toggle_like("5").await.unwrap_err();
    assert!(matches!(err, ApiError::UnknownStatus { .. }));
}

#[tokio::test]
async fn like_on_missing_comment_names_the_comment() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/comments/77/like");
            then.status(404);
        })
        .await;

    let err = service_for(&server).toggle_like("77").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "댓글을 찾을 수 없습니다");
}

#[tokio::test]
async fn comments_are_read_from_the_discussion() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/6");
            then.status(200).json_body(json!({
                "id": 6,
                "comments": [
                    { "id": 60, "name": "kim", "agree": "AGREE", "likes": 2 },
                    { "id": 61, "agree": "SOMETHING" }
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/9");
            then.status(200).json_body(json!({ "id": 9 }));
        })
        .await;

    let service = service_for(&server);
    let comments = service.comments("6").await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, "60");
    assert_eq!(comments[0].stance, Stance::Agree);
    assert_eq!(comments[1].stance, Stance::Neutral);
    assert!(service.comments("9").await.unwrap().is_empty());
}

#[tokio::test]
async fn open_discussion_counts_visit_first() {
    let server = MockServer::start_async().await;
    let visit = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/discussions/2/visit");
            then.status(500);
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/discussions/2");
            then.status(200).json_body(json!({ "id": 2, "read_count": 11 }));
        })
        .await;

    let opened = service_for(&server).open_discussion("2").await.unwrap();
    visit.assert_async().await;
    detail.assert_async().await;
    assert_eq!(opened.discussion.visitors_count, 11);
}

#[tokio::test]
async fn tunnel_bypass_header_can_be_disabled() {
    let server = MockServer::start_async().await;
    let with_header = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/discussions/list")
                .header_exists("ngrok-skip-browser-warning");
            then.status(200).json_body(json!([{ "id": 1 }]));
        })
        .await;

    let config = ClientConfig::parse(&server.base_url())
        .unwrap()
        .with_tunnel_bypass(false);
    let service = AgoraService::new(AgoraClient::new(&config, None).unwrap());
    // Without the header nothing matches and the mock server answers 404.
    assert!(service.discussions().await.is_err());
    assert_eq!(with_header.hits_async().await, 0);
}

#[tokio::test]
async fn connection_failure_is_network_error() {
    let config = ClientConfig::parse("http://127.0.0.1:1").unwrap();
    let service = AgoraService::new(AgoraClient::new(&config, None).unwrap());
    let err = service.discussions().await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }), "{err:?}");
}
