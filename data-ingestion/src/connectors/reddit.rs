use async_trait::async_trait;
use common::{PostSummary, RawComment, Result, ScrapeError, ThreadSource};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";

/// `/api/morechildren` accepts at most this many ids per call
const MORE_CHILDREN_BATCH: usize = 100;

/// Application-only OAuth credentials
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Reddit API connector (application-only OAuth)
pub struct RedditConnector {
    client: Client,
    credentials: RedditCredentials,
    auth_url: String,
    api_url: String,
    token: RwLock<Option<AccessToken>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

/// Any node of a listing; `data` is decoded according to `kind`
#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    #[serde(default)]
    body: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoreData {
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    things: Vec<Thing>,
}

/// A top-level entry of a comment tree: a comment or a "load more" placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevelNode {
    Comment(RawComment),
    More(Vec<String>),
}

impl RedditConnector {
    pub fn new(credentials: RedditCredentials) -> Result<Self> {
        Self::with_endpoints(credentials, AUTH_URL, API_URL)
    }

    pub fn with_endpoints(
        credentials: RedditCredentials,
        auth_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self> {
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(ScrapeError::Auth("client id and secret are required".to_string()));
        }

        let client = Client::builder()
            .user_agent(credentials.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            credentials,
            auth_url: auth_url.into(),
            api_url: api_url.into(),
            token: RwLock::new(None),
        })
    }

    /// Current bearer token, requesting a new one when missing or expired
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting application access token");

        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ScrapeError::Auth("credentials rejected".to_string()));
        }

        let body: TokenResponse = response.error_for_status()?.json().await?;
        let value = match (body.access_token, body.error) {
            (Some(value), _) => value,
            (None, Some(error)) => return Err(ScrapeError::Auth(error)),
            (None, None) => return Err(ScrapeError::Auth("no access token issued".to_string())),
        };

        // Renew a minute early so a token never expires mid-cycle
        let lifetime = Duration::from_secs(body.expires_in.saturating_sub(60));
        *self.token.write().await = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(value)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    async fn expand_more(&self, link_id: &str, ids: &[String]) -> Result<Vec<TopLevelNode>> {
        let mut nodes = Vec::new();

        for batch in ids.chunks(MORE_CHILDREN_BATCH) {
            let body = self
                .get(
                    "/api/morechildren",
                    &[
                        ("api_type", "json".to_string()),
                        ("link_id", link_id.to_string()),
                        ("children", batch.join(",")),
                        ("raw_json", "1".to_string()),
                    ],
                )
                .await?;
            nodes.extend(parse_more_children(&body, link_id)?);
        }

        Ok(nodes)
    }
}

#[async_trait]
impl ThreadSource for RedditConnector {
    async fn hot_posts(&self, community: &str, limit: usize) -> Result<Vec<PostSummary>> {
        let body = self
            .get(&format!("/r/{}/hot", community), &[("limit", limit.to_string())])
            .await?;

        let mut posts = parse_hot_listing(&body)?;
        posts.truncate(limit);

        debug!(community, count = posts.len(), "Hot posts fetched");
        Ok(posts)
    }

    async fn top_level_comments(
        &self,
        post_id: &str,
        expand_limit: usize,
    ) -> Result<Vec<RawComment>> {
        let body = self
            .get(&format!("/comments/{}", post_id), &[("raw_json", "1".to_string())])
            .await?;

        let link = format!("t3_{}", post_id);
        let link_id = link.as_str();
        let nodes = parse_comment_tree(&body)?;
        let expanded = expand_top_level(nodes, expand_limit, move |ids| async move {
            self.expand_more(link_id, &ids).await
        })
        .await?;

        if expanded.dropped > 0 {
            debug!(dropped = expanded.dropped, "Unexpanded comments left behind");
        }
        let comments = expanded.comments;
        info!(post_id, comments = comments.len(), "Top-level comments fetched");

        Ok(comments)
    }
}

/// Top-level comments left after expanding `more` placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedComments {
    pub comments: Vec<RawComment>,
    /// Comment ids behind placeholders that were not expanded
    pub dropped: usize,
}

/// Walk the top-level nodes in thread order, expanding at most `expand_limit`
/// placeholders with `expand`. Expanded nodes take the placeholder's position
/// and may contain placeholders of their own, which share the same budget.
pub async fn expand_top_level<F, Fut>(
    nodes: Vec<TopLevelNode>,
    expand_limit: usize,
    mut expand: F,
) -> Result<ExpandedComments>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<TopLevelNode>>>,
{
    let mut queue: VecDeque<TopLevelNode> = nodes.into();
    let mut budget = expand_limit;
    let mut comments = Vec::new();
    let mut dropped = 0usize;

    while let Some(node) = queue.pop_front() {
        match node {
            TopLevelNode::Comment(comment) => comments.push(comment),
            TopLevelNode::More(ids) if budget > 0 && !ids.is_empty() => {
                budget -= 1;
                let requested = ids.len();
                let expanded = expand(ids).await?;
                debug!(requested, received = expanded.len(), "Expanded more-comments");
                for node in expanded.into_iter().rev() {
                    queue.push_front(node);
                }
            }
            TopLevelNode::More(ids) => dropped += ids.len(),
        }
    }

    Ok(ExpandedComments { comments, dropped })
}

fn decode<T: serde::de::DeserializeOwned>(thing: Thing) -> Result<T> {
    serde_json::from_value(thing.data)
        .map_err(|e| ScrapeError::Forum(format!("bad {} node: {}", thing.kind, e)))
}

/// Posts (`t3` nodes) of a subreddit listing, in listing order
pub fn parse_hot_listing(body: &str) -> Result<Vec<PostSummary>> {
    let listing: Listing = serde_json::from_str(body)?;

    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| decode::<PostData>(thing).map(|p| PostSummary { id: p.id, title: p.title }))
        .collect()
}

/// Top-level nodes of a `/comments/{id}` response.
///
/// The response is a pair of listings; the second holds the comment tree.
pub fn parse_comment_tree(body: &str) -> Result<Vec<TopLevelNode>> {
    let listings: Vec<Listing> = serde_json::from_str(body)?;
    let tree = listings
        .into_iter()
        .nth(1)
        .ok_or_else(|| ScrapeError::Forum("comment listing missing".to_string()))?;

    let mut nodes = Vec::new();
    for thing in tree.data.children {
        match thing.kind.as_str() {
            "t1" => {
                let data: CommentData = decode(thing)?;
                nodes.push(TopLevelNode::Comment(RawComment::new(data.body, data.score)));
            }
            "more" => {
                let data: MoreData = decode(thing)?;
                nodes.push(TopLevelNode::More(data.children));
            }
            other => warn!(kind = other, "Skipping unexpected node in comment tree"),
        }
    }

    Ok(nodes)
}

/// Top-level nodes of a `/api/morechildren` response.
///
/// The endpoint returns a flat list of every expanded descendant; only nodes
/// whose parent is the post itself are kept.
pub fn parse_more_children(body: &str, link_id: &str) -> Result<Vec<TopLevelNode>> {
    let response: MoreChildrenResponse = serde_json::from_str(body)?;

    if !response.json.errors.is_empty() {
        return Err(ScrapeError::Forum(format!(
            "morechildren errors: {:?}",
            response.json.errors
        )));
    }

    let things = response.json.data.map(|d| d.things).unwrap_or_default();
    let mut nodes = Vec::new();

    for thing in things {
        match thing.kind.as_str() {
            "t1" => {
                let data: CommentData = decode(thing)?;
                if data.parent_id.as_deref() == Some(link_id) {
                    nodes.push(TopLevelNode::Comment(RawComment::new(data.body, data.score)));
                }
            }
            "more" => {
                let data: MoreData = decode(thing)?;
                if data.parent_id.as_deref() == Some(link_id) {
                    nodes.push(TopLevelNode::More(data.children));
                }
            }
            _ => {}
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hot_listing() {
        let body = r#"{"kind":"Listing","data":{"children":[
            {"kind":"t3","data":{"id":"abc1","title":"Weekly Support Thread","score":10}},
            {"kind":"t3","data":{"id":"abc2","title":"Daily Discussion - October 17, 2026 (GMT+0)"}}
        ]}}"#;

        let posts = parse_hot_listing(body).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].id, "abc2");
        assert!(posts[1].title.contains("Daily Discussion"));
    }

    #[test]
    fn test_parse_comment_tree_keeps_order() {
        let body = r#"[
            {"kind":"Listing","data":{"children":[{"kind":"t3","data":{"id":"abc2","title":"Daily Discussion"}}]}},
            {"kind":"Listing","data":{"children":[
                {"kind":"t1","data":{"body":"Pinned rules","score":1,"parent_id":"t3_abc2"}},
                {"kind":"t1","data":{"body":"BTC to the moon","score":42,"parent_id":"t3_abc2"}},
                {"kind":"more","data":{"count":2,"children":["c9","c10"],"parent_id":"t3_abc2"}}
            ]}}
        ]"#;

        let nodes = parse_comment_tree(body).unwrap();
        assert_eq!(
            nodes,
            vec![
                TopLevelNode::Comment(RawComment::new("Pinned rules", 1)),
                TopLevelNode::Comment(RawComment::new("BTC to the moon", 42)),
                TopLevelNode::More(vec!["c9".to_string(), "c10".to_string()]),
            ]
        );
    }

    #[test]
    fn test_parse_comment_tree_missing_listing() {
        let body = r#"[{"kind":"Listing","data":{"children":[]}}]"#;
        assert!(matches!(parse_comment_tree(body), Err(ScrapeError::Forum(_))));
    }

    #[test]
    fn test_parse_more_children_top_level_only() {
        let body = r#"{"json":{"errors":[],"data":{"things":[
            {"kind":"t1","data":{"body":"ETH looks strong","score":5,"parent_id":"t3_abc2"}},
            {"kind":"t1","data":{"body":"reply to c9","score":2,"parent_id":"t1_c9"}},
            {"kind":"more","data":{"children":["c11"],"parent_id":"t3_abc2"}}
        ]}}}"#;

        let nodes = parse_more_children(body, "t3_abc2").unwrap();
        assert_eq!(
            nodes,
            vec![
                TopLevelNode::Comment(RawComment::new("ETH looks strong", 5)),
                TopLevelNode::More(vec!["c11".to_string()]),
            ]
        );
    }

    #[test]
    fn test_parse_more_children_errors() {
        let body = r#"{"json":{"errors":[["RATELIMIT","slow down"]]}}"#;
        assert!(parse_more_children(body, "t3_abc2").is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let credentials = RedditCredentials {
            client_id: String::new(),
            client_secret: "secret".to_string(),
            user_agent: "crypto-pulse-test".to_string(),
        };
        assert!(matches!(RedditConnector::new(credentials), Err(ScrapeError::Auth(_))));
    }

    fn comment(body: &str) -> TopLevelNode {
        TopLevelNode::Comment(RawComment::new(body, 1))
    }

    fn more(ids: &[&str]) -> TopLevelNode {
        TopLevelNode::More(ids.iter().map(|id| id.to_string()).collect())
    }

    /// A, [c1 c2], B where c1 c2 expand to C, [c3], D and c3 expands to E
    async fn expand_thread(expand_limit: usize) -> (ExpandedComments, Vec<Vec<String>>) {
        let mut calls = Vec::new();
        let nodes = vec![comment("A"), more(&["c1", "c2"]), comment("B")];

        let expanded = expand_top_level(nodes, expand_limit, |ids| {
            let children = match ids.join(",").as_str() {
                "c1,c2" => vec![comment("C"), more(&["c3"]), comment("D")],
                "c3" => vec![comment("E")],
                _ => Vec::new(),
            };
            calls.push(ids);
            async move { Ok(children) }
        })
        .await
        .unwrap();

        (expanded, calls)
    }

    fn bodies(expanded: &ExpandedComments) -> Vec<&str> {
        expanded.comments.iter().map(|c| c.body.as_str()).collect()
    }

    #[tokio::test]
    async fn test_expand_limit_zero_keeps_direct_comments() {
        let (expanded, calls) = expand_thread(0).await;

        assert!(calls.is_empty());
        assert_eq!(bodies(&expanded), vec!["A", "B"]);
        assert_eq!(expanded.dropped, 2);
    }

    #[tokio::test]
    async fn test_expand_limit_one_stops_after_budget() {
        let (expanded, calls) = expand_thread(1).await;

        assert_eq!(calls, vec![vec!["c1".to_string(), "c2".to_string()]]);
        assert_eq!(bodies(&expanded), vec!["A", "C", "D", "B"]);
        assert_eq!(expanded.dropped, 1);
    }

    #[tokio::test]
    async fn test_expand_nested_placeholders_in_thread_order() {
        let (expanded, calls) = expand_thread(2).await;

        assert_eq!(calls.len(), 2);
        assert_eq!(bodies(&expanded), vec!["A", "C", "E", "D", "B"]);
        assert_eq!(expanded.dropped, 0);
    }

    #[tokio::test]
    async fn test_expand_error_propagates() {
        let result = expand_top_level(vec![more(&["c1"])], 1, |_| async {
            Err(ScrapeError::Forum("rate limited".to_string()))
        })
        .await;

        assert!(matches!(result, Err(ScrapeError::Forum(_))));
    }
}
