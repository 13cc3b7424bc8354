use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{Comment, CommentTree, LinkId};
use crate::extractor::ContentExtractor;
use crate::fetcher::RetryPolicy;
use crate::tree::raw::{MoreStub, RawComment, RawNode, RawThing};

/// Deepest level the comment endpoints will return.
pub const MAX_DEPTH: usize = 10;

/// Secondary fetch for the children hidden behind a "more" stub
#[async_trait]
pub trait MoreChildrenSource: Send + Sync {
    async fn fetch_more(&self, link_id: &LinkId, children: &[String]) -> Result<Vec<RawThing>>;
}

/// A batch of sibling nodes waiting to be materialized.
struct WorkItem {
    nodes: Vec<RawThing>,
    depth: usize,
    parent: Option<usize>,
}

struct Slot {
    comment: Comment,
    depth: usize,
    children: Vec<usize>,
}

/// Comments of one session, linked by index. A child always has a higher
/// index than its parent.
#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    roots: Vec<usize>,
    by_id: HashMap<String, usize>,
}

impl Arena {
    fn insert(&mut self, comment: Comment, depth: usize, parent: Option<usize>) -> usize {
        let index = self.slots.len();
        self.by_id.insert(comment.id.clone(), index);
        self.slots.push(Slot {
            comment,
            depth,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.slots[p].children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    fn into_tree(self) -> CommentTree {
        let mut children: Vec<Vec<usize>> = Vec::with_capacity(self.slots.len());
        let mut built: Vec<Option<Comment>> = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            children.push(slot.children);
            built.push(Some(slot.comment));
        }

        for index in (0..built.len()).rev() {
            let replies: Vec<Comment> = children[index]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            if let Some(comment) = built[index].as_mut() {
                comment.replies = replies;
            }
        }

        CommentTree::new(
            self.roots
                .iter()
                .filter_map(|&root| built[root].take())
                .collect(),
        )
    }
}

/// Materializes one post's comment listing, expanding "more" stubs.
///
/// Siblings keep the order the API returned them in. A stub's children
/// take the stub's place among its siblings. Stubs whose expansion still
/// fails after the retry budget are dropped without error.
pub struct CommentTreeBuilder<'a> {
    source: &'a dyn MoreChildrenSource,
    extractor: &'a dyn ContentExtractor,
    retry: &'a RetryPolicy,
    link_id: &'a LinkId,
    max_depth: usize,
}

impl<'a> CommentTreeBuilder<'a> {
    pub fn new(
        source: &'a dyn MoreChildrenSource,
        extractor: &'a dyn ContentExtractor,
        retry: &'a RetryPolicy,
        link_id: &'a LinkId,
    ) -> Self {
        Self {
            source,
            extractor,
            retry,
            link_id,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH);
        self
    }

    pub async fn build(&self, roots: Vec<RawThing>) -> CommentTree {
        let mut arena = Arena::default();
        let mut requested: HashSet<String> = HashSet::new();
        let mut queue = VecDeque::from([WorkItem {
            nodes: roots,
            depth: 0,
            parent: None,
        }]);

        while let Some(WorkItem {
            nodes,
            depth,
            parent,
        }) = queue.pop_front()
        {
            let mut nodes = nodes.into_iter();

            while let Some(thing) = nodes.next() {
                match RawNode::decode(thing) {
                    Ok(RawNode::Comment(raw)) => {
                        if let Some(work) = self.materialize(&mut arena, raw, depth, parent) {
                            queue.push_back(work);
                        }
                    }
                    Ok(RawNode::More(stub)) => {
                        if depth >= self.max_depth {
                            debug!("Skipping stub below max depth {}", self.max_depth);
                            continue;
                        }
                        let Some(expanded) = self.expand(stub, &mut requested).await else {
                            continue;
                        };

                        // Expanded children go before the stub's remaining siblings.
                        let rest: Vec<RawThing> = nodes.by_ref().collect();
                        if !rest.is_empty() {
                            queue.push_front(WorkItem {
                                nodes: rest,
                                depth,
                                parent,
                            });
                        }
                        queue.push_front(WorkItem {
                            nodes: expanded,
                            depth,
                            parent,
                        });
                        break;
                    }
                    Ok(RawNode::Unknown(kind)) => {
                        debug!("Skipping node of kind {:?}", kind);
                    }
                    Err(e) => {
                        debug!("Skipping {}", e);
                    }
                }
            }
        }

        let tree = arena.into_tree();
        info!("Built comment tree for {} ({} comments)", self.link_id, tree.len());
        tree
    }

    /// Add one comment to the arena, returning its replies as follow-up work.
    ///
    /// A comment naming a `t1_` parent hangs under that parent and is
    /// skipped when the parent was never materialized, so a subtree cut at
    /// the depth cap stays cut at every level below it. Only comments with
    /// no parent or a `t3_` parent take the work item's placement.
    fn materialize(
        &self,
        arena: &mut Arena,
        raw: RawComment,
        depth: usize,
        parent: Option<usize>,
    ) -> Option<WorkItem> {
        let parent_comment = raw
            .parent_id
            .as_deref()
            .and_then(|id| id.strip_prefix("t1_"));
        let (parent, depth) = match parent_comment {
            Some(parent_id) => match arena.index_of(parent_id) {
                Some(found) => (Some(found), arena.slots[found].depth + 1),
                None => {
                    debug!(
                        "Skipping comment {} under unavailable parent {}",
                        raw.id, parent_id
                    );
                    return None;
                }
            },
            None => (parent, depth),
        };

        if depth >= self.max_depth {
            debug!("Skipping comment {} below max depth {}", raw.id, self.max_depth);
            return None;
        }
        if arena.contains(&raw.id) {
            debug!("Skipping duplicate comment {}", raw.id);
            return None;
        }

        let content = self.extractor.extract(&raw.body);
        let comment = Comment::new(raw.id, raw.body, content);
        let index = arena.insert(comment, depth, parent);

        if raw.replies.is_empty() {
            None
        } else {
            Some(WorkItem {
                nodes: raw.replies,
                depth: depth + 1,
                parent: Some(index),
            })
        }
    }

    /// Fetch a stub's children through the retry policy.
    ///
    /// Ids already requested in this session are not requested again.
    /// Returns `None` when there is nothing to fetch or the retries ran out.
    async fn expand(
        &self,
        stub: MoreStub,
        requested: &mut HashSet<String>,
    ) -> Option<Vec<RawThing>> {
        let ids: Vec<String> = stub
            .children
            .into_iter()
            .filter(|id| requested.insert(id.clone()))
            .collect();
        if ids.is_empty() {
            return None;
        }

        let source = self.source;
        let link_id = self.link_id;
        let ids: &[String] = &ids;

        match self
            .retry
            .execute(|| source.fetch_more(link_id, ids))
            .await
        {
            Ok(things) => {
                debug!("Expanded {} ids into {} nodes", ids.len(), things.len());
                Some(things)
            }
            Err(e) => {
                warn!(
                    "Dropping {} comments under {:?} after retries: {}",
                    ids.len(),
                    stub.parent_id,
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RedthreadError;
    use crate::extractor::MarkdownExtractor;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Serves scripted expansion results keyed by the requested id list.
    #[derive(Default)]
    struct ScriptedSource {
        responses: HashMap<String, Vec<Value>>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn respond(mut self, ids: &str, things: Vec<Value>) -> Self {
            self.responses.insert(ids.to_string(), things);
            self
        }

        fn fail(mut self, ids: &str) -> Self {
            self.failing.insert(ids.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MoreChildrenSource for ScriptedSource {
        async fn fetch_more(&self, link_id: &LinkId, children: &[String]) -> Result<Vec<RawThing>> {
            assert_eq!(link_id.as_str(), "t3_post");
            let key = children.join(",");
            self.calls.lock().unwrap().push(key.clone());

            if self.failing.contains(&key) {
                return Err(RedthreadError::Other("429 Too Many Requests".into()));
            }
            let things = self.responses.get(&key).cloned().unwrap_or_default();
            Ok(things
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap())
                .collect())
        }
    }

    fn t1(id: &str, body: &str, replies: Vec<Value>) -> Value {
        let replies = if replies.is_empty() {
            json!("")
        } else {
            json!({ "kind": "Listing", "data": { "children": replies } })
        };
        json!({ "kind": "t1", "data": { "id": id, "body": body, "replies": replies } })
    }

    fn t1_under(id: &str, parent: &str) -> Value {
        json!({ "kind": "t1", "data": { "id": id, "body": id, "parent_id": parent } })
    }

    fn more(children: &[&str]) -> Value {
        json!({ "kind": "more", "data": { "count": children.len(), "children": children } })
    }

    fn things(values: Vec<Value>) -> Vec<RawThing> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    async fn build(source: &ScriptedSource, roots: Vec<Value>) -> CommentTree {
        let extractor = MarkdownExtractor::default();
        let retry = RetryPolicy::default();
        let link_id = LinkId::for_post("post").unwrap();
        CommentTreeBuilder::new(source, &extractor, &retry, &link_id)
            .build(things(roots))
            .await
    }

    fn shape(tree: &CommentTree) -> Vec<(usize, String)> {
        tree.iter().map(|(d, c)| (d, c.id.clone())).collect()
    }

    fn entry(depth: usize, id: &str) -> (usize, String) {
        (depth, id.to_string())
    }

    #[tokio::test]
    async fn test_nested_replies_become_a_tree() {
        let source = ScriptedSource::default();
        let tree = build(
            &source,
            vec![
                t1("a", "top", vec![t1("a1", "reply", vec![t1("a1x", "deep", vec![])])]),
                t1("b", "second", vec![]),
            ],
        )
        .await;

        assert_eq!(
            shape(&tree),
            vec![entry(0, "a"), entry(1, "a1"), entry(2, "a1x"), entry(0, "b")]
        );
        assert_eq!(tree.comments[0].replies[0].raw_text, "reply");
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_content_is_extracted_per_comment() {
        let source = ScriptedSource::default();
        let tree = build(
            &source,
            vec![t1(
                "a",
                "Check ![](https://x.com/a.png) and [site](https://x.com/page)",
                vec![],
            )],
        )
        .await;

        let comment = &tree.comments[0];
        assert_eq!(comment.image_urls, vec!["https://x.com/a.png"]);
        assert_eq!(comment.links[0].label, "site");
        assert_eq!(comment.processed_text, "Check  and [site](https://x.com/page)");
        assert_eq!(
            comment.raw_text,
            "Check ![](https://x.com/a.png) and [site](https://x.com/page)"
        );
    }

    #[tokio::test]
    async fn test_more_stub_expands_in_place() {
        let source = ScriptedSource::default().respond(
            "m1,m2",
            vec![
                t1_under("m1", "t3_post"),
                t1_under("m1x", "t1_m1"),
                t1_under("m2", "t3_post"),
            ],
        );

        let tree = build(
            &source,
            vec![t1("a", "a", vec![]), more(&["m1", "m2"]), t1("z", "z", vec![])],
        )
        .await;

        assert_eq!(
            shape(&tree),
            vec![
                entry(0, "a"),
                entry(0, "m1"),
                entry(1, "m1x"),
                entry(0, "m2"),
                entry(0, "z"),
            ]
        );
        assert_eq!(source.calls(), vec!["m1,m2"]);
    }

    #[tokio::test]
    async fn test_nested_stub_attaches_under_its_parent() {
        let source = ScriptedSource::default()
            .respond("r2", vec![t1_under("r2", "t1_a"), more(&["r3"])])
            .respond("r3", vec![t1_under("r3", "t1_a")]);

        let tree = build(
            &source,
            vec![t1("a", "a", vec![t1("r1", "r1", vec![]), more(&["r2"])])],
        )
        .await;

        assert_eq!(
            shape(&tree),
            vec![entry(0, "a"), entry(1, "r1"), entry(1, "r2"), entry(1, "r3")]
        );
        assert_eq!(source.calls(), vec!["r2", "r3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_expansion_drops_branch() {
        let source = ScriptedSource::default().fail("c1,c2");
        let start = Instant::now();

        let tree = build(
            &source,
            vec![t1("a", "a", vec![]), more(&["c1", "c2"]), t1("b", "b", vec![])],
        )
        .await;

        assert_eq!(shape(&tree), vec![entry(0, "a"), entry(0, "b")]);
        assert_eq!(source.calls().len(), 5);
        assert_eq!(start.elapsed().as_secs(), 62);
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_nodes_are_skipped() {
        let source = ScriptedSource::default();
        let tree = build(
            &source,
            vec![
                json!({ "kind": "t1", "data": { "id": "deleted" } }),
                json!({ "kind": "t3", "data": { "id": "post" } }),
                json!({ "kind": "more", "data": "garbage" }),
                more(&[]),
                t1("ok", "fine", vec![]),
            ],
        )
        .await;

        assert_eq!(shape(&tree), vec![entry(0, "ok")]);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_are_not_emitted_or_refetched() {
        let source = ScriptedSource::default().respond(
            "x",
            vec![t1_under("a", "t3_post"), t1_under("x", "t3_post"), more(&["x"])],
        );

        let tree = build(
            &source,
            vec![t1("a", "a", vec![]), more(&["x"]), more(&["x"])],
        )
        .await;

        assert_eq!(shape(&tree), vec![entry(0, "a"), entry(0, "x")]);
        assert_eq!(source.calls(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_depth_is_capped() {
        let mut node = t1("d9", "d9", vec![t1("d10", "d10", vec![]), more(&["deeper"])]);
        for depth in (0..9).rev() {
            let id = format!("d{}", depth);
            node = t1(&id, &id, vec![node]);
        }

        let source = ScriptedSource::default();
        let tree = build(&source, vec![node]).await;

        let depths: Vec<usize> = tree.iter().map(|(d, _)| d).collect();
        assert_eq!(depths, (0..10).collect::<Vec<_>>());
        assert!(tree.iter().all(|(_, c)| c.id != "d10"));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_descendants_of_depth_capped_comment_are_dropped() {
        let source = ScriptedSource::default().respond(
            "x",
            vec![
                t1_under("x", "t1_p"),
                t1_under("y", "t1_x"),
                t1_under("z", "t1_y"),
                t1_under("w", "t1_z"),
            ],
        );
        let extractor = MarkdownExtractor::default();
        let retry = RetryPolicy::default();
        let link_id = LinkId::for_post("post").unwrap();

        let tree = CommentTreeBuilder::new(&source, &extractor, &retry, &link_id)
            .with_max_depth(4)
            .build(things(vec![t1(
                "root",
                "root",
                vec![t1("p", "p", vec![more(&["x"])])],
            )]))
            .await;

        assert_eq!(
            shape(&tree),
            vec![entry(0, "root"), entry(1, "p"), entry(2, "x"), entry(3, "y")]
        );
        assert_eq!(source.calls(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_comment_with_unknown_parent_is_skipped() {
        let source = ScriptedSource::default().respond(
            "o,k",
            vec![t1_under("o", "t1_gone"), t1_under("k", "t3_post")],
        );

        let tree = build(&source, vec![t1("a", "a", vec![]), more(&["o", "k"])]).await;

        assert_eq!(shape(&tree), vec![entry(0, "a"), entry(0, "k")]);
    }

    #[tokio::test]
    async fn test_custom_max_depth() {
        let source = ScriptedSource::default();
        let extractor = MarkdownExtractor::default();
        let retry = RetryPolicy::default();
        let link_id = LinkId::for_post("post").unwrap();

        let tree = CommentTreeBuilder::new(&source, &extractor, &retry, &link_id)
            .with_max_depth(1)
            .build(things(vec![t1("a", "a", vec![t1("b", "b", vec![])])]))
            .await;

        assert_eq!(shape(&tree), vec![entry(0, "a")]);
    }
}
