mod common;

use anyhow::Result;
use uuid::Uuid;

use common::Fixture;
use stride_server::service::FeedStrategy;
use stride_server::CoreError;
use stride_types::{FeedFilter, ListFeedRequest, PostStatus, ReactionType};

fn request(filter: FeedFilter, user_id: Option<Uuid>, page: i64, limit: i64) -> ListFeedRequest {
    ListFeedRequest {
        filter,
        user_id,
        page,
        limit,
    }
}

#[test]
fn test_default_feed_pages_newest_first() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("alice")?;
    let posts = (0..5)
        .map(|i| fx.post(&author, &format!("run {i}"), 50 - i * 10))
        .collect::<Result<Vec<_>>>()?;

    let first = fx.feed.list_feed(&request(FeedFilter::Default, None, 1, 2))?;
    assert_eq!(first.posts.len(), 2);
    assert_eq!(first.pagination.total, 5);
    assert_eq!(first.pagination.total_pages, 3);
    assert_eq!(first.pagination.offset, 0);
    assert_eq!(first.posts[0].id, posts[4].id);
    assert_eq!(first.posts[1].id, posts[3].id);

    let last = fx.feed.list_feed(&request(FeedFilter::Default, None, 3, 2))?;
    assert_eq!(last.posts.len(), 1);
    assert_eq!(last.posts[0].id, posts[0].id);
    assert!(!last.pagination.has_next());

    let beyond = fx.feed.list_feed(&request(FeedFilter::Default, None, 9, 2))?;
    assert!(beyond.posts.is_empty());
    assert_eq!(beyond.pagination.total, 5);
    Ok(())
}

#[test]
fn test_pages_concatenate_to_full_ordering() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("alice")?;
    for i in 0..7 {
        fx.post(&author, &format!("run {i}"), 5)?;
    }

    let everything = fx.feed.list_feed(&request(FeedFilter::Default, None, 1, 100))?;
    let mut stitched = Vec::new();
    for page in 1..=3 {
        let page = fx.feed.list_feed(&request(FeedFilter::Default, None, page, 3))?;
        stitched.extend(page.posts.into_iter().map(|p| p.id));
    }

    let expected: Vec<_> = everything.posts.into_iter().map(|p| p.id).collect();
    assert_eq!(stitched, expected);
    Ok(())
}

#[test]
fn test_hidden_and_deleted_posts_never_listed() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("alice")?;
    let visible = fx.post(&author, "visible", 3)?;
    let hidden = fx.post(&author, "hidden", 2)?;
    let deleted = fx.post(&author, "deleted", 1)?;
    fx.posts().set_status(&hidden.id, PostStatus::Hidden)?;
    fx.posts().soft_delete(&deleted.id)?;

    let page = fx.feed.list_feed(&request(FeedFilter::Default, None, 1, 10))?;
    let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![visible.id]);
    assert_eq!(page.pagination.total, 1);

    assert!(matches!(fx.feed.get_post(&hidden.id), Err(CoreError::NotFound(_))));
    assert!(matches!(fx.feed.get_post(&deleted.id), Err(CoreError::NotFound(_))));
    Ok(())
}

#[test]
fn test_feed_items_are_enriched() -> Result<()> {
    let fx = Fixture::new()?;
    let alice = fx.user("alice")?;
    let bob = fx.user("bob")?;
    let (post, run) = fx.post_with_run(&alice, "Tempo Tuesday", 8000.0, 2400)?;

    let first = fx.comment(&post, &bob, None, "strong pace", 3)?;
    let gone = fx.comment(&post, &bob, None, "typo", 2)?;
    fx.comments.remove(&gone.id)?;
    fx.comment(&post, &alice, Some(&first), "thanks!", 1)?;
    fx.react(&bob, &post, ReactionType::Fire, 0)?;
    fx.react(&bob, &post, ReactionType::Like, 0)?;

    let item = fx.feed.get_post(&post.id)?;
    assert_eq!(item.author.username, "alice");
    assert_eq!(item.comment_count, 2);
    assert_eq!(item.reaction_count, 2);
    assert!(item.trending_score.is_none());

    let summary = item.run.expect("run is attached");
    assert_eq!(summary.id, run.id);
    assert_eq!(summary.pace_seconds_per_km, 300.0);

    let detail = fx.feed.get_post_run(&post.id)?;
    assert_eq!(detail.route.as_deref(), Some("Riverside loop"));
    Ok(())
}

#[test]
fn test_post_without_run_has_no_run_detail() -> Result<()> {
    let fx = Fixture::new()?;
    let alice = fx.user("alice")?;
    let post = fx.post(&alice, "rest day", 1)?;

    assert!(fx.feed.get_post(&post.id)?.run.is_none());
    assert!(matches!(fx.feed.get_post_run(&post.id), Err(CoreError::NotFound(_))));
    assert!(matches!(fx.feed.get_post_run(&Fixture::unknown_id()), Err(CoreError::NotFound(_))));
    Ok(())
}

#[test]
fn test_following_feed_only_shows_followed_authors() -> Result<()> {
    let fx = Fixture::new()?;
    let viewer = fx.user("viewer")?;
    let followed = fx.user("followed")?;
    let stranger = fx.user("stranger")?;
    fx.follow(&viewer, &followed)?;

    let mine = fx.post(&followed, "long run", 2)?;
    fx.post(&stranger, "intervals", 1)?;
    fx.post(&viewer, "my own run", 0)?;

    let page = fx.feed.list_feed(&request(FeedFilter::Following, Some(viewer.id), 1, 10))?;
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].id, mine.id);
    assert!(page.posts.iter().all(|p| p.author.id == followed.id));
    Ok(())
}

#[test]
fn test_following_nobody_is_an_empty_page() -> Result<()> {
    let fx = Fixture::new()?;
    let loner = fx.user("loner")?;
    let other = fx.user("other")?;
    fx.post(&other, "public run", 1)?;

    assert_eq!(fx.feed.plan(FeedFilter::Following, Some(loner.id))?, FeedStrategy::Empty);

    let page = fx.feed.list_feed(&request(FeedFilter::Following, Some(loner.id), 1, 10))?;
    assert!(page.posts.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.total_pages, 1);
    Ok(())
}

#[test]
fn test_following_requires_user_id() -> Result<()> {
    let fx = Fixture::new()?;
    let result = fx.feed.list_feed(&request(FeedFilter::Following, None, 1, 10));
    assert!(matches!(result, Err(CoreError::Input(_))));
    Ok(())
}

#[test]
fn test_invalid_page_and_limit_are_rejected() -> Result<()> {
    let fx = Fixture::new()?;
    for (page, limit) in [(0, 10), (1, 0), (-3, 10), (1, -1)] {
        let result = fx.feed.list_feed(&request(FeedFilter::Default, None, page, limit));
        assert!(matches!(result, Err(CoreError::Input(_))), "page={page} limit={limit}");
    }
    Ok(())
}

#[test]
fn test_trending_ranks_by_recent_engagement() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("author")?;
    let fans = fx.users("fan", 3)?;

    // Older post with three fresh reactions
    let hot = fx.post(&author, "hot", 600)?;
    for fan in &fans {
        fx.react(fan, &hot, ReactionType::Fire, 1)?;
    }
    // Newer post whose reactions are outside the one-day window
    let stale = fx.post(&author, "stale", 60)?;
    for fan in fans.iter().take(2) {
        fx.react(fan, &stale, ReactionType::Like, 48)?;
    }
    let quiet = fx.post(&author, "quiet", 1)?;

    assert_eq!(fx.scorer.score(&hot.id, 1.0)?, 3);
    assert_eq!(fx.scorer.score(&stale.id, 1.0)?, 0);
    assert_eq!(fx.scorer.score(&stale.id, 3.0)?, 2);

    let page = fx.feed.list_feed(&request(FeedFilter::Trending, None, 1, 10))?;
    let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
    // Ties at zero fall back to newest first
    assert_eq!(ids, vec![hot.id, quiet.id, stale.id]);
    assert_eq!(page.posts[0].trending_score, Some(3));
    assert_eq!(page.posts[2].trending_score, Some(0));
    Ok(())
}

#[test]
fn test_trending_counts_live_comments_not_deleted_ones() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("author")?;
    let fan = fx.user("fan")?;
    let post = fx.post(&author, "chatty", 30)?;

    fx.comment(&post, &fan, None, "nice", 10)?;
    let removed = fx.comment(&post, &fan, None, "oops", 5)?;
    fx.comments.remove(&removed.id)?;
    fx.react(&fan, &post, ReactionType::Insightful, 0)?;

    assert_eq!(fx.scorer.score(&post.id, 1.0)?, 2);
    Ok(())
}

#[test]
fn test_trending_pages_slice_the_ranked_list() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("author")?;
    let fans = fx.users("fan", 4)?;

    // post i gets i reactions, so the ranking is the reverse of creation
    let mut posts = Vec::new();
    for i in 0..4 {
        let post = fx.post(&author, &format!("p{i}"), 100 - i as i64)?;
        for fan in fans.iter().take(i) {
            fx.react(fan, &post, ReactionType::Like, 0)?;
        }
        posts.push(post);
    }

    let second = fx.feed.list_feed(&request(FeedFilter::Trending, None, 2, 2))?;
    let ids: Vec<_> = second.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![posts[1].id, posts[0].id]);
    assert_eq!(second.pagination.total, 4);
    assert_eq!(second.pagination.total_pages, 2);
    Ok(())
}

#[test]
fn test_score_rejects_bad_window() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("author")?;
    let post = fx.post(&author, "p", 1)?;

    assert!(matches!(fx.scorer.score(&post.id, 0.0), Err(CoreError::Input(_))));
    assert!(matches!(fx.scorer.score(&post.id, -2.5), Err(CoreError::Input(_))));
    assert!(matches!(fx.scorer.score(&post.id, f64::NAN), Err(CoreError::Input(_))));
    Ok(())
}

#[test]
fn test_score_batch_includes_zero_scores() -> Result<()> {
    let fx = Fixture::new()?;
    let author = fx.user("author")?;
    let fan = fx.user("fan")?;
    let busy = fx.post(&author, "busy", 2)?;
    let idle = fx.post(&author, "idle", 1)?;
    fx.react(&fan, &busy, ReactionType::Funny, 0)?;

    let scores = fx.scorer.score_batch(&[busy.id, idle.id], 0.5)?;
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[&busy.id], 1);
    assert_eq!(scores[&idle.id], 0);
    assert!(fx.scorer.score_batch(&[], 1.0)?.is_empty());
    Ok(())
}
