//! Integration tests for the record store repositories.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde_json::Map;

use agora_common::IdGenerator;
use agora_db::records::{
    CommunityKind, Poll, PollCommunity, PollEvent, PollEventKind, PollOption, Stance, StanceChoice,
    Volume,
};
use agora_db::repositories::{
    CommunityRepository, DiscussionRepository, GroupRepository, PollEventRepository,
    PollOptionRepository, PollRepository, StanceChoiceRepository, StanceRepository,
};
use agora_db::test_utils::TestStore;

fn poll(id: &str, title: &str) -> Poll {
    Poll {
        id: id.to_string(),
        poll_type: "poll".to_string(),
        title: title.to_string(),
        details: None,
        author_id: "author".to_string(),
        group_id: None,
        discussion_id: None,
        closing_at: None,
        closed_at: None,
        multiple_choice: false,
        custom_fields: Map::new(),
        stance_data: BTreeMap::new(),
        stance_counts: Vec::new(),
        matrix_counts: None,
        stances_count: 0,
        undecided_count: 0,
        created_at: Utc::now(),
    }
}

fn option(id: &str, poll_id: &str, name: &str, priority: i32) -> PollOption {
    PollOption {
        id: id.to_string(),
        poll_id: poll_id.to_string(),
        name: name.to_string(),
        priority,
    }
}

fn stance(id: &str, poll_id: &str, participant: &str) -> Stance {
    Stance {
        id: id.to_string(),
        poll_id: poll_id.to_string(),
        participant_id: participant.to_string(),
        latest: true,
        reason: None,
        cast_at: Utc::now(),
    }
}

fn choice(id: &str, stance_id: &str, option_id: &str, score: i64) -> StanceChoice {
    StanceChoice {
        id: id.to_string(),
        stance_id: stance_id.to_string(),
        poll_option_id: option_id.to_string(),
        score,
        has_reason: false,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn replace_latest_flips_prior_stances() {
    let fixtures = TestStore::new();
    let stances = StanceRepository::new(fixtures.store.clone());

    stances
        .replace_latest(stance("s1", "p1", "alice"), vec![])
        .await
        .expect("first stance");
    stances
        .replace_latest(stance("s2", "p1", "alice"), vec![])
        .await
        .expect("second stance");

    assert_eq!(stances.count_latest("p1").await.expect("count"), 1);
    let latest = stances.latest_for_poll("p1").await.expect("latest");
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, "s2");

    let first = stances
        .find_by_id("s1")
        .await
        .expect("query")
        .expect("still stored");
    assert!(!first.latest);
}

#[tokio::test]
async fn replace_latest_keeps_other_participants() {
    let fixtures = TestStore::new();
    let stances = StanceRepository::new(fixtures.store.clone());

    stances
        .replace_latest(stance("s1", "p1", "alice"), vec![])
        .await
        .expect("alice");
    stances
        .replace_latest(stance("s2", "p1", "bob"), vec![])
        .await
        .expect("bob");

    assert_eq!(stances.count_latest("p1").await.expect("count"), 2);
    assert_eq!(
        stances.participant_ids("p1").await.expect("participants"),
        vec!["alice", "bob"]
    );
}

#[tokio::test]
async fn sums_scores_of_latest_stances_by_option_name() {
    let fixtures = TestStore::new();
    let options = PollOptionRepository::new(fixtures.store.clone());
    let stances = StanceRepository::new(fixtures.store.clone());
    let choices = StanceChoiceRepository::new(fixtures.store.clone());

    options.create(option("o1", "p1", "apple", 0)).await.expect("o1");
    options.create(option("o2", "p1", "banana", 1)).await.expect("o2");

    stances
        .replace_latest(stance("s1", "p1", "alice"), vec![choice("c1", "s1", "o1", 2)])
        .await
        .expect("alice");
    // Alice re-votes; her first choice must no longer count.
    stances
        .replace_latest(stance("s2", "p1", "alice"), vec![choice("c2", "s2", "o2", 3)])
        .await
        .expect("alice again");
    stances
        .replace_latest(stance("s3", "p1", "bob"), vec![choice("c3", "s3", "o2", 1)])
        .await
        .expect("bob");

    let sums = choices
        .sum_scores_by_option_name("p1")
        .await
        .expect("aggregate");
    assert_eq!(sums.get("apple"), None);
    assert_eq!(sums.get("banana"), Some(&4));
}

#[tokio::test]
async fn removing_options_cascades_to_choices() {
    let fixtures = TestStore::new();
    let options = PollOptionRepository::new(fixtures.store.clone());
    let stances = StanceRepository::new(fixtures.store.clone());
    let choices = StanceChoiceRepository::new(fixtures.store.clone());

    options.create(option("o1", "p1", "apple", 0)).await.expect("o1");
    options.create(option("o2", "p1", "banana", 1)).await.expect("o2");
    stances
        .replace_latest(
            stance("s1", "p1", "alice"),
            vec![choice("c1", "s1", "o1", 1), choice("c2", "s1", "o2", 1)],
        )
        .await
        .expect("stance");

    let removed = options
        .remove_by_names("p1", &["apple".to_string()])
        .await
        .expect("remove");
    assert_eq!(removed, 1);

    assert_eq!(
        options.names_for_poll("p1").await.expect("names"),
        vec!["banana"]
    );
    let sums = choices
        .sum_scores_by_option_name("p1")
        .await
        .expect("aggregate");
    assert_eq!(sums.len(), 1);
    assert_eq!(sums.get("banana"), Some(&1));
}

#[tokio::test]
async fn duplicate_option_names_are_rejected() {
    let fixtures = TestStore::new();
    let options = PollOptionRepository::new(fixtures.store.clone());

    options.create(option("o1", "p1", "apple", 0)).await.expect("o1");
    let err = options.create(option("o2", "p1", "apple", 1)).await;
    assert!(err.is_err());

    // Same name on a different poll is fine.
    options.create(option("o3", "p2", "apple", 0)).await.expect("o3");
}

#[tokio::test]
async fn deleting_a_poll_cascades() {
    let fixtures = TestStore::new();
    let polls = PollRepository::new(fixtures.store.clone());
    let options = PollOptionRepository::new(fixtures.store.clone());
    let stances = StanceRepository::new(fixtures.store.clone());
    let choices = StanceChoiceRepository::new(fixtures.store.clone());
    let events = PollEventRepository::new(fixtures.store.clone());

    polls.create(poll("p1", "Lunch")).await.expect("poll");
    options.create(option("o1", "p1", "apple", 0)).await.expect("o1");
    stances
        .replace_latest(stance("s1", "p1", "alice"), vec![choice("c1", "s1", "o1", 1)])
        .await
        .expect("stance");
    events
        .create(PollEvent {
            id: "e1".to_string(),
            poll_id: "p1".to_string(),
            kind: PollEventKind::PollCreated,
            created_at: Utc::now(),
        })
        .await
        .expect("event");

    polls.delete("p1").await.expect("delete");

    assert!(polls.find_by_id("p1").await.expect("query").is_none());
    assert!(options.for_poll("p1").await.expect("options").is_empty());
    assert!(stances.latest_for_poll("p1").await.expect("stances").is_empty());
    assert!(choices
        .sum_scores_by_option_name("p1")
        .await
        .expect("sums")
        .is_empty());
    assert!(events.for_poll("p1").await.expect("events").is_empty());
}

#[tokio::test]
async fn attach_replaces_community_of_same_kind() {
    let fixtures = TestStore::new();
    let communities = CommunityRepository::new(fixtures.store.clone());
    let id_gen = IdGenerator::new();

    let first = fixtures.explicit_community(&["alice"]).await.expect("c1");
    let second = fixtures.explicit_community(&["bob"]).await.expect("c2");
    let public = fixtures.public_community().await.expect("c3");

    for community in [&first, &second, &public] {
        communities
            .attach(PollCommunity {
                id: id_gen.generate(),
                poll_id: "p1".to_string(),
                community_id: community.id.clone(),
            })
            .await
            .expect("attach");
    }

    let attached = communities.for_poll("p1").await.expect("for_poll");
    assert_eq!(attached.len(), 2);

    let explicit = communities
        .of_kind("p1", CommunityKind::Explicit)
        .await
        .expect("of_kind")
        .expect("attached");
    assert_eq!(explicit.id, second.id);

    assert!(communities
        .detach_kind("p1", CommunityKind::Public)
        .await
        .expect("detach"));
    assert!(communities
        .of_kind("p1", CommunityKind::Public)
        .await
        .expect("of_kind")
        .is_none());
}

#[tokio::test]
async fn community_members_resolve_through_groups() {
    let fixtures = TestStore::new();
    let communities = CommunityRepository::new(fixtures.store.clone());
    let groups = GroupRepository::new(fixtures.store.clone());

    let alice = fixtures.user("alice").await.expect("alice");
    let bob = fixtures.user("bob").await.expect("bob");
    let group = fixtures
        .group("Garden club", &[&alice.id, &bob.id])
        .await
        .expect("group");
    let community = fixtures.group_community(&group.id).await.expect("community");

    let mut expected = vec![alice.id.clone(), bob.id.clone()];
    expected.sort();
    assert_eq!(
        communities.members(&community.id).await.expect("members"),
        expected
    );
    assert_eq!(groups.member_ids(&group.id).await.expect("ids"), expected);
}

#[tokio::test]
async fn volume_query_filters_readers() {
    let fixtures = TestStore::new();
    let discussions = DiscussionRepository::new(fixtures.store.clone());

    let group = fixtures
        .group::<&str>("Garden club", &[])
        .await
        .expect("group");
    let discussion = fixtures
        .discussion(
            &group.id,
            &[
                ("alice", Volume::Loud),
                ("bob", Volume::Normal),
                ("carol", Volume::Quiet),
                ("dave", Volume::Mute),
            ],
        )
        .await
        .expect("discussion");

    let emailable = discussions
        .users_by_volume(&discussion.id, &[Volume::Normal, Volume::Loud])
        .await
        .expect("query");
    assert_eq!(emailable, vec!["alice", "bob"]);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let fixtures = TestStore::new();
    let polls = PollRepository::new(fixtures.store.clone());

    polls.create(poll("p1", "Budget 2026")).await.expect("p1");
    polls.create(poll("p2", "Holiday party")).await.expect("p2");

    let found = polls.search_for("budget").await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "p1");
}

#[tokio::test]
async fn closing_soon_skips_recently_published() {
    let fixtures = TestStore::new();
    let polls = PollRepository::new(fixtures.store.clone());
    let events = PollEventRepository::new(fixtures.store.clone());

    let now = Utc::now();
    let mut closing = poll("p1", "Closing soon");
    closing.closing_at = Some(now + Duration::hours(12));
    polls.create(closing).await.expect("p1");

    let mut published = poll("p2", "Already announced");
    published.closing_at = Some(now + Duration::hours(12));
    polls.create(published).await.expect("p2");
    events
        .create(PollEvent {
            id: "e1".to_string(),
            poll_id: "p2".to_string(),
            kind: PollEventKind::PollClosingSoon,
            created_at: now - Duration::hours(1),
        })
        .await
        .expect("event");

    let due = polls
        .closing_soon_unpublished(now, now + Duration::hours(24), now - Duration::hours(48))
        .await
        .expect("query");
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, "p1");
}

#[tokio::test]
async fn grouped_choices_come_reasons_first() {
    let fixtures = TestStore::new();
    let stances = StanceRepository::new(fixtures.store.clone());
    let choices = StanceChoiceRepository::new(fixtures.store.clone());

    let mut with_reason = stance("s1", "p1", "alice");
    with_reason.reason = Some("strongly agree".to_string());
    let mut reasoned_choice = choice("c1", "s1", "o1", 1);
    reasoned_choice.has_reason = true;

    stances
        .replace_latest(stance("s2", "p1", "bob"), vec![choice("c2", "s2", "o1", 1)])
        .await
        .expect("bob");
    stances
        .replace_latest(with_reason, vec![reasoned_choice])
        .await
        .expect("alice");

    let listed = choices
        .for_poll_since("p1", Utc::now() - Duration::days(365 * 100))
        .await
        .expect("query");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, "c1");
    assert!(listed[0].has_reason);
}
