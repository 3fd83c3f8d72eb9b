//! Integration tests for the many-to-many adapter
//!
//! Users (sources) belong to groups (targets) through membership records
//! (junctions), all held in memory collections.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use relationship_dao::{
    define_id, Collection, CollectionExt, CountSink, DaoError, Entity, Field, ManyToManyDao,
    MemoryCollection, Order, Predicate, ProjectionSink, Relationship, Select, Sink, Value,
};

define_id!(UserId, "Unique identifier for a user");
define_id!(MembershipId, "Unique identifier for a membership record");
define_id!(AwardId, "Unique identifier for a badge award");

#[derive(Clone, Debug)]
struct User {
    id: UserId,
}

#[derive(Clone, Debug, PartialEq)]
struct Group {
    id: u64,
    name: String,
}

#[derive(Clone, Debug)]
struct Membership {
    id: MembershipId,
    user_id: UserId,
    group_id: u64,
    metadata: serde_json::Value,
}

impl Entity for User {
    type Id = UserId;
    fn id(&self) -> UserId {
        self.id.clone()
    }
}

impl Entity for Group {
    type Id = u64;
    fn id(&self) -> u64 {
        self.id
    }
}

impl Entity for Membership {
    type Id = MembershipId;
    fn id(&self) -> MembershipId {
        self.id.clone()
    }
}

impl Group {
    const NAME: Field<Group, String> = Field::new("name", |g: &Group| g.name.clone());

    fn new(id: u64, name: &str) -> Self {
        Self { id, name: name.to_string() }
    }
}

impl Membership {
    const USER_ID: Field<Membership, UserId> =
        Field::new("userId", |m: &Membership| m.user_id.clone());
    const GROUP_ID: Field<Membership, u64> = Field::new("groupId", |m: &Membership| m.group_id);
}

/// Badges are linked by their catalogue `code`, not by their storage id
#[derive(Clone, Debug, PartialEq)]
struct Badge {
    id: u64,
    code: u64,
    label: String,
}

#[derive(Clone, Debug)]
struct Award {
    id: AwardId,
    user_id: UserId,
    badge_code: u64,
}

impl Entity for Badge {
    type Id = u64;
    fn id(&self) -> u64 {
        self.id
    }
}

impl Entity for Award {
    type Id = AwardId;
    fn id(&self) -> AwardId {
        self.id.clone()
    }
}

impl Badge {
    const CODE: Field<Badge, u64> = Field::new("code", |b: &Badge| b.code);

    fn new(id: u64, code: u64, label: &str) -> Self {
        Self { id, code, label: label.to_string() }
    }
}

impl Award {
    const USER_ID: Field<Award, UserId> = Field::new("userId", |a: &Award| a.user_id.clone());
    const BADGE_CODE: Field<Award, u64> = Field::new("badgeCode", |a: &Award| a.badge_code);
}

fn user(name: &str) -> User {
    User { id: UserId::from(name) }
}

fn memberships() -> Relationship<User, Group, Membership> {
    Relationship::new(
        "memberships",
        Membership::USER_ID,
        Membership::GROUP_ID,
        |user: &User, group: &Group| Membership {
            id: MembershipId::new(),
            user_id: user.id.clone(),
            group_id: group.id,
            metadata: serde_json::json!({ "role": "member" }),
        },
    )
}

fn awards() -> Relationship<User, Badge, Award> {
    Relationship::new(
        "awards",
        Award::USER_ID,
        Award::BADGE_CODE,
        |user: &User, badge: &Badge| Award {
            id: AwardId::new(),
            user_id: user.id.clone(),
            badge_code: badge.code,
        },
    )
    .with_target_property(Badge::CODE)
}

/// Records everything a select delivers, and whether it was closed
#[derive(Default)]
struct RecordingSink {
    names: Vec<String>,
    closed: bool,
}

impl Sink<Group> for RecordingSink {
    fn put(&mut self, group: Group) {
        assert!(!self.closed, "put after eof");
        self.names.push(group.name);
    }

    fn eof(&mut self) {
        self.closed = true;
    }
}

struct Fixture {
    junctions: Arc<MemoryCollection<Membership>>,
    groups: Arc<MemoryCollection<Group>>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            junctions: Arc::new(MemoryCollection::new("memberships")),
            groups: Arc::new(MemoryCollection::new("groups")),
        }
    }

    fn dao(&self, source: User) -> ManyToManyDao<User, Group, Membership> {
        memberships().dao_for(source, self.junctions.clone(), self.groups.clone())
    }
}

async fn names(dao: &dyn Collection<Group>, query: &Select<Group>) -> Vec<String> {
    dao.select_all(query)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect()
}

/// A collection whose every operation fails, as an unreachable backend would
struct OfflineCollection;

#[async_trait]
impl<E: Entity> Collection<E> for OfflineCollection {
    async fn put(&self, _: E) -> Result<E> {
        Err(anyhow!("backend offline"))
    }
    async fn find(&self, _: &E::Id) -> Result<Option<E>> {
        Err(anyhow!("backend offline"))
    }
    async fn select(&self, _: &mut dyn Sink<E>, _: &Select<E>) -> Result<()> {
        Err(anyhow!("backend offline"))
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_end_to_end_example() {
    let fixture = Fixture::new();
    let u1 = fixture.dao(user("U1"));

    u1.put(Group::new(1, "T1")).await.unwrap();
    u1.put(Group::new(2, "T2")).await.unwrap();
    fixture.groups.put(Group::new(3, "T3")).await.unwrap();

    assert_eq!(names(&u1, &Select::all()).await, vec!["T1", "T2"]);

    let only_t2 = Select::all().filter(Predicate::equals(Group::NAME, "T2".to_string()));
    assert_eq!(u1.select_all(&only_t2).await.unwrap(), vec![Group::new(2, "T2")]);
}

#[tokio::test]
async fn test_put_returns_upserted_target_and_writes_junction() {
    let fixture = Fixture::new();
    let dao = fixture.dao(user("U1"));

    let stored = dao.put(Group::new(7, "ops")).await.unwrap();

    assert_eq!(stored, Group::new(7, "ops"));
    assert_eq!(fixture.groups.len().unwrap(), 1);
    let links = fixture.junctions.select_all(&Select::all()).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].user_id, UserId::from("U1"));
    assert_eq!(links[0].group_id, 7);
    assert_eq!(links[0].metadata["role"], "member");
}

// ============================================================================
// Relationship properties
// ============================================================================

#[tokio::test]
async fn test_link_is_discoverable() {
    let fixture = Fixture::new();
    let dao = fixture.dao(user("U1"));

    for id in [4, 9, 2] {
        dao.put(Group::new(id, &format!("G{}", id))).await.unwrap();
        assert!(dao.target_ids().await.unwrap().contains(&Value::from(id)));
        let selected = dao.select_all(&Select::all()).await.unwrap();
        assert!(selected.iter().any(|g| g.id == id));
    }
    assert!(dao.is_linked(&9).await.unwrap());
}

#[tokio::test]
async fn test_sources_are_isolated() {
    let fixture = Fixture::new();
    let alice = fixture.dao(user("alice"));
    let bob = fixture.dao(user("bob"));

    alice.put(Group::new(1, "admins")).await.unwrap();
    alice.put(Group::new(2, "staff")).await.unwrap();
    bob.put(Group::new(2, "staff")).await.unwrap();

    assert_eq!(names(&alice, &Select::all()).await, vec!["admins", "staff"]);
    assert_eq!(names(&bob, &Select::all()).await, vec!["staff"]);
    assert!(!bob.is_linked(&1).await.unwrap());
}

#[tokio::test]
async fn test_predicate_is_conjoined_with_membership() {
    let fixture = Fixture::new();
    let dao = fixture.dao(user("U1"));
    dao.put(Group::new(1, "red")).await.unwrap();
    dao.put(Group::new(2, "blue")).await.unwrap();
    // Matches the predicate but is not linked
    fixture.groups.put(Group::new(3, "red")).await.unwrap();

    let red = Select::all().filter(Predicate::equals(Group::NAME, "red".to_string()));
    assert_eq!(dao.select_all(&red).await.unwrap(), vec![Group::new(1, "red")]);

    let unfiltered = names(&dao, &Select::all()).await;
    let with_true = names(&dao, &Select::all().filter(Predicate::truth())).await;
    assert_eq!(unfiltered, with_true);
    assert_eq!(unfiltered, vec!["red", "blue"]);
}

#[tokio::test]
async fn test_pagination_applies_after_join() {
    let fixture = Fixture::new();
    let dao = fixture.dao(user("U1"));

    // Unrelated groups interleave with related ones in id and name order
    for id in 1..=10 {
        let group = Group::new(id, &format!("g{:02}", id));
        if id % 2 == 0 {
            dao.put(group).await.unwrap();
        } else {
            fixture.groups.put(group).await.unwrap();
        }
    }

    let page = Select::all().order_by(Order::desc(Group::NAME)).skip(1).limit(2);
    assert_eq!(names(&dao, &page).await, vec!["g08", "g06"]);

    let tail = Select::all().order_by(Order::asc(Group::NAME)).skip(3);
    assert_eq!(names(&dao, &tail).await, vec!["g08", "g10"]);
}

#[tokio::test]
async fn test_empty_relation_selects_nothing() {
    let fixture = Fixture::new();
    fixture.groups.put(Group::new(1, "lonely")).await.unwrap();
    let dao = fixture.dao(user("nobody"));

    assert!(dao.target_ids().await.unwrap().is_empty());
    assert!(dao.select_all(&Select::all()).await.unwrap().is_empty());

    let count = dao
        .select_into(CountSink::new(), &Select::all().order_by(Order::asc(Group::NAME)).limit(5))
        .await
        .unwrap();
    assert_eq!(count.count(), 0);
}

#[tokio::test]
async fn test_target_property_matches_secondary_key() {
    let links = Arc::new(MemoryCollection::<Award>::new("awards"));
    let badges = Arc::new(MemoryCollection::<Badge>::new("badges"));
    let dao = awards().dao_for(user("U1"), links.clone(), badges.clone());

    dao.put(Badge::new(1, 100, "gold")).await.unwrap();
    // Its id equals the linked code, but nothing links to it
    badges.put(Badge::new(100, 5, "decoy")).await.unwrap();

    let stored = links.select_all(&Select::all()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].badge_code, 100);
    assert_eq!(dao.target_ids().await.unwrap(), vec![Value::from(100_u64)]);
    assert_eq!(
        dao.select_all(&Select::all()).await.unwrap(),
        vec![Badge::new(1, 100, "gold")]
    );
}

#[tokio::test]
async fn test_find_is_collection_global() {
    let fixture = Fixture::new();
    fixture.groups.put(Group::new(5, "unlinked")).await.unwrap();
    let dao = fixture.dao(user("U1"));

    assert_eq!(dao.find(&5).await.unwrap(), Some(Group::new(5, "unlinked")));
    assert!(!dao.is_linked(&5).await.unwrap());
    assert_eq!(dao.find(&6).await.unwrap(), None);
}

#[tokio::test]
async fn test_junction_failure_leaves_unlinked_target() {
    let groups = Arc::new(MemoryCollection::<Group>::new("groups"));
    let junctions = Arc::new(
        MemoryCollection::<Membership>::new("memberships")
            .with_validator(|_| Err("memberships are read-only".to_string())),
    );
    let dao = memberships().dao_for(user("U1"), junctions.clone(), groups.clone());

    let err = dao.put(Group::new(1, "orphan")).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DaoError>(),
        Some(DaoError::Rejected { collection, .. }) if collection == "memberships"
    ));

    assert_eq!(groups.find(&1).await.unwrap(), Some(Group::new(1, "orphan")));
    assert!(junctions.is_empty().unwrap());
    assert!(dao.select_all(&Select::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_target_failure_writes_no_junction() {
    let groups = Arc::new(
        MemoryCollection::<Group>::new("groups").with_validator(|g: &Group| {
            if g.name.is_empty() {
                Err("name is required".to_string())
            } else {
                Ok(())
            }
        }),
    );
    let junctions = Arc::new(MemoryCollection::<Membership>::new("memberships"));
    let dao = memberships().dao_for(user("U1"), junctions.clone(), groups.clone());

    assert!(dao.put(Group::new(1, "")).await.is_err());
    assert!(groups.is_empty().unwrap());
    assert!(junctions.is_empty().unwrap());
}

#[tokio::test]
async fn test_repeated_put_duplicates_link_not_target() {
    let fixture = Fixture::new();
    let dao = fixture.dao(user("U1"));

    dao.put(Group::new(1, "twice")).await.unwrap();
    dao.put(Group::new(1, "twice")).await.unwrap();

    assert_eq!(fixture.junctions.len().unwrap(), 2);
    assert_eq!(dao.target_ids().await.unwrap(), vec![Value::from(1_u64), Value::from(1_u64)]);
    assert_eq!(names(&dao, &Select::all()).await, vec!["twice"]);
}

// ============================================================================
// Sinks and error propagation
// ============================================================================

#[tokio::test]
async fn test_select_feeds_caller_sink() {
    let fixture = Fixture::new();
    let dao = fixture.dao(user("U1"));
    dao.put(Group::new(3, "c")).await.unwrap();
    dao.put(Group::new(1, "a")).await.unwrap();

    let projection = dao
        .select_into(ProjectionSink::new(Group::NAME), &Select::all())
        .await
        .unwrap();
    assert_eq!(projection.values(), &[Value::from("a"), Value::from("c")]);

    let recorded = dao.select_into(RecordingSink::default(), &Select::all()).await.unwrap();
    assert!(recorded.closed);
    assert_eq!(recorded.names, vec!["a", "c"]);
}

#[tokio::test]
async fn test_upstream_failures_propagate_unchanged() {
    let groups: Arc<dyn Collection<Group>> = Arc::new(MemoryCollection::<Group>::new("groups"));
    let offline_junctions = memberships().dao_for(user("U1"), Arc::new(OfflineCollection), groups);

    let err = offline_junctions.select_all(&Select::all()).await.unwrap_err();
    assert_eq!(err.to_string(), "backend offline");

    let offline_targets = memberships().dao_for(
        user("U1"),
        Arc::new(MemoryCollection::<Membership>::new("memberships")),
        Arc::new(OfflineCollection),
    );
    let err = offline_targets.find(&1).await.unwrap_err();
    assert_eq!(err.to_string(), "backend offline");
    let err = offline_targets.put(Group::new(1, "x")).await.unwrap_err();
    assert_eq!(err.to_string(), "backend offline");
}
