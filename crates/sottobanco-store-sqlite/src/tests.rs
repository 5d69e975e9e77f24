//! Integration tests for `SqliteStore` against an in-memory database.

use serde_json::json;
use sottobanco_core::{
  class::{TRACKS, YEARS},
  listing::NewListing,
  store::{AnnouncementFilter, ListingStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn listing(email: &str, title: &str, class_id: i64) -> NewListing {
  NewListing {
    first_name:      "Maria".into(),
    last_name:       "Bianchi".into(),
    email:           email.into(),
    phone:           None,
    socials:         None,
    title:           title.into(),
    author:          None,
    edition:         None,
    isbn:            None,
    notes:           None,
    kind:            "sell".into(),
    price:           None,
    condition:       None,
    class_id,
    description:     None,
    contact_visible: true,
  }
}

/// Id of the seeded class for (track, year).
async fn class_id(s: &SqliteStore, indirizzo: &str, anno: i64) -> i64 {
  s.list_classes()
    .await
    .unwrap()
    .into_iter()
    .find(|c| c.indirizzo == indirizzo && c.anno == anno)
    .expect("seeded class")
    .id
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeds_full_track_year_cross_product() {
  let s = store().await;
  let classes = s.list_classes().await.unwrap();

  assert_eq!(classes.len(), TRACKS.len() * 5);
  for track in TRACKS {
    for anno in YEARS {
      assert_eq!(
        classes
          .iter()
          .filter(|c| c.indirizzo == track && c.anno == anno)
          .count(),
        1,
        "expected exactly one row for ({track}, {anno})"
      );
    }
  }
}

#[tokio::test]
async fn classes_ordered_by_track_then_year() {
  let s = store().await;
  let classes = s.list_classes().await.unwrap();

  let keys: Vec<(String, i64)> = classes
    .into_iter()
    .map(|c| (c.indirizzo, c.anno))
    .collect();
  let mut sorted = keys.clone();
  sorted.sort();
  assert_eq!(keys, sorted);
}

#[tokio::test]
async fn existing_file_is_not_reseeded() {
  let path = std::env::temp_dir().join(format!(
    "sottobanco-reseed-test-{}.db",
    std::process::id()
  ));
  std::fs::remove_file(&path).ok();

  {
    let s = SqliteStore::open(&path).await.unwrap();
    assert_eq!(s.list_classes().await.unwrap().len(), TRACKS.len() * 5);
  }

  // Reopening the same file must not double the class rows.
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_classes().await.unwrap().len(), TRACKS.len() * 5);

  std::fs::remove_file(&path).ok();
  std::fs::remove_file(format!("{}-wal", path.display())).ok();
  std::fs::remove_file(format!("{}-shm", path.display())).ok();
}

// ─── Publish ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_returns_stored_record_with_title() {
  let s = store().await;
  let class = class_id(&s, "Liceo Scientifico", 3).await;

  let created = s
    .publish(listing("maria@example.com", "Analisi Matematica", class))
    .await
    .unwrap();

  assert_eq!(created.title, "Analisi Matematica");
  assert_eq!(created.kind, "sell");
  assert_eq!(created.class_id, Some(class));
  assert!(created.user_id.is_some());
  assert!(created.book_id.is_some());
  assert!(created.is_active);
  assert!(created.contact_visible);
  assert!(created.expires_at.is_none());
}

#[tokio::test]
async fn publish_serializes_socials_to_text() {
  let s = store().await;
  let class = class_id(&s, "Liceo Classico", 1).await;

  let mut input = listing("maria@example.com", "Iliade", class);
  input.socials = Some(json!({ "instagram": "@maria" }));
  s.publish(input).await.unwrap();

  let feed = s
    .list_announcements(AnnouncementFilter::default())
    .await
    .unwrap();
  let socials = feed[0].socials.as_deref().unwrap();
  assert!(socials.contains("instagram"), "socials column: {socials}");
}

#[tokio::test]
async fn publish_rejects_unknown_class() {
  let s = store().await;

  let err = s
    .publish(listing("maria@example.com", "Iliade", 9999))
    .await
    .unwrap_err();
  assert!(err.to_string().contains("FOREIGN KEY"), "error: {err}");
}

#[tokio::test]
async fn failed_publish_leaves_no_orphan_rows() {
  let s = store().await;

  s.publish(listing("maria@example.com", "Iliade", 9999))
    .await
    .unwrap_err();

  // The transaction rolled the user and book inserts back with the failure.
  assert_eq!(s.count("SELECT COUNT(*) FROM users").await.unwrap(), 0);
  assert_eq!(s.count("SELECT COUNT(*) FROM books").await.unwrap(), 0);
  assert_eq!(
    s.count("SELECT COUNT(*) FROM announcements").await.unwrap(),
    0
  );
}

// ─── Upsert by email ─────────────────────────────────────────────────────────

#[tokio::test]
async fn repeat_email_updates_contact_instead_of_duplicating() {
  let s = store().await;
  let class = class_id(&s, "Liceo Classico", 2).await;

  s.publish(listing("maria@example.com", "Iliade", class))
    .await
    .unwrap();

  let mut second = listing("maria@example.com", "Odissea", class);
  second.first_name = "Lucia".into();
  second.last_name = "Mondella".into();
  s.publish(second).await.unwrap();

  // One user row, carrying the second submission's name.
  assert_eq!(s.count("SELECT COUNT(*) FROM users").await.unwrap(), 1);
  assert_eq!(
    s.count("SELECT COUNT(*) FROM users WHERE first_name = 'Lucia'")
      .await
      .unwrap(),
    1
  );

  // Books and announcements are never deduplicated.
  assert_eq!(s.count("SELECT COUNT(*) FROM books").await.unwrap(), 2);
  assert_eq!(
    s.count("SELECT COUNT(*) FROM announcements").await.unwrap(),
    2
  );
}

#[tokio::test]
async fn distinct_emails_create_distinct_users() {
  let s = store().await;
  let class = class_id(&s, "Liceo Classico", 2).await;

  s.publish(listing("maria@example.com", "Iliade", class))
    .await
    .unwrap();
  s.publish(listing("lucia@example.com", "Odissea", class))
    .await
    .unwrap();

  assert_eq!(s.count("SELECT COUNT(*) FROM users").await.unwrap(), 2);
}

// ─── Feed & filters ──────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_joins_book_class_and_user() {
  let s = store().await;
  let class = class_id(&s, "Liceo Linguistico", 4).await;

  let mut input = listing("maria@example.com", "English File", class);
  input.author = Some("Latham-Koenig".into());
  input.description = Some("come nuovo".into());
  s.publish(input).await.unwrap();

  let feed = s
    .list_announcements(AnnouncementFilter::default())
    .await
    .unwrap();
  assert_eq!(feed.len(), 1);

  let row = &feed[0];
  assert_eq!(row.title.as_deref(), Some("English File"));
  assert_eq!(row.author.as_deref(), Some("Latham-Koenig"));
  assert_eq!(row.indirizzo.as_deref(), Some("Liceo Linguistico"));
  assert_eq!(row.anno, Some(4));
  assert_eq!(row.first_name.as_deref(), Some("Maria"));
  assert_eq!(row.email.as_deref(), Some("maria@example.com"));
  assert!(row.is_active);
}

#[tokio::test]
async fn filters_are_anded_together() {
  let s = store().await;
  let classico = class_id(&s, "Liceo Classico", 1).await;
  let scientifico = class_id(&s, "Liceo Scientifico", 1).await;

  for (class, kind, title) in [
    (classico, "sell", "Iliade"),
    (classico, "buy", "Odissea"),
    (scientifico, "sell", "Analisi 1"),
    (scientifico, "buy", "Fisica 2"),
  ] {
    let mut input = listing("maria@example.com", title, class);
    input.kind = kind.into();
    s.publish(input).await.unwrap();
  }

  let feed = s
    .list_announcements(AnnouncementFilter {
      indirizzo: Some("Liceo Classico".into()),
      kind: Some("sell".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].title.as_deref(), Some("Iliade"));
}

#[tokio::test]
async fn anno_filter_matches_exact_year() {
  let s = store().await;
  let first = class_id(&s, "Liceo Classico", 1).await;
  let fifth = class_id(&s, "Liceo Classico", 5).await;

  s.publish(listing("maria@example.com", "Iliade", first))
    .await
    .unwrap();
  s.publish(listing("maria@example.com", "Odissea", fifth))
    .await
    .unwrap();

  let feed = s
    .list_announcements(AnnouncementFilter {
      anno: Some(5),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(feed.len(), 1);
  assert_eq!(feed[0].anno, Some(5));

  // The sentinel the HTTP layer uses for unparsable years matches nothing.
  let none = s
    .list_announcements(AnnouncementFilter {
      anno: Some(-1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn free_text_matches_title_author_or_description() {
  let s = store().await;
  let class = class_id(&s, "Liceo Classico", 1).await;

  let mut input = listing("maria@example.com", "Iliade", class);
  input.author = Some("Omero".into());
  input.description = Some("sottolineature a matita".into());
  s.publish(input).await.unwrap();

  for q in ["Iliade", "Omero", "matita"] {
    let feed = s
      .list_announcements(AnnouncementFilter {
        text: Some(q.into()),
        ..Default::default()
      })
      .await
      .unwrap();
    assert_eq!(feed.len(), 1, "q = {q}");
  }

  let feed = s
    .list_announcements(AnnouncementFilter {
      text: Some("nothing-matches-this".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(feed.is_empty());
}

#[tokio::test]
async fn inactive_announcements_never_appear() {
  let s = store().await;
  let class = class_id(&s, "Liceo Classico", 1).await;

  s.publish(listing("maria@example.com", "Iliade", class))
    .await
    .unwrap();
  s.run("UPDATE announcements SET is_active = 0").await.unwrap();

  let feed = s
    .list_announcements(AnnouncementFilter::default())
    .await
    .unwrap();
  assert!(feed.is_empty());
}

#[tokio::test]
async fn feed_is_newest_first() {
  let s = store().await;
  let class = class_id(&s, "Liceo Classico", 1).await;

  s.publish(listing("maria@example.com", "Iliade", class))
    .await
    .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  s.publish(listing("maria@example.com", "Odissea", class))
    .await
    .unwrap();

  let feed = s
    .list_announcements(AnnouncementFilter::default())
    .await
    .unwrap();
  assert_eq!(feed.len(), 2);
  assert_eq!(feed[0].title.as_deref(), Some("Odissea"));
  assert_eq!(feed[1].title.as_deref(), Some("Iliade"));
  assert!(feed[0].created_at >= feed[1].created_at);
}
