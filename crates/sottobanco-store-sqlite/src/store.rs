//! [`SqliteStore`] — the SQLite implementation of [`ListingStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};

use sottobanco_core::{
  class::{SchoolClass, TRACKS, YEARS},
  listing::{CreatedAnnouncement, Listing, NewListing},
  store::{AnnouncementFilter, ListingStore},
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Encoding helpers ────────────────────────────────────────────────────────

fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

fn parse_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// An announcement row as read from SQLite, before timestamps are parsed and
/// integer flags become booleans.
struct RawListing {
  id:              i64,
  kind:            String,
  price:           Option<f64>,
  condition:       Option<String>,
  description:     Option<String>,
  contact_visible: i64,
  is_active:       i64,
  created_at:      String,
  expires_at:      Option<String>,
  user_id:         Option<i64>,
  book_id:         Option<i64>,
  class_id:        Option<i64>,
  title:           Option<String>,
  author:          Option<String>,
  indirizzo:       Option<String>,
  anno:            Option<i64>,
  first_name:      Option<String>,
  last_name:       Option<String>,
  email:           Option<String>,
  phone:           Option<String>,
  socials:         Option<String>,
}

impl RawListing {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      kind:            row.get(1)?,
      price:           row.get(2)?,
      condition:       row.get(3)?,
      description:     row.get(4)?,
      contact_visible: row.get(5)?,
      is_active:       row.get(6)?,
      created_at:      row.get(7)?,
      expires_at:      row.get(8)?,
      user_id:         row.get(9)?,
      book_id:         row.get(10)?,
      class_id:        row.get(11)?,
      title:           row.get(12)?,
      author:          row.get(13)?,
      indirizzo:       row.get(14)?,
      anno:            row.get(15)?,
      first_name:      row.get(16)?,
      last_name:       row.get(17)?,
      email:           row.get(18)?,
      phone:           row.get(19)?,
      socials:         row.get(20)?,
    })
  }

  fn into_listing(self) -> Result<Listing> {
    Ok(Listing {
      id:              self.id,
      kind:            self.kind,
      price:           self.price,
      condition:       self.condition,
      description:     self.description,
      contact_visible: self.contact_visible != 0,
      is_active:       self.is_active != 0,
      created_at:      parse_dt(&self.created_at)?,
      expires_at:      self.expires_at.as_deref().map(parse_dt).transpose()?,
      user_id:         self.user_id,
      book_id:         self.book_id,
      class_id:        self.class_id,
      title:           self.title,
      author:          self.author,
      indirizzo:       self.indirizzo,
      anno:            self.anno,
      first_name:      self.first_name,
      last_name:       self.last_name,
      email:           self.email,
      phone:           self.phone,
      socials:         self.socials,
    })
  }
}

/// The freshly published announcement re-read with its book's title.
struct RawCreated {
  id:              i64,
  kind:            String,
  price:           Option<f64>,
  condition:       Option<String>,
  description:     Option<String>,
  contact_visible: i64,
  is_active:       i64,
  created_at:      String,
  expires_at:      Option<String>,
  user_id:         Option<i64>,
  book_id:         Option<i64>,
  class_id:        Option<i64>,
  title:           Option<String>,
}

impl RawCreated {
  fn into_created(self) -> Result<CreatedAnnouncement> {
    Ok(CreatedAnnouncement {
      id:              self.id,
      kind:            self.kind,
      price:           self.price,
      condition:       self.condition,
      description:     self.description,
      contact_visible: self.contact_visible != 0,
      is_active:       self.is_active != 0,
      created_at:      parse_dt(&self.created_at)?,
      expires_at:      self.expires_at.as_deref().map(parse_dt).transpose()?,
      user_id:         self.user_id,
      book_id:         self.book_id,
      class_id:        self.class_id,
      title:           self.title.unwrap_or_default(),
    })
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sottobanco listing store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  ///
  /// Classes are seeded only when the database file did not exist before
  /// this call; an existing file keeps its `classes` table untouched.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let fresh = !path.as_ref().exists();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    if fresh {
      store.seed_classes().await?;
    }
    Ok(store)
  }

  /// Open an in-memory store with classes seeded — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    store.seed_classes().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert the full track × year cross product, track-major.
  async fn seed_classes(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("INSERT INTO classes (indirizzo, anno) VALUES (?1, ?2)")?;
        for track in TRACKS {
          for anno in YEARS {
            stmt.execute(rusqlite::params![track, anno])?;
          }
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// Test-only raw access, for setting up states the public API never produces
// (e.g. deactivated announcements).
#[cfg(test)]
impl SqliteStore {
  pub(crate) async fn run(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) async fn count(&self, sql: &'static str) -> Result<i64> {
    let n = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
      .await?;
    Ok(n)
  }
}

// ─── ListingStore impl ───────────────────────────────────────────────────────

impl ListingStore for SqliteStore {
  type Error = Error;

  async fn list_classes(&self) -> Result<Vec<SchoolClass>> {
    let classes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, indirizzo, anno FROM classes
           ORDER BY indirizzo ASC, anno ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SchoolClass {
              id:        row.get(0)?,
              indirizzo: row.get(1)?,
              anno:      row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(classes)
  }

  async fn list_announcements(
    &self,
    filter: AnnouncementFilter,
  ) -> Result<Vec<Listing>> {
    // Ordered predicate list; each clause appends its own bound parameters,
    // so the placeholders stay positional-safe whichever filters are set.
    let mut conds: Vec<&'static str> = vec!["a.is_active = 1"];
    let mut params: Vec<Value> = vec![];

    if let Some(kind) = filter.kind {
      conds.push("a.type = ?");
      params.push(Value::from(kind));
    }
    if let Some(indirizzo) = filter.indirizzo {
      conds.push("c.indirizzo = ?");
      params.push(Value::from(indirizzo));
    }
    if let Some(anno) = filter.anno {
      conds.push("c.anno = ?");
      params.push(Value::from(anno));
    }
    if let Some(text) = filter.text {
      conds.push("(b.title LIKE ? OR b.author LIKE ? OR a.description LIKE ?)");
      let pattern = format!("%{text}%");
      params.push(Value::from(pattern.clone()));
      params.push(Value::from(pattern.clone()));
      params.push(Value::from(pattern));
    }

    let sql = format!(
      "SELECT a.id, a.type, a.price, a.condition, a.description,
              a.contact_visible, a.is_active, a.created_at, a.expires_at,
              a.user_id, a.book_id, a.class_id,
              b.title, b.author,
              c.indirizzo, c.anno,
              u.first_name, u.last_name, u.email, u.phone, u.socials
       FROM announcements a
       LEFT JOIN books   b ON b.id = a.book_id
       LEFT JOIN classes c ON c.id = a.class_id
       LEFT JOIN users   u ON u.id = a.user_id
       WHERE {}
       ORDER BY a.created_at DESC",
      conds.join(" AND ")
    );

    let raws: Vec<RawListing> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), RawListing::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawListing::into_listing).collect()
  }

  async fn publish(&self, input: NewListing) -> Result<CreatedAnnouncement> {
    let socials_str = input.socials.as_ref().map(serde_json::to_string).transpose()?;
    let now_str = encode_dt(Utc::now());

    let raw: RawCreated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Find-or-create the user by email. A failed contact refresh on an
        // existing user must not block the announcement, so that one error
        // is logged and dropped.
        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM users WHERE email = ?1",
            rusqlite::params![input.email],
            |r| r.get(0),
          )
          .optional()?;

        let user_id = match existing {
          Some(id) => {
            if let Err(e) = tx.execute(
              "UPDATE users
               SET first_name = ?1, last_name = ?2, phone = ?3, socials = ?4
               WHERE id = ?5",
              rusqlite::params![
                input.first_name,
                input.last_name,
                input.phone,
                socials_str,
                id
              ],
            ) {
              tracing::warn!(user_id = id, error = %e, "contact refresh failed; keeping stored contact info");
            }
            id
          }
          None => {
            tx.execute(
              "INSERT INTO users (first_name, last_name, email, phone, socials, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
              rusqlite::params![
                input.first_name,
                input.last_name,
                input.email,
                input.phone,
                socials_str,
                now_str
              ],
            )?;
            tx.last_insert_rowid()
          }
        };

        tx.execute(
          "INSERT INTO books (title, author, edition, isbn, notes)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.title,
            input.author,
            input.edition,
            input.isbn,
            input.notes
          ],
        )?;
        let book_id = tx.last_insert_rowid();

        // The foreign-key check rejects a class_id with no classes row here,
        // rolling the user and book inserts back with it.
        tx.execute(
          "INSERT INTO announcements
             (user_id, book_id, class_id, type, price, condition, description,
              contact_visible, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
          rusqlite::params![
            user_id,
            book_id,
            input.class_id,
            input.kind,
            input.price,
            input.condition,
            input.description,
            input.contact_visible as i64,
            now_str
          ],
        )?;
        let announcement_id = tx.last_insert_rowid();

        let raw = tx.query_row(
          "SELECT a.id, a.type, a.price, a.condition, a.description,
                  a.contact_visible, a.is_active, a.created_at, a.expires_at,
                  a.user_id, a.book_id, a.class_id, b.title
           FROM announcements a
           LEFT JOIN books b ON b.id = a.book_id
           WHERE a.id = ?1",
          rusqlite::params![announcement_id],
          |row| {
            Ok(RawCreated {
              id:              row.get(0)?,
              kind:            row.get(1)?,
              price:           row.get(2)?,
              condition:       row.get(3)?,
              description:     row.get(4)?,
              contact_visible: row.get(5)?,
              is_active:       row.get(6)?,
              created_at:      row.get(7)?,
              expires_at:      row.get(8)?,
              user_id:         row.get(9)?,
              book_id:         row.get(10)?,
              class_id:        row.get(11)?,
              title:           row.get(12)?,
            })
          },
        )?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_created()
  }
}
