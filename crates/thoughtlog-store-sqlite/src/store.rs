//! [`SqliteStore`], the SQLite implementation of [`ThoughtStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use chrono::{Local, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use thoughtlog_core::{
  ValidationError,
  dimension::{DimensionRecord, DimensionRow, NewDimension},
  patient::{NewPatient, Patient, PatientCode},
  period::DateRange,
  store::ThoughtStore,
  thought::{Thought, ThoughtCode, validate_text},
};
use tracing::{debug, info};

use crate::{
  Error, Result,
  cache::ReadCache,
  encode::{
    RawPatient, RawRecord, RawRow, RawThought, encode_date, encode_dt,
    encode_sex,
  },
  schema::{CONNECTION_PRAGMAS, SCHEMA},
};

/// Result of a closure that may need to report a domain failure from inside
/// a database transaction.
enum Outcome<T> {
  Done(T),
  NotFound,
  Exhausted,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A thought-log store backed by a single SQLite file.
///
/// Holds only the file path (and an optional read cache); each operation
/// opens a fresh connection, so cloning is cheap and clones share the cache.
#[derive(Clone)]
pub struct SqliteStore {
  path:  Arc<PathBuf>,
  cache: Option<Arc<ReadCache>>,
}

impl SqliteStore {
  /// Open (or create) the database at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self {
      path:  Arc::new(path.as_ref().to_path_buf()),
      cache: None,
    };
    store
      .with_conn(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(path = %store.path.display(), "schema ready");
    Ok(store)
  }

  /// Cache [`ThoughtStore::patient_rows`] results for `ttl`. A zero TTL
  /// disables caching.
  pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
    self.cache = (!ttl.is_zero()).then(|| Arc::new(ReadCache::new(ttl)));
    self
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Run `op` on a connection that lives exactly as long as the call.
  async fn with_conn<F, R>(&self, op: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    let conn = tokio_rusqlite::Connection::open(self.path.as_path()).await?;
    let out = conn
      .call(move |conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        op(conn)
      })
      .await;
    conn.close().await?;
    Ok(out?)
  }

  fn invalidate(&self, patient: &PatientCode) {
    if let Some(cache) = &self.cache {
      let dropped = cache.invalidate(patient);
      if dropped > 0 {
        debug!(%patient, dropped, "read cache invalidated");
      }
    }
  }

  async fn select_rows(
    &self,
    filter: &'static str,
    key: String,
    range: DateRange,
  ) -> Result<Vec<DimensionRow>> {
    let start = encode_date(range.start());
    let end = encode_date(range.end());

    let raws: Vec<RawRow> = self
      .with_conn(move |conn| {
        let sql = format!(
          "SELECT t.code, t.content, d.recorded_on, d.occurrences, d.duration, d.intensity
           FROM dimensions d
           JOIN thoughts t ON t.code = d.thought_code
           WHERE {filter} AND d.recorded_on BETWEEN ?2 AND ?3
           ORDER BY d.recorded_on, d.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![key, start, end], RawRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRow::into_row).collect()
  }
}

// ─── ThoughtStore impl ───────────────────────────────────────────────────────

impl ThoughtStore for SqliteStore {
  type Error = Error;

  // ── Patients ──────────────────────────────────────────────────────────────

  async fn add_patient(&self, input: NewPatient) -> Result<Patient> {
    input.validate()?;

    let registered_on = Local::now().date_naive();
    let name = input.name.trim().to_owned();
    let birth_str = input.birth_date.map(encode_date);
    let sex_str = input.sex.map(encode_sex);
    let condition = input.condition.clone();
    let notes = input.notes.clone();
    let registered_str = encode_date(registered_on);
    let insert_name = name.clone();

    let outcome = self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(CAST(SUBSTR(code, 2) AS INTEGER)), 0) + 1
           FROM patients",
          [],
          |r| r.get(0),
        )?;
        let Some(code) = u32::try_from(next)
          .ok()
          .and_then(|n| PatientCode::from_number(n).ok())
        else {
          return Ok(Outcome::Exhausted);
        };
        tx.execute(
          "INSERT INTO patients
             (code, name, birth_date, sex, condition, notes, registered_on)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            code.as_str(),
            insert_name,
            birth_str,
            sex_str,
            condition,
            notes,
            registered_str,
          ],
        )?;
        tx.commit()?;
        Ok(Outcome::Done(code))
      })
      .await?;

    let code = match outcome {
      Outcome::Done(code) => code,
      Outcome::NotFound | Outcome::Exhausted => {
        return Err(Error::CodesExhausted("patients".to_owned()));
      }
    };
    info!(%code, "patient registered");

    Ok(Patient {
      code,
      name,
      birth_date: input.birth_date,
      sex: input.sex,
      condition: input.condition,
      notes: input.notes,
      registered_on,
    })
  }

  async fn update_patient(&self, patient: Patient) -> Result<Patient> {
    if patient.name.trim().is_empty() {
      return Err(ValidationError::EmptyName.into());
    }

    let code_str = patient.code.as_str().to_owned();
    let name = patient.name.trim().to_owned();
    let birth_str = patient.birth_date.map(encode_date);
    let sex_str = patient.sex.map(encode_sex);
    let condition = patient.condition.clone();
    let notes = patient.notes.clone();

    let changed = self
      .with_conn(move |conn| {
        Ok(conn.execute(
          "UPDATE patients
           SET name = ?2, birth_date = ?3, sex = ?4, condition = ?5, notes = ?6
           WHERE code = ?1",
          rusqlite::params![code_str, name, birth_str, sex_str, condition, notes],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::PatientNotFound(patient.code));
    }
    info!(code = %patient.code, "patient updated");

    self
      .get_patient(&patient.code)
      .await?
      .ok_or(Error::PatientNotFound(patient.code))
  }

  async fn get_patient(&self, code: &PatientCode) -> Result<Option<Patient>> {
    let code_str = code.as_str().to_owned();

    let raw: Option<RawPatient> = self
      .with_conn(move |conn| {
        let sql =
          format!("SELECT {} FROM patients WHERE code = ?1", RawPatient::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![code_str], RawPatient::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPatient::into_patient).transpose()
  }

  async fn list_patients(&self) -> Result<Vec<Patient>> {
    let raws: Vec<RawPatient> = self
      .with_conn(|conn| {
        let sql =
          format!("SELECT {} FROM patients ORDER BY code", RawPatient::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawPatient::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPatient::into_patient).collect()
  }

  async fn delete_patient(&self, code: &PatientCode) -> Result<bool> {
    let code_str = code.as_str().to_owned();

    let deleted = self
      .with_conn(move |conn| {
        Ok(conn.execute(
          "DELETE FROM patients WHERE code = ?1",
          rusqlite::params![code_str],
        )?)
      })
      .await?;

    self.invalidate(code);
    if deleted > 0 {
      info!(%code, "patient deleted");
    }
    Ok(deleted > 0)
  }

  // ── Thoughts ──────────────────────────────────────────────────────────────

  async fn add_thought(&self, patient: &PatientCode, text: String) -> Result<Thought> {
    validate_text(&text)?;

    let owner = patient.clone();
    let content = text.trim().to_owned();
    let insert_content = content.clone();
    let created_at = Utc::now();
    let created_str = encode_dt(created_at);

    let outcome = self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM patients WHERE code = ?1",
            rusqlite::params![owner.as_str()],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Outcome::NotFound);
        }

        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(CAST(SUBSTR(code, -3) AS INTEGER)), 0) + 1
           FROM thoughts WHERE patient_code = ?1",
          rusqlite::params![owner.as_str()],
          |r| r.get(0),
        )?;
        let Some(code) = u32::try_from(next)
          .ok()
          .and_then(|n| ThoughtCode::new(&owner, n).ok())
        else {
          return Ok(Outcome::Exhausted);
        };

        tx.execute(
          "INSERT INTO thoughts (code, patient_code, content, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            code.as_str(),
            owner.as_str(),
            insert_content,
            created_str
          ],
        )?;
        tx.commit()?;
        Ok(Outcome::Done(code))
      })
      .await?;

    let code = match outcome {
      Outcome::Done(code) => code,
      Outcome::NotFound => return Err(Error::PatientNotFound(patient.clone())),
      Outcome::Exhausted => {
        return Err(Error::CodesExhausted(patient.to_string()));
      }
    };
    self.invalidate(patient);
    info!(%code, "thought logged");

    Ok(Thought { code, patient: patient.clone(), text: content, created_at })
  }

  async fn edit_thought(&self, code: &ThoughtCode, text: String) -> Result<Thought> {
    validate_text(&text)?;

    let code_str = code.as_str().to_owned();
    let content = text.trim().to_owned();

    let raw: Option<RawThought> = self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE thoughts SET content = ?2 WHERE code = ?1",
          rusqlite::params![code_str, content],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let sql =
          format!("SELECT {} FROM thoughts WHERE code = ?1", RawThought::COLUMNS);
        let raw =
          tx.query_row(&sql, rusqlite::params![code_str], RawThought::from_row)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    let thought = raw
      .ok_or_else(|| Error::ThoughtNotFound(code.clone()))?
      .into_thought()?;
    self.invalidate(&thought.patient);
    info!(%code, "thought edited");
    Ok(thought)
  }

  async fn get_thought(&self, code: &ThoughtCode) -> Result<Option<Thought>> {
    let code_str = code.as_str().to_owned();

    let raw: Option<RawThought> = self
      .with_conn(move |conn| {
        let sql =
          format!("SELECT {} FROM thoughts WHERE code = ?1", RawThought::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![code_str], RawThought::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawThought::into_thought).transpose()
  }

  async fn list_thoughts(&self, patient: &PatientCode) -> Result<Vec<Thought>> {
    let code_str = patient.as_str().to_owned();

    let raws: Vec<RawThought> = self
      .with_conn(move |conn| {
        let sql = format!(
          "SELECT {} FROM thoughts WHERE patient_code = ?1 ORDER BY code",
          RawThought::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![code_str], RawThought::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawThought::into_thought).collect()
  }

  async fn delete_thought(&self, code: &ThoughtCode) -> Result<bool> {
    let code_str = code.as_str().to_owned();

    let deleted = self
      .with_conn(move |conn| {
        Ok(conn.execute(
          "DELETE FROM thoughts WHERE code = ?1",
          rusqlite::params![code_str],
        )?)
      })
      .await?;

    self.invalidate(&code.patient());
    if deleted > 0 {
      info!(%code, "thought deleted");
    }
    Ok(deleted > 0)
  }

  // ── Dimension records ─────────────────────────────────────────────────────

  async fn record_dimension(&self, input: NewDimension) -> Result<DimensionRecord> {
    input.validate()?;

    let code_str = input.thought.as_str().to_owned();
    let date_str = encode_date(input.date);
    let occurrences = input.occurrences;
    let duration = input.duration;
    let intensity = input.intensity;

    let outcome = self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM thoughts WHERE code = ?1",
            rusqlite::params![code_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Outcome::NotFound);
        }
        tx.execute(
          "INSERT INTO dimensions
             (thought_code, recorded_on, occurrences, duration, intensity)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![code_str, date_str, occurrences, duration, intensity],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Outcome::Done(id))
      })
      .await?;

    let id = match outcome {
      Outcome::Done(id) => id,
      Outcome::NotFound | Outcome::Exhausted => {
        return Err(Error::ThoughtNotFound(input.thought));
      }
    };
    self.invalidate(&input.thought.patient());
    info!(
      thought = %input.thought,
      date = %input.date,
      occurrences,
      "dimension recorded"
    );

    Ok(DimensionRecord {
      id,
      thought: input.thought,
      date: input.date,
      occurrences,
      duration,
      intensity,
    })
  }

  async fn records_on(
    &self,
    thought: &ThoughtCode,
    date: NaiveDate,
  ) -> Result<Vec<DimensionRecord>> {
    let code_str = thought.as_str().to_owned();
    let date_str = encode_date(date);

    let raws: Vec<RawRecord> = self
      .with_conn(move |conn| {
        let sql = format!(
          "SELECT {} FROM dimensions
           WHERE thought_code = ?1 AND recorded_on = ?2
           ORDER BY id DESC",
          RawRecord::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![code_str, date_str], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  // ── Aggregation queries ───────────────────────────────────────────────────

  async fn patient_rows(
    &self,
    patient: &PatientCode,
    range: DateRange,
  ) -> Result<Vec<DimensionRow>> {
    if let Some(rows) = self.cache.as_ref().and_then(|c| c.get(patient, range)) {
      debug!(%patient, %range, rows = rows.len(), "patient rows served from cache");
      return Ok(rows);
    }

    let rows = self
      .select_rows("t.code LIKE ?1", format!("{patient}-%"), range)
      .await?;
    debug!(%patient, %range, rows = rows.len(), "patient rows fetched");

    if let Some(cache) = &self.cache {
      cache.put(patient, range, rows.clone());
    }
    Ok(rows)
  }

  fn discard_cached(&self, patient: &PatientCode) { self.invalidate(patient); }

  async fn thought_rows(
    &self,
    thought: &ThoughtCode,
    range: DateRange,
  ) -> Result<Vec<DimensionRow>> {
    let rows = self
      .select_rows("t.code = ?1", thought.as_str().to_owned(), range)
      .await?;
    debug!(%thought, %range, rows = rows.len(), "thought rows fetched");
    Ok(rows)
  }
}
