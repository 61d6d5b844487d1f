//! [`SqliteStore`]: the SQLite implementation of [`AssetStore`].

use std::{collections::BTreeSet, path::Path};

use assetflow_core::{
  Email,
  asset::{Asset, AssetPatch, NewAsset},
  request::{
    ApprovalStatus, AssetRequest, CustomAssetRequest, NewAssetRequest,
    NewCustomAssetRequest, Transition,
  },
  store::{AssetStore, ProductFilter, QuantitySort, RequestFilter, RequestScope},
  user::{NewUser, ProfileUpdate, User},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    CUSTOM_REQUEST_COLUMNS, PRODUCT_COLUMNS, REQUEST_COLUMNS, RawAsset,
    RawAssetRequest, RawCustomRequest, RawUser, USER_COLUMNS, decode_status,
    encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

type CoreError = assetflow_core::Error;

/// Outcome of a closure run on the connection thread: the outer result is
/// the driver, the inner one a domain rejection that rolls the transaction
/// back when it is returned early.
type Checked<T> = std::result::Result<T, CoreError>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An AssetFlow store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
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
}

// ─── Connection-thread helpers ───────────────────────────────────────────────

/// A user row plus, for HR rows, the emails booked under it.
fn select_user(
  conn: &rusqlite::Connection,
  email: &str,
) -> rusqlite::Result<Option<(RawUser, Vec<String>)>> {
  let raw = conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE user_email = ?1"),
      rusqlite::params![email],
      RawUser::from_row,
    )
    .optional()?;

  let Some(raw) = raw else { return Ok(None) };
  let employees = if raw.user_role == "hr" {
    select_member_emails(conn, email)?
  } else {
    Vec::new()
  };
  Ok(Some((raw, employees)))
}

fn select_member_emails(
  conn: &rusqlite::Connection,
  company: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT user_email FROM users
     WHERE current_working_company_email = ?1
     ORDER BY user_email",
  )?;
  stmt
    .query_map(rusqlite::params![company], |row| row.get(0))?
    .collect()
}

fn select_users(
  conn: &rusqlite::Connection,
  condition: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawUser>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {USER_COLUMNS} FROM users WHERE {condition} ORDER BY user_name, user_email"
  ))?;
  stmt.query_map(params, RawUser::from_row)?.collect()
}

/// Move a request (plain or custom, per `table`) along the status machine,
/// adjusting the linked product's stock when `with_stock` is set.
///
/// Must run inside a transaction: on `Err` the caller returns without
/// committing, which rolls back anything written here.
fn apply_transition(
  tx: &rusqlite::Transaction<'_>,
  table: &'static str,
  id: &str,
  action: Transition,
  with_stock: bool,
) -> rusqlite::Result<Checked<()>> {
  let status: Option<String> = tx
    .query_row(
      &format!("SELECT approval_status FROM {table} WHERE id = ?1"),
      rusqlite::params![id],
      |row| row.get(0),
    )
    .optional()?;
  let Some(status) = status else {
    return Ok(Err(CoreError::NotFound(format!("request {id}"))));
  };

  let from = match decode_status(&status) {
    Ok(s) => s,
    Err(e) => return Ok(Err(e.into())),
  };
  let to = match from.apply(action) {
    Ok(s) => s,
    Err(e) => return Ok(Err(e)),
  };

  let delta = action.stock_delta();
  if with_stock && delta != 0 {
    let product_id: String = tx.query_row(
      &format!("SELECT product_id FROM {table} WHERE id = ?1"),
      rusqlite::params![id],
      |row| row.get(0),
    )?;
    // Server-side increment, guarded so the quantity never goes negative.
    let moved = tx.execute(
      "UPDATE products SET product_quantity = product_quantity + ?1
       WHERE id = ?2 AND product_quantity + ?1 >= 0",
      rusqlite::params![delta, product_id],
    )?;
    if moved == 0 {
      let exists = tx
        .query_row(
          "SELECT 1 FROM products WHERE id = ?1",
          rusqlite::params![product_id],
          |_| Ok(()),
        )
        .optional()?
        .is_some();
      return Ok(Err(if exists {
        CoreError::Conflict(format!("product {product_id} is out of stock"))
      } else {
        CoreError::NotFound(format!("product {product_id}"))
      }));
    }
  }

  let approval_date = action.stamps_approval_date().then(|| encode_dt(Utc::now()));
  tx.execute(
    &format!(
      "UPDATE {table} SET approval_status = ?2, approval_date = ?3
       WHERE id = ?1 AND approval_status = ?4"
    ),
    rusqlite::params![id, to.as_str(), approval_date, from.as_str()],
  )?;
  Ok(Ok(()))
}

fn into_found_user(found: Option<(RawUser, Vec<String>)>, email: &Email) -> Result<User> {
  let (raw, employees) =
    found.ok_or_else(|| CoreError::NotFound(format!("user {email}")))?;
  raw.into_user(employees)
}

fn page(limit: Option<usize>, offset: Option<usize>) -> (i64, i64) {
  (
    limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX)),
    offset.map_or(0, |o| i64::try_from(o).unwrap_or(i64::MAX)),
  )
}

// ─── AssetStore impl ─────────────────────────────────────────────────────────

impl AssetStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_email:                    input.user_email,
      user_name:                     input.user_name.trim().to_owned(),
      user_role:                     input.user_role,
      user_image:                    input.user_image,
      date_of_birth:                 input.date_of_birth,
      company_name:                  input.company_name,
      company_logo:                  input.company_logo,
      current_working_company_email: None,
      current_working_company_name:  None,
      current_working_company_image: None,
      current_membership_limit:      0,
      current_employees:             BTreeSet::new(),
      created_at:                    Utc::now(),
    };

    let email_str = user.user_email.to_string();
    let name      = user.user_name.clone();
    let role_str  = user.user_role.as_str();
    let image     = user.user_image.clone();
    let dob_str   = user.date_of_birth.map(encode_date);
    let company   = user.company_name.clone();
    let logo      = user.company_logo.clone();
    let at_str    = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO users (
             user_email, user_name, user_role, user_image, date_of_birth,
             company_name, company_logo, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (user_email) DO NOTHING",
          rusqlite::params![
            email_str, name, role_str, image, dob_str, company, logo, at_str,
          ],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(
        CoreError::Conflict(format!("user {} already exists", user.user_email)).into(),
      );
    }
    Ok(user)
  }

  async fn get_user(&self, email: Email) -> Result<Option<User>> {
    let email_str = email.to_string();
    let found = self
      .conn
      .call(move |conn| Ok(select_user(conn, &email_str)?))
      .await?;

    found
      .map(|(raw, employees)| raw.into_user(employees))
      .transpose()
  }

  async fn update_profile(&self, email: Email, update: ProfileUpdate) -> Result<Option<User>> {
    let email_str = email.to_string();
    let name      = update.user_name.map(|n| n.trim().to_owned());
    let image     = update.user_image;
    let dob_str   = update.date_of_birth.map(encode_date);

    let found = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET
             user_name     = COALESCE(?2, user_name),
             user_image    = COALESCE(?3, user_image),
             date_of_birth = COALESCE(?4, date_of_birth)
           WHERE user_email = ?1",
          rusqlite::params![email_str, name, image, dob_str],
        )?;
        Ok(select_user(conn, &email_str)?)
      })
      .await?;

    found
      .map(|(raw, employees)| raw.into_user(employees))
      .transpose()
  }

  async fn list_unaffiliated_employees(&self) -> Result<Vec<User>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(select_users(
          conn,
          "user_role = 'employee' AND current_working_company_email IS NULL",
          [],
        )?)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_user(Vec::new())).collect()
  }

  async fn list_company_members(&self, company: Email) -> Result<Vec<User>> {
    let company_str = company.to_string();
    let raws = self
      .conn
      .call(move |conn| {
        Ok(select_users(
          conn,
          "current_working_company_email = ?1",
          rusqlite::params![company_str],
        )?)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_user(Vec::new())).collect()
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn book_employees(
    &self,
    hr:            Email,
    employees:     Vec<Email>,
    enforce_limit: bool,
  ) -> Result<User> {
    let hr_str = hr.to_string();
    let wanted: BTreeSet<String> = employees.into_iter().map(String::from).collect();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some((hr_raw, _)) = select_user(&tx, &hr_str)? else {
          return Ok(Err(CoreError::NotFound(format!("user {hr_str}"))));
        };
        if hr_raw.user_role != "hr" {
          return Ok(Err(CoreError::Forbidden));
        }

        let mut to_book = Vec::new();
        for email in &wanted {
          let row: Option<(String, Option<String>)> = tx
            .query_row(
              "SELECT user_role, current_working_company_email
               FROM users WHERE user_email = ?1",
              rusqlite::params![email],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

          match row {
            None => {
              return Ok(Err(CoreError::NotFound(format!("user {email}"))));
            }
            Some((role, _)) if role != "employee" => {
              return Ok(Err(CoreError::Conflict(format!(
                "{email} is not an employee"
              ))));
            }
            Some((_, Some(company))) if company == hr_str => {}
            Some((_, Some(company))) => {
              return Ok(Err(CoreError::Conflict(format!(
                "{email} is already booked under {company}"
              ))));
            }
            Some((_, None)) => to_book.push(email.as_str()),
          }
        }

        if enforce_limit && !to_book.is_empty() {
          let used: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE current_working_company_email = ?1",
            rusqlite::params![hr_str],
            |row| row.get(0),
          )?;
          let needed = used + to_book.len() as i64;
          if needed > hr_raw.current_membership_limit {
            return Ok(Err(CoreError::Conflict(format!(
              "roster would hold {needed} employees but the membership limit is {}",
              hr_raw.current_membership_limit
            ))));
          }
        }

        for email in &to_book {
          tx.execute(
            "UPDATE users SET
               current_working_company_email = ?2,
               current_working_company_name  = ?3,
               current_working_company_image = ?4
             WHERE user_email = ?1",
            rusqlite::params![email, hr_str, hr_raw.company_name, hr_raw.company_logo],
          )?;
        }

        let updated = select_user(&tx, &hr_str)?;
        tx.commit()?;
        Ok(Ok(updated))
      })
      .await??;

    into_found_user(found, &hr)
  }

  async fn unbook_employee(&self, hr: Email, employee: Email) -> Result<User> {
    let hr_str       = hr.to_string();
    let employee_str = employee.to_string();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE users SET
             current_working_company_email = NULL,
             current_working_company_name  = NULL,
             current_working_company_image = NULL
           WHERE user_email = ?1 AND current_working_company_email = ?2",
          rusqlite::params![employee_str, hr_str],
        )?;
        let updated = select_user(&tx, &hr_str)?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    into_found_user(found, &hr)
  }

  async fn add_membership_limit(&self, hr: Email, members: u32) -> Result<User> {
    let hr_str = hr.to_string();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE users SET current_membership_limit = current_membership_limit + ?2
           WHERE user_email = ?1 AND user_role = 'hr'",
          rusqlite::params![hr_str, members],
        )?;
        if n == 0 {
          return Ok(None);
        }
        let updated = select_user(&tx, &hr_str)?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    into_found_user(found, &hr)
  }

  // ── Products ──────────────────────────────────────────────────────────────

  async fn insert_product(&self, input: NewAsset) -> Result<Asset> {
    let asset = Asset {
      id:               Uuid::new_v4(),
      product_name:     input.product_name,
      product_type:     input.product_type,
      product_quantity: input.product_quantity,
      product_added_by: input.product_added_by,
      added_at:         Utc::now(),
    };

    let id_str    = encode_uuid(asset.id);
    let name      = asset.product_name.clone();
    let type_str  = asset.product_type.as_str();
    let quantity  = asset.product_quantity;
    let owner_str = asset.product_added_by.to_string();
    let at_str    = encode_dt(asset.added_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products (
             id, product_name, product_type, product_quantity, product_added_by, added_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, type_str, quantity, owner_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(asset)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Asset>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
            rusqlite::params![id_str],
            RawAsset::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAsset::into_asset).transpose()
  }

  async fn update_product(&self, id: Uuid, patch: AssetPatch) -> Result<Option<Asset>> {
    let id_str   = encode_uuid(id);
    let name     = patch.product_name.map(|n| n.trim().to_owned());
    let type_str = patch.product_type.map(|t| t.as_str());
    let quantity = patch.product_quantity;

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE products SET
             product_name     = COALESCE(?2, product_name),
             product_type     = COALESCE(?3, product_type),
             product_quantity = COALESCE(?4, product_quantity)
           WHERE id = ?1",
          rusqlite::params![id_str, name, type_str, quantity],
        )?;
        Ok(conn
          .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
            rusqlite::params![id_str],
            RawAsset::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAsset::into_asset).transpose()
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM products WHERE id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Ok(false));
        }

        let checked_out: i64 = tx.query_row(
          "SELECT COUNT(*) FROM products_requested
           WHERE product_id = ?1 AND approval_status = 'approved'",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;
        if checked_out > 0 {
          return Ok(Err(CoreError::Conflict(format!(
            "{checked_out} unit(s) of product {id_str} are still checked out"
          ))));
        }

        tx.execute(
          "UPDATE products_requested SET approval_status = 'rejected', approval_date = NULL
           WHERE product_id = ?1 AND approval_status = 'pending'",
          rusqlite::params![id_str],
        )?;
        tx.execute("DELETE FROM products WHERE id = ?1", rusqlite::params![id_str])?;
        tx.commit()?;
        Ok(Ok(true))
      })
      .await??;

    Ok(deleted)
  }

  async fn list_products(&self, scope: Email, filter: ProductFilter) -> Result<Vec<Asset>> {
    let scope_str        = scope.to_string();
    let text             = filter.text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
    let type_str         = filter.product_type.map(|t| t.as_str());
    let availability_str = filter.availability.map(|a| a.as_str());
    let sort_str         = filter.sort.map(|s| match s {
      QuantitySort::Asc => "asc",
      QuantitySort::Desc => "desc",
    });
    let (limit, offset)  = page(filter.limit, filter.offset);

    let raws: Vec<RawAsset> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS} FROM products
           WHERE product_added_by = ?1
             AND (?2 IS NULL OR instr(lower(product_name), ?2) > 0)
             AND (?3 IS NULL OR product_type = ?3)
             AND (?4 IS NULL
                  OR (?4 = 'available'    AND product_quantity >= 1)
                  OR (?4 = 'out_of_stock' AND product_quantity < 1))
           ORDER BY
             CASE WHEN ?5 = 'asc'  THEN product_quantity END ASC,
             CASE WHEN ?5 = 'desc' THEN product_quantity END DESC,
             added_at DESC
           LIMIT ?6 OFFSET ?7"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              scope_str, text, type_str, availability_str, sort_str, limit, offset,
            ],
            RawAsset::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAsset::into_asset).collect()
  }

  // ── Asset requests ────────────────────────────────────────────────────────

  async fn insert_request(&self, input: NewAssetRequest) -> Result<AssetRequest> {
    let request = AssetRequest {
      id:              Uuid::new_v4(),
      product_id:      input.product_id,
      product_name:    input.product_name,
      product_type:    input.product_type,
      user_email:      input.user_email,
      user_name:       input.user_name,
      company_email:   input.company_email,
      note:            input.note,
      approval_status: ApprovalStatus::Pending,
      approval_date:   None,
      requested_at:    Utc::now(),
    };

    let id_str         = encode_uuid(request.id);
    let product_id_str = encode_uuid(request.product_id);
    let product_name   = request.product_name.clone();
    let type_str       = request.product_type.as_str();
    let user_str       = request.user_email.to_string();
    let user_name      = request.user_name.clone();
    let company_str    = request.company_email.to_string();
    let note           = request.note.clone();
    let at_str         = encode_dt(request.requested_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products_requested (
             id, product_id, product_name, product_type, user_email, user_name,
             company_email, note, approval_status, requested_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', ?9)",
          rusqlite::params![
            id_str, product_id_str, product_name, type_str, user_str, user_name,
            company_str, note, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn get_request(&self, id: Uuid) -> Result<Option<AssetRequest>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM products_requested WHERE id = ?1"),
            rusqlite::params![id_str],
            RawAssetRequest::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAssetRequest::into_request).transpose()
  }

  async fn has_pending_request(&self, product_id: Uuid, requester: Email) -> Result<bool> {
    let product_id_str = encode_uuid(product_id);
    let user_str       = requester.to_string();

    let pending = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM products_requested
             WHERE product_id = ?1 AND user_email = ?2 AND approval_status = 'pending'
             LIMIT 1",
            rusqlite::params![product_id_str, user_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some())
      })
      .await?;

    Ok(pending)
  }

  async fn list_requests(
    &self,
    scope:  RequestScope,
    filter: RequestFilter,
  ) -> Result<Vec<AssetRequest>> {
    let company_str     = scope.company.to_string();
    let requester_str   = scope.requester.map(String::from);
    let text            = filter.text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
    let type_str        = filter.product_type.map(|t| t.as_str());
    let status_str      = filter.status.map(|s| s.as_str());
    let (limit, offset) = page(filter.limit, filter.offset);

    let raws: Vec<RawAssetRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REQUEST_COLUMNS} FROM products_requested
           WHERE company_email = ?1
             AND (?2 IS NULL OR user_email = ?2)
             AND (?3 IS NULL
                  OR instr(lower(product_name), ?3) > 0
                  OR instr(user_email, ?3) > 0
                  OR instr(lower(user_name), ?3) > 0)
             AND (?4 IS NULL OR product_type = ?4)
             AND (?5 IS NULL OR approval_status = ?5)
           ORDER BY requested_at DESC
           LIMIT ?6 OFFSET ?7"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              company_str, requester_str, text, type_str, status_str, limit, offset,
            ],
            RawAssetRequest::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssetRequest::into_request).collect()
  }

  async fn transition_request(&self, id: Uuid, action: Transition) -> Result<AssetRequest> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Err(e) = apply_transition(&tx, "products_requested", &id_str, action, true)? {
          return Ok(Err(e));
        }
        let raw = tx.query_row(
          &format!("SELECT {REQUEST_COLUMNS} FROM products_requested WHERE id = ?1"),
          rusqlite::params![id_str],
          RawAssetRequest::from_row,
        )?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_request()
  }

  // ── Custom asset requests ─────────────────────────────────────────────────

  async fn insert_custom_request(
    &self,
    input: NewCustomAssetRequest,
  ) -> Result<CustomAssetRequest> {
    let details = input.details;
    let request = CustomAssetRequest {
      id:              Uuid::new_v4(),
      asset_name:      details.asset_name.trim().to_owned(),
      price:           details.price,
      asset_type:      details.asset_type,
      asset_image:     details.asset_image,
      why_needed:      details.why_needed,
      additional_info: details.additional_info,
      user_email:      input.user_email,
      user_name:       input.user_name,
      company_email:   input.company_email,
      approval_status: ApprovalStatus::Pending,
      approval_date:   None,
      requested_at:    Utc::now(),
    };

    let id_str      = encode_uuid(request.id);
    let asset_name  = request.asset_name.clone();
    let price       = request.price;
    let type_str    = request.asset_type.as_str();
    let image       = request.asset_image.clone();
    let why_needed  = request.why_needed.clone();
    let info        = request.additional_info.clone();
    let user_str    = request.user_email.to_string();
    let user_name   = request.user_name.clone();
    let company_str = request.company_email.to_string();
    let at_str      = encode_dt(request.requested_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products_requested_custom (
             id, asset_name, price, asset_type, asset_image, why_needed,
             additional_info, user_email, user_name, company_email,
             approval_status, requested_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'pending', ?11)",
          rusqlite::params![
            id_str, asset_name, price, type_str, image, why_needed, info,
            user_str, user_name, company_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn get_custom_request(&self, id: Uuid) -> Result<Option<CustomAssetRequest>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {CUSTOM_REQUEST_COLUMNS} FROM products_requested_custom WHERE id = ?1"
            ),
            rusqlite::params![id_str],
            RawCustomRequest::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCustomRequest::into_request).transpose()
  }

  async fn list_custom_requests(
    &self,
    scope:  RequestScope,
    filter: RequestFilter,
  ) -> Result<Vec<CustomAssetRequest>> {
    let company_str     = scope.company.to_string();
    let requester_str   = scope.requester.map(String::from);
    let text            = filter.text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
    let type_str        = filter.product_type.map(|t| t.as_str());
    let status_str      = filter.status.map(|s| s.as_str());
    let (limit, offset) = page(filter.limit, filter.offset);

    let raws: Vec<RawCustomRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CUSTOM_REQUEST_COLUMNS} FROM products_requested_custom
           WHERE company_email = ?1
             AND (?2 IS NULL OR user_email = ?2)
             AND (?3 IS NULL
                  OR instr(lower(asset_name), ?3) > 0
                  OR instr(user_email, ?3) > 0
                  OR instr(lower(user_name), ?3) > 0)
             AND (?4 IS NULL OR asset_type = ?4)
             AND (?5 IS NULL OR approval_status = ?5)
           ORDER BY requested_at DESC
           LIMIT ?6 OFFSET ?7"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              company_str, requester_str, text, type_str, status_str, limit, offset,
            ],
            RawCustomRequest::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomRequest::into_request).collect()
  }

  async fn transition_custom_request(
    &self,
    id:     Uuid,
    action: Transition,
  ) -> Result<CustomAssetRequest> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Err(e) =
          apply_transition(&tx, "products_requested_custom", &id_str, action, false)?
        {
          return Ok(Err(e));
        }
        let raw = tx.query_row(
          &format!(
            "SELECT {CUSTOM_REQUEST_COLUMNS} FROM products_requested_custom WHERE id = ?1"
          ),
          rusqlite::params![id_str],
          RawCustomRequest::from_row,
        )?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_request()
  }

  // ── Misc documents ────────────────────────────────────────────────────────

  async fn get_misc(&self, name: String) -> Result<Option<serde_json::Value>> {
    let data: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT data FROM misc WHERE name = ?1",
            rusqlite::params![name],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
  }

  async fn put_misc(&self, name: String, data: serde_json::Value) -> Result<()> {
    let data_str = data.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO misc (name, data) VALUES (?1, ?2)
           ON CONFLICT (name) DO UPDATE SET data = excluded.data",
          rusqlite::params![name, data_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
