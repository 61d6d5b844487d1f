//! SQL schema for the AssetFlow SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- current_employees is never stored: it is the set of rows whose
-- current_working_company_email points back at an HR row.
CREATE TABLE IF NOT EXISTS users (
    user_email                    TEXT PRIMARY KEY,  -- lowercased
    user_name                     TEXT NOT NULL,
    user_role                     TEXT NOT NULL CHECK (user_role IN ('hr', 'employee')),
    user_image                    TEXT,
    date_of_birth                 TEXT,              -- YYYY-MM-DD
    company_name                  TEXT,
    company_logo                  TEXT,
    current_working_company_email TEXT REFERENCES users(user_email),
    current_working_company_name  TEXT,
    current_working_company_image TEXT,
    current_membership_limit      INTEGER NOT NULL DEFAULT 0
                                  CHECK (current_membership_limit >= 0),
    created_at                    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id               TEXT PRIMARY KEY,
    product_name     TEXT NOT NULL,
    product_type     TEXT NOT NULL,     -- 'returnable' | 'non_returnable'
    product_quantity INTEGER NOT NULL CHECK (product_quantity >= 0),
    product_added_by TEXT NOT NULL REFERENCES users(user_email),
    added_at         TEXT NOT NULL
);

-- product_id is deliberately not a foreign key: decided requests outlive
-- the product they name.
CREATE TABLE IF NOT EXISTS products_requested (
    id              TEXT PRIMARY KEY,
    product_id      TEXT NOT NULL,
    product_name    TEXT NOT NULL,
    product_type    TEXT NOT NULL,
    user_email      TEXT NOT NULL,
    user_name       TEXT NOT NULL,
    company_email   TEXT NOT NULL,
    note            TEXT,
    approval_status TEXT NOT NULL DEFAULT 'pending',
    approval_date   TEXT,
    requested_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products_requested_custom (
    id              TEXT PRIMARY KEY,
    asset_name      TEXT NOT NULL,
    price           REAL NOT NULL CHECK (price >= 0),
    asset_type      TEXT NOT NULL,
    asset_image     TEXT,
    why_needed      TEXT NOT NULL,
    additional_info TEXT,
    user_email      TEXT NOT NULL,
    user_name       TEXT NOT NULL,
    company_email   TEXT NOT NULL,
    approval_status TEXT NOT NULL DEFAULT 'pending',
    approval_date   TEXT,
    requested_at    TEXT NOT NULL
);

-- Free-form JSON documents keyed by name (e.g. 'packages').
CREATE TABLE IF NOT EXISTS misc (
    name TEXT PRIMARY KEY,
    data TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_company_idx      ON users(current_working_company_email);
CREATE INDEX IF NOT EXISTS products_owner_idx     ON products(product_added_by);
CREATE INDEX IF NOT EXISTS requests_company_idx   ON products_requested(company_email);
CREATE INDEX IF NOT EXISTS requests_product_idx   ON products_requested(product_id, approval_status);
CREATE INDEX IF NOT EXISTS custom_company_idx     ON products_requested_custom(company_email);

PRAGMA user_version = 1;
";
