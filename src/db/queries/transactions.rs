use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::models::{Category, Transaction, TransactionDraft, TransactionType};

const SELECT_COLUMNS: &str =
    "SELECT t.id, t.title, t.amount_cents, t.type, t.category, t.date, t.notes, t.created_at
     FROM transactions t";

#[derive(Debug, Default)]
pub struct TransactionFilter {
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub from_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub to_date: Option<String>,
    pub kind: Option<TransactionType>,
    /// Income rows pass this filter whatever their stored category.
    pub category: Option<Category>,
    /// SQL ORDER BY expression (e.g., "t.date DESC"). Defaults to "t.date DESC".
    pub sort_sql: Option<String>,
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount_cents: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn list_transactions(
    conn: &Connection,
    user_id: &str,
    filter: &TransactionFilter,
) -> rusqlite::Result<Vec<Transaction>> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE t.user_id = ?");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string())];

    if let Some(ref from_date) = filter.from_date {
        sql.push_str(" AND t.date >= ?");
        params_vec.push(Box::new(from_date.clone()));
    }
    if let Some(ref to_date) = filter.to_date {
        sql.push_str(" AND t.date <= ?");
        params_vec.push(Box::new(to_date.clone()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND t.type = ?");
        params_vec.push(Box::new(kind));
    }
    if let Some(category) = filter.category {
        sql.push_str(" AND (t.type = 'income' OR t.category = ?)");
        params_vec.push(Box::new(category));
    }

    // Insertion order breaks ties so equal keys keep a stable order
    let order_by = filter.sort_sql.as_deref().unwrap_or("t.date DESC");
    sql.push_str(&format!(" ORDER BY {}, t.rowid ASC", order_by));

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let transactions = stmt
        .query_map(params_refs.as_slice(), row_to_transaction)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, count = transactions.len(), "Listed transactions");
    Ok(transactions)
}

pub fn get_transaction(
    conn: &Connection,
    user_id: &str,
    id: &str,
) -> rusqlite::Result<Option<Transaction>> {
    trace!(transaction_id = id, "Fetching transaction");
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE t.user_id = ? AND t.id = ?"),
        params![user_id, id],
        row_to_transaction,
    )
    .optional()
}

pub fn create_transaction(
    conn: &Connection,
    user_id: &str,
    draft: &TransactionDraft,
) -> rusqlite::Result<Transaction> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    conn.execute(
        "INSERT INTO transactions (id, user_id, title, amount_cents, type, category, date, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            user_id,
            draft.title,
            draft.amount_cents,
            draft.kind,
            draft.category,
            draft.date,
            draft.notes,
            created_at,
        ],
    )?;

    debug!(
        transaction_id = %id,
        amount_cents = draft.amount_cents,
        kind = draft.kind.as_str(),
        "Created transaction"
    );

    Ok(Transaction {
        id,
        title: draft.title.clone(),
        amount_cents: draft.amount_cents,
        kind: draft.kind,
        category: draft.category,
        date: draft.date.clone(),
        notes: draft.notes.clone(),
        created_at,
    })
}

/// Replace the editable fields of a transaction. Returns `None` when the
/// user owns no transaction with that id.
pub fn update_transaction(
    conn: &Connection,
    user_id: &str,
    id: &str,
    draft: &TransactionDraft,
) -> rusqlite::Result<Option<Transaction>> {
    let rows = conn.execute(
        "UPDATE transactions SET title = ?, amount_cents = ?, type = ?, category = ?,
         date = ?, notes = ?
         WHERE user_id = ? AND id = ?",
        params![
            draft.title,
            draft.amount_cents,
            draft.kind,
            draft.category,
            draft.date,
            draft.notes,
            user_id,
            id,
        ],
    )?;

    if rows == 0 {
        return Ok(None);
    }

    debug!(transaction_id = id, "Updated transaction");
    get_transaction(conn, user_id, id)
}

pub fn delete_transaction(conn: &Connection, user_id: &str, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM transactions WHERE user_id = ? AND id = ?",
        params![user_id, id],
    )?;
    if rows > 0 {
        debug!(transaction_id = id, "Deleted transaction");
    }
    Ok(rows > 0)
}
