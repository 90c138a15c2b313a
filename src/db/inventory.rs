use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::{ClinicError, Result, StoreContext};
use crate::models::{InventoryDraft, InventoryItem, DATE_FORMAT};

pub fn fetch_items(conn: &Connection) -> Result<Vec<InventoryItem>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, item_name, description, quantity, unit_price, expiry_date
             FROM inventory
             ORDER BY id",
        )
        .context("failed to prepare inventory query")?;

    let items = stmt
        .query_map([], |row| {
            Ok(InventoryItem {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                quantity: row.get(3)?,
                unit_price: row.get(4)?,
                expiry_date: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })
        .context("failed to load inventory")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to collect inventory")?;

    Ok(items)
}

pub fn create_item(conn: &Connection, draft: &InventoryDraft) -> Result<InventoryItem> {
    let expiry = draft.expiry_date.format(DATE_FORMAT).to_string();
    conn.execute(
        "INSERT INTO inventory (item_name, description, quantity, unit_price, expiry_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.name,
            draft.description,
            draft.quantity,
            draft.unit_price,
            expiry
        ],
    )
    .context("failed to insert inventory item")?;

    let id = conn.last_insert_rowid();
    info!(id, quantity = draft.quantity, "inventory item added");
    Ok(InventoryItem {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        quantity: draft.quantity,
        unit_price: draft.unit_price,
        expiry_date: expiry,
    })
}

pub fn update_item(conn: &Connection, id: i64, draft: &InventoryDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE inventory
             SET item_name = ?1, description = ?2, quantity = ?3, unit_price = ?4, expiry_date = ?5
             WHERE id = ?6",
            params![
                draft.name,
                draft.description,
                draft.quantity,
                draft.unit_price,
                draft.expiry_date.format(DATE_FORMAT).to_string(),
                id
            ],
        )
        .context("failed to update inventory item")?;

    if updated == 0 {
        return Err(ClinicError::NotFound {
            entity: "Inventory item",
            id,
        });
    }
    info!(id, "inventory item updated");
    Ok(())
}

pub fn delete_item(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM inventory WHERE id = ?1", params![id])
        .context("failed to delete inventory item")?;

    if deleted == 0 {
        warn!(id, "no inventory item to delete");
    } else {
        info!(id, "inventory item deleted");
    }
    Ok(deleted > 0)
}
