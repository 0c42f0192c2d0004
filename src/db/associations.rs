//! Join-table synchronization for photo taxonomy.
//!
//! A photo's category/gallery memberships are always replaced as a whole:
//! delete every join row for the photo, then insert one row per submitted
//! id, inside a single transaction. Related ids are checked for existence
//! up front so a bad id fails the whole operation instead of leaving a
//! dangling foreign key.

use rusqlite::{params, Connection};

use crate::error::{AppError, AppResult};

/// Which join table a sync call reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoLink {
    Categories,
    Galleries,
}

impl PhotoLink {
    fn join_table(self) -> &'static str {
        match self {
            PhotoLink::Categories => "categories_and_photos",
            PhotoLink::Galleries => "gallery_and_photos",
        }
    }

    fn related_column(self) -> &'static str {
        match self {
            PhotoLink::Categories => "id_category",
            PhotoLink::Galleries => "id_gallery",
        }
    }

    fn related_table(self) -> &'static str {
        match self {
            PhotoLink::Categories => "categories",
            PhotoLink::Galleries => "gallery",
        }
    }
}

/// Make the join table for `photo_id` reflect exactly `related_ids`.
///
/// Runs as one transaction: on any failure (including an unknown related
/// id) the previous row set is left untouched. An empty list is valid and
/// clears all associations. Duplicate ids in the input are the caller's
/// responsibility; the composite primary key rejects them.
pub fn replace_links(
    conn: &mut Connection,
    photo_id: i64,
    related_ids: &[i64],
    link: PhotoLink,
) -> AppResult<()> {
    let tx = conn.transaction()?;
    replace_links_tx(&tx, photo_id, related_ids, link)?;
    tx.commit()?;
    Ok(())
}

/// Transaction-scoped body of [`replace_links`], for callers that bundle
/// the sync with other writes (photo create/update) in one unit.
pub fn replace_links_tx(
    conn: &Connection,
    photo_id: i64,
    related_ids: &[i64],
    link: PhotoLink,
) -> AppResult<()> {
    // Validate first: no partial writes for a list containing a bad id.
    for &id in related_ids {
        let exists: bool = conn.query_row(
            &format!(
                "SELECT COUNT(*) > 0 FROM {} WHERE {} = ?1",
                link.related_table(),
                link.related_column()
            ),
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(AppError::UnknownRelatedId(id));
        }
    }

    conn.execute(
        &format!("DELETE FROM {} WHERE id_photo = ?1", link.join_table()),
        params![photo_id],
    )?;

    let mut insert = conn.prepare(&format!(
        "INSERT INTO {} ({}, id_photo) VALUES (?1, ?2)",
        link.join_table(),
        link.related_column()
    ))?;
    for &id in related_ids {
        insert.execute(params![id, photo_id])?;
    }

    Ok(())
}

/// Current related ids for a photo, in id order. Used by tests and by the
/// handlers that echo reconciled associations back.
pub fn linked_ids(conn: &Connection, photo_id: i64, link: PhotoLink) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} WHERE id_photo = ?1 ORDER BY {}",
        link.related_column(),
        link.join_table(),
        link.related_column()
    ))?;
    let ids = stmt
        .query_map(params![photo_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::state::DbPool;

    fn seed(pool: &DbPool) {
        let conn = pool.get().unwrap();
        conn.execute("INSERT INTO photos (photo_path) VALUES ('/uploads/a.jpg')", [])
            .unwrap();
        for name in ["nature", "portrait", "street"] {
            conn.execute(
                "INSERT INTO categories (category_name) VALUES (?1)",
                params![name],
            )
            .unwrap();
        }
        conn.execute("INSERT INTO gallery (gallery_name) VALUES ('2024')", [])
            .unwrap();
    }

    #[test]
    fn sync_replaces_full_set() {
        let pool = test_pool();
        seed(&pool);
        let mut conn = pool.get().unwrap();

        replace_links(&mut conn, 1, &[1, 2], PhotoLink::Categories).unwrap();
        assert_eq!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap(), [1, 2]);

        replace_links(&mut conn, 1, &[3], PhotoLink::Categories).unwrap();
        assert_eq!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap(), [3]);
    }

    #[test]
    fn sync_with_empty_list_clears_associations() {
        let pool = test_pool();
        seed(&pool);
        let mut conn = pool.get().unwrap();

        replace_links(&mut conn, 1, &[1, 2], PhotoLink::Categories).unwrap();
        replace_links(&mut conn, 1, &[], PhotoLink::Categories).unwrap();
        assert!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap().is_empty());
    }

    #[test]
    fn sync_is_idempotent() {
        let pool = test_pool();
        seed(&pool);
        let mut conn = pool.get().unwrap();

        replace_links(&mut conn, 1, &[1, 3], PhotoLink::Categories).unwrap();
        replace_links(&mut conn, 1, &[1, 3], PhotoLink::Categories).unwrap();
        assert_eq!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap(), [1, 3]);
    }

    #[test]
    fn unknown_related_id_fails_whole_operation() {
        let pool = test_pool();
        seed(&pool);
        let mut conn = pool.get().unwrap();

        replace_links(&mut conn, 1, &[1], PhotoLink::Categories).unwrap();

        let err = replace_links(&mut conn, 1, &[2, 999], PhotoLink::Categories).unwrap_err();
        assert!(matches!(err, AppError::UnknownRelatedId(999)));

        // Prior set must be untouched
        assert_eq!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap(), [1]);
    }

    #[test]
    fn categories_and_galleries_are_independent() {
        let pool = test_pool();
        seed(&pool);
        let mut conn = pool.get().unwrap();

        replace_links(&mut conn, 1, &[1, 2], PhotoLink::Categories).unwrap();
        replace_links(&mut conn, 1, &[1], PhotoLink::Galleries).unwrap();

        replace_links(&mut conn, 1, &[], PhotoLink::Galleries).unwrap();
        assert_eq!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap(), [1, 2]);
        assert!(linked_ids(&conn, 1, PhotoLink::Galleries).unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_in_input_are_rejected_by_the_store() {
        let pool = test_pool();
        seed(&pool);
        let mut conn = pool.get().unwrap();

        let result = replace_links(&mut conn, 1, &[1, 1], PhotoLink::Categories);
        assert!(result.is_err());
        // Rolled back: nothing written
        assert!(linked_ids(&conn, 1, PhotoLink::Categories).unwrap().is_empty());
    }
}
