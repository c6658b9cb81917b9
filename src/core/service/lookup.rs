//! Read paths: identity resolution, record lookup and listings

use std::rc::Rc;

use rusqlite::params;
use tracing::{debug, warn};

use super::TagService;
use crate::core::error::Result;
use crate::core::search::SavedSearch;
use crate::core::tag::{normalize_name, Tag, TagType};

/// Temporary table holding the item set of a restricted listing
const ITEM_SET_TABLE: &str = "tagItemSet";

impl TagService {
    /// Resolve (name, type, library) to a tag id
    ///
    /// The identity index is consulted first; on a miss the store is queried
    /// and a hit is remembered.
    pub fn resolve_id(
        &mut self,
        name: &str,
        tag_type: TagType,
        library_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Ok(None);
        }

        if let Some(id) = self.identity.get(library_id, tag_type, name) {
            return Ok(Some(id));
        }

        // COLLATE NOCASE on `name` only folds ASCII, so "Äbc" and "äbc" can
        // still end up as separate rows.
        let id: Option<i64> = self.db.value_query(
            "SELECT tagID FROM tags WHERE name = ?1 AND type = ?2 AND libraryID IS ?3 \
             ORDER BY tagID LIMIT 1",
            params![name, tag_type.raw(), library_id],
        )?;
        if let Some(id) = id {
            debug!(tag = id, name, "identity index populated");
            self.identity.insert(library_id, tag_type, name, id);
        }
        Ok(id)
    }

    /// Tag record by id
    ///
    /// A cache miss triggers a full reload before giving up.
    pub fn get(&mut self, id: i64) -> Result<Option<&Tag>> {
        if !self.objects.contains(id) {
            debug!(tag = id, "object cache miss");
            self.reload_all()?;
        }
        Ok(self.objects.get(id))
    }

    pub fn name(&mut self, id: i64) -> Result<Option<String>> {
        Ok(self.get(id)?.map(|tag| tag.name.clone()))
    }

    /// Every tag id with this name in the library, of any type
    pub fn ids_for_name(&self, name: &str, library_id: Option<i64>) -> Result<Vec<i64>> {
        self.db.column_query(
            "SELECT tagID FROM tags WHERE name = ?1 AND libraryID IS ?2 ORDER BY tagID",
            params![normalize_name(name), library_id],
        )
    }

    /// Types of every tag with this name in the library
    pub fn types_for_name(&self, name: &str, library_id: Option<i64>) -> Result<Vec<TagType>> {
        let raw: Vec<i64> = self.db.column_query(
            "SELECT type FROM tags WHERE name = ?1 AND libraryID IS ?2 ORDER BY tagID",
            params![normalize_name(name), library_id],
        )?;
        Ok(raw.into_iter().map(TagType::from_raw).collect())
    }

    /// Items linked to a tag
    pub fn tag_items(&self, id: i64) -> Result<Vec<i64>> {
        self.db.column_query(
            "SELECT itemID FROM itemTags WHERE tagID = ?1 ORDER BY itemID",
            params![id],
        )
    }

    /// All tags of a library, optionally restricted to some types
    pub fn all(&mut self, types: Option<&[TagType]>, library_id: Option<i64>) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT tagID, name FROM tags WHERE libraryID IS ?1{}",
            type_clause(types, "type")
        );
        let rows = self
            .db
            .query_rows(&sql, params![library_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        self.collate_and_resolve(rows)
    }

    /// Tags linked to any of the given items
    pub fn all_within_items(
        &mut self,
        item_ids: &[i64],
        types: Option<&[TagType]>,
    ) -> Result<Vec<Tag>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let db = Rc::clone(&self.db);
        let tx = db.begin()?;
        db.create_id_table(ITEM_SET_TABLE, item_ids)?;
        let sql = format!(
            "SELECT DISTINCT tags.tagID, tags.name FROM itemTags \
             JOIN tags ON tags.tagID = itemTags.tagID \
             WHERE itemTags.itemID IN (SELECT id FROM {}){}",
            ITEM_SET_TABLE,
            type_clause(types, "tags.type")
        );
        let rows = db.query_rows(&sql, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
        db.drop_id_table(ITEM_SET_TABLE)?;
        tx.commit()?;

        self.collate_and_resolve(rows)
    }

    /// Tags linked to the items a saved search returns
    ///
    /// A search that no longer exists is not an error: the transaction
    /// scope is rolled back and the listing is empty.
    pub fn all_within_search(
        &mut self,
        search: &dyn SavedSearch,
        types: Option<&[TagType]>,
    ) -> Result<Vec<Tag>> {
        let db = Rc::clone(&self.db);
        let tx = db.begin()?;
        let item_ids = match search.item_ids() {
            Ok(ids) => ids,
            Err(e) if e.is_search_missing() => {
                tx.rollback()?;
                warn!("{}", e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        let tags = self.all_within_items(&item_ids, types)?;
        tx.commit()?;
        Ok(tags)
    }

    /// Tags whose name contains `text` (all libraries); empty text lists everything
    pub fn search(&mut self, text: &str) -> Result<Vec<Tag>> {
        let rows = if text.is_empty() {
            self.db
                .query_rows("SELECT tagID, name FROM tags", [], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
        } else {
            self.db.query_rows(
                "SELECT tagID, name FROM tags WHERE name LIKE ?1 ESCAPE '\\'",
                params![format!("%{}%", escape_like(text))],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?
        };
        self.collate_and_resolve(rows)
    }

    /// Stable-sort rows by name, then resolve each through the object cache
    fn collate_and_resolve(&mut self, mut rows: Vec<(i64, String)>) -> Result<Vec<Tag>> {
        rows.sort_by(|a, b| self.collation.compare(self.strength, &a.1, &b.1));

        let mut tags = Vec::with_capacity(rows.len());
        for (id, _) in rows {
            if let Some(tag) = self.get(id)? {
                tags.push(tag.clone());
            }
        }
        Ok(tags)
    }
}

fn type_clause(types: Option<&[TagType]>, column: &str) -> String {
    match types {
        Some(types) if !types.is_empty() => {
            let list = types
                .iter()
                .map(|t| t.raw().to_string())
                .collect::<Vec<_>>()
                .join(",");
            format!(" AND {} IN ({})", column, list)
        }
        _ => String::new(),
    }
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::core::error::TagError;
    use crate::core::search::{ItemSet, SavedSearch};
    use crate::core::tag::TagType;

    struct DeletedSearch;

    impl SavedSearch for DeletedSearch {
        fn item_ids(&self) -> crate::core::error::Result<Vec<i64>> {
            Err(TagError::SavedSearchMissing(42))
        }
    }

    struct BrokenSearch;

    impl SavedSearch for BrokenSearch {
        fn item_ids(&self) -> crate::core::error::Result<Vec<i64>> {
            Err(TagError::Io(std::io::Error::other("disk gone")))
        }
    }

    fn names(tags: &[crate::core::tag::Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_resolve_id_second_call_hits_index() {
        let (mut service, _) = service();
        let id = raw_tag(&service, "Physics", TagType::Manual, Some(1));

        assert_eq!(service.resolve_id(" physics ", TagType::Manual, Some(1)).unwrap(), Some(id));
        let reads = service.database().read_count();
        assert_eq!(service.resolve_id("PHYSICS", TagType::Manual, Some(1)).unwrap(), Some(id));
        assert_eq!(service.database().read_count(), reads);
    }

    #[test]
    fn test_resolve_id_respects_type_and_library() {
        let (mut service, _) = service();
        raw_tag(&service, "Physics", TagType::Manual, Some(1));

        assert_eq!(service.resolve_id("Physics", TagType::AUTOMATIC, Some(1)).unwrap(), None);
        assert_eq!(service.resolve_id("Physics", TagType::Manual, None).unwrap(), None);
        assert_eq!(service.resolve_id("   ", TagType::Manual, Some(1)).unwrap(), None);
    }

    #[test]
    fn test_get_populates_from_store() {
        let (mut service, _) = service();
        let id = raw_tag(&service, "x", TagType::Manual, None);
        assert_eq!(service.get(id).unwrap().unwrap().name, "x");
        assert!(service.get(id + 100).unwrap().is_none());
        assert_eq!(service.name(id).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_ids_and_types_for_name() {
        let (service, _) = service();
        let a = raw_tag(&service, "Review", TagType::Manual, Some(1));
        let b = raw_tag(&service, "review", TagType::AUTOMATIC, Some(1));
        raw_tag(&service, "Review", TagType::Manual, Some(2));

        assert_eq!(service.ids_for_name("Review", Some(1)).unwrap(), vec![a, b]);
        assert_eq!(
            service.types_for_name(" Review", Some(1)).unwrap(),
            vec![TagType::Manual, TagType::AUTOMATIC]
        );
        assert!(service.ids_for_name("Review", None).unwrap().is_empty());
    }

    #[test]
    fn test_all_is_collated_and_filtered() {
        let (mut service, _) = service();
        raw_tag(&service, "banana", TagType::Manual, None);
        raw_tag(&service, "Apple", TagType::Manual, None);
        raw_tag(&service, "cherry", TagType::AUTOMATIC, None);
        raw_tag(&service, "avocado", TagType::Manual, Some(9));

        let all = service.all(None, None).unwrap();
        assert_eq!(names(&all), vec!["Apple", "banana", "cherry"]);

        let manual = service.all(Some(&[TagType::Manual][..]), None).unwrap();
        assert_eq!(names(&manual), vec!["Apple", "banana"]);
    }

    #[test]
    fn test_all_keeps_row_order_for_ties() {
        let (mut service, _) = service();
        let first = raw_tag(&service, "read", TagType::Manual, None);
        let second = raw_tag(&service, "Read", TagType::Manual, None);

        let ids: Vec<i64> = service.all(None, None).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_all_within_items() {
        let (mut service, _) = service();
        item(&service, 10, None);
        item(&service, 11, None);
        let a = raw_tag(&service, "a", TagType::Manual, None);
        let b = raw_tag(&service, "b", TagType::AUTOMATIC, None);
        raw_tag(&service, "unlinked", TagType::Manual, None);
        raw_link(&service, 10, a);
        raw_link(&service, 11, a);
        raw_link(&service, 11, b);

        let tags = service.all_within_items(&[10, 11], None).unwrap();
        assert_eq!(names(&tags), vec!["a", "b"]);

        let auto = service.all_within_items(&[11], Some(&[TagType::AUTOMATIC][..])).unwrap();
        assert_eq!(names(&auto), vec!["b"]);
    }

    #[test]
    fn test_all_within_search_absorbs_missing_search() {
        let (mut service, _) = service();
        item(&service, 10, None);
        let a = raw_tag(&service, "a", TagType::Manual, None);
        raw_link(&service, 10, a);

        assert!(service.all_within_search(&DeletedSearch, None).unwrap().is_empty());
        assert!(!service.database().in_transaction());

        let tags = service.all_within_search(&ItemSet(vec![10]), None).unwrap();
        assert_eq!(names(&tags), vec!["a"]);
    }

    #[test]
    fn test_all_within_search_propagates_other_failures() {
        let (mut service, _) = service();
        let err = service.all_within_search(&BrokenSearch, None).unwrap_err();
        assert!(matches!(err, TagError::Io(_)));
        assert!(!service.database().in_transaction());
    }

    #[test]
    fn test_search_substring_escapes_wildcards() {
        let (mut service, _) = service();
        raw_tag(&service, "100% cotton", TagType::Manual, None);
        raw_tag(&service, "100 percent", TagType::Manual, Some(3));
        raw_tag(&service, "Cotton candy", TagType::Manual, None);

        assert_eq!(names(&service.search("cotton").unwrap()), vec!["100% cotton", "Cotton candy"]);
        assert_eq!(names(&service.search("0%").unwrap()), vec!["100% cotton"]);
        assert_eq!(service.search("").unwrap().len(), 3);
    }
}
