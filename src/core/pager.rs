use crate::models::{Keyed, Page};
use crate::core::cursor;

/// Cut one page out of a sequence ordered ascending by key
///
/// Items with a key at or below `after` are skipped. One item beyond
/// `page_size` is pulled to decide `has_more`; the next cursor points at the
/// last item returned. A `page_size` of zero is treated as one.
///
/// Pages are not snapshot-isolated: if the source changes between calls,
/// chained cursors may skip newly inserted keys below the cursor.
pub fn paginate<T, I>(ordered: I, after: Option<i64>, page_size: usize) -> Page<T>
where
    T: Keyed,
    I: IntoIterator<Item = T>,
{
    let page_size = page_size.max(1);

    let mut items: Vec<T> = ordered
        .into_iter()
        .filter(|item| after.map_or(true, |after| item.key() > after))
        .take(page_size.saturating_add(1))
        .collect();

    if items.len() <= page_size {
        return Page {
            items,
            next_cursor: None,
            has_more: false,
        };
    }

    items.truncate(page_size);
    let next_cursor = items.last().map(|item| cursor::encode(item.key()));

    Page {
        has_more: next_cursor.is_some(),
        items,
        next_cursor,
    }
}
