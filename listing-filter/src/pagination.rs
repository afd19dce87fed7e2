use crate::error::ListingError;
use serde::Serialize;

/// 分页结果
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// 总页数，空列表也按1页计算
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

/// 取出第 `page` 页（从1开始）
///
/// 页码越界属于调用方错误，这里不做修正。
pub fn paginate<T: Clone>(filtered: &[T], page: usize, page_size: usize) -> Result<Page<T>, ListingError> {
    if page_size == 0 {
        return Err(ListingError::InvalidPageSize);
    }

    let total_pages = total_pages(filtered.len(), page_size);
    if page < 1 || page > total_pages {
        return Err(ListingError::PageOutOfRange { page, total_pages });
    }

    let start = ((page - 1) * page_size).min(filtered.len());
    let end = (start + page_size).min(filtered.len());

    Ok(Page {
        items: filtered[start..end].to_vec(),
        total_pages,
    })
}

/// 当前页码，始终保持在 [1, total_pages] 内
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current: usize,
    total_pages: usize,
}

impl PageCursor {
    pub fn new(total_pages: usize) -> Self {
        Self {
            current: 1,
            total_pages: total_pages.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// 下一页，已在最后一页时不动并返回 false
    pub fn next(&mut self) -> bool {
        if self.current >= self.total_pages {
            return false;
        }
        self.current += 1;
        true
    }

    /// 上一页，已在第一页时不动并返回 false
    pub fn prev(&mut self) -> bool {
        if self.current <= 1 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn go_to(&mut self, page: usize) -> Result<(), ListingError> {
        if page < 1 || page > self.total_pages {
            return Err(ListingError::PageOutOfRange {
                page,
                total_pages: self.total_pages,
            });
        }
        self.current = page;
        Ok(())
    }

    /// 筛选条件变化后回到第一页
    pub fn reset(&mut self, total_pages: usize) {
        *self = Self::new(total_pages);
    }

    /// 总页数变化但筛选条件未变（排序、切换语言），页码截断到新的范围内
    pub fn clamp_to(&mut self, total_pages: usize) {
        self.total_pages = total_pages.max(1);
        self.current = self.current.clamp(1, self.total_pages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_items_six_per_page() {
        let prices = [100, 150, 200, 250, 300, 350, 400];
        let page = paginate(&prices, 1, 6).unwrap();
        assert_eq!(page.items.len(), 6);
        assert_eq!(page.total_pages, 2);

        let last = paginate(&prices, 2, 6).unwrap();
        assert_eq!(last.items, vec![400]);
    }

    #[test]
    fn empty_list_has_one_page() {
        let page = paginate::<u8>(&[], 1, 6).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(total_pages(0, 6), 1);
        assert_eq!(total_pages(12, 6), 2);
        assert_eq!(total_pages(13, 6), 3);
    }

    #[test]
    fn out_of_range_page_is_caller_error() {
        let items = [1, 2, 3];
        assert!(matches!(
            paginate(&items, 0, 2),
            Err(ListingError::PageOutOfRange { page: 0, total_pages: 2 })
        ));
        assert!(matches!(paginate(&items, 3, 2), Err(ListingError::PageOutOfRange { .. })));
        assert!(matches!(paginate(&items, 1, 0), Err(ListingError::InvalidPageSize)));
    }

    #[test]
    fn cursor_moves_are_noops_at_boundaries() {
        let mut cursor = PageCursor::new(2);
        assert!(!cursor.prev());
        assert!(cursor.next());
        assert_eq!(cursor.current(), 2);
        assert!(!cursor.next());
        assert_eq!(cursor.current(), 2);
        assert!(cursor.go_to(3).is_err());
        assert!(cursor.go_to(1).is_ok());
    }

    #[test]
    fn cursor_clamps_when_pages_shrink() {
        let mut cursor = PageCursor::new(5);
        cursor.go_to(4).unwrap();
        cursor.clamp_to(2);
        assert_eq!(cursor.current(), 2);
        cursor.clamp_to(0);
        assert_eq!((cursor.current(), cursor.total_pages()), (1, 1));
    }
}
