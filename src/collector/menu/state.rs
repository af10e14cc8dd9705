use super::page::{Page, PageRef};
use crate::collector::error::CollectorError;

/// Next index with wrap-around: the last page is followed by the first
pub fn forward(index: usize, page_count: usize) -> usize {
    if page_count == 0 {
        return 0;
    }
    (index + 1) % page_count
}

/// Previous index with wrap-around: the first page is preceded by the last
pub fn back(index: usize, page_count: usize) -> usize {
    if page_count == 0 {
        return 0;
    }
    if index == 0 || index > page_count {
        page_count - 1
    } else {
        index - 1
    }
}

/// Navigation step bound to a reserved reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Back,
    Forward,
}

/// Position of the current page
///
/// `path` lists the indices of the parent pages leading to the active page
/// set (empty for the top level); `index` is the position within that set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: Vec<usize>,
    pub index: usize,
}

/// Navigation state of a menu
///
/// Transitions only touch indices; rendering is the controller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    location: Location,
    history: Vec<Location>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn current_index(&self) -> usize {
        self.location.index
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Page set `forward`/`back` currently cycle through
    pub fn active_set<'a>(&self, pages: &'a [Page]) -> &'a [Page] {
        pages_at(pages, &self.location.path)
    }

    pub fn current_page<'a>(&self, pages: &'a [Page]) -> Option<&'a Page> {
        self.active_set(pages).get(self.location.index)
    }

    pub fn navigate(&mut self, step: Navigation, pages: &[Page]) {
        let count = self.active_set(pages).len();
        self.location.index = match step {
            Navigation::Back => back(self.location.index, count),
            Navigation::Forward => forward(self.location.index, count),
        };
    }

    /// Jump to a page, remembering the current one
    ///
    /// Resolution order: when the current page has nested pages, an id is
    /// looked up there first and then in the top-level pages; an index
    /// addresses the nested pages if there are any, else the top level.
    pub fn go_to(&mut self, target: &PageRef, pages: &[Page]) -> Result<(), CollectorError> {
        let nested_path = {
            let mut path = self.location.path.clone();
            path.push(self.location.index);
            path
        };
        let nested = pages_at(pages, &nested_path);

        let resolved = match target {
            PageRef::Index(index) if !nested.is_empty() => {
                (*index < nested.len()).then(|| (nested_path, *index))
            }
            PageRef::Index(index) => (*index < pages.len()).then(|| (Vec::new(), *index)),
            PageRef::Id(id) => position_of(nested, id)
                .map(|index| (nested_path, index))
                .or_else(|| position_of(pages, id).map(|index| (Vec::new(), index))),
        };

        let (path, index) =
            resolved.ok_or_else(|| CollectorError::PageNotFound(target.to_string()))?;
        let previous = std::mem::replace(&mut self.location, Location { path, index });
        self.history.push(previous);
        Ok(())
    }

    /// Return to the page before the last `go_to`
    ///
    /// Returns `false` when there is no history.
    pub fn previous(&mut self) -> bool {
        match self.history.pop() {
            Some(location) => {
                self.location = location;
                true
            }
            None => false,
        }
    }
}

fn position_of(pages: &[Page], id: &str) -> Option<usize> {
    pages.iter().position(|page| page.has_id(id))
}

fn pages_at<'a>(pages: &'a [Page], path: &[usize]) -> &'a [Page] {
    path.iter()
        .try_fold(pages, |set, &i| set.get(i).map(|page| page.pages.as_slice()))
        .unwrap_or_default()
}
