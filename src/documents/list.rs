use crate::types::{Document, RecordId};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Cached document list with search and pagination.
///
/// Pages are 1-based. The search term filters before paginating; documents
/// without a stored file are hidden from a page after slicing, so a page can
/// hold fewer than `page_size` rows.
#[derive(Debug, Clone)]
pub struct DocumentList {
    documents: Vec<Document>,
    search: String,
    page: usize,
    page_size: usize,
}

impl Default for DocumentList {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DocumentList {
    pub fn new(page_size: usize) -> Self {
        Self {
            documents: Vec::new(),
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn replace(&mut self, documents: Vec<Document>) {
        self.documents = documents;
        self.page = self.page.min(self.total_pages());
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.page = 1;
    }

    pub fn all(&self) -> &[Document] {
        &self.documents
    }

    pub fn find(&self, doc_id: &RecordId) -> Option<&Document> {
        self.documents.iter().find(|d| &d.doc_id == doc_id)
    }

    /// Drop a document from the local list only; the backend has no delete route.
    pub fn remove(&mut self, doc_id: &RecordId) -> Option<Document> {
        let index = self.documents.iter().position(|d| &d.doc_id == doc_id)?;
        let removed = self.documents.remove(index);
        self.page = self.page.min(self.total_pages());
        Some(removed)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = self.page.min(self.total_pages());
    }

    /// Case-insensitive substring match over name, type, tag, case and people
    pub fn filtered(&self) -> Vec<&Document> {
        let term = self.search.to_lowercase();
        self.documents
            .iter()
            .filter(|doc| term.is_empty() || search_fields(doc).iter().any(|f| f.contains(&term)))
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size).max(1)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Rows visible on the current page
    pub fn page_items(&self) -> Vec<&Document> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .filter(|doc| doc.has_file())
            .collect()
    }
}

fn search_fields(doc: &Document) -> [String; 6] {
    let opt_id = |id: &Option<RecordId>| id.as_ref().map(|i| i.to_string()).unwrap_or_default();
    [
        doc.doc_name.clone().unwrap_or_default(),
        doc.doc_type.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        doc.doc_tag.clone().unwrap_or_default(),
        opt_id(&doc.case_id),
        opt_id(&doc.doc_submitted_by),
        opt_id(&doc.doc_tasked_by),
    ]
    .map(|f| f.to_lowercase())
}
