//! PDF structure access for the label sheet.

use crate::error::LabelError;
use crate::geometry::PageSize;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// US Letter, used when a page tree carries no box at all.
const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Guard against cyclic `/Parent` chains.
const MAX_INHERIT_DEPTH: usize = 32;

/// A parsed PDF with at least one page.
pub struct LabelSheet {
    doc: Document,
    first_page: ObjectId,
    page_count: usize,
}

impl LabelSheet {
    /// Parse a PDF held in memory.
    pub fn load(pdf_bytes: &[u8]) -> Result<Self, LabelError> {
        let doc =
            Document::load_mem(pdf_bytes).map_err(|e| LabelError::DocumentOpen(e.to_string()))?;

        let pages = doc.get_pages();
        let first_page = *pages.values().next().ok_or(LabelError::EmptyDocument)?;

        Ok(Self {
            page_count: pages.len(),
            first_page,
            doc,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Visible size of the first page in points, after `/Rotate`.
    pub fn first_page_size(&self) -> Result<PageSize, LabelError> {
        let page = self
            .doc
            .get_dictionary(self.first_page)
            .map_err(|e| LabelError::DocumentOpen(format!("first page: {}", e)))?;

        let media = self
            .inherited(page, b"MediaBox")
            .and_then(|obj| self.rect(obj))
            .filter(|rect| !is_empty(rect));
        let crop = self
            .inherited(page, b"CropBox")
            .and_then(|obj| self.rect(obj));

        // The visible page is the CropBox clipped to the MediaBox; an empty
        // or disjoint CropBox leaves the MediaBox.
        let rect = match (crop, media) {
            (Some(crop), Some(media)) => Some(intersect(&crop, &media))
                .filter(|rect| !is_empty(rect))
                .or(Some(media)),
            (Some(crop), None) => Some(crop).filter(|rect| !is_empty(rect)),
            (None, media) => media,
        };

        let (width, height) = match rect {
            Some([x0, y0, x1, y1]) => (x1 - x0, y1 - y0),
            None => DEFAULT_PAGE_SIZE,
        };

        let rotate = self
            .inherited(page, b"Rotate")
            .and_then(|obj| self.number(obj))
            .unwrap_or(0.0) as i64;

        if rotate.rem_euclid(180) == 90 {
            Ok(PageSize::new(height, width))
        } else {
            Ok(PageSize::new(width, height))
        }
    }

    /// Look up a page attribute, walking up the page tree for inheritable keys.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn number(&self, obj: &Object) -> Option<f64> {
        match self.resolve(obj)? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        }
    }

    fn rect(&self, obj: &Object) -> Option<[f64; 4]> {
        let items = self.resolve(obj)?.as_array().ok()?;
        if items.len() != 4 {
            return None;
        }
        let mut corners = [0.0; 4];
        for (slot, item) in corners.iter_mut().zip(items) {
            *slot = self.number(item)?;
        }
        let [ax, ay, bx, by] = corners;
        Some([ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)])
    }
}

/// Overlap of two normalized rectangles, possibly empty.
fn intersect(a: &[f64; 4], b: &[f64; 4]) -> [f64; 4] {
    [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])]
}

fn is_empty(rect: &[f64; 4]) -> bool {
    rect[2] <= rect[0] || rect[3] <= rect[1]
}
