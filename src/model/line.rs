use super::column::Column;

/// Role of a line within its page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineRole {
    Title,
    #[default]
    Body,
}

/// A laid-out row of columns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub columns: Vec<Column>,
    /// Top edge in layout units, relative to the page
    pub top: f32,
    /// Bottom edge in layout units, relative to the page
    pub bottom: f32,
    /// True on the last line of a paragraph
    pub paragraph_end: bool,
    pub role: LineRole,
    redraw: bool,
}

impl Line {
    pub fn new(columns: Vec<Column>, top: f32, bottom: f32) -> Self {
        Self {
            columns,
            top,
            bottom,
            paragraph_end: false,
            role: LineRole::Body,
            redraw: false,
        }
    }

    pub fn with_paragraph_end(mut self, paragraph_end: bool) -> Self {
        self.paragraph_end = paragraph_end;
        self
    }

    pub fn with_role(mut self, role: LineRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_title(&self) -> bool {
        self.role == LineRole::Title
    }

    pub fn text(&self) -> String {
        self.columns.iter().map(Column::as_str).collect()
    }

    pub fn char_len(&self) -> usize {
        self.columns.iter().map(Column::char_len).sum()
    }

    /// Character offset of `column` from the start of this line
    pub fn char_offset_of(&self, column: usize) -> usize {
        self.columns.iter().take(column).map(Column::char_len).sum()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn contains_y(&self, y: f32) -> bool {
        self.top <= y && y < self.bottom
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_read_aloud(&self) -> bool {
        self.columns.iter().any(Column::is_read_aloud)
    }

    pub fn search_result_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_search_result()).count()
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw
    }

    pub fn clear_redraw(&mut self) {
        self.redraw = false;
    }

    pub fn set_selected(&mut self, column: usize, value: bool) {
        if let Some(col) = self.columns.get_mut(column) {
            self.redraw |= col.set_selected(value);
        }
    }

    pub fn set_search_result(&mut self, column: usize, value: bool) {
        if let Some(col) = self.columns.get_mut(column) {
            self.redraw |= col.set_search_result(value);
        }
    }

    pub fn set_read_aloud(&mut self, value: bool) {
        for col in &mut self.columns {
            self.redraw |= col.set_read_aloud(value);
        }
    }

    pub(crate) fn clear_selection(&mut self, clear_search: bool) {
        for col in &mut self.columns {
            self.redraw |= col.set_selected(false);
            if clear_search {
                self.redraw |= col.set_search_result(false);
            }
        }
    }
}
