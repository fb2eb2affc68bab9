/// What a column renders
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnContent {
    /// One grapheme (or a ligature) of text
    Text(String),
    /// An inline image; counts as a single character
    Image { src: String },
}

/// Render flags toggled by selection, search and narration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnFlags {
    pub selected: bool,
    pub search_result: bool,
    pub read_aloud: bool,
}

/// Smallest addressable rendered unit within a line
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub content: ColumnContent,
    /// Left edge in layout units
    pub start: f32,
    /// Right edge in layout units
    pub end: f32,
    flags: ColumnFlags,
}

impl Column {
    pub fn text(text: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            content: ColumnContent::Text(text.into()),
            start,
            end,
            flags: ColumnFlags::default(),
        }
    }

    pub fn image(src: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            content: ColumnContent::Image { src: src.into() },
            start,
            end,
            flags: ColumnFlags::default(),
        }
    }

    /// Characters this column contributes to its paragraph
    pub fn char_len(&self) -> usize {
        match &self.content {
            ColumnContent::Text(text) => text.chars().count(),
            ColumnContent::Image { .. } => 1,
        }
    }

    /// Text this column contributes; images contribute a single space
    pub fn as_str(&self) -> &str {
        match &self.content {
            ColumnContent::Text(text) => text,
            ColumnContent::Image { .. } => " ",
        }
    }

    pub fn flags(&self) -> ColumnFlags {
        self.flags
    }

    pub fn is_selected(&self) -> bool {
        self.flags.selected
    }

    pub fn is_search_result(&self) -> bool {
        self.flags.search_result
    }

    pub fn is_read_aloud(&self) -> bool {
        self.flags.read_aloud
    }

    pub fn contains_x(&self, x: f32) -> bool {
        self.start <= x && x < self.end
    }

    // Setters report whether the flag actually changed so the owning line
    // can raise a redraw request.

    pub(crate) fn set_selected(&mut self, value: bool) -> bool {
        let changed = self.flags.selected != value;
        self.flags.selected = value;
        changed
    }

    pub(crate) fn set_search_result(&mut self, value: bool) -> bool {
        let changed = self.flags.search_result != value;
        self.flags.search_result = value;
        changed
    }

    pub(crate) fn set_read_aloud(&mut self, value: bool) -> bool {
        let changed = self.flags.read_aloud != value;
        self.flags.read_aloud = value;
        changed
    }
}
