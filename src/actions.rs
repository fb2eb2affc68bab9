use serde::{Deserialize, Serialize};

/// What a tap on a screen region does. The numeric codes are stable and are
/// what the settings file stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TapAction {
    ShowMenu,
    NextPage,
    PrevPage,
    NextChapter,
    PrevChapter,
    NarrationPrevParagraph,
    NarrationNextParagraph,
    AddBookmark,
    EditContent,
    ToggleReplaceRules,
    OpenChapterList,
    OpenSearch,
    SyncProgress,
    ToggleNarration,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown tap action code {0} (expected 0-13)")]
pub struct InvalidActionCode(pub u8);

impl TapAction {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TapAction {
    type Error = InvalidActionCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use TapAction::*;
        Ok(match code {
            0 => ShowMenu,
            1 => NextPage,
            2 => PrevPage,
            3 => NextChapter,
            4 => PrevChapter,
            5 => NarrationPrevParagraph,
            6 => NarrationNextParagraph,
            7 => AddBookmark,
            8 => EditContent,
            9 => ToggleReplaceRules,
            10 => OpenChapterList,
            11 => OpenSearch,
            12 => SyncProgress,
            13 => ToggleNarration,
            other => return Err(InvalidActionCode(other)),
        })
    }
}

impl From<TapAction> for u8 {
    fn from(action: TapAction) -> u8 {
        action.code()
    }
}

/// The nine cells of the tap grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Configured action per region
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionActions {
    pub top_left: TapAction,
    pub top_center: TapAction,
    pub top_right: TapAction,
    pub middle_left: TapAction,
    pub center: TapAction,
    pub middle_right: TapAction,
    pub bottom_left: TapAction,
    pub bottom_center: TapAction,
    pub bottom_right: TapAction,
}

impl Default for RegionActions {
    fn default() -> Self {
        use TapAction::*;
        Self {
            top_left: PrevPage,
            top_center: PrevPage,
            top_right: NextPage,
            middle_left: PrevPage,
            center: ShowMenu,
            middle_right: NextPage,
            bottom_left: PrevPage,
            bottom_center: NextPage,
            bottom_right: NextPage,
        }
    }
}

impl RegionActions {
    pub fn action_for(&self, region: Region) -> TapAction {
        match region {
            Region::TopLeft => self.top_left,
            Region::TopCenter => self.top_center,
            Region::TopRight => self.top_right,
            Region::MiddleLeft => self.middle_left,
            Region::Center => self.center,
            Region::MiddleRight => self.middle_right,
            Region::BottomLeft => self.bottom_left,
            Region::BottomCenter => self.bottom_center,
            Region::BottomRight => self.bottom_right,
        }
    }
}
