use unicode_segmentation::UnicodeSegmentation;

/// Word-boundary segmentation over a paragraph.
///
/// Returns boundary offsets in characters (not bytes), ascending, starting at
/// 0 and ending at the character length of `text`.
pub trait WordSegmenter {
    fn boundaries(&self, text: &str) -> Vec<usize>;
}

impl<F> WordSegmenter for F
where
    F: Fn(&str) -> Vec<usize>,
{
    fn boundaries(&self, text: &str) -> Vec<usize> {
        self(text)
    }
}

/// UAX #29 word boundaries
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeWords;

impl WordSegmenter for UnicodeWords {
    fn boundaries(&self, text: &str) -> Vec<usize> {
        let mut bounds = Vec::new();
        let mut chars = 0;
        for segment in text.split_word_bounds() {
            bounds.push(chars);
            chars += segment.chars().count();
        }
        bounds.push(chars);
        bounds
    }
}

/// The segment `[start, end)` containing `offset`, scanning in order
pub fn segment_containing(bounds: &[usize], offset: usize) -> Option<(usize, usize)> {
    bounds
        .windows(2)
        .map(|w| (w[0], w[1]))
        .find(|&(start, end)| start <= offset && offset < end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_char_offsets() {
        let bounds = UnicodeWords.boundaries("héllo wörld");
        assert_eq!(bounds, vec![0, 5, 6, 11]);
    }

    #[test]
    fn empty_text_has_single_boundary() {
        assert_eq!(UnicodeWords.boundaries(""), vec![0]);
        assert_eq!(segment_containing(&[0], 0), None);
    }

    #[test]
    fn closures_can_segment() {
        let every_char = |text: &str| (0..=text.chars().count()).collect::<Vec<_>>();
        let bounds = every_char.boundaries("abc");
        assert_eq!(segment_containing(&bounds, 1), Some((1, 2)));
    }

    #[test]
    fn cjk_text_segments_per_ideograph() {
        let bounds = UnicodeWords.boundaries("你好世界");
        assert_eq!(segment_containing(&bounds, 2), Some((2, 3)));
    }
}
