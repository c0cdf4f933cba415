//! Line reconstruction: cluster a page's fragments into visual lines.
//!
//! Fragments are stable-sorted top-to-bottom (descending `y`), then
//! left-to-right, and folded into clusters. A fragment joins the open
//! cluster while its `y` stays within [`Y_THRESHOLD`] of the cluster's
//! running mean; otherwise the cluster is closed and a new one starts.
//!
//! The running mean is halved towards each new member
//! (`mean = (mean + y) / 2`), so it tracks the most recent fragments more
//! than the first one. That makes the result order-sensitive, which is why
//! the first pass must be a stable sort.

use crate::model::{TextFragment, VisualLine};
use std::cmp::Ordering;

/// Maximum vertical distance (PDF points) between a fragment and the running
/// cluster mean for the fragment to join the cluster.
pub const Y_THRESHOLD: f32 = 3.0;

/// The open cluster threaded through the fold.
struct Cluster {
    members: Vec<TextFragment>,
    mean_y: f32,
}

impl Cluster {
    fn start(fragment: TextFragment) -> Self {
        Self {
            mean_y: fragment.y,
            members: vec![fragment],
        }
    }

    fn accepts(&self, fragment: &TextFragment) -> bool {
        (fragment.y - self.mean_y).abs() <= Y_THRESHOLD
    }

    fn absorb(mut self, fragment: TextFragment) -> Self {
        self.mean_y = (self.mean_y + fragment.y) / 2.0;
        self.members.push(fragment);
        self
    }

    fn close(mut self) -> VisualLine {
        self.members.sort_by(|a, b| a.x.total_cmp(&b.x));
        VisualLine {
            fragments: self.members,
        }
    }
}

/// Top-to-bottom, then left-to-right.
fn reading_order(a: &TextFragment, b: &TextFragment) -> Ordering {
    b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x))
}

/// Group one page's fragments into visual lines ordered top-to-bottom, each
/// sorted left-to-right.
pub fn reconstruct_lines(fragments: &[TextFragment]) -> Vec<VisualLine> {
    let mut sorted = fragments.to_vec();
    // `sort_by` is stable: equal keys keep extraction order.
    sorted.sort_by(reading_order);

    let (mut lines, open) = sorted.into_iter().fold(
        (Vec::new(), None::<Cluster>),
        |(mut lines, open), fragment| match open {
            Some(cluster) if cluster.accepts(&fragment) => (lines, Some(cluster.absorb(fragment))),
            Some(cluster) => {
                lines.push(cluster.close());
                (lines, Some(Cluster::start(fragment)))
            }
            None => (lines, Some(Cluster::start(fragment))),
        },
    );

    if let Some(cluster) = open {
        lines.push(cluster.close());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, "Helvetica", 12.0, x, y)
    }

    fn texts(line: &VisualLine) -> Vec<&str> {
        line.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn empty_page_has_no_lines() {
        assert!(reconstruct_lines(&[]).is_empty());
    }

    #[test]
    fn single_fragment_single_line() {
        let lines = reconstruct_lines(&[frag("only", 10.0, 700.0)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(texts(&lines[0]), ["only"]);
    }

    #[test]
    fn orders_lines_top_to_bottom_and_fragments_left_to_right() {
        let lines = reconstruct_lines(&[
            frag("second", 10.0, 680.0),
            frag("world", 60.0, 700.0),
            frag("Hello", 10.0, 700.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(texts(&lines[0]), ["Hello", "world"]);
        assert_eq!(texts(&lines[1]), ["second"]);
    }

    #[test]
    fn small_baseline_jitter_stays_on_one_line() {
        // Superscripts and mixed fonts shift the baseline by a point or two.
        let lines = reconstruct_lines(&[
            frag("E", 10.0, 700.0),
            frag("=", 20.0, 698.5),
            frag("mc²", 30.0, 701.5),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(texts(&lines[0]), ["E", "=", "mc²"]);
    }

    #[test]
    fn gap_beyond_threshold_starts_new_line() {
        let lines = reconstruct_lines(&[frag("a", 10.0, 700.0), frag("b", 10.0, 696.9)]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn running_mean_follows_recent_members() {
        // 700 → mean 700; 697.5 joins → mean 698.75; 695.9 is 2.85 away and
        // joins although it is 4.1 below the first fragment.
        let lines = reconstruct_lines(&[
            frag("a", 10.0, 700.0),
            frag("b", 20.0, 697.5),
            frag("c", 30.0, 695.9),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(texts(&lines[0]), ["a", "b", "c"]);
    }

    #[test]
    fn equal_positions_keep_extraction_order() {
        let lines = reconstruct_lines(&[frag("first", 10.0, 700.0), frag("second", 10.0, 700.0)]);
        assert_eq!(texts(&lines[0]), ["first", "second"]);
    }
}
