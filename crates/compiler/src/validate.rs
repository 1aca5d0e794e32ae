//! Placement checks for performance-tuning annotations.

use crate::error::{DriverError, DriverResult};
use annoforge_ir::fragment::{CodeFragment, LeaderAnnotation, TrailerAnnotation};
use std::collections::VecDeque;
use tracing::debug;

enum Node<'a> {
    Fragment(&'a CodeFragment),
    Leader(&'a LeaderAnnotation),
    Trailer(&'a TrailerAnnotation),
}

/// Ensure that at most one `PerfTuning` annotation exists and that it sits
/// at the top level of `fragments`.
///
/// Every top-level region's subtree is flattened through a FIFO work-list,
/// failing on the first nested `PerfTuning` leader.
pub fn check_perf_tuning_annotations(fragments: &[CodeFragment]) -> DriverResult<()> {
    let mut tuning_regions = 0usize;

    for fragment in fragments {
        let Some(region) = fragment.as_region() else {
            continue;
        };

        if region.is_perf_tuning() {
            tuning_regions += 1;
            if tuning_regions > 1 {
                return Err(DriverError::DuplicateTuningAnnotation {
                    line: region.leader.kind_line,
                });
            }
        }

        let mut pending: VecDeque<Node<'_>> =
            region.children.iter().map(Node::Fragment).collect();
        let mut visited = 0usize;
        while let Some(node) = pending.pop_front() {
            visited += 1;
            match node {
                Node::Leader(leader) if leader.is_perf_tuning() => {
                    return Err(DriverError::NestedTuningAnnotation {
                        line: leader.kind_line,
                    });
                }
                Node::Fragment(CodeFragment::Region(nested)) => {
                    pending.push_back(Node::Leader(&nested.leader));
                    pending.extend(nested.children.iter().map(Node::Fragment));
                    pending.push_back(Node::Trailer(&nested.trailer));
                }
                Node::Leader(_) | Node::Trailer(_) | Node::Fragment(CodeFragment::Plain(_)) => {}
            }
        }
        debug!(
            kind = %region.leader.kind,
            line = region.leader.kind_line,
            visited,
            "checked annotation subtree"
        );
    }

    Ok(())
}
