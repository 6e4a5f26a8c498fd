//! Contains the formatting logic for the [StackView] struct.

use super::StackView;
use crate::constants::{
    BOTTOM_LEFT_BOX, COLORS, EMPTY_CIRCLE, FILLED_CIRCLE, HORIZONTAL_BOX, LEFT_FORK_BOX,
    VERTICAL_BOX,
};
use nu_ansi_term::Color;
use std::fmt::Display;

/// A branch waiting to be written, along with the layout inherited from its parent.
struct Frame<'a> {
    branch: &'a str,
    depth: usize,
    prefix: String,
    connection: String,
    is_last_child: bool,
}

impl StackView {
    /// Gathers an in-order list of [DisplayBranch]es for the stack's tree, containing the
    /// log-line and branch name.
    ///
    /// The tree is walked depth-first in pre-order starting at the root. The branch the view was
    /// resolved for is marked with a filled circle, and branches with a pull request show its
    /// number. If the root has no stored node, the list is empty.
    pub fn display_branches(&self, colored: bool) -> Vec<DisplayBranch> {
        let mut lines = Vec::new();
        if self.get(&self.root).is_none() {
            return lines;
        }

        let mut stack = vec![Frame {
            branch: self.root.as_str(),
            depth: 0,
            prefix: String::new(),
            connection: String::new(),
            is_last_child: true,
        }];

        while let Some(frame) = stack.pop() {
            let Some(node) = self.get(frame.branch) else {
                continue;
            };

            // Form the log-line for the current branch.
            let icon = if frame.branch == self.current_branch {
                FILLED_CIRCLE
            } else {
                EMPTY_CIRCLE
            };
            let color = COLORS[frame.depth % COLORS.len()];
            let rendered_branch = paint(
                colored,
                color,
                format!("{}{} {}", frame.connection, icon, frame.branch),
            );
            let pull_request = node
                .pull_request
                .as_ref()
                .map(|pr| {
                    format!(
                        " {}",
                        paint(colored, Color::DarkGray, format!("[PR #{}]", pr.number))
                    )
                })
                .unwrap_or_default();

            lines.push(DisplayBranch {
                display_value: format!("{}{}{}", frame.prefix, rendered_branch, pull_request),
                branch_name: frame.branch.to_string(),
            });

            // Form the prefix shared by the children's log-lines.
            let child_prefix = if frame.depth > 0 {
                if frame.is_last_child {
                    format!("{}  ", frame.prefix)
                } else {
                    format!(
                        "{}{} ",
                        frame.prefix,
                        paint(colored, color, VERTICAL_BOX.to_string())
                    )
                }
            } else {
                frame.prefix.clone()
            };

            // Push the children in reverse so that the first child is written next.
            let children = self.linked_children(frame.branch);
            let last = children.len().saturating_sub(1);
            for (i, child) in children.into_iter().enumerate().rev() {
                let is_last_child = i == last;
                let connection = format!(
                    "{}{}",
                    if is_last_child {
                        BOTTOM_LEFT_BOX
                    } else {
                        LEFT_FORK_BOX
                    },
                    HORIZONTAL_BOX
                );
                stack.push(Frame {
                    branch: child,
                    depth: frame.depth + 1,
                    prefix: child_prefix.clone(),
                    connection,
                    is_last_child,
                });
            }
        }

        lines
    }
}

/// Paints `text` with `color`, or leaves it plain.
fn paint(colored: bool, color: Color, text: String) -> String {
    if colored {
        color.paint(text).to_string()
    } else {
        text
    }
}

/// A pair of a log-line and a branch name, which implements [Display].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayBranch {
    /// The log-line to display.
    pub(crate) display_value: String,
    /// The branch name corresponding to the log-line.
    pub(crate) branch_name: String,
}

impl Display for DisplayBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_value)
    }
}
