//! Block extent detection.
//!
//! Brace blocks are matched by net count; colon-terminated headers use
//! indentation. Unmatched braces run to the end of the enclosing range.

use super::normalize::NormalizedLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Index of the last line of the block, inclusive
    pub end: usize,
    /// False when an opening brace never closed
    pub balanced: bool,
}

impl BlockSpan {
    fn closed(end: usize) -> Self {
        Self {
            end,
            balanced: true,
        }
    }
}

/// Extent of the block whose header sits at `header`, never past `limit`.
pub fn block_end(lines: &[NormalizedLine], header: usize, limit: usize) -> BlockSpan {
    let limit = limit.min(lines.len().saturating_sub(1));
    if header >= limit {
        let last = header.min(limit);
        return BlockSpan {
            end: last,
            balanced: lines
                .get(last)
                .is_none_or(|l| l.opens() <= l.closes()),
        };
    }

    let head = &lines[header];
    if head.code.ends_with(':') {
        return indented_block_end(lines, header, limit);
    }

    let mut depth: usize = 0;
    let mut seen_open = false;

    for (j, line) in lines.iter().enumerate().take(limit + 1).skip(header) {
        for ch in line.code.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' if seen_open => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return BlockSpan::closed(j);
                    }
                }
                _ => {}
            }
        }

        if j == header && !seen_open {
            if head.code.ends_with(';') {
                return BlockSpan::closed(header);
            }
            let Some(next) = next_code_line(lines, header + 1, limit) else {
                return BlockSpan::closed(header);
            };
            if lines[next].code.starts_with('{') {
                continue;
            }
            if lines[next].indent > head.indent {
                // Braceless single-statement body, possibly itself a block.
                return block_end(lines, next, limit);
            }
            return BlockSpan::closed(header);
        }
    }

    BlockSpan {
        end: limit,
        balanced: !seen_open,
    }
}

fn indented_block_end(lines: &[NormalizedLine], header: usize, limit: usize) -> BlockSpan {
    let base = lines[header].indent;
    let mut end = header;
    for (j, line) in lines.iter().enumerate().take(limit + 1).skip(header + 1) {
        if line.is_blank() {
            continue;
        }
        if line.indent <= base {
            break;
        }
        end = j;
    }
    BlockSpan::closed(end)
}

fn next_code_line(lines: &[NormalizedLine], from: usize, limit: usize) -> Option<usize> {
    (from..=limit).find(|&j| !lines[j].is_blank())
}
